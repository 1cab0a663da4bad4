// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Duplicate detection against recently accepted issues.

use crate::config::DuplicateConfig;
use crate::error::{Rejection, Verdict};
use crate::issues::Issue;
use tracing::debug;

/// Flags submissions that repeat one of the most recent issues.
#[derive(Debug, Clone)]
pub struct DuplicateDetector {
    config: DuplicateConfig,
}

impl DuplicateDetector {
    pub fn new(config: DuplicateConfig) -> Self {
        Self { config }
    }

    /// Number of trailing issues compared.
    pub fn window(&self) -> usize {
        self.config.recent_window
    }

    /// Compare a candidate against the tail of `recent` (oldest first).
    ///
    /// A match is an identical title ignoring case, or, for descriptions
    /// longer than the prefix length, the candidate's description prefix
    /// appearing anywhere in an existing description.
    pub fn check(&self, title: &str, description: &str, recent: &[Issue]) -> Verdict {
        let title = title.to_lowercase();
        let description = description.to_lowercase();
        let prefix_len = self.config.description_prefix;
        let prefix: Option<String> = (description.chars().count() > prefix_len)
            .then(|| description.chars().take(prefix_len).collect());

        let start = recent.len().saturating_sub(self.config.recent_window);
        let duplicate = recent[start..].iter().find(|issue| {
            issue.title.to_lowercase() == title
                || prefix
                    .as_deref()
                    .is_some_and(|p| issue.description.to_lowercase().contains(p))
        });

        match duplicate {
            Some(issue) => {
                debug!(existing = %issue.id, "Duplicate of recent issue");
                Verdict::Rejected(Rejection::DuplicateContent)
            }
            None => Verdict::Accepted,
        }
    }
}
