// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Issue and comment records, and the issue list kept in the store.
//!
//! The list is one JSON array under the `issues` key, oldest first. The gate
//! only reads it; writing accepted submissions is up to the caller.

use crate::error::StoreError;
use crate::geo::Coordinates;
use crate::store::KeyValueStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Store key holding the issue list.
pub const ISSUES_KEY: &str = "issues";

/// A reported issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

impl Issue {
    pub fn location(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

/// A comment on an issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub issue_id: String,
    pub text: String,
    pub author: String,
    pub created_at: DateTime<Utc>,
}

/// Read/append access to the stored issue list.
#[derive(Debug, Clone)]
pub struct IssueLog {
    store: Arc<dyn KeyValueStore>,
}

impl IssueLog {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// All issues, oldest first. An absent key is an empty list.
    pub fn load(&self) -> Result<Vec<Issue>, StoreError> {
        match self.store.get(ISSUES_KEY)? {
            None => Ok(Vec::new()),
            Some(raw) => Ok(serde_json::from_str(&raw)?),
        }
    }

    /// The `n` most recently stored issues, oldest first.
    pub fn recent(&self, n: usize) -> Result<Vec<Issue>, StoreError> {
        let mut issues = self.load()?;
        let skip = issues.len().saturating_sub(n);
        Ok(issues.split_off(skip))
    }

    /// Whether an issue with `id` is stored.
    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.load()?.iter().any(|issue| issue.id == id))
    }

    fn save(&self, issues: &[Issue]) -> Result<(), StoreError> {
        self.store.set(ISSUES_KEY, &serde_json::to_string(issues)?)
    }

    /// Append an accepted issue.
    pub fn append(&self, issue: Issue) -> Result<(), StoreError> {
        let mut issues = self.load()?;
        debug!(id = %issue.id, "Appending issue");
        issues.push(issue);
        self.save(&issues)
    }

    /// Attach an accepted comment to its issue.
    ///
    /// Returns `false` when no issue has the comment's `issue_id`.
    pub fn add_comment(&self, comment: Comment) -> Result<bool, StoreError> {
        let mut issues = self.load()?;
        let Some(issue) = issues.iter_mut().find(|i| i.id == comment.issue_id) else {
            return Ok(false);
        };
        debug!(issue_id = %comment.issue_id, id = %comment.id, "Appending comment");
        issue.comments.push(comment);
        self.save(&issues)?;
        Ok(true)
    }
}
