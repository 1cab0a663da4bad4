// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Free-text heuristics for issue reports and comments.
//!
//! Rules run in a fixed order and the first failure wins:
//! 1. Length bounds (trimmed, counted in characters)
//! 2. Spam keywords (case-insensitive substring)
//! 3. Runs of a single repeated character
//! 4. Share of uppercase letters

use crate::config::ContentConfig;
use crate::error::{Rejection, Verdict};
use tracing::debug;

/// Validates issue titles/descriptions and comment text/author names.
#[derive(Debug, Clone)]
pub struct ContentValidator {
    config: ContentConfig,
    /// Keywords lowercased once up front
    spam_keywords: Vec<String>,
}

impl ContentValidator {
    /// Create a new validator with the given configuration.
    pub fn new(config: ContentConfig) -> Self {
        let spam_keywords = config
            .spam_keywords
            .iter()
            .map(|k| k.to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        Self {
            config,
            spam_keywords,
        }
    }

    /// Validate a new issue's title and description.
    pub fn validate_issue(&self, title: &str, description: &str) -> Verdict {
        let c = &self.config;

        let title_len = char_len(title);
        if title_len < c.title_min {
            return Verdict::Rejected(Rejection::TitleTooShort { min: c.title_min });
        }
        if title_len > c.title_max {
            return Verdict::Rejected(Rejection::TitleTooLong { max: c.title_max });
        }

        let description_len = char_len(description);
        if description_len < c.description_min {
            return Verdict::Rejected(Rejection::DescriptionTooShort {
                min: c.description_min,
            });
        }
        if description_len > c.description_max {
            return Verdict::Rejected(Rejection::DescriptionTooLong {
                max: c.description_max,
            });
        }

        self.check_heuristics(&format!("{} {}", title, description))
    }

    /// Validate a comment's text and author name.
    pub fn validate_comment(&self, text: &str, author: &str) -> Verdict {
        let c = &self.config;

        let text_len = char_len(text);
        if text_len < c.comment_min {
            return Verdict::Rejected(Rejection::CommentTooShort { min: c.comment_min });
        }
        if text_len > c.comment_max {
            return Verdict::Rejected(Rejection::CommentTooLong { max: c.comment_max });
        }

        let author_len = char_len(author);
        if author_len < c.author_min {
            return Verdict::Rejected(Rejection::AuthorNameTooShort { min: c.author_min });
        }
        if author_len > c.author_max {
            return Verdict::Rejected(Rejection::AuthorNameTooLong { max: c.author_max });
        }

        self.check_heuristics(text)
    }

    /// Spam, repetition and capitalization rules over already length-checked text.
    fn check_heuristics(&self, content: &str) -> Verdict {
        let lowered = content.to_lowercase();
        if let Some(keyword) = self.spam_keywords.iter().find(|k| lowered.contains(k.as_str())) {
            debug!(keyword = %keyword, "Spam keyword matched");
            return Verdict::Rejected(Rejection::SpamDetected);
        }

        if longest_run(&lowered) >= self.config.repeat_run_limit {
            debug!("Repetitive characters detected");
            return Verdict::Rejected(Rejection::RepetitiveContent);
        }

        let total = char_len_raw(content);
        if total > self.config.uppercase_min_length {
            let upper = content.chars().filter(|c| c.is_uppercase()).count();
            let ratio = upper as f64 / total as f64;
            if ratio > self.config.max_uppercase_ratio {
                debug!(ratio, "Excessive capitalization");
                return Verdict::Rejected(Rejection::ExcessiveCapitalization);
            }
        }

        Verdict::Accepted
    }
}

/// Character count after trimming surrounding whitespace.
fn char_len(s: &str) -> usize {
    s.trim().chars().count()
}

fn char_len_raw(s: &str) -> usize {
    s.chars().count()
}

/// Length of the longest run of one repeated character.
fn longest_run(s: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;

    for c in s.chars() {
        if Some(c) == previous {
            current += 1;
        } else {
            current = 1;
            previous = Some(c);
        }
        longest = longest.max(current);
    }

    longest
}
