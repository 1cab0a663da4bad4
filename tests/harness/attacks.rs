// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Abuse patterns for security testing.

use super::{HOUR_MS, MINUTE_MS};
use std::time::Duration;

/// What each attempt in a scenario submits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    /// Distinct, well-formed issues
    FreshIssues,
    /// Issues padded with spam keywords
    Spam,
    /// The same issue over and over
    Repost,
    /// Well-formed issues pinned far from the reporter
    Remote { distance_m: u32 },
    /// Distinct comments on one issue
    Comments,
}

/// Abuse scenario configuration.
#[derive(Debug, Clone)]
pub struct AbuseScenario {
    /// Number of submissions attempted
    pub attempts: usize,
    /// Simulated time between attempts
    pub interval_ms: i64,
    pub payload: Payload,
}

/// Expected outcome of a scenario under the default policy.
#[derive(Debug, Clone)]
pub struct Expectations {
    /// Exact number of attempts that should get through
    pub accepted: usize,
    /// Rejection code that should account for every other attempt
    pub rejected_as: &'static str,
    pub description: &'static str,
}

impl AbuseScenario {
    /// Rapid-fire distinct issues from one device.
    pub fn issue_flood() -> Self {
        Self {
            attempts: 50,
            interval_ms: 1_000,
            payload: Payload::FreshIssues,
        }
    }

    /// Spam reports that never clear content checks.
    pub fn spam_flood() -> Self {
        Self {
            attempts: 45,
            interval_ms: 5_000,
            payload: Payload::Spam,
        }
    }

    /// Reposting one issue every two hours.
    pub fn repost() -> Self {
        Self {
            attempts: 12,
            interval_ms: 2 * HOUR_MS,
            payload: Payload::Repost,
        }
    }

    /// Reporting from across town with a genuine device location.
    pub fn remote_reports() -> Self {
        Self {
            attempts: 20,
            interval_ms: 10 * MINUTE_MS,
            payload: Payload::Remote { distance_m: 5_000 },
        }
    }

    /// One issue every 25 minutes for a day and a bit, never tripping
    /// the hourly limit.
    pub fn slow_drip() -> Self {
        Self {
            attempts: 60,
            interval_ms: 25 * MINUTE_MS,
            payload: Payload::FreshIssues,
        }
    }

    /// Comment spam under a single issue.
    pub fn comment_flood() -> Self {
        Self {
            attempts: 30,
            interval_ms: 10_000,
            payload: Payload::Comments,
        }
    }

    pub fn simulated_duration(&self) -> Duration {
        Duration::from_millis((self.interval_ms as u64) * self.attempts as u64)
    }

    /// Expected outcome with default configuration, starting at 10:00 UTC.
    pub fn expectations(&self) -> Expectations {
        match self.payload {
            Payload::Spam => Expectations {
                accepted: 0,
                rejected_as: "SPAM_DETECTED",
                description: "Spam never passes and never spends rate quota",
            },
            Payload::Repost => Expectations {
                accepted: 1,
                rejected_as: "DUPLICATE_CONTENT",
                description: "Only the first copy is accepted",
            },
            Payload::Remote { .. } => Expectations {
                accepted: 0,
                rejected_as: "LOCATION_OUT_OF_RANGE",
                description: "Reports outside the radius are refused",
            },
            Payload::Comments => Expectations {
                accepted: 5,
                rejected_as: "RATE_LIMITED",
                description: "Comments capped at 5 per hour",
            },
            Payload::FreshIssues if self.interval_ms >= 20 * MINUTE_MS => Expectations {
                // 34 attempts fall before midnight, 26 after
                accepted: 20,
                rejected_as: "RATE_LIMITED",
                description: "Daily cap of 10 applies on each calendar day",
            },
            Payload::FreshIssues => Expectations {
                accepted: 3,
                rejected_as: "RATE_LIMITED",
                description: "Issues capped at 3 per hour",
            },
        }
    }
}
