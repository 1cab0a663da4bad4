// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for new issues and comments.
//!
//! Counters live in the key-value store, one per (category, granularity,
//! window-index), where the window-index is the epoch time floor-divided by
//! the window length. A counter resets the moment the index changes, so a
//! user can fit up to twice the nominal limit across a window boundary.
//! A sliding log or token bucket would close that gap at the cost of
//! storing timestamps.
//!
//! Reads and writes are not transactional: two writers on the same store
//! can both read count N and both write N+1.

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::error::{Rejection, StoreError, Verdict};
use crate::store::KeyValueStore;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

const HOUR_MS: i64 = 3_600_000;
const DAY_MS: i64 = 86_400_000;
const KEY_PREFIX: &str = "ratelimit";

/// Kind of write being rate limited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RateCategory {
    /// Reporting a new issue
    Issue,
    /// Commenting on an existing issue
    Comment,
}

impl RateCategory {
    fn as_str(self) -> &'static str {
        match self {
            Self::Issue => "issue",
            Self::Comment => "comment",
        }
    }
}

impl std::fmt::Display for RateCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Window granularity a limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowScope {
    Hourly,
    Daily,
}

impl WindowScope {
    fn window_ms(self) -> i64 {
        match self {
            Self::Hourly => HOUR_MS,
            Self::Daily => DAY_MS,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Hourly => "hour",
            Self::Daily => "day",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "hour" => Some(Self::Hourly),
            "day" => Some(Self::Daily),
            _ => None,
        }
    }
}

/// Current counts against a category's limits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateUsage {
    pub category: RateCategory,
    pub hourly_count: u32,
    pub hourly_limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<u32>,
}

/// Store-backed fixed-window rate limiter.
#[derive(Debug, Clone)]
pub struct RateLimiter {
    config: RateLimitConfig,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Create a new rate limiter over the given store and clock.
    pub fn new(
        config: RateLimitConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            config,
            store,
            clock,
        }
    }

    /// Limits for a category, as (scope, limit) pairs checked in order.
    fn limits(&self, category: RateCategory) -> Vec<(WindowScope, u32)> {
        match category {
            RateCategory::Issue => vec![
                (WindowScope::Hourly, self.config.issues_per_hour),
                (WindowScope::Daily, self.config.issues_per_day),
            ],
            RateCategory::Comment => vec![(WindowScope::Hourly, self.config.comments_per_hour)],
        }
    }

    fn counter_key(&self, category: RateCategory, scope: WindowScope, now_ms: i64) -> String {
        let index = now_ms.div_euclid(scope.window_ms());
        format!("{}:{}:{}:{}", KEY_PREFIX, category, scope.as_str(), index)
    }

    fn read_count(&self, key: &str) -> Result<u32, StoreError> {
        match self.store.get(key)? {
            None => Ok(0),
            Some(raw) => raw.trim().parse().map_err(|_| StoreError::CorruptValue {
                key: key.to_string(),
                value: raw,
            }),
        }
    }

    /// Check whether one more action of `category` fits, without counting it.
    pub fn check(&self, category: RateCategory) -> Result<Verdict, StoreError> {
        let now_ms = self.clock.now_millis();

        for (scope, limit) in self.limits(category) {
            let key = self.counter_key(category, scope, now_ms);
            let count = self.read_count(&key)?;
            if count >= limit {
                debug!(%category, ?scope, count, limit, "Rate limit exceeded");
                return Ok(Verdict::Rejected(Rejection::RateLimitExceeded {
                    scope,
                    category,
                    limit,
                }));
            }
        }

        Ok(Verdict::Accepted)
    }

    /// Count one action of `category` in every window it is limited by.
    pub fn record(&self, category: RateCategory) -> Result<(), StoreError> {
        let now_ms = self.clock.now_millis();

        for (scope, _) in self.limits(category) {
            let key = self.counter_key(category, scope, now_ms);
            let count = self.read_count(&key)?;
            self.store.set(&key, &(count + 1).to_string())?;
        }

        debug!(%category, "Recorded rate-limited action");
        Ok(())
    }

    /// Check the limits and, if they allow it, count the action.
    ///
    /// Nothing is counted when the action is rejected.
    pub fn check_and_increment(&self, category: RateCategory) -> Result<Verdict, StoreError> {
        let verdict = self.check(category)?;
        if verdict.is_accepted() {
            self.record(category)?;
        }
        Ok(verdict)
    }

    /// Report current counts for a category.
    pub fn usage(&self, category: RateCategory) -> Result<RateUsage, StoreError> {
        let now_ms = self.clock.now_millis();
        let mut usage = RateUsage {
            category,
            hourly_count: 0,
            hourly_limit: 0,
            daily_count: None,
            daily_limit: None,
        };

        for (scope, limit) in self.limits(category) {
            let count = self.read_count(&self.counter_key(category, scope, now_ms))?;
            match scope {
                WindowScope::Hourly => {
                    usage.hourly_count = count;
                    usage.hourly_limit = limit;
                }
                WindowScope::Daily => {
                    usage.daily_count = Some(count);
                    usage.daily_limit = Some(limit);
                }
            }
        }

        Ok(usage)
    }

    /// Remove counters for windows past the retention horizon.
    ///
    /// Returns the number of keys removed. Only affects storage growth;
    /// limits are enforced the same whether or not this runs.
    pub fn cleanup(&self) -> Result<usize, StoreError> {
        let now_ms = self.clock.now_millis();
        let hour_cutoff = now_ms.div_euclid(HOUR_MS) - self.config.hourly_retention;
        let day_cutoff = now_ms.div_euclid(DAY_MS) - self.config.daily_retention;

        let mut removed = 0;
        for key in self.store.keys()? {
            let Some(rest) = key.strip_prefix(KEY_PREFIX).and_then(|r| r.strip_prefix(':'))
            else {
                continue;
            };

            let mut parts = rest.split(':');
            let (Some(_category), Some(scope), Some(index), None) =
                (parts.next(), parts.next(), parts.next(), parts.next())
            else {
                warn!(%key, "Skipping malformed rate limit key");
                continue;
            };

            let (Some(scope), Ok(index)) = (WindowScope::parse(scope), index.parse::<i64>()) else {
                warn!(%key, "Skipping malformed rate limit key");
                continue;
            };

            let cutoff = match scope {
                WindowScope::Hourly => hour_cutoff,
                WindowScope::Daily => day_cutoff,
            };
            if index < cutoff {
                self.store.delete(&key)?;
                removed += 1;
            }
        }

        debug!(removed, "Rate limit cleanup finished");
        Ok(removed)
    }
}
