// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Wall-clock port used for rate limit window arithmetic.

use chrono::Utc;
use std::fmt::Debug;

/// Source of the current wall-clock time.
///
/// Rate limit windows are wall-clock buckets, so this returns epoch
/// milliseconds rather than a monotonic instant.
pub trait Clock: Send + Sync + Debug {
    /// Milliseconds since the Unix epoch.
    fn now_millis(&self) -> i64;
}

/// Clock backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }
}
