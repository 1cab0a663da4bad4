// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Report Gate
//!
//! Client-side anti-abuse gate for a serverless community issue reporter.
//! Every new issue and comment passes through it before the caller writes
//! it to the local store:
//!
//! - Fixed-window rate limiting (3 issues/hour, 10/day, 5 comments/hour)
//! - Length, spam keyword, repetition and capitalization checks
//! - Photo size, type and dimension checks (async decode)
//! - Reporting radius around the reporter (1km)
//! - Duplicate detection against the 10 most recent issues
//!
//! The gate runs on the reporter's own device and is best effort: anyone
//! editing the store or the client can get past it.

pub mod clock;
pub mod config;
pub mod content;
pub mod duplicate;
pub mod error;
pub mod gate;
pub mod geo;
pub mod issues;
pub mod limiter;
pub mod photo;
pub mod store;

pub use config::GateConfig;
pub use error::{GateError, Rejection, StoreError, Verdict};
pub use gate::{CommentCandidate, IssueCandidate, SubmissionGate};
pub use geo::{distance_meters, Coordinates};
pub use limiter::{RateCategory, RateLimiter, WindowScope};
pub use store::{FileStore, KeyValueStore, MemoryStore};
