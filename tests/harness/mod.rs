// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Test harness for submission gate abuse simulation.
//!
//! Provides a steppable clock, submission generators, abuse scenarios and
//! outcome metrics so tests can replay hours of activity instantly.

#![allow(dead_code)]

pub mod attacks;
pub mod generators;
pub mod metrics;

use report_gate::clock::Clock;
use report_gate::photo::PixelDecoder;
use report_gate::{GateConfig, MemoryStore, SubmissionGate};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

/// 2024-03-05T10:00:00Z
pub const START_MS: i64 = 1_709_632_800_000;

pub const MINUTE_MS: i64 = 60_000;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

/// Clock that only moves when a test steps it.
#[derive(Debug, Clone)]
pub struct StepClock {
    now: Arc<AtomicI64>,
}

impl StepClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Arc::new(AtomicI64::new(start_ms)),
        }
    }

    pub fn advance(&self, millis: i64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    pub fn set(&self, millis: i64) {
        self.now.store(millis, Ordering::SeqCst);
    }
}

impl Clock for StepClock {
    fn now_millis(&self) -> i64 {
        self.now.load(Ordering::SeqCst)
    }
}

/// A gate over an in-memory store, driven by a [`StepClock`].
pub struct TestGate {
    pub gate: SubmissionGate,
    pub clock: StepClock,
    pub store: Arc<MemoryStore>,
}

impl TestGate {
    pub fn new(config: GateConfig) -> Self {
        let clock = StepClock::new(START_MS);
        let store = Arc::new(MemoryStore::new());
        let gate = SubmissionGate::with_parts(
            config,
            store.clone(),
            Arc::new(clock.clone()),
            Arc::new(PixelDecoder),
        );
        Self { gate, clock, store }
    }
}

impl Default for TestGate {
    fn default() -> Self {
        Self::new(GateConfig::default())
    }
}
