// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for abuse simulation results.

use report_gate::Verdict;
use std::collections::BTreeMap;
use std::time::{Duration, Instant};

/// Outcome label used for accepted submissions.
pub const ACCEPTED: &str = "ACCEPTED";

/// Collects outcomes during a simulation.
#[derive(Debug, Default)]
pub struct GateMetrics {
    /// Count of attempts by outcome code
    outcomes: BTreeMap<&'static str, usize>,
    /// Wall time spent inside the gate, per attempt (microseconds)
    latencies: Vec<u64>,
    /// Simulated time covered by the run
    simulated: Duration,
}

impl GateMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Time a gate call and record its verdict.
    pub async fn measure<F>(&mut self, call: F) -> Verdict
    where
        F: std::future::Future<Output = Verdict>,
    {
        let start = Instant::now();
        let verdict = call.await;
        self.record(&verdict, start.elapsed());
        verdict
    }

    /// Record one attempt.
    pub fn record(&mut self, verdict: &Verdict, latency: Duration) {
        let code = verdict.rejection().map_or(ACCEPTED, |r| r.code());
        *self.outcomes.entry(code).or_insert(0) += 1;
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn set_simulated(&mut self, simulated: Duration) {
        self.simulated = simulated;
    }

    pub fn total(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn accepted(&self) -> usize {
        self.count(ACCEPTED)
    }

    /// Attempts that ended with `code`.
    pub fn count(&self, code: &str) -> usize {
        self.outcomes.get(code).copied().unwrap_or(0)
    }

    /// Ratio of rejected to total attempts.
    pub fn block_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (total - self.accepted()) as f64 / total as f64
    }

    /// Most frequent rejection code, if anything was rejected.
    pub fn dominant_rejection(&self) -> Option<&'static str> {
        self.outcomes
            .iter()
            .filter(|(code, _)| **code != ACCEPTED)
            .max_by_key(|(_, count)| **count)
            .map(|(code, _)| *code)
    }

    pub fn p99_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        let idx = (sorted.len() as f64 * 0.99) as usize;
        sorted[idx.min(sorted.len() - 1)]
    }
}

impl std::fmt::Display for GateMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Gate Metrics Report ===")?;
        writeln!(f, "Simulated:         {} min", self.simulated.as_secs() / 60)?;
        writeln!(f, "Attempts:          {}", self.total())?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate() * 100.0)?;
        writeln!(f, "P99 Latency:       {} us", self.p99_latency_us())?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        for (code, count) in &self.outcomes {
            writeln!(f, "{:<28} {}", code, count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use report_gate::Rejection;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = GateMetrics::new();
        metrics.record(&Verdict::Accepted, Duration::from_micros(100));
        metrics.record(&Verdict::Accepted, Duration::from_micros(150));
        metrics.record(
            &Verdict::Rejected(Rejection::SpamDetected),
            Duration::from_micros(50),
        );

        assert_eq!(metrics.total(), 3);
        assert_eq!(metrics.accepted(), 2);
        assert_eq!(metrics.count("SPAM_DETECTED"), 1);
        assert_eq!(metrics.dominant_rejection(), Some("SPAM_DETECTED"));
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = GateMetrics::new();
        for _ in 0..3 {
            metrics.record(&Verdict::Accepted, Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(&Verdict::Rejected(Rejection::DuplicateContent), Duration::ZERO);
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
    }
}
