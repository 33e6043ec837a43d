// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Outcome collection for abuse simulation results.

use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Collects outcomes during an attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    start_time: Option<Instant>,
    end_time: Option<Instant>,
    outcomes: HashMap<Outcome, usize>,
    requests_per_client: HashMap<String, usize>,
    velocity_flagged: usize,
    /// Highest risk score seen
    max_risk: u8,
    /// Latency samples (microseconds)
    latencies: Vec<u64>,
}

/// What happened to one submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Accepted,
    ManualReview,
    RejectedRisk,
    ValidationFailed,
}

impl AttackMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    pub fn finish(&mut self) {
        self.end_time = Some(Instant::now());
    }

    /// Record a submission outcome.
    pub fn record(
        &mut self,
        outcome: Outcome,
        client: &str,
        risk_score: u8,
        velocity_flagged: bool,
        latency: Duration,
    ) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_client.entry(client.to_string()).or_insert(0) += 1;
        if velocity_flagged {
            self.velocity_flagged += 1;
        }
        self.max_risk = self.max_risk.max(risk_score);
        self.latencies.push(latency.as_micros() as u64);
    }

    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    pub fn duration(&self) -> Duration {
        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    fn ratio(&self, count: usize) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            0.0
        } else {
            count as f64 / total as f64
        }
    }

    /// Share of submissions that were accepted.
    pub fn accepted_ratio(&self) -> f64 {
        self.ratio(self.count(Outcome::Accepted))
    }

    /// Share of submissions carrying a velocity warning.
    pub fn velocity_flagged_ratio(&self) -> f64 {
        self.ratio(self.velocity_flagged)
    }

    pub fn median_latency_us(&self) -> u64 {
        if self.latencies.is_empty() {
            return 0;
        }
        let mut sorted = self.latencies.clone();
        sorted.sort_unstable();
        sorted[sorted.len() / 2]
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

    pub fn unique_clients(&self) -> usize {
        self.requests_per_client.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            accepted: self.count(Outcome::Accepted),
            manual_review: self.count(Outcome::ManualReview),
            rejected_risk: self.count(Outcome::RejectedRisk),
            validation_failed: self.count(Outcome::ValidationFailed),
            velocity_flagged: self.velocity_flagged,
            max_risk: self.max_risk,
            duration_ms: self.duration().as_millis() as u64,
            median_latency_us: self.median_latency_us(),
            p99_latency_us: self.p99_latency_us(),
            unique_clients: self.unique_clients(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub accepted: usize,
    pub manual_review: usize,
    pub rejected_risk: usize,
    pub validation_failed: usize,
    pub velocity_flagged: usize,
    pub max_risk: u8,
    pub duration_ms: u64,
    pub median_latency_us: u64,
    pub p99_latency_us: u64,
    pub unique_clients: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let pct = |n: usize| {
            if self.total_requests == 0 {
                0.0
            } else {
                n as f64 / self.total_requests as f64 * 100.0
            }
        };
        writeln!(f, "=== Abuse Simulation Report ===")?;
        writeln!(f, "Duration:          {} ms", self.duration_ms)?;
        writeln!(f, "Total Submissions: {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Accepted:          {} ({:.1}%)", self.accepted, pct(self.accepted))?;
        writeln!(f, "Manual Review:     {} ({:.1}%)", self.manual_review, pct(self.manual_review))?;
        writeln!(f, "Rejected (risk):   {}", self.rejected_risk)?;
        writeln!(f, "Validation Failed: {}", self.validation_failed)?;
        writeln!(f, "Velocity Flagged:  {} ({:.1}%)", self.velocity_flagged, pct(self.velocity_flagged))?;
        writeln!(f, "Max Risk Score:    {}", self.max_risk)?;
        writeln!(f)?;
        writeln!(f, "--- Latency ---")?;
        writeln!(f, "Median:            {} us", self.median_latency_us)?;
        writeln!(f, "P99:               {} us", self.p99_latency_us)?;
        writeln!(f)?;
        writeln!(f, "Unique Clients:    {}", self.unique_clients)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let mut metrics = AttackMetrics::new();
        metrics.start();

        metrics.record(Outcome::Accepted, "10.0.0.1", 0, false, Duration::from_micros(100));
        metrics.record(Outcome::Accepted, "10.0.0.1", 40, true, Duration::from_micros(150));
        metrics.record(Outcome::ManualReview, "10.0.0.2", 85, true, Duration::from_micros(50));

        metrics.finish();

        assert_eq!(metrics.total_requests(), 3);
        assert_eq!(metrics.count(Outcome::Accepted), 2);
        assert_eq!(metrics.count(Outcome::ManualReview), 1);
        assert_eq!(metrics.unique_clients(), 2);
        assert_eq!(metrics.report().max_risk, 85);
    }

    #[test]
    fn test_ratios() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Accepted, "10.0.0.1", 0, false, Duration::ZERO);
        }
        for _ in 0..7 {
            metrics.record(Outcome::ValidationFailed, "10.0.0.1", 0, true, Duration::ZERO);
        }

        assert!((metrics.accepted_ratio() - 0.3).abs() < 0.01);
        assert!((metrics.velocity_flagged_ratio() - 0.7).abs() < 0.01);
    }
}
