// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus metrics for the guard.

use crate::error::GuardError;
use crate::validator::Disposition;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry, TextEncoder,
};

/// Service metrics, registered on a private registry.
#[derive(Clone)]
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    deliveries: IntCounterVec,
    risk_scores: HistogramVec,
    rate_limit_records: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, GuardError> {
        let registry = Registry::new_custom(Some("inquiry_guard".to_string()), None)?;

        let submissions = IntCounterVec::new(
            Opts::new("submissions_total", "Form submissions by kind and disposition"),
            &["kind", "disposition"],
        )?;
        let deliveries = IntCounterVec::new(
            Opts::new("deliveries_total", "Notification deliveries by outcome"),
            &["outcome"],
        )?;
        let risk_scores = HistogramVec::new(
            HistogramOpts::new("risk_score", "Risk score of validated submissions")
                .buckets(vec![0.0, 10.0, 30.0, 50.0, 70.0, 90.0, 100.0]),
            &["kind"],
        )?;
        let rate_limit_records = IntGauge::new(
            "rate_limit_records",
            "Clients with a live rate-limit window",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(deliveries.clone()))?;
        registry.register(Box::new(risk_scores.clone()))?;
        registry.register(Box::new(rate_limit_records.clone()))?;

        Ok(Self {
            registry,
            submissions,
            deliveries,
            risk_scores,
            rate_limit_records,
        })
    }

    pub fn record_decision(&self, kind: &str, disposition: Disposition, risk_score: u8) {
        self.submissions
            .with_label_values(&[kind, disposition.as_str()])
            .inc();
        self.risk_scores
            .with_label_values(&[kind])
            .observe(f64::from(risk_score));
    }

    pub fn record_delivery(&self, delivered: bool) {
        let outcome = if delivered { "sent" } else { "failed" };
        self.deliveries.with_label_values(&[outcome]).inc();
    }

    pub fn set_rate_limit_records(&self, records: usize) {
        self.rate_limit_records
            .set(i64::try_from(records).unwrap_or(i64::MAX));
    }

    /// Render all metrics in the Prometheus text format.
    pub fn encode(&self) -> Result<String, GuardError> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| GuardError::Metrics(prometheus::Error::Msg(e.to_string())))
    }
}
