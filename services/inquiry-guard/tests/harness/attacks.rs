// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Abuse patterns for security testing.
//!
//! Requests are spread over simulated time, so a pattern's rate is exact and
//! the simulation never sleeps.

use chrono::Duration as ChronoDuration;

/// What each simulated submission carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload {
    Legitimate,
    Spam,
    Disposable,
    Incomplete,
}

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions
    pub total_requests: usize,
    /// Submissions per second
    pub requests_per_second: f64,
    /// Number of distinct clients, used round-robin
    pub unique_clients: usize,
    /// Submission content
    pub payload: Payload,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            requests_per_second: 10.0,
            unique_clients: 1,
            payload: Payload::Legitimate,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// One client submitting clean content far faster than the window allows.
    pub fn single_client_flood() -> Self {
        Self {
            total_requests: 200,
            requests_per_second: 20.0,
            ..Default::default()
        }
    }

    /// One client pushing keyword spam at speed.
    pub fn spam_flood() -> Self {
        Self {
            total_requests: 60,
            requests_per_second: 5.0,
            payload: Payload::Spam,
            ..Default::default()
        }
    }

    /// Many clients, each below the velocity limit.
    pub fn distributed_spam() -> Self {
        Self {
            total_requests: 500,
            requests_per_second: 50.0,
            unique_clients: 250,
            payload: Payload::Spam,
        }
    }

    /// Throwaway mailboxes from a handful of clients.
    pub fn disposable_campaign() -> Self {
        Self {
            total_requests: 50,
            unique_clients: 10,
            payload: Payload::Disposable,
            ..Default::default()
        }
    }

    /// Scripted submissions that skip required fields.
    pub fn missing_fields_attack() -> Self {
        Self {
            total_requests: 60,
            unique_clients: 5,
            payload: Payload::Incomplete,
            ..Default::default()
        }
    }

    /// One client staying just under the velocity limit.
    pub fn slow_drip() -> Self {
        Self {
            total_requests: 40,
            // 5 per 60s window
            requests_per_second: 1.0 / 12.5,
            ..Default::default()
        }
    }

    /// Simulated time of the `index`th submission.
    pub fn offset(&self, index: usize) -> ChronoDuration {
        let millis = index as f64 * 1000.0 / self.requests_per_second;
        ChronoDuration::milliseconds(millis as i64)
    }

    /// Get expected outcomes for this attack pattern.
    pub fn expectations(&self) -> AttackExpectations {
        match self.payload {
            Payload::Incomplete => AttackExpectations {
                max_accepted_ratio: 0.0,
                min_velocity_flagged_ratio: 0.0,
                description: "Every submission fails field validation",
            },
            Payload::Spam if self.per_client_per_window() > 5.0 => AttackExpectations {
                max_accepted_ratio: 0.2,
                min_velocity_flagged_ratio: 0.8,
                description: "Keyword spam over the velocity limit is held for review",
            },
            Payload::Spam | Payload::Disposable => AttackExpectations {
                max_accepted_ratio: 1.0,
                min_velocity_flagged_ratio: 0.0,
                description: "Single signals under the velocity limit only raise the score",
            },
            Payload::Legitimate => AttackExpectations {
                max_accepted_ratio: 1.0,
                min_velocity_flagged_ratio: if self.per_client_per_window() > 5.0 { 0.9 } else { 0.0 },
                description: "Clean content is accepted, excess velocity is flagged",
            },
        }
    }

    /// Submissions each client makes in its busiest 60-second window.
    fn per_client_per_window(&self) -> f64 {
        let per_window = (self.requests_per_second * 60.0).min(self.total_requests as f64);
        per_window / self.unique_clients as f64
    }
}

/// Expected outcomes for different attack types.
pub struct AttackExpectations {
    /// Maximum ratio of submissions that may be accepted
    pub max_accepted_ratio: f64,
    /// Minimum ratio that must carry a velocity warning
    pub min_velocity_flagged_ratio: f64,
    /// Description of expected behavior
    pub description: &'static str,
}
