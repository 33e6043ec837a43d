// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Service-level error types.
//!
//! Validation outcomes are not errors; they live in
//! [`crate::validator::ValidationResult`]. These cover startup and the I/O
//! collaborators around the validator.

use thiserror::Error;

/// Application error types
#[derive(Debug, Error)]
pub enum GuardError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Denylist unavailable: {0}")]
    Denylist(String),

    #[error("Mail delivery failed: {0}")]
    Mail(String),

    #[error("Submission store error: {0}")]
    Store(String),

    #[error("Metrics error: {0}")]
    Metrics(#[from] prometheus::Error),
}

