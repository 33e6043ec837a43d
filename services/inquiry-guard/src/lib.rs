// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Inquiry Guard
//!
//! Ingress protection for website contact and inquiry forms:
//!
//! - Required-field, length and email checks per form type
//! - Additive 0-100 risk score from content heuristics
//! - Per-client velocity limiting over a fixed window
//! - Denylisted clients, addresses and domains
//! - Accept / manual review / reject dispositions
//! - EN/ES notification emails over console or SMTP, with an audit store

pub mod client;
pub mod config;
pub mod denylist;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod mail;
pub mod metrics;
pub mod scanner;
pub mod store;
pub mod submission;
pub mod validator;

pub use config::Config;
pub use error::GuardError;
pub use limiter::{InMemoryRateLimitStore, RateLimitStore};
pub use submission::{FormKind, FormSubmission};
pub use validator::{Disposition, RequestValidator, ValidationResult};
