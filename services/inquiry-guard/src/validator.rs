// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact/inquiry submission validator.
//!
//! Implements the ingress checks for form submissions:
//! - Required field presence and shape
//! - Email format and blocked email domains
//! - Content heuristics (see [`crate::scanner`])
//! - Per-client velocity (see [`crate::limiter`])
//! - Denylisted clients, addresses and domains
//!
//! The validator only scores. Turning a result into accept / review / reject
//! is [`Disposition::decide`], driven by [`RiskThresholds`].

use crate::config::{Config, FailPolicy, RateLimitConfig, RiskThresholds, ValidationConfig};
use crate::denylist::Denylist;
use crate::error::GuardError;
use crate::limiter::{RateLimitStore, WindowSnapshot};
use crate::scanner::ContentScanner;
use crate::submission::{FieldError, FormKind, FormSubmission, TEXT_FIELDS};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Serialize, Serializer};
use std::fmt::Display;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Highest possible risk score.
pub const MAX_RISK: u8 = 100;

/// Problems that make a submission invalid.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} required")]
    MissingField(&'static str),

    #[error("{0} must be text")]
    InvalidFieldType(&'static str),

    #[error("{field} must be at least {min} characters")]
    TooShort { field: &'static str, min: usize },

    #[error("{field} cannot exceed {max} characters")]
    TooLong { field: &'static str, max: usize },

    #[error("invalid email")]
    MalformedEmail,

    #[error("email domain {domain} is not allowed")]
    BlockedDomain { domain: String },

    #[error("unknown form type")]
    UnknownFormType,

    #[error("submission must be a JSON object")]
    MalformedPayload,

    #[error("submission rejected")]
    Denylisted,

    #[error("submission cannot be verified right now")]
    DenylistUnavailable,
}

/// Advisory findings that raise the risk score without invalidating.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RiskWarning {
    #[error("too many submissions: {count} in the current window (limit {max})")]
    HighVelocity { count: u32, max: u32 },

    #[error("message contains potentially suspicious words: {}", .0.join(", "))]
    SpamKeywords(Vec<String>),

    #[error("message contains too many links ({0})")]
    TooManyLinks(usize),

    #[error("message contains suspicious patterns")]
    SuspiciousPattern,

    #[error("message contains excessive repeated characters")]
    RepeatedCharacters,

    #[error("message contains excessive uppercase text")]
    Shouting,

    #[error("message is unusually short")]
    ShortMessage,

    #[error("message is unusually long")]
    WallOfText,

    #[error("name contains unusual characters")]
    UnusualName,

    #[error("phone number format may be invalid")]
    PhoneFormat,

    #[error("email domain {domain} is not in the allowed list")]
    DomainNotAllowed { domain: String },

    #[error("email domain {domain} looks like a temporary mail service")]
    DisposableDomain { domain: String },

    #[error("denylist could not be consulted")]
    DenylistUnavailable,
}

/// Outcome of validating one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    #[serde(serialize_with = "as_messages")]
    pub errors: Vec<ValidationError>,
    #[serde(serialize_with = "as_messages")]
    pub warnings: Vec<RiskWarning>,
    pub risk_score: u8,
}

fn as_messages<S, T>(items: &[T], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Display,
{
    serializer.collect_seq(items.iter().map(ToString::to_string))
}

impl ValidationResult {
    /// Error messages, as shown to the submitter.
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    /// Warning messages.
    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn has_error(&self, error: &ValidationError) -> bool {
        self.errors.contains(error)
    }

    pub fn is_rate_limited(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, RiskWarning::HighVelocity { .. }))
    }
}

/// What the caller should do with a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    Accept,
    ManualReview,
    Reject,
}

impl Disposition {
    /// Reject invalid or maximal-risk submissions, hold high-risk ones for
    /// review, accept the rest.
    pub fn decide(result: &ValidationResult, thresholds: &RiskThresholds) -> Self {
        if !result.is_valid || result.risk_score >= thresholds.reject_at {
            Self::Reject
        } else if result.risk_score > thresholds.review_above {
            Self::ManualReview
        } else {
            Self::Accept
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::ManualReview => "manual_review",
            Self::Reject => "reject",
        }
    }
}

/// Format checks that do not depend on configuration.
#[derive(Debug)]
struct FieldRules {
    email: Regex,
    name: Regex,
    phone: Regex,
    phone_separators: Regex,
}

impl FieldRules {
    fn new() -> Result<Self, GuardError> {
        let compile = |pattern: &str| {
            Regex::new(pattern).map_err(|source| GuardError::Pattern {
                pattern: pattern.to_string(),
                source,
            })
        };
        Ok(Self {
            email: compile(
                r#"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$"#,
            )?,
            name: compile(r"^[\p{L}\p{M}\s.'\-]+$")?,
            phone: compile(r"^\+?[1-9]\d{0,15}$")?,
            phone_separators: compile(r"[\s\-().]")?,
        })
    }

    fn is_email(&self, email: &str) -> bool {
        email.len() <= 254 && self.email.is_match(email)
    }
}

/// Accumulates errors, warnings and points for one submission.
#[derive(Debug, Default)]
struct Assessment {
    errors: Vec<ValidationError>,
    warnings: Vec<RiskWarning>,
    points: u32,
}

impl Assessment {
    fn warn(&mut self, warning: RiskWarning, points: u8) {
        self.warnings.push(warning);
        self.points += u32::from(points);
    }

    fn finish(self, denylisted: bool) -> ValidationResult {
        let risk_score = if denylisted {
            MAX_RISK
        } else {
            self.points.min(u32::from(MAX_RISK)) as u8
        };
        ValidationResult {
            is_valid: self.errors.is_empty(),
            errors: self.errors,
            warnings: self.warnings,
            risk_score,
        }
    }
}

/// Form submission validator.
pub struct RequestValidator {
    validation: ValidationConfig,
    rate_limit: RateLimitConfig,
    on_unavailable: FailPolicy,
    rules: FieldRules,
    scanner: ContentScanner,
    limiter: Arc<dyn RateLimitStore>,
    denylist: Arc<dyn Denylist>,
}

impl RequestValidator {
    /// Create a new validator with the given configuration and collaborators.
    pub fn new(
        config: &Config,
        limiter: Arc<dyn RateLimitStore>,
        denylist: Arc<dyn Denylist>,
    ) -> Result<Self, GuardError> {
        Ok(Self {
            validation: config.validation.clone(),
            rate_limit: config.rate_limit.clone(),
            on_unavailable: config.denylist.on_unavailable,
            rules: FieldRules::new()?,
            scanner: ContentScanner::new(config.spam.clone())?,
            limiter,
            denylist,
        })
    }

    pub fn limiter(&self) -> &Arc<dyn RateLimitStore> {
        &self.limiter
    }

    pub fn denylist(&self) -> &Arc<dyn Denylist> {
        &self.denylist
    }

    pub fn spam_detection_enabled(&self) -> bool {
        self.scanner.enabled()
    }

    /// Validate a submission from `client_id`, counting it against the
    /// client's window.
    pub fn validate(&self, payload: &FormSubmission, client_id: &str) -> ValidationResult {
        self.validate_at(payload, client_id, Utc::now())
    }

    /// [`validate`](Self::validate) with an explicit clock.
    pub fn validate_at(
        &self,
        payload: &FormSubmission,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        let window = self.limiter.check_and_increment(client_id, now);
        self.assess(payload, client_id, &window)
    }

    /// Score a submission against an already-counted window. Performs no
    /// mutation, so equal inputs give equal results.
    pub fn assess(
        &self,
        payload: &FormSubmission,
        client_id: &str,
        window: &WindowSnapshot,
    ) -> ValidationResult {
        let mut assessment = Assessment::default();

        let kind = payload.kind();
        self.check_fields(payload, kind, &mut assessment);

        if assessment.errors.is_empty() {
            self.score_content(payload, kind.unwrap_or(FormKind::Contact), &mut assessment);
        }

        if window.exceeds(self.rate_limit.max_requests) {
            warn!(
                client = %client_id,
                count = window.count,
                max = self.rate_limit.max_requests,
                "Submission velocity exceeded"
            );
            assessment.warn(
                RiskWarning::HighVelocity {
                    count: window.count,
                    max: self.rate_limit.max_requests,
                },
                self.rate_limit.velocity_penalty,
            );
        }

        let denylisted = self.check_denylist(payload, client_id, &mut assessment);

        let result = assessment.finish(denylisted);
        debug!(
            client = %client_id,
            kind = ?kind,
            valid = result.is_valid,
            risk_score = result.risk_score,
            errors = result.errors.len(),
            warnings = result.warnings.len(),
            "Submission assessed"
        );
        result
    }

    fn check_fields(
        &self,
        payload: &FormSubmission,
        kind: Option<FormKind>,
        assessment: &mut Assessment,
    ) {
        if payload.is_malformed() {
            assessment.errors.push(ValidationError::MalformedPayload);
        }

        for &field in TEXT_FIELDS {
            if field != "type" && payload.text(field) == Err(FieldError::NotText) {
                assessment.errors.push(ValidationError::InvalidFieldType(field));
            }
        }

        if kind.is_none() {
            assessment.errors.push(ValidationError::UnknownFormType);
        }

        for &field in kind.unwrap_or(FormKind::Contact).required_fields() {
            if payload.text(field).is_ok() && payload.trimmed(field).is_none() {
                assessment.errors.push(ValidationError::MissingField(field));
            }
        }

        let limits = &self.validation;
        if let Some(name) = payload.trimmed("name") {
            check_length(assessment, "name", name, 2, limits.max_name_chars);
        }
        if let Some(company) = payload.trimmed("company") {
            check_length(assessment, "company", company, 2, limits.max_company_chars);
        }
        if let Some(message) = payload.trimmed("message") {
            check_length(assessment, "message", message, 0, limits.max_message_chars);
        }
        for field in ["subject", "productInterest"] {
            if let Some(text) = payload.trimmed(field) {
                check_length(assessment, field, text, 0, limits.max_subject_chars);
            }
        }

        if let Some(email) = payload.email() {
            if !self.rules.is_email(email) {
                debug!(email = %email, "Malformed email");
                assessment.errors.push(ValidationError::MalformedEmail);
            } else if let Some(domain) = payload.email_domain() {
                if contains_ignore_case(&limits.blocked_domains, &domain) {
                    assessment.points += u32::from(limits.blocked_domain_points);
                    assessment.errors.push(ValidationError::BlockedDomain { domain });
                }
            }
        }
    }

    fn score_content(&self, payload: &FormSubmission, kind: FormKind, assessment: &mut Assessment) {
        let subject = match kind {
            FormKind::Contact => payload.trimmed("subject"),
            FormKind::Inquiry => payload.trimmed("productInterest"),
        }
        .unwrap_or("");
        let message = payload.trimmed("message").unwrap_or("");

        for finding in self.scanner.scan(subject, message) {
            assessment.warnings.push(finding.warning);
            assessment.points += finding.points;
        }

        let limits = &self.validation;

        if let Some(name) = payload.trimmed("name") {
            if !self.rules.name.is_match(name) {
                assessment.warn(RiskWarning::UnusualName, limits.unusual_name_points);
            }
        }

        if let Some(phone) = payload.trimmed("phone") {
            let digits = self.rules.phone_separators.replace_all(phone, "");
            if !self.rules.phone.is_match(&digits) {
                assessment.warn(RiskWarning::PhoneFormat, limits.phone_points);
            }
        }

        if let Some(domain) = payload.email_domain() {
            if !limits.allowed_domains.is_empty()
                && !contains_ignore_case(&limits.allowed_domains, &domain)
            {
                assessment.warn(
                    RiskWarning::DomainNotAllowed {
                        domain: domain.clone(),
                    },
                    limits.allowed_domain_points,
                );
            }
            if limits
                .disposable_hints
                .iter()
                .any(|hint| !hint.is_empty() && domain.contains(&hint.to_lowercase()))
            {
                assessment.warn(
                    RiskWarning::DisposableDomain { domain },
                    limits.disposable_points,
                );
            }
        }
    }

    /// Returns true when any identifier is denylisted.
    fn check_denylist(
        &self,
        payload: &FormSubmission,
        client_id: &str,
        assessment: &mut Assessment,
    ) -> bool {
        let email = payload.email().map(str::to_string);
        let domain = payload.email_domain();
        let identifiers = std::iter::once(Some(client_id.to_string()))
            .chain([email, domain])
            .flatten();

        let mut unavailable = None;
        for identifier in identifiers {
            match self.denylist.contains(&identifier) {
                Ok(true) => {
                    info!(client = %client_id, identifier = %identifier, "Denylisted submission");
                    assessment.errors.push(ValidationError::Denylisted);
                    return true;
                }
                Ok(false) => {}
                Err(e) => unavailable = Some(e),
            }
        }

        if let Some(e) = unavailable {
            warn!(error = %e, policy = ?self.on_unavailable, "Denylist unavailable");
            match self.on_unavailable {
                FailPolicy::Open => assessment.warnings.push(RiskWarning::DenylistUnavailable),
                FailPolicy::Closed => assessment.errors.push(ValidationError::DenylistUnavailable),
            }
        }
        false
    }
}

fn check_length(
    assessment: &mut Assessment,
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min {
        assessment.errors.push(ValidationError::TooShort { field, min });
    } else if len > max {
        assessment.errors.push(ValidationError::TooLong { field, max });
    }
}

fn contains_ignore_case(list: &[String], value: &str) -> bool {
    list.iter().any(|entry| entry.eq_ignore_ascii_case(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::denylist::MemoryDenylist;
    use crate::limiter::InMemoryRateLimitStore;
    use chrono::Duration as ChronoDuration;
    use serde_json::json;

    struct Unavailable;

    impl Denylist for Unavailable {
        fn contains(&self, _identifier: &str) -> Result<bool, GuardError> {
            Err(GuardError::Denylist("store offline".to_string()))
        }

        fn len(&self) -> usize {
            0
        }
    }

    fn validator_with(config: &Config, denylist: Arc<dyn Denylist>) -> RequestValidator {
        let limiter = Arc::new(InMemoryRateLimitStore::new(&config.rate_limit));
        RequestValidator::new(config, limiter, denylist).unwrap()
    }

    fn default_validator() -> RequestValidator {
        validator_with(&Config::default(), Arc::new(MemoryDenylist::new()))
    }

    fn good_contact() -> FormSubmission {
        FormSubmission::from_value(json!({
            "type": "contact",
            "name": "María López",
            "email": "maria@cables.example.es",
            "company": "Cables Ibéricos",
            "subject": "Busbar systems",
            "message": "Could you send the datasheet for your 2500 A busbar trunking?"
        }))
    }

    #[test]
    fn test_well_formed_submission_is_low_risk() {
        let result = default_validator().validate(&good_contact(), "192.0.2.10");
        assert!(result.is_valid, "errors: {:?}", result.errors);
        assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
        assert_eq!(result.risk_score, 0);
        assert_eq!(
            Disposition::decide(&result, &RiskThresholds::default()),
            Disposition::Accept
        );
    }

    #[test]
    fn test_missing_name_and_bad_email() {
        let payload = FormSubmission::from_value(json!({"name": "", "email": "bad", "message": "hi"}));
        let result = default_validator().validate(&payload, "192.0.2.11");

        assert!(!result.is_valid);
        let messages = result.error_messages();
        assert!(messages.contains(&"name required".to_string()), "{:?}", messages);
        assert!(messages.contains(&"invalid email".to_string()), "{:?}", messages);
    }

    #[test]
    fn test_inquiry_requires_company() {
        let payload = FormSubmission::from_value(json!({
            "type": "inquiry",
            "name": "Li Wei",
            "email": "li@example.com",
            "message": "Quote for fire-resistant cable please."
        }));
        let result = default_validator().validate(&payload, "192.0.2.12");
        assert!(result.has_error(&ValidationError::MissingField("company")));
    }

    #[test]
    fn test_wrong_types_become_errors() {
        let payload = FormSubmission::from_value(json!({
            "name": ["not", "text"],
            "email": "ok@example.com",
            "message": "A perfectly ordinary question."
        }));
        let result = default_validator().validate(&payload, "192.0.2.13");
        assert!(result.has_error(&ValidationError::InvalidFieldType("name")));
        assert!(!result.has_error(&ValidationError::MissingField("name")));
    }

    #[test]
    fn test_null_payload_is_invalid_not_fatal() {
        let result = default_validator().validate(&FormSubmission::from_value(json!(null)), "x");
        assert!(!result.is_valid);
        assert!(result.has_error(&ValidationError::MalformedPayload));
        assert!(result.has_error(&ValidationError::MissingField("email")));
    }

    #[test]
    fn test_unknown_form_type() {
        let payload = FormSubmission::from_value(json!({"type": "newsletter"}));
        let result = default_validator().validate(&payload, "x");
        assert!(result.has_error(&ValidationError::UnknownFormType));
    }

    #[test]
    fn test_heuristics_skipped_for_invalid_payload() {
        let payload = FormSubmission::from_value(json!({
            "name": "",
            "email": "promo@example.com",
            "message": "casino lottery winner, click here"
        }));
        let result = default_validator().validate(&payload, "192.0.2.14");
        assert!(!result.is_valid);
        assert!(result.warnings.is_empty());
        assert_eq!(result.risk_score, 0);
    }

    #[test]
    fn test_velocity_penalty_after_threshold() {
        let validator = default_validator();
        let t0 = Utc::now();

        for i in 0..5 {
            let result = validator.validate_at(&good_contact(), "198.51.100.20", t0 + ChronoDuration::seconds(i));
            assert!(!result.is_rate_limited(), "request {} penalised", i + 1);
            assert_eq!(result.risk_score, 0);
        }

        let sixth = validator.validate_at(&good_contact(), "198.51.100.20", t0 + ChronoDuration::seconds(5));
        assert!(sixth.is_rate_limited());
        assert_eq!(sixth.risk_score, 40);
        assert!(sixth.is_valid);
    }

    #[test]
    fn test_window_expiry_resets_velocity() {
        let validator = default_validator();
        let t0 = Utc::now();

        for _ in 0..6 {
            validator.validate_at(&good_contact(), "198.51.100.21", t0);
        }
        let later = validator.validate_at(&good_contact(), "198.51.100.21", t0 + ChronoDuration::seconds(61));
        assert!(!later.is_rate_limited());
        assert_eq!(later.risk_score, 0);
    }

    #[test]
    fn test_denylisted_identifiers_force_max_risk() {
        let denylist = Arc::new(MemoryDenylist::new());
        denylist.add("203.0.113.66");
        denylist.add("spam.example");
        denylist.add("bot@example.org");
        let validator = validator_with(&Config::default(), denylist);

        let by_ip = validator.validate(&good_contact(), "203.0.113.66");
        assert_eq!(by_ip.risk_score, MAX_RISK);
        assert!(!by_ip.is_valid);
        assert!(by_ip.has_error(&ValidationError::Denylisted));

        for email in ["sales@spam.example", "bot@example.org"] {
            let payload = FormSubmission::from_value(json!({
                "name": "Plain Name",
                "email": email,
                "message": "Normal looking request for a cable quote."
            }));
            let result = validator.validate(&payload, "192.0.2.30");
            assert_eq!(result.risk_score, MAX_RISK, "{}", email);
            assert!(!result.is_valid);
        }
    }

    #[test]
    fn test_denylist_outage_fails_open_by_default() {
        let validator = validator_with(&Config::default(), Arc::new(Unavailable));
        let result = validator.validate(&good_contact(), "192.0.2.40");
        assert!(result.is_valid);
        assert!(result.warnings.contains(&RiskWarning::DenylistUnavailable));
    }

    #[test]
    fn test_denylist_outage_fails_closed_when_configured() {
        let mut config = Config::default();
        config.denylist.on_unavailable = FailPolicy::Closed;
        let validator = validator_with(&config, Arc::new(Unavailable));
        let result = validator.validate(&good_contact(), "192.0.2.41");
        assert!(!result.is_valid);
        assert!(result.has_error(&ValidationError::DenylistUnavailable));
    }

    #[test]
    fn test_blocked_domain_is_an_error() {
        let payload = FormSubmission::from_value(json!({
            "name": "Temp User",
            "email": "someone@mailinator.com",
            "message": "Requesting a catalogue for our warehouse."
        }));
        let result = default_validator().validate(&payload, "192.0.2.50");
        assert!(result.has_error(&ValidationError::BlockedDomain {
            domain: "mailinator.com".to_string()
        }));
        assert_eq!(result.risk_score, 50);
    }

    #[test]
    fn test_disposable_and_unusual_name_warnings() {
        let payload = FormSubmission::from_value(json!({
            "name": "B0t_01",
            "email": "x@faketrash.example",
            "phone": "call me",
            "message": "Requesting a catalogue for our warehouse."
        }));
        let result = default_validator().validate(&payload, "192.0.2.51");
        assert!(result.is_valid);
        assert!(result.warnings.contains(&RiskWarning::UnusualName));
        assert!(result.warnings.contains(&RiskWarning::PhoneFormat));
        assert!(result.warnings.contains(&RiskWarning::DisposableDomain {
            domain: "faketrash.example".to_string()
        }));
        assert_eq!(result.risk_score, 10 + 5 + 30);
    }

    #[test]
    fn test_score_is_clamped() {
        let payload = FormSubmission::from_value(json!({
            "name": "Winner",
            "email": "promo@example.com",
            "subject": "URGENT URGENT URGENT",
            "message": "CONGRATULATIONS WINNER!!!!! CLICK HERE FOR FREE MONEY, CASINO AND LOTTERY, ACT NOW, NO RISK, GUARANTEED http://a.example http://b.example http://c.example http://d.example http://e.example"
        }));
        let result = default_validator().validate(&payload, "192.0.2.52");
        assert!(result.is_valid);
        assert_eq!(result.risk_score, MAX_RISK);
        assert_eq!(
            Disposition::decide(&result, &RiskThresholds::default()),
            Disposition::Reject
        );
    }

    #[test]
    fn test_assess_is_deterministic() {
        let validator = default_validator();
        let now = Utc::now();
        let window = WindowSnapshot {
            count: 7,
            window_start: now,
            resets_at: now + ChronoDuration::seconds(60),
        };
        let first = validator.assess(&good_contact(), "192.0.2.60", &window);
        let second = validator.assess(&good_contact(), "192.0.2.60", &window);
        assert_eq!(first, second);
        assert!(first.is_rate_limited());
    }

    #[test]
    fn test_disposition_thresholds() {
        let thresholds = RiskThresholds::default();
        let result = |score, valid| ValidationResult {
            is_valid: valid,
            errors: Vec::new(),
            warnings: Vec::new(),
            risk_score: score,
        };
        assert_eq!(Disposition::decide(&result(70, true), &thresholds), Disposition::Accept);
        assert_eq!(Disposition::decide(&result(71, true), &thresholds), Disposition::ManualReview);
        assert_eq!(Disposition::decide(&result(100, true), &thresholds), Disposition::Reject);
        assert_eq!(Disposition::decide(&result(0, false), &thresholds), Disposition::Reject);
    }

    #[test]
    fn test_result_serializes_messages() {
        let result = ValidationResult {
            is_valid: false,
            errors: vec![ValidationError::MissingField("name")],
            warnings: vec![RiskWarning::TooManyLinks(4)],
            risk_score: 10,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["isValid"], json!(false));
        assert_eq!(value["errors"], json!(["name required"]));
        assert_eq!(value["warnings"], json!(["message contains too many links (4)"]));
    }
}
