// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the inquiry guard service.
//!
//! Everything here is static: it is read once at startup and handed to the
//! validator, limiter and mail transport by value. Loading layers, lowest
//! precedence first:
//!
//! 1. compiled defaults (the `default_*` functions below)
//! 2. an optional TOML file (`INQUIRY_GUARD_CONFIG`, default `inquiry-guard.toml`)
//! 3. `INQUIRY_GUARD__*` environment variables, `__` separating sections
//!    (e.g. `INQUIRY_GUARD__RATE_LIMIT__MAX_REQUESTS=10`)

use crate::error::GuardError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "INQUIRY_GUARD_CONFIG";

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "INQUIRY_GUARD";

/// Longest accepted rate-limit window: one week.
pub const MAX_WINDOW_SECS: u64 = 7 * 24 * 60 * 60;

/// Configuration for the inquiry guard service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Per-client velocity limiting
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// Content heuristics
    #[serde(default)]
    pub spam: SpamConfig,

    /// Field and email-domain rules
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Disposition thresholds applied by the caller
    #[serde(default)]
    pub thresholds: RiskThresholds,

    /// Denylist source
    #[serde(default)]
    pub denylist: DenylistConfig,

    /// Notification delivery
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Velocity limiting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Window length in seconds (default: 60)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Requests allowed per window before the penalty applies (default: 5)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Risk points added once a client exceeds `max_requests` (default: 40)
    #[serde(default = "default_velocity_penalty")]
    pub velocity_penalty: u8,

    /// Interval of the background sweep of expired windows (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// Spam heuristics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpamConfig {
    /// Run content heuristics at all (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Case-insensitive keywords that indicate spam
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Points per distinct keyword hit (default: 15)
    #[serde(default = "default_keyword_points")]
    pub keyword_points: u8,

    /// Links tolerated before scoring (default: 3)
    #[serde(default = "default_max_links")]
    pub max_links: usize,

    /// Points per link above `max_links` (default: 10)
    #[serde(default = "default_link_points")]
    pub link_points: u8,

    /// Regular expressions matched against subject and message as submitted
    #[serde(default = "default_suspicious_patterns")]
    pub suspicious_patterns: Vec<String>,

    /// Points per matching suspicious pattern (default: 20)
    #[serde(default = "default_pattern_points")]
    pub pattern_points: u8,

    /// Length of a run of one repeated character that counts as noise (default: 5)
    #[serde(default = "default_repeated_char_run")]
    pub repeated_char_run: usize,

    /// Points for a repeated-character run (default: 15)
    #[serde(default = "default_repeated_char_points")]
    pub repeated_char_points: u8,

    /// Points when most letters are uppercase (default: 20)
    #[serde(default = "default_shouting_points")]
    pub shouting_points: u8,

    /// Messages shorter than this are suspicious (default: 10)
    #[serde(default = "default_min_message_chars")]
    pub min_message_chars: usize,

    /// Points for a too-short message (default: 10)
    #[serde(default = "default_short_message_points")]
    pub short_message_points: u8,

    /// Messages longer than this look pasted (default: 2000)
    #[serde(default = "default_wall_of_text_chars")]
    pub wall_of_text_chars: usize,

    /// Points for a pasted wall of text (default: 15)
    #[serde(default = "default_wall_of_text_points")]
    pub wall_of_text_points: u8,
}

/// Field validation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Maximum name length in characters (default: 50)
    #[serde(default = "default_max_name_chars")]
    pub max_name_chars: usize,

    /// Maximum company length in characters (default: 100)
    #[serde(default = "default_max_company_chars")]
    pub max_company_chars: usize,

    /// Hard cap on message length (default: 5000)
    #[serde(default = "default_max_message_chars")]
    pub max_message_chars: usize,

    /// Hard cap on subject / product interest length (default: 200)
    #[serde(default = "default_max_subject_chars")]
    pub max_subject_chars: usize,

    /// Email domains rejected outright (disposable providers)
    #[serde(default = "default_blocked_domains")]
    pub blocked_domains: Vec<String>,

    /// When non-empty, domains outside this list are scored
    #[serde(default)]
    pub allowed_domains: Vec<String>,

    /// Points for a blocked domain (default: 50)
    #[serde(default = "default_blocked_domain_points")]
    pub blocked_domain_points: u8,

    /// Points for a domain outside `allowed_domains` (default: 20)
    #[serde(default = "default_allowed_domain_points")]
    pub allowed_domain_points: u8,

    /// Substrings marking a throwaway mail provider
    #[serde(default = "default_disposable_hints")]
    pub disposable_hints: Vec<String>,

    /// Points for a domain matching a disposable hint (default: 30)
    #[serde(default = "default_disposable_points")]
    pub disposable_points: u8,

    /// Points for a name with unusual characters (default: 10)
    #[serde(default = "default_unusual_name_points")]
    pub unusual_name_points: u8,

    /// Points for an implausible phone number (default: 5)
    #[serde(default = "default_phone_points")]
    pub phone_points: u8,
}

/// Risk-score thresholds used to turn a result into a disposition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskThresholds {
    /// Scores at or above this are logged at warn level (default: 30)
    #[serde(default = "default_warn_at")]
    pub warn_at: u8,

    /// Scores above this need manual review (default: 70)
    #[serde(default = "default_review_above")]
    pub review_above: u8,

    /// Scores at or above this are rejected (default: 100)
    #[serde(default = "default_reject_at")]
    pub reject_at: u8,
}

/// What to do when the denylist cannot be consulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailPolicy {
    /// Continue, attaching a warning
    #[default]
    Open,
    /// Treat the submission as invalid
    Closed,
}

/// Denylist configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DenylistConfig {
    /// Denylisted client addresses
    #[serde(default)]
    pub ips: Vec<String>,

    /// Denylisted email addresses
    #[serde(default)]
    pub emails: Vec<String>,

    /// Denylisted email domains
    #[serde(default)]
    pub domains: Vec<String>,

    /// Optional file with one identifier per line (`#` starts a comment)
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Seconds between re-reads of `file` (default: 300)
    #[serde(default = "default_reload_interval_secs")]
    pub reload_interval_secs: u64,

    /// Behaviour when the denylist source fails (default: open)
    #[serde(default)]
    pub on_unavailable: FailPolicy,
}

/// Which transport delivers notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailTransport {
    /// Log the rendered email
    #[default]
    Console,
    /// Relay over SMTP
    Smtp,
}

/// Notification delivery configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default)]
    pub transport: MailTransport,

    #[serde(default = "default_from_address")]
    pub from_address: String,

    /// Recipient of contact-form notifications
    #[serde(default = "default_contact_recipient")]
    pub contact_recipient: String,

    /// Recipient of inquiry-form notifications
    #[serde(default = "default_inquiry_recipient")]
    pub inquiry_recipient: String,

    #[serde(default)]
    pub smtp_host: String,

    #[serde(default = "default_smtp_port")]
    pub smtp_port: u16,

    #[serde(default)]
    pub smtp_username: String,

    #[serde(default)]
    pub smtp_password: String,

    /// Delivery attempts per notification, the first included (default: 3)
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,

    /// Base delay between attempts; attempt `n` waits `n * retry_delay_ms` (default: 1000)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_window_secs() -> u64 {
    60
}

fn default_max_requests() -> u32 {
    5
}

fn default_velocity_penalty() -> u8 {
    40
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_true() -> bool {
    true
}

fn default_keywords() -> Vec<String> {
    [
        "spam",
        "scam",
        "free money",
        "click here",
        "urgent",
        "limited time",
        "act now",
        "guaranteed",
        "no risk",
        "viagra",
        "casino",
        "lottery",
        "winner",
        "congratulations",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_keyword_points() -> u8 {
    15
}

fn default_max_links() -> usize {
    3
}

fn default_link_points() -> u8 {
    10
}

fn default_suspicious_patterns() -> Vec<String> {
    vec![
        // card-number-like digit groups
        r"\b\d{4}[-\s]?\d{4}[-\s]?\d{4}[-\s]?\d{4}\b".to_string(),
        // three shouted words in a row
        r"\b[A-Z]{2,}\s+[A-Z]{2,}\s+[A-Z]{2,}\b".to_string(),
    ]
}

fn default_pattern_points() -> u8 {
    20
}

fn default_repeated_char_run() -> usize {
    5
}

fn default_repeated_char_points() -> u8 {
    15
}

fn default_shouting_points() -> u8 {
    20
}

fn default_min_message_chars() -> usize {
    10
}

fn default_short_message_points() -> u8 {
    10
}

fn default_wall_of_text_chars() -> usize {
    2000
}

fn default_wall_of_text_points() -> u8 {
    15
}

fn default_max_name_chars() -> usize {
    50
}

fn default_max_company_chars() -> usize {
    100
}

fn default_max_message_chars() -> usize {
    5000
}

fn default_max_subject_chars() -> usize {
    200
}

fn default_blocked_domains() -> Vec<String> {
    [
        "tempmail.org",
        "10minutemail.com",
        "guerrillamail.com",
        "mailinator.com",
        "throwaway.email",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_blocked_domain_points() -> u8 {
    50
}

fn default_allowed_domain_points() -> u8 {
    20
}

fn default_disposable_hints() -> Vec<String> {
    ["temp", "disposable", "throwaway", "fake", "trash"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_disposable_points() -> u8 {
    30
}

fn default_unusual_name_points() -> u8 {
    10
}

fn default_phone_points() -> u8 {
    5
}

fn default_warn_at() -> u8 {
    30
}

fn default_review_above() -> u8 {
    70
}

fn default_reject_at() -> u8 {
    100
}

fn default_from_address() -> String {
    "Website Forms <noreply@localhost>".to_string()
}

fn default_contact_recipient() -> String {
    "contact@localhost".to_string()
}

fn default_inquiry_recipient() -> String {
    "inquiry@localhost".to_string()
}

fn default_smtp_port() -> u16 {
    587
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_reload_interval_secs() -> u64 {
    300
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            spam: SpamConfig::default(),
            validation: ValidationConfig::default(),
            thresholds: RiskThresholds::default(),
            denylist: DenylistConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: default_window_secs(),
            max_requests: default_max_requests(),
            velocity_penalty: default_velocity_penalty(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for SpamConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            keywords: default_keywords(),
            keyword_points: default_keyword_points(),
            max_links: default_max_links(),
            link_points: default_link_points(),
            suspicious_patterns: default_suspicious_patterns(),
            pattern_points: default_pattern_points(),
            repeated_char_run: default_repeated_char_run(),
            repeated_char_points: default_repeated_char_points(),
            shouting_points: default_shouting_points(),
            min_message_chars: default_min_message_chars(),
            short_message_points: default_short_message_points(),
            wall_of_text_chars: default_wall_of_text_chars(),
            wall_of_text_points: default_wall_of_text_points(),
        }
    }
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            max_name_chars: default_max_name_chars(),
            max_company_chars: default_max_company_chars(),
            max_message_chars: default_max_message_chars(),
            max_subject_chars: default_max_subject_chars(),
            blocked_domains: default_blocked_domains(),
            allowed_domains: Vec::new(),
            blocked_domain_points: default_blocked_domain_points(),
            allowed_domain_points: default_allowed_domain_points(),
            disposable_hints: default_disposable_hints(),
            disposable_points: default_disposable_points(),
            unusual_name_points: default_unusual_name_points(),
            phone_points: default_phone_points(),
        }
    }
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            warn_at: default_warn_at(),
            review_above: default_review_above(),
            reject_at: default_reject_at(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            transport: MailTransport::default(),
            from_address: default_from_address(),
            contact_recipient: default_contact_recipient(),
            inquiry_recipient: default_inquiry_recipient(),
            smtp_host: String::new(),
            smtp_port: default_smtp_port(),
            smtp_username: String::new(),
            smtp_password: String::new(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for DenylistConfig {
    fn default() -> Self {
        Self {
            ips: Vec::new(),
            emails: Vec::new(),
            domains: Vec::new(),
            file: None,
            reload_interval_secs: default_reload_interval_secs(),
            on_unavailable: FailPolicy::default(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl DenylistConfig {
    /// Get the file reload interval
    pub fn reload_interval(&self) -> Duration {
        Duration::from_secs(self.reload_interval_secs.max(1))
    }
}

impl MailConfig {
    /// Delay before retry number `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Config {
    /// Load configuration from `.env`, the optional config file and the
    /// environment.
    pub fn load() -> Result<Self, GuardError> {
        dotenvy::dotenv().ok();
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "inquiry-guard.toml".to_string());
        Self::from_sources(Some(&path))
    }

    /// Build configuration from an optional file plus the environment.
    pub fn from_sources(path: Option<&str>) -> Result<Self, GuardError> {
        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        let config: Config = settings.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Reject settings that cannot produce a meaningful disposition.
    pub fn check(&self) -> Result<(), GuardError> {
        if self.rate_limit.window_secs == 0 {
            return Err(GuardError::InvalidConfig(
                "rate_limit.window_secs must be positive".to_string(),
            ));
        }
        if self.rate_limit.window_secs > MAX_WINDOW_SECS {
            return Err(GuardError::InvalidConfig(format!(
                "rate_limit.window_secs ({}) must not exceed {}",
                self.rate_limit.window_secs, MAX_WINDOW_SECS
            )));
        }
        if self.thresholds.review_above >= self.thresholds.reject_at {
            return Err(GuardError::InvalidConfig(format!(
                "thresholds.review_above ({}) must be below thresholds.reject_at ({})",
                self.thresholds.review_above, self.thresholds.reject_at
            )));
        }
        Ok(())
    }
}
