// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Spam heuristics over the free-text part of a submission.
//!
//! Every heuristic is independent and reports a fixed number of points;
//! the validator adds them up.

use crate::config::SpamConfig;
use crate::error::GuardError;
use crate::validator::RiskWarning;
use regex::Regex;
use tracing::debug;
use url::Url;

/// One heuristic that fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub warning: RiskWarning,
    pub points: u32,
}

impl Finding {
    fn new(warning: RiskWarning, points: u8) -> Self {
        Self {
            warning,
            points: u32::from(points),
        }
    }
}

/// Compiled spam heuristics.
#[derive(Debug)]
pub struct ContentScanner {
    config: SpamConfig,
    keywords: Vec<String>,
    patterns: Vec<Regex>,
    link: Regex,
}

impl ContentScanner {
    /// Compile the configured patterns.
    pub fn new(config: SpamConfig) -> Result<Self, GuardError> {
        let patterns = config
            .suspicious_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;
        let keywords = config
            .keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        let link = compile(r#"(?i)\bhttps?://[^\s<>"']+"#)?;

        Ok(Self {
            config,
            keywords,
            patterns,
            link,
        })
    }

    pub fn enabled(&self) -> bool {
        self.config.enabled
    }

    /// Run every heuristic over `subject` and `message`.
    pub fn scan(&self, subject: &str, message: &str) -> Vec<Finding> {
        let mut findings = Vec::new();
        if !self.config.enabled {
            return findings;
        }

        let full_text = format!("{} {}", subject, message);
        let lowered = full_text.to_lowercase();

        let hits: Vec<String> = self
            .keywords
            .iter()
            .filter(|k| lowered.contains(k.as_str()))
            .cloned()
            .collect();
        if !hits.is_empty() {
            let points = u32::from(self.config.keyword_points) * hits.len() as u32;
            findings.push(Finding {
                warning: RiskWarning::SpamKeywords(hits),
                points,
            });
        }

        let links = self.count_links(&full_text);
        if links > self.config.max_links {
            let extra = (links - self.config.max_links) as u32;
            findings.push(Finding {
                warning: RiskWarning::TooManyLinks(links),
                points: u32::from(self.config.link_points) * extra,
            });
        }

        for pattern in &self.patterns {
            if pattern.is_match(&full_text) {
                debug!(pattern = %pattern.as_str(), "Suspicious pattern matched");
                findings.push(Finding::new(
                    RiskWarning::SuspiciousPattern,
                    self.config.pattern_points,
                ));
            }
        }

        if longest_run(&full_text) >= self.config.repeated_char_run.max(2) {
            findings.push(Finding::new(
                RiskWarning::RepeatedCharacters,
                self.config.repeated_char_points,
            ));
        }

        if is_shouting(&full_text) {
            findings.push(Finding::new(RiskWarning::Shouting, self.config.shouting_points));
        }

        let length = message.trim().chars().count();
        if length < self.config.min_message_chars {
            findings.push(Finding::new(
                RiskWarning::ShortMessage,
                self.config.short_message_points,
            ));
        } else if length > self.config.wall_of_text_chars {
            findings.push(Finding::new(
                RiskWarning::WallOfText,
                self.config.wall_of_text_points,
            ));
        }

        findings
    }

    /// Number of http(s) links with a host.
    pub fn count_links(&self, text: &str) -> usize {
        self.link
            .find_iter(text)
            .filter(|m| {
                Url::parse(m.as_str())
                    .map(|u| u.host_str().is_some())
                    .unwrap_or(false)
            })
            .count()
    }
}

fn compile(pattern: &str) -> Result<Regex, GuardError> {
    Regex::new(pattern).map_err(|source| GuardError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

/// Longest run of one repeated non-whitespace character.
fn longest_run(text: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for c in text.chars() {
        if c.is_whitespace() {
            previous = None;
            current = 0;
            continue;
        }
        if previous == Some(c) {
            current += 1;
        } else {
            previous = Some(c);
            current = 1;
        }
        longest = longest.max(current);
    }
    longest
}

/// More than half the letters uppercase, in a text longer than 50 chars.
fn is_shouting(text: &str) -> bool {
    if text.chars().count() <= 50 {
        return false;
    }
    let (upper, letters) = text
        .chars()
        .filter(|c| c.is_alphabetic())
        .fold((0usize, 0usize), |(u, l), c| {
            (u + usize::from(c.is_uppercase()), l + 1)
        });
    letters > 0 && upper * 2 > letters
}
