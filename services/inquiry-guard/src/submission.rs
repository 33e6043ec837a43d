// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Inbound form payloads.
//!
//! The body is kept as an untyped JSON object so that a wrong type or a
//! non-object body becomes a validation error rather than a parse failure.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Discriminator carried in the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormKind {
    Contact,
    Inquiry,
}

impl FormKind {
    /// Fields that must be present and non-blank.
    pub fn required_fields(self) -> &'static [&'static str] {
        match self {
            Self::Contact => &["name", "email", "message"],
            Self::Inquiry => &["name", "email", "company", "message"],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Contact => "contact",
            Self::Inquiry => "inquiry",
        }
    }

    /// Case-insensitive name lookup.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "contact" => Some(Self::Contact),
            "inquiry" => Some(Self::Inquiry),
            _ => None,
        }
    }
}

impl fmt::Display for FormKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a field could not be read as text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    /// Present but not a JSON string
    NotText,
}

/// A contact or inquiry form body.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormSubmission {
    fields: Map<String, Value>,
    malformed: bool,
}

/// Fields the service knows how to read as text.
pub const TEXT_FIELDS: &[&str] = &[
    "type",
    "name",
    "email",
    "company",
    "country",
    "phone",
    "subject",
    "productInterest",
    "message",
    "locale",
];

impl FormSubmission {
    /// Wrap an arbitrary JSON value. Anything other than an object yields an
    /// empty, malformed submission.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(fields) => Self {
                fields,
                malformed: false,
            },
            _ => Self {
                fields: Map::new(),
                malformed: true,
            },
        }
    }

    /// Build a submission from string pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
            .collect();
        Self {
            fields,
            malformed: false,
        }
    }

    /// True when the body was not a JSON object.
    pub fn is_malformed(&self) -> bool {
        self.malformed
    }

    /// Read a field as text. `null` counts as absent.
    pub fn text(&self, field: &str) -> Result<Option<&str>, FieldError> {
        match self.fields.get(field) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.as_str())),
            Some(_) => Err(FieldError::NotText),
        }
    }

    /// Read a field as trimmed text, treating wrong types and blanks as absent.
    pub fn trimmed(&self, field: &str) -> Option<&str> {
        match self.text(field) {
            Ok(Some(s)) if !s.trim().is_empty() => Some(s.trim()),
            _ => None,
        }
    }

    /// The form type. `None` means the discriminator was present but unknown.
    pub fn kind(&self) -> Option<FormKind> {
        match self.text("type") {
            Ok(None) => Some(FormKind::Contact),
            Ok(Some(t)) if t.trim().is_empty() => Some(FormKind::Contact),
            Ok(Some(t)) => FormKind::parse(t),
            Err(_) => None,
        }
    }

    /// Requested locale, `en` unless the body asks for another.
    pub fn locale(&self) -> &str {
        self.trimmed("locale").unwrap_or("en")
    }

    /// Submitter email, trimmed.
    pub fn email(&self) -> Option<&str> {
        self.trimmed("email")
    }

    /// Lowercased domain part of the submitter email.
    pub fn email_domain(&self) -> Option<String> {
        self.email()
            .and_then(|e| e.rsplit_once('@'))
            .map(|(_, domain)| domain.trim().to_lowercase())
            .filter(|d| !d.is_empty())
    }

    /// The underlying JSON, for audit storage.
    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}
