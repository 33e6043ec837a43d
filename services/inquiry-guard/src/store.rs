// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Audit records of submitted notifications.

use crate::error::GuardError;
use crate::mail::Priority;
use crate::submission::FormKind;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Records kept by default before the oldest are evicted.
pub const DEFAULT_CAPACITY: usize = 10_000;

/// Delivery state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Sent,
    Failed,
}

impl SubmissionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Sent => "sent",
            Self::Failed => "failed",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "sent" => Some(Self::Sent),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// One accepted submission and what happened to its notification.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRecord {
    pub id: Uuid,
    #[serde(rename = "type")]
    pub kind: FormKind,
    pub from: String,
    pub to: String,
    pub subject: String,
    #[serde(skip)]
    pub text_body: String,
    #[serde(skip)]
    pub html_body: String,
    pub status: SubmissionStatus,
    pub locale: String,
    pub message_id: Option<String>,
    pub error_message: Option<String>,
    pub retry_count: u32,
    pub priority: Priority,
    #[serde(skip)]
    pub risk_score: u8,
    #[serde(skip)]
    pub warnings: Vec<String>,
    #[serde(skip)]
    pub client_id: String,
    #[serde(skip)]
    pub user_agent: Option<String>,
    #[serde(skip)]
    pub payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

/// Fields supplied when a record is first stored.
#[derive(Debug, Clone)]
pub struct NewSubmission {
    pub kind: FormKind,
    pub from: String,
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub locale: String,
    pub priority: Priority,
    pub risk_score: u8,
    pub warnings: Vec<String>,
    pub client_id: String,
    pub user_agent: Option<String>,
    pub payload: serde_json::Value,
}

/// Outcome of a delivery attempt.
#[derive(Debug, Clone)]
pub enum DeliveryUpdate {
    Sent { message_id: String },
    Failed { error: String },
}

/// Column a listing is ordered by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    SentAt,
    Subject,
    Status,
}

impl SortField {
    /// Accepts the camelCase and snake_case column names.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim() {
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            "sentAt" | "sent_at" => Some(Self::SentAt),
            "subject" => Some(Self::Subject),
            "status" => Some(Self::Status),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(Self::Asc),
            "DESC" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Restricts a listing. `None` fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub kind: Option<FormKind>,
    pub status: Option<SubmissionStatus>,
    pub locale: Option<String>,
    /// Inclusive lower bound on `created_at`
    pub created_from: Option<DateTime<Utc>>,
    /// Inclusive upper bound on `created_at`
    pub created_to: Option<DateTime<Utc>>,
}

impl ListFilter {
    fn matches(&self, record: &SubmissionRecord) -> bool {
        self.kind.map_or(true, |kind| record.kind == kind)
            && self.status.map_or(true, |status| record.status == status)
            && self
                .locale
                .as_deref()
                .map_or(true, |locale| record.locale.eq_ignore_ascii_case(locale))
            && self.created_from.map_or(true, |from| record.created_at >= from)
            && self.created_to.map_or(true, |to| record.created_at <= to)
    }
}

/// One page of a filtered, sorted listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListQuery {
    pub filter: ListFilter,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
    pub offset: usize,
    pub limit: usize,
}

/// Records on the requested page and the number matching the filter.
#[derive(Debug, Clone)]
pub struct ListPage {
    pub records: Vec<SubmissionRecord>,
    pub total: usize,
}

fn compare(a: &SubmissionRecord, b: &SubmissionRecord, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::UpdatedAt => a.updated_at.cmp(&b.updated_at),
        SortField::SentAt => a.sent_at.cmp(&b.sent_at),
        SortField::Subject => a.subject.cmp(&b.subject),
        SortField::Status => a.status.as_str().cmp(b.status.as_str()),
    }
}

/// Aggregate counts over stored records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_sent: usize,
    pub total_failed: usize,
    pub total_pending: usize,
    pub sent_today: usize,
    pub sent_this_week: usize,
    pub sent_this_month: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_locale: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
}

impl StoreStats {
    /// Percentage of finished deliveries that succeeded, two decimals.
    pub fn success_rate(&self) -> f64 {
        let finished = self.total_sent + self.total_failed;
        if finished == 0 {
            return 0.0;
        }
        let rate = self.total_sent as f64 / finished as f64 * 100.0;
        (rate * 100.0).round() / 100.0
    }
}

/// Persistence for submission records.
#[async_trait]
pub trait SubmissionStore: Send + Sync {
    async fn save(&self, submission: NewSubmission) -> Result<Uuid, GuardError>;

    async fn record_delivery(&self, id: Uuid, update: DeliveryUpdate) -> Result<(), GuardError>;

    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>, GuardError>;

    async fn stats(&self, now: DateTime<Utc>) -> Result<StoreStats, GuardError>;

    async fn list(&self, query: &ListQuery) -> Result<ListPage, GuardError>;
}

#[derive(Debug, Default)]
struct Records {
    by_id: HashMap<Uuid, SubmissionRecord>,
    order: VecDeque<Uuid>,
}

/// Bounded in-memory store. The oldest records go first once full.
#[derive(Debug, Clone)]
pub struct InMemorySubmissionStore {
    capacity: usize,
    records: Arc<RwLock<Records>>,
}

impl Default for InMemorySubmissionStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InMemorySubmissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            records: Arc::new(RwLock::new(Records::default())),
        }
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl SubmissionStore for InMemorySubmissionStore {
    async fn save(&self, submission: NewSubmission) -> Result<Uuid, GuardError> {
        let now = Utc::now();
        let id = Uuid::new_v4();
        let record = SubmissionRecord {
            id,
            kind: submission.kind,
            from: submission.from,
            to: submission.to,
            subject: submission.subject,
            text_body: submission.text_body,
            html_body: submission.html_body,
            status: SubmissionStatus::Pending,
            locale: submission.locale,
            message_id: None,
            error_message: None,
            retry_count: 0,
            priority: submission.priority,
            risk_score: submission.risk_score,
            warnings: submission.warnings,
            client_id: submission.client_id,
            user_agent: submission.user_agent,
            payload: submission.payload,
            created_at: now,
            updated_at: now,
            sent_at: None,
        };

        let mut records = self.records.write().await;
        while records.order.len() >= self.capacity {
            match records.order.pop_front() {
                Some(oldest) => {
                    records.by_id.remove(&oldest);
                }
                None => break,
            }
        }
        records.order.push_back(id);
        records.by_id.insert(id, record);
        Ok(id)
    }

    async fn record_delivery(&self, id: Uuid, update: DeliveryUpdate) -> Result<(), GuardError> {
        let mut records = self.records.write().await;
        let record = records
            .by_id
            .get_mut(&id)
            .ok_or_else(|| GuardError::Store(format!("no submission {}", id)))?;

        let now = Utc::now();
        match update {
            DeliveryUpdate::Sent { message_id } => {
                record.status = SubmissionStatus::Sent;
                record.message_id = Some(message_id);
                record.error_message = None;
                record.sent_at = Some(now);
            }
            DeliveryUpdate::Failed { error } => {
                record.status = SubmissionStatus::Failed;
                record.error_message = Some(error);
                record.retry_count += 1;
            }
        }
        record.updated_at = now;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<SubmissionRecord>, GuardError> {
        Ok(self.records.read().await.by_id.get(&id).cloned())
    }

    async fn stats(&self, now: DateTime<Utc>) -> Result<StoreStats, GuardError> {
        let records = self.records.read().await;
        let mut stats = StoreStats::default();
        let day_ago = now - ChronoDuration::days(1);
        let week_ago = now - ChronoDuration::days(7);
        let month_ago = now - ChronoDuration::days(30);

        for record in records.by_id.values() {
            match record.status {
                SubmissionStatus::Sent => stats.total_sent += 1,
                SubmissionStatus::Failed => stats.total_failed += 1,
                SubmissionStatus::Pending => stats.total_pending += 1,
            }
            if let Some(sent_at) = record.sent_at {
                stats.sent_today += usize::from(sent_at >= day_ago);
                stats.sent_this_week += usize::from(sent_at >= week_ago);
                stats.sent_this_month += usize::from(sent_at >= month_ago);
            }
            *stats.by_type.entry(record.kind.to_string()).or_default() += 1;
            *stats.by_locale.entry(record.locale.clone()).or_default() += 1;
            *stats
                .by_status
                .entry(record.status.as_str().to_string())
                .or_default() += 1;
        }
        Ok(stats)
    }

    async fn list(&self, query: &ListQuery) -> Result<ListPage, GuardError> {
        let records = self.records.read().await;
        // Insertion order breaks ties, so equal keys keep a stable order.
        let mut matching: Vec<&SubmissionRecord> = records
            .order
            .iter()
            .filter_map(|id| records.by_id.get(id))
            .filter(|record| query.filter.matches(record))
            .collect();
        matching.sort_by(|a, b| {
            let ordering = compare(a, b, query.sort_by);
            match query.sort_order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        Ok(ListPage {
            total: matching.len(),
            records: matching
                .into_iter()
                .skip(query.offset)
                .take(query.limit)
                .cloned()
                .collect(),
        })
    }
}
