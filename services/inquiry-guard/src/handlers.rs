// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! HTTP handlers for the inquiry guard service.
//!
//! `POST /api/email/send` runs a submission through the validator, turns the
//! result into a disposition and, for accepted submissions, renders, records
//! and delivers the notification. The risk score never leaves the service.

use crate::client::client_id;
use crate::config::Config;
use crate::error::GuardError;
use crate::mail::{render, DeliveryReceipt, Locale, Mailer, OutgoingEmail, Priority};
use crate::metrics::Metrics;
use crate::store::{
    DeliveryUpdate, ListFilter, ListQuery, NewSubmission, SortField, SortOrder, StoreStats,
    SubmissionRecord, SubmissionStatus, SubmissionStore,
};
use crate::submission::{FormKind, FormSubmission};
use crate::validator::{Disposition, RequestValidator, ValidationResult};
use axum::{
    body::Bytes,
    extract::{ConnectInfo, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Shared application state.
pub struct AppState {
    pub validator: RequestValidator,
    pub config: Config,
    pub mailer: Arc<dyn Mailer>,
    pub store: Arc<dyn SubmissionStore>,
    pub metrics: Metrics,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warnings: Option<Vec<String>>,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            error: error.into(),
            code,
            errors: None,
            warnings: None,
        }
    }

    fn validation(result: &ValidationResult) -> Self {
        Self {
            error: "Validation failed".to_string(),
            code: "VALIDATION_FAILED",
            errors: Some(result.error_messages()),
            warnings: Some(result.warning_messages()),
        }
    }

    fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Response to an accepted and delivered submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub success: bool,
    pub message: &'static str,
    pub email_id: Option<Uuid>,
    pub message_id: String,
    pub processing_time_ms: u64,
}

/// Query for the status endpoint.
#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    #[serde(default)]
    pub id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub success: bool,
    pub email: SubmissionRecord,
}

/// Page size used when `limit` is absent.
pub const DEFAULT_PAGE_SIZE: usize = 20;
/// Largest page a client may request.
pub const MAX_PAGE_SIZE: usize = 100;

/// Query for the listing endpoint. Values stay raw so bad input gets a
/// descriptive error instead of the extractor's rejection.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub status: Option<String>,
    pub locale: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppliedFilters {
    #[serde(rename = "type")]
    pub kind: Option<FormKind>,
    pub status: Option<SubmissionStatus>,
    pub locale: Option<String>,
    pub date_from: Option<DateTime<Utc>>,
    pub date_to: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Sorting {
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

#[derive(Debug, Serialize)]
pub struct ListData {
    pub emails: Vec<SubmissionRecord>,
    pub pagination: Pagination,
    pub filters: AppliedFilters,
    pub sorting: Sorting,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub success: bool,
    pub data: ListData,
}

/// Limiter and denylist state.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityStats {
    pub rate_limit_records: usize,
    pub denylist_entries: usize,
    pub spam_detection_enabled: bool,
    pub window_secs: u64,
    pub max_requests: u32,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub success: bool,
    #[serde(flatten)]
    pub storage: StoreStats,
    pub success_rate: f64,
    pub security: SecurityStats,
    pub timestamp: DateTime<Utc>,
}

/// Build the service router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    let mut app = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/api/email/send", get(status).post(send))
        .route("/api/email/list", get(list))
        .route("/api/email/stats", get(stats));

    if state.config.metrics.enabled {
        app = app.route(&state.config.metrics.path, get(metrics));
    }

    app.layer(cors).with_state(state)
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "inquiry-guard",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Validate a form submission and deliver its notification.
pub async fn send(
    State(state): State<Arc<AppState>>,
    peer: Option<ConnectInfo<SocketAddr>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let started = Instant::now();

    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Unparsable request body");
            return ErrorResponse::new("Invalid JSON in request body", "INVALID_JSON")
                .into_response_with(StatusCode::BAD_REQUEST);
        }
    };

    let payload = FormSubmission::from_value(value);
    let client = client_id(&headers, peer.map(|ConnectInfo(addr)| addr));
    let result = state.validator.validate(&payload, &client);
    let kind_label = payload.kind().map_or("unknown", FormKind::as_str);

    let thresholds = &state.config.thresholds;
    let disposition = Disposition::decide(&result, thresholds);
    state
        .metrics
        .record_decision(kind_label, disposition, result.risk_score);
    state
        .metrics
        .set_rate_limit_records(state.validator.limiter().len());

    if result.risk_score >= thresholds.warn_at {
        warn!(
            client = %client,
            kind = kind_label,
            risk_score = result.risk_score,
            disposition = disposition.as_str(),
            warnings = ?result.warning_messages(),
            "High-risk submission"
        );
    } else {
        info!(
            client = %client,
            kind = kind_label,
            risk_score = result.risk_score,
            disposition = disposition.as_str(),
            "Submission checked"
        );
    }

    match disposition {
        Disposition::Reject => {
            return ErrorResponse::validation(&result).into_response_with(StatusCode::BAD_REQUEST);
        }
        Disposition::ManualReview => {
            return ErrorResponse::new("Request requires manual review", "MANUAL_REVIEW_REQUIRED")
                .into_response_with(StatusCode::TOO_MANY_REQUESTS);
        }
        Disposition::Accept => {}
    }

    let kind = payload.kind().unwrap_or(FormKind::Contact);
    let locale = Locale::parse(payload.locale());
    let rendered = render(kind, &payload, locale, Utc::now());
    let (to, priority) = match kind {
        FormKind::Contact => (state.config.mail.contact_recipient.clone(), Priority::Normal),
        FormKind::Inquiry => (state.config.mail.inquiry_recipient.clone(), Priority::High),
    };
    let email = OutgoingEmail {
        to,
        reply_to: payload.email().map(str::to_string),
        subject: rendered.subject,
        text: rendered.text,
        html: rendered.html,
        priority,
    };

    let record = NewSubmission {
        kind,
        from: state.config.mail.from_address.clone(),
        to: email.to.clone(),
        subject: email.subject.clone(),
        text_body: email.text.clone(),
        html_body: email.html.clone(),
        locale: locale.as_str().to_string(),
        priority,
        risk_score: result.risk_score,
        warnings: result.warning_messages(),
        client_id: client.clone(),
        user_agent: headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        payload: payload.to_value(),
    };
    let email_id = match state.store.save(record).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, client = %client, "Failed to record submission");
            None
        }
    };

    let delivery = deliver(&state, &email, email_id).await;
    state.metrics.record_delivery(delivery.is_ok());

    match delivery {
        Ok(receipt) => {
            let processing_time_ms =
                u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
            info!(
                email_id = ?email_id,
                message_id = %receipt.message_id,
                kind = kind_label,
                processing_time_ms,
                "Notification delivered"
            );
            (
                StatusCode::OK,
                Json(SendResponse {
                    success: true,
                    message: locale.confirmation(),
                    email_id,
                    message_id: receipt.message_id,
                    processing_time_ms,
                }),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, email_id = ?email_id, kind = kind_label, "Notification delivery failed");
            ErrorResponse::new("Failed to send email", "DELIVERY_FAILED")
                .into_response_with(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

/// Send `email`, retrying failures with a linear backoff. Every failed
/// attempt is recorded against the stored submission.
async fn deliver(
    state: &AppState,
    email: &OutgoingEmail,
    email_id: Option<Uuid>,
) -> Result<DeliveryReceipt, GuardError> {
    let attempts = state.config.mail.retry_attempts.max(1);
    let mut attempt = 1;
    loop {
        match state.mailer.send(email).await {
            Ok(receipt) => {
                record_outcome(
                    state,
                    email_id,
                    DeliveryUpdate::Sent {
                        message_id: receipt.message_id.clone(),
                    },
                )
                .await;
                return Ok(receipt);
            }
            Err(e) => {
                warn!(error = %e, email_id = ?email_id, attempt, attempts, "Delivery attempt failed");
                record_outcome(
                    state,
                    email_id,
                    DeliveryUpdate::Failed {
                        error: e.to_string(),
                    },
                )
                .await;
                if attempt >= attempts {
                    return Err(e);
                }
                tokio::time::sleep(state.config.mail.retry_delay(attempt)).await;
                attempt += 1;
            }
        }
    }
}

async fn record_outcome(state: &AppState, email_id: Option<Uuid>, update: DeliveryUpdate) {
    if let Some(id) = email_id {
        if let Err(e) = state.store.record_delivery(id, update).await {
            warn!(error = %e, email_id = %id, "Failed to record delivery outcome");
        }
    }
}

/// Look up a recorded submission by id.
pub async fn status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Response {
    let Some(raw) = query.id.filter(|id| !id.trim().is_empty()) else {
        return ErrorResponse::new("Email ID is required", "MISSING_EMAIL_ID")
            .into_response_with(StatusCode::BAD_REQUEST);
    };
    let not_found = || {
        ErrorResponse::new("Email not found", "EMAIL_NOT_FOUND")
            .into_response_with(StatusCode::NOT_FOUND)
    };

    let Ok(id) = Uuid::parse_str(raw.trim()) else {
        return not_found();
    };

    match state.store.get(id).await {
        Ok(Some(email)) => Json(StatusResponse {
            success: true,
            email,
        })
        .into_response(),
        Ok(None) => not_found(),
        Err(e) => {
            error!(error = %e, email_id = %id, "Failed to read submission");
            ErrorResponse::new("Failed to get email status", "STORAGE_ERROR")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parse an RFC 3339 timestamp or a bare date. A bare date means the start of
/// that day, or its last second when `end_of_day` is set.
fn parse_bound(value: &str, end_of_day: bool) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let time = if end_of_day {
        NaiveTime::from_hms_opt(23, 59, 59)?
    } else {
        NaiveTime::MIN
    };
    Some(date.and_time(time).and_utc())
}

fn parse_list_params(params: &ListParams) -> Result<(ListQuery, usize), String> {
    let page = match non_blank(&params.page) {
        None => 1,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| format!("invalid page: {}", raw))?
            .max(1),
    };
    let limit = match non_blank(&params.limit) {
        None => DEFAULT_PAGE_SIZE,
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| format!("invalid limit: {}", raw))?
            .clamp(1, MAX_PAGE_SIZE),
    };
    let sort_by = match non_blank(&params.sort_by) {
        None => SortField::default(),
        Some(raw) => SortField::parse(raw).ok_or_else(|| format!("invalid sortBy: {}", raw))?,
    };
    let sort_order = match non_blank(&params.sort_order) {
        None => SortOrder::default(),
        Some(raw) => SortOrder::parse(raw).ok_or_else(|| format!("invalid sortOrder: {}", raw))?,
    };
    let kind = non_blank(&params.kind)
        .map(|raw| FormKind::parse(raw).ok_or_else(|| format!("invalid type: {}", raw)))
        .transpose()?;
    let status = non_blank(&params.status)
        .map(|raw| SubmissionStatus::parse(raw).ok_or_else(|| format!("invalid status: {}", raw)))
        .transpose()?;
    let created_from = non_blank(&params.date_from)
        .map(|raw| parse_bound(raw, false).ok_or_else(|| format!("invalid dateFrom: {}", raw)))
        .transpose()?;
    let created_to = non_blank(&params.date_to)
        .map(|raw| parse_bound(raw, true).ok_or_else(|| format!("invalid dateTo: {}", raw)))
        .transpose()?;

    let query = ListQuery {
        filter: ListFilter {
            kind,
            status,
            locale: non_blank(&params.locale).map(str::to_ascii_lowercase),
            created_from,
            created_to,
        },
        sort_by,
        sort_order,
        offset: (page - 1).saturating_mul(limit),
        limit,
    };
    Ok((query, page))
}

/// Paged, filtered listing of stored submissions.
pub async fn list(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Response {
    let (query, page) = match parse_list_params(&params) {
        Ok(parsed) => parsed,
        Err(reason) => {
            debug!(reason = %reason, "Rejected listing query");
            return ErrorResponse::new(reason, "INVALID_QUERY")
                .into_response_with(StatusCode::BAD_REQUEST);
        }
    };

    let result = match state.store.list(&query).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Failed to list submissions");
            return ErrorResponse::new("Failed to fetch emails", "FETCH_ERROR")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let total_pages = result.total.div_ceil(query.limit);
    Json(ListResponse {
        success: true,
        data: ListData {
            emails: result.records,
            pagination: Pagination {
                page,
                limit: query.limit,
                total: result.total,
                total_pages,
                has_next_page: page < total_pages,
                has_prev_page: page > 1,
            },
            filters: AppliedFilters {
                kind: query.filter.kind,
                status: query.filter.status,
                locale: query.filter.locale,
                date_from: query.filter.created_from,
                date_to: query.filter.created_to,
            },
            sorting: Sorting {
                sort_by: query.sort_by,
                sort_order: query.sort_order,
            },
        },
    })
    .into_response()
}

/// Delivery and security statistics.
pub async fn stats(State(state): State<Arc<AppState>>) -> Response {
    let now = Utc::now();
    let storage = match state.store.stats(now).await {
        Ok(storage) => storage,
        Err(e) => {
            error!(error = %e, "Failed to compute stats");
            return ErrorResponse::new("Failed to get email statistics", "STORAGE_ERROR")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let limiter = state.validator.limiter();
    Json(StatsResponse {
        success: true,
        success_rate: storage.success_rate(),
        storage,
        security: SecurityStats {
            rate_limit_records: limiter.len(),
            denylist_entries: state.validator.denylist().len(),
            spam_detection_enabled: state.validator.spam_detection_enabled(),
            window_secs: state.config.rate_limit.window_secs,
            max_requests: state.config.rate_limit.max_requests,
        },
        timestamp: now,
    })
    .into_response()
}

/// Prometheus metrics endpoint.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    state
        .metrics
        .set_rate_limit_records(state.validator.limiter().len());
    match state.metrics.encode() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            ErrorResponse::new("Failed to encode metrics", "METRICS_ERROR")
                .into_response_with(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
