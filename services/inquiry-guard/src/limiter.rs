// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Per-client request velocity tracking.
//!
//! Each client identifier owns one window. The first request opens it with
//! `count = 1`; later requests inside the window increment the count; the
//! first request at or after `window_start + window` opens a fresh window.
//! Expired windows are dropped lazily on lookup and by [`RateLimitStore::sweep`].

use crate::config::RateLimitConfig;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

/// One client's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitRecord {
    pub window_start: DateTime<Utc>,
    pub count: u32,
}

/// State of a client's window after a request was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSnapshot {
    /// Requests counted in the current window, this one included
    pub count: u32,
    /// When the current window opened
    pub window_start: DateTime<Utc>,
    /// When the current window closes
    pub resets_at: DateTime<Utc>,
}

impl WindowSnapshot {
    /// Whether this request went over `max_requests`.
    pub fn exceeds(&self, max_requests: u32) -> bool {
        self.count > max_requests
    }
}

/// Storage for per-client windows.
///
/// The in-process [`InMemoryRateLimitStore`] is enough for a single
/// instance; several instances need an implementation backed by a shared
/// atomic counter.
pub trait RateLimitStore: Send + Sync {
    /// Count one request from `client_id` at `now` and report the window.
    fn check_and_increment(&self, client_id: &str, now: DateTime<Utc>) -> WindowSnapshot;

    /// Drop windows that closed before `now`. Returns how many were removed.
    fn sweep(&self, now: DateTime<Utc>) -> usize;

    /// Number of tracked clients.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look at a client's window without counting a request.
    fn peek(&self, client_id: &str) -> Option<RateLimitRecord>;
}

/// Mutex-guarded in-memory window table.
pub struct InMemoryRateLimitStore {
    window: ChronoDuration,
    records: Mutex<HashMap<String, RateLimitRecord>>,
}

impl InMemoryRateLimitStore {
    /// Create a new store with the given configuration.
    pub fn new(config: &RateLimitConfig) -> Self {
        let window = ChronoDuration::from_std(config.window_duration())
            .unwrap_or_else(|_| ChronoDuration::seconds(60));
        Self {
            window,
            records: Mutex::new(HashMap::new()),
        }
    }

    // A panic while holding the lock cannot leave a record half-written,
    // so a poisoned table is still usable.
    fn table(&self) -> MutexGuard<'_, HashMap<String, RateLimitRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// End of the window opened at `start`, clamped to the latest
    /// representable instant.
    fn window_end(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        start
            .checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    fn expired(&self, record: &RateLimitRecord, now: DateTime<Utc>) -> bool {
        now >= self.window_end(record.window_start)
    }
}

impl RateLimitStore for InMemoryRateLimitStore {
    fn check_and_increment(&self, client_id: &str, now: DateTime<Utc>) -> WindowSnapshot {
        let mut table = self.table();
        let record = table
            .entry(client_id.to_string())
            .or_insert(RateLimitRecord {
                window_start: now,
                count: 0,
            });

        if record.count > 0 && self.expired(record, now) {
            debug!(client = %client_id, previous = record.count, "Window expired, starting new window");
            *record = RateLimitRecord {
                window_start: now,
                count: 0,
            };
        }

        record.count = record.count.saturating_add(1);

        WindowSnapshot {
            count: record.count,
            window_start: record.window_start,
            resets_at: self.window_end(record.window_start),
        }
    }

    fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut table = self.table();
        let before = table.len();
        table.retain(|_, record| !self.expired(record, now));
        before - table.len()
    }

    fn len(&self) -> usize {
        self.table().len()
    }

    fn peek(&self, client_id: &str) -> Option<RateLimitRecord> {
        self.table().get(client_id).copied()
    }
}
