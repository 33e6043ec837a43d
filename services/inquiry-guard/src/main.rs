// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Inquiry Guard Service
//!
//! Receives contact and inquiry form submissions, scores them, and delivers
//! accepted ones as notification emails.
//!
//! ## Configuration
//!
//! Loaded once at startup from, in increasing precedence:
//!
//! - compiled defaults
//! - `inquiry-guard.toml`, or the file named by `INQUIRY_GUARD_CONFIG`
//! - `INQUIRY_GUARD__*` environment variables (also read from `.env`),
//!   e.g. `INQUIRY_GUARD__BIND_ADDR`, `INQUIRY_GUARD__RATE_LIMIT__MAX_REQUESTS`,
//!   `INQUIRY_GUARD__MAIL__TRANSPORT=smtp`

use chrono::Utc;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use inquiry_guard::{
    config::Config,
    denylist::LayeredDenylist,
    handlers::{router, AppState},
    limiter::{InMemoryRateLimitStore, RateLimitStore},
    mail::build_mailer,
    metrics::Metrics,
    store::InMemorySubmissionStore,
    validator::RequestValidator,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer().json())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let config = Config::load()?;
    info!(
        bind_addr = %config.bind_addr,
        window_secs = config.rate_limit.window_secs,
        max_requests = config.rate_limit.max_requests,
        spam_detection = config.spam.enabled,
        mail_transport = ?config.mail.transport,
        "Starting inquiry guard"
    );

    let limiter: Arc<dyn RateLimitStore> = Arc::new(InMemoryRateLimitStore::new(&config.rate_limit));
    let denylist = Arc::new(LayeredDenylist::from_config(&config.denylist));
    let validator = RequestValidator::new(&config, limiter.clone(), denylist.clone())?;

    let mailer = build_mailer(&config.mail)?;
    match mailer.verify().await {
        Ok(true) => info!("Mail transport ready"),
        Ok(false) => warn!("Mail transport did not confirm readiness"),
        Err(e) => warn!(error = %e, "Mail transport check failed"),
    }

    let state = Arc::new(AppState {
        validator,
        config: config.clone(),
        mailer,
        store: Arc::new(InMemorySubmissionStore::new()),
        metrics: Metrics::new()?,
    });

    // Sweep expired windows
    let sweep_interval = config.rate_limit.sweep_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(sweep_interval);
        loop {
            interval.tick().await;
            let removed = limiter.sweep(Utc::now());
            if removed > 0 {
                debug!(removed, remaining = limiter.len(), "Swept expired rate-limit windows");
            }
        }
    });

    // Re-read the denylist file so edits, or a file missing at boot, take effect
    if denylist.has_file() {
        let reload_interval = config.denylist.reload_interval();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(reload_interval);
            // The first tick fires immediately and the file was just read.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Err(e) = denylist.reload() {
                    warn!(error = %e, "Denylist reload failed");
                }
            }
        });
    }

    let app = router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = config.bind_addr.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %addr, "Server listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
