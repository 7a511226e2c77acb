//! # Tracing Module
//!
//! Environment-aware console logging using the tracing ecosystem.
//! Logs go to stdout, human-readable by default and as JSON lines when
//! `LONGCALL_LOG_FORMAT=json`, which suits containerized deployments.
//!
//! Level selection, in priority order:
//!
//! 1. `RUST_LOG`
//! 2. `LONGCALL_LOG_LEVEL`
//! 3. the environment default (`debug` for test and development, `info` for
//!    production)

use crate::task::{TaskHandle, TaskStatus};
use chrono::Utc;
use std::io::IsTerminal;
use std::sync::OnceLock;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static TRACING_INITIALIZED: OnceLock<()> = OnceLock::new();

/// Initialize console logging once per process
///
/// Safe to call repeatedly and from tests; an already-installed global
/// subscriber is left in place.
pub fn init_tracing() {
    TRACING_INITIALIZED.get_or_init(|| {
        let environment = get_environment();
        let log_level = get_log_level(&environment);
        let json = use_json_format();
        let use_ansi = IsTerminal::is_terminal(&std::io::stdout());

        let json_layer = json.then(|| {
            fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_current_span(true)
        });
        let text_layer = (!json).then(|| {
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true)
                .with_ansi(use_ansi)
        });

        let subscriber = tracing_subscriber::registry()
            .with(EnvFilter::new(&log_level))
            .with(json_layer)
            .with(text_layer);

        if subscriber.try_init().is_err() {
            tracing::debug!(
                "Global tracing subscriber already initialized - continuing with existing subscriber"
            );
        } else {
            tracing::info!(
                environment = %environment,
                level = %log_level,
                json = json,
                ansi_colors = use_ansi,
                "Console logging initialized"
            );
        }
    });
}

/// Get current environment from environment variables
fn get_environment() -> String {
    std::env::var("LONGCALL_ENV").unwrap_or_else(|_| "development".to_string())
}

/// Get log level based on environment variables or environment defaults
fn get_log_level(environment: &str) -> String {
    if let Ok(level) = std::env::var("RUST_LOG") {
        return level.to_lowercase();
    }

    if let Ok(level) = std::env::var("LONGCALL_LOG_LEVEL") {
        return level.to_lowercase();
    }

    default_level_for(environment).to_string()
}

fn default_level_for(environment: &str) -> &'static str {
    match environment {
        "production" => "info",
        _ => "debug",
    }
}

fn use_json_format() -> bool {
    std::env::var("LONGCALL_LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false)
}

/// Log structured data for a task lifecycle transition
pub fn log_task_operation(
    operation: &str,
    handle: &TaskHandle,
    status: TaskStatus,
    details: Option<&str>,
) {
    tracing::info!(
        operation = %operation,
        task_id = %handle,
        status = %status,
        details = details,
        timestamp = %Utc::now().to_rfc3339(),
        "TASK_OPERATION"
    );
}
