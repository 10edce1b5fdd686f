/*!
 * Tracing
 * Structured trace output for scheduling decisions and allocation verdicts
 */

use crate::core::types::Pid;
use std::fmt::Display;
use std::time::Instant;
use tracing::{debug, span, warn, Level, Span};
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Install the global subscriber
///
/// Environment variables:
/// - RUST_LOG: filter directives (default: `default_filter`)
/// - SIM_TRACE_JSON: `1` or `true` for JSON lines instead of compact text
///
/// Returns false if a subscriber was already installed.
pub fn init_tracing(default_filter: &str) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let use_json = std::env::var("SIM_TRACE_JSON")
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);
    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_list(false),
            )
            .try_init()
            .is_ok()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_span_events(FmtSpan::NONE)
                    .compact(),
            )
            .try_init()
            .is_ok()
    };

    if installed {
        debug!(json = use_json, "tracing initialized");
    }
    installed
}

/// Span around one engine operation, logging its verdict and duration
pub struct OperationSpan {
    span: Span,
    start: Instant,
    operation: &'static str,
}

impl OperationSpan {
    pub fn new(operation: &'static str, pid: Pid) -> Self {
        let span = span!(
            Level::DEBUG,
            "operation",
            operation,
            pid,
            duration_us = tracing::field::Empty,
            accepted = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            operation,
        }
    }

    /// Record the outcome and hand the result back
    pub fn finish<T, E: Display>(self, result: Result<T, E>) -> Result<T, E> {
        let elapsed = self.start.elapsed().as_micros() as u64;
        self.span.record("duration_us", elapsed);
        self.span.record("accepted", result.is_ok());

        let _entered = self.span.enter();
        match &result {
            Ok(_) => debug!(operation = self.operation, duration_us = elapsed, "operation accepted"),
            Err(e) => warn!(
                operation = self.operation,
                duration_us = elapsed,
                error = %e,
                "operation rejected"
            ),
        }
        result
    }
}
