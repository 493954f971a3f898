//! Prometheus metrics for gatewarden.
//!
//! - `bot_command_total{command}` - Commands dispatched by name
//! - `bot_command_duration_seconds{command}` - Handler latency
//! - `bot_command_errors_total{command,error}` - Handler failures by kind
//! - `bot_registrations_started_total`, `bot_tokens_issued_total`,
//!   `bot_verifications_completed_total`, `bot_email_failures_total` -
//!   verification funnel

use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Commands
// ========================================================================

pub static COMMAND_COUNTER: OnceLock<IntCounterVec> = OnceLock::new();
pub static COMMAND_LATENCY: OnceLock<HistogramVec> = OnceLock::new();
pub static COMMAND_ERRORS: OnceLock<IntCounterVec> = OnceLock::new();

// ========================================================================
// Verification
// ========================================================================

pub static REGISTRATIONS_STARTED: OnceLock<IntCounter> = OnceLock::new();
pub static TOKENS_ISSUED: OnceLock<IntCounter> = OnceLock::new();
pub static VERIFICATIONS_COMPLETED: OnceLock<IntCounter> = OnceLock::new();
pub static EMAIL_FAILURES: OnceLock<IntCounter> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Recording before `init` is a silent no-op, so unit tests need not call it.
pub fn init() {
    let r = registry();

    macro_rules! register {
        ($metric:ident, $init:expr) => {
            match $init {
                Ok(m) => {
                    if let Err(e) = r.register(Box::new(m.clone())) {
                        tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                    }
                    let _ = $metric.set(m);
                }
                Err(e) => {
                    tracing::error!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                }
            }
        };
    }

    register!(COMMAND_COUNTER, IntCounterVec::new(Opts::new("bot_command_total", "Commands dispatched by name"), &["command"]));
    register!(COMMAND_LATENCY, HistogramVec::new(
        HistogramOpts::new("bot_command_duration_seconds", "Command handler latency by name")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
        &["command"]));
    register!(COMMAND_ERRORS, IntCounterVec::new(Opts::new("bot_command_errors_total", "Command errors by name and kind"), &["command", "error"]));

    register!(REGISTRATIONS_STARTED, IntCounter::new("bot_registrations_started_total", "Verification flows started"));
    register!(TOKENS_ISSUED, IntCounter::new("bot_tokens_issued_total", "Verification tokens emailed"));
    register!(VERIFICATIONS_COMPLETED, IntCounter::new("bot_verifications_completed_total", "Members verified and granted roles"));
    register!(EMAIL_FAILURES, IntCounter::new("bot_email_failures_total", "Verification emails that failed to send"));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&registry().gather(), &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
        String::new()
    })
}

/// Record a command execution with latency.
#[inline]
pub fn record_command(command: &str, duration_secs: f64) {
    if let Some(c) = COMMAND_COUNTER.get() {
        c.with_label_values(&[command]).inc();
    }
    if let Some(h) = COMMAND_LATENCY.get() {
        h.with_label_values(&[command]).observe(duration_secs);
    }
}

/// Record a command error.
#[inline]
pub fn record_command_error(command: &str, error: &str) {
    if let Some(c) = COMMAND_ERRORS.get() {
        c.with_label_values(&[command, error]).inc();
    }
}

#[inline]
fn bump(counter: &OnceLock<IntCounter>) {
    if let Some(c) = counter.get() {
        c.inc();
    }
}

pub fn record_registration_started() {
    bump(&REGISTRATIONS_STARTED);
}

pub fn record_token_issued() {
    bump(&TOKENS_ISSUED);
}

pub fn record_verification_completed() {
    bump(&VERIFICATIONS_COMPLETED);
}

pub fn record_email_failure() {
    bump(&EMAIL_FAILURES);
}
