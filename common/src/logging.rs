//! Structured logging initialization
//!
//! Logs go to stderr so stdout stays free for anything a provisioning
//! pipeline might capture.

use crate::config::ConfigExt;
use tracing::debug;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output format of the fmt layer, selected through `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse a `LOG_FORMAT` value. Anything other than `json` is plain text.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    pub fn from_env() -> Self {
        Self::parse(&String::env_or("LOG_FORMAT", "text"))
    }
}

/// Guard that keeps the tracing subscriber active.
/// Hold it until the end of main.
pub struct LogGuard;

/// Initialize structured logging for a component.
///
/// The filter defaults to `info` and can be widened with `RUST_LOG`.
///
/// # Example
/// ```ignore
/// let _guard = init_logging("init-mongo");
/// info!("Starting up...");
/// ```
pub fn init_logging(component: &str) -> LogGuard {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match LogFormat::from_env() {
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
        LogFormat::Text => registry
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init(),
    }

    debug!(component, "Logging initialized");
    LogGuard
}
