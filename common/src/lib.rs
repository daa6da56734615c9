//! Shared utilities for the provisioning binaries
//!
//! - Structured logging initialization
//! - Environment variable parsing helpers

pub mod config;
pub mod logging;

pub use config::ConfigExt;
pub use logging::{init_logging, LogFormat};
