//! Bootstrap components
//!
//! - Configuration loading (YAML file plus environment overrides)
//! - The create-user statement and its read-back verification

mod config;
mod statement;

pub use config::{BootstrapConfig, DatabaseConfig, DEFAULT_CONFIG_PATH, DEFAULT_CONNECTION_URI};
pub use statement::{BootstrapStatement, Verification};
