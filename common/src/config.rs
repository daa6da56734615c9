//! Environment variable parsing helpers

use std::env;
use std::str::FromStr;

/// Extension trait for reading configuration from environment variables.
///
/// Empty values are treated the same as unset ones, which is what container
/// orchestrators produce for declared-but-blank variables.
pub trait ConfigExt {
    /// Get an environment variable with a default value.
    ///
    /// # Example
    /// ```ignore
    /// let uri = String::env_or("MONGODB_URI", "mongodb://localhost:27017");
    /// ```
    fn env_or(name: &str, default: &str) -> String {
        Self::env_opt(name).unwrap_or_else(|| default.to_string())
    }

    /// Get an environment variable if it is set and non-empty.
    fn env_opt(name: &str) -> Option<String> {
        env::var(name).ok().filter(|v| !v.trim().is_empty())
    }

    /// Get an environment variable parsed as a specific type.
    ///
    /// Returns `default` if the variable is not set or fails to parse.
    ///
    /// # Example
    /// ```ignore
    /// let timeout: u64 = u64::env_parse("MONGODB_SERVER_SELECTION_TIMEOUT", 30);
    /// ```
    fn env_parse<T: FromStr>(name: &str, default: T) -> T {
        Self::env_opt(name)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }
}

impl<T> ConfigExt for T {}
