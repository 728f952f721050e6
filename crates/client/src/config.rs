//! Client configuration via `meridian.toml`
//!
//! Connection setup is left to the caller; the configuration covers how the
//! client uses the connections it is given.

use meridian_core::{Error, Result};
use meridian_pool::{Endpoint, Selection, StubPool};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Conventional config file name.
pub const CONFIG_FILE_NAME: &str = "meridian.toml";

/// Client configuration.
///
/// # Example
///
/// ```toml
/// # Per-call deadline in milliseconds (omit or 0 for none)
/// deadline_ms = 2000
///
/// # Endpoint selection: "random" (default) or "round_robin"
/// selection = "random"
///
/// # Upper bound on graceful shutdown, in milliseconds
/// shutdown_timeout_ms = 5000
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Per-call deadline in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
    /// Endpoint selection policy: `"random"` or `"round_robin"`.
    #[serde(default = "default_selection")]
    pub selection: String,
    /// Upper bound on graceful shutdown in milliseconds (default: 5000)
    #[serde(default = "default_shutdown_timeout_ms")]
    pub shutdown_timeout_ms: u64,
}

fn default_selection() -> String {
    "random".to_string()
}

fn default_shutdown_timeout_ms() -> u64 {
    5000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            deadline_ms: None,
            selection: default_selection(),
            shutdown_timeout_ms: default_shutdown_timeout_ms(),
        }
    }
}

impl ClientConfig {
    /// Parse the selection string.
    ///
    /// # Errors
    ///
    /// Returns an error if the string is not `"random"` or `"round_robin"`.
    pub fn selection(&self) -> Result<Selection> {
        self.selection.parse()
    }

    /// Per-call deadline, `None` when unset or zero
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Shutdown bound
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    /// Build a pool over `endpoints` using this configuration
    pub fn build_pool(&self, endpoints: impl IntoIterator<Item = Endpoint>) -> Result<StubPool> {
        let mut pool = StubPool::with_endpoints(endpoints).with_policy(self.selection()?.build());
        if let Some(deadline) = self.deadline() {
            pool = pool.with_deadline(deadline);
        }
        Ok(pool)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Meridian client configuration
#
# Per-call deadline in milliseconds. Omit or set to 0 to wait indefinitely.
# deadline_ms = 2000

# Endpoint selection: "random" (default) or "round_robin"
selection = "random"

# Upper bound on graceful shutdown of all endpoints, in milliseconds
shutdown_timeout_ms = 5000
"#
    }

    /// Parse config from TOML text, validating eagerly.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))?;
        config.selection()?;
        Ok(config)
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::Config(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }
}
