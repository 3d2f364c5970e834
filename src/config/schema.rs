/// Configuration schema and defaults for pricelens.
///
/// Defines the TOML-serializable configuration structure with all sections:
/// `[catalog]`, `[cache]`, `[report]`, `[logging]` and `[web]`.
///
/// Every field has a built-in default. Users only need to set the values
/// they want to override.
use std::time::Duration;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level pricelens configuration.
///
/// Maps directly to `~/.pricelens/config.toml` and `.pricelens.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PricelensConfig {
    pub catalog: CatalogConfig,
    pub cache: CacheConfig,
    pub report: ReportConfig,
    pub logging: LoggingConfig,
    pub web: WebConfig,
}

// ---------------------------------------------------------------------------
// [catalog]
// ---------------------------------------------------------------------------

/// Default public catalog host.
pub const DEFAULT_CATALOG_URL: &str = "https://dummyjson.com";

/// Catalog API endpoint settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Base URL; `/products/...` paths are appended to it.
    pub base_url: String,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_CATALOG_URL.to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl CatalogConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

// ---------------------------------------------------------------------------
// [cache]
// ---------------------------------------------------------------------------

/// Response cache settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Consult the cache before the network.
    pub enabled: bool,
    /// Keep the cache on disk between runs instead of only in memory.
    pub persist: bool,
    /// Cache file used when `persist = true`. `~` expands to the home directory.
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            persist: false,
            path: "~/.pricelens/cache.json".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// [report]
// ---------------------------------------------------------------------------

/// Report run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Artificial delay before a report is computed, in milliseconds.
    pub delay_ms: u64,
    /// Disable "run report" after a run until the selection changes.
    pub lock_after_run: bool,
    /// Prefix for chart data labels.
    pub currency_symbol: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            delay_ms: 3000,
            lock_after_run: false,
            currency_symbol: "₹".to_string(),
        }
    }
}

impl ReportConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Diagnostics log settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Whether diagnostics are written to the log file.
    pub enabled: bool,
    /// Path to the diagnostics file. `~` is expanded to the home directory.
    pub path: String,
    /// Echo warnings to stderr.
    pub echo: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "~/.pricelens/diagnostics.jsonl".to_string(),
            echo: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Embedded dashboard server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub addr: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl PricelensConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Used by `pricelens config init` to create a starting config file with
    /// all settings documented.
    pub fn default_toml() -> String {
        r#"# pricelens Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (PRICELENS_*)
#   2. Project config (.pricelens.toml in current directory)
#   3. User global config (~/.pricelens/config.toml)
#   4. Built-in defaults

[catalog]
base_url = "https://dummyjson.com"
timeout_ms = 10000

[cache]
enabled = true                        # Consult cache before the network
persist = false                       # Keep responses on disk between runs
path = "~/.pricelens/cache.json"

[report]
delay_ms = 3000                       # Artificial latency before the chart updates
lock_after_run = false                # Require a selection change before re-running
currency_symbol = "₹"

[logging]
enabled = true
path = "~/.pricelens/diagnostics.jsonl"
echo = true                           # Print warnings to stderr

[web]
addr = "127.0.0.1:9747"
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back_to_defaults() {
        let config: PricelensConfig = toml::from_str(&PricelensConfig::default_toml()).unwrap();
        assert_eq!(config, PricelensConfig::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config: PricelensConfig = toml::from_str(
            r#"
[report]
delay_ms = 0
"#,
        )
        .unwrap();
        assert_eq!(config.report.delay_ms, 0);
        assert_eq!(config.report.currency_symbol, "₹");
        assert_eq!(config.catalog.base_url, DEFAULT_CATALOG_URL);
        assert!(config.cache.enabled);
    }

    #[test]
    fn durations_follow_millisecond_fields() {
        let config = PricelensConfig::default();
        assert_eq!(config.report.delay(), Duration::from_secs(3));
        assert_eq!(config.catalog.timeout(), Duration::from_secs(10));
    }
}
