/// Configuration system for pricelens.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults**: hardcoded in [`schema::PricelensConfig::default()`]
/// 2. **User global config**: `~/.pricelens/config.toml`
/// 3. **Project local config**: `.pricelens.toml` in the current working directory
/// 4. **Environment variables**: `PRICELENS_*` overrides (highest precedence)
///
/// File layers are merged key by key: a project file that only sets
/// `report.delay_ms` keeps every other value from the global file.
///
/// # Usage
///
/// ```rust,ignore
/// use pricelens::config;
///
/// let cfg = config::load();
/// let delay = cfg.report.delay();
/// ```
pub mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub use schema::PricelensConfig;

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load the fully resolved configuration.
///
/// Merges defaults → global TOML → project TOML → env vars.
pub fn load() -> PricelensConfig {
    let layers = [global_config_path(), project_config_path()];
    let mut config = load_layers(layers.iter().flatten().filter_map(|p| read_toml_value(p)));
    apply_env_overrides(&mut config);
    config
}

/// Merge TOML layers (lowest precedence first) on top of the defaults.
///
/// A layer that does not deserialize into the schema after merging is
/// dropped so a typo in one file cannot take the whole tool down.
pub fn load_layers(layers: impl IntoIterator<Item = toml::Value>) -> PricelensConfig {
    let mut merged = match toml::Value::try_from(PricelensConfig::default()) {
        Ok(value) => value,
        Err(_) => return PricelensConfig::default(),
    };

    for layer in layers {
        let mut candidate = merged.clone();
        merge_values(&mut candidate, layer);
        if candidate.clone().try_into::<PricelensConfig>().is_ok() {
            merged = candidate;
        }
    }

    merged.try_into().unwrap_or_default()
}

/// Read a TOML file into a generic value. Missing or malformed files yield
/// `None`.
fn read_toml_value(path: &Path) -> Option<toml::Value> {
    let content = fs::read_to_string(path).ok()?;
    toml::from_str(&content).ok()
}

/// Recursively overlay `overlay` onto `base`. Tables merge; everything else
/// is replaced.
fn merge_values(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, value) in overlay_table {
                match base_table.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_table.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Directory holding the global config, cache and diagnostics:
/// `~/.pricelens/`.
pub fn app_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".pricelens"))
}

/// Path to the user global config: `~/.pricelens/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    app_dir().map(|dir| dir.join("config.toml"))
}

/// Path to the project local config: `.pricelens.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".pricelens.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

/// Expand a leading `~` to the home directory.
pub fn expand_home(path: &str) -> Option<PathBuf> {
    match path.strip_prefix("~") {
        Some(rest) => {
            let rest = rest.trim_start_matches(['/', '\\']);
            dirs::home_dir().map(|home| home.join(rest))
        }
        None if path.is_empty() => None,
        None => Some(PathBuf::from(path)),
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `PRICELENS_CATALOG_URL`: catalog base URL
/// - `PRICELENS_CATALOG_TIMEOUT_MS`: request timeout
/// - `PRICELENS_CACHE`: cache enabled (`1`/`true`/`yes`/`on`)
/// - `PRICELENS_CACHE_PERSIST`: keep cache on disk
/// - `PRICELENS_REPORT_DELAY_MS`: artificial report delay
/// - `PRICELENS_LOCK_AFTER_RUN`: lock run button after a report
/// - `PRICELENS_LOGGING`: diagnostics file enabled
/// - `PRICELENS_WEB_ADDR`: dashboard listen address
fn apply_env_overrides(config: &mut PricelensConfig) {
    if let Ok(val) = std::env::var("PRICELENS_CATALOG_URL")
        && !val.is_empty()
    {
        config.catalog.base_url = val;
    }
    if let Ok(val) = std::env::var("PRICELENS_CATALOG_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.catalog.timeout_ms = ms;
    }

    if let Ok(val) = std::env::var("PRICELENS_CACHE") {
        config.cache.enabled = is_truthy(&val);
    }
    if let Ok(val) = std::env::var("PRICELENS_CACHE_PERSIST") {
        config.cache.persist = is_truthy(&val);
    }

    if let Ok(val) = std::env::var("PRICELENS_REPORT_DELAY_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.report.delay_ms = ms;
    }
    if let Ok(val) = std::env::var("PRICELENS_LOCK_AFTER_RUN") {
        config.report.lock_after_run = is_truthy(&val);
    }

    if let Ok(val) = std::env::var("PRICELENS_LOGGING") {
        config.logging.enabled = is_truthy(&val);
    }

    if let Ok(val) = std::env::var("PRICELENS_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.pricelens/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.pricelens/ directory")?;
    }

    fs::write(&path, PricelensConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key to a value in the global config file.
///
/// Supports dotted keys like `report.delay_ms`. The file is created from the
/// defaults if it does not exist yet.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&PricelensConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Refuse values that would make the file unloadable.
    let defaults = toml::Value::try_from(PricelensConfig::default())
        .context("failed to serialize default config")?;
    let mut check = defaults;
    merge_values(&mut check, root.clone());
    check
        .try_into::<PricelensConfig>()
        .with_context(|| format!("invalid value '{value}' for '{key}'"))?;

    let output = toml::to_string_pretty(&root).context("failed to serialize updated config")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, output).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// The existing value's type decides how `raw_value` is parsed. Keys that
/// are missing from a section are looked up in the defaults for their type.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let Some((section, leaf)) = key.split_once('.') else {
        anyhow::bail!("config key must look like 'section.field', got '{key}'");
    };

    let defaults = toml::Value::try_from(PricelensConfig::default())
        .context("failed to serialize default config")?;
    let template = defaults
        .get(section)
        .and_then(|s| s.get(leaf))
        .with_context(|| format!("unknown config key '{key}'"))?;

    let table = root
        .as_table_mut()
        .context("config root is not a table")?
        .entry(section.to_string())
        .or_insert(toml::Value::Table(toml::map::Map::new()))
        .as_table_mut()
        .with_context(|| format!("expected table at '{section}'"))?;

    let new_value = match template {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    table.insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
pub fn show_effective_config() -> Result<String> {
    let config = load();
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn no_layers_gives_defaults() {
        assert_eq!(load_layers(Vec::new()), PricelensConfig::default());
    }

    #[test]
    fn later_layers_override_field_by_field() {
        let global = parse(
            r#"
[catalog]
base_url = "http://catalog.local"
[report]
delay_ms = 500
"#,
        );
        let project = parse(
            r#"
[report]
lock_after_run = true
"#,
        );
        let config = load_layers([global, project]);
        assert_eq!(config.catalog.base_url, "http://catalog.local");
        assert_eq!(config.report.delay_ms, 500);
        assert!(config.report.lock_after_run);
    }

    #[test]
    fn ill_typed_layer_is_ignored() {
        let bad = parse(
            r#"
[report]
delay_ms = "soon"
"#,
        );
        let config = load_layers([bad]);
        assert_eq!(config.report.delay_ms, 3000);
    }

    #[test]
    fn is_truthy_accepts_variants() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy("yes"));
        assert!(is_truthy("On"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert!(!is_truthy(""));
    }

    #[test]
    fn expand_home_handles_tilde_and_plain_paths() {
        assert_eq!(expand_home("/tmp/x.json"), Some(PathBuf::from("/tmp/x.json")));
        assert_eq!(expand_home(""), None);
        if let Some(home) = dirs::home_dir() {
            assert_eq!(
                expand_home("~/.pricelens/cache.json"),
                Some(home.join(".pricelens/cache.json"))
            );
        }
    }

    #[test]
    fn set_toml_value_uses_default_types() {
        let mut root = parse(
            r#"
[report]
currency_symbol = "$"
"#,
        );
        set_toml_value(&mut root, "report.delay_ms", "250").unwrap();
        set_toml_value(&mut root, "report.lock_after_run", "yes").unwrap();
        set_toml_value(&mut root, "cache.persist", "1").unwrap();

        let report = root["report"].as_table().unwrap();
        assert_eq!(report["delay_ms"].as_integer(), Some(250));
        assert_eq!(report["lock_after_run"].as_bool(), Some(true));
        assert_eq!(report["currency_symbol"].as_str(), Some("$"));
        assert_eq!(root["cache"]["persist"].as_bool(), Some(true));
    }

    #[test]
    fn set_toml_value_rejects_unknown_and_ill_typed_keys() {
        let mut root = parse("");
        assert!(set_toml_value(&mut root, "nonexistent.key", "value").is_err());
        assert!(set_toml_value(&mut root, "report", "value").is_err());
        assert!(set_toml_value(&mut root, "report.delay_ms", "soon").is_err());
    }

    #[test]
    fn show_effective_config_returns_toml() {
        let toml_str = show_effective_config().unwrap();
        let _: PricelensConfig = toml::from_str(&toml_str).unwrap();
    }
}
