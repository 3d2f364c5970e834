/// File-backed pieces: the persisted response cache, the JSONL diagnostics
/// file and layered configuration.
///
/// Every test writes under its own path in the system temp directory.
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use pricelens::cache::{self, FileCache, KeyValueCache};
use pricelens::catalog::{CatalogSource, CatalogStore, Product, ProductResponse};
use pricelens::config::{self, PricelensConfig};
use pricelens::diagnostics::{self, DiagnosticLog};
use pricelens::error::CatalogError;
use pricelens::state::{ImmediateScheduler, Session};

fn temp_path(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("pricelens-it-{}-{name}", std::process::id()));
    let _ = fs::remove_dir_all(&dir);
    dir
}

/// Serves fixed data, or fails every call when `offline`.
struct Catalog {
    offline: bool,
}

impl CatalogSource for Catalog {
    fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        if self.offline {
            return Err(CatalogError::Transport {
                url: "fake://categories".to_string(),
                reason: "offline".to_string(),
            });
        }
        Ok(vec!["beauty".to_string()])
    }

    fn fetch_products(&self, category: &str) -> Result<ProductResponse, CatalogError> {
        if self.offline {
            return Err(CatalogError::Transport {
                url: format!("fake://products/{category}"),
                reason: "offline".to_string(),
            });
        }
        Ok(ProductResponse {
            products: vec![Product::new(1, "Lipstick", 12.5)],
            total: 1,
        })
    }
}

fn session(offline: bool, cache: FileCache, log: DiagnosticLog) -> Session {
    let store = CatalogStore::new(Box::new(Catalog { offline }), Box::new(cache), log);
    Session::new(store, Box::new(ImmediateScheduler), Duration::ZERO, false)
}

#[test]
fn file_cache_serves_a_later_offline_session() {
    let dir = temp_path("offline");
    let cache_path = dir.join("cache.json");

    let mut online = session(false, FileCache::open(&cache_path), DiagnosticLog::in_memory());
    online.start();
    online.select_category("beauty");
    assert_eq!(online.store().stats().network_calls, 2);

    let mut offline = session(true, FileCache::open(&cache_path), DiagnosticLog::in_memory());
    offline.start();
    offline.select_category("beauty");

    assert_eq!(offline.state().categories, vec!["beauty"]);
    assert_eq!(offline.state().products.len(), 1);
    assert_eq!(offline.store().stats().network_calls, 0);
    assert_eq!(offline.store().stats().cache_hits, 2);

    assert!(cache::clear_file(&cache_path).unwrap());
    assert!(!cache::clear_file(&cache_path).unwrap());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_cache_entry_is_refetched() {
    let dir = temp_path("corrupt");
    let cache_path = dir.join("cache.json");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&cache_path, r#"{"beauty":"not json at all"}"#).unwrap();

    let mut s = session(false, FileCache::open(&cache_path), DiagnosticLog::in_memory());
    s.select_category("beauty");

    assert_eq!(s.state().products.len(), 1);
    assert_eq!(s.store().stats().network_calls, 1);
    let reopened = FileCache::open(&cache_path);
    assert!(reopened.get("beauty").unwrap().contains("Lipstick"));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failures_are_appended_to_the_diagnostics_file() {
    let dir = temp_path("diagnostics");
    let log_path = dir.join("diagnostics.jsonl");
    let mut logging = PricelensConfig::default().logging;
    logging.path = log_path.to_string_lossy().into_owned();
    logging.echo = false;

    let mut s = session(
        true,
        FileCache::open(dir.join("cache.json")),
        DiagnosticLog::from_config(&logging),
    );
    s.start();
    s.select_category("beauty");

    let entries = diagnostics::read_entries(&log_path);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].source, "catalog.categories");
    assert_eq!(entries[1].source, "catalog.products");
    assert!(entries.iter().all(|e| e.message.starts_with("[transport]")));

    let recent = diagnostics::read_recent(&log_path, 1);
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].source, "catalog.products");
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn disabled_logging_writes_nothing() {
    let mut logging = PricelensConfig::default().logging;
    logging.enabled = false;
    let log = DiagnosticLog::from_config(&logging);
    assert!(log.path().is_none());
}

#[test]
fn project_layer_overrides_global_per_key() {
    let global: toml::Value = toml::from_str(
        r#"
        [report]
        delay_ms = 500
        currency_symbol = "$"
        "#,
    )
    .unwrap();
    let project: toml::Value = toml::from_str(
        r#"
        [report]
        delay_ms = 0
        "#,
    )
    .unwrap();

    let cfg = config::load_layers([global, project]);
    assert_eq!(cfg.report.delay_ms, 0);
    assert_eq!(cfg.report.currency_symbol, "$");
    assert_eq!(cfg.catalog.base_url, "https://dummyjson.com");
}

#[test]
fn session_from_config_uses_currency_and_delay() {
    let mut cfg = PricelensConfig::default();
    cfg.report.delay_ms = 0;
    cfg.report.currency_symbol = "€".to_string();
    cfg.cache.enabled = false;
    cfg.logging.enabled = false;

    let s = Session::from_config(&cfg, Box::new(ImmediateScheduler));
    assert_eq!(s.currency_symbol(), "€");
    assert_eq!(s.report_delay(), Duration::ZERO);
    assert!(s.store().cache().is_empty());
}
