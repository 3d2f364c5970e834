//! Cache-first loader for categories and per-category products.
//!
//! Every lookup consults the injected cache first. A hit never touches the
//! network; a miss fetches, stores the serialized response under the key
//! and returns it. Failures and empty results are written to the
//! diagnostic log and come back as `None` so callers keep their current
//! state.
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::{CatalogSource, ProductResponse};
use crate::cache::{CATEGORIES_KEY, KeyValueCache};
use crate::diagnostics::DiagnosticLog;
use crate::error::CatalogError;

/// Running counters, shown by `pricelens health` and used in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStats {
    pub cache_hits: usize,
    pub network_calls: usize,
    pub failures: usize,
}

pub struct CatalogStore {
    source: Box<dyn CatalogSource>,
    cache: Box<dyn KeyValueCache>,
    log: DiagnosticLog,
    stats: FetchStats,
}

impl CatalogStore {
    pub fn new(
        source: Box<dyn CatalogSource>,
        cache: Box<dyn KeyValueCache>,
        log: DiagnosticLog,
    ) -> Self {
        Self {
            source,
            cache,
            log,
            stats: FetchStats::default(),
        }
    }

    /// Load the category list (cache key `"categories"`).
    pub fn load_categories(&mut self) -> Option<Vec<String>> {
        self.load(
            CATEGORIES_KEY,
            "catalog.categories",
            |source| source.fetch_categories(),
            |categories: &Vec<String>| categories.is_empty(),
        )
    }

    /// Load the products of `category` (cache key = the category name).
    pub fn load_products(&mut self, category: &str) -> Option<ProductResponse> {
        if category.is_empty() {
            return None;
        }
        self.load(
            category,
            "catalog.products",
            |source| source.fetch_products(category),
            |resp: &ProductResponse| resp.products.is_empty(),
        )
    }

    pub fn stats(&self) -> FetchStats {
        self.stats
    }

    pub fn diagnostics(&self) -> &DiagnosticLog {
        &self.log
    }

    pub fn cache(&self) -> &dyn KeyValueCache {
        self.cache.as_ref()
    }

    pub fn source_description(&self) -> String {
        self.source.describe()
    }

    fn load<T, F, E>(&mut self, key: &str, log_source: &str, fetch: F, is_empty: E) -> Option<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce(&dyn CatalogSource) -> Result<T, CatalogError>,
        E: Fn(&T) -> bool,
    {
        if let Some(raw) = self.cache.get(key) {
            match serde_json::from_str::<T>(&raw) {
                Ok(value) => {
                    self.stats.cache_hits += 1;
                    return Some(value);
                }
                Err(e) => self
                    .log
                    .warn(log_source, format!("ignoring corrupt cache entry '{key}': {e}")),
            }
        }

        self.stats.network_calls += 1;
        let fetched = fetch(self.source.as_ref()).and_then(|value| {
            if is_empty(&value) {
                Err(CatalogError::Empty {
                    what: if key == CATEGORIES_KEY {
                        "categories".to_string()
                    } else {
                        format!("products in '{key}'")
                    },
                })
            } else {
                Ok(value)
            }
        });

        match fetched {
            Ok(value) => {
                self.log.info(
                    log_source,
                    format!("fetched '{key}' from {}", self.source.describe()),
                );
                self.remember(key, log_source, &value);
                Some(value)
            }
            Err(e) => {
                self.stats.failures += 1;
                self.log.warn(log_source, format!("[{}] {e}", e.kind()));
                None
            }
        }
    }

    fn remember<T: Serialize>(&mut self, key: &str, log_source: &str, value: &T) {
        let stored = serde_json::to_string(value)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.cache.set(key, json));
        if let Err(e) = stored {
            self.log
                .warn(log_source, format!("could not cache '{key}': {e:#}"));
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
