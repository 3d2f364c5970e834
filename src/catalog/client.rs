/// HTTP client for the public product catalog.
///
/// Uses the synchronous `ureq` client. One request per call, no retries:
/// failures come back as [`CatalogError`] for the store to log.
use std::time::Duration;

use serde::de::DeserializeOwned;

use super::{CatalogSource, CategoryEntry, ProductResponse};
use crate::config::schema::CatalogConfig;
use crate::error::CatalogError;

/// Synchronous catalog client.
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    base_url: String,
    timeout: Duration,
}

impl HttpCatalog {
    /// Build a client from the resolved `[catalog]` config.
    pub fn from_config(config: &CatalogConfig) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            timeout: config.timeout(),
        }
    }

    /// URL of the category list endpoint.
    pub fn categories_url(&self) -> String {
        format!("{}/products/categories", self.base_url)
    }

    /// URL of the per-category product endpoint.
    pub fn products_url(&self, category: &str) -> String {
        format!(
            "{}/products/category/{}",
            self.base_url,
            urlencoding::encode(category)
        )
    }

    /// Check whether the catalog answers the category endpoint at all.
    ///
    /// Uses a short timeout so `pricelens health` doesn't stall.
    pub fn is_reachable(&self) -> bool {
        ureq::get(&self.categories_url())
            .timeout(Duration::from_secs(5))
            .call()
            .is_ok()
    }

    fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, CatalogError> {
        let resp = ureq::get(url)
            .timeout(self.timeout)
            .call()
            .map_err(|e| match e {
                ureq::Error::Status(code, _) => CatalogError::Status {
                    code,
                    url: url.to_string(),
                },
                ureq::Error::Transport(t) => CatalogError::Transport {
                    url: url.to_string(),
                    reason: t.to_string(),
                },
            })?;

        resp.into_json::<T>().map_err(|e| CatalogError::Decode {
            url: url.to_string(),
            reason: e.to_string(),
        })
    }
}

impl CatalogSource for HttpCatalog {
    fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
        let entries: Vec<CategoryEntry> = self.get_json(&self.categories_url())?;
        Ok(entries.into_iter().map(CategoryEntry::into_label).collect())
    }

    fn fetch_products(&self, category: &str) -> Result<ProductResponse, CatalogError> {
        self.get_json(&self.products_url(category))
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
