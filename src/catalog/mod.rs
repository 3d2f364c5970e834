/// Product catalog access: wire types, the HTTP client, and the cached store.
///
/// The catalog is a third-party JSON API exposing two read-only endpoints:
///
/// - `GET /products/categories`: list of category labels
/// - `GET /products/category/{category}`: products in one category
///
/// [`CatalogSource`] is the seam between the store and the network so the
/// store can be exercised against an in-process fake.
use serde::{Deserialize, Deserializer, Serialize};

pub mod client;
pub mod store;

pub use client::HttpCatalog;
pub use store::{CatalogStore, FetchStats};

use crate::error::CatalogError;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A single catalog product. Fields other than `id`, `title` and `price` are
/// ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub title: String,
    /// `None` when the catalog sends a missing, `null` or non-numeric price.
    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,
}

impl Product {
    /// Build a product with a numeric price.
    pub fn new(id: u64, title: impl Into<String>, price: f64) -> Self {
        Self {
            id,
            title: title.into(),
            price: Some(price),
        }
    }

    /// Build a product whose price is absent or not a number.
    pub fn unpriced(id: u64, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            price: None,
        }
    }
}

/// Response body of the per-category endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductResponse {
    #[serde(default)]
    pub products: Vec<Product>,
    /// Informational only; nothing downstream reads it.
    #[serde(default, deserialize_with = "lenient_total")]
    pub total: u64,
}

/// One entry of the categories endpoint.
///
/// Older catalog versions answer with plain strings, newer ones with
/// `{slug, name, url}` objects. The slug is what the per-category URL takes.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum CategoryEntry {
    Label(String),
    Detailed { slug: String },
}

impl CategoryEntry {
    pub fn into_label(self) -> String {
        match self {
            Self::Label(label) => label,
            Self::Detailed { slug } => slug,
        }
    }
}

/// Accept any JSON value for `price`, keeping only numbers.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_f64())
}

/// Like [`lenient_price`]: a `null` or non-integer total reads as 0.
fn lenient_total<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(value.as_u64().unwrap_or(0))
}

// ---------------------------------------------------------------------------
// Source abstraction
// ---------------------------------------------------------------------------

/// Something that can answer catalog queries, usually over the network.
pub trait CatalogSource {
    /// Fetch all category labels, in the order the catalog returns them.
    fn fetch_categories(&self) -> Result<Vec<String>, CatalogError>;

    /// Fetch the products of one category.
    fn fetch_products(&self, category: &str) -> Result<ProductResponse, CatalogError>;

    /// Short human-readable description used in diagnostics.
    fn describe(&self) -> String {
        "catalog".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_response_ignores_extra_fields() {
        let json = r#"{
            "products": [
                {"id": 1, "title": "Mascara", "price": 9.99, "rating": 4.9, "stock": 5}
            ],
            "total": 1, "skip": 0, "limit": 30
        }"#;
        let resp: ProductResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.products, vec![Product::new(1, "Mascara", 9.99)]);
        assert_eq!(resp.total, 1);
    }

    #[test]
    fn non_numeric_price_becomes_none() {
        let json = r#"{"products": [
            {"id": 1, "title": "A", "price": "12"},
            {"id": 2, "title": "B", "price": null},
            {"id": 3, "title": "C"}
        ], "total": 3}"#;
        let resp: ProductResponse = serde_json::from_str(json).unwrap();
        assert!(resp.products.iter().all(|p| p.price.is_none()));
    }

    #[test]
    fn null_total_does_not_reject_products() {
        let json = r#"{"products": [{"id": 1, "title": "A", "price": 1}], "total": null}"#;
        let resp: ProductResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.products, vec![Product::new(1, "A", 1.0)]);
        assert_eq!(resp.total, 0);

        let json = r#"{"products": [], "total": "many"}"#;
        let resp: ProductResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.total, 0);
    }

    #[test]
    fn category_entries_accept_both_shapes() {
        let json = r#"["beauty", {"slug": "home-decoration", "name": "Home Decoration", "url": "x"}]"#;
        let entries: Vec<CategoryEntry> = serde_json::from_str(json).unwrap();
        let labels: Vec<String> = entries.into_iter().map(CategoryEntry::into_label).collect();
        assert_eq!(labels, vec!["beauty", "home-decoration"]);
    }
}
