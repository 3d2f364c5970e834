//! Report derivation: products + selected titles → chart axis data.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::Product;

/// Chart-ready result of a report run.
///
/// `y_values` entries are `None` only on the full-list fallback, where a
/// product's price was missing or non-numeric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportResult {
    pub x_axis_labels: Vec<String>,
    pub y_values: Vec<Option<f64>>,
}

impl ReportResult {
    /// Whether labels and values line up one-to-one.
    ///
    /// Can be `false` when some selected products have no numeric price: the
    /// labels keep the matched titles while the values fall back to the whole
    /// category.
    pub fn is_aligned(&self) -> bool {
        self.x_axis_labels.len() == self.y_values.len()
    }
}

/// Derive the chart series for `products` given the user's `selected` titles.
///
/// Labels and values are derived independently, each falling back to the
/// full category when its own filtered list comes out empty.
pub fn derive_report(products: &[Product], selected: &HashSet<String>) -> ReportResult {
    let all_titles: Vec<String> = products.iter().map(|p| p.title.clone()).collect();

    let matched_titles: Vec<String> = all_titles
        .iter()
        .filter(|title| selected.contains(*title))
        .cloned()
        .collect();

    let x_axis_labels = if matched_titles.is_empty() {
        all_titles
    } else {
        matched_titles
    };

    let matched_prices: Vec<Option<f64>> = products
        .iter()
        .filter(|p| selected.contains(&p.title))
        .filter_map(|p| p.price)
        .map(Some)
        .collect();

    let y_values = if matched_prices.is_empty() {
        products.iter().map(|p| p.price).collect()
    } else {
        matched_prices
    };

    ReportResult {
        x_axis_labels,
        y_values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn two_products() -> Vec<Product> {
        vec![Product::new(1, "A", 10.0), Product::new(2, "B", 20.0)]
    }

    #[test]
    fn single_match_reports_only_that_product() {
        let report = derive_report(&two_products(), &titles(&["B"]));
        assert_eq!(report.x_axis_labels, vec!["B"]);
        assert_eq!(report.y_values, vec![Some(20.0)]);
    }

    #[test]
    fn empty_selection_falls_back_to_whole_category() {
        let report = derive_report(&two_products(), &titles(&[]));
        assert_eq!(report.x_axis_labels, vec!["A", "B"]);
        assert_eq!(report.y_values, vec![Some(10.0), Some(20.0)]);
    }

    #[test]
    fn no_products_yields_empty_report() {
        let report = derive_report(&[], &titles(&["X"]));
        assert!(report.x_axis_labels.is_empty());
        assert!(report.y_values.is_empty());
    }

    #[test]
    fn selection_without_matches_falls_back() {
        let report = derive_report(&two_products(), &titles(&["Z"]));
        assert_eq!(report.x_axis_labels, vec!["A", "B"]);
        assert_eq!(report.y_values, vec![Some(10.0), Some(20.0)]);
    }

    #[test]
    fn matched_labels_follow_catalog_order() {
        let products = vec![
            Product::new(1, "C", 3.0),
            Product::new(2, "A", 1.0),
            Product::new(3, "B", 2.0),
        ];
        let report = derive_report(&products, &titles(&["B", "C"]));
        assert_eq!(report.x_axis_labels, vec!["C", "B"]);
        assert_eq!(report.y_values, vec![Some(3.0), Some(2.0)]);
    }

    #[test]
    fn unpriced_selection_desynchronizes_axes() {
        let products = vec![
            Product::new(1, "A", 10.0),
            Product::unpriced(2, "B"),
            Product::new(3, "C", 30.0),
        ];
        let report = derive_report(&products, &titles(&["B"]));
        assert_eq!(report.x_axis_labels, vec!["B"]);
        assert_eq!(report.y_values, vec![Some(10.0), None, Some(30.0)]);
        assert!(!report.is_aligned());
    }

    #[test]
    fn partially_priced_selection_drops_unpriced_values() {
        let products = vec![Product::new(1, "A", 10.0), Product::unpriced(2, "B")];
        let report = derive_report(&products, &titles(&["A", "B"]));
        assert_eq!(report.x_axis_labels, vec!["A", "B"]);
        assert_eq!(report.y_values, vec![Some(10.0)]);
        assert!(!report.is_aligned());
    }

    #[test]
    fn derivation_is_idempotent() {
        let products = two_products();
        let selected = titles(&["A"]);
        assert_eq!(
            derive_report(&products, &selected),
            derive_report(&products, &selected)
        );
    }
}
