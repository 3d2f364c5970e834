//! Column-chart model handed to the renderers (terminal and web).
//!
//! Mirrors how the dashboard configures its chart: until a report has run,
//! the x axis shows the category list against a placeholder series and the
//! y axis stays hidden.

use serde::Serialize;

use super::ReportResult;

/// Series shown before any report has been run.
pub const PLACEHOLDER_SERIES: [f64; 5] = [6.0, 8.0, 5.0, 7.0, 3.0];

/// Everything a renderer needs to draw the price chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub chart_type: &'static str,
    /// Empty when no category is selected.
    pub title: String,
    pub x_categories: Vec<String>,
    pub y_axis_title: String,
    pub y_axis_visible: bool,
    /// Data label format, e.g. `"₹{value:.2}"`. `None` hides the labels.
    pub data_label_format: Option<String>,
    pub series: Vec<Option<f64>>,
    /// `true` while the series is the placeholder, not a real report.
    pub placeholder: bool,
}

impl ChartSpec {
    /// Build the chart model from the current category, the category list
    /// and the last report (if any).
    pub fn build(
        category: &str,
        categories: &[String],
        report: Option<&ReportResult>,
        currency_symbol: &str,
    ) -> Self {
        let labels = report
            .map(|r| r.x_axis_labels.as_slice())
            .filter(|labels| !labels.is_empty());
        let values = report
            .map(|r| r.y_values.as_slice())
            .filter(|values| !values.is_empty());

        let title = if category.is_empty() {
            String::new()
        } else {
            format!("Products in selected {category}")
        };

        Self {
            chart_type: "column",
            title,
            x_categories: labels.unwrap_or(categories).to_vec(),
            y_axis_title: category.to_string(),
            y_axis_visible: labels.is_some(),
            data_label_format: labels.map(|_| format!("{currency_symbol}{{value:.2}}")),
            series: match values {
                Some(values) => values.to_vec(),
                None => PLACEHOLDER_SERIES.iter().copied().map(Some).collect(),
            },
            placeholder: values.is_none(),
        }
    }

    /// Format a single bar's data label using the configured currency.
    pub fn format_value(&self, value: Option<f64>) -> String {
        match (value, &self.data_label_format) {
            (Some(v), Some(fmt)) => fmt.replace("{value:.2}", &format!("{v:.2}")),
            (Some(v), None) => format!("{v}"),
            (None, _) => "n/a".to_string(),
        }
    }
}
