//! JSON API handlers for the web dashboard.
//!
//! Every mutating endpoint applies one dashboard action and answers with
//! the full state snapshot, so the page only ever renders what the server
//! returns.

use std::collections::HashSet;
use std::io::Cursor;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tiny_http::{Response, StatusCode};

use crate::catalog::FetchStats;
use crate::config;
use crate::diagnostics::DiagnosticEntry;
use crate::report::ChartSpec;
use crate::state::DashboardState;

use super::{Dashboard, content_type_json};

/// Diagnostics included in each state snapshot.
const RECENT_DIAGNOSTICS: usize = 5;

// ---------------------------------------------------------------------------
// JSON request/response types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct StateResponse<'a> {
    state: &'a DashboardState,
    /// Selected titles in catalog order.
    selected: Vec<&'a str>,
    can_run_report: bool,
    chart: ChartSpec,
    diagnostics: Vec<&'a DiagnosticEntry>,
}

#[derive(Deserialize)]
struct CategoryRequest {
    #[serde(default)]
    category: String,
}

#[derive(Deserialize)]
struct ProductsRequest {
    #[serde(default)]
    titles: Vec<String>,
}

#[derive(Deserialize)]
struct ToggleRequest {
    title: String,
}

#[derive(Serialize)]
struct HealthResponse {
    catalog: String,
    cache_entries: usize,
    stats: StatsResponse,
    report_delay_ms: u128,
    config_exists: bool,
}

#[derive(Serialize)]
struct StatsResponse {
    cache_hits: usize,
    network_calls: usize,
    failures: usize,
}

impl From<FetchStats> for StatsResponse {
    fn from(stats: FetchStats) -> Self {
        Self {
            cache_hits: stats.cache_hits,
            network_calls: stats.network_calls,
            failures: stats.failures,
        }
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(200)))
}

fn parse_body<'a, T: Deserialize<'a>>(body: &'a str, what: &str) -> Result<T> {
    serde_json::from_str(body).with_context(|| format!("invalid JSON in {what} request"))
}

fn state_response(dashboard: &Dashboard) -> StateResponse<'_> {
    let session = dashboard.session();
    let state = session.state();
    let entries: Vec<&DiagnosticEntry> = session.store().diagnostics().session_entries().collect();
    let skip = entries.len().saturating_sub(RECENT_DIAGNOSTICS);

    StateResponse {
        state,
        selected: state.selected_titles(),
        can_run_report: state.can_run_report(),
        chart: session.chart(),
        diagnostics: entries.into_iter().skip(skip).collect(),
    }
}

// ---------------------------------------------------------------------------
// API Handlers
// ---------------------------------------------------------------------------

/// `GET /api/state`: current dashboard state and chart model.
pub fn get_state(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response(&state_response(dashboard))
}

/// `POST /api/category`: `{ "category": "beauty" }`. An empty category
/// clears the selection without fetching.
pub fn post_category(dashboard: &mut Dashboard, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: CategoryRequest = parse_body(body, "category")?;
    dashboard.session_mut().select_category(&req.category);
    json_response(&state_response(dashboard))
}

/// `POST /api/products`: `{ "titles": ["..."] }` replaces the selection.
pub fn post_products(dashboard: &mut Dashboard, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ProductsRequest = parse_body(body, "products")?;
    let titles: HashSet<String> = req.titles.into_iter().collect();
    dashboard.session_mut().select_products(titles);
    json_response(&state_response(dashboard))
}

/// `POST /api/toggle`: `{ "title": "..." }` ticks or unticks one product.
pub fn post_toggle(dashboard: &mut Dashboard, body: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let req: ToggleRequest = parse_body(body, "toggle")?;
    dashboard.session_mut().toggle_product(&req.title);
    json_response(&state_response(dashboard))
}

/// `POST /api/clear`: reset category, products, selection and report.
pub fn post_clear(dashboard: &mut Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    dashboard.session_mut().clear_filters();
    json_response(&state_response(dashboard))
}

/// `POST /api/report`: start a report run. Returns immediately with
/// `loading = true`; poll `/api/state` for the result.
pub fn post_report(dashboard: &mut Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    dashboard.run_report();
    json_response(&state_response(dashboard))
}

/// `GET /api/health`: catalog, cache and config summary.
pub fn get_health(dashboard: &Dashboard) -> Result<Response<Cursor<Vec<u8>>>> {
    let session = dashboard.session();
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = HealthResponse {
        catalog: session.store().source_description(),
        cache_entries: session.store().cache().len(),
        stats: session.store().stats().into(),
        report_delay_ms: session.report_delay().as_millis(),
        config_exists,
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::web::tests::dashboard;

    fn snapshot(d: &Dashboard) -> serde_json::Value {
        serde_json::to_value(state_response(d)).unwrap()
    }

    #[test]
    fn category_request_allows_missing_field() {
        let req: CategoryRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.category, "");
    }

    #[test]
    fn initial_snapshot_shows_placeholder_chart() {
        let d = dashboard(Duration::ZERO);
        let json = snapshot(&d);
        assert_eq!(json["state"]["categories"][0], "beauty");
        assert_eq!(json["chart"]["placeholder"], true);
        assert_eq!(json["can_run_report"], false);
    }

    #[test]
    fn category_then_products_then_report() {
        let mut d = dashboard(Duration::ZERO);
        post_category(&mut d, r#"{"category":"beauty"}"#).unwrap();
        assert_eq!(d.session().state().products.len(), 2);

        post_products(&mut d, r#"{"titles":["B"]}"#).unwrap();
        assert_eq!(d.session().state().selected_titles(), vec!["B"]);

        post_report(&mut d).unwrap();
        assert!(d.session().state().loading);
        d.poll(Instant::now());

        let json = snapshot(&d);
        assert_eq!(json["state"]["report"]["x_axis_labels"][0], "B");
        assert_eq!(json["chart"]["series"][0], 20.0);
        assert_eq!(json["chart"]["title"], "Products in selected beauty");
    }

    #[test]
    fn toggle_and_clear() {
        let mut d = dashboard(Duration::ZERO);
        post_category(&mut d, r#"{"category":"beauty"}"#).unwrap();
        post_toggle(&mut d, r#"{"title":"A"}"#).unwrap();
        assert_eq!(snapshot(&d)["selected"][0], "A");

        post_clear(&mut d).unwrap();
        let json = snapshot(&d);
        assert_eq!(json["state"]["category"], "");
        assert_eq!(json["selected"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn health_reports_store_counters() {
        let mut d = dashboard(Duration::ZERO);
        post_category(&mut d, r#"{"category":"beauty"}"#).unwrap();
        post_category(&mut d, r#"{"category":"beauty"}"#).unwrap();

        let resp = get_health(&d).unwrap();
        assert_eq!(resp.status_code().0, 200);

        let stats: StatsResponse = d.session().store().stats().into();
        assert_eq!(stats.network_calls, 2);
        assert_eq!(stats.cache_hits, 1);
        assert_eq!(d.session().store().cache().len(), 2);
    }
}
