//! Embedded web dashboard for pricelens.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard: category picker, product checkboxes, price chart
//! - JSON API endpoints that apply dashboard actions and return the new state
//!
//! Launched via `pricelens web` (default: `http://127.0.0.1:9747`).

mod api;
mod frontend;

use std::io::Cursor;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};

use crate::config::PricelensConfig;
use crate::state::{ImmediateScheduler, ReportTicket, Session};

/// How often the server loop wakes up to fire a due report.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

/// A report run waiting for its delay to elapse.
#[derive(Debug, Clone, Copy)]
struct PendingReport {
    ticket: ReportTicket,
    due: Instant,
}

/// The server-side dashboard: one session plus the report timer.
pub struct Dashboard {
    session: Session,
    pending: Option<PendingReport>,
}

impl Dashboard {
    pub fn new(session: Session) -> Self {
        Self {
            session,
            pending: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub(crate) fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Start a report; it completes on the first [`Dashboard::poll`] after
    /// the configured delay.
    pub fn run_report(&mut self) -> bool {
        match self.session.request_report() {
            Some(ticket) => {
                self.pending = Some(PendingReport {
                    ticket,
                    due: Instant::now() + self.session.report_delay(),
                });
                true
            }
            None => false,
        }
    }

    /// Fire the pending report if it is due. Tickets the session has since
    /// cancelled are discarded without running.
    pub fn poll(&mut self, now: Instant) {
        let Some(pending) = self.pending else {
            return;
        };
        if self.session.state().pending_ticket() != Some(pending.ticket) {
            self.pending = None;
            return;
        }
        if pending.due <= now {
            self.pending = None;
            self.session.complete_report(pending.ticket);
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Requests are handled one at a time; between
/// requests the loop wakes every [`POLL_INTERVAL`] to complete a due report.
pub fn serve(addr: &str, config: &PricelensConfig) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    let mut session = Session::from_config(config, Box::new(ImmediateScheduler));
    session.start();
    let mut dashboard = Dashboard::new(session);

    println!("pricelens dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");

    let url = format!("http://{addr}");
    let _ = open_browser(&url);

    loop {
        dashboard.poll(Instant::now());

        let mut request = match server.recv_timeout(POLL_INTERVAL) {
            Ok(Some(request)) => request,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("request error: {e}");
                continue;
            }
        };

        let method = request.method().clone();
        let url = request.url().to_string();

        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            let _ = request.as_reader().read_to_string(&mut buf);
            Some(buf)
        } else {
            None
        };

        match dispatch(&mut dashboard, &method, &url, body.as_deref()) {
            Ok(resp) => {
                let _ = request.respond(resp);
            }
            Err(e) => {
                let _ = request.respond(error_response(&e, 400));
            }
        }

        println!(
            "{} {} {}",
            method,
            url,
            chrono::Local::now().format("%H:%M:%S")
        );
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    dashboard: &mut Dashboard,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let path = url.split('?').next().unwrap_or(url);
    let body = body.unwrap_or("{}");

    match (method, path) {
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        (&Method::Get, "/api/state") => api::get_state(dashboard),
        (&Method::Post, "/api/category") => api::post_category(dashboard, body),
        (&Method::Post, "/api/products") => api::post_products(dashboard, body),
        (&Method::Post, "/api/toggle") => api::post_toggle(dashboard, body),
        (&Method::Post, "/api/clear") => api::post_clear(dashboard),
        (&Method::Post, "/api/report") => api::post_report(dashboard),

        (&Method::Get, "/api/health") => api::get_health(dashboard),

        _ => Ok(not_found()),
    }
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    Response::from_data(frontend::INDEX_HTML.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

fn error_response(err: &anyhow::Error, status: u16) -> Response<Cursor<Vec<u8>>> {
    let body = serde_json::json!({ "error": format!("{err:#}") }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(status))
}

pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::catalog::{CatalogSource, CatalogStore, Product, ProductResponse};
    use crate::diagnostics::DiagnosticLog;
    use crate::error::CatalogError;

    struct StaticCatalog;

    impl CatalogSource for StaticCatalog {
        fn fetch_categories(&self) -> Result<Vec<String>, CatalogError> {
            Ok(vec!["beauty".to_string(), "groceries".to_string()])
        }

        fn fetch_products(&self, category: &str) -> Result<ProductResponse, CatalogError> {
            let products = match category {
                "beauty" => vec![Product::new(1, "A", 10.0), Product::new(2, "B", 20.0)],
                _ => vec![Product::new(3, "Apple", 1.5)],
            };
            let total = products.len() as u64;
            Ok(ProductResponse { products, total })
        }
    }

    pub(crate) fn dashboard(delay: Duration) -> Dashboard {
        let store = CatalogStore::new(
            Box::new(StaticCatalog),
            Box::new(MemoryCache::new()),
            DiagnosticLog::in_memory(),
        );
        let mut session = Session::new(store, Box::new(ImmediateScheduler), delay, false);
        session.start();
        Dashboard::new(session)
    }

    #[test]
    fn report_completes_only_after_delay() {
        let mut d = dashboard(Duration::from_secs(60));
        d.session_mut().select_category("beauty");
        assert!(d.run_report());
        assert!(d.session().state().loading);

        d.poll(Instant::now());
        assert!(d.session().state().report.is_none());

        d.poll(Instant::now() + Duration::from_secs(61));
        assert!(!d.session().state().loading);
        assert!(d.session().state().report.is_some());
    }

    #[test]
    fn clearing_during_delay_cancels_report() {
        let mut d = dashboard(Duration::from_secs(60));
        d.session_mut().select_category("beauty");
        assert!(d.run_report());
        d.session_mut().clear_filters();

        d.poll(Instant::now() + Duration::from_secs(61));
        assert!(d.session().state().report.is_none());
        assert!(d.pending.is_none());
    }

    #[test]
    fn toggling_during_delay_keeps_run_selection() {
        let mut d = dashboard(Duration::from_secs(3));
        d.session_mut().select_category("beauty");
        d.session_mut().toggle_product("A");
        assert!(d.run_report());

        d.session_mut().toggle_product("B");
        d.poll(Instant::now() + Duration::from_secs(4));

        let report = d.session().state().report.as_ref().unwrap();
        assert_eq!(report.x_axis_labels, vec!["A"]);
        assert_eq!(report.y_values, vec![Some(10.0)]);
    }

    #[test]
    fn run_without_products_is_refused() {
        let mut d = dashboard(Duration::ZERO);
        assert!(!d.run_report());
        assert!(d.pending.is_none());
    }

    #[test]
    fn dispatch_routes_and_404s() {
        let mut d = dashboard(Duration::ZERO);
        let resp = dispatch(&mut d, &Method::Get, "/", None).unwrap();
        assert_eq!(resp.status_code().0, 200);

        let resp = dispatch(&mut d, &Method::Get, "/api/state?x=1", None).unwrap();
        assert_eq!(resp.status_code().0, 200);

        let resp = dispatch(&mut d, &Method::Get, "/nope", None).unwrap();
        assert_eq!(resp.status_code().0, 404);
    }

    #[test]
    fn dispatch_rejects_malformed_body() {
        let mut d = dashboard(Duration::ZERO);
        let result = dispatch(&mut d, &Method::Post, "/api/category", Some("not json"));
        assert!(result.is_err());
    }
}
