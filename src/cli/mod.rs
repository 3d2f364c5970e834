//! CLI command implementations.
//!
//! Provides subcommand handlers for:
//! - `pricelens categories`: list catalog categories
//! - `pricelens products <category>`: list a category's products
//! - `pricelens report <category> [-p title]...`: run a price report and chart it
//! - `pricelens health`: catalog reachability, config and cache status
//! - `pricelens log`: recent diagnostics
//! - `pricelens cache show|clear`: persisted cache management
//! - `pricelens config show|init|set|reset`: configuration management

use std::collections::HashSet;

use anyhow::Result;
use colored::Colorize;

use crate::cache::{self, KeyValueCache};
use crate::catalog::{HttpCatalog, Product};
use crate::config;
use crate::diagnostics::{self, DiagnosticEntry};
use crate::report::{ChartSpec, ReportResult};
use crate::state::{ImmediateScheduler, Scheduler, Session, ThreadScheduler};

/// Width of the longest bar in the terminal chart.
const BAR_WIDTH: usize = 40;

/// Output format for listing and report commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
}

impl OutputFormat {
    pub fn from_str_opt(s: Option<&str>) -> Self {
        match s {
            Some("json") => Self::Json,
            Some("csv") => Self::Csv,
            _ => Self::Table,
        }
    }
}

fn new_session(no_delay: bool) -> Session {
    let cfg = config::load();
    let scheduler: Box<dyn Scheduler> = if no_delay {
        Box::new(ImmediateScheduler)
    } else {
        Box::new(ThreadScheduler)
    };
    Session::from_config(&cfg, scheduler)
}

fn print_nothing_loaded(session: &Session, what: &str) {
    let hint = match session.store().diagnostics().path() {
        Some(path) => format!("See {} or run `pricelens log`.", path.display()),
        None => "Diagnostics logging is disabled.".to_string(),
    };
    println!("{}", format!("No {what} loaded. {hint}").yellow());
}

// ---------------------------------------------------------------------------
// pricelens categories
// ---------------------------------------------------------------------------

/// List the catalog categories.
pub fn run_categories(format: OutputFormat) -> Result<()> {
    let mut session = new_session(true);
    session.start();
    let categories = &session.state().categories;

    if categories.is_empty() {
        print_nothing_loaded(&session, "categories");
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(categories)?),
        OutputFormat::Csv => {
            println!("category");
            for c in categories {
                println!("{}", csv_field(c));
            }
        }
        OutputFormat::Table => {
            println!("{}", "Categories".bold().cyan());
            println!("{}", "=".repeat(40));
            for c in categories {
                println!("  {c}");
            }
        }
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// pricelens products
// ---------------------------------------------------------------------------

/// List the products of one category.
pub fn run_products(category: &str, format: OutputFormat) -> Result<()> {
    let mut session = new_session(true);
    session.select_category(category);
    let products = &session.state().products;

    if products.is_empty() {
        print_nothing_loaded(&session, &format!("products for '{category}'"));
        return Ok(());
    }

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(products)?),
        OutputFormat::Csv => print_products_csv(products),
        OutputFormat::Table => print_products_table(category, products, session.currency_symbol()),
    }

    Ok(())
}

fn print_products_table(category: &str, products: &[Product], currency: &str) {
    println!("{}", format!("Products in {category}").bold().cyan());
    println!("{}", "=".repeat(60));
    println!("  {:>5}  {:<40} {:>10}", "ID", "Title", "Price");
    println!("  {}", "-".repeat(58));
    for (i, p) in products.iter().enumerate() {
        let line = format!(
            "  {:>5}  {:<40} {:>10}",
            p.id,
            truncate(&p.title, 40),
            format_price(p.price, currency)
        );
        if i % 2 == 0 {
            println!("{line}");
        } else {
            println!("{}", line.dimmed());
        }
    }
}

fn print_products_csv(products: &[Product]) {
    println!("id,title,price");
    for p in products {
        println!(
            "{},{},{}",
            p.id,
            csv_field(&p.title),
            p.price.map(|v| v.to_string()).unwrap_or_default()
        );
    }
}

// ---------------------------------------------------------------------------
// pricelens report
// ---------------------------------------------------------------------------

/// Run a report for `category`, narrowed to `titles` when any are given.
pub fn run_report(
    category: &str,
    titles: &[String],
    format: OutputFormat,
    no_delay: bool,
) -> Result<()> {
    let mut session = new_session(no_delay);
    session.start();

    let known = &session.state().categories;
    if !known.is_empty() && !known.iter().any(|c| c == category) {
        eprintln!(
            "{} '{}' is not in the catalog's category list",
            "warning:".yellow().bold(),
            category
        );
    }

    session.select_category(category);
    if session.state().products.is_empty() {
        print_nothing_loaded(&session, &format!("products for '{category}'"));
        return Ok(());
    }

    let selected: HashSet<String> = titles.iter().cloned().collect();
    session.select_products(selected);

    if format == OutputFormat::Table && !no_delay {
        println!("{}", "Running report…".dimmed());
    }

    if session.run_report().is_none() {
        println!("{}", "Report could not be run.".yellow());
        return Ok(());
    }

    let chart = session.chart();
    let report = session.state().report.clone().unwrap_or_default();
    session.close();

    match format {
        OutputFormat::Json => print_report_json(&session, &report, &chart)?,
        OutputFormat::Csv => print_report_csv(&chart),
        OutputFormat::Table => print_report_table(&session, &report, &chart),
    }

    Ok(())
}

fn print_report_table(session: &Session, report: &ReportResult, chart: &ChartSpec) {
    println!("{}", chart.title.bold().cyan());
    println!("{}", "=".repeat(60));

    let selected = session.state().selected_titles();
    if !selected.is_empty() {
        println!("  {} {}", "Selected:".bold(), selected.join(", "));
        println!();
    }

    for line in render_bars(chart) {
        println!("{line}");
    }

    if !report.is_aligned() {
        println!();
        println!(
            "  {}",
            format!(
                "{} labels but {} values: some selected products have no numeric price.",
                report.x_axis_labels.len(),
                report.y_values.len()
            )
            .yellow()
        );
    }
}

fn print_report_json(session: &Session, report: &ReportResult, chart: &ChartSpec) -> Result<()> {
    let value = serde_json::json!({
        "category": session.state().category,
        "selected": session.state().selected_titles(),
        "report": report,
        "chart": chart,
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_report_csv(chart: &ChartSpec) {
    println!("label,price");
    for (label, value) in chart_rows(chart) {
        println!(
            "{},{}",
            csv_field(&label),
            value.map(|v| v.to_string()).unwrap_or_default()
        );
    }
}

/// Pair x categories with series values by index, the way a column chart
/// plots them when the two lengths differ.
fn chart_rows(chart: &ChartSpec) -> Vec<(String, Option<f64>)> {
    let rows = chart.x_categories.len().max(chart.series.len());
    (0..rows)
        .map(|i| {
            let label = chart
                .x_categories
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("#{}", i + 1));
            (label, chart.series.get(i).copied().flatten())
        })
        .collect()
}

/// Render the chart as horizontal bars scaled to the largest value.
fn render_bars(chart: &ChartSpec) -> Vec<String> {
    let rows = chart_rows(chart);
    let max = rows
        .iter()
        .filter_map(|(_, v)| *v)
        .fold(0.0_f64, f64::max);

    rows.iter()
        .map(|(label, value)| {
            let width = match value {
                Some(v) if max > 0.0 && *v > 0.0 => {
                    ((v / max) * BAR_WIDTH as f64).round().max(1.0) as usize
                }
                _ => 0,
            };
            format!(
                "  {:<28} {} {}",
                truncate(label, 28),
                "█".repeat(width).blue(),
                chart.format_value(*value).dimmed()
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// pricelens health
// ---------------------------------------------------------------------------

/// Check catalog reachability, config files, cache and diagnostics.
pub fn run_health() -> Result<()> {
    println!("{}", "pricelens Health Check".bold().cyan());
    println!("{}", "=".repeat(40));

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let cfg = config::load();

    print_health_item(
        "Global config",
        global_exists,
        if global_exists {
            "~/.pricelens/config.toml found"
        } else {
            "not found (run `pricelens config init` to create)"
        },
    );
    print_health_item(
        "Project config",
        project_exists,
        if project_exists {
            ".pricelens.toml found"
        } else {
            "none (optional)"
        },
    );

    let client = HttpCatalog::from_config(&cfg.catalog);
    let reachable = client.is_reachable();
    print_health_item(
        "Catalog",
        reachable,
        &if reachable {
            format!("reachable at {}", cfg.catalog.base_url)
        } else {
            format!("not reachable at {}", cfg.catalog.base_url)
        },
    );

    let cache_detail = match (cfg.cache.enabled, cfg.cache.persist) {
        (false, _) => "disabled".to_string(),
        (true, false) => "in-memory (per run)".to_string(),
        (true, true) => {
            let entries = cache::FileCache::open(
                config::expand_home(&cfg.cache.path).unwrap_or_default(),
            )
            .len();
            format!("{} ({} entries)", cfg.cache.path, entries)
        }
    };
    print_health_item("Cache", cfg.cache.enabled, &cache_detail);

    print_health_item(
        "Report delay",
        true,
        &format!(
            "{} ms{}",
            cfg.report.delay_ms,
            if cfg.report.lock_after_run {
                ", locked after run"
            } else {
                ""
            }
        ),
    );

    let log_path = config::expand_home(&cfg.logging.path);
    let log_entries = log_path
        .as_deref()
        .map(diagnostics::read_entries)
        .map(|e| e.len())
        .unwrap_or(0);
    print_health_item(
        "Diagnostics",
        cfg.logging.enabled,
        &if cfg.logging.enabled {
            format!("{} entries", log_entries)
        } else {
            "disabled".to_string()
        },
    );

    Ok(())
}

fn print_health_item(name: &str, ok: bool, detail: &str) {
    let status = if ok {
        "✓".green().bold()
    } else {
        "✗".red().bold()
    };
    println!("  {} {:<18} {}", status, name, detail.dimmed());
}

// ---------------------------------------------------------------------------
// pricelens log
// ---------------------------------------------------------------------------

/// Show the most recent diagnostics entries.
pub fn run_log(limit: usize) -> Result<()> {
    let cfg = config::load();
    let Some(path) = config::expand_home(&cfg.logging.path) else {
        println!("{}", "No diagnostics path configured.".yellow());
        return Ok(());
    };

    let entries = diagnostics::read_recent(&path, limit);
    if entries.is_empty() {
        println!("{}", "No diagnostics recorded.".green());
        return Ok(());
    }

    for entry in &entries {
        println!("{}", format_log_entry(entry));
    }
    Ok(())
}

fn format_log_entry(entry: &DiagnosticEntry) -> String {
    let level = match entry.level.as_str() {
        "warn" => entry.level.yellow(),
        "error" => entry.level.red(),
        _ => entry.level.normal(),
    };
    format!(
        "{} {:<5} {:<20} {}",
        entry.timestamp.dimmed(),
        level,
        entry.source,
        entry.message
    )
}

// ---------------------------------------------------------------------------
// pricelens cache show | clear
// ---------------------------------------------------------------------------

/// List keys in the persisted cache.
pub fn run_cache_show() -> Result<()> {
    let cfg = config::load();
    let Some(path) = config::expand_home(&cfg.cache.path) else {
        println!("{}", "No cache path configured.".yellow());
        return Ok(());
    };

    let file_cache = cache::FileCache::open(&path);
    println!("{} {}", "Cache file:".bold(), file_cache.path().display());
    if !cfg.cache.persist {
        println!(
            "  {}",
            "persistence is off (set cache.persist = true to use this file)".dimmed()
        );
    }
    if file_cache.is_empty() {
        println!("  {}", "(empty)".dimmed());
    }
    for key in file_cache.keys() {
        println!("  {key}");
    }
    Ok(())
}

/// Delete the persisted cache file.
pub fn run_cache_clear() -> Result<()> {
    let cfg = config::load();
    let Some(path) = config::expand_home(&cfg.cache.path) else {
        println!("{}", "No cache path configured.".yellow());
        return Ok(());
    };

    if cache::clear_file(&path)? {
        println!("{} Removed {}", "✓".green().bold(), path.display());
    } else {
        println!("{}", "Cache file does not exist.".dimmed());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// pricelens config show | init | set | reset
// ---------------------------------------------------------------------------

/// Show the effective (merged) configuration as TOML.
pub fn run_config_show() -> Result<()> {
    let toml_str = config::show_effective_config()?;
    println!("{}", "Effective pricelens Configuration".bold().cyan());
    println!("{}", "=".repeat(50));
    println!();
    println!("{toml_str}");

    let global_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    let project_exists = config::project_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);
    println!("{}", "Sources (highest priority last):".dimmed());
    println!("  {} built-in defaults", "·".dimmed());
    print_source("~/.pricelens/config.toml", global_exists);
    print_source(".pricelens.toml", project_exists);
    println!(
        "  {} {}",
        "·".dimmed(),
        "PRICELENS_* environment variables".dimmed()
    );

    Ok(())
}

fn print_source(name: &str, exists: bool) {
    if exists {
        println!("  {} {}", "✓".green(), name.dimmed());
    } else {
        println!("  {} {}", "·".dimmed(), format!("{name} (not found)").dimmed());
    }
}

/// Initialize a default config file at `~/.pricelens/config.toml`.
pub fn run_config_init(force: bool) -> Result<()> {
    let path = config::init_config(force)?;
    println!(
        "{} Config written to {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

/// Set a single configuration value in the global config file.
pub fn run_config_set(key: &str, value: &str) -> Result<()> {
    config::set_config_value(key, value)?;
    println!("{} Set {} = {}", "✓".green().bold(), key.bold(), value);
    Ok(())
}

/// Reset configuration to defaults.
pub fn run_config_reset() -> Result<()> {
    let path = config::reset_config()?;
    println!(
        "{} Config reset to defaults at {}",
        "✓".green().bold(),
        path.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

/// Format a price with the currency prefix, or `n/a` when missing.
fn format_price(price: Option<f64>, currency: &str) -> String {
    match price {
        Some(v) => format!("{currency}{v:.2}"),
        None => "n/a".to_string(),
    }
}

/// Truncate a string to `max_len` characters, appending "…" if truncated.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

/// Quote a CSV field if it contains a delimiter, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
