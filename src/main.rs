use anyhow::Result;
use clap::{Parser, Subcommand};

use pricelens::cli::{self, OutputFormat};
use pricelens::{config, web};

#[derive(Debug, Parser)]
#[command(name = "pricelens")]
#[command(about = "Filter a product catalog by category and chart product prices")]
struct App {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List the catalog's product categories
    Categories {
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// List the products of one category
    Products {
        category: String,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
    },
    /// Run a price report for a category, optionally narrowed to some products
    Report {
        category: String,
        /// Product title to include (repeatable). Omit to report the whole category.
        #[arg(short, long = "product")]
        products: Vec<String>,
        /// Output format: table (default), json, csv
        #[arg(long, default_value = "table")]
        format: String,
        /// Skip the artificial report delay
        #[arg(long)]
        no_delay: bool,
    },
    /// Serve the interactive dashboard in the browser
    Web {
        /// Listen address (default from config, 127.0.0.1:9747)
        #[arg(long)]
        addr: Option<String>,
    },
    /// Show or edit configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Inspect or clear the persisted response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
    /// Show recent diagnostics (fetch failures, empty results)
    Log {
        /// Number of entries to show
        #[arg(long, default_value = "20")]
        limit: usize,
    },
    /// Check catalog reachability, config and cache
    Health,
}

#[derive(Debug, Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,
    /// Write the default config to ~/.pricelens/config.toml
    Init {
        #[arg(long)]
        force: bool,
    },
    /// Set one key, e.g. `report.delay_ms 500`
    Set { key: String, value: String },
    /// Overwrite the global config with defaults
    Reset,
}

#[derive(Debug, Subcommand)]
enum CacheAction {
    /// List cached keys
    Show,
    /// Delete the persisted cache file
    Clear,
}

fn main() -> Result<()> {
    let app = App::parse();

    match app.command {
        Commands::Categories { format } => {
            cli::run_categories(OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Products { category, format } => {
            cli::run_products(&category, OutputFormat::from_str_opt(Some(&format)))
        }
        Commands::Report {
            category,
            products,
            format,
            no_delay,
        } => cli::run_report(
            &category,
            &products,
            OutputFormat::from_str_opt(Some(&format)),
            no_delay,
        ),
        Commands::Web { addr } => {
            let cfg = config::load();
            let addr = addr.unwrap_or_else(|| cfg.web.addr.clone());
            web::serve(&addr, &cfg)
        }
        Commands::Config { action } => match action {
            ConfigAction::Show => cli::run_config_show(),
            ConfigAction::Init { force } => cli::run_config_init(force),
            ConfigAction::Set { key, value } => cli::run_config_set(&key, &value),
            ConfigAction::Reset => cli::run_config_reset(),
        },
        Commands::Cache { action } => match action {
            CacheAction::Show => cli::run_cache_show(),
            CacheAction::Clear => cli::run_cache_clear(),
        },
        Commands::Log { limit } => cli::run_log(limit),
        Commands::Health => cli::run_health(),
    }
}
