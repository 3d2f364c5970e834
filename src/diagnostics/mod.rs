use std::collections::VecDeque;
use std::fs::{self, OpenOptions, create_dir_all};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Utc;
use colored::Colorize;
use serde::{Deserialize, Serialize};

use crate::config::schema::LoggingConfig;

/// How many entries a [`DiagnosticLog`] keeps in memory for the session.
const SESSION_TAIL: usize = 50;

// ---------------------------------------------------------------------------
// Diagnostic entry (JSONL)
// ---------------------------------------------------------------------------

/// A single line in `~/.pricelens/diagnostics.jsonl`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticEntry {
    pub timestamp: String,
    /// `"warn"` for recoverable failures, `"info"` otherwise.
    #[serde(default = "default_level")]
    pub level: String,
    /// Which component produced the entry, e.g. `"catalog.products"`.
    pub source: String,
    pub message: String,
}

fn default_level() -> String {
    "info".to_string()
}

// ---------------------------------------------------------------------------
// Log handle
// ---------------------------------------------------------------------------

/// Diagnostic channel for failures that are reported but never surfaced as
/// errors: catalog fetch failures, empty results, cache write problems.
///
/// Appends to a JSONL file (best-effort), optionally echoes to stderr, and
/// keeps a short in-memory tail for the current session.
#[derive(Debug, Default)]
pub struct DiagnosticLog {
    path: Option<PathBuf>,
    echo: bool,
    session: VecDeque<DiagnosticEntry>,
}

impl DiagnosticLog {
    /// Build a log from the `[logging]` config section.
    pub fn from_config(config: &LoggingConfig) -> Self {
        Self {
            path: if config.enabled {
                crate::config::expand_home(&config.path)
            } else {
                None
            },
            echo: config.echo,
            session: VecDeque::new(),
        }
    }

    /// A log that only keeps the in-memory tail.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Record a recoverable failure.
    pub fn warn(&mut self, source: &str, message: impl Into<String>) {
        self.record("warn", source, message.into());
    }

    /// Record an informational event.
    pub fn info(&mut self, source: &str, message: impl Into<String>) {
        self.record("info", source, message.into());
    }

    /// Entries recorded during this session, oldest first.
    pub fn session_entries(&self) -> impl Iterator<Item = &DiagnosticEntry> {
        self.session.iter()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn record(&mut self, level: &str, source: &str, message: String) {
        let entry = DiagnosticEntry {
            timestamp: Utc::now().to_rfc3339(),
            level: level.to_string(),
            source: source.to_string(),
            message,
        };

        if self.echo && level == "warn" {
            eprintln!(
                "{} {} {}",
                "warning:".yellow().bold(),
                entry.source.dimmed(),
                entry.message
            );
        }

        if let Some(path) = &self.path {
            let _ = append_entry(path, &entry);
        }

        if self.session.len() == SESSION_TAIL {
            self.session.pop_front();
        }
        self.session.push_back(entry);
    }
}

// ---------------------------------------------------------------------------
// Reading entries
// ---------------------------------------------------------------------------

/// Read all entries from a diagnostics file.
///
/// Silently skips malformed lines. Returns an empty vec if the file does not
/// exist or cannot be read.
pub fn read_entries(path: &Path) -> Vec<DiagnosticEntry> {
    let Ok(file) = fs::File::open(path) else {
        return Vec::new();
    };

    BufReader::new(file)
        .lines()
        .map_while(Result::ok)
        .filter_map(|line| serde_json::from_str::<DiagnosticEntry>(&line).ok())
        .collect()
}

/// Read the last `limit` entries, oldest first.
pub fn read_recent(path: &Path, limit: usize) -> Vec<DiagnosticEntry> {
    let mut entries = read_entries(path);
    let skip = entries.len().saturating_sub(limit);
    entries.drain(..skip);
    entries
}

// ---------------------------------------------------------------------------
// File I/O
// ---------------------------------------------------------------------------

fn append_entry(path: &Path, entry: &DiagnosticEntry) -> Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    let json = serde_json::to_string(entry)?;
    writeln!(file, "{json}")?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
