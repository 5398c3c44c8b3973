// idnb - Indonesian administrative boundary reconciliation CLI

mod compare;
mod exit_codes;
mod export;
mod load;
mod progress;
mod seed;
mod serve;
mod sync;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use idnb_core::Level;
use idnb_sync::CancelToken;

use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "idnb")]
#[command(about = "Indonesian administrative boundary reconciliation")]
#[command(version)]
struct Cli {
    /// Path to the SQLite store
    #[arg(long, env = "IDNB_DB", default_value = "boundaries.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

fn parse_level(s: &str) -> Result<Level, String> {
    s.parse::<Level>().map_err(|e| e.to_string())
}

#[derive(Subcommand)]
enum Commands {
    /// Seed canonical areas for all four levels from CSV files
    #[command(after_help = "\
Examples:
  idnb seed reference/
  (expects provinces.csv, regencies.csv, districts.csv, villages.csv)")]
    Seed {
        /// Directory containing one CSV per level
        dir: PathBuf,
    },

    /// Load raw boundary features for one level from a GeoJSON file
    #[command(after_help = "\
Examples:
  idnb load provinces raw-data/provinces.geojson
  idnb load villages raw-data/villages.geojson")]
    Load {
        /// Level: provinces, regencies, districts, or villages
        #[arg(value_parser = parse_level)]
        level: Level,

        /// GeoJSON FeatureCollection of raw features
        file: PathBuf,
    },

    /// Reconcile unmatched boundary records against the canonical hierarchy
    #[command(after_help = "\
Examples:
  idnb sync provinces
  idnb sync regencies --force
  idnb sync villages --bulk --concurrency 16")]
    Sync {
        /// Level: provinces, regencies, districts, or villages
        #[arg(value_parser = parse_level)]
        level: Level,

        /// Clear prior match state before resolving again
        #[arg(long)]
        force: bool,

        /// Use the stricter set-based 1:1 policy instead of per-record
        /// resolution
        #[arg(long)]
        bulk: bool,

        /// Worker count for per-record resolution
        #[arg(long, env = "IDNB_CONCURRENCY", default_value_t = 10)]
        concurrency: usize,
    },

    /// Write one GeoJSON Feature per matched boundary, named by code
    #[command(after_help = "\
Examples:
  idnb export regencies
  idnb export villages --out data/")]
    Export {
        /// Level: provinces, regencies, districts, or villages
        #[arg(value_parser = parse_level)]
        level: Level,

        /// Output directory (one subdirectory per level)
        #[arg(long, default_value = "data")]
        out: PathBuf,
    },

    /// Serve exported boundaries over HTTP
    #[command(after_help = "\
Examples:
  idnb serve
  idnb serve --addr 0.0.0.0:3000 --data data/
  (then GET /regencies/31.75.geojson)")]
    Serve {
        /// Directory holding local exports
        #[arg(long, default_value = "data")]
        data: PathBuf,

        /// Listen address
        #[arg(long, env = "IDNB_ADDR", default_value = "127.0.0.1:3000")]
        addr: String,
    },

    /// Diff a local exported boundary against the published upstream one
    #[command(after_help = "\
Examples:
  idnb compare regencies 31.75
  idnb compare provinces 31 --data data/")]
    Compare {
        /// Level: provinces, regencies, districts, or villages
        #[arg(value_parser = parse_level)]
        level: Level,

        /// Canonical area code
        code: String,

        /// Directory holding local exports
        #[arg(long, default_value = "data")]
        data: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // One cancellation token per process; SIGINT flips it and every engine
    // entry point observes it cooperatively.
    let cancel: CancelToken = Arc::new(AtomicBool::new(false));
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed)) {
            eprintln!("warning: cannot install interrupt handler: {e}");
        }
    }

    let result = match cli.command {
        Commands::Seed { dir } => seed::cmd_seed(&cli.db, &dir),
        Commands::Load { level, file } => load::cmd_load(&cli.db, level, &file, &cancel),
        Commands::Sync { level, force, bulk, concurrency } => {
            sync::cmd_sync(&cli.db, level, force, bulk, concurrency, &cancel)
        }
        Commands::Export { level, out } => export::cmd_export(&cli.db, level, &out, &cancel),
        Commands::Serve { data, addr } => serve::cmd_serve(&data, &addr, &cancel),
        Commands::Compare { level, code, data } => {
            compare::cmd_compare(level, &code, &data, &cancel)
        }
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {message}");
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {hint}");
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn no_data(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_NO_DATA, message: msg.into(), hint: None }
    }

    pub fn store(err: impl std::fmt::Display) -> Self {
        Self { code: exit_codes::EXIT_STORE, message: err.to_string(), hint: None }
    }

    pub fn fetch(msg: impl Into<String>) -> Self {
        Self { code: exit_codes::EXIT_FETCH, message: msg.into(), hint: None }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}
