use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Catalogue comic files and read them page by page
#[derive(Parser, Debug)]
#[command(name = "shelf", version, about)]
pub struct Cli {
    /// Config file (JSON). Defaults to the per-user config location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Catalog database, overriding the config file and SHELF_DB
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Print more diagnostics to stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add PDF/CBZ/CBR files (or plain images) to the catalog
    Add {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List catalogued files by name
    List,
    /// Show one catalog entry
    Show { id: i64 },
    /// Change the display name of an entry
    Rename { id: i64, name: String },
    /// Rate an entry from 0 to 5 stars
    Rate { id: i64, stars: i64 },
    /// Page through an entry interactively (n/enter: next, p: previous, q: quit)
    Read {
        id: i64,
        /// Start at this page (1-based) instead of the saved position
        #[arg(long)]
        page: Option<usize>,
    },
    /// Write every page of an entry into a directory
    Export { id: i64, dir: PathBuf },
    /// Print the effective configuration
    Config {
        /// Write a default config file if none exists yet
        #[arg(long, default_value_t = false)]
        init: bool,
    },
}
