mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use shelf_core::config::{ShelfConfig, default_config_path};
use shelf_core::log::{LogConfig, LogLevel};

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = ShelfConfig::load(&config_path)?;
    if let Some(db) = &cli.db {
        config.database_path = db.clone();
    }

    let console_level = match cli.verbose {
        0 => LogLevel::WARN,
        1 => LogLevel::INFO,
        _ => LogLevel::DEBUG,
    };
    let mut log_config = LogConfig::default().with_console_level(console_level);
    if let Some(dir) = &config.log_directory {
        log_config = log_config.with_directory(dir);
    }
    if let Err(err) = shelf_core::log::init(log_config) {
        eprintln!("failed to initialise logging: {err:#}");
    }
    tracing::debug!(
        target: "shelf",
        version = shelf_core::version(),
        config = %config_path.display(),
        "starting"
    );

    commands::run(cli.command, &config, &config_path)
}
