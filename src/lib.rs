//! Track Manager - Race event simulation
//!
//! Keeps drivers, lap times, a pit queue, a circular track layout and a
//! single-elimination bracket in memory, driven from a text menu.

pub mod menu;
pub mod race_manager;

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;

use menu::{Session, Terminal};
use race_manager::{RaceConfig, RaceManager};

#[derive(Parser, Debug)]
#[command(about = "Manage drivers, pit stops, track layout and bracket for a race event")]
pub struct Cli {
    /// JSON race configuration; missing fields fall back to the stock event
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Log level written to stderr (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn")]
    pub log_level: log::LevelFilter,
}

/// Load the configured event, or the stock one
pub fn load_manager(config: Option<&Path>) -> Result<RaceManager> {
    let config = match config {
        Some(path) => RaceConfig::from_json_file(path)
            .with_context(|| format!("read race config {}", path.display()))?,
        None => RaceConfig::default(),
    };
    RaceManager::from_config(&config).context("seed race manager")
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level)
        .parse_default_env()
        .init();

    let manager = load_manager(cli.config.as_deref())?;
    log::info!("Track manager initialized");

    let input = Terminal::new().context("init terminal")?;
    let mut session = Session::new(manager, input, io::stdout());
    session.run().context("menu session")?;
    Ok(())
}
