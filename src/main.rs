pub mod app;
pub mod cache;
pub mod checklist;
pub mod config;
pub mod data;
pub mod error;
pub mod render;
pub mod server;
pub mod snapshot;
pub mod store;
pub mod types;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the interactive map UI
    Serve {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
    },
    /// Build a standalone snapshot without the UI
    Export {
        #[arg(short, long, value_name = "FILE", default_value = "config.toml")]
        config: PathBuf,
        /// City to highlight, as region=city (repeatable)
        #[arg(short, long = "select", value_name = "REGION=CITY")]
        select: Vec<String>,
        /// Output file; defaults to the configured snapshot filename
        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match &cli.command {
        Commands::Serve { config } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            server::start_server(app_config).await?;
        }
        Commands::Export { config, select, out } => {
            let app_config = config::AppConfig::load_from_file(config)?;
            let out = out
                .clone()
                .unwrap_or_else(|| PathBuf::from(&app_config.export.filename));
            export_snapshot(app_config, select, &out)?;
            println!("Snapshot written to {:?}", out);
        }
    }

    Ok(())
}

fn export_snapshot(config: config::AppConfig, select: &[String], out: &PathBuf) -> Result<()> {
    let mut app = app::App::new(config);

    for pair in select {
        let (region, city) = pair
            .split_once('=')
            .ok_or_else(|| anyhow!("--select expects REGION=CITY, got '{}'", pair))?;
        app.ensure_loaded(region)
            .with_context(|| format!("loading region '{}'", region))?;
        match app.dataset_names(region) {
            Some(names) if names.iter().any(|n| n == city) => {
                app.toggle(region, city, true);
            }
            _ => warn!(region, city, "city not found in boundary data; skipping"),
        }
    }

    let bytes = app.build_snapshot()?;
    std::fs::write(out, bytes).with_context(|| format!("writing snapshot to {:?}", out))?;
    Ok(())
}
