// src/main.rs
mod app;
mod config;
mod db;
mod error;
mod export;

use anyhow::{Context, Result};
use app::tui::run_tui;
use clap::Parser;
use config::ConnectionConfig;
use export::orchestrator::{default_output_path, export};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "Export PostgreSQL table data as a SQLite replay script", long_about = None)]
struct Args {
    /// YAML or JSON file with host, port, dbname, user and password
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, env = "PGHOST")]
    host: Option<String>,
    #[arg(long, env = "PGPORT")]
    port: Option<u16>,
    #[arg(long, env = "PGDATABASE")]
    dbname: Option<String>,
    #[arg(long, env = "PGUSER")]
    user: Option<String>,
    #[arg(long, env = "PGPASSWORD", hide_env_values = true)]
    password: Option<String>,
    #[arg(long, default_value_t = false)]
    tui: bool,
}

impl Args {
    fn connection_overrides(&self) -> ConnectionConfig {
        ConnectionConfig {
            host: self.host.clone(),
            port: self.port,
            dbname: self.dbname.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    if args.tui {
        run_tui().await?;
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let file_config = match &args.config {
        Some(path) => ConnectionConfig::from_file(path)?,
        None => ConnectionConfig::default(),
    };
    let params = file_config.merge(args.connection_overrides()).resolve()?;
    let output_file = default_output_path().context("Failed to resolve working directory")?;

    println!("--- PostgreSQL Data Export ---");
    println!("Connection: {}", params);
    println!("Output: {}", output_file.display());
    println!("------------------------------");

    let summary = export(&params, &output_file).await?;

    println!("------------------------------");
    println!("Exported {} tables ({} rows). Process completed successfully!", summary.tables, summary.rows);
    Ok(())
}
