pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "movie-watchlist-api")]
#[command(about = "Movie Watchlist API - personal watchlist REST service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Apply the database schema before serving")]
        migrate: bool,
    },

    #[command(about = "Create database tables and indexes, then exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    tracing::info!("Starting Movie Watchlist API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve { port: None, migrate: false }) {
        Commands::Serve { port, migrate } => commands::serve::handle(config, port, migrate).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}
