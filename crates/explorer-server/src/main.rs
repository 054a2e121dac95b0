//! Bundestag explorer: DIP search console backend and command line.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use explorer_core::ServerConfig;
use explorer_server::{build_router, AppState};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod cli;

#[derive(Parser)]
#[command(name = "explorer")]
#[command(about = "Search the Bundestag DIP and process documents with Gemini", long_about = None)]
struct Cli {
    /// Data directory (default: $EXPLORER_DATA_DIR or ./data)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server (default)
    Serve,
    /// Run a search against DIP and print the results
    Search(cli::SearchArgs),
    /// Look up persons by name
    Persons(cli::PersonsArgs),
}

fn resolve_data_dir(flag: Option<PathBuf>) -> PathBuf {
    flag.or_else(|| std::env::var("EXPLORER_DATA_DIR").ok().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let data_dir = resolve_data_dir(cli.data_dir);
    let config = ServerConfig::from_env(&data_dir)?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => serve(config).await,
        Commands::Search(args) => cli::search(config, args).await,
        Commands::Persons(args) => cli::persons(config, args).await,
    }
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("Data directory: {}", config.data_paths.root.display());
    let port = config.port;

    let state = Arc::new(AppState::new(config)?);
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Explorer server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
