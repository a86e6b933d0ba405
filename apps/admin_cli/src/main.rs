use std::{path::PathBuf, sync::Arc};

use admin_client::HttpRequestClient;
use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod console;

use commands::{Command, Session};
use config::load_settings;

#[derive(Parser, Debug)]
#[command(about = "Operator console for users, groups and policies")]
struct Args {
    /// Base URL of the admin API, e.g. http://127.0.0.1:8080/api/v1
    #[arg(long)]
    server_url: Option<String>,
    #[arg(long, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_ms: Option<u64>,
    #[arg(long)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(args.config.as_deref())?;
    if let Some(server_url) = args.server_url {
        settings.server_url = server_url;
    }
    if let Some(timeout_ms) = args.timeout_ms {
        settings.request_timeout_ms = timeout_ms;
    }

    let client = HttpRequestClient::new(settings.server_url.clone(), settings.request_timeout())
        .with_context(|| format!("cannot talk to '{}'", settings.server_url))?;

    Session::new(Arc::new(client)).run(args.command).await
}
