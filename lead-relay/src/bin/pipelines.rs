//! Lead Relay pipeline lister.
//!
//! Prints Pabau lead pipelines and their stages so operators can look up the
//! IDs they need. Reads `PABAU_API_KEY` from a `.env` file or the
//! environment.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, error};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lead_relay::crm::pipelines::{
    fetch_pipelines, is_usable_api_key, pipelines_url, render_pipelines, resolve_api_base,
};

#[derive(Debug, Parser)]
#[command(name = "lead-relay-pipelines", about = "List Pabau lead pipelines and stages")]
struct Args {
    /// Env file holding PABAU_API_KEY
    #[arg(long, default_value = ".env")]
    env_file: PathBuf,

    /// Pabau API base URL (falls back to PABAU_API_BASE, then the public API)
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    if let Err(e) = dotenvy::from_path(&args.env_file) {
        debug!(path = %args.env_file.display(), error = %e, "env_file_not_loaded");
    }

    let api_key = std::env::var("PABAU_API_KEY").ok();
    if !is_usable_api_key(api_key.as_deref()) {
        eprintln!("Error: PABAU_API_KEY not found in .env file");
        eprintln!("Please add your API key to the .env file");
        return ExitCode::FAILURE;
    }
    let api_key = api_key.unwrap_or_default();

    let env_base = std::env::var("PABAU_API_BASE").ok();
    let api_base = resolve_api_base(args.base_url.as_deref(), env_base.as_deref());
    let url = pipelines_url(&api_base, api_key.trim());
    let client = Client::new();

    let raw = match fetch_pipelines(&client, &url).await {
        Ok(raw) => raw,
        Err(e) => {
            error!(error = %e, "pipelines_fetch_failed");
            eprintln!("Error fetching pipelines: {}", e);
            return ExitCode::SUCCESS;
        }
    };

    match serde_json::from_str::<Value>(&raw) {
        Ok(listing) => print!("{}", render_pipelines(&listing)),
        Err(e) => {
            eprintln!("Error parsing response: {}", e);
            println!("Raw response: {}", raw);
        }
    }

    ExitCode::SUCCESS
}
