//! `vlmcap` -- command-line client for the caption service.
//!
//! Submits directory caption jobs, follows them to completion, and
//! manages the model the service has loaded.
//!
//! # Environment variables
//!
//! | Variable             | Required | Default                 | Description                     |
//! |----------------------|----------|-------------------------|---------------------------------|
//! | `CAPTION_API_URL`    | no       | `http://127.0.0.1:8000` | Base URL of the caption service |
//! | `POLL_INTERVAL_SECS` | no       | `10`                    | Seconds between status checks   |
//! | `RUST_LOG`           | no       | `vlmcap=info,...`       | Log filter (logs go to stderr)  |

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vlmcap_cli::args::Cli;
use vlmcap_cli::commands;
use vlmcap_cli::config::ClientConfig;

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vlmcap=info,vlmcap_cli=info,vlmcap_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = match ClientConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return ExitCode::FAILURE;
        }
    };

    tracing::debug!(api_url = %config.api_url, poll_interval = ?config.poll_interval, "Configuration loaded");

    match commands::run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
