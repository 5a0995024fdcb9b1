use clap::Parser;
use std::process::ExitCode;
use tracing::{error, info, warn, Level};

mod batch;
mod cli;
mod models;
mod state;
mod utils;

use crate::batch::error_log::ErrorLog;
use crate::cli::Cli;
use crate::state::app_state::AppState;
use crate::utils::conf_helper::init_settings;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .init();

    // === CONFIG ===
    let config = match init_settings(&cli).await {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {:#}", e);
            return ExitCode::from(2);
        }
    };

    let error_log = match ErrorLog::open(&config.error_log).await {
        Ok(log) => log,
        Err(e) => {
            error!("Cannot open error log {}: {}", config.error_log.display(), e);
            return ExitCode::from(2);
        }
    };

    let state = AppState::new(error_log);

    // === CTRL-C ===
    let signal_state = state.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, finishing files in progress");
            signal_state.request_stop();
        }
    });

    let summary = match batch::pool::run(&config, state).await {
        Ok(summary) => summary,
        Err(e) => {
            error!("Run aborted: {:#}", e);
            return ExitCode::from(2);
        }
    };

    info!(
        "Done: {} processed, {} written, {} failed",
        summary.processed, summary.written, summary.failed
    );

    if summary.failed > 0 {
        warn!("See {} for details", config.error_log.display());
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}
