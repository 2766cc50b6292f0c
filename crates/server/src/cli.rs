//! CLI argument parsing and subcommand dispatch.

use clap::{Parser, Subcommand};
use tracing::info;

use crate::{router, startup};

/// Execution ingestion and cache service.
#[derive(Parser, Debug)]
#[command(name = "ares-server", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Start the HTTP server (default).
    #[default]
    Serve,
    /// Load today's window for every source, then exit.
    Warm,
    /// Delete every cached ledger, window marker and snapshot, then exit.
    Clear,
}

pub async fn dispatch(config: &ares_core::Config, command: Command) -> anyhow::Result<()> {
    config.log_summary();
    let state = startup::build_app_state(config).await?;

    match command {
        Command::Serve => {
            if config.startup.warm_on_startup {
                startup::warm(&state).await;
            } else {
                info!("Startup warm-up disabled");
            }
            let app = router::build_router(state, router::cors_layer(&config.server.cors_origin)?);

            let addr = format!("{}:{}", config.server.host, config.server.port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            info!("Server listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Command::Warm => {
            startup::warm(&state).await;
        }
        Command::Clear => {
            state.cache.clear().await;
        }
    }
    Ok(())
}
