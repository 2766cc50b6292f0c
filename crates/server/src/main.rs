mod api;
mod cli;
mod router;
mod startup;
mod state;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn load_config() -> ares_core::Config {
    ares_core::config::load_dotenv();
    ares_core::Config::from_env()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_level(true)
        .init();

    let args = cli::Cli::parse();
    let config = load_config();
    cli::dispatch(&config, args.command.unwrap_or_default()).await
}
