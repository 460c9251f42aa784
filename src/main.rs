mod cli;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use course_portal::config::{PortalConfig, default_config_file};
use course_portal::core::client::PortalClient;
use course_portal::core::token_store::TokenStore;

use crate::cli::Cli;

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "course_portal=debug,warn",
        _ => "course_portal=trace,debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config_path = cli.config.clone().unwrap_or_else(default_config_file);
    let config = PortalConfig::load(&config_path)
        .with_context(|| format!("loading config {}", config_path.display()))?
        .with_api_base_url(cli.api_base_url.clone())
        .with_session_file(cli.session_file.clone());
    log::debug!("api {} session {}", config.api_base_url, config.session_file.display());

    let tokens = TokenStore::open(config.session_file.clone());
    let client = PortalClient::new(&config, tokens)?;

    cli::commands::run(&client, cli.command).await
}
