use clap::Parser;
use taggr_scripts::{cli::Cli, client::ScriptContext, config::NetworkConfig, errors::ScriptError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    dotenvy::dotenv().ok();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let network = NetworkConfig::from_env(&cli.network, cli.network_overrides())?;
    let ctx = ScriptContext::connect(network, cli.paths(), cli.report_gas).await?;

    cli.command.run(&ctx).await
}
