use registrar::{api::Server, config::Config, registry::Registry};
use tracing::info;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// The main entry point for the registrar service.
///
/// Initializes logging, loads the configuration (path from the first CLI
/// argument, or `config/default.toml`), connects the registration store
/// and serves the HTTP API.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&path)?;
    info!("Registrar starting with config: {:?}", config);

    let registry = Registry::connect(&config.database).await?;

    let server = Server::new(config, registry);
    server.start().await?;

    Ok(())
}
