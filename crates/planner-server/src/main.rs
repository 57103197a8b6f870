//! `meeting-planner` binary.
//!
//! Loads `.env`, then `planner.toml` if present, then `PLANNER__*`
//! variables and `PORT`; installs logging and serves until SIGINT or
//! SIGTERM.

use anyhow::Context;
use planner_config::ConfigLoader;
use planner_server::{telemetry, App, Server};

const CONFIG_FILE: &str = "planner.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigLoader::new()
        .with_dotenv()
        .with_optional_file(CONFIG_FILE)
        .with_context(|| format!("failed to read {CONFIG_FILE}"))?
        .with_env_prefix("PLANNER")
        .with_port_override()
        .load()
        .context("invalid configuration")?;

    telemetry::init_logging(&config.logging).context("failed to initialize logging")?;

    tracing::info!(
        service = %config.logging.service_name,
        version = env!("CARGO_PKG_VERSION"),
        addr = %config.server.http_addr,
        "server is starting"
    );

    let server = Server::new(&config, App::new(&config))?;
    server.run().await?;

    tracing::info!("server exited");
    Ok(())
}
