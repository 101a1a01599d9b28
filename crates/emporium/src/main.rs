//! Emporium server binary.
//!
//! ```bash
//! emporium --config emporium.toml
//! EMPORIUM__SERVER__HTTP_ADDR=127.0.0.1:9000 emporium
//! ```

use std::path::PathBuf;

use anyhow::Context;
use emporium_config::ConfigLoader;

/// Environment variable naming the configuration file.
const CONFIG_ENV: &str = "EMPORIUM_CONFIG";

/// Prefix of `EMPORIUM__SECTION__KEY` overrides.
const ENV_PREFIX: &str = "EMPORIUM";

/// Returns the `--config` argument, or `EMPORIUM_CONFIG` when absent.
fn config_path() -> anyhow::Result<Option<PathBuf>> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            let path = args.next().context("--config needs a path")?;
            return Ok(Some(PathBuf::from(path)));
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Ok(Some(PathBuf::from(path)));
        }
        anyhow::bail!("unknown argument '{arg}'");
    }
    Ok(std::env::var_os(CONFIG_ENV).map(PathBuf::from))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut loader = ConfigLoader::new().with_dotenv().with_env_prefix(ENV_PREFIX);
    if let Some(path) = config_path()? {
        loader = loader
            .with_file(&path)
            .with_context(|| format!("loading {}", path.display()))?;
    }
    let config = loader.load().context("invalid configuration")?;

    emporium_telemetry::init_logging(&emporium::log_config(&config.logging))?;

    let server = emporium::build_server(emporium::server_config(&config))?;
    tracing::info!(
        addr = %config.server.http_addr,
        endpoints = server.endpoints().count(),
        "Starting Emporium"
    );

    server.run().await?;
    tracing::info!("Server shutdown complete");
    Ok(())
}
