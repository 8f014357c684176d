pub mod delete;
pub mod pull;
pub mod scan;
pub mod sync_roster;
pub mod sync_tree;

use anyhow::{Context, Result};
use repoharvest_core::config::Config;
use repoharvest_host::{HostClient, HostSession, TokenCredentials};
use std::path::Path;

/// Load config, applying the `--mirror-root` override.
pub(crate) fn load_config(
    mirror_root: Option<&str>,
    config_file: Option<&Path>,
) -> Result<Config> {
    let mut config = Config::load(config_file).context("failed to load configuration")?;
    if let Some(root) = mirror_root {
        config.storage.mirror_root = root.to_string();
    }
    Ok(config)
}

/// Open an API session against one host, authenticated from the configured
/// token sources (or knowingly anonymous).
pub(crate) fn open_session(host: &str, config: &Config) -> Result<HostSession> {
    HostClient::open(host, &config.host)
        .authenticate(&TokenCredentials::from_config(&config.host))
        .with_context(|| format!("failed to open an api session against {host}"))
}

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
