//! Command-line entry points. Grounded on the teacher's `cli/mod.rs`
//! split between argument parsing and a `load_config()` helper shared by
//! every subcommand.

use anyhow::Context;
use chat_domain::Config;
use clap::{Parser, Subcommand};

/// The chat orchestrator gateway.
#[derive(Debug, Parser)]
#[command(name = "chat-gateway", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the gateway server (default when no subcommand is given).
    Serve,
    /// Parse the config file and report any validation errors.
    ConfigValidate,
    /// Dump the resolved configuration (with defaults) as TOML.
    ConfigShow,
    /// Print version information.
    Version,
}

/// Loads the configuration from the path named by `CHAT_CONFIG` (default
/// `config.toml`). Missing files fall back to `Config::default()` so a
/// zero-config dev boot still exercises the same validation path as a
/// misconfigured production deployment.
pub fn load_config() -> anyhow::Result<(Config, String)> {
    let config_path = std::env::var("CHAT_CONFIG").unwrap_or_else(|_| "config.toml".into());

    let config = if std::path::Path::new(&config_path).exists() {
        let raw = std::fs::read_to_string(&config_path)
            .with_context(|| format!("reading {config_path}"))?;
        toml::from_str(&raw).with_context(|| format!("parsing {config_path}"))?
    } else {
        tracing::warn!(path = %config_path, "no config file found, using defaults");
        Config::default()
    };

    Ok((config, config_path))
}
