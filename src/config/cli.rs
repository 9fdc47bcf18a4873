use super::toml_config::TomlConfig;
use super::RelayConfig;
use crate::domain::policy::ImportMode;
use crate::utils::error::Result;
use crate::utils::logger::LogFormat;
use clap::Parser;
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "lead-relay")]
#[command(about = "Relays lead batches from an automation agent into the CRM")]
pub struct CliConfig {
    #[arg(long, help = "Bind address (overrides HOST)")]
    pub host: Option<String>,

    #[arg(long, help = "Listen port (overrides PORT)")]
    pub port: Option<u16>,

    #[arg(long, env = "LEAD_RELAY_CONFIG", help = "Optional TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Import mode (overrides IMPORT_MODE)")]
    pub mode: Option<ImportMode>,

    #[arg(long, env = "LOG_FORMAT", default_value = "compact")]
    pub log_format: LogFormat,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// Resolves the full configuration: file, then process environment, then these flags.
    pub fn resolve(&self) -> Result<RelayConfig> {
        let vars: HashMap<String, String> = std::env::vars().collect();
        self.resolve_with(&vars)
    }

    pub fn resolve_with(&self, env: &HashMap<String, String>) -> Result<RelayConfig> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                Some(TomlConfig::from_file(path)?)
            }
            None => None,
        };

        let mut config = RelayConfig::from_sources(file, env)?;

        if let Some(host) = &self.host {
            config.host = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(mode) = self.mode {
            config.import.mode = mode;
        }
        Ok(config)
    }
}
