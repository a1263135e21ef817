use crate::config::ClientConfig;
use crate::utils::error::Result;
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "simple-alexa-rank")]
#[command(about = "Look up the global popularity rank of domains")]
pub struct CliConfig {
    /// Domains to look up
    #[arg(required = true)]
    pub domains: Vec<String>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Override the ranking API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Print the parsed XML response instead of the rank
    #[arg(long)]
    pub xml: bool,

    /// Print results as JSON lines
    #[arg(long)]
    pub json: bool,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

impl CliConfig {
    /// 合併設定檔與命令列覆蓋值
    pub fn client_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.config {
            Some(path) => ClientConfig::from_file(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            tracing::debug!("Base URL overridden to: {}", base_url);
            config.base_url = base_url.clone();
        }

        Ok(config)
    }
}
