use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Upper bound on sub-operations a batch runs in flight at once.
    pub max_concurrent_operations: usize,
    pub log_level: String,
    /// Connect timeout applied by the shipped z/OSMF client, seconds.
    pub connect_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_concurrent_operations: num_cpus::get(),
            log_level: "info".to_string(),
            connect_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    pub async fn load() -> Result<Self> {
        let config_path =
            std::env::var("ZMOVE_CONFIG_PATH").unwrap_or_else(|_| "/etc/zmove/config.toml".to_string());

        match tokio::fs::read_to_string(&config_path).await {
            Ok(content) => {
                let config: EngineConfig = toml::from_str(&content)?;
                Ok(config)
            }
            Err(_) => {
                warn!("Configuration file not found at {}. Using default settings.", config_path);
                Ok(EngineConfig::default())
            }
        }
    }
}
