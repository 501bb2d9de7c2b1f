use courseweave_workspace::config::DEFAULT_AUTOSAVE_DELAY_MS;
use courseweave_workspace::WorkspaceConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_NAME: &str = "courseweave.config.json";

/// Courseweave configuration file format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Directory holding `<doc-id>.blocks.json` files
    #[serde(default = "default_store_dir")]
    pub store_dir: String,

    /// Idle time before an autosave fires
    #[serde(default = "default_autosave_delay_ms")]
    pub autosave_delay_ms: u64,

    /// trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_store_dir() -> String {
    "blocks".to_string()
}

fn default_autosave_delay_ms() -> u64 {
    DEFAULT_AUTOSAVE_DELAY_MS
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the block store directory
    pub fn get_store_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.store_dir)
    }

    pub fn workspace_config(&self) -> WorkspaceConfig {
        WorkspaceConfig::with_autosave_delay_ms(self.autosave_delay_ms)
    }

    pub fn log_level(&self) -> tracing::Level {
        self.log_level.parse().unwrap_or(tracing::Level::WARN)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_dir: default_store_dir(),
            autosave_delay_ms: default_autosave_delay_ms(),
            log_level: default_log_level(),
        }
    }
}
