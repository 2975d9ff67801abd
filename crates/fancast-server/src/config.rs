use std::env;
use std::path::Path;

use anyhow::Context;
use config::Config;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FancastConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub identity: IdentitySettings,
    #[serde(default)]
    pub retrieval: RetrievalSettings,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub billing: BillingSettings,
    #[serde(default = "default_app_url")]
    pub app_url: String,
}

impl FancastConfig {
    pub fn load() -> anyhow::Result<Self> {
        let config_file =
            env::var("FANCAST_CONFIG_FILE").unwrap_or_else(|_| "config/fancast.local.toml".into());

        let mut builder = Config::builder();
        if Path::new(&config_file).exists() {
            builder = builder.add_source(config::File::from(Path::new(&config_file)));
        }
        builder = builder.add_source(config::Environment::with_prefix("FANCAST").separator("__"));

        let config: FancastConfig = builder
            .build()
            .context("failed to build configuration")?
            .try_deserialize()
            .context("failed to deserialize configuration")?;

        Ok(config)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_address")]
    pub address: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_address() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        3000
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: Self::default_address(),
            port: Self::default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct IdentitySettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RetrievalSettings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmSettings {
    /// Empty key selects the in-process echo model, which keeps local
    /// development working without provider credentials.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "LlmSettings::default_model")]
    pub model: String,
    #[serde(default = "LlmSettings::default_temperature")]
    pub temperature: f32,
    #[serde(default = "LlmSettings::default_max_tokens")]
    pub max_tokens: u32,
}

impl LlmSettings {
    fn default_model() -> String {
        "gpt-4o-mini".to_string()
    }

    fn default_temperature() -> f32 {
        0.7
    }

    fn default_max_tokens() -> u32 {
        500
    }
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: None,
            model: Self::default_model(),
            temperature: Self::default_temperature(),
            max_tokens: Self::default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BillingSettings {
    #[serde(default)]
    pub webhook_secret: String,
}

fn default_app_url() -> String {
    "http://localhost:3000".to_string()
}
