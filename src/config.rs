//! Configuration system for the portfolio agent
//!
//! TOML configuration with env-var indirection for credentials: the file
//! names the environment variable holding the market-data API key, never
//! the key itself.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main agent configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    pub agent: AgentSection,
    #[serde(default)]
    pub transport: TransportSection,
    pub market_data: MarketDataSection,
}

/// Agent identity section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSection {
    /// Agent identifier (must match [a-zA-Z0-9._-]+)
    pub id: String,
    /// Description of what this agent does
    pub description: String,
    /// Service type registered with the directory
    #[serde(default = "default_service_type")]
    pub service_type: String,
}

fn default_service_type() -> String {
    "finance-data-provider".to_string()
}

/// Transport receive-loop section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TransportSection {
    /// Bounded wait for the next inbound message before an idle re-poll
    #[serde(default = "default_recv_timeout")]
    pub recv_timeout_secs: u64,
}

impl Default for TransportSection {
    fn default() -> Self {
        Self {
            recv_timeout_secs: default_recv_timeout(),
        }
    }
}

fn default_recv_timeout() -> u64 {
    10
}

/// Market-data quote endpoint section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MarketDataSection {
    /// Quote endpoint URL
    #[serde(default = "default_quote_url")]
    pub base_url: String,
    /// Environment variable containing the API key
    pub api_key_env: String,
    /// Per-lookup request timeout in seconds
    #[serde(default = "default_quote_timeout")]
    pub timeout_secs: u64,
}

fn default_quote_url() -> String {
    "https://www.alphavantage.co/query".to_string()
}

fn default_quote_timeout() -> u64 {
    5
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid agent ID format: {0}")]
    InvalidAgentId(String),
}

impl AgentConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: AgentConfig = toml::from_str(&content)?;

        validate_agent_id(&config.agent.id)?;

        Ok(config)
    }

    /// Resolve the market-data API key from the configured env var
    pub fn get_api_key(&self) -> Result<String, ConfigError> {
        std::env::var(&self.market_data.api_key_env)
            .map_err(|_| ConfigError::EnvVarNotFound(self.market_data.api_key_env.clone()))
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[agent]
id = "portfolio-analysis-test"
description = "Test portfolio analysis agent"

[market_data]
api_key_env = "ALPHA_VANTAGE_API_KEY"
"#;
        toml::from_str(toml_content).expect("Test config should parse")
    }
}

/// Validate agent ID format
fn validate_agent_id(agent_id: &str) -> Result<(), ConfigError> {
    let valid_chars = agent_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-');

    if agent_id.is_empty() || !valid_chars {
        return Err(ConfigError::InvalidAgentId(format!(
            "Agent ID '{agent_id}' must match pattern [a-zA-Z0-9._-]+"
        )));
    }

    Ok(())
}
