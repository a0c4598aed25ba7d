//! Typed configuration, loaded once from `config.json` and validated before
//! any core logic runs.

use std::path::Path;

use serde::Deserialize;

use crate::error::{CheckinError, Result};
use crate::gateway::{GatewayBases, GatewayMode};
use crate::retry::RetryConfig;

pub const DEFAULT_LOOP_INTERVAL_SECS: u64 = 3600;

#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub users: Vec<Account>,
    #[serde(default)]
    pub gateway: GatewayMode,
    /// WebVPN rewrites of the two hosts; required only in webvpn mode.
    #[serde(default)]
    pub webvpn: Option<GatewayBases>,
    #[serde(default)]
    pub direct: GatewayBases,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default = "default_loop_interval")]
    pub loop_interval_secs: u64,
}

fn default_loop_interval() -> u64 {
    DEFAULT_LOOP_INTERVAL_SECS
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            CheckinError::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(raw)
            .map_err(|e| CheckinError::Config(format!("malformed config: {e}")))?;
        if config.users.is_empty() {
            return Err(CheckinError::Config(
                "no users configured, nothing to sign in".into(),
            ));
        }
        Ok(config)
    }

    /// Writes a placeholder config for first runs, mirroring what the user is
    /// expected to fill in.
    pub fn write_sample(path: &Path) -> Result<()> {
        let sample = serde_json::json!({
            "users": [
                { "username": "your_username1", "password": "your_password1" },
                { "username": "your_username2", "password": "your_password2" },
            ]
        });
        let body = serde_json::to_string_pretty(&sample)
            .map_err(|e| CheckinError::Config(e.to_string()))?;
        std::fs::write(path, body).map_err(|e| {
            CheckinError::Config(format!("cannot write {}: {e}", path.display()))
        })
    }
}
