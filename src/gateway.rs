//! Endpoint resolution: direct hosts or their WebVPN rewrites.
//!
//! 校园网外直连不通时走 WebVPN，本质上只是换 host。Resolution is a pure
//! function of configuration; nothing here touches the network.

use serde::Deserialize;

use crate::config::Config;
use crate::error::{CheckinError, Result};

pub const DIRECT_OPENID_BASE: &str = "https://openid.cc98.org";
pub const DIRECT_API_BASE: &str = "https://api.cc98.org";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    #[default]
    Direct,
    Webvpn,
}

/// Base URLs for the two upstream hosts, without trailing slash.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayBases {
    pub openid: String,
    pub api: String,
}

impl Default for GatewayBases {
    fn default() -> Self {
        Self {
            openid: DIRECT_OPENID_BASE.to_string(),
            api: DIRECT_API_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Endpoint {
    Login,
    Signin,
}

#[derive(Debug, Clone)]
pub struct GatewayResolver {
    mode: GatewayMode,
    direct: GatewayBases,
    webvpn: Option<GatewayBases>,
}

impl GatewayResolver {
    pub fn new(mode: GatewayMode, direct: GatewayBases, webvpn: Option<GatewayBases>) -> Self {
        Self { mode, direct, webvpn }
    }

    /// Builds the resolver from config, failing up front if webvpn mode was
    /// requested without webvpn bases.
    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = Self::new(config.gateway, config.direct.clone(), config.webvpn.clone());
        resolver.bases()?;
        Ok(resolver)
    }

    fn bases(&self) -> Result<&GatewayBases> {
        match self.mode {
            GatewayMode::Direct => Ok(&self.direct),
            GatewayMode::Webvpn => self.webvpn.as_ref().ok_or_else(|| {
                CheckinError::Config(
                    "gateway is 'webvpn' but no webvpn bases are configured".into(),
                )
            }),
        }
    }

    pub fn resolve(&self, endpoint: Endpoint) -> Result<String> {
        let bases = self.bases()?;
        Ok(match endpoint {
            Endpoint::Login => {
                format!("{}/connect/token", bases.openid.trim_end_matches('/'))
            }
            Endpoint::Signin => format!("{}/me/signin", bases.api.trim_end_matches('/')),
        })
    }
}
