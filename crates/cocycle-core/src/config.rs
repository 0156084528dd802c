//! Runtime configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is loaded first if present.

use std::env;

use thiserror::Error;
use tracing::warn;

use crate::view::DEFAULT_DEEP_LINK_SCHEME;

pub const API_URL_VAR: &str = "COCYCLE_API_URL";
pub const MAP_TOKEN_VAR: &str = "MAPBOX_TOKEN";
pub const DEEP_LINK_SCHEME_VAR: &str = "COCYCLE_DEEP_LINK_SCHEME";

pub const DEFAULT_API_URL: &str = "http://localhost:8080";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Ride service base URL, without a trailing slash
    pub api_url: String,
    /// Map provider access token. `None` disables the map preview.
    pub map_token: Option<String>,
    pub deep_link_scheme: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            map_token: None,
            deep_link_scheme: DEFAULT_DEEP_LINK_SCHEME.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_url = match var(API_URL_VAR) {
            Some(url) => {
                if !(url.starts_with("http://") || url.starts_with("https://")) {
                    return Err(ConfigError::Invalid {
                        var: API_URL_VAR,
                        reason: format!("'{}' is not an http(s) URL", url),
                    });
                }
                url.trim_end_matches('/').to_string()
            }
            None => {
                warn!("{} not set, using {}", API_URL_VAR, DEFAULT_API_URL);
                DEFAULT_API_URL.to_string()
            }
        };

        let map_token = var(MAP_TOKEN_VAR);
        if map_token.is_none() {
            warn!("{} not set, map preview disabled", MAP_TOKEN_VAR);
        }

        let deep_link_scheme = var(DEEP_LINK_SCHEME_VAR)
            .map(|s| s.trim_end_matches("://").to_string())
            .unwrap_or_else(|| DEFAULT_DEEP_LINK_SCHEME.to_string());

        Ok(Self {
            api_url,
            map_token,
            deep_link_scheme,
        })
    }
}
