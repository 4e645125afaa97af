use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::api_connection::endpoints::{DEFAULT_ANALYZER_MODEL, DEFAULT_BASE_URL, DEFAULT_CHAT_MODEL};

pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";
pub const CHAT_MODEL_ENV_VAR: &str = "NUTRI_CHAT_MODEL";
pub const ANALYZER_MODEL_ENV_VAR: &str = "NUTRI_ANALYZER_MODEL";
pub const TIMEOUT_ENV_VAR: &str = "NUTRI_HTTP_TIMEOUT_SECS";
pub const BIND_ADDR_ENV_VAR: &str = "NUTRI_BIND_ADDR";

const DEFAULT_TIMEOUT_SECS: u64 = 60;
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Settings the gateway is constructed from.
#[derive(Debug, Clone)]
pub struct GatewaySettings {
    /// `None` when the credential is absent; the gateway constructor rejects it.
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub analyzer_model: String,
    /// `None` disables the transport timeout.
    pub request_timeout: Option<Duration>,
}

impl GatewaySettings {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            base_url: base_url.into(),
            chat_model: DEFAULT_CHAT_MODEL.to_string(),
            analyzer_model: DEFAULT_ANALYZER_MODEL.to_string(),
            request_timeout: Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub gateway: GatewaySettings,
    pub bind_addr: SocketAddr,
}

impl AppConfig {
    /// Reads configuration from the process environment. Call `dotenv().ok()` first
    /// to pick up a local `.env`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let request_timeout = match non_empty(TIMEOUT_ENV_VAR) {
            Some(raw) => {
                let secs: u64 = raw
                    .trim()
                    .parse()
                    .with_context(|| format!("{TIMEOUT_ENV_VAR} must be a whole number of seconds, got '{raw}'"))?;
                (secs > 0).then(|| Duration::from_secs(secs))
            }
            None => Some(Duration::from_secs(DEFAULT_TIMEOUT_SECS)),
        };

        let bind_raw = non_empty(BIND_ADDR_ENV_VAR).unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr: SocketAddr = bind_raw
            .trim()
            .parse()
            .with_context(|| format!("{BIND_ADDR_ENV_VAR} is not a valid socket address: '{bind_raw}'"))?;

        Ok(Self {
            gateway: GatewaySettings {
                api_key: non_empty(API_KEY_ENV_VAR),
                base_url: non_empty(BASE_URL_ENV_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                chat_model: non_empty(CHAT_MODEL_ENV_VAR).unwrap_or_else(|| DEFAULT_CHAT_MODEL.to_string()),
                analyzer_model: non_empty(ANALYZER_MODEL_ENV_VAR)
                    .unwrap_or_else(|| DEFAULT_ANALYZER_MODEL.to_string()),
                request_timeout,
            },
            bind_addr,
        })
    }
}
