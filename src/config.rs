//! Runtime configuration, read from the environment (and `.env` via `dotenvy`).

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::{
    core::StaticTokens,
    error::{Result, TravelError},
    services::{
        booking_client::DEFAULT_BOOKING_BASE_URL,
        gemini_client::{DEFAULT_BASE_URL, DEFAULT_MODEL},
    },
};

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_DATABASE_PATH: &str = "travel.db";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_USER: &str = "sample-user";

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub gemini_api_key: String,
    pub gemini_model: String,
    pub gemini_base_url: String,
    /// RapidAPI key for live hotel search; blank serves curated listings
    pub rapid_api_key: String,
    pub rapid_api_base_url: String,
    pub bind_addr: String,
    pub database_path: PathBuf,
    pub request_timeout: Duration,
    /// User that requests without a valid bearer token act as
    pub default_user: String,
    /// Comma separated `token:user` pairs
    pub api_tokens: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            gemini_api_key: String::new(),
            gemini_model: DEFAULT_MODEL.to_string(),
            gemini_base_url: DEFAULT_BASE_URL.to_string(),
            rapid_api_key: String::new(),
            rapid_api_base_url: DEFAULT_BOOKING_BASE_URL.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            default_user: DEFAULT_USER.to_string(),
            api_tokens: String::new(),
        }
    }
}

impl AppConfig {
    /// Load from process environment. Does not validate; call [`AppConfig::validate`].
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup. Unset or blank keys keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(key) = get("GEMINI_API_KEY") {
            config.gemini_api_key = key;
        }
        if let Some(model) = get("GEMINI_MODEL") {
            config.gemini_model = model;
        }
        if let Some(url) = get("GEMINI_BASE_URL") {
            config.gemini_base_url = url;
        }
        if let Some(key) = get("RAPID_API_KEY") {
            config.rapid_api_key = key;
        }
        if let Some(url) = get("RAPID_API_BASE_URL") {
            config.rapid_api_base_url = url;
        }
        if let Some(addr) = get("TRAVEL_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(path) = get("TRAVEL_DATABASE_PATH") {
            config.database_path = PathBuf::from(path);
        }
        if let Some(secs) = get("TRAVEL_REQUEST_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                TravelError::Config(format!(
                    "TRAVEL_REQUEST_TIMEOUT_SECS must be a whole number of seconds, got `{secs}`"
                ))
            })?;
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(user) = get("TRAVEL_DEFAULT_USER") {
            config.default_user = user;
        }
        if let Some(tokens) = get("TRAVEL_API_TOKENS") {
            config.api_tokens = tokens;
        }

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.gemini_api_key.trim().is_empty() {
            return Err(TravelError::Config(
                "GEMINI_API_KEY is required. Set it in the environment or a .env file".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(TravelError::Config(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if self.default_user.trim().is_empty() {
            return Err(TravelError::Config("default user must not be blank".to_string()));
        }
        self.socket_addr()?;
        self.identity()?;
        Ok(())
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        self.bind_addr.parse().map_err(|_| {
            TravelError::Config(format!("invalid bind address `{}`", self.bind_addr))
        })
    }

    /// Token table built from `api_tokens`
    pub fn identity(&self) -> Result<StaticTokens> {
        StaticTokens::parse(&self.api_tokens)
    }
}
