//! Application configuration loaded from environment variables.
//!
//! Loaded once at startup. The JWT secret is shared with the identity
//! provider that issues user access tokens.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Default Expo push endpoint.
pub const DEFAULT_EXPO_PUSH_URL: &str = "https://exp.host/--/api/v2/push/send";

/// Which store backs swipes and matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store; data is lost on restart.
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND", s.to_string())),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Server ---
    /// Server port
    pub port: u16,
    /// Frontend origin allowed by CORS
    pub frontend_url: String,

    // --- Store ---
    pub store_backend: StoreBackend,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Bound on every store call made during match detection
    pub store_timeout: Duration,
    /// Pause before the single retry of a transient store failure
    pub match_retry_backoff: Duration,

    // --- Auth ---
    /// HS256 secret of the identity provider (raw bytes)
    pub jwt_secret: Vec<u8>,
    /// Expected `aud` claim, if the provider sets one
    pub jwt_audience: Option<String>,

    // --- Notifications ---
    /// Send Expo push notifications instead of only logging matches
    pub push_enabled: bool,
    pub expo_push_url: String,
    pub expo_access_token: Option<String>,
    /// Bound on each notification delivery
    pub notify_timeout: Duration,
}

impl Config {
    /// Config for tests: in-memory store, short timeouts, push disabled.
    pub fn test_default() -> Self {
        Self {
            port: 8080,
            frontend_url: "http://localhost:8081".to_string(),
            store_backend: StoreBackend::Memory,
            gcp_project_id: "test-project".to_string(),
            store_timeout: Duration::from_millis(500),
            match_retry_backoff: Duration::from_millis(10),
            jwt_secret: b"test_jwt_secret_32_bytes_minimum!".to_vec(),
            jwt_audience: None,
            push_enabled: false,
            expo_push_url: DEFAULT_EXPO_PUSH_URL.to_string(),
            expo_access_token: None,
            notify_timeout: Duration::from_millis(500),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            port: parse_or("PORT", 8080)?,
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:8081".to_string()),

            store_backend: parse_or("STORE_BACKEND", StoreBackend::Firestore)?,
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            store_timeout: Duration::from_millis(parse_or("STORE_TIMEOUT_MS", 5000)?),
            match_retry_backoff: Duration::from_millis(parse_or("MATCH_RETRY_BACKOFF_MS", 200)?),

            jwt_secret: env::var("JWT_SECRET")
                .map(|v| v.trim().to_string())
                .map_err(|_| ConfigError::Missing("JWT_SECRET"))?
                .into_bytes(),
            jwt_audience: optional("JWT_AUDIENCE"),

            push_enabled: parse_or("PUSH_ENABLED", false)?,
            expo_push_url: env::var("EXPO_PUSH_URL")
                .unwrap_or_else(|_| DEFAULT_EXPO_PUSH_URL.to_string()),
            expo_access_token: optional("EXPO_ACCESS_TOKEN"),
            notify_timeout: Duration::from_millis(parse_or("NOTIFY_TIMEOUT_MS", 5000)?),
        })
    }
}

/// Read an optional variable, treating blank values as unset.
fn optional(name: &'static str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse a variable, falling back to `default` when unset.
fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}
