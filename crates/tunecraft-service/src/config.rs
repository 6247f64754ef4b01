//! Service configuration.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use tunecraft_core::{CreditPolicy, DurationBounds, DEFAULT_DURATION_SECONDS};

use crate::providers::{fal, replicate};

/// Session secret used when `SECRET_KEY` is unset. Only fit for development.
pub const DEFAULT_SESSION_SECRET: &str = "tunecraft-dev-secret";

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:5000").
    pub listen_addr: String,

    /// Secret used to sign session cookies.
    pub session_secret: String,

    /// Replicate API token (optional).
    pub replicate_api_token: Option<String>,

    /// Replicate API base URL.
    pub replicate_api_url: String,

    /// fal.ai API key (optional).
    pub fal_key: Option<String>,

    /// fal.ai queue base URL.
    pub fal_queue_url: String,

    /// Directory for staging remix uploads.
    pub scratch_dir: PathBuf,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds. `None` lets provider calls run unbounded.
    pub request_timeout_seconds: Option<u64>,

    /// Delay between provider status polls, in milliseconds.
    pub provider_poll_interval_ms: u64,

    /// Idle lifetime of a session, in seconds.
    pub session_ttl_seconds: u64,

    /// Credit amounts.
    pub credits: CreditPolicy,

    /// Longest audio duration a client may request.
    pub max_duration_seconds: u32,
}

/// Provider secrets file structure.
#[derive(Debug, Default, Deserialize)]
struct ProviderSecrets {
    #[serde(default)]
    replicate_api_token: Option<String>,
    #[serde(default)]
    fal_key: Option<String>,
}

impl ServiceConfig {
    /// Load configuration from environment variables and secrets files.
    #[must_use]
    pub fn from_env() -> Self {
        let secrets = load_provider_secrets();
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            session_secret: std::env::var("SECRET_KEY").unwrap_or(defaults.session_secret),
            replicate_api_token: secrets
                .replicate_api_token
                .or_else(|| std::env::var("REPLICATE_API_TOKEN").ok()),
            replicate_api_url: std::env::var("REPLICATE_API_URL")
                .unwrap_or(defaults.replicate_api_url),
            fal_key: secrets.fal_key.or_else(|| std::env::var("FAL_KEY").ok()),
            fal_queue_url: std::env::var("FAL_QUEUE_URL").unwrap_or(defaults.fal_queue_url),
            scratch_dir: std::env::var("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.scratch_dir),
            cors_origins: std::env::var("CORS_ORIGINS")
                .unwrap_or_else(|_| "*".into())
                .split(',')
                .map(|s| s.trim().to_string())
                .collect(),
            max_body_bytes: env_or("MAX_BODY_BYTES", defaults.max_body_bytes),
            request_timeout_seconds: std::env::var("REQUEST_TIMEOUT_SECONDS")
                .ok()
                .and_then(|s| s.parse().ok()),
            provider_poll_interval_ms: env_or(
                "PROVIDER_POLL_INTERVAL_MS",
                defaults.provider_poll_interval_ms,
            ),
            session_ttl_seconds: env_or("SESSION_TTL_SECONDS", defaults.session_ttl_seconds),
            credits: CreditPolicy {
                initial_credits: env_or("INITIAL_CREDITS", defaults.credits.initial_credits),
                cost_per_generation: env_or(
                    "COST_PER_GENERATION",
                    defaults.credits.cost_per_generation,
                ),
                reward_amount: env_or("REWARD_AMOUNT", defaults.credits.reward_amount),
            },
            max_duration_seconds: env_or("MAX_DURATION_SECONDS", defaults.max_duration_seconds),
        }
    }

    /// Duration limits applied by the validator.
    #[must_use]
    pub fn duration_bounds(&self) -> DurationBounds {
        DurationBounds {
            default_seconds: DEFAULT_DURATION_SECONDS.min(self.max_duration_seconds),
            max_seconds: self.max_duration_seconds,
        }
    }

    /// Delay between provider status polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.provider_poll_interval_ms)
    }

    /// Whether the session secret is the built-in development value.
    #[must_use]
    pub fn uses_default_secret(&self) -> bool {
        self.session_secret == DEFAULT_SESSION_SECRET
    }
}

/// Parse an environment variable, falling back to `default` when unset or invalid.
fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Load provider secrets from file, if one exists.
fn load_provider_secrets() -> ProviderSecrets {
    let secret_paths = [".secrets/providers.json", "../.secrets/providers.json"];

    for path in &secret_paths {
        if let Ok(secrets) = load_secrets_file::<ProviderSecrets>(path) {
            tracing::info!(path = %path, "Loaded provider secrets from file");
            return secrets;
        }
    }

    tracing::debug!("Provider secrets file not found, using environment variables");
    ProviderSecrets::default()
}

/// Load secrets from a JSON file.
fn load_secrets_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, std::io::Error> {
    let path = Path::new(path);
    if !path.exists() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Secrets file not found",
        ));
    }
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:5000".into(),
            session_secret: DEFAULT_SESSION_SECRET.into(),
            replicate_api_token: None,
            replicate_api_url: replicate::DEFAULT_BASE_URL.into(),
            fal_key: None,
            fal_queue_url: fal::DEFAULT_QUEUE_URL.into(),
            scratch_dir: std::env::temp_dir().join("tunecraft"),
            cors_origins: vec!["*".into()],
            max_body_bytes: 10 * 1024 * 1024,
            request_timeout_seconds: None,
            provider_poll_interval_ms: 1000,
            session_ttl_seconds: 31 * 24 * 60 * 60,
            credits: CreditPolicy::default(),
            max_duration_seconds: tunecraft_core::DEFAULT_MAX_DURATION_SECONDS,
        }
    }
}
