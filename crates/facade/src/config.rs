//! Facade configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `TAPSILAT_API_KEY` - Bearer API key for the payment gateway
//!
//! ## Optional
//! - `TAPSILAT_BASE_URL` - Gateway API root (default: `https://panel.tapsilat.dev/api/v1`)
//! - `PAYGATE_HOST` - Bind address (default: 127.0.0.1)
//! - `PAYGATE_PORT` - Listen port (default: 5005)
//! - `PAYGATE_WEBHOOK_DIR` - Directory for received webhooks (default: `webhooks`)
//! - `PAYGATE_COUNTRY` - Buyer/shipping country (default: Turkey)
//! - `PAYGATE_CURRENCY` - Default order currency (default: TRY)
//! - `PAYGATE_LOCALE` - Default checkout locale (default: tr)
//! - `PAYGATE_APPLICATION_NAME` - `application_name` metadata tag
//! - `PAYGATE_GATEWAY_TIMEOUT_SECS` - Gateway request timeout (default: 30)
//! - `PAYGATE_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use paygate_core::CurrencyCode;
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;
use url::Url;

const DEFAULT_GATEWAY_URL: &str = "https://panel.tapsilat.dev/api/v1";
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.0;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "your_",
    "changeme",
    "replace",
    "placeholder",
    "xxx",
    "todo",
    "insert",
    "put-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Facade application configuration.
#[derive(Debug, Clone)]
pub struct FacadeConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Directory where received webhooks are written
    pub webhook_dir: PathBuf,
    /// Payment gateway connection settings
    pub gateway: GatewayConfig,
    /// Deployment constants used when assembling requests
    pub checkout: CheckoutDefaults,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Payment gateway connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct GatewayConfig {
    /// API root, e.g. `https://panel.tapsilat.dev/api/v1`
    pub base_url: Url,
    /// Bearer API key
    pub api_key: SecretString,
    /// Per-request transport timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key", &"[REDACTED]")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Deployment constants the assemblers fall back on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutDefaults {
    /// Country written into buyer and shipping addresses
    pub country: String,
    /// Currency used when the client sends none (and for subscriptions)
    pub currency: CurrencyCode,
    /// Checkout page locale used when the client sends none
    pub locale: String,
    /// Value of the `application_name` metadata entry
    pub application_name: String,
}

impl Default for CheckoutDefaults {
    fn default() -> Self {
        Self {
            country: "Turkey".to_string(),
            currency: CurrencyCode::lira(),
            locale: "tr".to_string(),
            application_name: "Paygate Checkout Facade".to_string(),
        }
    }
}

impl FacadeConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the API key is missing or looks like a
    /// placeholder, or if an optional variable holds an unparsable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    ///
    /// See [`FacadeConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let host = get_or("PAYGATE_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAYGATE_HOST".to_string(), e.to_string()))?;
        let port = get_or("PAYGATE_PORT", "5005")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("PAYGATE_PORT".to_string(), e.to_string()))?;
        let webhook_dir = PathBuf::from(get_or("PAYGATE_WEBHOOK_DIR", "webhooks"));

        let api_key = get("TAPSILAT_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("TAPSILAT_API_KEY".to_string()))?;
        validate_secret_strength(&api_key, "TAPSILAT_API_KEY")?;

        let base_url = Url::parse(&get_or("TAPSILAT_BASE_URL", DEFAULT_GATEWAY_URL)).map_err(
            |e| ConfigError::InvalidEnvVar("TAPSILAT_BASE_URL".to_string(), e.to_string()),
        )?;
        let timeout_secs = get_or("PAYGATE_GATEWAY_TIMEOUT_SECS", "30")
            .parse::<u64>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PAYGATE_GATEWAY_TIMEOUT_SECS".to_string(), e.to_string())
            })?;

        let defaults = CheckoutDefaults::default();
        let currency = match get("PAYGATE_CURRENCY") {
            Some(code) => CurrencyCode::parse(&code).map_err(|e| {
                ConfigError::InvalidEnvVar("PAYGATE_CURRENCY".to_string(), e.to_string())
            })?,
            None => defaults.currency,
        };
        let checkout = CheckoutDefaults {
            country: get("PAYGATE_COUNTRY").unwrap_or(defaults.country),
            currency,
            locale: get("PAYGATE_LOCALE").unwrap_or(defaults.locale),
            application_name: get("PAYGATE_APPLICATION_NAME").unwrap_or(defaults.application_name),
        };

        Ok(Self {
            host,
            port,
            webhook_dir,
            gateway: GatewayConfig {
                base_url,
                api_key: SecretString::from(api_key),
                timeout: Duration::from_secs(timeout_secs),
            },
            checkout,
            log_json: get("PAYGATE_LOG_JSON").is_some(),
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl GatewayConfig {
    /// First characters of the API key, for startup logging.
    #[must_use]
    pub fn key_hint(&self) -> String {
        let key = self.api_key.expose_secret();
        let prefix: String = key.chars().take(6).collect();
        format!("{prefix}...")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1})"
            ),
        ));
    }

    Ok(())
}
