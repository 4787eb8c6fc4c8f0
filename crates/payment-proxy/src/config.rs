//! Payment proxy configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `STRIPE_SECRET_KEY` - Card processor secret key (`sk_test_...` or `sk_live_...`)
//!
//! ## Optional
//! - `PAYMENT_PROXY_HOST` - Bind address (default: 127.0.0.1)
//! - `PAYMENT_PROXY_PORT` - Listen port (default: 3001)
//! - `PAYMENT_PROXY_ALLOWED_ORIGIN` - Storefront origin for CORS; permissive when unset
//! - `STRIPE_API_BASE` - Processor API base URL (default: https://api.stripe.com/v1)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
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

/// Payment proxy configuration.
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// Card processor secret key (server-side only)
    pub stripe_secret_key: SecretString,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Storefront origin allowed by CORS; `None` means permissive
    pub allowed_origin: Option<String>,
    /// Processor API base URL, overridable for tests
    pub stripe_api_base: String,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

impl ProxyConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the secret key is missing or fails
    /// validation, or if the host or port cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let key = get_required_env("STRIPE_SECRET_KEY")?;
        validate_processor_key(&key, "STRIPE_SECRET_KEY")?;

        let host = get_env_or_default("PAYMENT_PROXY_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PAYMENT_PROXY_HOST".to_string(), e.to_string())
            })?;
        let port = get_env_or_default("PAYMENT_PROXY_PORT", "3001")
            .parse::<u16>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("PAYMENT_PROXY_PORT".to_string(), e.to_string())
            })?;

        Ok(Self {
            stripe_secret_key: SecretString::from(key),
            host,
            port,
            allowed_origin: get_optional_env("PAYMENT_PROXY_ALLOWED_ORIGIN"),
            stripe_api_base: get_env_or_default("STRIPE_API_BASE", "https://api.stripe.com/v1"),
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Validate that the processor key is not a placeholder and carries the
/// expected prefix.
fn validate_processor_key(key: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = key.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }

    if !key.starts_with("sk_") {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            "must be a secret key (sk_test_... or sk_live_...)".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_processor_key_placeholder() {
        let result = validate_processor_key("sk_test_your-key-here", "TEST_VAR");
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_processor_key_wrong_prefix() {
        let result = validate_processor_key("pk_test_51Hxyz", "TEST_VAR");
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_processor_key_valid() {
        let result = validate_processor_key("sk_test_51HxyzABC123def456", "TEST_VAR");
        assert!(result.is_ok());
    }

    #[test]
    fn test_socket_addr() {
        let config = ProxyConfig {
            stripe_secret_key: SecretString::from("sk_test_51HxyzABC123def456"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            allowed_origin: None,
            stripe_api_base: "https://api.stripe.com/v1".to_string(),
            sentry_dsn: None,
            sentry_environment: None,
        };

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3001);
    }
}
