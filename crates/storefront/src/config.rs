//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MAISON_BACKEND_URL` - Base URL of the hosted backend project
//! - `MAISON_BACKEND_KEY` - Publishable API key for the hosted backend
//!
//! ## Optional
//! - `MAISON_PAYMENTS_URL` - Payment proxy base URL (default: <http://localhost:3001/api>)
//! - `MAISON_SHIPPING_FEE` - Flat shipping fee in dollars (default: 150)
//! - `MAISON_TAX_RATE` - Tax rate applied to the subtotal (e.g. 0.10); unset
//!   means totals carry no tax line
//! - `MAISON_IMAGE_BUCKET` - Storage bucket for listing photos (default: item-images)

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::checkout::CheckoutPolicy;
use maison_core::Price;

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

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// Hosted backend connection (auth, rows, storage)
    pub backend: BackendConfig,
    /// Base URL of the payment proxy, including the `/api` prefix
    pub payments_url: String,
    /// Checkout totals policy (shipping fee, optional tax rate)
    pub checkout: CheckoutPolicy,
    /// Storage bucket holding listing photos
    pub image_bucket: String,
}

/// Hosted backend connection settings.
///
/// Implements `Debug` manually to redact the API key.
#[derive(Clone)]
pub struct BackendConfig {
    /// Project base URL, no trailing slash (e.g. `https://abc.example.co`)
    pub base_url: String,
    /// Publishable API key, sent as both `apikey` and the anonymous bearer
    pub api_key: SecretString,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, URLs do not
    /// parse, numeric policy values do not parse, or the API key looks like a
    /// placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let backend = BackendConfig::from_env()?;
        let payments_url =
            get_valid_url_or_default("MAISON_PAYMENTS_URL", "http://localhost:3001/api")?;

        let shipping_fee = parse_decimal_env("MAISON_SHIPPING_FEE", "150")?;
        let tax_rate = get_optional_env("MAISON_TAX_RATE")
            .map(|raw| parse_tax_rate(&raw))
            .transpose()?;

        let image_bucket = get_env_or_default("MAISON_IMAGE_BUCKET", "item-images");

        Ok(Self {
            backend,
            payments_url,
            checkout: CheckoutPolicy {
                shipping_fee: Price::new(shipping_fee),
                tax_rate,
            },
            image_bucket,
        })
    }
}

impl BackendConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let base_url = get_valid_url("MAISON_BACKEND_URL")?;
        let api_key = get_validated_secret("MAISON_BACKEND_KEY")?;
        Ok(Self { base_url, api_key })
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

/// Get a required environment variable that must parse as a URL.
///
/// Trailing slashes are trimmed so callers can join paths with plain
/// `format!`.
fn get_valid_url(key: &str) -> Result<String, ConfigError> {
    validate_url(key, &get_required_env(key)?)
}

/// Like [`get_valid_url`] but with a default when the variable is unset.
fn get_valid_url_or_default(key: &str, default: &str) -> Result<String, ConfigError> {
    validate_url(key, &get_env_or_default(key, default))
}

fn validate_url(key: &str, raw: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", parsed.scheme()),
        ));
    }
    Ok(raw.trim_end_matches('/').to_string())
}

/// Parse a decimal-valued environment variable with a default.
fn parse_decimal_env(key: &str, default: &str) -> Result<Decimal, ConfigError> {
    let raw = get_env_or_default(key, default);
    let value: Decimal = raw.parse().map_err(|_| {
        ConfigError::InvalidEnvVar(key.to_string(), format!("'{raw}' is not a number"))
    })?;
    if value.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(value)
}

/// Parse and bounds-check a tax rate.
fn parse_tax_rate(raw: &str) -> Result<Decimal, ConfigError> {
    let key = "MAISON_TAX_RATE";
    let rate: Decimal = raw.parse().map_err(|_| {
        ConfigError::InvalidEnvVar(key.to_string(), format!("'{raw}' is not a number"))
    })?;
    if rate.is_sign_negative() || rate >= Decimal::ONE {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must be in the range [0, 1)".to_string(),
        ));
    }
    Ok(rate)
}

/// Validate that a secret is not a placeholder.
///
/// The backend key is a publishable token with a fixed issued format, so the
/// meaningful check is catching copy-paste template values, not entropy.
fn validate_secret_value(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();
    for pattern in PLACEHOLDER_PATTERNS {
        if lower.contains(pattern) {
            return Err(ConfigError::InsecureSecret(
                var_name.to_string(),
                format!("appears to be a placeholder (contains '{pattern}')"),
            ));
        }
    }
    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_value(&value, key)?;
    Ok(SecretString::from(value))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_url_trims_trailing_slash() {
        let url = validate_url("TEST_URL", "https://abc.example.co/").unwrap();
        assert_eq!(url, "https://abc.example.co");
    }

    #[test]
    fn test_validate_url_rejects_garbage() {
        assert!(validate_url("TEST_URL", "not a url").is_err());
        assert!(validate_url("TEST_URL", "ftp://abc.example.co").is_err());
    }

    #[test]
    fn test_validate_secret_placeholder() {
        let result = validate_secret_value("your-backend-key-here", "TEST_VAR");
        assert!(matches!(
            result.unwrap_err(),
            ConfigError::InsecureSecret(_, _)
        ));
    }

    #[test]
    fn test_validate_secret_real_key_shape() {
        let result = validate_secret_value(
            "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.c3RvcmVmcm9udA.k9yQ",
            "TEST_VAR",
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_parse_tax_rate_bounds() {
        assert_eq!(parse_tax_rate("0.10").unwrap(), Decimal::new(10, 2));
        assert!(parse_tax_rate("1").is_err());
        assert!(parse_tax_rate("-0.1").is_err());
        assert!(parse_tax_rate("ten percent").is_err());
    }

    #[test]
    fn test_backend_config_debug_redacts_key() {
        let config = BackendConfig {
            base_url: "https://abc.example.co".to_string(),
            api_key: SecretString::from("super-secret-key"),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("https://abc.example.co"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super-secret-key"));
    }
}
