//! Shared application state.

use crate::config::ProxyConfig;
use crate::stripe::{StripeClient, StripeError};

/// State shared across all request handlers.
///
/// Cheap to clone (the processor client is internally reference-counted).
#[derive(Clone)]
pub struct ProxyState {
    stripe: StripeClient,
}

impl ProxyState {
    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor client cannot be constructed.
    pub fn new(config: &ProxyConfig) -> Result<Self, StripeError> {
        let stripe = StripeClient::new(&config.stripe_api_base, &config.stripe_secret_key)?;
        Ok(Self { stripe })
    }

    /// The processor client.
    #[must_use]
    pub const fn stripe(&self) -> &StripeClient {
        &self.stripe
    }
}
