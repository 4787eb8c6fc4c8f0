//! Client for the card processor's form-encoded REST API.
//!
//! The processor accepts `application/x-www-form-urlencoded` bodies with
//! bracketed keys for nested fields and reports errors as
//! `{"error": {"message": ...}}`. Amounts cross this boundary in cents; the
//! storefront deals in dollars, so the conversion lives here and nowhere
//! else.

use std::sync::Arc;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use rust_decimal::RoundingStrategy;
use rust_decimal::prelude::ToPrimitive;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::instrument;

/// Errors that can occur when talking to the processor.
#[derive(Debug, thiserror::Error)]
pub enum StripeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Processor returned an error response.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Failed to parse a response body.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Amount does not fit in a cent count.
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Decimal),
}

/// A created payment intent.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

/// A created setup intent.
#[derive(Debug, Clone, Deserialize)]
pub struct SetupIntent {
    pub id: String,
    pub client_secret: String,
}

/// A created customer record.
#[derive(Debug, Clone, Deserialize)]
pub struct Customer {
    pub id: String,
    pub email: Option<String>,
}

/// A saved payment method, as the processor lists it.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub card: Option<CardDetails>,
}

/// Card fields nested inside a payment method.
#[derive(Debug, Clone, Deserialize)]
pub struct CardDetails {
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

#[derive(Debug, Deserialize)]
struct PaymentMethodList {
    data: Vec<PaymentMethod>,
}

/// Client for the processor API.
///
/// Cheap to clone; clones share the HTTP pool and the signing key.
#[derive(Clone)]
pub struct StripeClient {
    inner: Arc<StripeClientInner>,
}

struct StripeClientInner {
    client: reqwest::Client,
    api_base: String,
}

impl StripeClient {
    /// Create a new processor client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the secret key
    /// is not a valid header value.
    pub fn new(api_base: &str, secret_key: &SecretString) -> Result<Self, StripeError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {}", secret_key.expose_secret()))
            .map_err(|e| StripeError::Parse(format!("Invalid secret key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(StripeClientInner {
                client,
                api_base: api_base.trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.api_base)
    }

    /// Create a payment intent for a dollar amount.
    ///
    /// # Errors
    ///
    /// Returns an error if the amount does not round to a representable cent
    /// count or the processor rejects the request.
    #[instrument(skip(self))]
    pub async fn create_payment_intent(
        &self,
        amount: Decimal,
    ) -> Result<PaymentIntent, StripeError> {
        let cents = to_cents(amount)?;
        let params = [
            ("amount", cents.to_string()),
            ("currency", "usd".to_string()),
            ("automatic_payment_methods[enabled]", "true".to_string()),
        ];
        let response = self
            .inner
            .client
            .post(self.url("payment_intents"))
            .form(&params)
            .send()
            .await?;
        parse_ok(response).await
    }

    /// Create a setup intent for saving a card to a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor rejects the request.
    #[instrument(skip(self))]
    pub async fn create_setup_intent(&self, customer_id: &str) -> Result<SetupIntent, StripeError> {
        let params = [
            ("customer", customer_id.to_string()),
            ("payment_method_types[]", "card".to_string()),
        ];
        let response = self
            .inner
            .client
            .post(self.url("setup_intents"))
            .form(&params)
            .send()
            .await?;
        parse_ok(response).await
    }

    /// Create a customer record.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor rejects the request.
    #[instrument(skip(self, email, name))]
    pub async fn create_customer(&self, email: &str, name: &str) -> Result<Customer, StripeError> {
        let params = [("email", email.to_string()), ("name", name.to_string())];
        let response = self
            .inner
            .client
            .post(self.url("customers"))
            .form(&params)
            .send()
            .await?;
        parse_ok(response).await
    }

    /// List a customer's saved card payment methods.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor rejects the request.
    #[instrument(skip(self))]
    pub async fn list_card_payment_methods(
        &self,
        customer_id: &str,
    ) -> Result<Vec<PaymentMethod>, StripeError> {
        let response = self
            .inner
            .client
            .get(self.url("payment_methods"))
            .query(&[("customer", customer_id), ("type", "card")])
            .send()
            .await?;
        let list: PaymentMethodList = parse_ok(response).await?;
        Ok(list.data)
    }

    /// Detach a payment method from its customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the processor rejects the request.
    #[instrument(skip(self))]
    pub async fn detach_payment_method(&self, payment_method_id: &str) -> Result<(), StripeError> {
        let response = self
            .inner
            .client
            .post(self.url(&format!("payment_methods/{payment_method_id}/detach")))
            .send()
            .await?;
        check_ok(response).await?;
        Ok(())
    }
}

/// Convert a dollar amount to a cent count, rounding half away from zero.
fn to_cents(amount: Decimal) -> Result<i64, StripeError> {
    (amount * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(StripeError::AmountOutOfRange(amount))
}

async fn check_ok(response: reqwest::Response) -> Result<reqwest::Response, StripeError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(StripeError::Api {
        status: status.as_u16(),
        message: error_message(status, &body),
    })
}

async fn parse_ok<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, StripeError> {
    let response = check_ok(response).await?;
    let body = response.text().await?;
    serde_json::from_str(&body).map_err(|e| StripeError::Parse(e.to_string()))
}

/// Extract the human-readable message from `{"error": {"message": ...}}`,
/// falling back to the raw body or the status line.
fn error_message(status: StatusCode, body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }

    #[derive(Deserialize)]
    struct ErrorDetail {
        message: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error.message)
        .unwrap_or_else(|| {
            if body.is_empty() {
                format!("processor returned status {status}")
            } else {
                body.chars().take(200).collect()
            }
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cents_whole_dollars() {
        assert_eq!(to_cents(Decimal::from(425)).unwrap(), 42_500);
        assert_eq!(to_cents(Decimal::ZERO).unwrap(), 0);
    }

    #[test]
    fn test_to_cents_rounds_half_up() {
        let amount: Decimal = "19.995".parse().unwrap();
        assert_eq!(to_cents(amount).unwrap(), 2_000);
    }

    #[test]
    fn test_error_message_processor_shape() {
        let body = r#"{"error": {"message": "Your card was declined.", "type": "card_error"}}"#;
        assert_eq!(
            error_message(StatusCode::PAYMENT_REQUIRED, body),
            "Your card was declined."
        );
    }

    #[test]
    fn test_error_message_falls_back_to_body() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded"),
            "upstream exploded"
        );
    }

    #[test]
    fn test_error_message_empty_body() {
        assert_eq!(
            error_message(StatusCode::BAD_GATEWAY, ""),
            "processor returned status 502 Bad Gateway"
        );
    }
}
