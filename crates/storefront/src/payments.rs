//! Payment proxy client.
//!
//! Talks to our own payment proxy, never to the processor directly; the
//! processor's secret key stays server-side. Request and response bodies use
//! the proxy's camelCase field names, except card records, which keep the
//! processor's snake_case expiry fields.

use std::sync::Arc;

use serde::Deserialize;
use tracing::instrument;

use maison_core::Price;

/// Errors from the payment proxy.
#[derive(Debug, thiserror::Error)]
pub enum PaymentsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Payment proxy error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse payment proxy response: {0}")]
    Parse(String),
}

/// A created payment intent, ready for card confirmation in the UI.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub client_secret: String,
    pub payment_intent_id: String,
}

/// A created setup intent for saving a card.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupIntent {
    pub client_secret: String,
    pub setup_intent_id: String,
}

/// A processor-side customer record.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorCustomer {
    pub customer_id: String,
    #[serde(default)]
    pub email: Option<String>,
}

/// A card on file with the processor.
#[derive(Debug, Clone, Deserialize)]
pub struct ProcessorCard {
    pub id: String,
    pub brand: String,
    pub last4: String,
    pub exp_month: u32,
    pub exp_year: u32,
}

/// Client for the payment proxy.
#[derive(Clone)]
pub struct PaymentsClient {
    inner: Arc<PaymentsClientInner>,
}

struct PaymentsClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl PaymentsClient {
    /// Create a new payment proxy client.
    ///
    /// `base_url` includes the `/api` prefix, e.g. `http://localhost:3001/api`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, PaymentsError> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            inner: Arc::new(PaymentsClientInner {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{path}", self.inner.base_url)
    }

    /// Create a payment intent for a checkout total.
    ///
    /// The amount crosses the wire in dollars; the proxy converts to the
    /// processor's minor units.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the proxy reports one.
    #[instrument(skip(self), fields(amount = %amount))]
    pub async fn create_payment_intent(
        &self,
        amount: Price,
    ) -> Result<PaymentIntent, PaymentsError> {
        let amount = amount
            .to_f64()
            .ok_or_else(|| PaymentsError::Parse("amount does not fit in a JSON number".into()))?;
        let response = self
            .inner
            .client
            .post(self.url("payment-intent"))
            .json(&serde_json::json!({ "amount": amount }))
            .send()
            .await?;
        parse_ok(response).await
    }

    /// Create a setup intent so the UI can collect and save a card.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the proxy reports one.
    pub async fn create_setup_intent(
        &self,
        customer_id: &str,
    ) -> Result<SetupIntent, PaymentsError> {
        let response = self
            .inner
            .client
            .post(self.url("setup-intent"))
            .json(&serde_json::json!({ "customerId": customer_id }))
            .send()
            .await?;
        parse_ok(response).await
    }

    /// Create a processor-side customer for a profile.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the proxy reports one.
    #[instrument(skip(self, email, name))]
    pub async fn create_customer(
        &self,
        email: &str,
        name: &str,
    ) -> Result<ProcessorCustomer, PaymentsError> {
        let response = self
            .inner
            .client
            .post(self.url("customer"))
            .json(&serde_json::json!({ "email": email, "name": name }))
            .send()
            .await?;
        parse_ok(response).await
    }

    /// List the cards on file for a processor customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the proxy reports one.
    pub async fn customer_cards(
        &self,
        customer_id: &str,
    ) -> Result<Vec<ProcessorCard>, PaymentsError> {
        let response = self
            .inner
            .client
            .get(self.url(&format!("customer-payment-methods/{customer_id}")))
            .send()
            .await?;
        parse_ok(response).await
    }

    /// Detach a card from its processor customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the proxy reports one.
    #[instrument(skip(self))]
    pub async fn detach_card(&self, payment_method_id: &str) -> Result<(), PaymentsError> {
        let response = self
            .inner
            .client
            .post(self.url(&format!("detach-payment-method/{payment_method_id}")))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }
        Ok(())
    }
}

fn api_error(status: u16, body: &str) -> PaymentsError {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: String,
    }

    let message = serde_json::from_str::<ErrorBody>(body)
        .map_or_else(|_| body.chars().take(200).collect(), |parsed| parsed.error);
    PaymentsError::Api { status, message }
}

async fn parse_ok<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, PaymentsError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(api_error(status.as_u16(), &body));
    }
    response
        .json()
        .await
        .map_err(|e| PaymentsError::Parse(e.to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_intent_uses_camel_case() {
        let intent: PaymentIntent = serde_json::from_str(
            r#"{"clientSecret":"pi_123_secret_abc","paymentIntentId":"pi_123"}"#,
        )
        .unwrap();
        assert_eq!(intent.client_secret, "pi_123_secret_abc");
        assert_eq!(intent.payment_intent_id, "pi_123");
    }

    #[test]
    fn test_card_keeps_snake_expiry_fields() {
        let card: ProcessorCard = serde_json::from_str(
            r#"{"id":"pm_1","brand":"visa","last4":"4242","exp_month":4,"exp_year":2030}"#,
        )
        .unwrap();
        assert_eq!(card.brand, "visa");
        assert_eq!(card.exp_year, 2030);
    }

    #[test]
    fn test_customer_tolerates_missing_email() {
        let customer: ProcessorCustomer =
            serde_json::from_str(r#"{"customerId":"cus_9"}"#).unwrap();
        assert_eq!(customer.customer_id, "cus_9");
        assert_eq!(customer.email, None);
    }

    #[test]
    fn test_api_error_extracts_message() {
        let err = api_error(500, r#"{"error":"Your card was declined."}"#);
        match err {
            PaymentsError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_api_error_falls_back_to_raw_body() {
        let err = api_error(502, "upstream timeout");
        match err {
            PaymentsError::Api { message, .. } => assert_eq!(message, "upstream timeout"),
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
