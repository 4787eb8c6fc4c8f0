//! JSON endpoints the storefront calls.
//!
//! # Route Structure
//!
//! ```text
//! POST /api/payment-intent                        - Create a payment intent
//! POST /api/setup-intent                          - Create a setup intent
//! POST /api/customer                              - Create a customer record
//! GET  /api/customer-payment-methods/{customer}   - List saved cards
//! POST /api/detach-payment-method/{method}        - Remove a saved card
//! GET  /health                                    - Health check
//! ```
//!
//! Amounts arrive in dollars; the processor boundary converts to cents. Any
//! request to a known path with the wrong method gets
//! `405 {"error": "Method not allowed"}`, and any upstream failure gets
//! `500 {"error": message}`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorBody, ProxyError};
use crate::state::ProxyState;

/// Build the proxy router.
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(
            "/api/payment-intent",
            post(create_payment_intent).fallback(method_not_allowed),
        )
        .route(
            "/api/setup-intent",
            post(create_setup_intent).fallback(method_not_allowed),
        )
        .route(
            "/api/customer",
            post(create_customer).fallback(method_not_allowed),
        )
        .route(
            "/api/customer-payment-methods/{customer_id}",
            get(list_customer_cards).fallback(method_not_allowed),
        )
        .route(
            "/api/detach-payment-method/{payment_method_id}",
            post(detach_payment_method).fallback(method_not_allowed),
        )
        .route("/health", get(health))
        .with_state(state)
}

/// Request to create a payment intent.
#[derive(Debug, Deserialize)]
struct PaymentIntentRequest {
    /// Order total in dollars.
    amount: Decimal,
}

/// Response from creating a payment intent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PaymentIntentResponse {
    client_secret: String,
    payment_intent_id: String,
}

/// Create a payment intent for an order total.
///
/// POST /api/payment-intent
///
/// # Errors
///
/// Returns `ProxyError` if the processor call fails.
async fn create_payment_intent(
    State(state): State<ProxyState>,
    Json(req): Json<PaymentIntentRequest>,
) -> Result<Json<PaymentIntentResponse>, ProxyError> {
    let intent = state.stripe().create_payment_intent(req.amount).await?;
    Ok(Json(PaymentIntentResponse {
        client_secret: intent.client_secret,
        payment_intent_id: intent.id,
    }))
}

/// Request to create a setup intent.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupIntentRequest {
    customer_id: String,
}

/// Response from creating a setup intent.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SetupIntentResponse {
    client_secret: String,
    setup_intent_id: String,
}

/// Create a setup intent for saving a card.
///
/// POST /api/setup-intent
///
/// # Errors
///
/// Returns `ProxyError` if the processor call fails.
async fn create_setup_intent(
    State(state): State<ProxyState>,
    Json(req): Json<SetupIntentRequest>,
) -> Result<Json<SetupIntentResponse>, ProxyError> {
    let intent = state.stripe().create_setup_intent(&req.customer_id).await?;
    Ok(Json(SetupIntentResponse {
        client_secret: intent.client_secret,
        setup_intent_id: intent.id,
    }))
}

/// Request to create a customer record.
#[derive(Debug, Deserialize)]
struct CustomerRequest {
    email: String,
    name: String,
}

/// Response from creating a customer record.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CustomerResponse {
    customer_id: String,
    email: Option<String>,
}

/// Create a processor-side customer record.
///
/// POST /api/customer
///
/// # Errors
///
/// Returns `ProxyError` if the processor call fails.
async fn create_customer(
    State(state): State<ProxyState>,
    Json(req): Json<CustomerRequest>,
) -> Result<Json<CustomerResponse>, ProxyError> {
    let customer = state.stripe().create_customer(&req.email, &req.name).await?;
    Ok(Json(CustomerResponse {
        customer_id: customer.id,
        email: customer.email,
    }))
}

/// A saved card, flattened for the storefront.
#[derive(Debug, Serialize)]
struct CardResponse {
    id: String,
    brand: String,
    last4: String,
    exp_month: u32,
    exp_year: u32,
}

/// List a customer's saved cards.
///
/// GET /api/customer-payment-methods/{customer_id}
///
/// # Errors
///
/// Returns `ProxyError` if the processor call fails.
async fn list_customer_cards(
    State(state): State<ProxyState>,
    Path(customer_id): Path<String>,
) -> Result<Json<Vec<CardResponse>>, ProxyError> {
    let methods = state.stripe().list_card_payment_methods(&customer_id).await?;
    let cards = methods
        .into_iter()
        .filter_map(|method| {
            method.card.map(|card| CardResponse {
                id: method.id,
                brand: card.brand,
                last4: card.last4,
                exp_month: card.exp_month,
                exp_year: card.exp_year,
            })
        })
        .collect();
    Ok(Json(cards))
}

/// Response from detaching a payment method.
#[derive(Debug, Serialize)]
struct DetachResponse {
    success: bool,
}

/// Remove a saved card from its customer.
///
/// POST /api/detach-payment-method/{payment_method_id}
///
/// # Errors
///
/// Returns `ProxyError` if the processor call fails.
async fn detach_payment_method(
    State(state): State<ProxyState>,
    Path(payment_method_id): Path<String>,
) -> Result<Json<DetachResponse>, ProxyError> {
    state
        .stripe()
        .detach_payment_method(&payment_method_id)
        .await?;
    Ok(Json(DetachResponse { success: true }))
}

/// Wrong-method responses keep the JSON error shape clients already parse.
async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Method not allowed")),
    )
        .into_response()
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_intent_response_uses_camel_case() {
        let json = serde_json::to_value(PaymentIntentResponse {
            client_secret: "pi_123_secret_456".to_string(),
            payment_intent_id: "pi_123".to_string(),
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "clientSecret": "pi_123_secret_456",
                "paymentIntentId": "pi_123",
            })
        );
    }

    #[test]
    fn test_setup_intent_request_accepts_camel_case() {
        let req: SetupIntentRequest =
            serde_json::from_str(r#"{"customerId": "cus_123"}"#).unwrap();
        assert_eq!(req.customer_id, "cus_123");
    }

    #[test]
    fn test_customer_response_keeps_null_email() {
        let json = serde_json::to_value(CustomerResponse {
            customer_id: "cus_123".to_string(),
            email: None,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"customerId": "cus_123", "email": null})
        );
    }

    #[test]
    fn test_card_response_keeps_processor_field_names() {
        let json = serde_json::to_value(CardResponse {
            id: "pm_123".to_string(),
            brand: "visa".to_string(),
            last4: "4242".to_string(),
            exp_month: 12,
            exp_year: 2030,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "pm_123",
                "brand": "visa",
                "last4": "4242",
                "exp_month": 12,
                "exp_year": 2030,
            })
        );
    }
}
