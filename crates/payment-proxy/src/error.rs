//! Error handling with Sentry integration.
//!
//! Handlers return `Result<T, ProxyError>`; failures are captured to Sentry
//! and answered with `500 {"error": message}`, which is the shape the
//! storefront's payments client parses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

use crate::stripe::StripeError;

/// Application-level error type for the proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Processor call failed.
    #[error(transparent)]
    Stripe(#[from] StripeError),
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub(crate) fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let event_id = sentry::capture_error(&self);
        tracing::error!(
            error = %self,
            sentry_event_id = %event_id,
            "Request error"
        );

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorBody::new(self.to_string())),
        )
            .into_response()
    }
}
