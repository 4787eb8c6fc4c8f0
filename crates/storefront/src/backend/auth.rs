//! Identity API client.
//!
//! Password sign-in and sign-up against the hosted identity service, plus the
//! small account operations that ride on a user's access token. Failures the
//! UI has to word differently (wrong password, unconfirmed email, duplicate
//! account) get their own error variants; everything else surfaces as a
//! generic API error.

use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use uuid::Uuid;

use super::error_message;
use crate::config::BackendConfig;
use maison_core::Email;

/// Errors from the identity API.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Email address has not been confirmed yet")]
    EmailNotConfirmed,

    #[error("An account with this email already exists")]
    UserAlreadyExists,

    #[error("Identity API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to parse identity API response: {0}")]
    Parse(String),
}

/// The identity record the auth service holds for a user.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub user_metadata: UserMetadata,
    #[serde(default)]
    pub identities: Option<Vec<serde_json::Value>>,
}

/// Free-form metadata captured at sign-up.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserMetadata {
    #[serde(default)]
    pub display_name: Option<String>,
}

/// A signed-in session: tokens plus the identity they belong to.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub access_token: SecretString,
    pub refresh_token: Option<SecretString>,
    pub user: AuthUser,
}

/// What a successful sign-up produced.
#[derive(Debug, Clone)]
pub enum SignUpResult {
    /// Confirmation is disabled; the user is signed in immediately.
    Session(AuthSession),
    /// The account was created and a confirmation email sent.
    ConfirmationRequired,
}

/// Wire shape of a token response.
#[derive(Deserialize)]
struct SessionPayload {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    user: AuthUser,
}

impl From<SessionPayload> for AuthSession {
    fn from(payload: SessionPayload) -> Self {
        Self {
            access_token: SecretString::from(payload.access_token),
            refresh_token: payload.refresh_token.map(SecretString::from),
            user: payload.user,
        }
    }
}

/// Client for the identity API.
#[derive(Clone)]
pub struct AuthClient {
    inner: Arc<AuthClientInner>,
}

struct AuthClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl AuthClient {
    /// Create a new identity API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the API key is
    /// not a valid header value.
    pub fn new(config: &BackendConfig) -> Result<Self, AuthError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| AuthError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        Ok(Self {
            inner: Arc::new(AuthClientInner {
                client,
                base_url: config.base_url.clone(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.inner.base_url)
    }

    /// Exchange an email and password for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] for a wrong password and
    /// [`AuthError::EmailNotConfirmed`] when the account still awaits its
    /// confirmation email.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_in(&self, email: &Email, password: &str) -> Result<AuthSession, AuthError> {
        let response = self
            .inner
            .client
            .post(self.url("token"))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
            }))
            .send()
            .await?;
        let payload: SessionPayload = parse_ok(response).await?;
        Ok(payload.into())
    }

    /// Register a new account.
    ///
    /// The display name lands in the user's metadata so the first sign-in can
    /// seed a profile from it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::UserAlreadyExists`] when the email is taken, even
    /// when the service masks that as a success response.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn sign_up(
        &self,
        email: &Email,
        password: &str,
        display_name: &str,
    ) -> Result<SignUpResult, AuthError> {
        let response = self
            .inner
            .client
            .post(self.url("signup"))
            .json(&serde_json::json!({
                "email": email.as_str(),
                "password": password,
                "data": { "display_name": display_name },
            }))
            .send()
            .await?;
        let body: serde_json::Value = parse_ok(response).await?;
        normalize_sign_up(body)
    }

    /// Revoke a session's tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn sign_out(&self, access_token: &SecretString) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .post(self.url("logout"))
            .bearer_auth(access_token.expose_secret())
            .send()
            .await?;
        check_ok(response).await
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_password(
        &self,
        access_token: &SecretString,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .put(self.url("user"))
            .bearer_auth(access_token.expose_secret())
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await?;
        check_ok(response).await
    }

    /// Send the sign-up confirmation email again.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn resend_confirmation(&self, email: &Email) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .post(self.url("resend"))
            .json(&serde_json::json!({
                "type": "signup",
                "email": email.as_str(),
            }))
            .send()
            .await?;
        check_ok(response).await
    }

    /// Email the user a password recovery link.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn request_password_reset(&self, email: &Email) -> Result<(), AuthError> {
        let response = self
            .inner
            .client
            .post(self.url("recover"))
            .json(&serde_json::json!({ "email": email.as_str() }))
            .send()
            .await?;
        check_ok(response).await
    }
}

/// Fold the two success shapes a sign-up can produce into one result.
///
/// With confirmations disabled the service returns a full session; with them
/// enabled it returns the bare user. A duplicate email also returns a bare
/// user, distinguishable only by its empty identity list.
fn normalize_sign_up(body: serde_json::Value) -> Result<SignUpResult, AuthError> {
    if body.get("access_token").is_some() {
        let payload: SessionPayload =
            serde_json::from_value(body).map_err(|e| AuthError::Parse(e.to_string()))?;
        return Ok(SignUpResult::Session(payload.into()));
    }

    let user: AuthUser =
        serde_json::from_value(body).map_err(|e| AuthError::Parse(e.to_string()))?;
    if user.identities.as_ref().is_some_and(Vec::is_empty) {
        return Err(AuthError::UserAlreadyExists);
    }
    Ok(SignUpResult::ConfirmationRequired)
}

/// Map a failed response onto the auth error taxonomy.
fn classify_error(status: u16, body: &str) -> AuthError {
    #[derive(Default, Deserialize)]
    struct ErrorBody {
        #[serde(default)]
        error_code: Option<String>,
        #[serde(default)]
        msg: Option<String>,
        #[serde(default)]
        error_description: Option<String>,
    }

    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let code = parsed.error_code.unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.error_description)
        .unwrap_or_else(|| error_message(body));
    let lowered = message.to_lowercase();

    if code == "invalid_credentials" || lowered.contains("invalid login credentials") {
        AuthError::InvalidCredentials
    } else if code == "email_not_confirmed" || lowered.contains("email not confirmed") {
        AuthError::EmailNotConfirmed
    } else if code == "user_already_exists"
        || code == "email_exists"
        || lowered.contains("already registered")
    {
        AuthError::UserAlreadyExists
    } else {
        AuthError::Api { status, message }
    }
}

async fn parse_ok<T: serde::de::DeserializeOwned>(
    response: reqwest::Response,
) -> Result<T, AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_error(status.as_u16(), &body));
    }
    response
        .json()
        .await
        .map_err(|e| AuthError::Parse(e.to_string()))
}

async fn check_ok(response: reqwest::Response) -> Result<(), AuthError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(classify_error(status.as_u16(), &body));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_invalid_credentials() {
        let err = classify_error(
            400,
            r#"{"error":"invalid_grant","error_description":"Invalid login credentials"}"#,
        );
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_classify_invalid_credentials_by_code() {
        let err = classify_error(
            400,
            r#"{"error_code":"invalid_credentials","msg":"Invalid login credentials"}"#,
        );
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_classify_unconfirmed_email() {
        let err = classify_error(400, r#"{"msg":"Email not confirmed"}"#);
        assert!(matches!(err, AuthError::EmailNotConfirmed));
    }

    #[test]
    fn test_classify_duplicate_account() {
        let err = classify_error(422, r#"{"msg":"User already registered"}"#);
        assert!(matches!(err, AuthError::UserAlreadyExists));
    }

    #[test]
    fn test_classify_unknown_error_keeps_status() {
        let err = classify_error(500, r#"{"msg":"Database unavailable"}"#);
        match err {
            AuthError::Api { status, message } => {
                assert_eq!(status, 500);
                assert_eq!(message, "Database unavailable");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_sign_up_session_shape() {
        let body = json!({
            "access_token": "token-abc",
            "refresh_token": "refresh-xyz",
            "user": {
                "id": "7f1cf08b-9c0d-4f2e-9a6e-111111111111",
                "email": "claire@example.com",
                "user_metadata": { "display_name": "Claire" },
            },
        });
        match normalize_sign_up(body) {
            Ok(SignUpResult::Session(session)) => {
                assert_eq!(session.access_token.expose_secret(), "token-abc");
                assert_eq!(
                    session.user.user_metadata.display_name.as_deref(),
                    Some("Claire")
                );
            }
            other => panic!("expected a session, got {other:?}"),
        }
    }

    #[test]
    fn test_sign_up_confirmation_shape() {
        let body = json!({
            "id": "7f1cf08b-9c0d-4f2e-9a6e-111111111111",
            "email": "claire@example.com",
            "identities": [{ "provider": "email" }],
        });
        assert!(matches!(
            normalize_sign_up(body),
            Ok(SignUpResult::ConfirmationRequired)
        ));
    }

    #[test]
    fn test_sign_up_masked_duplicate() {
        let body = json!({
            "id": "7f1cf08b-9c0d-4f2e-9a6e-111111111111",
            "email": "claire@example.com",
            "identities": [],
        });
        assert!(matches!(
            normalize_sign_up(body),
            Err(AuthError::UserAlreadyExists)
        ));
    }
}
