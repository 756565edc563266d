use std::time::Duration;
use serde::{Deserialize, Serialize};
use reqwest::Client;
use log::{debug, error};
use url::Url;

use crate::errors::AuthError;

/// Auth client for the identity provider's password-grant endpoint
#[derive(Debug, Clone)]
pub struct AuthClient {
    /// HTTP client for auth requests
    client: Client,
    /// Base URL of the backend project
    base_url: Url,
    /// Anonymous project API key
    anon_key: String,
}

/// Password-grant sign-in request body
#[derive(Debug, Serialize)]
struct PasswordGrantRequest<'a> {
    /// Account email
    email: &'a str,
    /// Account password
    password: &'a str,
}

/// Successful sign-in response
///
/// Only the fields the application uses; the provider sends more.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    /// Opaque bearer token for subsequent queries
    pub access_token: String,
    /// Token type, normally "bearer"
    #[serde(default)]
    pub token_type: String,
    /// Seconds until the token expires, if the provider reports it
    #[serde(default)]
    pub expires_in: Option<u64>,
}

/// Error body the provider returns on a failed sign-in
#[derive(Debug, Deserialize)]
struct AuthErrorBody {
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthErrorBody {
    fn into_message(self) -> Option<String> {
        self.error_description.or(self.msg).or(self.message)
    }
}

impl AuthClient {
    /// Create a new auth client
    pub fn new(base_url: Url, anon_key: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url,
            anon_key: anon_key.into(),
        }
    }

    /// Sign in with an email/password pair
    ///
    /// Performs a single password-grant request; failures propagate without
    /// retry and leave no session state behind.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let endpoint = self
            .base_url
            .join("auth/v1/token?grant_type=password")
            .map_err(|e| AuthError::ConnectionError(format!("Invalid auth endpoint: {}", e)))?;

        debug!("Signing in {} against {}", email, endpoint);

        let response = self
            .client
            .post(endpoint)
            .header("apikey", &self.anon_key)
            .header("Content-Type", "application/json")
            .json(&PasswordGrantRequest { email, password })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AuthError::ConnectionError(format!("Sign-in request timed out: {}", e))
                } else {
                    AuthError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<AuthErrorBody>()
                .await
                .ok()
                .and_then(AuthErrorBody::into_message)
                .unwrap_or_else(|| "no error detail".to_string());
            error!("Sign-in failed ({}): {}", status, message);

            return Err(match status.as_u16() {
                400 | 401 => AuthError::InvalidCredentials,
                429 => AuthError::RateLimited(message),
                code => AuthError::Rejected {
                    status_code: code,
                    message,
                },
            });
        }

        let session = response
            .json::<AuthSession>()
            .await
            .map_err(|e| AuthError::ParseError(e.to_string()))?;

        if session.access_token.is_empty() {
            return Err(AuthError::ParseError("Provider returned an empty access token".to_string()));
        }

        Ok(session)
    }
}
