//! Remote email verification.
//!
//! The endpoint takes a form-encoded `email` field and answers with
//! `{"success": bool, "message": "..."}`. Anything else is a transport failure.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors from an email verification attempt.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VerifyError {
    /// The service answered and refused the address
    #[error("verification rejected")]
    Rejected(Option<String>),
    #[error("verification endpoint is not configured")]
    NotConfigured,
    #[error("unexpected verification response: {0}")]
    Malformed(String),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Something that can confirm an email address is registered.
#[async_trait]
pub trait EmailVerifier: Send + Sync {
    async fn verify(&self, email: &str) -> Result<(), VerifyError>;
}

#[derive(Debug, Deserialize)]
struct VerifyResponse {
    success: bool,
    #[serde(default)]
    message: Option<String>,
}

/// Verifier that posts to the configured HTTP endpoint.
#[derive(Clone, Debug)]
pub struct HttpEmailVerifier {
    client: Client,
    endpoint: String,
}

impl HttpEmailVerifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, VerifyError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl EmailVerifier for HttpEmailVerifier {
    async fn verify(&self, email: &str) -> Result<(), VerifyError> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[("email", email)])
            .send()
            .await?;

        let status = response.status();
        let body: VerifyResponse = response.json().await.map_err(|e| {
            if e.is_decode() {
                tracing::warn!("Verification endpoint returned {status} with unparseable body: {e}");
                VerifyError::Malformed(e.to_string())
            } else {
                VerifyError::Http(e)
            }
        })?;

        if body.success {
            Ok(())
        } else {
            Err(VerifyError::Rejected(body.message))
        }
    }
}

/// Stand-in used when no endpoint is configured: every attempt fails.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredVerifier;

#[async_trait]
impl EmailVerifier for UnconfiguredVerifier {
    async fn verify(&self, _email: &str) -> Result<(), VerifyError> {
        tracing::error!("Email verification attempted but no endpoint is configured");
        Err(VerifyError::NotConfigured)
    }
}
