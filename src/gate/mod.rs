//! Email access gate.
//!
//! Visitors must confirm a registered email once; after that the `ecg_auth_success`
//! flag in their key/value namespace keeps the gate open.

pub mod verifier;

use sha2::{Digest, Sha256};
use std::sync::Arc;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

use crate::db::{self, KeyValueStore, LogOnError, StoreError};
pub use verifier::{EmailVerifier, HttpEmailVerifier, UnconfiguredVerifier, VerifyError};

pub const INVALID_EMAIL_MESSAGE: &str = "正しいメールアドレスを入力してください。";
pub const NETWORK_ERROR_MESSAGE: &str = "通信エラーが発生しました。もう一度お試しください。";
pub const REJECTED_MESSAGE: &str = "登録済みのメールアドレスが確認できませんでした。";

/// Why the gate stayed closed.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GateError {
    #[error("invalid email address")]
    InvalidEmail,
    #[error("email rejected")]
    Rejected(Option<String>),
    #[error("verification failed: {0}")]
    Network(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GateError {
    /// Inline message shown under the email field.
    pub fn user_message(&self) -> String {
        match self {
            GateError::InvalidEmail => INVALID_EMAIL_MESSAGE.to_string(),
            GateError::Rejected(Some(message)) if !message.trim().is_empty() => message.clone(),
            GateError::Rejected(_) => REJECTED_MESSAGE.to_string(),
            GateError::Network(_) | GateError::Store(_) => NETWORK_ERROR_MESSAGE.to_string(),
        }
    }
}

impl From<VerifyError> for GateError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::Rejected(message) => GateError::Rejected(message),
            other => GateError::Network(other.to_string()),
        }
    }
}

/// Trim and NFKC-normalise an email; `None` unless it looks like an address.
///
/// NFKC folds full-width input (`ｎｕｒｓｅ＠example.com`) to ASCII.
pub fn normalize_email(raw: &str) -> Option<String> {
    let email: String = raw.nfkc().collect::<String>().trim().to_string();
    if email.is_empty() || !email.contains('@') {
        return None;
    }
    Some(email)
}

/// Short stable digest of an email for log lines.
pub fn email_digest(email: &str) -> String {
    let hash = Sha256::digest(email.to_lowercase().as_bytes());
    hex::encode(&hash[..6])
}

/// The gate: a verifier plus the persisted flag.
#[derive(Clone)]
pub struct AccessGate {
    verifier: Arc<dyn EmailVerifier>,
}

impl AccessGate {
    pub fn new(verifier: Arc<dyn EmailVerifier>) -> Self {
        Self { verifier }
    }

    /// Whether the visitor already passed the gate. Storage errors keep it closed.
    pub fn is_open(&self, store: &dyn KeyValueStore) -> bool {
        db::is_authenticated(store).log_warn_default("Failed to read auth flag")
    }

    /// Check the address format, then ask the remote service.
    ///
    /// Returns the normalised email on success. Does not touch storage, so
    /// callers can await this without holding a database lock.
    pub async fn verify(&self, raw_email: &str) -> Result<String, GateError> {
        let email = normalize_email(raw_email).ok_or(GateError::InvalidEmail)?;
        let digest = email_digest(&email);

        match self.verifier.verify(&email).await {
            Ok(()) => {
                tracing::info!("Email verified (digest {})", digest);
                Ok(email)
            }
            Err(e) => {
                tracing::info!("Email verification failed (digest {}): {}", digest, e);
                Err(e.into())
            }
        }
    }

    /// Persist the flag after a successful `verify`.
    pub fn open(&self, store: &dyn KeyValueStore) -> Result<(), GateError> {
        db::set_authenticated(store)?;
        Ok(())
    }
}
