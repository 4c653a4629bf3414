#![allow(async_fn_in_trait)]

use serde_json::Value;

use crate::error::SetupError;

/// Session as reported by the identity provider's client SDK.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: Option<i64>,
    pub provider_token: Option<String>,
    pub user: Option<Value>,
}

/// The identity provider's client SDK, treated as an opaque capability.
pub trait IdentityClient: Send + Sync {
    /// Currently materialized local session, if any.
    async fn session(&self) -> Option<Session>;

    /// Verify an email OTP. Session materialization is asynchronous relative
    /// to this call returning.
    async fn verify_otp(&self, email: &str, token: &str) -> Result<(), SetupError>;

    /// Restore a session from backed-up tokens.
    async fn set_session(
        &self,
        access_token: &str,
        refresh_token: &str,
    ) -> Result<(), SetupError>;

    async fn sign_out(&self);
}
