use chrono::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::bridge::Bridge;
use crate::identity::{IdentityClient, Session};

const AUTH_BACKUP_KEY: &str = "auth_backup";

/// Age ceiling for a stored backup. The refresh token itself is the validity
/// authority; the ceiling only discards fossils.
const AUTH_BACKUP_MAX_AGE_DAYS: i64 = 90;

/// Session tokens replicated outside the identity provider's own storage,
/// read back at startup when that storage was wiped (installed iOS contexts,
/// mostly).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthBackup {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default)]
    pub provider_token: Option<String>,
    #[serde(default)]
    pub user: Option<Value>,
}

impl From<&Session> for AuthBackup {
    fn from(session: &Session) -> Self {
        Self {
            access_token: session.access_token.clone(),
            refresh_token: session.refresh_token.clone(),
            expires_at: session.expires_at,
            provider_token: session.provider_token.clone(),
            user: session.user.clone(),
        }
    }
}

/// Replicate the backup to every backend. Called after every successful
/// authentication state change.
pub async fn persist_auth_backup(bridge: &Bridge, backup: &AuthBackup) {
    match serde_json::to_value(backup) {
        Ok(value) => bridge.write(AUTH_BACKUP_KEY, value).await,
        Err(e) => tracing::debug!(error = %e, "auth backup serialize failed"),
    }
}

/// First recoverable backup with both tokens present.
pub async fn read_auth_backup(bridge: &Bridge) -> Option<AuthBackup> {
    let record = bridge
        .read(AUTH_BACKUP_KEY, Duration::days(AUTH_BACKUP_MAX_AGE_DAYS))
        .await?;
    let backup: AuthBackup = serde_json::from_value(record.value).ok()?;
    if backup.access_token.is_empty() || backup.refresh_token.is_empty() {
        return None;
    }
    Some(backup)
}

pub async fn clear_auth_backup(bridge: &Bridge) {
    bridge.clear(AUTH_BACKUP_KEY).await;
}

/// Startup path: prefer the provider's own session; fall back to the backup
/// when the provider lost its storage. The backup is refreshed either way,
/// and superseded the moment the provider reports a live session.
pub async fn restore_session<I: IdentityClient>(bridge: &Bridge, identity: &I) -> Option<Session> {
    if let Some(session) = identity.session().await {
        persist_auth_backup(bridge, &AuthBackup::from(&session)).await;
        return Some(session);
    }

    let backup = read_auth_backup(bridge).await?;
    if identity
        .set_session(&backup.access_token, &backup.refresh_token)
        .await
        .is_err()
    {
        return None;
    }
    let session = identity.session().await?;
    persist_auth_backup(bridge, &AuthBackup::from(&session)).await;
    Some(session)
}
