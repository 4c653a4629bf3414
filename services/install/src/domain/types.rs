use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Days an install code stays valid after creation.
pub const CODE_TTL_DAYS: i64 = 30;

/// Redemptions permitted per code.
pub const CODE_MAX_USES: i32 = 10;

/// A prior code younger than this is handed back instead of minting a new one.
pub const REUSE_WINDOW_DAYS: i64 = 7;

/// A code at/over its cap stays redeemable this long past its last use.
pub const REDEEM_GRACE_DAYS: i64 = 7;

/// Optional profile fields carried on the issuance request
/// (`name`, `wh_id`, `inst` on the wire).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstallMetadata {
    pub name: Option<String>,
    pub wh_id: Option<String>,
    pub inst: Option<String>,
}

/// One redemption attempt, appended to the code's `devices_info` log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedemptionEvent {
    #[serde(serialize_with = "clinpush_core::serde::to_rfc3339_ms")]
    pub at: DateTime<Utc>,
    pub user_agent: Option<String>,
    pub remote_addr: Option<String>,
}

/// Server-owned install code record. Binds a device installation to a user
/// identity; replayed by the installed app on every relaunch without a local
/// session, so redemption does not invalidate it.
#[derive(Debug, Clone)]
pub struct InstallCode {
    pub code: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub metadata: InstallMetadata,
    pub use_count: i32,
    pub max_uses: i32,
    pub used_at: Option<DateTime<Utc>>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub devices_info: Vec<RedemptionEvent>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl InstallCode {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }

    /// Whether issuance should hand this code back instead of minting a new
    /// one: young, unexpired, and under the usage cap.
    pub fn is_reusable(&self) -> bool {
        !self.is_expired()
            && self.use_count < self.max_uses
            && Utc::now() - self.created_at < Duration::days(REUSE_WINDOW_DAYS)
    }
}

/// Public profile row keyed by identity id.
#[derive(Debug, Clone)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: String,
    pub name: Option<String>,
    pub wh_id: Option<String>,
    pub inst: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// Result of an admin magic-link generation at the identity provider.
/// `email_otp` is the one-time passcode normally embedded in the emailed
/// link, relayed directly to the client during the install flow.
#[derive(Debug, Clone)]
pub struct GeneratedLink {
    pub user_id: Uuid,
    pub email: String,
    pub email_otp: Option<String>,
    pub action_link: String,
}
