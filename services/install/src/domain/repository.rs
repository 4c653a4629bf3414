#![allow(async_fn_in_trait)]

use uuid::Uuid;

use crate::domain::types::{GeneratedLink, InstallCode, InstallMetadata, Profile, RedemptionEvent};
use crate::error::InstallServiceError;

/// Port for the identity provider's administrative link-generation API.
pub trait IdentityPort: Send + Sync {
    /// Generate an admin magic link for `email`, creating the identity when
    /// it does not exist yet.
    async fn generate_link(
        &self,
        email: &str,
        metadata: &InstallMetadata,
        redirect_to: Option<&str>,
    ) -> Result<GeneratedLink, InstallServiceError>;
}

/// Repository for install codes.
pub trait InstallCodeRepository: Send + Sync {
    /// Most recent code for an identity + email pair.
    async fn find_latest(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<Option<InstallCode>, InstallServiceError>;

    async fn find_by_code(&self, code: Uuid) -> Result<Option<InstallCode>, InstallServiceError>;

    async fn insert(&self, code: &InstallCode) -> Result<(), InstallServiceError>;

    /// Refresh the metadata on a reused code.
    async fn update_metadata(
        &self,
        code: Uuid,
        metadata: &InstallMetadata,
    ) -> Result<(), InstallServiceError>;

    /// Atomically increment `use_count` and refresh `used_at`/`last_used_at`
    /// while the cap/grace rule still holds (a single conditional UPDATE, so
    /// concurrent redeemers cannot under-count). Returns the updated record,
    /// or `None` when the code is over cap and past grace.
    async fn increment_use(&self, code: Uuid) -> Result<Option<InstallCode>, InstallServiceError>;

    /// Append one redemption event to `devices_info`. Callers treat failures
    /// as non-fatal.
    async fn append_device_info(
        &self,
        code: Uuid,
        event: &RedemptionEvent,
    ) -> Result<(), InstallServiceError>;
}

/// Repository for public profile rows.
pub trait ProfileRepository: Send + Sync {
    /// Idempotent upsert keyed by identity id.
    async fn upsert(&self, profile: &Profile) -> Result<(), InstallServiceError>;
}
