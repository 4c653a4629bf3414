use std::sync::{Arc, Mutex};

use chrono::{Duration, Utc};
use uuid::Uuid;

use clinpush_install::domain::repository::{
    IdentityPort, InstallCodeRepository, ProfileRepository,
};
use clinpush_install::domain::types::{
    CODE_MAX_USES, CODE_TTL_DAYS, GeneratedLink, InstallCode, InstallMetadata, Profile,
    REDEEM_GRACE_DAYS, RedemptionEvent,
};
use clinpush_install::error::InstallServiceError;

// ── MockIdentityPort ─────────────────────────────────────────────────────────

pub struct MockIdentityPort {
    pub user_id: Uuid,
    pub email_otp: Option<String>,
    pub calls: Arc<Mutex<u32>>,
}

impl MockIdentityPort {
    pub fn new(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_otp: Some("123456".to_owned()),
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn without_otp(user_id: Uuid) -> Self {
        Self {
            user_id,
            email_otp: None,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    /// Shared handle counting `generate_link` invocations.
    pub fn calls_handle(&self) -> Arc<Mutex<u32>> {
        Arc::clone(&self.calls)
    }
}

impl IdentityPort for MockIdentityPort {
    async fn generate_link(
        &self,
        email: &str,
        _metadata: &InstallMetadata,
        _redirect_to: Option<&str>,
    ) -> Result<GeneratedLink, InstallServiceError> {
        *self.calls.lock().unwrap() += 1;
        Ok(GeneratedLink {
            user_id: self.user_id,
            email: email.to_owned(),
            email_otp: self.email_otp.clone(),
            action_link: format!("https://auth.example.com/verify?email={email}"),
        })
    }
}

// ── MockInstallCodeRepo ──────────────────────────────────────────────────────

pub struct MockInstallCodeRepo {
    pub codes: Arc<Mutex<Vec<InstallCode>>>,
}

impl MockInstallCodeRepo {
    pub fn new(codes: Vec<InstallCode>) -> Self {
        Self {
            codes: Arc::new(Mutex::new(codes)),
        }
    }

    pub fn empty() -> Self {
        Self::new(vec![])
    }

    /// Shared handle to the internal code list for post-execution inspection.
    pub fn codes_handle(&self) -> Arc<Mutex<Vec<InstallCode>>> {
        Arc::clone(&self.codes)
    }
}

impl InstallCodeRepository for MockInstallCodeRepo {
    async fn find_latest(
        &self,
        user_id: Uuid,
        email: &str,
    ) -> Result<Option<InstallCode>, InstallServiceError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .filter(|c| c.user_id == user_id && c.email == email)
            .max_by_key(|c| c.created_at)
            .cloned())
    }

    async fn find_by_code(&self, code: Uuid) -> Result<Option<InstallCode>, InstallServiceError> {
        Ok(self
            .codes
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn insert(&self, code: &InstallCode) -> Result<(), InstallServiceError> {
        self.codes.lock().unwrap().push(code.clone());
        Ok(())
    }

    async fn update_metadata(
        &self,
        code: Uuid,
        metadata: &InstallMetadata,
    ) -> Result<(), InstallServiceError> {
        let mut codes = self.codes.lock().unwrap();
        if let Some(c) = codes.iter_mut().find(|c| c.code == code) {
            c.metadata = metadata.clone();
        }
        Ok(())
    }

    async fn increment_use(&self, code: Uuid) -> Result<Option<InstallCode>, InstallServiceError> {
        let mut codes = self.codes.lock().unwrap();
        let Some(c) = codes.iter_mut().find(|c| c.code == code) else {
            return Ok(None);
        };
        let now = Utc::now();
        let within_grace = c
            .last_used_at
            .is_some_and(|t| t > now - Duration::days(REDEEM_GRACE_DAYS));
        if c.use_count < c.max_uses || within_grace {
            c.use_count += 1;
            c.used_at = Some(now);
            c.last_used_at = Some(now);
            Ok(Some(c.clone()))
        } else {
            Ok(None)
        }
    }

    async fn append_device_info(
        &self,
        code: Uuid,
        event: &RedemptionEvent,
    ) -> Result<(), InstallServiceError> {
        let mut codes = self.codes.lock().unwrap();
        if let Some(c) = codes.iter_mut().find(|c| c.code == code) {
            c.devices_info.push(event.clone());
        }
        Ok(())
    }
}

// ── MockProfileRepo ──────────────────────────────────────────────────────────

pub struct MockProfileRepo {
    pub profiles: Arc<Mutex<Vec<Profile>>>,
}

impl MockProfileRepo {
    pub fn empty() -> Self {
        Self {
            profiles: Arc::new(Mutex::new(vec![])),
        }
    }

    pub fn profiles_handle(&self) -> Arc<Mutex<Vec<Profile>>> {
        Arc::clone(&self.profiles)
    }
}

impl ProfileRepository for MockProfileRepo {
    async fn upsert(&self, profile: &Profile) -> Result<(), InstallServiceError> {
        let mut profiles = self.profiles.lock().unwrap();
        if let Some(p) = profiles.iter_mut().find(|p| p.user_id == profile.user_id) {
            *p = profile.clone();
        } else {
            profiles.push(profile.clone());
        }
        Ok(())
    }
}

// ── Test fixture helpers ─────────────────────────────────────────────────────

pub fn test_user_id() -> Uuid {
    Uuid::parse_str("00000000-0000-0000-0000-000000000001").unwrap()
}

pub fn test_install_code(user_id: Uuid, email: &str) -> InstallCode {
    let now = Utc::now();
    InstallCode {
        code: Uuid::new_v4(),
        user_id,
        email: email.to_owned(),
        metadata: InstallMetadata::default(),
        use_count: 0,
        max_uses: CODE_MAX_USES,
        used_at: None,
        last_used_at: None,
        devices_info: vec![],
        expires_at: now + Duration::days(CODE_TTL_DAYS),
        created_at: now,
    }
}
