use chrono::{Duration, Utc};
use uuid::Uuid;

use crate::domain::repository::{IdentityPort, InstallCodeRepository, ProfileRepository};
use crate::domain::types::{CODE_MAX_USES, CODE_TTL_DAYS, InstallCode, InstallMetadata, Profile};
use crate::error::InstallServiceError;

pub struct CreateInstallInput {
    pub email: String,
    pub metadata: InstallMetadata,
    pub redirect_to: Option<String>,
}

#[derive(Debug)]
pub struct CreateInstallOutput {
    pub code: Uuid,
    pub email: String,
    pub reused: bool,
}

pub struct CreateInstallUseCase<I, C, P>
where
    I: IdentityPort,
    C: InstallCodeRepository,
    P: ProfileRepository,
{
    pub identity: I,
    pub codes: C,
    pub profiles: P,
}

impl<I, C, P> CreateInstallUseCase<I, C, P>
where
    I: IdentityPort,
    C: InstallCodeRepository,
    P: ProfileRepository,
{
    pub async fn execute(
        &self,
        input: CreateInstallInput,
    ) -> Result<CreateInstallOutput, InstallServiceError> {
        if input.email.trim().is_empty() {
            return Err(InstallServiceError::MissingEmail);
        }

        // The admin link call doubles as find-or-create for the identity.
        let link = self
            .identity
            .generate_link(&input.email, &input.metadata, input.redirect_to.as_deref())
            .await?;

        // Idempotent reissue: hand back the latest still-reusable code.
        if let Some(prior) = self.codes.find_latest(link.user_id, &input.email).await? {
            if prior.is_reusable() {
                self.codes.update_metadata(prior.code, &input.metadata).await?;
                return Ok(CreateInstallOutput {
                    code: prior.code,
                    email: prior.email,
                    reused: true,
                });
            }
        }

        let now = Utc::now();
        self.profiles
            .upsert(&Profile {
                user_id: link.user_id,
                email: input.email.clone(),
                name: input.metadata.name.clone(),
                wh_id: input.metadata.wh_id.clone(),
                inst: input.metadata.inst.clone(),
                updated_at: now,
            })
            .await?;

        let code = InstallCode {
            code: Uuid::new_v4(),
            user_id: link.user_id,
            email: input.email.clone(),
            metadata: input.metadata,
            use_count: 0,
            max_uses: CODE_MAX_USES,
            used_at: None,
            last_used_at: None,
            devices_info: Vec::new(),
            expires_at: now + Duration::days(CODE_TTL_DAYS),
            created_at: now,
        };
        self.codes.insert(&code).await?;

        Ok(CreateInstallOutput {
            code: code.code,
            email: code.email,
            reused: false,
        })
    }
}
