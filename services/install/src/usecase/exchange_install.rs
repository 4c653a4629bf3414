use chrono::Utc;
use uuid::Uuid;

use crate::domain::repository::{IdentityPort, InstallCodeRepository};
use crate::domain::types::RedemptionEvent;
use crate::error::InstallServiceError;

pub struct ExchangeInstallInput {
    pub code: Uuid,
    pub redirect_to: Option<String>,
    pub user_agent: Option<String>,
    pub remote_addr: Option<String>,
}

#[derive(Debug)]
pub struct ExchangeInstallOutput {
    pub email: String,
    pub email_otp: String,
    pub use_count: i32,
    pub max_uses: i32,
}

pub struct ExchangeInstallUseCase<I, C>
where
    I: IdentityPort,
    C: InstallCodeRepository,
{
    pub identity: I,
    pub codes: C,
}

impl<I, C> ExchangeInstallUseCase<I, C>
where
    I: IdentityPort,
    C: InstallCodeRepository,
{
    pub async fn execute(
        &self,
        input: ExchangeInstallInput,
    ) -> Result<ExchangeInstallOutput, InstallServiceError> {
        // 1. Unknown code → invalid, without ever touching the identity provider.
        let record = self
            .codes
            .find_by_code(input.code)
            .await?
            .ok_or(InstallServiceError::InvalidCode)?;

        // 2. Hard expiry applies regardless of use count.
        if record.is_expired() {
            return Err(InstallServiceError::ExpiredCode);
        }

        // 3. Cap/grace is enforced by the conditional increment itself; zero
        //    rows updated means over cap and past grace.
        let record = self
            .codes
            .increment_use(input.code)
            .await?
            .ok_or(InstallServiceError::ExpiredCode)?;

        // 4. Mint a fresh one-time passcode for the bound email.
        let link = self
            .identity
            .generate_link(&record.email, &record.metadata, input.redirect_to.as_deref())
            .await?;
        let email_otp = link.email_otp.ok_or_else(|| {
            InstallServiceError::Upstream(anyhow::anyhow!(
                "identity provider returned no email OTP"
            ))
        })?;

        // 5. Telemetry append is not allowed to fail the redemption.
        let event = RedemptionEvent {
            at: Utc::now(),
            user_agent: input.user_agent,
            remote_addr: input.remote_addr,
        };
        if let Err(e) = self.codes.append_device_info(input.code, &event).await {
            tracing::warn!(error = %e, code = %input.code, "failed to record redemption event");
        }

        Ok(ExchangeInstallOutput {
            email: record.email,
            email_otp,
            use_count: record.use_count,
            max_uses: record.max_uses,
        })
    }
}
