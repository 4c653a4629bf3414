use crate::domain::repository::IdentityPort;
use crate::domain::types::{GeneratedLink, InstallMetadata};
use crate::error::InstallServiceError;

/// Legacy flow: mint a magic link for direct navigation, without issuing an
/// install code.
pub struct GenerateLinkUseCase<I: IdentityPort> {
    pub identity: I,
}

impl<I: IdentityPort> GenerateLinkUseCase<I> {
    pub async fn execute(
        &self,
        email: &str,
        metadata: InstallMetadata,
        redirect_to: Option<&str>,
    ) -> Result<GeneratedLink, InstallServiceError> {
        if email.trim().is_empty() {
            return Err(InstallServiceError::MissingEmail);
        }
        self.identity.generate_link(email, &metadata, redirect_to).await
    }
}
