use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::repository::IdentityPort;
use crate::domain::types::{GeneratedLink, InstallMetadata};
use crate::error::InstallServiceError;

/// Identity provider admin API spoken over HTTP with a service-role key.
#[derive(Clone)]
pub struct HttpIdentityPort {
    http: reqwest::Client,
    base_url: String,
    admin_key: String,
}

impl HttpIdentityPort {
    pub fn new(http: reqwest::Client, base_url: String, admin_key: String) -> Self {
        Self {
            http,
            base_url,
            admin_key,
        }
    }
}

#[derive(Serialize)]
struct GenerateLinkBody<'a> {
    #[serde(rename = "type")]
    link_type: &'static str,
    email: &'a str,
    create_user: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    redirect_to: Option<&'a str>,
    user_metadata: &'a InstallMetadata,
}

#[derive(Deserialize)]
struct GenerateLinkResponse {
    action_link: String,
    email_otp: Option<String>,
    user: LinkUser,
}

#[derive(Deserialize)]
struct LinkUser {
    id: Uuid,
}

impl IdentityPort for HttpIdentityPort {
    async fn generate_link(
        &self,
        email: &str,
        metadata: &InstallMetadata,
        redirect_to: Option<&str>,
    ) -> Result<GeneratedLink, InstallServiceError> {
        let url = format!("{}/admin/generate_link", self.base_url.trim_end_matches('/'));
        let body = GenerateLinkBody {
            link_type: "magiclink",
            email,
            create_user: true,
            redirect_to,
            user_metadata: metadata,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.admin_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                InstallServiceError::Upstream(anyhow::anyhow!("generate_link request failed: {e}"))
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(InstallServiceError::Upstream(anyhow::anyhow!(
                "generate_link returned {status}: {text}"
            )));
        }

        let parsed: GenerateLinkResponse = response.json().await.map_err(|e| {
            InstallServiceError::Upstream(anyhow::anyhow!("generate_link decode failed: {e}"))
        })?;

        Ok(GeneratedLink {
            user_id: parsed.user.id,
            email: email.to_owned(),
            email_otp: parsed.email_otp,
            action_link: parsed.action_link,
        })
    }
}
