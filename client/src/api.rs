#![allow(async_fn_in_trait)]

use serde::Deserialize;

use crate::error::SetupError;

/// Issuance request, mirroring the `create-install` query parameters.
pub struct CreateInstallRequest<'a> {
    pub email: &'a str,
    pub name: Option<&'a str>,
    pub wh_id: Option<&'a str>,
    pub inst: Option<&'a str>,
    pub redirect_to: Option<&'a str>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IssuedCode {
    pub ok: bool,
    pub code: String,
    pub email: String,
    pub reused: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExchangedCode {
    pub ok: bool,
    pub email: String,
    pub email_otp: String,
    pub use_count: i32,
    pub max_uses: i32,
}

/// Install-flow endpoints exposed by the notification service.
pub trait InstallApi: Send + Sync {
    async fn create_install(
        &self,
        request: CreateInstallRequest<'_>,
    ) -> Result<IssuedCode, SetupError>;

    async fn exchange_install(
        &self,
        code: &str,
        redirect_to: Option<&str>,
    ) -> Result<ExchangedCode, SetupError>;
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// `InstallApi` over HTTP against a live service.
#[derive(Clone)]
pub struct HttpInstallApi {
    http: reqwest::Client,
    base_url: String,
}

impl HttpInstallApi {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        Self { http, base_url }
    }

    fn endpoint(&self) -> String {
        format!("{}/generate-link", self.base_url.trim_end_matches('/'))
    }
}

async fn decode_error(response: reqwest::Response) -> SetupError {
    let status = response.status();
    match response.json::<ApiErrorBody>().await {
        Ok(body) => SetupError::Api(body.error),
        Err(_) => SetupError::Api(format!("serviço retornou {status}")),
    }
}

impl InstallApi for HttpInstallApi {
    async fn create_install(
        &self,
        request: CreateInstallRequest<'_>,
    ) -> Result<IssuedCode, SetupError> {
        let mut query = vec![("flow", "create-install"), ("email", request.email)];
        if let Some(name) = request.name {
            query.push(("name", name));
        }
        if let Some(wh_id) = request.wh_id {
            query.push(("wh_id", wh_id));
        }
        if let Some(inst) = request.inst {
            query.push(("inst", inst));
        }
        if let Some(redirect_to) = request.redirect_to {
            query.push(("redirect_to", redirect_to));
        }

        let response = self
            .http
            .get(self.endpoint())
            .query(&query)
            .send()
            .await
            .map_err(|e| SetupError::Api(format!("falha ao gerar code: {e}")))?;
        if !response.status().is_success() {
            return Err(decode_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| SetupError::Api(format!("resposta inválida do serviço: {e}")))
    }

    async fn exchange_install(
        &self,
        code: &str,
        redirect_to: Option<&str>,
    ) -> Result<ExchangedCode, SetupError> {
        let mut query = vec![("flow", "exchange-install"), ("code", code)];
        if let Some(redirect_to) = redirect_to {
            query.push(("redirect_to", redirect_to));
        }

        let response = self
            .http
            .get(self.endpoint())
            .query(&query)
            .send()
            .await
            .map_err(|e| SetupError::Api(format!("falha ao trocar code por OTP: {e}")))?;
        if !response.status().is_success() {
            return Err(decode_error(response).await);
        }
        response
            .json()
            .await
            .map_err(|e| SetupError::Api(format!("resposta inválida do serviço: {e}")))
    }
}
