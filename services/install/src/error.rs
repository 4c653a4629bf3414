use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Install service domain error variants. The invalid/expired messages are
/// surfaced to the user verbatim.
#[derive(Debug, thiserror::Error)]
pub enum InstallServiceError {
    #[error("Parâmetro \"email\" é obrigatório.")]
    MissingEmail,
    #[error("Código inválido")]
    InvalidCode,
    #[error("Código expirado")]
    ExpiredCode,
    #[error("Fluxo inválido")]
    UnknownFlow,
    #[error("Falha ao falar com o provedor de identidade")]
    Upstream(#[source] anyhow::Error),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl InstallServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingEmail => "MISSING_EMAIL",
            Self::InvalidCode => "INVALID_CODE",
            Self::ExpiredCode => "EXPIRED_CODE",
            Self::UnknownFlow => "UNKNOWN_FLOW",
            Self::Upstream(_) => "UPSTREAM",
            Self::Internal(_) => "INTERNAL",
        }
    }
}

impl IntoResponse for InstallServiceError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::MissingEmail | Self::InvalidCode | Self::ExpiredCode | Self::UnknownFlow => {
                StatusCode::BAD_REQUEST
            }
            Self::Upstream(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        // Log 500s only — tower-http TraceLayer already records method/uri/status for all
        // requests. 4xx are expected client errors; logging them here would be noise.
        match &self {
            Self::Upstream(e) => {
                tracing::error!(error = %e, kind = "UPSTREAM", "identity provider call failed");
            }
            Self::Internal(e) => {
                tracing::error!(error = %e, kind = "INTERNAL", "internal error");
            }
            _ => {}
        }
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (status, axum::Json(body)).into_response()
    }
}
