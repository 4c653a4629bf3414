use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use axum_extra::{TypedHeader, headers::UserAgent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::types::InstallMetadata;
use crate::error::InstallServiceError;
use crate::state::AppState;
use crate::usecase::create_install::{CreateInstallInput, CreateInstallUseCase};
use crate::usecase::exchange_install::{ExchangeInstallInput, ExchangeInstallUseCase};
use crate::usecase::generate_link::GenerateLinkUseCase;

// ── GET /generate-link ────────────────────────────────────────────────────────
// Single route, method-routed by the `flow` query parameter.

#[derive(Deserialize)]
pub struct GenerateLinkQuery {
    pub flow: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
    pub wh_id: Option<String>,
    pub inst: Option<String>,
    pub code: Option<String>,
    pub redirect_to: Option<String>,
    pub mode: Option<String>,
}

#[derive(Serialize)]
struct CreateInstallResponse {
    ok: bool,
    code: Uuid,
    email: String,
    reused: bool,
}

#[derive(Serialize)]
struct ExchangeInstallResponse {
    ok: bool,
    email: String,
    email_otp: String,
    use_count: i32,
    max_uses: i32,
}

#[derive(Serialize)]
struct ActionLinkResponse {
    ok: bool,
    action_link: String,
}

pub async fn generate_link(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user_agent: Option<TypedHeader<UserAgent>>,
    Query(query): Query<GenerateLinkQuery>,
) -> Result<Response, InstallServiceError> {
    match query.flow.as_deref() {
        Some("create-install") => create_install(state, query).await,
        Some("exchange-install") => exchange_install(state, query, addr, user_agent).await,
        Some(_) => Err(InstallServiceError::UnknownFlow),
        None => legacy_link(state, query).await,
    }
}

async fn create_install(
    state: AppState,
    query: GenerateLinkQuery,
) -> Result<Response, InstallServiceError> {
    let usecase = CreateInstallUseCase {
        identity: state.identity_port(),
        codes: state.install_code_repo(),
        profiles: state.profile_repo(),
    };
    let out = usecase
        .execute(CreateInstallInput {
            email: query.email.unwrap_or_default(),
            metadata: InstallMetadata {
                name: query.name,
                wh_id: query.wh_id,
                inst: query.inst,
            },
            redirect_to: query.redirect_to,
        })
        .await?;

    Ok(Json(CreateInstallResponse {
        ok: true,
        code: out.code,
        email: out.email,
        reused: out.reused,
    })
    .into_response())
}

async fn exchange_install(
    state: AppState,
    query: GenerateLinkQuery,
    addr: SocketAddr,
    user_agent: Option<TypedHeader<UserAgent>>,
) -> Result<Response, InstallServiceError> {
    let code = query
        .code
        .as_deref()
        .and_then(|c| c.parse::<Uuid>().ok())
        .ok_or(InstallServiceError::InvalidCode)?;

    let usecase = ExchangeInstallUseCase {
        identity: state.identity_port(),
        codes: state.install_code_repo(),
    };
    let out = usecase
        .execute(ExchangeInstallInput {
            code,
            redirect_to: query.redirect_to,
            user_agent: user_agent.map(|TypedHeader(ua)| ua.as_str().to_owned()),
            remote_addr: Some(addr.ip().to_string()),
        })
        .await?;

    Ok(Json(ExchangeInstallResponse {
        ok: true,
        email: out.email,
        email_otp: out.email_otp,
        use_count: out.use_count,
        max_uses: out.max_uses,
    })
    .into_response())
}

/// Legacy path (no `flow`): mint a magic link and either return it as JSON
/// (`mode=json`) or redirect straight to it.
async fn legacy_link(
    state: AppState,
    query: GenerateLinkQuery,
) -> Result<Response, InstallServiceError> {
    let usecase = GenerateLinkUseCase {
        identity: state.identity_port(),
    };
    let link = usecase
        .execute(
            query.email.as_deref().unwrap_or_default(),
            InstallMetadata {
                name: query.name,
                wh_id: query.wh_id,
                inst: query.inst,
            },
            query.redirect_to.as_deref(),
        )
        .await?;

    if query.mode.as_deref() == Some("json") {
        return Ok(Json(ActionLinkResponse {
            ok: true,
            action_link: link.action_link,
        })
        .into_response());
    }

    let location = HeaderValue::from_str(&link.action_link)
        .map_err(|e| InstallServiceError::Internal(anyhow::anyhow!("bad action link: {e}")))?;
    Ok((StatusCode::FOUND, [(header::LOCATION, location)]).into_response())
}
