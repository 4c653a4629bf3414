use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::infra::db::{DbInstallCodeRepository, DbProfileRepository};
use crate::infra::identity::HttpIdentityPort;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub http: reqwest::Client,
    pub identity_url: String,
    pub identity_admin_key: String,
    pub allowed_origins: Arc<Vec<String>>,
}

impl AppState {
    pub fn install_code_repo(&self) -> DbInstallCodeRepository {
        DbInstallCodeRepository {
            db: self.db.clone(),
        }
    }

    pub fn profile_repo(&self) -> DbProfileRepository {
        DbProfileRepository {
            db: self.db.clone(),
        }
    }

    pub fn identity_port(&self) -> HttpIdentityPort {
        HttpIdentityPort::new(
            self.http.clone(),
            self.identity_url.clone(),
            self.identity_admin_key.clone(),
        )
    }
}
