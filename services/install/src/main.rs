use std::net::SocketAddr;
use std::sync::Arc;

use sea_orm::Database;
use tracing::info;

use clinpush_core::tracing::init_tracing;
use clinpush_install::config::InstallConfig;
use clinpush_install::router::build_router;
use clinpush_install::state::AppState;

#[tokio::main]
async fn main() {
    init_tracing();

    let config = InstallConfig::from_env();

    let db = Database::connect(&config.database_url)
        .await
        .expect("failed to connect to database");

    let state = AppState {
        db,
        http: reqwest::Client::new(),
        identity_url: config.identity_url,
        identity_admin_key: config.identity_admin_key,
        allowed_origins: Arc::new(config.allowed_origins),
    };

    let router = build_router(state);
    let addr = format!("0.0.0.0:{}", config.install_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    info!("install service listening on {addr}");
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("server error");
}
