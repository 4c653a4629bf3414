use axum::{Router, middleware, routing::get};
use tower_http::trace::TraceLayer;

use clinpush_core::health::{healthz, readyz};
use clinpush_core::middleware::request_id_layer;

use crate::cors::cors;
use crate::handlers::install::generate_link;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Health
        .route("/healthz", get(healthz))
        .route("/readyz", get(readyz))
        // Install flow (create-install / exchange-install / legacy link)
        .route("/generate-link", get(generate_link))
        .layer(middleware::from_fn_with_state(state.clone(), cors))
        .layer(TraceLayer::new_for_http())
        .layer(request_id_layer())
        .with_state(state)
}
