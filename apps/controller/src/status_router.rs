use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(handlers::status::healthz_handler))
        .route("/info", get(handlers::status::info_handler))
        .route(
            "/reconciliations",
            get(handlers::status::reconciliations_handler),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
