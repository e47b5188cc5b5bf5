use axum::Router;
use axum::routing::{get, post};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_loan_request, get_loan_request, health, list_pending_requests,
};

/// Builds the application router. The static `/pendientes` segment
/// takes precedence over the `{id}` capture regardless of
/// registration order.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/solicitud", post(create_loan_request))
        .route("/api/v1/solicitud/pendientes", get(list_pending_requests))
        .route("/api/v1/solicitud/{id}", get(get_loan_request))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
