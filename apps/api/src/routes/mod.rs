pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    handler::HandlerWithoutStateExt,
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

use crate::errors::route_not_found;
use crate::generation::handlers;
use crate::rate_limit::enforce_rate_limit;
use crate::resume::MAX_RESUME_BYTES;
use crate::state::AppState;

/// Body cap for the upload route: the résumé limit plus room for the text fields
/// and multipart framing.
pub const UPLOAD_BODY_LIMIT: usize = MAX_RESUME_BYTES + 256 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health::health_handler))
        .route("/generate", post(handlers::handle_generate))
        .route(
            "/generate-advanced",
            post(handlers::handle_generate_advanced)
                .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .fallback(route_not_found)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            enforce_rate_limit,
        ));

    let router = Router::new().nest("/api", api);

    let static_dir = &state.config.static_dir;
    let router = if static_dir.is_dir() {
        router.fallback_service(
            ServeDir::new(static_dir).not_found_service(route_not_found.into_service()),
        )
    } else {
        router.fallback(route_not_found)
    };

    router.with_state(state)
}
