use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{feeds, health};
use super::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health::health_check))
        .route("/api/moments.json", get(feeds::all_moments))
        .route("/api/moments-recent.json", get(feeds::recent_moments))
        .route("/api/moments-rendered.json", get(feeds::rendered_moments))
        .route("/recent-moments.json", get(feeds::latest_moments))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
