use axum::http::{HeaderValue, Method};
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all catalog endpoints.
///
/// Collection routes answer with and without a trailing slash.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handler::home_handler))
        .route("/health", get(handler::health_handler))
        .route("/audit", get(handler::audit_handler))
        .route(
            "/categories",
            get(handler::list_categories).post(handler::create_category),
        )
        .route(
            "/categories/",
            get(handler::list_categories).post(handler::create_category),
        )
        .route(
            "/categories/:name",
            get(handler::get_category)
                .put(handler::update_category)
                .delete(handler::delete_category),
        )
        .route("/categories/:name/children", get(handler::category_children))
        .route("/parts", get(handler::list_parts).post(handler::create_part))
        .route("/parts/", get(handler::list_parts).post(handler::create_part))
        .route("/parts/search", get(handler::search_parts))
        .route("/parts/search/", get(handler::search_parts))
        .route(
            "/parts/:serial_number",
            get(handler::get_part)
                .put(handler::update_part)
                .delete(handler::delete_part),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS for the configured origins, or `None` when the list is empty.
pub fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    if allowed.is_empty() {
        return None;
    }
    Some(
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(allowed))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([axum::http::header::CONTENT_TYPE]),
    )
}
