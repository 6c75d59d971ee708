use axum::http::{HeaderValue, Method, header};
use axum::{Router, middleware};
use podium_core::AppError;
use podium_observability::logging_middleware;
use tower_http::cors::CorsLayer;

use crate::middleware::gate::access_gate;
use crate::modules::auth::router::init_auth_router;
use crate::modules::events::router::{init_dashboard_router, init_events_router};
use crate::modules::public::router::init_public_router;
use crate::modules::users::router::{init_admin_router, init_users_router};
use crate::state::AppState;

pub const NOT_FOUND_MESSAGE: &str = "Not found";

async fn not_found() -> AppError {
    AppError::not_found(NOT_FOUND_MESSAGE)
}

/// The full application. Every request, including ones that fall through to
/// the 404 fallback, passes the access gate.
pub fn init_router(state: AppState) -> Router {
    let cors = {
        let allowed_origins: Vec<HeaderValue> = state
            .cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
            .allow_credentials(true)
    };

    Router::new()
        .nest(
            "/api",
            Router::new()
                .nest("/auth", init_auth_router(state.clone()))
                .nest("/public", init_public_router(state.clone()))
                .nest("/user", init_users_router())
                .nest("/events", init_events_router())
                .nest("/dashboard", init_dashboard_router())
                .nest("/admin", init_admin_router()),
        )
        .fallback(not_found)
        .with_state(state.clone())
        .layer(middleware::from_fn_with_state(state, access_gate))
        .layer(cors)
        .layer(middleware::from_fn(logging_middleware))
}
