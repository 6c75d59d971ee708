use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::middleware::rate_limit::limit_registration_requests;
use crate::state::AppState;

use super::controller::{
    get_public_event, list_public_events, register_participant, registration_status,
};

pub fn init_public_router(state: AppState) -> Router<AppState> {
    let registration_routes = Router::new()
        .route("/events/{slug}/register", post(register_participant))
        .route_layer(middleware::from_fn_with_state(
            state,
            limit_registration_requests,
        ));

    Router::new()
        .merge(registration_routes)
        .route("/events", get(list_public_events))
        .route("/events/{slug}", get(get_public_event))
        .route("/events/{slug}/participants", get(registration_status))
}
