use axum::{
    Router,
    middleware,
    routing::{get, post},
};

use crate::middleware::rate_limit::limit_credential_requests;
use crate::state::AppState;

use super::controller::{get_session, login_user, logout_user, register_user, update_session};

pub fn init_auth_router(state: AppState) -> Router<AppState> {
    let credential_routes = Router::new()
        .route("/register", post(register_user))
        .route("/login", post(login_user))
        .route_layer(middleware::from_fn_with_state(
            state,
            limit_credential_requests,
        ));

    Router::new()
        .merge(credential_routes)
        .route("/logout", post(logout_user))
        .route("/session", get(get_session).post(update_session))
}
