use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

use super::controller::{complete_onboarding, get_profile, list_users};

pub fn init_users_router() -> Router<AppState> {
    Router::new()
        .route("/profile", get(get_profile).post(complete_onboarding))
        .route("/onboarding", post(complete_onboarding))
}

pub fn init_admin_router() -> Router<AppState> {
    Router::new().route("/users", get(list_users))
}
