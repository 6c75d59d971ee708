use axum::{Router, routing::get};

use crate::state::AppState;

use super::controller::{
    add_participant, create_category, create_event, create_race, dashboard_stats, delete_event,
    get_event, list_categories, list_events, list_participants, list_races, list_results,
    record_result, update_event,
};

pub fn init_events_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events).post(create_event))
        .route(
            "/{id}",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route(
            "/{id}/categories",
            get(list_categories).post(create_category),
        )
        .route("/{id}/races", get(list_races).post(create_race))
        .route(
            "/{id}/participants",
            get(list_participants).post(add_participant),
        )
        .route("/{id}/results", get(list_results).post(record_result))
}

pub fn init_dashboard_router() -> Router<AppState> {
    Router::new().route("/stats", get(dashboard_stats))
}
