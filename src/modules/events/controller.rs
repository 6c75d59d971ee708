use axum::extract::{Path, Query, State};
use podium_core::{ApiResponse, AppError};
use tracing::instrument;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::model::MessageResponse;
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::model::{
    Category, CategoryRequest, DashboardStats, Event, EventDetail, EventListParams, EventRequest,
    PaginatedEvents, Participant, ParticipantRequest, Race, RaceRequest, RaceResult,
    ResultRequest,
};
use super::service::{EventService, parse_event_id};

/// Published events, or `?mine=true` for the caller's own.
#[instrument(skip(state, auth_user, params), fields(user_id = %auth_user.user_id()))]
pub async fn list_events(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<EventListParams>,
) -> Result<ApiResponse<PaginatedEvents>, AppError> {
    let page = EventService::list_events(state.events.as_ref(), &auth_user, &params).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn create_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    ValidatedJson(dto): ValidatedJson<EventRequest>,
) -> Result<ApiResponse<Event>, AppError> {
    let event = EventService::create_event(state.events.as_ref(), &auth_user, dto).await?;
    Ok(ApiResponse::created(event))
}

pub async fn get_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<EventDetail>, AppError> {
    let id = parse_event_id(&id)?;
    let detail = EventService::get_event(state.events.as_ref(), &auth_user, id).await?;
    Ok(ApiResponse::ok(detail))
}

pub async fn update_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<EventRequest>,
) -> Result<ApiResponse<Event>, AppError> {
    let id = parse_event_id(&id)?;
    let event = EventService::update_event(state.events.as_ref(), &auth_user, id, dto).await?;
    Ok(ApiResponse::ok(event))
}

pub async fn delete_event(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<MessageResponse>, AppError> {
    let id = parse_event_id(&id)?;
    EventService::delete_event(state.events.as_ref(), &auth_user, id).await?;
    Ok(ApiResponse::ok(MessageResponse {
        message: "Event deleted".to_string(),
    }))
}

pub async fn list_categories(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Category>>, AppError> {
    let id = parse_event_id(&id)?;
    let categories = EventService::list_categories(state.events.as_ref(), &auth_user, id).await?;
    Ok(ApiResponse::ok(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<CategoryRequest>,
) -> Result<ApiResponse<Category>, AppError> {
    let id = parse_event_id(&id)?;
    let category =
        EventService::create_category(state.events.as_ref(), &auth_user, id, dto).await?;
    Ok(ApiResponse::created(category))
}

pub async fn list_races(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Race>>, AppError> {
    let id = parse_event_id(&id)?;
    let races = EventService::list_races(state.events.as_ref(), &auth_user, id).await?;
    Ok(ApiResponse::ok(races))
}

pub async fn create_race(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<RaceRequest>,
) -> Result<ApiResponse<Race>, AppError> {
    let id = parse_event_id(&id)?;
    let race = EventService::create_race(state.events.as_ref(), &auth_user, id, dto).await?;
    Ok(ApiResponse::created(race))
}

pub async fn list_participants(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<Participant>>, AppError> {
    let id = parse_event_id(&id)?;
    let participants =
        EventService::list_participants(state.events.as_ref(), &auth_user, id).await?;
    Ok(ApiResponse::ok(participants))
}

pub async fn add_participant(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<ParticipantRequest>,
) -> Result<ApiResponse<Participant>, AppError> {
    let id = parse_event_id(&id)?;
    let participant =
        EventService::add_participant(state.events.as_ref(), &auth_user, id, dto).await?;
    Ok(ApiResponse::created(participant))
}

pub async fn list_results(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<RaceResult>>, AppError> {
    let id = parse_event_id(&id)?;
    let results = EventService::list_results(state.events.as_ref(), &auth_user, id).await?;
    Ok(ApiResponse::ok(results))
}

pub async fn record_result(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(dto): ValidatedJson<ResultRequest>,
) -> Result<ApiResponse<RaceResult>, AppError> {
    let id = parse_event_id(&id)?;
    let result = EventService::record_result(state.events.as_ref(), &auth_user, id, dto).await?;
    Ok(ApiResponse::created(result))
}

/// Upcoming events, participant total and the next event date for the caller.
#[instrument(skip(state, auth_user), fields(user_id = %auth_user.user_id()))]
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<ApiResponse<DashboardStats>, AppError> {
    let stats = EventService::dashboard_stats(state.events.as_ref(), &auth_user).await?;
    Ok(ApiResponse::ok(stats))
}
