use axum::extract::{Path, Query, State};
use podium_core::{ApiResponse, AppError};

use crate::middleware::auth::MaybeAuthUser;
use crate::modules::events::model::{
    Participant, ParticipantRequest, PublicEvent, RegistrationLookup, RegistrationStatus,
};
use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::PublicEventService;

pub async fn list_public_events(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<PublicEvent>>, AppError> {
    let events = PublicEventService::list_events(state.events.as_ref()).await?;
    Ok(ApiResponse::ok(events))
}

pub async fn get_public_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<ApiResponse<PublicEvent>, AppError> {
    let event = PublicEventService::get_event(state.events.as_ref(), &slug).await?;
    Ok(ApiResponse::ok(event))
}

pub async fn registration_status(
    State(state): State<AppState>,
    MaybeAuthUser(session): MaybeAuthUser,
    Path(slug): Path<String>,
    Query(lookup): Query<RegistrationLookup>,
) -> Result<ApiResponse<RegistrationStatus>, AppError> {
    let status = PublicEventService::registration_status(
        state.events.as_ref(),
        &slug,
        &lookup,
        session.as_ref(),
    )
    .await?;
    Ok(ApiResponse::ok(status))
}

/// Anyone may register; a session links the registration to the account.
pub async fn register_participant(
    State(state): State<AppState>,
    MaybeAuthUser(session): MaybeAuthUser,
    Path(slug): Path<String>,
    ValidatedJson(dto): ValidatedJson<ParticipantRequest>,
) -> Result<ApiResponse<Participant>, AppError> {
    let participant =
        PublicEventService::register(state.events.as_ref(), &slug, dto, session.as_ref()).await?;
    Ok(ApiResponse::created(participant))
}
