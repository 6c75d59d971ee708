use chrono::Utc;
use podium_auth::Role;
use podium_core::{AppError, PaginationMeta};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::access::decision::AUTHENTICATION_REQUIRED;
use crate::middleware::auth::AuthUser;
use crate::middleware::role::check_any_role;
use crate::modules::auth::service::normalize_email;

use super::model::{
    Category, CategoryRequest, DashboardStats, Event, EventChanges, EventDetail, EventFilter,
    EventListParams, EventRequest, NewParticipant, PaginatedEvents, Participant,
    ParticipantRequest, Race, RaceRequest, RaceResult, ResultRequest, slugify,
};
use super::store::EventStore;

pub const EVENT_NOT_FOUND: &str = "Event not found";
pub const NOT_EVENT_MANAGER: &str = "Only the event's organizer can manage it";
pub const UNKNOWN_RACE_CATEGORY: &str = "Every race category must belong to this event";
pub const INVALID_RESULT_REFERENCE: &str =
    "Race, category or participant does not belong to this event";

/// Roles allowed to create events and see organizer statistics.
pub const EVENT_MANAGER_ROLES: &[Role] = &[Role::Organizer, Role::Admin];

/// Ids arrive as path text; anything that is not a UUID names no event.
pub fn parse_event_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::not_found(EVENT_NOT_FOUND))
}

/// The caller's account id. Sessions for ids that are not UUIDs own nothing.
fn account_id(auth_user: &AuthUser) -> Option<Uuid> {
    Uuid::parse_str(auth_user.user_id()).ok()
}

/// Admins manage every event; organizers manage the events they own.
pub fn can_manage(auth_user: &AuthUser, event: &Event) -> bool {
    auth_user.role() == Role::Admin || account_id(auth_user) == Some(event.owner_id)
}

fn clean_search(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_string)
}

fn changes_from(dto: EventRequest, slug: String) -> EventChanges {
    EventChanges {
        title: dto.title.trim().to_string(),
        slug,
        description: dto.description,
        date: dto.date,
        location: dto.location,
        image: dto.image,
        is_published: dto.is_published,
    }
}

fn normalized_participant(mut details: ParticipantRequest) -> ParticipantRequest {
    details.email = normalize_email(&details.email);
    details
}

pub struct EventService;

impl EventService {
    /// Published events, or any event the caller manages.
    async fn visible_event(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Event, AppError> {
        events
            .find_event(id)
            .await?
            .filter(|event| event.is_published || can_manage(auth_user, event))
            .ok_or_else(|| AppError::not_found(EVENT_NOT_FOUND))
    }

    async fn managed_event(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Event, AppError> {
        let event = Self::visible_event(events, auth_user, id).await?;
        if !can_manage(auth_user, &event) {
            return Err(AppError::forbidden(NOT_EVENT_MANAGER));
        }
        Ok(event)
    }

    pub async fn list_events(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        params: &EventListParams,
    ) -> Result<PaginatedEvents, AppError> {
        let search = clean_search(params.search.as_deref());
        let filter = if params.mine {
            let Some(owner_id) = account_id(auth_user) else {
                return Ok(PaginatedEvents {
                    data: Vec::new(),
                    meta: PaginationMeta::new(&params.pagination, 0),
                });
            };
            EventFilter {
                owner_id: Some(owner_id),
                published_only: false,
                search,
            }
        } else {
            EventFilter {
                owner_id: None,
                published_only: true,
                search,
            }
        };

        let (data, total) = events
            .list_events(
                &filter,
                params.pagination.limit(),
                params.pagination.offset(),
            )
            .await?;

        Ok(PaginatedEvents {
            data,
            meta: PaginationMeta::new(&params.pagination, total),
        })
    }

    #[instrument(skip(events, auth_user, dto), fields(user_id = %auth_user.user_id()))]
    pub async fn create_event(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        dto: EventRequest,
    ) -> Result<Event, AppError> {
        check_any_role(auth_user, EVENT_MANAGER_ROLES)?;
        let owner_id =
            account_id(auth_user).ok_or_else(|| AppError::unauthorized(AUTHENTICATION_REQUIRED))?;

        let slug = match dto.slug.clone() {
            Some(slug) => slug,
            None => slugify(&dto.title, Uuid::new_v4()),
        };
        let event = events.create_event(owner_id, changes_from(dto, slug)).await?;

        info!(event_id = %event.id, slug = %event.slug, "Event created");
        Ok(event)
    }

    pub async fn get_event(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<EventDetail, AppError> {
        let event = Self::visible_event(events, auth_user, id).await?;
        let categories = events.list_categories(event.id).await?;
        let participant_count = events.count_participants(event.id).await?;

        Ok(EventDetail {
            event,
            categories,
            participant_count,
        })
    }

    #[instrument(skip(events, auth_user, dto), fields(user_id = %auth_user.user_id()))]
    pub async fn update_event(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
        dto: EventRequest,
    ) -> Result<Event, AppError> {
        let existing = Self::managed_event(events, auth_user, id).await?;
        let slug = dto.slug.clone().unwrap_or(existing.slug);

        events
            .update_event(id, changes_from(dto, slug))
            .await?
            .ok_or_else(|| AppError::not_found(EVENT_NOT_FOUND))
    }

    #[instrument(skip(events, auth_user), fields(user_id = %auth_user.user_id()))]
    pub async fn delete_event(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<(), AppError> {
        Self::managed_event(events, auth_user, id).await?;

        if !events.delete_event(id).await? {
            return Err(AppError::not_found(EVENT_NOT_FOUND));
        }
        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    pub async fn list_categories(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Vec<Category>, AppError> {
        let event = Self::visible_event(events, auth_user, id).await?;
        events.list_categories(event.id).await
    }

    pub async fn create_category(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
        dto: CategoryRequest,
    ) -> Result<Category, AppError> {
        let event = Self::managed_event(events, auth_user, id).await?;
        events.create_category(event.id, dto).await
    }

    pub async fn list_races(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Vec<Race>, AppError> {
        let event = Self::visible_event(events, auth_user, id).await?;
        events.list_races(event.id).await
    }

    pub async fn create_race(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
        dto: RaceRequest,
    ) -> Result<Race, AppError> {
        let event = Self::managed_event(events, auth_user, id).await?;

        let categories = events.list_categories(event.id).await?;
        let all_known = dto
            .category_ids
            .iter()
            .all(|wanted| categories.iter().any(|category| category.id == *wanted));
        if !all_known {
            return Err(AppError::bad_request(UNKNOWN_RACE_CATEGORY));
        }

        events.create_race(event.id, dto).await
    }

    /// Participant records carry contact details, so only managers read them.
    pub async fn list_participants(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Vec<Participant>, AppError> {
        let event = Self::managed_event(events, auth_user, id).await?;
        events.list_participants(event.id).await
    }

    pub async fn add_participant(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
        dto: ParticipantRequest,
    ) -> Result<Participant, AppError> {
        let event = Self::managed_event(events, auth_user, id).await?;

        events
            .create_participant(NewParticipant {
                event_id: event.id,
                created_by: None,
                details: normalized_participant(dto),
            })
            .await
    }

    pub async fn list_results(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
    ) -> Result<Vec<RaceResult>, AppError> {
        let event = Self::visible_event(events, auth_user, id).await?;
        events.list_results(event.id).await
    }

    #[instrument(skip(events, auth_user, dto), fields(user_id = %auth_user.user_id()))]
    pub async fn record_result(
        events: &dyn EventStore,
        auth_user: &AuthUser,
        id: Uuid,
        dto: ResultRequest,
    ) -> Result<RaceResult, AppError> {
        let event = Self::managed_event(events, auth_user, id).await?;

        let race_ok = events
            .list_races(event.id)
            .await?
            .iter()
            .any(|race| race.id == dto.race_id);
        let category_ok = events
            .list_categories(event.id)
            .await?
            .iter()
            .any(|category| category.id == dto.category_id);
        let participant_ok = events
            .find_participant(event.id, dto.participant_id)
            .await?
            .is_some();

        if !(race_ok && category_ok && participant_ok) {
            return Err(AppError::bad_request(INVALID_RESULT_REFERENCE));
        }

        events.create_result(event.id, dto).await
    }

    pub async fn dashboard_stats(
        events: &dyn EventStore,
        auth_user: &AuthUser,
    ) -> Result<DashboardStats, AppError> {
        check_any_role(auth_user, EVENT_MANAGER_ROLES)?;
        let owner_id =
            account_id(auth_user).ok_or_else(|| AppError::unauthorized(AUTHENTICATION_REQUIRED))?;

        events.dashboard_stats(owner_id, Utc::now()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Duration;
    use podium_auth::{SESSION_PAYLOAD_VERSION, SessionClaims};

    use crate::modules::events::store::InMemoryEventStore;

    fn auth_user(id: Uuid, role: Role) -> AuthUser {
        AuthUser(SessionClaims {
            v: SESSION_PAYLOAD_VERSION,
            id: id.to_string(),
            role,
            onboarding_completed: true,
            iat: 1,
            exp: 9_999_999_999,
        })
    }

    fn event_request(title: &str, is_published: bool) -> EventRequest {
        EventRequest {
            title: title.to_string(),
            slug: None,
            description: None,
            date: Utc::now() + Duration::days(14),
            location: None,
            image: None,
            is_published,
        }
    }

    #[tokio::test]
    async fn test_users_cannot_create_events() {
        let store = InMemoryEventStore::new();
        let user = auth_user(Uuid::new_v4(), Role::User);

        let err = EventService::create_event(&store, &user, event_request("Fun Run", true))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_create_derives_slug_from_title() {
        let store = InMemoryEventStore::new();
        let organizer = auth_user(Uuid::new_v4(), Role::Organizer);

        let event = EventService::create_event(&store, &organizer, event_request("Fun Run", true))
            .await
            .unwrap();
        assert!(event.slug.starts_with("fun-run-"), "slug was {}", event.slug);
        assert_eq!(event.slug.len(), "fun-run-".len() + 8);
    }

    #[tokio::test]
    async fn test_only_owner_or_admin_manage() {
        let store = InMemoryEventStore::new();
        let owner = auth_user(Uuid::new_v4(), Role::Organizer);
        let rival = auth_user(Uuid::new_v4(), Role::Organizer);
        let admin = auth_user(Uuid::new_v4(), Role::Admin);

        let event = EventService::create_event(&store, &owner, event_request("Fun Run", true))
            .await
            .unwrap();

        let err =
            EventService::update_event(&store, &rival, event.id, event_request("Mine now", true))
                .await
                .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);
        assert_eq!(err.public_message(), NOT_EVENT_MANAGER);

        let updated =
            EventService::update_event(&store, &admin, event.id, event_request("Renamed", true))
                .await
                .unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.slug, event.slug);
    }

    #[tokio::test]
    async fn test_unpublished_event_hidden_from_non_managers() {
        let store = InMemoryEventStore::new();
        let owner = auth_user(Uuid::new_v4(), Role::Organizer);
        let visitor = auth_user(Uuid::new_v4(), Role::User);

        let draft = EventService::create_event(&store, &owner, event_request("Draft", false))
            .await
            .unwrap();

        let err = EventService::get_event(&store, &visitor, draft.id)
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        let detail = EventService::get_event(&store, &owner, draft.id).await.unwrap();
        assert_eq!(detail.participant_count, 0);
    }

    #[tokio::test]
    async fn test_race_categories_must_belong_to_event() {
        let store = InMemoryEventStore::new();
        let owner = auth_user(Uuid::new_v4(), Role::Organizer);
        let event = EventService::create_event(&store, &owner, event_request("Relay", true))
            .await
            .unwrap();

        let race = |category_ids| RaceRequest {
            name: "Sprint".to_string(),
            description: None,
            distance: 5.0,
            unit: "km".to_string(),
            start_time: Utc::now(),
            category_ids,
        };

        let err = EventService::create_race(&store, &owner, event.id, race(vec![Uuid::new_v4()]))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), UNKNOWN_RACE_CATEGORY);

        let category = EventService::create_category(
            &store,
            &owner,
            event.id,
            CategoryRequest {
                name: "Elite".to_string(),
                description: None,
            },
        )
        .await
        .unwrap();
        let created = EventService::create_race(&store, &owner, event.id, race(vec![category.id]))
            .await
            .unwrap();
        assert_eq!(created.category_ids, vec![category.id]);
    }

    #[test]
    fn test_parse_event_id() {
        assert!(parse_event_id(&Uuid::new_v4().to_string()).is_ok());
        let err = parse_event_id("../etc").unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_clean_search() {
        assert_eq!(clean_search(Some("  trail ")), Some("trail".to_string()));
        assert_eq!(clean_search(Some("   ")), None);
        assert_eq!(clean_search(None), None);
    }
}
