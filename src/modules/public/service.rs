use podium_core::AppError;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::middleware::auth::AuthUser;
use crate::modules::auth::service::normalize_email;
use crate::modules::events::model::{
    Event, EventFilter, NewParticipant, Participant, ParticipantRequest, PublicEvent,
    RegistrationLookup, RegistrationStatus,
};
use crate::modules::events::service::EVENT_NOT_FOUND;
use crate::modules::events::store::{ALREADY_REGISTERED, EventStore};

/// Registrations one account may make across all events.
pub const REGISTRATIONS_PER_ACCOUNT: i64 = 5;
pub const REGISTRATION_CAP_REACHED: &str = "Registration limit of 5 per account reached";
pub const LOOKUP_REQUIRED: &str = "Email or session required";

fn account_id(session: Option<&AuthUser>) -> Option<Uuid> {
    session.and_then(|user| Uuid::parse_str(user.user_id()).ok())
}

pub struct PublicEventService;

impl PublicEventService {
    async fn published_event(events: &dyn EventStore, slug: &str) -> Result<Event, AppError> {
        events
            .find_published_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::not_found(EVENT_NOT_FOUND))
    }

    /// Every published event, soonest first.
    pub async fn list_events(events: &dyn EventStore) -> Result<Vec<PublicEvent>, AppError> {
        let filter = EventFilter {
            published_only: true,
            ..EventFilter::default()
        };
        let (published, _) = events.list_events(&filter, i64::MAX, 0).await?;
        Ok(published.into_iter().map(PublicEvent::from).collect())
    }

    pub async fn get_event(events: &dyn EventStore, slug: &str) -> Result<PublicEvent, AppError> {
        Self::published_event(events, slug).await.map(PublicEvent::from)
    }

    /// With `?email=` only whether that address is registered; with a
    /// session, the caller's own registrations for the event.
    pub async fn registration_status(
        events: &dyn EventStore,
        slug: &str,
        lookup: &RegistrationLookup,
        session: Option<&AuthUser>,
    ) -> Result<RegistrationStatus, AppError> {
        let email = lookup
            .email
            .as_deref()
            .map(normalize_email)
            .filter(|email| !email.is_empty());

        if email.is_none() && session.is_none() {
            return Err(AppError::bad_request(LOOKUP_REQUIRED));
        }

        let event = Self::published_event(events, slug).await?;

        if let Some(email) = email {
            let registered = events
                .find_participant_by_email(event.id, &email)
                .await?
                .is_some();
            return Ok(RegistrationStatus {
                registered,
                participants: None,
            });
        }

        let own = match account_id(session) {
            Some(account) => events.list_participants_created_by(event.id, account).await?,
            None => Vec::new(),
        };
        Ok(RegistrationStatus {
            registered: !own.is_empty(),
            participants: Some(own),
        })
    }

    #[instrument(skip(events, dto, session), fields(slug = %slug))]
    pub async fn register(
        events: &dyn EventStore,
        slug: &str,
        mut dto: ParticipantRequest,
        session: Option<&AuthUser>,
    ) -> Result<Participant, AppError> {
        let event = Self::published_event(events, slug).await?;
        dto.email = normalize_email(&dto.email);

        if events
            .find_participant_by_email(event.id, &dto.email)
            .await?
            .is_some()
        {
            return Err(AppError::bad_request(ALREADY_REGISTERED));
        }

        let created_by = account_id(session);
        if let Some(account) = created_by {
            if events.count_registrations_by(account).await? >= REGISTRATIONS_PER_ACCOUNT {
                return Err(AppError::bad_request(REGISTRATION_CAP_REACHED));
            }
        }

        let participant = events
            .create_participant(NewParticipant {
                event_id: event.id,
                created_by,
                details: dto,
            })
            .await?;

        info!(
            event_id = %event.id,
            participant_id = %participant.id,
            authenticated = created_by.is_some(),
            "Participant registered"
        );
        Ok(participant)
    }
}
