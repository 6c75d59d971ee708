//! Event persistence: events and their categories, races, participants and
//! results.
//!
//! Ownership and cross-reference rules live in the service; the store only
//! enforces what the schema does (unique slugs, one registration per email
//! per event). Deleted events are invisible to every read.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use podium_core::AppError;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{
    Category, CategoryRequest, DashboardStats, Event, EventChanges, EventFilter, NewParticipant,
    NextEvent, Participant, Race, RaceRequest, RaceResult, ResultRequest,
};

pub const SLUG_TAKEN: &str = "Slug is already in use";
pub const ALREADY_REGISTERED: &str = "You are already registered for this event";

#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, owner_id: Uuid, changes: EventChanges) -> Result<Event, AppError>;

    async fn update_event(&self, id: Uuid, changes: EventChanges)
    -> Result<Option<Event>, AppError>;

    /// Soft delete. Returns false when the event was already gone.
    async fn delete_event(&self, id: Uuid) -> Result<bool, AppError>;

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError>;

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError>;

    /// One page of matching events ordered by date, plus the total match count.
    async fn list_events(
        &self,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Event>, i64), AppError>;

    async fn create_category(
        &self,
        event_id: Uuid,
        request: CategoryRequest,
    ) -> Result<Category, AppError>;

    async fn list_categories(&self, event_id: Uuid) -> Result<Vec<Category>, AppError>;

    async fn create_race(&self, event_id: Uuid, request: RaceRequest) -> Result<Race, AppError>;

    async fn list_races(&self, event_id: Uuid) -> Result<Vec<Race>, AppError>;

    async fn create_participant(&self, new: NewParticipant) -> Result<Participant, AppError>;

    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<Participant>, AppError>;

    async fn find_participant(
        &self,
        event_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<Participant>, AppError>;

    async fn find_participant_by_email(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> Result<Option<Participant>, AppError>;

    async fn list_participants_created_by(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Participant>, AppError>;

    /// Registrations made by `user_id` across every event.
    async fn count_registrations_by(&self, user_id: Uuid) -> Result<i64, AppError>;

    async fn count_participants(&self, event_id: Uuid) -> Result<i64, AppError>;

    async fn create_result(
        &self,
        event_id: Uuid,
        request: ResultRequest,
    ) -> Result<RaceResult, AppError>;

    async fn list_results(&self, event_id: Uuid) -> Result<Vec<RaceResult>, AppError>;

    async fn dashboard_stats(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, AppError>;
}

const EVENT_COLUMNS: &str = "id, owner_id, title, slug, description, date, location, image, \
                             is_published, created_at, updated_at";

const PARTICIPANT_COLUMNS: &str = "id, event_id, first_name, last_name, email, birth_date, \
                                   gender, country, city, phone, emergency_contact, blood_type, \
                                   created_by, created_at";

const RESULT_COLUMNS: &str = "id, event_id, race_id, category_id, participant_id, time, \
                              position, bib_number, status, notes, created_at";

/// `%term%` for ILIKE with the pattern metacharacters escaped.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |err| AppError::internal(anyhow::Error::new(err).context(context))
}

#[derive(Debug, Clone)]
pub struct PgEventStore {
    db: PgPool,
}

impl PgEventStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn create_event(&self, owner_id: Uuid, changes: EventChanges) -> Result<Event, AppError> {
        let query = format!(
            "INSERT INTO events (owner_id, title, slug, description, date, location, image, is_published)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&query)
            .bind(owner_id)
            .bind(&changes.title)
            .bind(&changes.slug)
            .bind(&changes.description)
            .bind(changes.date)
            .bind(&changes.location)
            .bind(&changes.image)
            .bind(changes.is_published)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::bad_request(SLUG_TAKEN)
                } else {
                    AppError::internal(anyhow::Error::new(err).context("Failed to insert event"))
                }
            })
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, AppError> {
        let query = format!(
            "UPDATE events
             SET title = $2, slug = $3, description = $4, date = $5, location = $6,
                 image = $7, is_published = $8, updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {EVENT_COLUMNS}"
        );

        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&changes.title)
            .bind(&changes.slug)
            .bind(&changes.description)
            .bind(changes.date)
            .bind(&changes.location)
            .bind(&changes.image)
            .bind(changes.is_published)
            .fetch_optional(&self.db)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::bad_request(SLUG_TAKEN)
                } else {
                    AppError::internal(anyhow::Error::new(err).context("Failed to update event"))
                }
            })
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query(
            "UPDATE events SET deleted_at = NOW(), updated_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&self.db)
        .await
        .map_err(db_error("Failed to delete event"))?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let query =
            format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1 AND deleted_at IS NULL");

        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_error("Failed to fetch event"))
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        let query = format!(
            "SELECT {EVENT_COLUMNS} FROM events
             WHERE slug = $1 AND is_published AND deleted_at IS NULL"
        );

        sqlx::query_as::<_, Event>(&query)
            .bind(slug)
            .fetch_optional(&self.db)
            .await
            .map_err(db_error("Failed to fetch event by slug"))
    }

    async fn list_events(
        &self,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Event>, i64), AppError> {
        let where_clause = "WHERE deleted_at IS NULL
               AND ($1::uuid IS NULL OR owner_id = $1)
               AND (NOT $2 OR is_published)
               AND ($3::text IS NULL OR title ILIKE $3 OR description ILIKE $3)";
        let pattern = filter.search.as_deref().map(like_pattern);

        let total = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM events {where_clause}"
        ))
        .bind(filter.owner_id)
        .bind(filter.published_only)
        .bind(&pattern)
        .fetch_one(&self.db)
        .await
        .map_err(db_error("Failed to count events"))?;

        let events = sqlx::query_as::<_, Event>(&format!(
            "SELECT {EVENT_COLUMNS} FROM events {where_clause}
             ORDER BY date ASC, created_at ASC
             LIMIT $4 OFFSET $5"
        ))
        .bind(filter.owner_id)
        .bind(filter.published_only)
        .bind(&pattern)
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .map_err(db_error("Failed to fetch events"))?;

        Ok((events, total))
    }

    async fn create_category(
        &self,
        event_id: Uuid,
        request: CategoryRequest,
    ) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>(
            "INSERT INTO categories (event_id, name, description)
             VALUES ($1, $2, $3)
             RETURNING id, event_id, name, description, created_at",
        )
        .bind(event_id)
        .bind(&request.name)
        .bind(&request.description)
        .fetch_one(&self.db)
        .await
        .map_err(db_error("Failed to insert category"))
    }

    async fn list_categories(&self, event_id: Uuid) -> Result<Vec<Category>, AppError> {
        sqlx::query_as::<_, Category>(
            "SELECT id, event_id, name, description, created_at
             FROM categories WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_error("Failed to fetch categories"))
    }

    async fn create_race(&self, event_id: Uuid, request: RaceRequest) -> Result<Race, AppError> {
        let mut tx = self
            .db
            .begin()
            .await
            .map_err(db_error("Failed to begin transaction"))?;

        let (id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(
            "INSERT INTO races (event_id, name, description, distance, unit, start_time)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, created_at",
        )
        .bind(event_id)
        .bind(&request.name)
        .bind(&request.description)
        .bind(request.distance)
        .bind(&request.unit)
        .bind(request.start_time)
        .fetch_one(&mut *tx)
        .await
        .map_err(db_error("Failed to insert race"))?;

        sqlx::query(
            "INSERT INTO race_categories (race_id, category_id)
             SELECT $1, UNNEST($2::uuid[])
             ON CONFLICT DO NOTHING",
        )
        .bind(id)
        .bind(&request.category_ids)
        .execute(&mut *tx)
        .await
        .map_err(db_error("Failed to link race categories"))?;

        tx.commit()
            .await
            .map_err(db_error("Failed to commit race"))?;

        Ok(Race {
            id,
            event_id,
            name: request.name,
            description: request.description,
            distance: request.distance,
            unit: request.unit,
            start_time: request.start_time,
            category_ids: request.category_ids,
            created_at,
        })
    }

    async fn list_races(&self, event_id: Uuid) -> Result<Vec<Race>, AppError> {
        sqlx::query_as::<_, Race>(
            "SELECT r.id, r.event_id, r.name, r.description, r.distance, r.unit, r.start_time,
                    COALESCE(
                        ARRAY_AGG(rc.category_id) FILTER (WHERE rc.category_id IS NOT NULL),
                        '{}'
                    ) AS category_ids,
                    r.created_at
             FROM races r
             LEFT JOIN race_categories rc ON rc.race_id = r.id
             WHERE r.event_id = $1
             GROUP BY r.id
             ORDER BY r.start_time",
        )
        .bind(event_id)
        .fetch_all(&self.db)
        .await
        .map_err(db_error("Failed to fetch races"))
    }

    async fn create_participant(&self, new: NewParticipant) -> Result<Participant, AppError> {
        let details = new.details;
        let query = format!(
            "INSERT INTO participants
                 (event_id, first_name, last_name, email, birth_date, gender, country,
                  city, phone, emergency_contact, blood_type, created_by)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
             RETURNING {PARTICIPANT_COLUMNS}"
        );

        sqlx::query_as::<_, Participant>(&query)
            .bind(new.event_id)
            .bind(&details.first_name)
            .bind(&details.last_name)
            .bind(&details.email)
            .bind(details.birth_date)
            .bind(&details.gender)
            .bind(&details.country)
            .bind(&details.city)
            .bind(&details.phone)
            .bind(&details.emergency_contact)
            .bind(&details.blood_type)
            .bind(new.created_by)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::bad_request(ALREADY_REGISTERED)
                } else {
                    AppError::internal(
                        anyhow::Error::new(err).context("Failed to insert participant"),
                    )
                }
            })
    }

    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants
             WHERE event_id = $1 ORDER BY created_at"
        );

        sqlx::query_as::<_, Participant>(&query)
            .bind(event_id)
            .fetch_all(&self.db)
            .await
            .map_err(db_error("Failed to fetch participants"))
    }

    async fn find_participant(
        &self,
        event_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<Participant>, AppError> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE event_id = $1 AND id = $2"
        );

        sqlx::query_as::<_, Participant>(&query)
            .bind(event_id)
            .bind(participant_id)
            .fetch_optional(&self.db)
            .await
            .map_err(db_error("Failed to fetch participant"))
    }

    async fn find_participant_by_email(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> Result<Option<Participant>, AppError> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants WHERE event_id = $1 AND email = $2"
        );

        sqlx::query_as::<_, Participant>(&query)
            .bind(event_id)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(db_error("Failed to fetch participant by email"))
    }

    async fn list_participants_created_by(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Participant>, AppError> {
        let query = format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM participants
             WHERE event_id = $1 AND created_by = $2 ORDER BY created_at"
        );

        sqlx::query_as::<_, Participant>(&query)
            .bind(event_id)
            .bind(user_id)
            .fetch_all(&self.db)
            .await
            .map_err(db_error("Failed to fetch registrations"))
    }

    async fn count_registrations_by(&self, user_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM participants WHERE created_by = $1")
            .bind(user_id)
            .fetch_one(&self.db)
            .await
            .map_err(db_error("Failed to count registrations"))
    }

    async fn count_participants(&self, event_id: Uuid) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM participants WHERE event_id = $1")
            .bind(event_id)
            .fetch_one(&self.db)
            .await
            .map_err(db_error("Failed to count participants"))
    }

    async fn create_result(
        &self,
        event_id: Uuid,
        request: ResultRequest,
    ) -> Result<RaceResult, AppError> {
        let query = format!(
            "INSERT INTO results
                 (event_id, race_id, category_id, participant_id, time, position,
                  bib_number, status, notes)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {RESULT_COLUMNS}"
        );

        sqlx::query_as::<_, RaceResult>(&query)
            .bind(event_id)
            .bind(request.race_id)
            .bind(request.category_id)
            .bind(request.participant_id)
            .bind(&request.time)
            .bind(request.position)
            .bind(&request.bib_number)
            .bind(request.status.as_str())
            .bind(&request.notes)
            .fetch_one(&self.db)
            .await
            .map_err(db_error("Failed to insert result"))
    }

    async fn list_results(&self, event_id: Uuid) -> Result<Vec<RaceResult>, AppError> {
        let query = format!(
            "SELECT {RESULT_COLUMNS} FROM results
             WHERE event_id = $1 ORDER BY race_id, position"
        );

        sqlx::query_as::<_, RaceResult>(&query)
            .bind(event_id)
            .fetch_all(&self.db)
            .await
            .map_err(db_error("Failed to fetch results"))
    }

    async fn dashboard_stats(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, AppError> {
        let (active_events, next_date): (i64, Option<DateTime<Utc>>) = sqlx::query_as(
            "SELECT COUNT(*), MIN(date) FROM events
             WHERE owner_id = $1 AND deleted_at IS NULL AND date >= $2",
        )
        .bind(owner_id)
        .bind(now)
        .fetch_one(&self.db)
        .await
        .map_err(db_error("Failed to compute upcoming events"))?;

        let total_participants = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM participants p
             JOIN events e ON e.id = p.event_id
             WHERE e.owner_id = $1 AND e.deleted_at IS NULL",
        )
        .bind(owner_id)
        .fetch_one(&self.db)
        .await
        .map_err(db_error("Failed to count participants"))?;

        Ok(DashboardStats {
            active_events,
            total_participants,
            next_event: next_date.map(|date| NextEvent {
                date: date.date_naive(),
            }),
            total_revenue: 0,
        })
    }
}

#[derive(Debug, Default)]
struct EventTables {
    events: HashMap<Uuid, (Event, bool)>,
    categories: Vec<Category>,
    races: Vec<Race>,
    participants: Vec<Participant>,
    results: Vec<RaceResult>,
}

impl EventTables {
    fn live_event(&self, id: Uuid) -> Option<&Event> {
        self.events
            .get(&id)
            .filter(|(_, deleted)| !deleted)
            .map(|(event, _)| event)
    }

    fn live_events(&self) -> impl Iterator<Item = &Event> {
        self.events
            .values()
            .filter(|(_, deleted)| !deleted)
            .map(|(event, _)| event)
    }

    fn slug_taken(&self, slug: &str, except: Option<Uuid>) -> bool {
        self.events
            .values()
            .any(|(event, _)| event.slug == slug && Some(event.id) != except)
    }
}

/// Process-local store with the same constraints as the schema.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    tables: RwLock<EventTables>,
}

impl InMemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn create_event(&self, owner_id: Uuid, changes: EventChanges) -> Result<Event, AppError> {
        let mut tables = self.tables.write().await;
        if tables.slug_taken(&changes.slug, None) {
            return Err(AppError::bad_request(SLUG_TAKEN));
        }

        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            owner_id,
            title: changes.title,
            slug: changes.slug,
            description: changes.description,
            date: changes.date,
            location: changes.location,
            image: changes.image,
            is_published: changes.is_published,
            created_at: now,
            updated_at: now,
        };
        tables.events.insert(event.id, (event.clone(), false));
        Ok(event)
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, AppError> {
        let mut tables = self.tables.write().await;
        if tables.live_event(id).is_none() {
            return Ok(None);
        }
        if tables.slug_taken(&changes.slug, Some(id)) {
            return Err(AppError::bad_request(SLUG_TAKEN));
        }

        Ok(tables.events.get_mut(&id).map(|(event, _)| {
            event.title = changes.title;
            event.slug = changes.slug;
            event.description = changes.description;
            event.date = changes.date;
            event.location = changes.location;
            event.image = changes.image;
            event.is_published = changes.is_published;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, AppError> {
        let mut tables = self.tables.write().await;
        match tables.events.get_mut(&id) {
            Some((_, deleted)) if !*deleted => {
                *deleted = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_event(&self, id: Uuid) -> Result<Option<Event>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables.live_event(id).cloned())
    }

    async fn find_published_by_slug(&self, slug: &str) -> Result<Option<Event>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .live_events()
            .find(|event| event.slug == slug && event.is_published)
            .cloned())
    }

    async fn list_events(
        &self,
        filter: &EventFilter,
        limit: i64,
        offset: i64,
    ) -> Result<(Vec<Event>, i64), AppError> {
        let tables = self.tables.read().await;

        let mut matching: Vec<&Event> = tables
            .live_events()
            .filter(|event| filter.matches(event))
            .collect();
        matching.sort_by_key(|event| (event.date, event.created_at));

        let total = i64::try_from(matching.len()).unwrap_or(i64::MAX);
        let skip = usize::try_from(offset).unwrap_or(usize::MAX);
        let take = usize::try_from(limit).unwrap_or(0);
        let page = matching
            .into_iter()
            .skip(skip)
            .take(take)
            .cloned()
            .collect();

        Ok((page, total))
    }

    async fn create_category(
        &self,
        event_id: Uuid,
        request: CategoryRequest,
    ) -> Result<Category, AppError> {
        let category = Category {
            id: Uuid::new_v4(),
            event_id,
            name: request.name,
            description: request.description,
            created_at: Utc::now(),
        };
        self.tables.write().await.categories.push(category.clone());
        Ok(category)
    }

    async fn list_categories(&self, event_id: Uuid) -> Result<Vec<Category>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .filter(|category| category.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn create_race(&self, event_id: Uuid, request: RaceRequest) -> Result<Race, AppError> {
        let mut category_ids = request.category_ids;
        category_ids.sort();
        category_ids.dedup();

        let race = Race {
            id: Uuid::new_v4(),
            event_id,
            name: request.name,
            description: request.description,
            distance: request.distance,
            unit: request.unit,
            start_time: request.start_time,
            category_ids,
            created_at: Utc::now(),
        };
        self.tables.write().await.races.push(race.clone());
        Ok(race)
    }

    async fn list_races(&self, event_id: Uuid) -> Result<Vec<Race>, AppError> {
        let tables = self.tables.read().await;
        let mut races: Vec<Race> = tables
            .races
            .iter()
            .filter(|race| race.event_id == event_id)
            .cloned()
            .collect();
        races.sort_by_key(|race| race.start_time);
        Ok(races)
    }

    async fn create_participant(&self, new: NewParticipant) -> Result<Participant, AppError> {
        let mut tables = self.tables.write().await;
        let details = new.details;

        if tables
            .participants
            .iter()
            .any(|p| p.event_id == new.event_id && p.email == details.email)
        {
            return Err(AppError::bad_request(ALREADY_REGISTERED));
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            event_id: new.event_id,
            first_name: details.first_name,
            last_name: details.last_name,
            email: details.email,
            birth_date: details.birth_date,
            gender: details.gender,
            country: details.country,
            city: details.city,
            phone: details.phone,
            emergency_contact: details.emergency_contact,
            blood_type: details.blood_type,
            created_by: new.created_by,
            created_at: Utc::now(),
        };
        tables.participants.push(participant.clone());
        Ok(participant)
    }

    async fn list_participants(&self, event_id: Uuid) -> Result<Vec<Participant>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .participants
            .iter()
            .filter(|p| p.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn find_participant(
        &self,
        event_id: Uuid,
        participant_id: Uuid,
    ) -> Result<Option<Participant>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .participants
            .iter()
            .find(|p| p.event_id == event_id && p.id == participant_id)
            .cloned())
    }

    async fn find_participant_by_email(
        &self,
        event_id: Uuid,
        email: &str,
    ) -> Result<Option<Participant>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .participants
            .iter()
            .find(|p| p.event_id == event_id && p.email == email)
            .cloned())
    }

    async fn list_participants_created_by(
        &self,
        event_id: Uuid,
        user_id: Uuid,
    ) -> Result<Vec<Participant>, AppError> {
        let tables = self.tables.read().await;
        Ok(tables
            .participants
            .iter()
            .filter(|p| p.event_id == event_id && p.created_by == Some(user_id))
            .cloned()
            .collect())
    }

    async fn count_registrations_by(&self, user_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        let count = tables
            .participants
            .iter()
            .filter(|p| p.created_by == Some(user_id))
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn count_participants(&self, event_id: Uuid) -> Result<i64, AppError> {
        let tables = self.tables.read().await;
        let count = tables
            .participants
            .iter()
            .filter(|p| p.event_id == event_id)
            .count();
        Ok(i64::try_from(count).unwrap_or(i64::MAX))
    }

    async fn create_result(
        &self,
        event_id: Uuid,
        request: ResultRequest,
    ) -> Result<RaceResult, AppError> {
        let result = RaceResult {
            id: Uuid::new_v4(),
            event_id,
            race_id: request.race_id,
            category_id: request.category_id,
            participant_id: request.participant_id,
            time: request.time,
            position: request.position,
            bib_number: request.bib_number,
            status: request.status,
            notes: request.notes,
            created_at: Utc::now(),
        };
        self.tables.write().await.results.push(result.clone());
        Ok(result)
    }

    async fn list_results(&self, event_id: Uuid) -> Result<Vec<RaceResult>, AppError> {
        let tables = self.tables.read().await;
        let mut results: Vec<RaceResult> = tables
            .results
            .iter()
            .filter(|result| result.event_id == event_id)
            .cloned()
            .collect();
        results.sort_by_key(|result| (result.race_id, result.position));
        Ok(results)
    }

    async fn dashboard_stats(
        &self,
        owner_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<DashboardStats, AppError> {
        let tables = self.tables.read().await;

        let owned: Vec<&Event> = tables
            .live_events()
            .filter(|event| event.owner_id == owner_id)
            .collect();
        let upcoming: Vec<&Event> = owned.iter().copied().filter(|e| e.date >= now).collect();

        let total_participants = tables
            .participants
            .iter()
            .filter(|p| owned.iter().any(|event| event.id == p.event_id))
            .count();

        Ok(DashboardStats {
            active_events: i64::try_from(upcoming.len()).unwrap_or(i64::MAX),
            total_participants: i64::try_from(total_participants).unwrap_or(i64::MAX),
            next_event: upcoming.iter().map(|event| event.date).min().map(|date| NextEvent {
                date: date.date_naive(),
            }),
            total_revenue: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use chrono::Duration;

    use crate::modules::events::model::ParticipantRequest;

    fn changes(slug: &str, days_ahead: i64, is_published: bool) -> EventChanges {
        EventChanges {
            title: "Mountain Trail".to_string(),
            slug: slug.to_string(),
            description: Some("Up and down".to_string()),
            date: Utc::now() + Duration::days(days_ahead),
            location: Some("Andorra".to_string()),
            image: None,
            is_published,
        }
    }

    fn registration(event_id: Uuid, email: &str, created_by: Option<Uuid>) -> NewParticipant {
        NewParticipant {
            event_id,
            created_by,
            details: ParticipantRequest {
                first_name: "Kilian".to_string(),
                last_name: "Jornet".to_string(),
                email: email.to_string(),
                birth_date: Utc::now() - Duration::days(365 * 30),
                gender: "MALE".to_string(),
                country: "ES".to_string(),
                city: None,
                phone: None,
                emergency_contact: None,
                blood_type: None,
            },
        }
    }

    #[test]
    fn test_like_pattern_escapes_metacharacters() {
        assert_eq!(like_pattern("trail"), "%trail%");
        assert_eq!(like_pattern("100%_fun\\"), "%100\\%\\_fun\\\\%");
    }

    #[tokio::test]
    async fn test_slugs_are_unique_even_after_delete() {
        let store = InMemoryEventStore::new();
        let owner = Uuid::new_v4();
        let event = store.create_event(owner, changes("trail", 10, true)).await.unwrap();

        let err = store
            .create_event(owner, changes("trail", 10, true))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), SLUG_TAKEN);

        assert!(store.delete_event(event.id).await.unwrap());
        assert!(store.create_event(owner, changes("trail", 10, true)).await.is_err());
    }

    #[tokio::test]
    async fn test_deleted_events_are_invisible() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(Uuid::new_v4(), changes("gone", 10, true))
            .await
            .unwrap();

        assert!(store.delete_event(event.id).await.unwrap());
        assert!(!store.delete_event(event.id).await.unwrap());
        assert!(store.find_event(event.id).await.unwrap().is_none());
        assert!(store.find_published_by_slug("gone").await.unwrap().is_none());
        assert!(
            store
                .update_event(event.id, changes("gone", 1, true))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_list_events_pages_in_date_order() {
        let store = InMemoryEventStore::new();
        let owner = Uuid::new_v4();
        for (slug, days) in [("c", 30), ("a", 10), ("b", 20)] {
            store.create_event(owner, changes(slug, days, true)).await.unwrap();
        }
        store.create_event(owner, changes("draft", 5, false)).await.unwrap();

        let filter = EventFilter {
            published_only: true,
            ..EventFilter::default()
        };
        let (page, total) = store.list_events(&filter, 2, 0).await.unwrap();
        assert_eq!(total, 3);
        assert_eq!(
            page.iter().map(|e| e.slug.as_str()).collect::<Vec<_>>(),
            ["a", "b"]
        );

        let (page, _) = store.list_events(&filter, 2, 2).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].slug, "c");
    }

    #[tokio::test]
    async fn test_one_registration_per_email_per_event() {
        let store = InMemoryEventStore::new();
        let owner = Uuid::new_v4();
        let first = store.create_event(owner, changes("one", 10, true)).await.unwrap();
        let second = store.create_event(owner, changes("two", 10, true)).await.unwrap();

        store
            .create_participant(registration(first.id, "k@example.com", None))
            .await
            .unwrap();
        let err = store
            .create_participant(registration(first.id, "k@example.com", None))
            .await
            .unwrap_err();
        assert_eq!(err.public_message(), ALREADY_REGISTERED);

        store
            .create_participant(registration(second.id, "k@example.com", None))
            .await
            .unwrap();
        assert_eq!(store.count_participants(first.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_registrations_are_counted_per_account() {
        let store = InMemoryEventStore::new();
        let event = store
            .create_event(Uuid::new_v4(), changes("count", 10, true))
            .await
            .unwrap();
        let account = Uuid::new_v4();

        for n in 0..3 {
            store
                .create_participant(registration(
                    event.id,
                    &format!("p{n}@example.com"),
                    Some(account),
                ))
                .await
                .unwrap();
        }
        store
            .create_participant(registration(event.id, "anon@example.com", None))
            .await
            .unwrap();

        assert_eq!(store.count_registrations_by(account).await.unwrap(), 3);
        assert_eq!(
            store
                .list_participants_created_by(event.id, account)
                .await
                .unwrap()
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn test_dashboard_stats_for_owner() {
        let store = InMemoryEventStore::new();
        let owner = Uuid::new_v4();
        let soon = store.create_event(owner, changes("soon", 3, true)).await.unwrap();
        store.create_event(owner, changes("later", 30, false)).await.unwrap();
        let past = store.create_event(owner, changes("past", -3, true)).await.unwrap();
        store
            .create_event(Uuid::new_v4(), changes("theirs", 1, true))
            .await
            .unwrap();

        store
            .create_participant(registration(soon.id, "a@example.com", None))
            .await
            .unwrap();
        store
            .create_participant(registration(past.id, "b@example.com", None))
            .await
            .unwrap();

        let stats = store.dashboard_stats(owner, Utc::now()).await.unwrap();
        assert_eq!(stats.active_events, 2);
        assert_eq!(stats.total_participants, 2);
        assert_eq!(
            stats.next_event,
            Some(NextEvent {
                date: soon.date.date_naive()
            })
        );
        assert_eq!(stats.total_revenue, 0);

        let empty = store.dashboard_stats(Uuid::new_v4(), Utc::now()).await.unwrap();
        assert_eq!(empty.active_events, 0);
        assert!(empty.next_event.is_none());
    }
}
