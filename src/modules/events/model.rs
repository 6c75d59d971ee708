//! Event data models and DTOs.
//!
//! - [`Event`] - An event as organizers see it
//! - [`PublicEvent`] - The fields anyone may read about a published event
//! - [`Category`], [`Race`], [`Participant`], [`RaceResult`] - Event children
//! - `*Request` - Request bodies, validated with `validator`

use chrono::{DateTime, NaiveDate, Utc};
use podium_core::{PaginationMeta, PaginationParams};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub categories: Vec<Category>,
    pub participant_count: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicEvent {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub image: Option<String>,
}

impl From<Event> for PublicEvent {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            slug: event.slug,
            description: event.description,
            date: event.date,
            location: event.location,
            image: event.image,
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Race {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub distance: f64,
    pub unit: String,
    pub start_time: DateTime<Utc>,
    pub category_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: Uuid,
    pub event_id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub birth_date: DateTime<Utc>,
    pub gender: String,
    pub country: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
    /// The account that registered this participant, if any.
    pub created_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResultStatus {
    #[default]
    Finished,
    Dnf,
    Dns,
    Dsq,
}

impl ResultStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultStatus::Finished => "FINISHED",
            ResultStatus::Dnf => "DNF",
            ResultStatus::Dns => "DNS",
            ResultStatus::Dsq => "DSQ",
        }
    }
}

impl TryFrom<String> for ResultStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl std::str::FromStr for ResultStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "FINISHED" => Ok(ResultStatus::Finished),
            "DNF" => Ok(ResultStatus::Dnf),
            "DNS" => Ok(ResultStatus::Dns),
            "DSQ" => Ok(ResultStatus::Dsq),
            other => Err(format!("unknown result status {other:?}")),
        }
    }
}

#[derive(Serialize, Deserialize, FromRow, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RaceResult {
    pub id: Uuid,
    pub event_id: Uuid,
    pub race_id: Uuid,
    pub category_id: Uuid,
    pub participant_id: Uuid,
    pub time: String,
    pub position: i32,
    pub bib_number: String,
    #[sqlx(try_from = "String")]
    pub status: ResultStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct EventRequest {
    #[validate(length(min = 3, max = 200, message = "Title must be at least 3 characters"))]
    pub title: String,
    /// Derived from the title when absent.
    #[validate(custom(function = "validate_slug"))]
    pub slug: Option<String>,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub is_published: bool,
}

fn validate_slug(slug: &str) -> Result<(), validator::ValidationError> {
    let well_formed = !slug.is_empty()
        && slug.len() <= 120
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');

    if well_formed {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("slug");
        error.message = Some("Slug may only contain lowercase letters, digits and '-'".into());
        Err(error)
    }
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CategoryRequest {
    #[validate(length(min = 2, max = 100, message = "Name must be at least 2 characters"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RaceRequest {
    #[validate(length(min = 3, max = 100, message = "Name must be at least 3 characters"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0, message = "Distance must be a positive number"))]
    pub distance: f64,
    #[validate(length(min = 1, message = "Unit is required"))]
    pub unit: String,
    pub start_time: DateTime<Utc>,
    #[validate(length(min = 1, message = "At least one category is required"))]
    pub category_ids: Vec<Uuid>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRequest {
    #[validate(length(min = 2, max = 100, message = "First name must be at least 2 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub birth_date: DateTime<Utc>,
    #[validate(length(min = 1, message = "Gender is required"))]
    pub gender: String,
    #[validate(length(min = 2, message = "Country is required"))]
    pub country: String,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub emergency_contact: Option<String>,
    pub blood_type: Option<String>,
}

#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ResultRequest {
    #[validate(length(min = 1, message = "Time is required"))]
    pub time: String,
    #[validate(range(min = 1, message = "Position must be a positive integer"))]
    pub position: i32,
    #[validate(length(min = 1, message = "Bib number is required"))]
    pub bib_number: String,
    #[serde(default)]
    pub status: ResultStatus,
    pub notes: Option<String>,
    pub race_id: Uuid,
    pub category_id: Uuid,
    pub participant_id: Uuid,
}

/// A fully resolved event write: the slug is always present.
#[derive(Debug, Clone)]
pub struct EventChanges {
    pub title: String,
    pub slug: String,
    pub description: Option<String>,
    pub date: DateTime<Utc>,
    pub location: Option<String>,
    pub image: Option<String>,
    pub is_published: bool,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub event_id: Uuid,
    pub created_by: Option<Uuid>,
    pub details: ParticipantRequest,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct EventListParams {
    pub search: Option<String>,
    /// Only the caller's own events, published or not.
    #[serde(default, deserialize_with = "deserialize_query_flag")]
    pub mine: bool,
    #[serde(flatten)]
    pub pagination: PaginationParams,
}

// Flattened query structs only ever see strings.
fn deserialize_query_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(matches!(value.as_deref().map(str::trim), Some("true" | "1")))
}

/// Which events a listing may return.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    pub owner_id: Option<Uuid>,
    pub published_only: bool,
    pub search: Option<String>,
}

impl EventFilter {
    pub fn matches(&self, event: &Event) -> bool {
        if self.published_only && !event.is_published {
            return false;
        }
        if let Some(owner_id) = self.owner_id {
            if event.owner_id != owner_id {
                return false;
            }
        }
        match &self.search {
            Some(term) => {
                let term = term.to_lowercase();
                event.title.to_lowercase().contains(&term)
                    || event
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&term))
            }
            None => true,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct PaginatedEvents {
    pub data: Vec<Event>,
    pub meta: PaginationMeta,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct RegistrationLookup {
    pub email: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationStatus {
    pub registered: bool,
    /// Only filled for the caller's own registrations.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<Participant>>,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NextEvent {
    pub date: NaiveDate,
}

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub active_events: i64,
    pub total_participants: i64,
    pub next_event: Option<NextEvent>,
    pub total_revenue: i64,
}

/// `lowercase-title-words-<8 hex chars>`; the suffix keeps equal titles apart.
pub fn slugify(title: &str, id: Uuid) -> String {
    let mut slug = String::new();
    for c in title.to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }

    let base = slug.trim_end_matches('-');
    let suffix: String = id.simple().to_string().chars().take(8).collect();
    if base.is_empty() {
        suffix
    } else {
        format!("{base}-{suffix}")
    }
}
