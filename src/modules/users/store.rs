//! User persistence.
//!
//! Handlers only see [`UserStore`]; the composition root picks
//! [`PgUserStore`] and tests use [`InMemoryUserStore`].

use std::collections::HashMap;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use podium_auth::Role;
use podium_core::AppError;
use sqlx::{FromRow, PgPool};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::model::{NewUser, Profile, ProfileRequest, User, UserCredentials};

pub const EMAIL_TAKEN: &str = "Email is already registered";

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError>;

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError>;

    /// Unknown and unparseable ids both come back as `None`.
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;

    /// Stores the profile, sets the name from it and marks onboarding done.
    async fn complete_onboarding(
        &self,
        id: &str,
        profile: &ProfileRequest,
    ) -> Result<Option<User>, AppError>;

    async fn find_profile(&self, id: &str) -> Result<Option<Profile>, AppError>;

    async fn list_users(&self) -> Result<Vec<User>, AppError>;
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    onboarding_completed: bool,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: UserRow,
    password: String,
}

#[derive(FromRow)]
struct ProfileRow {
    first_name: String,
    last_name: String,
    birth_date: DateTime<Utc>,
    gender: String,
    country: String,
    city: String,
    address: String,
    phone: String,
    emergency_contact: String,
    emergency_phone: String,
    blood_type: Option<String>,
    document_type: String,
    document_number: String,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = AppError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let invalid = |err: String| AppError::internal(anyhow::anyhow!("stored profile: {err}"));

        Ok(Profile {
            first_name: row.first_name,
            last_name: row.last_name,
            birth_date: row.birth_date,
            gender: row.gender.parse().map_err(invalid)?,
            country: row.country,
            city: row.city,
            address: row.address,
            phone: row.phone,
            emergency_contact: row.emergency_contact,
            emergency_phone: row.emergency_phone,
            blood_type: row
                .blood_type
                .map(|blood_type| blood_type.parse())
                .transpose()
                .map_err(invalid)?,
            document_type: row.document_type.parse().map_err(invalid)?,
            document_number: row.document_number,
        })
    }
}

impl TryFrom<UserRow> for User {
    type Error = AppError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = row
            .role
            .parse::<Role>()
            .with_context(|| format!("user {} has unknown role {:?}", row.id, row.role))
            .map_err(AppError::internal)?;

        Ok(User {
            id: row.id,
            name: row.name,
            email: row.email,
            role,
            onboarding_completed: row.onboarding_completed,
            created_at: row.created_at,
        })
    }
}

const USER_COLUMNS: &str = "id, name, email, role, onboarding_completed, created_at";

const PROFILE_COLUMNS: &str = "first_name, last_name, birth_date, gender, country, city, \
                               address, phone, emergency_contact, emergency_phone, blood_type, \
                               document_type, document_number";

#[derive(Debug, Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let query = format!(
            "INSERT INTO users (name, email, password, role, onboarding_completed)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(&new_user.name)
            .bind(&new_user.email)
            .bind(&new_user.password_hash)
            .bind(new_user.role.as_str())
            .bind(new_user.onboarding_completed)
            .fetch_one(&self.db)
            .await
            .map_err(|err| {
                if is_unique_violation(&err) {
                    AppError::bad_request(EMAIL_TAKEN)
                } else {
                    AppError::internal(anyhow::Error::new(err).context("Failed to insert user"))
                }
            })?;

        row.try_into()
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let query = format!("SELECT {USER_COLUMNS}, password FROM users WHERE email = $1");

        let row = sqlx::query_as::<_, CredentialsRow>(&query)
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch user by email")
            .map_err(AppError::internal)?;

        row.map(|row| -> Result<UserCredentials, AppError> {
            Ok(UserCredentials {
                user: row.user.try_into()?,
                password_hash: row.password,
            })
        })
        .transpose()
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch user by id")
            .map_err(AppError::internal)?;

        row.map(User::try_from).transpose()
    }

    async fn complete_onboarding(
        &self,
        id: &str,
        profile: &ProfileRequest,
    ) -> Result<Option<User>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };
        let details = profile.profile();

        let mut tx = self
            .db
            .begin()
            .await
            .context("Failed to begin onboarding transaction")
            .map_err(AppError::internal)?;

        let query = format!(
            "UPDATE users
             SET name = $2, onboarding_completed = TRUE, updated_at = NOW()
             WHERE id = $1
             RETURNING {USER_COLUMNS}"
        );

        let Some(row) = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(profile.full_name())
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to complete onboarding")
            .map_err(AppError::internal)?
        else {
            return Ok(None);
        };

        sqlx::query(&format!(
            "INSERT INTO profiles (user_id, {PROFILE_COLUMNS})
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
             ON CONFLICT (user_id) DO UPDATE SET
                 first_name = EXCLUDED.first_name,
                 last_name = EXCLUDED.last_name,
                 birth_date = EXCLUDED.birth_date,
                 gender = EXCLUDED.gender,
                 country = EXCLUDED.country,
                 city = EXCLUDED.city,
                 address = EXCLUDED.address,
                 phone = EXCLUDED.phone,
                 emergency_contact = EXCLUDED.emergency_contact,
                 emergency_phone = EXCLUDED.emergency_phone,
                 blood_type = EXCLUDED.blood_type,
                 document_type = EXCLUDED.document_type,
                 document_number = EXCLUDED.document_number,
                 updated_at = NOW()"
        ))
        .bind(id)
        .bind(&details.first_name)
        .bind(&details.last_name)
        .bind(details.birth_date)
        .bind(details.gender.as_str())
        .bind(&details.country)
        .bind(&details.city)
        .bind(&details.address)
        .bind(&details.phone)
        .bind(&details.emergency_contact)
        .bind(&details.emergency_phone)
        .bind(details.blood_type.map(|blood_type| blood_type.as_str()))
        .bind(details.document_type.as_str())
        .bind(&details.document_number)
        .execute(&mut *tx)
        .await
        .context("Failed to store profile")
        .map_err(AppError::internal)?;

        tx.commit()
            .await
            .context("Failed to commit onboarding")
            .map_err(AppError::internal)?;

        row.try_into().map(Some)
    }

    async fn find_profile(&self, id: &str) -> Result<Option<Profile>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let query = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE user_id = $1");

        let row = sqlx::query_as::<_, ProfileRow>(&query)
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .context("Failed to fetch profile")
            .map_err(AppError::internal)?;

        row.map(Profile::try_from).transpose()
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at");

        let rows = sqlx::query_as::<_, UserRow>(&query)
            .fetch_all(&self.db)
            .await
            .context("Failed to fetch users")
            .map_err(AppError::internal)?;

        rows.into_iter().map(User::try_from).collect()
    }
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: User,
    password_hash: String,
    profile: Option<Profile>,
}

/// Process-local store keyed by user id.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<HashMap<Uuid, StoredUser>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create_user(&self, new_user: NewUser) -> Result<User, AppError> {
        let mut users = self.users.write().await;

        if users.values().any(|stored| stored.user.email == new_user.email) {
            return Err(AppError::bad_request(EMAIL_TAKEN));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            role: new_user.role,
            onboarding_completed: new_user.onboarding_completed,
            created_at: Utc::now(),
        };

        users.insert(
            user.id,
            StoredUser {
                user: user.clone(),
                password_hash: new_user.password_hash,
                profile: None,
            },
        );

        Ok(user)
    }

    async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<UserCredentials>, AppError> {
        let users = self.users.read().await;

        Ok(users
            .values()
            .find(|stored| stored.user.email == email)
            .map(|stored| UserCredentials {
                user: stored.user.clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let users = self.users.read().await;
        Ok(users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn complete_onboarding(
        &self,
        id: &str,
        profile: &ProfileRequest,
    ) -> Result<Option<User>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let mut users = self.users.write().await;

        Ok(users.get_mut(&id).map(|stored| {
            stored.user.name = profile.full_name();
            stored.user.onboarding_completed = true;
            stored.profile = Some(profile.profile());
            stored.user.clone()
        }))
    }

    async fn find_profile(&self, id: &str) -> Result<Option<Profile>, AppError> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let users = self.users.read().await;
        Ok(users.get(&id).and_then(|stored| stored.profile.clone()))
    }

    async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let users = self.users.read().await;

        let mut listed: Vec<User> = users.values().map(|stored| stored.user.clone()).collect();
        listed.sort_by_key(|user| user.created_at);
        Ok(listed)
    }
}
