//! User data models and DTOs.
//!
//! - [`User`] - A user as the API exposes it (never carries the password hash)
//! - [`UserCredentials`] - A user paired with their stored password hash
//! - [`NewUser`] - Everything needed to insert a user
//! - [`Profile`] / [`ProfileRequest`] - The onboarding profile and its request body

use chrono::{DateTime, Utc};
use podium_auth::{Role, SessionIdentity};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub onboarding_completed: bool,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// The subset of the user that goes into a session token.
    pub fn identity(&self) -> SessionIdentity {
        SessionIdentity::new(self.id.to_string(), self.role, self.onboarding_completed)
    }
}

#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user: User,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub onboarding_completed: bool,
}

/// Fixed vocabularies stored as their wire names.
macro_rules! text_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        #[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(format!("unknown {} {other:?}", stringify!($name))),
                }
            }
        }
    };
}

text_enum!(Gender {
    Male => "MALE",
    Female => "FEMALE",
    Other => "OTHER",
    PreferNotToSay => "PREFER_NOT_TO_SAY",
});

text_enum!(BloodType {
    APositive => "A+",
    ANegative => "A-",
    BPositive => "B+",
    BNegative => "B-",
    AbPositive => "AB+",
    AbNegative => "AB-",
    OPositive => "O+",
    ONegative => "O-",
    Unknown => "UNKNOWN",
});

text_enum!(DocumentType {
    Dni => "DNI",
    Passport => "PASSPORT",
    DrivingLicense => "DRIVING_LICENSE",
    Other => "OTHER",
});

/// The participant profile collected during onboarding.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    pub country: String,
    pub city: String,
    pub address: String,
    pub phone: String,
    pub emergency_contact: String,
    pub emergency_phone: String,
    pub blood_type: Option<BloodType>,
    pub document_type: DocumentType,
    pub document_number: String,
}

/// Body of `POST /api/user/onboarding` and `POST /api/user/profile`.
#[derive(Deserialize, Validate, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ProfileRequest {
    #[validate(length(min = 2, max = 100, message = "First name must be at least 2 characters"))]
    pub first_name: String,
    #[validate(length(min = 2, max = 100, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
    pub birth_date: DateTime<Utc>,
    pub gender: Gender,
    #[validate(length(min = 2, max = 100, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 2, max = 100, message = "City is required"))]
    pub city: String,
    #[validate(length(min = 5, max = 200, message = "Address is required"))]
    pub address: String,
    #[validate(length(min = 8, max = 30, message = "Phone must be at least 8 digits"))]
    pub phone: String,
    #[validate(length(min = 2, max = 100, message = "Emergency contact is required"))]
    pub emergency_contact: String,
    #[validate(length(min = 8, max = 30, message = "Emergency phone is required"))]
    pub emergency_phone: String,
    pub blood_type: Option<BloodType>,
    pub document_type: DocumentType,
    #[validate(length(min = 4, max = 50, message = "Document number is required"))]
    pub document_number: String,
    #[validate(custom(function = "validate_terms_accepted"))]
    pub accept_terms: bool,
}

fn validate_terms_accepted(accepted: &bool) -> Result<(), validator::ValidationError> {
    if *accepted {
        Ok(())
    } else {
        let mut error = validator::ValidationError::new("accept_terms");
        error.message = Some(TERMS_NOT_ACCEPTED.into());
        Err(error)
    }
}

pub const TERMS_NOT_ACCEPTED: &str = "You must accept the terms and conditions";

impl ProfileRequest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
    }

    /// The stored profile; terms acceptance is checked, not kept.
    pub fn profile(&self) -> Profile {
        Profile {
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            birth_date: self.birth_date,
            gender: self.gender,
            country: self.country.trim().to_string(),
            city: self.city.trim().to_string(),
            address: self.address.trim().to_string(),
            phone: self.phone.trim().to_string(),
            emergency_contact: self.emergency_contact.trim().to_string(),
            emergency_phone: self.emergency_phone.trim().to_string(),
            blood_type: self.blood_type,
            document_type: self.document_type,
            document_number: self.document_number.trim().to_string(),
        }
    }
}

/// Body of `GET /api/user/profile`.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: User,
    pub profile: Option<Profile>,
}
