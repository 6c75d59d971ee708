//! `PgUserStore` against a real database. Run with `DATABASE_URL` set:
//! `cargo test --test integration_pg_store -- --ignored`.

use axum::http::StatusCode;
use podium::modules::users::model::{NewUser, ProfileRequest};
use podium::modules::users::store::{PgUserStore, UserStore};
use podium_auth::Role;
use sqlx::PgPool;

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Pg User".to_string(),
        email: email.to_string(),
        password_hash: "$2b$04$placeholderplaceholderplaceholderpla".to_string(),
        role: Role::Organizer,
        onboarding_completed: false,
    }
}

fn profile_request(first_name: &str) -> ProfileRequest {
    serde_json::from_value(serde_json::json!({
        "firstName": first_name,
        "lastName": "Person",
        "birthDate": "1985-04-01T00:00:00Z",
        "gender": "OTHER",
        "country": "Spain",
        "city": "Madrid",
        "address": "Calle Mayor 1",
        "phone": "+34 600 000 000",
        "emergencyContact": "Next Of Kin",
        "emergencyPhone": "+34 600 000 001",
        "documentType": "DNI",
        "documentNumber": "12345678Z",
        "acceptTerms": true
    }))
    .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_create_and_load_user(pool: PgPool) {
    let store = PgUserStore::new(pool);

    let created = store.create_user(new_user("pg@example.com")).await.unwrap();
    assert_eq!(created.role, Role::Organizer);

    let credentials = store
        .find_credentials_by_email("pg@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(credentials.user.id, created.id);

    let found = store
        .find_by_id(&created.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.email, "pg@example.com");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_email_maps_to_bad_request(pool: PgPool) {
    let store = PgUserStore::new(pool);
    store.create_user(new_user("dup@example.com")).await.unwrap();

    let err = store
        .create_user(new_user("dup@example.com"))
        .await
        .unwrap_err();

    assert_eq!(err.status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_complete_onboarding_and_list(pool: PgPool) {
    let store = PgUserStore::new(pool);
    let created = store.create_user(new_user("onb@example.com")).await.unwrap();

    let updated = store
        .complete_onboarding(&created.id.to_string(), &profile_request("Onboarded"))
        .await
        .unwrap()
        .unwrap();
    assert!(updated.onboarding_completed);
    assert_eq!(updated.name, "Onboarded Person");

    let profile = store
        .find_profile(&created.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.first_name, "Onboarded");

    store
        .complete_onboarding(&created.id.to_string(), &profile_request("Renamed"))
        .await
        .unwrap();
    let profile = store
        .find_profile(&created.id.to_string())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(profile.first_name, "Renamed");

    assert!(store.find_by_id("not-a-uuid").await.unwrap().is_none());
    assert_eq!(store.list_users().await.unwrap().len(), 1);
}
