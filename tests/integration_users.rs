mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_test_user, get, location, post_json, profile_body, setup_test_app,
    test_auth_config, token_for, token_for_user,
};
use podium_auth::{Role, verify_session_token};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_get_profile() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&state, "profile@example.com", Role::User, true).await;

    let response = app
        .oneshot(get("/api/user/profile", Some(&token_for_user(&user))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["id"], user.id.to_string());
    assert_eq!(body["data"]["user"]["email"], "profile@example.com");
    assert_eq!(body["data"]["profile"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_get_profile_unknown_user() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(get("/api/user/profile", Some(&token_for(Role::User, true))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["message"], "User not found");
}

#[tokio::test]
async fn test_get_profile_without_token() {
    let (app, _) = setup_test_app();

    let response = app.oneshot(get("/api/user/profile", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_onboarding_flow_unlocks_dashboard() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&state, "new@example.com", Role::Organizer, false).await;
    let token = token_for_user(&user);

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/onboarding");

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/user/onboarding",
            profile_body("Ada", "Lovelace"),
            Some(&token),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["name"], "Ada Lovelace");
    assert_eq!(body["data"]["user"]["onboardingCompleted"], true);

    let fresh_token = body["data"]["token"].as_str().unwrap().to_string();
    let claims = verify_session_token(&fresh_token, &test_auth_config()).unwrap();
    assert!(claims.onboarding_completed);

    let response = app
        .clone()
        .oneshot(get("/dashboard", Some(&fresh_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .oneshot(get("/onboarding", Some(&fresh_token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location(&response), "/dashboard");
}

#[tokio::test]
async fn test_onboarding_validation() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&state, "new@example.com", Role::User, false).await;
    let mut body = profile_body("A", "Lovelace");
    body["phone"] = json!("123");

    let response = app
        .oneshot(post_json(
            "/api/user/onboarding",
            body,
            Some(&token_for_user(&user)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["message"],
        "First name must be at least 2 characters, Phone must be at least 8 digits"
    );
}

#[tokio::test]
async fn test_onboarding_requires_accepted_terms() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&state, "terms@example.com", Role::User, false).await;
    let mut body = profile_body("Ada", "Lovelace");
    body["acceptTerms"] = json!(false);

    let response = app
        .oneshot(post_json(
            "/api/user/onboarding",
            body,
            Some(&token_for_user(&user)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        body_json(response).await["message"],
        "You must accept the terms and conditions"
    );
    let stored = state.users.find_by_id(&user.id.to_string()).await.unwrap().unwrap();
    assert!(!stored.onboarding_completed);
}

#[tokio::test]
async fn test_onboarding_requires_full_profile() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&state, "partial@example.com", Role::User, false).await;

    let response = app
        .oneshot(post_json(
            "/api/user/onboarding",
            json!({ "firstName": "Ada", "lastName": "Lovelace" }),
            Some(&token_for_user(&user)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["success"], false);
}

#[tokio::test]
async fn test_profile_is_returned_after_onboarding() {
    let (app, state) = setup_test_app();
    let user = create_test_user(&state, "saved@example.com", Role::User, false).await;
    let token = token_for_user(&user);

    let response = app
        .clone()
        .oneshot(post_json("/api/user/profile", profile_body("Ada", "Lovelace"), Some(&token)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/user/profile", Some(&token)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["user"]["name"], "Ada Lovelace");
    assert_eq!(body["data"]["profile"]["city"], "London");
    assert_eq!(body["data"]["profile"]["documentType"], "PASSPORT");
    assert_eq!(body["data"]["profile"]["bloodType"], "O+");
    assert!(body["data"]["profile"].get("acceptTerms").is_none());
}

#[tokio::test]
async fn test_admin_lists_users() {
    let (app, state) = setup_test_app();
    let admin = create_test_user(&state, "admin@example.com", Role::Admin, true).await;
    create_test_user(&state, "user@example.com", Role::User, true).await;

    let response = app
        .oneshot(get("/api/admin/users", Some(&token_for_user(&admin))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_non_admin_cannot_list_users() {
    let (app, _) = setup_test_app();

    let response = app
        .oneshot(get("/api/admin/users", Some(&token_for(Role::Organizer, true))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_json(response).await,
        json!({ "success": false, "message": "Access denied. Required role: ADMIN" })
    );
}
