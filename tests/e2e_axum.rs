//! End-to-end tests for the Axum HTTP API layer.
//!
//! These tests use the in-memory backend - no database required.
//! Run with: `cargo test --features "axum_api mocks" --test e2e_axum`

#![cfg(all(feature = "axum_api", feature = "mocks"))]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use companies::actions::{CreateApiTokenAction, RegisterUserAction, RegisterUserInput};
use companies::api::axum::{CompaniesState, routes};
use companies::crypto::Argon2Hasher;
use companies::validators::PasswordPolicy;
use companies::{CompaniesConfig, Features, MockDatabase, SecretString, User, UserRepository};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

type State = CompaniesState<
    MockDatabase,
    MockDatabase,
    MockDatabase,
    MockDatabase,
    MockDatabase,
    MockDatabase,
>;

fn create_app(db: &MockDatabase, config: CompaniesConfig) -> Router {
    let state: State = CompaniesState::new(
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        db.clone(),
        config,
    )
    .with_hasher(Argon2Hasher::fast());

    routes().with_state(state)
}

/// Registers a user and returns them with a full-access bearer token.
async fn register(db: &MockDatabase, name: &str, email: &str) -> (User, String) {
    let user = RegisterUserAction::with_hasher(
        db.clone(),
        db.clone(),
        db.clone(),
        PasswordPolicy::default(),
        Argon2Hasher::fast(),
    )
    .execute(RegisterUserInput {
        name: name.to_owned(),
        email: email.to_owned(),
        password: SecretString::new("password123"),
        password_confirmation: SecretString::new("password123"),
    })
    .await
    .unwrap();

    let abilities = ["create", "read", "update", "delete"].map(str::to_owned);
    let token = CreateApiTokenAction::new(db.clone())
        .execute(&user, "test", &abilities)
        .await
        .unwrap();

    (user, token.plain_text_token.expose_secret().to_owned())
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&json).unwrap())
        }
        None => Body::empty(),
    };

    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, json)
}

#[tokio::test]
async fn test_requires_bearer_token() {
    let db = MockDatabase::new();
    let app = create_app(&db, CompaniesConfig::default());

    let (status, body) = send(&app, "GET", "/companies", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "TOKEN_INVALID");
    assert_eq!(body["banner_style"], "danger");

    let (status, _) = send(&app, "GET", "/user", Some("1|not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_company_lifecycle() {
    let db = MockDatabase::new();
    let app = create_app(&db, CompaniesConfig::default());
    let (_, token) = register(&db, "Taylor Otwell", "taylor@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/companies",
        Some(&token),
        Some(json!({ "name": "Laravel" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["banner"], "Company created.");
    assert_eq!(body["banner_style"], "success");
    assert_eq!(body["data"]["name"], "Laravel");
    assert_eq!(body["data"]["role"], "owner");
    assert_eq!(body["data"]["is_current"], true);
    let company_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", "/companies", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(names, ["Laravel", "Taylor's Company"]);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/companies/{company_id}"),
        Some(&token),
        Some(json!({ "name": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/companies/{company_id}"),
        Some(&token),
        Some(json!({ "name": "Laravel LLC" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Laravel LLC");

    let (status, body) = send(&app, "GET", "/current-company", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["company"]["id"], company_id);

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/companies/{company_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // falls back to the personal company
    let (_, body) = send(&app, "GET", "/current-company", Some(&token), None).await;
    assert_eq!(body["company"]["personal_company"], true);
    let personal_id = body["company"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/companies/{personal_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "CANNOT_DELETE_PERSONAL_COMPANY");
}

#[tokio::test]
async fn test_invite_and_accept() {
    let db = MockDatabase::new();
    let app = create_app(&db, CompaniesConfig::default());
    let (_, owner_token) = register(&db, "Taylor Otwell", "taylor@example.com").await;
    let (adam, adam_token) = register(&db, "Adam Wathan", "adam@example.com").await;

    let (_, body) = send(
        &app,
        "POST",
        "/companies",
        Some(&owner_token),
        Some(json!({ "name": "Laravel" })),
    )
    .await;
    let company_id = body["data"]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/companies/{company_id}/employees"),
        Some(&owner_token),
        Some(json!({ "email": "adam@example.com", "role": "editor" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["banner"], "Invitation sent.");
    let invitation_token = body["data"]["token"].as_str().unwrap().to_owned();

    // employees cannot see invitations
    let (status, _) = send(
        &app,
        "GET",
        &format!("/companies/{company_id}/invitations"),
        Some(&adam_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/companies/{company_id}/invitations"),
        Some(&owner_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invitations"][0]["email"], "adam@example.com");
    assert!(body["invitations"][0].get("token_hash").is_none());

    let (status, body) = send(
        &app,
        "POST",
        "/company-invitations/accept",
        Some(&adam_token),
        Some(json!({ "token": invitation_token })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["banner"],
        "Great! You have accepted the invitation to join the Laravel company."
    );

    let (status, body) = send(
        &app,
        "GET",
        &format!("/companies/{company_id}/employees"),
        Some(&adam_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["owner"]["email"], "taylor@example.com");
    assert_eq!(body["employees"][0]["user_id"], adam.id);
    assert_eq!(body["employees"][0]["role"], "editor");
    assert_eq!(body["available_roles"][0]["key"], "admin");

    let (status, body) = send(
        &app,
        "PUT",
        "/current-company",
        Some(&adam_token),
        Some(json!({ "company_id": company_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["role"], "editor");
    assert_eq!(
        body["data"]["permissions"],
        json!(["create", "read", "update"])
    );

    // employees cannot manage the company
    let (status, _) = send(
        &app,
        "PUT",
        &format!("/companies/{company_id}/employees/{}", adam.id),
        Some(&adam_token),
        Some(json!({ "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/companies/{company_id}/employees/{}", adam.id),
        Some(&adam_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["banner"], "You have left the company.");
}

#[tokio::test]
async fn test_direct_add_when_invitations_disabled() {
    let db = MockDatabase::new();
    let config = CompaniesConfig {
        features: Features {
            sends_invitations: false,
            ..Features::default()
        },
        ..CompaniesConfig::default()
    };
    let app = create_app(&db, config);
    let (taylor, token) = register(&db, "Taylor Otwell", "taylor@example.com").await;
    register(&db, "Adam Wathan", "adam@example.com").await;

    let company_id = taylor.current_company_id.unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/companies/{company_id}/employees"),
        Some(&token),
        Some(json!({ "email": "adam@example.com", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["banner"], "Employee added.");
    assert_eq!(body["data"]["membership"]["role"], "admin");
    assert_eq!(db.invitation_count().unwrap(), 0);

    let (status, body) = send(
        &app,
        "POST",
        &format!("/companies/{company_id}/employees"),
        Some(&token),
        Some(json!({ "email": "nobody@example.com", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "USER_NOT_FOUND");

    let (status, body) = send(
        &app,
        "DELETE",
        &format!("/companies/{company_id}/employees/{}", taylor.id),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "CANNOT_REMOVE_OWNER");
}

#[tokio::test]
async fn test_profile_and_password() {
    let db = MockDatabase::new();
    let app = create_app(&db, CompaniesConfig::default());
    let (_, token) = register(&db, "Taylor Otwell", "taylor@example.com").await;
    register(&db, "Adam Wathan", "adam@example.com").await;

    let (status, body) = send(&app, "GET", "/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "taylor@example.com");
    assert!(body.get("hashed_password").is_none());

    let (status, body) = send(
        &app,
        "PUT",
        "/user/profile-information",
        Some(&token),
        Some(json!({ "name": "Taylor", "email": "adam@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "USER_ALREADY_EXISTS");

    let (status, body) = send(
        &app,
        "PUT",
        "/user/profile-information",
        Some(&token),
        Some(json!({ "name": "Taylor", "email": "otwell@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "otwell@example.com");

    let (status, body) = send(
        &app,
        "PUT",
        "/user/password",
        Some(&token),
        Some(json!({
            "current_password": "wrong-password",
            "password": "new-password",
            "password_confirmation": "new-password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "INVALID_CREDENTIALS");

    let (status, _) = send(
        &app,
        "PUT",
        "/user/password",
        Some(&token),
        Some(json!({
            "current_password": "password123",
            "password": "new-password",
            "password_confirmation": "new-password"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        "DELETE",
        "/user",
        Some(&token),
        Some(json!({ "password": "new-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // the token went with the account
    let (status, _) = send(&app, "GET", "/user", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_token_management() {
    let db = MockDatabase::new();
    let app = create_app(&db, CompaniesConfig::default());
    let (_, token) = register(&db, "Taylor Otwell", "taylor@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/user/api-tokens",
        Some(&token),
        Some(json!({ "name": "ci" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["token"]["abilities"], json!(["read"]));
    let new_id = body["data"]["token"]["id"].as_i64().unwrap();
    let plain = body["data"]["plain_text_token"].as_str().unwrap().to_owned();
    assert!(plain.starts_with(&format!("{new_id}|")));

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/user/api-tokens/{new_id}"),
        Some(&token),
        Some(json!({ "permissions": ["update", "read", "launch-missiles"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["abilities"], json!(["read", "update"]));

    let (status, body) = send(&app, "GET", "/user/api-tokens", Some(&plain), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tokens"].as_array().unwrap().len(), 2);
    assert_eq!(body["default_permissions"], json!(["read"]));

    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/user/api-tokens/{new_id}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", "/user", Some(&plain), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_token_abilities_limit_routes() {
    let db = MockDatabase::new();
    let app = create_app(&db, CompaniesConfig::default());
    let (user, _) = register(&db, "Taylor Otwell", "taylor@example.com").await;

    let read_only = CreateApiTokenAction::new(db.clone())
        .execute(&user, "dashboard", &["read".to_owned()])
        .await
        .unwrap();
    let read_only = read_only.plain_text_token.expose_secret().to_owned();

    let (status, body) = send(&app, "GET", "/companies", Some(&read_only), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        "/companies",
        Some(&read_only),
        Some(json!({ "name": "Laravel" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], "FORBIDDEN");

    let (status, _) = send(
        &app,
        "POST",
        "/user/api-tokens",
        Some(&read_only),
        Some(json!({
            "name": "escalate",
            "permissions": ["create", "read", "update", "delete"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "PUT",
        "/user/profile-information",
        Some(&read_only),
        Some(json!({ "name": "Taylor", "email": "taylor@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        "DELETE",
        "/user",
        Some(&read_only),
        Some(json!({ "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(db.find_user_by_id(user.id).await.unwrap().unwrap().id, user.id);

    // a token that may create can still only grant what it holds
    let minter = CreateApiTokenAction::new(db.clone())
        .execute(&user, "minter", &["create".to_owned(), "read".to_owned()])
        .await
        .unwrap();
    let (status, body) = send(
        &app,
        "POST",
        "/user/api-tokens",
        Some(minter.plain_text_token.expose_secret()),
        Some(json!({ "name": "child", "permissions": ["read", "update", "delete"] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["token"]["abilities"], json!(["read"]));
}

#[tokio::test]
async fn test_disabled_features() {
    let db = MockDatabase::new();
    let config = CompaniesConfig {
        features: Features {
            company_features: false,
            api_features: false,
            account_deletion: false,
            ..Features::default()
        },
        ..CompaniesConfig::default()
    };
    let app = create_app(&db, config);
    let (_, token) = register(&db, "Taylor Otwell", "taylor@example.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/companies",
        Some(&token),
        Some(json!({ "name": "Laravel" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "FEATURE_DISABLED");

    let (status, _) = send(&app, "GET", "/user/api-tokens", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "DELETE",
        "/user",
        Some(&token),
        Some(json!({ "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
