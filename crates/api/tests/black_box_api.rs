//! Black-box tests against a real HTTP server on an ephemeral port.

use jsonwebtoken::{Algorithm, EncodingKey, Header};
use keygate_api::app;
use keygate_api::config::AppConfig;
use keygate_auth::Claims;
use reqwest::StatusCode;
use serde_json::{json, Value};

const TEST_SECRET: &str = "black-box-secret";

struct TestServer {
    base: String,
    client: reqwest::Client,
}

impl TestServer {
    async fn spawn() -> Self {
        let config = AppConfig::for_tests(TEST_SECRET);
        let app = app::build_app(&config).await.unwrap();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base: format!("http://{addr}"),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base)
    }

    /// Sign up and return (token, user json).
    async fn signup(&self, email: &str, level: Option<i32>) -> (String, Value) {
        let mut body = json!({ "email": email, "password": "Str0ng!Pw" });
        if let Some(level) = level {
            body["level"] = json!(level);
        }

        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let payload: Value = response.json().await.unwrap();
        (
            payload["access_token"].as_str().unwrap().to_string(),
            payload["user"].clone(),
        )
    }
}

#[tokio::test]
async fn health_is_public() {
    let server = TestServer::spawn().await;

    let response = reqwest::get(server.url("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["status"], "ok");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let server = TestServer::spawn().await;

    for path in ["/whoami", "/users", "/users/deleted", "/users/report"] {
        let response = server.client.get(server.url(path)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{path}");

        let payload: Value = response.json().await.unwrap();
        assert_eq!(payload["error"], "unauthenticated", "{path}");
    }
}

#[tokio::test]
async fn signup_returns_token_whose_subject_matches_the_user() {
    let server = TestServer::spawn().await;
    let (token, user) = server.signup("alice@example.com", None).await;

    assert_eq!(user["email"], "alice@example.com");
    assert_eq!(user["level"], 1);
    assert!(user.get("password_hash").is_none());

    let mut validation = jsonwebtoken::Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    let claims = jsonwebtoken::decode::<Claims>(
        &token,
        &jsonwebtoken::DecodingKey::from_secret(TEST_SECRET.as_bytes()),
        &validation,
    )
    .unwrap()
    .claims;

    assert_eq!(claims.sub, user["id"].as_i64().unwrap());
    assert_eq!(claims.email, "alice@example.com");
    assert_eq!(claims.level, 1);
    assert_eq!(claims.exp - claims.iat, 24 * 3600);

    let response = server
        .client
        .get(server.url("/whoami"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let me: Value = response.json().await.unwrap();
    assert_eq!(me["email"], "alice@example.com");
}

#[tokio::test]
async fn signup_normalizes_email_and_rejects_duplicates() {
    let server = TestServer::spawn().await;
    let (_, user) = server.signup("  Bob@Example.COM ", None).await;
    assert_eq!(user["email"], "bob@example.com");

    let response = server
        .client
        .post(server.url("/auth/signup"))
        .json(&json!({ "email": "bob@example.com", "password": "Str0ng!Pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["error"], "duplicate_email");
}

#[tokio::test]
async fn weak_passwords_are_rejected_before_any_credential_work() {
    let server = TestServer::spawn().await;

    for password in ["short1!", "alllowercase1!", "NOUPPER??", "NoSpecial11"] {
        let response = server
            .client
            .post(server.url("/auth/signup"))
            .json(&json!({ "email": "weak@example.com", "password": password }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{password}");

        let payload: Value = response.json().await.unwrap();
        assert_eq!(payload["error"], "validation_error");
    }
}

#[tokio::test]
async fn signin_collapses_unknown_email_and_wrong_password() {
    let server = TestServer::spawn().await;
    server.signup("carol@example.com", None).await;

    let wrong_password = server
        .client
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": "carol@example.com", "password": "Wr0ng!Pw!" }))
        .send()
        .await
        .unwrap();
    let unknown_email = server
        .client
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": "nobody@example.com", "password": "Str0ng!Pw" }))
        .send()
        .await
        .unwrap();

    for response in [wrong_password, unknown_email] {
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let payload: Value = response.json().await.unwrap();
        assert_eq!(payload["error"], "invalid_credentials");
    }
}

#[tokio::test]
async fn signin_succeeds_with_correct_credentials() {
    let server = TestServer::spawn().await;
    let (_, created) = server.signup("dave@example.com", None).await;

    let response = server
        .client
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": "Dave@Example.com", "password": "Str0ng!Pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["user"]["id"], created["id"]);
    assert!(payload["access_token"].as_str().is_some());
}

#[tokio::test]
async fn soft_delete_disables_signin_and_invalidates_live_tokens() {
    let server = TestServer::spawn().await;
    let (admin_token, _) = server.signup("admin@example.com", Some(4)).await;
    let (victim_token, victim) = server.signup("victim@example.com", None).await;
    let victim_id = victim["id"].as_i64().unwrap();

    let response = server
        .client
        .delete(server.url(&format!("/users/{victim_id}")))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The victim's unexpired token stops resolving.
    let response = server
        .client
        .get(server.url("/whoami"))
        .bearer_auth(&victim_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Signin with the correct password reports the account disabled.
    let response = server
        .client
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": "victim@example.com", "password": "Str0ng!Pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["error"], "account_disabled");

    // The record moves from the active listing to the deleted one.
    let active: Value = server
        .client
        .get(server.url("/users"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(active
        .as_array()
        .unwrap()
        .iter()
        .all(|u| u["id"].as_i64() != Some(victim_id)));

    let deleted: Value = server
        .client
        .get(server.url("/users/deleted"))
        .bearer_auth(&admin_token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let entry = deleted
        .as_array()
        .unwrap()
        .iter()
        .find(|u| u["id"].as_i64() == Some(victim_id))
        .unwrap();
    assert!(entry["deleted_at"].as_str().is_some());

    // The deleted email becomes available for a fresh signup, and signin
    // resolves the new owner rather than the stale deleted record.
    let (_, replacement) = server.signup("victim@example.com", None).await;
    let response = server
        .client
        .post(server.url("/auth/signin"))
        .json(&json!({ "email": "victim@example.com", "password": "Str0ng!Pw" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["user"]["id"], replacement["id"]);
}

#[tokio::test]
async fn report_requires_level_four() {
    let server = TestServer::spawn().await;
    let (low_token, _) = server.signup("junior@example.com", Some(3)).await;
    let (high_token, _) = server.signup("senior@example.com", Some(4)).await;

    let response = server
        .client
        .get(server.url("/users/report"))
        .bearer_auth(&low_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["error"], "insufficient_level");
    assert!(payload["message"].as_str().unwrap().contains("level 4"));

    let response = server
        .client
        .get(server.url("/users/report"))
        .bearer_auth(&high_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "application/pdf"
    );
    let body = response.bytes().await.unwrap();
    assert!(body.starts_with(b"%PDF-"));
}

#[tokio::test]
async fn report_renders_csv_on_request() {
    let server = TestServer::spawn().await;
    let (token, _) = server.signup("admin@example.com", Some(4)).await;

    let response = server
        .client
        .get(server.url("/users/report?format=csv"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()["content-type"].to_str().unwrap(),
        "text/csv"
    );

    let body = response.text().await.unwrap();
    let mut lines = body.lines();
    assert_eq!(
        lines.next().unwrap(),
        "id,email,first_name,last_name,level,created_at"
    );
    assert!(body.contains("admin@example.com"));

    let response = server
        .client
        .get(server.url("/users/report?format=xml"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn expired_and_foreign_tokens_are_rejected() {
    let server = TestServer::spawn().await;
    let (_, user) = server.signup("erin@example.com", None).await;
    let sub = user["id"].as_i64().unwrap();

    let now = chrono::Utc::now().timestamp();
    let expired = Claims {
        sub,
        email: "erin@example.com".to_string(),
        level: 1,
        iat: now - 25 * 3600,
        exp: now - 3600,
    };
    let expired_token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &expired,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap();

    let foreign = Claims {
        sub,
        email: "erin@example.com".to_string(),
        level: 1,
        iat: now,
        exp: now + 3600,
    };
    let foreign_token = jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &foreign,
        &EncodingKey::from_secret(b"some-other-secret"),
    )
    .unwrap();

    for token in [expired_token, foreign_token] {
        let response = server
            .client
            .get(server.url("/whoami"))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

#[tokio::test]
async fn authorization_uses_current_level_not_the_token_snapshot() {
    let server = TestServer::spawn().await;
    let (admin_token, _) = server.signup("admin@example.com", Some(4)).await;
    let (member_token, member) = server.signup("member@example.com", Some(3)).await;
    let member_id = member["id"].as_i64().unwrap();

    // Promote the member after their token was issued.
    let response = server
        .client
        .patch(server.url(&format!("/users/{member_id}")))
        .bearer_auth(&admin_token)
        .json(&json!({ "level": 4 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // The old token (level 3 snapshot) now clears the level-4 gate.
    let response = server
        .client
        .get(server.url("/users/report"))
        .bearer_auth(&member_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn user_crud_round_trip() {
    let server = TestServer::spawn().await;
    let (token, _) = server.signup("admin@example.com", Some(4)).await;

    // Create through the admin endpoint: record only, no token.
    let response = server
        .client
        .post(server.url("/users"))
        .bearer_auth(&token)
        .json(&json!({
            "email": "new@example.com",
            "password": "Str0ng!Pw",
            "first_name": "New",
            "last_name": "User"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created: Value = response.json().await.unwrap();
    assert!(created.get("access_token").is_none());
    let id = created["id"].as_i64().unwrap();

    let fetched: Value = server
        .client
        .get(server.url(&format!("/users/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(fetched["email"], "new@example.com");
    assert_eq!(fetched["first_name"], "New");

    let response = server
        .client
        .patch(server.url(&format!("/users/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "first_name": "Renamed", "level": 2 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = response.json().await.unwrap();
    assert_eq!(updated["first_name"], "Renamed");
    assert_eq!(updated["level"], 2);
    assert_eq!(updated["email"], "new@example.com");

    // Updating to an email held by another active user conflicts.
    let response = server
        .client
        .patch(server.url(&format!("/users/{id}")))
        .bearer_auth(&token)
        .json(&json!({ "email": "admin@example.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_distinct_failures() {
    let server = TestServer::spawn().await;
    let (token, _) = server.signup("admin@example.com", Some(4)).await;

    let response = server
        .client
        .get(server.url("/users/not-a-number"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["error"], "invalid_id");

    let response = server
        .client
        .get(server.url("/users/999999"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let payload: Value = response.json().await.unwrap();
    assert_eq!(payload["error"], "not_found");
}
