//! End-to-end HTTP tests
//!
//! Drive the composed router against the in-memory store.

use api::app;
use auth::AuthConfig;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use exchange::{ExchangeConfig, MemoryStore};
use serde_json::{Value, json};
use tower::ServiceExt;

const DEMO_KEY: &str = "swap-demo-key";

fn test_app() -> Router {
    let store = MemoryStore::new();
    app(
        store.clone(),
        store,
        AuthConfig::development(),
        ExchangeConfig::development(DEMO_KEY),
    )
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let res = app.clone().oneshot(req).await.unwrap();
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn request(method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

struct Member {
    id: String,
    token: String,
}

async fn sign_up(app: &Router, email: &str, name: &str) -> Member {
    let (status, body) = send(
        app,
        request(
            "POST",
            "/auth/signup",
            None,
            Some(json!({"email": email, "password": "Guitar#Lessons42", "name": name})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["credits"], 100);

    Member {
        id: body["id"].as_str().unwrap().to_string(),
        token: body["token"].as_str().unwrap().to_string(),
    }
}

async fn balance(app: &Router, member: &Member) -> Value {
    let (status, body) = send(
        app,
        request("GET", "/api/credits/balance", Some(&member.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let (status, body) = send(&app, request("GET", "/health", None, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].is_u64());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_lesson_moves_credits_and_collects_review() {
    let app = test_app();
    let alice = sign_up(&app, "alice@example.com", "Alice").await;
    let bob = sign_up(&app, "bob@example.com", "Bob").await;

    // Alice lists a skill
    let (status, skill) = send(
        &app,
        request(
            "POST",
            &format!("/api/user/{}/skills", alice.id),
            Some(&alice.token),
            Some(json!({"name": "Guitar", "description": "Acoustic basics"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let skill_id = skill["id"].as_str().unwrap().to_string();

    let (_, listings) = send(&app, request("GET", "/api/skills", None, None)).await;
    assert_eq!(listings[0]["teacherName"], "Alice");
    assert_eq!(listings[0]["teacherEmail"], "alice@example.com");

    // Bob books it, Alice accepts
    let (status, session) = send(
        &app,
        request(
            "POST",
            "/api/sessions",
            Some(&bob.token),
            Some(json!({"skillId": skill_id, "teacherId": alice.id})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(session["status"], "pending");
    let session_uri = format!("/api/sessions/{}", session["id"].as_str().unwrap());

    let (status, _) = send(
        &app,
        request("PUT", &session_uri, Some(&bob.token), Some(json!({"status": "accepted"}))),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        request("PUT", &session_uri, Some(&alice.token), Some(json!({"status": "accepted"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "accepted");

    // Bob completes it
    let (status, body) = send(
        &app,
        request("PUT", &session_uri, Some(&bob.token), Some(json!({"status": "completed"}))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert!(body["completedAt"].is_string());

    let (status, _) = send(
        &app,
        request("PUT", &session_uri, Some(&alice.token), Some(json!({"status": "completed"}))),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    assert_eq!(balance(&app, &alice).await["balance"], 105);
    let bob_balance = balance(&app, &bob).await;
    assert_eq!(bob_balance["balance"], 95);
    assert_eq!(bob_balance["spent"], 5);

    let (_, profile) = send(&app, request("GET", "/auth/verify", Some(&alice.token), None)).await;
    assert_eq!(profile["credits"], 105);
    assert_eq!(profile["skills"][0]["name"], "Guitar");

    let (_, history) = send(
        &app,
        request("GET", "/api/credits/history", Some(&bob.token), None),
    )
    .await;
    assert_eq!(history["total"], 2);
    assert_eq!(history["transactions"][0]["type"], "spend");
    assert_eq!(history["transactions"][0]["reason"], "Learned Guitar");

    // Bob reviews Alice, once
    let review = json!({
        "sessionId": session["id"],
        "rating": 4,
        "text": "Clear and patient",
    });
    let (status, _) = send(
        &app,
        request("POST", "/api/reviews", Some(&bob.token), Some(review.clone())),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = send(
        &app,
        request("POST", "/api/reviews", Some(&bob.token), Some(review)),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, reviews) = send(
        &app,
        request("GET", &format!("/api/reviews/{}", alice.id), None, None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(reviews["totalReviews"], 1);
    assert_eq!(reviews["averageRating"], "4.0");
    assert_eq!(reviews["reviews"][0]["text"], "Clear and patient");
    assert!(!reviews.to_string().contains(&bob.id));

    let (_, sessions) = send(&app, request("GET", "/api/sessions", Some(&alice.token), None)).await;
    assert_eq!(sessions[0]["learnerName"], "Bob");
    assert_eq!(sessions[0]["skillName"], "Guitar");
}

async fn assert_untouched(app: &Router, members: [&Member; 2], step: &str) {
    for member in members {
        let body = balance(app, member).await;
        assert_eq!(body["balance"], 100, "after {step}");
        assert_eq!(body["activeEarned"], 100, "after {step}");
        assert_eq!(body["spent"], 0, "after {step}");
    }
}

#[tokio::test]
async fn test_only_completion_moves_credits() {
    let app = test_app();
    let alice = sign_up(&app, "alice@example.com", "Alice").await;
    let bob = sign_up(&app, "bob@example.com", "Bob").await;
    let both = [&alice, &bob];
    assert_untouched(&app, both, "signup").await;

    let skills_uri = format!("/api/user/{}/skills", alice.id);
    let (status, skill) = send(
        &app,
        request(
            "POST",
            &skills_uri,
            Some(&alice.token),
            Some(json!({"name": "Guitar", "description": "Acoustic basics"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let skill_id = skill["id"].as_str().unwrap().to_string();
    assert_untouched(&app, both, "skill add").await;

    let mut session_uris = Vec::new();
    for _ in 0..2 {
        let (status, session) = send(
            &app,
            request(
                "POST",
                "/api/sessions",
                Some(&bob.token),
                Some(json!({"skillId": skill_id, "teacherId": alice.id})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        session_uris.push(format!("/api/sessions/{}", session["id"].as_str().unwrap()));
    }
    assert_untouched(&app, both, "session request").await;

    for (uri, status) in session_uris.iter().zip(["accepted", "rejected"]) {
        let (code, _) = send(
            &app,
            request("PUT", uri, Some(&alice.token), Some(json!({"status": status}))),
        )
        .await;
        assert_eq!(code, StatusCode::OK);
        assert_untouched(&app, both, status).await;
    }

    let (status, message) = send(
        &app,
        request(
            "POST",
            "/api/messages",
            Some(&bob.token),
            Some(json!({"receiverId": alice.id, "text": "See you Saturday"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_untouched(&app, both, "message send").await;

    let read_uri = format!("/api/messages/{}/read", message["id"].as_str().unwrap());
    let (status, _) = send(&app, request("PUT", &read_uri, Some(&alice.token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_untouched(&app, both, "mark read").await;

    let (status, _) = send(
        &app,
        request(
            "DELETE",
            &format!("{skills_uri}/{skill_id}"),
            Some(&alice.token),
            None,
        ),
    )
    .await;
    assert!(status.is_success());
    assert_untouched(&app, both, "skill delete").await;

    let (_, history) = send(
        &app,
        request("GET", "/api/credits/history", Some(&bob.token), None),
    )
    .await;
    assert_eq!(history["total"], 1);

    // Completing the accepted lesson is what finally moves credits
    let (status, _) = send(
        &app,
        request(
            "PUT",
            &session_uris[0],
            Some(&bob.token),
            Some(json!({"status": "completed"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(balance(&app, &alice).await["balance"], 105);
    assert_eq!(balance(&app, &bob).await["balance"], 95);
}

#[tokio::test]
async fn test_direct_messages() {
    let app = test_app();
    let alice = sign_up(&app, "alice@example.com", "Alice").await;
    let bob = sign_up(&app, "bob@example.com", "Bob").await;

    let (status, message) = send(
        &app,
        request(
            "POST",
            "/api/messages",
            Some(&bob.token),
            Some(json!({"receiverId": alice.id, "text": "Free on Saturday?"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(message["read"], false);
    let message_id = message["id"].as_str().unwrap().to_string();

    let (_, inbox) = send(&app, request("GET", "/api/messages", Some(&alice.token), None)).await;
    assert_eq!(inbox["unreadCount"], 1);
    assert_eq!(inbox["messages"][0]["senderName"], "Bob");

    let read_uri = format!("/api/messages/{message_id}/read");
    let (status, _) = send(&app, request("PUT", &read_uri, Some(&bob.token), None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, request("PUT", &read_uri, Some(&alice.token), None)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, inbox) = send(&app, request("GET", "/api/messages", Some(&alice.token), None)).await;
    assert_eq!(inbox["unreadCount"], 0);

    let (status, thread) = send(
        &app,
        request("GET", &format!("/api/messages/{}", bob.id), Some(&alice.token), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(thread["messages"][0]["text"], "Free on Saturday?");

    let (status, _) = send(
        &app,
        request(
            "POST",
            "/api/messages",
            Some(&alice.token),
            Some(json!({"receiverId": alice.id, "text": "note to self"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_demo_reset_seeds_loginable_users() {
    let app = test_app();

    let (status, _) = send(&app, request("POST", "/api/reset-demo", None, None)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let req = Request::post("/api/reset-demo")
        .header("x-demo-key", DEMO_KEY)
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], 3);
    assert_eq!(body["skills"], 6);

    let (status, body) = send(
        &app,
        request(
            "POST",
            "/auth/login",
            None,
            Some(json!({"email": "alice@example.com", "password": "Demo#Swap2024"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Alice Johnson");
    assert_eq!(body["credits"], 100);

    let (_, listings) = send(&app, request("GET", "/api/skills", None, None)).await;
    assert_eq!(listings.as_array().unwrap().len(), 6);
}

#[tokio::test]
async fn test_errors_are_json() {
    let app = test_app();

    let (status, body) = send(&app, request("GET", "/api/credits/balance", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], 401);
    assert!(body["error"].is_string());

    let alice = sign_up(&app, "alice@example.com", "Alice").await;
    let (status, body) = send(
        &app,
        request(
            "POST",
            "/auth/signup",
            None,
            Some(json!({"email": "ALICE@example.com", "password": "Guitar#Lessons42", "name": "Again"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["status"], 409);

    let (status, _) = send(
        &app,
        request(
            "GET",
            "/api/credits/history?limit=0",
            Some(&alice.token),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
