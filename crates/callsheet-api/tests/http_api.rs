use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use callsheet_api::auth::{self, AppState, AppStateInner};
use callsheet_api::routes;
use callsheet_db::Database;

const ADMIN_EMAIL: &str = "admin@dreammaker.fr";
const ADMIN_PASSWORD: &str = "admin123";

fn test_app() -> Router {
    let db = Database::open_in_memory().unwrap();
    auth::seed_admin(&db, ADMIN_EMAIL, ADMIN_PASSWORD).unwrap();

    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret: "test-secret".to_string(),
        mailer: None,
        admin_email: ADMIN_EMAIL.to_string(),
    });

    routes::router(state)
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

async fn post_json(app: &Router, path: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, req).await
}

async fn get_authed(app: &Router, path: &str, token: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .uri(path)
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn login(app: &Router) -> String {
    let (status, body) = post_json(
        app,
        "/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn contact_intake_then_listed_newest_first() {
    let app = test_app();

    let (status, body) = post_json(
        &app,
        "/contacts",
        json!({ "fullName": "A", "email": "a@b.com", "message": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Message sent successfully");

    let (status, _) = post_json(
        &app,
        "/contacts",
        json!({ "fullName": "B", "email": "b@b.com", "phone": "0612345678", "message": "later" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let token = login(&app).await;
    let (status, body) = get_authed(&app, "/contacts", &token).await;
    assert_eq!(status, StatusCode::OK);

    let contacts = body.as_array().unwrap();
    assert_eq!(contacts.len(), 2);
    // Newest first
    assert_eq!(contacts[0]["fullName"], "B");
    assert_eq!(contacts[0]["phone"], "0612345678");
    assert_eq!(contacts[1]["fullName"], "A");
    // Server-assigned fields are present
    assert!(contacts[0]["id"].as_i64().unwrap() > contacts[1]["id"].as_i64().unwrap());
    assert!(contacts[0]["createdAt"].as_str().is_some());
}

#[tokio::test]
async fn invalid_contact_is_rejected_and_not_stored() {
    let app = test_app();

    // Missing email
    let (status, body) = post_json(
        &app,
        "/contacts",
        json!({ "fullName": "A", "message": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid input");

    // Malformed email collapses to the same contact-schema failure
    let (status, body) = post_json(
        &app,
        "/contacts",
        json!({ "fullName": "A", "email": "nope", "message": "hi" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid input");

    let token = login(&app).await;
    let (_, body) = get_authed(&app, "/contacts", &token).await;
    assert_eq!(body.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn unparseable_bodies_still_get_the_envelope() {
    let app = test_app();

    // Syntactically broken JSON
    let req = Request::builder()
        .method("POST")
        .uri("/contacts")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid input");

    let req = Request::builder()
        .method("POST")
        .uri("/subscribers")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid email");

    // Missing Content-Type
    let req = Request::builder()
        .method("POST")
        .uri("/contacts")
        .body(Body::from(
            json!({ "fullName": "A", "email": "a@b.com", "message": "hi" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn duplicate_subscription_is_informational() {
    let app = test_app();

    let (status, body) = post_json(&app, "/subscribers", json!({ "email": "x@y.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (status, body) = post_json(&app, "/subscribers", json!({ "email": "x@y.com" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "info");
    assert_eq!(body["message"], "You are already subscribed to the newsletter");

    let token = login(&app).await;
    let (_, body) = get_authed(&app, "/subscribers", &token).await;
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_subscription_email_is_rejected() {
    let app = test_app();

    let (status, body) = post_json(&app, "/subscribers", json!({ "email": "not-an-email" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid email");

    let (status, _) = post_json(&app, "/subscribers", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn export_is_csv_attachment() {
    let app = test_app();

    for email in ["a@y.com", "b@y.com"] {
        let (status, _) = post_json(&app, "/subscribers", json!({ "email": email })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let token = login(&app).await;
    let req = Request::builder()
        .uri("/subscribers/export")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "text/csv");
    assert_eq!(
        resp.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=newsletter-subscribers.csv"
    );

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "id,email,subscribedAt");
    // Newest first: b@y.com subscribed last
    assert!(lines[1].contains("\"b@y.com\""));
    assert!(lines[2].contains("\"a@y.com\""));
}

#[tokio::test]
async fn export_with_no_subscribers_is_header_only() {
    let app = test_app();
    let token = login(&app).await;

    let req = Request::builder()
        .uri("/subscribers/export")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"id,email,subscribedAt\n");
}

#[tokio::test]
async fn archive_hides_message_from_list() {
    let app = test_app();

    post_json(
        &app,
        "/contacts",
        json!({ "fullName": "A", "email": "a@b.com", "message": "keep" }),
    )
    .await;
    post_json(
        &app,
        "/contacts",
        json!({ "fullName": "B", "email": "b@b.com", "message": "archive me" }),
    )
    .await;

    let token = login(&app).await;
    let (_, body) = get_authed(&app, "/contacts", &token).await;
    let target = body.as_array().unwrap()[0]["id"].as_i64().unwrap();

    let req = Request::builder()
        .method("POST")
        .uri(format!("/contacts/{}/archive", target))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");

    let (_, body) = get_authed(&app, "/contacts", &token).await;
    let remaining = body.as_array().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0]["fullName"], "A");

    // Unknown id
    let req = Request::builder()
        .method("POST")
        .uri("/contacts/9999/archive")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_subscriber_is_persisted() {
    let app = test_app();

    post_json(&app, "/subscribers", json!({ "email": "x@y.com" })).await;

    let token = login(&app).await;
    let (_, body) = get_authed(&app, "/subscribers", &token).await;
    let id = body.as_array().unwrap()[0]["id"].as_i64().unwrap();

    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/subscribers/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get_authed(&app, "/subscribers", &token).await;
    assert_eq!(body.as_array().unwrap().len(), 0);

    // Deleting again is a 404, not a silent success
    let req = Request::builder()
        .method("DELETE")
        .uri(format!("/subscribers/{}", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn login_failures_are_generic() {
    let app = test_app();

    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect credentials. Please try again.");

    // Unknown email gets the identical message
    let (status, body) = post_json(
        &app,
        "/auth/login",
        json!({ "email": "nobody@dreammaker.fr", "password": ADMIN_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect credentials. Please try again.");
}

#[tokio::test]
async fn admin_routes_require_a_valid_token() {
    let app = test_app();

    let req = Request::builder().uri("/contacts").body(Body::empty()).unwrap();
    let (status, _) = send(&app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_authed(&app, "/subscribers", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_authed(&app, "/analytics", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn analytics_returns_the_static_snapshot() {
    let app = test_app();
    let token = login(&app).await;

    let (status, body) = get_authed(&app, "/analytics", &token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pageViews"], 12845);
    assert_eq!(body["uniqueVisitors"], 5732);
    assert_eq!(body["bounceRate"], "42.3%");
    assert_eq!(body["topPages"].as_array().unwrap().len(), 4);
}

#[tokio::test]
async fn password_reset_requires_an_email() {
    let app = test_app();

    let (status, body) = post_json(&app, "/auth/password-reset", json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, body) = post_json(
        &app,
        "/auth/password-reset",
        json!({ "email": "someone@dreammaker.fr" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn reply_without_a_configured_mailer_is_unavailable() {
    let app = test_app();

    post_json(
        &app,
        "/contacts",
        json!({ "fullName": "A", "email": "a@b.com", "message": "hi" }),
    )
    .await;

    let token = login(&app).await;
    let (_, body) = get_authed(&app, "/contacts", &token).await;
    let id = body.as_array().unwrap()[0]["id"].as_i64().unwrap();

    let req = Request::builder()
        .method("POST")
        .uri(format!("/contacts/{}/reply", id))
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({ "subject": "Re: hi", "message": "<p>Thanks!</p>" }).to_string(),
        ))
        .unwrap();
    let (status, body) = send(&app, req).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn preflight_gets_cors_headers_and_no_body() {
    let app = test_app();

    let req = Request::builder()
        .method("OPTIONS")
        .uri("/contacts")
        .header(header::ORIGIN, "http://localhost:5173")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();

    assert!(resp.status().is_success());
    let headers = resp.headers();
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:5173"
    );
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    assert_eq!(headers[header::ACCESS_CONTROL_MAX_AGE], "86400");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST"));
    assert!(methods.contains("GET"));

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    assert!(bytes.is_empty());
}

#[tokio::test]
async fn responses_carry_the_request_origin() {
    let app = test_app();

    let req = Request::builder()
        .method("POST")
        .uri("/subscribers")
        .header(header::ORIGIN, "https://dreamaker-productions.com")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "email": "x@y.com" }).to_string()))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "https://dreamaker-productions.com"
    );
}
