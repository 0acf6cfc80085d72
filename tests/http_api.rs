mod common;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use helpa_marketplace_api::{middleware::auth::PAYMENT_SECRET_HEADER, routes::create_app};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use common::{bearer, provider_with_service, subscribed_customer, test_state};

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
    };
    (status, body)
}

fn json_request(method: &str, uri: &str, body: Value, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

#[tokio::test]
async fn health_reports_store_status() {
    let app = create_app(test_state());
    let (status, body) = send(
        &app,
        Request::get("/health").body(Body::empty()).expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["store"], "ok");
}

#[tokio::test]
async fn chat_works_anonymously_and_signed_in() {
    let app = create_app(test_state());

    let (status, body) = send(
        &app,
        Request::post("/api/chat/init").body(Body::empty()).expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["quick_actions"][0]["id"], "SIGN_IN");

    let customer_id = Uuid::new_v4();
    let auth = bearer(customer_id, Some("Amaka"));
    let (status, body) = send(&app, json_request("POST", "/api/chat/init", json!({}), Some(&auth))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["welcome_text"].as_str().unwrap_or_default().contains("Amaka"));
    let session_id = body["data"]["session_id"].as_str().expect("session id").to_string();

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/chat/message",
            json!({ "session_id": session_id, "action_id": "GET_RECIPES" }),
            Some(&auth),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["response_text"].is_string());

    let history = format!("/api/chat/history/{session_id}");
    let (status, body) = send(
        &app,
        Request::get(&history)
            .header(header::AUTHORIZATION, &auth)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["messages"].as_array().map(Vec::len), Some(3));

    // The session is bound to Amaka: no token or someone else's token is refused.
    let (status, _) = send(&app, Request::get(&history).body(Body::empty()).expect("request")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let stranger = bearer(Uuid::new_v4(), None);
    let (status, _) = send(
        &app,
        Request::get(&history)
            .header(header::AUTHORIZATION, &stranger)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/chat/message",
            json!({ "session_id": session_id, "action_id": "MAIN_MENU" }),
            Some(&stranger),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &app,
        json_request(
            "POST",
            "/api/chat/message",
            json!({ "session_id": Uuid::new_v4(), "message": "hi" }),
            None,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = create_app(test_state());

    let (status, _) = send(&app, Request::get("/api/cart").body(Body::empty()).expect("request")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Request::get("/api/providers/me")
            .header(header::AUTHORIZATION, "Bearer not-a-jwt")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn escrow_lifecycle_over_http() {
    let state = test_state();
    let callback_secret = state.config.payment_callback_secret.clone();
    let (provider_id, service) = provider_with_service(&state, "moving", 40_000).await;
    let customer_id = subscribed_customer(&state).await;
    let app = create_app(state);
    let auth = bearer(customer_id, None);

    let (status, body) = send(
        &app,
        json_request(
            "POST",
            "/api/bookings",
            json!({ "service_id": service.id, "description": "Two bedroom flat" }),
            Some(&auth),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let escrow_id = body["data"]["escrow"]["id"].as_str().expect("escrow id").to_string();
    assert_eq!(body["data"]["escrow"]["provider_id"], provider_id.to_string());

    let lock_uri = format!("/api/escrow/{escrow_id}/lock");
    let (status, _) = send(&app, Request::post(&lock_uri).body(Body::empty()).expect("request")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(
        &app,
        Request::post(&lock_uri)
            .header(PAYMENT_SECRET_HEADER, callback_secret.as_str())
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "locked");

    let (status, _) = send(
        &app,
        Request::post(&lock_uri)
            .header(PAYMENT_SECRET_HEADER, callback_secret.as_str())
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let stranger = bearer(Uuid::new_v4(), None);
    let release_uri = format!("/api/escrow/{escrow_id}/release");
    let (status, _) = send(
        &app,
        Request::post(&release_uri)
            .header(header::AUTHORIZATION, stranger)
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Request::post(&release_uri)
            .header(header::AUTHORIZATION, auth.as_str())
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "released");
    assert_eq!(body["data"]["metadata"]["commission"], 2_000);
    assert_eq!(body["data"]["metadata"]["provider_amount"], 38_000);
}

#[tokio::test]
async fn search_rejects_unknown_categories() {
    let state = test_state();
    provider_with_service(&state, "beauty", 7_500).await;
    let app = create_app(state);

    let (status, body) = send(
        &app,
        Request::get("/api/services/search?category=beauty&max_price=8000")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().map(Vec::len), Some(1));

    let (status, _) = send(
        &app,
        Request::get("/api/services/search?category=astrology")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_paths_get_a_json_404_with_request_id() {
    let app = create_app(test_state());
    let response = app
        .clone()
        .oneshot(Request::get("/nowhere").body(Body::empty()).expect("request"))
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(response.headers().contains_key("x-request-id"));
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    let body: Value = serde_json::from_slice(&bytes).expect("json");
    assert_eq!(body["data"]["path"], "/nowhere");
}

#[tokio::test]
async fn webhook_verification_needs_a_configured_channel() {
    let app = create_app(test_state());
    let (status, _) = send(
        &app,
        Request::get("/webhook?hub.mode=subscribe&hub.verify_token=x&hub.challenge=42")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn webhook_messages_start_and_continue_a_session() {
    let app = create_app(test_state());
    let payload = |id: &str, body: &str| {
        json!({
            "object": "whatsapp_business_account",
            "entry": [{
                "changes": [{
                    "value": {
                        "messages": [{
                            "from": "2348000000000",
                            "id": id,
                            "type": "text",
                            "text": { "body": body }
                        }]
                    }
                }]
            }]
        })
    };

    let (status, body) = send(&app, json_request("POST", "/webhook", payload("wamid.1", "hello"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["received"], 1);
    assert_eq!(body["data"]["failed"], 0);

    let (status, body) = send(&app, json_request("POST", "/webhook", payload("wamid.2", "I need a cleaner"), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["failed"], 0);
}
