mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use shortlink::api::dto::create_url::CreateUrlResponse;
use shortlink::api::dto::stats::StatsResponse;
use shortlink::routes::service_routes;
use std::sync::Arc;

fn make_server(app: &common::TestApp) -> TestServer {
    let router = service_routes()
        .layer(common::MockConnectInfoLayer)
        .with_state(app.state.clone());
    TestServer::new(router).unwrap()
}

async fn create_link(server: &TestServer, body: Value) -> CreateUrlResponse {
    let response = server.post("/api/v1/urls").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<CreateUrlResponse>()
}

// ─── CREATE ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_link() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let created = create_link(&server, json!({ "url": "https://example.com/long/path" })).await;

    assert_eq!(created.short_code.len(), 6);
    assert_eq!(
        created.short_url,
        format!("{}/{}", common::BASE_URL, created.short_code)
    );
    assert_eq!(created.original_url, "https://example.com/long/path");
    assert!(created.expires_at.is_none());
}

#[tokio::test]
async fn test_create_link_with_alias_and_expiry() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let created = create_link(
        &server,
        json!({
            "url": "https://example.com",
            "custom_alias": "my-docs",
            "expires_in_hours": 24,
            "created_by": "u1"
        }),
    )
    .await;

    assert_eq!(created.short_code, "my-docs");
    let expires_at = created.expires_at.unwrap();
    assert_eq!((expires_at - created.created_at).num_hours(), 24);
}

#[tokio::test]
async fn test_create_link_alias_taken() {
    let app = common::create_test_app();
    let server = make_server(&app);

    create_link(&server, json!({ "url": "https://example.com", "custom_alias": "taken" })).await;

    let response = server
        .post("/api/v1/urls")
        .json(&json!({ "url": "https://example.org", "custom_alias": "taken" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "alias_taken");
    assert_eq!(body["error"]["details"]["alias"], "taken");
}

#[tokio::test]
async fn test_create_link_rejects_bad_input() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let cases = [
        (json!({ "url": "ftp://example.com" }), "invalid_target"),
        (json!({ "url": "not-a-url" }), "invalid_target"),
        (json!({ "url": "https://example.com", "custom_alias": "a@b" }), "invalid_alias"),
        (json!({ "url": "https://example.com", "custom_alias": "ab" }), "invalid_alias"),
        (json!({ "url": "https://example.com", "expires_in_hours": -5 }), "validation_error"),
    ];

    for (body, code) in cases {
        let response = server.post("/api/v1/urls").json(&body).await;
        response.assert_status_bad_request();
        assert_eq!(response.json::<Value>()["error"]["code"], code, "body: {body}");
    }

    assert!(app.links.is_empty());
}

// ─── REDIRECT ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_redirect_success_queues_click() {
    let mut app = common::create_test_app();
    let server = make_server(&app);

    let created = create_link(&server, json!({ "url": "https://example.com/target" })).await;

    let response = server
        .get(&format!("/{}", created.short_code))
        .add_header("User-Agent", "Mozilla/5.0")
        .add_header("Referer", "https://google.com")
        .await;

    assert_eq!(response.status_code(), StatusCode::FOUND);
    assert_eq!(response.header("location"), "https://example.com/target");

    let job = app.click_rx.try_recv().unwrap();
    assert_eq!(job.code, created.short_code);
    assert_eq!(job.meta.client_ip.as_deref(), Some("127.0.0.1"));
    assert_eq!(job.meta.user_agent.as_deref(), Some("Mozilla/5.0"));
    assert_eq!(job.meta.referer.as_deref(), Some("https://google.com"));
}

#[tokio::test]
async fn test_redirect_by_alias_queues_canonical_code() {
    let mut app = common::create_test_app();
    let server = make_server(&app);

    create_link(&server, json!({ "url": "https://example.com", "custom_alias": "promo" })).await;

    let response = server.get("/promo").await;
    assert_eq!(response.status_code(), StatusCode::FOUND);

    assert_eq!(app.click_rx.try_recv().unwrap().code, "promo");
}

#[tokio::test]
async fn test_redirect_not_found() {
    let mut app = common::create_test_app();
    let server = make_server(&app);

    let response = server.get("/notfound").await;

    response.assert_status_not_found();
    assert_eq!(response.json::<Value>()["error"]["code"], "not_found");
    assert!(app.click_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_redirect_deleted_and_expired_are_gone() {
    let mut app = common::create_test_app();
    let server = make_server(&app);

    let deleted = create_link(&server, json!({ "url": "https://example.com" })).await;
    server
        .delete(&format!("/api/v1/urls/{}", deleted.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let response = server.get(&format!("/{}", deleted.short_code)).await;
    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "inactive");

    let expired = create_link(&server, json!({ "url": "https://example.com" })).await;
    server
        .patch(&format!("/api/v1/urls/{}", expired.id))
        .json(&json!({ "expires_at": "2000-01-01T00:00:00Z" }))
        .await
        .assert_status_ok();

    let response = server.get(&format!("/{}", expired.short_code)).await;
    response.assert_status(StatusCode::GONE);
    assert_eq!(response.json::<Value>()["error"]["code"], "expired");

    assert!(app.click_rx.try_recv().is_err());
}

// ─── UPDATE / DELETE ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_update_link_target() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let created = create_link(&server, json!({ "url": "https://example.com" })).await;

    let response = server
        .patch(&format!("/api/v1/urls/{}", created.id))
        .json(&json!({ "url": "https://example.org/new" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["original_url"], "https://example.org/new");
    assert_eq!(body["short_code"], created.short_code);

    let response = server.get(&format!("/{}", created.short_code)).await;
    assert_eq!(response.header("location"), "https://example.org/new");
}

#[tokio::test]
async fn test_update_null_expiry_clears_it() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let created = create_link(
        &server,
        json!({ "url": "https://example.com", "expires_in_hours": 1 }),
    )
    .await;
    assert!(created.expires_at.is_some());

    let response = server
        .patch(&format!("/api/v1/urls/{}", created.id))
        .json(&json!({ "expires_at": null }))
        .await;

    response.assert_status_ok();
    assert!(response.json::<Value>()["expires_at"].is_null());
}

#[tokio::test]
async fn test_update_errors() {
    let app = common::create_test_app();
    let server = make_server(&app);

    server
        .patch("/api/v1/urls/999")
        .json(&json!({ "url": "https://example.org" }))
        .await
        .assert_status_not_found();

    let created = create_link(&server, json!({ "url": "https://example.com" })).await;

    let response = server
        .patch(&format!("/api/v1/urls/{}", created.id))
        .json(&json!({ "url": "javascript:alert(1)" }))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "invalid_target");

    let response = server
        .patch(&format!("/api/v1/urls/{}", created.id))
        .json(&json!({}))
        .await;
    response.assert_status_bad_request();
    assert_eq!(response.json::<Value>()["error"]["code"], "validation_error");

    server
        .delete(&format!("/api/v1/urls/{}", created.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .patch(&format!("/api/v1/urls/{}", created.id))
        .json(&json!({ "url": "https://example.org" }))
        .await
        .assert_status(StatusCode::GONE);
}

#[tokio::test]
async fn test_delete_link_twice() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let created = create_link(&server, json!({ "url": "https://example.com" })).await;

    server
        .delete(&format!("/api/v1/urls/{}", created.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    server
        .delete(&format!("/api/v1/urls/{}", created.id))
        .await
        .assert_status_not_found();
}

// ─── STATS ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_stats_after_clicks() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let created = create_link(&server, json!({ "url": "https://example.com" })).await;

    for _ in 0..3 {
        app.state
            .stats_service
            .record_click(&created.short_code, Default::default())
            .await
            .unwrap();
    }

    let response = server
        .get(&format!("/api/v1/urls/{}/stats", created.short_code))
        .await;

    response.assert_status_ok();
    let stats = response.json::<StatsResponse>();
    assert_eq!(stats.link.clicks, 3);
    assert_eq!(stats.recorded_events, 3);
    assert_eq!(stats.recent_clicks.len(), 3);
    assert_eq!(stats.link.original_url, "https://example.com");
}

#[tokio::test]
async fn test_stats_not_found() {
    let app = common::create_test_app();
    let server = make_server(&app);

    server
        .get("/api/v1/urls/missing/stats")
        .await
        .assert_status_not_found();
}

// ─── HEALTH ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_endpoint_success() {
    let app = common::create_test_app();
    let server = make_server(&app);

    let response = server.get("/health").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["checks"]["database"]["status"], "ok");
    assert_eq!(json["checks"]["click_queue"]["status"], "ok");
    assert_eq!(json["checks"]["cache"]["status"], "ok");
    assert!(json.get("version").is_some());
}

#[tokio::test]
async fn test_health_degraded_when_cache_down() {
    let app = common::create_test_app_with_cache(Arc::new(common::FailingCache));
    let server = make_server(&app);

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    let json = response.json::<Value>();
    assert_eq!(json["status"], "degraded");
    assert_eq!(json["checks"]["cache"]["status"], "error");
    assert_eq!(json["checks"]["database"]["status"], "ok");
}

#[tokio::test]
async fn test_health_degraded_when_click_worker_gone() {
    let common::TestApp {
        state, click_rx, ..
    } = common::create_test_app();
    drop(click_rx);

    let router = service_routes()
        .layer(common::MockConnectInfoLayer)
        .with_state(state);
    let server = TestServer::new(router).unwrap();

    let response = server.get("/health").await;

    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(
        response.json::<Value>()["checks"]["click_queue"]["status"],
        "error"
    );
}
