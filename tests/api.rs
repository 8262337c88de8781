//! End-to-end tests over the compiled router.

use axum::http::StatusCode;
use serde_json::json;

use wayfare::AppConfig;

mod common;
use common::{call, call_with_headers, test_router};

#[tokio::test]
async fn nested_paths_route_to_distinct_handlers() {
    let (router, _, _) = test_router(AppConfig::default());

    call(&router, "/user/u1/create", "{}").await;
    call(&router, "/journey/42/create", r#"{"user_id":"u1"}"#).await;

    // get and complete are different endpoints under the same prefix.
    let (status, body) = call(&router, "/journey/42/get", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finished"], json!(false));

    let (status, body) = call(&router, "/journey/42/complete", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["finished"], json!(true));

    // Unknown action under a known prefix reaches no handler.
    let (status, _) = call(&router, "/journey/42/unknown", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn crud_round_trip_with_envelopes() {
    let (router, _, _) = test_router(AppConfig::default());

    let (status, body) = call(
        &router,
        "/room/r1/create",
        r#"{"name":"lab","pose":{"x":1,"y":2,"z":3}}"#,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], json!("r1"));
    assert_eq!(body["pose"]["z"], json!(3));

    let (status, body) = call(&router, "/room/r1/create", "{}").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], json!("room already exists"));

    let (status, body) = call(&router, "/room/r1/delete", "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"success": true}));

    let (status, body) = call(&router, "/room/r1/delete", "").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("room does not exist"));
}

#[tokio::test]
async fn patch_applies_present_fields_only() {
    let (router, _, _) = test_router(AppConfig::default());

    call(
        &router,
        "/user/u1/create",
        r#"{"first_name":"old","likes":["a","b"]}"#,
    )
    .await;

    let (status, body) = call(&router, "/user/u1/set", r#"{"first_name":"X"}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["first_name"], json!("X"));
    assert_eq!(body["likes"], json!(["a", "b"]));
    assert_eq!(body["id"], json!("u1"));
}

#[tokio::test]
async fn patch_error_paths_leave_record_untouched() {
    let (router, _, _) = test_router(AppConfig::default());
    call(&router, "/user/u1/create", r#"{"first_name":"old"}"#).await;

    let (status, body) = call(&router, "/user/u1/set", r#"{"id":"u2"}"#).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], json!("field \"id\" is immutable"));

    let (status, _) = call(&router, "/user/u1/set", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = call(&router, "/user/u1/get", "").await;
    assert_eq!(body["first_name"], json!("old"));
}

#[tokio::test]
async fn journey_start_publishes_once() {
    let (router, _, notifier) = test_router(AppConfig::default());

    call(&router, "/user/u1/create", "{}").await;
    call(&router, "/journey/j1/create", r#"{"user_id":"u1"}"#).await;
    call(&router, "/trip/t1/create", r#"{"journey_id":"j1"}"#).await;
    call(&router, "/trip/t1/start", "").await;

    let (status, body) = call(&router, "/journey/j1/start", "").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["start_at"].as_i64().unwrap() > 0);

    let published = notifier.published.lock().unwrap();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].0, "journeys");
    assert_eq!(
        published[0].1,
        json!({"user_id": "u1", "journey_id": "j1"})
    );
}

#[tokio::test]
async fn api_key_gate_blocks_without_side_effects() {
    let mut config = AppConfig::default();
    config.api_key = Some("secret".into());
    let (router, _, _) = test_router(config);

    let (status, body) = call(&router, "/user/u1/create", "{}").await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, json!({"error": "forbidden"}));

    // The rejected create never reached the store.
    let (status, body) =
        call_with_headers(&router, "/user/u1/get", "", &[("x-api-key", "secret")]).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], json!("user does not exist"));

    let (status, _) =
        call_with_headers(&router, "/user/u1/create", "{}", &[("x-api-key", "secret")]).await;
    assert_eq!(status, StatusCode::OK);
}
