use super::*;
use axum::{
    body::{to_bytes, Body},
    http::Request,
    response::Response,
};
use serde_json::{json, Value};
use tower::ServiceExt;

fn test_app() -> Router {
    build_router(AppState::new(Directory::with_demo_data()))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    let body = body.to_string();
    Request::post(uri)
        .header("content-type", "application/json")
        .header("content-length", body.len())
        .body(Body::from(body))
        .expect("request")
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).expect("request")
}

async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn lists_groups_as_id_name_pairs() {
    let response = test_app().oneshot(get("/api/v1/groups")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!([{ "id": "1", "name": "admins" }, { "id": "2", "name": "ops" }])
    );
}

#[tokio::test]
async fn add_user_then_list_user_groups() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/groups/1/add-user",
            json!({ "user": "charles" }),
        ))
        .await
        .expect("add");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/v1/users/charles/groups"))
        .await
        .expect("list");
    assert_eq!(
        json_body(response).await,
        json!([{ "id": "1", "name": "admins" }])
    );
}

#[tokio::test]
async fn unknown_group_is_not_found() {
    let response = test_app()
        .oneshot(post_json(
            "/api/v1/groups/99/add-user",
            json!({ "user": "charles" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(response).await["code"], "not_found");
}

#[tokio::test]
async fn invalid_policy_is_rejected() {
    let response = test_app()
        .oneshot(post_json(
            "/api/v1/users/charles/policies",
            json!({ "name": "myserver", "policy": "not json" }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn policy_is_listed_after_creation() {
    let app = test_app();

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/v1/users/charles/policies",
            json!({ "name": "myserver", "policy": "{\"Statement\": []}" }),
        ))
        .await
        .expect("create");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(get("/api/v1/users/charles/policies"))
        .await
        .expect("list");
    assert_eq!(
        json_body(response).await,
        json!([{ "id": "1", "name": "myserver", "policy": { "Statement": [] } }])
    );
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let policy = "x".repeat(MAX_REQUEST_BYTES + 1);
    let response = test_app()
        .oneshot(post_json(
            "/api/v1/users/charles/policies",
            json!({ "name": "big", "policy": policy }),
        ))
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn healthz_is_outside_api_prefix() {
    let response = test_app().oneshot(get("/healthz")).await.expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}
