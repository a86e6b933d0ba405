use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use shared::{
    domain::{GroupId, GroupSummary, PolicySummary, Resource, UserId, UserSummary},
    error::{ApiError, ErrorCode},
    protocol::{AddUserPolicyRequest, GroupMembershipRequest},
};
use tokio::sync::RwLock;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use crate::directory::Directory;

pub const API_PREFIX: &str = "/api/v1";
const MAX_REQUEST_BYTES: usize = 64 * 1024;

type ApiResponse<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

#[derive(Clone)]
pub struct AppState {
    directory: Arc<RwLock<Directory>>,
}

impl AppState {
    pub fn new(directory: Directory) -> Self {
        Self {
            directory: Arc::new(RwLock::new(directory)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct GroupPath {
    group_id: String,
}

#[derive(Debug, Deserialize)]
struct UserPath {
    user_id: String,
}

pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/users", get(list_users))
        .route("/users/:user_id", get(get_user))
        .route("/users/:user_id/groups", get(list_user_groups))
        .route(
            "/users/:user_id/policies",
            get(list_user_policies).post(add_user_policy),
        )
        .route("/groups", get(list_groups))
        .route("/groups/:group_id", get(get_group))
        .route("/groups/:group_id/add-user", post(add_user_to_group))
        .route("/groups/:group_id/remove-user", post(remove_user_from_group));

    Router::new()
        .route("/healthz", get(healthz))
        .nest(API_PREFIX, api)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BYTES))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

async fn list_users(State(state): State<AppState>) -> Json<Vec<UserSummary>> {
    Json(state.directory.read().await.list_users())
}

async fn get_user(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> ApiResponse<UserSummary> {
    let user = UserId::new(path.user_id);
    state
        .directory
        .read()
        .await
        .user(&user)
        .map(Json)
        .map_err(reject)
}

async fn list_user_groups(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> ApiResponse<Vec<Resource>> {
    let user = UserId::new(path.user_id);
    state
        .directory
        .read()
        .await
        .user_groups(&user)
        .map(Json)
        .map_err(reject)
}

async fn list_user_policies(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
) -> ApiResponse<Vec<PolicySummary>> {
    let user = UserId::new(path.user_id);
    state
        .directory
        .read()
        .await
        .user_policies(&user)
        .map(Json)
        .map_err(reject)
}

async fn add_user_policy(
    State(state): State<AppState>,
    Path(path): Path<UserPath>,
    Json(req): Json<AddUserPolicyRequest>,
) -> ApiResponse<PolicySummary> {
    let user = UserId::new(path.user_id);
    let policy = state
        .directory
        .write()
        .await
        .add_user_policy(&user, &req.name, &req.policy)
        .map_err(reject)?;
    info!(user = %user, policy = %policy.name, "policy attached");
    Ok(Json(policy))
}

async fn list_groups(State(state): State<AppState>) -> Json<Vec<Resource>> {
    Json(state.directory.read().await.list_groups())
}

async fn get_group(
    State(state): State<AppState>,
    Path(path): Path<GroupPath>,
) -> ApiResponse<GroupSummary> {
    let group = GroupId::new(path.group_id);
    state
        .directory
        .read()
        .await
        .group(&group)
        .map(Json)
        .map_err(reject)
}

async fn add_user_to_group(
    State(state): State<AppState>,
    Path(path): Path<GroupPath>,
    Json(req): Json<GroupMembershipRequest>,
) -> ApiResponse<GroupSummary> {
    let group = GroupId::new(path.group_id);
    let summary = state
        .directory
        .write()
        .await
        .add_user_to_group(&group, &req.user)
        .map_err(reject)?;
    info!(group = %group, user = %req.user, "user added to group");
    Ok(Json(summary))
}

async fn remove_user_from_group(
    State(state): State<AppState>,
    Path(path): Path<GroupPath>,
    Json(req): Json<GroupMembershipRequest>,
) -> ApiResponse<GroupSummary> {
    let group = GroupId::new(path.group_id);
    let summary = state
        .directory
        .write()
        .await
        .remove_user_from_group(&group, &req.user)
        .map_err(reject)?;
    info!(group = %group, user = %req.user, "user removed from group");
    Ok(Json(summary))
}

fn reject(error: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = match error.code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(error))
}

#[cfg(test)]
#[path = "tests/routes_tests.rs"]
mod tests;
