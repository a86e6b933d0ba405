use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use crate::domain::UserId;

/// Body of `POST /groups/{group}/add-user` and `POST /groups/{group}/remove-user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMembershipRequest {
    pub user: UserId,
}

/// Body of `POST /users/{user}/policies`.
///
/// `policy` travels as the raw text the operator typed; the server is the one
/// that decides whether it is a valid policy document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddUserPolicyRequest {
    pub name: String,
    pub policy: String,
}

/// Percent-encodes an id for use as a single path segment, so reserved
/// characters such as `/`, `?` and `#` cannot address a different route.
pub fn path_segment(id: &str) -> Cow<'_, str> {
    urlencoding::encode(id)
}

pub fn groups_route() -> &'static str {
    "/groups"
}

pub fn user_route(user: &UserId) -> String {
    format!("/users/{}", path_segment(user.as_str()))
}

pub fn user_groups_route(user: &UserId) -> String {
    format!("{}/groups", user_route(user))
}

pub fn add_user_to_group_route(group: &str) -> String {
    format!("/groups/{}/add-user", path_segment(group))
}

pub fn remove_user_from_group_route(group: &str) -> String {
    format!("/groups/{}/remove-user", path_segment(group))
}

pub fn user_policies_route(user: &UserId) -> String {
    format!("{}/policies", user_route(user))
}
