//! In-memory user/group/policy directory behind the dev API.

use serde_json::Value;
use shared::{
    domain::{GroupId, GroupSummary, PolicyId, PolicySummary, Resource, UserId, UserSummary},
    error::{ApiError, ErrorCode},
};

/// Width of the `policy.name` storage column.
pub const MAX_POLICY_NAME_LEN: usize = 128;

#[derive(Debug, Clone)]
struct UserRecord {
    id: UserId,
    username: String,
    groups: Vec<GroupId>,
}

#[derive(Debug, Clone)]
struct GroupRecord {
    id: GroupId,
    name: String,
    users: Vec<UserId>,
}

#[derive(Debug, Clone)]
struct PolicyRecord {
    id: PolicyId,
    user: UserId,
    name: String,
    policy: Value,
}

#[derive(Debug, Default)]
pub struct Directory {
    users: Vec<UserRecord>,
    groups: Vec<GroupRecord>,
    policies: Vec<PolicyRecord>,
    next_policy_id: u64,
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The fixture used for local runs: two users and two groups.
    pub fn with_demo_data() -> Self {
        let mut directory = Self::new();
        directory.create_user("charles");
        directory.create_user("freddy");
        directory.create_group("1", "admins");
        directory.create_group("2", "ops");
        directory
    }

    pub fn create_user(&mut self, username: &str) -> UserId {
        let id = UserId::from(username);
        if self.user_index(&id).is_none() {
            self.users.push(UserRecord {
                id: id.clone(),
                username: username.to_string(),
                groups: Vec::new(),
            });
        }
        id
    }

    pub fn create_group(&mut self, id: &str, name: &str) -> GroupId {
        let id = GroupId::from(id);
        if self.group_index(&id).is_none() {
            self.groups.push(GroupRecord {
                id: id.clone(),
                name: name.to_string(),
                users: Vec::new(),
            });
        }
        id
    }

    pub fn list_users(&self) -> Vec<UserSummary> {
        self.users.iter().map(user_summary).collect()
    }

    pub fn user(&self, id: &UserId) -> Result<UserSummary, ApiError> {
        self.user_index(id)
            .map(|index| user_summary(&self.users[index]))
            .ok_or_else(|| not_found("user", id.as_str()))
    }

    pub fn list_groups(&self) -> Vec<Resource> {
        self.groups.iter().map(group_resource).collect()
    }

    pub fn group(&self, id: &GroupId) -> Result<GroupSummary, ApiError> {
        self.group_index(id)
            .map(|index| group_summary(&self.groups[index]))
            .ok_or_else(|| not_found("group", id.as_str()))
    }

    /// Groups `user` belongs to, in the order the memberships were created.
    pub fn user_groups(&self, user: &UserId) -> Result<Vec<Resource>, ApiError> {
        let index = self
            .user_index(user)
            .ok_or_else(|| not_found("user", user.as_str()))?;
        Ok(self.users[index]
            .groups
            .iter()
            .filter_map(|group| self.group_index(group))
            .map(|group| group_resource(&self.groups[group]))
            .collect())
    }

    /// Idempotent: adding an existing member leaves the group unchanged.
    pub fn add_user_to_group(
        &mut self,
        group: &GroupId,
        user: &UserId,
    ) -> Result<GroupSummary, ApiError> {
        let (group_index, user_index) = self.membership_indices(group, user)?;

        if !self.groups[group_index].users.contains(user) {
            self.groups[group_index].users.push(user.clone());
            self.users[user_index].groups.push(group.clone());
        }
        Ok(group_summary(&self.groups[group_index]))
    }

    pub fn remove_user_from_group(
        &mut self,
        group: &GroupId,
        user: &UserId,
    ) -> Result<GroupSummary, ApiError> {
        let (group_index, user_index) = self.membership_indices(group, user)?;

        if !self.groups[group_index].users.contains(user) {
            return Err(ApiError::new(
                ErrorCode::NotFound,
                format!("user {user} is not a member of group {group}"),
            ));
        }
        self.groups[group_index].users.retain(|member| member != user);
        self.users[user_index].groups.retain(|joined| joined != group);
        Ok(group_summary(&self.groups[group_index]))
    }

    pub fn user_policies(&self, user: &UserId) -> Result<Vec<PolicySummary>, ApiError> {
        self.user_index(user)
            .ok_or_else(|| not_found("user", user.as_str()))?;
        Ok(self
            .policies
            .iter()
            .filter(|policy| &policy.user == user)
            .map(policy_summary)
            .collect())
    }

    /// Attaches a named inline policy. `policy` must be a JSON document.
    pub fn add_user_policy(
        &mut self,
        user: &UserId,
        name: &str,
        policy: &str,
    ) -> Result<PolicySummary, ApiError> {
        self.user_index(user)
            .ok_or_else(|| not_found("user", user.as_str()))?;

        let name = name.trim();
        if name.is_empty() {
            return Err(validation("policy name must not be empty"));
        }
        if name.chars().count() > MAX_POLICY_NAME_LEN {
            return Err(validation(format!(
                "policy name exceeds {MAX_POLICY_NAME_LEN} characters"
            )));
        }
        let document: Value = serde_json::from_str(policy)
            .map_err(|e| validation(format!("policy is not a valid JSON document: {e}")))?;
        if !document.is_object() {
            return Err(validation("policy must be a JSON object"));
        }
        if self
            .policies
            .iter()
            .any(|existing| &existing.user == user && existing.name == name)
        {
            return Err(ApiError::new(
                ErrorCode::Conflict,
                format!("user {user} already has a policy named '{name}'"),
            ));
        }

        self.next_policy_id += 1;
        let record = PolicyRecord {
            id: PolicyId::new(self.next_policy_id.to_string()),
            user: user.clone(),
            name: name.to_string(),
            policy: document,
        };
        let summary = policy_summary(&record);
        self.policies.push(record);
        Ok(summary)
    }

    fn user_index(&self, id: &UserId) -> Option<usize> {
        self.users.iter().position(|user| &user.id == id)
    }

    fn group_index(&self, id: &GroupId) -> Option<usize> {
        self.groups.iter().position(|group| &group.id == id)
    }

    fn membership_indices(
        &self,
        group: &GroupId,
        user: &UserId,
    ) -> Result<(usize, usize), ApiError> {
        let group_index = self
            .group_index(group)
            .ok_or_else(|| not_found("group", group.as_str()))?;
        let user_index = self
            .user_index(user)
            .ok_or_else(|| not_found("user", user.as_str()))?;
        Ok((group_index, user_index))
    }
}

fn user_summary(user: &UserRecord) -> UserSummary {
    UserSummary {
        id: user.id.clone(),
        username: user.username.clone(),
        groups: user.groups.clone(),
    }
}

fn group_summary(group: &GroupRecord) -> GroupSummary {
    GroupSummary {
        id: group.id.clone(),
        name: group.name.clone(),
        users: group.users.clone(),
    }
}

fn group_resource(group: &GroupRecord) -> Resource {
    Resource::new(group.id.as_str(), group.name.clone())
}

fn policy_summary(policy: &PolicyRecord) -> PolicySummary {
    PolicySummary {
        id: policy.id.clone(),
        name: policy.name.clone(),
        policy: policy.policy.clone(),
    }
}

fn not_found(kind: &str, id: &str) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("no such {kind}: {id}"))
}

fn validation(message: impl Into<String>) -> ApiError {
    ApiError::new(ErrorCode::Validation, message)
}

#[cfg(test)]
#[path = "tests/directory_tests.rs"]
mod tests;
