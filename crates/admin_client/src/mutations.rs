//! The concrete mutation views of the admin console.

use serde_json::{json, Value};
use shared::{
    domain::{GroupId, ResourceKind, UserId},
    protocol::{
        add_user_to_group_route, path_segment, remove_user_from_group_route, user_policies_route,
        user_route,
    },
};

use crate::form::{Mutation, MutationFormController};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupSelection {
    pub selected: Option<GroupId>,
}

#[derive(Debug, Clone)]
pub struct AddUserToGroup {
    user: UserId,
}

impl AddUserToGroup {
    pub fn new(user: UserId) -> Self {
        Self { user }
    }

    pub fn form(user: UserId) -> MutationFormController<Self> {
        MutationFormController::new(Self::new(user), GroupSelection::default())
    }
}

fn selected_group(draft: &GroupSelection) -> &str {
    draft.selected.as_ref().map(GroupId::as_str).unwrap_or_default()
}

impl Mutation for AddUserToGroup {
    type Draft = GroupSelection;

    fn location(&self) -> String {
        format!("{}/add-to-group", user_route(&self.user))
    }

    fn path(&self, draft: &GroupSelection) -> String {
        add_user_to_group_route(selected_group(draft))
    }

    fn payload(&self, _draft: &GroupSelection) -> Value {
        json!({ "user": self.user })
    }

    fn invalidations(&self, draft: &GroupSelection) -> Vec<(ResourceKind, String)> {
        vec![
            (ResourceKind::Users, self.user.to_string()),
            (ResourceKind::Groups, selected_group(draft).to_string()),
        ]
    }

    fn success_message(&self) -> &str {
        "User added to group"
    }

    fn is_ready(&self, draft: &GroupSelection) -> bool {
        draft.selected.is_some()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemovalConfirmation {
    pub confirmed: bool,
}

#[derive(Debug, Clone)]
pub struct RemoveUserFromGroup {
    user: UserId,
    group: GroupId,
}

impl RemoveUserFromGroup {
    pub fn new(user: UserId, group: GroupId) -> Self {
        Self { user, group }
    }

    pub fn form(user: UserId, group: GroupId) -> MutationFormController<Self> {
        MutationFormController::new(Self::new(user, group), RemovalConfirmation::default())
    }
}

impl Mutation for RemoveUserFromGroup {
    type Draft = RemovalConfirmation;

    /// The delete link of the membership row in [`crate::GroupList`].
    /// Success navigates to its parent, the membership path
    /// `/users/{user}/groups/{group}`, by the same rule every form follows.
    fn location(&self) -> String {
        format!(
            "{}/groups/{}/delete",
            user_route(&self.user),
            path_segment(self.group.as_str())
        )
    }

    fn path(&self, _draft: &RemovalConfirmation) -> String {
        remove_user_from_group_route(self.group.as_str())
    }

    fn payload(&self, _draft: &RemovalConfirmation) -> Value {
        json!({ "user": self.user })
    }

    fn invalidations(&self, _draft: &RemovalConfirmation) -> Vec<(ResourceKind, String)> {
        vec![
            (ResourceKind::Users, self.user.to_string()),
            (ResourceKind::Groups, self.group.to_string()),
        ]
    }

    fn success_message(&self) -> &str {
        "User removed from group"
    }

    fn is_ready(&self, draft: &RemovalConfirmation) -> bool {
        draft.confirmed
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PolicyDraft {
    pub name: String,
    pub policy: String,
}

#[derive(Debug, Clone)]
pub struct AddUserPolicy {
    user: UserId,
}

impl AddUserPolicy {
    pub fn new(user: UserId) -> Self {
        Self { user }
    }

    pub fn form(user: UserId) -> MutationFormController<Self> {
        MutationFormController::new(Self::new(user), PolicyDraft::default())
    }
}

impl Mutation for AddUserPolicy {
    type Draft = PolicyDraft;

    fn location(&self) -> String {
        format!("{}/add-policy", user_route(&self.user))
    }

    fn path(&self, _draft: &PolicyDraft) -> String {
        user_policies_route(&self.user)
    }

    fn payload(&self, draft: &PolicyDraft) -> Value {
        json!({ "name": draft.name, "policy": draft.policy })
    }

    fn invalidations(&self, _draft: &PolicyDraft) -> Vec<(ResourceKind, String)> {
        Vec::new()
    }

    fn success_message(&self) -> &str {
        "Saved policy"
    }
}

#[cfg(test)]
#[path = "tests/mutations_tests.rs"]
mod tests;
