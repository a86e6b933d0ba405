//! Group membership panel shown on a user's detail view.

use shared::{
    domain::{Resource, UserId},
    protocol::{groups_route, path_segment, user_groups_route, user_route},
};

use crate::{
    effects::Effect,
    loader::{CollectionView, LoadRejected, ResourceListLoader},
    transport::RequestClient,
};

pub const NO_GROUPS_MESSAGE: &str = "This user is in no groups.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub name: String,
    pub edit_path: String,
    pub delete_path: String,
}

/// Every group, offered as choices on the add-to-group form.
pub fn group_choices() -> ResourceListLoader {
    ResourceListLoader::new(groups_route())
}

#[derive(Debug)]
pub struct GroupList {
    user: UserId,
    loader: ResourceListLoader,
}

impl GroupList {
    pub fn new(user: UserId) -> Self {
        let loader = ResourceListLoader::new(user_groups_route(&user));
        Self { user, loader }
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn loader(&self) -> &ResourceListLoader {
        &self.loader
    }

    pub async fn load<C: RequestClient + ?Sized>(
        &mut self,
        client: &C,
    ) -> Result<Vec<Effect>, LoadRejected> {
        self.loader.load(client).await
    }

    pub fn dispose(&mut self) {
        self.loader.dispose();
    }

    pub fn view(&self) -> CollectionView<'_> {
        self.loader.view()
    }

    pub fn rows(&self) -> Vec<GroupRow> {
        self.loader
            .items()
            .iter()
            .map(|group| self.row(group))
            .collect()
    }

    pub fn add_to_group_path(&self) -> String {
        format!("{}/add-to-group", user_route(&self.user))
    }

    fn row(&self, group: &Resource) -> GroupRow {
        let base = format!("{}/{}", user_groups_route(&self.user), path_segment(&group.id));
        GroupRow {
            name: group.name.clone(),
            edit_path: format!("{base}/edit"),
            delete_path: format!("{base}/delete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{test_support::ScriptedClient, transport::ApiResult};
    use serde_json::json;

    #[tokio::test]
    async fn fetches_the_users_groups_on_load() {
        let client = ScriptedClient::new([ApiResult::ok(Some(json!([
            { "id": "1", "name": "admins" },
            { "id": "3", "name": "ops" }
        ])))]);
        let mut list = GroupList::new(UserId::from("42"));
        assert_eq!(list.view(), CollectionView::Loading);

        list.load(&client).await.expect("load");

        assert_eq!(client.calls()[0].path, "/users/42/groups");
        assert_eq!(
            list.rows(),
            vec![
                GroupRow {
                    name: "admins".to_string(),
                    edit_path: "/users/42/groups/1/edit".to_string(),
                    delete_path: "/users/42/groups/1/delete".to_string(),
                },
                GroupRow {
                    name: "ops".to_string(),
                    edit_path: "/users/42/groups/3/edit".to_string(),
                    delete_path: "/users/42/groups/3/delete".to_string(),
                },
            ]
        );
        assert_eq!(list.add_to_group_path(), "/users/42/add-to-group");
    }

    #[tokio::test]
    async fn user_without_groups_renders_empty() {
        let client = ScriptedClient::new([ApiResult::ok(Some(json!([])))]);
        let mut list = GroupList::new(UserId::from("42"));

        list.load(&client).await.expect("load");

        assert_eq!(list.view(), CollectionView::Empty);
        assert!(list.rows().is_empty());
    }

    #[test]
    fn group_choices_read_every_group() {
        assert_eq!(group_choices().path(), "/groups");
    }
}
