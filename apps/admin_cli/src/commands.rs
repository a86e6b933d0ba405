//! One function per subcommand. Each mounts its view, drives it to
//! completion and applies the resulting effects.

use std::{path::PathBuf, sync::Arc};

use admin_client::{
    group_choices, AddUserPolicy, AddUserToGroup, CollectionView, EffectRunner, FormPhase,
    GroupList, LoaderState, Mutation, MutationFormController, RemoveUserFromGroup, RequestClient,
    ResourceListLoader, NO_GROUPS_MESSAGE,
};
use anyhow::{bail, Context, Result};
use clap::Subcommand;
use shared::domain::{GroupId, UserId};
use tracing::info;

use crate::console::{ConsoleNotifier, Navigator, RefetchingInvalidator};

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every group.
    Groups,
    /// List the groups a user belongs to.
    UserGroups {
        #[arg(long)]
        user: String,
    },
    /// Add a user to a group.
    AddToGroup {
        #[arg(long)]
        user: String,
        #[arg(long)]
        group: String,
    },
    /// Remove a user from a group.
    RemoveFromGroup {
        #[arg(long)]
        user: String,
        #[arg(long)]
        group: String,
    },
    /// Attach a named inline policy to a user.
    AddPolicy {
        #[arg(long)]
        user: String,
        #[arg(long)]
        name: String,
        #[arg(long, conflicts_with = "policy_file", required_unless_present = "policy_file")]
        policy: Option<String>,
        #[arg(long)]
        policy_file: Option<PathBuf>,
    },
}

pub struct Session {
    client: Arc<dyn RequestClient>,
    invalidator: Arc<RefetchingInvalidator>,
}

impl Session {
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        let invalidator = Arc::new(RefetchingInvalidator::new(client.clone()));
        Self {
            client,
            invalidator,
        }
    }

    pub async fn run(&self, command: Command) -> Result<()> {
        match command {
            Command::Groups => self.list(group_choices()).await,
            Command::UserGroups { user } => self.user_groups(UserId::new(user)).await,
            Command::AddToGroup { user, group } => {
                let mut form = AddUserToGroup::form(UserId::new(user));
                form.edit(|draft| draft.selected = Some(GroupId::new(group)))?;
                self.submit(form).await
            }
            Command::RemoveFromGroup { user, group } => {
                let mut form = RemoveUserFromGroup::form(UserId::new(user), GroupId::new(group));
                form.edit(|draft| draft.confirmed = true)?;
                self.submit(form).await
            }
            Command::AddPolicy {
                user,
                name,
                policy,
                policy_file,
            } => {
                let policy = match (policy, policy_file) {
                    (Some(policy), _) => policy,
                    (None, Some(path)) => std::fs::read_to_string(&path).with_context(|| {
                        format!("failed to read policy file '{}'", path.display())
                    })?,
                    (None, None) => bail!("either --policy or --policy-file is required"),
                };
                let mut form = AddUserPolicy::form(UserId::new(user));
                form.edit(|draft| {
                    draft.name = name;
                    draft.policy = policy;
                })?;
                self.submit(form).await
            }
        }
    }

    fn runner(&self, navigator: Arc<Navigator>) -> EffectRunner {
        EffectRunner::new(Arc::new(ConsoleNotifier), navigator, self.invalidator.clone())
    }

    async fn list(&self, mut loader: ResourceListLoader) -> Result<()> {
        let runner = self.runner(Arc::new(Navigator::default()));
        runner.run(loader.load(self.client.as_ref()).await?);
        print_collection(loader.view(), "No groups.");
        ensure_loaded(&loader)
    }

    async fn user_groups(&self, user: UserId) -> Result<()> {
        let mut list = GroupList::new(user);
        let runner = self.runner(Arc::new(Navigator::default()));
        runner.run(list.load(self.client.as_ref()).await?);
        match list.view() {
            CollectionView::Populated(_) => {
                for row in list.rows() {
                    println!(
                        "{}\tedit: {}\tdelete: {}",
                        row.name, row.edit_path, row.delete_path
                    );
                }
            }
            view => print_collection(view, NO_GROUPS_MESSAGE),
        }
        ensure_loaded(list.loader())
    }

    async fn submit<M: Mutation>(&self, mut form: MutationFormController<M>) -> Result<()> {
        let navigator = Arc::new(Navigator::starting_at(form.mutation().location()));
        let runner = self.runner(navigator.clone());

        let effects = form.submit(self.client.as_ref()).await?;
        let report = runner.run(effects);
        self.invalidator.drain().await;
        form.dispose();

        info!(
            applied = report.applied,
            failed = report.failed,
            location = ?navigator.current(),
            "submission finished"
        );
        if form.phase() != FormPhase::Idle {
            bail!("submission to {} failed", form.mutation().location());
        }
        if let Some(location) = navigator.current() {
            println!("-> {location}");
        }
        Ok(())
    }
}

fn print_collection(view: CollectionView<'_>, empty_message: &str) {
    match view {
        CollectionView::Loading => println!("Loading..."),
        CollectionView::Empty => println!("{empty_message}"),
        CollectionView::Populated(items) => {
            for item in items {
                println!("{}\t{}", item.id, item.name);
            }
        }
    }
}

fn ensure_loaded(loader: &ResourceListLoader) -> Result<()> {
    match loader.state() {
        LoaderState::Failed { status } => {
            bail!("failed to load {} (status {status})", loader.path())
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
#[path = "tests/commands_tests.rs"]
mod tests;
