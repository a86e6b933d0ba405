//! Client-side core of the admin console: REST transport, one-shot collection
//! loaders and the mutation form state machine, with their side effects
//! expressed as data.

pub mod effects;
pub mod form;
pub mod group_list;
pub mod loader;
pub mod mutations;
pub mod path;
pub mod transport;

pub use effects::{
    CacheInvalidator, Effect, EffectRunner, NavigationEffect, NotificationChannel, RunReport,
};
pub use form::{
    FormEvent, FormPhase, Mutation, MutationFormController, SubmitRejected, SubmitRequest,
    Transition, SUBMIT_FAILURE_MESSAGE,
};
pub use group_list::{group_choices, GroupList, GroupRow, NO_GROUPS_MESSAGE};
pub use loader::{CollectionView, FetchRequest, LoadRejected, LoaderState, ResourceListLoader};
pub use mutations::{
    AddUserPolicy, AddUserToGroup, GroupSelection, PolicyDraft, RemovalConfirmation,
    RemoveUserFromGroup,
};
pub use path::parent_path;
pub use transport::{
    ApiResult, ClientBuildError, HttpRequestClient, Outcome, RequestClient,
    DEFAULT_REQUEST_TIMEOUT,
};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
