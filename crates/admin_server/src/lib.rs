//! Development implementation of the admin REST API, backed by an in-memory
//! directory of users, groups and inline policies.

pub mod config;
pub mod directory;
pub mod routes;

pub use directory::Directory;
pub use routes::{build_router, AppState, API_PREFIX};
