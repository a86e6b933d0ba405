//! One-shot collection fetch backing a selectable list.

use reqwest::Method;
use shared::domain::Resource;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    effects::Effect,
    transport::{ApiResult, Outcome, RequestClient},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoaderState {
    Unloaded,
    Loading,
    Loaded(Vec<Resource>),
    Failed { status: u16 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionView<'a> {
    Loading,
    Empty,
    Populated(&'a [Resource]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LoadRejected {
    #[error("collection was already fetched for this mount")]
    AlreadyMounted,
    #[error("loader has been disposed")]
    Disposed,
}

pub fn load_failure_message(status: u16) -> String {
    format!("Unhandled error. Server status {status}")
}

#[derive(Debug)]
pub struct ResourceListLoader {
    path: String,
    state: LoaderState,
    disposed: bool,
}

impl ResourceListLoader {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            state: LoaderState::Unloaded,
            disposed: false,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn state(&self) -> &LoaderState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, LoaderState::Unloaded | LoaderState::Loading)
    }

    /// Items offered for selection. Empty unless the fetch succeeded.
    pub fn items(&self) -> &[Resource] {
        match &self.state {
            LoaderState::Loaded(items) => items,
            _ => &[],
        }
    }

    pub fn view(&self) -> CollectionView<'_> {
        if self.is_loading() {
            return CollectionView::Loading;
        }
        match self.items() {
            [] => CollectionView::Empty,
            items => CollectionView::Populated(items),
        }
    }

    /// Enters `Loading` and hands back the single fetch this mount performs.
    pub fn mount(&mut self) -> Result<FetchRequest, LoadRejected> {
        if self.disposed {
            return Err(LoadRejected::Disposed);
        }
        if self.state != LoaderState::Unloaded {
            return Err(LoadRejected::AlreadyMounted);
        }
        self.state = LoaderState::Loading;
        debug!(path = %self.path, "loader: fetching collection");
        Ok(FetchRequest {
            path: self.path.clone(),
        })
    }

    pub fn settle(&mut self, result: ApiResult) -> Vec<Effect> {
        if self.disposed || self.state != LoaderState::Loading {
            debug!(path = %self.path, "loader: ignoring late result");
            return Vec::new();
        }

        let status = match result.outcome() {
            Outcome::Success => match result.body {
                Some(body) => match serde_json::from_value::<Vec<Resource>>(body) {
                    Ok(items) => {
                        info!(path = %self.path, count = items.len(), "loader: collection loaded");
                        self.state = LoaderState::Loaded(items);
                        return Vec::new();
                    }
                    Err(err) => {
                        warn!(path = %self.path, error = %err, "loader: unexpected collection shape");
                        0
                    }
                },
                None => {
                    warn!(path = %self.path, "loader: collection response had no body");
                    0
                }
            },
            Outcome::ServerError(status) => status,
            Outcome::TransportFailure => 0,
        };

        warn!(path = %self.path, status, "loader: collection fetch failed");
        self.state = LoaderState::Failed { status };
        vec![Effect::notify(load_failure_message(status))]
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    /// Mounts, performs the fetch and settles it.
    pub async fn load<C: RequestClient + ?Sized>(
        &mut self,
        client: &C,
    ) -> Result<Vec<Effect>, LoadRejected> {
        let fetch = self.mount()?;
        let result = client.request(Method::GET, &fetch.path, None).await;
        Ok(self.settle(result))
    }
}

#[cfg(test)]
#[path = "tests/loader_tests.rs"]
mod tests;
