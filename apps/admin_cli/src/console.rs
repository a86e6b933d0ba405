//! Terminal-side collaborators for the console effect runner.

use std::sync::{Arc, Mutex};

use admin_client::{CacheInvalidator, NavigationEffect, NotificationChannel, RequestClient};
use reqwest::Method;
use shared::{domain::ResourceKind, protocol::path_segment};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub struct ConsoleNotifier;

impl NotificationChannel for ConsoleNotifier {
    fn show(&self, message: &str) {
        info!(message, "notification");
        println!("{message}");
    }
}

/// Tracks where the operator would be in the web console.
#[derive(Debug, Default)]
pub struct Navigator {
    history: Mutex<Vec<String>>,
}

impl Navigator {
    pub fn starting_at(location: impl Into<String>) -> Self {
        Self {
            history: Mutex::new(vec![location.into()]),
        }
    }

    pub fn current(&self) -> Option<String> {
        match self.history.lock() {
            Ok(history) => history.last().cloned(),
            Err(_) => {
                warn!("navigation history lock poisoned");
                None
            }
        }
    }
}

impl NavigationEffect for Navigator {
    fn go_to(&self, path: &str) {
        debug!(path, "navigate");
        match self.history.lock() {
            Ok(mut history) => history.push(path.to_string()),
            Err(_) => warn!(path, "navigation history lock poisoned"),
        }
    }

    fn go_back(&self) {
        let Ok(mut history) = self.history.lock() else {
            warn!("navigation history lock poisoned");
            return;
        };
        if history.len() > 1 {
            history.pop();
        }
        debug!(path = ?history.last(), "navigate back");
    }
}

/// Re-reads invalidated entities in the background so the next view sees
/// fresh data. Call [`RefetchingInvalidator::drain`] before exiting.
pub struct RefetchingInvalidator {
    client: Arc<dyn RequestClient>,
    pending: Mutex<Vec<JoinHandle<()>>>,
}

impl RefetchingInvalidator {
    pub fn new(client: Arc<dyn RequestClient>) -> Self {
        Self {
            client,
            pending: Mutex::new(Vec::new()),
        }
    }

    pub async fn drain(&self) {
        let pending = match self.pending.lock() {
            Ok(mut pending) => std::mem::take(&mut *pending),
            Err(_) => {
                warn!("cache refresh queue lock poisoned; pending refreshes not awaited");
                return;
            }
        };
        for task in pending {
            if let Err(err) = task.await {
                warn!(error = %err, "cache refresh task failed");
            }
        }
    }
}

impl CacheInvalidator for RefetchingInvalidator {
    fn refresh(&self, kind: ResourceKind, id: &str) {
        let client = self.client.clone();
        let path = format!("/{kind}/{}", path_segment(id));
        let task = tokio::spawn(async move {
            let result = client.request(Method::GET, &path, None).await;
            if result.is_success() {
                info!(path = %path, "cache refreshed");
            } else {
                warn!(path = %path, status = result.status, "cache refresh failed");
            }
        });
        match self.pending.lock() {
            Ok(mut pending) => pending.push(task),
            Err(_) => warn!(kind = %kind, id, "cache refresh queue lock poisoned; refresh detached"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn navigator_tracks_history() {
        let navigator = Navigator::starting_at("/users/42/add-to-group");

        navigator.go_to("/users/42");
        assert_eq!(navigator.current().as_deref(), Some("/users/42"));

        navigator.go_back();
        assert_eq!(
            navigator.current().as_deref(),
            Some("/users/42/add-to-group")
        );

        navigator.go_back();
        assert_eq!(
            navigator.current().as_deref(),
            Some("/users/42/add-to-group")
        );
    }

    #[test]
    fn poisoned_history_is_survived() {
        let navigator = Navigator::starting_at("/users/42");
        let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = navigator.history.lock().expect("history");
            panic!("poison the history lock");
        }));

        navigator.go_to("/users/42/add-policy");
        navigator.go_back();

        assert_eq!(navigator.current(), None);
    }
}
