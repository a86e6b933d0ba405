//! Side effects emitted by the loaders and forms, and the runner that applies
//! them to the UI collaborators.

use std::{
    panic::{catch_unwind, AssertUnwindSafe},
    sync::Arc,
};

use shared::domain::ResourceKind;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Refresh { kind: ResourceKind, id: String },
    Notify(String),
    Navigate(String),
    GoBack,
}

impl Effect {
    pub fn refresh(kind: ResourceKind, id: impl Into<String>) -> Self {
        Self::Refresh {
            kind,
            id: id.into(),
        }
    }

    pub fn notify(message: impl Into<String>) -> Self {
        Self::Notify(message.into())
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Refresh { .. } => "refresh",
            Self::Notify(_) => "notify",
            Self::Navigate(_) => "navigate",
            Self::GoBack => "go_back",
        }
    }
}

pub trait NotificationChannel: Send + Sync {
    fn show(&self, message: &str);
}

pub trait NavigationEffect: Send + Sync {
    fn go_to(&self, path: &str);
    fn go_back(&self);
}

pub trait CacheInvalidator: Send + Sync {
    fn refresh(&self, kind: ResourceKind, id: &str);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub applied: usize,
    pub failed: usize,
}

#[derive(Clone)]
pub struct EffectRunner {
    notifications: Arc<dyn NotificationChannel>,
    navigation: Arc<dyn NavigationEffect>,
    cache: Arc<dyn CacheInvalidator>,
}

impl EffectRunner {
    pub fn new(
        notifications: Arc<dyn NotificationChannel>,
        navigation: Arc<dyn NavigationEffect>,
        cache: Arc<dyn CacheInvalidator>,
    ) -> Self {
        Self {
            notifications,
            navigation,
            cache,
        }
    }

    /// Applies `effects` in order. A collaborator that panics is logged and
    /// skipped; the remaining effects still run.
    pub fn run(&self, effects: impl IntoIterator<Item = Effect>) -> RunReport {
        let mut report = RunReport::default();
        for effect in effects {
            match catch_unwind(AssertUnwindSafe(|| self.apply(&effect))) {
                Ok(()) => {
                    debug!(effect = effect.name(), "effects: applied");
                    report.applied += 1;
                }
                Err(_) => {
                    error!(effect = ?effect, "effects: collaborator panicked");
                    report.failed += 1;
                }
            }
        }
        report
    }

    fn apply(&self, effect: &Effect) {
        match effect {
            Effect::Refresh { kind, id } => self.cache.refresh(*kind, id),
            Effect::Notify(message) => self.notifications.show(message),
            Effect::Navigate(path) => self.navigation.go_to(path),
            Effect::GoBack => self.navigation.go_back(),
        }
    }
}

#[cfg(test)]
#[path = "tests/effects_tests.rs"]
mod tests;
