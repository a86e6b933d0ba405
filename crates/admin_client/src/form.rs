//! Draft editing and the submit state machine shared by every mutation view.
//!
//! A form moves `Idle -> Dirty -> Submitting` and, once the request settles,
//! back to `Idle` (success) or `Dirty` (failure, same draft kept for a retry).
//! Transitions never perform side effects themselves; they hand back
//! [`Effect`]s for an [`crate::effects::EffectRunner`] to apply.

use std::fmt;

use reqwest::Method;
use serde_json::Value;
use shared::domain::ResourceKind;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::{
    effects::Effect,
    path::parent_path,
    transport::{ApiResult, Outcome, RequestClient},
};

pub const SUBMIT_FAILURE_MESSAGE: &str = "Unhandled server error. Please try again later.";

/// Static description of one mutation call site.
pub trait Mutation: Send {
    type Draft: Clone + PartialEq + fmt::Debug + Send;

    /// Route the form is mounted at. A successful submit navigates to its parent.
    fn location(&self) -> String;

    fn method(&self) -> Method {
        Method::POST
    }

    fn path(&self, draft: &Self::Draft) -> String;

    fn payload(&self, draft: &Self::Draft) -> Value;

    /// Entities whose cached copies are stale once the mutation lands, in
    /// refresh order.
    fn invalidations(&self, draft: &Self::Draft) -> Vec<(ResourceKind, String)>;

    fn success_message(&self) -> &str;

    /// Call-site readiness, checked on top of the pristine/submitting gate.
    fn is_ready(&self, _draft: &Self::Draft) -> bool {
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Dirty,
    Submitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SubmitRejected {
    #[error("draft has not been edited")]
    Pristine,
    #[error("a submission is already in flight")]
    InFlight,
    #[error("draft is not ready to submit")]
    NotReady,
    #[error("form has been disposed")]
    Disposed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitRequest {
    pub ticket: u64,
    pub method: Method,
    pub path: String,
    pub body: Value,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent<D> {
    Edit(D),
    Submit,
    Settled { ticket: u64, result: ApiResult },
    Cancel,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transition {
    pub request: Option<SubmitRequest>,
    pub effects: Vec<Effect>,
}

#[derive(Debug)]
enum Phase<D> {
    Idle,
    Dirty,
    Submitting { ticket: u64, snapshot: D },
}

pub struct MutationFormController<M: Mutation> {
    mutation: M,
    initial: M::Draft,
    draft: M::Draft,
    phase: Phase<M::Draft>,
    next_ticket: u64,
    disposed: bool,
}

impl<M: Mutation> MutationFormController<M> {
    pub fn new(mutation: M, initial: M::Draft) -> Self {
        Self {
            mutation,
            draft: initial.clone(),
            initial,
            phase: Phase::Idle,
            next_ticket: 0,
            disposed: false,
        }
    }

    pub fn mutation(&self) -> &M {
        &self.mutation
    }

    pub fn draft(&self) -> &M::Draft {
        &self.draft
    }

    pub fn phase(&self) -> FormPhase {
        match self.phase {
            Phase::Idle => FormPhase::Idle,
            Phase::Dirty => FormPhase::Dirty,
            Phase::Submitting { .. } => FormPhase::Submitting,
        }
    }

    pub fn is_pristine(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.phase, Phase::Submitting { .. })
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.gate().is_none()
    }

    /// Whether the cancel control should be enabled.
    pub fn can_cancel(&self) -> bool {
        !self.disposed && !self.is_submitting()
    }

    pub fn edit(&mut self, apply: impl FnOnce(&mut M::Draft)) -> Result<(), SubmitRejected> {
        self.ensure_editable()?;
        apply(&mut self.draft);
        self.phase = Phase::Dirty;
        Ok(())
    }

    /// Pure transition entry point: applies `event` and returns what the
    /// caller has to do next.
    pub fn handle(&mut self, event: FormEvent<M::Draft>) -> Result<Transition, SubmitRejected> {
        match event {
            FormEvent::Edit(draft) => {
                self.edit(|current| *current = draft)?;
                Ok(Transition::default())
            }
            FormEvent::Submit => Ok(Transition {
                request: Some(self.begin_submit()?),
                effects: Vec::new(),
            }),
            FormEvent::Settled { ticket, result } => Ok(Transition {
                request: None,
                effects: self.settle(ticket, result),
            }),
            FormEvent::Cancel => Ok(Transition {
                request: None,
                effects: self.cancel()?,
            }),
        }
    }

    /// Submits the current draft and waits for the outcome.
    ///
    /// The in-flight flag is released on every exit path, including this
    /// future being dropped before the request settles.
    pub async fn submit<C: RequestClient + ?Sized>(
        &mut self,
        client: &C,
    ) -> Result<Vec<Effect>, SubmitRejected> {
        let request = self.begin_submit()?;
        let in_flight = InFlight {
            ticket: request.ticket,
            form: self,
            settled: false,
        };
        let result = client
            .request(request.method, &request.path, Some(request.body))
            .await;
        Ok(in_flight.settle(result))
    }

    pub fn cancel(&self) -> Result<Vec<Effect>, SubmitRejected> {
        if self.disposed {
            return Err(SubmitRejected::Disposed);
        }
        if self.is_submitting() {
            return Err(SubmitRejected::InFlight);
        }
        Ok(vec![Effect::GoBack])
    }

    /// Retires the form. Results arriving afterwards produce no effects.
    pub fn dispose(&mut self) {
        self.disposed = true;
    }

    fn ensure_editable(&self) -> Result<(), SubmitRejected> {
        if self.disposed {
            return Err(SubmitRejected::Disposed);
        }
        if self.is_submitting() {
            return Err(SubmitRejected::InFlight);
        }
        Ok(())
    }

    fn gate(&self) -> Option<SubmitRejected> {
        if self.disposed {
            return Some(SubmitRejected::Disposed);
        }
        match self.phase {
            Phase::Idle => Some(SubmitRejected::Pristine),
            Phase::Submitting { .. } => Some(SubmitRejected::InFlight),
            Phase::Dirty if !self.mutation.is_ready(&self.draft) => Some(SubmitRejected::NotReady),
            Phase::Dirty => None,
        }
    }

    fn begin_submit(&mut self) -> Result<SubmitRequest, SubmitRejected> {
        if let Some(rejected) = self.gate() {
            debug!(location = %self.mutation.location(), reason = %rejected, "form: submit rejected");
            return Err(rejected);
        }

        self.next_ticket += 1;
        let snapshot = self.draft.clone();
        let request = SubmitRequest {
            ticket: self.next_ticket,
            method: self.mutation.method(),
            path: self.mutation.path(&snapshot),
            body: self.mutation.payload(&snapshot),
        };
        info!(
            method = %request.method,
            path = %request.path,
            ticket = request.ticket,
            "form: submitting"
        );
        self.phase = Phase::Submitting {
            ticket: request.ticket,
            snapshot,
        };
        Ok(request)
    }

    fn settle(&mut self, ticket: u64, result: ApiResult) -> Vec<Effect> {
        let snapshot = match std::mem::replace(&mut self.phase, Phase::Dirty) {
            Phase::Submitting {
                ticket: current,
                snapshot,
            } if current == ticket => snapshot,
            other => {
                self.phase = other;
                debug!(ticket, "form: ignoring result for a submission that is not in flight");
                return Vec::new();
            }
        };

        if self.disposed {
            debug!(ticket, "form: ignoring result that arrived after dispose");
            return Vec::new();
        }

        match result.outcome() {
            Outcome::Success => {
                let mut effects: Vec<Effect> = self
                    .mutation
                    .invalidations(&snapshot)
                    .into_iter()
                    .map(|(kind, id)| Effect::Refresh { kind, id })
                    .collect();
                effects.push(Effect::notify(self.mutation.success_message()));
                effects.push(Effect::Navigate(parent_path(&self.mutation.location())));

                self.draft = self.initial.clone();
                self.phase = Phase::Idle;
                info!(ticket, "form: submission succeeded");
                effects
            }
            outcome => {
                warn!(ticket, ?outcome, "form: submission failed");
                vec![Effect::notify(SUBMIT_FAILURE_MESSAGE)]
            }
        }
    }

    fn abandon(&mut self, ticket: u64) {
        if matches!(self.phase, Phase::Submitting { ticket: current, .. } if current == ticket) {
            warn!(ticket, "form: submission dropped before it settled");
            self.phase = Phase::Dirty;
        }
    }
}

struct InFlight<'a, M: Mutation> {
    form: &'a mut MutationFormController<M>,
    ticket: u64,
    settled: bool,
}

impl<M: Mutation> InFlight<'_, M> {
    fn settle(mut self, result: ApiResult) -> Vec<Effect> {
        self.settled = true;
        self.form.settle(self.ticket, result)
    }
}

impl<M: Mutation> Drop for InFlight<'_, M> {
    fn drop(&mut self) {
        if !self.settled {
            self.form.abandon(self.ticket);
        }
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
