use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::lease_ports::{HolderChange, ReconciliationLauncher};
use crate::notification_dispatcher::{DispatchOutcome, NotificationDispatcher};
use crate::target_resolver::{Resolution, TargetResolver};

/// Step a live reconciliation is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationPhase {
    /// Looking up the companion address.
    Resolving,
    /// Delivering the notification.
    Dispatching,
}

impl ReconciliationPhase {
    /// Returns stable phase value.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Dispatching => "dispatching",
        }
    }
}

/// Diagnostic view of one live reconciliation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciliationSnapshot {
    /// Generation the reconciliation belongs to.
    pub generation: u64,
    /// Holder being announced.
    pub holder_identity: String,
    /// Current step.
    pub phase: ReconciliationPhase,
    /// Spawn time.
    pub started_at: DateTime<Utc>,
}

/// Final result of one reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconciliationOutcome {
    /// Resolution was canceled or had nothing to resolve.
    ResolutionCanceled,
    /// Resolution succeeded and dispatch finished.
    Dispatched(DispatchOutcome),
}

type LiveRegistry = Mutex<BTreeMap<u64, ReconciliationSnapshot>>;

/// Spawns resolve-then-dispatch work for each holder change and keeps track of
/// the ones still running.
#[derive(Clone)]
pub struct ReconciliationSupervisor {
    resolver: TargetResolver,
    dispatcher: NotificationDispatcher,
    live: Arc<LiveRegistry>,
}

impl ReconciliationSupervisor {
    /// Creates a supervisor.
    #[must_use]
    pub fn new(resolver: TargetResolver, dispatcher: NotificationDispatcher) -> Self {
        Self {
            resolver,
            dispatcher,
            live: Arc::default(),
        }
    }

    /// Returns the reconciliations still running, oldest generation first.
    #[must_use]
    pub fn live_reconciliations(&self) -> Vec<ReconciliationSnapshot> {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Runs one reconciliation to completion on the current task.
    pub async fn reconcile(&self, change: HolderChange) -> ReconciliationOutcome {
        let generation = change.token.generation();
        let registration = LiveRegistration::register(
            self.live.clone(),
            ReconciliationSnapshot {
                generation,
                holder_identity: change.holder_identity.clone(),
                phase: ReconciliationPhase::Resolving,
                started_at: Utc::now(),
            },
        );

        let target = match self
            .resolver
            .resolve(change.holder_identity.as_str(), &change.token)
            .await
        {
            Resolution::Resolved(target) => target,
            Resolution::Canceled => {
                info!(
                    generation,
                    holder_identity = %change.holder_identity,
                    "reconciliation ended without a destination"
                );
                return ReconciliationOutcome::ResolutionCanceled;
            }
        };

        registration.set_phase(ReconciliationPhase::Dispatching);
        let outcome = self.dispatcher.dispatch(&target, &change.token).await;
        match outcome {
            DispatchOutcome::Delivered { attempts } => info!(
                generation,
                holder_identity = %change.holder_identity,
                address = %target.address(),
                attempts,
                "reconciliation delivered"
            ),
            DispatchOutcome::Rejected { status, attempts } => warn!(
                generation,
                holder_identity = %change.holder_identity,
                address = %target.address(),
                status,
                attempts,
                "reconciliation rejected by destination"
            ),
            DispatchOutcome::Undeliverable { attempts } => warn!(
                generation,
                holder_identity = %change.holder_identity,
                address = %target.address(),
                attempts,
                "reconciliation gave up on invalid destination"
            ),
            DispatchOutcome::Canceled { attempts } => info!(
                generation,
                holder_identity = %change.holder_identity,
                attempts,
                "reconciliation superseded"
            ),
        }

        ReconciliationOutcome::Dispatched(outcome)
    }
}

impl ReconciliationLauncher for ReconciliationSupervisor {
    fn launch(&self, change: HolderChange) {
        let supervisor = self.clone();
        tokio::spawn(async move {
            supervisor.reconcile(change).await;
        });
    }
}

/// Registry entry removed when the reconciliation finishes or is dropped.
struct LiveRegistration {
    live: Arc<LiveRegistry>,
    generation: u64,
}

impl LiveRegistration {
    fn register(live: Arc<LiveRegistry>, snapshot: ReconciliationSnapshot) -> Self {
        let generation = snapshot.generation;
        live.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(generation, snapshot);
        Self { live, generation }
    }

    fn set_phase(&self, phase: ReconciliationPhase) {
        if let Some(snapshot) = self
            .live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get_mut(&self.generation)
        {
            snapshot.phase = phase;
        }
    }
}

impl Drop for LiveRegistration {
    fn drop(&mut self) {
        self.live
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.generation);
    }
}

#[cfg(test)]
mod tests;
