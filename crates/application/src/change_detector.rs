use std::sync::Arc;

use leaderhook_core::{AppError, AppResult};
use leaderhook_domain::{LeaseEvent, LeaseObservation};
use tracing::{debug, error, info};

use crate::holder_state::{GenerationGuard, HolderStateWriter};
use crate::lease_ports::{HolderChange, ReconciliationLauncher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DetectorPhase {
    Uninitialized,
    Tracking,
    Failed,
}

/// Result of reducing one lease event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObservationOutcome {
    /// Holder changed and reconciliation was launched.
    Changed {
        /// Generation of the accepted change.
        generation: u64,
    },
    /// Observation matched the current holder and acquire time.
    Unchanged,
    /// Event did not concern the tracked holder.
    Ignored,
}

/// Reduces lease watch events into holder changes.
///
/// Sole owner of the holder state writer. Events must be fed one at a time in
/// delivery order.
pub struct ChangeDetector {
    lease_name: String,
    state: HolderStateWriter,
    guard: GenerationGuard,
    launcher: Arc<dyn ReconciliationLauncher>,
    phase: DetectorPhase,
}

impl ChangeDetector {
    /// Creates a detector for one lease.
    #[must_use]
    pub fn new(
        lease_name: impl Into<String>,
        state: HolderStateWriter,
        launcher: Arc<dyn ReconciliationLauncher>,
    ) -> Self {
        let guard = state.reader().guard();
        Self {
            lease_name: lease_name.into(),
            state,
            guard,
            launcher,
            phase: DetectorPhase::Uninitialized,
        }
    }

    /// Returns the watched lease name.
    #[must_use]
    pub fn lease_name(&self) -> &str {
        self.lease_name.as_str()
    }

    /// Returns true once the first observation was unusable. The detector
    /// ignores every later event in that case.
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.phase == DetectorPhase::Failed
    }

    /// Reduces one watch event.
    pub fn on_event(&mut self, event: LeaseEvent) -> AppResult<ObservationOutcome> {
        match event {
            LeaseEvent::Applied(observation) => self.on_observed(observation),
            LeaseEvent::Deleted { lease_name } => {
                if lease_name == self.lease_name {
                    info!(lease = %lease_name, "watched lease deleted, nothing to notify");
                }
                Ok(ObservationOutcome::Ignored)
            }
        }
    }

    /// Reduces one lease observation.
    ///
    /// Fails with [`AppError::MissingHolderIdentity`] when the lease has no
    /// holder. On the first observation this moves the detector to its failed
    /// state; later it leaves the tracked holder untouched.
    pub fn on_observed(&mut self, observation: LeaseObservation) -> AppResult<ObservationOutcome> {
        if observation.lease_name() != self.lease_name {
            debug!(lease = %observation.lease_name(), "ignoring unrelated lease");
            return Ok(ObservationOutcome::Ignored);
        }

        if self.phase == DetectorPhase::Failed {
            debug!(lease = %self.lease_name, "detector failed at startup, ignoring observation");
            return Ok(ObservationOutcome::Ignored);
        }

        let Some(holder_identity) = observation.holder_identity() else {
            if self.phase == DetectorPhase::Uninitialized {
                self.phase = DetectorPhase::Failed;
                error!(
                    lease = %self.lease_name,
                    "first lease observation has no holder identity, initial state unavailable"
                );
            }
            return Err(AppError::MissingHolderIdentity(self.lease_name.clone()));
        };

        let Some(generation) = self
            .state
            .accept(holder_identity, observation.acquire_time())
        else {
            debug!(
                lease = %self.lease_name,
                holder_identity = %holder_identity,
                "lease observation unchanged"
            );
            return Ok(ObservationOutcome::Unchanged);
        };

        self.phase = DetectorPhase::Tracking;
        info!(
            lease = %self.lease_name,
            holder_identity = %holder_identity,
            acquire_time = ?observation.acquire_time(),
            generation,
            "lease holder changed"
        );

        self.launcher.launch(HolderChange {
            holder_identity: holder_identity.to_owned(),
            token: self.guard.snapshot(),
        });

        Ok(ObservationOutcome::Changed { generation })
    }
}
