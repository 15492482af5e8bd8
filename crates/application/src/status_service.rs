use leaderhook_domain::HolderInfo;

use crate::holder_state::HolderStateReader;
use crate::reconciliation_supervisor::{ReconciliationSnapshot, ReconciliationSupervisor};

/// Read-only view of tracked state for health and info endpoints.
#[derive(Clone)]
pub struct StatusService {
    state: HolderStateReader,
    supervisor: ReconciliationSupervisor,
}

impl StatusService {
    /// Creates a status service.
    #[must_use]
    pub fn new(state: HolderStateReader, supervisor: ReconciliationSupervisor) -> Self {
        Self { state, supervisor }
    }

    /// Returns true once the lease has been read successfully.
    ///
    /// Notification failures never affect liveness.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.state.snapshot().ever_observed()
    }

    /// Returns the tracked holder as of now.
    #[must_use]
    pub fn holder_info(&self) -> HolderInfo {
        self.state.snapshot().info()
    }

    /// Returns reconciliations still running.
    #[must_use]
    pub fn live_reconciliations(&self) -> Vec<ReconciliationSnapshot> {
        self.supervisor.live_reconciliations()
    }
}
