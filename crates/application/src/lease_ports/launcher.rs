use crate::holder_state::GenerationToken;

/// Accepted holder change handed to reconciliation.
#[derive(Debug, Clone)]
pub struct HolderChange {
    /// New holder identity.
    pub holder_identity: String,
    /// Generation the change was accepted under.
    pub token: GenerationToken,
}

/// Starts reconciliation work without blocking the caller.
pub trait ReconciliationLauncher: Send + Sync {
    /// Launches resolve-then-dispatch for one accepted change.
    fn launch(&self, change: HolderChange);
}
