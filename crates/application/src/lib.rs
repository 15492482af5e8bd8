//! Application services and ports.

#![forbid(unsafe_code)]

mod change_detector;
mod holder_state;
mod lease_monitor;
mod lease_ports;
mod notification_dispatcher;
mod reconciliation_supervisor;
mod status_service;
mod target_resolver;

pub use change_detector::{ChangeDetector, ObservationOutcome};
pub use holder_state::{
    GenerationGuard, GenerationToken, HolderStateReader, HolderStateWriter, holder_state_channel,
};
pub use lease_monitor::LeaseMonitor;
pub use lease_ports::{
    HolderChange, HolderNotifier, LeaseEventSource, NotificationResponse, ReconciliationLauncher,
    TargetLocator,
};
pub use notification_dispatcher::{DispatchOutcome, NotificationDispatcher};
pub use reconciliation_supervisor::{
    ReconciliationOutcome, ReconciliationPhase, ReconciliationSnapshot, ReconciliationSupervisor,
};
pub use status_service::StatusService;
pub use target_resolver::{Resolution, ResolutionStrategy, TargetResolver};
