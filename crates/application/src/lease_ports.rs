mod event_source;
mod launcher;
mod locator;
mod notifier;

pub use event_source::LeaseEventSource;
pub use launcher::{HolderChange, ReconciliationLauncher};
pub use locator::TargetLocator;
pub use notifier::{HolderNotifier, NotificationResponse};
