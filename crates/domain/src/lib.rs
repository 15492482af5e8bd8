//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod holder;
mod lease;
mod notification;

pub use holder::{HolderInfo, HolderState};
pub use lease::{LeaseEvent, LeaseObservation};
pub use notification::{
    HolderNotificationPayload, NotificationEndpoint, NotificationScheme, NotificationTarget,
};
