use chrono::{DateTime, Utc};

/// Snapshot of one lease as delivered by the watch transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaseObservation {
    lease_name: String,
    holder_identity: Option<String>,
    acquire_time: Option<DateTime<Utc>>,
}

impl LeaseObservation {
    /// Creates an observation from raw lease fields.
    #[must_use]
    pub fn new(
        lease_name: impl Into<String>,
        holder_identity: Option<String>,
        acquire_time: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            lease_name: lease_name.into(),
            holder_identity,
            acquire_time,
        }
    }

    /// Returns the observed lease name.
    #[must_use]
    pub fn lease_name(&self) -> &str {
        self.lease_name.as_str()
    }

    /// Returns the recorded holder, if the lease has one.
    #[must_use]
    pub fn holder_identity(&self) -> Option<&str> {
        self.holder_identity.as_deref()
    }

    /// Returns the time the current holder acquired the lease.
    #[must_use]
    pub fn acquire_time(&self) -> Option<DateTime<Utc>> {
        self.acquire_time
    }
}

/// Watch notification for the lease of interest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaseEvent {
    /// Lease was listed, created, or updated.
    Applied(LeaseObservation),
    /// Lease object was deleted.
    Deleted {
        /// Name of the deleted lease.
        lease_name: String,
    },
}
