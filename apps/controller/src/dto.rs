use chrono::{DateTime, Utc};
use leaderhook_application::ReconciliationSnapshot;
use leaderhook_domain::HolderInfo;
use serde::Serialize;

/// Current lease holder as exposed by `/info`.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct HolderInfoResponse {
    pub holder_identity: String,
    pub acquire_time: i64,
    pub actual_holder_changed_counter: u64,
}

impl From<HolderInfo> for HolderInfoResponse {
    fn from(value: HolderInfo) -> Self {
        Self {
            holder_identity: value.holder_identity,
            acquire_time: value.acquire_time,
            actual_holder_changed_counter: value.generation,
        }
    }
}

/// One running reconciliation as exposed by `/reconciliations`.
#[derive(Debug, Serialize)]
pub struct ReconciliationResponse {
    pub generation: u64,
    pub holder_identity: String,
    pub phase: &'static str,
    pub started_at: DateTime<Utc>,
}

impl From<ReconciliationSnapshot> for ReconciliationResponse {
    fn from(value: ReconciliationSnapshot) -> Self {
        Self {
            generation: value.generation,
            holder_identity: value.holder_identity,
            phase: value.phase.as_str(),
            started_at: value.started_at,
        }
    }
}
