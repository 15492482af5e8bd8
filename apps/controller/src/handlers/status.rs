use axum::Json;
use axum::extract::State;
use leaderhook_core::AppError;

use crate::dto::{HolderInfoResponse, ReconciliationResponse};
use crate::error::ApiResult;
use crate::state::AppState;

/// Healthy once the lease has been read at least once.
pub async fn healthz_handler(State(state): State<AppState>) -> ApiResult<&'static str> {
    if state.status_service.is_live() {
        Ok("ok")
    } else {
        Err(AppError::Coordination("lease holder has not been observed yet".to_owned()).into())
    }
}

pub async fn info_handler(State(state): State<AppState>) -> Json<HolderInfoResponse> {
    Json(state.status_service.holder_info().into())
}

pub async fn reconciliations_handler(
    State(state): State<AppState>,
) -> Json<Vec<ReconciliationResponse>> {
    Json(
        state
            .status_service
            .live_reconciliations()
            .into_iter()
            .map(ReconciliationResponse::from)
            .collect(),
    )
}
