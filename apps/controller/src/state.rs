use leaderhook_application::StatusService;

/// Shared status server state.
#[derive(Clone)]
pub struct AppState {
    pub status_service: StatusService,
}
