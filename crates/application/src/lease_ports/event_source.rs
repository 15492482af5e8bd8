use async_trait::async_trait;
use leaderhook_core::AppResult;
use leaderhook_domain::LeaseEvent;

/// Stream of watch notifications for the lease of interest.
#[async_trait]
pub trait LeaseEventSource: Send {
    /// Waits for the next event. `None` means the stream has ended.
    ///
    /// Errors are transport failures; the source keeps producing events after
    /// returning one.
    async fn next_event(&mut self) -> Option<AppResult<LeaseEvent>>;
}
