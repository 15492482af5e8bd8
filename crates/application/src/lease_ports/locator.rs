use async_trait::async_trait;
use leaderhook_core::AppResult;

/// Service discovery port for companion processes.
#[async_trait]
pub trait TargetLocator: Send + Sync {
    /// Returns the companion address running on `node_id`, or `None` when no
    /// companion is running there yet.
    async fn locate(&self, node_id: &str) -> AppResult<Option<String>>;
}
