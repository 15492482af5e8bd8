use async_trait::async_trait;
use leaderhook_core::AppResult;
use leaderhook_domain::NotificationTarget;

/// Response of one notification attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body, possibly truncated.
    pub body: String,
}

/// Outbound transport for holder notifications.
#[async_trait]
pub trait HolderNotifier: Send + Sync {
    /// Sends one notification attempt.
    ///
    /// Errors are transport failures where no response was received.
    async fn send_notification(
        &self,
        target: &NotificationTarget,
    ) -> AppResult<NotificationResponse>;
}
