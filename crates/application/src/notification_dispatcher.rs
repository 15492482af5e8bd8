use std::sync::Arc;
use std::time::Duration;

use leaderhook_core::AppError;
use leaderhook_domain::NotificationTarget;
use tracing::{error, info, warn};

use crate::holder_state::GenerationToken;
use crate::lease_ports::HolderNotifier;

/// Final result of delivering one notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Destination answered with a 2xx status.
    Delivered {
        /// Attempts made, including the successful one.
        attempts: u32,
    },
    /// Destination answered with a 4xx status; not retried.
    Rejected {
        /// Rejecting HTTP status.
        status: u16,
        /// Attempts made, including the rejected one.
        attempts: u32,
    },
    /// Destination cannot be addressed at all; not retried.
    Undeliverable {
        /// Attempts made, including the failed one.
        attempts: u32,
    },
    /// A newer holder change superseded this notification.
    Canceled {
        /// Attempts made before cancellation.
        attempts: u32,
    },
}

/// Retrying sender for holder notifications.
#[derive(Clone)]
pub struct NotificationDispatcher {
    notifier: Arc<dyn HolderNotifier>,
    retry_interval: Duration,
}

impl NotificationDispatcher {
    /// Wait between delivery attempts.
    pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(2);

    /// Creates a dispatcher with the default retry interval.
    #[must_use]
    pub fn new(notifier: Arc<dyn HolderNotifier>) -> Self {
        Self {
            notifier,
            retry_interval: Self::DEFAULT_RETRY_INTERVAL,
        }
    }

    /// Overrides the fixed wait between attempts.
    #[must_use]
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Delivers `target` until it is accepted, rejected with a 4xx status, or
    /// `token` goes stale.
    ///
    /// Transport failures and every other status are retried after the fixed
    /// interval without an attempt limit. Every 4xx status, 429 included, ends
    /// delivery, as does a destination the notifier cannot address.
    pub async fn dispatch(
        &self,
        target: &NotificationTarget,
        token: &GenerationToken,
    ) -> DispatchOutcome {
        let mut attempts = 0_u32;

        loop {
            if token.is_stale() {
                info!(
                    address = %target.address(),
                    holder_identity = %target.holder_identity(),
                    generation = token.generation(),
                    attempts,
                    "holder changed during notification, stopping delivery"
                );
                return DispatchOutcome::Canceled { attempts };
            }

            attempts = attempts.saturating_add(1);
            match self.notifier.send_notification(target).await {
                Ok(response) if (200..300).contains(&response.status) => {
                    info!(
                        address = %target.address(),
                        holder_identity = %target.holder_identity(),
                        status = response.status,
                        attempt = attempts,
                        body = %response.body,
                        "holder notification delivered"
                    );
                    return DispatchOutcome::Delivered { attempts };
                }
                Ok(response) if (400..500).contains(&response.status) => {
                    warn!(
                        address = %target.address(),
                        holder_identity = %target.holder_identity(),
                        status = response.status,
                        attempt = attempts,
                        body = %response.body,
                        "holder notification rejected, not retrying"
                    );
                    return DispatchOutcome::Rejected {
                        status: response.status,
                        attempts,
                    };
                }
                Ok(response) => {
                    warn!(
                        address = %target.address(),
                        status = response.status,
                        attempt = attempts,
                        body = %response.body,
                        retry_in = ?self.retry_interval,
                        "holder notification returned unexpected status"
                    );
                }
                Err(AppError::Validation(message)) => {
                    error!(
                        address = %target.address(),
                        holder_identity = %target.holder_identity(),
                        attempt = attempts,
                        error = %message,
                        "holder notification destination is invalid, not retrying"
                    );
                    return DispatchOutcome::Undeliverable { attempts };
                }
                Err(error) => {
                    warn!(
                        address = %target.address(),
                        attempt = attempts,
                        error = %error,
                        retry_in = ?self.retry_interval,
                        "holder notification request failed"
                    );
                }
            }

            tokio::time::sleep(self.retry_interval).await;
        }
    }
}
