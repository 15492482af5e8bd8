use std::sync::Arc;
use std::time::Duration;

use leaderhook_domain::NotificationTarget;
use tracing::{debug, info, warn};

use crate::holder_state::GenerationToken;
use crate::lease_ports::TargetLocator;

/// How notification destinations are chosen.
#[derive(Clone)]
pub enum ResolutionStrategy {
    /// Always notify one pre-known address; discovery is skipped.
    Static(String),
    /// Look up the companion running on the new holder's node.
    Discover(Arc<dyn TargetLocator>),
}

/// Result of one resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Destination found.
    Resolved(NotificationTarget),
    /// Nothing to resolve, or a newer change superseded this one.
    Canceled,
}

/// Resolves a holder identity into a notification destination.
#[derive(Clone)]
pub struct TargetResolver {
    strategy: ResolutionStrategy,
    retry_interval: Duration,
}

impl TargetResolver {
    /// Wait between locate attempts.
    pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(5);

    /// Creates a resolver with the default retry interval.
    #[must_use]
    pub fn new(strategy: ResolutionStrategy) -> Self {
        Self {
            strategy,
            retry_interval: Self::DEFAULT_RETRY_INTERVAL,
        }
    }

    /// Overrides the fixed wait between locate attempts.
    #[must_use]
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.retry_interval = retry_interval;
        self
    }

    /// Resolves `node_id` until the locator finds it or `token` goes stale.
    ///
    /// Locate misses and locate failures are both retried after the fixed
    /// interval, without an attempt limit.
    pub async fn resolve(&self, node_id: &str, token: &GenerationToken) -> Resolution {
        let locator = match &self.strategy {
            ResolutionStrategy::Static(address) => {
                debug!(address = %address, "using static notification destination");
                return Resolution::Resolved(NotificationTarget::new(address.as_str(), node_id));
            }
            ResolutionStrategy::Discover(locator) => locator,
        };

        if node_id.is_empty() {
            debug!("empty holder identity, nothing to resolve");
            return Resolution::Canceled;
        }

        let mut attempt = 0_u32;
        loop {
            if token.is_stale() {
                info!(
                    node_id = %node_id,
                    generation = token.generation(),
                    attempts = attempt,
                    "holder changed while locating companion, abandoning"
                );
                return Resolution::Canceled;
            }

            attempt = attempt.saturating_add(1);
            match locator.locate(node_id).await {
                Ok(Some(address)) => {
                    info!(
                        node_id = %node_id,
                        address = %address,
                        attempt,
                        "located companion"
                    );
                    return Resolution::Resolved(NotificationTarget::new(address, node_id));
                }
                Ok(None) => {
                    info!(
                        node_id = %node_id,
                        attempt,
                        retry_in = ?self.retry_interval,
                        "companion not running on node yet"
                    );
                }
                Err(error) => {
                    warn!(
                        node_id = %node_id,
                        attempt,
                        error = %error,
                        retry_in = ?self.retry_interval,
                        "failed to locate companion"
                    );
                }
            }

            tokio::time::sleep(self.retry_interval).await;
        }
    }
}
