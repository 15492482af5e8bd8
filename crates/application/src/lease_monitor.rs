use leaderhook_core::AppResult;
use tracing::{error, info, warn};

use crate::change_detector::ChangeDetector;
use crate::lease_ports::LeaseEventSource;

/// Feeds watch events into the change detector, one at a time.
pub struct LeaseMonitor {
    detector: ChangeDetector,
}

impl LeaseMonitor {
    /// Creates a monitor around a detector.
    #[must_use]
    pub fn new(detector: ChangeDetector) -> Self {
        Self { detector }
    }

    /// Consumes `source` until it ends.
    ///
    /// Transport errors are logged and skipped. Returns the detector error when
    /// the very first observation cannot establish initial state.
    pub async fn run<S>(&mut self, source: &mut S) -> AppResult<()>
    where
        S: LeaseEventSource + ?Sized,
    {
        info!(lease = %self.detector.lease_name(), "watching lease");

        while let Some(event) = source.next_event().await {
            let event = match event {
                Ok(event) => event,
                Err(error) => {
                    warn!(
                        lease = %self.detector.lease_name(),
                        error = %error,
                        "lease watch error, waiting for watch to recover"
                    );
                    continue;
                }
            };

            match self.detector.on_event(event) {
                Ok(_) => {}
                Err(error) if self.detector.is_failed() => {
                    error!(
                        lease = %self.detector.lease_name(),
                        error = %error,
                        "cannot establish initial lease state, stopping watch"
                    );
                    return Err(error);
                }
                Err(error) => {
                    warn!(
                        lease = %self.detector.lease_name(),
                        error = %error,
                        "ignoring lease observation"
                    );
                }
            }
        }

        info!(lease = %self.detector.lease_name(), "lease watch ended");
        Ok(())
    }
}
