use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use k8s_openapi::api::coordination::v1::Lease;
use kube::runtime::WatchStreamExt;
use kube::runtime::watcher::{self, Event};
use kube::{Api, Client};
use leaderhook_application::LeaseEventSource;
use leaderhook_core::{AppError, AppResult};
use leaderhook_domain::{LeaseEvent, LeaseObservation};
use tracing::debug;

type LeaseWatchStream = BoxStream<'static, Result<Event<Lease>, watcher::Error>>;

/// Watches one named lease through the Kubernetes API.
///
/// The underlying watcher relists and reconnects with backoff on its own, so
/// errors surfaced here are informational.
pub struct KubernetesLeaseEventSource {
    lease_name: String,
    events: LeaseWatchStream,
}

impl KubernetesLeaseEventSource {
    /// Starts watching `lease_name` in `namespace`.
    #[must_use]
    pub fn new(client: Client, namespace: &str, lease_name: impl Into<String>) -> Self {
        let lease_name = lease_name.into();
        let leases: Api<Lease> = Api::namespaced(client, namespace);
        let config = watcher::Config::default().fields(&format!("metadata.name={lease_name}"));
        let events = watcher::watcher(leases, config).default_backoff().boxed();

        Self { lease_name, events }
    }
}

#[async_trait]
impl LeaseEventSource for KubernetesLeaseEventSource {
    async fn next_event(&mut self) -> Option<AppResult<LeaseEvent>> {
        loop {
            let event = match self.events.next().await? {
                Ok(event) => event,
                Err(error) => {
                    return Some(Err(AppError::Coordination(format!(
                        "watch on lease '{}' failed: {error}",
                        self.lease_name
                    ))));
                }
            };

            match event {
                Event::Apply(lease) | Event::InitApply(lease) => {
                    return Some(Ok(LeaseEvent::Applied(observation_from_lease(&lease))));
                }
                Event::Delete(lease) => {
                    return Some(Ok(LeaseEvent::Deleted {
                        lease_name: lease.metadata.name.unwrap_or_default(),
                    }));
                }
                Event::Init => debug!(lease = %self.lease_name, "lease watch relisting"),
                Event::InitDone => debug!(lease = %self.lease_name, "lease watch relist done"),
            }
        }
    }
}

fn observation_from_lease(lease: &Lease) -> LeaseObservation {
    let spec = lease.spec.as_ref();
    LeaseObservation::new(
        lease.metadata.name.clone().unwrap_or_default(),
        spec.and_then(|spec| spec.holder_identity.clone()),
        spec.and_then(|spec| spec.acquire_time.as_ref())
            .map(|acquire_time| acquire_time.0),
    )
}
