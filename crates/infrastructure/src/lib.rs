//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod http_holder_notifier;
mod kubernetes_client;
mod kubernetes_daemon_set_locator;
mod kubernetes_lease_event_source;

pub use http_holder_notifier::HttpHolderNotifier;
pub use kubernetes_client::connect_kubernetes_client;
pub use kubernetes_daemon_set_locator::KubernetesDaemonSetLocator;
pub use kubernetes_lease_event_source::KubernetesLeaseEventSource;
