use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::ListParams;
use kube::{Api, Client};
use leaderhook_application::TargetLocator;
use leaderhook_core::{AppError, AppResult};
use tracing::debug;

/// Locates the pod a DaemonSet runs on a given node.
pub struct KubernetesDaemonSetLocator {
    pods: Api<Pod>,
    daemon_set_name: String,
}

impl KubernetesDaemonSetLocator {
    /// Creates a locator for pods of `daemon_set_name` in `namespace`.
    #[must_use]
    pub fn new(client: Client, namespace: &str, daemon_set_name: impl Into<String>) -> Self {
        Self {
            pods: Api::namespaced(client, namespace),
            daemon_set_name: daemon_set_name.into(),
        }
    }
}

#[async_trait]
impl TargetLocator for KubernetesDaemonSetLocator {
    async fn locate(&self, node_id: &str) -> AppResult<Option<String>> {
        let params = ListParams::default().fields(&format!("spec.nodeName={node_id}"));
        let pods = self.pods.list(&params).await.map_err(|error| {
            AppError::Coordination(format!(
                "failed to list pods on node '{node_id}': {error}"
            ))
        })?;

        debug!(
            node_id = %node_id,
            daemon_set = %self.daemon_set_name,
            pods = pods.items.len(),
            "listed pods for daemonset lookup"
        );

        Ok(daemon_set_pod_address(
            &pods.items,
            node_id,
            self.daemon_set_name.as_str(),
        ))
    }
}

/// Returns the IP of the first pod on `node_id` owned by `daemon_set_name`.
///
/// Pods that have not been assigned an IP yet are skipped.
fn daemon_set_pod_address(pods: &[Pod], node_id: &str, daemon_set_name: &str) -> Option<String> {
    pods.iter()
        .filter(|pod| {
            pod.spec
                .as_ref()
                .and_then(|spec| spec.node_name.as_deref())
                == Some(node_id)
        })
        .filter(|pod| is_owned_by_daemon_set(pod, daemon_set_name))
        .find_map(|pod| {
            pod.status
                .as_ref()
                .and_then(|status| status.pod_ip.clone())
                .filter(|address| !address.is_empty())
        })
}

fn is_owned_by_daemon_set(pod: &Pod, daemon_set_name: &str) -> bool {
    pod.metadata
        .owner_references
        .as_deref()
        .unwrap_or_default()
        .iter()
        .any(|owner| owner.kind == "DaemonSet" && owner.name == daemon_set_name)
}
