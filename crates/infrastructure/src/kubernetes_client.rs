use kube::Client;
use leaderhook_core::{AppError, AppResult};

/// Connects to the Kubernetes API using in-cluster or kubeconfig credentials.
pub async fn connect_kubernetes_client() -> AppResult<Client> {
    Client::try_default().await.map_err(|error| {
        AppError::Coordination(format!("failed to create Kubernetes client: {error}"))
    })
}
