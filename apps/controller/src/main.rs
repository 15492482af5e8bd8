//! Leaderhook controller: watches a lease and notifies the new holder's companion pod.

#![forbid(unsafe_code)]

mod controller_config;
mod dto;
mod error;
mod handlers;
mod state;
mod status_router;

use std::future::Future;
use std::pin::pin;
use std::sync::Arc;

use kube::Client;
use leaderhook_application::{
    ChangeDetector, LeaseMonitor, NotificationDispatcher, ReconciliationSupervisor,
    ResolutionStrategy, StatusService, TargetResolver, holder_state_channel,
};
use leaderhook_core::{AppError, AppResult};
use leaderhook_infrastructure::{
    HttpHolderNotifier, KubernetesDaemonSetLocator, KubernetesLeaseEventSource,
    connect_kubernetes_client,
};
use tokio::net::TcpListener;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info, warn};

use crate::controller_config::{ControllerConfig, DestinationConfig, init_tracing};
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = ControllerConfig::load()?;
    let client = connect_kubernetes_client().await?;
    let http_client = reqwest::Client::builder()
        .build()
        .map_err(|error| AppError::Internal(format!("failed to build HTTP client: {error}")))?;

    let (writer, reader) = holder_state_channel();
    let supervisor = ReconciliationSupervisor::new(
        TargetResolver::new(resolution_strategy(&config, client.clone()))
            .with_retry_interval(config.resolve_retry_interval),
        NotificationDispatcher::new(Arc::new(HttpHolderNotifier::new(
            http_client,
            config.notification_endpoint.clone(),
            config.notify_timeout,
        )))
        .with_retry_interval(config.notify_retry_interval),
    );

    let app_state = AppState {
        status_service: StatusService::new(reader, supervisor.clone()),
    };
    let listener = TcpListener::bind(config.endpoint).await.map_err(|error| {
        AppError::Internal(format!("failed to bind {}: {error}", config.endpoint))
    })?;

    info!(
        endpoint = %config.endpoint,
        lease = %config.lease_name.as_str(),
        namespace = %config.namespace.as_str(),
        destination = ?config.destination,
        "leaderhook-controller started"
    );

    let server = tokio::spawn(async move {
        axum::serve(listener, status_router::build_router(app_state))
            .await
            .map_err(|error| AppError::Internal(format!("status server failed: {error}")))
    });

    let detector = ChangeDetector::new(config.lease_name.as_str(), writer, Arc::new(supervisor));
    let mut source = KubernetesLeaseEventSource::new(
        client,
        config.namespace.as_str(),
        config.lease_name.as_str(),
    );
    let mut monitor = LeaseMonitor::new(detector);

    run_until_server_exit(monitor.run(&mut source), server).await
}

/// Runs the lease watch next to the status server.
///
/// The watch ending leaves the server up so `/healthz` keeps reporting. The
/// server exiting ends the process, even while the watch is still running.
async fn run_until_server_exit<W>(
    watch: W,
    mut server: JoinHandle<AppResult<()>>,
) -> AppResult<()>
where
    W: Future<Output = AppResult<()>>,
{
    let mut watch = pin!(watch);

    tokio::select! {
        result = &mut watch => match result {
            Ok(()) => warn!("lease watch ended, status server keeps serving last known state"),
            Err(error) => error!(
                error = %error,
                "lease monitor stopped, status server keeps reporting unhealthy"
            ),
        },
        result = &mut server => {
            let result = status_server_result(result);
            match &result {
                Ok(()) => warn!("status server stopped while watching lease"),
                Err(error) => error!(error = %error, "status server failed while watching lease"),
            }
            return result;
        }
    }

    let result = status_server_result(server.await);
    if let Err(error) = &result {
        error!(error = %error, "status server exited");
    }
    result
}

fn status_server_result(result: Result<AppResult<()>, JoinError>) -> AppResult<()> {
    result.map_err(|error| AppError::Internal(format!("status server task failed: {error}")))?
}

fn resolution_strategy(config: &ControllerConfig, client: Client) -> ResolutionStrategy {
    match &config.destination {
        DestinationConfig::ServiceHost(host) => ResolutionStrategy::Static(host.clone()),
        DestinationConfig::DaemonSet(daemon_set_name) => {
            ResolutionStrategy::Discover(Arc::new(KubernetesDaemonSetLocator::new(
                client,
                config.namespace.as_str(),
                daemon_set_name.as_str(),
            )))
        }
    }
}
