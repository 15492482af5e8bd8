use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use leaderhook_core::{AppError, AppResult};
use leaderhook_domain::NotificationTarget;
use tokio::sync::Mutex;

use crate::holder_state::{HolderStateWriter, holder_state_channel};
use crate::lease_ports::{
    HolderChange, HolderNotifier, NotificationResponse, ReconciliationLauncher, TargetLocator,
};
use crate::notification_dispatcher::{DispatchOutcome, NotificationDispatcher};
use crate::target_resolver::{ResolutionStrategy, TargetResolver};

use super::{ReconciliationOutcome, ReconciliationPhase, ReconciliationSupervisor};

struct FixedLocator {
    address: Option<String>,
}

#[async_trait]
impl TargetLocator for FixedLocator {
    async fn locate(&self, _node_id: &str) -> AppResult<Option<String>> {
        Ok(self.address.clone())
    }
}

#[derive(Default)]
struct FakeNotifier {
    statuses: Mutex<VecDeque<u16>>,
    sent: Mutex<Vec<NotificationTarget>>,
}

#[async_trait]
impl HolderNotifier for FakeNotifier {
    async fn send_notification(
        &self,
        target: &NotificationTarget,
    ) -> AppResult<NotificationResponse> {
        self.sent.lock().await.push(target.clone());
        match self.statuses.lock().await.pop_front() {
            Some(status) => Ok(NotificationResponse {
                status,
                body: String::new(),
            }),
            None => Err(AppError::Transport("connection refused".to_owned())),
        }
    }
}

fn supervisor(
    address: Option<&str>,
    statuses: Vec<u16>,
) -> (ReconciliationSupervisor, Arc<FakeNotifier>) {
    let notifier = Arc::new(FakeNotifier {
        statuses: Mutex::new(statuses.into()),
        sent: Mutex::default(),
    });
    let resolver = TargetResolver::new(ResolutionStrategy::Discover(Arc::new(FixedLocator {
        address: address.map(str::to_owned),
    })));
    let dispatcher = NotificationDispatcher::new(notifier.clone());
    (ReconciliationSupervisor::new(resolver, dispatcher), notifier)
}

fn change(holder: &str) -> (HolderStateWriter, HolderChange) {
    let (writer, reader) = holder_state_channel();
    writer.accept(holder, None);
    let change = HolderChange {
        holder_identity: holder.to_owned(),
        token: reader.guard().snapshot(),
    };
    (writer, change)
}

#[tokio::test(start_paused = true)]
async fn reconcile_resolves_then_delivers() {
    let (supervisor, notifier) = supervisor(Some("10.0.0.5"), vec![200]);
    let (_writer, change) = change("node-1");

    let outcome = supervisor.reconcile(change).await;

    assert_eq!(
        outcome,
        ReconciliationOutcome::Dispatched(DispatchOutcome::Delivered { attempts: 1 })
    );
    let sent = notifier.sent.lock().await.clone();
    assert_eq!(sent, vec![NotificationTarget::new("10.0.0.5", "node-1")]);
    assert!(supervisor.live_reconciliations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn canceled_resolution_sends_nothing() {
    let (supervisor, notifier) = supervisor(None, vec![200]);
    let (writer, change) = change("node-1");

    let handle = tokio::spawn({
        let supervisor = supervisor.clone();
        async move { supervisor.reconcile(change).await }
    });
    tokio::time::sleep(Duration::from_secs(6)).await;
    writer.accept("node-2", None);

    let outcome = handle.await.unwrap_or_else(|_| unreachable!());

    assert_eq!(outcome, ReconciliationOutcome::ResolutionCanceled);
    assert!(notifier.sent.lock().await.is_empty());
    assert!(supervisor.live_reconciliations().is_empty());
}

#[tokio::test(start_paused = true)]
async fn launched_reconciliation_is_listed_until_superseded() {
    let (supervisor, notifier) = supervisor(Some("10.0.0.5"), Vec::new());
    let (writer, change) = change("node-1");

    supervisor.launch(change);
    tokio::time::sleep(Duration::from_secs(1)).await;

    let live = supervisor.live_reconciliations();
    assert_eq!(live.len(), 1);
    assert_eq!(live[0].generation, 1);
    assert_eq!(live[0].holder_identity, "node-1");
    assert_eq!(live[0].phase, ReconciliationPhase::Dispatching);

    writer.accept("node-2", None);
    tokio::time::sleep(NotificationDispatcher::DEFAULT_RETRY_INTERVAL).await;

    assert!(supervisor.live_reconciliations().is_empty());
    assert_eq!(notifier.sent.lock().await.len(), 1);
}
