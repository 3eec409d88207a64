//! Shared application state.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::task::JoinHandle;
use tracing::info;
use wheeltools_core::clock::Clock;
use wheeltools_ipc::client::IpcClient;
use wheeltools_orchestration::application::orchestrator::Orchestrator;
use wheeltools_orchestration::domain::delivery::DeliverySettings;
use wheeltools_orchestration::domain::report::BatchReport;
use wheeltools_roster::application::reconciler::Reconciler;
use wheeltools_roster::application::roster_store::RosterStore;

use crate::adapters::membership_feed::HostMembershipFeed;
use crate::adapters::outbox::Outbox;

/// The background link delivery, if one has been started.
#[derive(Debug, Default)]
pub struct LinkDelivery {
    task: Mutex<Option<JoinHandle<BatchReport>>>,
}

impl LinkDelivery {
    fn lock(&self) -> MutexGuard<'_, Option<JoinHandle<BatchReport>>> {
        self.task
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Starts delivery unless one is still running. Returns `false` when one
    /// was already running.
    pub fn start(&self, orchestrator: &Arc<Orchestrator>) -> bool {
        let mut task = self.lock();
        if task.as_ref().is_some_and(|t| !t.is_finished()) {
            return false;
        }
        *task = Some(orchestrator.spawn_send_links());
        true
    }

    /// Stops a running delivery. Returns `false` when nothing was running.
    pub fn abort(&self) -> bool {
        match self.lock().take() {
            Some(task) if !task.is_finished() => {
                task.abort();
                info!("link delivery aborted");
                true
            }
            _ => false,
        }
    }

    /// `true` while a delivery is in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().as_ref().is_some_and(|t| !t.is_finished())
    }
}

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// Clock for time-in-party views.
    pub clock: Arc<dyn Clock>,
    /// The roster.
    pub store: Arc<RosterStore>,
    /// Client for the create-game channel.
    pub ipc: Arc<IpcClient>,
    /// Membership reconciliation.
    pub reconciler: Arc<Reconciler>,
    /// Game creation and link delivery.
    pub orchestrator: Arc<Orchestrator>,
    /// Membership reported by the host.
    pub membership: Arc<HostMembershipFeed>,
    /// Chat commands waiting for the host.
    pub outbox: Arc<Outbox>,
    /// Background link delivery.
    pub link_delivery: Arc<LinkDelivery>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("store", &self.store)
            .field("orchestrator", &self.orchestrator)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Wires the roster, the host adapters and orchestration together.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        store: Arc<RosterStore>,
        ipc: Arc<IpcClient>,
        delivery: DeliverySettings,
    ) -> Self {
        let membership = Arc::new(HostMembershipFeed::default());
        let outbox = Arc::new(Outbox::default());
        let reconciler = Arc::new(Reconciler::new(store.clone(), membership.clone()));
        let orchestrator = Arc::new(Orchestrator::new(
            store.clone(),
            ipc.clone(),
            membership.clone(),
            outbox.clone(),
            delivery,
        ));
        Self {
            clock,
            store,
            ipc,
            reconciler,
            orchestrator,
            membership,
            outbox,
            link_delivery: Arc::new(LinkDelivery::default()),
        }
    }
}
