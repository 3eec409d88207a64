//! Fans create-game calls and link messages out over the enabled members.
//!
//! Batches work from a snapshot of member names taken at the start and look
//! each member up again before touching it, so roster edits made while a
//! batch is suspended are seen and never shift it onto the wrong member.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;
use wheeltools_core::error::DomainError;
use wheeltools_core::providers::{MembershipProvider, MessagingProvider, Recipient};
use wheeltools_ipc::client::IpcClient;
use wheeltools_roster::application::roster_store::RosterStore;
use wheeltools_roster::domain::member::{GameId, Member};

use crate::domain::delivery::{DeliverySettings, create_game_message};
use crate::domain::report::BatchReport;

/// Creates games and delivers their links.
pub struct Orchestrator {
    store: Arc<RosterStore>,
    ipc: Arc<IpcClient>,
    membership: Arc<dyn MembershipProvider>,
    messenger: Arc<dyn MessagingProvider>,
    settings: DeliverySettings,
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Orchestrator {
    /// Creates an orchestrator.
    #[must_use]
    pub fn new(
        store: Arc<RosterStore>,
        ipc: Arc<IpcClient>,
        membership: Arc<dyn MembershipProvider>,
        messenger: Arc<dyn MessagingProvider>,
        settings: DeliverySettings,
    ) -> Self {
        Self {
            store,
            ipc,
            membership,
            messenger,
            settings,
        }
    }

    /// Link text for `game_id`.
    #[must_use]
    pub fn link_for(&self, game_id: &str) -> String {
        self.settings.link_for(game_id)
    }

    fn enabled_names(&self) -> Vec<String> {
        self.store.read(|config| {
            config
                .members()
                .iter()
                .filter(|m| m.enabled)
                .map(|m| m.name().to_owned())
                .collect()
        })
    }

    /// Requests a game for every enabled member, in roster order, and stores
    /// the returned ids. One member's failure never stops the batch.
    pub async fn create_games_for_enabled(&self) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let span = info_span!("create_games", %batch_id);
        self.create_games(batch_id).instrument(span).await
    }

    async fn create_games(&self, batch_id: Uuid) -> BatchReport {
        let mut report = BatchReport::new(batch_id);
        let names = self.enabled_names();
        let test_game = self.store.read(|config| config.defaults.test_game);
        info!(members = names.len(), test_game, "creating games");

        for name in names {
            let Some(member) = self.store.member(&name).filter(|m| m.enabled) else {
                error!(member = %name, "member left or was disabled before its game was created");
                report.skip(&name);
                continue;
            };
            let message = match create_game_message(&member, &self.settings.theme, test_game) {
                Ok(message) => message,
                Err(e) => {
                    warn!(member = %name, error = %e, "not creating game");
                    report.fail(&name, e);
                    continue;
                }
            };

            let game_id = match self.ipc.create_game(&message).await {
                Ok(id) => id,
                Err(e) if e.is_transient() => {
                    info!(member = %name, error = %e, "game backend unavailable");
                    report.fail(&name, e);
                    continue;
                }
                Err(e) => {
                    warn!(member = %name, error = %e, "game creation failed");
                    report.fail(&name, e);
                    continue;
                }
            };

            match self.store.set_game_id(&name, GameId::assigned(game_id.clone())) {
                Ok(true) => {
                    info!(member = %name, %game_id, "game created");
                    report.succeed(&name);
                }
                Ok(false) => report.skip(&name),
                Err(e) => {
                    error!(member = %name, error = %e, "could not store game id");
                    report.fail(&name, e);
                }
            }
        }

        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "game creation finished"
        );
        report
    }

    /// Sends each enabled member with a created game its link, pausing
    /// between consecutive sends.
    pub async fn send_links_to_enabled(&self) -> BatchReport {
        let batch_id = Uuid::new_v4();
        let span = info_span!("send_links", %batch_id);
        self.send_links(batch_id).instrument(span).await
    }

    async fn send_links(&self, batch_id: Uuid) -> BatchReport {
        let mut report = BatchReport::new(batch_id);
        let names: Vec<String> = self.store.read(|config| {
            config
                .members()
                .iter()
                .filter(|m| m.enabled && m.game_id.is_created())
                .map(|m| m.name().to_owned())
                .collect()
        });
        info!(members = names.len(), "sending game links");

        let mut first = true;
        for name in names {
            if !first {
                time::sleep(self.settings.send_delay).await;
            }
            first = false;

            let Some(member) = self.store.member(&name).filter(|m| m.enabled) else {
                error!(member = %name, "member left or was disabled before its link was sent");
                report.skip(&name);
                continue;
            };
            match self.deliver(&member).await {
                Ok(()) => report.succeed(&name),
                Err(e) => {
                    warn!(member = %name, error = %e, "link not sent");
                    report.fail(&name, e);
                }
            }
        }

        info!(
            attempted = report.attempted(),
            succeeded = report.succeeded.len(),
            failed = report.failed.len(),
            skipped = report.skipped.len(),
            "link delivery finished"
        );
        report
    }

    /// Runs [`Self::send_links_to_enabled`] on its own task. Aborting the
    /// handle stops delivery between two sends.
    #[must_use]
    pub fn spawn_send_links(self: &Arc<Self>) -> JoinHandle<BatchReport> {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move { orchestrator.send_links_to_enabled().await })
    }

    /// Sends one member their link.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MemberNotFound` for an unknown member,
    /// `DomainError::Validation` when no game has been created for them yet,
    /// and whatever the messaging provider reports otherwise.
    pub async fn send_link_to_member(&self, name: &str) -> Result<(), DomainError> {
        let member = self
            .store
            .member(name)
            .ok_or_else(|| DomainError::MemberNotFound(name.to_owned()))?;
        self.deliver(&member).await
    }

    async fn deliver(&self, member: &Member) -> Result<(), DomainError> {
        let game_id = member.game_id.as_created().ok_or_else(|| {
            DomainError::Validation(format!("no game has been created for {}", member.name()))
        })?;
        let world = self
            .membership
            .snapshot()
            .await
            .find(member.name())
            .and_then(|entry| entry.world.clone());
        let recipient = Recipient::new(member.name(), world);
        let text = self.link_for(game_id);

        self.messenger.send(&recipient, &text).await?;
        info!(%recipient, %game_id, "game link sent");
        Ok(())
    }
}
