//! Aligns the roster with the live membership source.
//!
//! Reconciliation only ever adds. Members missing from a snapshot keep their
//! game id and accrual history; leaving is reported separately through
//! [`Reconciler::on_member_left`], which disables instead of deleting.

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, instrument, warn};
use wheeltools_core::error::DomainError;
use wheeltools_core::providers::{MembershipProvider, MembershipSnapshot};

use super::roster_store::RosterStore;

/// Result of a refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// The membership source could not be read; nothing changed.
    Unavailable {
        /// Reason reported by the provider.
        reason: String,
    },
    /// The snapshot was applied.
    Reconciled {
        /// Names present in the snapshot.
        seen: usize,
        /// Names newly added to the roster, in snapshot order.
        added: Vec<String>,
        /// Names whose save failed. They are tracked in memory and written
        /// with the next successful save.
        failed: Vec<String>,
    },
}

/// Pulls membership snapshots into the roster store.
pub struct Reconciler {
    store: Arc<RosterStore>,
    membership: Arc<dyn MembershipProvider>,
}

impl Reconciler {
    /// Creates a reconciler over the given store and provider.
    #[must_use]
    pub fn new(store: Arc<RosterStore>, membership: Arc<dyn MembershipProvider>) -> Self {
        Self { store, membership }
    }

    /// Reads the membership source and adds every member not yet tracked.
    ///
    /// An unavailable source is a normal state and returns
    /// `ReconcileOutcome::Unavailable`. Entries that fail individually are
    /// skipped: blank names are dropped, failed saves are reported in
    /// `failed` and the remaining entries are still processed.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> ReconcileOutcome {
        let entries = match self.membership.snapshot().await {
            MembershipSnapshot::Unavailable { reason } => {
                info!(%reason, "membership unavailable, roster left untouched");
                return ReconcileOutcome::Unavailable { reason };
            }
            MembershipSnapshot::Members(entries) => entries,
        };

        if entries.is_empty() {
            info!("no party members");
        }

        let mut added = Vec::new();
        let mut failed = Vec::new();
        for entry in &entries {
            match self.store.upsert_from_membership(&entry.name) {
                Ok((member, true)) => added.push(member.name().to_owned()),
                Ok((_, false)) => {}
                Err(DomainError::Validation(reason)) => {
                    warn!(%reason, "skipping membership entry");
                }
                Err(e) => {
                    error!(member = %entry.name, error = %e, "failed to save membership entry");
                    failed.push(entry.name.clone());
                }
            }
        }

        info!(
            seen = entries.len(),
            added = added.len(),
            failed = failed.len(),
            "roster reconciled"
        );
        ReconcileOutcome::Reconciled {
            seen: entries.len(),
            added,
            failed,
        }
    }

    /// Hook for a member joining the party.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a blank name, or
    /// `DomainError::Infrastructure` if saving fails.
    pub fn on_member_joined(&self, name: &str) -> Result<bool, DomainError> {
        self.store
            .upsert_from_membership(name)
            .map(|(_, added)| added)
    }

    /// Hook for a member leaving the party: disables, never removes.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn on_member_left(&self, name: &str) -> Result<bool, DomainError> {
        let disabled = self.store.disable(name)?;
        if disabled {
            info!(member = name, "party member left, disabled in roster");
        }
        Ok(disabled)
    }
}
