//! Membership pushed in by the host process.

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use wheeltools_core::providers::{
    MembershipProvider, MembershipSnapshot, PartyEntry, names_match,
};

/// Holds the last membership the host reported.
///
/// Reads as unavailable until the host sends its first snapshot.
#[derive(Debug)]
pub struct HostMembershipFeed {
    snapshot: Mutex<MembershipSnapshot>,
}

impl Default for HostMembershipFeed {
    fn default() -> Self {
        Self {
            snapshot: Mutex::new(MembershipSnapshot::Unavailable {
                reason: "host has not reported a party yet".to_owned(),
            }),
        }
    }
}

impl HostMembershipFeed {
    fn lock(&self) -> MutexGuard<'_, MembershipSnapshot> {
        self.snapshot
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Replaces the membership.
    pub fn replace(&self, snapshot: MembershipSnapshot) {
        *self.lock() = snapshot;
    }

    /// Adds or updates one entry. A feed that was unavailable becomes a party
    /// of one.
    pub fn insert(&self, entry: PartyEntry) {
        let mut snapshot = self.lock();
        match &mut *snapshot {
            MembershipSnapshot::Members(entries) => {
                match entries.iter_mut().find(|e| names_match(&e.name, &entry.name)) {
                    Some(existing) => *existing = entry,
                    None => entries.push(entry),
                }
            }
            MembershipSnapshot::Unavailable { .. } => {
                *snapshot = MembershipSnapshot::Members(vec![entry]);
            }
        }
    }

    /// Removes one entry by name.
    pub fn remove(&self, name: &str) {
        if let MembershipSnapshot::Members(entries) = &mut *self.lock() {
            entries.retain(|e| !names_match(&e.name, name));
        }
    }
}

#[async_trait]
impl MembershipProvider for HostMembershipFeed {
    async fn snapshot(&self) -> MembershipSnapshot {
        self.lock().clone()
    }
}
