//! Ports to the external membership source and the outbound chat channel.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Case-insensitive member name comparison used everywhere names are matched.
#[must_use]
pub fn names_match(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// One member as reported by the live membership source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyEntry {
    /// Character name.
    pub name: String,
    /// Home world, when the source can resolve it.
    #[serde(default)]
    pub world: Option<String>,
}

impl PartyEntry {
    /// Creates an entry without world information.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            world: None,
        }
    }
}

/// A read of the membership source.
///
/// `Unavailable` and an empty `Members` list are different, equally valid
/// states: the first means there is nothing to read (no session, no source),
/// the second means the party is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MembershipSnapshot {
    /// The source cannot be read right now.
    Unavailable {
        /// Why the source is unavailable, for logging.
        reason: String,
    },
    /// Current members in source order.
    Members(Vec<PartyEntry>),
}

impl MembershipSnapshot {
    /// Finds an entry by case-insensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&PartyEntry> {
        match self {
            Self::Unavailable { .. } => None,
            Self::Members(entries) => entries.iter().find(|e| names_match(&e.name, name)),
        }
    }
}

/// Read-only access to the live membership source.
#[async_trait]
pub trait MembershipProvider: Send + Sync {
    /// Returns the current membership snapshot.
    async fn snapshot(&self) -> MembershipSnapshot;
}

/// Addressee of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    /// Character name.
    pub name: String,
    /// Home world, if known.
    pub world: Option<String>,
}

impl Recipient {
    /// Builds a recipient, dropping a blank world.
    #[must_use]
    pub fn new(name: impl Into<String>, world: Option<String>) -> Self {
        Self {
            name: name.into(),
            world: world.filter(|w| !w.trim().is_empty()),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.world {
            Some(world) => write!(f, "{}@{world}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// Outbound chat channel (tells/whispers).
#[async_trait]
pub trait MessagingProvider: Send + Sync {
    /// Sends `text` to `recipient`. Delivery is not guaranteed.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ProviderUnavailable` when the channel cannot
    /// accept messages.
    async fn send(&self, recipient: &Recipient, text: &str) -> Result<(), DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recipient_is_qualified_with_world_when_known() {
        let recipient = Recipient::new("Alys Tern", Some("Odin".to_owned()));
        assert_eq!(recipient.to_string(), "Alys Tern@Odin");
    }

    #[test]
    fn test_recipient_without_world_is_bare_name() {
        assert_eq!(Recipient::new("Alys Tern", None).to_string(), "Alys Tern");
        assert_eq!(
            Recipient::new("Alys Tern", Some("  ".to_owned())).to_string(),
            "Alys Tern"
        );
    }

    #[test]
    fn test_snapshot_find_is_case_insensitive() {
        let snapshot = MembershipSnapshot::Members(vec![PartyEntry {
            name: "Alys Tern".to_owned(),
            world: Some("Odin".to_owned()),
        }]);

        let found = snapshot.find("alys tern").unwrap();
        assert_eq!(found.world.as_deref(), Some("Odin"));
        assert!(
            MembershipSnapshot::Unavailable {
                reason: "not logged in".to_owned()
            }
            .find("Alys Tern")
            .is_none()
        );
    }
}
