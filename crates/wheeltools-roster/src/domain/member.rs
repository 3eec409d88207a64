//! Tracked party members and their text-backed numeric fields.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use wheeltools_core::error::DomainError;
use wheeltools_core::providers::names_match;

pub use wheeltools_core::ipc::GAME_ID_SENTINEL;

/// A spin count or speed as typed by the user.
///
/// The raw text is kept so partial input survives a save, while the parsed
/// value is computed once when the text changes. Display and accrual read it
/// leniently (invalid text counts as zero); game creation reads it strictly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct SpinValue {
    raw: String,
    parsed: Option<i32>,
}

impl SpinValue {
    /// Wraps user-entered text.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let parsed = raw.trim().parse().ok();
        Self { raw, parsed }
    }

    /// Wraps a computed value.
    #[must_use]
    pub fn from_count(count: i32) -> Self {
        Self {
            raw: count.to_string(),
            parsed: Some(count),
        }
    }

    /// The text as entered.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed value, or 0 when the text is not an integer.
    #[must_use]
    pub fn lenient(&self) -> i32 {
        self.parsed.unwrap_or(0)
    }

    /// The parsed value, or `None` when the text is not an integer.
    #[must_use]
    pub fn strict(&self) -> Option<i32> {
        self.parsed
    }
}

impl Default for SpinValue {
    fn default() -> Self {
        Self::from_count(0)
    }
}

impl From<String> for SpinValue {
    fn from(raw: String) -> Self {
        Self::from_raw(raw)
    }
}

impl From<SpinValue> for String {
    fn from(value: SpinValue) -> Self {
        value.raw
    }
}

impl fmt::Display for SpinValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Identifier assigned by the game backend, absent until a create call succeeds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct GameId(Option<String>);

impl GameId {
    /// A game id that has not been assigned.
    #[must_use]
    pub fn not_created() -> Self {
        Self(None)
    }

    /// Wraps an id returned by the backend. Blank text and the sentinel are
    /// treated as "not created".
    #[must_use]
    pub fn assigned(id: impl Into<String>) -> Self {
        Self::from(id.into())
    }

    /// Returns the assigned id.
    #[must_use]
    pub fn as_created(&self) -> Option<&str> {
        self.0.as_deref()
    }

    /// Returns `true` once the backend has assigned an id.
    #[must_use]
    pub fn is_created(&self) -> bool {
        self.0.is_some()
    }
}

impl From<String> for GameId {
    fn from(raw: String) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed == GAME_ID_SENTINEL {
            Self(None)
        } else {
            Self(Some(trimmed.to_owned()))
        }
    }
}

impl From<GameId> for String {
    fn from(id: GameId) -> Self {
        id.0.unwrap_or_else(|| GAME_ID_SENTINEL.to_owned())
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_deref().unwrap_or(GAME_ID_SENTINEL))
    }
}

/// Values a newly seen member is seeded with.
#[derive(Debug, Clone)]
pub struct MemberSeed {
    /// Initial spin count.
    pub spin_count: SpinValue,
    /// Initial spin speed.
    pub spin_speed: SpinValue,
    /// Initial preset.
    pub preset_id: String,
}

/// A tracked party member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// Whether the member takes part in batch operations.
    pub enabled: bool,
    name: String,
    /// Spin entitlement.
    pub spin_count: SpinValue,
    /// Wheel speed passed to game creation.
    pub spin_speed: SpinValue,
    /// Opaque preset forwarded to game creation.
    pub preset_id: String,
    /// Remote game identifier.
    pub game_id: GameId,
    joined_at: DateTime<Utc>,
}

impl Member {
    /// Creates an enabled member from seed values.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if `name` is blank.
    pub fn new(
        name: impl Into<String>,
        seed: MemberSeed,
        joined_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "member name must not be empty".to_owned(),
            ));
        }
        Ok(Self {
            enabled: true,
            name,
            spin_count: seed.spin_count,
            spin_speed: seed.spin_speed,
            preset_id: seed.preset_id,
            game_id: GameId::not_created(),
            joined_at,
        })
    }

    /// Display and lookup name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// When the member was first tracked.
    #[must_use]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }

    /// Case-insensitive name match.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        names_match(&self.name, name)
    }

    /// Renames without any uniqueness check; the roster checks collisions.
    pub(crate) fn set_name(&mut self, name: String) {
        self.name = name;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn seed() -> MemberSeed {
        MemberSeed {
            spin_count: SpinValue::from_raw("3"),
            spin_speed: SpinValue::from_raw("8"),
            preset_id: "classic".to_owned(),
        }
    }

    #[test]
    fn test_spin_value_reads_invalid_text_leniently_as_zero() {
        let value = SpinValue::from_raw("3a");
        assert_eq!(value.raw(), "3a");
        assert_eq!(value.lenient(), 0);
        assert_eq!(value.strict(), None);
    }

    #[test]
    fn test_spin_value_tolerates_surrounding_whitespace() {
        assert_eq!(SpinValue::from_raw(" 7 ").strict(), Some(7));
    }

    #[test]
    fn test_game_id_sentinel_means_not_created() {
        let id = GameId::assigned(GAME_ID_SENTINEL);
        assert!(!id.is_created());
        assert_eq!(id.to_string(), GAME_ID_SENTINEL);

        let id = GameId::assigned("abc123");
        assert_eq!(id.as_created(), Some("abc123"));
    }

    #[test]
    fn test_member_serializes_text_fields_and_sentinel() {
        let joined = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let member = Member::new("Alys Tern", seed(), joined).unwrap();

        let json = serde_json::to_value(&member).unwrap();

        assert_eq!(json["spin_count"], "3");
        assert_eq!(json["game_id"], GAME_ID_SENTINEL);
        assert_eq!(json["enabled"], true);
        let back: Member = serde_json::from_value(json).unwrap();
        assert_eq!(back, member);
    }

    #[test]
    fn test_member_rejects_blank_name() {
        let joined = Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap();
        let result = Member::new("   ", seed(), joined);
        assert!(matches!(result, Err(DomainError::Validation(_))));
    }
}
