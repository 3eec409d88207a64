//! The persisted roster aggregate: members, defaults and accrual settings.

use serde::{Deserialize, Serialize};
use wheeltools_core::error::DomainError;

use super::member::{Member, MemberSeed, SpinValue};

/// Schema version written with every saved document.
pub const CONFIG_VERSION: u32 = 1;

/// Upper bound for `max_spins_per_member`.
pub const MAX_SPINS_CEILING: i32 = 10;

/// Values new members are seeded with, plus the test-game flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterDefaults {
    /// Preset given to new members.
    pub preset: String,
    /// Spin count given to new members.
    pub spin_amount: SpinValue,
    /// Spin speed given to new members.
    pub spin_speed: SpinValue,
    /// Whether created games are flagged as test games.
    pub test_game: bool,
}

impl Default for RosterDefaults {
    fn default() -> Self {
        Self {
            preset: String::new(),
            spin_amount: SpinValue::from_count(0),
            spin_speed: SpinValue::from_count(8),
            test_game: false,
        }
    }
}

/// Settings for time-based spin accrual.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimedSpinSettings {
    enabled: bool,
    amount_earned_per_interval: i32,
    interval_minutes: i32,
    max_spins_per_member: i32,
}

impl TimedSpinSettings {
    /// Builds settings, clamping the per-member cap to `0..=MAX_SPINS_CEILING`.
    #[must_use]
    pub fn new(
        enabled: bool,
        amount_earned_per_interval: i32,
        interval_minutes: i32,
        max_spins_per_member: i32,
    ) -> Self {
        Self {
            enabled,
            amount_earned_per_interval,
            interval_minutes,
            max_spins_per_member: max_spins_per_member.clamp(0, MAX_SPINS_CEILING),
        }
    }

    /// Whether accrual runs.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Spins awarded per full interval.
    #[must_use]
    pub fn amount_earned_per_interval(&self) -> i32 {
        self.amount_earned_per_interval
    }

    /// Interval length in minutes.
    #[must_use]
    pub fn interval_minutes(&self) -> i32 {
        self.interval_minutes
    }

    /// Cap on accrued spins.
    #[must_use]
    pub fn max_spins_per_member(&self) -> i32 {
        self.max_spins_per_member.clamp(0, MAX_SPINS_CEILING)
    }
}

impl Default for TimedSpinSettings {
    fn default() -> Self {
        Self::new(false, 1, 10, MAX_SPINS_CEILING)
    }
}

/// The process-wide roster aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    version: u32,
    /// Member defaults.
    pub defaults: RosterDefaults,
    timed_spins: TimedSpinSettings,
    members: Vec<Member>,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            defaults: RosterDefaults::default(),
            timed_spins: TimedSpinSettings::default(),
            members: Vec::new(),
        }
    }
}

impl RosterConfig {
    /// Schema version of this document.
    #[must_use]
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Members in display order.
    #[must_use]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Finds a member by case-insensitive name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.is_named(name))
    }

    /// Finds a member by case-insensitive name for editing.
    pub fn find_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.is_named(name))
    }

    /// Mutable access to all members. Names cannot be changed through it.
    pub fn members_mut(&mut self) -> impl Iterator<Item = &mut Member> {
        self.members.iter_mut()
    }

    /// Current accrual settings.
    #[must_use]
    pub fn timed_spins(&self) -> TimedSpinSettings {
        self.timed_spins
    }

    /// Replaces the accrual settings.
    pub fn set_timed_spins(&mut self, settings: TimedSpinSettings) {
        self.timed_spins = settings;
    }

    /// Seed values taken from the current defaults.
    #[must_use]
    pub fn member_seed(&self) -> MemberSeed {
        MemberSeed {
            spin_count: self.defaults.spin_amount.clone(),
            spin_speed: self.defaults.spin_speed.clone(),
            preset_id: self.defaults.preset.clone(),
        }
    }

    /// Appends a member.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a member with the same name
    /// (case-insensitive) already exists.
    pub fn add_member(&mut self, member: Member) -> Result<(), DomainError> {
        if self.find(member.name()).is_some() {
            return Err(DomainError::Validation(format!(
                "member {} is already tracked",
                member.name()
            )));
        }
        self.members.push(member);
        Ok(())
    }

    /// Renames a member. Returns `Ok(false)` if `from` is not tracked.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the new name is blank or belongs to
    /// another member.
    pub fn rename_member(&mut self, from: &str, to: &str) -> Result<bool, DomainError> {
        if to.trim().is_empty() {
            return Err(DomainError::Validation(
                "member name must not be empty".to_owned(),
            ));
        }
        let Some(index) = self.members.iter().position(|m| m.is_named(from)) else {
            return Ok(false);
        };
        let collides = self
            .members
            .iter()
            .enumerate()
            .any(|(i, m)| i != index && m.is_named(to));
        if collides {
            return Err(DomainError::Validation(format!(
                "member {to} is already tracked"
            )));
        }
        self.members[index].set_name(to.to_owned());
        Ok(true)
    }

    /// Drops all members, keeping defaults and accrual settings.
    pub fn clear_members(&mut self) {
        self.members.clear();
    }

    /// Brings a loaded document up to the current schema and re-applies
    /// invariants that hand-edited files may have broken.
    pub fn normalize(&mut self) {
        self.version = CONFIG_VERSION;
        self.timed_spins = TimedSpinSettings::new(
            self.timed_spins.enabled,
            self.timed_spins.amount_earned_per_interval,
            self.timed_spins.interval_minutes,
            self.timed_spins.max_spins_per_member,
        );
        let mut seen: Vec<String> = Vec::with_capacity(self.members.len());
        self.members.retain(|m| {
            let key = m.name().to_lowercase();
            if m.name().trim().is_empty() || seen.contains(&key) {
                false
            } else {
                seen.push(key);
                true
            }
        });
    }
}
