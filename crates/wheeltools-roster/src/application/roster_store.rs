//! The roster store: sole owner of `RosterConfig`.
//!
//! Every write applies the change and saves the document while holding the
//! store lock, so the accrual tick and foreground operations never interleave
//! inside a write. Ad hoc edits go through [`RosterStore::mutate`].

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Deserialize;
use tracing::{error, info, warn};
use wheeltools_core::clock::Clock;
use wheeltools_core::error::DomainError;
use wheeltools_core::repository::ConfigRepository;

use crate::domain::config::{RosterConfig, TimedSpinSettings};
use crate::domain::member::{GameId, Member, SpinValue};

/// Partial edit of one member. `None` fields are left alone.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberUpdate {
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New name.
    pub name: Option<String>,
    /// New spin count text.
    pub spin_count: Option<String>,
    /// New spin speed text.
    pub spin_speed: Option<String>,
    /// New preset.
    pub preset_id: Option<String>,
}

/// Partial edit of the member defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DefaultsUpdate {
    /// New default preset.
    pub preset: Option<String>,
    /// New default spin amount text.
    pub spin_amount: Option<String>,
    /// New default spin speed text.
    pub spin_speed: Option<String>,
    /// New test-game flag.
    pub test_game: Option<bool>,
}

/// Partial edit of the accrual settings.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct TimedSpinsUpdate {
    /// Turn accrual on or off.
    pub enabled: Option<bool>,
    /// Spins per interval.
    pub amount_earned_per_interval: Option<i32>,
    /// Interval length in minutes.
    pub interval_minutes: Option<i32>,
    /// Cap per member; clamped to 0..=10.
    pub max_spins_per_member: Option<i32>,
}

/// Mutex-guarded roster aggregate with save-after-every-write semantics.
pub struct RosterStore {
    config: Mutex<RosterConfig>,
    repository: Arc<dyn ConfigRepository>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RosterStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RosterStore").finish_non_exhaustive()
    }
}

impl RosterStore {
    /// Loads the configuration, falling back to defaults when nothing is
    /// stored or the stored document cannot be read. Members from a previous
    /// process are cleared and the cleared document is saved.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving the cleared document fails.
    pub fn open(
        repository: Arc<dyn ConfigRepository>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, DomainError> {
        let mut config = match repository.load() {
            Ok(Some(document)) => match serde_json::from_value::<RosterConfig>(document) {
                Ok(config) => config,
                Err(e) => {
                    warn!(error = %e, "stored configuration is unreadable, using defaults");
                    RosterConfig::default()
                }
            },
            Ok(None) => RosterConfig::default(),
            Err(e) => {
                warn!(error = %e, "could not load configuration, using defaults");
                RosterConfig::default()
            }
        };
        config.normalize();

        if !config.members().is_empty() {
            info!(
                count = config.members().len(),
                "clearing party members from previous session"
            );
        }
        config.clear_members();
        save(repository.as_ref(), &config)?;

        Ok(Self {
            config: Mutex::new(config),
            repository,
            clock,
        })
    }

    fn lock(&self) -> MutexGuard<'_, RosterConfig> {
        // A panic inside a mutation closure leaves a config that is still
        // structurally valid, so keep serving it.
        self.config
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    /// Applies `change` to the configuration and saves it.
    ///
    /// The in-memory change stays applied when the save fails.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn mutate<R>(&self, change: impl FnOnce(&mut RosterConfig) -> R) -> Result<R, DomainError> {
        let mut config = self.lock();
        let result = change(&mut config);
        save(self.repository.as_ref(), &config)?;
        Ok(result)
    }

    /// Like [`mutate`](Self::mutate), but the closure decides whether anything
    /// changed; nothing is saved when it returns `None`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn mutate_if<R>(
        &self,
        change: impl FnOnce(&mut RosterConfig) -> Option<R>,
    ) -> Result<Option<R>, DomainError> {
        let mut config = self.lock();
        let result = change(&mut config);
        if result.is_some() {
            save(self.repository.as_ref(), &config)?;
        }
        Ok(result)
    }

    /// Reads the configuration without copying it.
    pub fn read<R>(&self, view: impl FnOnce(&RosterConfig) -> R) -> R {
        view(&self.lock())
    }

    /// A point-in-time copy of the configuration.
    #[must_use]
    pub fn snapshot(&self) -> RosterConfig {
        self.lock().clone()
    }

    /// Finds a member by case-insensitive name.
    #[must_use]
    pub fn member(&self, name: &str) -> Option<Member> {
        self.read(|config| config.find(name).cloned())
    }

    /// Returns the member with this name, adding it seeded from the current
    /// defaults when it is not tracked yet. The boolean is `true` when the
    /// member was added.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` for a blank name, or
    /// `DomainError::Infrastructure` if saving fails.
    pub fn upsert_from_membership(&self, name: &str) -> Result<(Member, bool), DomainError> {
        if name.trim().is_empty() {
            return Err(DomainError::Validation(
                "member name must not be empty".to_owned(),
            ));
        }
        let mut config = self.lock();
        if let Some(existing) = config.find(name) {
            return Ok((existing.clone(), false));
        }
        let member = Member::new(name, config.member_seed(), self.clock.now())?;
        config.add_member(member.clone())?;
        save(self.repository.as_ref(), &config)?;
        drop(config);

        info!(member = member.name(), "added party member to roster");
        Ok((member, true))
    }

    /// Disables a member. Returns `false` (and saves nothing) when the member
    /// is not tracked or already disabled.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn disable(&self, name: &str) -> Result<bool, DomainError> {
        let changed = self.mutate_if(|config| {
            let member = config.find_mut(name)?;
            if !member.enabled {
                return None;
            }
            member.enabled = false;
            Some(())
        })?;
        Ok(changed.is_some())
    }

    /// Applies a partial edit. Returns `Ok(None)` when the member is not tracked.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if a rename is blank or collides, or
    /// `DomainError::Infrastructure` if saving fails.
    pub fn update_member(
        &self,
        name: &str,
        update: MemberUpdate,
    ) -> Result<Option<Member>, DomainError> {
        let mut rejected = None;
        let edited = self.mutate_if(|config| {
            config.find(name)?;
            let mut current = name.to_owned();
            if let Some(new_name) = update.name.as_deref() {
                if let Err(e) = config.rename_member(name, new_name) {
                    rejected = Some(e);
                    return None;
                }
                new_name.clone_into(&mut current);
            }
            let member = config.find_mut(&current)?;
            if let Some(enabled) = update.enabled {
                member.enabled = enabled;
            }
            if let Some(raw) = update.spin_count {
                member.spin_count = SpinValue::from_raw(raw);
            }
            if let Some(raw) = update.spin_speed {
                member.spin_speed = SpinValue::from_raw(raw);
            }
            if let Some(preset) = update.preset_id {
                member.preset_id = preset;
            }
            Some(member.clone())
        })?;
        match rejected {
            Some(e) => Err(e),
            None => Ok(edited),
        }
    }

    /// Records the game id returned for a member. Returns `false` when the
    /// member is no longer tracked.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn set_game_id(&self, name: &str, game_id: GameId) -> Result<bool, DomainError> {
        let changed = self.mutate_if(|config| {
            let member = config.find_mut(name)?;
            member.game_id = game_id;
            Some(())
        })?;
        if changed.is_none() {
            error!(member = name, "member left the roster before its game id was stored");
        }
        Ok(changed.is_some())
    }

    /// Applies a partial edit of the member defaults.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn update_defaults(&self, update: DefaultsUpdate) -> Result<(), DomainError> {
        self.mutate(|config| {
            let defaults = &mut config.defaults;
            if let Some(preset) = update.preset {
                defaults.preset = preset;
            }
            if let Some(raw) = update.spin_amount {
                defaults.spin_amount = SpinValue::from_raw(raw);
            }
            if let Some(raw) = update.spin_speed {
                defaults.spin_speed = SpinValue::from_raw(raw);
            }
            if let Some(test_game) = update.test_game {
                defaults.test_game = test_game;
            }
        })
    }

    /// Applies a partial edit of the accrual settings.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn update_timed_spins(
        &self,
        update: TimedSpinsUpdate,
    ) -> Result<TimedSpinSettings, DomainError> {
        self.mutate(|config| {
            let current = config.timed_spins();
            let settings = TimedSpinSettings::new(
                update.enabled.unwrap_or(current.enabled()),
                update
                    .amount_earned_per_interval
                    .unwrap_or(current.amount_earned_per_interval()),
                update.interval_minutes.unwrap_or(current.interval_minutes()),
                update
                    .max_spins_per_member
                    .unwrap_or(current.max_spins_per_member()),
            );
            config.set_timed_spins(settings);
            settings
        })
    }

    /// Copies the default preset and spin amount onto every member.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if saving fails.
    pub fn apply_defaults_to_all(&self) -> Result<usize, DomainError> {
        self.mutate(|config| {
            let preset = config.defaults.preset.clone();
            let spins = config.defaults.spin_amount.clone();
            let mut count = 0;
            for member in config.members_mut() {
                member.preset_id.clone_from(&preset);
                member.spin_count = spins.clone();
                count += 1;
            }
            count
        })
    }
}

fn save(repository: &dyn ConfigRepository, config: &RosterConfig) -> Result<(), DomainError> {
    let document = serde_json::to_value(config)
        .map_err(|e| DomainError::Infrastructure(format!("config serialization failed: {e}")))?;
    repository.save(&document).inspect_err(|e| {
        error!(error = %e, "failed to save configuration");
    })
}
