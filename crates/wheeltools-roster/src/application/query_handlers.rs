//! Read-only views of the roster for display.

use chrono::{DateTime, Utc};
use serde::Serialize;
use wheeltools_core::clock::Clock;

use super::roster_store::RosterStore;
use crate::domain::config::RosterConfig;
use crate::domain::member::Member;

/// Display view of one member.
#[derive(Debug, Serialize)]
pub struct MemberView {
    /// 1-based display position.
    pub position: usize,
    /// Whether the member takes part in batches.
    pub enabled: bool,
    /// Member name.
    pub name: String,
    /// Spin count as typed.
    pub spin_count: String,
    /// Spin count as used for display (invalid text reads as 0).
    pub spin_count_value: i32,
    /// Spin speed as typed.
    pub spin_speed: String,
    /// Preset.
    pub preset_id: String,
    /// Game id or the sentinel.
    pub game_id: String,
    /// When the member was first tracked.
    pub joined_at: DateTime<Utc>,
    /// Time in party as `hh:mm:ss`.
    pub time_in_party: String,
}

/// Defaults as shown in the editor.
#[derive(Debug, Serialize)]
pub struct DefaultsView {
    /// Default preset.
    pub preset: String,
    /// Default spin amount text.
    pub spin_amount: String,
    /// Default spin speed text.
    pub spin_speed: String,
    /// Test-game flag.
    pub test_game: bool,
}

/// Accrual settings view.
#[derive(Debug, Serialize)]
pub struct TimedSpinsView {
    /// Whether accrual runs.
    pub enabled: bool,
    /// Spins per interval.
    pub amount_earned_per_interval: i32,
    /// Interval in minutes.
    pub interval_minutes: i32,
    /// Cap per member.
    pub max_spins_per_member: i32,
}

/// Full roster view.
#[derive(Debug, Serialize)]
pub struct RosterView {
    /// Member defaults.
    pub defaults: DefaultsView,
    /// Accrual settings.
    pub timed_spins: TimedSpinsView,
    /// Members in display order.
    pub members: Vec<MemberView>,
}

/// Formats a duration as `hh:mm:ss`; hours keep counting past 24.
fn format_elapsed(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

fn member_view(position: usize, member: &Member, clock: &dyn Clock) -> MemberView {
    MemberView {
        position,
        enabled: member.enabled,
        name: member.name().to_owned(),
        spin_count: member.spin_count.raw().to_owned(),
        spin_count_value: member.spin_count.lenient(),
        spin_speed: member.spin_speed.raw().to_owned(),
        preset_id: member.preset_id.clone(),
        game_id: member.game_id.to_string(),
        joined_at: member.joined_at(),
        time_in_party: format_elapsed(clock.elapsed_since(member.joined_at()).num_seconds()),
    }
}

/// Builds the view of a configuration, measuring time in party against `clock`.
#[must_use]
pub fn roster_view(config: &RosterConfig, clock: &dyn Clock) -> RosterView {
    let timed = config.timed_spins();
    RosterView {
        defaults: DefaultsView {
            preset: config.defaults.preset.clone(),
            spin_amount: config.defaults.spin_amount.raw().to_owned(),
            spin_speed: config.defaults.spin_speed.raw().to_owned(),
            test_game: config.defaults.test_game,
        },
        timed_spins: TimedSpinsView {
            enabled: timed.enabled(),
            amount_earned_per_interval: timed.amount_earned_per_interval(),
            interval_minutes: timed.interval_minutes(),
            max_spins_per_member: timed.max_spins_per_member(),
        },
        members: config
            .members()
            .iter()
            .enumerate()
            .map(|(i, m)| member_view(i + 1, m, clock))
            .collect(),
    }
}

/// Retrieves the current roster view.
#[must_use]
pub fn get_roster(store: &RosterStore, clock: &dyn Clock) -> RosterView {
    store.read(|config| roster_view(config, clock))
}

/// Retrieves one member's view, or `None` when not tracked.
#[must_use]
pub fn get_member(store: &RosterStore, name: &str, clock: &dyn Clock) -> Option<MemberView> {
    store.read(|config| {
        config
            .members()
            .iter()
            .position(|m| m.is_named(name))
            .map(|i| member_view(i + 1, &config.members()[i], clock))
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{TimeDelta, TimeZone, Utc};
    use wheeltools_test_support::{InMemoryConfigRepository, ManualClock};

    use super::{format_elapsed, get_member, get_roster};
    use crate::application::roster_store::{MemberUpdate, RosterStore};

    #[test]
    fn test_format_elapsed_pads_and_keeps_hours() {
        assert_eq!(format_elapsed(0), "00:00:00");
        assert_eq!(format_elapsed(3_725), "01:02:05");
        assert_eq!(format_elapsed(90_000), "25:00:00");
        assert_eq!(format_elapsed(-5), "00:00:00");
    }

    #[test]
    fn test_get_roster_reads_invalid_spins_as_zero() {
        // Arrange
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
        ));
        let store =
            RosterStore::open(Arc::new(InMemoryConfigRepository::default()), clock.clone())
                .unwrap();
        store.upsert_from_membership("Alys Tern").unwrap();
        store
            .update_member(
                "Alys Tern",
                MemberUpdate {
                    spin_count: Some("4x".to_owned()),
                    ..MemberUpdate::default()
                },
            )
            .unwrap();
        clock.advance(TimeDelta::seconds(65));

        // Act
        let view = get_roster(&store, clock.as_ref());

        // Assert
        assert_eq!(view.members.len(), 1);
        let member = &view.members[0];
        assert_eq!(member.position, 1);
        assert_eq!(member.spin_count, "4x");
        assert_eq!(member.spin_count_value, 0);
        assert_eq!(member.game_id, "<not created>");
        assert_eq!(member.time_in_party, "00:01:05");
        assert!(get_member(&store, "alys tern", clock.as_ref()).is_some());
        assert!(get_member(&store, "Nobody", clock.as_ref()).is_none());
    }
}
