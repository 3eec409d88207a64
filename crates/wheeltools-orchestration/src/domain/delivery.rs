//! Game creation requests and link messages.

use std::time::Duration;

use wheeltools_core::error::DomainError;
use wheeltools_core::ipc::CreateGameMessage;
use wheeltools_roster::domain::member::Member;

/// Theme every game is created with.
pub const DEFAULT_THEME: &str = "espi";

/// Where game links point.
pub const DEFAULT_LINK_BASE_URL: &str = "https://wheel.gamba.pro/wheel";

/// Pause between two link messages.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(1);

/// Orchestration settings.
#[derive(Debug, Clone)]
pub struct DeliverySettings {
    /// Theme passed to game creation.
    pub theme: String,
    /// Base URL the game id is appended to.
    pub link_base_url: String,
    /// Pause between consecutive sends.
    pub send_delay: Duration,
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            theme: DEFAULT_THEME.to_owned(),
            link_base_url: DEFAULT_LINK_BASE_URL.to_owned(),
            send_delay: DEFAULT_SEND_DELAY,
        }
    }
}

impl DeliverySettings {
    /// Link text sent to a member for `game_id`.
    #[must_use]
    pub fn link_for(&self, game_id: &str) -> String {
        format!("{}/{game_id}", self.link_base_url.trim_end_matches('/'))
    }
}

/// Builds the create-game request for a member. Spin fields are parsed
/// strictly: invalid text is an error here, not zero.
///
/// # Errors
///
/// Returns `DomainError::InvalidNumber` naming the first field that does not
/// parse.
pub fn create_game_message(
    member: &Member,
    theme: &str,
    test_game: bool,
) -> Result<CreateGameMessage, DomainError> {
    let invalid = |field: &'static str, value: &str| DomainError::InvalidNumber {
        member: member.name().to_owned(),
        field,
        value: value.to_owned(),
    };
    let max_spins = member
        .spin_count
        .strict()
        .ok_or_else(|| invalid("spin_count", member.spin_count.raw()))?;
    let speed = member
        .spin_speed
        .strict()
        .ok_or_else(|| invalid("spin_speed", member.spin_speed.raw()))?;

    Ok(CreateGameMessage {
        title: member.name().to_owned(),
        max_spins,
        speed,
        theme: theme.to_owned(),
        preset: member.preset_id.clone(),
        test_game,
    })
}
