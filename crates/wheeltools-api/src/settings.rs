//! Process settings read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use wheeltools_orchestration::domain::delivery::{
    DEFAULT_LINK_BASE_URL, DEFAULT_THEME, DeliverySettings,
};
use wheeltools_roster::application::accrual::DEFAULT_TICK;

use crate::error::AppError;

/// Settings for one server process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Interface to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Where the roster configuration is stored.
    pub config_path: PathBuf,
    /// Where the game backend accepts create-game requests.
    pub ipc_addr: SocketAddr,
    /// Base URL for game links.
    pub link_base_url: String,
    /// Pause between link messages.
    pub send_delay: Duration,
    /// Accrual tick period.
    pub tick: Duration,
}

fn parse<T>(key: &str, raw: Option<String>, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| AppError::Config(format!("{key} is invalid ({raw:?}): {e}"))),
    }
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a variable is set but does not parse.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads settings through `lookup`; unset keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when a value does not parse.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let default_ipc = SocketAddr::from(([127, 0, 0, 1], 47_700));
        let send_delay_ms: u64 = parse(
            "WHEELTOOLS_SEND_DELAY_MS",
            lookup("WHEELTOOLS_SEND_DELAY_MS"),
            1_000,
        )?;
        let tick_ms: u64 = parse(
            "WHEELTOOLS_TICK_MS",
            lookup("WHEELTOOLS_TICK_MS"),
            u64::try_from(DEFAULT_TICK.as_millis()).unwrap_or(1_000),
        )?;
        if tick_ms == 0 {
            return Err(AppError::Config(
                "WHEELTOOLS_TICK_MS must be greater than zero".to_owned(),
            ));
        }

        Ok(Self {
            host: lookup("HOST").unwrap_or_else(|| "0.0.0.0".to_owned()),
            port: parse("PORT", lookup("PORT"), 3000)?,
            config_path: lookup("WHEELTOOLS_CONFIG_PATH")
                .map_or_else(|| PathBuf::from("wheeltools.json"), PathBuf::from),
            ipc_addr: parse("WHEELTOOLS_IPC_ADDR", lookup("WHEELTOOLS_IPC_ADDR"), default_ipc)?,
            link_base_url: lookup("WHEELTOOLS_LINK_BASE_URL")
                .unwrap_or_else(|| DEFAULT_LINK_BASE_URL.to_owned()),
            send_delay: Duration::from_millis(send_delay_ms),
            tick: Duration::from_millis(tick_ms),
        })
    }

    /// Address the server binds to.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when `HOST:PORT` is not a socket address.
    pub fn bind_addr(&self) -> Result<SocketAddr, AppError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| AppError::Config(format!("invalid HOST:PORT combination: {e}")))
    }

    /// Orchestration settings derived from these.
    #[must_use]
    pub fn delivery(&self) -> DeliverySettings {
        DeliverySettings {
            theme: DEFAULT_THEME.to_owned(),
            link_base_url: self.link_base_url.clone(),
            send_delay: self.send_delay,
        }
    }
}
