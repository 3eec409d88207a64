//! Time-based spin accrual.
//!
//! Each tick recomputes every enabled member's spin count from how long the
//! member has been tracked. The value depends only on `joined_at`, the clock
//! and the current settings, so repeated ticks never award twice and changed
//! settings take effect on the next tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use tokio::sync::oneshot;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};
use wheeltools_core::clock::Clock;
use wheeltools_core::error::DomainError;

use super::roster_store::RosterStore;
use crate::domain::config::{RosterConfig, TimedSpinSettings};
use crate::domain::member::{Member, SpinValue};

/// Default tick period.
pub const DEFAULT_TICK: Duration = Duration::from_secs(1);

/// Spin count a member is entitled to at `now`, or `None` when the member is
/// not affected (disabled, below the first interval, or accrual is off).
#[must_use]
pub fn accrued_spins(
    member: &Member,
    settings: TimedSpinSettings,
    now: DateTime<Utc>,
) -> Option<i32> {
    if !settings.enabled() || !member.enabled || settings.interval_minutes() <= 0 {
        return None;
    }
    let interval = TimeDelta::minutes(i64::from(settings.interval_minutes()));
    let elapsed = now - member.joined_at();
    if elapsed < interval {
        return None;
    }

    let intervals = elapsed.num_milliseconds() / interval.num_milliseconds();
    let accrued = intervals.saturating_mul(i64::from(settings.amount_earned_per_interval()));
    let capped = accrued.clamp(0, i64::from(settings.max_spins_per_member()));
    i32::try_from(capped).ok()
}

/// Applies one accrual pass to `config`. Returns the members whose spin count
/// changed, with the new value.
pub fn apply_accrual(config: &mut RosterConfig, now: DateTime<Utc>) -> Vec<(String, i32)> {
    let settings = config.timed_spins();
    let mut changed = Vec::new();
    for member in config.members_mut() {
        let Some(spins) = accrued_spins(member, settings, now) else {
            continue;
        };
        if member.spin_count.strict() != Some(spins) {
            member.spin_count = SpinValue::from_count(spins);
            changed.push((member.name().to_owned(), spins));
        }
    }
    changed
}

/// Runs one accrual pass against the store, saving only when something changed.
///
/// # Errors
///
/// Returns `DomainError::Infrastructure` if saving fails.
pub fn tick(store: &RosterStore, clock: &dyn Clock) -> Result<Vec<(String, i32)>, DomainError> {
    let now = clock.now();
    let changed = store.mutate_if(|config| {
        let changed = apply_accrual(config, now);
        (!changed.is_empty()).then_some(changed)
    })?;
    Ok(changed.unwrap_or_default())
}

/// Periodic accrual task.
pub struct AccrualEngine;

impl AccrualEngine {
    /// Starts ticking every `period` on the current tokio runtime. Each pass
    /// runs on the blocking pool because it may save the document.
    #[must_use]
    pub fn spawn(store: Arc<RosterStore>, clock: Arc<dyn Clock>, period: Duration) -> AccrualHandle {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            info!(?period, "accrual engine started");
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        // Saving touches the disk; keep it off the async workers.
                        let (store, clock) = (store.clone(), clock.clone());
                        match task::spawn_blocking(move || tick(&store, clock.as_ref())).await {
                            Ok(Ok(changed)) => {
                                for (member, spins) in changed {
                                    debug!(%member, spins, "accrued spins");
                                }
                            }
                            Ok(Err(err)) => error!(%err, "accrual tick failed"),
                            Err(err) => error!(%err, "accrual tick panicked"),
                        }
                    }
                    _ = &mut shutdown_rx => break,
                }
            }
            info!("accrual engine stopped");
        });
        AccrualHandle {
            shutdown: Some(shutdown_tx),
            task,
        }
    }
}

/// Handle to a running accrual task.
pub struct AccrualHandle {
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl AccrualHandle {
    /// Stops the task and waits for it to finish.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Err(err) = (&mut self.task).await {
            error!(%err, "accrual task ended abnormally");
        }
    }
}

impl Drop for AccrualHandle {
    fn drop(&mut self) {
        if self.shutdown.is_some() {
            self.task.abort();
        }
    }
}
