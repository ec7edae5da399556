//! Broadcast scheduler — fires the daily quiz to every subscriber.
//!
//! A single waiting loop: park until the configured local time-of-day, fire
//! once, park again. Started once at process startup and runs for the
//! process lifetime; the shared `CancellationToken` is the only stop
//! condition. A trigger missed while the process was down is not replayed —
//! the next day's trigger is unaffected.
//!
//! There is no polling: the task sleeps straight through to the next
//! deadline and wakes only for the timer or shutdown.

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveTime};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::AppError;
use crate::state::BotState;
use crate::subsystems::runtime::{Component, ComponentFuture, SubsystemHandle, spawn_components};

/// Spawn the scheduler as a one-component subsystem.
pub fn start(state: Arc<BotState>, shutdown: CancellationToken) -> SubsystemHandle {
    spawn_components(vec![Box::new(DailyBroadcast::new(state))], shutdown)
}

// ── DailyBroadcast ───────────────────────────────────────────────────────────

/// The daily broadcast component.
pub struct DailyBroadcast {
    state: Arc<BotState>,
}

impl DailyBroadcast {
    pub fn new(state: Arc<BotState>) -> Self {
        Self { state }
    }
}

impl Component for DailyBroadcast {
    fn id(&self) -> &str {
        "daily-broadcast"
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_schedule(self.state, shutdown))
    }
}

// ── run_schedule ─────────────────────────────────────────────────────────────

async fn run_schedule(state: Arc<BotState>, shutdown: CancellationToken) -> Result<(), AppError> {
    info!(fire_at = %state.daily_time, "broadcast scheduler running");

    loop {
        let now = Local::now();
        let target = next_fire(now, state.daily_time);
        let wait = (target - now).to_std().unwrap_or_default();

        tokio::select! {
            biased;

            _ = shutdown.cancelled() => {
                info!("broadcast scheduler shutting down");
                return Ok(());
            }
            _ = tokio::time::sleep(wait) => {}
        }

        let delivered = broadcast_once(&state).await;
        info!(delivered, "daily quiz dispatched");
    }
}

/// Send a fresh quiz to every chat in the subscriber snapshot.
///
/// Each recipient is attempted exactly once per trigger; a failed session
/// start or delivery is logged and the rest of the snapshot still gets its
/// quiz. The session is committed before the send is attempted. Returns the
/// number of successful deliveries.
pub async fn broadcast_once(state: &BotState) -> usize {
    let recipients = state.registry.snapshot().await;
    let mut delivered = 0;

    for chat in recipients {
        let message = match state.quiz.start_session(chat).await {
            Ok(message) => message,
            Err(e) => {
                warn!(%chat, error = %e, "daily quiz: could not start session");
                continue;
            }
        };
        match state.transport.send_message(chat, message).await {
            Ok(()) => delivered += 1,
            Err(e) => warn!(%chat, error = %e, "daily quiz: delivery failed"),
        }
    }

    delivered
}

/// Next local occurrence of `at`, strictly after `now`.
///
/// Walks forward past calendar days whose `at` does not exist locally
/// (DST spring-forward).
fn next_fire(now: DateTime<Local>, at: NaiveTime) -> DateTime<Local> {
    let mut date = now.date_naive();
    loop {
        if let Some(candidate) = date.and_time(at).and_local_timezone(Local).earliest() {
            if candidate > now {
                return candidate;
            }
        }
        match date.succ_opt() {
            Some(next) => date = next,
            None => return now + chrono::Duration::days(1),
        }
    }
}
