//! Shared service state — the owned container every handler borrows.
//!
//! There are no module-level singletons: `main` builds one [`BotState`],
//! wraps it in an `Arc`, and hands it to the comms channels and the
//! broadcast scheduler.

use std::sync::Arc;

use chrono::NaiveTime;

use crate::subsystems::comms::transport::Transport;
use crate::subsystems::quiz::QuizService;
use crate::subsystems::registry::SubscriberRegistry;

pub struct BotState {
    pub quiz: QuizService,
    pub registry: SubscriberRegistry,
    pub transport: Arc<dyn Transport>,
    /// Local time-of-day of the daily broadcast; also echoed in the greeting.
    pub daily_time: NaiveTime,
}
