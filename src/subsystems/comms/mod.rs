//! Comms subsystem — external chat I/O.
//!
//! Each channel implements [`runtime::Component`] and is spawned as an
//! independent task by [`start`] via [`runtime::spawn_components`]. Channels
//! capture the shared `Arc<BotState>` at construction; the generic
//! `Component::run` signature only carries the shutdown token.
//!
//! [`runtime::Component`]: crate::subsystems::runtime::Component
//! [`runtime::spawn_components`]: crate::subsystems::runtime::spawn_components

pub mod dispatch;
pub mod telegram;
pub mod transport;

use std::sync::Arc;

use teloxide::Bot;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;
use crate::state::BotState;
use crate::subsystems::runtime::{Component, SubsystemHandle, spawn_components};

/// Spawn the configured comms channels.
///
/// Non-blocking: returns as soon as the tasks are spawned. The handle
/// resolves when every channel has exited.
pub fn start(
    config: &Config,
    bot: Bot,
    state: Arc<BotState>,
    shutdown: CancellationToken,
) -> SubsystemHandle {
    let mut components: Vec<Box<dyn Component>> = Vec::new();

    if config.comms.telegram.enabled {
        info!("loading telegram channel");
        components.push(Box::new(telegram::TelegramChannel::new("telegram0", bot, state)));
    }

    if components.is_empty() {
        info!("no comms channels configured — waiting for shutdown");
    }

    spawn_components(components, shutdown)
}
