//! Telegram comms channel — receives updates via the Telegram API, routes
//! them through the dispatch table, and replies to the user.

use std::sync::Arc;

use teloxide::prelude::*;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::error::AppError;
use crate::identity::ChatId;
use crate::state::BotState;
use crate::subsystems::runtime::{Component, ComponentFuture};
use super::dispatch::{self, Inbound};
use super::transport::{SendFuture, Transport};

// ── Constants ────────────────────────────────────────────────────────────────

/// Telegram has a 4096 character limit per message.
/// We chunk at 4000 to be safe.
const MAX_MESSAGE_LENGTH: usize = 4000;

// ── TelegramTransport ────────────────────────────────────────────────────────

/// Outbound half — wraps a [`Bot`] handle for the scheduler and dispatch.
#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
}

impl TelegramTransport {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

impl Transport for TelegramTransport {
    fn send_message(&self, chat: ChatId, text: String) -> SendFuture {
        let bot = self.bot.clone();
        Box::pin(async move {
            let chat = teloxide::types::ChatId(chat.0);
            let chars: Vec<char> = text.chars().collect();
            for chunk in chars.chunks(MAX_MESSAGE_LENGTH) {
                let chunk: String = chunk.iter().collect();
                bot.send_message(chat, chunk)
                    .await
                    .map_err(|e| AppError::Delivery(format!("telegram send failed: {e}")))?;
            }
            Ok(())
        })
    }
}

// ── TelegramChannel ──────────────────────────────────────────────────────────

/// Inbound half — the long-polling update loop.
pub struct TelegramChannel {
    channel_id: String,
    bot: Bot,
    state: Arc<BotState>,
}

impl TelegramChannel {
    pub fn new(channel_id: impl Into<String>, bot: Bot, state: Arc<BotState>) -> Self {
        Self { channel_id: channel_id.into(), bot, state }
    }
}

impl Component for TelegramChannel {
    fn id(&self) -> &str {
        &self.channel_id
    }

    fn run(self: Box<Self>, shutdown: CancellationToken) -> ComponentFuture {
        Box::pin(run_telegram(self.channel_id, self.bot, self.state, shutdown))
    }
}

// ── run_telegram ─────────────────────────────────────────────────────────────

async fn run_telegram(
    channel_id: String,
    bot: Bot,
    state: Arc<BotState>,
    shutdown: CancellationToken,
) -> Result<(), AppError> {
    info!(%channel_id, "telegram channel starting");

    let state_clone = state.clone();

    let handler = Update::filter_message().endpoint(move |bot: Bot, msg: Message| {
        let state = state_clone.clone();
        async move {
            if let Some(text) = msg.text() {
                let chat = ChatId(msg.chat.id.0);
                let sender = msg
                    .from
                    .as_ref()
                    .map(|user| user.full_name())
                    .unwrap_or_default();

                let reply = dispatch::handle(
                    &state,
                    Inbound { chat, sender, text: text.to_string() },
                )
                .await;

                let transport = TelegramTransport::new(bot);
                if let Err(e) = transport.send_message(chat, reply).await {
                    warn!(%chat, "failed to send telegram reply: {e}");
                }
            }
            respond(())
        }
    });

    let mut dispatcher = Dispatcher::builder(bot, handler).build();

    tokio::select! {
        biased;

        _ = shutdown.cancelled() => {
            info!(%channel_id, "shutdown signal received — closing telegram channel");
        }
        _ = dispatcher.dispatch() => {
            warn!(%channel_id, "telegram dispatcher exited unexpectedly");
        }
    }

    Ok(())
}
