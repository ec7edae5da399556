//! Inbound dispatch — maps command events to handlers and routes free text
//! into the answer path.
//!
//! Deliberately transport-agnostic: the telegram channel turns an update
//! into an [`Inbound`] and sends back whatever string this module returns,
//! so the whole conversation surface is testable without a Telegram
//! connection.

use tracing::{info, warn};

use crate::error::AppError;
use crate::identity::ChatId;
use crate::state::BotState;
use crate::subsystems::quiz::{AnswerOutcome, QuizSummary};
use crate::subsystems::registry::{SubscribeOutcome, UnsubscribeOutcome};
use crate::subsystems::scheduler;

/// One inbound chat event, already stripped of transport details.
#[derive(Debug, Clone)]
pub struct Inbound {
    pub chat: ChatId,
    pub sender: String,
    pub text: String,
}

/// Commands the bot understands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Quiz,
    Subscribe,
    Unsubscribe,
    /// `/debug` — fire the daily broadcast immediately. Operator escape
    /// hatch, not advertised in the greeting.
    Broadcast,
    Unknown(String),
}

/// Parse a leading `/command`, tolerating the `@BotName` suffix Telegram
/// appends in group chats. Returns `None` for ordinary text.
pub fn parse_command(text: &str) -> Option<Command> {
    let rest = text.trim().strip_prefix('/')?;
    let name = rest.split_whitespace().next().unwrap_or("");
    let name = name.split('@').next().unwrap_or(name);
    Some(match name {
        "start" => Command::Start,
        "quiz" => Command::Quiz,
        "subscribe" => Command::Subscribe,
        "unsubscribe" => Command::Unsubscribe,
        "debug" => Command::Broadcast,
        other => Command::Unknown(other.to_string()),
    })
}

/// Handle one inbound event and produce the reply text.
pub async fn handle(state: &BotState, inbound: Inbound) -> String {
    info!(chat = %inbound.chat, sender = %inbound.sender, text = %inbound.text, "received");

    let reply = match parse_command(&inbound.text) {
        Some(command) => handle_command(state, inbound.chat, command).await,
        None => handle_answer(state, inbound.chat, &inbound.text).await,
    };

    info!(chat = %inbound.chat, reply = %reply, "replying");
    reply
}

async fn handle_command(state: &BotState, chat: ChatId, command: Command) -> String {
    match command {
        Command::Start => format!(
            "👋 Hello! Use /quiz to practice or /subscribe to receive daily words at {}!",
            state.daily_time.format("%H:%M")
        ),
        Command::Quiz => match state.quiz.start_session(chat).await {
            Ok(message) => message,
            Err(e) => {
                warn!(%chat, error = %e, "could not start quiz");
                "⚠️ Not enough words loaded to build a quiz right now.".to_string()
            }
        },
        Command::Subscribe => match state.registry.subscribe(chat).await {
            Ok(SubscribeOutcome::Added) => {
                "✅ You are now subscribed to daily English–German words!".to_string()
            }
            Ok(SubscribeOutcome::AlreadySubscribed) => "🔹 You are already subscribed!".to_string(),
            Err(e) => persistence_reply(chat, &e),
        },
        Command::Unsubscribe => match state.registry.unsubscribe(chat).await {
            Ok(UnsubscribeOutcome::Removed) => {
                "❌ You have unsubscribed from daily words.".to_string()
            }
            Ok(UnsubscribeOutcome::NotSubscribed) => "🔹 You are not subscribed.".to_string(),
            Err(e) => persistence_reply(chat, &e),
        },
        Command::Broadcast => {
            let delivered = scheduler::broadcast_once(state).await;
            format!("📤 Quiz sent to {delivered} subscriber(s).")
        }
        Command::Unknown(name) => {
            format!("🤔 Unknown command /{name}. Try /quiz, /subscribe or /unsubscribe.")
        }
    }
}

fn persistence_reply(chat: ChatId, e: &AppError) -> String {
    warn!(%chat, error = %e, "registry update failed");
    "⚠️ Could not save your subscription change — please try again.".to_string()
}

async fn handle_answer(state: &BotState, chat: ChatId, text: &str) -> String {
    match state.quiz.submit_answer(chat, text).await {
        AnswerOutcome::NoActiveSession => {
            "I wasn't asking a word. Type /quiz to start!".to_string()
        }
        AnswerOutcome::Accepted { correct, summary: None } => {
            if correct { "👍" } else { "👎" }.to_string()
        }
        AnswerOutcome::Accepted { summary: Some(summary), .. } => format_summary(&summary),
    }
}

/// Result sheet sent after the final answer.
fn format_summary(summary: &QuizSummary) -> String {
    let mut text = format!("📊 Quiz Results: {}/{} correct!\n\n", summary.correct, summary.total);
    for (idx, question) in summary.questions.iter().enumerate() {
        let mark = if question.passed { "✅" } else { "❌" };
        text.push_str(&format!("{}. {} → {} {}\n", idx + 1, question.prompt, question.expected, mark));
    }
    text
}
