//! Outbound transport seam — how the core hands a message to the chat
//! service.
//!
//! The scheduler and the dispatch layer only ever see [`Transport`]; the
//! concrete Telegram implementation lives in
//! [`telegram`](super::telegram). Tests plug in a recording transport.

use std::future::Future;
use std::pin::Pin;

use crate::error::AppError;
use crate::identity::ChatId;

/// A boxed, owned send future, keeping the trait dyn-safe.
pub type SendFuture = Pin<Box<dyn Future<Output = Result<(), AppError>> + Send + 'static>>;

/// Best-effort outbound message delivery.
///
/// One attempt, no retries: a failure comes back as
/// [`AppError::Delivery`] and the caller decides what it means. Session
/// state is always committed before a send is attempted, so a lost message
/// never desynchronizes the quiz.
pub trait Transport: Send + Sync + 'static {
    fn send_message(&self, chat: ChatId, text: String) -> SendFuture;
}
