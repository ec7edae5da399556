//! Quiz session manager — owns every live session, keyed by chat.
//!
//! # Concurrency
//!
//! All sessions live behind one async [`Mutex`]. Every operation is a single
//! short critical section with no await points inside, so the lock only ever
//! guards in-memory work. The tokio mutex hands itself out in FIFO order,
//! which keeps answer submissions for one chat applied in arrival order
//! while traffic for other chats interleaves freely.

mod session;

pub use session::{Question, QuestionResult, QuizSession, QuizSummary};

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::debug;

use crate::error::AppError;
use crate::identity::ChatId;
use crate::vocab::{Direction, Vocabulary};

/// What a submitted answer meant for the chat's session.
#[derive(Debug)]
pub enum AnswerOutcome {
    /// No live session — the caller should point the user at the quiz command.
    NoActiveSession,
    /// Answer recorded. `summary` is present exactly on the final answer;
    /// the session is already gone by the time the summary is returned.
    Accepted {
        correct: bool,
        summary: Option<QuizSummary>,
    },
}

pub struct QuizService {
    vocab: Arc<Vocabulary>,
    questions_per_quiz: usize,
    sessions: Mutex<HashMap<ChatId, QuizSession>>,
}

impl QuizService {
    pub fn new(vocab: Arc<Vocabulary>, questions_per_quiz: usize) -> Self {
        Self {
            vocab,
            questions_per_quiz,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a fresh session for `chat` and return the prompt message.
    ///
    /// Any existing session for the chat is discarded — starting a new quiz
    /// always wins over a stale one.
    pub async fn start_session(&self, chat: ChatId) -> Result<String, AppError> {
        // Sampling happens before the lock; the RNG must not live across an
        // await point.
        let session = {
            let mut rng = rand::thread_rng();
            let pairs = self.vocab.sample(self.questions_per_quiz, &mut rng)?;
            let direction = Direction::random(&mut rng);
            QuizSession::new(&pairs, direction)
        };
        let message = session.prompt_message();

        let replaced = self.sessions.lock().await.insert(chat, session).is_some();
        if replaced {
            debug!(%chat, "previous session discarded by new quiz");
        }
        Ok(message)
    }

    /// Apply `raw` to the chat's live session, if any.
    ///
    /// The final answer finalizes and deletes the session in the same
    /// critical section, so a follow-up answer sees [`NoActiveSession`] —
    /// there is no window where a sixth answer could be accepted.
    pub async fn submit_answer(&self, chat: ChatId, raw: &str) -> AnswerOutcome {
        let mut sessions = self.sessions.lock().await;
        let Some(session) = sessions.get_mut(&chat) else {
            return AnswerOutcome::NoActiveSession;
        };
        let correct = session.record_answer(raw);
        let summary = if session.is_complete() {
            sessions.remove(&chat).map(QuizSession::into_summary)
        } else {
            None
        };
        AnswerOutcome::Accepted { correct, summary }
    }

    /// Whether the chat currently has a live session.
    pub async fn has_session(&self, chat: ChatId) -> bool {
        self.sessions.lock().await.contains_key(&chat)
    }
}
