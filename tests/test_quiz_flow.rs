//! End-to-end conversation and broadcast flow against a recording mock
//! transport — no Telegram connection involved.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use chrono::NaiveTime;
use tempfile::TempDir;

use vokabel_bot::error::AppError;
use vokabel_bot::identity::ChatId;
use vokabel_bot::state::BotState;
use vokabel_bot::subsystems::comms::dispatch::{self, Inbound};
use vokabel_bot::subsystems::comms::transport::{SendFuture, Transport};
use vokabel_bot::subsystems::quiz::QuizService;
use vokabel_bot::subsystems::registry::SubscriberRegistry;
use vokabel_bot::subsystems::scheduler;
use vokabel_bot::vocab::{Vocabulary, WordPair};

const VOCAB: &[(&str, &str)] = &[
    ("apple", "Apfel"),
    ("car", "Auto"),
    ("house", "Haus"),
    ("book", "Buch"),
    ("friend", "Freund"),
];

/// Records every successful send; refuses chats listed in `fail_for`.
struct MockTransport {
    sent: Mutex<Vec<(ChatId, String)>>,
    fail_for: HashSet<ChatId>,
}

impl MockTransport {
    fn new(fail_for: impl IntoIterator<Item = ChatId>) -> Arc<Self> {
        Arc::new(Self {
            sent: Mutex::new(Vec::new()),
            fail_for: fail_for.into_iter().collect(),
        })
    }

    fn messages_for(&self, chat: ChatId) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .filter(|(to, _)| *to == chat)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl Transport for MockTransport {
    fn send_message(&self, chat: ChatId, text: String) -> SendFuture {
        let fail = self.fail_for.contains(&chat);
        if !fail {
            self.sent.lock().unwrap().push((chat, text));
        }
        Box::pin(async move {
            if fail {
                Err(AppError::Delivery("mock transport refused".into()))
            } else {
                Ok(())
            }
        })
    }
}

async fn build_state(transport: Arc<MockTransport>) -> (TempDir, Arc<BotState>) {
    let dir = TempDir::new().unwrap();
    let registry = SubscriberRegistry::open(dir.path().join("users.json")).await.unwrap();
    let pairs = VOCAB
        .iter()
        .map(|(english, german)| WordPair {
            english: (*english).into(),
            german: (*german).into(),
        })
        .collect();
    let state = Arc::new(BotState {
        quiz: QuizService::new(Arc::new(Vocabulary::from_pairs(pairs)), 5),
        registry,
        transport,
        daily_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
    });
    (dir, state)
}

async fn say(state: &BotState, chat: ChatId, text: &str) -> String {
    dispatch::handle(
        state,
        Inbound { chat, sender: "Test User".into(), text: text.into() },
    )
    .await
}

/// Prompts arrive in session order but unknown direction — answer by
/// looking the prompt up in either column.
fn expected_for(prompt: &str) -> String {
    for (english, german) in VOCAB {
        if *english == prompt {
            return (*german).to_string();
        }
        if *german == prompt {
            return (*english).to_string();
        }
    }
    panic!("unknown prompt {prompt:?}");
}

fn prompts_of(message: &str) -> Vec<String> {
    message
        .lines()
        .filter_map(|line| line.split_once(". ").map(|(_, word)| word.to_string()))
        .collect()
}

#[tokio::test]
async fn full_conversation_flow() {
    let transport = MockTransport::new([]);
    let (_dir, state) = build_state(transport).await;
    let chat = ChatId(1);

    // Greeting names the commands and the configured daily time.
    let greeting = say(&state, chat, "/start").await;
    assert!(greeting.contains("/quiz"));
    assert!(greeting.contains("/subscribe"));
    assert!(greeting.contains("09:00"));

    // Answering before any quiz is a normal outcome, not an error.
    let reply = say(&state, chat, "Apfel").await;
    assert!(reply.contains("/quiz"));

    // Subscribe is idempotent through the dispatch surface too.
    assert!(say(&state, chat, "/subscribe").await.contains("now subscribed"));
    assert!(say(&state, chat, "/subscribe").await.contains("already subscribed"));

    // Start a quiz: one message enumerating five prompts.
    let quiz_message = say(&state, chat, "/quiz").await;
    let prompts = prompts_of(&quiz_message);
    assert_eq!(prompts.len(), 5);

    // One wrong answer on question 1, then four correct ones.
    let reply = say(&state, chat, "Obst").await;
    assert_eq!(reply, "👎");
    for prompt in &prompts[1..4] {
        let reply = say(&state, chat, &expected_for(prompt)).await;
        assert_eq!(reply, "👍");
    }
    let summary = say(&state, chat, &expected_for(&prompts[4])).await;
    assert!(summary.contains("4/5 correct"), "got: {summary}");
    assert!(summary.contains('❌'));

    // The session died with the summary.
    let reply = say(&state, chat, "Apfel").await;
    assert!(reply.contains("/quiz"));

    // Unsubscribe round-trip.
    assert!(say(&state, chat, "/unsubscribe").await.contains("unsubscribed"));
    assert!(say(&state, chat, "/unsubscribe").await.contains("not subscribed"));

    // Unknown commands get a hint instead of silence.
    assert!(say(&state, chat, "/help").await.contains("Unknown command"));
}

#[tokio::test]
async fn perfect_run_scores_five_of_five() {
    let transport = MockTransport::new([]);
    let (_dir, state) = build_state(transport).await;
    let chat = ChatId(2);

    let prompts = prompts_of(&say(&state, chat, "/quiz").await);
    let mut last = String::new();
    for prompt in &prompts {
        last = say(&state, chat, &expected_for(prompt)).await;
    }
    assert!(last.contains("5/5 correct"), "got: {last}");
    assert!(!last.contains('❌'));
}

#[tokio::test]
async fn answers_tolerate_case_and_whitespace() {
    let transport = MockTransport::new([]);
    let (_dir, state) = build_state(transport).await;
    let chat = ChatId(3);

    let prompts = prompts_of(&say(&state, chat, "/quiz").await);
    let scrambled = format!("  {}  ", expected_for(&prompts[0]).to_uppercase());
    assert_eq!(say(&state, chat, &scrambled).await, "👍");
}

#[tokio::test]
async fn broadcast_survives_one_dead_recipient() {
    let transport = MockTransport::new([ChatId(111)]);
    let (_dir, state) = build_state(transport.clone()).await;

    state.registry.subscribe(ChatId(111)).await.unwrap();
    state.registry.subscribe(ChatId(222)).await.unwrap();

    let delivered = scheduler::broadcast_once(&state).await;
    assert_eq!(delivered, 1);
    assert!(transport.messages_for(ChatId(111)).is_empty());

    let messages = transport.messages_for(ChatId(222));
    assert_eq!(messages.len(), 1);
    let prompts = prompts_of(&messages[0]);
    assert_eq!(prompts.len(), 5);

    // Both sessions were committed before any send was attempted, so both
    // chats can answer — delivery failure never desynchronizes the quiz.
    for chat in [ChatId(111), ChatId(222)] {
        assert!(state.quiz.has_session(chat).await);
    }
    assert_eq!(say(&state, ChatId(222), &expected_for(&prompts[0])).await, "👍");
}

#[tokio::test]
async fn debug_command_fires_the_broadcast() {
    let transport = MockTransport::new([]);
    let (_dir, state) = build_state(transport.clone()).await;

    say(&state, ChatId(7), "/subscribe").await;
    say(&state, ChatId(8), "/subscribe").await;

    let reply = say(&state, ChatId(7), "/debug").await;
    assert!(reply.contains("2 subscriber(s)"), "got: {reply}");
    assert_eq!(transport.messages_for(ChatId(8)).len(), 1);
}
