//! Vokabel Bot — process entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Load config, init logger
//!   3. Load vocabulary (fatal if missing or malformed)
//!   4. Open the subscriber registry
//!   5. Connect the Telegram transport (fatal if no token)
//!   6. Spawn Ctrl-C → shutdown watcher
//!   7. Start comms channels + broadcast scheduler
//!   8. Join subsystems; exit 0 on clean shutdown

use std::env;
use std::sync::Arc;

use teloxide::Bot;
use tokio_util::sync::CancellationToken;
use tracing::info;

use vokabel_bot::config;
use vokabel_bot::error::AppError;
use vokabel_bot::logger;
use vokabel_bot::state::BotState;
use vokabel_bot::subsystems::comms;
use vokabel_bot::subsystems::comms::telegram::TelegramTransport;
use vokabel_bot::subsystems::quiz::QuizService;
use vokabel_bot::subsystems::registry::SubscriberRegistry;
use vokabel_bot::subsystems::scheduler;
use vokabel_bot::vocab::Vocabulary;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let config = config::load()?;
    logger::init(&config.log_level)?;

    info!(
        bot_name = %config.bot_name,
        work_dir = %config.work_dir.display(),
        log_level = %config.log_level,
        "config loaded"
    );

    let vocab = Arc::new(Vocabulary::load(&config.words_file)?);
    info!(pairs = vocab.len(), "vocabulary loaded");

    let registry = SubscriberRegistry::open(&config.users_file).await?;
    let subscribers = registry.len().await;
    info!(subscribers, "subscriber registry ready");

    let token = env::var("TELEGRAM_BOT_TOKEN")
        .map_err(|_| AppError::Config("TELEGRAM_BOT_TOKEN not set".into()))?;
    let bot = Bot::new(token);

    let state = Arc::new(BotState {
        quiz: QuizService::new(vocab, config.quiz.questions_per_quiz),
        registry,
        transport: Arc::new(TelegramTransport::new(bot.clone())),
        daily_time: config.quiz.daily_time,
    });

    // Shared shutdown token — Ctrl-C cancels it, all tasks watch it.
    let shutdown = CancellationToken::new();
    let ctrlc_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("ctrl-c received — initiating shutdown");
            ctrlc_token.cancel();
        }
    });

    let comms_handle = comms::start(&config, bot, state.clone(), shutdown.clone());
    let scheduler_handle = scheduler::start(state, shutdown.clone());

    comms_handle.join().await?;

    // If comms exited on its own (dispatcher died), stop the scheduler too.
    shutdown.cancel();
    scheduler_handle.join().await?;

    Ok(())
}
