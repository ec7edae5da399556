//! Configuration loading with env-var overrides.
//!
//! Reads `config/default.toml` relative to the current working directory,
//! then applies `VOKABEL_WORK_DIR` and `VOKABEL_LOG_LEVEL` env overrides.

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use chrono::NaiveTime;
use serde::Deserialize;

use crate::error::AppError;

/// Telegram channel configuration.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    /// Whether the Telegram channel is enabled.
    pub enabled: bool,
}

/// Comms subsystem configuration.
#[derive(Debug, Clone)]
pub struct CommsConfig {
    pub telegram: TelegramConfig,
}

/// Quiz and scheduler configuration.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// Questions per session (K).
    pub questions_per_quiz: usize,
    /// Local time-of-day of the daily broadcast.
    pub daily_time: NaiveTime,
}

/// Fully-resolved configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub bot_name: String,
    /// Directory for all persistent data (already expanded, no `~`).
    pub work_dir: PathBuf,
    pub log_level: String,
    /// Word list, resolved relative to the launch directory unless absolute.
    pub words_file: PathBuf,
    /// Subscriber set, resolved relative to `work_dir` unless absolute.
    pub users_file: PathBuf,
    pub quiz: QuizConfig,
    pub comms: CommsConfig,
}

/// Raw TOML shape — `serde` target before resolution.
#[derive(Deserialize)]
struct RawConfig {
    bot: RawBot,
    #[serde(default)]
    vocabulary: RawVocabulary,
    #[serde(default)]
    registry: RawRegistry,
    #[serde(default)]
    quiz: RawQuiz,
    #[serde(default)]
    comms: RawComms,
}

#[derive(Deserialize)]
struct RawBot {
    bot_name: String,
    work_dir: String,
    log_level: String,
}

#[derive(Deserialize)]
struct RawVocabulary {
    #[serde(default = "default_words_file")]
    words_file: String,
}

impl Default for RawVocabulary {
    fn default() -> Self {
        Self { words_file: default_words_file() }
    }
}

#[derive(Deserialize)]
struct RawRegistry {
    #[serde(default = "default_users_file")]
    users_file: String,
}

impl Default for RawRegistry {
    fn default() -> Self {
        Self { users_file: default_users_file() }
    }
}

#[derive(Deserialize)]
struct RawQuiz {
    #[serde(default = "default_questions_per_quiz")]
    questions_per_quiz: usize,
    #[serde(default = "default_daily_time")]
    daily_time: String,
}

impl Default for RawQuiz {
    fn default() -> Self {
        Self {
            questions_per_quiz: default_questions_per_quiz(),
            daily_time: default_daily_time(),
        }
    }
}

#[derive(Deserialize, Default)]
struct RawComms {
    #[serde(default)]
    telegram: RawTelegram,
}

#[derive(Deserialize)]
struct RawTelegram {
    #[serde(default = "default_true")]
    enabled: bool,
}

impl Default for RawTelegram {
    fn default() -> Self {
        Self { enabled: true }
    }
}

fn default_words_file() -> String {
    "words.json".to_string()
}

fn default_users_file() -> String {
    "users.json".to_string()
}

fn default_questions_per_quiz() -> usize {
    5
}

fn default_daily_time() -> String {
    "09:00".to_string()
}

fn default_true() -> bool {
    true
}

/// Load config from `config/default.toml`, then apply env-var overrides.
pub fn load() -> Result<Config, AppError> {
    let work_dir_override = env::var("VOKABEL_WORK_DIR").ok();
    let log_level_override = env::var("VOKABEL_LOG_LEVEL").ok();
    load_from(
        Path::new("config/default.toml"),
        work_dir_override.as_deref(),
        log_level_override.as_deref(),
    )
}

/// Internal loader — accepts an explicit path and optional overrides.
/// Tests pass overrides directly instead of mutating env vars.
pub fn load_from(
    path: &Path,
    work_dir_override: Option<&str>,
    log_level_override: Option<&str>,
) -> Result<Config, AppError> {
    let raw = fs::read_to_string(path)
        .map_err(|e| AppError::Config(format!("cannot read {}: {e}", path.display())))?;

    let parsed: RawConfig = toml::from_str(&raw)
        .map_err(|e| AppError::Config(format!("parse error in {}: {e}", path.display())))?;

    let work_dir_str = work_dir_override.unwrap_or(&parsed.bot.work_dir).to_string();
    let work_dir = expand_home(&work_dir_str);
    let log_level = log_level_override.unwrap_or(&parsed.bot.log_level).to_string();

    if parsed.quiz.questions_per_quiz == 0 {
        return Err(AppError::Config("questions_per_quiz must be at least 1".into()));
    }
    let daily_time = NaiveTime::parse_from_str(&parsed.quiz.daily_time, "%H:%M").map_err(|e| {
        AppError::Config(format!("invalid daily_time '{}': {e}", parsed.quiz.daily_time))
    })?;

    let users_file = {
        let path = PathBuf::from(parsed.registry.users_file);
        if path.is_absolute() { path } else { work_dir.join(path) }
    };

    Ok(Config {
        bot_name: parsed.bot.bot_name,
        work_dir,
        log_level,
        words_file: PathBuf::from(parsed.vocabulary.words_file),
        users_file,
        quiz: QuizConfig {
            questions_per_quiz: parsed.quiz.questions_per_quiz,
            daily_time,
        },
        comms: CommsConfig {
            telegram: TelegramConfig { enabled: parsed.comms.telegram.enabled },
        },
    })
}

/// Expand a leading `~` to the user's home directory.
/// Absolute or relative paths without `~` are returned unchanged.
pub fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}
