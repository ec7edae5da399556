//! Subscriber registry — the durable set of chats opted into the daily quiz.
//!
//! Mutations update the in-memory set, then rewrite the whole persisted file
//! before reporting success. A failed write rolls the in-memory change back,
//! so memory and disk never disagree about a confirmed subscribe. At rest the
//! set is a sorted JSON array of integers (`users.json`).
//!
//! Readers/writer discipline: snapshots and membership checks share a read
//! lock; mutations take the write lock and hold it across the flush.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::PathBuf;

use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::identity::ChatId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubscribeOutcome {
    Added,
    AlreadySubscribed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Removed,
    NotSubscribed,
}

pub struct SubscriberRegistry {
    path: PathBuf,
    members: RwLock<HashSet<ChatId>>,
}

impl SubscriberRegistry {
    /// Open the registry, reading the persisted set if present.
    ///
    /// A missing file is a fresh install (empty set). A malformed file is
    /// reported and treated as empty rather than blocking startup.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    AppError::Persistence(format!("cannot create {}: {e}", parent.display()))
                })?;
            }
        }

        let members = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str::<Vec<ChatId>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "malformed subscriber file — starting with an empty set");
                    HashSet::new()
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                return Err(AppError::Persistence(format!(
                    "cannot read {}: {e}",
                    path.display()
                )));
            }
        };

        debug!(path = %path.display(), subscribers = members.len(), "registry opened");
        Ok(Self { path, members: RwLock::new(members) })
    }

    /// Add `chat` to the set. Idempotent: an already-present chat reports
    /// [`SubscribeOutcome::AlreadySubscribed`] and performs no write.
    pub async fn subscribe(&self, chat: ChatId) -> Result<SubscribeOutcome, AppError> {
        let mut members = self.members.write().await;
        if !members.insert(chat) {
            return Ok(SubscribeOutcome::AlreadySubscribed);
        }
        if let Err(e) = self.persist(&members).await {
            members.remove(&chat);
            return Err(e);
        }
        debug!(%chat, "subscribed");
        Ok(SubscribeOutcome::Added)
    }

    /// Remove `chat` from the set. Idempotent, symmetric to [`subscribe`].
    ///
    /// [`subscribe`]: Self::subscribe
    pub async fn unsubscribe(&self, chat: ChatId) -> Result<UnsubscribeOutcome, AppError> {
        let mut members = self.members.write().await;
        if !members.remove(&chat) {
            return Ok(UnsubscribeOutcome::NotSubscribed);
        }
        if let Err(e) = self.persist(&members).await {
            members.insert(chat);
            return Err(e);
        }
        debug!(%chat, "unsubscribed");
        Ok(UnsubscribeOutcome::Removed)
    }

    /// Consistent point-in-time copy for iteration, sorted for deterministic
    /// broadcast order. Never observes a half-applied mutation.
    pub async fn snapshot(&self) -> Vec<ChatId> {
        let mut ids: Vec<ChatId> = self.members.read().await.iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    pub async fn contains(&self, chat: ChatId) -> bool {
        self.members.read().await.contains(&chat)
    }

    pub async fn len(&self) -> usize {
        self.members.read().await.len()
    }

    /// Full rewrite of the persisted set, called under the write lock.
    async fn persist(&self, members: &HashSet<ChatId>) -> Result<(), AppError> {
        let mut ids: Vec<ChatId> = members.iter().copied().collect();
        ids.sort_unstable();
        let data = serde_json::to_string(&ids)
            .map_err(|e| AppError::Persistence(format!("serialize subscriber set: {e}")))?;
        tokio::fs::write(&self.path, data).await.map_err(|e| {
            AppError::Persistence(format!("cannot write {}: {e}", self.path.display()))
        })
    }
}
