//! Chat identity — the stable key for one conversation participant.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque identifier for one chat.
///
/// Wraps the transport's numeric id; everything outside the telegram channel
/// treats it as an opaque key. Serde-transparent so the subscriber file stays
/// a plain list of integers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}
