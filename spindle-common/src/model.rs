//! Domain model: albums, verdicts, and the review wire envelope

use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A registered album with its review counters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    /// Album UUID, assigned once at registration and never reused
    pub album_id: Uuid,
    pub artist: String,
    pub title: String,
    /// Free-form release year text
    pub year: String,
    /// Opaque image descriptor
    pub image: String,
    pub like_count: i64,
    pub dislike_count: i64,
    pub created_at: DateTime<Utc>,
}

/// Album registration payload (counters start at zero)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAlbum {
    pub artist: String,
    pub title: String,
    pub year: String,
    pub image: String,
}

/// A review outcome. Closed set; anything else is unrepresentable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Like,
    Dislike,
}

impl Verdict {
    /// Wire token for this verdict
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Like => "like",
            Verdict::Dislike => "dislike",
        }
    }

    /// Parse a wire token. Rejects anything outside the closed set.
    pub fn parse(token: &str) -> Result<Self> {
        match token {
            "like" => Ok(Verdict::Like),
            "dislike" => Ok(Verdict::Dislike),
            other => Err(Error::InvalidVerdict(other.to_string())),
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The wire unit placed on the review queue.
///
/// Serialized as UTF-8 text `"<album_id>:<verdict>"`. Album ids are UUIDs,
/// so the id field can never contain the `:` separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReviewMessage {
    pub album_id: Uuid,
    pub verdict: Verdict,
}

impl ReviewMessage {
    pub fn new(album_id: Uuid, verdict: Verdict) -> Self {
        Self { album_id, verdict }
    }

    /// Encode into the queue payload
    pub fn encode(&self) -> String {
        format!("{}:{}", self.album_id, self.verdict)
    }

    /// Parse a queue payload.
    ///
    /// The payload must split into exactly two `:`-delimited fields, the
    /// first a UUID and the second a valid verdict token. Anything else is
    /// a malformed message (dropped by the consumer, never retried).
    pub fn parse(payload: &str) -> Result<Self> {
        let fields: Vec<&str> = payload.split(':').collect();
        if fields.len() != 2 {
            return Err(Error::MalformedMessage(payload.to_string()));
        }

        let album_id = Uuid::parse_str(fields[0])
            .map_err(|_| Error::MalformedMessage(payload.to_string()))?;
        let verdict = Verdict::parse(fields[1])
            .map_err(|_| Error::MalformedMessage(payload.to_string()))?;

        Ok(Self { album_id, verdict })
    }
}

impl fmt::Display for ReviewMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.album_id, self.verdict)
    }
}
