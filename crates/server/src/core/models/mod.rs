use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Recipient name that addresses every participant in the room.
pub const BROADCAST_RECIPIENT: &str = "Todos";

/// Status text appended when a participant registers.
pub const JOINED_TEXT: &str = "joined";

/// Status text appended when a participant is evicted for inactivity.
pub const LEFT_TEXT: &str = "left";

/// An active participant and the last time it signalled liveness
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub name: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub last_seen: DateTime<Utc>,
}

impl Participant {
    pub fn new(name: impl Into<String>, last_seen: DateTime<Utc>) -> Self {
        Self {
            name: name.into(),
            last_seen,
        }
    }
}

/// Message kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Broadcast,
    Directed,
    Status,
}

impl MessageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Broadcast => "broadcast",
            MessageKind::Directed => "directed",
            MessageKind::Status => "status",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "broadcast" => Ok(MessageKind::Broadcast),
            "directed" => Ok(MessageKind::Directed),
            "status" => Ok(MessageKind::Status),
            other => Err(format!("unknown message kind: {}", other)),
        }
    }
}

/// A single chat message. Immutable once appended to the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub text: String,
    pub kind: MessageKind,
    pub time: String,
}

impl Message {
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        text: impl Into<String>,
        kind: MessageKind,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            text: text.into(),
            kind,
            time: format_time(at),
        }
    }

    /// Synthetic status message announcing a join or leave to the whole room
    pub fn status(from: impl Into<String>, text: &str, at: DateTime<Utc>) -> Self {
        Self::new(from, BROADCAST_RECIPIENT, text, MessageKind::Status, at)
    }
}

/// Wall-clock `HH:MM:SS` in server local time
pub fn format_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Body of `POST /participants`
#[derive(Debug, Deserialize)]
pub struct CreateParticipantInput {
    pub name: String,
}

/// Body of `POST /messages`. The sender comes from the `user` header.
#[derive(Debug, Deserialize)]
pub struct CreateMessageInput {
    pub to: String,
    pub text: String,
    pub kind: String,
}
