use super::role::Role;
use serde::{Deserialize, Serialize};

/// Identifier of a message inside one conversation
pub type MessageId = i64;

/// Lifecycle of a stored message
///
/// User messages and buffered replies are stored `Complete`. A streamed reply starts
/// `Pending`, becomes `Streaming` on its first chunk and ends `Complete` on a clean
/// close or `Error` when the stream breaks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageState {
    Pending,
    Streaming,
    #[default]
    Complete,
    Error,
}

impl MessageState {
    /// Whether the message may still receive content
    pub fn is_in_progress(&self) -> bool {
        matches!(self, MessageState::Pending | MessageState::Streaming)
    }

    /// Legal moves of the per-message state machine
    pub fn can_transition_to(&self, next: MessageState) -> bool {
        use MessageState::*;
        matches!(
            (self, next),
            (Pending, Streaming)
                | (Pending, Complete)
                | (Pending, Error)
                | (Streaming, Complete)
                | (Streaming, Error)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// A single turn of a conversation, as stored and as sent over the wire
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<MessageId>,
    #[serde(skip)]
    pub state: MessageState,
}

impl Message {
    pub fn new<S: Into<String>>(role: Role, content: S) -> Self {
        Message {
            role,
            content: content.into(),
            id: None,
            state: MessageState::Complete,
        }
    }

    /// Create a completed user message
    pub fn user<S: Into<String>>(content: S) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a completed assistant message
    pub fn assistant<S: Into<String>>(content: S) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create the empty assistant message a stream is folded into
    pub fn pending_assistant() -> Self {
        Message {
            state: MessageState::Pending,
            ..Self::assistant("")
        }
    }

    pub fn with_id(mut self, id: MessageId) -> Self {
        self.id = Some(id);
        self
    }
}
