//! Client side log of conversation turns
//!
//! A [`Conversation`] is append-only apart from two in-place edits on the in-progress
//! reply: its content grows as chunks arrive and its [`MessageState`] advances. Every
//! edit addresses a message by id, and an id that is no longer present is ignored
//! rather than treated as an error. That is what makes a late chunk arriving after
//! [`Conversation::clear`] harmless.
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::models::agent::AgentIdentity;
use crate::models::message::{Message, MessageId, MessageState};

/// How [`Conversation::update_content`] applies new text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    Replace,
    Append,
}

/// Ordered history for one agent session
#[derive(Debug)]
pub struct Conversation {
    agent: AgentIdentity,
    messages: Vec<Message>,
    last_id: MessageId,
    session: CancellationToken,
}

impl Conversation {
    pub fn new(agent: AgentIdentity) -> Self {
        Conversation {
            agent,
            messages: Vec::new(),
            last_id: 0,
            session: CancellationToken::new(),
        }
    }

    pub fn agent(&self) -> &AgentIdentity {
        &self.agent
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn get(&self, id: MessageId) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == Some(id))
    }

    /// The reply currently being streamed, if any
    pub fn in_progress(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.state.is_in_progress())
    }

    /// Token cancelled the next time this conversation is cleared
    pub fn session_token(&self) -> CancellationToken {
        self.session.clone()
    }

    /// Add a message to the end and return the stored copy
    ///
    /// Ids are wall-clock milliseconds bumped to stay strictly increasing. A supplied id
    /// is kept only when it preserves that order. Appending an in-progress message
    /// moves any earlier in-progress message to `Error`, so at most one reply is ever
    /// open.
    pub fn append(&mut self, message: Message) -> Message {
        let index = self.messages.len();
        self.insert(message);
        self.messages[index].clone()
    }

    /// Same as [`Conversation::append`], returning only the assigned id
    pub fn insert(&mut self, mut message: Message) -> MessageId {
        let id = match message.id {
            Some(id) if id > self.last_id && id < MessageId::MAX => id,
            _ => Utc::now()
                .timestamp_millis()
                .max(self.last_id.saturating_add(1)),
        };
        self.last_id = id;
        message.id = Some(id);

        if message.state.is_in_progress() {
            for open in self.messages.iter_mut().filter(|m| m.state.is_in_progress()) {
                debug!(id = ?open.id, "superseding in-progress message");
                open.state = MessageState::Error;
            }
        }

        self.messages.push(message);
        id
    }

    /// Replace or extend the content of a message
    ///
    /// Returns `false` without touching anything when `id` is unknown. Callers rely on
    /// this: streams may outlive the conversation they were writing into.
    pub fn update_content(&mut self, id: MessageId, text: &str, mode: UpdateMode) -> bool {
        match self.find_mut(id) {
            Some(message) => {
                match mode {
                    UpdateMode::Replace => message.content = text.to_string(),
                    UpdateMode::Append => message.content.push_str(text),
                }
                true
            }
            None => {
                debug!(id, "ignoring update for unknown message");
                false
            }
        }
    }

    /// Advance the state machine of a message, ignoring illegal moves and unknown ids
    pub fn set_state(&mut self, id: MessageId, state: MessageState) -> bool {
        match self.find_mut(id) {
            Some(message) if message.state == state => true,
            Some(message) if message.state.can_transition_to(state) => {
                message.state = state;
                true
            }
            Some(message) => {
                debug!(id, from = ?message.state, to = ?state, "ignoring illegal state transition");
                false
            }
            None => {
                debug!(id, "ignoring state change for unknown message");
                false
            }
        }
    }

    /// Empty the history and cancel whatever is still writing into it
    ///
    /// The id counter is kept, so no future message can reuse a pre-clear id.
    pub fn clear(&mut self) {
        self.messages.clear();
        self.session.cancel();
        self.session = CancellationToken::new();
    }

    /// Clear the history and hand the conversation to another agent
    pub fn switch_agent(&mut self, agent: AgentIdentity) {
        self.clear();
        self.agent = agent;
    }

    fn find_mut(&mut self, id: MessageId) -> Option<&mut Message> {
        self.messages.iter_mut().find(|m| m.id == Some(id))
    }
}

/// Shared handle to a conversation
///
/// The transport writes through this while the UI keeps its own clone to read, clear
/// or switch agents. The lock is only held for synchronous edits, never across an
/// await.
#[derive(Debug, Clone)]
pub struct ConversationHandle {
    inner: Arc<Mutex<Conversation>>,
}

impl ConversationHandle {
    pub fn new(agent: AgentIdentity) -> Self {
        Self::from(Conversation::new(agent))
    }

    /// Lock the conversation; a poisoned lock still yields the data
    pub fn lock(&self) -> MutexGuard<'_, Conversation> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn append(&self, message: Message) -> Message {
        self.lock().append(message)
    }

    pub fn insert(&self, message: Message) -> MessageId {
        self.lock().insert(message)
    }

    pub fn update_content(&self, id: MessageId, text: &str, mode: UpdateMode) -> bool {
        self.lock().update_content(id, text, mode)
    }

    pub fn set_state(&self, id: MessageId, state: MessageState) -> bool {
        self.lock().set_state(id, state)
    }

    pub fn clear(&self) {
        self.lock().clear()
    }

    pub fn switch_agent(&self, agent: AgentIdentity) {
        self.lock().switch_agent(agent)
    }

    pub fn agent(&self) -> AgentIdentity {
        self.lock().agent().clone()
    }

    pub fn session_token(&self) -> CancellationToken {
        self.lock().session_token()
    }

    /// Copy of the current history, for rendering
    pub fn snapshot(&self) -> Vec<Message> {
        self.lock().messages().to_vec()
    }

    pub fn get(&self, id: MessageId) -> Option<Message> {
        self.lock().get(id).cloned()
    }
}

impl From<Conversation> for ConversationHandle {
    fn from(conversation: Conversation) -> Self {
        ConversationHandle {
            inner: Arc::new(Mutex::new(conversation)),
        }
    }
}
