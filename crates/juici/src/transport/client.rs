use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::chunks::ChunkSource;
use crate::config::ClientConfig;
use crate::errors::TransportError;
use crate::models::agent::{AgentDescriptor, AgentIdentity, AgentList, AgentProfile};
use crate::models::message::{Message, MessageId, MessageState};
use crate::models::request::{ChatRequest, ErrorBody};
use crate::models::role::Role;
use crate::store::{ConversationHandle, UpdateMode};

/// Shown in place of a reply when a chat turn fails
pub const CHAT_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your request. Please try again.";
/// Shown in place of a reply when an image upload fails
pub const IMAGE_ERROR_MESSAGE: &str =
    "Sorry, there was an error processing your image. Please try again.";

const EVENT_STREAM: &str = "text/event-stream";

/// How a reply is delivered, decided once from the response headers
#[derive(Debug)]
pub enum ResponseMode {
    Buffered(Message),
    Streaming(ChunkSource),
}

impl ResponseMode {
    pub async fn from_response(response: Response) -> Result<Self, TransportError> {
        let streaming = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.contains(EVENT_STREAM));

        if streaming {
            debug!("reply is streamed");
            return Ok(ResponseMode::Streaming(ChunkSource::from_response(response)));
        }

        let body = response.bytes().await?;
        let message: Message =
            serde_json::from_slice(&body).map_err(|e| TransportError::Decode(e.to_string()))?;
        Ok(ResponseMode::Buffered(message))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryMode {
    Buffered,
    Streaming,
}

/// Result of one turn, after the conversation has been updated
#[derive(Debug)]
pub enum TurnOutcome {
    /// The reply is stored under `message_id`
    Completed {
        message_id: MessageId,
        mode: DeliveryMode,
    },
    /// `message_id` holds either the fixed error text or the partial reply in `Error` state
    Failed {
        message_id: MessageId,
        error: TransportError,
    },
    /// The conversation was cleared while the turn was in flight; nothing was written
    Cancelled,
}

impl TurnOutcome {
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            TurnOutcome::Completed { message_id, .. } | TurnOutcome::Failed { message_id, .. } => {
                Some(*message_id)
            }
            TurnOutcome::Cancelled => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self, TurnOutcome::Completed { .. })
    }
}

/// Sends user turns to the chat service and folds the replies into a conversation
#[derive(Debug, Clone)]
pub struct ChatClient {
    client: Client,
    config: ClientConfig,
}

impl ChatClient {
    pub fn new(config: ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn list_agents(&self) -> Result<Vec<AgentDescriptor>, TransportError> {
        let response = self
            .client
            .get(self.config.api_url("agents")?)
            .send()
            .await?;
        let list: AgentList = check_status(response).await?.json().await?;
        Ok(list.agents)
    }

    pub async fn agent_profile(&self, agent: &AgentIdentity) -> Result<AgentProfile, TransportError> {
        let route = format!("agents/{}", agent);
        let response = self
            .client
            .get(self.config.api_url(&route)?)
            .send()
            .await?;
        Ok(check_status(response).await?.json().await?)
    }

    /// Send a text turn
    ///
    /// Never fails: transport errors end up as an assistant message in the
    /// conversation, and the returned outcome carries the details.
    pub async fn send_text(
        &self,
        conversation: &ConversationHandle,
        agent: &AgentIdentity,
        text: &str,
    ) -> TurnOutcome {
        let token = {
            let mut conversation = conversation.lock();
            conversation.insert(Message::user(text));
            conversation.session_token()
        };

        let request = self.config.api_url("chat").map(|url| {
            self.client
                .post(url)
                .header(ACCEPT, self.accept())
                .json(&ChatRequest::new(agent, text))
        });

        info!(agent = %agent, "sending chat turn");
        run_turn(conversation, &token, request, CHAT_ERROR_MESSAGE).await
    }

    /// Upload an image for analysis
    ///
    /// Only a placeholder naming the file is stored as the user message; the bytes go
    /// out as the `image` part of a multipart body.
    pub async fn send_image(
        &self,
        conversation: &ConversationHandle,
        agent: &AgentIdentity,
        image: Vec<u8>,
        file_name: &str,
    ) -> TurnOutcome {
        let token = {
            let mut conversation = conversation.lock();
            conversation.insert(Message::user(format!("[Uploaded an image: {}]", file_name)));
            conversation.session_token()
        };

        let request = self.config.api_url("upload").and_then(|url| {
            let part = Part::bytes(image)
                .file_name(file_name.to_string())
                .mime_str(image_mime_type(file_name))?;
            let form = Form::new()
                .part("image", part)
                .text("agent_name", agent.to_string());
            Ok(self
                .client
                .post(url)
                .header(ACCEPT, self.accept())
                .multipart(form))
        });

        info!(agent = %agent, file = file_name, "uploading image");
        run_turn(conversation, &token, request, IMAGE_ERROR_MESSAGE).await
    }

    fn accept(&self) -> &'static str {
        if self.config.prefer_streaming {
            "application/json, text/event-stream"
        } else {
            "application/json"
        }
    }
}

async fn run_turn(
    conversation: &ConversationHandle,
    token: &CancellationToken,
    request: Result<RequestBuilder, TransportError>,
    error_text: &str,
) -> TurnOutcome {
    let opened = tokio::select! {
        _ = token.cancelled() => {
            debug!("conversation cleared before the reply arrived");
            return TurnOutcome::Cancelled;
        }
        opened = open(request) => opened,
    };

    match opened {
        Ok(mode) => apply_response(conversation, token, mode).await,
        Err(error) => {
            warn!(error = %error, "chat turn failed");
            let mut conversation = conversation.lock();
            if token.is_cancelled() {
                return TurnOutcome::Cancelled;
            }
            let message_id = conversation.insert(Message::assistant(error_text));
            TurnOutcome::Failed { message_id, error }
        }
    }
}

async fn open(request: Result<RequestBuilder, TransportError>) -> Result<ResponseMode, TransportError> {
    let response = request?.send().await?;
    let response = check_status(response).await?;
    ResponseMode::from_response(response).await
}

/// Fold a reply into the conversation
///
/// A buffered reply is appended whole. A streamed reply gets an empty assistant
/// message that grows chunk by chunk and is marked `Complete` on a clean close. When
/// the stream breaks the partial content stays and the message is marked `Error`.
/// Clearing the conversation cancels `token` and stops the fold. A stream whose
/// message was superseded by a newer reply stops at its next chunk and fails.
pub async fn apply_response(
    conversation: &ConversationHandle,
    token: &CancellationToken,
    mode: ResponseMode,
) -> TurnOutcome {
    match mode {
        ResponseMode::Buffered(message) => {
            let mut conversation = conversation.lock();
            if token.is_cancelled() {
                return TurnOutcome::Cancelled;
            }
            let message_id = conversation.insert(Message {
                role: Role::Assistant,
                state: MessageState::Complete,
                ..message
            });
            TurnOutcome::Completed {
                message_id,
                mode: DeliveryMode::Buffered,
            }
        }
        ResponseMode::Streaming(source) => fold_stream(conversation, token, source).await,
    }
}

async fn fold_stream(
    conversation: &ConversationHandle,
    token: &CancellationToken,
    mut source: ChunkSource,
) -> TurnOutcome {
    let message_id = {
        let mut conversation = conversation.lock();
        if token.is_cancelled() {
            return TurnOutcome::Cancelled;
        }
        conversation.insert(Message::pending_assistant())
    };

    let mut started = false;
    loop {
        let next = tokio::select! {
            _ = token.cancelled() => {
                debug!(message_id, "conversation cleared mid-stream");
                return TurnOutcome::Cancelled;
            }
            next = source.next_chunk() => next,
        };

        let mut conversation = conversation.lock();
        if !conversation
            .get(message_id)
            .is_some_and(|m| m.state.is_in_progress())
        {
            debug!(message_id, "reply superseded, dropping the rest of the stream");
            return TurnOutcome::Failed {
                message_id,
                error: TransportError::Superseded,
            };
        }

        match next {
            Ok(Some(chunk)) => {
                if !started {
                    conversation.set_state(message_id, MessageState::Streaming);
                    started = true;
                }
                conversation.update_content(message_id, &chunk, UpdateMode::Append);
            }
            Ok(None) => {
                conversation.set_state(message_id, MessageState::Complete);
                return TurnOutcome::Completed {
                    message_id,
                    mode: DeliveryMode::Streaming,
                };
            }
            Err(error) => {
                warn!(message_id, error = %error, "reply stream broke");
                conversation.set_state(message_id, MessageState::Error);
                return TurnOutcome::Failed { message_id, error };
            }
        }
    }
}

async fn check_status(response: Response) -> Result<Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(parsed) => parsed.error,
        Err(_) if body.is_empty() => status.canonical_reason().unwrap_or("Unknown error").to_string(),
        Err(_) => body,
    };
    Err(TransportError::Status {
        status: status.as_u16(),
        message,
    })
}

fn image_mime_type(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
