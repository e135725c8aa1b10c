use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::errors::ServiceResult;
use crate::models::agent::{AgentDescriptor, AgentProfile};
use crate::models::message::Message;
use crate::models::request::{ChatRequest, ImageUpload};

/// Text chunks of a streamed reply, in delivery order
pub type ReplyStream = BoxStream<'static, String>;

/// Contract every backend behind the chat surface satisfies
///
/// The HTTP layer only talks to this trait, so the mock below can be swapped for a
/// real model without touching the routes, the transport or the message store.
#[async_trait]
pub trait ResponseService: Send + Sync {
    /// The agents this service can answer for, in display order
    fn agents(&self) -> Vec<AgentDescriptor>;

    fn profile(&self, id: &str) -> Option<AgentProfile>;

    /// Answer one chat turn with a complete assistant message
    async fn chat(&self, request: &ChatRequest) -> ServiceResult<Message>;

    /// Analyze an uploaded image and answer with a complete assistant message
    async fn analyze_upload(&self, upload: &ImageUpload) -> ServiceResult<Message>;

    /// Answer one chat turn as a stream of text chunks
    async fn chat_stream(&self, request: &ChatRequest) -> ServiceResult<ReplyStream> {
        let reply = self.chat(request).await?;
        Ok(single_chunk(reply.content))
    }

    /// Analyze an uploaded image as a stream of text chunks
    async fn analyze_upload_stream(&self, upload: &ImageUpload) -> ServiceResult<ReplyStream> {
        let reply = self.analyze_upload(upload).await?;
        Ok(single_chunk(reply.content))
    }
}

fn single_chunk(content: String) -> ReplyStream {
    stream::once(async move { content }).boxed()
}
