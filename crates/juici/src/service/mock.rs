use async_trait::async_trait;
use chrono::Utc;
use futures::StreamExt;
use std::time::Duration;
use tokio::time::sleep;
use tracing::info;

use super::base::{ReplyStream, ResponseService};
use crate::catalog;
use crate::errors::{ServiceError, ServiceResult};
use crate::models::agent::{AgentDescriptor, AgentProfile};
use crate::models::message::Message;
use crate::models::request::{ChatRequest, ImageUpload};

pub const DEFAULT_CHAT_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_UPLOAD_DELAY: Duration = Duration::from_millis(2000);
pub const DEFAULT_STREAM_CHUNK_DELAY: Duration = Duration::from_millis(25);

/// Artificial latency of the mock service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockSettings {
    /// Wait before a chat reply (or its first chunk)
    pub chat_delay: Duration,
    /// Wait before an upload analysis (or its first chunk)
    pub upload_delay: Duration,
    /// Wait between two streamed chunks
    pub stream_chunk_delay: Duration,
}

impl Default for MockSettings {
    fn default() -> Self {
        MockSettings {
            chat_delay: DEFAULT_CHAT_DELAY,
            upload_delay: DEFAULT_UPLOAD_DELAY,
            stream_chunk_delay: DEFAULT_STREAM_CHUNK_DELAY,
        }
    }
}

impl MockSettings {
    /// No artificial latency at all
    pub fn instant() -> Self {
        MockSettings {
            chat_delay: Duration::ZERO,
            upload_delay: Duration::ZERO,
            stream_chunk_delay: Duration::ZERO,
        }
    }
}

/// A service that answers from canned templates after a fixed delay, for UI testing
#[derive(Debug, Clone, Default)]
pub struct MockResponseService {
    settings: MockSettings,
}

impl MockResponseService {
    pub fn new(settings: MockSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &MockSettings {
        &self.settings
    }

    async fn render_chat(&self, request: &ChatRequest) -> ServiceResult<String> {
        let (agent, message) = request.validate()?;
        info!(agent = %agent, "mock chat request");
        sleep(self.settings.chat_delay).await;
        Ok(catalog::chat_reply(agent.as_str(), message))
    }

    async fn render_upload(&self, upload: &ImageUpload) -> ServiceResult<String> {
        if upload.data.is_empty() {
            return Err(ServiceError::MissingImage);
        }
        info!(
            agent = upload.agent_name.as_deref().unwrap_or("-"),
            file = upload.file_name.as_deref().unwrap_or("-"),
            bytes = upload.data.len(),
            "mock image analysis"
        );
        sleep(self.settings.upload_delay).await;
        Ok(catalog::UPLOAD_ANALYSIS.to_string())
    }

    /// Split a reply on word boundaries and pace the pieces
    fn paced(&self, content: String) -> ReplyStream {
        let delay = self.settings.stream_chunk_delay;
        async_stream::stream! {
            for (index, piece) in content.split_inclusive(' ').enumerate() {
                if index > 0 && !delay.is_zero() {
                    sleep(delay).await;
                }
                yield piece.to_string();
            }
        }
        .boxed()
    }
}

#[async_trait]
impl ResponseService for MockResponseService {
    fn agents(&self) -> Vec<AgentDescriptor> {
        catalog::agents()
    }

    fn profile(&self, id: &str) -> Option<AgentProfile> {
        catalog::profile(id)
    }

    async fn chat(&self, request: &ChatRequest) -> ServiceResult<Message> {
        let content = self.render_chat(request).await?;
        Ok(Message::assistant(content).with_id(Utc::now().timestamp_millis()))
    }

    async fn analyze_upload(&self, upload: &ImageUpload) -> ServiceResult<Message> {
        let content = self.render_upload(upload).await?;
        Ok(Message::assistant(content))
    }

    async fn chat_stream(&self, request: &ChatRequest) -> ServiceResult<ReplyStream> {
        let content = self.render_chat(request).await?;
        Ok(self.paced(content))
    }

    async fn analyze_upload_stream(&self, upload: &ImageUpload) -> ServiceResult<ReplyStream> {
        let content = self.render_upload(upload).await?;
        Ok(self.paced(content))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::role::Role;
    use std::time::Instant;

    fn chat_request(agent: &str, message: &str) -> ChatRequest {
        ChatRequest {
            agent_name: Some(agent.to_string()),
            message: Some(message.to_string()),
        }
    }

    #[tokio::test]
    async fn test_chat_uses_agent_template() {
        let service = MockResponseService::new(MockSettings::instant());
        let reply = service
            .chat(&chat_request("digital_transform_analyst", "How do I start?"))
            .await
            .unwrap();

        assert_eq!(reply.role, Role::Assistant);
        assert!(reply.content.contains("How do I start?"));
        assert!(reply.id.is_some());
    }

    #[tokio::test]
    async fn test_chat_unknown_agent_falls_back() {
        let service = MockResponseService::new(MockSettings::instant());
        let reply = service
            .chat(&chat_request("not_a_real_agent", "hi"))
            .await
            .unwrap();
        assert_eq!(reply.content, catalog::fallback_template("hi"));
    }

    #[tokio::test]
    async fn test_chat_requires_agent_name() {
        let service = MockResponseService::new(MockSettings::instant());
        let request = ChatRequest {
            agent_name: None,
            message: Some("hi".to_string()),
        };
        assert_eq!(
            service.chat(&request).await,
            Err(ServiceError::MissingParameters)
        );
    }

    #[tokio::test]
    async fn test_chat_honors_configured_delay() {
        let delay = Duration::from_millis(120);
        let service = MockResponseService::new(MockSettings {
            chat_delay: delay,
            ..MockSettings::instant()
        });

        let started = Instant::now();
        service
            .chat(&chat_request("blogsmith", "hello"))
            .await
            .unwrap();
        assert!(started.elapsed() >= delay);
    }

    #[tokio::test]
    async fn test_upload_returns_canned_analysis() {
        let delay = Duration::from_millis(80);
        let service = MockResponseService::new(MockSettings {
            upload_delay: delay,
            ..MockSettings::instant()
        });
        let upload = ImageUpload::new(vec![0x89, 0x50, 0x4e, 0x47])
            .with_agent("digital_transform_analyst")
            .with_file_name("chart.png");

        let started = Instant::now();
        let reply = service.analyze_upload(&upload).await.unwrap();
        assert!(started.elapsed() >= delay);
        assert_eq!(reply.content, catalog::UPLOAD_ANALYSIS);
        assert_eq!(reply.id, None);
    }

    #[tokio::test]
    async fn test_upload_requires_image_bytes() {
        let service = MockResponseService::new(MockSettings::instant());
        let upload = ImageUpload::default().with_agent("fitcoachai");
        assert_eq!(
            service.analyze_upload(&upload).await,
            Err(ServiceError::MissingImage)
        );
    }

    #[tokio::test]
    async fn test_chat_stream_reassembles_to_buffered_reply() {
        let service = MockResponseService::new(MockSettings::instant());
        let request = chat_request("content_creator", "launch plan");

        let chunks: Vec<String> = service.chat_stream(&request).await.unwrap().collect().await;
        let buffered = service.chat(&request).await.unwrap();

        assert!(chunks.len() > 1);
        assert_eq!(chunks.concat(), buffered.content);
    }

    struct WholeReplyService;

    #[async_trait]
    impl ResponseService for WholeReplyService {
        fn agents(&self) -> Vec<AgentDescriptor> {
            Vec::new()
        }

        fn profile(&self, _id: &str) -> Option<AgentProfile> {
            None
        }

        async fn chat(&self, _request: &ChatRequest) -> ServiceResult<Message> {
            Ok(Message::assistant("whole reply"))
        }

        async fn analyze_upload(&self, _upload: &ImageUpload) -> ServiceResult<Message> {
            Err(ServiceError::Internal("vision backend offline".to_string()))
        }
    }

    #[tokio::test]
    async fn test_default_stream_yields_single_chunk() {
        let service = WholeReplyService;
        let chunks: Vec<String> = service
            .chat_stream(&ChatRequest::default())
            .await
            .unwrap()
            .collect()
            .await;
        assert_eq!(chunks, vec!["whole reply".to_string()]);

        let result = service
            .analyze_upload_stream(&ImageUpload::new(vec![1]))
            .await;
        assert!(matches!(result, Err(ServiceError::Internal(_))));
    }
}
