use super::agent::AgentIdentity;
use crate::errors::{ServiceError, ServiceResult};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat`
///
/// Both fields are optional on the wire so that a request missing one of them still
/// deserializes and can be answered with a validation error instead of a parse failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ChatRequest {
    pub fn new<S: Into<String>>(agent: &AgentIdentity, message: S) -> Self {
        ChatRequest {
            agent_name: Some(agent.to_string()),
            message: Some(message.into()),
        }
    }

    /// Check both required fields are present and non-empty
    pub fn validate(&self) -> ServiceResult<(AgentIdentity, &str)> {
        let message = self
            .message
            .as_deref()
            .filter(|message| !message.is_empty())
            .ok_or(ServiceError::MissingParameters)?;
        let agent = self
            .agent_name
            .clone()
            .and_then(|name| AgentIdentity::new(name).ok())
            .ok_or(ServiceError::MissingParameters)?;
        Ok((agent, message))
    }
}

/// Body of every non-success response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new<S: Into<String>>(error: S) -> Self {
        ErrorBody {
            error: error.into(),
        }
    }
}

/// An image handed to the upload endpoint
#[derive(Debug, Clone, Default)]
pub struct ImageUpload {
    pub agent_name: Option<String>,
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub data: Bytes,
}

impl ImageUpload {
    pub fn new<B: Into<Bytes>>(data: B) -> Self {
        ImageUpload {
            data: data.into(),
            ..Default::default()
        }
    }

    pub fn with_agent<S: Into<String>>(mut self, agent_name: S) -> Self {
        self.agent_name = Some(agent_name.into());
        self
    }

    pub fn with_file_name<S: Into<String>>(mut self, file_name: S) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    pub fn with_content_type<S: Into<String>>(mut self, content_type: S) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validate_accepts_complete_request() {
        let request: ChatRequest =
            serde_json::from_value(json!({"agent_name": "blogsmith", "message": "hi"})).unwrap();
        let (agent, message) = request.validate().unwrap();
        assert_eq!(agent.as_str(), "blogsmith");
        assert_eq!(message, "hi");
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let missing_agent: ChatRequest = serde_json::from_value(json!({"message": "hi"})).unwrap();
        assert!(matches!(
            missing_agent.validate(),
            Err(ServiceError::MissingParameters)
        ));

        let empty_message: ChatRequest =
            serde_json::from_value(json!({"agent_name": "blogsmith", "message": ""})).unwrap();
        assert!(matches!(
            empty_message.validate(),
            Err(ServiceError::MissingParameters)
        ));
    }

    #[test]
    fn test_serializes_only_present_fields() {
        let request = ChatRequest {
            agent_name: None,
            message: Some("hi".to_string()),
        };
        assert_eq!(serde_json::to_value(request).unwrap(), json!({"message": "hi"}));
    }
}
