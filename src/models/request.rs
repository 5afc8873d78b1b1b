use serde::{Deserialize, Serialize};

/// Body of `POST /api/chat` and `POST /api/chat/stream`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: String,
}

impl ChatRequest {
    pub fn new(message: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            session_id: session_id.into(),
        }
    }
}

/// Body of the non-streaming `POST /api/chat` response; identical to the
/// terminal `done` event payload.
pub type ChatResponse = crate::sse::DonePayload;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest::new("hi", "default");
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json, serde_json::json!({"message": "hi", "session_id": "default"}));
    }

    #[test]
    fn test_chat_response_minimal() {
        let response: ChatResponse = serde_json::from_str(r#"{"response": "ok"}"#).unwrap();
        assert_eq!(response.response, "ok");
        assert!(response.active_agent.is_none());
    }
}
