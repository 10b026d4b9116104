//! Gateway wire types.

use serde::{Deserialize, Serialize};

/// Outbound request body.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GatewayRequest {
    /// Model identifier.
    pub model: String,
    /// Fully rendered prompt.
    pub input: String,
    /// Continuation token from a previous reply, if resuming a gateway
    /// conversation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    /// Whether the gateway should start a fresh conversation.
    pub new_session: bool,
}

impl GatewayRequest {
    /// Request starting a new gateway conversation.
    #[must_use]
    pub fn new_conversation(model: impl Into<String>, input: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            session_id: None,
            new_session: true,
        }
    }

    /// Request continuing an existing gateway conversation.
    #[must_use]
    pub fn continuation(
        model: impl Into<String>,
        input: impl Into<String>,
        session_id: impl Into<String>,
    ) -> Self {
        Self {
            model: model.into(),
            input: input.into(),
            session_id: Some(session_id.into()),
            new_session: false,
        }
    }
}

/// Parsed gateway reply.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayReply {
    /// The model's text output.
    pub text: String,
    /// Continuation token, if the gateway issued/echoed one.
    pub session_id: Option<String>,
}

/// Raw response body. Deployments differ: OpenAI-shaped proxies return
/// `choices[].message.content`, flatter gateways return `output` or
/// `response`. All fields optional; extraction picks the first present.
#[derive(Debug, Deserialize)]
pub(crate) struct RawReply {
    #[serde(default)]
    pub choices: Vec<RawChoice>,
    #[serde(default)]
    pub output: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawChoice {
    #[serde(default)]
    pub message: Option<RawMessage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl RawReply {
    /// Extract the text payload: `choices[0].message.content`, then
    /// `output`, then `response`.
    pub(crate) fn into_reply(self) -> Option<GatewayReply> {
        let text = self
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .or(self.output)
            .or(self.response)?;
        Some(GatewayReply {
            text,
            session_id: self.session_id,
        })
    }
}

/// Error body shapes providers return alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
struct RawErrorBody {
    #[serde(default)]
    error: Option<RawErrorDetail>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawErrorDetail {
    #[serde(default)]
    message: Option<String>,
}

/// Pull a human-readable message out of an error body, falling back to the
/// raw text (truncated) when the body is not the expected JSON.
#[must_use]
pub(crate) fn parse_error_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<RawErrorBody>(body) {
        if let Some(message) = parsed.error.and_then(|e| e.message).or(parsed.message) {
            return message;
        }
    }
    // Body may be HTML or plain text from a proxy
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no response body".to_string()
    } else {
        trimmed.chars().take(200).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_choices_shape() {
        let raw: RawReply = serde_json::from_value(json!({
            "choices": [{"message": {"content": "hello"}}],
            "session_id": "conv-9"
        }))
        .unwrap();
        let reply = raw.into_reply().unwrap();
        assert_eq!(reply.text, "hello");
        assert_eq!(reply.session_id.as_deref(), Some("conv-9"));
    }

    #[test]
    fn extracts_output_shape() {
        let raw: RawReply = serde_json::from_value(json!({"output": "hi"})).unwrap();
        assert_eq!(raw.into_reply().unwrap().text, "hi");
    }

    #[test]
    fn extracts_response_shape() {
        let raw: RawReply = serde_json::from_value(json!({"response": "hi"})).unwrap();
        assert_eq!(raw.into_reply().unwrap().text, "hi");
    }

    #[test]
    fn choices_win_over_flat_fields() {
        let raw: RawReply = serde_json::from_value(json!({
            "choices": [{"message": {"content": "from choices"}}],
            "output": "from output"
        }))
        .unwrap();
        assert_eq!(raw.into_reply().unwrap().text, "from choices");
    }

    #[test]
    fn empty_body_yields_none() {
        let raw: RawReply = serde_json::from_value(json!({})).unwrap();
        assert!(raw.into_reply().is_none());
    }

    #[test]
    fn error_message_nested() {
        let msg = parse_error_message(r#"{"error": {"message": "quota exceeded"}}"#);
        assert_eq!(msg, "quota exceeded");
    }

    #[test]
    fn error_message_flat() {
        let msg = parse_error_message(r#"{"message": "bad request"}"#);
        assert_eq!(msg, "bad request");
    }

    #[test]
    fn error_message_falls_back_to_raw() {
        assert_eq!(parse_error_message("<html>502</html>"), "<html>502</html>");
        assert_eq!(parse_error_message("  "), "no response body");
    }

    #[test]
    fn request_serializes_without_null_session() {
        let req = GatewayRequest::new_conversation("tp-large", "do things");
        let json = serde_json::to_value(&req).unwrap();
        assert!(json.get("session_id").is_none());
        assert_eq!(json["new_session"], true);
    }
}
