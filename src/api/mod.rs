use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;

pub mod backend;
pub mod completions;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Deserialize)]
pub struct ChatResponseDelta {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct ChatResponseChoice {
    pub delta: ChatResponseDelta,
}

/// One server-sent event of a streamed completion.
#[derive(Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<ChatResponseChoice>,
}

#[derive(Deserialize)]
pub struct CompletionMessage {
    pub content: Option<String>,
}

#[derive(Deserialize)]
pub struct CompletionChoice {
    pub message: CompletionMessage,
}

/// Body of a non-streamed completion.
#[derive(Deserialize)]
pub struct CompletionResponse {
    pub choices: Vec<CompletionChoice>,
}

/// Successful `/upload` response from the document backend.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct UploadReceipt {
    pub message: Option<String>,
    pub document: Option<String>,
    pub documents_processed: Option<u64>,
    pub collection_id: Option<String>,
    pub filename: Option<String>,
    /// Set when the backend reports a failure with a success status.
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct SearchRequest<'a> {
    pub text: &'a str,
}

#[derive(Deserialize)]
pub struct SearchResponse {
    pub results: String,
}

#[derive(Deserialize)]
pub struct ExtractResponse {
    #[serde(default)]
    pub sentences: Vec<String>,
}

/// Error payload shape shared by the backend and the completion providers.
#[derive(Deserialize)]
struct ErrorBody {
    error: serde_json::Value,
    #[serde(default)]
    details: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// The request never produced a response (DNS, TLS, connection reset, timeout).
    Transport(reqwest::Error),
    /// A non-2xx status, with the server's error text when it sent one.
    Status { status: u16, message: String },
    /// A 2xx response whose body did not have the expected shape.
    Decode { context: &'static str, detail: String },
    /// An I/O failure preparing the request body.
    Io(std::io::Error),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(err) => write!(f, "Request failed: {err}"),
            ApiError::Status { status, message } => {
                write!(f, "API request failed with status {status}: {message}")
            }
            ApiError::Decode { context, detail } => {
                write!(f, "Unexpected {context} response: {detail}")
            }
            ApiError::Io(err) => write!(f, "Failed to prepare request: {err}"),
        }
    }
}

impl StdError for ApiError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            ApiError::Transport(err) => Some(err),
            ApiError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err)
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::Io(err)
    }
}

/// Pull a one-line summary out of an error body (`{"error": {"message": ..}}`,
/// `{"error": ".."}` or `{"message": ..}`).
pub fn extract_error_summary(value: &serde_json::Value) -> Option<String> {
    let summary = value
        .pointer("/error/message")
        .and_then(|v| v.as_str())
        .map(str::to_owned)
        .or_else(|| {
            value
                .get("error")
                .and_then(|v| v.as_str().map(str::to_owned))
        })
        .or_else(|| {
            value
                .get("message")
                .and_then(|v| v.as_str().map(str::to_owned))
        });

    summary
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|text| !text.is_empty())
}

/// Turn an error response into an [`ApiError::Status`].
pub(crate) async fn status_error(response: reqwest::Response) -> ApiError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<no body>".to_string());
    ApiError::Status {
        status,
        message: summarize_error_body(&body),
    }
}

fn summarize_error_body(body: &str) -> String {
    let trimmed = body.trim();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(trimmed) {
        let base = extract_error_summary(&serde_json::json!({ "error": parsed.error }))
            .unwrap_or_else(|| "unknown error".to_string());
        return match parsed.details {
            Some(details) if !details.is_empty() => format!("{base} ({details})"),
            _ => base,
        };
    }
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Some(summary) = extract_error_summary(&value) {
            return summary;
        }
    }
    if trimmed.is_empty() {
        "<empty>".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarize_backend_error_with_details() {
        let body = r#"{"error": "Failed to process chat request", "details": "timeout"}"#;
        assert_eq!(
            summarize_error_body(body),
            "Failed to process chat request (timeout)"
        );
    }

    #[test]
    fn summarize_provider_error_object() {
        let body = r#"{"error": {"message": "Invalid   API key", "type": "auth"}}"#;
        assert_eq!(summarize_error_body(body), "Invalid API key");
    }

    #[test]
    fn summarize_plain_and_empty_bodies() {
        assert_eq!(summarize_error_body("Bad Gateway"), "Bad Gateway");
        assert_eq!(summarize_error_body("  "), "<empty>");
        assert_eq!(summarize_error_body(r#"{"message": "slow down"}"#), "slow down");
    }

    #[test]
    fn upload_receipt_tolerates_missing_fields() {
        let receipt: UploadReceipt =
            serde_json::from_str(r#"{"message": "File processed", "document": "text"}"#)
                .expect("parse receipt");
        assert_eq!(receipt.message.as_deref(), Some("File processed"));
        assert_eq!(receipt.document.as_deref(), Some("text"));
        assert!(receipt.collection_id.is_none());
    }

    #[test]
    fn chat_request_omits_unset_temperature() {
        let request = ChatRequest {
            model: "gpt-4o".into(),
            messages: vec![ChatMessage::user("hi")],
            stream: true,
            temperature: None,
        };
        let json = serde_json::to_value(&request).expect("serialize");
        assert!(json.get("temperature").is_none());
        assert_eq!(json["messages"][0]["role"], "user");
    }
}
