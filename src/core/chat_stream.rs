use futures_util::StreamExt;
use memchr::memchr;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::api::{extract_error_summary, ChatMessage, ChatRequest, ChatResponse};
use crate::core::prompts::rag_answer_prompt;
use crate::core::session::SessionContext;
use crate::utils::auth::add_auth_headers;
use crate::utils::url::construct_api_url;

#[derive(Clone, Debug)]
pub enum StreamMessage {
    Chunk(String),
    Error(String),
    End,
}

fn extract_data_payload(line: &str) -> Option<&str> {
    line.strip_prefix("data:").map(str::trim_start)
}

fn handle_data_payload(
    payload: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    if payload == "[DONE]" {
        let _ = tx.send((StreamMessage::End, stream_id));
        return true;
    }

    match serde_json::from_str::<ChatResponse>(payload) {
        Ok(response) => {
            if let Some(content) = response
                .choices
                .first()
                .and_then(|choice| choice.delta.content.as_ref())
            {
                let _ = tx.send((StreamMessage::Chunk(content.clone()), stream_id));
            }
            false
        }
        Err(_) => {
            if payload.trim().is_empty() {
                return false;
            }

            let _ = tx.send((StreamMessage::Error(format_api_error(payload)), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            true
        }
    }
}

fn process_sse_line(
    line: &str,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) -> bool {
    extract_data_payload(line)
        .map(|payload| handle_data_payload(payload, tx, stream_id))
        .unwrap_or(false)
}

/// Render an error body as a markdown message: a summary line followed by the
/// body in a fenced block.
pub fn format_api_error(error_text: &str) -> String {
    let trimmed = error_text.trim();

    if trimmed.is_empty() {
        return "API Error:\n```\n<empty>\n```".to_string();
    }

    if let Ok(json_value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        if let Ok(pretty_json) = serde_json::to_string_pretty(&json_value) {
            return match extract_error_summary(&json_value) {
                Some(summary) => format!("API Error: {summary}\n```json\n{pretty_json}\n```"),
                None => format!("API Error:\n```json\n{pretty_json}\n```"),
            };
        }
    }

    if trimmed.starts_with('<') && trimmed.ends_with('>') {
        format!("API Error:\n```xml\n{trimmed}\n```")
    } else {
        format!("API Error:\n```\n{trimmed}\n```")
    }
}

/// Build the single prompt message sent for a question against the session's document.
pub fn build_chat_messages(question: &str, session: &SessionContext) -> Vec<ChatMessage> {
    vec![ChatMessage::user(rag_answer_prompt(
        session.document_text(),
        question,
    ))]
}

pub struct StreamParams {
    pub client: reqwest::Client,
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub api_messages: Vec<ChatMessage>,
    pub cancel_token: tokio_util::sync::CancellationToken,
    pub stream_id: u64,
}

#[derive(Clone)]
pub struct ChatStreamService {
    tx: mpsc::UnboundedSender<(StreamMessage, u64)>,
}

impl ChatStreamService {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<(StreamMessage, u64)>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn spawn_stream(&self, params: StreamParams) {
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let StreamParams {
                client,
                base_url,
                api_key,
                model,
                api_messages,
                cancel_token,
                stream_id,
            } = params;

            let request = ChatRequest {
                model,
                messages: api_messages,
                stream: true,
                temperature: None,
            };

            tokio::select! {
                _ = run_stream(client, &base_url, api_key.as_deref(), &request, &tx, stream_id) => {}
                _ = cancel_token.cancelled() => {
                    debug!(stream_id, "chat stream cancelled");
                }
            }
        });
    }

    #[cfg(test)]
    pub fn send_for_test(&self, message: StreamMessage, stream_id: u64) {
        let _ = self.tx.send((message, stream_id));
    }
}

async fn run_stream(
    client: reqwest::Client,
    base_url: &str,
    api_key: Option<&str>,
    request: &ChatRequest,
    tx: &mpsc::UnboundedSender<(StreamMessage, u64)>,
    stream_id: u64,
) {
    let chat_url = construct_api_url(base_url, "chat/completions");
    debug!(%chat_url, model = %request.model, stream_id, "starting chat stream");

    let http_request = client
        .post(&chat_url)
        .header("Content-Type", "application/json");
    let http_request = add_auth_headers(http_request, api_key);

    let response = match http_request.json(request).send().await {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "chat request failed");
            let _ = tx.send((StreamMessage::Error(format_api_error(&e.to_string())), stream_id));
            let _ = tx.send((StreamMessage::End, stream_id));
            return;
        }
    };

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "<no body>".to_string());
        warn!(%status, "chat request rejected");
        let _ = tx.send((StreamMessage::Error(format_api_error(&error_text)), stream_id));
        let _ = tx.send((StreamMessage::End, stream_id));
        return;
    }

    let mut stream = response.bytes_stream();
    let mut buffer: Vec<u8> = Vec::new();

    while let Some(chunk) = stream.next().await {
        let chunk_bytes = match chunk {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "chat stream interrupted");
                let _ = tx.send((StreamMessage::Error(format_api_error(&e.to_string())), stream_id));
                break;
            }
        };
        buffer.extend_from_slice(&chunk_bytes);

        while let Some(newline_pos) = memchr(b'\n', &buffer) {
            let should_end = match std::str::from_utf8(&buffer[..newline_pos]) {
                Ok(line) => process_sse_line(line.trim(), tx, stream_id),
                Err(e) => {
                    warn!(error = %e, "invalid UTF-8 in stream");
                    false
                }
            };
            buffer.drain(..=newline_pos);
            if should_end {
                return;
            }
        }
    }

    let _ = tx.send((StreamMessage::End, stream_id));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn process_sse_line_handles_spacing_variants() {
        let (service, mut rx) = ChatStreamService::new();
        let variants = [
            (
                r#"data: {"choices":[{"delta":{"content":"Hello"}}]}"#,
                "Hello",
                "data: [DONE]",
            ),
            (
                r#"data:{"choices":[{"delta":{"content":"World"}}]}"#,
                "World",
                "data:[DONE]",
            ),
        ];

        for (index, (chunk_line, expected_chunk, done_line)) in variants.iter().enumerate() {
            let stream_id = (index + 1) as u64;

            assert!(!process_sse_line(chunk_line, &service.tx, stream_id));
            let (message, received_id) = rx.try_recv().expect("expected chunk message");
            assert_eq!(received_id, stream_id);
            match message {
                StreamMessage::Chunk(content) => assert_eq!(content, *expected_chunk),
                other => panic!("expected chunk message, got {:?}", other),
            }

            assert!(process_sse_line(done_line, &service.tx, stream_id));
            let (message, received_id) = rx.try_recv().expect("expected end message");
            assert_eq!(received_id, stream_id);
            assert!(matches!(message, StreamMessage::End));
        }

        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn non_data_lines_and_empty_deltas_are_ignored() {
        let (service, mut rx) = ChatStreamService::new();
        assert!(!process_sse_line(": keep-alive", &service.tx, 1));
        assert!(!process_sse_line("event: message", &service.tx, 1));
        assert!(!process_sse_line(
            r#"data: {"choices":[{"delta":{"role":"assistant"}}]}"#,
            &service.tx,
            1
        ));
        assert!(!process_sse_line("data: ", &service.tx, 1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn process_sse_line_routes_stream_errors() {
        let (service, mut rx) = ChatStreamService::new();
        let error_line = r#"data: {"error":{"message":"internal server error"}}"#;
        let stream_id = 99;

        assert!(process_sse_line(error_line, &service.tx, stream_id));

        let (message, received_id) = rx.try_recv().expect("expected error message");
        assert_eq!(received_id, stream_id);
        match message {
            StreamMessage::Error(text) => {
                let expected = r#"API Error: internal server error
```json
{
  "error": {
    "message": "internal server error"
  }
}
```"#;
                assert_eq!(text, expected);
            }
            other => panic!("expected error message, got {:?}", other),
        }

        let (message, _) = rx.try_recv().expect("expected end message");
        assert!(matches!(message, StreamMessage::End));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn format_api_error_handles_json_without_summary() {
        let formatted = format_api_error(r#"{"status":"failed"}"#);
        assert_eq!(formatted, "API Error:\n```json\n{\n  \"status\": \"failed\"\n}\n```");
    }

    #[test]
    fn format_api_error_handles_xml_and_plaintext() {
        assert_eq!(
            format_api_error("<error>bad</error>"),
            "API Error:\n```xml\n<error>bad</error>\n```"
        );
        assert_eq!(format_api_error("api failure"), "API Error:\n```\napi failure\n```");
        assert_eq!(format_api_error("   "), "API Error:\n```\n<empty>\n```");
    }

    #[test]
    fn chat_messages_inline_the_session_document() {
        let session = SessionContext::with_document("notes.txt", "The sky is blue.");
        let messages = build_chat_messages("What colour is the sky?", &session);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert!(messages[0].content.contains("The sky is blue."));
        assert!(messages[0].content.contains("What colour is the sky?"));
    }

    #[tokio::test]
    async fn service_delivers_messages_in_send_order() {
        let (service, mut rx) = ChatStreamService::new();
        service.send_for_test(StreamMessage::Chunk("a".into()), 3);
        service.send_for_test(StreamMessage::Chunk("b".into()), 3);
        service.send_for_test(StreamMessage::End, 3);

        let mut collected = String::new();
        while let Some((message, id)) = rx.recv().await {
            assert_eq!(id, 3);
            match message {
                StreamMessage::Chunk(text) => collected.push_str(&text),
                StreamMessage::End => break,
                StreamMessage::Error(err) => panic!("unexpected error {err}"),
            }
        }
        assert_eq!(collected, "ab");
    }
}
