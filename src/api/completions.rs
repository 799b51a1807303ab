use tracing::debug;

use crate::api::{status_error, ApiError, ChatMessage, ChatRequest, CompletionResponse};
use crate::core::config::Endpoint;
use crate::utils::auth::add_auth_headers;
use crate::utils::url::construct_api_url;

/// Run one non-streamed chat completion and return the first choice's text.
pub async fn complete(
    client: &reqwest::Client,
    endpoint: &Endpoint,
    messages: Vec<ChatMessage>,
    temperature: Option<f32>,
) -> Result<String, ApiError> {
    let url = construct_api_url(&endpoint.base_url, "chat/completions");
    debug!(%url, model = %endpoint.model, "requesting completion");

    let request = ChatRequest {
        model: endpoint.model.clone(),
        messages,
        stream: false,
        temperature,
    };
    let http_request = client
        .post(url)
        .header("Content-Type", "application/json");
    let response = add_auth_headers(http_request, endpoint.api_key.as_deref())
        .json(&request)
        .send()
        .await?;

    if !response.status().is_success() {
        return Err(status_error(response).await);
    }

    let body = response.text().await?;
    let parsed: CompletionResponse =
        serde_json::from_str(&body).map_err(|err| ApiError::Decode {
            context: "completion",
            detail: err.to_string(),
        })?;
    Ok(parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default())
}
