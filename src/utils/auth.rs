//! Header helpers for requests to the completion providers and the backend.

/// Header the document backend reads its Chroma token from.
pub const CHROMA_TOKEN_HEADER: &str = "x-chroma-token";

/// Attach `Authorization: Bearer` when a key is configured.
///
/// OpenAI and Groq both accept bearer auth; a missing key is left for the
/// provider to reject so its error message reaches the user.
pub fn add_auth_headers(
    request: reqwest::RequestBuilder,
    api_key: Option<&str>,
) -> reqwest::RequestBuilder {
    match api_key.map(str::trim).filter(|key| !key.is_empty()) {
        Some(key) => request.header("Authorization", format!("Bearer {key}")),
        None => request,
    }
}

/// Forward the Chroma token to the backend when one is set.
pub fn add_backend_headers(
    request: reqwest::RequestBuilder,
    chroma_token: Option<&str>,
) -> reqwest::RequestBuilder {
    match chroma_token.filter(|token| !token.is_empty()) {
        Some(token) => request.header(CHROMA_TOKEN_HEADER, token),
        None => request,
    }
}
