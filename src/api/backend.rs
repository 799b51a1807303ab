//! Client for the document backend: upload, search and quiz text extraction.

use reqwest::multipart::{Form, Part};
use tracing::{debug, info};

use crate::api::{
    status_error, ApiError, ExtractResponse, SearchRequest, SearchResponse, UploadReceipt,
};
use crate::core::upload::ValidatedUpload;
use crate::utils::auth::add_backend_headers;
use crate::utils::url::construct_api_url;

#[derive(Clone)]
pub struct BackendClient {
    client: reqwest::Client,
    base_url: String,
    chroma_token: Option<String>,
}

impl BackendClient {
    pub fn new(client: reqwest::Client, base_url: String, chroma_token: Option<String>) -> Self {
        Self {
            client,
            base_url,
            chroma_token,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = construct_api_url(&self.base_url, endpoint);
        add_backend_headers(self.client.post(url), self.chroma_token.as_deref())
    }

    async fn file_form(upload: &ValidatedUpload) -> Result<Form, ApiError> {
        let bytes = tokio::fs::read(&upload.path).await?;
        let part = Part::bytes(bytes)
            .file_name(upload.file_name.clone())
            .mime_str(upload.mime_type)?;
        Ok(Form::new().part("file", part))
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
        context: &'static str,
    ) -> Result<T, ApiError> {
        if !response.status().is_success() {
            return Err(status_error(response).await);
        }
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| ApiError::Decode {
            context,
            detail: err.to_string(),
        })
    }

    /// Send a document to `/upload`; the receipt seeds the chat session.
    pub async fn upload(&self, upload: &ValidatedUpload) -> Result<UploadReceipt, ApiError> {
        info!(file = %upload.file_name, size = upload.size, "uploading document");
        let form = Self::file_form(upload).await?;
        let response = self.post("upload").multipart(form).send().await?;
        let receipt: UploadReceipt = Self::decode(response, "upload").await?;
        if let Some(error) = receipt.error.clone().filter(|e| !e.is_empty()) {
            return Err(ApiError::Status {
                status: 200,
                message: error,
            });
        }
        debug!(collection = ?receipt.collection_id, "upload accepted");
        Ok(receipt)
    }

    /// Query the uploaded collection through `/search`.
    pub async fn search(&self, text: &str) -> Result<String, ApiError> {
        debug!(len = text.len(), "backend search");
        let response = self
            .post("search")
            .json(&SearchRequest { text })
            .send()
            .await?;
        let body: SearchResponse = Self::decode(response, "search").await?;
        Ok(body.results)
    }

    /// Extract sentences from a document for quiz generation.
    pub async fn extract_text(&self, upload: &ValidatedUpload) -> Result<Vec<String>, ApiError> {
        info!(file = %upload.file_name, "extracting quiz text");
        let form = Self::file_form(upload).await?;
        let response = self.post("extract_text").multipart(form).send().await?;
        let body: ExtractResponse = Self::decode(response, "extract_text").await?;
        Ok(body.sentences)
    }
}
