use crate::api::UploadReceipt;

/// Document context for one chat session.
///
/// Every request that needs the uploaded document takes this explicitly;
/// nothing about the current collection is kept in process-wide state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionContext {
    pub collection_id: Option<String>,
    pub filename: Option<String>,
    /// Document text returned by the backend, inlined into chat prompts.
    pub document: Option<String>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the context with the one described by an upload receipt.
    pub fn adopt_upload(&mut self, receipt: &UploadReceipt, local_name: &str) {
        self.collection_id = receipt.collection_id.clone();
        self.filename = Some(
            receipt
                .filename
                .clone()
                .unwrap_or_else(|| local_name.to_string()),
        );
        self.document = receipt.document.clone().filter(|d| !d.trim().is_empty());
    }

    /// Seed the context from a local text document without the backend.
    pub fn with_document(filename: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            collection_id: None,
            filename: Some(filename.into()),
            document: Some(document.into()),
        }
    }

    pub fn has_document(&self) -> bool {
        self.document.is_some() || self.collection_id.is_some()
    }

    pub fn document_text(&self) -> &str {
        self.document.as_deref().unwrap_or("")
    }

    pub fn describe(&self) -> String {
        match (&self.filename, &self.collection_id) {
            (Some(name), Some(id)) => format!("{name} (collection {id})"),
            (Some(name), None) => name.clone(),
            (None, Some(id)) => format!("collection {id}"),
            (None, None) => "no document".to_string(),
        }
    }
}
