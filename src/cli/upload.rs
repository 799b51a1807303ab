use std::error::Error;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::api::UploadReceipt;
use crate::cli::context::CliContext;
use crate::core::session::SessionContext;
use crate::core::upload::{UploadPolicy, ValidatedUpload};

/// Where a session's document comes from.
pub enum SessionSource {
    /// Send the file to the backend and use its receipt.
    Upload(PathBuf),
    /// Read a plain-text file locally; the backend is not contacted.
    Local(PathBuf),
}

/// Validate and upload a file, returning the receipt and the accepted upload.
pub async fn upload_file(
    ctx: &CliContext,
    path: &Path,
) -> Result<(UploadReceipt, ValidatedUpload), Box<dyn Error>> {
    let upload = UploadPolicy::chat(ctx.config.max_upload_mb()).validate(path)?;
    let receipt = ctx.backend().upload(&upload).await?;
    info!(file = %upload.file_name, "document uploaded");
    Ok((receipt, upload))
}

pub async fn load_session(
    ctx: &CliContext,
    source: Option<SessionSource>,
) -> Result<SessionContext, Box<dyn Error>> {
    let session = match source {
        None => return Ok(SessionContext::new()),
        Some(SessionSource::Upload(path)) => {
            let (receipt, upload) = upload_file(ctx, &path).await?;
            let mut session = SessionContext::new();
            session.adopt_upload(&receipt, &upload.file_name);
            session
        }
        Some(SessionSource::Local(path)) => {
            let upload = UploadPolicy::local_text(ctx.config.max_upload_mb()).validate(&path)?;
            let text = tokio::fs::read_to_string(&upload.path).await?;
            SessionContext::with_document(upload.file_name, text)
        }
    };
    eprintln!("📎 {}", session.describe());
    Ok(session)
}

pub fn describe_receipt(receipt: &UploadReceipt, upload: &ValidatedUpload) -> Vec<String> {
    let mut lines = vec![format!(
        "✅ {}",
        receipt.message.as_deref().unwrap_or("File uploaded")
    )];
    lines.push(format!(
        "  file: {} ({:.1} KB)",
        receipt.filename.as_deref().unwrap_or(&upload.file_name),
        upload.size as f64 / 1024.0
    ));
    if let Some(id) = &receipt.collection_id {
        lines.push(format!("  collection: {id}"));
    }
    if let Some(count) = receipt.documents_processed {
        lines.push(format!("  chunks processed: {count}"));
    }
    if let Some(document) = receipt.document.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(format!("  extracted text: {} characters", document.chars().count()));
    }
    lines
}

pub async fn run_upload(ctx: &CliContext, file: PathBuf) -> Result<(), Box<dyn Error>> {
    let (receipt, upload) = upload_file(ctx, &file).await?;
    for line in describe_receipt(&receipt, &upload) {
        println!("{line}");
    }
    Ok(())
}
