//! Client-side checks run before a document is sent to the backend.

use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::core::config::data::path_display;

pub const MIB: u64 = 1024 * 1024;

/// Extensions accepted for chat context uploads.
pub const CHAT_EXTENSIONS: &[&str] = &["pdf", "txt", "doc", "docx"];
/// Extensions the backend can extract quiz text from.
pub const QUIZ_EXTENSIONS: &[&str] = &["pdf", "txt"];
/// Files read directly as document text, without the backend.
pub const LOCAL_TEXT_EXTENSIONS: &[&str] = &["txt", "md"];

#[derive(Debug)]
pub enum UploadError {
    Missing(PathBuf),
    NotAFile(PathBuf),
    UnsupportedType {
        path: PathBuf,
        allowed: &'static [&'static str],
    },
    TooLarge {
        path: PathBuf,
        size: u64,
        limit: u64,
    },
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl fmt::Display for UploadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadError::Missing(path) => write!(f, "No such file: {}", path_display(path)),
            UploadError::NotAFile(path) => write!(f, "Not a file: {}", path_display(path)),
            UploadError::UnsupportedType { path, allowed } => write!(
                f,
                "Unsupported file type for {} (allowed: {})",
                path_display(path),
                allowed.join(", ")
            ),
            UploadError::TooLarge { path, size, limit } => write!(
                f,
                "File too large: {} is {:.1}MB; please upload a file smaller than {}MB.",
                path_display(path),
                *size as f64 / MIB as f64,
                limit / MIB
            ),
            UploadError::Io { path, source } => {
                write!(f, "Failed to read {}: {}", path_display(path), source)
            }
        }
    }
}

impl StdError for UploadError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            UploadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct UploadPolicy {
    pub allowed_extensions: &'static [&'static str],
    pub max_bytes: u64,
}

/// A file that passed validation and is ready to send.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidatedUpload {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
    pub mime_type: &'static str,
}

pub fn mime_type_for(extension: &str) -> &'static str {
    match extension {
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => "application/octet-stream",
    }
}

impl UploadPolicy {
    pub fn chat(max_mb: u64) -> Self {
        Self {
            allowed_extensions: CHAT_EXTENSIONS,
            max_bytes: max_mb * MIB,
        }
    }

    pub fn quiz(max_mb: u64) -> Self {
        Self {
            allowed_extensions: QUIZ_EXTENSIONS,
            max_bytes: max_mb * MIB,
        }
    }

    pub fn local_text(max_mb: u64) -> Self {
        Self {
            allowed_extensions: LOCAL_TEXT_EXTENSIONS,
            max_bytes: max_mb * MIB,
        }
    }

    fn extension_of(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
    }

    /// Check type by extension and size from metadata, without reading the file.
    pub fn validate(&self, path: &Path) -> Result<ValidatedUpload, UploadError> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(UploadError::Missing(path.to_path_buf()))
            }
            Err(source) => {
                return Err(UploadError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        if !metadata.is_file() {
            return Err(UploadError::NotAFile(path.to_path_buf()));
        }

        let extension = Self::extension_of(path)
            .filter(|ext| self.allowed_extensions.contains(&ext.as_str()))
            .ok_or_else(|| UploadError::UnsupportedType {
                path: path.to_path_buf(),
                allowed: self.allowed_extensions,
            })?;

        let size = metadata.len();
        if size > self.max_bytes {
            return Err(UploadError::TooLarge {
                path: path.to_path_buf(),
                size,
                limit: self.max_bytes,
            });
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| format!("upload.{extension}"));

        Ok(ValidatedUpload {
            path: path.to_path_buf(),
            file_name,
            size,
            mime_type: mime_type_for(&extension),
        })
    }
}
