//! Multipart upload parsing and staging.

use std::path::{Path, PathBuf};

use axum::body::Bytes;
use axum::extract::Multipart;
use tempfile::NamedTempFile;
use tracing::{debug, error};

use superclass_core::types::ClassificationOptions;
use superclass_extractors::extension_of;

use crate::error::{ApiError, ApiResult};

/// Fields of a document upload form.
#[derive(Debug)]
pub struct UploadForm {
    pub file_name: String,
    pub bytes: Bytes,
    /// Allowed categories; empty means the server defaults apply.
    pub categories: Vec<String>,
    /// Whether the extracted text is echoed back.
    pub include_text: bool,
}

impl UploadForm {
    /// Read `file`, `categories` (JSON string array) and `include_text`.
    ///
    /// Unknown fields are skipped. A missing `file` is rejected.
    pub async fn read(mut multipart: Multipart) -> ApiResult<Self> {
        let mut file = None;
        let mut categories = Vec::new();
        let mut include_text = true;

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some("file") => {
                    let file_name = field.file_name().unwrap_or_default().to_string();
                    file = Some((file_name, field.bytes().await?));
                }
                Some("categories") => {
                    let raw = field.text().await?;
                    if !raw.trim().is_empty() {
                        categories = serde_json::from_str(&raw).map_err(|e| {
                            ApiError::bad_request(format!("Invalid categories format: {}", e))
                        })?;
                    }
                }
                Some("include_text") => {
                    include_text = parse_flag(&field.text().await?)?;
                }
                other => debug!(field = ?other, "Ignoring unknown form field"),
            }
        }

        let (file_name, bytes) =
            file.ok_or_else(|| ApiError::bad_request("Missing 'file' field in form"))?;
        Ok(Self {
            file_name,
            bytes,
            categories,
            include_text,
        })
    }

    /// Classification options for this upload.
    pub fn options(&self, strict: bool) -> ClassificationOptions {
        ClassificationOptions::with_categories(self.categories.iter().cloned()).with_strict(strict)
    }
}

fn parse_flag(value: &str) -> ApiResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "" | "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        other => Err(ApiError::bad_request(format!(
            "Invalid include_text value '{}'",
            other
        ))),
    }
}

/// An upload written to the staging directory; the file is removed on drop.
#[derive(Debug)]
pub struct StagedUpload {
    file: NamedTempFile,
}

impl StagedUpload {
    /// Write `bytes` to a fresh file in `dir`, keeping the extension of `file_name`.
    ///
    /// The client's file name never becomes part of the staged path.
    pub async fn write(dir: &Path, file_name: &str, bytes: &[u8]) -> ApiResult<Self> {
        let extension = extension_of(Path::new(file_name));
        let file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(&extension)
            .tempfile_in(dir)
            .map_err(|e| {
                error!(dir = %dir.display(), error = %e, "Failed to create temporary file");
                ApiError::internal("Failed to create temporary file")
            })?;

        tokio::fs::write(file.path(), bytes).await.map_err(|e| {
            error!(path = %file.path().display(), error = %e, "Failed to save file");
            ApiError::internal("Failed to save file")
        })?;

        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Remove the staged file now, logging rather than failing on error.
    pub fn remove(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        if let Err(e) = self.file.close() {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove temporary file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("").unwrap());
        assert!(parse_flag(" TRUE ").unwrap());
        assert!(!parse_flag("0").unwrap());
        tokio_test::assert_err!(parse_flag("maybe"));
    }

    #[tokio::test]
    async fn test_staged_upload_keeps_extension_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let staged = StagedUpload::write(dir.path(), "../../etc/Report.PDF", b"%PDF-1.4")
            .await
            .unwrap();

        let path = staged.path().to_path_buf();
        assert_eq!(path.parent().unwrap(), dir.path());
        assert_eq!(extension_of(&path), ".pdf");
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4");

        staged.remove();
        assert!(!path.exists());
    }

    #[test]
    fn test_options_apply_strict_flag() {
        let form = UploadForm {
            file_name: "a.txt".to_string(),
            bytes: Bytes::new(),
            categories: vec!["Tech".to_string(), " Tech ".to_string()],
            include_text: true,
        };
        let options = form.options(false);
        assert_eq!(options.categories(), ["Tech".to_string()]);
        assert!(!options.strict);
    }
}
