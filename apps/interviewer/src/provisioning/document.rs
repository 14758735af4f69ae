use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::AppError;

/// A résumé upload spooled to a temp file for the duration of one provisioning run.
///
/// The file is deleted exactly once: by `dispose` at the end of the run, or by the
/// `NamedTempFile` destructor if the run is dropped before reaching it.
#[derive(Debug)]
pub struct UploadedDocument {
    file: NamedTempFile,
    file_name: String,
}

impl UploadedDocument {
    pub fn from_bytes(file_name: &str, bytes: &[u8]) -> Result<Self, AppError> {
        if bytes.is_empty() {
            return Err(AppError::Validation("uploaded file is empty".to_string()));
        }

        let mut file = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".upload")
            .tempfile()
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to create temp file: {e}")))?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to spool upload: {e}")))?;

        let file_name = match file_name.trim() {
            "" => "resume.pdf".to_string(),
            name => name.to_string(),
        };

        Ok(Self { file, file_name })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub async fn read(&self) -> Result<Vec<u8>, AppError> {
        tokio::fs::read(self.path())
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to read upload: {e}")))
    }

    /// Deletes the temp file. Failures are logged; there is nothing left to retry.
    pub fn dispose(self) {
        let path = self.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Deleted uploaded document {}", path.display()),
            Err(e) => warn!("Failed to delete uploaded document {}: {e}", path.display()),
        }
    }
}
