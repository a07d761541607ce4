// Scoped temporary files for uploads awaiting extraction

use std::path::{Path, PathBuf};

use axum::extract::multipart::Field;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::{AppError, AppResult};

/// What the staged file is for; decides its name on disk
#[derive(Debug, Clone, Copy)]
pub enum StagePurpose {
    Create,
    /// Append operations carry their own id so two in-flight updates never share a path
    Append(Uuid),
}

/// A file under the upload directory that is deleted when dropped.
///
/// Dropping covers every exit path of a handler: success, early return on a
/// validation error, and panics or cancelled futures.
#[derive(Debug)]
pub struct StagedUpload {
    path: PathBuf,
    size: u64,
}

impl StagedUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Streams a multipart field to disk, enforcing `max_size`.
    ///
    /// Oversized and empty uploads are rejected; the partial file is removed
    /// by the guard going out of scope.
    pub async fn from_field(
        dir: &Path,
        id: &Uuid,
        purpose: StagePurpose,
        mut field: Field<'_>,
        max_size: u64,
    ) -> AppResult<Self> {
        let filename = sanitize_filename(field.file_name().unwrap_or("upload.pdf"));
        let name = match purpose {
            StagePurpose::Create => format!("{}_{}", id, filename),
            StagePurpose::Append(op) => format!("{}_update_{}_{}", id, op, filename),
        };

        let mut staged = Self {
            path: dir.join(name),
            size: 0,
        };
        let mut file = File::create(&staged.path).await?;
        debug!(path = %staged.path.display(), "Staging upload");

        loop {
            let chunk = match field.chunk().await {
                Ok(Some(chunk)) => chunk,
                Ok(None) => break,
                Err(e) if e.status() == axum::http::StatusCode::PAYLOAD_TOO_LARGE => {
                    return Err(too_large(max_size));
                }
                Err(e) => {
                    return Err(AppError::InvalidRequest(format!(
                        "Failed to read uploaded file: {}",
                        e.body_text()
                    )));
                }
            };

            staged.size += chunk.len() as u64;
            if staged.size > max_size {
                return Err(too_large(max_size));
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        if staged.size == 0 {
            return Err(AppError::InvalidRequest("Uploaded file is empty".to_string()));
        }

        Ok(staged)
    }
}

impl Drop for StagedUpload {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!(path = %self.path.display(), "Removed staged upload"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %self.path.display(), error = %e, "Failed to remove staged upload"),
        }
    }
}

fn too_large(max_size: u64) -> AppError {
    AppError::PayloadTooLarge(format!(
        "File too large. Maximum size is {}MB",
        max_size / (1024 * 1024)
    ))
}

/// Keeps only the final path component and a conservative character set
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');

    if cleaned.is_empty() {
        "upload.pdf".to_string()
    } else {
        cleaned.chars().take(128).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("report.pdf"), "report.pdf");
        assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_filename("C:\\docs\\q3 report.pdf"), "q3_report.pdf");
        assert_eq!(sanitize_filename(".."), "upload.pdf");
        assert_eq!(sanitize_filename(""), "upload.pdf");
        assert_eq!(sanitize_filename(".hidden.pdf"), "hidden.pdf");
    }

    #[test]
    fn test_drop_removes_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("staged.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let staged = StagedUpload {
            path: path.clone(),
            size: 8,
        };
        assert_eq!(staged.size(), 8);
        assert!(staged.path().exists());

        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_tolerates_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let staged = StagedUpload {
            path: dir.path().join("never-written.pdf"),
            size: 0,
        };
        drop(staged);
    }
}
