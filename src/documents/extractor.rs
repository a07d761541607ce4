// PDF text extraction

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use lopdf::Document;
use tracing::{debug, warn};

use crate::types::{AppError, AppResult};

/// Converts a staged file into plain text
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path) -> AppResult<String>;
}

/// Extracts the text layer of every page with lopdf, in page order
#[derive(Debug, Clone, Copy, Default)]
pub struct LopdfExtractor;

impl LopdfExtractor {
    pub fn extract_blocking(path: &Path) -> AppResult<String> {
        let doc = Document::load(path)
            .map_err(|e| AppError::Extraction(format!("invalid PDF: {}", e)))?;

        let mut page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();
        page_numbers.sort_unstable();
        debug!(pages = page_numbers.len(), path = %path.display(), "Loaded PDF");

        if page_numbers.is_empty() {
            return Ok(String::new());
        }

        match doc.extract_text(&page_numbers) {
            Ok(text) => Ok(text),
            Err(e) => {
                // Fall back to page-by-page so one broken page does not lose the rest
                warn!(error = %e, "Whole-document text extraction failed, retrying per page");
                let mut out = String::new();
                for n in &page_numbers {
                    match doc.extract_text(&[*n]) {
                        Ok(text) => {
                            if !out.is_empty() && !out.ends_with('\n') {
                                out.push('\n');
                            }
                            out.push_str(&text);
                        }
                        Err(e) => warn!(page = n, error = %e, "Skipping unreadable page"),
                    }
                }
                Ok(out)
            }
        }
    }
}

#[async_trait]
impl TextExtractor for LopdfExtractor {
    async fn extract(&self, path: &Path) -> AppResult<String> {
        let path: PathBuf = path.to_path_buf();
        tokio::task::spawn_blocking(move || Self::extract_blocking(&path))
            .await
            .map_err(|e| AppError::Internal(format!("extraction task failed: {}", e)))?
    }
}

/// True when the text has at least one non-whitespace character
pub fn has_text(text: &str) -> bool {
    !text.trim().is_empty()
}
