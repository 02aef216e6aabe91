//! Discovering and extracting text from PDF files in a user-chosen directory.
//!
//! The source directory is chosen by the user; we only read and ingest it.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A PDF file we found: path and text extracted from all pages, in page order.
#[derive(Debug, Clone)]
pub struct Document {
    pub path: PathBuf,
    pub text: String,
}

/// Scans `root` for all `.pdf` files and extracts their text.
/// Does not follow symlinks into directories (walkdir default).
pub fn scan_documents(root: &Path) -> Result<Vec<Document>, ScanError> {
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    let mut docs = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| !is_hidden(e))
    {
        let entry = entry.map_err(|e| ScanError::Walk(e.to_string()))?;
        let path = entry.path();
        if is_pdf(path) && path.is_file() {
            tracing::debug!(path = %path.display(), "extracting text");
            let text = pdf_extract::extract_text(path)
                .map_err(|e| ScanError::Extract(path.to_path_buf(), e.to_string()))?;
            docs.push(Document {
                path: path.to_path_buf(),
                text,
            });
        }
    }
    Ok(docs)
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map_or(false, |e| e.eq_ignore_ascii_case("pdf"))
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("walk error: {0}")]
    Walk(String),
    #[error("text extraction failed for {0}: {1}")]
    Extract(PathBuf, String),
}
