//! PDF loading, one [`Document`] per page.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::AppError;

use super::Document;

/// `*.pdf` files directly inside `dir`, sorted by path. Extension match is
/// case-insensitive.
pub fn pdf_files(dir: &Path) -> Result<Vec<PathBuf>, AppError> {
    let entries = fs::read_dir(dir)
        .map_err(|e| AppError::ingest("load", format!("cannot read {}: {e}", dir.display())))?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| AppError::ingest("load", e))?.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("pdf"));
        if is_pdf && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Extract every page of one PDF.
pub fn load_pdf(path: &Path) -> Result<Vec<Document>, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::ingest("load", format!("{}: {e}", path.display())))?;
    let pages = pdf_extract::extract_text_from_mem_by_pages(&bytes)
        .map_err(|e| AppError::ingest("load", format!("{}: PDF parse error: {e}", path.display())))?;
    let source = path.display().to_string();
    debug!(%source, pages = pages.len(), "extracted pdf");
    Ok(pages
        .into_iter()
        .enumerate()
        .map(|(page, text)| Document { text, source: source.clone(), page: page as u32 })
        .collect())
}

/// Load every PDF in `dir`. An empty directory is an error: there would be
/// nothing to index.
pub fn load_dir(dir: &Path) -> Result<Vec<Document>, AppError> {
    let files = pdf_files(dir)?;
    if files.is_empty() {
        return Err(AppError::ingest("load", format!("no PDF files found in {}", dir.display())));
    }
    let mut docs = Vec::new();
    for file in &files {
        docs.extend(load_pdf(file)?);
    }
    info!(files = files.len(), pages = docs.len(), "loaded pdf pages");
    Ok(docs)
}
