use tracing::debug;

use super::Document;

/// Drop pages whose trimmed text has fewer than `min_chars` characters.
/// Surviving pages are passed through untouched, in order.
pub fn filter_documents(docs: Vec<Document>, min_chars: usize) -> Vec<Document> {
    let before = docs.len();
    let kept: Vec<Document> = docs
        .into_iter()
        .filter(|d| d.text.trim().chars().count() >= min_chars)
        .collect();
    debug!(before, after = kept.len(), "filtered pages");
    kept
}
