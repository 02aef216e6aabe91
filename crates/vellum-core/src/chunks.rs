//! Splits document text into chunks for embedding.
//! Prefers paragraph boundaries; falls back to line breaks, then character
//! splits. Consecutive chunks of a long run carry a short overlap so context
//! is not lost at chunk borders.

use std::path::PathBuf;

use crate::documents::Document;

/// Default maximum characters per chunk. Keeps chunks small enough for embedding models.
pub const DEFAULT_MAX_CHARS: usize = 500;

/// Default characters of carry-over between consecutive chunks.
pub const DEFAULT_OVERLAP: usize = 20;

/// A chunk of text from a document, with source reference.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub doc_path: PathBuf,
    /// Index of this chunk within the document (0, 1, 2, …).
    pub index: usize,
}

/// Chunk a single document's text into smaller pieces.
pub fn chunk_document(doc: &Document, max_chars: usize, overlap: usize) -> Vec<Chunk> {
    let text = doc.text.trim();
    if text.is_empty() {
        return Vec::new();
    }
    let mut chunks = Vec::new();
    for (i, text) in split_into_chunks(text, max_chars, overlap).into_iter().enumerate() {
        let t = text.trim().to_string();
        if !t.is_empty() {
            chunks.push(Chunk {
                text: t,
                doc_path: doc.path.clone(),
                index: i,
            });
        }
    }
    chunks
}

/// Chunk all documents. Returns chunks from all documents in order.
pub fn chunk_documents(docs: &[Document], max_chars: usize, overlap: usize) -> Vec<Chunk> {
    docs.iter()
        .flat_map(|d| chunk_document(d, max_chars, overlap))
        .collect()
}

/// Splits text into chunks of at most max_chars, preferring paragraph and line boundaries.
fn split_into_chunks(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    if max_chars == 0 {
        return vec![text.to_string()];
    }
    let mut result = Vec::new();
    for para in text.split("\n\n") {
        let para = para.trim();
        if para.is_empty() {
            continue;
        }
        if para.len() <= max_chars {
            result.push(para.to_string());
        } else {
            for chunk in split_long_text(para, max_chars, overlap) {
                result.push(chunk);
            }
        }
    }
    if result.is_empty() && !text.trim().is_empty() {
        for chunk in split_long_text(text.trim(), max_chars, overlap) {
            result.push(chunk);
        }
    }
    result
}

/// Splits a single run of text that exceeds max_chars, then prefixes each
/// piece after the first with the tail of the previous one.
fn split_long_text(text: &str, max_chars: usize, overlap: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        if remaining.len() <= max_chars {
            pieces.push(remaining.trim().to_string());
            break;
        }
        let (chunk, rest) = try_split_at_boundary(remaining, max_chars);
        pieces.push(chunk);
        remaining = rest;
    }
    if overlap == 0 || pieces.len() < 2 {
        return pieces;
    }
    let mut result = Vec::with_capacity(pieces.len());
    result.push(pieces[0].clone());
    for i in 1..pieces.len() {
        let tail = overlap_tail(&pieces[i - 1], overlap);
        if tail.is_empty() {
            result.push(pieces[i].clone());
        } else {
            result.push(format!("{} {}", tail, pieces[i]));
        }
    }
    result
}

/// Prefer split at \n; else at last space before max_chars; else hard cut.
fn try_split_at_boundary(text: &str, max_chars: usize) -> (String, &str) {
    let segment = &text[..floor_boundary(text, max_chars.saturating_add(1))];
    if let Some(pos) = segment.rfind('\n') {
        return (text[..pos].trim().to_string(), text[pos + 1..].trim_start());
    }
    if let Some(pos) = segment.rfind(' ') {
        return (text[..pos].to_string(), text[pos + 1..].trim_start());
    }
    let cut = floor_boundary(text, max_chars);
    (text[..cut].to_string(), text[cut..].trim_start())
}

/// Largest index <= `at` that lands on a char boundary.
fn floor_boundary(text: &str, at: usize) -> usize {
    let mut i = at.min(text.len());
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Up to `overlap` trailing bytes of `s`, cut forward to a char boundary.
fn overlap_tail(s: &str, overlap: usize) -> &str {
    if s.len() <= overlap {
        return s;
    }
    let mut start = s.len() - overlap;
    while !s.is_char_boundary(start) {
        start += 1;
    }
    &s[start..]
}
