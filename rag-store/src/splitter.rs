//! Recursive character splitter.
//!
//! Text is cut on the first separator that occurs in it (paragraphs, then
//! lines, then words, then single characters). Pieces that are still too long
//! are split again with the remaining separators; short pieces are merged back
//! up to `chunk_size`, carrying up to `chunk_overlap` characters of tail into
//! the next chunk. Every length is counted in characters.

use std::collections::VecDeque;

use tracing::warn;

use crate::record::{Chunk, Document};

/// Separators tried in order. The empty separator splits into characters.
pub const DEFAULT_SEPARATORS: [&str; 4] = ["\n\n", "\n", " ", ""];

#[derive(Debug, Clone)]
pub struct RecursiveSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
    separators: Vec<String>,
}

impl RecursiveSplitter {
    /// `chunk_overlap` is clamped below `chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
            separators: DEFAULT_SEPARATORS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Splits one page into chunks that inherit its `source` and `page`.
    pub fn split_document(&self, doc: &Document) -> Vec<Chunk> {
        self.split_text(&doc.text)
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| Chunk {
                text,
                source: doc.source.clone(),
                page: doc.page,
                ordinal,
            })
            .collect()
    }

    /// Splits `text` into trimmed, non-empty chunks of at most `chunk_size` characters.
    pub fn split_text(&self, text: &str) -> Vec<String> {
        let seps: Vec<&str> = self.separators.iter().map(String::as_str).collect();
        self.split_recursive(text, &seps)
            .into_iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect()
    }

    fn split_recursive(&self, text: &str, separators: &[&str]) -> Vec<String> {
        let mut separator = separators.last().copied().unwrap_or("");
        let mut rest: &[&str] = &[];
        for (i, s) in separators.iter().enumerate() {
            if s.is_empty() {
                separator = s;
                break;
            }
            if text.contains(s) {
                separator = s;
                rest = &separators[i + 1..];
                break;
            }
        }

        let mut out = Vec::new();
        let mut good: Vec<&str> = Vec::new();
        for piece in split_keep_separator(text, separator) {
            if char_len(piece) < self.chunk_size {
                good.push(piece);
                continue;
            }
            if !good.is_empty() {
                out.extend(self.merge(&good));
                good.clear();
            }
            if rest.is_empty() {
                out.push(piece.to_string());
            } else {
                out.extend(self.split_recursive(piece, rest));
            }
        }
        if !good.is_empty() {
            out.extend(self.merge(&good));
        }
        out
    }

    /// Greedily packs pieces into chunks, keeping an overlapping tail between them.
    fn merge(&self, pieces: &[&str]) -> Vec<String> {
        let mut docs = Vec::new();
        let mut current: VecDeque<(&str, usize)> = VecDeque::new();
        let mut total = 0usize;

        for &piece in pieces {
            let len = char_len(piece);
            if total + len > self.chunk_size {
                if total > self.chunk_size {
                    warn!(
                        len = total,
                        chunk_size = self.chunk_size,
                        "created a chunk longer than the configured size"
                    );
                }
                if !current.is_empty() {
                    push_joined(&mut docs, &current);
                    while total > self.chunk_overlap
                        || (total + len > self.chunk_size && total > 0)
                    {
                        match current.pop_front() {
                            Some((_, l)) => total -= l,
                            None => break,
                        }
                    }
                }
            }
            current.push_back((piece, len));
            total += len;
        }
        push_joined(&mut docs, &current);
        docs
    }
}

impl Default for RecursiveSplitter {
    fn default() -> Self {
        Self::new(500, 50)
    }
}

fn push_joined(docs: &mut Vec<String>, current: &VecDeque<(&str, usize)>) {
    let joined: String = current.iter().map(|(s, _)| *s).collect();
    let trimmed = joined.trim();
    if !trimmed.is_empty() {
        docs.push(trimmed.to_string());
    }
}

/// Splits on `sep`, attaching each separator to the start of the piece that follows it.
fn split_keep_separator<'t>(text: &'t str, sep: &str) -> Vec<&'t str> {
    if sep.is_empty() {
        return text
            .char_indices()
            .map(|(i, c)| &text[i..i + c.len_utf8()])
            .collect();
    }
    let mut pieces = Vec::new();
    let mut start = 0;
    for (idx, _) in text.match_indices(sep) {
        if idx > start {
            pieces.push(&text[start..idx]);
        }
        start = idx;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn char_len(s: &str) -> usize {
    s.chars().count()
}
