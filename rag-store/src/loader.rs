//! PDF discovery and per-page text extraction.

use std::path::{Path, PathBuf};

use globset::{Glob, GlobMatcher};
use tracing::{debug, trace, warn};

use crate::errors::RagError;
use crate::record::Document;

/// Page separator emitted by `pdf-extract` between pages.
const PAGE_BREAK: char = '\x0c';

/// Result of loading a directory of PDFs.
#[derive(Debug, Default)]
pub struct LoadedPdfs {
    pub documents: Vec<Document>,
    /// Files that matched the glob.
    pub files: usize,
    /// Files whose text could not be extracted.
    pub skipped: usize,
}

/// Lists files directly inside `dir` whose name matches `pattern`, sorted by path.
///
/// A missing directory yields an empty list.
pub fn list_pdfs(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>, RagError> {
    let matcher = compile(pattern)?;
    if !dir.is_dir() {
        warn!(dir = %dir.display(), "pdf directory does not exist");
        return Ok(Vec::new());
    }

    let mut out = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        if matcher.is_match(entry.file_name()) {
            out.push(entry.path());
        }
    }
    out.sort();
    trace!(dir = %dir.display(), count = out.len(), "loader::list_pdfs");
    Ok(out)
}

/// Loads every matching PDF in `dir`. Files that fail to extract are skipped.
pub async fn load_pdf_dir(dir: &Path, pattern: &str) -> Result<LoadedPdfs, RagError> {
    let files = list_pdfs(dir, pattern)?;
    let mut loaded = LoadedPdfs {
        files: files.len(),
        ..Default::default()
    };

    for path in files {
        let source = path.display().to_string();
        let extracted = match tokio::task::spawn_blocking({
            let path = path.clone();
            move || extract(&path)
        })
        .await
        {
            Ok(r) => r,
            // pdf-extract panics on some malformed fonts and streams
            Err(e) if e.is_panic() => Err(RagError::Pdf {
                path: source.clone(),
                message: "extractor panicked".into(),
            }),
            Err(e) => return Err(e.into()),
        };

        match extracted {
            Ok(text) => {
                let pages = split_pages(&text, &source);
                debug!(source = %source, pages = pages.len(), "extracted pdf");
                loaded.documents.extend(pages);
            }
            Err(e) => {
                warn!(source = %source, error = %e, "skipping pdf that failed to extract");
                loaded.skipped += 1;
            }
        }
    }
    Ok(loaded)
}

fn extract(path: &Path) -> Result<String, RagError> {
    let bytes = std::fs::read(path)?;
    pdf_extract::extract_text_from_mem(&bytes).map_err(|e| RagError::Pdf {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}

/// Splits extracted text into page documents on form feeds.
///
/// Page numbers are zero-based and count blank pages, which are not returned.
pub fn split_pages(text: &str, source: &str) -> Vec<Document> {
    text.split(PAGE_BREAK)
        .enumerate()
        .filter(|(_, page)| !page.trim().is_empty())
        .map(|(page, body)| Document {
            text: body.to_string(),
            source: source.to_string(),
            page,
        })
        .collect()
}

fn compile(pattern: &str) -> Result<GlobMatcher, RagError> {
    Glob::new(pattern)
        .map(|g| g.compile_matcher())
        .map_err(|e| RagError::Config(format!("invalid PDF_GLOB `{pattern}`: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_feeds_split_pages() {
        let docs = split_pages("first\x0csecond\x0c\x0cfourth", "a.pdf");
        let pages: Vec<_> = docs.iter().map(|d| (d.page, d.text.as_str())).collect();
        assert_eq!(pages, vec![(0, "first"), (1, "second"), (3, "fourth")]);
    }

    #[test]
    fn text_without_separator_is_one_page() {
        let docs = split_pages("only page", "a.pdf");
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].page, 0);
    }

    #[test]
    fn lists_only_matching_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.pdf", "a.pdf", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"x").unwrap();
        }
        std::fs::create_dir(dir.path().join("nested.pdf")).unwrap();

        let files = list_pdfs(dir.path(), "*.pdf").unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.pdf", "b.pdf"]);
    }

    #[test]
    fn missing_dir_lists_nothing() {
        let files = list_pdfs(Path::new("/definitely/not/here"), "*.pdf").unwrap();
        assert!(files.is_empty());
    }

    #[tokio::test]
    async fn unreadable_pdf_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.pdf"), b"not a pdf").unwrap();

        let loaded = load_pdf_dir(dir.path(), "*.pdf").await.unwrap();
        assert_eq!(loaded.files, 1);
        assert_eq!(loaded.skipped, 1);
        assert!(loaded.documents.is_empty());
    }
}
