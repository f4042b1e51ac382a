// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Per-file pre-flight limits (file size, PDF page count).
//
// The engine CLI has no page or size cap, so both are enforced here before
// the engine is started. A violation fails that one file, never the batch.

use std::path::Path;

use lopdf::Document;
use tracing::{debug, instrument};

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::settings::ConversionSettings;
use docwerk_core::types::InputKind;

const BYTES_PER_MB: u64 = 1024 * 1024;

/// Check `input` against the size and page limits of `settings`.
///
/// Blocking: loads PDFs with `lopdf` when a page limit is set. Call from
/// `spawn_blocking` in async code.
#[instrument(skip(settings), fields(path = %input.display()))]
pub fn check_limits(input: &Path, settings: &ConversionSettings) -> Result<()> {
    let meta = std::fs::metadata(input)?;

    if settings.max_file_size_mb > 0 {
        let limit = u64::from(settings.max_file_size_mb) * BYTES_PER_MB;
        if meta.len() > limit {
            return Err(DocwerkError::LimitExceeded(format!(
                "{} is {}, limit is {} MB",
                display_name(input),
                format_size(meta.len()),
                settings.max_file_size_mb
            )));
        }
    }

    if settings.max_pages > 0 && InputKind::from_path(input) == Some(InputKind::Pdf) {
        let pages = pdf_page_count(input)?;
        debug!(pages, limit = settings.max_pages, "page count checked");
        if pages > settings.max_pages as usize {
            return Err(DocwerkError::LimitExceeded(format!(
                "{} has {pages} pages, limit is {}",
                display_name(input),
                settings.max_pages
            )));
        }
    }

    Ok(())
}

/// Number of pages in a PDF file.
pub fn pdf_page_count(path: &Path) -> Result<usize> {
    let document = Document::load(path).map_err(|err| {
        DocwerkError::PdfError(format!("failed to open {}: {err}", path.display()))
    })?;
    Ok(document.get_pages().len())
}

/// `512 bytes`, `1.5 KB`, `3.2 MB`.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < BYTES_PER_MB {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / BYTES_PER_MB as f64)
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    use lopdf::dictionary;
    use lopdf::{Object, Stream};

    /// Write a minimal PDF with `pages` empty pages.
    fn write_pdf(path: &Path, pages: usize) {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let mut kids = Vec::new();
        for _ in 0..pages {
            let content_id = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            });
            kids.push(Object::Reference(page_id));
        }
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc.save(path).expect("save pdf");
    }

    #[test]
    fn size_limit_rejects_large_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("big.docx");
        std::fs::write(&path, vec![0u8; 2 * 1024 * 1024]).unwrap();

        let s = ConversionSettings { max_file_size_mb: 1, ..Default::default() };
        let err = check_limits(&path, &s).unwrap_err();
        assert!(matches!(err, DocwerkError::LimitExceeded(_)));

        let unlimited = ConversionSettings::default();
        assert!(check_limits(&path, &unlimited).is_ok());
    }

    #[test]
    fn page_limit_counts_pdf_pages() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("three.pdf");
        write_pdf(&path, 3);
        assert_eq!(pdf_page_count(&path).unwrap(), 3);

        let tight = ConversionSettings { max_pages: 2, ..Default::default() };
        assert!(matches!(check_limits(&path, &tight), Err(DocwerkError::LimitExceeded(_))));

        let loose = ConversionSettings { max_pages: 3, ..Default::default() };
        assert!(check_limits(&path, &loose).is_ok());
    }

    #[test]
    fn page_limit_ignores_non_pdf_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("slides.pptx");
        std::fs::write(&path, b"not really a pptx").unwrap();
        let s = ConversionSettings { max_pages: 1, ..Default::default() };
        assert!(check_limits(&path, &s).is_ok());
    }

    #[test]
    fn corrupt_pdf_is_pdf_error_when_pages_are_limited() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.pdf");
        std::fs::write(&path, b"garbage").unwrap();
        let s = ConversionSettings { max_pages: 5, ..Default::default() };
        assert!(matches!(check_limits(&path, &s), Err(DocwerkError::PdfError(_))));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = check_limits(Path::new("/definitely/not/here.pdf"), &ConversionSettings::default());
        assert!(matches!(err, Err(DocwerkError::Io(_))));
    }

    #[test]
    fn sizes_are_formatted_by_magnitude() {
        assert_eq!(format_size(512), "512 bytes");
        assert_eq!(format_size(1536), "1.5 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
