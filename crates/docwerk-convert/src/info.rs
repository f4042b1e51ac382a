// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File information shown when a queued file is selected.

use std::path::{Path, PathBuf};

use docwerk_core::error::Result;
use docwerk_core::types::{InputKind, type_label};

use crate::limits::format_size;

/// Metadata about one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub type_label: &'static str,
    /// Pixel dimensions, for image inputs whose header could be read.
    pub dimensions: Option<(u32, u32)>,
}

impl FileInfo {
    /// Multi-line text for the File Info tab.
    pub fn render(&self) -> String {
        let mut text = format!(
            "File: {}\nPath: {}\nSize: {}\nType: {}\n",
            self.name,
            self.path.display(),
            format_size(self.size_bytes),
            self.type_label
        );
        if let Some((w, h)) = self.dimensions {
            text.push_str(&format!("Dimensions: {w} x {h} px\n"));
        }
        text
    }
}

/// Read size, type and (for images) dimensions of `path`.
pub fn file_info(path: &Path) -> Result<FileInfo> {
    let meta = std::fs::metadata(path)?;
    let dimensions = match InputKind::from_path(path) {
        Some(InputKind::Image) => image::image_dimensions(path).ok(),
        _ => None,
    };
    Ok(FileInfo {
        name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        path: path.to_path_buf(),
        size_bytes: meta.len(),
        type_label: type_label(path),
        dimensions,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_info_includes_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dot.png");
        image::RgbImage::new(7, 3).save(&path).unwrap();

        let info = file_info(&path).unwrap();
        assert_eq!(info.dimensions, Some((7, 3)));
        assert_eq!(info.type_label, "PNG Images");
        assert!(info.render().contains("Dimensions: 7 x 3 px"));
    }

    #[test]
    fn document_info_has_no_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memo.docx");
        std::fs::write(&path, vec![0u8; 2048]).unwrap();

        let info = file_info(&path).unwrap();
        assert!(info.dimensions.is_none());
        assert!(info.render().contains("Size: 2.0 KB"));
    }
}
