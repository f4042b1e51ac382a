// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for Docwerk.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a queued file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryId(pub Uuid);

impl EntryId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle states of a queued file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    /// Waiting for a run to reach it.
    Pending,
    /// The engine is converting it right now.
    Processing,
    /// Converted and written — see `output`.
    Success,
    /// Conversion failed — see `error`.
    Error,
}

/// Broad input family, derived from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InputKind {
    Pdf,
    Word,
    PowerPoint,
    Excel,
    Html,
    Image,
    Audio,
    Subtitles,
}

/// Extensions the engine accepts, with the label shown in file info.
pub const SUPPORTED_EXTENSIONS: &[(&str, InputKind, &str)] = &[
    ("pdf", InputKind::Pdf, "PDF Documents"),
    ("docx", InputKind::Word, "Word Documents"),
    ("pptx", InputKind::PowerPoint, "PowerPoint Presentations"),
    ("xlsx", InputKind::Excel, "Excel Spreadsheets"),
    ("html", InputKind::Html, "HTML Files"),
    ("htm", InputKind::Html, "HTML Files"),
    ("png", InputKind::Image, "PNG Images"),
    ("jpg", InputKind::Image, "JPEG Images"),
    ("jpeg", InputKind::Image, "JPEG Images"),
    ("tiff", InputKind::Image, "TIFF Images"),
    ("tif", InputKind::Image, "TIFF Images"),
    ("bmp", InputKind::Image, "BMP Images"),
    ("wav", InputKind::Audio, "WAV Audio"),
    ("mp3", InputKind::Audio, "MP3 Audio"),
    ("vtt", InputKind::Subtitles, "WebVTT Subtitles"),
];

impl InputKind {
    /// Infer the input kind from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lower = ext.to_ascii_lowercase();
        SUPPORTED_EXTENSIONS
            .iter()
            .find(|(e, _, _)| *e == lower)
            .map(|(_, kind, _)| *kind)
    }

    /// Infer the input kind from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|e| e.to_str())
            .and_then(Self::from_extension)
    }
}

/// Human label for a path's extension, e.g. "PNG Images".
pub fn type_label(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    SUPPORTED_EXTENSIONS
        .iter()
        .find(|(e, _, _)| *e == ext)
        .map(|(_, _, label)| *label)
        .unwrap_or("Unknown")
}

/// One file in the queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,
    pub path: PathBuf,
    pub kind: InputKind,
    pub status: EntryStatus,
    /// Human-readable failure, set when `status` is `Error`.
    pub error: Option<String>,
    /// Written output file, set when `status` is `Success`.
    pub output: Option<PathBuf>,
    pub added_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl QueueEntry {
    pub fn new(path: PathBuf, kind: InputKind) -> Self {
        Self {
            id: EntryId::new(),
            path,
            kind,
            status: EntryStatus::Pending,
            error: None,
            output: None,
            added_at: Utc::now(),
            finished_at: None,
        }
    }

    /// File name for display, falling back to the full path.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Aggregate outcome of one batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Entries never reached because the run was cancelled.
    pub skipped: usize,
    pub cancelled: bool,
}

impl RunResult {
    /// Summary lines written to the log when a run ends.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "=== Conversion Complete ===".to_string(),
            format!("Successful: {}", self.succeeded),
            format!("Failed: {}", self.failed),
        ];
        if self.cancelled {
            lines.push(format!("Skipped (cancelled): {}", self.skipped));
        }
        lines.push("===========================".to_string());
        lines
    }
}

/// Severity of a user-facing log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// One line of the run log pane.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    pub message: String,
}

impl LogLine {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            at: Utc::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    /// `[HH:MM:SS] message`, local time.
    pub fn render(&self) -> String {
        let local = self.at.with_timezone(&chrono::Local);
        format!("[{}] {}", local.format("%H:%M:%S"), self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_detection_is_case_insensitive() {
        assert_eq!(InputKind::from_extension("PDF"), Some(InputKind::Pdf));
        assert_eq!(InputKind::from_extension("Tif"), Some(InputKind::Image));
        assert_eq!(InputKind::from_extension("exe"), None);
        assert_eq!(
            InputKind::from_path(Path::new("/tmp/talk.MP3")),
            Some(InputKind::Audio)
        );
        assert_eq!(InputKind::from_path(Path::new("/tmp/README")), None);
    }

    #[test]
    fn type_label_falls_back_to_unknown() {
        assert_eq!(type_label(Path::new("a.htm")), "HTML Files");
        assert_eq!(type_label(Path::new("a.xyz")), "Unknown");
    }

    #[test]
    fn new_entry_is_pending() {
        let e = QueueEntry::new(PathBuf::from("/docs/report.pdf"), InputKind::Pdf);
        assert_eq!(e.status, EntryStatus::Pending);
        assert_eq!(e.file_name(), "report.pdf");
        assert!(e.error.is_none() && e.output.is_none());
    }

    #[test]
    fn run_summary_reports_skips_only_when_cancelled() {
        let done = RunResult { total: 3, succeeded: 2, failed: 1, ..Default::default() };
        assert!(!done.summary_lines().join("\n").contains("Skipped"));

        let cancelled = RunResult { cancelled: true, skipped: 2, ..done };
        assert!(cancelled.summary_lines().join("\n").contains("Skipped (cancelled): 2"));
    }
}
