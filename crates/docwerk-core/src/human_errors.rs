// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Human-readable error messages for the status banner and message boxes.
//
// Every technical error is mapped to plain English with a clear suggestion.
// Severity drives the banner colour in the UI.

use crate::error::DocwerkError;

/// Severity of an error from the user's perspective.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Might work if tried again (timeouts, a busy GPU).
    Transient,
    /// User must change something (pick a folder, install the engine).
    ActionRequired,
    /// This file will not convert with these settings.
    Permanent,
}

/// A human-readable error with plain English message and actionable suggestion.
#[derive(Debug, Clone)]
pub struct HumanError {
    /// Plain English summary (shown as a heading).
    pub message: String,
    /// What the user should try (shown as body text).
    pub suggestion: String,
    /// Severity level (drives colour in UI).
    pub severity: Severity,
}

/// Convert a `DocwerkError` into a `HumanError`.
pub fn humanize_error(err: &DocwerkError) -> HumanError {
    match err {
        // -- Engine --
        DocwerkError::EngineUnavailable(_) => HumanError {
            message: "Docling is not installed.".into(),
            suggestion: "Install it with `pip install docling`, or set the path to the docling executable in Settings.".into(),
            severity: Severity::ActionRequired,
        },

        DocwerkError::Engine { detail, .. } => humanize_engine_detail(detail),

        DocwerkError::Timeout { secs, .. } => HumanError {
            message: "The conversion took too long and was stopped.".into(),
            suggestion: format!("Raise the document timeout (currently {secs}s) in Advanced options, or try the Fast table mode."),
            severity: Severity::Transient,
        },

        DocwerkError::MissingOutput { expected, .. } => HumanError {
            message: "The converter finished but wrote nothing.".into(),
            suggestion: format!("The document may be empty or the {expected} exporter may not support it. Try another output format."),
            severity: Severity::Permanent,
        },

        // -- Input --
        DocwerkError::UnsupportedInput(detail) => HumanError {
            message: "This type of file can't be converted.".into(),
            suggestion: format!("Supported inputs are PDF, Office documents, HTML, images, audio and WebVTT. ({detail})"),
            severity: Severity::Permanent,
        },

        DocwerkError::LimitExceeded(detail) => HumanError {
            message: "This file is over the configured limit.".into(),
            suggestion: format!("Raise or clear the limit in Advanced options. ({detail})"),
            severity: Severity::ActionRequired,
        },

        DocwerkError::PdfError(_) => HumanError {
            message: "There's a problem with this PDF file.".into(),
            suggestion: "The file may be damaged or encrypted. Try opening it in a PDF viewer first.".into(),
            severity: Severity::Permanent,
        },

        // -- Pre-flight --
        DocwerkError::NoOutputDirectory => HumanError {
            message: "No output folder selected.".into(),
            suggestion: "Choose where converted files should be saved, then start again.".into(),
            severity: Severity::ActionRequired,
        },

        DocwerkError::OutputDirectoryMissing(path) => HumanError {
            message: "The output folder doesn't exist.".into(),
            suggestion: format!("Create {} or pick another folder.", path.display()),
            severity: Severity::ActionRequired,
        },

        DocwerkError::EmptyBatch => HumanError {
            message: "There is nothing to convert.".into(),
            suggestion: "Add files or a folder first, or select the files you want to convert.".into(),
            severity: Severity::ActionRequired,
        },

        DocwerkError::RunInProgress => HumanError {
            message: "A conversion is already running.".into(),
            suggestion: "Wait for it to finish or cancel it first.".into(),
            severity: Severity::Transient,
        },

        // -- Storage --
        DocwerkError::Config(detail) => HumanError {
            message: "Settings could not be saved.".into(),
            suggestion: format!("Check that the data folder is writable. ({detail})"),
            severity: Severity::ActionRequired,
        },

        DocwerkError::Io(io_err) => match io_err.kind() {
            std::io::ErrorKind::NotFound => HumanError {
                message: "The file could not be found.".into(),
                suggestion: "It may have been moved or deleted since it was added. Remove it and add it again.".into(),
                severity: Severity::ActionRequired,
            },
            std::io::ErrorKind::PermissionDenied => HumanError {
                message: "Permission denied.".into(),
                suggestion: "Check that you can read the input and write to the output folder.".into(),
                severity: Severity::ActionRequired,
            },
            _ => HumanError {
                message: "Reading or writing a file failed.".into(),
                suggestion: format!("Try again. ({io_err})"),
                severity: Severity::Transient,
            },
        },

        DocwerkError::Serialization(_) => HumanError {
            message: "Saved data is unreadable.".into(),
            suggestion: "The settings file may be damaged. Save settings again to replace it.".into(),
            severity: Severity::Permanent,
        },
    }
}

/// Map engine stderr to a message. The engine is Python, so its failures
/// surface as exception names in the last lines of stderr.
fn humanize_engine_detail(detail: &str) -> HumanError {
    let lower = detail.to_ascii_lowercase();

    if lower.contains("out of memory") || lower.contains("cuda error") {
        HumanError {
            message: "The accelerator ran out of memory.".into(),
            suggestion: "Switch the device to cpu in Accelerator options, or convert fewer pages at a time.".into(),
            severity: Severity::Transient,
        }
    } else if lower.contains("modulenotfounderror") || lower.contains("no module named") {
        HumanError {
            message: "A component the converter needs is missing.".into(),
            suggestion: format!("Install the missing Python package, or choose another OCR engine. (Detail: {detail})"),
            severity: Severity::ActionRequired,
        }
    } else if lower.contains("password") || lower.contains("encrypted") {
        HumanError {
            message: "This document is password protected.".into(),
            suggestion: "Remove the password in another program, then convert it again.".into(),
            severity: Severity::Permanent,
        }
    } else {
        HumanError {
            message: "The converter couldn't process this file.".into(),
            suggestion: format!("Try different options or another file. (Detail: {detail})"),
            severity: Severity::Permanent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_output_dir_is_action_required() {
        let human = humanize_error(&DocwerkError::NoOutputDirectory);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn timeout_is_transient() {
        let err = DocwerkError::Timeout { tool: "docling".into(), secs: 120 };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::Transient);
        assert!(human.suggestion.contains("120s"));
    }

    #[test]
    fn missing_module_points_at_install() {
        let err = DocwerkError::Engine {
            tool: "docling".into(),
            file: "scan.pdf".into(),
            detail: "ModuleNotFoundError: No module named 'easyocr'".into(),
        };
        let human = humanize_error(&err);
        assert_eq!(human.severity, Severity::ActionRequired);
    }

    #[test]
    fn cuda_oom_is_transient() {
        let err = DocwerkError::Engine {
            tool: "docling".into(),
            file: "big.pdf".into(),
            detail: "torch.OutOfMemoryError: CUDA out of memory".into(),
        };
        assert_eq!(humanize_error(&err).severity, Severity::Transient);
    }

    #[test]
    fn unsupported_input_is_permanent() {
        let human = humanize_error(&DocwerkError::UnsupportedInput("notes.odt".into()));
        assert_eq!(human.severity, Severity::Permanent);
    }
}
