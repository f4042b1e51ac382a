// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Docwerk.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for all Docwerk operations.
#[derive(Debug, Error)]
pub enum DocwerkError {
    // -- Engine errors --
    #[error("conversion engine not found: {0}")]
    EngineUnavailable(String),

    #[error("{tool} failed on {file}: {detail}")]
    Engine {
        tool: String,
        file: String,
        detail: String,
    },

    #[error("{tool} timed out after {secs}s")]
    Timeout { tool: String, secs: u64 },

    #[error("engine produced no {expected} output for {file}")]
    MissingOutput { file: String, expected: String },

    // -- Input errors --
    #[error("unsupported file type: {0}")]
    UnsupportedInput(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("PDF inspection failed: {0}")]
    PdfError(String),

    // -- Run pre-flight --
    #[error("no output directory selected")]
    NoOutputDirectory,

    #[error("output directory does not exist: {}", .0.display())]
    OutputDirectoryMissing(PathBuf),

    #[error("no files to convert")]
    EmptyBatch,

    #[error("a conversion run is already in progress")]
    RunInProgress,

    // -- Storage / persistence --
    #[error("configuration error: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, DocwerkError>;
