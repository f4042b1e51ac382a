// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docwerk-convert — the bridge to the external docling engine.
//
// Provides the `Converter` seam and its docling CLI implementation, external
// process execution with timeouts, availability probing for the engine and
// OCR backends, per-file size/page limits, output naming, and file info.

pub mod command;
pub mod converter;
pub mod docling;
pub mod info;
pub mod limits;
pub mod output;
pub mod probe;

// Re-export the primary items so callers can use `docwerk_convert::DoclingCli` etc.
pub use converter::{ConvertedDocument, Converter};
pub use docling::DoclingCli;
pub use info::{FileInfo, file_info};
pub use limits::check_limits;
pub use output::{plan_output_path, preview, write_output};
pub use probe::{EngineAvailability, probe_availability};
