// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The seam between the batch worker and whatever does the actual conversion.

use std::future::Future;
use std::path::Path;

use docwerk_core::error::Result;
use docwerk_core::settings::{ConversionSettings, OutputFormat};

/// Exported text of one converted document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConvertedDocument {
    pub content: String,
    pub format: OutputFormat,
}

/// Converts one input file with a settings snapshot.
///
/// Implementations must not write into the user's output directory; the
/// worker owns output naming and writing.
pub trait Converter: Send + Sync + 'static {
    fn convert(
        &self,
        input: &Path,
        settings: &ConversionSettings,
    ) -> impl Future<Output = Result<ConvertedDocument>> + Send;
}
