// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Engine and OCR availability probing for the status indicators.
//
// Tesseract is a binary on PATH. EasyOCR, RapidOCR and OcrMac are Python
// packages living next to docling, so they are probed by asking the Python
// interpreter whether the module can be found (without importing it, which
// would load models).

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info};

use docwerk_core::AppConfig;
use docwerk_core::settings::OcrEngine;

use crate::command::ToolCommand;
use crate::docling::{DoclingCli, resolve_program};

const PROBE_TIMEOUT: Duration = Duration::from_secs(20);

/// Exits 0 when any module named in argv can be found.
const FIND_SPEC_SCRIPT: &str = "import importlib.util, sys; \
     sys.exit(0 if any(importlib.util.find_spec(m) for m in sys.argv[1:]) else 1)";

/// Availability of one OCR engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrAvailability {
    pub engine: OcrEngine,
    pub available: bool,
}

/// Everything the header indicators show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineAvailability {
    pub engine_path: Option<PathBuf>,
    pub engine_version: Option<String>,
    pub python_path: Option<PathBuf>,
    pub ocr: Vec<OcrAvailability>,
}

impl EngineAvailability {
    pub fn engine_found(&self) -> bool {
        self.engine_path.is_some()
    }

    /// `Auto` counts as available when any concrete engine is.
    pub fn is_ocr_available(&self, engine: OcrEngine) -> bool {
        match engine {
            OcrEngine::Auto => self.ocr.iter().any(|o| o.available),
            _ => self
                .ocr
                .iter()
                .any(|o| o.engine == engine && o.available),
        }
    }

    /// Warning for the selected engine, if it is known to be missing.
    pub fn ocr_warning(&self, engine: OcrEngine) -> Option<String> {
        if self.ocr.is_empty() || self.is_ocr_available(engine) {
            return None;
        }
        Some(format!(
            "{} does not appear to be installed; conversions using it will fail.",
            engine.label()
        ))
    }
}

/// Python modules that provide each engine.
fn ocr_modules(engine: OcrEngine) -> &'static [&'static str] {
    match engine {
        OcrEngine::EasyOcr => &["easyocr"],
        OcrEngine::RapidOcr => &["rapidocr", "rapidocr_onnxruntime"],
        OcrEngine::OcrMac => &["ocrmac"],
        OcrEngine::Tesseract | OcrEngine::Auto => &[],
    }
}

/// Probe the engine and every OCR backend.
pub async fn probe_availability(config: &AppConfig) -> EngineAvailability {
    let docling = DoclingCli::locate(config).ok();
    let engine_version = match &docling {
        Some(cli) => cli.version().await,
        None => None,
    };
    let python_path = resolve_program(config.python_path.as_deref(), "python3")
        .or_else(|| which::which("python").ok());

    let mut ocr = Vec::new();
    for engine in [
        OcrEngine::RapidOcr,
        OcrEngine::EasyOcr,
        OcrEngine::Tesseract,
        OcrEngine::OcrMac,
    ] {
        let available = match engine {
            OcrEngine::Tesseract => which::which("tesseract").is_ok(),
            OcrEngine::OcrMac if !cfg!(target_os = "macos") => false,
            _ => match &python_path {
                Some(py) => python_has_module(py, ocr_modules(engine)).await,
                None => false,
            },
        };
        debug!(engine = engine.label(), available, "ocr engine probed");
        ocr.push(OcrAvailability { engine, available });
    }

    let availability = EngineAvailability {
        engine_path: docling.map(|d| d.program().to_path_buf()),
        engine_version,
        python_path,
        ocr,
    };
    info!(
        engine = availability.engine_found(),
        version = availability.engine_version.as_deref().unwrap_or("-"),
        "availability probed"
    );
    availability
}

async fn python_has_module(python: &Path, modules: &[&str]) -> bool {
    if modules.is_empty() {
        return false;
    }
    ToolCommand::new(python)
        .arg("-c")
        .arg(FIND_SPEC_SCRIPT)
        .args(modules.iter().copied())
        .timeout(PROBE_TIMEOUT)
        .execute()
        .await
        .is_ok()
}
