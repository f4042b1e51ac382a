// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion settings — the options collected by the configuration panel.
//
// A `ConversionSettings` value is cloned when a run starts and the worker only
// ever reads that clone, so edits made in the UI during a run apply to the
// next run, not the current one.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Target output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    Markdown,
    Html,
    Json,
    DocTags,
    Text,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 5] = [
        Self::Markdown,
        Self::Html,
        Self::Json,
        Self::DocTags,
        Self::Text,
    ];

    /// File extension (with leading dot) used for written output.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Markdown => ".md",
            Self::Html => ".html",
            Self::Json => ".json",
            Self::DocTags => ".doctags",
            Self::Text => ".txt",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Markdown => "Markdown",
            Self::Html => "HTML",
            Self::Json => "JSON",
            Self::DocTags => "DocTags",
            Self::Text => "Text",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.label() == label)
    }
}

/// Conversion pipeline, interpreted entirely by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PipelineType {
    /// Layout analysis + OCR + table structure.
    Standard,
    /// Vision-language model reads whole pages.
    Vlm,
    /// Speech recognition for audio inputs.
    Asr,
}

impl PipelineType {
    pub const ALL: [PipelineType; 3] = [Self::Standard, Self::Vlm, Self::Asr];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Vlm => "VLM",
            Self::Asr => "ASR",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.label() == label)
    }
}

/// Model used by the VLM pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VlmModel {
    GraniteDocling,
    SmolVlm,
}

impl VlmModel {
    pub const ALL: [VlmModel; 2] = [Self::GraniteDocling, Self::SmolVlm];

    pub fn label(&self) -> &'static str {
        match self {
            Self::GraniteDocling => "granite_docling",
            Self::SmolVlm => "smolvlm",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.label() == label)
    }
}

/// OCR engine selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OcrEngine {
    /// Let the engine pick (currently RapidOCR).
    Auto,
    RapidOcr,
    EasyOcr,
    Tesseract,
    /// macOS Vision framework.
    OcrMac,
}

impl OcrEngine {
    pub const ALL: [OcrEngine; 5] = [
        Self::Auto,
        Self::RapidOcr,
        Self::EasyOcr,
        Self::Tesseract,
        Self::OcrMac,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::RapidOcr => "RapidOCR",
            Self::EasyOcr => "EasyOCR",
            Self::Tesseract => "Tesseract",
            Self::OcrMac => "OcrMac",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|e| e.label() == label)
    }
}

/// Table structure recognition mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TableMode {
    Fast,
    Accurate,
}

impl TableMode {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fast => "Fast",
            Self::Accurate => "Accurate",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Fast" => Some(Self::Fast),
            "Accurate" => Some(Self::Accurate),
            _ => None,
        }
    }
}

/// Hardware accelerator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Device {
    Auto,
    Cpu,
    Cuda,
    Mps,
}

impl Device {
    pub const ALL: [Device; 4] = [Self::Auto, Self::Cpu, Self::Cuda, Self::Mps];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Cpu => "cpu",
            Self::Cuda => "cuda",
            Self::Mps => "mps",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.label() == label)
    }
}

/// OCR languages offered in the UI as `(code, name)` pairs.
pub const OCR_LANGUAGES: &[(&str, &str)] = &[
    ("en", "English"),
    ("de", "German"),
    ("fr", "French"),
    ("es", "Spanish"),
    ("it", "Italian"),
    ("pt", "Portuguese"),
    ("nl", "Dutch"),
    ("pl", "Polish"),
    ("ru", "Russian"),
    ("zh", "Chinese"),
    ("ja", "Japanese"),
    ("ko", "Korean"),
    ("ar", "Arabic"),
    ("hi", "Hindi"),
    ("th", "Thai"),
    ("vi", "Vietnamese"),
    ("tr", "Turkish"),
    ("el", "Greek"),
    ("he", "Hebrew"),
    ("uk", "Ukrainian"),
];

/// Valid range for the OCR confidence threshold.
pub const OCR_CONFIDENCE_RANGE: (f32, f32) = (0.1, 1.0);
/// Valid range for the image scale factor.
pub const IMAGES_SCALE_RANGE: (f32, f32) = (0.5, 3.0);
/// Valid range for accelerator CPU threads.
pub const NUM_THREADS_RANGE: (u32, u32) = (1, 32);

/// Every option the configuration panel collects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    // -- Basic --
    pub output_format: OutputFormat,
    pub pipeline: PipelineType,
    pub vlm_model: VlmModel,

    // -- Feature toggles --
    pub ocr_enabled: bool,
    pub table_structure: bool,
    pub picture_images: bool,
    pub formula_enrichment: bool,
    pub code_enrichment: bool,
    pub picture_classification: bool,
    pub picture_description: bool,

    // -- OCR --
    pub ocr_engine: OcrEngine,
    pub ocr_language: String,
    pub force_full_page_ocr: bool,
    pub ocr_confidence: f32,

    // -- Tables --
    pub table_mode: TableMode,
    pub cell_matching: bool,

    // -- Limits (0 = unlimited) --
    pub max_pages: u32,
    pub max_file_size_mb: u32,
    pub document_timeout_secs: u32,

    // -- Images --
    pub page_images: bool,
    pub table_images: bool,
    pub images_scale: f32,

    // -- Accelerator --
    pub device: Device,
    pub num_threads: u32,
    pub flash_attention: bool,

    // -- Output --
    pub output_dir: Option<PathBuf>,
    pub create_subfolder: bool,
    pub overwrite: bool,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            output_format: OutputFormat::Markdown,
            pipeline: PipelineType::Standard,
            vlm_model: VlmModel::GraniteDocling,
            ocr_enabled: true,
            table_structure: true,
            picture_images: false,
            formula_enrichment: true,
            code_enrichment: true,
            picture_classification: true,
            picture_description: false,
            ocr_engine: OcrEngine::RapidOcr,
            ocr_language: "en".into(),
            force_full_page_ocr: false,
            ocr_confidence: 0.5,
            table_mode: TableMode::Accurate,
            cell_matching: true,
            max_pages: 0,
            max_file_size_mb: 0,
            document_timeout_secs: 0,
            page_images: false,
            table_images: false,
            images_scale: 1.0,
            device: Device::Auto,
            num_threads: 4,
            flash_attention: false,
            output_dir: None,
            create_subfolder: false,
            overwrite: false,
        }
    }
}

impl ConversionSettings {
    /// Copy with every numeric option clamped into its valid range and an
    /// unknown OCR language replaced by English.
    pub fn normalized(&self) -> Self {
        let mut s = self.clone();
        s.ocr_confidence = clamp_f32(s.ocr_confidence, OCR_CONFIDENCE_RANGE);
        s.images_scale = clamp_f32(s.images_scale, IMAGES_SCALE_RANGE);
        s.num_threads = s.num_threads.clamp(NUM_THREADS_RANGE.0, NUM_THREADS_RANGE.1);
        if !OCR_LANGUAGES.iter().any(|(code, _)| *code == s.ocr_language) {
            s.ocr_language = "en".into();
        }
        s
    }

    /// The configuration banner written to the log when a run starts.
    pub fn summary_lines(&self) -> Vec<String> {
        let mut lines = vec![
            "=== Conversion Configuration ===".to_string(),
            format!("Pipeline: {}", self.pipeline.label()),
        ];
        if self.pipeline == PipelineType::Vlm {
            lines.push(format!("VLM Model: {}", self.vlm_model.label()));
        }
        lines.push(format!("Output Format: {}", self.output_format.label()));
        lines.push(format!(
            "OCR: {}, Engine: {}, Lang: {}",
            self.ocr_enabled,
            self.ocr_engine.label(),
            self.ocr_language
        ));
        lines.push(format!("Table Mode: {}", self.table_mode.label()));
        lines.push(format!(
            "Device: {}, Threads: {}",
            self.device.label(),
            self.num_threads
        ));
        lines.push("================================".to_string());
        lines
    }
}

fn clamp_f32(value: f32, (lo, hi): (f32, f32)) -> f32 {
    if value.is_nan() { lo } else { value.clamp(lo, hi) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel_defaults() {
        let s = ConversionSettings::default();
        assert_eq!(s.output_format, OutputFormat::Markdown);
        assert_eq!(s.ocr_engine, OcrEngine::RapidOcr);
        assert_eq!(s.table_mode, TableMode::Accurate);
        assert_eq!(s.num_threads, 4);
        assert!(s.output_dir.is_none());
    }

    #[test]
    fn normalized_clamps_ranges() {
        let s = ConversionSettings {
            ocr_confidence: 4.0,
            images_scale: 0.1,
            num_threads: 0,
            ocr_language: "xx".into(),
            ..Default::default()
        }
        .normalized();
        assert_eq!(s.ocr_confidence, 1.0);
        assert_eq!(s.images_scale, 0.5);
        assert_eq!(s.num_threads, 1);
        assert_eq!(s.ocr_language, "en");
    }

    #[test]
    fn labels_round_trip() {
        for f in OutputFormat::ALL {
            assert_eq!(OutputFormat::from_label(f.label()), Some(f));
        }
        for e in OcrEngine::ALL {
            assert_eq!(OcrEngine::from_label(e.label()), Some(e));
        }
        assert_eq!(Device::from_label("cuda"), Some(Device::Cuda));
        assert_eq!(PipelineType::from_label("nope"), None);
    }

    #[test]
    fn summary_mentions_vlm_model_only_for_vlm() {
        let standard = ConversionSettings::default().summary_lines().join("\n");
        assert!(!standard.contains("VLM Model"));

        let vlm = ConversionSettings {
            pipeline: PipelineType::Vlm,
            ..Default::default()
        };
        assert!(vlm.summary_lines().join("\n").contains("VLM Model: granite_docling"));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let s: ConversionSettings =
            serde_json::from_str(r#"{"output_format":"Html","num_threads":8}"#).unwrap();
        assert_eq!(s.output_format, OutputFormat::Html);
        assert_eq!(s.num_threads, 8);
        assert!(s.ocr_enabled);
    }
}
