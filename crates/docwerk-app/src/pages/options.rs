// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Conversion options panel — Basic / OCR / Advanced / Accelerator tabs.
//
// Every control writes straight into `AppState::settings` and carries a
// hover tooltip. A running batch holds its own snapshot, so edits here only
// affect the next run.

use dioxus::prelude::*;

use docwerk_core::settings::{
    Device, IMAGES_SCALE_RANGE, NUM_THREADS_RANGE, OCR_CONFIDENCE_RANGE, OCR_LANGUAGES, OcrEngine,
    OutputFormat, PipelineType, TableMode, VlmModel,
};

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OptionsTab {
    Basic,
    Ocr,
    Advanced,
    Accelerator,
}

impl OptionsTab {
    const ALL: [OptionsTab; 4] = [Self::Basic, Self::Ocr, Self::Advanced, Self::Accelerator];

    fn label(&self) -> &'static str {
        match self {
            Self::Basic => "Basic",
            Self::Ocr => "OCR",
            Self::Advanced => "Advanced",
            Self::Accelerator => "Accelerator",
        }
    }
}

#[component]
pub fn OptionsPanel() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let mut tab = use_signal(|| OptionsTab::Basic);

    rsx! {
        section { style: "margin: 12px 0; border: 1px solid #e0e0e0; border-radius: 8px; padding: 12px;",
            div { style: "display: flex; justify-content: space-between; align-items: center;",
                h3 { style: "margin: 0;", "Conversion Options" }
                button {
                    style: "padding: 4px 12px; border-radius: 4px; border: 1px solid #ccc; background: white; font-size: 12px;",
                    onclick: move |_| state.write().reset_options(),
                    "Reset Options"
                }
            }
            div { style: "display: flex; gap: 4px; margin: 8px 0; border-bottom: 1px solid #e0e0e0;",
                for t in OptionsTab::ALL {
                    button {
                        style: tab_style(*tab.read() == t),
                        onclick: move |_| tab.set(t),
                        "{t.label()}"
                    }
                }
            }
            {match *tab.read() {
                OptionsTab::Basic => rsx! { BasicTab {} },
                OptionsTab::Ocr => rsx! { OcrTab {} },
                OptionsTab::Advanced => rsx! { AdvancedTab {} },
                OptionsTab::Accelerator => rsx! { AcceleratorTab {} },
            }}
        }
    }
}

#[component]
fn BasicTab() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let s = state.read().settings.clone();

    rsx! {
        SelectRow {
            label: "Output format",
            tooltip: "Choose output format:\nMarkdown: Easy to read, widely compatible\nHTML: For web display\nJSON: Structured data with metadata\nDocTags: Docling's tagged document markup\nText: Plain text only",
            value: s.output_format.label().to_string(),
            options: labelled(OutputFormat::ALL.iter().map(|f| f.label())),
            on_change: move |v: String| {
                if let Some(f) = OutputFormat::from_label(&v) {
                    state.write().settings.output_format = f;
                }
            },
        }
        SelectRow {
            label: "Pipeline",
            tooltip: "Standard: Default processing\nVLM: Vision Language Model for advanced image understanding\nASR: Automatic Speech Recognition for audio files",
            value: s.pipeline.label().to_string(),
            options: labelled(PipelineType::ALL.iter().map(|p| p.label())),
            on_change: move |v: String| {
                if let Some(p) = PipelineType::from_label(&v) {
                    state.write().settings.pipeline = p;
                }
            },
        }
        if s.pipeline == PipelineType::Vlm {
            SelectRow {
                label: "VLM model",
                tooltip: "Vision Language Model for image description:\ngranite_docling: IBM's specialized model\nsmolvlm: Smaller, faster alternative",
                value: s.vlm_model.label().to_string(),
                options: labelled(VlmModel::ALL.iter().map(|m| m.label())),
                on_change: move |v: String| {
                    if let Some(m) = VlmModel::from_label(&v) {
                        state.write().settings.vlm_model = m;
                    }
                },
            }
        }
        SettingRow {
            label: "OCR",
            tooltip: "Extract text from images and scanned documents",
            checked: s.ocr_enabled,
            on_toggle: move |v: bool| state.write().settings.ocr_enabled = v,
        }
        SettingRow {
            label: "Table structure",
            tooltip: "Detect and extract table structures with cell data",
            checked: s.table_structure,
            on_toggle: move |v: bool| state.write().settings.table_structure = v,
        }
        SettingRow {
            label: "Embed picture images",
            tooltip: "Embed extracted images in the output instead of placeholders",
            checked: s.picture_images,
            on_toggle: move |v: bool| state.write().settings.picture_images = v,
        }
        SettingRow {
            label: "Formula enrichment",
            tooltip: "Detect and convert mathematical formulas to LaTeX",
            checked: s.formula_enrichment,
            on_toggle: move |v: bool| state.write().settings.formula_enrichment = v,
        }
        SettingRow {
            label: "Code enrichment",
            tooltip: "Detect and preserve code blocks with syntax",
            checked: s.code_enrichment,
            on_toggle: move |v: bool| state.write().settings.code_enrichment = v,
        }
        SettingRow {
            label: "Picture classification",
            tooltip: "Classify images (chart, diagram, photo, etc.)",
            checked: s.picture_classification,
            on_toggle: move |v: bool| state.write().settings.picture_classification = v,
        }
        SettingRow {
            label: "Picture description",
            tooltip: "Generate AI descriptions for images (requires VLM)",
            checked: s.picture_description,
            on_toggle: move |v: bool| state.write().settings.picture_description = v,
        }
    }
}

#[component]
fn OcrTab() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let s = state.read().settings.clone();
    let warning = state
        .read()
        .availability
        .as_ref()
        .and_then(|a| a.ocr_warning(s.ocr_engine));

    rsx! {
        SelectRow {
            label: "OCR engine",
            tooltip: "OCR Engine Selection:\nAuto: Uses RapidOCR (recommended)\nRapidOCR: Fast, built-in engine\nEasyOCR: Deep learning-based (requires installation)\nTesseract: Uses the tesseract command-line tool\nOcrMac: macOS Vision framework",
            value: s.ocr_engine.label().to_string(),
            options: labelled(OcrEngine::ALL.iter().map(|e| e.label())),
            on_change: move |v: String| {
                if let Some(e) = OcrEngine::from_label(&v) {
                    state.write().settings.ocr_engine = e;
                }
            },
        }
        if let Some(msg) = warning {
            p { style: "color: #b36b00; font-size: 13px; margin: 4px 0;", "{msg}" }
        }
        SelectRow {
            label: "Language",
            tooltip: "Select the primary language for OCR text recognition",
            value: s.ocr_language.clone(),
            options: OCR_LANGUAGES
                .iter()
                .map(|(code, name)| (code.to_string(), format!("{name} ({code})")))
                .collect::<Vec<_>>(),
            on_change: move |v: String| state.write().settings.ocr_language = v,
        }
        SettingRow {
            label: "Force full-page OCR",
            tooltip: "Slower but more thorough",
            checked: s.force_full_page_ocr,
            on_toggle: move |v: bool| state.write().settings.force_full_page_ocr = v,
        }
        NumberRow {
            label: "Confidence threshold",
            tooltip: "Discard recognised text below this confidence (0.1 - 1.0)",
            value: format!("{:.2}", s.ocr_confidence),
            min: f64::from(OCR_CONFIDENCE_RANGE.0),
            max: f64::from(OCR_CONFIDENCE_RANGE.1),
            step: 0.05,
            on_change: move |v: String| {
                if let Ok(c) = v.parse::<f32>() {
                    let (lo, hi) = OCR_CONFIDENCE_RANGE;
                    state.write().settings.ocr_confidence = c.clamp(lo, hi);
                }
            },
        }
    }
}

#[component]
fn AdvancedTab() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let s = state.read().settings.clone();

    rsx! {
        h4 { style: "margin: 8px 0 0;", "Tables" }
        SelectRow {
            label: "Table mode",
            tooltip: "Fast: quicker table detection\nAccurate: better results on complex tables",
            value: s.table_mode.label().to_string(),
            options: labelled(["Fast", "Accurate"].into_iter()),
            on_change: move |v: String| {
                if let Some(m) = TableMode::from_label(&v) {
                    state.write().settings.table_mode = m;
                }
            },
        }
        SettingRow {
            label: "Cell matching",
            tooltip: "Match detected table cells to the text of the page",
            checked: s.cell_matching,
            on_toggle: move |v: bool| state.write().settings.cell_matching = v,
        }

        h4 { style: "margin: 12px 0 0;", "Limits (0 = unlimited)" }
        NumberRow {
            label: "Max pages",
            tooltip: "Skip documents with more pages than this (0 = unlimited)",
            value: s.max_pages.to_string(),
            min: 0.0,
            max: 100000.0,
            step: 1.0,
            on_change: move |v: String| {
                if let Ok(n) = v.parse::<u32>() {
                    state.write().settings.max_pages = n;
                }
            },
        }
        NumberRow {
            label: "Max file size (MB)",
            tooltip: "Skip files larger than this (0 = unlimited)",
            value: s.max_file_size_mb.to_string(),
            min: 0.0,
            max: 100000.0,
            step: 1.0,
            on_change: move |v: String| {
                if let Ok(n) = v.parse::<u32>() {
                    state.write().settings.max_file_size_mb = n;
                }
            },
        }
        NumberRow {
            label: "Document timeout (s)",
            tooltip: "Give up on a document after this many seconds (0 = no limit)",
            value: s.document_timeout_secs.to_string(),
            min: 0.0,
            max: 86400.0,
            step: 10.0,
            on_change: move |v: String| {
                if let Ok(n) = v.parse::<u32>() {
                    state.write().settings.document_timeout_secs = n;
                }
            },
        }

        h4 { style: "margin: 12px 0 0;", "Images" }
        SettingRow {
            label: "Generate page images",
            tooltip: "Render an image of every page",
            checked: s.page_images,
            on_toggle: move |v: bool| state.write().settings.page_images = v,
        }
        SettingRow {
            label: "Generate table images",
            tooltip: "Render an image of every table",
            checked: s.table_images,
            on_toggle: move |v: bool| state.write().settings.table_images = v,
        }
        NumberRow {
            label: "Image scale",
            tooltip: "Scale of generated images (0.5 - 3.0)",
            value: format!("{:.1}", s.images_scale),
            min: f64::from(IMAGES_SCALE_RANGE.0),
            max: f64::from(IMAGES_SCALE_RANGE.1),
            step: 0.1,
            on_change: move |v: String| {
                if let Ok(x) = v.parse::<f32>() {
                    let (lo, hi) = IMAGES_SCALE_RANGE;
                    state.write().settings.images_scale = x.clamp(lo, hi);
                }
            },
        }
    }
}

#[component]
fn AcceleratorTab() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let s = state.read().settings.clone();

    rsx! {
        SelectRow {
            label: "Device",
            tooltip: "auto: Auto-detect | cuda: GPU | mps: Apple Silicon | cpu: CPU only",
            value: s.device.label().to_string(),
            options: labelled(Device::ALL.iter().map(|d| d.label())),
            on_change: move |v: String| {
                if let Some(d) = Device::from_label(&v) {
                    state.write().settings.device = d;
                }
            },
        }
        NumberRow {
            label: "CPU threads",
            tooltip: "Worker threads for CPU inference (1-32, default: 4)",
            value: s.num_threads.to_string(),
            min: f64::from(NUM_THREADS_RANGE.0),
            max: f64::from(NUM_THREADS_RANGE.1),
            step: 1.0,
            on_change: move |v: String| {
                if let Ok(n) = v.parse::<u32>() {
                    let (lo, hi) = NUM_THREADS_RANGE;
                    state.write().settings.num_threads = n.clamp(lo, hi);
                }
            },
        }
        SettingRow {
            label: "Flash attention (CUDA)",
            tooltip: "Use Flash Attention 2 (requires compatible GPU)",
            checked: s.flash_attention,
            on_toggle: move |v: bool| state.write().settings.flash_attention = v,
        }
    }
}

fn tab_style(active: bool) -> &'static str {
    if active {
        "padding: 6px 14px; border: none; border-bottom: 2px solid #007aff; background: none; color: #007aff; font-weight: 600;"
    } else {
        "padding: 6px 14px; border: none; border-bottom: 2px solid transparent; background: none; color: #555;"
    }
}

/// Options whose value and text are the same label.
fn labelled<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, String)> {
    labels.map(|l| (l.to_string(), l.to_string())).collect()
}

const ROW_STYLE: &str = "display: flex; justify-content: space-between; align-items: center; padding: 8px 0; border-bottom: 1px solid #f0f0f0;";
const INPUT_STYLE: &str = "padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;";

#[component]
pub fn SettingRow(
    label: &'static str,
    #[props(default)] tooltip: &'static str,
    checked: bool,
    on_toggle: EventHandler<bool>,
) -> Element {
    rsx! {
        div { style: ROW_STYLE, title: "{tooltip}",
            span { "{label}" }
            input {
                r#type: "checkbox",
                checked: checked,
                onchange: move |evt| {
                    on_toggle.call(evt.checked());
                },
            }
        }
    }
}

#[component]
pub fn SelectRow(
    label: &'static str,
    #[props(default)] tooltip: &'static str,
    value: String,
    options: Vec<(String, String)>,
    on_change: EventHandler<String>,
) -> Element {
    rsx! {
        div { style: ROW_STYLE, title: "{tooltip}",
            span { "{label}" }
            select {
                style: INPUT_STYLE,
                value: "{value}",
                onchange: move |evt| on_change.call(evt.value()),
                for (v, text) in options {
                    option { value: "{v}", selected: v == value, "{text}" }
                }
            }
        }
    }
}

#[component]
pub fn NumberRow(
    label: &'static str,
    #[props(default)] tooltip: &'static str,
    value: String,
    min: f64,
    max: f64,
    step: f64,
    on_change: EventHandler<String>,
) -> Element {
    rsx! {
        div { style: ROW_STYLE, title: "{tooltip}",
            span { "{label}" }
            input {
                r#type: "number",
                style: "width: 90px; text-align: right; {INPUT_STYLE}",
                value: "{value}",
                min: "{min}",
                max: "{max}",
                step: "{step}",
                onchange: move |evt| on_change.call(evt.value()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labelled_pairs_value_with_text() {
        let opts = labelled(OutputFormat::ALL.iter().map(|f| f.label()));
        assert_eq!(opts.len(), OutputFormat::ALL.len());
        assert!(opts.iter().all(|(v, t)| v == t));
    }

    #[test]
    fn tabs_have_distinct_labels() {
        let labels: Vec<&str> = OptionsTab::ALL.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["Basic", "OCR", "Advanced", "Accelerator"]);
    }
}
