// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// docling CLI adapter.
//
// Each input is converted by one `docling` process writing into a private
// temporary directory. The exported text is read back and handed to the
// worker, which decides the final file name. Nothing is ever written into
// the user's output directory from here.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, instrument};

use docwerk_core::AppConfig;
use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::settings::{
    ConversionSettings, Device, OcrEngine, OutputFormat, PipelineType, TableMode, VlmModel,
};

use crate::command::{DEFAULT_TIMEOUT, ToolCommand};
use crate::converter::{ConvertedDocument, Converter};

/// Executable name looked up on PATH.
pub const DOCLING_BIN: &str = "docling";

/// Extra time the process gets beyond the engine's own document timeout,
/// covering model loading and export.
const TIMEOUT_GRACE: Duration = Duration::from_secs(120);

/// Runs the `docling` executable once per file.
#[derive(Debug, Clone)]
pub struct DoclingCli {
    program: PathBuf,
}

impl DoclingCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Find the engine: the configured path when it exists, otherwise PATH.
    pub fn locate(config: &AppConfig) -> Result<Self> {
        resolve_program(config.docling_path.as_deref(), DOCLING_BIN)
            .map(Self::new)
            .ok_or_else(|| {
                DocwerkError::EngineUnavailable(format!(
                    "{DOCLING_BIN} not found; is it installed and in PATH?"
                ))
            })
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// First line of `docling --version`.
    pub async fn version(&self) -> Option<String> {
        let out = ToolCommand::new(&self.program)
            .arg("--version")
            .timeout(Duration::from_secs(60))
            .execute()
            .await
            .ok()?;
        out.stdout.lines().next().map(|l| l.trim().to_string())
    }

    /// Build the full command for one input.
    pub fn command(
        &self,
        input: &Path,
        settings: &ConversionSettings,
        out_dir: &Path,
    ) -> ToolCommand {
        let mut cmd = ToolCommand::new(&self.program);
        cmd.args(build_args(input, settings, out_dir))
            .timeout(process_timeout(settings))
            .subject(
                input
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            );
        cmd
    }
}

impl Converter for DoclingCli {
    #[instrument(skip(self, settings), fields(input = %input.display()))]
    async fn convert(
        &self,
        input: &Path,
        settings: &ConversionSettings,
    ) -> Result<ConvertedDocument> {
        let scratch = tempfile::Builder::new().prefix("docwerk-").tempdir()?;
        log_unmapped_options(settings);

        self.command(input, settings, scratch.path()).execute().await?;

        let produced = find_output(scratch.path(), input, settings.output_format)?;
        let content = tokio::fs::read_to_string(&produced).await?;
        info!(bytes = content.len(), "docling conversion finished");

        Ok(ConvertedDocument {
            content,
            format: settings.output_format,
        })
    }
}

/// Configured path if it exists, otherwise a PATH lookup of `name`.
pub fn resolve_program(custom: Option<&Path>, name: &str) -> Option<PathBuf> {
    match custom {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        // Custom path does not exist; fall back to PATH.
        _ => which::which(name).ok(),
    }
}

/// Translate a settings snapshot into docling CLI arguments.
pub fn build_args(input: &Path, settings: &ConversionSettings, out_dir: &Path) -> Vec<String> {
    let s = settings;
    let mut args: Vec<String> = vec![
        "--to".into(),
        format_keyword(s.output_format).into(),
        "--pipeline".into(),
        pipeline_keyword(s.pipeline).into(),
    ];

    if s.pipeline == PipelineType::Vlm {
        args.extend(["--vlm-model".into(), vlm_keyword(s.vlm_model).into()]);
    }

    // -- OCR --
    if s.ocr_enabled {
        args.push("--ocr".into());
        if s.force_full_page_ocr {
            args.push("--force-ocr".into());
        }
        args.extend([
            "--ocr-engine".into(),
            ocr_engine_keyword(s.ocr_engine).into(),
            "--ocr-lang".into(),
            s.ocr_language.clone(),
        ]);
    } else {
        args.push("--no-ocr".into());
    }

    // -- Tables --
    if s.table_structure {
        args.extend([
            "--tables".into(),
            "--table-mode".into(),
            table_mode_keyword(s.table_mode).into(),
        ]);
    } else {
        args.push("--no-tables".into());
    }

    // -- Enrichment --
    if s.code_enrichment {
        args.push("--enrich-code".into());
    }
    if s.formula_enrichment {
        args.push("--enrich-formula".into());
    }
    if s.picture_classification {
        args.push("--enrich-picture-classes".into());
    }
    if s.picture_description {
        args.push("--enrich-picture-description".into());
    }

    let image_mode = if s.picture_images { "embedded" } else { "placeholder" };
    args.extend(["--image-export-mode".into(), image_mode.into()]);

    // -- Accelerator --
    args.extend([
        "--device".into(),
        device_keyword(s.device).into(),
        "--num-threads".into(),
        s.num_threads.to_string(),
    ]);

    if s.document_timeout_secs > 0 {
        args.extend(["--document-timeout".into(), s.document_timeout_secs.to_string()]);
    }

    args.extend(["--output".into(), out_dir.display().to_string()]);
    args.push(input.display().to_string());
    args
}

/// Process timeout for one conversion.
pub fn process_timeout(settings: &ConversionSettings) -> Duration {
    match settings.document_timeout_secs {
        0 => DEFAULT_TIMEOUT,
        secs => Duration::from_secs(u64::from(secs)) + TIMEOUT_GRACE,
    }
}

/// Locate the exported file in the scratch directory.
fn find_output(dir: &Path, input: &Path, format: OutputFormat) -> Result<PathBuf> {
    let ext = format.extension().trim_start_matches('.');
    let stem = input.file_stem().map(|s| s.to_string_lossy().into_owned());

    let expected = stem.as_ref().map(|s| dir.join(format!("{s}.{ext}")));
    if let Some(path) = expected.filter(|p| p.is_file()) {
        return Ok(path);
    }

    // Some exporters normalise the stem; accept any single file with the
    // right extension.
    let mut candidates: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|e| e.ok().map(|e| e.path()))
        .filter(|p| p.is_file() && p.extension().and_then(|e| e.to_str()) == Some(ext))
        .collect();
    candidates.sort();

    candidates.into_iter().next().ok_or_else(|| DocwerkError::MissingOutput {
        file: input.display().to_string(),
        expected: format.label().to_string(),
    })
}

/// Options the CLI has no flag for. They stay in the snapshot and the log.
fn log_unmapped_options(s: &ConversionSettings) {
    let defaults = ConversionSettings::default();
    if s.ocr_enabled && s.ocr_engine == OcrEngine::EasyOcr && s.ocr_confidence != defaults.ocr_confidence {
        debug!(confidence = s.ocr_confidence, "ocr confidence threshold has no CLI flag");
    }
    if s.cell_matching != defaults.cell_matching {
        debug!(cell_matching = s.cell_matching, "cell matching has no CLI flag");
    }
    if s.page_images || s.table_images || s.images_scale != defaults.images_scale {
        debug!(
            page_images = s.page_images,
            table_images = s.table_images,
            scale = s.images_scale,
            "image generation options have no CLI flag"
        );
    }
    if s.flash_attention {
        debug!("flash attention has no CLI flag");
    }
}

fn format_keyword(f: OutputFormat) -> &'static str {
    match f {
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
        OutputFormat::Json => "json",
        OutputFormat::DocTags => "doctags",
        OutputFormat::Text => "text",
    }
}

fn pipeline_keyword(p: PipelineType) -> &'static str {
    match p {
        PipelineType::Standard => "standard",
        PipelineType::Vlm => "vlm",
        PipelineType::Asr => "asr",
    }
}

fn vlm_keyword(m: VlmModel) -> &'static str {
    match m {
        VlmModel::GraniteDocling => "granite_docling",
        VlmModel::SmolVlm => "smoldocling",
    }
}

fn ocr_engine_keyword(e: OcrEngine) -> &'static str {
    match e {
        OcrEngine::Auto => "auto",
        OcrEngine::RapidOcr => "rapidocr",
        OcrEngine::EasyOcr => "easyocr",
        OcrEngine::Tesseract => "tesseract_cli",
        OcrEngine::OcrMac => "ocrmac",
    }
}

fn table_mode_keyword(m: TableMode) -> &'static str {
    match m {
        TableMode::Fast => "fast",
        TableMode::Accurate => "accurate",
    }
}

fn device_keyword(d: Device) -> &'static str {
    match d {
        Device::Auto => "auto",
        Device::Cpu => "cpu",
        Device::Cuda => "cuda",
        Device::Mps => "mps",
    }
}
