// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Output naming and writing.
//
// Layout: `<output_dir>[/<stem>]/<stem><ext>`. An existing file is only
// replaced when overwriting is enabled; otherwise a `_YYYYmmdd_HHMMSS`
// suffix is added to the stem.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use tracing::{debug, instrument};

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::settings::ConversionSettings;

/// Decide where the converted form of `input` goes, creating directories as
/// needed. Does not write the file.
pub fn plan_output_path(
    input: &Path,
    settings: &ConversionSettings,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    let base = settings
        .output_dir
        .as_deref()
        .ok_or(DocwerkError::NoOutputDirectory)?;
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    let ext = settings.output_format.extension();

    let dir = if settings.create_subfolder {
        base.join(&stem)
    } else {
        base.to_path_buf()
    };
    std::fs::create_dir_all(&dir)?;

    let path = dir.join(format!("{stem}{ext}"));
    if path.exists() && !settings.overwrite {
        let stamp = now.format("%Y%m%d_%H%M%S");
        let alt = dir.join(format!("{stem}_{stamp}{ext}"));
        debug!(existing = %path.display(), alt = %alt.display(), "keeping existing output");
        return Ok(alt);
    }
    Ok(path)
}

/// Write converted text as UTF-8.
#[instrument(skip(content), fields(path = %path.display(), bytes = content.len()))]
pub async fn write_output(path: &Path, content: &str) -> Result<()> {
    tokio::fs::write(path, content.as_bytes()).await?;
    Ok(())
}

/// The first `max_chars` characters of `content`, split on a char boundary.
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((idx, _)) => content[..idx].to_string(),
        None => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use chrono::TimeZone;
    use docwerk_core::settings::OutputFormat;

    fn fixed_now() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 3, 14, 15, 9, 26).unwrap()
    }

    fn settings_into(dir: &Path) -> ConversionSettings {
        ConversionSettings {
            output_dir: Some(dir.to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn plain_layout_uses_stem_and_extension() {
        let out = tempfile::tempdir().unwrap();
        let s = ConversionSettings { output_format: OutputFormat::Html, ..settings_into(out.path()) };
        let path = plan_output_path(Path::new("/in/Annual Report.pdf"), &s, fixed_now()).unwrap();
        assert_eq!(path, out.path().join("Annual Report.html"));
    }

    #[test]
    fn subfolder_layout_creates_directory() {
        let out = tempfile::tempdir().unwrap();
        let s = ConversionSettings { create_subfolder: true, ..settings_into(out.path()) };
        let path = plan_output_path(Path::new("/in/report.pdf"), &s, fixed_now()).unwrap();
        assert_eq!(path, out.path().join("report").join("report.md"));
        assert!(out.path().join("report").is_dir());
    }

    #[test]
    fn existing_file_gets_timestamp_suffix() {
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("report.md"), "old").unwrap();
        let path = plan_output_path(Path::new("/in/report.pdf"), &settings_into(out.path()), fixed_now()).unwrap();
        assert_eq!(path, out.path().join("report_20260314_150926.md"));
    }

    #[test]
    fn existing_file_is_reused_when_overwriting() {
        let out = tempfile::tempdir().unwrap();
        std::fs::write(out.path().join("report.md"), "old").unwrap();
        let s = ConversionSettings { overwrite: true, ..settings_into(out.path()) };
        let path = plan_output_path(Path::new("/in/report.pdf"), &s, fixed_now()).unwrap();
        assert_eq!(path, out.path().join("report.md"));
    }

    #[test]
    fn missing_output_dir_is_rejected() {
        let err = plan_output_path(Path::new("/in/a.pdf"), &ConversionSettings::default(), fixed_now());
        assert!(matches!(err, Err(DocwerkError::NoOutputDirectory)));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        assert_eq!(preview("héllo wörld", 4), "héll");
        assert_eq!(preview("short", 100), "short");
    }

    #[tokio::test]
    async fn write_output_writes_utf8() {
        let out = tempfile::tempdir().unwrap();
        let path = out.path().join("x.md");
        write_output(&path, "# Überschrift").await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Überschrift");
    }
}
