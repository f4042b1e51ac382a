// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Application configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DocwerkError, Result};
use crate::settings::ConversionSettings;

/// File name of the persisted config inside the data directory.
pub const CONFIG_FILE: &str = "config.json";

/// Persistent application preferences. Queue and run state are never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Explicit path to the `docling` executable (PATH lookup otherwise).
    pub docling_path: Option<PathBuf>,
    /// Python interpreter used to probe OCR engine modules.
    pub python_path: Option<PathBuf>,
    /// Output directory pre-filled on launch.
    pub default_output_dir: Option<PathBuf>,
    /// Options the configuration panel starts from.
    pub default_settings: ConversionSettings,
    /// How many characters of converted output the preview pane shows.
    pub preview_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            docling_path: None,
            python_path: None,
            default_output_dir: std::env::var_os("HOME")
                .map(|home| PathBuf::from(home).join("Documents")),
            default_settings: ConversionSettings::default(),
            preview_chars: 5000,
        }
    }
}

impl AppConfig {
    /// Settings for a fresh panel: the saved defaults plus the default
    /// output directory when the saved settings have none.
    pub fn initial_settings(&self) -> ConversionSettings {
        let mut s = self.default_settings.clone();
        if s.output_dir.is_none() {
            s.output_dir = self.default_output_dir.clone();
        }
        s
    }

    /// Load from `<dir>/config.json`; `None` when absent or malformed.
    pub fn load(dir: &Path) -> Option<Self> {
        let data = std::fs::read_to_string(dir.join(CONFIG_FILE)).ok()?;
        serde_json::from_str(&data).ok()
    }

    /// Write to `<dir>/config.json`, creating `dir` if needed.
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .map_err(|e| DocwerkError::Config(format!("create {}: {e}", dir.display())))?;
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(dir.join(CONFIG_FILE), json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut cfg = AppConfig::default();
        cfg.preview_chars = 1234;
        cfg.docling_path = Some(PathBuf::from("/opt/docling/bin/docling"));
        cfg.save(dir.path()).expect("save");

        let loaded = AppConfig::load(dir.path()).expect("load");
        assert_eq!(loaded, cfg);
    }

    #[test]
    fn save_creates_missing_directory() {
        let dir = tempfile::tempdir().expect("tempdir");
        let nested = dir.path().join("a").join("b");
        AppConfig::default().save(&nested).expect("save");
        assert!(nested.join(CONFIG_FILE).exists());
    }

    #[test]
    fn malformed_file_is_ignored() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(dir.path().join(CONFIG_FILE), "{ not json").unwrap();
        assert!(AppConfig::load(dir.path()).is_none());
    }

    #[test]
    fn initial_settings_uses_default_output_dir() {
        let cfg = AppConfig {
            default_output_dir: Some(PathBuf::from("/out")),
            ..Default::default()
        };
        assert_eq!(cfg.initial_settings().output_dir, Some(PathBuf::from("/out")));
    }
}
