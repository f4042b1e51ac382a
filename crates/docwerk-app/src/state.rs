// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Global application state — reactive signals for the Dioxus UI.

use docwerk_convert::{EngineAvailability, FileInfo};
use docwerk_core::AppConfig;
use docwerk_core::human_errors::{HumanError, humanize_error};
use docwerk_core::error::DocwerkError;
use docwerk_core::settings::ConversionSettings;
use docwerk_core::types::{EntryId, LogLine, QueueEntry, RunResult};
use docwerk_queue::WorkerEvent;

use crate::services::app_services::AppServices;

/// Which tab of the bottom pane is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Log,
    Preview,
    FileInfo,
}

/// Shared state accessible to all pages via `use_context`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Persisted preferences, edited on the Settings page.
    pub config: AppConfig,
    /// What the options panel currently shows. Snapshotted when a run starts.
    pub settings: ConversionSettings,
    /// Queue snapshot for rendering.
    pub entries: Vec<QueueEntry>,
    /// Entries ticked in the file list.
    pub selected: Vec<EntryId>,
    pub log: Vec<LogLine>,
    pub preview: String,
    pub file_info: Option<FileInfo>,
    pub pane: Pane,
    /// 0 to 100.
    pub progress: f32,
    pub status: String,
    pub running: bool,
    pub availability: Option<EngineAvailability>,
    /// Last pre-flight or engine problem, in plain English.
    pub banner: Option<HumanError>,
    pub last_result: Option<RunResult>,
}

impl AppState {
    /// Create initial state from the backend services.
    pub fn new(svc: &AppServices) -> Self {
        let config = svc.config();
        Self {
            settings: config.initial_settings(),
            entries: svc.entries(),
            config,
            ..Self::default()
        }
    }

    pub fn push_log(&mut self, line: LogLine) {
        self.log.push(line);
    }

    pub fn show_error(&mut self, err: &DocwerkError) {
        self.push_log(LogLine::error(format!("ERROR: {err}")));
        self.banner = Some(humanize_error(err));
    }

    /// Fold one worker event into the state.
    pub fn apply(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Log(line) => self.push_log(line),
            WorkerEvent::Status(status) => self.status = status,
            WorkerEvent::Progress(pct) => self.progress = pct,
            WorkerEvent::Preview(text) => {
                self.preview = text;
                self.pane = Pane::Preview;
            }
            WorkerEvent::EntryUpdated(entry) => {
                if let Some(slot) = self.entries.iter_mut().find(|e| e.id == entry.id) {
                    *slot = entry;
                }
            }
            WorkerEvent::Finished(result) => self.last_result = Some(result),
        }
    }

    /// The worker task has ended and the controller is idle again.
    pub fn end_run(&mut self) {
        self.running = false;
    }

    /// The worker task ended without a summary.
    pub fn fail_run(&mut self, err: &DocwerkError) {
        self.show_error(err);
        self.status = "Failed".into();
        self.end_run();
    }

    /// One-line outcome of the last finished run.
    pub fn last_summary(&self) -> Option<String> {
        let r = self.last_result.as_ref()?;
        let mut text = format!(
            "Last run: {} of {} converted, {} failed",
            r.succeeded, r.total, r.failed
        );
        if r.skipped > 0 {
            text.push_str(&format!(", {} skipped", r.skipped));
        }
        Some(text)
    }

    /// Selected ids in queue order.
    pub fn selected_in_order(&self) -> Vec<EntryId> {
        self.entries
            .iter()
            .map(|e| e.id)
            .filter(|id| self.selected.contains(id))
            .collect()
    }

    pub fn toggle_selected(&mut self, id: EntryId, on: bool) {
        self.selected.retain(|s| *s != id);
        if on {
            self.selected.push(id);
        }
    }

    /// Replace the options with defaults, keeping the chosen output folder.
    pub fn reset_options(&mut self) {
        let output_dir = self.settings.output_dir.take();
        self.settings = ConversionSettings {
            output_dir,
            ..ConversionSettings::default()
        };
        self.push_log(LogLine::info("Options reset to defaults"));
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            config: AppConfig::default(),
            settings: ConversionSettings::default(),
            entries: Vec::new(),
            selected: Vec::new(),
            log: Vec::new(),
            preview: String::new(),
            file_info: None,
            pane: Pane::Log,
            progress: 0.0,
            status: "Ready".into(),
            running: false,
            availability: None,
            banner: None,
            last_result: None,
        }
    }
}
