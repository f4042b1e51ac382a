// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Convert page — file queue, options, output folder, run controls and the
// Log / Preview / File Info pane.

use std::path::PathBuf;

use dioxus::prelude::*;

use docwerk_core::human_errors::Severity;
use docwerk_core::types::{EntryId, EntryStatus, LogLine, SUPPORTED_EXTENSIONS, type_label};
use docwerk_queue::{RunHandle, StatusCounts};

use crate::pages::options::{OptionsPanel, SettingRow};
use crate::services::app_services::AppServices;
use crate::state::{AppState, Pane};

const BUTTON: &str = "padding: 6px 12px; border-radius: 6px; border: 1px solid #ccc; background: white; font-size: 13px;";
const PRIMARY: &str = "padding: 10px 16px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 14px;";

#[component]
pub fn Convert() -> Element {
    let state = use_context::<Signal<AppState>>();

    rsx! {
        div {
            ErrorBanner {}
            div { style: "display: grid; grid-template-columns: 1fr 1fr; gap: 12px;",
                div {
                    InputPanel {}
                    OutputPanel {}
                }
                div {
                    OptionsPanel {}
                }
            }
            RunControls {}
            if state.read().running || !state.read().log.is_empty() || state.read().file_info.is_some() {
                OutputPane {}
            } else {
                p { style: "text-align: center; color: #aaa; margin: 24px 0;",
                    "Add files, choose an output folder and press Convert."
                }
            }
        }
    }
}

// -- Input panel -------------------------------------------------------------

#[component]
fn InputPanel() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let running = state.read().running;
    let count = state.read().entries.len();
    let selected = state.read().selected.len();
    let summary = counts_label(&svc.counts(), selected);

    rsx! {
        section { style: "margin: 12px 0; border: 1px solid #e0e0e0; border-radius: 8px; padding: 12px;",
            h3 { style: "margin: 0 0 8px;", "Input Files" }
            div { style: "display: flex; gap: 8px; flex-wrap: wrap;",
                button {
                    style: BUTTON,
                    disabled: running,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            if let Some(paths) = pick_files() {
                                let added = add_paths(&svc, state, paths);
                                if added > 0 {
                                    state.write().push_log(LogLine::info(format!("Added {added} files")));
                                }
                            }
                        }
                    },
                    "Add Files"
                }
                button {
                    style: BUTTON,
                    disabled: running,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let Some(dir) = rfd::FileDialog::new().set_title("Select folder").pick_folder() else {
                                return;
                            };
                            match svc.add_folder(&dir) {
                                Ok(n) => {
                                    let mut s = state.write();
                                    s.push_log(LogLine::info(format!("Added {n} files from folder")));
                                    s.entries = svc.entries();
                                }
                                Err(e) => state.write().show_error(&e),
                            }
                        }
                    },
                    "Add Folder"
                }
                button {
                    style: BUTTON,
                    disabled: running || selected == 0,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let ids = state.read().selected.clone();
                            let removed = svc.remove(&ids);
                            let mut s = state.write();
                            s.selected.clear();
                            s.file_info = None;
                            s.entries = svc.entries();
                            s.push_log(LogLine::info(format!("Removed {removed} files")));
                        }
                    },
                    "Remove Selected"
                }
                button {
                    style: BUTTON,
                    disabled: running || count == 0,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            svc.clear();
                            let mut s = state.write();
                            s.selected.clear();
                            s.file_info = None;
                            s.entries.clear();
                            s.push_log(LogLine::info("File list cleared"));
                        }
                    },
                    "Clear"
                }
            }
            p { style: "color: #666; font-size: 13px; margin: 8px 0 4px;",
                "{summary}"
            }
            FileList {}
        }
    }
}

#[component]
fn FileList() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let entries = state.read().entries.clone();
    let running = state.read().running;
    let mut drag_over = use_signal(|| false);
    let background = if *drag_over.read() { "#e8f4f8" } else { "white" };

    rsx! {
        div {
            style: "min-height: 80px; max-height: 260px; overflow-y: auto; border: 1px solid #f0f0f0; border-radius: 4px; background: {background};",
            ondragover: move |evt| {
                evt.prevent_default();
                if !running {
                    drag_over.set(true);
                }
            },
            ondragleave: move |_| drag_over.set(false),
            ondrop: {
                let svc = svc.clone();
                move |evt: DragEvent| {
                    evt.prevent_default();
                    drag_over.set(false);
                    if running {
                        return;
                    }
                    let paths: Vec<PathBuf> = evt.files().into_iter().map(|f| f.path()).collect();
                    let added = add_paths(&svc, state, paths);
                    state.write().push_log(LogLine::info(drop_message(added)));
                }
            },
            if entries.is_empty() {
                p { style: "color: #aaa; font-size: 13px; text-align: center; margin: 28px 0;",
                    "Drop files or folders here"
                }
            }
            for entry in entries {
                {
                    let id = entry.id;
                    let name = entry.file_name();
                    let kind = type_label(&entry.path);
                    let status = entry.status;
                    let full_path = entry.path.display().to_string();
                    let checked = state.read().selected.contains(&id);
                    rsx! {
                        div { key: "{id}",
                            style: "display: flex; align-items: center; gap: 8px; padding: 6px 8px; border-bottom: 1px solid #f5f5f5;",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                onchange: move |evt| state.write().toggle_selected(id, evt.checked()),
                            }
                            span {
                                style: "flex: 1; cursor: pointer;",
                                title: "{full_path}",
                                onclick: {
                                    let svc = svc.clone();
                                    move |_| show_file_info(&svc, state, id)
                                },
                                "{name}"
                            }
                            span { style: "color: #999; font-size: 12px;", "{kind}" }
                            button {
                                style: "border: none; background: none; color: #007aff; font-size: 12px; cursor: pointer;",
                                title: "Open the folder containing this file",
                                onclick: {
                                    let svc = svc.clone();
                                    move |_| {
                                        if let Some(Err(e)) = svc.open_containing_folder(&id) {
                                            state.write().show_error(&e);
                                        }
                                    }
                                },
                                "Open folder"
                            }
                            span { style: "font-size: 12px; padding: 2px 8px; border-radius: 4px; background: {status_bg(status)}; color: {status_fg(status)};",
                                "{status_text(status)}"
                            }
                        }
                        if let Some(ref err) = entry.error {
                            p { style: "color: #ff3b30; font-size: 12px; margin: 0 8px 4px 32px;", "{err}" }
                        }
                    }
                }
            }
        }
    }
}

// -- Output panel ------------------------------------------------------------

#[component]
fn OutputPanel() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let s = state.read().settings.clone();
    let dir = s
        .output_dir
        .as_ref()
        .map(|d| d.display().to_string())
        .unwrap_or_default();

    rsx! {
        section { style: "margin: 12px 0; border: 1px solid #e0e0e0; border-radius: 8px; padding: 12px;",
            h3 { style: "margin: 0 0 8px;", "Output" }
            div { style: "display: flex; gap: 8px;",
                input {
                    r#type: "text",
                    style: "flex: 1; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;",
                    placeholder: "Output folder",
                    value: "{dir}",
                    onchange: move |evt| {
                        let v = evt.value();
                        state.write().settings.output_dir = if v.trim().is_empty() {
                            None
                        } else {
                            Some(PathBuf::from(v.trim()))
                        };
                    },
                }
                button {
                    style: BUTTON,
                    onclick: move |_| {
                        if let Some(d) = rfd::FileDialog::new().set_title("Select output folder").pick_folder() {
                            state.write().settings.output_dir = Some(d);
                        }
                    },
                    "Browse"
                }
            }
            SettingRow {
                label: "Create subfolder per document",
                checked: s.create_subfolder,
                on_toggle: move |v: bool| state.write().settings.create_subfolder = v,
            }
            SettingRow {
                label: "Overwrite existing files",
                checked: s.overwrite,
                on_toggle: move |v: bool| state.write().settings.overwrite = v,
            }
        }
    }
}

// -- Run controls ------------------------------------------------------------

#[component]
fn RunControls() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let running = state.read().running;
    let has_selection = !state.read().selected.is_empty();
    let has_entries = !state.read().entries.is_empty();
    let progress = format!("{:.0}", state.read().progress);
    let status = state.read().status.clone();
    let last = state.read().last_summary();

    rsx! {
        section { style: "margin: 12px 0;",
            div { style: "display: flex; gap: 8px;",
                button {
                    style: PRIMARY,
                    disabled: running || !has_selection,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let ids = state.read().selected_in_order();
                            start_run(&svc, state, ids);
                        }
                    },
                    "Convert Selected"
                }
                button {
                    style: PRIMARY,
                    disabled: running || !has_entries,
                    onclick: {
                        let svc = svc.clone();
                        move |_| start_run(&svc, state, svc.all_ids())
                    },
                    "Convert All"
                }
                button {
                    style: "padding: 10px 16px; border-radius: 8px; border: 1px solid #ff3b30; color: #ff3b30; background: white; font-size: 14px;",
                    disabled: !running,
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            svc.cancel_run();
                            state.write().status = "Cancelling after current file...".into();
                        }
                    },
                    "Cancel"
                }
            }
            div { style: "margin-top: 10px; height: 8px; background: #eee; border-radius: 4px; overflow: hidden;",
                div { style: "height: 100%; width: {progress}%; background: #34c759;" }
            }
            p { style: "color: #666; font-size: 13px; margin: 4px 0;", "{status}" }
            if let Some(last) = last {
                p { style: "color: #999; font-size: 12px; margin: 0;", "{last}" }
            }
        }
    }
}

// -- Log / Preview / File Info ----------------------------------------------

#[component]
fn OutputPane() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let pane = state.read().pane;
    let text = match pane {
        Pane::Log => state
            .read()
            .log
            .iter()
            .map(|l| l.render())
            .collect::<Vec<_>>()
            .join("\n"),
        Pane::Preview => state.read().preview.clone(),
        Pane::FileInfo => state
            .read()
            .file_info
            .as_ref()
            .map(|i| i.render())
            .unwrap_or_else(|| "Click a file name to see its details.".into()),
    };

    rsx! {
        section { style: "margin: 12px 0; border: 1px solid #e0e0e0; border-radius: 8px;",
            div { style: "display: flex; gap: 4px; padding: 4px 8px; border-bottom: 1px solid #e0e0e0; align-items: center;",
                for (p, label) in [(Pane::Log, "Log"), (Pane::Preview, "Preview"), (Pane::FileInfo, "File Info")] {
                    button {
                        style: pane_tab_style(pane == p),
                        onclick: move |_| state.write().pane = p,
                        "{label}"
                    }
                }
                span { style: "flex: 1;" }
                if pane == Pane::Log {
                    button {
                        style: BUTTON,
                        onclick: move |_| state.write().log.clear(),
                        "Clear Log"
                    }
                }
            }
            pre { style: "margin: 0; padding: 8px; height: 240px; overflow: auto; font-family: ui-monospace, monospace; font-size: 12px; white-space: pre-wrap;",
                "{text}"
            }
        }
    }
}

#[component]
fn ErrorBanner() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let Some(err) = state.read().banner.clone() else {
        return rsx! {};
    };
    let (bg, fg) = match err.severity {
        Severity::Transient => ("#fff3cd", "#856404"),
        Severity::ActionRequired => ("#e8f0fe", "#1a4fa0"),
        Severity::Permanent => ("#f8d7da", "#721c24"),
    };

    rsx! {
        div { style: "padding: 10px 12px; border-radius: 8px; background: {bg}; color: {fg}; display: flex; justify-content: space-between; align-items: start;",
            div {
                strong { "{err.message}" }
                p { style: "margin: 4px 0 0; font-size: 13px;", "{err.suggestion}" }
            }
            button {
                style: "border: none; background: none; color: {fg}; font-size: 16px;",
                onclick: move |_| state.write().banner = None,
                "x"
            }
        }
    }
}

// -- Actions -----------------------------------------------------------------

fn pick_files() -> Option<Vec<PathBuf>> {
    let exts: Vec<&str> = SUPPORTED_EXTENSIONS.iter().map(|(e, _, _)| *e).collect();
    rfd::FileDialog::new()
        .set_title("Select documents")
        .add_filter("Supported documents", &exts)
        .add_filter("All files", &["*"])
        .pick_files()
}

/// Queue files and folders; folders are walked recursively. Returns how many
/// entries were added.
fn add_paths(svc: &AppServices, mut state: Signal<AppState>, paths: Vec<PathBuf>) -> usize {
    let report = svc.add_paths(paths);
    let mut s = state.write();
    for path in &report.unsupported {
        s.push_log(LogLine::warn(format!("Unsupported file type: {}", path.display())));
    }
    s.entries = svc.entries();
    report.added.len()
}

fn drop_message(added: usize) -> String {
    if added > 0 {
        format!("Added {added} files via drag & drop")
    } else {
        "No supported files found in dropped items".to_string()
    }
}

fn counts_label(counts: &StatusCounts, selected: usize) -> String {
    let mut text = format!("{} files, {selected} selected", counts.total());
    if counts.success + counts.error > 0 {
        text.push_str(&format!(", {} done, {} failed", counts.success, counts.error));
    }
    text
}

fn show_file_info(svc: &AppServices, mut state: Signal<AppState>, id: EntryId) {
    match svc.file_info(&id) {
        Some(Ok(info)) => {
            let mut s = state.write();
            s.file_info = Some(info);
            s.pane = Pane::FileInfo;
        }
        Some(Err(e)) => state.write().show_error(&e),
        None => {}
    }
}

/// Snapshot the options, start the worker and stream its events into state.
fn start_run(svc: &AppServices, mut state: Signal<AppState>, ids: Vec<EntryId>) {
    let settings = state.read().settings.clone();
    let handle = match svc.start_run(ids, &settings) {
        Ok(h) => h,
        Err(e) => {
            tracing::warn!(error = %e, "conversion run refused");
            state.write().show_error(&e);
            return;
        }
    };

    {
        let mut s = state.write();
        s.running = true;
        s.progress = 0.0;
        s.banner = None;
        s.status = "Starting...".into();
        s.pane = Pane::Log;
        s.entries = svc.entries();
    }

    let RunHandle {
        mut events, task, ..
    } = handle;
    spawn(async move {
        while let Some(event) = events.recv().await {
            state.write().apply(event);
        }
        // The controller is idle once the task has ended.
        match task.await {
            Ok(Ok(_)) => state.write().end_run(),
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "conversion run rejected");
                state.write().fail_run(&e);
            }
            Err(e) => {
                tracing::error!(error = %e, "conversion task failed");
                let mut s = state.write();
                s.push_log(LogLine::error(format!("ERROR: conversion task failed: {e}")));
                s.status = "Failed".into();
                s.end_run();
            }
        }
    });
}

fn pane_tab_style(active: bool) -> &'static str {
    if active {
        "padding: 4px 10px; border: none; background: #e8f0fe; border-radius: 4px;"
    } else {
        "padding: 4px 10px; border: none; background: none;"
    }
}

fn status_bg(s: EntryStatus) -> &'static str {
    match s {
        EntryStatus::Pending => "#f0f0f0",
        EntryStatus::Processing => "#fff3cd",
        EntryStatus::Success => "#d4edda",
        EntryStatus::Error => "#f8d7da",
    }
}

fn status_fg(s: EntryStatus) -> &'static str {
    match s {
        EntryStatus::Pending => "#333",
        EntryStatus::Processing => "#856404",
        EntryStatus::Success => "#155724",
        EntryStatus::Error => "#721c24",
    }
}

fn status_text(s: EntryStatus) -> &'static str {
    match s {
        EntryStatus::Pending => "Pending",
        EntryStatus::Processing => "Converting...",
        EntryStatus::Success => "Done",
        EntryStatus::Error => "Failed",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_label_adds_results_once_there_are_any() {
        let fresh = StatusCounts {
            pending: 3,
            ..Default::default()
        };
        assert_eq!(counts_label(&fresh, 1), "3 files, 1 selected");

        let after = StatusCounts {
            pending: 1,
            success: 2,
            error: 1,
            ..Default::default()
        };
        assert_eq!(counts_label(&after, 0), "4 files, 0 selected, 2 done, 1 failed");
    }

    #[test]
    fn drop_message_reports_empty_drops() {
        assert_eq!(drop_message(2), "Added 2 files via drag & drop");
        assert_eq!(drop_message(0), "No supported files found in dropped items");
    }
}
