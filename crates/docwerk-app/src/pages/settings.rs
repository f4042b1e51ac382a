// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Settings page — engine paths, default output folder, preview length and
// saved default options.

use std::path::PathBuf;

use dioxus::prelude::*;

use crate::services::app_services::AppServices;
use crate::state::AppState;

const ROW: &str = "display: flex; justify-content: space-between; align-items: center; gap: 12px; padding: 12px 0; border-bottom: 1px solid #f0f0f0;";
const TEXT_INPUT: &str = "flex: 1; max-width: 420px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px;";

#[component]
pub fn Settings() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let svc = use_context::<AppServices>();
    let mut save_msg = use_signal(|| Option::<String>::None);

    let config = state.read().config.clone();
    let docling = path_text(&config.docling_path);
    let python = path_text(&config.python_path);
    let out_dir = path_text(&config.default_output_dir);
    let data_dir = svc.data_dir().display().to_string();

    rsx! {
        div {
            h1 { "Settings" }

            section { style: "margin: 16px 0;",
                h3 { "Engine" }
                div { style: ROW,
                    span { "docling executable" }
                    input {
                        r#type: "text",
                        style: TEXT_INPUT,
                        placeholder: "Found on PATH",
                        value: "{docling}",
                        onchange: move |evt| state.write().config.docling_path = optional_path(&evt.value()),
                    }
                }
                div { style: ROW,
                    span { "Python interpreter" }
                    input {
                        r#type: "text",
                        style: TEXT_INPUT,
                        placeholder: "python3 on PATH",
                        value: "{python}",
                        onchange: move |evt| state.write().config.python_path = optional_path(&evt.value()),
                    }
                }
                button {
                    style: "padding: 6px 12px; border-radius: 6px; border: 1px solid #ccc; background: white; font-size: 13px; margin-top: 8px;",
                    onclick: {
                        let svc = svc.clone();
                        move |_| {
                            let svc = svc.clone();
                            // Probe with the paths as saved.
                            spawn(async move {
                                let availability = svc.probe().await;
                                state.write().availability = Some(availability);
                            });
                        }
                    },
                    "Re-check engines"
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Output" }
                div { style: ROW,
                    span { "Default output folder" }
                    input {
                        r#type: "text",
                        style: TEXT_INPUT,
                        value: "{out_dir}",
                        onchange: move |evt| state.write().config.default_output_dir = optional_path(&evt.value()),
                    }
                    button {
                        style: "padding: 4px 10px; border-radius: 4px; border: 1px solid #ccc; background: white;",
                        onclick: move |_| {
                            if let Some(d) = rfd::FileDialog::new().set_title("Default output folder").pick_folder() {
                                state.write().config.default_output_dir = Some(d);
                            }
                        },
                        "Browse"
                    }
                }
                div { style: ROW,
                    span { "Preview length (characters)" }
                    input {
                        r#type: "number",
                        style: "width: 100px; padding: 4px 8px; border: 1px solid #ccc; border-radius: 4px; text-align: right;",
                        min: "100",
                        value: "{config.preview_chars}",
                        onchange: move |evt| {
                            if let Ok(n) = evt.value().parse::<usize>()
                                && n > 0
                            {
                                state.write().config.preview_chars = n;
                            }
                        },
                    }
                }
            }

            section { style: "margin: 16px 0;",
                h3 { "Default options" }
                p { style: "color: #666; font-size: 14px;",
                    "New sessions start from these conversion options."
                }
                button {
                    style: "padding: 6px 12px; border-radius: 6px; border: 1px solid #ccc; background: white; font-size: 13px;",
                    onclick: move |_| {
                        let mut s = state.write();
                        let mut defaults = s.settings.clone();
                        defaults.output_dir = None;
                        s.config.default_settings = defaults;
                        save_msg.set(Some("Current options will be saved as defaults.".into()));
                    },
                    "Use current options as defaults"
                }
            }

            // Save button
            button {
                style: "width: 100%; padding: 12px; border-radius: 8px; border: none; background: #007aff; color: white; font-size: 16px; margin-top: 8px;",
                onclick: {
                    let svc = svc.clone();
                    move |_| {
                        let config = state.read().config.clone();
                        match svc.save_config(&config) {
                            Ok(()) => {
                                tracing::info!("settings saved");
                                save_msg.set(Some("Settings saved.".into()));
                            }
                            Err(e) => {
                                tracing::error!(error = %e, "failed to save settings");
                                save_msg.set(Some(format!("Save failed: {e}")));
                            }
                        }
                    }
                },
                "Save Settings"
            }
            if let Some(ref msg) = *save_msg.read() {
                p { style: "color: #34c759; font-size: 14px; text-align: center; margin-top: 8px;",
                    "{msg}"
                }
            }
            p { style: "color: #999; font-size: 12px; margin-top: 16px;",
                "Stored in {data_dir}"
            }
        }
    }
}

fn path_text(path: &Option<PathBuf>) -> String {
    path.as_ref().map(|p| p.display().to_string()).unwrap_or_default()
}

/// Empty input clears the override.
fn optional_path(value: &str) -> Option<PathBuf> {
    let v = value.trim();
    (!v.is_empty()).then(|| PathBuf::from(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_input_clears_path() {
        assert_eq!(optional_path("   "), None);
        assert_eq!(optional_path(" /usr/bin/docling "), Some(PathBuf::from("/usr/bin/docling")));
        assert_eq!(path_text(&None), "");
    }
}
