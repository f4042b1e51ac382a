// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docwerk — desktop batch front-end for the docling document converter.
//
// Entry point. Initialises logging, backend services, app state, and launches
// the Dioxus UI.

mod pages;
mod services;
mod state;

use dioxus::prelude::*;

use docwerk_convert::EngineAvailability;

use pages::about::About;
use pages::convert::Convert;
use pages::settings::Settings;

use services::app_services::AppServices;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Docwerk starting");

    dioxus::launch(app);
}

/// Top-level route enum.
#[derive(Debug, Clone, Routable, PartialEq)]
enum Route {
    #[layout(AppLayout)]
    #[route("/")]
    Convert {},
    #[route("/settings")]
    Settings {},
    #[route("/about")]
    About {},
}

/// Root component.
fn app() -> Element {
    let svc = use_hook(AppServices::init);

    // Provide services and state as context for all pages
    use_context_provider(|| svc.clone());
    let mut state = use_context_provider(|| Signal::new(state::AppState::new(&svc)));

    // Probe the engine and OCR backends once at startup
    let svc_probe = svc.clone();
    use_hook(move || {
        spawn(async move {
            let availability = svc_probe.probe().await;
            state.write().availability = Some(availability);
        });
    });

    rsx! {
        Router::<Route> {}
    }
}

/// Header with navigation and engine indicators, wrapping all pages.
#[component]
fn AppLayout() -> Element {
    rsx! {
        div { class: "app-container",
            style: "display: flex; flex-direction: column; height: 100vh; font-family: system-ui, -apple-system, sans-serif;",

            header {
                style: "display: flex; align-items: center; gap: 16px; padding: 8px 16px; border-bottom: 1px solid #e0e0e0; background: #fafafa;",
                strong { style: "font-size: 18px;", "Docwerk" }
                nav { style: "display: flex; gap: 12px;",
                    NavLink { to: Route::Convert {}, label: "Convert" }
                    NavLink { to: Route::Settings {}, label: "Settings" }
                    NavLink { to: Route::About {}, label: "About" }
                }
                span { style: "flex: 1;" }
                AvailabilityBar {}
            }

            div { class: "page-content",
                style: "flex: 1; overflow-y: auto; padding: 16px;",
                Outlet::<Route> {}
            }
        }
    }
}

#[component]
fn NavLink(to: Route, label: &'static str) -> Element {
    rsx! {
        Link { to: to,
            style: "text-decoration: none; color: #333; font-size: 14px;",
            "{label}"
        }
    }
}

#[component]
fn AvailabilityBar() -> Element {
    let state = use_context::<Signal<state::AppState>>();
    let availability: Option<EngineAvailability> = state.read().availability.clone();

    let Some(a) = availability else {
        return rsx! {
            span { style: "color: #999; font-size: 12px;", "Checking engines..." }
        };
    };
    let engine = match (&a.engine_path, &a.engine_version) {
        (Some(_), Some(v)) => format!("docling {v}"),
        (Some(_), None) => "docling (version unknown)".to_string(),
        (None, _) => "docling not found".to_string(),
    };
    let engine_color = if a.engine_found() { "#155724" } else { "#721c24" };

    rsx! {
        div { style: "display: flex; gap: 10px; font-size: 12px; align-items: center;",
            span { style: "color: {engine_color};", "{engine}" }
            for o in a.ocr.iter() {
                {
                    let label = o.engine.label();
                    let style = if o.available {
                        "color: #155724;"
                    } else {
                        "color: #aaa; text-decoration: line-through;"
                    };
                    rsx! {
                        span { style: style, "{label}" }
                    }
                }
            }
        }
    }
}
