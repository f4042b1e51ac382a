// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// About page.

use dioxus::prelude::*;

const VERSION: &str = env!("CARGO_PKG_VERSION");

const FEATURES: &[&str] = &[
    "Batch conversion of PDF, Office, HTML, image, audio and subtitle files",
    "Markdown, HTML, JSON, DocTags and plain text output",
    "Standard, VLM and ASR pipelines",
    "OCR with RapidOCR, EasyOCR, Tesseract or OcrMac",
    "Table structure recognition in fast or accurate mode",
    "Code, formula and picture enrichment",
    "CPU, CUDA and Apple MPS acceleration",
];

#[component]
pub fn About() -> Element {
    rsx! {
        div {
            h1 { "About Docwerk" }
            p { style: "color: #666;",
                "Docwerk v{VERSION}"
                br {}
                "A desktop front-end for the docling document converter."
                br {}
                "PMPL-1.0-or-later"
            }
            h3 { "Features" }
            ul {
                for feature in FEATURES {
                    li { "{feature}" }
                }
            }
            h3 { "Links" }
            ul {
                li { "Docling: https://github.com/docling-project/docling" }
                li { "Documentation: https://docling-project.github.io/docling/" }
            }
        }
    }
}
