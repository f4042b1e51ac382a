// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer — bridges the Dioxus UI to the docwerk backend crates.
//
// The UI never touches the queue mutex or the engine directly; it calls
// these methods and renders the snapshots they return.

pub mod app_services;
pub mod data_dir;
