// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Docwerk Queue — the in-memory file queue and the sequential batch worker
// that drives a `Converter` over it.

pub mod controller;
pub mod queue;
pub mod worker;

pub use controller::{RunController, RunHandle};
pub use queue::{AddReport, FileQueue, SharedQueue, StatusCounts};
pub use worker::{CancelFlag, WorkerEvent, run_batch, validate_run};
