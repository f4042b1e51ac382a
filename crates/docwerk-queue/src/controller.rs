// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Starts batch runs on the tokio runtime, one at a time.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tracing::info;

use docwerk_convert::Converter;
use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::settings::ConversionSettings;
use docwerk_core::types::{EntryId, RunResult};

use crate::queue::SharedQueue;
use crate::worker::{CancelFlag, WorkerEvent, run_batch, validate_run};

/// A started run.
pub struct RunHandle {
    pub cancel: CancelFlag,
    pub events: UnboundedReceiver<WorkerEvent>,
    pub task: JoinHandle<Result<RunResult>>,
}

/// Guarantees at most one run at a time.
#[derive(Debug, Clone, Default)]
pub struct RunController {
    running: Arc<AtomicBool>,
}

/// Clears the running flag when the worker task ends, even by panic.
/// On a normal end it is dropped before the event sender.
struct RunningGuard(Arc<AtomicBool>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl RunController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Validate, reset the chosen entries to Pending and spawn the worker.
    ///
    /// `settings` is the snapshot for the whole run; later edits by the
    /// caller are not seen.
    pub fn start<C: Converter>(
        &self,
        converter: Arc<C>,
        queue: SharedQueue,
        ids: Vec<EntryId>,
        settings: ConversionSettings,
        preview_chars: usize,
    ) -> Result<RunHandle> {
        if self.is_running() {
            return Err(DocwerkError::RunInProgress);
        }
        validate_run(&settings, &ids)?;
        if self
            .running
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(DocwerkError::RunInProgress);
        }
        let guard = RunningGuard(Arc::clone(&self.running));

        queue.lock().expect("queue lock poisoned").reset(&ids);
        info!(files = ids.len(), "starting conversion run");

        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancelFlag::new();
        let worker_cancel = cancel.clone();
        let task = tokio::spawn(async move {
            let result = run_batch(
                converter.as_ref(),
                &queue,
                &ids,
                settings,
                preview_chars,
                &tx,
                &worker_cancel,
            )
            .await;
            // Idle before the channel closes, so a receiver that sees the end
            // of the stream can start the next run.
            drop(guard);
            drop(tx);
            result
        });

        Ok(RunHandle {
            cancel,
            events: rx,
            task,
        })
    }
}
