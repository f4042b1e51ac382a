// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Sequential batch conversion.
//
// One file at a time, in submission order. A failing file is marked and the
// batch moves on. Cancellation is only observed between files; a conversion
// already handed to the engine runs to completion.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{info, instrument, warn};

use docwerk_convert::{Converter, check_limits, plan_output_path, preview, write_output};
use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::settings::ConversionSettings;
use docwerk_core::types::{EntryId, LogLine, QueueEntry, RunResult};

use crate::queue::SharedQueue;

/// Progress reported from a running batch.
#[derive(Debug, Clone)]
pub enum WorkerEvent {
    Log(LogLine),
    /// One-line status under the progress bar.
    Status(String),
    /// Percentage of the batch done, 0 to 100.
    Progress(f32),
    Preview(String),
    EntryUpdated(QueueEntry),
    Finished(RunResult),
}

/// Shared cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Checks that must pass before any entry is touched.
pub fn validate_run(settings: &ConversionSettings, ids: &[EntryId]) -> Result<()> {
    let dir = settings
        .output_dir
        .as_deref()
        .ok_or(DocwerkError::NoOutputDirectory)?;
    if !dir.is_dir() {
        return Err(DocwerkError::OutputDirectoryMissing(dir.to_path_buf()));
    }
    if ids.is_empty() {
        return Err(DocwerkError::EmptyBatch);
    }
    Ok(())
}

/// Convert `ids` one after another with a fixed settings snapshot.
///
/// Returns an error only when pre-flight fails; per-file failures are
/// recorded on the entries and counted in the result.
#[instrument(skip_all, fields(files = ids.len()))]
pub async fn run_batch<C: Converter>(
    converter: &C,
    queue: &SharedQueue,
    ids: &[EntryId],
    settings: ConversionSettings,
    preview_chars: usize,
    events: &UnboundedSender<WorkerEvent>,
    cancel: &CancelFlag,
) -> Result<RunResult> {
    validate_run(&settings, ids)?;
    let settings = settings.normalized();
    let emit = |event: WorkerEvent| {
        // The receiver going away (window closed) must not stop the batch.
        let _ = events.send(event);
    };
    let log = |line: LogLine| emit(WorkerEvent::Log(line));

    for line in settings.summary_lines() {
        log(LogLine::info(line));
    }
    info!(output = ?settings.output_dir, "batch started");

    let mut result = RunResult {
        total: ids.len(),
        ..Default::default()
    };

    for (index, id) in ids.iter().enumerate() {
        if cancel.is_cancelled() {
            result.cancelled = true;
            result.skipped += ids.len() - index;
            log(LogLine::warn("Conversion cancelled by user"));
            info!(skipped = result.skipped, "batch cancelled");
            break;
        }

        let Some(path) = lock(queue).set_processing(id) else {
            warn!(%id, "entry removed before conversion");
            result.skipped += 1;
            continue;
        };
        let name = display_name(&path);
        emit_entry(queue, id, &emit);
        emit(WorkerEvent::Status(format!("Converting: {name}")));
        log(LogLine::info(format!("Converting: {name}")));

        match convert_one(converter, &path, &settings).await {
            Ok((output, content)) => {
                lock(queue).mark_success(id, output.clone());
                result.succeeded += 1;
                log(LogLine::info(format!("  Saved: {}", output.display())));
                emit(WorkerEvent::Preview(preview(&content, preview_chars)));
            }
            Err(err) => {
                warn!(file = %name, error = %err, "conversion failed");
                lock(queue).mark_error(id, err.to_string());
                result.failed += 1;
                log(LogLine::error(format!("  ERROR: {err}")));
            }
        }
        emit_entry(queue, id, &emit);

        let done = index + 1;
        emit(WorkerEvent::Progress(done as f32 / ids.len() as f32 * 100.0));
    }

    for line in result.summary_lines() {
        log(LogLine::info(line));
    }
    emit(WorkerEvent::Status(if result.cancelled {
        "Cancelled".to_string()
    } else {
        "Complete".to_string()
    }));
    info!(
        succeeded = result.succeeded,
        failed = result.failed,
        skipped = result.skipped,
        "batch finished"
    );
    emit(WorkerEvent::Finished(result));
    Ok(result)
}

/// Limits, conversion, output naming and writing for one file.
async fn convert_one<C: Converter>(
    converter: &C,
    path: &Path,
    settings: &ConversionSettings,
) -> Result<(PathBuf, String)> {
    let limit_path = path.to_path_buf();
    let limit_settings = settings.clone();
    tokio::task::spawn_blocking(move || check_limits(&limit_path, &limit_settings))
        .await
        .map_err(|e| DocwerkError::Io(std::io::Error::other(e)))??;

    let doc = converter.convert(path, settings).await?;
    let output = plan_output_path(path, settings, Local::now())?;
    write_output(&output, &doc.content).await?;
    Ok((output, doc.content))
}

fn emit_entry(queue: &SharedQueue, id: &EntryId, emit: &impl Fn(WorkerEvent)) {
    let entry = lock(queue).get(id).cloned();
    if let Some(entry) = entry {
        emit(WorkerEvent::EntryUpdated(entry));
    }
}

fn lock(queue: &SharedQueue) -> std::sync::MutexGuard<'_, crate::queue::FileQueue> {
    queue.lock().expect("queue lock poisoned")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use std::sync::Mutex;

    use docwerk_convert::ConvertedDocument;
    use docwerk_core::settings::OutputFormat;
    use docwerk_core::types::EntryStatus;
    use tokio::sync::{Semaphore, mpsc};

    use crate::queue::FileQueue;

    /// Converter that records what it was asked and fails on chosen files.
    #[derive(Default)]
    pub(crate) struct ScriptedConverter {
        pub fail_on: Vec<String>,
        pub seen: Mutex<Vec<(String, OutputFormat)>>,
        /// When set, each call waits for one permit.
        pub gate: Option<Arc<Semaphore>>,
        /// Cancel this flag once this many calls have been made.
        pub cancel_after: Option<(usize, CancelFlag)>,
    }

    impl ScriptedConverter {
        pub fn seen_names(&self) -> Vec<String> {
            self.seen.lock().unwrap().iter().map(|(n, _)| n.clone()).collect()
        }
    }

    impl Converter for ScriptedConverter {
        async fn convert(
            &self,
            input: &Path,
            settings: &ConversionSettings,
        ) -> Result<ConvertedDocument> {
            if let Some(gate) = &self.gate {
                gate.acquire().await.expect("gate closed").forget();
            }
            let name = display_name(input);
            let calls = {
                let mut seen = self.seen.lock().unwrap();
                seen.push((name.clone(), settings.output_format));
                seen.len()
            };
            if let Some((after, flag)) = &self.cancel_after {
                if calls >= *after {
                    flag.cancel();
                }
            }
            if self.fail_on.contains(&name) {
                return Err(DocwerkError::Engine {
                    tool: "docling".into(),
                    file: name,
                    detail: "scripted failure".into(),
                });
            }
            Ok(ConvertedDocument {
                content: format!("# {name}\n\nconverted"),
                format: settings.output_format,
            })
        }
    }

    /// Real input files in a temp dir, queued in order.
    pub(crate) fn queued_inputs(
        names: &[&str],
    ) -> (tempfile::TempDir, SharedQueue, Vec<EntryId>) {
        let dir = tempfile::tempdir().expect("tempdir");
        let queue = FileQueue::shared();
        let mut ids = Vec::new();
        for name in names {
            let path = dir.path().join(name);
            std::fs::write(&path, b"input").expect("write input");
            ids.push(queue.lock().unwrap().add(path).unwrap().expect("new entry"));
        }
        (dir, queue, ids)
    }

    pub(crate) fn settings_for(out: &Path) -> ConversionSettings {
        ConversionSettings {
            output_dir: Some(out.to_path_buf()),
            ..Default::default()
        }
    }

    fn drain(rx: &mut mpsc::UnboundedReceiver<WorkerEvent>) -> Vec<WorkerEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = rx.try_recv() {
            events.push(ev);
        }
        events
    }

    fn log_messages(events: &[WorkerEvent]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Log(line) => Some(line.message.clone()),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_batch() {
        let (_in, queue, ids) = queued_inputs(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
        let out = tempfile::tempdir().unwrap();
        let converter = ScriptedConverter {
            fail_on: vec!["b.pdf".into()],
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = run_batch(
            &converter,
            &queue,
            &ids,
            settings_for(out.path()),
            5000,
            &tx,
            &CancelFlag::new(),
        )
        .await
        .expect("run");

        assert_eq!((result.total, result.succeeded, result.failed), (4, 3, 1));
        assert!(!result.cancelled);
        assert_eq!(converter.seen_names(), vec!["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);

        let q = queue.lock().unwrap();
        let statuses: Vec<EntryStatus> = q.entries().iter().map(|e| e.status).collect();
        assert_eq!(
            statuses,
            vec![
                EntryStatus::Success,
                EntryStatus::Error,
                EntryStatus::Success,
                EntryStatus::Success
            ]
        );
        assert!(q.entries()[1].error.as_deref().unwrap().contains("scripted failure"));
        assert!(out.path().join("a.md").is_file());
        assert!(!out.path().join("b.md").exists());

        let events = drain(&mut rx);
        let logs = log_messages(&events);
        assert_eq!(logs[0], "=== Conversion Configuration ===");
        assert!(logs.iter().any(|l| l.starts_with("  ERROR: ")));
        assert!(logs.contains(&"Successful: 3".to_string()));
        assert!(logs.contains(&"Failed: 1".to_string()));
        let progress: Vec<f32> = events
            .iter()
            .filter_map(|e| match e {
                WorkerEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(progress, vec![25.0, 50.0, 75.0, 100.0]);
        assert!(matches!(events.last(), Some(WorkerEvent::Finished(r)) if r.failed == 1));
    }

    #[tokio::test]
    async fn missing_output_dir_rejects_before_any_entry_changes() {
        let (_in, queue, ids) = queued_inputs(&["a.pdf", "b.pdf"]);
        let converter = ScriptedConverter::default();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let err = run_batch(
            &converter,
            &queue,
            &ids,
            ConversionSettings::default(),
            100,
            &tx,
            &CancelFlag::new(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, DocwerkError::NoOutputDirectory));
        assert!(converter.seen_names().is_empty());
        assert!(drain(&mut rx).is_empty());
        let q = queue.lock().unwrap();
        assert!(q.entries().iter().all(|e| e.status == EntryStatus::Pending));
    }

    #[test]
    fn validate_run_checks_directory_and_batch() {
        let out = tempfile::tempdir().unwrap();
        let missing = settings_for(&out.path().join("gone"));
        assert!(matches!(
            validate_run(&missing, &[EntryId::new()]),
            Err(DocwerkError::OutputDirectoryMissing(_))
        ));
        assert!(matches!(
            validate_run(&settings_for(out.path()), &[]),
            Err(DocwerkError::EmptyBatch)
        ));
        assert!(validate_run(&settings_for(out.path()), &[EntryId::new()]).is_ok());
    }

    #[tokio::test]
    async fn cancellation_skips_the_remainder() {
        let (_in, queue, ids) = queued_inputs(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
        let out = tempfile::tempdir().unwrap();
        let cancel = CancelFlag::new();
        let converter = ScriptedConverter {
            cancel_after: Some((2, cancel.clone())),
            ..Default::default()
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = run_batch(&converter, &queue, &ids, settings_for(out.path()), 100, &tx, &cancel)
            .await
            .unwrap();

        // The call that requested cancellation still completes.
        assert_eq!(converter.seen_names(), vec!["a.pdf", "b.pdf"]);
        assert_eq!((result.succeeded, result.skipped), (2, 2));
        assert!(result.cancelled);
        let q = queue.lock().unwrap();
        assert_eq!(q.entries()[2].status, EntryStatus::Pending);
        assert_eq!(q.entries()[3].status, EntryStatus::Pending);
        let logs = log_messages(&drain(&mut rx));
        assert!(logs.contains(&"Conversion cancelled by user".to_string()));
        assert!(logs.contains(&"Skipped (cancelled): 2".to_string()));
    }

    #[tokio::test]
    async fn limit_violation_fails_only_that_file() {
        let (input, queue, ids) = queued_inputs(&["small.docx", "big.docx"]);
        std::fs::write(input.path().join("big.docx"), vec![0u8; 2 * 1024 * 1024]).unwrap();
        let out = tempfile::tempdir().unwrap();
        let converter = ScriptedConverter::default();
        let (tx, _rx) = mpsc::unbounded_channel();
        let settings = ConversionSettings {
            max_file_size_mb: 1,
            ..settings_for(out.path())
        };

        let result = run_batch(&converter, &queue, &ids, settings, 100, &tx, &CancelFlag::new())
            .await
            .unwrap();

        assert_eq!((result.succeeded, result.failed), (1, 1));
        assert_eq!(converter.seen_names(), vec!["small.docx"]);
        let q = queue.lock().unwrap();
        assert!(q.entries()[1].error.as_deref().unwrap().contains("limit exceeded"));
    }

    #[tokio::test]
    async fn preview_is_truncated_and_output_uses_format_extension() {
        let (_in, queue, ids) = queued_inputs(&["report.pdf"]);
        let out = tempfile::tempdir().unwrap();
        let converter = ScriptedConverter::default();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let settings = ConversionSettings {
            output_format: OutputFormat::Html,
            create_subfolder: true,
            ..settings_for(out.path())
        };

        run_batch(&converter, &queue, &ids, settings, 8, &tx, &CancelFlag::new())
            .await
            .unwrap();

        let expected = out.path().join("report").join("report.html");
        assert!(expected.is_file());
        let q = queue.lock().unwrap();
        assert_eq!(q.entries()[0].output.as_deref(), Some(expected.as_path()));
        let previews: Vec<String> = drain(&mut rx)
            .into_iter()
            .filter_map(|e| match e {
                WorkerEvent::Preview(p) => Some(p),
                _ => None,
            })
            .collect();
        assert_eq!(previews, vec!["# report".to_string()]);
    }

    #[tokio::test]
    async fn entries_removed_mid_run_are_skipped() {
        let (_in, queue, ids) = queued_inputs(&["a.pdf", "b.pdf"]);
        queue.lock().unwrap().remove(&[ids[1]]);
        let out = tempfile::tempdir().unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = run_batch(
            &ScriptedConverter::default(),
            &queue,
            &ids,
            settings_for(out.path()),
            100,
            &tx,
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!((result.succeeded, result.skipped), (1, 1));
    }

    #[tokio::test]
    async fn removed_and_cancelled_entries_both_count_as_skipped() {
        let (_in, queue, ids) = queued_inputs(&["a.pdf", "b.pdf", "c.pdf", "d.pdf"]);
        queue.lock().unwrap().remove(&[ids[1]]);
        let out = tempfile::tempdir().unwrap();
        let cancel = CancelFlag::new();
        let converter = ScriptedConverter {
            cancel_after: Some((2, cancel.clone())),
            ..Default::default()
        };
        let (tx, _rx) = mpsc::unbounded_channel();

        let result = run_batch(&converter, &queue, &ids, settings_for(out.path()), 100, &tx, &cancel)
            .await
            .unwrap();

        assert_eq!(converter.seen_names(), vec!["a.pdf", "c.pdf"]);
        assert!(result.cancelled);
        assert_eq!((result.succeeded, result.failed, result.skipped), (2, 0, 2));
        assert_eq!(result.succeeded + result.failed + result.skipped, result.total);
    }
}
