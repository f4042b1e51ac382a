// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Central service layer — owns the file queue, the run controller and the
// persisted config, and provides the calls the Dioxus pages make.
//
// The queue is shared with the worker task as `Arc<Mutex<>>`. Every lock is
// held only for a snapshot or a single mutation, never across an await.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use docwerk_convert::{DoclingCli, EngineAvailability, FileInfo, file_info, probe_availability};
use docwerk_core::AppConfig;
use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::settings::ConversionSettings;
use docwerk_core::types::{EntryId, QueueEntry};
use docwerk_queue::{
    AddReport, CancelFlag, FileQueue, RunController, RunHandle, SharedQueue, StatusCounts,
    validate_run,
};
use tracing::{info, warn};

use super::data_dir;

/// Shared application services accessible from all Dioxus components via
/// `use_context::<AppServices>()`.
///
/// All fields are Arc-wrapped so the struct can be moved into closures and
/// async blocks freely.
#[derive(Clone)]
pub struct AppServices {
    queue: SharedQueue,
    controller: RunController,
    cancel: Arc<Mutex<Option<CancelFlag>>>,
    data_dir: PathBuf,
    config: Arc<Mutex<AppConfig>>,
}

impl AppServices {
    /// Initialise all services. Call once at app startup.
    pub fn init() -> Self {
        Self::with_data_dir(data_dir::data_dir())
    }

    /// Services rooted at an explicit data directory.
    pub fn with_data_dir(dir: PathBuf) -> Self {
        info!(path = %dir.display(), "initialising app services");
        let config = AppConfig::load(&dir).unwrap_or_default();
        Self {
            queue: FileQueue::shared(),
            controller: RunController::new(),
            cancel: Arc::new(Mutex::new(None)),
            data_dir: dir,
            config: Arc::new(Mutex::new(config)),
        }
    }

    // -- File queue ----------------------------------------------------------

    /// Snapshot of every entry in submission order.
    pub fn entries(&self) -> Vec<QueueEntry> {
        self.lock_queue().entries().to_vec()
    }

    pub fn counts(&self) -> StatusCounts {
        self.lock_queue().counts()
    }

    pub fn all_ids(&self) -> Vec<EntryId> {
        self.lock_queue().ids()
    }

    pub fn add_paths(&self, paths: Vec<PathBuf>) -> AddReport {
        let report = self.lock_queue().add_paths(paths);
        for path in &report.unsupported {
            warn!(path = %path.display(), "unsupported file type");
        }
        report
    }

    pub fn add_folder(&self, dir: &Path) -> Result<usize> {
        self.lock_queue().add_folder(dir)
    }

    pub fn remove(&self, ids: &[EntryId]) -> usize {
        self.lock_queue().remove(ids)
    }

    pub fn clear(&self) {
        self.lock_queue().clear();
    }

    /// Size, type and dimensions of a queued file.
    pub fn file_info(&self, id: &EntryId) -> Option<Result<FileInfo>> {
        let path = self.lock_queue().get(id).map(|e| e.path.clone())?;
        Some(file_info(&path))
    }

    /// Open the folder holding a queued file in the system file manager.
    pub fn open_containing_folder(&self, id: &EntryId) -> Option<Result<PathBuf>> {
        let path = self.lock_queue().get(id).map(|e| e.path.clone())?;
        let dir = containing_folder(&path);
        info!(path = %dir.display(), "opening folder");
        Some(
            opener::open(&dir)
                .map(|()| dir)
                .map_err(|e| DocwerkError::Io(std::io::Error::other(e))),
        )
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, FileQueue> {
        self.queue.lock().expect("queue lock poisoned")
    }

    // -- Conversion runs -----------------------------------------------------

    /// Start converting `ids` with a snapshot of `settings`.
    ///
    /// Pre-flight failures (no output folder, nothing selected, engine
    /// missing, run already active) are returned before any entry changes.
    pub fn start_run(&self, ids: Vec<EntryId>, settings: &ConversionSettings) -> Result<RunHandle> {
        let snapshot = settings.clone();
        validate_run(&snapshot, &ids)?;
        let config = self.config();
        let engine = DoclingCli::locate(&config)?;
        let handle = self.controller.start(
            Arc::new(engine),
            Arc::clone(&self.queue),
            ids,
            snapshot,
            config.preview_chars,
        )?;
        *self.cancel.lock().expect("cancel lock poisoned") = Some(handle.cancel.clone());
        Ok(handle)
    }

    /// Ask the active run to stop after the current file.
    pub fn cancel_run(&self) {
        if let Some(flag) = self.cancel.lock().expect("cancel lock poisoned").as_ref() {
            info!("cancellation requested");
            flag.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    // -- Engine availability -------------------------------------------------

    pub async fn probe(&self) -> EngineAvailability {
        let config = self.config();
        probe_availability(&config).await
    }

    // -- Config persistence --------------------------------------------------

    /// Get a clone of the current config.
    pub fn config(&self) -> AppConfig {
        self.config.lock().expect("config lock poisoned").clone()
    }

    /// Update and persist the config.
    pub fn save_config(&self, config: &AppConfig) -> Result<()> {
        *self.config.lock().expect("config lock poisoned") = config.clone();
        config.save(&self.data_dir)
    }

    /// Path to the data directory.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

fn containing_folder(path: &Path) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn services() -> (tempfile::TempDir, AppServices) {
        let dir = tempfile::tempdir().expect("tempdir");
        let svc = AppServices::with_data_dir(dir.path().to_path_buf());
        (dir, svc)
    }

    #[test]
    fn config_is_persisted_and_reloaded() {
        let (dir, svc) = services();
        let mut config = svc.config();
        config.preview_chars = 42;
        svc.save_config(&config).expect("save");

        let reloaded = AppServices::with_data_dir(dir.path().to_path_buf());
        assert_eq!(reloaded.config().preview_chars, 42);
    }

    #[test]
    fn queue_calls_round_through_the_shared_queue() {
        let (_dir, svc) = services();
        let report = svc.add_paths(vec![
            PathBuf::from("/in/a.pdf"),
            PathBuf::from("/in/a.pdf"),
            PathBuf::from("/in/b.xyz"),
        ]);
        assert_eq!(report.added.len(), 1);
        assert_eq!(svc.entries().len(), 1);
        assert_eq!(svc.counts().pending, 1);
        assert_eq!(svc.counts().total(), 1);

        assert_eq!(svc.remove(&report.added), 1);
        assert!(svc.all_ids().is_empty());
    }

    #[test]
    fn file_info_reads_queued_file() {
        let (dir, svc) = services();
        let path = dir.path().join("notes.html");
        std::fs::write(&path, "# hi").unwrap();
        let id = svc.add_paths(vec![path]).added[0];
        let info = svc.file_info(&id).expect("entry").expect("info");
        assert_eq!(info.size_bytes, 4);
        assert!(svc.file_info(&EntryId::new()).is_none());
    }

    #[test]
    fn start_without_output_dir_is_rejected_before_engine_lookup() {
        let (dir, svc) = services();
        let path = dir.path().join("a.pdf");
        std::fs::write(&path, b"x").unwrap();
        let ids = svc.add_paths(vec![path]).added;

        let err = svc.start_run(ids, &ConversionSettings::default()).err();
        assert!(matches!(err, Some(DocwerkError::NoOutputDirectory)));
        assert!(!svc.is_running());
    }

    #[test]
    fn dropped_folder_is_expanded_into_the_queue() {
        let (dir, svc) = services();
        let dropped = dir.path().join("dropped");
        std::fs::create_dir_all(dropped.join("nested")).unwrap();
        std::fs::write(dropped.join("a.pdf"), b"x").unwrap();
        std::fs::write(dropped.join("nested").join("b.docx"), b"x").unwrap();
        std::fs::write(dropped.join("notes.xyz"), b"x").unwrap();
        let loose = dir.path().join("c.html");
        std::fs::write(&loose, b"x").unwrap();

        let report = svc.add_paths(vec![dropped, loose]);
        assert_eq!(report.added.len(), 3);
        let names: Vec<String> = svc.entries().iter().map(|e| e.file_name()).collect();
        assert!(names.contains(&"b.docx".to_string()));
        assert!(!names.contains(&"notes.xyz".to_string()));
    }

    #[test]
    fn containing_folder_of_a_queued_file() {
        assert_eq!(containing_folder(Path::new("/in/docs/a.pdf")), PathBuf::from("/in/docs"));
        assert_eq!(containing_folder(Path::new("a.pdf")), PathBuf::from("."));
        let (_dir, svc) = services();
        assert!(svc.open_containing_folder(&EntryId::new()).is_none());
    }
}
