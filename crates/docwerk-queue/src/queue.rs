// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// In-memory file queue.
//
// Entries keep submission order. Nothing is persisted; the queue lives for
// one session. During a run only the worker changes entry status, the UI
// just takes snapshots for rendering.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use tracing::{debug, info, instrument};
use walkdir::WalkDir;

use docwerk_core::error::{DocwerkError, Result};
use docwerk_core::types::{EntryId, EntryStatus, InputKind, QueueEntry};

/// The queue as shared between UI and worker.
pub type SharedQueue = Arc<Mutex<FileQueue>>;

/// Per-status totals for the file count label.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusCounts {
    pub pending: usize,
    pub processing: usize,
    pub success: usize,
    pub error: usize,
}

impl StatusCounts {
    pub fn total(&self) -> usize {
        self.pending + self.processing + self.success + self.error
    }
}

/// Outcome of adding several paths at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddReport {
    pub added: Vec<EntryId>,
    pub duplicates: usize,
    pub unsupported: Vec<PathBuf>,
}

/// Ordered list of files to convert.
#[derive(Debug, Default)]
pub struct FileQueue {
    entries: Vec<QueueEntry>,
}

impl FileQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedQueue {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Append a file.
    ///
    /// Returns `Ok(None)` if the path is already queued and
    /// `UnsupportedInput` for extensions the engine does not accept.
    pub fn add(&mut self, path: impl Into<PathBuf>) -> Result<Option<EntryId>> {
        let path = path.into();
        if self.contains_path(&path) {
            debug!(path = %path.display(), "already queued");
            return Ok(None);
        }
        let kind = InputKind::from_path(&path)
            .ok_or_else(|| DocwerkError::UnsupportedInput(path.display().to_string()))?;
        let entry = QueueEntry::new(path, kind);
        let id = entry.id;
        self.entries.push(entry);
        Ok(Some(id))
    }

    /// Add several paths; directories are expanded with [`Self::add_folder`].
    pub fn add_paths(&mut self, paths: impl IntoIterator<Item = PathBuf>) -> AddReport {
        let mut report = AddReport::default();
        for path in paths {
            if path.is_dir() {
                report.added.extend(self.folder_ids(&path));
                continue;
            }
            match self.add(path.clone()) {
                Ok(Some(id)) => report.added.push(id),
                Ok(None) => report.duplicates += 1,
                Err(_) => report.unsupported.push(path),
            }
        }
        report
    }

    /// Recursively add every supported file under `dir`, in sorted order.
    /// Returns how many new entries were added.
    #[instrument(skip(self), fields(dir = %dir.display()))]
    pub fn add_folder(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(DocwerkError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("{} is not a directory", dir.display()),
            )));
        }
        let added = self.folder_ids(dir).len();
        info!(added, "folder scanned");
        Ok(added)
    }

    fn folder_ids(&mut self, dir: &Path) -> Vec<EntryId> {
        let files: Vec<PathBuf> = WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| InputKind::from_path(p).is_some())
            .collect();
        files
            .into_iter()
            .filter_map(|p| self.add(p).ok().flatten())
            .collect()
    }

    /// Remove entries by id. Returns how many were removed.
    pub fn remove(&mut self, ids: &[EntryId]) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| !ids.contains(&e.id));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[QueueEntry] {
        &self.entries
    }

    pub fn get(&self, id: &EntryId) -> Option<&QueueEntry> {
        self.entries.iter().find(|e| e.id == *id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All ids in submission order.
    pub fn ids(&self) -> Vec<EntryId> {
        self.entries.iter().map(|e| e.id).collect()
    }

    /// Put entries back to `Pending`, clearing any previous result.
    pub fn reset(&mut self, ids: &[EntryId]) {
        for entry in self.entries.iter_mut().filter(|e| ids.contains(&e.id)) {
            entry.status = EntryStatus::Pending;
            entry.error = None;
            entry.output = None;
            entry.finished_at = None;
        }
    }

    /// Mark an entry as being converted. Returns its path, or `None` if the
    /// entry is gone.
    pub fn set_processing(&mut self, id: &EntryId) -> Option<PathBuf> {
        let entry = self.entry_mut(id)?;
        entry.status = EntryStatus::Processing;
        Some(entry.path.clone())
    }

    pub fn mark_success(&mut self, id: &EntryId, output: PathBuf) -> bool {
        self.finish(id, EntryStatus::Success, Some(output), None)
    }

    pub fn mark_error(&mut self, id: &EntryId, message: impl Into<String>) -> bool {
        self.finish(id, EntryStatus::Error, None, Some(message.into()))
    }

    pub fn counts(&self) -> StatusCounts {
        let mut c = StatusCounts::default();
        for e in &self.entries {
            match e.status {
                EntryStatus::Pending => c.pending += 1,
                EntryStatus::Processing => c.processing += 1,
                EntryStatus::Success => c.success += 1,
                EntryStatus::Error => c.error += 1,
            }
        }
        c
    }

    fn finish(
        &mut self,
        id: &EntryId,
        status: EntryStatus,
        output: Option<PathBuf>,
        error: Option<String>,
    ) -> bool {
        match self.entry_mut(id) {
            Some(entry) => {
                entry.status = status;
                entry.output = output;
                entry.error = error;
                entry.finished_at = Some(Utc::now());
                true
            }
            None => false,
        }
    }

    fn entry_mut(&mut self, id: &EntryId) -> Option<&mut QueueEntry> {
        self.entries.iter_mut().find(|e| e.id == *id)
    }

    fn contains_path(&self, path: &Path) -> bool {
        self.entries.iter().any(|e| e.path == path)
    }
}
