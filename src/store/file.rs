//! JSON-file-backed slot store.
//!
//! The store document lives at `.slotline/slots.json`. A whole document is
//! loaded into a [`MemoryStore`], mutated in memory, and committed back with
//! one atomic write. Command handlers only call [`FileStore::commit`] after a
//! mutation has fully succeeded, which gives each mutation all-or-nothing
//! semantics: a failure anywhere in the cascade leaves the on-disk state
//! exactly as it was.

use super::{MemoryStore, SlotDraft, SlotStore};
use crate::error::{Result, SlotlineError};
use crate::fs::atomic_write_file;
use crate::slot::{ScheduleSlot, SlotId};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// On-disk shape of `slots.json`.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    /// Next id to assign; persisted so deleted ids are never reused.
    #[serde(default)]
    next_id: SlotId,

    #[serde(default)]
    slots: Vec<ScheduleSlot>,
}

/// Slot store persisted as a JSON document.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
}

impl FileStore {
    /// Load the store from `path`.
    ///
    /// The file must exist (created by `slotline init`); a missing or
    /// unparsable file is a storage error, not an empty store, so a typo in
    /// the workspace path cannot silently fork the data.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            SlotlineError::StorageError(format!(
                "failed to read slot store '{}': {}",
                path.display(),
                e
            ))
        })?;
        let doc: StoreDocument = serde_json::from_str(&content).map_err(|e| {
            SlotlineError::StorageError(format!(
                "failed to parse slot store '{}': {}",
                path.display(),
                e
            ))
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_parts(doc.next_id, doc.slots),
        })
    }

    /// Create an empty store file at `path` (used by `init`).
    ///
    /// Refuses to overwrite an existing store.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            return Err(SlotlineError::UserError(format!(
                "slot store already exists: {}",
                path.display()
            )));
        }
        let store = Self {
            path: path.to_path_buf(),
            inner: MemoryStore::new(),
        };
        store.commit()?;
        Ok(store)
    }

    /// Persist the current working set with an atomic write.
    pub fn commit(&self) -> Result<()> {
        let doc = StoreDocument {
            next_id: self.inner.next_id(),
            slots: self.inner.all_slots(),
        };
        let content = serde_json::to_string_pretty(&doc).map_err(|e| {
            SlotlineError::StorageError(format!("failed to serialize slot store: {}", e))
        })?;
        atomic_write_file(&self.path, &content)
    }
}

impl SlotStore for FileStore {
    fn get(&self, id: SlotId) -> Result<ScheduleSlot> {
        self.inner.get(id)
    }

    fn insert(&mut self, draft: SlotDraft) -> Result<ScheduleSlot> {
        self.inner.insert(draft)
    }

    fn update(&mut self, slot: &ScheduleSlot) -> Result<()> {
        self.inner.update(slot)
    }

    fn remove(&mut self, id: SlotId) -> Result<ScheduleSlot> {
        self.inner.remove(id)
    }

    fn slots_for_task(&self, task_id: &str) -> Vec<ScheduleSlot> {
        self.inner.slots_for_task(task_id)
    }

    fn all_slots(&self) -> Vec<ScheduleSlot> {
        self.inner.all_slots()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::DayDate;
    use tempfile::TempDir;

    fn d(y: i32, m: u32, day: u32) -> DayDate {
        DayDate::from_ymd(y, m, day).unwrap()
    }

    fn draft(task: &str, start: DayDate, end: DayDate) -> SlotDraft {
        SlotDraft {
            task: Some(task.to_string()),
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        }
    }

    #[test]
    fn create_then_reload_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");

        let mut store = FileStore::create(&path).unwrap();
        let mut slot = store
            .insert(draft("T-1", d(2023, 4, 4), d(2023, 4, 8)))
            .unwrap();
        slot.set_day_numbers(42, 38);
        store.update(&slot).unwrap();
        store.commit().unwrap();

        let reloaded = FileStore::load(&path).unwrap();
        let slots = reloaded.slots_for_task("T-1");
        assert_eq!(slots.len(), 1);
        assert_eq!(slots[0].first_day_number, Some(42));
        assert_eq!(slots[0].last_day_number, Some(38));
    }

    #[test]
    fn reloaded_store_does_not_reuse_deleted_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");

        let mut store = FileStore::create(&path).unwrap();
        let slot = store
            .insert(draft("T-1", d(2023, 4, 4), d(2023, 4, 8)))
            .unwrap();
        store.remove(slot.id).unwrap();
        store.commit().unwrap();

        let mut reloaded = FileStore::load(&path).unwrap();
        let fresh = reloaded
            .insert(draft("T-1", d(2023, 4, 10), d(2023, 4, 12)))
            .unwrap();
        assert!(fresh.id > slot.id);
    }

    #[test]
    fn create_refuses_to_overwrite() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");
        FileStore::create(&path).unwrap();
        assert!(matches!(
            FileStore::create(&path),
            Err(SlotlineError::UserError(_))
        ));
    }

    #[test]
    fn load_missing_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(matches!(
            FileStore::load(temp_dir.path().join("absent.json")),
            Err(SlotlineError::StorageError(_))
        ));
    }

    #[test]
    fn load_corrupt_file_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            FileStore::load(&path),
            Err(SlotlineError::StorageError(_))
        ));
    }

    #[test]
    fn uncommitted_mutations_do_not_touch_disk() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("slots.json");

        let mut store = FileStore::create(&path).unwrap();
        store
            .insert(draft("T-1", d(2023, 4, 4), d(2023, 4, 8)))
            .unwrap();
        // No commit: on-disk document still empty.
        let reloaded = FileStore::load(&path).unwrap();
        assert!(reloaded.all_slots().is_empty());
    }
}
