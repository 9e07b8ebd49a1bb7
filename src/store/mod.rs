//! Persistence abstraction over schedule slot records.
//!
//! The countdown engine needs exactly three query shapes: fetch one slot by
//! id, fetch all slots of a task ordered by start date, and write slots back.
//! [`SlotStore`] captures that surface; [`MemoryStore`] backs engine tests
//! and [`FileStore`] persists the same working set as a JSON document with an
//! atomic write.
//!
//! Ordering contract: `slots_for_task` returns slots ascending by
//! `(start_date, id)`. Slots sharing a start date are ordered by id, so the
//! lower id is treated as the earlier slot everywhere in the engine; the
//! ordering must be stable or cascades would reassign day numbers
//! nondeterministically.
//!
//! Task data is read through the separate [`TaskDirectory`] trait because
//! tasks are collaborator state maintained upstream, not something this
//! tool owns.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::date::DayDate;
use crate::error::{Result, SlotlineError};
use crate::slot::{ScheduleSlot, SlotId, TaskSnapshot};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A slot record as submitted for insertion, before the store assigns an id.
#[derive(Debug, Clone, Default)]
pub struct SlotDraft {
    pub task: Option<String>,
    pub user: Option<String>,
    pub start_date: Option<DayDate>,
    pub end_date: Option<DayDate>,
    pub notes: Option<String>,
    pub first_day_number: Option<i64>,
    pub last_day_number: Option<i64>,
    pub hours_per_day: Option<f64>,
}

impl SlotDraft {
    /// Materialize the draft into a slot with the given id.
    ///
    /// Callers are expected to have validated the date range already; a
    /// draft without dates is a programming error surfaced as `UserError`.
    pub fn into_slot(self, id: SlotId) -> Result<ScheduleSlot> {
        let start_date = self
            .start_date
            .ok_or_else(|| SlotlineError::UserError("slot draft missing start date".to_string()))?;
        let end_date = self
            .end_date
            .ok_or_else(|| SlotlineError::UserError("slot draft missing end date".to_string()))?;
        Ok(ScheduleSlot {
            id,
            task: self.task,
            user: self.user,
            start_date,
            end_date,
            notes: self.notes,
            first_day_number: self.first_day_number,
            last_day_number: self.last_day_number,
            hours_per_day: self.hours_per_day,
        })
    }
}

/// Persistence surface required by the countdown engine.
pub trait SlotStore {
    /// Fetch a slot by id.
    fn get(&self, id: SlotId) -> Result<ScheduleSlot>;

    /// Insert a new slot, assigning it a fresh id.
    fn insert(&mut self, draft: SlotDraft) -> Result<ScheduleSlot>;

    /// Overwrite an existing slot record.
    fn update(&mut self, slot: &ScheduleSlot) -> Result<()>;

    /// Delete a slot, returning the removed record.
    fn remove(&mut self, id: SlotId) -> Result<ScheduleSlot>;

    /// All slots of the given task, ascending by `(start_date, id)`.
    fn slots_for_task(&self, task_id: &str) -> Vec<ScheduleSlot>;

    /// Every slot in the store, ascending by `(start_date, id)`.
    fn all_slots(&self) -> Vec<ScheduleSlot>;
}

/// Read-only task lookup (external collaborator surface).
pub trait TaskDirectory {
    /// Fetch the snapshot for a task id, or `NotFound`.
    fn task(&self, id: &str) -> Result<TaskSnapshot>;
}

/// On-disk shape of the task collaborator file (`tasks.yaml`).
#[derive(Debug, Default, Serialize, Deserialize)]
struct TaskTableFile {
    #[serde(default)]
    tasks: Vec<TaskSnapshot>,
}

/// In-memory task directory, loadable from `tasks.yaml`.
#[derive(Debug, Default, Clone)]
pub struct TaskTable {
    tasks: BTreeMap<String, TaskSnapshot>,
}

impl TaskTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the task table from a YAML file.
    ///
    /// A missing file is not an error: tasks are maintained by hand (or by an
    /// external sync) and an empty table simply means no task-owned slots can
    /// be scheduled yet.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            SlotlineError::StorageError(format!(
                "failed to read task file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let file: TaskTableFile = serde_yaml::from_str(&content).map_err(|e| {
            SlotlineError::StorageError(format!(
                "failed to parse task file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let mut table = Self::new();
        for task in file.tasks {
            table.upsert(task);
        }
        Ok(table)
    }

    /// Insert or replace a task snapshot.
    pub fn upsert(&mut self, task: TaskSnapshot) {
        self.tasks.insert(task.id.clone(), task);
    }
}

impl TaskDirectory for TaskTable {
    fn task(&self, id: &str) -> Result<TaskSnapshot> {
        self.tasks
            .get(id)
            .cloned()
            .ok_or_else(|| SlotlineError::NotFound(format!("task '{}'", id)))
    }
}
