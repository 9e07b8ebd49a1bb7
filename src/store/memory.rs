//! In-memory slot store.
//!
//! Backs the engine's unit tests and serves as the working set of the
//! file-backed store. Ids are assigned monotonically and never reused within
//! a store's lifetime, so the same-day tie-break (ascending id) reflects
//! insertion order.

use super::{SlotDraft, SlotStore};
use crate::error::{Result, SlotlineError};
use crate::slot::{ScheduleSlot, SlotId};
use std::collections::BTreeMap;

/// BTreeMap-backed slot store.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    next_id: SlotId,
    slots: BTreeMap<SlotId, ScheduleSlot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            slots: BTreeMap::new(),
        }
    }

    /// Rebuild a store from previously persisted parts.
    ///
    /// `next_id` is bumped past the highest existing id so reloaded stores
    /// can never hand out a duplicate.
    pub fn from_parts(next_id: SlotId, slots: Vec<ScheduleSlot>) -> Self {
        let highest = slots.iter().map(|s| s.id).max().unwrap_or(0);
        Self {
            next_id: next_id.max(highest + 1).max(1),
            slots: slots.into_iter().map(|s| (s.id, s)).collect(),
        }
    }

    /// The id the next insertion will receive.
    pub fn next_id(&self) -> SlotId {
        self.next_id
    }

    fn sorted(&self, mut slots: Vec<ScheduleSlot>) -> Vec<ScheduleSlot> {
        slots.sort_by_key(|s| (s.start_date, s.id));
        slots
    }
}

impl SlotStore for MemoryStore {
    fn get(&self, id: SlotId) -> Result<ScheduleSlot> {
        self.slots
            .get(&id)
            .cloned()
            .ok_or_else(|| SlotlineError::NotFound(format!("slot {}", id)))
    }

    fn insert(&mut self, draft: SlotDraft) -> Result<ScheduleSlot> {
        let id = self.next_id;
        let slot = draft.into_slot(id)?;
        self.next_id += 1;
        self.slots.insert(id, slot.clone());
        Ok(slot)
    }

    fn update(&mut self, slot: &ScheduleSlot) -> Result<()> {
        match self.slots.get_mut(&slot.id) {
            Some(existing) => {
                *existing = slot.clone();
                Ok(())
            }
            None => Err(SlotlineError::NotFound(format!("slot {}", slot.id))),
        }
    }

    fn remove(&mut self, id: SlotId) -> Result<ScheduleSlot> {
        self.slots
            .remove(&id)
            .ok_or_else(|| SlotlineError::NotFound(format!("slot {}", id)))
    }

    fn slots_for_task(&self, task_id: &str) -> Vec<ScheduleSlot> {
        self.sorted(
            self.slots
                .values()
                .filter(|s| s.task.as_deref() == Some(task_id))
                .cloned()
                .collect(),
        )
    }

    fn all_slots(&self) -> Vec<ScheduleSlot> {
        self.sorted(self.slots.values().cloned().collect())
    }
}
