//! Mutation orchestration for schedule slots.
//!
//! `MutationService` is the single write path for slots: it validates the
//! request, computes the anchor day numbers via the calculator, persists the
//! slot, and runs the forward/backward cascades so every sibling stays
//! consistent. Callers receive the full set of mutated slots so they can
//! report what else changed.
//!
//! All writes go through the borrowed store's in-memory working set; file
//! commit is the caller's final step, which is what makes each mutation
//! all-or-nothing on disk.

use crate::countdown::{propagate_backward, propagate_forward, remaining_task_days};
use crate::date::{DayDate, span_days};
use crate::error::{Result, SlotlineError};
use crate::slot::{ScheduleSlot, SlotId, TaskSnapshot};
use crate::store::{SlotDraft, SlotStore, TaskDirectory};

/// Signal fired after a mutation has been applied.
///
/// Deployments that cache schedule listings need a flush after every write;
/// that side effect is an explicit hook here so callers can plug in whatever
/// cache layer they have.
pub trait InvalidationHook {
    /// Called once per successful mutation.
    fn schedule_changed(&self);
}

/// Hook that does nothing; the default.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopHook;

impl InvalidationHook for NoopHook {
    fn schedule_changed(&self) {}
}

/// Requested field values for a slot add or update.
#[derive(Debug, Clone)]
pub struct SlotChange {
    pub task: Option<String>,
    pub user: Option<String>,
    pub start_date: DayDate,
    pub end_date: DayDate,
    pub notes: Option<String>,
    pub hours_per_day: Option<f64>,
}

/// The slots affected by one mutation.
#[derive(Debug, Clone)]
pub struct MutationOutcome {
    /// The created or updated slot itself; `None` for a removal.
    pub slot: Option<ScheduleSlot>,

    /// Sibling slots rewritten by the cascades, ascending by start date.
    pub updated: Vec<ScheduleSlot>,

    /// Whether a slot was removed.
    pub removed: bool,
}

/// Orchestrates add/update/remove of schedule slots.
pub struct MutationService<'a, S: SlotStore, D: TaskDirectory> {
    store: &'a mut S,
    tasks: &'a D,
    default_hours_per_day: f64,
    hook: &'a dyn InvalidationHook,
}

impl<'a, S: SlotStore, D: TaskDirectory> MutationService<'a, S, D> {
    pub fn new(store: &'a mut S, tasks: &'a D, default_hours_per_day: f64) -> Self {
        Self {
            store,
            tasks,
            default_hours_per_day,
            hook: &NoopHook,
        }
    }

    /// Replace the post-mutation invalidation hook.
    pub fn with_hook(mut self, hook: &'a dyn InvalidationHook) -> Self {
        self.hook = hook;
        self
    }

    /// Create a slot and ripple the countdown through its siblings.
    pub fn add(&mut self, change: SlotChange) -> Result<MutationOutcome> {
        validate_range(&change)?;

        // Resolve the task before any state change so a bad id aborts clean.
        let task = match &change.task {
            Some(id) => Some(self.tasks.task(id)?),
            None => None,
        };

        let span = span_days(change.start_date, change.end_date);
        let mut draft = SlotDraft {
            task: change.task.clone(),
            user: change.user.clone(),
            start_date: Some(change.start_date),
            end_date: Some(change.end_date),
            notes: change.notes.clone(),
            first_day_number: None,
            last_day_number: None,
            hours_per_day: change.hours_per_day,
        };

        let outcome = match task {
            None => {
                // Leave/lieu marker: persisted, never numbered.
                let slot = self.store.insert(draft)?;
                MutationOutcome {
                    slot: Some(slot),
                    updated: Vec::new(),
                    removed: false,
                }
            }
            Some(task) => {
                let hours = self.resolve_hours(change.hours_per_day, &task)?;
                let remaining = remaining_task_days(
                    self.store,
                    &task,
                    hours,
                    change.start_date,
                    Some(change.end_date),
                    None,
                );
                draft.first_day_number = Some(remaining);
                draft.last_day_number = Some(remaining - span);
                let slot = self.store.insert(draft)?;
                let touched =
                    self.ripple(&task, slot.id, change.start_date, remaining, remaining - span)?;
                MutationOutcome {
                    slot: Some(self.store.get(slot.id)?),
                    updated: self.collect(touched)?,
                    removed: false,
                }
            }
        };

        self.hook.schedule_changed();
        Ok(outcome)
    }

    /// Rewrite a slot and ripple the countdown through both affected
    /// timelines.
    ///
    /// When the slot moves to a different task, the old task's slots are
    /// reflowed exactly as if the slot had been removed, then the new task
    /// gets the add-style pass.
    pub fn update(&mut self, id: SlotId, change: SlotChange) -> Result<MutationOutcome> {
        validate_range(&change)?;
        let existing = self.store.get(id)?;

        let new_task = match &change.task {
            Some(task_id) => Some(self.tasks.task(task_id)?),
            None => None,
        };
        let old_task = match &existing.task {
            Some(task_id) if existing.task != change.task => Some(self.tasks.task(task_id)?),
            _ => None,
        };
        let old_start = existing.start_date;

        let mut slot = existing;
        slot.task = change.task.clone();
        slot.user = change.user.clone();
        slot.start_date = change.start_date;
        slot.end_date = change.end_date;
        slot.notes = change.notes.clone();
        slot.hours_per_day = change.hours_per_day;

        let mut touched: Vec<SlotId> = Vec::new();
        match &new_task {
            None => {
                slot.first_day_number = None;
                slot.last_day_number = None;
                self.store.update(&slot)?;
            }
            Some(task) => {
                let hours = self.resolve_hours(change.hours_per_day, task)?;
                let remaining = remaining_task_days(
                    self.store,
                    task,
                    hours,
                    change.start_date,
                    Some(change.end_date),
                    Some(id),
                );
                slot.set_day_numbers(remaining, remaining - slot.span_days());
                self.store.update(&slot)?;
                touched.extend(self.ripple(
                    task,
                    id,
                    change.start_date,
                    remaining,
                    remaining - slot.span_days(),
                )?);
            }
        }

        if let Some(task) = &old_task {
            // The slot left this timeline; close the gap it vacated.
            let hours = self.resolve_hours(None, task)?;
            touched.extend(self.reflow_after_removal(task, hours, old_start, &[id])?);
        }

        let outcome = MutationOutcome {
            slot: Some(self.store.get(id)?),
            updated: self.collect(touched)?,
            removed: false,
        };
        self.hook.schedule_changed();
        Ok(outcome)
    }

    /// Delete a slot and close the countdown gap it leaves behind.
    pub fn remove(&mut self, id: SlotId) -> Result<MutationOutcome> {
        let slot = self.store.get(id)?;

        // Resolve the task and its rate before deleting so a stale task
        // reference or bad divisor aborts with no state change.
        let task = match &slot.task {
            Some(task_id) => {
                let task = self.tasks.task(task_id)?;
                let hours = self.resolve_hours(slot.hours_per_day, &task)?;
                Some((task, hours))
            }
            None => None,
        };

        self.store.remove(id)?;

        let mut touched: Vec<SlotId> = Vec::new();
        if let Some((task, hours)) = &task {
            touched.extend(self.reflow_after_removal(task, *hours, slot.start_date, &[])?);
        }

        let outcome = MutationOutcome {
            slot: None,
            updated: self.collect(touched)?,
            removed: true,
        };
        self.hook.schedule_changed();
        Ok(outcome)
    }

    /// Recompute countdown numbers across the whole store.
    ///
    /// Walks slots newest-start-first and, for the most recent slot of each
    /// task, recomputes its day numbers and re-runs the cascades. Running it
    /// twice is a no-op; its purpose is picking up out-of-band edits to the
    /// task table.
    pub fn refresh_all(&mut self) -> Result<Vec<ScheduleSlot>> {
        let mut refreshed_tasks: Vec<String> = Vec::new();
        let mut touched: Vec<SlotId> = Vec::new();

        for slot in self.store.all_slots().into_iter().rev() {
            let Some(task_id) = slot.task.clone() else {
                continue;
            };
            if refreshed_tasks.contains(&task_id) {
                continue;
            }
            refreshed_tasks.push(task_id.clone());

            let task = self.tasks.task(&task_id)?;
            let hours = self.resolve_hours(slot.hours_per_day, &task)?;
            let remaining = remaining_task_days(
                self.store,
                &task,
                hours,
                slot.start_date,
                Some(slot.end_date),
                Some(slot.id),
            );
            let mut latest = slot;
            latest.set_day_numbers(remaining, remaining - latest.span_days());
            self.store.update(&latest)?;
            touched.push(latest.id);
            touched.extend(self.ripple(
                &task,
                latest.id,
                latest.start_date,
                remaining,
                remaining - latest.span_days(),
            )?);
        }

        let out = self.collect(touched)?;
        if !out.is_empty() {
            self.hook.schedule_changed();
        }
        Ok(out)
    }

    /// Cascade out from a freshly numbered anchor slot: forward always,
    /// backward only when the anchor starts before the task's progress
    /// marker.
    fn ripple(
        &mut self,
        task: &TaskSnapshot,
        anchor: SlotId,
        start: DayDate,
        first_day_number: i64,
        last_day_number: i64,
    ) -> Result<Vec<SlotId>> {
        let mut touched =
            propagate_forward(self.store, &task.id, start, last_day_number, &[anchor])?;
        if start < task.last_update {
            let mut excluded = touched.clone();
            excluded.push(anchor);
            touched.extend(propagate_backward(
                self.store,
                &task.id,
                start,
                first_day_number,
                &excluded,
            )?);
        }
        Ok(touched)
    }

    /// Re-anchor a timeline after a slot left it (removal or task move).
    ///
    /// The countdown value the departed slot's position vacated is
    /// recomputed with no candidate window; forwarding `anchor + 1` lands
    /// the first surviving successor on exactly that value.
    fn reflow_after_removal(
        &mut self,
        task: &TaskSnapshot,
        hours: f64,
        start: DayDate,
        excluded: &[SlotId],
    ) -> Result<Vec<SlotId>> {
        let anchor =
            remaining_task_days(self.store, task, hours, start, None, excluded.first().copied());
        let mut touched = propagate_forward(self.store, &task.id, start, anchor + 1, excluded)?;
        if start <= task.last_update {
            let mut all_excluded = touched.clone();
            all_excluded.extend_from_slice(excluded);
            touched.extend(propagate_backward(
                self.store,
                &task.id,
                start,
                anchor,
                &all_excluded,
            )?);
        }
        Ok(touched)
    }

    /// Pick the countdown divisor: per-slot override, then the task's own
    /// rate, then the workspace default. Whatever wins must be a positive
    /// finite number; a zero or NaN divisor would poison every day number
    /// the cascades touch.
    fn resolve_hours(&self, override_hours: Option<f64>, task: &TaskSnapshot) -> Result<f64> {
        let hours = override_hours
            .or(task.hours_per_day)
            .unwrap_or(self.default_hours_per_day);
        if !hours.is_finite() || hours <= 0.0 {
            return Err(SlotlineError::UserError(format!(
                "hours per day must be greater than 0, got {}",
                hours
            )));
        }
        Ok(hours)
    }

    /// Fetch touched slots back out of the store, ascending by start date.
    fn collect(&self, mut ids: Vec<SlotId>) -> Result<Vec<ScheduleSlot>> {
        ids.sort_unstable();
        ids.dedup();
        let mut slots = Vec::with_capacity(ids.len());
        for id in ids {
            slots.push(self.store.get(id)?);
        }
        slots.sort_by_key(|s| (s.start_date, s.id));
        Ok(slots)
    }
}

fn validate_range(change: &SlotChange) -> Result<()> {
    if change.end_date < change.start_date {
        return Err(SlotlineError::UserError(format!(
            "end date {} is before start date {}",
            change.end_date, change.start_date
        )));
    }
    Ok(())
}
