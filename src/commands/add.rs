//! Implementation of the `slotline add` command.

use super::{format_slot, open_workspace, print_cascade};
use crate::cli::AddArgs;
use crate::date::DayDate;
use crate::error::{Result, SlotlineError};
use crate::events::{Event, EventAction, append_event};
use crate::locks;
use crate::service::{MutationService, SlotChange};
use crate::store::{FileStore, TaskTable};
use serde_json::json;

/// Execute the `slotline add` command.
///
/// Holds the store lock across load-mutate-commit, plus the task lock when
/// the slot belongs to a task, so concurrent mutations of the same task
/// serialize instead of racing the countdown chain.
pub fn cmd_add(args: AddArgs) -> Result<()> {
    let (ctx, config) = open_workspace()?;

    let start = DayDate::from_epoch_ms(args.start_ms)?;
    let end = DayDate::from_epoch_ms(args.end_ms)?;

    let _store_lock = locks::acquire_store_lock(&ctx, "add")?;
    let _task_lock = match &args.task {
        Some(task_id) => Some(locks::acquire_task_lock(&ctx, task_id, "add")?),
        None => None,
    };

    let mut store = FileStore::load(ctx.slots_path())?;
    let tasks = TaskTable::load(ctx.tasks_path())?;

    let outcome = {
        let mut service = MutationService::new(&mut store, &tasks, config.hours_per_day);
        service.add(SlotChange {
            task: args.task.clone(),
            user: args.user,
            start_date: start,
            end_date: end,
            notes: args.notes,
            hours_per_day: args.hours_per_day,
        })?
    };
    store.commit()?;

    let slot = outcome
        .slot
        .as_ref()
        .ok_or_else(|| SlotlineError::StorageError("add produced no slot".to_string()))?;

    if config.record_events {
        let mut event = Event::new(EventAction::Add).with_details(json!({
            "slot_id": slot.id,
            "start": slot.start_date.to_string(),
            "end": slot.end_date.to_string(),
            "rewrote": outcome.updated.len(),
        }));
        if let Some(task_id) = &args.task {
            event = event.with_task(task_id);
        }
        append_event(&ctx, &event)?;
    }

    println!("Added {}", format_slot(slot));
    print_cascade(&outcome.updated);
    Ok(())
}
