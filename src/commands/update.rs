//! Implementation of the `slotline update` command.

use super::{format_slot, open_workspace, print_cascade};
use crate::cli::UpdateArgs;
use crate::date::DayDate;
use crate::error::{Result, SlotlineError};
use crate::events::{Event, EventAction, append_event};
use crate::locks;
use crate::service::{MutationService, SlotChange};
use crate::store::{FileStore, SlotStore, TaskTable};
use serde_json::json;

/// Execute the `slotline update` command.
///
/// The store lock is taken before the store is read because which task
/// locks apply depends on the slot's current record: moving a slot between
/// tasks locks both timelines.
pub fn cmd_update(args: UpdateArgs) -> Result<()> {
    let (ctx, config) = open_workspace()?;

    let start = DayDate::parse_dmy(&args.start)?;
    let end = DayDate::parse_dmy(&args.end)?;

    let _store_lock = locks::acquire_store_lock(&ctx, "update")?;

    let mut store = FileStore::load(ctx.slots_path())?;
    let tasks = TaskTable::load(ctx.tasks_path())?;

    let existing = store.get(args.slot_id)?;
    let mut affected_tasks: Vec<&String> = existing.task.iter().chain(args.task.iter()).collect();
    affected_tasks.sort();
    affected_tasks.dedup();
    let mut task_locks = Vec::with_capacity(affected_tasks.len());
    for task_id in affected_tasks {
        task_locks.push(locks::acquire_task_lock(&ctx, task_id, "update")?);
    }

    let outcome = {
        let mut service = MutationService::new(&mut store, &tasks, config.hours_per_day);
        service.update(
            args.slot_id,
            SlotChange {
                task: args.task.clone(),
                user: args.user,
                start_date: start,
                end_date: end,
                notes: args.notes,
                hours_per_day: args.hours_per_day,
            },
        )?
    };
    store.commit()?;

    let slot = outcome.slot.as_ref().ok_or_else(|| {
        SlotlineError::StorageError("update produced no slot".to_string())
    })?;

    if config.record_events {
        let mut event = Event::new(EventAction::Update).with_details(json!({
            "slot_id": slot.id,
            "start": slot.start_date.to_string(),
            "end": slot.end_date.to_string(),
            "previous_task": existing.task,
            "rewrote": outcome.updated.len(),
        }));
        if let Some(task_id) = &args.task {
            event = event.with_task(task_id);
        }
        append_event(&ctx, &event)?;
    }

    println!("Updated {}", format_slot(slot));
    print_cascade(&outcome.updated);
    Ok(())
}
