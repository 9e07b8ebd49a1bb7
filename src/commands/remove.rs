//! Implementation of the `slotline remove` command.

use super::{open_workspace, print_cascade};
use crate::cli::RemoveArgs;
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use crate::locks;
use crate::service::MutationService;
use crate::store::{FileStore, SlotStore, TaskTable};
use serde_json::json;

/// Execute the `slotline remove` command.
pub fn cmd_remove(args: RemoveArgs) -> Result<()> {
    let (ctx, config) = open_workspace()?;

    let _store_lock = locks::acquire_store_lock(&ctx, "remove")?;

    let mut store = FileStore::load(ctx.slots_path())?;
    let tasks = TaskTable::load(ctx.tasks_path())?;

    let existing = store.get(args.slot_id)?;
    let _task_lock = match &existing.task {
        Some(task_id) => Some(locks::acquire_task_lock(&ctx, task_id, "remove")?),
        None => None,
    };

    let outcome = {
        let mut service = MutationService::new(&mut store, &tasks, config.hours_per_day);
        service.remove(args.slot_id)?
    };
    store.commit()?;

    if config.record_events {
        let mut event = Event::new(EventAction::Remove).with_details(json!({
            "slot_id": args.slot_id,
            "start": existing.start_date.to_string(),
            "end": existing.end_date.to_string(),
            "rewrote": outcome.updated.len(),
        }));
        if let Some(task_id) = &existing.task {
            event = event.with_task(task_id);
        }
        append_event(&ctx, &event)?;
    }

    if outcome.removed {
        println!(
            "Removed slot #{} ({} -> {})",
            args.slot_id, existing.start_date, existing.end_date
        );
    }
    print_cascade(&outcome.updated);
    Ok(())
}
