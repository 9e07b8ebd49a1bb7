//! Implementation of the `slotline refresh` command.

use super::{format_slot, open_workspace};
use crate::error::Result;
use crate::events::{Event, EventAction, append_event};
use crate::locks;
use crate::service::MutationService;
use crate::store::{FileStore, TaskTable};
use serde_json::json;

/// Execute the `slotline refresh` command.
///
/// Recomputes countdown numbers across the whole store, picking up
/// out-of-band edits to tasks.yaml. Only the store lock is taken since
/// every task's timeline may be rewritten.
pub fn cmd_refresh() -> Result<()> {
    let (ctx, config) = open_workspace()?;

    let _store_lock = locks::acquire_store_lock(&ctx, "refresh")?;

    let mut store = FileStore::load(ctx.slots_path())?;
    let tasks = TaskTable::load(ctx.tasks_path())?;

    let updated = {
        let mut service = MutationService::new(&mut store, &tasks, config.hours_per_day);
        service.refresh_all()?
    };
    store.commit()?;

    if config.record_events {
        append_event(
            &ctx,
            &Event::new(EventAction::Refresh).with_details(json!({
                "rewrote": updated.len(),
            })),
        )?;
    }

    if updated.is_empty() {
        println!("Nothing to refresh.");
        return Ok(());
    }
    println!("Refreshed {} slot(s):", updated.len());
    for slot in &updated {
        println!("  {}", format_slot(slot));
    }
    Ok(())
}
