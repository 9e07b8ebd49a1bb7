//! Implementation of the `slotline show` command.

use super::{format_slot, open_workspace};
use crate::cli::ShowArgs;
use crate::error::Result;
use crate::store::{FileStore, SlotStore, TaskDirectory, TaskTable};

/// Execute the `slotline show` command.
///
/// Read-only: takes no locks and never writes.
pub fn cmd_show(args: ShowArgs) -> Result<()> {
    let (ctx, _config) = open_workspace()?;

    let store = FileStore::load(ctx.slots_path())?;

    match args.task_id {
        Some(task_id) => {
            let tasks = TaskTable::load(ctx.tasks_path())?;
            let task = tasks.task(&task_id)?;

            match &task.name {
                Some(name) => println!("Task {} ({})", task.id, name),
                None => println!("Task {}", task.id),
            }
            println!(
                "  remaining effort: {:.1}h as of {}",
                task.remaining_effort(),
                task.last_update
            );

            let slots = store.slots_for_task(&task_id);
            if slots.is_empty() {
                println!("  no slots scheduled");
                return Ok(());
            }
            for slot in &slots {
                println!("  {}", format_slot(slot));
            }
        }
        None => {
            let slots = store.all_slots();
            if slots.is_empty() {
                println!("No slots scheduled.");
                return Ok(());
            }
            for slot in &slots {
                println!("{}", format_slot(slot));
            }
        }
    }
    Ok(())
}
