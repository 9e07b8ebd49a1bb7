//! Implementation of the `slotline init` command.
//!
//! Scaffolds the `.slotline/` state directory in the current working
//! directory:
//!
//! 1. Creates `.slotline/` with an empty `slots.json` store
//! 2. Creates a `config.yaml` template (if missing)
//! 3. Creates a `tasks.yaml` template (if missing)
//! 4. Ensures the `locks/` and `events/` directories exist
//! 5. Appends an `init` event to the audit log

use crate::config::Config;
use crate::context::ScheduleContext;
use crate::error::{Result, SlotlineError};
use crate::events::{Event, EventAction, append_event};
use crate::fs::atomic_write_file;
use crate::store::FileStore;
use serde_json::json;
use std::env;
use std::fs;
use std::path::Path;

/// Starter content for `tasks.yaml`.
const TASKS_TEMPLATE: &str = "\
# Task snapshots the countdowns derive from. Maintained by hand or by an
# external sync; slotline only reads this file.
#
# tasks:
#   - id: TASK-001
#     name: engine rebuild
#     expected_effort: 400.0   # hours
#     actual_effort: 100.0     # hours
#     last_update: 2023-01-01  # progress anchor date
#     hours_per_day: 7.0       # optional per-task override
tasks: []
";

/// Execute the `slotline init` command.
///
/// Idempotent: running it again completes any missing pieces without
/// touching existing state.
pub fn cmd_init() -> Result<()> {
    let cwd = env::current_dir().map_err(|e| {
        SlotlineError::UserError(format!("failed to get current working directory: {}", e))
    })?;
    let ctx = ScheduleContext::at_root(&cwd);

    fs::create_dir_all(&ctx.state_dir).map_err(|e| {
        SlotlineError::StorageError(format!(
            "failed to create state directory '{}': {}",
            ctx.state_dir.display(),
            e
        ))
    })?;

    let store_created = if ctx.slots_path().exists() {
        false
    } else {
        FileStore::create(ctx.slots_path())?;
        true
    };

    write_if_missing(&ctx.config_path(), &Config::default().to_yaml()?)?;
    write_if_missing(&ctx.tasks_path(), TASKS_TEMPLATE)?;

    for dir in [ctx.locks_dir(), ctx.events_dir()] {
        fs::create_dir_all(&dir).map_err(|e| {
            SlotlineError::StorageError(format!(
                "failed to create directory '{}': {}",
                dir.display(),
                e
            ))
        })?;
    }

    let config = Config::load(ctx.config_path())?;
    if config.record_events {
        append_event(
            &ctx,
            &Event::new(EventAction::Init).with_details(json!({
                "workspace_root": ctx.workspace_root.display().to_string(),
                "store_created": store_created,
            })),
        )?;
    }

    if store_created {
        println!("Initialized slotline workspace.");
    } else {
        println!("Slotline workspace already initialized; completed missing pieces.");
    }
    println!();
    println!("State directory: {}", ctx.state_dir.display());
    println!("  slots.json   (slot store)");
    println!("  tasks.yaml   (task snapshots, edit by hand)");
    println!("  config.yaml  (workspace settings)");
    println!("  locks/");
    println!("  events/");
    println!();
    println!("Describe your tasks in tasks.yaml, then add slots with `slotline add`.");

    Ok(())
}

/// Write a template file unless it already exists.
fn write_if_missing(path: &Path, content: &str) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    atomic_write_file(path, content)
}
