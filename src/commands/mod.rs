//! Command implementations for slotline.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the small shared helpers every handler needs:
//! opening the workspace and formatting slots for terminal output.

mod add;
mod init;
mod refresh;
mod remove;
mod show;
mod update;

use crate::cli::{Command, LockAction, LockClearArgs, LockCommand};
use crate::config::Config;
use crate::context::ScheduleContext;
use crate::error::{Result, SlotlineError};
use crate::events::{Event, EventAction, append_event};
use crate::locks;
use crate::slot::ScheduleSlot;
use serde_json::json;

/// Dispatch a command to its implementation.
///
/// This is the main entry point for command execution. Each command
/// is routed to its handler function.
pub fn dispatch(command: Command) -> Result<()> {
    match command {
        Command::Init => init::cmd_init(),
        Command::Add(args) => add::cmd_add(args),
        Command::Update(args) => update::cmd_update(args),
        Command::Remove(args) => remove::cmd_remove(args),
        Command::Show(args) => show::cmd_show(args),
        Command::Refresh => refresh::cmd_refresh(),
        Command::Lock(lock_cmd) => dispatch_lock(lock_cmd),
    }
}

/// Dispatch lock subcommands.
fn dispatch_lock(lock_cmd: LockCommand) -> Result<()> {
    match lock_cmd.action {
        LockAction::List => cmd_lock_list(),
        LockAction::Clear(args) => cmd_lock_clear(args),
    }
}

/// Resolve and validate the workspace for a command that needs state.
fn open_workspace() -> Result<(ScheduleContext, Config)> {
    let ctx = ScheduleContext::resolve()?;
    ctx.require_initialized()?;
    let config = Config::load(ctx.config_path())?;
    Ok((ctx, config))
}

/// Render one slot as a terminal line.
fn format_slot(slot: &ScheduleSlot) -> String {
    let mut line = format!("#{:<4} {} -> {}", slot.id, slot.start_date, slot.end_date);

    match (slot.first_day_number, slot.last_day_number) {
        (Some(first), Some(last)) => line.push_str(&format!("  [{} .. {}]", first, last)),
        _ => line.push_str("  [unnumbered]"),
    }

    if let Some(task) = &slot.task {
        line.push_str(&format!("  task {}", task));
    }
    if let Some(user) = &slot.user {
        line.push_str(&format!("  user {}", user));
    }
    if let Some(notes) = &slot.notes {
        line.push_str(&format!("  ({})", notes));
    }
    line
}

/// Report sibling slots rewritten by a mutation's cascades.
fn print_cascade(updated: &[ScheduleSlot]) {
    if updated.is_empty() {
        return;
    }
    println!("Rewrote {} sibling slot(s):", updated.len());
    for slot in updated {
        println!("  {}", format_slot(slot));
    }
}

fn cmd_lock_list() -> Result<()> {
    let (ctx, config) = open_workspace()?;

    let locks = locks::list_locks(&ctx, &config)?;
    if locks.is_empty() {
        println!("No active locks.");
        return Ok(());
    }

    println!("Active locks:");
    for lock in &locks {
        let kind = match lock.lock_type {
            locks::LockType::Store => "store",
            locks::LockType::Task => "task",
        };
        println!("  [{}] {}", kind, lock);
    }
    Ok(())
}

fn cmd_lock_clear(args: LockClearArgs) -> Result<()> {
    let (ctx, config) = open_workspace()?;

    if !args.force {
        return Err(SlotlineError::UserError(format!(
            "clearing a lock can corrupt an in-flight mutation; re-run with --force to clear '{}'",
            args.lock_id
        )));
    }

    let info = locks::clear_lock(&ctx, &args.lock_id, &config)?;
    println!("Cleared lock: {}", info);
    println!("  removed {}", info.path.display());

    if config.record_events {
        append_event(
            &ctx,
            &Event::new(EventAction::LockClear).with_details(json!({
                "lock": info.name,
                "owner": info.metadata.owner,
                "was_stale": info.is_stale,
            })),
        )?;
    }
    Ok(())
}
