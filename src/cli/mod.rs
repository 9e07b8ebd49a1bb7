//! CLI argument parsing for slotline.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use clap::{Parser, Subcommand};

/// Slotline: schedule slot countdown tracker.
///
/// Schedule state is expressed as files inside a `.slotline/` directory:
/// - `slots.json` holds the schedule slots and their countdown day numbers
/// - `tasks.yaml` holds the task snapshots the countdowns derive from
/// - every mutation recomputes the affected task's countdown chain
#[derive(Parser, Debug)]
#[command(name = "slotline")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for slotline.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a slotline workspace in the current directory.
    ///
    /// Creates the `.slotline/` state directory with an empty slot store,
    /// a config template, a tasks file template, and the locks and events
    /// directories.
    Init,

    /// Add a schedule slot.
    ///
    /// Dates are epoch-millisecond timestamps; any time-of-day component
    /// is truncated to the day. The slot's countdown numbers are computed
    /// and sibling slots of the same task are shifted to match.
    Add(AddArgs),

    /// Rewrite an existing slot.
    ///
    /// Dates are DD/MM/YYYY strings. Recomputes the slot's countdown and
    /// ripples the change through its task's timeline; moving the slot to
    /// a different task reflows both timelines.
    Update(UpdateArgs),

    /// Remove a slot.
    ///
    /// Deletes the slot and closes the countdown gap it leaves in its
    /// task's timeline.
    Remove(RemoveArgs),

    /// Show slots, ordered by start date.
    ///
    /// With a task ID, shows only that task's slots plus its remaining
    /// effort; without, shows the whole store.
    Show(ShowArgs),

    /// Recompute countdown numbers across the whole store.
    ///
    /// For each task, re-anchors the most recent slot and re-runs both
    /// cascades. Idempotent; useful after editing tasks.yaml by hand.
    Refresh,

    /// Lock management commands.
    ///
    /// List or clear store and task locks.
    Lock(LockCommand),
}

/// Arguments for the `add` command.
#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Start of the slot as epoch milliseconds (UTC).
    pub start_ms: i64,

    /// End of the slot as epoch milliseconds (UTC, inclusive).
    pub end_ms: i64,

    /// Task ID this slot works on. Omit for leave/lieu markers.
    #[arg(short, long)]
    pub task: Option<String>,

    /// Person assigned to the slot.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Free-text notes.
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Working hours per day for this slot, overriding the task and
    /// workspace defaults.
    #[arg(long)]
    pub hours_per_day: Option<f64>,
}

/// Arguments for the `update` command.
#[derive(Parser, Debug)]
pub struct UpdateArgs {
    /// ID of the slot to rewrite.
    pub slot_id: u64,

    /// New start date as DD/MM/YYYY.
    pub start: String,

    /// New end date as DD/MM/YYYY (inclusive).
    pub end: String,

    /// Task ID this slot works on. Omit to detach the slot from any task.
    #[arg(short, long)]
    pub task: Option<String>,

    /// Person assigned to the slot.
    #[arg(short, long)]
    pub user: Option<String>,

    /// Free-text notes.
    #[arg(short, long)]
    pub notes: Option<String>,

    /// Working hours per day for this slot, overriding the task and
    /// workspace defaults.
    #[arg(long)]
    pub hours_per_day: Option<f64>,
}

/// Arguments for the `remove` command.
#[derive(Parser, Debug)]
pub struct RemoveArgs {
    /// ID of the slot to remove.
    pub slot_id: u64,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Task ID to show. If omitted, shows all slots.
    pub task_id: Option<String>,
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// List all active locks.
    ///
    /// Shows store and task locks with their age and owner.
    List,

    /// Clear a specific lock.
    ///
    /// Requires --force flag to prevent accidental clearing.
    Clear(LockClearArgs),
}

/// Arguments for the `lock clear` command.
#[derive(Parser, Debug)]
pub struct LockClearArgs {
    /// Task ID whose lock should be cleared, or "store" for the store lock.
    pub lock_id: String,

    /// Force clearing the lock (required for safety).
    #[arg(long)]
    pub force: bool,
}
