//! Event logging subsystem for slotline.
//!
//! This module implements append-only event logging to support audit/recovery.
//! Events are stored in NDJSON format (one JSON object per line) in
//! `.slotline/events/events.ndjson`.
//!
//! # Event Format
//!
//! Each event is a JSON object with the following fields:
//! - `ts`: RFC3339 timestamp
//! - `action`: The action performed (init, add, update, etc.)
//! - `actor`: The owner string (e.g., `user@HOST`)
//! - `task`: Optional task ID for task-specific events
//! - `details`: Freeform object with action-specific details
//!
//! Events are appended while holding `store.lock` for commands that commit
//! schedule state, so the log and state move together.

use crate::context::ScheduleContext;
use crate::error::{Result, SlotlineError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Workspace initialization
    Init,
    /// Slot created
    Add,
    /// Slot rewritten
    Update,
    /// Slot deleted
    Remove,
    /// Full task recalculation
    Refresh,
    /// Lock cleared manually
    LockClear,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventAction::Init => write!(f, "init"),
            EventAction::Add => write!(f, "add"),
            EventAction::Update => write!(f, "update"),
            EventAction::Remove => write!(f, "remove"),
            EventAction::Refresh => write!(f, "refresh"),
            EventAction::LockClear => write!(f, "lock_clear"),
        }
    }
}

/// An event record for the audit log.
///
/// Events are serialized as single-line JSON objects and appended to
/// the events.ndjson file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// RFC3339 timestamp when the event occurred.
    pub ts: DateTime<Utc>,

    /// The action that was performed.
    pub action: EventAction,

    /// The actor who performed the action (e.g., `user@HOST`).
    pub actor: String,

    /// Optional task ID for task-specific events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Freeform details object with action-specific information.
    pub details: Value,
}

impl Event {
    /// Create a new event with the given action.
    ///
    /// The timestamp is set to the current time, and the actor is
    /// determined from the environment (USER@HOSTNAME).
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: get_actor_string(),
            task: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    /// Set the task ID for this event.
    pub fn with_task(mut self, task_id: impl Into<String>) -> Self {
        self.task = Some(task_id.into());
        self
    }

    /// Set the details object for this event.
    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            SlotlineError::UserError(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

/// Get the actor string for event metadata.
fn get_actor_string() -> String {
    let user = std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "unknown".to_string());

    let host = hostname::get()
        .map(|h| h.to_string_lossy().to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    format!("{}@{}", user, host)
}

/// Get the path to the events file.
pub fn events_file_path(ctx: &ScheduleContext) -> PathBuf {
    ctx.events_dir().join("events.ndjson")
}

/// Append an event to the events log.
///
/// Appends the event as a single JSON line to the events.ndjson file. The
/// file is created if it doesn't exist, and the write is synced before
/// returning.
pub fn append_event(ctx: &ScheduleContext, event: &Event) -> Result<()> {
    let events_file = events_file_path(ctx);

    let json_line = event.to_ndjson_line()?;

    let events_dir = ctx.events_dir();
    if !events_dir.exists() {
        fs::create_dir_all(&events_dir).map_err(|e| {
            SlotlineError::UserError(format!(
                "failed to create events directory '{}': {}",
                events_dir.display(),
                e
            ))
        })?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&events_file)
        .map_err(|e| {
            SlotlineError::UserError(format!(
                "failed to open events file '{}': {}",
                events_file.display(),
                e
            ))
        })?;

    writeln!(file, "{}", json_line).map_err(|e| {
        SlotlineError::UserError(format!(
            "failed to write event to '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    file.sync_all().map_err(|e| {
        SlotlineError::UserError(format!(
            "failed to sync events file '{}': {}",
            events_file.display(),
            e
        ))
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn test_context() -> (TempDir, ScheduleContext) {
        let temp_dir = TempDir::new().unwrap();
        let ctx = ScheduleContext::at_root(temp_dir.path());
        fs::create_dir_all(&ctx.state_dir).unwrap();
        (temp_dir, ctx)
    }

    #[test]
    fn event_serializes_to_one_line() {
        let event = Event::new(EventAction::Add)
            .with_task("TASK-001")
            .with_details(json!({"slot_id": 3}));
        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains('\n'));
        assert!(line.contains("\"action\":\"add\""));
        assert!(line.contains("\"task\":\"TASK-001\""));
    }

    #[test]
    fn event_without_task_omits_the_field() {
        let event = Event::new(EventAction::Init);
        let line = event.to_ndjson_line().unwrap();
        assert!(!line.contains("\"task\""));
    }

    #[test]
    fn action_names_are_snake_case() {
        assert_eq!(EventAction::LockClear.to_string(), "lock_clear");
        assert_eq!(EventAction::Refresh.to_string(), "refresh");
    }

    #[test]
    fn append_creates_the_log_and_accumulates_lines() {
        let (_tmp, ctx) = test_context();

        append_event(&ctx, &Event::new(EventAction::Init)).unwrap();
        append_event(
            &ctx,
            &Event::new(EventAction::Add).with_task("TASK-001"),
        )
        .unwrap();

        let content = fs::read_to_string(events_file_path(&ctx)).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        // Each line is a complete JSON object.
        for line in &lines {
            let parsed: Event = serde_json::from_str(line).unwrap();
            assert!(!parsed.actor.is_empty());
        }
        let second: Event = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second.task.as_deref(), Some("TASK-001"));
    }
}
