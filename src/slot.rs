//! Schedule slot records and the task snapshot they are planned against.
//!
//! A `ScheduleSlot` is one contiguous assignment of a task to an inclusive
//! date range. Slots owned by a task carry a countdown pair
//! (`first_day_number`, `last_day_number`): how many remaining task-days the
//! slot covers at its start and at its end. Slots without a task (leave,
//! time-off-in-lieu markers) are stored and listed but never participate in
//! countdown math.
//!
//! Task data is collaborator state maintained outside this tool (typically
//! synced from an ERP); slotline only ever reads it, as a `TaskSnapshot`.

use crate::date::{DayDate, span_days};
use serde::{Deserialize, Serialize};

/// Unique identifier of a schedule slot.
pub type SlotId = u64;

/// One contiguous assignment of a task to an inclusive date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleSlot {
    /// Store-assigned identifier.
    pub id: SlotId,

    /// Owning task id. `None` for leave/lieu markers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task: Option<String>,

    /// Assignee, informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,

    /// First day of the slot (inclusive).
    pub start_date: DayDate,

    /// Last day of the slot (inclusive). A single-day slot has
    /// `end_date == start_date`.
    pub end_date: DayDate,

    /// Free-text notes shown in listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Countdown value on the first day of the slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_day_number: Option<i64>,

    /// Countdown value on the last day of the slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_day_number: Option<i64>,

    /// Per-slot override of the task's hours-per-day divisor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_day: Option<f64>,
}

impl ScheduleSlot {
    /// Whole-day span of the slot; 0 for a single-day slot.
    pub fn span_days(&self) -> i64 {
        span_days(self.start_date, self.end_date)
    }

    /// Assign both countdown values.
    pub fn set_day_numbers(&mut self, first: i64, last: i64) {
        self.first_day_number = Some(first);
        self.last_day_number = Some(last);
    }
}

/// Read-only view of a task's effort budget and progress marker.
///
/// `last_update` is the date the task's `actual_effort` was most recently
/// recorded. It is the pivot of all countdown math: slots starting at or
/// after it consume remaining days going forward, slots before it are filled
/// in backward from the same anchor. It moves independently of any slot, so
/// it is snapshotted here per calculation and never cached by the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSnapshot {
    /// Task identifier, as referenced by `ScheduleSlot::task`.
    pub id: String,

    /// Human-readable name for listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Total hours budgeted.
    pub expected_effort: f64,

    /// Hours consumed so far.
    #[serde(default)]
    pub actual_effort: f64,

    /// Date the actual effort was last recorded.
    pub last_update: DayDate,

    /// Hours-per-day divisor for this task, when it differs from the
    /// configured default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hours_per_day: Option<f64>,
}

impl TaskSnapshot {
    /// Hours of budgeted effort not yet consumed. May be negative on overrun.
    pub fn remaining_effort(&self) -> f64 {
        self.expected_effort - self.actual_effort
    }

    /// Remaining effort converted to whole days with the given divisor,
    /// rounded down.
    pub fn remaining_days(&self, hours_per_day: f64) -> i64 {
        (self.remaining_effort() / hours_per_day).floor() as i64
    }
}
