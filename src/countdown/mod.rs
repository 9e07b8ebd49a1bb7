//! The schedule countdown engine.
//!
//! Every slot owned by a task carries a countdown pair: the number of
//! remaining task-days on the slot's first day and on its last. The countdown
//! is anchored at the task's `last_update` date, where the remaining effort
//! (`expected - actual`, divided by hours-per-day) is the ground truth. From
//! that anchor the numbers decrease by exactly one per scheduled day going
//! forward in time, and increase by one per scheduled day going backward.
//!
//! Two halves implement this:
//!
//! - [`remaining_task_days`] computes the countdown value a candidate date
//!   range opens with, given every other slot of the same task. Slots before
//!   and after the anchor are counted with opposite sign conventions, which
//!   is where all the subtlety of this module lives (see `remaining.rs`).
//! - [`propagate_forward`] / [`propagate_backward`] cascade a newly assigned
//!   value across sibling slots in either direction so the whole timeline
//!   stays strictly monotonic.
//!
//! The mutation service (`crate::service`) orchestrates both halves for
//! add/update/remove operations.

mod propagate;
mod remaining;
#[cfg(test)]
mod tests;

pub use propagate::{propagate_backward, propagate_forward};
pub use remaining::remaining_task_days;
