//! Remaining-task-days calculation for a candidate date range.

use crate::date::{DayDate, span_days};
use crate::slot::{SlotId, TaskSnapshot};
use crate::store::SlotStore;

/// Compute the countdown value a slot of `task` opens with at `start`.
///
/// The baseline is the task's remaining effort in whole days. Other slots of
/// the same task then adjust it, branching on which side of the task's
/// `last_update` anchor the candidate range begins:
///
/// - **At or after the anchor**: every sibling that starts earlier and is
///   still in flight at the anchor (`end_date >= last_update`) has already
///   consumed days that the candidate cannot have. Each subtracts its
///   occupied day count: its full inclusive span when it starts at or after
///   the anchor, or only the portion from its start up to the anchor when it
///   straddles it.
/// - **Before the anchor**: the countdown is filled in backward from the
///   anchor, so every sibling starting between the candidate and the anchor
///   pushes the candidate's numbers up. A sibling ending before the anchor
///   contributes its full inclusive span; one straddling the anchor
///   contributes only the days before it. Finally the candidate's own window
///   (clamped at the anchor) is added, plus one boundary day when the window
///   closes strictly before the anchor.
///
/// `end` is the candidate's last day. Passing `None` yields the bare anchor
/// value of the countdown at `start` with no candidate window; remove-slot
/// re-propagation uses this to find the value the deleted slot's position
/// vacated.
///
/// `excluded` names a slot to ignore entirely, used when recalculating a slot
/// that is already persisted so it cannot double-count itself.
pub fn remaining_task_days<S: SlotStore>(
    store: &S,
    task: &TaskSnapshot,
    hours_per_day: f64,
    start: DayDate,
    end: Option<DayDate>,
    excluded: Option<SlotId>,
) -> i64 {
    let last_update = task.last_update;
    let mut remaining = task.remaining_days(hours_per_day);

    let siblings: Vec<_> = store
        .slots_for_task(&task.id)
        .into_iter()
        .filter(|s| Some(s.id) != excluded)
        .collect();

    if start >= last_update {
        for prior in siblings
            .iter()
            .filter(|s| s.start_date < start && s.end_date >= last_update)
        {
            if prior.start_date >= last_update {
                remaining -= prior.span_days() + 1;
            } else {
                // Straddles the anchor: only the days at or after it were
                // consumed from the forward-facing budget.
                remaining -= span_days(prior.start_date, last_update) + 1;
            }
        }
        remaining
    } else {
        // Walk most-recent-first, mirroring the backward fill direction.
        for prior in siblings
            .iter()
            .rev()
            .filter(|s| s.start_date < last_update && s.start_date >= start)
        {
            if prior.end_date < last_update {
                remaining += prior.span_days() + 1;
            } else {
                remaining += span_days(prior.start_date, last_update);
            }
        }
        match end {
            None => remaining,
            Some(end) => {
                let clamped_end = end.min(last_update);
                remaining + span_days(start, clamped_end) + i64::from(clamped_end < last_update)
            }
        }
    }
}
