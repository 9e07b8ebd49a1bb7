//! Bidirectional countdown cascades across sibling slots.

use crate::date::DayDate;
use crate::error::Result;
use crate::slot::SlotId;
use crate::store::SlotStore;

/// Cascade day numbers forward through slots starting at or after `from_date`.
///
/// Slots of `task_id` are walked ascending by `(start_date, id)`, skipping
/// `excluded`. Each slot continues the countdown from the running value:
/// `first = running - 1`, `last = first - span`, and the slot's new `last`
/// becomes the running value. `last_day_number` seeds the walk, normally the
/// anchor slot's own last day number.
///
/// Returns the ids of every slot rewritten, in walk order; callers report
/// these as "what else changed".
pub fn propagate_forward<S: SlotStore>(
    store: &mut S,
    task_id: &str,
    from_date: DayDate,
    last_day_number: i64,
    excluded: &[SlotId],
) -> Result<Vec<SlotId>> {
    let followers: Vec<_> = store
        .slots_for_task(task_id)
        .into_iter()
        .filter(|s| s.start_date >= from_date && !excluded.contains(&s.id))
        .collect();

    let mut running = last_day_number;
    let mut touched = Vec::with_capacity(followers.len());
    for mut slot in followers {
        let first = running - 1;
        let last = first - slot.span_days();
        slot.set_day_numbers(first, last);
        store.update(&slot)?;
        running = last;
        touched.push(slot.id);
    }
    Ok(touched)
}

/// Cascade day numbers backward through slots starting at or before
/// `from_date`.
///
/// Slots are walked descending by `(start_date, id)`, skipping `excluded`.
/// Each slot is filled in above the running value: `last = running + 1`,
/// `first = last + span`, and the slot's new `first` becomes the running
/// value. `remaining_days` seeds the walk, normally the anchor slot's first
/// day number.
pub fn propagate_backward<S: SlotStore>(
    store: &mut S,
    task_id: &str,
    from_date: DayDate,
    remaining_days: i64,
    excluded: &[SlotId],
) -> Result<Vec<SlotId>> {
    let predecessors: Vec<_> = store
        .slots_for_task(task_id)
        .into_iter()
        .rev()
        .filter(|s| s.start_date <= from_date && !excluded.contains(&s.id))
        .collect();

    let mut running = remaining_days;
    let mut touched = Vec::with_capacity(predecessors.len());
    for mut slot in predecessors {
        let last = running + 1;
        let first = last + slot.span_days();
        slot.set_day_numbers(first, last);
        store.update(&slot)?;
        running = first;
        touched.push(slot.id);
    }
    Ok(touched)
}
