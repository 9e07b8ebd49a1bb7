//! Engine tests for the remaining-days calculation and both cascades.
//!
//! The fixture mirrors the canonical burndown: a task budgeted at 400 hours
//! with 100 recorded, 7 hours per day, progress last recorded on 01/01/2023.
//! Remaining budget is floor(300 / 7) = 42 days at the anchor date.

use super::*;
use crate::date::DayDate;
use crate::slot::{SlotId, TaskSnapshot};
use crate::store::{MemoryStore, SlotDraft, SlotStore};

const HOURS_PER_DAY: f64 = 7.0;

fn d(y: i32, m: u32, day: u32) -> DayDate {
    DayDate::from_ymd(y, m, day).unwrap()
}

fn task() -> TaskSnapshot {
    TaskSnapshot {
        id: "T-1".to_string(),
        name: Some("engine rebuild".to_string()),
        expected_effort: 400.0,
        actual_effort: 100.0,
        last_update: d(2023, 1, 1),
        hours_per_day: None,
    }
}

fn seed(store: &mut MemoryStore, start: DayDate, end: DayDate) -> SlotId {
    store
        .insert(SlotDraft {
            task: Some("T-1".to_string()),
            start_date: Some(start),
            end_date: Some(end),
            ..Default::default()
        })
        .unwrap()
        .id
}

fn day_numbers(store: &MemoryStore, id: SlotId) -> (i64, i64) {
    let slot = store.get(id).unwrap();
    (
        slot.first_day_number.unwrap(),
        slot.last_day_number.unwrap(),
    )
}

// ---------------------------------------------------------------------------
// remaining_task_days
// ---------------------------------------------------------------------------

#[test]
fn range_after_anchor_gets_baseline() {
    // Countdown runs 42(4/4) 41(5/4) 40(6/4) 39(7/4) 38(8/4).
    let store = MemoryStore::new();
    let remaining =
        remaining_task_days(&store, &task(), HOURS_PER_DAY, d(2023, 4, 4), Some(d(2023, 4, 8)), None);
    assert_eq!(remaining, 42);
}

#[test]
fn range_before_anchor_counts_backward() {
    // Countdown runs 46(12/12) 45(13/12) 44(14/12) 43(15/12), converging on
    // 42 at the anchor.
    let store = MemoryStore::new();
    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2022, 12, 12),
        Some(d(2022, 12, 15)),
        None,
    );
    assert_eq!(remaining, 46);
}

#[test]
fn range_straddling_anchor_clamps_at_boundary() {
    // Countdown runs 43(31/12) 42(1/1) 41(2/1); the anchor day itself must
    // carry the baseline 42.
    let store = MemoryStore::new();
    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2022, 12, 31),
        Some(d(2023, 1, 2)),
        None,
    );
    assert_eq!(remaining, 43);
}

#[test]
fn historical_range_stacks_on_existing_slots() {
    // With a straddling slot (1 day before the anchor) and a fully
    // historical 4-day slot in between, the candidate lands at
    // 42 + 1 + 4 + 2 + 1 = 50.
    let mut store = MemoryStore::new();
    seed(&mut store, d(2022, 12, 31), d(2023, 1, 2));
    seed(&mut store, d(2022, 12, 12), d(2022, 12, 15));

    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2022, 12, 1),
        Some(d(2022, 12, 3)),
        None,
    );
    assert_eq!(remaining, 50);
}

#[test]
fn forward_range_discounts_days_spent_by_earlier_slots() {
    // The straddling slot consumed 2 forward-facing days (31/12 and the
    // anchor day), the April slot 5 more; the fully historical December slot
    // consumed none. 42 - 2 - 5 = 35.
    let mut store = MemoryStore::new();
    seed(&mut store, d(2022, 12, 31), d(2023, 1, 2));
    seed(&mut store, d(2022, 12, 12), d(2022, 12, 15));
    seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));

    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2023, 4, 10),
        Some(d(2023, 4, 12)),
        None,
    );
    assert_eq!(remaining, 35);
}

#[test]
fn sibling_starting_on_anchor_day_consumes_its_full_span() {
    // A slot opening exactly on 01/01 holds (42, 40); a later candidate must
    // continue the chain at 39, not treat the sibling as a straddler.
    let mut store = MemoryStore::new();
    seed(&mut store, d(2023, 1, 1), d(2023, 1, 3));

    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2023, 1, 5),
        Some(d(2023, 1, 6)),
        None,
    );
    assert_eq!(remaining, 39);
}

#[test]
fn excluded_slot_does_not_count_itself() {
    let mut store = MemoryStore::new();
    let id = seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));

    // Recomputing the persisted slot's own range with itself excluded must
    // match the empty-store answer.
    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2023, 4, 4),
        Some(d(2023, 4, 8)),
        Some(id),
    );
    assert_eq!(remaining, 42);
}

#[test]
fn anchor_value_without_window_forward_side() {
    // With no candidate window, the forward side is unaffected by `end`.
    let mut store = MemoryStore::new();
    seed(&mut store, d(2022, 12, 31), d(2023, 1, 2));
    seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));

    let anchored =
        remaining_task_days(&store, &task(), HOURS_PER_DAY, d(2023, 4, 10), None, None);
    let windowed = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2023, 4, 10),
        Some(d(2023, 4, 12)),
        None,
    );
    assert_eq!(anchored, 35);
    assert_eq!(anchored, windowed);
}

#[test]
fn anchor_value_without_window_historical_side() {
    // The straddling slot alone: the countdown value vacated at 12/12 is the
    // straddler's first day number (43), before any candidate span is added.
    let mut store = MemoryStore::new();
    seed(&mut store, d(2022, 12, 31), d(2023, 1, 2));

    let anchored =
        remaining_task_days(&store, &task(), HOURS_PER_DAY, d(2022, 12, 12), None, None);
    assert_eq!(anchored, 43);
}

#[test]
fn zero_span_candidate_is_valid() {
    let store = MemoryStore::new();
    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2023, 4, 4),
        Some(d(2023, 4, 4)),
        None,
    );
    assert_eq!(remaining, 42);
}

// ---------------------------------------------------------------------------
// propagation
// ---------------------------------------------------------------------------

#[test]
fn forward_cascade_walks_ascending() {
    let mut store = MemoryStore::new();
    let anchor = seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));
    let mid = seed(&mut store, d(2023, 4, 10), d(2023, 4, 12));
    let tail = seed(&mut store, d(2023, 4, 20), d(2023, 4, 20));

    // Anchor slot holds (42, 38); followers continue from 38.
    let touched = propagate_forward(&mut store, "T-1", d(2023, 4, 4), 38, &[anchor]).unwrap();
    assert_eq!(touched, vec![mid, tail]);
    assert_eq!(day_numbers(&store, mid), (37, 35));
    assert_eq!(day_numbers(&store, tail), (34, 34));
}

#[test]
fn forward_cascade_is_idempotent() {
    let mut store = MemoryStore::new();
    let anchor = seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));
    let mid = seed(&mut store, d(2023, 4, 10), d(2023, 4, 12));

    propagate_forward(&mut store, "T-1", d(2023, 4, 4), 38, &[anchor]).unwrap();
    let first_pass = day_numbers(&store, mid);
    propagate_forward(&mut store, "T-1", d(2023, 4, 4), 38, &[anchor]).unwrap();
    assert_eq!(day_numbers(&store, mid), first_pass);
}

#[test]
fn backward_cascade_walks_descending() {
    let mut store = MemoryStore::new();
    let early = seed(&mut store, d(2022, 12, 1), d(2022, 12, 3));
    let late = seed(&mut store, d(2022, 12, 12), d(2022, 12, 15));
    let anchor = seed(&mut store, d(2022, 12, 31), d(2023, 1, 2));

    // Anchor slot holds (43, 41); predecessors fill in above 43.
    let touched =
        propagate_backward(&mut store, "T-1", d(2022, 12, 31), 43, &[anchor]).unwrap();
    assert_eq!(touched, vec![late, early]);
    assert_eq!(day_numbers(&store, late), (47, 44));
    assert_eq!(day_numbers(&store, early), (50, 48));
}

#[test]
fn cascades_keep_countdown_monotonic_through_anchor() {
    // Full chain: candidate (50,48), historical slot (47,44),
    // straddler (43,41). Each boundary steps by exactly one and the anchor
    // day (01/01) carries the baseline 42.
    let mut store = MemoryStore::new();
    let straddler = seed(&mut store, d(2022, 12, 31), d(2023, 1, 2));
    let historical = seed(&mut store, d(2022, 12, 12), d(2022, 12, 15));
    let candidate = seed(&mut store, d(2022, 12, 1), d(2022, 12, 3));

    let remaining = remaining_task_days(
        &store,
        &task(),
        HOURS_PER_DAY,
        d(2022, 12, 1),
        Some(d(2022, 12, 3)),
        Some(candidate),
    );
    assert_eq!(remaining, 50);

    let mut slot = store.get(candidate).unwrap();
    slot.set_day_numbers(remaining, remaining - slot.span_days());
    store.update(&slot).unwrap();

    propagate_forward(&mut store, "T-1", d(2022, 12, 1), 48, &[candidate]).unwrap();

    let slots = store.slots_for_task("T-1");
    for pair in slots.windows(2) {
        assert_eq!(
            pair[1].first_day_number.unwrap(),
            pair[0].last_day_number.unwrap() - 1
        );
    }
    // Straddler first day 31/12 = 43, so the anchor day 01/01 is 42.
    assert_eq!(day_numbers(&store, straddler), (43, 41));
    assert_eq!(day_numbers(&store, historical), (47, 44));
}

#[test]
fn same_day_slots_cascade_in_id_order() {
    let mut store = MemoryStore::new();
    let anchor = seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));
    let twin_a = seed(&mut store, d(2023, 4, 10), d(2023, 4, 10));
    let twin_b = seed(&mut store, d(2023, 4, 10), d(2023, 4, 10));

    let touched = propagate_forward(&mut store, "T-1", d(2023, 4, 4), 38, &[anchor]).unwrap();
    assert_eq!(touched, vec![twin_a, twin_b]);
    // Lower id wins the higher day number.
    assert_eq!(day_numbers(&store, twin_a), (37, 37));
    assert_eq!(day_numbers(&store, twin_b), (36, 36));
}

#[test]
fn cascade_ignores_other_tasks() {
    let mut store = MemoryStore::new();
    let anchor = seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));
    let foreign = store
        .insert(SlotDraft {
            task: Some("T-2".to_string()),
            start_date: Some(d(2023, 4, 10)),
            end_date: Some(d(2023, 4, 12)),
            ..Default::default()
        })
        .unwrap()
        .id;

    let touched = propagate_forward(&mut store, "T-1", d(2023, 4, 4), 38, &[anchor]).unwrap();
    assert!(touched.is_empty());
    assert!(store.get(foreign).unwrap().first_day_number.is_none());
}

#[test]
fn span_consistency_holds_after_cascades() {
    let mut store = MemoryStore::new();
    let anchor = seed(&mut store, d(2023, 4, 4), d(2023, 4, 8));
    seed(&mut store, d(2023, 4, 10), d(2023, 4, 12));
    seed(&mut store, d(2023, 4, 14), d(2023, 4, 14));

    propagate_forward(&mut store, "T-1", d(2023, 4, 4), 38, &[anchor]).unwrap();

    for slot in store.slots_for_task("T-1") {
        if slot.id == anchor {
            continue;
        }
        assert_eq!(
            slot.last_day_number.unwrap(),
            slot.first_day_number.unwrap() - slot.span_days()
        );
        assert!(slot.last_day_number.unwrap() <= slot.first_day_number.unwrap());
    }
}
