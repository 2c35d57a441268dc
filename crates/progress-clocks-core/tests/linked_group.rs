//! Tests for Linked Clocks: serial clicks and sequential countdowns

use std::time::{Duration, Instant};

use pretty_assertions::assert_eq;
use progress_clocks_core::error::ClockError;
use progress_clocks_core::events::{completions_for, ClockEvent, NullHooks};
use progress_clocks_core::group::{ClockGroup, GroupKind};
use progress_clocks_core::timer::MAX_TIMER_DURATION;

fn linked(count: usize, segments: u32) -> ClockGroup {
    let mut group = ClockGroup::with_dials(GroupKind::Linked, "Linked Clocks 1", count);
    group.set_segments(segments, &mut NullHooks).unwrap();
    group
}

fn filled(group: &ClockGroup) -> Vec<u32> {
    group.dials().map(|d| d.filled_count()).collect()
}

/// No member after the active one may hold fill
fn assert_serial(group: &ClockGroup) {
    for (index, dial) in group.dials().enumerate() {
        if index > group.active_index() {
            assert_eq!(dial.filled_count(), 0, "dial {index} filled past the active dial");
        }
        if index < group.active_index() {
            assert!(dial.is_complete(), "dial {index} before the active dial is not full");
        }
    }
}

#[test]
fn test_only_active_dial_takes_clicks() {
    let mut group = linked(3, 2);
    let ids = group.dial_ids();
    let mut hooks = NullHooks;

    assert!(!group.click(ids[1], &mut hooks));
    assert_eq!(filled(&group), vec![0, 0, 0]);

    assert!(group.click(ids[0], &mut hooks));
    assert_eq!(group.active_index(), 0);
    assert!(group.click(ids[0], &mut hooks));
    assert_eq!(group.active_index(), 1);

    assert!(!group.click(ids[0], &mut hooks));
    assert!(!group.click(ids[2], &mut hooks));
    assert!(group.click(ids[1], &mut hooks));
    assert_eq!(filled(&group), vec![2, 1, 0]);
    assert_serial(&group);
}

#[test]
fn test_unclick_regresses_to_previous_dial() {
    let mut group = linked(3, 2);
    let ids = group.dial_ids();
    let mut hooks = NullHooks;
    group.click(ids[0], &mut hooks);
    group.click(ids[0], &mut hooks);
    assert_eq!(group.active_index(), 1);

    // The active dial is empty, so the just-completed dial is corrected
    assert!(group.unclick(ids[0], &mut hooks));
    assert_eq!(group.active_index(), 0);
    assert_eq!(filled(&group), vec![1, 0, 0]);

    // Dials after the active one cannot be unclicked
    assert!(!group.unclick(ids[2], &mut hooks));
    assert_serial(&group);
}

#[test]
fn test_unclick_only_on_active_when_it_has_fill() {
    let mut group = linked(3, 2);
    let ids = group.dial_ids();
    let mut hooks = NullHooks;
    group.click(ids[0], &mut hooks);
    group.click(ids[0], &mut hooks);
    group.click(ids[1], &mut hooks);

    assert!(!group.unclick(ids[0], &mut hooks));
    assert!(group.unclick(ids[1], &mut hooks));
    assert_eq!(filled(&group), vec![2, 0, 0]);
    assert_eq!(group.active_index(), 1);
}

#[test]
fn test_serial_invariant_under_random_clicks() {
    let mut group = linked(4, 3);
    let ids = group.dial_ids();
    let mut hooks = NullHooks;
    // Deterministic pseudo-random sequence of clicks and unclicks
    let mut state: u32 = 7;
    for _ in 0..400 {
        state = state.wrapping_mul(1_103_515_245).wrapping_add(12_345);
        let target = ids[(state >> 16) as usize % ids.len()];
        if (state >> 8) % 3 == 0 {
            group.unclick(target, &mut hooks);
        } else {
            group.click(target, &mut hooks);
        }
        assert_serial(&group);
    }
}

#[test]
fn test_sequential_countdowns() {
    let start = Instant::now();
    let mut group = linked(2, 4);
    let ids = group.dial_ids();
    let mut events: Vec<ClockEvent> = Vec::new();
    group.set_countdown_text(ids[0], "1:00", start, &mut events).unwrap();
    group.set_countdown_text(ids[1], "2:00", start, &mut events).unwrap();
    group.group_start(start).unwrap();

    group.tick(start + Duration::from_secs(30), &mut events);
    assert_eq!(filled(&group), vec![2, 0]);

    group.tick(start + Duration::from_secs(60), &mut events);
    assert_eq!(filled(&group), vec![4, 0]);
    assert_eq!(group.active_index(), 1);

    group.tick(start + Duration::from_secs(120), &mut events);
    assert_eq!(filled(&group), vec![4, 2]);
    assert_eq!(group.remaining_for(ids[1]), Some(Duration::from_secs(60)));

    let tick = group.tick(start + Duration::from_secs(180), &mut events).unwrap();
    assert!(tick.finished);
    assert!(!group.is_running());
    assert_eq!(filled(&group), vec![4, 4]);
    assert_eq!(completions_for(&events, ids[0]), 1);
    assert_eq!(completions_for(&events, ids[1]), 1);
}

#[test]
fn test_partial_countdowns_cannot_start() {
    let now = Instant::now();
    let mut group = linked(3, 4);
    let ids = group.dial_ids();
    group.set_countdown(ids[0], Duration::from_secs(60), now, &mut NullHooks).unwrap();

    assert!(matches!(group.group_start(now), Err(ClockError::InvalidState(_))));
    assert!(!group.is_running());
}

#[test]
fn test_no_countdowns_cannot_start() {
    let mut group = linked(2, 4);
    assert!(matches!(
        group.group_start(Instant::now()),
        Err(ClockError::InvalidState(_))
    ));
}

#[test]
fn test_clicks_while_paused_fast_forward_the_clock() {
    let start = Instant::now();
    let mut group = linked(2, 4);
    let ids = group.dial_ids();
    let mut hooks = NullHooks;
    for id in &ids {
        group.set_countdown(*id, Duration::from_secs(60), start, &mut hooks).unwrap();
    }

    group.click(ids[0], &mut hooks);
    group.click(ids[0], &mut hooks);
    assert_eq!(group.group_timer().unwrap().elapsed(), Duration::from_secs(30));

    group.group_start(start).unwrap();
    group.tick(start + Duration::from_secs(15), &mut hooks);
    assert_eq!(filled(&group), vec![3, 0]);
}

#[test]
fn test_running_dials_reject_clicks() {
    let start = Instant::now();
    let mut group = linked(2, 4);
    let ids = group.dial_ids();
    for id in &ids {
        group.set_countdown(*id, Duration::from_secs(60), start, &mut NullHooks).unwrap();
    }
    group.group_start(start).unwrap();
    assert!(!group.click(ids[0], &mut NullHooks));

    group.group_stop(start + Duration::from_secs(20));
    assert!(group.click(ids[0], &mut NullHooks));
}

#[test]
fn test_start_when_running_is_noop() {
    let start = Instant::now();
    let mut group = linked(2, 4);
    let ids = group.dial_ids();
    for id in &ids {
        group.set_countdown(*id, Duration::from_secs(60), start, &mut NullHooks).unwrap();
    }
    group.group_start(start).unwrap();
    group.group_start(start + Duration::from_secs(10)).unwrap();
    group.tick(start + Duration::from_secs(30), &mut NullHooks);
    assert_eq!(group.group_timer().unwrap().elapsed(), Duration::from_secs(30));
}

#[test]
fn test_reset_all_is_idempotent() {
    let start = Instant::now();
    let mut group = linked(3, 2);
    let ids = group.dial_ids();
    let mut hooks = NullHooks;
    for id in &ids {
        group.set_countdown(*id, Duration::from_secs(30), start, &mut hooks).unwrap();
    }
    group.set_dial_title(ids[0], "Guards", &mut hooks);
    group.group_start(start).unwrap();
    group.tick(start + Duration::from_secs(40), &mut hooks);

    group.reset_all(false, true, &mut hooks);
    let once = group.clone();
    group.reset_all(false, true, &mut hooks);
    assert_eq!(group, once);

    assert_eq!(filled(&group), vec![0, 0, 0]);
    assert_eq!(group.active_index(), 0);
    assert!(group.group_timer().is_none());
    assert!(ids.iter().all(|id| group.countdown(*id) == Some(Duration::ZERO)));
}

#[test]
fn test_reset_without_zeroing_keeps_countdowns() {
    let start = Instant::now();
    let mut group = linked(2, 2);
    let ids = group.dial_ids();
    for id in &ids {
        group.set_countdown(*id, Duration::from_secs(30), start, &mut NullHooks).unwrap();
    }
    group.group_start(start).unwrap();
    group.tick(start + Duration::from_secs(40), &mut NullHooks);

    group.reset_all(false, false, &mut NullHooks);
    let timer = group.group_timer().unwrap();
    assert!(!timer.is_running());
    assert_eq!(timer.elapsed(), Duration::ZERO);
    assert_eq!(timer.total(), Duration::from_secs(60));
    assert_eq!(filled(&group), vec![0, 0]);
}

#[test]
fn test_added_dial_needs_a_countdown() {
    let start = Instant::now();
    let mut group = linked(2, 2);
    let ids = group.dial_ids();
    for id in &ids {
        group.set_countdown(*id, Duration::from_secs(30), start, &mut NullHooks).unwrap();
    }
    group.group_start(start).unwrap();

    let added = group.add_dial(start + Duration::from_secs(5), &mut NullHooks).unwrap();
    assert!(!group.is_running());
    assert!(group.group_start(start + Duration::from_secs(6)).is_err());

    group.set_countdown(added, Duration::from_secs(30), start, &mut NullHooks).unwrap();
    assert!(group.group_start(start + Duration::from_secs(7)).is_ok());
}

#[test]
fn test_oversized_countdown_text_is_rejected() {
    let start = Instant::now();
    let mut group = linked(2, 4);
    let ids = group.dial_ids();

    assert!(matches!(
        group.set_countdown_text(ids[0], "18446744073709551615", start, &mut NullHooks),
        Err(ClockError::InvalidTimerText(_))
    ));
    group.set_countdown_text(ids[1], "1", start, &mut NullHooks).unwrap();
    assert_eq!(group.countdown(ids[0]), Some(Duration::ZERO));

    // The longest accepted countdowns still add up and run
    for id in &ids {
        group.set_countdown_text(*id, "999:59:59", start, &mut NullHooks).unwrap();
    }
    assert_eq!(
        group.group_timer().map(|t| t.total()),
        Some(MAX_TIMER_DURATION * 2)
    );
    group.group_start(start).unwrap();
    let tick = group.tick(start + MAX_TIMER_DURATION, &mut NullHooks).unwrap();
    assert_eq!(tick.remaining, MAX_TIMER_DURATION);
    assert_eq!(filled(&group), vec![4, 0]);
    assert_eq!(group.remaining_for(ids[1]), Some(MAX_TIMER_DURATION));
}
