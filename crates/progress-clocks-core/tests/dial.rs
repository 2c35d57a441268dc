//! Tests for single segment dials

use std::time::{Duration, Instant};

use progress_clocks_core::dial::{DialMode, SegmentDial};
use progress_clocks_core::events::{completions_for, ClockEvent, NullHooks};

fn assert_in_bounds(dial: &SegmentDial) {
    assert!(dial.filled_count() <= dial.segment_count());
    assert_eq!(dial.labels().len(), dial.segment_count() as usize);
}

#[test]
fn test_fill_stays_in_bounds() {
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    let mut hooks = NullHooks;

    for _ in 0..10 {
        dial.fill_next(&mut hooks);
        assert_in_bounds(&dial);
    }
    assert_eq!(dial.filled_count(), 4);

    for _ in 0..10 {
        dial.unfill_last(&mut hooks);
        assert_in_bounds(&dial);
    }
    assert_eq!(dial.filled_count(), 0);

    dial.set_filled(99, &mut hooks);
    assert_eq!(dial.filled_count(), 4);
    dial.resize(6, &mut hooks).unwrap();
    assert_in_bounds(&dial);
    assert_eq!(dial.filled_count(), 6);
}

#[test]
fn test_completion_fires_exactly_once() {
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    let mut events: Vec<ClockEvent> = Vec::new();

    for _ in 0..3 {
        dial.fill_next(&mut events);
    }
    assert_eq!(completions_for(&events, dial.id()), 0);

    for _ in 0..5 {
        dial.fill_next(&mut events);
    }
    assert_eq!(dial.filled_count(), 4);
    assert_eq!(completions_for(&events, dial.id()), 1);
}

#[test]
fn test_completion_rearms_after_unfill() {
    let mut dial = SegmentDial::new("Danger Clock 1", 2);
    let mut events: Vec<ClockEvent> = Vec::new();

    dial.fill_next(&mut events);
    dial.fill_next(&mut events);
    dial.unfill_last(&mut events);
    dial.fill_next(&mut events);
    assert_eq!(completions_for(&events, dial.id()), 2);
}

#[test]
fn test_every_change_requests_redraw() {
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    let mut events: Vec<ClockEvent> = Vec::new();

    dial.fill_next(&mut events);
    dial.set_label(0, "  Guards alerted ", &mut events);
    dial.reset(false, &mut events);

    let redraws = events
        .iter()
        .filter(|e| matches!(e, ClockEvent::StateChanged(id) if *id == dial.id()))
        .count();
    assert_eq!(redraws, 3);
    assert_eq!(dial.labels()[0], "Guards alerted");
}

#[test]
fn test_reset_optionally_restores_labels() {
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    let mut hooks = NullHooks;
    dial.set_label(2, "Alarm", &mut hooks);
    dial.fill_next(&mut hooks);

    dial.reset(false, &mut hooks);
    assert_eq!(dial.filled_count(), 0);
    assert_eq!(dial.labels()[2], "Alarm");

    dial.reset(true, &mut hooks);
    assert_eq!(dial.labels()[2], "Segment 3");
}

#[test]
fn test_out_of_range_label_is_ignored() {
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    assert!(!dial.set_label(4, "nope", &mut NullHooks));
}

#[test]
fn test_timed_dial_rejects_clicks_while_running() {
    let start = Instant::now();
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    let mut hooks = NullHooks;
    dial.attach_timer(Duration::from_secs(240));
    assert_eq!(dial.mode(), DialMode::Timed);

    dial.start_timer(start).unwrap();
    assert!(!dial.fill_next(&mut hooks));
    assert!(!dial.unfill_last(&mut hooks));

    dial.stop_timer(start + Duration::from_secs(10));
    assert!(dial.fill_next(&mut hooks));
    assert_eq!(dial.filled_count(), 1);
}

#[test]
fn test_timed_fill_never_retreats() {
    let start = Instant::now();
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    let mut hooks = NullHooks;
    dial.attach_timer(Duration::from_secs(240));

    // Manual fill while stopped stays when the countdown is behind it
    dial.fill_next(&mut hooks);
    dial.fill_next(&mut hooks);
    dial.start_timer(start).unwrap();
    dial.tick(start + Duration::from_secs(60), &mut hooks);
    assert_eq!(dial.filled_count(), 2);

    dial.tick(start + Duration::from_secs(180), &mut hooks);
    assert_eq!(dial.filled_count(), 3);
}

#[test]
fn test_reset_stops_and_zeroes_timer() {
    let start = Instant::now();
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    dial.attach_timer(Duration::from_secs(240));
    dial.start_timer(start).unwrap();
    dial.tick(start + Duration::from_secs(100), &mut NullHooks);

    dial.reset(false, &mut NullHooks);
    let timer = dial.timer().unwrap();
    assert!(!timer.is_running());
    assert_eq!(timer.elapsed(), Duration::ZERO);
    assert_eq!(dial.filled_count(), 0);
    assert!(dial.accepts_clicks());
}

#[test]
fn test_start_without_timer_is_invalid() {
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    assert!(dial.start_timer(Instant::now()).is_err());

    dial.attach_timer(Duration::ZERO);
    assert!(dial.timer().is_none());
    assert_eq!(dial.mode(), DialMode::Manual);
}

#[test]
fn test_dark_mode_swaps_pure_black_only() {
    let mut dial = SegmentDial::new("Danger Clock 1", 4);
    let mut events: Vec<ClockEvent> = Vec::new();
    dial.set_inverted(true, &mut events);
    assert_eq!(dial.fill_color(), "#FFFFFF");
    assert!(events.contains(&ClockEvent::StateChanged(dial.id())));

    let mut red = SegmentDial::new("Danger Clock 2", 4).with_fill_color("#C00000");
    red.set_inverted(true, &mut NullHooks);
    assert_eq!(red.fill_color(), "#C00000");
}
