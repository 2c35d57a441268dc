//! Notification hooks
//!
//! The core owns no renderer, speaker or overlay. Every mutating operation
//! reports what happened through a [`ClockHooks`] implementation supplied by
//! the caller, on the same event-loop turn as the mutation.

use std::time::Duration;

use crate::dial::DialId;

/// Receiver for state-change notifications.
///
/// All methods default to doing nothing so collaborators only implement the
/// hooks they care about.
pub trait ClockHooks {
    /// A dial's fill, labels or colours changed and it should be re-rendered.
    fn on_state_changed(&mut self, _dial: DialId) {}

    /// A dial crossed from not-full to full. Fires once per crossing.
    fn on_dial_complete(&mut self, _dial: DialId) {}

    /// A running countdown advanced; `remaining` is what is left for `dial`.
    fn on_tick(&mut self, _dial: DialId, _remaining: Duration) {}
}

/// A recorded notification, as collected by `Vec<ClockEvent>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockEvent {
    /// See [`ClockHooks::on_state_changed`]
    StateChanged(DialId),
    /// See [`ClockHooks::on_dial_complete`]
    DialComplete(DialId),
    /// See [`ClockHooks::on_tick`]
    Tick {
        /// Dial whose countdown advanced
        dial: DialId,
        /// Time left on that dial's countdown
        remaining: Duration,
    },
}

impl ClockHooks for Vec<ClockEvent> {
    fn on_state_changed(&mut self, dial: DialId) {
        self.push(ClockEvent::StateChanged(dial));
    }

    fn on_dial_complete(&mut self, dial: DialId) {
        self.push(ClockEvent::DialComplete(dial));
    }

    fn on_tick(&mut self, dial: DialId, remaining: Duration) {
        self.push(ClockEvent::Tick { dial, remaining });
    }
}

/// Hooks that discard every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHooks;

impl ClockHooks for NullHooks {}

/// Count completion notifications for `dial` in a recorded event list.
pub fn completions_for(events: &[ClockEvent], dial: DialId) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, ClockEvent::DialComplete(id) if *id == dial))
        .count()
}
