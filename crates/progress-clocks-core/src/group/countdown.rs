//! Shared group countdown
//!
//! One [`TimerEngine`] per group is the only clock reference, so members
//! cannot drift apart. Racing groups map the shared elapsed time onto every
//! member at once. Linked groups lay member countdowns end to end: member `i`
//! owns the slice of shared time after the countdowns of members `0..i`.

use std::time::{Duration, Instant};

use tracing::debug;

use super::{ClockGroup, GroupKind, GroupMember};
use crate::dial::{DialId, DialMode};
use crate::error::ClockError;
use crate::events::ClockHooks;
use crate::timer::{parse_timer_text, proportional_fill, TimerEngine, TimerTick, MAX_TIMER_DURATION};

impl ClockGroup {
    /// The shared timer, when a countdown is configured
    pub fn group_timer(&self) -> Option<&TimerEngine> {
        (!self.timer.total().is_zero()).then_some(&self.timer)
    }

    /// Whether the shared clock is counting
    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Whether any countdown is configured
    pub fn timers_in_use(&self) -> bool {
        match self.kind {
            GroupKind::Racing => !self.timer.total().is_zero(),
            GroupKind::Linked => self.members.iter().any(|m| !m.countdown.is_zero()),
        }
    }

    /// Countdown configured for a linked member
    pub fn countdown(&self, id: DialId) -> Option<Duration> {
        self.members.iter().find(|m| m.dial.id() == id).map(|m| m.countdown)
    }

    /// Shared duration of a racing group (zero when unset)
    pub fn race_duration(&self) -> Duration {
        match self.kind {
            GroupKind::Racing => self.timer.total(),
            GroupKind::Linked => Duration::ZERO,
        }
    }

    /// Set a linked member's countdown. The shared clock stops and rewinds;
    /// the next start fast-forwards it to the current fill. Countdowns above
    /// `MAX_TIMER_DURATION` are rejected.
    pub fn set_countdown(
        &mut self,
        id: DialId,
        countdown: Duration,
        now: Instant,
        hooks: &mut dyn ClockHooks,
    ) -> Result<(), ClockError> {
        if self.kind != GroupKind::Linked {
            return Err(ClockError::invalid_state("per-dial countdowns are only used by linked clocks"));
        }
        let pos = self
            .position(id)
            .ok_or_else(|| ClockError::invalid_state(format!("dial {id} is not in this group")))?;
        check_duration(countdown)?;
        self.group_stop(now);
        self.members[pos].countdown = countdown;
        self.sync_timer_total();
        self.sync_member_modes();
        hooks.on_state_changed(id);
        Ok(())
    }

    /// Parse countdown text (`SS`, `MM:SS`, `HH:MM:SS`) and apply it to a
    /// linked member. Malformed text leaves the group untouched.
    pub fn set_countdown_text(
        &mut self,
        id: DialId,
        text: &str,
        now: Instant,
        hooks: &mut dyn ClockHooks,
    ) -> Result<(), ClockError> {
        let countdown = parse_timer_text(text)?;
        self.set_countdown(id, countdown, now, hooks)
    }

    /// Set the shared duration of a racing group. Zero returns every member
    /// to manual mode. Durations above `MAX_TIMER_DURATION` are rejected.
    pub fn set_race_duration(
        &mut self,
        duration: Duration,
        now: Instant,
        hooks: &mut dyn ClockHooks,
    ) -> Result<(), ClockError> {
        if self.kind != GroupKind::Racing {
            return Err(ClockError::invalid_state("a shared race duration is only used by racing clocks"));
        }
        check_duration(duration)?;
        self.group_stop(now);
        self.timer.set_total(duration);
        self.sync_member_modes();
        self.redraw_all(hooks);
        Ok(())
    }

    /// Start the shared clock. Starting a running group, or one whose dials
    /// are all full, is a no-op.
    pub fn group_start(&mut self, now: Instant) -> Result<(), ClockError> {
        if self.members.is_empty() {
            return Err(ClockError::invalid_state("group has no dials"));
        }
        if self.timer.is_running() {
            return Ok(());
        }
        match self.kind {
            GroupKind::Racing => {
                if self.timer.total().is_zero() {
                    return Err(ClockError::invalid_state("no race duration configured"));
                }
            }
            GroupKind::Linked => {
                if !self.timers_in_use() {
                    return Err(ClockError::invalid_state("no countdown configured"));
                }
                if self.members.iter().any(|m| m.countdown.is_zero()) {
                    return Err(ClockError::invalid_state(
                        "every linked dial needs a countdown (HH:MM:SS) before starting",
                    ));
                }
            }
        }
        if self.is_complete() {
            return Ok(());
        }

        self.reconcile_timer();
        self.timer.start(now)?;
        let running = self.timer.is_running();
        for member in &mut self.members {
            member.dial.set_driven(running && member.dial.mode() == DialMode::Timed);
        }
        debug!(title = %self.title, kind = ?self.kind, "group countdown started");
        Ok(())
    }

    /// Stop the shared clock, preserving elapsed time
    pub fn group_stop(&mut self, now: Instant) {
        if self.timer.is_running() {
            self.timer.stop(now);
            debug!(title = %self.title, elapsed = ?self.timer.elapsed(), "group countdown stopped");
        }
        for member in &mut self.members {
            member.dial.set_driven(false);
        }
    }

    /// Advance the shared clock and propagate fill to every member.
    /// Returns `None` when the group is not running.
    pub fn tick(&mut self, now: Instant, hooks: &mut dyn ClockHooks) -> Option<TimerTick> {
        if !self.timer.is_running() {
            return None;
        }
        let tick = self.timer.tick(now);
        let total = self.timer.total();

        let mut offset = Duration::ZERO;
        for member in &mut self.members {
            let dial = &mut member.dial;
            let (target, remaining) = match self.kind {
                GroupKind::Racing => (
                    proportional_fill(dial.segment_count(), tick.elapsed, total),
                    tick.remaining,
                ),
                GroupKind::Linked => {
                    let window = member.countdown;
                    let local = tick.elapsed.saturating_sub(offset).min(window);
                    offset = offset.saturating_add(window);
                    (
                        proportional_fill(dial.segment_count(), local, window),
                        window - local,
                    )
                }
            };
            if tick.finished {
                dial.set_driven(false);
            }
            hooks.on_tick(dial.id(), remaining);
            dial.set_filled(target, hooks);
        }

        self.refresh_active_index();
        Some(tick)
    }

    /// Countdown left for a member, for the overlay. `None` when no
    /// countdown applies to that dial.
    pub fn remaining_for(&self, id: DialId) -> Option<Duration> {
        let pos = self.position(id)?;
        match self.kind {
            GroupKind::Racing => self.group_timer().map(TimerEngine::remaining),
            GroupKind::Linked => {
                let window = self.members[pos].countdown;
                if window.is_zero() {
                    return None;
                }
                let offset = countdown_span(&self.members[..pos]);
                let local = self.timer.elapsed().saturating_sub(offset).min(window);
                Some(window - local)
            }
        }
    }

    /// Reset the linked shared clock to the sum of member countdowns,
    /// rewinding it
    pub(crate) fn sync_timer_total(&mut self) {
        if self.kind == GroupKind::Linked {
            self.timer.set_total(countdown_span(&self.members));
        }
    }

    /// Bring the linked shared clock up to the fill reached by clicks, so the
    /// countdown resumes where the dials actually are.
    pub(crate) fn reconcile_timer(&mut self) {
        if self.kind != GroupKind::Linked || self.timer.total().is_zero() {
            return;
        }
        let offset = countdown_span(&self.members[..self.active_index]);
        let progress = match self.members.get(self.active_index) {
            Some(member) => {
                let dial = &member.dial;
                let nanos = member.countdown.as_nanos() * u128::from(dial.filled_count())
                    / u128::from(dial.segment_count());
                Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
            }
            None => Duration::ZERO,
        };
        self.timer.fast_forward(offset.saturating_add(progress));
    }
}

/// Member countdowns laid end to end
pub(crate) fn countdown_span(members: &[GroupMember]) -> Duration {
    members
        .iter()
        .fold(Duration::ZERO, |span, m| span.saturating_add(m.countdown))
}

fn check_duration(duration: Duration) -> Result<(), ClockError> {
    if duration > MAX_TIMER_DURATION {
        return Err(ClockError::invalid_state(format!(
            "countdown {duration:?} is longer than the {MAX_TIMER_DURATION:?} maximum"
        )));
    }
    Ok(())
}
