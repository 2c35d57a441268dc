//! Clock Groups
//!
//! A group is a tab of 2 to 6 dials that share a segment count and dark-mode
//! flag, coordinated by one [`ClockGroup`]:
//!
//! - **Racing** clocks fill independently. An optional race duration drives
//!   every member at once off a single shared clock.
//! - **Linked** clocks fill strictly in order. Only the active dial (the
//!   first one not yet full) accepts clicks, and per-dial countdowns run one
//!   after another off a single shared clock.
//!
//! The group owns its members and its shared timer; members never touch the
//! timer directly.

mod countdown;
mod serial;

pub(crate) use countdown::countdown_span;

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::dial::{DialId, DialMode, SegmentDial, DEFAULT_SEGMENTS, MAX_SEGMENTS};
use crate::error::ClockError;
use crate::events::ClockHooks;
use crate::theme::{self, ThemeReactive};
use crate::timer::TimerEngine;

/// Fewest dials a group offers through add/remove
pub const MIN_GROUP_DIALS: usize = 2;

/// Most dials a group can hold
pub const MAX_GROUP_DIALS: usize = 6;

/// Coordination policy of a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    /// Independent dials, optional simultaneous countdown
    Racing,
    /// Serial dials, sequential countdowns
    Linked,
}

impl GroupKind {
    /// Base title for new tabs of this kind
    pub fn base_title(self) -> &'static str {
        match self {
            GroupKind::Racing => "Racing Clock",
            GroupKind::Linked => "Linked Clocks",
        }
    }
}

/// A member dial plus its own countdown (linked groups only)
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct GroupMember {
    pub(crate) dial: SegmentDial,
    pub(crate) countdown: Duration,
}

/// Coordinator for a Racing or Linked tab.
#[derive(Debug, Clone, PartialEq)]
pub struct ClockGroup {
    pub(crate) kind: GroupKind,
    pub(crate) title: String,
    pub(crate) notes: String,
    pub(crate) segment_count: u32,
    pub(crate) inverted: bool,
    pub(crate) show_overlay: bool,
    pub(crate) alarm_enabled: bool,
    pub(crate) overlay_color: String,
    pub(crate) members: Vec<GroupMember>,
    /// Index of the dial eligible for clicks in a linked group;
    /// equals `members.len()` once every member is full
    pub(crate) active_index: usize,
    /// Shared clock. A zero total means no countdown is configured.
    pub(crate) timer: TimerEngine,
}

impl ClockGroup {
    /// Create a group with no members
    pub fn new(kind: GroupKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            notes: String::new(),
            segment_count: DEFAULT_SEGMENTS,
            inverted: false,
            show_overlay: false,
            alarm_enabled: false,
            overlay_color: theme::default_fill_color(false).to_string(),
            members: Vec::new(),
            active_index: 0,
            timer: TimerEngine::new(Duration::ZERO),
        }
    }

    /// Create a group with `count` dials, clamped to 2..=6
    pub fn with_dials(kind: GroupKind, title: impl Into<String>, count: usize) -> Self {
        let mut group = Self::new(kind, title);
        for _ in 0..count.clamp(MIN_GROUP_DIALS, MAX_GROUP_DIALS) {
            group.push_member();
        }
        group
    }

    /// Coordination policy
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Tab title
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rename the tab
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Free-form notes for the tab
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Replace the tab notes
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Segment count shared by every member
    pub fn segment_count(&self) -> u32 {
        self.segment_count
    }

    /// Whether the group is in dark mode
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Whether remaining time is drawn over the dials
    pub fn show_overlay(&self) -> bool {
        self.show_overlay
    }

    /// Show or hide the remaining-time overlay
    pub fn set_show_overlay(&mut self, show: bool, hooks: &mut dyn ClockHooks) {
        self.show_overlay = show;
        self.redraw_all(hooks);
    }

    /// Whether the audio collaborator should sound on completions
    pub fn alarm_enabled(&self) -> bool {
        self.alarm_enabled
    }

    /// Turn the completion alarm on or off
    pub fn set_alarm_enabled(&mut self, enabled: bool) {
        self.alarm_enabled = enabled;
    }

    /// Colour of the overlay text
    pub fn overlay_color(&self) -> &str {
        &self.overlay_color
    }

    /// Change the overlay colour
    pub fn set_overlay_color(&mut self, color: impl Into<String>, hooks: &mut dyn ClockHooks) {
        self.overlay_color = color.into();
        self.redraw_all(hooks);
    }

    /// Number of member dials
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member dials in order
    pub fn dials(&self) -> impl Iterator<Item = &SegmentDial> {
        self.members.iter().map(|m| &m.dial)
    }

    /// Member dial by id
    pub fn dial(&self, id: DialId) -> Option<&SegmentDial> {
        self.dials().find(|d| d.id() == id)
    }

    /// Member dial by position
    pub fn dial_at(&self, index: usize) -> Option<&SegmentDial> {
        self.members.get(index).map(|m| &m.dial)
    }

    /// Member ids in order
    pub fn dial_ids(&self) -> Vec<DialId> {
        self.dials().map(SegmentDial::id).collect()
    }

    /// Position of a member dial
    pub fn position(&self, id: DialId) -> Option<usize> {
        self.members.iter().position(|m| m.dial.id() == id)
    }

    /// Rename a member dial
    pub fn set_dial_title(&mut self, id: DialId, title: &str, hooks: &mut dyn ClockHooks) -> bool {
        match self.members.iter_mut().find(|m| m.dial.id() == id) {
            Some(member) => {
                member.dial.set_title(title, hooks);
                true
            }
            None => false,
        }
    }

    /// Set a member's notes
    pub fn set_dial_notes(&mut self, id: DialId, notes: &str) -> bool {
        match self.members.iter_mut().find(|m| m.dial.id() == id) {
            Some(member) => {
                member.dial.set_notes(notes);
                true
            }
            None => false,
        }
    }

    /// Whether every member is full
    pub fn is_complete(&self) -> bool {
        !self.members.is_empty() && self.members.iter().all(|m| m.dial.is_complete())
    }

    /// Append a dial. The shared timer is stopped first. Returns `None` when
    /// the group is already at the maximum size.
    pub fn add_dial(&mut self, now: Instant, hooks: &mut dyn ClockHooks) -> Option<DialId> {
        if self.members.len() >= MAX_GROUP_DIALS {
            return None;
        }
        self.group_stop(now);
        let id = self.push_member();
        self.refresh_active_index();
        hooks.on_state_changed(id);
        Some(id)
    }

    /// Remove the last dial. The shared timer is stopped first so no tick
    /// targets a removed dial. Returns `None` at the minimum size.
    pub fn remove_dial(&mut self, now: Instant, hooks: &mut dyn ClockHooks) -> Option<DialId> {
        if self.members.len() <= MIN_GROUP_DIALS {
            return None;
        }
        self.group_stop(now);
        let removed = self.members.pop()?;
        self.sync_timer_total();
        self.refresh_active_index();
        self.redraw_all(hooks);
        Some(removed.dial.id())
    }

    /// Change the shared segment count, rescaling every member
    pub fn set_segments(&mut self, count: u32, hooks: &mut dyn ClockHooks) -> Result<(), ClockError> {
        if count == 0 || count > MAX_SEGMENTS {
            return Err(ClockError::invalid_state(format!(
                "segment count must be between 1 and {MAX_SEGMENTS}, got {count}"
            )));
        }
        self.segment_count = count;
        for member in &mut self.members {
            member.dial.resize(count, hooks)?;
        }
        self.refresh_active_index();
        Ok(())
    }

    /// Toggle dark mode for the whole group
    pub fn set_inverted(&mut self, inverted: bool, hooks: &mut dyn ClockHooks) {
        if self.inverted == inverted {
            return;
        }
        self.inverted = inverted;
        for member in &mut self.members {
            member.dial.inverted = inverted;
        }
        self.on_theme_changed(inverted, hooks);
    }

    /// Reset every member and rewind the shared clock.
    ///
    /// With `reset_timer_to_zero` the configured countdowns are cleared to
    /// `00:00:00` as well, returning every member to manual mode.
    pub fn reset_all(&mut self, clear_labels: bool, reset_timer_to_zero: bool, hooks: &mut dyn ClockHooks) {
        self.timer.rewind();
        if reset_timer_to_zero {
            for member in &mut self.members {
                member.countdown = Duration::ZERO;
            }
            self.timer.set_total(Duration::ZERO);
        }
        for member in &mut self.members {
            member.dial.reset(clear_labels, hooks);
        }
        self.sync_member_modes();
        self.active_index = 0;
        self.refresh_active_index();
        debug!(title = %self.title, clear_labels, reset_timer_to_zero, "group reset");
    }

    pub(crate) fn push_member(&mut self) -> DialId {
        let dial = SegmentDial::new(format!("Clock {}", self.members.len() + 1), self.segment_count)
            .with_inverted(self.inverted);
        let id = dial.id();
        self.members.push(GroupMember {
            dial,
            countdown: Duration::ZERO,
        });
        self.sync_member_modes();
        id
    }

    /// Timed members are those a countdown can drive
    pub(crate) fn sync_member_modes(&mut self) {
        let race_timed = !self.timer.total().is_zero();
        for member in &mut self.members {
            let timed = match self.kind {
                GroupKind::Racing => race_timed,
                GroupKind::Linked => !member.countdown.is_zero(),
            };
            member.dial.set_mode(if timed { DialMode::Timed } else { DialMode::Manual });
        }
    }

    fn redraw_all(&self, hooks: &mut dyn ClockHooks) {
        for member in &self.members {
            hooks.on_state_changed(member.dial.id());
        }
    }
}

impl ThemeReactive for ClockGroup {
    fn theme_dials(&self) -> Vec<DialId> {
        self.dial_ids()
    }

    fn correct_contrast(&mut self, inverted: bool) {
        if let Some(color) = theme::contrast_swap(&self.overlay_color, inverted) {
            self.overlay_color = color.to_string();
        }
        for member in &mut self.members {
            member.dial.correct_contrast(inverted);
        }
    }
}
