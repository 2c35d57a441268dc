//! Segment Dial
//!
//! A dial is a circle split into `segment_count` equal segments, filled in
//! order from the top. Every mutation reports through [`ClockHooks`]: a
//! redraw request for any change, and a completion notice on the transition
//! from not-full to full.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ClockError;
use crate::events::ClockHooks;
use crate::theme::{self, ThemeReactive};
use crate::timer::{TimerEngine, TimerTick, MAX_TIMER_DURATION};

/// Segment count for new dials
pub const DEFAULT_SEGMENTS: u32 = 4;

/// Largest segment count a dial may have
pub const MAX_SEGMENTS: u32 = 64;

/// Stable identifier of a dial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DialId(Uuid);

impl DialId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DialId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DialId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Which fill source owns a dial
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialMode {
    /// Filled by clicks
    #[default]
    Manual,
    /// Filled by a countdown; clicks only while the countdown is stopped
    Timed,
}

/// Dial flavour, used to pick theme behaviour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialVariant {
    /// Danger-style dial; swaps a pure black/white fill on theme change
    #[default]
    Danger,
    /// Dial that keeps its fill colour on theme change
    Plain,
}

/// Default label for the segment at `index`
pub fn default_label(index: usize) -> String {
    format!("Segment {}", index + 1)
}

pub(crate) fn default_labels(count: u32) -> Vec<String> {
    (0..count as usize).map(default_label).collect()
}

/// One progress dial.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentDial {
    pub(crate) id: DialId,
    pub(crate) title: String,
    pub(crate) segment_count: u32,
    pub(crate) filled_count: u32,
    pub(crate) mode: DialMode,
    pub(crate) variant: DialVariant,
    pub(crate) labels: Vec<String>,
    pub(crate) show_labels: bool,
    pub(crate) fill_color: String,
    pub(crate) inverted: bool,
    pub(crate) notes: String,
    /// Countdown attached to a standalone dial
    pub(crate) timer: Option<TimerEngine>,
    /// True while a running countdown (own or group) drives the fill
    pub(crate) driven: bool,
}

impl SegmentDial {
    /// Create an empty manual dial. The segment count is clamped to
    /// `1..=MAX_SEGMENTS`.
    pub fn new(title: impl Into<String>, segment_count: u32) -> Self {
        let segment_count = segment_count.clamp(1, MAX_SEGMENTS);
        Self {
            id: DialId::new(),
            title: title.into(),
            segment_count,
            filled_count: 0,
            mode: DialMode::Manual,
            variant: DialVariant::Danger,
            labels: default_labels(segment_count),
            show_labels: false,
            fill_color: theme::default_fill_color(false).to_string(),
            inverted: false,
            notes: String::new(),
            timer: None,
            driven: false,
        }
    }

    /// Start in dark mode, with the matching default fill
    pub fn with_inverted(mut self, inverted: bool) -> Self {
        self.inverted = inverted;
        self.fill_color = theme::default_fill_color(inverted).to_string();
        self
    }

    /// Set the dial flavour
    pub fn with_variant(mut self, variant: DialVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Set the fill colour
    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = color.into();
        self
    }

    /// Stable identifier
    pub fn id(&self) -> DialId {
        self.id
    }

    /// Title shown above the dial
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Rename the dial
    pub fn set_title(&mut self, title: impl Into<String>, hooks: &mut dyn ClockHooks) {
        self.title = title.into();
        hooks.on_state_changed(self.id);
    }

    /// Number of segments
    pub fn segment_count(&self) -> u32 {
        self.segment_count
    }

    /// Number of filled segments
    pub fn filled_count(&self) -> u32 {
        self.filled_count
    }

    /// Current fill source
    pub fn mode(&self) -> DialMode {
        self.mode
    }

    /// Dial flavour
    pub fn variant(&self) -> DialVariant {
        self.variant
    }

    /// One label per segment
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Whether segment labels are drawn
    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    /// Show or hide segment labels
    pub fn set_show_labels(&mut self, show: bool, hooks: &mut dyn ClockHooks) {
        self.show_labels = show;
        hooks.on_state_changed(self.id);
    }

    /// Fill colour as a hex string or colour name
    pub fn fill_color(&self) -> &str {
        &self.fill_color
    }

    /// Change the fill colour
    pub fn set_fill_color(&mut self, color: impl Into<String>, hooks: &mut dyn ClockHooks) {
        self.fill_color = color.into();
        hooks.on_state_changed(self.id);
    }

    /// Whether the dial is in dark mode
    pub fn inverted(&self) -> bool {
        self.inverted
    }

    /// Toggle dark mode, running the theme hook when the flag changes
    pub fn set_inverted(&mut self, inverted: bool, hooks: &mut dyn ClockHooks) {
        if self.inverted != inverted {
            self.inverted = inverted;
            self.on_theme_changed(inverted, hooks);
        }
    }

    /// Free-form notes
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Replace the notes
    pub fn set_notes(&mut self, notes: impl Into<String>) {
        self.notes = notes.into();
    }

    /// Whether every segment is filled
    pub fn is_complete(&self) -> bool {
        self.filled_count >= self.segment_count
    }

    /// Whether clicks may change the fill right now
    pub fn accepts_clicks(&self) -> bool {
        self.mode == DialMode::Manual || !self.driven
    }

    /// Fill one more segment. Returns false when nothing changed.
    pub fn fill_next(&mut self, hooks: &mut dyn ClockHooks) -> bool {
        if !self.accepts_clicks() || self.is_complete() {
            return false;
        }
        let was_full = self.is_complete();
        self.filled_count += 1;
        self.commit(was_full, hooks);
        true
    }

    /// Unfill the last filled segment of a manual dial.
    pub fn unfill_last(&mut self, hooks: &mut dyn ClockHooks) -> bool {
        if self.mode != DialMode::Manual || self.filled_count == 0 {
            return false;
        }
        self.filled_count -= 1;
        hooks.on_state_changed(self.id);
        true
    }

    /// Raise the fill to `target` (clamped). Timed fill never retreats, so a
    /// lower target is ignored.
    pub fn set_filled(&mut self, target: u32, hooks: &mut dyn ClockHooks) -> bool {
        let target = target.min(self.segment_count);
        if target <= self.filled_count {
            return false;
        }
        let was_full = self.is_complete();
        self.filled_count = target;
        self.commit(was_full, hooks);
        true
    }

    /// Empty the dial, optionally restoring default labels. An attached
    /// countdown is stopped and rewound.
    pub fn reset(&mut self, clear_labels: bool, hooks: &mut dyn ClockHooks) {
        self.filled_count = 0;
        if clear_labels {
            self.labels = default_labels(self.segment_count);
        }
        if let Some(timer) = self.timer.as_mut() {
            timer.rewind();
        }
        self.driven = false;
        hooks.on_state_changed(self.id);
    }

    /// Change the segment count, rescaling the fill proportionally.
    pub fn resize(&mut self, new_count: u32, hooks: &mut dyn ClockHooks) -> Result<(), ClockError> {
        if new_count == 0 {
            return Err(ClockError::invalid_state("a dial needs at least one segment"));
        }
        if new_count > MAX_SEGMENTS {
            return Err(ClockError::invalid_state(format!(
                "a dial has at most {MAX_SEGMENTS} segments, got {new_count}"
            )));
        }
        let old_count = u64::from(self.segment_count);
        let was_full = self.is_complete();
        // round(filled * new / old), halves rounding up
        let scaled = (u64::from(self.filled_count) * u64::from(new_count) * 2 + old_count)
            / (old_count * 2);

        self.segment_count = new_count;
        self.filled_count = (scaled as u32).min(new_count);
        self.labels.truncate(new_count as usize);
        while self.labels.len() < new_count as usize {
            self.labels.push(default_label(self.labels.len()));
        }
        self.commit(was_full, hooks);
        Ok(())
    }

    /// Set the label of one segment. Out-of-range indices are ignored.
    pub fn set_label(&mut self, index: usize, text: &str, hooks: &mut dyn ClockHooks) -> bool {
        match self.labels.get_mut(index) {
            Some(label) => {
                *label = text.trim().to_string();
                hooks.on_state_changed(self.id);
                true
            }
            None => false,
        }
    }

    /// Attached countdown, if any
    pub fn timer(&self) -> Option<&TimerEngine> {
        self.timer.as_ref()
    }

    /// Attach a countdown that fills the whole dial over `duration`.
    /// A zero duration detaches the countdown and makes the dial manual.
    /// Durations above `MAX_TIMER_DURATION` are clamped.
    pub fn attach_timer(&mut self, duration: Duration) {
        let duration = duration.min(MAX_TIMER_DURATION);
        if duration.is_zero() {
            self.timer = None;
            self.mode = DialMode::Manual;
        } else {
            self.timer = Some(TimerEngine::new(duration));
            self.mode = DialMode::Timed;
        }
        self.driven = false;
    }

    /// Start or resume the attached countdown
    pub fn start_timer(&mut self, now: Instant) -> Result<(), ClockError> {
        let timer = self
            .timer
            .as_mut()
            .ok_or_else(|| ClockError::invalid_state("dial has no countdown attached"))?;
        timer.start(now)?;
        self.driven = timer.is_running();
        Ok(())
    }

    /// Stop the attached countdown, keeping its elapsed time
    pub fn stop_timer(&mut self, now: Instant) {
        if let Some(timer) = self.timer.as_mut() {
            timer.stop(now);
        }
        self.driven = false;
    }

    /// Advance the attached countdown. Returns `None` when it is not running.
    pub fn tick(&mut self, now: Instant, hooks: &mut dyn ClockHooks) -> Option<TimerTick> {
        let timer = self.timer.as_mut().filter(|t| t.is_running())?;
        let tick = timer.tick(now);
        let target = timer.target_filled(self.segment_count);
        if tick.finished {
            self.driven = false;
        }
        hooks.on_tick(self.id, tick.remaining);
        self.set_filled(target, hooks);
        Some(tick)
    }

    pub(crate) fn set_mode(&mut self, mode: DialMode) {
        self.mode = mode;
    }

    pub(crate) fn set_driven(&mut self, driven: bool) {
        self.driven = driven;
    }

    fn commit(&mut self, was_full: bool, hooks: &mut dyn ClockHooks) {
        hooks.on_state_changed(self.id);
        if !was_full && self.is_complete() {
            hooks.on_dial_complete(self.id);
        }
    }
}

impl ThemeReactive for SegmentDial {
    fn theme_dials(&self) -> Vec<DialId> {
        vec![self.id]
    }

    fn correct_contrast(&mut self, inverted: bool) {
        if self.variant == DialVariant::Danger {
            if let Some(color) = theme::contrast_swap(&self.fill_color, inverted) {
                self.fill_color = color.to_string();
            }
        }
    }
}
