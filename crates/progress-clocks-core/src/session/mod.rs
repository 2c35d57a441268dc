//! Session State
//!
//! A session is the ordered list of tabs shown by the desktop shell plus the
//! window placement. It is the unit of save and restore: [`Session::save`]
//! captures a [`SessionSnapshot`] and [`Session::restore`] rebuilds an equal
//! session from it.

pub mod file;
mod restore;
pub mod snapshot;
mod titles;

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, warn};

use crate::dial::{DialId, SegmentDial, DEFAULT_SEGMENTS};
use crate::error::ClockError;
use crate::events::ClockHooks;
use crate::group::{ClockGroup, GroupKind};
use crate::settings::WindowPlacement;
use crate::theme::ThemeReactive;
use crate::timer::TimerTick;

pub use file::{load_session, load_session_or_default, save_session};
pub use restore::RestoreReport;
pub use snapshot::{SessionSnapshot, SESSION_FORMAT_VERSION};
pub use titles::{next_numbered_title, short_title};

/// Base title of Danger Clock tabs
pub const DANGER_BASE_TITLE: &str = "Danger Clock";

/// One tab of the session
#[derive(Debug, Clone, PartialEq)]
pub enum ClockTab {
    /// A single Danger Clock
    Danger(SegmentDial),
    /// Racing or Linked Clocks
    Group(ClockGroup),
}

impl ClockTab {
    /// Full tab title
    pub fn title(&self) -> &str {
        match self {
            ClockTab::Danger(dial) => dial.title(),
            ClockTab::Group(group) => group.title(),
        }
    }

    /// Caption for the tab strip
    pub fn short_title(&self) -> String {
        short_title(self.title())
    }

    /// The dial of a Danger Clock tab
    pub fn as_dial(&self) -> Option<&SegmentDial> {
        match self {
            ClockTab::Danger(dial) => Some(dial),
            ClockTab::Group(_) => None,
        }
    }

    /// Mutable dial of a Danger Clock tab
    pub fn as_dial_mut(&mut self) -> Option<&mut SegmentDial> {
        match self {
            ClockTab::Danger(dial) => Some(dial),
            ClockTab::Group(_) => None,
        }
    }

    /// The group of a Racing or Linked tab
    pub fn as_group(&self) -> Option<&ClockGroup> {
        match self {
            ClockTab::Group(group) => Some(group),
            ClockTab::Danger(_) => None,
        }
    }

    /// Mutable group of a Racing or Linked tab
    pub fn as_group_mut(&mut self) -> Option<&mut ClockGroup> {
        match self {
            ClockTab::Group(group) => Some(group),
            ClockTab::Danger(_) => None,
        }
    }

    /// Whether a countdown on this tab is running
    pub fn is_running(&self) -> bool {
        match self {
            ClockTab::Danger(dial) => dial.timer().is_some_and(|t| t.is_running()),
            ClockTab::Group(group) => group.is_running(),
        }
    }

    /// Stop any running countdown on this tab
    pub fn stop(&mut self, now: Instant) {
        match self {
            ClockTab::Danger(dial) => dial.stop_timer(now),
            ClockTab::Group(group) => group.group_stop(now),
        }
    }

    /// Advance this tab's countdown, if one is running
    pub fn tick(&mut self, now: Instant, hooks: &mut dyn ClockHooks) -> Option<TimerTick> {
        match self {
            ClockTab::Danger(dial) => dial.tick(now, hooks),
            ClockTab::Group(group) => group.tick(now, hooks),
        }
    }

    /// Toggle dark mode for the tab
    pub fn set_inverted(&mut self, inverted: bool, hooks: &mut dyn ClockHooks) {
        match self {
            ClockTab::Danger(dial) => dial.set_inverted(inverted, hooks),
            ClockTab::Group(group) => group.set_inverted(inverted, hooks),
        }
    }
}

impl ThemeReactive for ClockTab {
    fn theme_dials(&self) -> Vec<DialId> {
        match self {
            ClockTab::Danger(dial) => dial.theme_dials(),
            ClockTab::Group(group) => group.theme_dials(),
        }
    }

    fn correct_contrast(&mut self, inverted: bool) {
        match self {
            ClockTab::Danger(dial) => dial.correct_contrast(inverted),
            ClockTab::Group(group) => group.correct_contrast(inverted),
        }
    }
}

/// All tabs of the running application
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    tabs: Vec<ClockTab>,
    window: Option<WindowPlacement>,
}

impl Default for Session {
    /// A fresh session holding one "Danger Clock 1" tab
    fn default() -> Self {
        let mut session = Self::empty();
        session.add_danger_clock(None);
        session
    }
}

impl Session {
    /// A session with no tabs
    pub fn empty() -> Self {
        Self {
            tabs: Vec::new(),
            window: None,
        }
    }

    /// Tabs in display order
    pub fn tabs(&self) -> &[ClockTab] {
        &self.tabs
    }

    /// Tab at `index`
    pub fn tab(&self, index: usize) -> Option<&ClockTab> {
        self.tabs.get(index)
    }

    /// Mutable tab at `index`
    pub fn tab_mut(&mut self, index: usize) -> Option<&mut ClockTab> {
        self.tabs.get_mut(index)
    }

    /// Number of tabs
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Whether every tab has been closed
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Window placement to save with the session
    pub fn window(&self) -> Option<&WindowPlacement> {
        self.window.as_ref()
    }

    /// Record the window placement
    pub fn set_window(&mut self, window: Option<WindowPlacement>) {
        self.window = window;
    }

    /// Append a Danger Clock tab. A missing or blank title is numbered
    /// automatically. Returns the new tab's index.
    pub fn add_danger_clock(&mut self, title: Option<&str>) -> usize {
        let title = self.title_or_next(title, None);
        self.push(ClockTab::Danger(SegmentDial::new(title, DEFAULT_SEGMENTS)))
    }

    /// Append a Racing Clocks tab with `count` dials (clamped to 2..=6)
    pub fn add_racing_clocks(&mut self, title: Option<&str>, count: usize) -> usize {
        self.add_group(GroupKind::Racing, title, count)
    }

    /// Append a Linked Clocks tab with `count` dials (clamped to 2..=6)
    pub fn add_linked_clocks(&mut self, title: Option<&str>, count: usize) -> usize {
        self.add_group(GroupKind::Linked, title, count)
    }

    fn add_group(&mut self, kind: GroupKind, title: Option<&str>, count: usize) -> usize {
        let title = self.title_or_next(title, Some(kind));
        self.push(ClockTab::Group(ClockGroup::with_dials(kind, title, count)))
    }

    fn push(&mut self, tab: ClockTab) -> usize {
        debug!(title = %tab.title(), "tab added");
        self.tabs.push(tab);
        self.tabs.len() - 1
    }

    fn title_or_next(&self, title: Option<&str>, kind: Option<GroupKind>) -> String {
        if let Some(title) = title.map(str::trim).filter(|t| !t.is_empty()) {
            return title.to_string();
        }
        let base = kind.map_or(DANGER_BASE_TITLE, GroupKind::base_title);
        let existing = self
            .tabs
            .iter()
            .filter(|tab| match tab {
                ClockTab::Danger(_) => kind.is_none(),
                ClockTab::Group(group) => Some(group.kind()) == kind,
            })
            .map(ClockTab::title);
        next_numbered_title(existing, base)
    }

    /// Close a tab, stopping its countdown first
    pub fn remove_tab(&mut self, index: usize, now: Instant) -> Option<ClockTab> {
        if index >= self.tabs.len() {
            return None;
        }
        let mut tab = self.tabs.remove(index);
        tab.stop(now);
        debug!(title = %tab.title(), "tab removed");
        Some(tab)
    }

    /// Advance every running countdown
    pub fn tick(&mut self, now: Instant, hooks: &mut dyn ClockHooks) {
        for tab in &mut self.tabs {
            tab.tick(now, hooks);
        }
    }

    /// Stop every running countdown
    pub fn stop_all(&mut self, now: Instant) {
        for tab in &mut self.tabs {
            tab.stop(now);
        }
    }

    /// Capture the whole session
    pub fn save(&self) -> SessionSnapshot {
        SessionSnapshot {
            version: SESSION_FORMAT_VERSION,
            saved_at: Some(Utc::now().to_rfc3339()),
            items: self.tabs.iter().map(restore::tab_snapshot).collect(),
            window: self.window,
        }
    }

    /// Rebuild a session from a snapshot. Running countdowns resume with
    /// `now` as their reference.
    pub fn restore(snapshot: &SessionSnapshot, now: Instant) -> Result<Self, ClockError> {
        Self::restore_with_report(snapshot, now).map(|(session, _)| session)
    }

    /// Rebuild a session and report every repair made along the way
    pub fn restore_with_report(
        snapshot: &SessionSnapshot,
        now: Instant,
    ) -> Result<(Self, RestoreReport), ClockError> {
        if snapshot.version > SESSION_FORMAT_VERSION {
            warn!(
                version = snapshot.version,
                supported = SESSION_FORMAT_VERSION,
                "session written by a newer version, unknown fields are ignored"
            );
        }

        let mut restorer = restore::Restorer::new(now);
        let mut tabs = Vec::with_capacity(snapshot.items.len());
        for (index, item) in snapshot.items.iter().enumerate() {
            if let Some(tab) = restorer.tab(index, item)? {
                tabs.push(tab);
            }
        }

        let session = Self {
            tabs,
            window: snapshot.window,
        };
        Ok((session, restorer.finish()))
    }
}

impl ThemeReactive for Session {
    fn theme_dials(&self) -> Vec<DialId> {
        self.tabs.iter().flat_map(ThemeReactive::theme_dials).collect()
    }

    fn correct_contrast(&mut self, inverted: bool) {
        for tab in &mut self.tabs {
            tab.correct_contrast(inverted);
        }
    }
}
