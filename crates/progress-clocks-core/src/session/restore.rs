//! Snapshot conversion with validation
//!
//! Saving is a plain field copy. Restoring validates every dial and group,
//! repairing what can be repaired and recording each repair in a
//! [`RestoreReport`]. Only data with no sensible repair (a segment count
//! outside `1..=MAX_SEGMENTS` or a countdown longer than
//! `MAX_TIMER_DURATION`) aborts the restore with [`ClockError::CorruptSession`].

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::warn;

use super::snapshot::{DialSnapshot, GroupSnapshot, TabSnapshot, TimerSnapshot};
use super::titles::next_numbered_title;
use super::{ClockTab, DANGER_BASE_TITLE};
use crate::dial::{default_label, DialId, DialMode, SegmentDial, DEFAULT_SEGMENTS, MAX_SEGMENTS};
use crate::error::ClockError;
use crate::group::{countdown_span, ClockGroup, GroupKind, GroupMember, MAX_GROUP_DIALS, MIN_GROUP_DIALS};
use crate::theme;
use crate::timer::{TimerEngine, MAX_TIMER_DURATION};

/// Repairs made while restoring a session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    /// One line per repaired value
    pub repairs: Vec<String>,

    /// Tabs of an unknown type that were left out
    pub skipped_tabs: usize,
}

impl RestoreReport {
    /// Create an empty report (nothing repaired)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Check if the restored session differs from the snapshot
    pub fn has_changes(&self) -> bool {
        !self.repairs.is_empty() || self.skipped_tabs > 0
    }

    /// Get a one-line summary of the repairs
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if !self.repairs.is_empty() {
            let noun = if self.repairs.len() == 1 { "repair" } else { "repairs" };
            parts.push(format!("{} {noun}", self.repairs.len()));
        }
        if self.skipped_tabs > 0 {
            let noun = if self.skipped_tabs == 1 { "tab" } else { "tabs" };
            parts.push(format!("{} unknown {noun} skipped", self.skipped_tabs));
        }

        if parts.is_empty() {
            "No repairs needed".to_string()
        } else {
            parts.join(", ")
        }
    }

    fn repair(&mut self, message: String) {
        warn!(repair = %message, "session repaired on restore");
        self.repairs.push(message);
    }
}

/// Builds tabs from snapshots, tracking titles and dial ids already used
pub(crate) struct Restorer {
    now: Instant,
    report: RestoreReport,
    seen_ids: HashSet<DialId>,
    titles: Vec<(TabKindKey, String)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TabKindKey {
    Danger,
    Racing,
    Linked,
}

impl Restorer {
    pub(crate) fn new(now: Instant) -> Self {
        Self {
            now,
            report: RestoreReport::empty(),
            seen_ids: HashSet::new(),
            titles: Vec::new(),
        }
    }

    pub(crate) fn finish(self) -> RestoreReport {
        self.report
    }

    /// Restore one tab. `Ok(None)` means the tab was skipped.
    pub(crate) fn tab(&mut self, index: usize, snapshot: &TabSnapshot) -> Result<Option<ClockTab>, ClockError> {
        let context = format!("tab {}", index + 1);
        let tab = match snapshot {
            TabSnapshot::Danger(dial) => ClockTab::Danger(self.danger(&context, dial)?),
            TabSnapshot::Racing(group) => ClockTab::Group(self.group(&context, GroupKind::Racing, group)?),
            TabSnapshot::Linked(group) => ClockTab::Group(self.group(&context, GroupKind::Linked, group)?),
            TabSnapshot::Unknown => {
                warn!(tab = index + 1, "skipping tab of unknown type");
                self.report.skipped_tabs += 1;
                return Ok(None);
            }
        };
        let key = match &tab {
            ClockTab::Danger(_) => TabKindKey::Danger,
            ClockTab::Group(group) if group.kind() == GroupKind::Racing => TabKindKey::Racing,
            ClockTab::Group(_) => TabKindKey::Linked,
        };
        self.titles.push((key, tab.title().to_string()));
        Ok(Some(tab))
    }

    fn default_title(&self, key: TabKindKey, base: &str) -> String {
        let existing = self
            .titles
            .iter()
            .filter(|(k, _)| *k == key)
            .map(|(_, title)| title.as_str());
        next_numbered_title(existing, base)
    }

    fn segments(&self, context: &str, segments: Option<u32>) -> Result<u32, ClockError> {
        match segments {
            None => Ok(DEFAULT_SEGMENTS),
            Some(0) => Err(ClockError::corrupt(format!("{context}: segment count is zero"))),
            Some(n) if n > MAX_SEGMENTS => Err(ClockError::corrupt(format!(
                "{context}: {n} segments exceeds the maximum of {MAX_SEGMENTS}"
            ))),
            Some(n) => Ok(n),
        }
    }

    fn duration(&self, context: &str, duration: Duration) -> Result<Duration, ClockError> {
        if duration > MAX_TIMER_DURATION {
            return Err(ClockError::corrupt(format!(
                "{context}: countdown of {duration:?} exceeds the maximum of {MAX_TIMER_DURATION:?}"
            )));
        }
        Ok(duration)
    }

    fn claim_id(&mut self, context: &str, id: Option<DialId>) -> DialId {
        match id {
            Some(id) if self.seen_ids.insert(id) => id,
            other => {
                let fresh = DialId::new();
                if let Some(id) = other {
                    self.report.repair(format!("{context}: duplicate dial id {id} replaced"));
                }
                self.seen_ids.insert(fresh);
                fresh
            }
        }
    }

    /// Fields shared by standalone dials and group members
    fn dial(
        &mut self,
        context: &str,
        snapshot: &DialSnapshot,
        segment_count: u32,
        inverted: bool,
        default_title: String,
    ) -> SegmentDial {
        let id = self.claim_id(context, snapshot.id);

        let legacy_filled = snapshot
            .filled_list
            .as_ref()
            .map(|list| u32::try_from(list.iter().filter(|f| **f).count()).unwrap_or(u32::MAX));
        let mut filled_count = snapshot.filled.or(legacy_filled).unwrap_or(0);
        if filled_count > segment_count {
            self.report.repair(format!(
                "{context}: filled count {filled_count} clamped to {segment_count} segments"
            ));
            filled_count = segment_count;
        }

        let wanted = segment_count as usize;
        let labels = match &snapshot.labels {
            Some(saved) => {
                if saved.len() != wanted {
                    self.report.repair(format!(
                        "{context}: {} labels adjusted to {wanted} segments",
                        saved.len()
                    ));
                }
                (0..wanted)
                    .map(|i| saved.get(i).cloned().flatten().unwrap_or_else(|| default_label(i)))
                    .collect()
            }
            None => (0..wanted).map(default_label).collect(),
        };

        let fill_color = snapshot
            .fill_color
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| theme::default_fill_color(inverted).to_string());

        SegmentDial {
            id,
            title: snapshot.title.clone().unwrap_or(default_title),
            segment_count,
            filled_count,
            mode: DialMode::Manual,
            variant: snapshot.variant,
            labels,
            show_labels: snapshot.show_labels,
            fill_color,
            inverted,
            notes: snapshot.notes.clone(),
            timer: None,
            driven: false,
        }
    }

    fn danger(&mut self, context: &str, snapshot: &DialSnapshot) -> Result<SegmentDial, ClockError> {
        let segments = self.segments(context, snapshot.segments)?;
        let title = self.default_title(TabKindKey::Danger, DANGER_BASE_TITLE);
        let mut dial = self.dial(context, snapshot, segments, snapshot.inverted, title);

        if let Some(saved) = snapshot.timer.filter(|t| !t.total.is_zero()) {
            self.duration(context, saved.total)?;
            let timer = self.timer(context, saved, saved.total, saved.running);
            dial.driven = timer.is_running();
            dial.mode = DialMode::Timed;
            dial.timer = Some(timer);
        }
        Ok(dial)
    }

    fn group(&mut self, context: &str, kind: GroupKind, snapshot: &GroupSnapshot) -> Result<ClockGroup, ClockError> {
        let segments = self.segments(context, snapshot.segments)?;
        let key = match kind {
            GroupKind::Racing => TabKindKey::Racing,
            GroupKind::Linked => TabKindKey::Linked,
        };
        let title = snapshot
            .title
            .clone()
            .unwrap_or_else(|| self.default_title(key, kind.base_title()));

        let mut group = ClockGroup::new(kind, title);
        group.notes = snapshot.notes.clone();
        group.segment_count = segments;
        group.inverted = snapshot.inverted;
        group.show_overlay = snapshot.show_overlay;
        group.alarm_enabled = snapshot.beep_on_complete;
        group.overlay_color = snapshot
            .overlay_color
            .clone()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| theme::default_fill_color(snapshot.inverted).to_string());

        let mut dials = snapshot.dials.as_slice();
        if dials.len() > MAX_GROUP_DIALS {
            self.report.repair(format!(
                "{context}: {} dials truncated to {MAX_GROUP_DIALS}",
                dials.len()
            ));
            dials = &dials[..MAX_GROUP_DIALS];
        }
        for (i, saved) in dials.iter().enumerate() {
            let dial_context = format!("{context} dial {}", i + 1);
            let dial = self.dial(&dial_context, saved, segments, snapshot.inverted, format!("Clock {}", i + 1));
            let countdown = match kind {
                GroupKind::Racing => Duration::ZERO,
                GroupKind::Linked => {
                    let countdown = saved
                        .countdown
                        .or(saved.timer_seconds.map(Duration::from_secs))
                        .unwrap_or_default();
                    self.duration(&dial_context, countdown)?
                }
            };
            group.members.push(GroupMember { dial, countdown });
        }
        if group.members.len() < MIN_GROUP_DIALS {
            self.report.repair(format!(
                "{context}: {} dials padded to {MIN_GROUP_DIALS}",
                group.members.len()
            ));
            while group.members.len() < MIN_GROUP_DIALS {
                let id = group.push_member();
                self.seen_ids.insert(id);
            }
        }

        let saved = snapshot.timer.unwrap_or_default();
        group.timer = match kind {
            GroupKind::Racing => {
                let total = self.duration(context, saved.total)?;
                self.timer(context, saved, total, saved.running)
            }
            GroupKind::Linked => {
                let total = countdown_span(&group.members);
                let partial = group.members.iter().any(|m| m.countdown.is_zero())
                    && group.members.iter().any(|m| !m.countdown.is_zero());
                if saved.running && partial {
                    self.report.repair(format!(
                        "{context}: countdown stopped because not every dial has a countdown"
                    ));
                }
                self.timer(context, saved, total, saved.running && !partial)
            }
        };
        group.sync_member_modes();

        let repaired = group.repair_serial_order();
        if repaired > 0 {
            self.report.repair(format!(
                "{context}: fill cleared on {repaired} dial(s) filled out of order"
            ));
        }

        let running = group.timer.is_running();
        for member in &mut group.members {
            member.dial.driven = running && member.dial.mode == DialMode::Timed;
        }
        Ok(group)
    }

    fn timer(&mut self, context: &str, saved: TimerSnapshot, total: Duration, running: bool) -> TimerEngine {
        if saved.elapsed > total {
            self.report.repair(format!(
                "{context}: elapsed {:?} clamped to countdown of {total:?}",
                saved.elapsed
            ));
        }
        TimerEngine::resumed(total, saved.elapsed, running, self.now)
    }
}

pub(crate) fn tab_snapshot(tab: &ClockTab) -> TabSnapshot {
    match tab {
        ClockTab::Danger(dial) => TabSnapshot::Danger(dial_snapshot(dial, None)),
        ClockTab::Group(group) => {
            let snapshot = group_snapshot(group);
            match group.kind() {
                GroupKind::Racing => TabSnapshot::Racing(snapshot),
                GroupKind::Linked => TabSnapshot::Linked(snapshot),
            }
        }
    }
}

fn dial_snapshot(dial: &SegmentDial, countdown: Option<Duration>) -> DialSnapshot {
    DialSnapshot {
        id: Some(dial.id),
        title: Some(dial.title.clone()),
        segments: Some(dial.segment_count),
        filled: Some(dial.filled_count),
        filled_list: None,
        labels: Some(dial.labels.iter().cloned().map(Some).collect()),
        show_labels: dial.show_labels,
        inverted: dial.inverted,
        fill_color: Some(dial.fill_color.clone()),
        notes: dial.notes.clone(),
        variant: dial.variant,
        timer: dial.timer.as_ref().map(timer_snapshot),
        countdown,
        timer_seconds: None,
    }
}

fn group_snapshot(group: &ClockGroup) -> GroupSnapshot {
    let linked = group.kind() == GroupKind::Linked;
    GroupSnapshot {
        title: Some(group.title.clone()),
        segments: Some(group.segment_count),
        inverted: group.inverted,
        notes: group.notes.clone(),
        show_overlay: group.show_overlay,
        beep_on_complete: group.alarm_enabled,
        overlay_color: Some(group.overlay_color.clone()),
        timer: group.group_timer().map(timer_snapshot),
        dials: group
            .members
            .iter()
            .map(|m| dial_snapshot(&m.dial, linked.then_some(m.countdown)))
            .collect(),
    }
}

fn timer_snapshot(timer: &TimerEngine) -> TimerSnapshot {
    TimerSnapshot {
        total: timer.total(),
        elapsed: timer.elapsed(),
        running: timer.is_running(),
    }
}
