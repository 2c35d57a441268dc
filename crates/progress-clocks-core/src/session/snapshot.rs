//! Serializable session snapshot
//!
//! The JSON layout follows the session files written by earlier releases: a
//! top-level `items` list with one object per tab, tagged by `type`. Every
//! field has a default so files written by older or newer versions load;
//! unknown tab types deserialize to [`TabSnapshot::Unknown`] and are skipped.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::dial::{DialId, DialVariant};
use crate::error::ClockError;
use crate::settings::WindowPlacement;

/// Snapshot format written by this version.
///
/// Version 0 is the unversioned format, whose dials may carry `filled_list`
/// and `timer_seconds`.
pub const SESSION_FORMAT_VERSION: u32 = 1;

/// Whole-session snapshot
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    /// Format version (0 when absent)
    pub version: u32,

    /// RFC 3339 time of the save
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<String>,

    /// Tabs in display order
    pub items: Vec<TabSnapshot>,

    /// Main window placement at save time
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window: Option<WindowPlacement>,
}

impl SessionSnapshot {
    /// Parse snapshot JSON
    pub fn from_json(json: &str) -> Result<Self, ClockError> {
        serde_json::from_str(json).map_err(|e| ClockError::corrupt(e.to_string()))
    }

    /// Render as pretty JSON
    pub fn to_json(&self) -> Result<String, ClockError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e).into())
    }
}

/// One tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TabSnapshot {
    /// Single Danger Clock
    Danger(DialSnapshot),
    /// Racing Clocks group
    Racing(GroupSnapshot),
    /// Linked Clocks group
    Linked(GroupSnapshot),
    /// Tab type written by a newer version
    #[serde(other)]
    Unknown,
}

/// One dial, standalone or a group member
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DialSnapshot {
    /// Dial id; missing or duplicate ids get a fresh one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<DialId>,
    /// Dial title
    pub title: Option<String>,
    /// Ignored for group members, which share the group's count
    pub segments: Option<u32>,
    /// Filled segment count
    pub filled: Option<u32>,
    /// Legacy fill pattern; its `true` count stands in for `filled`
    #[serde(skip_serializing)]
    pub filled_list: Option<Vec<bool>>,
    /// Segment labels; `null` entries take the default label
    pub labels: Option<Vec<Option<String>>>,
    /// Whether labels are drawn
    pub show_labels: bool,
    /// Ignored for group members, which share the group's flag
    pub inverted: bool,
    /// Fill colour
    pub fill_color: Option<String>,
    /// Free-form notes
    pub notes: String,
    /// Dial flavour
    pub variant: DialVariant,
    /// Countdown attached to a standalone dial
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerSnapshot>,
    /// Linked member countdown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub countdown: Option<Duration>,
    /// Legacy linked member countdown in whole seconds
    #[serde(skip_serializing)]
    pub timer_seconds: Option<u64>,
}

/// Racing or Linked tab
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupSnapshot {
    /// Tab title
    pub title: Option<String>,
    /// Segment count shared by every member
    pub segments: Option<u32>,
    /// Dark mode flag
    pub inverted: bool,
    /// Free-form notes
    pub notes: String,
    /// Remaining-time overlay
    pub show_overlay: bool,
    /// "Enable Timer Alarms"
    pub beep_on_complete: bool,
    /// Overlay text colour
    pub overlay_color: Option<String>,
    /// Shared clock; the total of a linked group is rebuilt from member
    /// countdowns
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timer: Option<TimerSnapshot>,
    /// Member dials in order
    pub dials: Vec<DialSnapshot>,
}

/// Timer state at save time. A running timer resumes on restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerSnapshot {
    /// Full countdown duration
    pub total: Duration,
    /// Elapsed time at the last tick or stop
    pub elapsed: Duration,
    /// Whether the countdown was running
    pub running: bool,
}
