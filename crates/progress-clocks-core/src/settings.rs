//! Application Settings
//!
//! Process-wide preferences stored in `settings.json` beside the default
//! session. The desktop shell loads them once at startup and saves them at
//! shutdown (and after a session save); nothing else touches the file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClockError;

/// Window size used when nothing has been remembered
pub const DEFAULT_WINDOW_SIZE: [u32; 2] = [900, 650];

/// Largest remembered window width or height
pub const MAX_WINDOW_EXTENT: u32 = 16_384;

/// Per-user application directory
///
/// `%APPDATA%\ProgressClocks` on Windows, `~/.progress_clocks` elsewhere.
pub fn app_dir() -> PathBuf {
    if cfg!(windows) {
        dirs::data_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("ProgressClocks")
    } else {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".progress_clocks")
    }
}

/// Location of `settings.json`
pub fn settings_path() -> PathBuf {
    app_dir().join("settings.json")
}

/// Session file used by autosave when no other path has been chosen
pub fn default_session_path() -> PathBuf {
    app_dir().join("session.json")
}

/// Work area of a monitor in virtual-screen coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorRect {
    /// Left edge
    pub left: i32,
    /// Top edge
    pub top: i32,
    /// Right edge (exclusive)
    pub right: i32,
    /// Bottom edge (exclusive)
    pub bottom: i32,
}

/// Size and top-left position of the main window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowPlacement {
    /// Window width in pixels
    pub width: u32,
    /// Window height in pixels
    pub height: u32,
    /// Left edge in virtual-screen coordinates
    pub x: i32,
    /// Top edge in virtual-screen coordinates
    pub y: i32,
}

impl WindowPlacement {
    /// Centre a `width` x `height` window inside `rect`. A window larger than
    /// the monitor is pinned to its top-left corner.
    pub fn centered_on(width: u32, height: u32, rect: &MonitorRect) -> Self {
        let x = centre_start(rect.left, rect.right, width);
        let y = centre_start(rect.top, rect.bottom, height);
        Self { width, height, x, y }
    }

    /// Centre point of the window
    pub fn center(&self) -> [i32; 2] {
        [
            to_i32(i64::from(self.x) + i64::from(self.width / 2)),
            to_i32(i64::from(self.y) + i64::from(self.height / 2)),
        ]
    }
}

// Start coordinate that centres `extent` between `start` and `end`
fn centre_start(start: i32, end: i32, extent: u32) -> i32 {
    let span = (i64::from(end) - i64::from(start)).max(1);
    let offset = ((span - i64::from(extent)) / 2).max(0);
    to_i32(i64::from(start) + offset)
}

fn to_i32(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Persisted application preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Reopen `last_session_path` on launch
    pub open_last_on_launch: bool,

    /// Session most recently saved or loaded
    pub last_session_path: Option<PathBuf>,

    /// Centre of the window at last shutdown, used to pick a monitor
    pub last_window_center: Option<[i32; 2]>,

    /// Window size at last shutdown
    pub last_window_size: [u32; 2],
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            open_last_on_launch: false,
            last_session_path: None,
            last_window_center: None,
            last_window_size: DEFAULT_WINDOW_SIZE,
        }
    }
}

impl AppSettings {
    /// Read settings, falling back to defaults when the file is missing or
    /// unreadable. A remembered window size is clamped to
    /// `1..=MAX_WINDOW_EXTENT`.
    pub fn load<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                if e.kind() != io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "could not read settings, using defaults");
                }
                return Self::default();
            }
        };
        let mut settings: Self = serde_json::from_str(&content).unwrap_or_else(|e| {
            warn!(path = %path.display(), error = %e, "invalid settings file, using defaults");
            Self::default()
        });
        let size = settings.last_window_size.map(|v| v.clamp(1, MAX_WINDOW_EXTENT));
        if size != settings.last_window_size {
            warn!(
                path = %path.display(),
                saved = ?settings.last_window_size,
                clamped = ?size,
                "remembered window size out of range"
            );
            settings.last_window_size = size;
        }
        settings
    }

    /// Write settings as pretty JSON, creating the parent directory
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ClockError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Remember the session file for autosave and the next launch
    pub fn remember_session(&mut self, path: impl Into<PathBuf>) {
        self.last_session_path = Some(path.into());
    }

    /// Session to open at startup, if the user asked for it
    pub fn session_to_reopen(&self) -> Option<&Path> {
        if self.open_last_on_launch {
            self.last_session_path.as_deref()
        } else {
            None
        }
    }

    /// Record the window geometry at shutdown
    pub fn record_window(&mut self, placement: &WindowPlacement) {
        self.last_window_size = [placement.width, placement.height];
        self.last_window_center = Some(placement.center());
    }

    /// Placement for the remembered window size, centred on `monitor`.
    ///
    /// The shell picks `monitor` as the one containing
    /// `last_window_center`, or the primary monitor.
    pub fn placement(&self, monitor: &MonitorRect) -> WindowPlacement {
        let [width, height] = self.last_window_size.map(|v| v.clamp(1, MAX_WINDOW_EXTENT));
        WindowPlacement::centered_on(width, height, monitor)
    }
}
