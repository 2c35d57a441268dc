//! # Progress Clocks Core Library
//!
//! Segment-fill state machine behind the Progress Clocks desktop app.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Segment dials filled by clicks or by a countdown
//! - Racing and Linked clock groups sharing one countdown clock
//! - Countdown text parsing and `HH:MM:SS` formatting
//! - Dark-mode contrast correction
//! - Session save/restore with validation, and application settings
//!
//! The library owns no threads and no timers. The desktop shell delivers
//! clicks and periodic ticks as plain calls, passing the current
//! [`Instant`](std::time::Instant), and receives redraw, alarm and overlay
//! notifications through [`ClockHooks`](events::ClockHooks).
//!
//! ## Example
//!
//! ```rust
//! use std::time::{Duration, Instant};
//! use progress_clocks_core::prelude::*;
//!
//! let start = Instant::now();
//! let mut events: Vec<ClockEvent> = Vec::new();
//!
//! let mut dial = SegmentDial::new("Danger Clock 1", 4);
//! dial.attach_timer(parse_timer_text("4:00")?);
//! dial.start_timer(start)?;
//!
//! dial.tick(start + Duration::from_secs(60), &mut events);
//! assert_eq!(dial.filled_count(), 1);
//! # Ok::<(), ClockError>(())
//! ```

pub mod dial;
pub mod error;
pub mod events;
pub mod group;
pub mod session;
pub mod settings;
pub mod theme;
pub mod timer;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::dial::{DialId, DialMode, DialVariant, SegmentDial};
    pub use crate::error::ClockError;
    pub use crate::events::{ClockEvent, ClockHooks, NullHooks};
    pub use crate::group::{ClockGroup, GroupKind};
    pub use crate::session::{ClockTab, RestoreReport, Session, SessionSnapshot};
    pub use crate::settings::{AppSettings, MonitorRect, WindowPlacement};
    pub use crate::theme::ThemeReactive;
    pub use crate::timer::{format_hms, parse_timer_text, TimerEngine, TimerTick};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
