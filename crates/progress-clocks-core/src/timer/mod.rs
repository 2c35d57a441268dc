//! Countdown Timers
//!
//! Timer engine plus the text format used to enter and display countdowns.

mod engine;
mod text;

pub use engine::{proportional_fill, TimerEngine, TimerTick, MAX_TIMER_DURATION};
pub use text::{format_hms, parse_timer_text};
