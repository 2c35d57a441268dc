//! Dark-mode handling
//!
//! Dark mode inverts the dial background. Fill colours that would vanish
//! against the new background are corrected only for pure black and pure
//! white; any other colour is the user's choice and is left alone.

use crate::dial::DialId;
use crate::events::ClockHooks;

/// Light-mode default fill
pub const BLACK: &str = "#000000";
/// Dark-mode default fill
pub const WHITE: &str = "#FFFFFF";

/// Default fill colour for a dial created in the given mode
pub fn default_fill_color(inverted: bool) -> &'static str {
    if inverted {
        WHITE
    } else {
        BLACK
    }
}

/// Replacement for `color` after switching to `inverted`, if one is needed.
pub fn contrast_swap(color: &str, inverted: bool) -> Option<&'static str> {
    let color = color.trim().to_ascii_lowercase();
    match (inverted, color.as_str()) {
        (true, "#000000" | "black") => Some(WHITE),
        (false, "#ffffff" | "white") => Some(BLACK),
        _ => None,
    }
}

/// Label colour readable on top of a filled segment of colour `bg`.
///
/// Uses relative luminance; unparseable colours are treated as black.
pub fn contrast_text_color(bg: &str) -> &'static str {
    let (r, g, b) = hex_to_rgb(bg).unwrap_or((0, 0, 0));
    let luminance = 0.2126 * (f64::from(r) / 255.0)
        + 0.7152 * (f64::from(g) / 255.0)
        + 0.0722 * (f64::from(b) / 255.0);
    if luminance > 0.6 {
        BLACK
    } else {
        WHITE
    }
}

fn hex_to_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().trim_start_matches('#');
    let hex: String = match hex.len() {
        3 => hex.chars().flat_map(|c| [c, c]).collect(),
        6 => hex.to_string(),
        _ => return None,
    };
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Capability for anything that reacts to a dark-mode toggle.
///
/// The default behaviour only redraws. Implementors override
/// [`correct_contrast`](ThemeReactive::correct_contrast) where a variant needs
/// colour fixes.
pub trait ThemeReactive {
    /// Dials that must be redrawn after a theme change
    fn theme_dials(&self) -> Vec<DialId>;

    /// Variant-specific colour correction for the new theme
    fn correct_contrast(&mut self, _inverted: bool) {}

    /// Apply the theme change and request a redraw of every affected dial
    fn on_theme_changed(&mut self, inverted: bool, hooks: &mut dyn ClockHooks) {
        self.correct_contrast(inverted);
        for id in self.theme_dials() {
            hooks.on_state_changed(id);
        }
    }
}
