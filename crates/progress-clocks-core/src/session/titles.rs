//! Tab title helpers

/// Longest tab caption before truncation
const SHORT_TITLE_CHARS: usize = 18;

/// `"{base} {n}"` with the smallest `n >= 1` not already used.
///
/// A title equal to `base` itself counts as number 1.
pub fn next_numbered_title<'a>(existing: impl IntoIterator<Item = &'a str>, base: &str) -> String {
    let mut used = Vec::new();
    for title in existing {
        let title = title.trim();
        if title == base {
            used.push(1);
        } else if let Some(tail) = title.strip_prefix(base).and_then(|t| t.strip_prefix(' ')) {
            if let Ok(n) = tail.trim().parse::<u32>() {
                used.push(n);
            }
        }
    }
    let n = (1..).find(|n| !used.contains(n)).unwrap_or(1);
    format!("{base} {n}")
}

/// Tab caption: the trimmed title, cut to 18 characters plus an ellipsis
pub fn short_title(title: &str) -> String {
    let title = title.trim();
    let title = if title.is_empty() { "Clock" } else { title };
    if title.chars().count() > SHORT_TITLE_CHARS {
        let cut: String = title.chars().take(SHORT_TITLE_CHARS).collect();
        format!("{cut}…")
    } else {
        title.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_title_is_one() {
        assert_eq!(next_numbered_title([], "Danger Clock"), "Danger Clock 1");
    }

    #[test]
    fn test_fills_gaps() {
        let existing = ["Danger Clock", "Danger Clock 3", "Something else"];
        assert_eq!(next_numbered_title(existing, "Danger Clock"), "Danger Clock 2");
    }

    #[test]
    fn test_ignores_non_numeric_suffix() {
        let existing = ["Linked Clocks 1", "Linked Clocks two"];
        assert_eq!(next_numbered_title(existing, "Linked Clocks"), "Linked Clocks 2");
    }

    #[test]
    fn test_short_title() {
        assert_eq!(short_title("  Doom  "), "Doom");
        assert_eq!(short_title(""), "Clock");
        assert_eq!(short_title("The Cult Summons The Beast"), "The Cult Summons T…");
    }
}
