pub mod checks;
pub mod detail;
pub mod footer;
pub mod header;
pub mod render;
pub mod startup;
pub mod tree;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const SPINNER: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub fn spinner(frame: usize) -> char {
    SPINNER[frame % SPINNER.len()]
}

/// Cuts `s` to `max_width` terminal columns, ending in `…` when shortened.
pub fn truncate(s: &str, max_width: usize) -> String {
    if UnicodeWidthStr::width(s) <= max_width {
        return s.to_string();
    }
    let mut out = String::new();
    let mut width = 0;
    for c in s.chars() {
        let cw = c.width().unwrap_or(0);
        if width + cw + 1 > max_width {
            out.push('…');
            break;
        }
        out.push(c);
        width += cw;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_wraps_around() {
        assert_eq!(spinner(0), spinner(SPINNER.len()));
        let _ = spinner(usize::MAX);
    }

    #[test]
    fn truncate_short_is_unchanged() {
        assert_eq!(truncate("make test", 20), "make test");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        assert_eq!(truncate("actions/checkout@v2", 10), "actions/c…");
        assert_eq!(UnicodeWidthStr::width(truncate("actions/checkout@v2", 10).as_str()), 10);
    }

    #[test]
    fn truncate_counts_wide_chars() {
        let out = truncate("テストテスト", 7);
        assert!(UnicodeWidthStr::width(out.as_str()) <= 7);
        assert!(out.ends_with('…'));
    }
}
