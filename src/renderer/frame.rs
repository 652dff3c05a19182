//! Frame painting
//!
//! Turns a textual frame into the byte stream that puts it on screen. A
//! frame is lines separated by `\n`, possibly carrying SGR styling. Every
//! line is addressed with an absolute cursor move, so output does not depend
//! on the device translating `\n`.

use std::fmt::Write;

use crate::ansi::{self, Token};

const RESET: &str = "\x1b[0m";
const CLEAR_SCREEN: &str = "\x1b[2J";
const CLEAR_LINE: &str = "\x1b[2K";
const CLEAR_TO_EOL: &str = "\x1b[K";
const SYNC_BEGIN: &str = "\x1b[?2026h";
const SYNC_END: &str = "\x1b[?2026l";

fn move_to_row(out: &mut String, row: usize) {
    let _ = write!(out, "\x1b[{};1H", row + 1);
}

/// SGR state in effect at the start of each line
///
/// Styling set on one line stays active on the next until reset, so a line
/// repainted alone must be prefixed with what earlier lines left behind.
fn carried_styles<'a>(lines: &[&'a str]) -> Vec<Vec<&'a str>> {
    let mut active: Vec<&'a str> = Vec::new();
    let mut carried = Vec::with_capacity(lines.len());

    for &line in lines {
        carried.push(active.clone());
        for token in ansi::tokens(line) {
            apply_sgr(&mut active, token);
        }
    }
    carried
}

fn apply_sgr<'a>(active: &mut Vec<&'a str>, token: Token<'a>) {
    let Some(params) = token.sgr_params() else {
        return;
    };
    let first = params.split(';').next().unwrap_or("");
    if first.is_empty() || first == "0" {
        active.clear();
        if params.is_empty() || params == "0" {
            return;
        }
    }
    active.push(token.as_str());
}

/// Repaint everything
pub(crate) fn paint_full(next: &str, synchronized: bool) -> String {
    let mut out = String::with_capacity(next.len() + 64);
    if synchronized {
        out.push_str(SYNC_BEGIN);
    }
    out.push_str(RESET);
    out.push_str(CLEAR_SCREEN);

    for (row, line) in next.lines().enumerate() {
        move_to_row(&mut out, row);
        out.push_str(line);
    }

    out.push_str(RESET);
    if synchronized {
        out.push_str(SYNC_END);
    }
    out
}

/// Rewrite only the lines that differ from `previous`
///
/// Returns an empty string when nothing changed.
pub(crate) fn paint_diff(previous: &str, next: &str, synchronized: bool) -> String {
    let old: Vec<&str> = previous.lines().collect();
    let new: Vec<&str> = next.lines().collect();
    let carried = carried_styles(&new);
    let old_carried = carried_styles(&old);

    let mut body = String::new();
    for (row, line) in new.iter().enumerate() {
        let before = old.get(row).copied();
        // Same text under a different inherited style still needs a repaint
        if before == Some(*line) && old_carried.get(row) == Some(&carried[row]) {
            continue;
        }

        move_to_row(&mut body, row);
        body.push_str(RESET);
        for style in &carried[row] {
            body.push_str(style);
        }
        body.push_str(line);

        if let Some(before) = before {
            if ansi::display_width(line) < ansi::display_width(before) {
                // Erase with the default background, as a full paint would
                body.push_str(RESET);
                body.push_str(CLEAR_TO_EOL);
            }
        }
    }

    for row in new.len()..old.len() {
        move_to_row(&mut body, row);
        body.push_str(RESET);
        body.push_str(CLEAR_LINE);
    }

    if body.is_empty() {
        return body;
    }

    let mut out = String::with_capacity(body.len() + 24);
    if synchronized {
        out.push_str(SYNC_BEGIN);
    }
    out.push_str(&body);
    out.push_str(RESET);
    if synchronized {
        out.push_str(SYNC_END);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_addresses_every_line() {
        let out = paint_full("ab\ncd", false);
        assert_eq!(out, "\x1b[0m\x1b[2J\x1b[1;1Hab\x1b[2;1Hcd\x1b[0m");
    }

    #[test]
    fn test_full_synchronized() {
        let out = paint_full("x", true);
        assert!(out.starts_with(SYNC_BEGIN));
        assert!(out.ends_with(SYNC_END));
    }

    #[test]
    fn test_diff_unchanged_is_empty() {
        assert_eq!(paint_diff("a\nb", "a\nb", true), "");
    }

    #[test]
    fn test_diff_only_changed_lines() {
        let out = paint_diff("one\ntwo\nthree", "one\nTWO\nthree", false);
        assert_eq!(out, "\x1b[2;1H\x1b[0mTWO\x1b[0m");
    }

    #[test]
    fn test_diff_shorter_line_erases_tail() {
        let out = paint_diff("hello", "hi", false);
        assert_eq!(out, "\x1b[1;1H\x1b[0mhi\x1b[0m\x1b[K\x1b[0m");

        // Same visible width despite added styling: no erase
        let out = paint_diff("ab", "\x1b[1mab", false);
        assert!(!out.contains(CLEAR_TO_EOL));
    }

    #[test]
    fn test_diff_removed_lines_cleared() {
        let out = paint_diff("a\nb\nc", "a", false);
        assert_eq!(out, "\x1b[2;1H\x1b[0m\x1b[2K\x1b[3;1H\x1b[0m\x1b[2K\x1b[0m");
    }

    #[test]
    fn test_diff_carries_styles() {
        let prev = "\x1b[1m\x1b[31mtitle\nbody";
        let next = "\x1b[1m\x1b[31mtitle\nBODY";
        let out = paint_diff(prev, next, false);
        assert_eq!(out, "\x1b[2;1H\x1b[0m\x1b[1m\x1b[31mBODY\x1b[0m");
    }

    #[test]
    fn test_diff_repaints_rows_when_carried_style_changes() {
        let out = paint_diff("\x1b[31mA\nB", "\x1b[32mA\nB", false);
        assert_eq!(
            out,
            "\x1b[1;1H\x1b[0m\x1b[32mA\x1b[2;1H\x1b[0m\x1b[32mB\x1b[0m"
        );

        // Text and inherited style both unchanged: row 2 is skipped
        let out = paint_diff("\x1b[31mA\nB", "\x1b[31mA!\nB", false);
        assert!(!out.contains("\x1b[2;1H"));
    }

    #[test]
    fn test_diff_erases_tail_with_default_background() {
        let out = paint_diff("hello world", "\x1b[41mhi", false);
        assert!(out.contains("hi\x1b[0m\x1b[K"));
        assert!(!out.contains("hi\x1b[K"));

        let out = paint_diff("\x1b[44mlong line\nrow", "\x1b[44mshort\nrow", false);
        assert_eq!(out, "\x1b[1;1H\x1b[0m\x1b[44mshort\x1b[0m\x1b[K\x1b[0m");
    }

    #[test]
    fn test_reset_ends_carry() {
        let lines = ["\x1b[4mu\x1b[0m", "\x1b[0;32mg", "x"];
        let carried = carried_styles(&lines);
        assert!(carried[0].is_empty());
        assert!(carried[1].is_empty());
        assert_eq!(carried[2], vec!["\x1b[0;32m"]);
    }
}
