//! # User Text Normalization
//!
//! Markdown folds consecutive lines into one paragraph, and a blank line the
//! user typed disappears entirely. People typing into the composer expect
//! their lines to stick, so user messages are rewritten once, at render
//! time, before they reach the renderer:
//!
//! ```text
//! "Buy milk\nthen call"   →  "Buy milk&nbsp;\n\nthen call&nbsp;\n"
//! "\\"                    →  "&nbsp;\n"          (explicit blank line)
//! "- eggs\n- bread"       →  "- eggs\n- bread"   (lists untouched)
//! ```
//!
//! Lines inside a list, and the line directly before one, are left alone so
//! the renderer still recognises the list block.
//!
//! Not idempotent: feeding the output back in appends more markers. Only ever
//! normalize the text as the user authored it.

use std::sync::LazyLock;

use regex::Regex;

/// Appended to a line to force a hard visual break.
pub const BREAK_MARKER: &str = "&nbsp;\n";

static LIST_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[*\-+]\s+|^\s*\d+\.\s+").expect("list-line pattern is valid")
});

/// Whether `line` opens a bullet (`*`, `-`, `+`) or numbered (`12.`) list item.
pub fn is_list_line(line: &str) -> bool {
    LIST_LINE.is_match(line)
}

/// Rewrites user-authored text so every intended line break survives rendering.
pub fn normalize(text: &str) -> String {
    let lines: Vec<&str> = text.split('\n').collect();

    lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let next_is_list = lines.get(i + 1).is_some_and(|next| is_list_line(next));
            if is_list_line(line) || next_is_list {
                (*line).to_string()
            } else if line.trim() == "\\" {
                line.replacen('\\', BREAK_MARKER, 1)
            } else {
                format!("{line}{BREAK_MARKER}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
