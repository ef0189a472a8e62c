//! Line-number marker normalization.
//!
//! Reference and candidate toolchains may disagree on the line index they embed
//! in diagnostics (`#12` vs `#13`). Those markers are rewritten to a fixed
//! placeholder before comparison.

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::Regex;

/// Placeholder substituted for every `#<digits>` marker.
pub const LINE_PLACEHOLDER: &str = "#LINE";

static LINE_MARKER: OnceLock<Regex> = OnceLock::new();

fn line_marker() -> &'static Regex {
    LINE_MARKER.get_or_init(|| Regex::new(r"#[0-9]+").unwrap())
}

/// Replace every `#<digits>` run in `line` with [`LINE_PLACEHOLDER`].
///
/// Only the hash and the digits are rewritten; anything after the last digit
/// (`#3x` -> `#LINEx`) is left alone. Borrows when nothing matches.
#[must_use]
pub fn normalize_line(line: &str) -> Cow<'_, str> {
    line_marker().replace_all(line, LINE_PLACEHOLDER)
}

/// Normalize every line in place.
pub fn normalize_lines(lines: &mut [String]) {
    for line in lines.iter_mut() {
        if let Cow::Owned(rewritten) = normalize_line(line) {
            *line = rewritten;
        }
    }
}
