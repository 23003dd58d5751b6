/// Character that starts a comment running to the end of the line.
pub const COMMENT_CHAR: char = '#';

/// Split script text into `(line_number, content)` pairs.
///
/// Comments are removed, surrounding whitespace trimmed, and lines left empty are skipped. Line
/// numbers are 1-based physical lines so diagnostics point at the real source line.
pub fn script_lines(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().filter_map(|(i, raw)| {
        let content = match raw.find(COMMENT_CHAR) {
            Some(at) => &raw[..at],
            None => raw,
        };
        let content = content.trim();
        (!content.is_empty()).then_some((i + 1, content))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/script/lines.rs"]
mod tests;
