//! Plain-text rendering of diagnostic-log rows.
//!
//! A raw row carries a markup-bearing message template plus substitution
//! variables. Findings are reported as bounded plain text: substitute the
//! variables, strip tags, decode entities, then truncate at a word boundary.
//! Rendering is pure, so re-rendering the same raw row always yields the
//! same text.

use warmboot_core::DiagnosticRow;

/// Maximum rendered length of a finding, in characters.
pub const MAX_FINDING_CHARS: usize = 256;

const ELLIPSIS: char = '…';

/// Render a raw log row to bounded plain text.
#[must_use]
pub fn render_row(row: &DiagnosticRow) -> String {
    let mut text = row.message.clone();
    for (token, value) in &row.variables {
        text = text.replace(token.as_str(), value);
    }
    let text = strip_tags(&text);
    let text = decode_entities(&text);
    truncate_words(&text, MAX_FINDING_CHARS)
}

/// Remove markup tags. An unterminated tag swallows the rest of the input.
#[must_use]
pub fn strip_tags(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;
    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

/// Decode the common named entities plus numeric (`&#NNN;` / `&#xHH;`)
/// references. Unrecognized sequences pass through literally.
#[must_use]
pub fn decode_entities(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut rest = input;
    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail[1..].find(';') {
            // Entity names are short; anything longer is not an entity.
            Some(end) if end <= 8 => {
                let name = &tail[1..=end];
                if let Some(decoded) = decode_entity(name) {
                    out.push(decoded);
                } else {
                    out.push('&');
                    out.push_str(name);
                    out.push(';');
                }
                rest = &tail[end + 2..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        _ => {
            let digits = name.strip_prefix('#')?;
            let code = if let Some(hex) = digits.strip_prefix(['x', 'X']) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                digits.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

/// Truncate to at most `max_chars` characters, cutting at the last word
/// boundary and appending an ellipsis. Input at or under the bound is
/// returned unchanged, which makes truncation idempotent.
#[must_use]
pub fn truncate_words(input: &str, max_chars: usize) -> String {
    if input.chars().count() <= max_chars {
        return input.to_owned();
    }
    let cut: String = input.chars().take(max_chars.saturating_sub(1)).collect();
    let kept = match cut.rfind(char::is_whitespace) {
        Some(idx) if idx > 0 => cut[..idx].trim_end(),
        _ => cut.as_str(),
    };
    let mut out = kept.to_owned();
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use warmboot_core::Severity;

    #[test]
    fn strip_tags_removes_markup() {
        assert_eq!(strip_tags("<em>bad</em> value"), "bad value");
        assert_eq!(strip_tags("no markup"), "no markup");
    }

    #[test]
    fn strip_tags_drops_unterminated_tag() {
        assert_eq!(strip_tags("before <a href="), "before ");
    }

    #[test]
    fn decode_entities_handles_named_and_numeric() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&lt;tag&gt;"), "<tag>");
        assert_eq!(decode_entities("&#39;quoted&#39;"), "'quoted'");
        assert_eq!(decode_entities("&#x27;hex&#x27;"), "'hex'");
    }

    #[test]
    fn decode_entities_leaves_unknown_sequences() {
        assert_eq!(decode_entities("&bogus; & plain"), "&bogus; & plain");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn truncation_is_word_boundary_safe() {
        let text = "alpha beta gamma delta";
        let out = truncate_words(text, 12);
        assert_eq!(out, "alpha beta…");
    }

    #[test]
    fn truncation_is_idempotent() {
        let text = "word ".repeat(100);
        let once = truncate_words(&text, MAX_FINDING_CHARS);
        let twice = truncate_words(&once, MAX_FINDING_CHARS);
        assert_eq!(once, twice);
        assert!(once.chars().count() <= MAX_FINDING_CHARS);
    }

    #[test]
    fn short_input_is_untouched() {
        assert_eq!(truncate_words("short", 256), "short");
    }

    #[test]
    fn unbroken_input_is_hard_cut() {
        let text = "x".repeat(300);
        let out = truncate_words(&text, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with('…'));
    }

    #[test]
    fn render_row_substitutes_variables_then_cleans() {
        let row = DiagnosticRow::new(
            Severity::Error,
            "runtime",
            "Undefined index: @key in <em>@file</em>",
        )
        .with_variable("@key", "cart_id")
        .with_variable("@file", "checkout.html");
        assert_eq!(
            render_row(&row),
            "Undefined index: cart_id in checkout.html"
        );
    }

    #[test]
    fn render_row_is_deterministic() {
        let row = DiagnosticRow::new(Severity::Error, "runtime", &"m ".repeat(400));
        assert_eq!(render_row(&row), render_row(&row));
    }
}
