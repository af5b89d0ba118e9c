//! Text normalization: HTML stripping and whitespace collapsing.
//!
//! Every downstream stage (gate, cascade, resolver) works on normalized text
//! only. Normalization is pure, total and idempotent.

use std::sync::LazyLock;

use regex::Regex;

// ── Regex patterns ──────────────────────────────────────────────────────

static RE_HTML_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static RE_HTML_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)&nbsp;|&#(?:[0-9]+|x[0-9a-f]+);").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// ── Normalization ───────────────────────────────────────────────────────

/// Normalize raw email text for extraction.
///
/// In order: HTML tags become a space, `&nbsp;` and numeric entities become a
/// space, whitespace runs collapse to one space, and the ends are trimmed.
///
/// Tags are replaced by a space rather than removed so that adjacent blocks
/// (`<td>Code</td><td>482913</td>`) stay separate words.
pub fn normalize(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    let without_tags = RE_HTML_TAG.replace_all(text, " ");
    let without_entities = RE_HTML_ENTITY.replace_all(&without_tags, " ");
    RE_WHITESPACE
        .replace_all(&without_entities, " ")
        .trim()
        .to_string()
}

/// Normalize an optional field. Absent input yields an empty string.
pub fn normalize_opt(text: Option<&str>) -> String {
    text.map(normalize).unwrap_or_default()
}

/// Truncate normalized text to at most `max_chars` characters.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── HTML handling ───────────────────────────────────────────────

    #[test]
    fn strips_tags() {
        assert_eq!(
            normalize("<p>Your code is <b>482913</b></p>"),
            "Your code is 482913"
        );
    }

    #[test]
    fn adjacent_cells_stay_separate() {
        assert_eq!(normalize("<td>Code</td><td>482913</td>"), "Code 482913");
    }

    #[test]
    fn entities_become_spaces() {
        assert_eq!(normalize("code&nbsp;482913"), "code 482913");
        assert_eq!(normalize("code&#160;482913&#xA0;ok"), "code 482913 ok");
        assert_eq!(normalize("A&NBSP;B"), "A B");
    }

    #[test]
    fn unclosed_angle_bracket_is_kept() {
        assert_eq!(normalize("a < b"), "a < b");
    }

    // ── Whitespace ──────────────────────────────────────────────────

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize("  one\n\n two\t\tthree  "), "one two three");
    }

    #[test]
    fn empty_and_absent_inputs() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   \n\t "), "");
        assert_eq!(normalize("<br/><br/>"), "");
        assert_eq!(normalize_opt(None), "");
        assert_eq!(normalize_opt(Some(" x ")), "x");
    }

    #[test]
    fn idempotent() {
        let inputs = [
            "<div>Hello&nbsp;&nbsp;world</div>\n\n<p>Code: 482913</p>",
            "<<a>>b<",
            "x &#60;y&#62; z",
            "plain text",
            "  < open tag never closed",
        ];
        for input in inputs {
            let once = normalize(input);
            assert_eq!(normalize(&once), once, "input: {input:?}");
        }
    }

    // ── Truncation ──────────────────────────────────────────────────

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("abc", 10), "abc");
        assert_eq!(truncate_chars("abc", 0), "");
    }
}
