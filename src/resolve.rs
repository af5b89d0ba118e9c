//! Candidate resolution: raw pattern capture → cleaned, validated code.

use crate::validate::{self, MAX_CODE_LEN, MIN_CODE_LEN};

fn plausible_len(s: &str) -> bool {
    (MIN_CODE_LEN..=MAX_CODE_LEN).contains(&s.len())
}

/// Resolve a raw capture into a code, or `None` if no reading survives
/// validation.
///
/// The digits-only reading is tried first: most real codes are numeric, and
/// dropping stray letters avoids letter-based rejections. Otherwise the
/// alphanumeric reading is tried and returned uppercased.
pub fn resolve_candidate(raw: &str) -> Option<String> {
    let numeric: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if plausible_len(&numeric) && validate::is_valid_otp(&numeric) {
        return Some(numeric);
    }

    let cleaned: String = raw.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if plausible_len(&cleaned) && validate::is_valid_otp(&cleaned) {
        return Some(cleaned.to_ascii_uppercase());
    }

    tracing::trace!(
        candidate = raw,
        numeric_rule = ?validate::first_failing_rule(&numeric),
        alnum_rule = ?validate::first_failing_rule(&cleaned),
        "candidate rejected"
    );
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn separators_are_dropped() {
        assert_eq!(resolve_candidate("58-19-02").as_deref(), Some("581902"));
        assert_eq!(resolve_candidate("482 913").as_deref(), Some("482913"));
    }

    #[test]
    fn numeric_reading_preferred() {
        // "482913PX" as a whole is a CSS length, but the digits alone pass.
        assert_eq!(resolve_candidate("482913px").as_deref(), Some("482913"));
    }

    #[test]
    fn alphanumeric_reading_is_uppercased() {
        assert_eq!(resolve_candidate("a1b2c3").as_deref(), Some("A1B2C3"));
        assert_eq!(resolve_candidate("X9-K2-M7").as_deref(), Some("X9K2M7"));
    }

    #[test]
    fn rejected_candidates() {
        assert_eq!(resolve_candidate("123456"), None);
        assert_eq!(resolve_candidate("valid"), None);
        assert_eq!(resolve_candidate("2024"), None);
        assert_eq!(resolve_candidate("12"), None);
        assert_eq!(resolve_candidate(""), None);
    }

    #[test]
    fn non_ascii_letters_are_stripped() {
        assert_eq!(resolve_candidate("é482913").as_deref(), Some("482913"));
    }
}
