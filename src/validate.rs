//! False-positive filters for candidate codes.
//!
//! A candidate is a valid one-time code only if it survives every rule in
//! [`RULE_CHAIN`], evaluated in order. The boolean predicate
//! ([`is_valid_otp`]) and the diagnostic entry point ([`diagnose`]) share the
//! same traversal ([`first_failing_rule`]), so they cannot disagree.
//!
//! All rules see the *prepared* form of the candidate: spaces and dashes
//! removed, ASCII-uppercased.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Inclusive bounds on code length after preparation.
pub const MIN_CODE_LEN: usize = 4;
pub const MAX_CODE_LEN: usize = 8;

/// Ascending and descending digit runs. Containment anywhere rejects.
const SEQUENTIAL_RUNS: &[&str] = &[
    "1234", "2345", "3456", "4567", "5678", "6789",
    "9876", "8765", "7654", "6543", "5432", "4321",
    "123456", "234567", "345678", "456789",
    "987654", "876543", "765432", "654321",
];

/// Named web colours: black, white, primaries, secondaries and common greys.
const NAMED_HEX_COLORS: &[&str] = &[
    "000000", "FFFFFF", "FF0000", "00FF00", "0000FF", "FFFF00", "00FFFF", "FF00FF",
    "800000", "008000", "000080", "808000", "800080", "008080", "808080", "C0C0C0",
    "A9A9A9", "D3D3D3", "DCDCDC", "F5F5F5",
];

static RE_CSS_LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9]+(?:px|em|rem|pt|vh|vw|ch|ex|cm|mm|in|pc)$").unwrap()
});

// ── ValidationRule ──────────────────────────────────────────────────────

/// One rejection rule of the validator chain, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationRule {
    Length,
    Charset,
    AllZeros,
    SequentialRun,
    RepeatedChar,
    DateShape,
    YearLike,
    NoDigit,
    CssLength,
    HexColor,
}

impl ValidationRule {
    /// Stable rule name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            Self::Length => "length",
            Self::Charset => "charset",
            Self::AllZeros => "all_zeros",
            Self::SequentialRun => "sequential_run",
            Self::RepeatedChar => "repeated_char",
            Self::DateShape => "date_shape",
            Self::YearLike => "year_like",
            Self::NoDigit => "no_digit",
            Self::CssLength => "css_length",
            Self::HexColor => "hex_color",
        }
    }
}

impl std::fmt::Display for ValidationRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of [`diagnose`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Valid,
    Rejected(ValidationRule),
}

impl Verdict {
    pub fn is_valid(self) -> bool {
        matches!(self, Self::Valid)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Valid => f.write_str("valid"),
            Self::Rejected(rule) => write!(f, "{rule}"),
        }
    }
}

// ── Rule chain ──────────────────────────────────────────────────────────

/// A rule predicate: returns `true` when the prepared code is rejected.
type Rejects = fn(&str) -> bool;

/// The ordered validator chain.
pub const RULE_CHAIN: &[(ValidationRule, Rejects)] = &[
    (ValidationRule::Length, bad_length),
    (ValidationRule::Charset, bad_charset),
    (ValidationRule::AllZeros, all_zeros),
    (ValidationRule::SequentialRun, has_sequential_run),
    (ValidationRule::RepeatedChar, single_repeated_char),
    (ValidationRule::DateShape, looks_like_date),
    (ValidationRule::YearLike, looks_like_year),
    (ValidationRule::NoDigit, letters_without_digit),
    (ValidationRule::CssLength, looks_like_css_length),
    (ValidationRule::HexColor, looks_like_hex_color),
];

fn prepare(code: &str) -> String {
    code.chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect::<String>()
        .to_ascii_uppercase()
}

/// The first rule `code` violates, or `None` if it is valid.
pub fn first_failing_rule(code: &str) -> Option<ValidationRule> {
    let prepared = prepare(code);
    RULE_CHAIN
        .iter()
        .find(|(_, rejects)| rejects(&prepared))
        .map(|(rule, _)| *rule)
}

/// Whether `code` is a plausible one-time code.
pub fn is_valid_otp(code: &str) -> bool {
    first_failing_rule(code).is_none()
}

/// `valid`, or the name of the first violated rule.
pub fn diagnose(code: &str) -> Verdict {
    match first_failing_rule(code) {
        None => Verdict::Valid,
        Some(rule) => Verdict::Rejected(rule),
    }
}

// ── Individual rules ────────────────────────────────────────────────────

fn is_numeric(code: &str) -> bool {
    !code.is_empty() && code.bytes().all(|b| b.is_ascii_digit())
}

fn bad_length(code: &str) -> bool {
    !(MIN_CODE_LEN..=MAX_CODE_LEN).contains(&code.chars().count())
}

fn bad_charset(code: &str) -> bool {
    !code.chars().all(|c| c.is_ascii_alphanumeric())
}

fn all_zeros(code: &str) -> bool {
    code.bytes().all(|b| b == b'0')
}

fn has_sequential_run(code: &str) -> bool {
    SEQUENTIAL_RUNS.iter().any(|run| code.contains(run))
}

fn single_repeated_char(code: &str) -> bool {
    let first = code.as_bytes()[0];
    code.bytes().all(|b| b == first)
}

/// Two-digit field at `start`. Only called on numeric codes.
fn field(code: &str, start: usize) -> u32 {
    code[start..start + 2].parse().unwrap_or(0)
}

fn month_at(code: &str, start: usize) -> bool {
    (1..=12).contains(&field(code, start))
}

fn day_at(code: &str, start: usize) -> bool {
    (1..=31).contains(&field(code, start))
}

fn century_at(code: &str, start: usize) -> bool {
    matches!(&code[start..start + 2], "19" | "20")
}

fn looks_like_date(code: &str) -> bool {
    if !is_numeric(code) {
        return false;
    }
    match code.len() {
        6 => {
            let mmddyy = month_at(code, 0) && day_at(code, 2);
            let ddmmyy = day_at(code, 0) && month_at(code, 2);
            let yymmdd = month_at(code, 2) && day_at(code, 4);
            mmddyy || ddmmyy || yymmdd
        }
        8 => {
            let mmddyyyy = month_at(code, 0) && day_at(code, 2) && century_at(code, 4);
            let ddmmyyyy = day_at(code, 0) && month_at(code, 2) && century_at(code, 4);
            let yyyymmdd = century_at(code, 0) && month_at(code, 4) && day_at(code, 6);
            mmddyyyy || ddmmyyyy || yyyymmdd
        }
        _ => false,
    }
}

fn looks_like_year(code: &str) -> bool {
    if code.len() != 4 || !is_numeric(code) {
        return false;
    }
    code.parse::<u32>()
        .is_ok_and(|year| (1900..=2100).contains(&year))
}

fn letters_without_digit(code: &str) -> bool {
    code.bytes().any(|b| b.is_ascii_alphabetic()) && !code.bytes().any(|b| b.is_ascii_digit())
}

fn looks_like_css_length(code: &str) -> bool {
    RE_CSS_LENGTH.is_match(code)
}

/// Six hex digits shaped like a colour: `xyxyxy` (every RGB-equal grey is
/// this shape) or a named web colour.
fn looks_like_hex_color(code: &str) -> bool {
    if code.len() != 6 || !code.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }
    let repeated_pair = code[0..2] == code[2..4] && code[2..4] == code[4..6];
    repeated_pair || NAMED_HEX_COLORS.contains(&code)
}
