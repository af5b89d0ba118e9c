//! The pattern cascade: seven ordered tiers of code patterns.
//!
//! Higher tiers demand more explicit textual evidence (an adjacent label, a
//! separator-formatted code after a label, quoting) and carry higher
//! confidence. Lower tiers fall back to proximity and finally to any bare
//! digit run.
//!
//! Evaluation is strictly ordered and short-circuits: tiers in order, rules
//! in order within a tier, candidates in text order within a rule. The first
//! candidate that resolves wins; candidates are never compared across tiers.
//!
//! All patterns run on the `regex` crate (linear-time, no backtracking) and
//! every proximity scan is bounded by a fixed character window.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::resolve::resolve_candidate;
use crate::validate::MAX_CODE_LEN;

// ── Confidence ──────────────────────────────────────────────────────────

/// Trust level declared by the tier that produced a code.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    #[default]
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// A validated code together with the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCode {
    /// Uppercase `[A-Z0-9]{4,8}`.
    pub value: String,
    pub confidence: Confidence,
    /// Tier number, 1 (most explicit) to 7 (bare digits).
    pub tier: u8,
    /// Name of the rule within the tier, for diagnostics.
    pub pattern: &'static str,
}

// ── Matchers ────────────────────────────────────────────────────────────

/// Window after a tier-6 anchor phrase, in characters.
const ANCHOR_WINDOW: usize = 400;

/// Tier-6 anchor phrases, in priority order. Only the first phrase present
/// in the text is used.
const ANCHOR_PHRASES: &[&str] = &[
    "this code",
    "your code",
    "verification code",
    "security code",
    "login code",
    "otp",
    "one-time",
    "passcode",
];

/// Tier-7 bare digit lengths, most common OTP length first.
const BARE_DIGIT_LENGTHS: &[usize] = &[6, 4, 5, 8];

static RE_DIGIT_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b[0-9]{4,8}\b").unwrap());

static RE_CODE_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b[A-Z0-9]{4,8}\b").unwrap());

/// How a rule turns text into candidates.
enum Matcher {
    /// Capture group 1 of every match.
    Capture(Regex),
    /// Like `Capture`, but skip groups that are one part of a
    /// separator-formatted code (`4829` in `4829-7315`); those belong to
    /// the grouped-code tier.
    Label(Regex),
    /// Like `Capture`, but skip groups glued to a neighbouring `-` (a slice
    /// of a longer dashed number such as a phone number).
    Standalone(Regex),
    /// Every code-shaped token containing a digit, within `window`
    /// characters after each phrase match.
    Proximity { phrase: Regex, window: usize },
    /// Every 4–8 digit token within `window` characters after the first
    /// anchor phrase present.
    AnchorWindow {
        phrases: &'static [&'static str],
        window: usize,
    },
    /// Every bare digit token, one token length at a time.
    BareDigits(Vec<Regex>),
}

/// Byte offset `chars` characters after `start`, clamped to the text end.
fn window_end(text: &str, start: usize, chars: usize) -> usize {
    text[start..]
        .char_indices()
        .nth(chars)
        .map_or(text.len(), |(offset, _)| start + offset)
}

/// The slice searched for a window of `window` characters at `start`: the
/// window itself plus enough lookahead for a token starting on its last
/// character to match whole, trailing word boundary included.
fn window_haystack(text: &str, start: usize, window: usize) -> &str {
    &text[start..window_end(text, start, window + MAX_CODE_LEN + 1)]
}

/// Tokens matched by `token` that start within `window` characters after
/// `start`. Only the window and its lookahead are searched.
fn tokens_in_window<'t>(
    token: &'t Regex,
    text: &'t str,
    start: usize,
    window: usize,
) -> impl Iterator<Item = &'t str> + 't {
    let limit = window_end(text, start, window) - start;
    token
        .find_iter(window_haystack(text, start, window))
        .take_while(move |m| m.start() < limit)
        .map(|m| m.as_str())
}

fn glued_to_dash(text: &str, start: usize, end: usize) -> bool {
    text[..start].ends_with('-') || text[end..].starts_with('-')
}

fn is_group_separator(c: char) -> bool {
    c == '-' || c == '.' || c.is_whitespace()
}

/// A 2–4 character alphanumeric group carrying a digit, as in `4829-7315`.
fn is_code_group(group: &str) -> bool {
    (2..=4).contains(&group.len())
        && group.bytes().all(|b| b.is_ascii_alphanumeric())
        && group.bytes().any(|b| b.is_ascii_digit())
}

/// Whether `text[start..end]` is one group of a separator-formatted code,
/// i.e. a neighbouring separator leads to another code group.
fn part_of_grouped_code(text: &str, start: usize, end: usize) -> bool {
    let mut after = text[end..].chars();
    let next_group = match after.next() {
        Some(c) if is_group_separator(c) => {
            let rest = after.as_str();
            let tail = rest.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
            is_code_group(&rest[..rest.len() - tail.len()])
        }
        _ => false,
    };

    let mut before = text[..start].chars();
    let prev_group = match before.next_back() {
        Some(c) if is_group_separator(c) => {
            let rest = before.as_str();
            let head = rest.trim_end_matches(|c: char| c.is_ascii_alphanumeric());
            is_code_group(&rest[head.len()..])
        }
        _ => false,
    };

    next_group || prev_group
}

impl Matcher {
    fn candidates<'t>(&'t self, text: &'t str) -> Box<dyn Iterator<Item = &'t str> + 't> {
        match self {
            Self::Capture(re) => Box::new(
                re.captures_iter(text)
                    .filter_map(|caps| caps.get(1))
                    .map(|m| m.as_str()),
            ),
            Self::Label(re) => Box::new(
                re.captures_iter(text)
                    .filter_map(|caps| caps.get(1))
                    .filter(move |m| !part_of_grouped_code(text, m.start(), m.end()))
                    .map(|m| m.as_str()),
            ),
            Self::Standalone(re) => Box::new(
                re.captures_iter(text)
                    .filter_map(|caps| caps.get(1))
                    .filter(move |m| !glued_to_dash(text, m.start(), m.end()))
                    .map(|m| m.as_str()),
            ),
            Self::Proximity { phrase, window } => {
                let window = *window;
                Box::new(phrase.find_iter(text).flat_map(move |m| {
                    tokens_in_window(&RE_CODE_TOKEN, text, m.end(), window)
                        .filter(|tok| tok.bytes().any(|b| b.is_ascii_digit()))
                }))
            }
            Self::AnchorWindow { phrases, window } => {
                // ASCII lowercasing keeps byte offsets aligned with `text`.
                let lower = text.to_ascii_lowercase();
                let anchor_end = phrases
                    .iter()
                    .find_map(|phrase| lower.find(phrase).map(|at| at + phrase.len()));
                match anchor_end {
                    Some(start) => {
                        Box::new(tokens_in_window(&RE_DIGIT_TOKEN, text, start, *window))
                    }
                    None => Box::new(std::iter::empty()),
                }
            }
            Self::BareDigits(by_length) => Box::new(
                by_length
                    .iter()
                    .flat_map(move |re| re.find_iter(text).map(|m| m.as_str())),
            ),
        }
    }
}

// ── Tier table ──────────────────────────────────────────────────────────

struct PatternRule {
    name: &'static str,
    matcher: Matcher,
}

/// One tier of the cascade. Confidence is per tier, not per rule.
struct PatternTier {
    tier: u8,
    confidence: Confidence,
    rules: Vec<PatternRule>,
}

fn capture(name: &'static str, pattern: &str) -> PatternRule {
    PatternRule {
        name,
        matcher: Matcher::Capture(Regex::new(pattern).unwrap()),
    }
}

fn label(name: &'static str, pattern: &str) -> PatternRule {
    PatternRule {
        name,
        matcher: Matcher::Label(Regex::new(pattern).unwrap()),
    }
}

fn proximity(name: &'static str, phrase: &str, window: usize) -> PatternRule {
    PatternRule {
        name,
        matcher: Matcher::Proximity {
            phrase: Regex::new(phrase).unwrap(),
            window,
        },
    }
}

static TIERS: LazyLock<Vec<PatternTier>> = LazyLock::new(|| {
    vec![
        // Tier 1: label directly adjacent to the code.
        PatternTier {
            tier: 1,
            confidence: Confidence::High,
            rules: vec![
                label(
                    "qualified-label",
                    r"(?i)\b(?:verification|security|confirmation|authentication|login|log-?in|sign[- ]?in|one[- ]?time|access|2fa|mfa)\s+(?:code|pin|passcode|password)\s*(?:is\s*:?|:|=)?\s*([A-Z0-9]{4,8})\b",
                ),
                label(
                    "label-is",
                    r"(?i)\b(?:code|otp|passcode|pin|token|password)\s*(?:is\s*:?|:|=)\s*([A-Z0-9]{4,8})\b",
                ),
                label(
                    "enter-code",
                    r"(?i)\b(?:enter|use|type|input|provide)\s+(?:the\s+|this\s+|your\s+)?(?:following\s+)?(?:code|otp|passcode|pin)\s*:?\s*([A-Z0-9]{4,8})\b",
                ),
                label(
                    "code-is-yours",
                    r"(?i)\b([A-Z0-9]{4,8})\s+is\s+your\s+(?:[a-z-]+\s+){0,2}(?:code|otp|passcode|pin|password)\b",
                ),
            ],
        },
        // Tier 2: labelled code with separators.
        PatternTier {
            tier: 2,
            confidence: Confidence::High,
            rules: vec![
                capture(
                    "label-grouped-digits",
                    r"(?i)\b(?:code|otp|passcode|pin|token)\s*(?:is\s*:?|:|=)?\s*([0-9]{2,4}(?:[-\s.][0-9]{2,4}){1,3})\b",
                ),
                capture(
                    "label-grouped-alnum",
                    r"(?i)\b(?:code|otp|passcode|pin)\s*(?:is\s*:?|:|=)?\s*([A-Z0-9]{3,4}-[A-Z0-9]{3,4})\b",
                ),
            ],
        },
        // Tier 3: quoted or emphasized code near a keyword.
        PatternTier {
            tier: 3,
            confidence: Confidence::High,
            rules: vec![
                capture(
                    "quoted",
                    r#"(?i)\b(?:code|otp|passcode|pin|token)\b[^"“”]{0,40}["“”]([A-Z0-9]{4,8})["“”]"#,
                ),
                capture(
                    "emphasized",
                    r"(?i)\b(?:code|otp|passcode|pin|token)\b[^*]{0,40}\*{1,2}([A-Z0-9]{4,8})\*{1,2}",
                ),
                capture(
                    "bracketed",
                    r"(?i)\b(?:code|otp|passcode|pin|token)\b[^\[]{0,40}\[([A-Z0-9]{4,8})\]",
                ),
                capture(
                    "marked-before-keyword",
                    r#"(?i)["“”\[*]([A-Z0-9]{4,8})["“”\]*][^"“”]{0,40}?\b(?:code|otp|passcode|pin)\b"#,
                ),
            ],
        },
        // Tier 4: code within a bounded window after a context phrase.
        PatternTier {
            tier: 4,
            confidence: Confidence::Medium,
            rules: vec![
                proximity("after-this-code", r"(?i)\bthis\s+code\b", 100),
                proximity("after-expire", r"(?i)\bexpir(?:e|es|ed|ing|ation)\b", 150),
                proximity(
                    "after-sign-in",
                    r"(?i)\b(?:sign(?:ing)?[- ]?in|log(?:ging)?[- ]?in)\b",
                    200,
                ),
                proximity("after-verification", r"(?i)\bverif(?:y|ication)\b", 300),
                proximity("after-one-time", r"(?i)\bone[- ]?time\b", 200),
                proximity("after-code", r"(?i)\bcode\b", 100),
            ],
        },
        // Tier 5: separator-formatted digit groups anywhere.
        PatternTier {
            tier: 5,
            confidence: Confidence::Medium,
            rules: vec![PatternRule {
                name: "grouped-digits",
                matcher: Matcher::Standalone(
                    Regex::new(r"\b([0-9]{2}-[0-9]{2}-[0-9]{2}|[0-9]{4}-[0-9]{4}|[0-9]{3}-[0-9]{3})\b")
                        .unwrap(),
                ),
            }],
        },
        // Tier 6: every digit token in a window after the first anchor phrase.
        PatternTier {
            tier: 6,
            confidence: Confidence::Medium,
            rules: vec![PatternRule {
                name: "anchor-window",
                matcher: Matcher::AnchorWindow {
                    phrases: ANCHOR_PHRASES,
                    window: ANCHOR_WINDOW,
                },
            }],
        },
        // Tier 7: bare digit runs anywhere.
        PatternTier {
            tier: 7,
            confidence: Confidence::Low,
            rules: vec![PatternRule {
                name: "bare-digits",
                matcher: Matcher::BareDigits(
                    BARE_DIGIT_LENGTHS
                        .iter()
                        .map(|len| Regex::new(&format!(r"\b[0-9]{{{len}}}\b")).unwrap())
                        .collect(),
                ),
            }],
        },
    ]
});

// ── Evaluation ──────────────────────────────────────────────────────────

/// Run the cascade over normalized text; first surviving candidate wins.
///
/// Does not apply the context gate; see [`crate::extract::extract_from_text`].
pub fn run_cascade(text: &str) -> Option<ResolvedCode> {
    if text.is_empty() {
        return None;
    }
    let found = TIERS
        .iter()
        .flat_map(|tier| tier.rules.iter().map(move |rule| (tier, rule)))
        .find_map(|(tier, rule)| {
            rule.matcher
                .candidates(text)
                .find_map(resolve_candidate)
                .map(|value| ResolvedCode {
                    value,
                    confidence: tier.confidence,
                    tier: tier.tier,
                    pattern: rule.name,
                })
        });

    if let Some(code) = &found {
        tracing::debug!(
            tier = code.tier,
            pattern = code.pattern,
            confidence = %code.confidence,
            "cascade matched"
        );
    }
    found
}
