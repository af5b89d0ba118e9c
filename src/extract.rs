//! Source selection: subject first, then body.
//!
//! Each source runs the full pipeline independently:
//!
//! 1. Normalize (strip HTML, collapse whitespace)
//! 2. Gate on verification vocabulary
//! 3. Run the pattern cascade (which resolves and validates candidates)
//!
//! The first source yielding a code wins; the body is not examined when the
//! subject already produced one. There is no state across calls.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::cascade::{Confidence, ResolvedCode, run_cascade};
use crate::config::ExtractorConfig;
use crate::error::OtpResult;
use crate::gate::has_verification_context;
use crate::normalize::{normalize, normalize_opt, truncate_chars};

// ── Types ───────────────────────────────────────────────────────────────

/// Which part of the email a code was found in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Subject,
    Body,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Subject => write!(f, "subject"),
            Self::Body => write!(f, "body"),
        }
    }
}

/// Decoded email text as handed over by the mail-fetching side.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmailText {
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
}

impl RawEmailText {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: Some(subject.into()),
            body: Some(body.into()),
        }
    }
}

/// A code found in an email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub code: String,
    pub confidence: Confidence,
    pub source: Source,
    /// Cascade tier that produced the code (1–7).
    pub tier: u8,
}

// ── Pipeline ────────────────────────────────────────────────────────────

fn gate_then_cascade(normalized: &str) -> Option<ResolvedCode> {
    if !has_verification_context(normalized) {
        if !normalized.is_empty() {
            tracing::debug!(chars = normalized.len(), "no verification context, skipping");
        }
        return None;
    }
    run_cascade(normalized)
}

/// Normalize, gate and run the cascade over a single piece of text.
pub fn extract_from_text(text: &str) -> Option<ResolvedCode> {
    gate_then_cascade(&normalize(text))
}

fn select_source<F>(sources: [(Source, Option<&str>); 2], scan: F) -> Option<ExtractionResult>
where
    F: Fn(Option<&str>) -> Option<ResolvedCode>,
{
    sources.into_iter().find_map(|(source, text)| {
        scan(text).map(|resolved| ExtractionResult {
            code: resolved.value,
            confidence: resolved.confidence,
            source,
            tier: resolved.tier,
        })
    })
}

/// Extract a code from an email's subject and body, subject first.
///
/// Absent fields count as empty text. `None` means no code was found, which
/// is a normal outcome.
pub fn extract_code(subject: Option<&str>, body: Option<&str>) -> Option<ExtractionResult> {
    select_source([(Source::Subject, subject), (Source::Body, body)], |text| {
        gate_then_cascade(&normalize_opt(text))
    })
}

// ── CodeExtractor ───────────────────────────────────────────────────────

/// Configured extractor: source toggles, a confidence floor and an input
/// size bound around [`extract_code`].
#[derive(Debug, Clone, Default)]
pub struct CodeExtractor {
    config: ExtractorConfig,
}

impl CodeExtractor {
    pub fn new(config: ExtractorConfig) -> OtpResult<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    fn scan(&self, text: Option<&str>) -> Option<ResolvedCode> {
        let normalized = normalize_opt(text);
        let bounded = truncate_chars(&normalized, self.config.max_text_chars);
        gate_then_cascade(bounded).filter(|code| {
            let keep = code.confidence >= self.config.min_confidence;
            if !keep {
                tracing::debug!(
                    confidence = %code.confidence,
                    floor = %self.config.min_confidence,
                    "code below confidence floor"
                );
            }
            keep
        })
    }

    /// Extract from subject/body parts, honouring the configuration.
    pub fn extract_parts(
        &self,
        subject: Option<&str>,
        body: Option<&str>,
    ) -> Option<ExtractionResult> {
        let subject = self.config.scan_subject.then_some(subject).flatten();
        let body = self.config.scan_body.then_some(body).flatten();
        select_source([(Source::Subject, subject), (Source::Body, body)], |text| {
            self.scan(text)
        })
    }

    pub fn extract(&self, email: &RawEmailText) -> Option<ExtractionResult> {
        self.extract_parts(email.subject.as_deref(), email.body.as_deref())
    }

    /// The newest email carrying a code, with its index.
    ///
    /// `emails` must be ordered newest first. Emails are scanned in parallel;
    /// the lowest index with a code wins.
    pub fn extract_latest(&self, emails: &[RawEmailText]) -> Option<(usize, ExtractionResult)> {
        let found = emails
            .par_iter()
            .enumerate()
            .find_map_first(|(index, email)| self.extract(email).map(|result| (index, result)));
        tracing::debug!(
            scanned = emails.len(),
            matched = ?found.as_ref().map(|(index, _)| *index),
            "batch extraction finished"
        );
        found
    }
}
