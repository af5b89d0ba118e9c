// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # otp-sieve
//!
//! Extracts one-time verification codes from unstructured email text and
//! decides whether a token is plausibly a real code rather than a date, a
//! year, a CSS length, a hex colour or a sequential digit run.
//!
//! ## Architecture
//!
//! - **Normalizer** (`normalize`): strips HTML, collapses whitespace
//! - **Context gate** (`gate`): requires authentication vocabulary
//! - **Pattern cascade** (`cascade`): seven tiers, explicit labels first, bare digits last
//! - **Resolver** (`resolve`): cleans a capture, prefers the numeric reading
//! - **Validator** (`validate`): ordered false-positive filter chain
//! - **Source selector** (`extract`): subject first, then body
//!
//! The pipeline is pure and synchronous; concurrent calls need no
//! coordination.
//!
//! ## Library usage
//!
//! ```
//! use otp_sieve::{Confidence, Source, extract_code, is_valid_otp};
//!
//! let found = extract_code(Some("Your OTP is 294817"), None).unwrap();
//! assert_eq!(found.code, "294817");
//! assert_eq!(found.confidence, Confidence::High);
//! assert_eq!(found.source, Source::Subject);
//!
//! assert!(!is_valid_otp("123456"));
//! ```

pub mod cascade;
pub mod config;
pub mod error;
pub mod extract;
pub mod gate;
pub mod normalize;
pub mod resolve;
pub mod validate;

pub use cascade::{Confidence, ResolvedCode, run_cascade};
pub use config::ExtractorConfig;
pub use error::{OtpError, OtpResult};
pub use extract::{
    CodeExtractor, ExtractionResult, RawEmailText, Source, extract_code, extract_from_text,
};
pub use gate::has_verification_context;
pub use normalize::normalize;
pub use resolve::resolve_candidate;
pub use validate::{ValidationRule, Verdict, diagnose, first_failing_rule, is_valid_otp};
