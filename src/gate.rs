//! Verification context gate.
//!
//! Text that never mentions anything authentication-related is not searched
//! for codes at all. This keeps order numbers, prices and tracking digits in
//! unrelated mail from being reported as codes.

/// Authentication vocabulary, matched as case-insensitive substrings.
pub const VERIFICATION_KEYWORDS: &[&str] = &[
    "verification",
    "verify",
    "code",
    "otp",
    "2fa",
    "mfa",
    "one-time",
    "one time",
    "passcode",
    "password",
    "login",
    "log in",
    "log-in",
    "sign in",
    "sign-in",
    "signin",
    "token",
    "pin",
    "authenticat",
    "security",
    "confirm",
];

/// Whether `text` contains any verification keyword.
pub fn has_verification_context(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let lower = text.to_lowercase();
    VERIFICATION_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_auth_vocabulary() {
        assert!(has_verification_context("Your OTP is 294817"));
        assert!(has_verification_context("Enter this CODE to continue"));
        assert!(has_verification_context("Use this One-Time passcode"));
        assert!(has_verification_context("Thanks for signing in"));
        assert!(has_verification_context("2FA request"));
        assert!(has_verification_context("Please authenticate your device"));
    }

    #[test]
    fn rejects_unrelated_text() {
        assert!(!has_verification_context("Quarterly newsletter: store 583920 opens Monday"));
        assert!(!has_verification_context("Invoice 77812 attached"));
    }

    #[test]
    fn empty_text_is_blocked() {
        assert!(!has_verification_context(""));
    }

    #[test]
    fn containment_not_word_match() {
        // "barcode" contains "code"
        assert!(has_verification_context("scan the barcode"));
    }
}
