//! Diagnostic error types for otp-sieve.
//!
//! Extraction itself never fails: "no code" is `None`, not an error. These
//! errors cover the edges around it (configuration files and CLI input) and
//! carry miette codes and help text so users know what to fix.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum OtpError {
    #[error("failed to read config file: {path}")]
    #[diagnostic(
        code(otp::config::read),
        help("Check that the file exists and is readable. Generate one with `otp-sieve config-init <path>`.")
    )]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file: {path}")]
    #[diagnostic(
        code(otp::config::write),
        help("Check that the parent directory is writable and the disk is not full.")
    )]
    ConfigWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML in config file {path}: {message}")]
    #[diagnostic(
        code(otp::config::parse),
        help(
            "The config must be TOML with the keys scan_subject, scan_body, \
             min_confidence (\"low\", \"medium\" or \"high\") and max_text_chars. \
             All keys are optional."
        )
    )]
    ConfigParse { path: String, message: String },

    #[error("failed to serialize config for {path}: {message}")]
    #[diagnostic(
        code(otp::config::serialize),
        help("Every config value must be representable in TOML.")
    )]
    ConfigSerialize { path: String, message: String },

    #[error("invalid configuration: {message}")]
    #[diagnostic(
        code(otp::config::invalid),
        help(
            "max_text_chars must be at least 64, and at least one of scan_subject \
             or scan_body must be enabled."
        )
    )]
    Config { message: String },

    #[error("failed to read input: {path}")]
    #[diagnostic(
        code(otp::input::read),
        help("Check that the input file exists and is readable UTF-8 text.")
    )]
    InputRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed input: {message}")]
    #[diagnostic(
        code(otp::input::parse),
        help(
            "Batch input must be a JSON array of objects with optional \"subject\" \
             and \"body\" string fields, newest email first."
        )
    )]
    InputParse { message: String },
}

/// Convenience alias for fallible otp-sieve operations.
pub type OtpResult<T> = std::result::Result<T, OtpError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = OtpError::Config {
            message: "max_text_chars must be at least 64, got 10".to_string(),
        };
        assert!(err.to_string().contains("got 10"));
    }

    #[test]
    fn parse_error_display() {
        let err = OtpError::ConfigParse {
            path: "/tmp/otp.toml".to_string(),
            message: "expected `=`".to_string(),
        };
        let shown = err.to_string();
        assert!(shown.contains("/tmp/otp.toml"));
        assert!(shown.contains("expected `=`"));
    }

    #[test]
    fn serialize_error_is_distinct_from_parse() {
        let err = OtpError::ConfigSerialize {
            path: "otp.toml".to_string(),
            message: "unsupported value".to_string(),
        };
        assert!(err.to_string().starts_with("failed to serialize config"));
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("otp::config::serialize"));
    }

    #[test]
    fn read_error_keeps_source() {
        let err = OtpError::InputRead {
            path: "mail.txt".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn diagnostic_codes() {
        let err = OtpError::InputParse {
            message: "bad".to_string(),
        };
        let code = err.code().map(|c| c.to_string());
        assert_eq!(code.as_deref(), Some("otp::input::parse"));
    }
}
