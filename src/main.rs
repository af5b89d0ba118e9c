//! otp-sieve CLI: one-time code extraction from email text.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use otp_sieve::{
    CodeExtractor, ExtractionResult, ExtractorConfig, OtpError, RawEmailText, diagnose,
};

#[derive(Parser)]
#[command(name = "otp-sieve", version, about = "Extract one-time verification codes from email text")]
struct Cli {
    /// Path to a TOML extractor config.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract a code from a single email.
    Extract {
        /// Subject line.
        #[arg(long)]
        subject: Option<String>,

        /// Body text (plain or HTML).
        #[arg(long, conflicts_with = "body_file")]
        body: Option<String>,

        /// Read the body from a file.
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Find the newest email carrying a code in a JSON batch.
    Batch {
        /// JSON array of {"subject", "body"} objects, newest first.
        #[arg(long)]
        file: PathBuf,

        /// Print the result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Check candidate codes against the validator and name the failing rule.
    Validate {
        /// Candidate codes.
        #[arg(required = true)]
        codes: Vec<String>,
    },

    /// Write the default config to a TOML file.
    ConfigInit {
        /// Destination path.
        path: PathBuf,
    },
}

fn read_input(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| OtpError::InputRead {
            path: path.display().to_string(),
            source: e,
        })
        .map_err(Into::into)
}

fn print_result(result: Option<&ExtractionResult>, index: Option<usize>, json: bool) -> Result<()> {
    match (result, json) {
        (Some(found), true) => {
            let mut value = serde_json::to_value(found).into_diagnostic()?;
            if let (Some(index), Some(obj)) = (index, value.as_object_mut()) {
                obj.insert("index".to_string(), index.into());
            }
            println!("{}", serde_json::to_string_pretty(&value).into_diagnostic()?);
        }
        (None, true) => println!("null"),
        (Some(found), false) => {
            if let Some(index) = index {
                println!("Email #{index}:");
            }
            println!("Code:       {}", found.code);
            println!("Confidence: {}", found.confidence);
            println!("Source:     {}", found.source);
            println!("Tier:       {}", found.tier);
        }
        (None, false) => println!("No verification code found."),
    }
    Ok(())
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => ExtractorConfig::load(path)?,
        None => ExtractorConfig::default(),
    };

    match cli.command {
        Commands::Extract {
            subject,
            body,
            body_file,
            json,
        } => {
            let extractor = CodeExtractor::new(config)?;
            let body = match body_file {
                Some(path) => Some(read_input(&path)?),
                None => body,
            };
            let email = RawEmailText { subject, body };
            print_result(extractor.extract(&email).as_ref(), None, json)?;
        }

        Commands::Batch { file, json } => {
            let extractor = CodeExtractor::new(config)?;
            let content = read_input(&file)?;
            let emails: Vec<RawEmailText> =
                serde_json::from_str(&content).map_err(|e| OtpError::InputParse {
                    message: format!("{}: {e}", file.display()),
                })?;
            let found = extractor.extract_latest(&emails);
            print_result(
                found.as_ref().map(|(_, result)| result),
                found.as_ref().map(|(index, _)| *index),
                json,
            )?;
        }

        Commands::Validate { codes } => {
            for code in &codes {
                println!("{code}: {}", diagnose(code));
            }
        }

        Commands::ConfigInit { path } => {
            ExtractorConfig::default().save(&path)?;
            println!("Wrote default config to {}", path.display());
        }
    }

    Ok(())
}
