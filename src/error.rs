use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum HubError {
    #[error("invalid path pattern {pattern}: {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("invalid {group} regex: {message}")]
    InvalidRegex { group: String, message: String },

    #[error("failed to read sample sheet at {0}")]
    SheetRead(PathBuf),

    #[error("failed to parse sample sheet: {0}")]
    SheetParse(String),

    #[error("sample sheet is missing required columns: {}", .0.join(", "))]
    #[diagnostic(help("the header row must contain at least `sample_id`"))]
    MissingColumns(Vec<String>),

    #[error("at least one of --bigwig or --bigbed must be specified")]
    NoInputs,

    #[error("missing required setting: {0}")]
    #[diagnostic(help("pass it on the command line or set it in trackhub.json"))]
    MissingSetting(String),

    #[error("missing config file at {0}")]
    MissingConfig(PathBuf),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("hub rendering failed: {0}")]
    Render(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}
