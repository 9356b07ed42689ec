//! Error types for docpy

use crate::location::SourceLocation;
use thiserror::Error;

/// docpy error type
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error in {file} at {line}:{column}: {message}")]
    Parse {
        file: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("Grammar error: {0}")]
    Grammar(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown {registry} format: {name}")]
    UnknownFormat { registry: &'static str, name: String },

    #[error("{registry} format {name} is already registered")]
    DuplicateFormat { registry: &'static str, name: String },

    #[error("Replacement at {next} overlaps the replacement at {previous}")]
    OverlappingReplacements {
        previous: SourceLocation,
        next: SourceLocation,
    },

    #[error("Replacement position out of bounds: {0}")]
    ReplacementOutOfBounds(String),
}

/// Result type alias for docpy
pub type Result<T> = std::result::Result<T, Error>;
