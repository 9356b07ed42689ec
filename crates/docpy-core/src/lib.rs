//! docpy Core
//!
//! Core types and interfaces for the docpy docstring-to-type-hint rewriter.

pub mod config;
pub mod docstring;
pub mod error;
pub mod format;
pub mod location;
pub mod replacement;

pub use config::Config;
pub use docstring::{
    AnnotationKind, Declaration, DocString, FunctionKind, FunctionSignature, TypeAnnotation,
};
pub use error::{Error, Result};
pub use format::{DocFormat, FormatRegistry, HintStyle};
pub use location::{SourceDistance, SourceLocation, SourceRange};
pub use replacement::SourceReplacement;
