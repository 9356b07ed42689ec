//! docpy Documentation Formats
//!
//! Parsers that read type documentation out of docstrings.
//!
//! ## Modules
//!
//! - `docutils` - Epydoc (`@type x: int`) and Sphinx (`:type x: int`) fields

pub mod docutils;

use docpy_core::{FormatRegistry, Result};
use std::sync::Arc;

pub use docutils::DocUtilsStyle;

/// Register every documentation dialect of this crate
pub fn register_doc_formats(registry: &mut FormatRegistry) -> Result<()> {
    let docutils = Arc::new(DocUtilsStyle::new());
    registry.register_doc_format("epydoc", docutils.clone())?;
    registry.register_doc_format("sphinx", docutils)?;
    Ok(())
}
