//! docpy Parser
//!
//! Finds documented declarations in Python source using tree-sitter and
//! turns them into [`DocString`] records.
//!
//! ## Modules
//!
//! - `treesitter` - tree-sitter-python front end

pub mod treesitter;

use docpy_core::{DocString, Result};
use std::path::Path;

/// Parse result containing extracted information
#[derive(Debug, Default, Clone)]
pub struct ParseResult {
    /// Docstrings in source order
    pub docstrings: Vec<DocString>,
}

/// Parser trait for different backends
pub trait Parser: Send + Sync {
    /// Parse source code string
    fn parse(&self, source: &str, filename: &str) -> Result<ParseResult>;

    /// Parse a file
    fn parse_file(&self, path: &Path) -> Result<ParseResult> {
        let source = std::fs::read_to_string(path)?;
        let filename = path.to_string_lossy();
        self.parse(&source, &filename)
    }

    /// Get parser name
    fn name(&self) -> &str;
}

/// Get the default parser
pub fn get_parser() -> Box<dyn Parser> {
    Box::new(treesitter::PythonParser)
}

#[cfg(test)]
mod tests;
