//! Source replacements

use crate::location::{SourceLocation, SourceRange};
use serde::{Deserialize, Serialize};

/// Text to splice into the source in place of `range`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceReplacement {
    pub range: SourceRange,
    pub replacement: String,
}

impl SourceReplacement {
    pub fn new(range: SourceRange, replacement: impl Into<String>) -> Self {
        Self {
            range,
            replacement: replacement.into(),
        }
    }

    /// Pure insertion of `text` at `location`
    pub fn insert(location: SourceLocation, text: impl Into<String>) -> Self {
        Self::new(SourceRange::at(location), text)
    }
}
