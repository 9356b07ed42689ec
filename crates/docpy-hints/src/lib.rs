//! docpy Hints
//!
//! Renders the annotations of a docstring as type hints in the source.
//!
//! ## Modules
//!
//! - `comment_style` - PEP 484 `# type:` comments

pub mod comment_style;

use docpy_core::{FormatRegistry, Result};
use std::sync::Arc;

pub use comment_style::CommentStyle;

/// Register every hint style of this crate
pub fn register_hint_styles(registry: &mut FormatRegistry) -> Result<()> {
    registry.register_hint_style("comment", Arc::new(CommentStyle::new()))
}
