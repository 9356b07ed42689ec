//! Pluggable documentation dialects and hint styles
//!
//! A [`DocFormat`] fills in the annotations of a docstring, a [`HintStyle`]
//! turns an annotated docstring into source replacements. Both are looked up
//! by name in a [`FormatRegistry`] that is built once at startup and passed
//! around explicitly.

use crate::config::HintConfig;
use crate::docstring::DocString;
use crate::error::{Error, Result};
use crate::replacement::SourceReplacement;
use std::collections::HashMap;
use std::sync::Arc;

/// Parses the type documentation of one docstring dialect
pub trait DocFormat: Send + Sync {
    /// Append the annotations found in `doc_string.content` to
    /// `doc_string.annotations`. Malformed tags are skipped, never fatal.
    fn extract(&self, doc_string: &mut DocString);
}

/// Renders annotated docstrings as type hints
pub trait HintStyle: Send + Sync {
    /// Push the replacements needed to add hints for `doc_string`
    fn synthesize(
        &self,
        doc_string: &DocString,
        config: &HintConfig,
        replacements: &mut Vec<SourceReplacement>,
    );
}

const DOC_FORMATS: &str = "documentation";
const HINT_STYLES: &str = "hint";

/// Named documentation dialects and hint styles
#[derive(Default, Clone)]
pub struct FormatRegistry {
    doc_formats: HashMap<String, Arc<dyn DocFormat>>,
    hint_styles: HashMap<String, Arc<dyn HintStyle>>,
}

impl FormatRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a documentation dialect
    pub fn register_doc_format(
        &mut self,
        name: impl Into<String>,
        format: Arc<dyn DocFormat>,
    ) -> Result<()> {
        insert_unique(&mut self.doc_formats, DOC_FORMATS, name.into(), format)
    }

    /// Register a hint style
    pub fn register_hint_style(
        &mut self,
        name: impl Into<String>,
        style: Arc<dyn HintStyle>,
    ) -> Result<()> {
        insert_unique(&mut self.hint_styles, HINT_STYLES, name.into(), style)
    }

    pub fn doc_format(&self, name: &str) -> Result<Arc<dyn DocFormat>> {
        lookup(&self.doc_formats, DOC_FORMATS, name)
    }

    pub fn hint_style(&self, name: &str) -> Result<Arc<dyn HintStyle>> {
        lookup(&self.hint_styles, HINT_STYLES, name)
    }

    /// Registered dialect names, sorted
    pub fn doc_format_names(&self) -> Vec<&str> {
        sorted_names(&self.doc_formats)
    }

    /// Registered style names, sorted
    pub fn hint_style_names(&self) -> Vec<&str> {
        sorted_names(&self.hint_styles)
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("doc_formats", &self.doc_format_names())
            .field("hint_styles", &self.hint_style_names())
            .finish()
    }
}

fn insert_unique<T: ?Sized>(
    entries: &mut HashMap<String, Arc<T>>,
    registry: &'static str,
    name: String,
    entry: Arc<T>,
) -> Result<()> {
    if entries.contains_key(&name) {
        return Err(Error::DuplicateFormat { registry, name });
    }
    entries.insert(name, entry);
    Ok(())
}

fn lookup<T: ?Sized>(
    entries: &HashMap<String, Arc<T>>,
    registry: &'static str,
    name: &str,
) -> Result<Arc<T>> {
    entries.get(name).cloned().ok_or_else(|| Error::UnknownFormat {
        registry,
        name: name.to_string(),
    })
}

fn sorted_names<T: ?Sized>(entries: &HashMap<String, Arc<T>>) -> Vec<&str> {
    let mut names: Vec<&str> = entries.keys().map(String::as_str).collect();
    names.sort_unstable();
    names
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docstring::{AnnotationKind, TypeAnnotation};
    use crate::location::SourceLocation;

    struct Marker;

    impl DocFormat for Marker {
        fn extract(&self, doc_string: &mut DocString) {
            doc_string.annotations.push(TypeAnnotation::new(
                AnnotationKind::Return,
                None,
                "marker",
                SourceLocation::START,
            ));
        }
    }

    struct Nothing;

    impl HintStyle for Nothing {
        fn synthesize(&self, _: &DocString, _: &HintConfig, _: &mut Vec<SourceReplacement>) {}
    }

    #[test]
    fn test_lookup_registered_format() {
        let mut registry = FormatRegistry::new();
        registry.register_doc_format("marker", Arc::new(Marker)).unwrap();

        let format = registry.doc_format("marker").unwrap();
        let mut doc = DocString::new(
            "",
            SourceLocation::START,
            SourceLocation::START,
            crate::Declaration::Module,
        );
        format.extract(&mut doc);
        assert_eq!(doc.annotations.len(), 1);
    }

    #[test]
    fn test_unknown_format() {
        let registry = FormatRegistry::new();
        let err = registry.doc_format("rst").err().unwrap();
        assert!(matches!(err, Error::UnknownFormat { name, .. } if name == "rst"));

        let err = registry.hint_style("stub").err().unwrap();
        assert!(matches!(err, Error::UnknownFormat { registry: HINT_STYLES, .. }));
    }

    #[test]
    fn test_duplicate_registration() {
        let mut registry = FormatRegistry::new();
        registry.register_hint_style("comment", Arc::new(Nothing)).unwrap();
        let err = registry
            .register_hint_style("comment", Arc::new(Nothing))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateFormat { .. }));
    }

    #[test]
    fn test_names_are_sorted() {
        let mut registry = FormatRegistry::new();
        registry.register_doc_format("sphinx", Arc::new(Marker)).unwrap();
        registry.register_doc_format("epydoc", Arc::new(Marker)).unwrap();
        assert_eq!(registry.doc_format_names(), vec!["epydoc", "sphinx"]);
        assert!(registry.hint_style_names().is_empty());
    }
}
