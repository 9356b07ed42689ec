//! Epydoc and Sphinx field parser
//!
//! Both dialects write type documentation as fields that start a line:
//!
//! ```text
//! :type id: int            @type id: int
//! :rtype: bool             @rtype: bool
//! :param int id: ...       @param int id: ...
//! ```
//!
//! They only differ in the sigil, so one parser serves both.

use docpy_core::{AnnotationKind, DocFormat, DocString, SourceLocation, TypeAnnotation};
use regex::{Captures, Regex};
use tracing::{debug, warn};

/// Sigil, tag word, up to two tokens, colon, rest of the line
const FIELD_PATTERN: &str = r"(?m)^[ \t]*[@:]([a-zA-Z]+)([ \t]+\w+)?([ \t]+\w+)?[ \t]*:(.*)$";

/// Field tags that carry type information
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldTag {
    /// `type name: T`, `vartype name: T`
    Type,
    /// `rtype: T`
    ReturnType,
    /// `param T name: description` and its aliases
    Param,
}

impl FieldTag {
    fn from_word(word: &str) -> Option<Self> {
        match word {
            "type" | "vartype" => Some(Self::Type),
            "rtype" => Some(Self::ReturnType),
            "param" | "parameter" | "arg" | "argument" | "key" | "keyword" => Some(Self::Param),
            _ => None,
        }
    }
}

/// Docstring parser for Epydoc and Sphinx type fields
pub struct DocUtilsStyle {
    field_re: Regex,
}

impl DocUtilsStyle {
    pub fn new() -> Self {
        Self {
            field_re: Regex::new(FIELD_PATTERN).expect("field pattern is valid"),
        }
    }

    /// Parse all type fields of `content` in textual order.
    ///
    /// `in_function` decides whether `type` fields describe parameters or
    /// variables.
    pub fn parse(&self, content: &str, in_function: bool) -> Vec<TypeAnnotation> {
        self.field_re
            .captures_iter(content)
            .filter_map(|caps| {
                let (kind, name, expr) = interpret_field(&caps, in_function)?;
                let start = caps.get(0).map_or(0, |m| m.start());
                Some(TypeAnnotation::new(
                    kind,
                    name,
                    expr,
                    SourceLocation::from_offset(content, start),
                ))
            })
            .collect()
    }
}

impl Default for DocUtilsStyle {
    fn default() -> Self {
        Self::new()
    }
}

impl DocFormat for DocUtilsStyle {
    fn extract(&self, doc_string: &mut DocString) {
        let annotations = self.parse(&doc_string.content, doc_string.is_function());
        debug!(
            "Found {} type annotations in docstring at {}",
            annotations.len(),
            doc_string.docstring_location
        );
        doc_string.annotations.extend(annotations);
    }
}

fn interpret_field<'c>(
    caps: &Captures<'c>,
    in_function: bool,
) -> Option<(AnnotationKind, Option<&'c str>, &'c str)> {
    let word = caps.get(1)?.as_str();
    let first = caps.get(2).map(|m| m.as_str().trim());
    let second = caps.get(3).map(|m| m.as_str().trim());
    let text = caps.get(4).map_or("", |m| m.as_str()).trim();

    match (FieldTag::from_word(word)?, first, second) {
        (FieldTag::Type, Some(name), None) => {
            let kind = if in_function {
                AnnotationKind::Param
            } else {
                AnnotationKind::Var
            };
            Some((kind, Some(name), text))
        }
        (FieldTag::ReturnType, None, None) => Some((AnnotationKind::Return, None, text)),
        (FieldTag::Param, Some(type_expression), Some(name)) => {
            Some((AnnotationKind::Param, Some(name), type_expression))
        }
        (FieldTag::Param, _, _) => {
            // plain `:param name: description`, no type to take
            None
        }
        (tag, first, second) => {
            warn!(
                "Skipping malformed {:?} field `{}` (tokens: {:?}, {:?})",
                tag,
                caps.get(0).map_or("", |m| m.as_str()).trim(),
                first,
                second
            );
            None
        }
    }
}
