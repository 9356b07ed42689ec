//! Docstring records and the type annotations extracted from them

use crate::location::SourceLocation;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// A docstring together with the declaration it documents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocString {
    /// Raw text between the quotes of the docstring literal
    pub content: String,
    /// Start of the `def`/`class` statement
    pub declaration_location: SourceLocation,
    /// Leading whitespace of the line holding the declaration
    #[serde(default)]
    pub declaration_indent: String,
    /// Position just past the closing quote of the docstring literal
    pub docstring_location: SourceLocation,
    /// Annotations in the order they appear in `content`
    pub annotations: Vec<TypeAnnotation>,
    /// Shape of the documented declaration
    pub declaration: Declaration,
}

impl DocString {
    pub fn new(
        content: impl Into<String>,
        declaration_location: SourceLocation,
        docstring_location: SourceLocation,
        declaration: Declaration,
    ) -> Self {
        Self {
            content: content.into(),
            declaration_location,
            declaration_indent: String::new(),
            docstring_location,
            annotations: Vec::new(),
            declaration,
        }
    }

    pub fn is_function(&self) -> bool {
        matches!(self.declaration, Declaration::Function(_))
    }

    pub fn with_declaration_indent(mut self, indent: impl Into<String>) -> Self {
        self.declaration_indent = indent.into();
        self
    }

    /// Indentation of the docstring's last line.
    ///
    /// This is the whitespace between the last newline in `content` and the
    /// first non-whitespace character after it. A docstring without a newline
    /// sits in the body of its declaration, one `indent_unit` deeper than the
    /// declaration itself.
    pub fn guess_indent<'a>(&'a self, indent_unit: &str) -> Cow<'a, str> {
        match self.content.rfind('\n') {
            None => Cow::Owned(format!("{}{}", self.declaration_indent, indent_unit)),
            Some(last_nl) => {
                let last_line = &self.content[last_nl + 1..];
                let width = last_line.len() - last_line.trim_start().len();
                Cow::Borrowed(&last_line[..width])
            }
        }
    }
}

/// Kind of declaration a docstring belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Declaration {
    Function(FunctionSignature),
    Class,
    Module,
}

/// Structural facts about a function declaration
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FunctionSignature {
    /// Positional and keyword parameter names in declaration order
    pub params: Vec<String>,
    /// Name of the `*args` parameter
    pub vararg: Option<String>,
    /// Name of the `**kwargs` parameter
    pub kwarg: Option<String>,
    pub kind: FunctionKind,
    /// End of the `:` closing the function header, when it is known
    pub header_end: Option<SourceLocation>,
}

impl FunctionSignature {
    pub fn new<I, S>(params: I, kind: FunctionKind) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            params: params.into_iter().map(Into::into).collect(),
            kind,
            ..Self::default()
        }
    }

    pub fn with_vararg(mut self, name: impl Into<String>) -> Self {
        self.vararg = Some(name.into());
        self
    }

    pub fn with_kwarg(mut self, name: impl Into<String>) -> Self {
        self.kwarg = Some(name.into());
        self
    }

    /// Parameters that can carry a type, i.e. without the implicit receiver
    /// of instance and class methods
    pub fn typed_params(&self) -> &[String] {
        match self.kind {
            FunctionKind::Instance | FunctionKind::Class if !self.params.is_empty() => {
                &self.params[1..]
            }
            _ => &self.params,
        }
    }
}

/// How a function is bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FunctionKind {
    /// Module-level or nested function
    #[default]
    Free,
    /// Method receiving the instance as first parameter
    Instance,
    /// `@classmethod`, receives the class as first parameter
    Class,
    /// `@staticmethod`
    Static,
}

/// What an annotation describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    Param,
    Var,
    Cvar,
    Ivar,
    Return,
}

/// One type tag found in a docstring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAnnotation {
    pub kind: AnnotationKind,
    /// Documented name; `None` for return types
    pub name: Option<String>,
    /// Type expression, passed through unvalidated
    pub type_expression: String,
    /// Start of the tag line, relative to the docstring content
    pub location: SourceLocation,
}

impl TypeAnnotation {
    pub fn new(
        kind: AnnotationKind,
        name: Option<&str>,
        type_expression: impl Into<String>,
        location: SourceLocation,
    ) -> Self {
        Self {
            kind,
            name: name.map(str::to_string),
            type_expression: type_expression.into(),
            location,
        }
    }
}
