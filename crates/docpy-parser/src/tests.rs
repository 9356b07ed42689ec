//! Extended tests for the docpy parser
//!
//! These tests verify the parser finds docstrings and the shape of the
//! declarations they belong to across common Python layouts.

use super::*;
use crate::treesitter::TreeSitterParser;
use docpy_core::{Declaration, FunctionKind, FunctionSignature, SourceLocation};
use pretty_assertions::assert_eq;

fn parse(source: &str) -> ParseResult {
    let mut parser = TreeSitterParser::new().unwrap();
    parser.parse_source(source, "test.py").unwrap()
}

fn signature(doc: &DocString) -> &FunctionSignature {
    match &doc.declaration {
        Declaration::Function(signature) => signature,
        other => panic!("expected a function, found {other:?}"),
    }
}

/// Test a free function with a multi-line docstring
#[test]
fn test_free_function() {
    let source = r#"
def add(a, b):
    """
    :type a: int
    :type b: int
    """
    return a + b
"#;
    let result = parse(source);

    assert_eq!(result.docstrings.len(), 1);
    let doc = &result.docstrings[0];
    assert_eq!(doc.content, "\n    :type a: int\n    :type b: int\n    ");
    assert_eq!(doc.declaration_location, SourceLocation::new(1, 0));
    assert_eq!(doc.docstring_location, SourceLocation::new(5, 7));
    assert!(doc.annotations.is_empty());

    let sig = signature(doc);
    assert_eq!(sig.params, vec!["a", "b"]);
    assert_eq!(sig.kind, FunctionKind::Free);
    assert_eq!(sig.vararg, None);
    assert_eq!(sig.kwarg, None);
    assert_eq!(sig.header_end, Some(SourceLocation::new(1, 14)));
}

/// Test that only string literals in first position count
#[test]
fn test_undocumented_definitions() {
    let source = r#"
def no_doc(a):
    x = "not a docstring"
    return x

def late_doc():
    pass
    """too late"""

def fstring_doc():
    f"""{1}"""

def bytes_doc():
    b"""bytes"""

class Plain:
    pass
"#;
    assert!(parse(source).docstrings.is_empty());
}

/// Test method kinds inferred from the enclosing class and decorators
#[test]
fn test_method_kinds() {
    let source = r#"
class Service:
    def instance(self, a):
        """instance"""

    @staticmethod
    def static(a, b):
        """static"""

    @classmethod
    def create(cls, name):
        """classmethod"""

    @property
    def value(self):
        """property"""
"#;
    let result = parse(source);

    let kinds: Vec<_> = result
        .docstrings
        .iter()
        .map(|doc| (doc.content.as_str(), signature(doc).kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            ("instance", FunctionKind::Instance),
            ("static", FunctionKind::Static),
            ("classmethod", FunctionKind::Class),
            ("property", FunctionKind::Instance),
        ]
    );

    // the decorated definition is located at `def`, not at the decorator
    assert_eq!(result.docstrings[1].declaration_location, SourceLocation::new(6, 4));
}

/// Test the recorded indentation of declaration lines
#[test]
fn test_declaration_indent() {
    let source = "def top():\n    'top'\n\nclass A:\n\tdef method(self):\n\t\t'method'\n\tclass B:\n\t\t'b'\n";
    let result = parse(source);

    let indents: Vec<_> = result
        .docstrings
        .iter()
        .map(|doc| doc.declaration_indent.as_str())
        .collect();
    assert_eq!(indents, vec!["", "\t", "\t"]);
}

/// Test that nested functions are free and nested classes get methods again
#[test]
fn test_nested_scopes() {
    let source = r#"
class Outer:
    """outer"""

    def method(self):
        """method"""
        def helper(x):
            """helper"""

        class Inner:
            def inner_method(self):
                """inner"""
"#;
    let result = parse(source);

    assert_eq!(result.docstrings.len(), 4);
    assert_eq!(result.docstrings[0].declaration, Declaration::Class);
    assert_eq!(result.docstrings[0].content, "outer");
    assert_eq!(signature(&result.docstrings[1]).kind, FunctionKind::Instance);
    assert_eq!(signature(&result.docstrings[2]).kind, FunctionKind::Free);
    assert_eq!(signature(&result.docstrings[3]).kind, FunctionKind::Instance);
}

/// Test all parameter flavours
#[test]
fn test_parameter_flavours() {
    let source = r#"
def f(a, b: int, c=1, d: str = "x", *args, e, f=2, **kwargs):
    """doc"""
"#;
    let result = parse(source);

    let sig = signature(&result.docstrings[0]);
    assert_eq!(sig.params, vec!["a", "b", "c", "d", "e", "f"]);
    assert_eq!(sig.vararg.as_deref(), Some("args"));
    assert_eq!(sig.kwarg.as_deref(), Some("kwargs"));
}

/// Test keyword-only and positional-only separators
#[test]
fn test_parameter_separators() {
    let source = r#"
def f(a, /, b, *, c, **options: dict):
    """doc"""
"#;
    let result = parse(source);

    let sig = signature(&result.docstrings[0]);
    assert_eq!(sig.params, vec!["a", "b", "c"]);
    assert_eq!(sig.vararg, None);
    assert_eq!(sig.kwarg.as_deref(), Some("options"));
}

/// Test the header end of a signature spanning several lines
#[test]
fn test_multiline_header() {
    let source = r#"
async def fetch(url,
                timeout=None) -> bytes:
    """:type url: str"""
"#;
    let result = parse(source);

    let doc = &result.docstrings[0];
    assert_eq!(doc.declaration_location, SourceLocation::new(1, 0));
    assert_eq!(signature(doc).header_end, Some(SourceLocation::new(2, 39)));
    assert_eq!(doc.docstring_location, SourceLocation::new(3, 24));
}

/// Test module docstrings and comments before docstrings
#[test]
fn test_module_docstring_and_comments() {
    let source = "# -*- coding: utf-8 -*-\n\"\"\"Module.\"\"\"\n\ndef f():\n    # leading comment\n    'doc'\n";
    let result = parse(source);

    assert_eq!(result.docstrings.len(), 2);
    assert_eq!(result.docstrings[0].declaration, Declaration::Module);
    assert_eq!(result.docstrings[0].content, "Module.");
    assert_eq!(result.docstrings[0].docstring_location, SourceLocation::new(1, 13));
    assert_eq!(result.docstrings[1].content, "doc");
}

/// Test definitions inside compound statements
#[test]
fn test_conditional_definitions() {
    let source = r#"
import sys

if sys.version_info >= (3,):
    def text(value):
        """py3"""
else:
    def text(value):
        """py2"""

class Compat:
    try:
        def method(self):
            """method"""
    except ImportError:
        pass
"#;
    let result = parse(source);

    let kinds: Vec<_> = result
        .docstrings
        .iter()
        .map(|doc| signature(doc).kind)
        .collect();
    assert_eq!(
        kinds,
        vec![FunctionKind::Free, FunctionKind::Free, FunctionKind::Instance]
    );
}

/// Test implicit concatenation of docstring parts
#[test]
fn test_concatenated_docstring() {
    let source = "def f(x):\n    ':type x: int\\n' ':rtype: str'\n";
    let result = parse(source);

    assert_eq!(result.docstrings[0].content, r":type x: int\n:rtype: str");
}

/// Test parsing through the `Parser` trait from a file
#[test]
fn test_parse_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("mod.py");
    std::fs::write(&path, "class A:\n    \"\"\":ivar x: y\"\"\"\n").unwrap();

    let result = get_parser().parse_file(&path).unwrap();
    assert_eq!(result.docstrings.len(), 1);
    assert_eq!(result.docstrings[0].docstring_location, SourceLocation::new(1, 20));
}
