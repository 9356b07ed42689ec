//! Tree-sitter based parser for Python
//!
//! Walks the syntax tree the way Python's own `ast` visitor would: a class or
//! function is documented when the first statement of its body is a plain
//! string literal.

use docpy_core::{
    Declaration, DocString, Error, FunctionKind, FunctionSignature, Result, SourceLocation,
};
use tree_sitter::{Node, Parser as TSParser, Point, Tree};
use tracing::debug;

use crate::ParseResult;

/// Tree-sitter based parser
pub struct TreeSitterParser {
    parser: TSParser,
}

impl TreeSitterParser {
    /// Create a new Tree-sitter parser for Python
    pub fn new() -> Result<Self> {
        let mut parser = TSParser::new();
        parser
            .set_language(&tree_sitter_python::LANGUAGE.into())
            .map_err(|e| Error::Grammar(format!("Failed to load Python grammar: {}", e)))?;
        Ok(Self { parser })
    }

    /// Parse source code and extract docstrings.
    ///
    /// Source with syntax errors is rejected as a whole.
    pub fn parse_source(&mut self, source: &str, filename: &str) -> Result<ParseResult> {
        let tree = self
            .parser
            .parse(source, None)
            .ok_or_else(|| parse_error(filename, Point::new(0, 0), "Failed to parse source"))?;

        check_syntax(&tree, filename)?;

        let mut collector = DocStringCollector {
            source,
            docstrings: Vec::new(),
        };
        collector.visit_module(tree.root_node());

        debug!("Found {} docstrings in {}", collector.docstrings.len(), filename);
        Ok(ParseResult {
            docstrings: collector.docstrings,
        })
    }
}

/// Stateless handle creating a fresh [`TreeSitterParser`] per call
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonParser;

impl crate::Parser for PythonParser {
    fn parse(&self, source: &str, filename: &str) -> Result<ParseResult> {
        let mut parser = TreeSitterParser::new()?;
        parser.parse_source(source, filename)
    }

    fn name(&self) -> &str {
        "tree-sitter-python"
    }
}

fn check_syntax(tree: &Tree, filename: &str) -> Result<()> {
    let root = tree.root_node();
    if !root.has_error() {
        return Ok(());
    }

    match first_error(root) {
        Some(node) if node.is_missing() => Err(parse_error(
            filename,
            node.start_position(),
            &format!("missing `{}`", node.kind()),
        )),
        Some(node) => Err(parse_error(filename, node.start_position(), "syntax error")),
        None => Err(parse_error(filename, root.start_position(), "syntax error")),
    }
}

fn first_error(node: Node) -> Option<Node> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if let Some(error) = first_error(child) {
            return Some(error);
        }
    }
    None
}

/// Error positions are reported 1-based, like editors show them
fn parse_error(filename: &str, point: Point, message: &str) -> Error {
    Error::Parse {
        file: filename.to_string(),
        line: point.row + 1,
        column: point.column + 1,
        message: message.to_string(),
    }
}

fn location(point: Point) -> SourceLocation {
    SourceLocation::new(point.row, point.column)
}

/// Body a definition is nested in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Module,
    Class,
    Function,
}

struct DocStringCollector<'s> {
    source: &'s str,
    docstrings: Vec<DocString>,
}

impl<'s> DocStringCollector<'s> {
    fn visit_module(&mut self, root: Node) {
        if let Some((content, end)) = self.block_docstring(root) {
            debug!("Found module docstring");
            self.docstrings.push(DocString::new(
                content,
                SourceLocation::START,
                end,
                Declaration::Module,
            ));
        }
        self.visit_children(root, Scope::Module);
    }

    fn visit_children(&mut self, node: Node, scope: Scope) {
        let mut cursor = node.walk();
        for child in node.named_children(&mut cursor) {
            self.visit_node(child, scope, &[]);
        }
    }

    fn visit_node(&mut self, node: Node, scope: Scope, decorators: &[String]) {
        match node.kind() {
            "class_definition" => self.visit_class(node),
            "function_definition" => self.visit_function(node, scope, decorators),
            "decorated_definition" => {
                let names = self.decorator_names(node);
                if let Some(definition) = node.child_by_field_name("definition") {
                    self.visit_node(definition, scope, &names);
                }
            }
            // Definitions inside `if`/`try`/`with` blocks keep the enclosing scope
            _ => self.visit_children(node, scope),
        }
    }

    fn visit_class(&mut self, node: Node) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };

        if let Some((content, end)) = self.block_docstring(body) {
            debug!("Found class docstring: {}", self.field_text(node, "name"));
            self.docstrings.push(
                DocString::new(
                    content,
                    location(node.start_position()),
                    end,
                    Declaration::Class,
                )
                .with_declaration_indent(self.line_indent(node)),
            );
        }

        self.visit_children(body, Scope::Class);
    }

    fn visit_function(&mut self, node: Node, scope: Scope, decorators: &[String]) {
        let Some(body) = node.child_by_field_name("body") else {
            return;
        };

        if let Some((content, end)) = self.block_docstring(body) {
            let kind = function_kind(scope, decorators);
            let mut signature = node
                .child_by_field_name("parameters")
                .map(|params| self.extract_signature(params, kind))
                .unwrap_or_else(|| FunctionSignature::new(Vec::<String>::new(), kind));
            signature.header_end = header_end(node);

            debug!(
                "Found function docstring: {} ({:?})",
                self.field_text(node, "name"),
                kind
            );
            self.docstrings.push(
                DocString::new(
                    content,
                    location(node.start_position()),
                    end,
                    Declaration::Function(signature),
                )
                .with_declaration_indent(self.line_indent(node)),
            );
        }

        self.visit_children(body, Scope::Function);
    }

    /// Content and end of the docstring opening `block`, if any
    fn block_docstring(&self, block: Node) -> Option<(String, SourceLocation)> {
        let mut cursor = block.walk();
        let first = block
            .named_children(&mut cursor)
            .find(|child| child.kind() != "comment")?;

        if first.kind() != "expression_statement" {
            return None;
        }

        let mut expr_cursor = first.walk();
        let mut exprs = first
            .named_children(&mut expr_cursor)
            .filter(|child| child.kind() != "comment");
        let (Some(expr), None) = (exprs.next(), exprs.next()) else {
            return None;
        };

        let content = self.string_content(expr)?;
        Some((content, location(first.end_position())))
    }

    /// Text of a plain string literal; `None` for f-strings, bytes and
    /// anything that is not a string
    fn string_content(&self, node: Node) -> Option<String> {
        match node.kind() {
            "string" => literal_content(self.node_text(node)).map(str::to_string),
            "concatenated_string" => {
                let mut cursor = node.walk();
                let parts = node
                    .named_children(&mut cursor)
                    .filter(|part| part.kind() != "comment")
                    .map(|part| self.string_content(part))
                    .collect::<Option<Vec<_>>>()?;
                Some(parts.concat())
            }
            _ => None,
        }
    }

    fn extract_signature(&self, params: Node, kind: FunctionKind) -> FunctionSignature {
        let mut signature = FunctionSignature::new(Vec::<String>::new(), kind);

        let mut cursor = params.walk();
        for param in params.named_children(&mut cursor) {
            match param.kind() {
                "default_parameter" | "typed_default_parameter" => {
                    if let Some(name) = param.child_by_field_name("name") {
                        self.record_parameter(name, &mut signature);
                    }
                }
                "typed_parameter" => {
                    if let Some(inner) = param.named_child(0) {
                        self.record_parameter(inner, &mut signature);
                    }
                }
                _ => self.record_parameter(param, &mut signature),
            }
        }

        signature
    }

    fn record_parameter(&self, node: Node, signature: &mut FunctionSignature) {
        match node.kind() {
            "identifier" => signature.params.push(self.node_text(node).to_string()),
            "list_splat_pattern" => signature.vararg = self.splat_name(node),
            "dictionary_splat_pattern" => signature.kwarg = self.splat_name(node),
            // `*` and `/` separators, tuple unpacking
            _ => {}
        }
    }

    fn splat_name(&self, node: Node) -> Option<String> {
        let inner = node.named_child(0)?;
        (inner.kind() == "identifier").then(|| self.node_text(inner).to_string())
    }

    fn decorator_names(&self, node: Node) -> Vec<String> {
        let mut cursor = node.walk();
        node.named_children(&mut cursor)
            .filter(|child| child.kind() == "decorator")
            .filter_map(|decorator| self.decorator_name(decorator))
            .collect()
    }

    /// `name` for `@name`, `@module.name` and `@name(...)`
    fn decorator_name(&self, decorator: Node) -> Option<String> {
        let mut expr = decorator.named_child(0)?;
        if expr.kind() == "call" {
            expr = expr.child_by_field_name("function")?;
        }
        match expr.kind() {
            "identifier" => Some(self.node_text(expr).to_string()),
            "attribute" => expr
                .child_by_field_name("attribute")
                .map(|attr| self.node_text(attr).to_string()),
            _ => None,
        }
    }

    /// Leading whitespace of the line `node` starts on
    fn line_indent(&self, node: Node) -> &'s str {
        let before = self.source.get(..node.start_byte()).unwrap_or("");
        let line = &before[before.rfind('\n').map_or(0, |nl| nl + 1)..];
        &line[..line.len() - line.trim_start().len()]
    }

    fn field_text(&self, node: Node, field: &str) -> &'s str {
        node.child_by_field_name(field)
            .map(|child| self.node_text(child))
            .unwrap_or("")
    }

    fn node_text(&self, node: Node) -> &'s str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }
}

/// Kind of a function defined in `scope`.
///
/// Decorators are matched by name, so a shadowed `staticmethod` is
/// still taken for the builtin.
fn function_kind(scope: Scope, decorators: &[String]) -> FunctionKind {
    if scope != Scope::Class {
        return FunctionKind::Free;
    }
    if decorators.iter().any(|d| d == "staticmethod") {
        FunctionKind::Static
    } else if decorators.iter().any(|d| d == "classmethod") {
        FunctionKind::Class
    } else {
        FunctionKind::Instance
    }
}

/// End of the `:` token terminating a function header
fn header_end(function: Node) -> Option<SourceLocation> {
    let mut cursor = function.walk();
    let colon = function
        .children(&mut cursor)
        .find(|child| !child.is_named() && child.kind() == ":")?;
    Some(location(colon.end_position()))
}

/// Strip the prefix and quotes of a string literal.
///
/// Escape sequences are left as written.
fn literal_content(literal: &str) -> Option<&str> {
    let quote_start = literal.find(['"', '\''])?;
    let prefix = literal[..quote_start].to_ascii_lowercase();
    if prefix.contains('f') || prefix.contains('b') {
        return None;
    }

    let quoted = &literal[quote_start..];
    ["\"\"\"", "'''", "\"", "'"]
        .into_iter()
        .find(|quote| {
            quoted.len() >= 2 * quote.len() && quoted.starts_with(quote) && quoted.ends_with(quote)
        })
        .map(|quote| &quoted[quote.len()..quoted.len() - quote.len()])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_literal_content() {
        assert_eq!(literal_content(r#""""doc""""#), Some("doc"));
        assert_eq!(literal_content("'''doc'''"), Some("doc"));
        assert_eq!(literal_content(r#""doc""#), Some("doc"));
        assert_eq!(literal_content("''"), Some(""));
        assert_eq!(literal_content(r#""""""""#), Some(""));
        assert_eq!(literal_content(r#"r"""a\nb""""#), Some(r"a\nb"));
        assert_eq!(literal_content(r#"U"doc""#), Some("doc"));
        assert_eq!(literal_content(r#"f"doc""#), None);
        assert_eq!(literal_content(r#"b"doc""#), None);
        assert_eq!(literal_content(r#"Rb"doc""#), None);
    }

    #[test]
    fn test_function_kind() {
        let names = |list: &[&str]| list.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        assert_eq!(function_kind(Scope::Module, &names(&["staticmethod"])), FunctionKind::Free);
        assert_eq!(function_kind(Scope::Function, &[]), FunctionKind::Free);
        assert_eq!(function_kind(Scope::Class, &[]), FunctionKind::Instance);
        assert_eq!(
            function_kind(Scope::Class, &names(&["property", "staticmethod"])),
            FunctionKind::Static
        );
        assert_eq!(function_kind(Scope::Class, &names(&["classmethod"])), FunctionKind::Class);
    }

    #[test]
    fn test_syntax_error_is_fatal() {
        let mut parser = TreeSitterParser::new().unwrap();
        let err = parser
            .parse_source("def broken(:\n    pass\n", "broken.py")
            .unwrap_err();
        match err {
            Error::Parse { file, line, .. } => {
                assert_eq!(file, "broken.py");
                assert_eq!(line, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
