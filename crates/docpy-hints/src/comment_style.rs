//! PEP 484 type comments
//!
//! Functions get a signature comment on the line after their header:
//!
//! ```text
//! def get(self, key, *rest):
//!     # type: (str, *int) -> bool
//! ```
//!
//! Classes get attribute declarations after their docstring:
//!
//! ```text
//!     services = None  # type: dict
//!     registry = None  # type: ClassVar[Registry]
//! ```

use docpy_core::config::HintConfig;
use docpy_core::{
    AnnotationKind, Declaration, DocString, FunctionSignature, HintStyle, SourceReplacement,
};
use std::collections::HashMap;
use tracing::debug;

/// Marker standing for an unknown parameter list
const UNSPECIFIED_PARAMS: &str = "...";

/// Hint style emitting `# type:` comments
#[derive(Debug, Default, Clone, Copy)]
pub struct CommentStyle;

impl CommentStyle {
    pub fn new() -> Self {
        Self
    }

    /// Signature comment for a function, inserted after its header line
    pub fn function_hint(
        &self,
        doc_string: &DocString,
        signature: &FunctionSignature,
        config: &HintConfig,
    ) -> SourceReplacement {
        let mut params: HashMap<&str, &str> = HashMap::new();
        let mut returns = None;
        for annotation in &doc_string.annotations {
            match (annotation.kind, annotation.name.as_deref()) {
                (AnnotationKind::Param | AnnotationKind::Var, Some(name)) => {
                    params.insert(name, &annotation.type_expression);
                }
                (AnnotationKind::Return, _) => returns = Some(annotation.type_expression.as_str()),
                _ => {}
            }
        }

        let typed_params = signature.typed_params();
        let any_documented = typed_params.iter().any(|p| params.contains_key(p.as_str()));

        let mut arg_types: Vec<String> = if !typed_params.is_empty() && !any_documented {
            vec![UNSPECIFIED_PARAMS.to_string()]
        } else {
            typed_params
                .iter()
                .map(|p| lookup_type(&params, p, config).to_string())
                .collect()
        };
        if let Some(vararg) = &signature.vararg {
            arg_types.push(format!("*{}", lookup_type(&params, vararg, config)));
        }
        if let Some(kwarg) = &signature.kwarg {
            arg_types.push(format!("**{}", lookup_type(&params, kwarg, config)));
        }

        let line = format!(
            "{}# type: ({}) -> {}\n",
            doc_string.guess_indent(&config.fallback_indent),
            arg_types.join(", "),
            returns.unwrap_or(&config.missing_return_type)
        );

        let anchor = signature
            .header_end
            .unwrap_or(doc_string.declaration_location)
            .next_line();
        SourceReplacement::insert(anchor, line)
    }

    /// Attribute declarations for a class, inserted after its docstring.
    /// `None` when the docstring documents no attributes.
    pub fn class_hint(
        &self,
        doc_string: &DocString,
        config: &HintConfig,
    ) -> Option<SourceReplacement> {
        let mut instance_vars = Vec::new();
        let mut class_vars = Vec::new();
        for annotation in &doc_string.annotations {
            let Some(name) = annotation.name.as_deref() else {
                continue;
            };
            let expr = annotation.type_expression.as_str();
            match annotation.kind {
                AnnotationKind::Ivar | AnnotationKind::Var => upsert(&mut instance_vars, name, expr),
                AnnotationKind::Cvar => upsert(&mut class_vars, name, expr),
                _ => {}
            }
        }

        if instance_vars.is_empty() && class_vars.is_empty() {
            return None;
        }

        let indent = doc_string.guess_indent(&config.fallback_indent);
        let mut block = String::new();
        for (name, expr) in &instance_vars {
            block.push_str(&format!("{indent}{name} = None  # type: {expr}\n"));
        }
        for (name, expr) in &class_vars {
            block.push_str(&format!("{indent}{name} = None  # type: ClassVar[{expr}]\n"));
        }

        Some(SourceReplacement::insert(
            doc_string.docstring_location.next_line(),
            block,
        ))
    }
}

impl HintStyle for CommentStyle {
    fn synthesize(
        &self,
        doc_string: &DocString,
        config: &HintConfig,
        replacements: &mut Vec<SourceReplacement>,
    ) {
        match &doc_string.declaration {
            Declaration::Function(signature) => {
                replacements.push(self.function_hint(doc_string, signature, config));
            }
            Declaration::Class => {
                if let Some(replacement) = self.class_hint(doc_string, config) {
                    replacements.push(replacement);
                }
            }
            Declaration::Module => {
                debug!("No comment hints for module docstrings");
            }
        }
    }
}

fn lookup_type<'a>(params: &HashMap<&str, &'a str>, name: &str, config: &'a HintConfig) -> &'a str {
    params.get(name).copied().unwrap_or(&config.any_type)
}

/// Insert or overwrite `name`, keeping first-seen order
fn upsert<'a>(entries: &mut Vec<(&'a str, &'a str)>, name: &'a str, expr: &'a str) {
    match entries.iter_mut().find(|(n, _)| *n == name) {
        Some(entry) => entry.1 = expr,
        None => entries.push((name, expr)),
    }
}
