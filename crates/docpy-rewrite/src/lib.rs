//! docpy Rewrite
//!
//! Ties the pipeline together: parse a Python file, extract the documented
//! types, synthesize hints and splice them into the source.
//!
//! ## Modules
//!
//! - `applier` - Replacement ordering and streaming application
//! - `output` - Atomic in-place writes
//! - `parallel` - Parallel batch runs over files and directories

pub mod applier;
pub mod output;
pub mod parallel;

use docpy_core::config::HintConfig;
use docpy_core::{Config, DocFormat, DocString, FormatRegistry, HintStyle, Result, SourceReplacement};
use docpy_parser::Parser;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

pub use applier::{apply, plan};
pub use parallel::{BatchRewriter, BatchSummary, ProgressEvent, ProgressPhase};

/// Registry with every documentation dialect and hint style docpy ships
pub fn default_registry() -> Result<FormatRegistry> {
    let mut registry = FormatRegistry::new();
    docpy_docformat::register_doc_formats(&mut registry)?;
    docpy_hints::register_hint_styles(&mut registry)?;
    Ok(registry)
}

/// What to do with a rewritten file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Replace the file on disk
    #[default]
    InPlace,
    /// Only report whether the file would change
    Check,
}

/// Outcome of rewriting one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub docstrings: usize,
    pub replacements: usize,
    /// Whether the output differs from the input
    pub changed: bool,
}

/// Rewritten source of one file
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub docstrings: Vec<DocString>,
    /// Ordered replacements applied to produce `output`
    pub replacements: Vec<SourceReplacement>,
    pub output: Vec<u8>,
}

/// Per-file pipeline configured with one dialect and one hint style
pub struct Rewriter {
    parser: Box<dyn Parser>,
    doc_format: Arc<dyn DocFormat>,
    hint_style: Arc<dyn HintStyle>,
    hints: HintConfig,
}

impl Rewriter {
    /// Look up the configured dialect and style in `registry`
    pub fn new(registry: &FormatRegistry, config: &Config) -> Result<Self> {
        Ok(Self {
            parser: docpy_parser::get_parser(),
            doc_format: registry.doc_format(&config.source_format)?,
            hint_style: registry.hint_style(&config.hint_style)?,
            hints: config.hints.clone(),
        })
    }

    /// Parse `source` and extract the annotations of every docstring
    pub fn docstrings(&self, source: &str, filename: &str) -> Result<Vec<DocString>> {
        let mut docstrings = self.parser.parse(source, filename)?.docstrings;
        for doc_string in &mut docstrings {
            self.doc_format.extract(doc_string);
            debug!(
                "{}: {} annotation(s) in docstring at {}",
                filename,
                doc_string.annotations.len(),
                doc_string.declaration_location
            );
        }
        Ok(docstrings)
    }

    /// Ordered replacements adding hints for `docstrings` of `source`.
    ///
    /// Hint lines end the way the first line of `source` does.
    pub fn replacements(
        &self,
        source: &str,
        docstrings: &[DocString],
    ) -> Result<Vec<SourceReplacement>> {
        let mut replacements = Vec::new();
        for doc_string in docstrings {
            self.hint_style
                .synthesize(doc_string, &self.hints, &mut replacements);
        }
        if line_ending(source) == "\r\n" {
            for replacement in &mut replacements {
                replacement.replacement = replacement.replacement.replace('\n', "\r\n");
            }
        }
        plan(replacements)
    }

    /// Rewrite `source` in memory
    pub fn rewrite_source(&self, source: &str, filename: &str) -> Result<Rewrite> {
        let docstrings = self.docstrings(source, filename)?;
        let replacements = self.replacements(source, &docstrings)?;

        let mut output = Vec::with_capacity(source.len());
        apply(source.as_bytes(), &mut output, &replacements)?;

        Ok(Rewrite {
            docstrings,
            replacements,
            output,
        })
    }

    /// Stream the rewrite of `source` into `dest`
    pub fn rewrite_to<W: Write>(&self, source: &str, filename: &str, dest: W) -> Result<FileReport> {
        let docstrings = self.docstrings(source, filename)?;
        let replacements = self.replacements(source, &docstrings)?;
        apply(source.as_bytes(), dest, &replacements)?;

        Ok(FileReport {
            path: PathBuf::from(filename),
            docstrings: docstrings.len(),
            replacements: replacements.len(),
            changed: applier::changes_source(&replacements),
        })
    }

    /// Rewrite the file at `path` according to `mode`
    pub fn rewrite_file(&self, path: &Path, mode: OutputMode) -> Result<FileReport> {
        let source = std::fs::read_to_string(path)?;
        let filename = path.to_string_lossy();

        let docstrings = self.docstrings(&source, &filename)?;
        let replacements = self.replacements(&source, &docstrings)?;
        let changed = applier::changes_source(&replacements);

        match mode {
            OutputMode::InPlace if changed => {
                output::write_atomically(path, |dest| {
                    apply(source.as_bytes(), dest, &replacements)
                })?;
                info!("Rewrote {} ({} hint(s))", path.display(), replacements.len());
            }
            OutputMode::InPlace => {
                debug!("{} unchanged", path.display());
            }
            OutputMode::Check => {
                // validate bounds without producing output
                apply(source.as_bytes(), std::io::sink(), &replacements)?;
                if changed {
                    info!("{} would be rewritten", path.display());
                }
            }
        }

        Ok(FileReport {
            path: path.to_path_buf(),
            docstrings: docstrings.len(),
            replacements: replacements.len(),
            changed,
        })
    }
}

/// Line terminator of the first line in `source`, `\n` when it has none
fn line_ending(source: &str) -> &'static str {
    match source.find('\n') {
        Some(nl) if source[..nl].ends_with('\r') => "\r\n",
        _ => "\n",
    }
}

impl std::fmt::Debug for Rewriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rewriter")
            .field("parser", &self.parser.name())
            .field("hints", &self.hints)
            .finish()
    }
}
