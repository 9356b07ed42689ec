//! docpy CLI
//!
//! Command-line interface for turning docstring type documentation into
//! type comments.

use anyhow::{bail, Result};
use clap::{ArgAction, Parser, Subcommand};
use docpy_core::{AnnotationKind, Config, Declaration, DocString, FunctionKind};
use docpy_rewrite::parallel::collect_files;
use docpy_rewrite::{default_registry, BatchRewriter, OutputMode, ProgressPhase, Rewriter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "docpy")]
#[command(
    author,
    version,
    about = "Convert Epydoc/Sphinx docstring types to type comments",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    /// YAML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Add type comments to files, rewriting them in place
    Rewrite {
        /// Files or directories to process
        #[arg(value_name = "PATH", required = true)]
        paths: Vec<PathBuf>,

        /// Format of the source docstrings
        #[arg(short, long = "src-format", value_name = "SRCFMT")]
        src_format: Option<String>,

        /// Style of the emitted type hints
        #[arg(short, long, value_name = "FMT")]
        format: Option<String>,

        /// Print rewritten sources instead of writing files
        #[arg(long, conflicts_with = "check")]
        stdout: bool,

        /// Only report files that would change
        #[arg(long)]
        check: bool,
    },

    /// List docstrings and the types documented in them
    Scan {
        /// Source file
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Format of the source docstrings
        #[arg(short, long = "src-format", value_name = "SRCFMT")]
        src_format: Option<String>,

        /// Output format (text, json)
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// List supported docstring formats and hint styles
    Formats,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => Config::from_yaml_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Commands::Rewrite {
            paths,
            src_format,
            format,
            stdout,
            check,
        } => {
            if let Some(src_format) = src_format {
                config.source_format = src_format;
            }
            if let Some(format) = format {
                config.hint_style = format;
            }
            if stdout {
                cmd_rewrite_stdout(&paths, &config)
            } else {
                let mode = if check {
                    OutputMode::Check
                } else {
                    OutputMode::InPlace
                };
                cmd_rewrite(&paths, &config, mode)
            }
        }
        Commands::Scan {
            file,
            src_format,
            format,
        } => {
            if let Some(src_format) = src_format {
                config.source_format = src_format;
            }
            cmd_scan(&file, &config, &format)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Formats => {
            cmd_formats()?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Log to stderr; `RUST_LOG` overrides the level chosen by `-v`
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_rewrite(paths: &[PathBuf], config: &Config, mode: OutputMode) -> Result<ExitCode> {
    let registry = default_registry()?;
    let rewriter = Rewriter::new(&registry, config)?;

    let summary = BatchRewriter::new(&rewriter, config.files.clone())
        .with_progress(|event| {
            if event.phase != ProgressPhase::Complete {
                debug!("{}", event.message);
            }
        })
        .run(paths, mode)?;

    for (path, result) in &summary.results {
        match result {
            Ok(report) if report.changed && mode == OutputMode::Check => {
                println!("would rewrite {}", path.display());
            }
            Ok(report) if report.changed => {
                println!("rewrote {}", path.display());
            }
            Ok(_) => {}
            Err(e) => eprintln!("❌ {}: {}", path.display(), e),
        }
    }

    let verb = if mode == OutputMode::Check {
        "would change"
    } else {
        "changed"
    };
    eprintln!(
        "📊 {} {}, {} unchanged, {} failed",
        summary.changed(),
        verb,
        summary.unchanged(),
        summary.failed()
    );

    let failed = summary.failed() > 0;
    let pending = mode == OutputMode::Check && summary.changed() > 0;
    Ok(if failed || pending {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Print the rewrite of every file, one after the other
fn cmd_rewrite_stdout(paths: &[PathBuf], config: &Config) -> Result<ExitCode> {
    let registry = default_registry()?;
    let rewriter = Rewriter::new(&registry, config)?;
    let files = collect_files(paths, &config.files)?;

    let mut failed = 0;
    let stdout = std::io::stdout();
    for file in &files {
        let source = match std::fs::read_to_string(file) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("❌ {}: {}", file.display(), e);
                failed += 1;
                continue;
            }
        };

        // rewrite into a buffer so a failing file prints nothing
        let mut output = Vec::with_capacity(source.len());
        match rewriter.rewrite_to(&source, &file.to_string_lossy(), &mut output) {
            Ok(_) => {
                let mut out = stdout.lock();
                out.write_all(&output)?;
                out.flush()?;
            }
            Err(e) => {
                eprintln!("❌ {}: {}", file.display(), e);
                failed += 1;
            }
        }
    }

    Ok(if failed > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_scan(file: &Path, config: &Config, format: &str) -> Result<()> {
    let registry = default_registry()?;
    let rewriter = Rewriter::new(&registry, config)?;

    let source = std::fs::read_to_string(file)?;
    let docstrings = rewriter.docstrings(&source, &file.to_string_lossy())?;

    match format {
        "json" => {
            let result = serde_json::json!({
                "file": file.to_string_lossy(),
                "source_format": config.source_format,
                "docstrings": docstrings,
            });
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        "text" => print_docstrings(file, &docstrings),
        other => bail!("unknown output format `{}` (expected text or json)", other),
    }

    Ok(())
}

fn print_docstrings(file: &Path, docstrings: &[DocString]) {
    println!("📂 {}: {} docstring(s)", file.display(), docstrings.len());

    for doc in docstrings {
        println!();
        println!(
            "  {}:{} {}",
            doc.declaration_location.line + 1,
            doc.declaration_location.column + 1,
            declaration_label(&doc.declaration)
        );
        if doc.annotations.is_empty() {
            println!("     (no type information)");
        }
        for annotation in &doc.annotations {
            match &annotation.name {
                Some(name) => println!(
                    "     {} {}: {}",
                    kind_label(annotation.kind),
                    name,
                    annotation.type_expression
                ),
                None => println!(
                    "     {}: {}",
                    kind_label(annotation.kind),
                    annotation.type_expression
                ),
            }
        }
    }
}

fn declaration_label(declaration: &Declaration) -> String {
    match declaration {
        Declaration::Module => "module".to_string(),
        Declaration::Class => "class".to_string(),
        Declaration::Function(signature) => {
            let kind = match signature.kind {
                FunctionKind::Free => "function",
                FunctionKind::Instance => "method",
                FunctionKind::Class => "classmethod",
                FunctionKind::Static => "staticmethod",
            };
            let mut params = signature.params.clone();
            if let Some(vararg) = &signature.vararg {
                params.push(format!("*{}", vararg));
            }
            if let Some(kwarg) = &signature.kwarg {
                params.push(format!("**{}", kwarg));
            }
            format!("{} ({})", kind, params.join(", "))
        }
    }
}

fn kind_label(kind: AnnotationKind) -> &'static str {
    match kind {
        AnnotationKind::Param => "param",
        AnnotationKind::Var => "var",
        AnnotationKind::Cvar => "cvar",
        AnnotationKind::Ivar => "ivar",
        AnnotationKind::Return => "rtype",
    }
}

fn cmd_formats() -> Result<()> {
    let registry = default_registry()?;

    println!("Docstring formats (-s):");
    for name in registry.doc_format_names() {
        println!("  {}", name);
    }
    println!();
    println!("Hint styles (-f):");
    for name in registry.hint_style_names() {
        println!("  {}", name);
    }

    Ok(())
}
