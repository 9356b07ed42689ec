//! Parallel batch rewriting using rayon
//!
//! Expands paths into Python files and rewrites them concurrently. Every
//! file succeeds or fails on its own.

use crate::{FileReport, OutputMode, Rewriter};
use docpy_core::config::FilesConfig;
use docpy_core::{Error, Result};
use globset::{Glob, GlobSet, GlobSetBuilder};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Progress callback type
pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;

/// Progress event for tracking a batch run
#[derive(Debug, Clone)]
pub struct ProgressEvent {
    pub phase: ProgressPhase,
    pub current: usize,
    pub total: usize,
    pub message: String,
}

/// Batch phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressPhase {
    Scanning,
    Rewriting,
    Complete,
}

/// Result of a batch run, in input order
#[derive(Debug, Default)]
pub struct BatchSummary {
    pub results: Vec<(PathBuf, Result<FileReport>)>,
}

impl BatchSummary {
    /// Files whose content changed (or would change in check mode)
    pub fn changed(&self) -> usize {
        self.reports().filter(|r| r.changed).count()
    }

    pub fn unchanged(&self) -> usize {
        self.reports().filter(|r| !r.changed).count()
    }

    pub fn failed(&self) -> usize {
        self.results.iter().filter(|(_, r)| r.is_err()).count()
    }

    /// Failed files with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&Path, &Error)> {
        self.results
            .iter()
            .filter_map(|(path, result)| result.as_ref().err().map(|e| (path.as_path(), e)))
    }

    fn reports(&self) -> impl Iterator<Item = &FileReport> {
        self.results.iter().filter_map(|(_, r)| r.as_ref().ok())
    }
}

/// Rewrites many files in parallel with one [`Rewriter`]
pub struct BatchRewriter<'a> {
    rewriter: &'a Rewriter,
    files: FilesConfig,
    progress_callback: Option<Arc<ProgressCallback>>,
}

impl<'a> BatchRewriter<'a> {
    pub fn new(rewriter: &'a Rewriter, files: FilesConfig) -> Self {
        Self {
            rewriter,
            files,
            progress_callback: None,
        }
    }

    /// Set progress callback
    pub fn with_progress<F>(mut self, callback: F) -> Self
    where
        F: Fn(ProgressEvent) + Send + Sync + 'static,
    {
        self.progress_callback = Some(Arc::new(Box::new(callback)));
        self
    }

    /// Expand `paths` and rewrite every file found
    pub fn run(&self, paths: &[PathBuf], mode: OutputMode) -> Result<BatchSummary> {
        self.emit_progress(ProgressPhase::Scanning, 0, 0, "Scanning paths...");
        let files = collect_files(paths, &self.files)?;
        info!("Found {} files to rewrite", files.len());
        self.emit_progress(
            ProgressPhase::Scanning,
            files.len(),
            files.len(),
            format!("Found {} files", files.len()),
        );

        Ok(self.rewrite_files(&files, mode))
    }

    /// Rewrite `files` in parallel
    pub fn rewrite_files(&self, files: &[PathBuf], mode: OutputMode) -> BatchSummary {
        let total = files.len();
        let processed = AtomicUsize::new(0);

        let results: Vec<_> = files
            .par_iter()
            .map(|path| {
                let result = self.rewriter.rewrite_file(path, mode);
                if let Err(ref e) = result {
                    warn!("Failed to rewrite {}: {}", path.display(), e);
                }

                let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
                if current % 10 == 0 || current == total {
                    self.emit_progress(
                        ProgressPhase::Rewriting,
                        current,
                        total,
                        format!("Processed {}/{} files", current, total),
                    );
                }

                (path.clone(), result)
            })
            .collect();

        self.emit_progress(ProgressPhase::Complete, total, total, "Rewrite complete");
        BatchSummary { results }
    }

    fn emit_progress<S: Into<String>>(&self, phase: ProgressPhase, current: usize, total: usize, message: S) {
        if let Some(ref callback) = self.progress_callback {
            callback(ProgressEvent {
                phase,
                current,
                total,
                message: message.into(),
            });
        }
    }
}

/// Expand `paths` into the files to rewrite.
///
/// Directories are walked recursively and filtered by extension and the
/// exclusion lists. Paths naming files are always kept unless an exclusion
/// glob matches them.
pub fn collect_files(paths: &[PathBuf], files: &FilesConfig) -> Result<Vec<PathBuf>> {
    let excluded = build_globset(&files.exclude_globs)?;
    let mut found = Vec::new();

    for path in paths {
        if !path.is_dir() {
            if !excluded.is_match(path) {
                found.push(path.clone());
            }
            continue;
        }

        let walker = WalkDir::new(path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                e.depth() == 0
                    || !e.file_type().is_dir()
                    || !files
                        .exclude_dirs
                        .iter()
                        .any(|dir| e.file_name().to_str() == Some(dir.as_str()))
            });

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || excluded.is_match(entry.path()) {
                continue;
            }
            let matches_extension = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| files.extensions.iter().any(|wanted| wanted == ext))
                .unwrap_or(false);
            if matches_extension {
                found.push(entry.into_path());
            }
        }
    }

    Ok(found)
}

fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern)
            .map_err(|e| Error::Config(format!("invalid exclude glob {:?}: {}", pattern, e)))?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| Error::Config(format!("invalid exclude globs: {}", e)))
}
