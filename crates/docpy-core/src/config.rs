//! Configuration types

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// docpy configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Documentation dialect of the source docstrings
    pub source_format: String,

    /// Style of the emitted type hints
    pub hint_style: String,

    /// Hint rendering configuration
    pub hints: HintConfig,

    /// File discovery configuration
    pub files: FilesConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_format: "sphinx".into(),
            hint_style: "comment".into(),
            hints: HintConfig::default(),
            files: FilesConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file. Missing keys keep their defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Hint rendering configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HintConfig {
    /// Indentation unit added to the declaration's own indentation when a
    /// docstring has no line break to infer the body indentation from
    pub fallback_indent: String,

    /// Return type written when a function documents none
    pub missing_return_type: String,

    /// Type written for parameters without documentation
    pub any_type: String,
}

impl Default for HintConfig {
    fn default() -> Self {
        Self {
            fallback_indent: "    ".into(),
            missing_return_type: "Any".into(),
            any_type: "Any".into(),
        }
    }
}

/// File discovery configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    /// File extensions to process when walking directories
    pub extensions: Vec<String>,

    /// Directory names skipped when walking directories
    pub exclude_dirs: Vec<String>,

    /// Glob patterns of paths to skip
    pub exclude_globs: Vec<String>,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["py".into()],
            exclude_dirs: vec![
                ".git".into(),
                "__pycache__".into(),
                ".venv".into(),
                "venv".into(),
                "build".into(),
                "node_modules".into(),
            ],
            exclude_globs: vec![],
        }
    }
}
