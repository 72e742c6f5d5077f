//! Named prompt files.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::Config;

/// Used when the configuration lists no prompt files
pub const DEFAULT_PROMPT: &str = "You are a helpful assistant. Summarize the following webpage \
in a few short paragraphs, keeping the key facts and leaving out navigation, ads and boilerplate.";

#[derive(Error, Debug)]
pub enum PromptError {
    #[error("unknown prompt: {0}")]
    Unknown(String),
    #[error("prompt file {} does not exist", .0.display())]
    NotFound(PathBuf),
    #[error("failed to read prompt file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Prompt names and their files, in name order
#[derive(Debug, Clone, Default)]
pub struct PromptLibrary {
    files: BTreeMap<String, PathBuf>,
}

impl PromptLibrary {
    pub fn new(files: BTreeMap<String, PathBuf>) -> Self {
        Self { files }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.prompt_files.clone())
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.keys().map(String::as_str).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// The prompt picked when the user has not chosen one
    pub fn default_name(&self) -> Option<&str> {
        self.files.keys().next().map(String::as_str)
    }

    /// Load the text of a named prompt
    pub fn load(&self, name: &str) -> Result<String, PromptError> {
        let path = self
            .files
            .get(name)
            .ok_or_else(|| PromptError::Unknown(name.to_string()))?;
        load_prompt(path)
    }
}

/// Read a prompt file verbatim
pub fn load_prompt(path: &Path) -> Result<String, PromptError> {
    if !path.exists() {
        return Err(PromptError::NotFound(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| PromptError::Read {
        path: path.to_path_buf(),
        source,
    })
}
