//! Error types for macaque-core
//!
//! Inference is best-effort: unknown variables and malformed source lists
//! degrade to "skip". Only the failures below abort a run.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the config language reader and the config object
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Option on line {line} appears before any section header")]
    MissingSectionHeader { line: usize },

    #[error("Section '{section}' is declared twice (line {line})")]
    DuplicateSection { section: String, line: usize },

    #[error("Option '{option}' in section '{section}' is declared twice (line {line})")]
    DuplicateOption {
        section: String,
        option: String,
        line: usize,
    },

    #[error("Cannot parse line {line}: {text}")]
    Syntax { line: usize, text: String },

    #[error("No section: '{0}'")]
    NoSection(String),

    #[error("No option '{option}' in section '{section}'")]
    NoOption { section: String, option: String },
}

/// Errors that abort an inference run
#[derive(Debug, Error)]
pub enum InferError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Referenced section '{0}' does not exist")]
    MissingSection(String),
}

impl InferError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, InferError>;
