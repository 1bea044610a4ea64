//! Run settings
//!
//! Where the normalized config is written. Resolution order:
//! 1. explicit value passed by the caller (CLI flag)
//! 2. `MACAQUE_OUTPUT_PATH` environment variable
//! 3. `macaque.ini` relative to the working directory

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const OUTPUT_PATH_ENV: &str = "MACAQUE_OUTPUT_PATH";
pub const DEFAULT_OUTPUT_PATH: &str = "macaque.ini";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    output_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}

impl Settings {
    pub fn new(output_path: impl Into<PathBuf>) -> Self {
        Self {
            output_path: output_path.into(),
        }
    }

    /// Settings from `MACAQUE_OUTPUT_PATH`, falling back to the default path
    pub fn from_env() -> Self {
        match std::env::var(OUTPUT_PATH_ENV) {
            Ok(path) if !path.trim().is_empty() => Self::new(path),
            _ => Self::default(),
        }
    }

    pub fn with_output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = output_path.into();
        self
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }
}
