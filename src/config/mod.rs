//! Experiment configuration language
//!
//! - `reader`: tolerant base config reader producing diagnostics
//! - `document`: strict, mutable config object used by the inference driver

pub mod document;
pub mod reader;

pub use document::{ConfigDocument, Section};
pub use reader::{parse_raw, RawConfig};
