//! macaque-core: data-correspondence inference for experiment configs
//!
//! Given an experiment configuration (INI-style sections with a small list
//! and tuple micro-syntax), works out which named data series are read from
//! which sources:
//! - Config reader and mutable config object (`config`)
//! - Section references and series lists (`references`)
//! - State-machine scanner for source lists (`scanner`)
//! - `{VAR}` / `$VAR` substitution (`substitute`)
//! - Literal / reader / unmatched classification (`classify`)
//! - The inference driver (`infer`) and fake config synthesis (`synth`)

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod infer;
pub mod references;
pub mod scanner;
pub mod settings;
pub mod substitute;
pub mod synth;

// Re-export commonly used types
pub use classify::{
    classify_pairs, classify_source, Classification, ClassifiedSets, Correspondence,
    SeriesSourcePair,
};
pub use config::{parse_raw, ConfigDocument, RawConfig, Section};
pub use diagnostics::{Diagnostic, DiagnosticCode, Severity, SourceSpan};
pub use error::{ConfigError, InferError, Result};
pub use infer::{infer_data_correspondence, infer_from_text, Inference, InferenceOutcome};
pub use references::{extract_section_refs, parse_series_list, unquote};
pub use scanner::{parse_source_list, ScanMachine, ScanState};
pub use settings::Settings;
pub use substitute::{substitute_vars, VariableTable};
pub use synth::{create_fake_config, FakeConfigRequest};
