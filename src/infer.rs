//! Data-correspondence inference
//!
//! Works out which data series an experiment consumes and where each one's
//! values come from.
//!
//! ## Pipeline
//!
//! ```text
//! config text ─▶ base reader ─▶ vars? ─▶ substitute ─▶ re-parse
//!                                                        │
//!      main.{train,val,test}_dataset(s) ─▶ <section> refs ◀┘
//!                                                        │
//!      walk sections (carry series/data) ─▶ zip ─▶ classify
//! ```
//!
//! The dataset-declaration options are removed from `main` on the way, and
//! [`infer_data_correspondence`] writes the resulting config out.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::classify::{classify_pairs, ClassifiedSets, Correspondence, SeriesSourcePair};
use crate::config::{parse_raw, ConfigDocument, Section};
use crate::diagnostics::Diagnostic;
use crate::error::{InferError, Result};
use crate::references::{extract_section_refs, parse_series_list};
use crate::scanner::parse_source_list;
use crate::settings::Settings;
use crate::substitute::{substitute_vars, VariableTable};

pub const MAIN_SECTION: &str = "main";

/// Options on `main` naming the datasets of an experiment
pub const DATASET_OPTIONS: [&str; 3] = ["train_dataset", "val_dataset", "test_datasets"];

/// `class` value of a section that loads a dataset from `series`/`data`
pub const DATASET_LOAD_CLASS: &str = "dataset.load";

/// Result of inference over config text, before anything is written
#[derive(Debug, Clone)]
pub struct Inference {
    pub sets: ClassifiedSets,
    /// Zipped pairs in walk order, before deduplication
    pub pairs: Vec<SeriesSourcePair>,
    /// Sections referenced by the dataset declarations, in walk order
    pub candidate_sections: Vec<String>,
    pub variables: Option<VariableTable>,
    pub diagnostics: Vec<Diagnostic>,
    /// Config with the dataset declarations removed from `main`
    pub config: ConfigDocument,
}

/// What a full run returns: the three classes, where the config was written,
/// and the config itself
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceOutcome {
    pub literal: Vec<Correspondence>,
    pub reader: Vec<Correspondence>,
    pub unmatched: Vec<Correspondence>,
    pub output_path: PathBuf,
    pub config: ConfigDocument,
    /// Findings from the base config reader
    pub diagnostics: Vec<Diagnostic>,
}

impl InferenceOutcome {
    fn new(inference: Inference, output_path: PathBuf) -> Self {
        let ClassifiedSets {
            literal,
            reader,
            unmatched,
        } = inference.sets;
        Self {
            literal,
            reader,
            unmatched,
            output_path,
            config: inference.config,
            diagnostics: inference.diagnostics,
        }
    }

    #[allow(clippy::type_complexity)]
    pub fn into_parts(
        self,
    ) -> (
        Vec<Correspondence>,
        Vec<Correspondence>,
        Vec<Correspondence>,
        PathBuf,
        ConfigDocument,
    ) {
        (
            self.literal,
            self.reader,
            self.unmatched,
            self.output_path,
            self.config,
        )
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Read a config file, infer its series/source correspondence and write the
/// normalized config to the settings' output path.
///
/// Nothing is written when inference fails.
pub fn infer_data_correspondence(path: &Path, settings: &Settings) -> Result<InferenceOutcome> {
    info!("Inferring data correspondence from {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|e| InferError::io(path, e))?;

    let inference = infer_from_text(&text)?;

    let output_path = settings.output_path().to_path_buf();
    write_config(&inference.config, &output_path)?;
    info!(
        "Wrote normalized config to {} ({} literal, {} reader, {} unmatched)",
        output_path.display(),
        inference.sets.literal.len(),
        inference.sets.reader.len(),
        inference.sets.unmatched.len()
    );

    Ok(InferenceOutcome::new(inference, output_path))
}

/// Infer from config text without touching the filesystem
pub fn infer_from_text(text: &str) -> Result<Inference> {
    let (raw, diagnostics) = parse_raw(text);
    for diag in &diagnostics {
        if diag.is_error() || diag.is_warning() {
            warn!("Config reader: {}", diag);
        } else {
            debug!("Config reader: {}", diag);
        }
    }

    let variables = raw.vars().map(VariableTable::from_section);
    let text: Cow<'_, str> = match &variables {
        Some(vars) => {
            debug!("Substituting {} variables", vars.len());
            Cow::Owned(substitute_vars(text, vars))
        }
        None => Cow::Borrowed(text),
    };

    let mut config = ConfigDocument::parse(&text)?;
    let declarations = take_dataset_declarations(&mut config)?;

    let candidate_sections: Vec<String> = declarations
        .iter()
        .flat_map(|value| extract_section_refs(value))
        .collect();
    debug!("Candidate dataset sections: {:?}", candidate_sections);

    let (series, sources) = collect_series_sources(&config, &candidate_sections)?;
    let pairs = zip_pairs(series, sources);
    let sets = classify_pairs(&pairs);

    Ok(Inference {
        sets,
        pairs,
        candidate_sections,
        variables,
        diagnostics,
        config,
    })
}

// ============================================================================
// Steps
// ============================================================================

/// Remove the dataset declarations from `main`, returning their raw values
/// in declaration-option order. Absent options are skipped.
fn take_dataset_declarations(config: &mut ConfigDocument) -> Result<Vec<String>> {
    let mut declarations = Vec::new();
    for option in DATASET_OPTIONS {
        if !config.has_option(MAIN_SECTION, option) {
            continue;
        }
        let value = config.get(MAIN_SECTION, option)?.to_string();
        config.remove_option(MAIN_SECTION, option)?;
        declarations.push(value);
    }
    Ok(declarations)
}

/// `series`/`data` expressions carried from the last dataset-loading section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Carried {
    series: Option<String>,
    sources: Option<String>,
}

impl Carried {
    /// A `dataset.load` section replaces both expressions; any other section
    /// keeps what was carried in.
    fn advance(self, section: &Section) -> Self {
        let loads = section
            .get("class")
            .is_some_and(|class| class.trim() == DATASET_LOAD_CLASS);
        if !loads {
            return self;
        }
        Self {
            series: section.get("series").map(str::to_string),
            sources: section.get("data").map(str::to_string),
        }
    }
}

/// Walk the candidate sections in order, accumulating series names and
/// source expressions from the carried `series`/`data` values.
pub fn collect_series_sources(
    config: &ConfigDocument,
    sections: &[String],
) -> Result<(Vec<String>, Vec<String>)> {
    let (_, series, sources) = sections.iter().try_fold(
        (Carried::default(), Vec::new(), Vec::new()),
        |(carried, mut series, mut sources), name| {
            let section = config
                .section(name)
                .ok_or_else(|| InferError::MissingSection(name.clone()))?;
            let carried = carried.advance(section);

            if let Some(series_expr) = &carried.series {
                series.extend(parse_series_list(series_expr));
                if let Some(source_expr) = &carried.sources {
                    match parse_source_list(source_expr) {
                        Some(parsed) => sources.extend(parsed),
                        None => {
                            debug!(
                                "Skipping malformed data list in section '{}': {}",
                                name, source_expr
                            );
                        }
                    }
                }
            }
            Ok::<_, InferError>((carried, series, sources))
        },
    )?;
    Ok((series, sources))
}

/// Pair series with sources by position; the longer side is truncated
pub fn zip_pairs(series: Vec<String>, sources: Vec<String>) -> Vec<SeriesSourcePair> {
    if series.len() != sources.len() {
        warn!(
            "{} series but {} sources; pairing the first {}",
            series.len(),
            sources.len(),
            series.len().min(sources.len())
        );
    }
    series
        .into_iter()
        .zip(sources)
        .map(|(series, source)| SeriesSourcePair { series, source })
        .collect()
}

fn write_config(config: &ConfigDocument, path: &Path) -> Result<()> {
    let file = File::create(path).map_err(|e| InferError::io(path, e))?;
    let mut out = BufWriter::new(file);
    config
        .write(&mut out)
        .and_then(|_| out.flush())
        .map_err(|e| InferError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classification;
    use pretty_assertions::assert_eq;

    const EXPERIMENT: &str = r#"[vars]
DATA="/data"

[main]
name="translation"
train_dataset=<train_data>
val_dataset=<val_data>

[train_data]
class=dataset.load
series=["source", "target"]
data=["{DATA}/train.en", ("{DATA}/train.de", <de_reader>)]

[val_data]
class=dataset.load
series=["source", "target"]
data=["{DATA}/val.en", "{DATA}/val.de"]

[de_reader]
class=readers.plain_text_reader.PlainTextFileReader
"#;

    #[test]
    fn test_infer_experiment() {
        let inference = infer_from_text(EXPERIMENT).unwrap();
        assert_eq!(inference.candidate_sections, vec!["train_data", "val_data"]);
        assert_eq!(
            inference.sets.literal,
            vec![
                Correspondence::new("source", "/data/train.en"),
                Correspondence::new("source", "/data/val.en"),
                Correspondence::new("target", "/data/val.de"),
            ]
        );
        assert_eq!(
            inference.sets.reader,
            vec![Correspondence::new("target", "de_reader")]
        );
        assert!(inference.sets.unmatched.is_empty());
        assert_eq!(inference.variables.unwrap().get("DATA"), Some("/data"));
    }

    #[test]
    fn test_declarations_removed_from_main() {
        let inference = infer_from_text(EXPERIMENT).unwrap();
        let config = &inference.config;
        assert_eq!(config.options(MAIN_SECTION).unwrap(), vec!["name"]);
        assert!(config.has_section("train_data"));
        assert!(config.has_section("vars"));
    }

    #[test]
    fn test_absent_declaration_contributes_nothing() {
        let text = "[main]\ntest_datasets=[<t>]\n\n[t]\nclass=dataset.load\nseries=[\"en\"]\ndata=[\"corpus.en\"]\n";
        let inference = infer_from_text(text).unwrap();
        assert_eq!(inference.candidate_sections, vec!["t"]);
        assert_eq!(
            inference.pairs,
            vec![SeriesSourcePair::new("en", "\"corpus.en\"")]
        );
    }

    #[test]
    fn test_no_declarations() {
        let inference = infer_from_text("[main]\nname=x\n").unwrap();
        assert!(inference.candidate_sections.is_empty());
        assert!(inference.sets.is_empty());
        assert!(inference.variables.is_none());
    }

    #[test]
    fn test_missing_section_is_fatal() {
        let err = infer_from_text("[main]\ntrain_dataset=<ghost>\n").unwrap_err();
        assert!(matches!(err, InferError::MissingSection(name) if name == "ghost"));
    }

    #[test]
    fn test_non_loading_section_reuses_carried_values() {
        let text = "\
[main]
test_datasets=[<a>, <b>]

[a]
class=dataset.load
series=[\"en\"]
data=[\"x.en\"]

[b]
class=dataset.lazy
series=[\"ignored\"]
";
        let inference = infer_from_text(text).unwrap();
        assert_eq!(
            inference.pairs,
            vec![
                SeriesSourcePair::new("en", "\"x.en\""),
                SeriesSourcePair::new("en", "\"x.en\""),
            ]
        );
        assert_eq!(inference.sets.literal, vec![Correspondence::new("en", "x.en")]);
    }

    #[test]
    fn test_malformed_data_desynchronizes_later_pairs() {
        let text = "\
[main]
test_datasets=[<a>, <b>]

[a]
class=dataset.load
series=[\"en\"]
data=\"x.en\"

[b]
class=dataset.load
series=[\"de\"]
data=[\"y.de\"]
";
        let inference = infer_from_text(text).unwrap();
        assert_eq!(
            inference.pairs,
            vec![SeriesSourcePair::new("en", "\"y.de\"")]
        );
    }

    #[test]
    fn test_section_without_series_contributes_nothing() {
        let text = "[main]\ntrain_dataset=<a>\n\n[a]\nclass=other\n";
        let inference = infer_from_text(text).unwrap();
        assert!(inference.pairs.is_empty());
    }

    #[test]
    fn test_blank_line_inside_data_list() {
        let text = "[main]\ntrain_dataset=<t>\n\n[t]\nclass=dataset.load\n\
                    series=[\"a\", \"b\"]\ndata=[\"x\",\n\n    \"y\"]\n";
        let inference = infer_from_text(text).unwrap();
        assert_eq!(
            inference.pairs,
            vec![
                SeriesSourcePair::new("a", "\"x\""),
                SeriesSourcePair::new("b", "\"y\""),
            ]
        );
    }

    #[test]
    fn test_zip_truncates() {
        let series = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let sources = vec!["\"1\"".to_string()];
        let pairs = zip_pairs(series, sources);
        assert_eq!(pairs, vec![SeriesSourcePair::new("a", "\"1\"")]);
    }

    #[test]
    fn test_bare_variable_reader() {
        let text = "\
[vars]
ROOT=/corp

[main]
train_dataset=<t>

[t]
class=dataset.load
series=[\"img\"]
data=[($ROOT/images, <img_reader>)]

[img_reader]
class=readers.image_reader.image_reader
";
        let inference = infer_from_text(text).unwrap();
        assert_eq!(
            inference.pairs,
            vec![SeriesSourcePair::new("img", "(/corp/images, <img_reader>)")]
        );
        let (class, _) = crate::classify::classify_pair(&inference.pairs[0]);
        assert_eq!(class, Classification::ComplexReader);
    }
}
