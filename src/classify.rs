//! Source classification
//!
//! Each (series, source) pair is sorted by the shape of its source text:
//!
//! | Shape                         | Class           | Retained               |
//! |-------------------------------|-----------------|------------------------|
//! | exactly one quoted string     | `Literal`       | (series, literal text) |
//! | contains a `<section>` ref    | `ComplexReader` | (series, section name) |
//! | anything else                 | `Unmatched`     | (series, raw source)   |

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::references::{extract_section_refs, unquote};

/// One correspondence edge as written in the config
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesSourcePair {
    pub series: String,
    pub source: String,
}

impl SeriesSourcePair {
    pub fn new(series: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    Literal,
    ComplexReader,
    Unmatched,
}

/// Classified view of a pair: the series and what its source resolves to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Correspondence {
    pub series: String,
    pub target: String,
}

impl Correspondence {
    pub fn new(series: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            series: series.into(),
            target: target.into(),
        }
    }
}

/// Classify a source expression, returning its class and retained target
pub fn classify_source(source: &str) -> (Classification, String) {
    let trimmed = source.trim();
    if let Some(literal) = unquote(trimmed) {
        return (Classification::Literal, literal.to_string());
    }
    // the last reference wins when several appear
    if let Some(section) = extract_section_refs(trimmed).pop() {
        return (Classification::ComplexReader, section);
    }
    (Classification::Unmatched, source.to_string())
}

pub fn classify_pair(pair: &SeriesSourcePair) -> (Classification, Correspondence) {
    let (class, target) = classify_source(&pair.source);
    (class, Correspondence::new(pair.series.clone(), target))
}

/// The three classes, each deduplicated in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedSets {
    pub literal: Vec<Correspondence>,
    pub reader: Vec<Correspondence>,
    pub unmatched: Vec<Correspondence>,
}

impl ClassifiedSets {
    pub fn get(&self, class: Classification) -> &[Correspondence] {
        match class {
            Classification::Literal => &self.literal,
            Classification::ComplexReader => &self.reader,
            Classification::Unmatched => &self.unmatched,
        }
    }

    pub fn len(&self) -> usize {
        self.literal.len() + self.reader.len() + self.unmatched.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push_unique(&mut self, class: Classification, item: Correspondence) {
        let bucket = match class {
            Classification::Literal => &mut self.literal,
            Classification::ComplexReader => &mut self.reader,
            Classification::Unmatched => &mut self.unmatched,
        };
        if !bucket.contains(&item) {
            bucket.push(item);
        }
    }
}

/// Partition pairs into the three classes. Repeated input pairs are
/// classified once, so the classes never share an input pair.
pub fn classify_pairs<'a, I>(pairs: I) -> ClassifiedSets
where
    I: IntoIterator<Item = &'a SeriesSourcePair>,
{
    let mut seen = HashSet::new();
    let mut sets = ClassifiedSets::default();
    for pair in pairs {
        if !seen.insert(pair) {
            continue;
        }
        let (class, item) = classify_pair(pair);
        sets.push_unique(class, item);
    }
    sets
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_literal() {
        assert_eq!(
            classify_source("\"corpus.en\""),
            (Classification::Literal, "corpus.en".to_string())
        );
        assert_eq!(
            classify_source("  \"corpus.en\" "),
            (Classification::Literal, "corpus.en".to_string())
        );
    }

    #[test]
    fn test_literal_must_be_full_match() {
        let (class, _) = classify_source("\"a\" \"b\"");
        assert_eq!(class, Classification::Unmatched);
        let (class, _) = classify_source("\"a\"x");
        assert_eq!(class, Classification::Unmatched);
    }

    #[test]
    fn test_reader_tuple() {
        assert_eq!(
            classify_source("(\"corpus.de\", <DeReader>)"),
            (Classification::ComplexReader, "DeReader".to_string())
        );
        assert_eq!(
            classify_source("(<A>, <B>)"),
            (Classification::ComplexReader, "B".to_string())
        );
    }

    #[test]
    fn test_unmatched_keeps_raw_source() {
        assert_eq!(
            classify_source(" (\"x\", reader) "),
            (Classification::Unmatched, " (\"x\", reader) ".to_string())
        );
    }

    #[test]
    fn test_classify_pairs_dedups_in_order() {
        let pairs = vec![
            SeriesSourcePair::new("en", "\"corpus.en\""),
            SeriesSourcePair::new("de", "(\"corpus.de\", <DeReader>)"),
            SeriesSourcePair::new("en", "\"corpus.en\""),
            SeriesSourcePair::new("img", "(\"imgs\")"),
            SeriesSourcePair::new("en", " \"corpus.en\""),
        ];
        let sets = classify_pairs(&pairs);
        assert_eq!(sets.literal, vec![Correspondence::new("en", "corpus.en")]);
        assert_eq!(sets.reader, vec![Correspondence::new("de", "DeReader")]);
        assert_eq!(sets.unmatched, vec![Correspondence::new("img", "(\"imgs\")")]);
        assert_eq!(sets.len(), 3);
        assert_eq!(sets.get(Classification::ComplexReader).len(), 1);
    }

    #[test]
    fn test_empty_input() {
        let sets = classify_pairs(&Vec::<SeriesSourcePair>::new());
        assert!(sets.is_empty());
    }
}
