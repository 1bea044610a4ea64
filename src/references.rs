//! Section references and series lists
//!
//! `<name>` tokens point at other config sections; series lists are bracketed
//! lists of quoted names. Both are direct pattern scans: anything malformed
//! simply does not match.

use once_cell::sync::Lazy;
use regex::Regex;

static SECTION_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<([^>]*)>").expect("valid section reference regex"));

static QUOTED_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]*)""#).expect("valid quoted string regex"));

static WHOLE_STRING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^"([^"]*)"$"#).expect("valid whole string regex"));

/// All `<name>` references in order of appearance, duplicates kept
pub fn extract_section_refs(text: &str) -> Vec<String> {
    SECTION_REF_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Every quoted name in a series list, without quotes
pub fn parse_series_list(text: &str) -> Vec<String> {
    QUOTED_RE
        .captures_iter(text)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Content of `text` when it is exactly one quoted string
pub fn unquote(text: &str) -> Option<&str> {
    WHOLE_STRING_RE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
