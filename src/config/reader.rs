//! Base config reader
//!
//! Line grammar for the experiment configuration language:
//!
//! ```text
//! [section]            header
//! key=value            option (":" also accepted as delimiter)
//!     more             continuation of the previous option's value
//! # comment            full-line comment ("#" or ";")
//! ```
//!
//! Blank lines inside a multi-line value are kept when another indented line
//! follows them; trailing blank lines are dropped.
//!
//! `read_sections` is shared by the strict [`ConfigDocument`](super::ConfigDocument)
//! and the tolerant [`parse_raw`], which turns problems into diagnostics.

use nom::{
    bytes::complete::{take_till1, take_while1},
    character::complete::{char, one_of, space0},
    combinator::{all_consuming, rest},
    sequence::{delimited, pair, preceded},
    IResult,
};
use tracing::debug;

use super::document::Section;
use crate::diagnostics::{Diagnostic, DiagnosticCode, SourceSpan};
use crate::error::ConfigError;

// ============================================================================
// Line grammar
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum LineKind<'a> {
    Blank,
    Comment,
    Header(&'a str),
    Option { key: &'a str, value: &'a str },
    Continuation(&'a str),
    Invalid,
}

fn comment(input: &str) -> IResult<&str, char> {
    preceded(space0, one_of("#;"))(input)
}

fn section_header(input: &str) -> IResult<&str, &str> {
    all_consuming(delimited(
        char('['),
        take_while1(|c| c != ']'),
        pair(char(']'), space0),
    ))(input)
}

fn option_line(input: &str) -> IResult<&str, (&str, &str)> {
    let (input, key) = take_till1(|c| c == '=' || c == ':')(input)?;
    let (input, _) = one_of("=:")(input)?;
    let (input, value) = rest(input)?;
    Ok((input, (key.trim(), value.trim())))
}

/// Classify one physical line. `continues` is true while an option is open,
/// in which case an indented line extends that option's value.
pub(crate) fn classify_line(line: &str, continues: bool) -> LineKind<'_> {
    if line.trim().is_empty() {
        return LineKind::Blank;
    }
    if comment(line).is_ok() {
        return LineKind::Comment;
    }
    if continues && line.starts_with(|c: char| c == ' ' || c == '\t') {
        return LineKind::Continuation(line.trim());
    }

    let line = line.trim();
    if let Ok((_, name)) = section_header(line) {
        return LineKind::Header(name.trim());
    }
    match option_line(line) {
        Ok((_, (key, value))) if !key.is_empty() => LineKind::Option { key, value },
        _ => LineKind::Invalid,
    }
}

// ============================================================================
// Section assembly
// ============================================================================

/// A problem met while assembling sections, with its 1-based line number
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReadIssue {
    pub line: usize,
    pub text: String,
    pub error: ConfigError,
}

/// Assemble sections from config text.
///
/// Recovery is always applied: repeated sections merge, repeated options keep
/// the last value, orphan and invalid lines are dropped. Every recovery is
/// reported as a [`ReadIssue`] so strict callers can refuse the input.
pub(crate) fn read_sections(text: &str) -> (Vec<Section>, Vec<ReadIssue>) {
    let mut sections: Vec<Section> = Vec::new();
    let mut issues = Vec::new();
    let mut current: Option<usize> = None;
    let mut open_option: Option<usize> = None;
    // blank lines seen since the open option's last line
    let mut pending_blanks = 0usize;

    for (idx, line) in text.lines().enumerate() {
        let line_no = idx + 1;
        let issue = |error: ConfigError| ReadIssue {
            line: line_no,
            text: line.to_string(),
            error,
        };

        let kind = classify_line(line, open_option.is_some());
        if !matches!(kind, LineKind::Blank | LineKind::Continuation(_)) {
            pending_blanks = 0;
        }

        match kind {
            LineKind::Blank => {
                if open_option.is_some() {
                    pending_blanks += 1;
                }
            }
            LineKind::Comment => {}
            LineKind::Header(name) => {
                open_option = None;
                match sections.iter().position(|s| s.name == name) {
                    Some(existing) => {
                        issues.push(issue(ConfigError::DuplicateSection {
                            section: name.to_string(),
                            line: line_no,
                        }));
                        current = Some(existing);
                    }
                    None => {
                        sections.push(Section::new(name));
                        current = Some(sections.len() - 1);
                    }
                }
            }
            LineKind::Option { key, value } => {
                let Some(sec_idx) = current else {
                    issues.push(issue(ConfigError::MissingSectionHeader { line: line_no }));
                    open_option = None;
                    continue;
                };
                let section = &mut sections[sec_idx];
                match section.options.iter().position(|(k, _)| k == key) {
                    Some(existing) => {
                        issues.push(issue(ConfigError::DuplicateOption {
                            section: section.name.clone(),
                            option: key.to_string(),
                            line: line_no,
                        }));
                        section.options[existing].1 = value.to_string();
                        open_option = Some(existing);
                    }
                    None => {
                        section.options.push((key.to_string(), value.to_string()));
                        open_option = Some(section.options.len() - 1);
                    }
                }
            }
            LineKind::Continuation(more) => {
                if let (Some(sec_idx), Some(opt_idx)) = (current, open_option) {
                    let value = &mut sections[sec_idx].options[opt_idx].1;
                    for _ in 0..std::mem::take(&mut pending_blanks) {
                        value.push('\n');
                    }
                    value.push('\n');
                    value.push_str(more);
                }
            }
            LineKind::Invalid => {
                issues.push(issue(ConfigError::Syntax {
                    line: line_no,
                    text: line.trim().to_string(),
                }));
                open_option = None;
            }
        }
    }

    (sections, issues)
}

// ============================================================================
// Tolerant reader
// ============================================================================

/// Structure produced by the base config reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawConfig {
    pub sections: Vec<Section>,
}

impl RawConfig {
    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// The `vars` section, if declared
    pub fn vars(&self) -> Option<&Section> {
        self.section("vars")
    }
}

/// Parse config text without failing; problems come back as diagnostics.
pub fn parse_raw(text: &str) -> (RawConfig, Vec<Diagnostic>) {
    let (sections, issues) = read_sections(text);

    let mut diagnostics: Vec<Diagnostic> = issues
        .into_iter()
        .map(|issue| {
            let code = match &issue.error {
                ConfigError::MissingSectionHeader { .. } => DiagnosticCode::OptionOutsideSection,
                ConfigError::DuplicateSection { .. } => DiagnosticCode::DuplicateSection,
                ConfigError::DuplicateOption { .. } => DiagnosticCode::DuplicateOption,
                _ => DiagnosticCode::SyntaxError,
            };
            let diag = match code {
                DiagnosticCode::SyntaxError | DiagnosticCode::OptionOutsideSection => {
                    Diagnostic::error(code, issue.error.to_string())
                }
                _ => Diagnostic::warning(code, issue.error.to_string()),
            };
            diag.with_span(SourceSpan::line(issue.line, &issue.text))
        })
        .collect();

    for section in &sections {
        for (key, value) in &section.options {
            if value.is_empty() {
                diagnostics.push(Diagnostic::info(
                    DiagnosticCode::EmptyValue,
                    format!("option '{}' in section '{}' is empty", key, section.name),
                ));
            }
        }
    }

    debug!(
        "Read {} sections with {} diagnostics",
        sections.len(),
        diagnostics.len()
    );
    (RawConfig { sections }, diagnostics)
}
