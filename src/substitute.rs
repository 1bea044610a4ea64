//! Variable substitution
//!
//! Two textual passes over the raw config before it is parsed:
//!
//! 1. `{NAME}` (or `${NAME}`) inside a quoted string
//! 2. `$NAME` anywhere, ending at the first character that cannot be part of
//!    a name (comma, space, tab, newline, `/`, ...)
//!
//! The second pass does not look at quoting or parentheses, so a `$NAME`
//! inside a tuple is replaced like any other. Unknown names are left as
//! written.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::config::Section;
use crate::references::unquote;
use crate::scanner::{ScanMachine, ScanState};

/// Variable name -> replacement text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariableTable {
    vars: HashMap<String, String>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from the `vars` section. A value that is one quoted string
    /// contributes its content; anything else contributes its raw text.
    pub fn from_section(section: &Section) -> Self {
        section
            .options
            .iter()
            .map(|(name, value)| (name.clone(), interpret_value(value)))
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }
}

impl FromIterator<(String, String)> for VariableTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

fn interpret_value(raw: &str) -> String {
    let raw = raw.trim();
    unquote(raw).unwrap_or(raw).to_string()
}

/// Run both substitution passes over `text`
pub fn substitute_vars(text: &str, vars: &VariableTable) -> String {
    let braced = substitute_braced(text, vars);
    substitute_bare(&braced, vars)
}

/// Pass 1: `{NAME}` inside quoted strings
pub fn substitute_braced(text: &str, vars: &VariableTable) -> String {
    use ScanState::*;

    let mut machine = ScanMachine::new();
    let mut out = String::with_capacity(text.len());
    let mut name = String::new();
    let mut dollar = false;

    for c in text.chars() {
        if machine.state() == InVarBrace {
            match c {
                '}' => {
                    match vars.get(&name) {
                        Some(value) => {
                            if dollar {
                                out.pop();
                            }
                            out.push_str(value);
                        }
                        None => {
                            out.push('{');
                            out.push_str(&name);
                            out.push('}');
                        }
                    }
                    name.clear();
                    machine.enter(InString);
                    continue;
                }
                '"' | '\n' => {
                    // abandoned reference, re-emit and handle `c` as string text
                    out.push('{');
                    out.push_str(&name);
                    name.clear();
                    machine.enter(InString);
                }
                _ => {
                    name.push(c);
                    continue;
                }
            }
        }

        match (machine.state(), c) {
            (Default, '"') => machine.enter(InString),
            (InString, '"') | (InString, '\n') => machine.enter(Default),
            (InString, '{') => {
                dollar = out.ends_with('$');
                machine.enter(InVarBrace);
                continue;
            }
            _ => {}
        }
        out.push(c);
    }

    if machine.state() == InVarBrace {
        out.push('{');
        out.push_str(&name);
    }
    out
}

/// Pass 2: `$NAME` anywhere
pub fn substitute_bare(text: &str, vars: &VariableTable) -> String {
    use ScanState::*;

    let mut machine = ScanMachine::new();
    let mut out = String::with_capacity(text.len());
    let mut name = String::new();

    let resolve = |name: &str, out: &mut String| match vars.get(name) {
        Some(value) => out.push_str(value),
        None => {
            out.push('$');
            out.push_str(name);
        }
    };

    for c in text.chars() {
        if machine.state() == InVarBare {
            if is_name_char(c) {
                name.push(c);
                continue;
            }
            resolve(&name, &mut out);
            name.clear();
            machine.enter(Default);
        }

        if c == '$' {
            machine.enter(InVarBare);
        } else {
            out.push(c);
        }
    }

    if machine.state() == InVarBare {
        resolve(&name, &mut out);
    }
    out
}

/// Names end at a delimiter (comma, space, tab, newline) or at any other
/// character outside `[A-Za-z0-9_]`; the terminator is kept in the output.
fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn table(pairs: &[(&str, &str)]) -> VariableTable {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_braced_in_string() {
        let vars = table(&[("PATH", "/data")]);
        assert_eq!(
            substitute_vars("data=[\"{PATH}/file.txt\"]\n", &vars),
            "data=[\"/data/file.txt\"]\n"
        );
    }

    #[test]
    fn test_dollar_braced_in_string() {
        let vars = table(&[("PATH", "/data")]);
        assert_eq!(
            substitute_vars("data=[\"${PATH}/file.txt\"]", &vars),
            "data=[\"/data/file.txt\"]"
        );
    }

    #[test]
    fn test_braces_outside_string_untouched() {
        let vars = table(&[("PATH", "/data")]);
        assert_eq!(substitute_vars("x={PATH}\n", &vars), "x={PATH}\n");
    }

    #[test]
    fn test_unknown_braced_kept() {
        let vars = table(&[("PATH", "/data")]);
        assert_eq!(
            substitute_vars("x=\"{NOPE}/a\"\n", &vars),
            "x=\"{NOPE}/a\"\n"
        );
    }

    #[test]
    fn test_abandoned_brace_reemitted() {
        let vars = table(&[("PATH", "/data")]);
        assert_eq!(substitute_braced("x=\"{PATH\"\n", &vars), "x=\"{PATH\"\n");
        assert_eq!(substitute_braced("x=\"{PA", &vars), "x=\"{PA");
    }

    #[test]
    fn test_bare_form() {
        let vars = table(&[("PREFIX", "/corp")]);
        assert_eq!(
            substitute_vars("files=$PREFIX/en.txt\n", &vars),
            "files=/corp/en.txt\n"
        );
    }

    #[test]
    fn test_bare_form_preserves_delimiter() {
        let vars = table(&[("A", "1"), ("B", "2")]);
        assert_eq!(substitute_bare("x=[$A,$B]\n", &vars), "x=[1,$B]\n");
        assert_eq!(substitute_bare("x=[$A, $B ]", &vars), "x=[1, 2 ]");
    }

    #[test]
    fn test_bare_form_at_end_of_input() {
        let vars = table(&[("A", "1")]);
        assert_eq!(substitute_bare("x=$A", &vars), "x=1");
    }

    #[test]
    fn test_bare_form_ignores_context() {
        let vars = table(&[("DIR", "/d")]);
        assert_eq!(
            substitute_bare("data=[(\"$DIR/x\", <R>)]\n", &vars),
            "data=[(\"/d/x\", <R>)]\n"
        );
        assert_eq!(
            substitute_bare("data=[($DIR, <R>)]\n", &vars),
            "data=[(/d, <R>)]\n"
        );
    }

    #[test]
    fn test_unknown_bare_kept() {
        let vars = table(&[("A", "1")]);
        assert_eq!(substitute_bare("cost=$5 each\n", &vars), "cost=$5 each\n");
    }

    #[test]
    fn test_empty_table_is_identity() {
        let text = "[main]\nx=\"{A}\" $B, ${C}\ny=$\n";
        assert_eq!(substitute_vars(text, &VariableTable::new()), text);
    }

    #[test]
    fn test_from_section_unquotes() {
        let mut section = Section::new("vars");
        section
            .options
            .push(("PATH".to_string(), "\"/data\"".to_string()));
        section.options.push(("N".to_string(), "10".to_string()));
        let vars = VariableTable::from_section(&section);
        assert_eq!(vars.get("PATH"), Some("/data"));
        assert_eq!(vars.get("N"), Some("10"));
        assert_eq!(vars.len(), 2);
    }
}
