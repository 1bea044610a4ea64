//! Config object
//!
//! Queryable, mutable view of a parsed configuration. Parsing is strict: any
//! issue the reader had to recover from is returned as an error. Writing
//! emits unpadded `key=value` pairs in input order.

use serde::{Deserialize, Serialize};
use std::io::{self, Write};

use super::reader::read_sections;
use crate::error::ConfigError;

/// One `[name]` section with its options in declaration order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub name: String,
    pub options: Vec<(String, String)>,
}

impl Section {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            options: Vec::new(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, key: &str) -> bool {
        self.options.iter().any(|(k, _)| k == key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    sections: Vec<Section>,
}

impl ConfigDocument {
    /// Parse config text, failing on the first structural problem
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let (sections, issues) = read_sections(text);
        if let Some(issue) = issues.into_iter().next() {
            return Err(issue.error);
        }
        Ok(Self { sections })
    }

    /// Section names in declaration order
    pub fn sections(&self) -> impl Iterator<Item = &str> {
        self.sections.iter().map(|s| s.name.as_str())
    }

    pub fn section(&self, name: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.name == name)
    }

    pub fn has_section(&self, name: &str) -> bool {
        self.section(name).is_some()
    }

    /// False for a missing section as well as a missing option
    pub fn has_option(&self, section: &str, key: &str) -> bool {
        self.section(section).is_some_and(|s| s.contains(key))
    }

    pub fn get(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.section(section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))?
            .get(key)
            .ok_or_else(|| ConfigError::NoOption {
                section: section.to_string(),
                option: key.to_string(),
            })
    }

    /// Option names of a section in declaration order
    pub fn options(&self, section: &str) -> Result<Vec<&str>, ConfigError> {
        let section = self
            .section(section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))?;
        Ok(section.options.iter().map(|(k, _)| k.as_str()).collect())
    }

    /// Remove an option, returning whether it existed
    pub fn remove_option(&mut self, section: &str, key: &str) -> Result<bool, ConfigError> {
        let section = self
            .sections
            .iter_mut()
            .find(|s| s.name == section)
            .ok_or_else(|| ConfigError::NoSection(section.to_string()))?;
        let before = section.options.len();
        section.options.retain(|(k, _)| k != key);
        Ok(section.options.len() != before)
    }

    /// Write every section with unpadded delimiters. Multi-line values are
    /// continued on tab-indented lines so the output parses back unchanged.
    pub fn write<W: Write>(&self, mut out: W) -> io::Result<()> {
        for section in &self.sections {
            writeln!(out, "[{}]", section.name)?;
            for (key, value) in &section.options {
                writeln!(out, "{}={}", key, value.replace('\n', "\n\t"))?;
            }
            writeln!(out)?;
        }
        Ok(())
    }

    pub fn to_ini_string(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail
        let _ = self.write(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }
}
