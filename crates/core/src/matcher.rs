//! Pattern specification - a compiled regex recognizing one expected line

use std::fmt;
use std::str::FromStr;

use regex::Regex;

use crate::error::{Error, Result};

/// A single expected line in a log stream, recognized by a regular
/// expression with zero or more named capture groups.
///
/// Immutable once registered with a session. The optional label is used in
/// place of the pattern text in diagnostics.
#[derive(Debug, Clone)]
pub struct MatcherSpec {
    regex: Regex,
    label: Option<String>,
}

impl MatcherSpec {
    /// Compile a pattern. Fails on invalid regex syntax.
    pub fn new(pattern: &str) -> Result<Self> {
        Ok(Self {
            regex: Regex::new(pattern)?,
            label: None,
        })
    }

    /// Attach a diagnostic label shown in logs and error messages
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// The pattern text this matcher was compiled from
    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }

    /// Named capture groups this pattern can contribute to a record
    pub fn group_names(&self) -> impl Iterator<Item = &str> {
        self.regex.capture_names().flatten()
    }

    /// Test a line, returning the named groups that participated in the
    /// match. `None` means the line did not match at all.
    pub(crate) fn try_match(&self, line: &str) -> Option<Vec<(String, String)>> {
        let caps = self.regex.captures(line)?;

        let mut groups = Vec::new();
        for name in self.regex.capture_names().flatten() {
            if let Some(value) = caps.name(name) {
                groups.push((name.to_string(), value.as_str().to_string()));
            }
        }
        Some(groups)
    }
}

impl fmt::Display for MatcherSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.label {
            Some(label) => write!(f, "{}", label),
            None => write!(f, "/{}/", self.regex.as_str()),
        }
    }
}

impl FromStr for MatcherSpec {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}
