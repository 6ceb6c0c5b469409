//! Declarative YAML capture specification

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::matcher::MatcherSpec;
use crate::session::CaptureSession;

/// A complete capture specification parsed from YAML
///
/// ```yaml
/// name: camel-startup
/// description: wait for the route summary, then the version banner
/// timeout_ms: 30000
/// patterns:
///   - pattern: 'Total (?P<total>\d+) routes, of which (?P<started>\d+) are started'
///     label: route-summary
///   - pattern: 'Camel (?P<version>\d+\.\d+\.\d+) started'
///     label: version-banner
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSpec {
    /// Unique name for this capture
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Overall completion timeout
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Patterns to satisfy, in order
    pub patterns: Vec<PatternSpec>,
}

fn default_timeout_ms() -> u64 {
    30_000
}

/// One expected line in the spec
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Regular expression with named capture groups
    pub pattern: String,

    /// Diagnostic label shown in logs instead of the pattern text
    #[serde(default)]
    pub label: Option<String>,
}

impl CaptureSpec {
    /// Parse a capture spec from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Parse a capture spec from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Compile the patterns, in order. Fails on the first invalid regex.
    pub fn matchers(&self) -> Result<Vec<MatcherSpec>> {
        self.patterns
            .iter()
            .map(|p| {
                let matcher = MatcherSpec::new(&p.pattern)?;
                Ok(match &p.label {
                    Some(label) => matcher.with_label(label),
                    None => matcher,
                })
            })
            .collect()
    }

    /// The spec's completion timeout as a duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Build a ready-to-feed session from this spec
    pub fn session(&self) -> Result<CaptureSession> {
        Ok(CaptureSession::with_matchers(self.matchers()?))
    }
}
