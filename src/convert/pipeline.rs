//! The rewrite pipeline.
//!
//! A pipeline is an ordered list of [`RewriteRule`]s followed by an ordered
//! list of advisory markers. It has no parser and no cross-file knowledge:
//! every rule sees one file's text and nothing else.
//!
//! The output is a pure function of the input. The sync engine relies on
//! this when it compares an on-disk Kotlin file against a fresh rewrite: any
//! difference must come from a human edit, never from the pipeline.

use std::borrow::Cow;
use std::path::Path;

use regex::Regex;

use super::rules::{RuleSpec, RuleTable};
use crate::error::{Error, Result};

/// Prefix of every line the converter adds for a human to review.
pub const VERIFY_PREFIX: &str = "// TODO: VERIFY - ";

/// A pure text transformation.
pub trait RewriteRule: Send + Sync {
    /// Apply the rule to a whole file.
    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Regex substitution over the whole file.
#[derive(Debug, Clone)]
pub struct RegexRule {
    pattern: Regex,
    replacement: String,
}

impl RegexRule {
    /// Compile a rule from its spec.
    pub fn new(spec: &RuleSpec) -> Result<Self> {
        let pattern = Regex::new(&spec.pattern).map_err(|e| {
            Error::Config(format!("Invalid rewrite pattern '{}': {e}", spec.pattern))
        })?;
        Ok(Self {
            pattern,
            replacement: spec.replacement.clone(),
        })
    }
}

impl RewriteRule for RegexRule {
    fn apply<'a>(&self, text: &'a str) -> Cow<'a, str> {
        self.pattern.replace_all(text, self.replacement.as_str())
    }
}

/// Annotation that needs manual follow-up.
#[derive(Debug, Clone)]
struct AdvisoryMarker {
    pattern: Regex,
    message: String,
}

/// Rewritten text plus the advisory marker surfaced for it, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    pub content: String,
    pub marker: Option<String>,
}

impl ConversionResult {
    #[must_use]
    pub fn has_advisory_markers(&self) -> bool {
        self.marker.is_some()
    }
}

/// Ordered rules and markers.
pub struct Pipeline {
    rules: Vec<Box<dyn RewriteRule>>,
    markers: Vec<AdvisoryMarker>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("rules", &self.rules.len())
            .field("markers", &self.markers.len())
            .finish()
    }
}

impl Pipeline {
    /// A pipeline from arbitrary rules and no markers.
    #[must_use]
    pub fn new(rules: Vec<Box<dyn RewriteRule>>) -> Self {
        Self {
            rules,
            markers: Vec::new(),
        }
    }

    /// Compile a rule table.
    pub fn from_table(table: &RuleTable) -> Result<Self> {
        let rules = table
            .rules
            .iter()
            .map(|spec| RegexRule::new(spec).map(|r| Box::new(r) as Box<dyn RewriteRule>))
            .collect::<Result<Vec<_>>>()?;

        let markers = table
            .markers
            .iter()
            .map(|spec| {
                Regex::new(&spec.pattern)
                    .map(|pattern| AdvisoryMarker {
                        pattern,
                        message: spec.message.clone(),
                    })
                    .map_err(|e| {
                        Error::Config(format!("Invalid marker pattern '{}': {e}", spec.pattern))
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { rules, markers })
    }

    /// The built-in Swift → Kotlin pipeline.
    ///
    /// # Panics
    ///
    /// Panics if the built-in table fails to compile, which the tests rule out.
    #[must_use]
    pub fn swift_to_kotlin() -> Self {
        Self::from_table(&RuleTable::swift_to_kotlin()).expect("built-in rule table compiles")
    }

    /// Load a pipeline from a JSON rule table, or the built-in one if `path`
    /// is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::from_table(&RuleTable::load(p)?),
            None => Ok(Self::swift_to_kotlin()),
        }
    }

    /// Rewrite one file.
    ///
    /// Rules run in order over the output of the previous rule. Then the
    /// first marker (in table order) whose pattern occurs in the result is
    /// prepended as a single comment line. At most one marker is surfaced.
    #[must_use]
    pub fn rewrite(&self, content: &str) -> ConversionResult {
        let mut text = content.to_string();
        for rule in &self.rules {
            if let Cow::Owned(next) = rule.apply(&text) {
                text = next;
            }
        }

        let marker = self
            .markers
            .iter()
            .find(|m| m.pattern.is_match(&text))
            .map(|m| m.message.clone());

        if let Some(message) = &marker {
            text = format!("{VERIFY_PREFIX}{message}\n{text}");
        }

        ConversionResult {
            content: text,
            marker,
        }
    }
}
