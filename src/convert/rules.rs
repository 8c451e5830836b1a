//! Rewrite rule tables.
//!
//! A rule table is plain data: ordered `(pattern, replacement)` pairs plus
//! ordered advisory markers. The built-in Swift → Kotlin table lives here;
//! a replacement table can be loaded from JSON (see `rules_path` in the
//! config file).
//!
//! ```json
//! {
//!   "rules": [{ "pattern": "\\blet\\b", "replacement": "val" }],
//!   "markers": [{ "pattern": "@Published\\b", "message": "Convert to MutableStateFlow" }]
//! }
//! ```
//!
//! Replacements use `regex` syntax: `${1}` for groups, `$$` for a literal `$`.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// One substitution, applied to the whole file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSpec {
    pub pattern: String,
    pub replacement: String,
}

/// An annotation with no mechanical translation, and the follow-up to flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkerSpec {
    pub pattern: String,
    pub message: String,
}

/// Ordered rules and markers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleTable {
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
    #[serde(default)]
    pub markers: Vec<MarkerSpec>,
}

impl RuleTable {
    /// Load a rule table from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("Failed to read rule table {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse rule table {}: {e}", path.display()))
        })
    }

    /// The built-in Swift → Kotlin table.
    ///
    /// Order matters: `-> Void` must run before the generic `-> T` rule, and
    /// array types must become `List<T>` before return arrows are rewritten.
    #[must_use]
    pub fn swift_to_kotlin() -> Self {
        const RULES: &[(&str, &str)] = &[
            (r"\blet\b", "val"),
            (r"\bfunc\b", "fun"),
            (r"\bnil\b", "null"),
            (r"\bself\b", "this"),
            (r"\bstruct\b", "data class"),
            (r"\benum\b", "enum class"),
            (r"\bprotocol\b", "interface"),
            (r"\bBool\b", "Boolean"),
            (r"([:(<,]\s*|->\s*)\[(\w+)\]", "${1}List<${2}>"),
            (r"\?\?", "?:"),
            (r"-> Void\b", ": Unit"),
            (r"-> (\w+)", ": ${1}"),
            (r"\\\(([^)]+)\)", "$${${1}}"),
            (r"\.count\b", ".size"),
            (r"\.isEmpty\b", ".isEmpty()"),
            (r"\.append\(", ".add("),
            (r"\.first\b", ".firstOrNull()"),
            (r"\bprint\(", "println("),
            (r"\bimport Foundation\b", "// import Foundation"),
            (r"\bimport UIKit\b", "// import UIKit"),
            (r"\bimport SwiftUI\b", "// import SwiftUI - use Compose"),
            (r"\bimport Combine\b", "// import Combine - use Flow"),
        ];
        const MARKERS: &[(&str, &str)] = &[
            (r"@Published\b", "Convert to MutableStateFlow"),
            (r"@State\b", "Convert to remember { mutableStateOf() }"),
            (r"@ObservedObject\b", "Convert to viewModel()"),
        ];

        Self {
            rules: RULES
                .iter()
                .map(|(pattern, replacement)| RuleSpec {
                    pattern: (*pattern).to_string(),
                    replacement: (*replacement).to_string(),
                })
                .collect(),
            markers: MARKERS
                .iter()
                .map(|(pattern, message)| MarkerSpec {
                    pattern: (*pattern).to_string(),
                    message: (*message).to_string(),
                })
                .collect(),
        }
    }
}
