//! Source file roles.
//!
//! A role is the architectural category of a Swift file. It decides where the
//! converted Kotlin file lands in the Android tree, and whether the file is
//! converted at all (`test` files are not).

use serde::{Deserialize, Serialize};

/// Architectural role of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Model,
    View,
    ViewModel,
    Service,
    Extension,
    Utility,
    Test,
    Other,
}

impl Role {
    /// Every role, in declaration order.
    pub const ALL: [Self; 8] = [
        Self::Model,
        Self::View,
        Self::ViewModel,
        Self::Service,
        Self::Extension,
        Self::Utility,
        Self::Test,
        Self::Other,
    ];

    /// Get the string representation used in state files and reports.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Model => "model",
            Self::View => "view",
            Self::ViewModel => "viewmodel",
            Self::Service => "service",
            Self::Extension => "extension",
            Self::Utility => "utility",
            Self::Test => "test",
            Self::Other => "other",
        }
    }

    /// Whether files with this role are converted at all.
    #[must_use]
    pub const fn is_convertible(&self) -> bool {
        !matches!(self, Self::Test)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "model" => Ok(Self::Model),
            "view" => Ok(Self::View),
            "viewmodel" | "view_model" | "view-model" => Ok(Self::ViewModel),
            "service" => Ok(Self::Service),
            "extension" => Ok(Self::Extension),
            "utility" | "util" => Ok(Self::Utility),
            "test" => Ok(Self::Test),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}
