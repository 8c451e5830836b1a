//! Role classification for Swift files.
//!
//! Categories overlap on content alone (a view model often mentions `View`,
//! a test often declares `Codable` structs), so classification is an ordered
//! list of matchers and the first match wins. The order below is fixed:
//! the role decides where the Kotlin file lands, so reordering would move
//! files between runs.

use std::path::Path;

use crate::model::Role;

/// Lowercased path and stem plus the raw content, computed once per file.
struct Signals<'a> {
    path: String,
    stem: String,
    content: &'a str,
}

impl<'a> Signals<'a> {
    fn new(relative_path: &str, content: &'a str) -> Self {
        let stem = Path::new(relative_path)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            path: relative_path.to_lowercase(),
            stem,
            content,
        }
    }

    fn path_has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.path.contains(n))
    }
}

type Matcher = fn(&Signals<'_>) -> bool;

fn is_test(s: &Signals<'_>) -> bool {
    s.path.contains("test") || s.stem.ends_with("tests") || s.stem.ends_with("test")
}

fn is_view_model(s: &Signals<'_>) -> bool {
    s.stem.contains("viewmodel") || s.stem.contains("vm")
}

fn is_swiftui_view(s: &Signals<'_>) -> bool {
    s.content.contains("View") && s.content.contains("body:")
}

fn is_uikit_controller(s: &Signals<'_>) -> bool {
    s.content.contains("UIViewController")
}

fn is_model(s: &Signals<'_>) -> bool {
    s.path.contains("model") || (s.content.contains("struct") && s.content.contains("Codable"))
}

fn is_service(s: &Signals<'_>) -> bool {
    s.path_has_any(&["service", "api", "network"])
}

fn is_extension(s: &Signals<'_>) -> bool {
    s.path.contains("extension")
}

fn is_utility(s: &Signals<'_>) -> bool {
    s.path_has_any(&["util", "helper"])
}

/// Precedence-ordered matcher table.
const MATCHERS: [(Role, Matcher); 8] = [
    (Role::Test, is_test),
    (Role::ViewModel, is_view_model),
    (Role::View, is_swiftui_view),
    (Role::View, is_uikit_controller),
    (Role::Model, is_model),
    (Role::Service, is_service),
    (Role::Extension, is_extension),
    (Role::Utility, is_utility),
];

/// Classify a Swift file from its iOS-relative path and content.
///
/// Pure: the same path and content always yield the same role.
#[must_use]
pub fn classify(relative_path: &str, content: &str) -> Role {
    let signals = Signals::new(relative_path, content);
    MATCHERS
        .iter()
        .find(|(_, matches)| matches(&signals))
        .map_or(Role::Other, |(role, _)| *role)
}
