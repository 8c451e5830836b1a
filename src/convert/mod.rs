//! Swift → Kotlin conversion.
//!
//! - [`classify`] assigns a [`Role`](crate::model::Role) to a Swift file
//! - [`paths`] resolves where the Kotlin file lands
//! - [`rules`] and [`pipeline`] rewrite the text
//!
//! [`generate`] glues these together and is the only way Kotlin text is
//! produced, for initial conversion and sync alike.

pub mod classify;
pub mod paths;
pub mod pipeline;
pub mod rules;

pub use classify::classify;
pub use pipeline::{ConversionResult, Pipeline, RegexRule, RewriteRule, VERIFY_PREFIX};
pub use rules::{MarkerSpec, RuleSpec, RuleTable};

/// Generate the full Kotlin file for one Swift source.
///
/// The output is the rewritten body behind a `package` line and a provenance
/// comment. Same inputs, same bytes.
#[must_use]
pub fn generate(
    source_path: &str,
    content: &str,
    target_path: &str,
    package_name: &str,
    pipeline: &Pipeline,
) -> ConversionResult {
    let converted = pipeline.rewrite(content);
    let package = paths::package_for(target_path, package_name);

    ConversionResult {
        content: format!(
            "package {package}\n\n{VERIFY_PREFIX}Synced from {source_path}\n\n{}",
            converted.content
        ),
        marker: converted.marker,
    }
}
