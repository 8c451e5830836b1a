//! Per-change confirmation for `sync --interactive`.

use dialoguer::{Select, theme::ColorfulTheme};

use crate::error::{Error, Result};
use crate::model::FileChange;

/// Answer to "apply this change?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Accept,
    Reject,
    /// Stop the whole run before anything is applied.
    Abort,
}

/// Decides, one change at a time, whether the engine applies it.
///
/// Calls are strictly sequential, in change-list order, and all of them
/// happen before the first change is applied.
pub trait Reviewer {
    /// Decide on one change.
    ///
    /// # Errors
    ///
    /// Returns an error if the decision cannot be obtained (e.g. no terminal).
    fn review(&mut self, change: &FileChange) -> Result<Decision>;
}

/// Accepts everything. Used when `--interactive` is off.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl Reviewer for AcceptAll {
    fn review(&mut self, _change: &FileChange) -> Result<Decision> {
        Ok(Decision::Accept)
    }
}

/// Terminal prompt: apply / skip / quit.
pub struct PromptReviewer {
    theme: ColorfulTheme,
}

impl Default for PromptReviewer {
    fn default() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl PromptReviewer {
    const CHOICES: [&'static str; 3] = ["Yes, apply this change", "No, skip it", "Quit"];

    fn prompt_text(change: &FileChange) -> String {
        match &change.target_path {
            Some(target) => format!("Apply {} for {} ({target})?", change.kind, change.source_path),
            None => format!("Apply {} for {}?", change.kind, change.source_path),
        }
    }
}

impl Reviewer for PromptReviewer {
    fn review(&mut self, change: &FileChange) -> Result<Decision> {
        let selection = Select::with_theme(&self.theme)
            .with_prompt(Self::prompt_text(change))
            .items(&Self::CHOICES)
            .default(0)
            .interact_opt()
            .map_err(|e| Error::Other(format!("Prompt failed: {e}")))?;

        // Esc / q counts as quit.
        Ok(match selection {
            Some(0) => Decision::Accept,
            Some(1) => Decision::Reject,
            _ => Decision::Abort,
        })
    }
}

/// Replays a fixed list of decisions. Accepts once the list runs out.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct ScriptedReviewer {
    decisions: std::collections::VecDeque<Decision>,
}

#[cfg(test)]
impl ScriptedReviewer {
    pub(crate) fn new(decisions: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            decisions: decisions.into_iter().collect(),
        }
    }
}

#[cfg(test)]
impl Reviewer for ScriptedReviewer {
    fn review(&mut self, _change: &FileChange) -> Result<Decision> {
        Ok(self.decisions.pop_front().unwrap_or(Decision::Accept))
    }
}
