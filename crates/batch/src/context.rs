//! Progress and selection callbacks
//!
//! These traits keep the batch crate free of any terminal UI: the binary
//! plugs in spinners and prompts, tests plug in deterministic versions.

use crate::types::{Outcome, TargetReport};
use thiserror::Error;

/// Progress callback for batch execution
pub trait ProgressCallback: Send {
    /// Called when starting a target
    fn on_target_start(&mut self, name: &str, entries: usize);

    /// Called when starting a single entry
    fn on_entry_start(&mut self, target: &str, description: &str);

    /// Called when an entry reaches its terminal state
    fn on_entry_complete(&mut self, target: &str, outcome: &Outcome);

    /// Called when every entry of a target is done
    fn on_target_complete(&mut self, name: &str, report: &TargetReport);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_target_start(&mut self, _name: &str, _entries: usize) {}
    fn on_entry_start(&mut self, _target: &str, _description: &str) {}
    fn on_entry_complete(&mut self, _target: &str, _outcome: &Outcome) {}
    fn on_target_complete(&mut self, _name: &str, _report: &TargetReport) {}
}

/// Selection failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectError {
    /// The user dismissed the prompt
    #[error("Selection aborted")]
    Aborted,

    /// There was nothing to choose from
    #[error("Nothing to select")]
    Empty,

    /// The prompt itself failed
    #[error("Prompt failed: {0}")]
    Prompt(String),
}

/// Chooses a subset of items
pub trait Selector {
    /// Return the indices of the chosen items
    ///
    /// `items` are display labels in the order shown. Returning an empty
    /// list is allowed; callers decide whether that is meaningful.
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Vec<usize>, SelectError>;
}

/// Selects everything without asking
pub struct SelectAll;

impl Selector for SelectAll {
    fn select(&mut self, _prompt: &str, items: &[String]) -> Result<Vec<usize>, SelectError> {
        Ok((0..items.len()).collect())
    }
}

/// Narrow `items` to the subset picked by `selector`
///
/// Items are sorted by label before being offered. Out-of-range indices
/// returned by the selector are ignored.
pub fn select_subset<T, F, S>(
    mut items: Vec<T>,
    prompt: &str,
    label: F,
    selector: &mut S,
) -> Result<Vec<T>, SelectError>
where
    F: Fn(&T) -> String,
    S: Selector + ?Sized,
{
    if items.is_empty() {
        return Err(SelectError::Empty);
    }

    items.sort_by_key(|item| label(item));
    let labels: Vec<String> = items.iter().map(&label).collect();

    let mut chosen = selector.select(prompt, &labels)?;
    chosen.sort_unstable();
    chosen.dedup();

    let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
    Ok(chosen
        .into_iter()
        .filter_map(|idx| slots.get_mut(idx).and_then(Option::take))
        .collect())
}
