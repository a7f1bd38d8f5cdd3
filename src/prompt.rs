//! Interactive selection backed by `dialoguer`

use batch::{SelectAll, SelectError, Selector};
use dialoguer::MultiSelect;
use dialoguer::theme::ColorfulTheme;
use std::io;

/// Checkbox prompt; every item starts checked
///
/// Dismissing the prompt (Esc, Ctrl-C) is reported as `Aborted`. Submitting
/// nothing re-prompts.
pub struct PromptSelector {
    theme: ColorfulTheme,
}

impl PromptSelector {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Selector for PromptSelector {
    fn select(&mut self, prompt: &str, items: &[String]) -> Result<Vec<usize>, SelectError> {
        let defaults = vec![true; items.len()];
        loop {
            let picked = MultiSelect::with_theme(&self.theme)
                .with_prompt(prompt)
                .items(items)
                .defaults(&defaults)
                .interact_opt()
                .map_err(|e| match e {
                    dialoguer::Error::IO(err) if err.kind() == io::ErrorKind::Interrupted => {
                        SelectError::Aborted
                    }
                    dialoguer::Error::IO(err) => SelectError::Prompt(err.to_string()),
                })?;

            match picked {
                None => return Err(SelectError::Aborted),
                Some(indices) if indices.is_empty() => {
                    crate::ui::warn("Select at least one item (space toggles, enter confirms)");
                }
                Some(indices) => return Ok(indices),
            }
        }
    }
}

/// Selector for this invocation
///
/// `--yes` or a non-interactive terminal selects everything.
pub fn selector(yes: bool) -> Box<dyn Selector> {
    if yes || !console::user_attended() {
        log::debug!("Selecting all items without prompting");
        Box::new(SelectAll)
    } else {
        Box::new(PromptSelector::new())
    }
}
