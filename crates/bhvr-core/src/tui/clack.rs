//! cliclack adapters for the prompt and progress seams

use crate::installers::{InstallObserver, InstallOutcome, InstallStatus, Installer};
use crate::project::{AssemblyObserver, AssemblyState};
use crate::prompt::{Choice, PromptError, Prompter};
use cliclack::ProgressBar;
use std::io;

/// Esc and Ctrl+C surface from cliclack as `Interrupted`
fn prompt_error(e: io::Error) -> PromptError {
    if e.kind() == io::ErrorKind::Interrupted {
        PromptError::Cancelled
    } else {
        PromptError::Io(e)
    }
}

/// [`Prompter`] rendering inline terminal prompts
#[derive(Debug, Default)]
pub struct ClackPrompter;

impl Prompter for ClackPrompter {
    fn input(&mut self, message: &str, default: &str) -> Result<String, PromptError> {
        cliclack::input(message)
            .placeholder(default)
            .default_input(default)
            .interact()
            .map_err(prompt_error)
    }

    fn select<T: Clone + Eq>(
        &mut self,
        message: &str,
        choices: &[Choice<T>],
        initial: &T,
    ) -> Result<T, PromptError> {
        let mut select = cliclack::select(message);
        for choice in choices {
            select = select.item(choice.value.clone(), &choice.label, &choice.hint);
        }
        select
            .initial_value(initial.clone())
            .interact()
            .map_err(prompt_error)
    }

    fn multiselect<T: Clone + Eq>(
        &mut self,
        message: &str,
        choices: &[Choice<T>],
        initial: &[T],
    ) -> Result<Vec<T>, PromptError> {
        let mut multi = cliclack::multiselect(message);
        for choice in choices {
            multi = multi.item(choice.value.clone(), &choice.label, &choice.hint);
        }
        multi
            .initial_values(initial.to_vec())
            .required(false)
            .interact()
            .map_err(prompt_error)
    }

    fn confirm(&mut self, message: &str, initial: bool) -> Result<bool, PromptError> {
        cliclack::confirm(message)
            .initial_value(initial)
            .interact()
            .map_err(prompt_error)
    }
}

/// Shows one spinner per running step
#[derive(Default)]
pub struct SpinnerObserver {
    spinner: Option<ProgressBar>,
}

impl SpinnerObserver {
    fn start(&mut self, message: &str) {
        let spinner = cliclack::spinner();
        spinner.start(message);
        self.spinner = Some(spinner);
    }

    fn stop(&mut self, message: &str, success: bool) {
        if let Some(spinner) = self.spinner.take() {
            if success {
                spinner.stop(message);
            } else {
                spinner.error(message);
            }
        }
    }
}

impl InstallObserver for SpinnerObserver {
    fn started(&mut self, installer: &dyn Installer) {
        self.start(&format!("Adding {}...", installer.label()));
    }

    fn finished(&mut self, outcome: &InstallOutcome) {
        match &outcome.status {
            InstallStatus::Applied => self.stop(&format!("{} added", outcome.label), true),
            InstallStatus::Failed(_) => {
                self.stop(&format!("Failed to add {}", outcome.label), false)
            }
            InstallStatus::Skipped(reason) => {
                self.stop(&format!("Skipped {}: {}", outcome.label, reason), true)
            }
        }
    }
}

impl AssemblyObserver for SpinnerObserver {
    fn entered(&mut self, state: AssemblyState) {
        tracing::trace!(%state, "tui state");
    }

    fn step_started(&mut self, message: &str) {
        self.start(message);
    }

    fn step_finished(&mut self, message: &str, success: bool) {
        self.stop(message, success);
    }

    fn warning(&mut self, message: &str, hint: Option<&str>) {
        let _ = cliclack::log::warning(message);
        if let Some(hint) = hint {
            let _ = cliclack::log::info(hint);
        }
    }
}
