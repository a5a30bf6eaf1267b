//! Input Prompting
//!
//! Operations read their arguments through the [`Prompt`] trait rather than
//! stdin directly, so the same code paths run under the interactive shell
//! and under scripted tests.

use std::collections::VecDeque;

use crate::error::{BazaarError, Result};

/// One line of operator input per call
pub trait Prompt {
    fn line(&mut self, label: &str) -> Result<String>;
}

/// Interactive prompt backed by the terminal
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Prompt for ConsolePrompt {
    fn line(&mut self, label: &str) -> Result<String> {
        dialoguer::Input::<String>::new()
            .with_prompt(label)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| BazaarError::backend(format!("terminal input failed: {e}")))
    }
}

/// Canned responses for tests and batch runs
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    lines: VecDeque<String>,
}

impl ScriptedPrompt {
    #[must_use]
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { lines: lines.into_iter().map(Into::into).collect() }
    }

    pub fn push<S: Into<String>>(&mut self, line: S) {
        self.lines.push_back(line.into());
    }
}

impl Prompt for ScriptedPrompt {
    fn line(&mut self, label: &str) -> Result<String> {
        self.lines
            .pop_front()
            .ok_or_else(|| BazaarError::invalid_input(format!("no input supplied for '{label}'")))
    }
}
