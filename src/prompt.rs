//! Interactive questions asked of the operator.
//!
//! The identity wizard and the nuke-all confirmation go through the [`Prompt`]
//! trait so they can be answered without a terminal.

use crate::error::{Error, Result};
use std::collections::VecDeque;
use std::io::{stdin, stdout, Write};
use std::sync::Mutex;

/// Source of operator answers.
pub trait Prompt: Send + Sync {
    /// Ask a free-form question and return the trimmed answer.
    fn ask(&self, question: &str) -> Result<String>;

    /// Ask a yes/no question. Anything but an explicit yes is a no.
    fn confirm(&self, question: &str) -> Result<bool>;
}

/// Reads answers from standard input.
pub struct TerminalPrompt;

impl TerminalPrompt {
    fn read_answer(question: &str) -> Result<String> {
        print!("{}", question);
        stdout().flush().ok();

        let mut input = String::new();
        stdin()
            .read_line(&mut input)
            .map_err(|e| Error::Prompt(format!("Failed to read answer: {}", e)))?;
        Ok(input.trim().to_string())
    }
}

impl Prompt for TerminalPrompt {
    fn ask(&self, question: &str) -> Result<String> {
        if !is_interactive() {
            return Err(Error::Prompt(format!(
                "cannot ask '{}' in a non-interactive session",
                question.trim_end_matches([':', ' '])
            )));
        }
        Self::read_answer(question)
    }

    fn confirm(&self, question: &str) -> Result<bool> {
        if !is_interactive() {
            tracing::warn!("non-interactive session, answering no to: {}", question);
            return Ok(false);
        }
        Ok(is_affirmative(&Self::read_answer(question)?))
    }
}

/// Answers from a fixed queue. Used by tests and embedders.
pub struct FixedPrompt {
    answers: Mutex<VecDeque<String>>,
    confirm: bool,
}

impl FixedPrompt {
    pub fn new<I, S>(answers: I, confirm: bool) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: Mutex::new(answers.into_iter().map(Into::into).collect()),
            confirm,
        }
    }

    /// A prompt that declines every confirmation and has no answers.
    pub fn declining() -> Self {
        Self::new(Vec::<String>::new(), false)
    }
}

impl Prompt for FixedPrompt {
    fn ask(&self, question: &str) -> Result<String> {
        self.answers
            .lock()
            .map_err(|_| Error::Prompt("answer queue poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| Error::Prompt(format!("no answer for '{}'", question)))
    }

    fn confirm(&self, _question: &str) -> Result<bool> {
        Ok(self.confirm)
    }
}

/// `y` or `yes`, case-insensitive.
pub fn is_affirmative(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}

/// Check if running in interactive TTY
fn is_interactive() -> bool {
    use std::io::IsTerminal;
    if std::env::var_os("MAESTRO_NON_INTERACTIVE").is_some() {
        return false;
    }
    stdin().is_terminal() && stdout().is_terminal()
}
