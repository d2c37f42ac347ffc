//! Line sources for the menu session

use std::collections::VecDeque;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::race_manager::Result;

/// Where the session reads its answers from
pub trait LineSource {
    /// Show `prompt` and read one line; `None` once input is over
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>>;
}

/// Interactive terminal with line editing and history
pub struct Terminal {
    editor: DefaultEditor,
}

impl Terminal {
    pub fn new() -> Result<Self> {
        Ok(Self {
            editor: DefaultEditor::new()?,
        })
    }
}

impl LineSource for Terminal {
    fn read_line(&mut self, prompt: &str) -> Result<Option<String>> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    self.editor.add_history_entry(line.as_str())?;
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

/// Pre-recorded answers, consumed in order
#[derive(Debug, Clone, Default)]
pub struct Scripted {
    lines: VecDeque<String>,
}

impl Scripted {
    pub fn new<I, T>(lines: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.lines.len()
    }
}

impl LineSource for Scripted {
    fn read_line(&mut self, _prompt: &str) -> Result<Option<String>> {
        Ok(self.lines.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_runs_dry() {
        let mut input = Scripted::new(["1", "two"]);
        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("1"));
        assert_eq!(input.remaining(), 1);
        assert_eq!(input.read_line("> ").unwrap().as_deref(), Some("two"));
        assert_eq!(input.read_line("> ").unwrap(), None);
    }
}
