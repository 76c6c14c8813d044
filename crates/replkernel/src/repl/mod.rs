/*
 * mod.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

pub mod driver;
pub mod output;
pub mod pty;

use regex::Regex;

use crate::error::Error;
use crate::wire::language_info::LanguageInfo;

/// Default REPL command
pub const SWIFT_COMMAND: &str = "swift";

/// The Swift REPL prompts with the number of the next line, e.g. `  1> `
pub const SWIFT_PROMPT: &str = r"^\s*\d+>\s*$";

/// Lines continuing a statement are numbered too, e.g. `  2. `
pub const SWIFT_CONTINUATION_PROMPT: &str = r"^\s*\d+\.\s*$";

/// Something that executes code and reports what it printed.
pub trait Interpreter: Send {
    /// Runs `code` to completion and returns its output. Fails with
    /// `Error::ReplProcessTerminated` once the interpreter has gone away.
    fn run_command(&self, code: &str) -> crate::Result<String>;
}

/// Creates interpreter sessions on demand.
pub trait InterpreterFactory: Send {
    fn launch(&self) -> crate::Result<Box<dyn Interpreter>>;
}

/// How to start the REPL and recognise its prompts.
#[derive(Debug, Clone)]
pub struct ReplConfig {
    pub command: String,
    pub args: Vec<String>,

    /// Matches a line (or unterminated fragment) that is a primary prompt
    pub prompt: Regex,

    /// Matches a continuation prompt
    pub continuation_prompt: Regex,

    /// Reported in `kernel_info_reply`
    pub language_info: LanguageInfo,
    pub banner: String,
}

impl ReplConfig {
    /// Configuration for the Swift REPL.
    pub fn swift() -> crate::Result<Self> {
        Ok(Self {
            command: String::from(SWIFT_COMMAND),
            args: Vec::new(),
            prompt: compile(SWIFT_PROMPT)?,
            continuation_prompt: compile(SWIFT_CONTINUATION_PROMPT)?,
            language_info: LanguageInfo::swift(),
            banner: String::from("Swift REPL"),
        })
    }

    pub fn with_command(mut self, command: &str, args: Vec<String>) -> Self {
        self.command = String::from(command);
        self.args = args;
        self
    }

    pub fn with_prompt(mut self, pattern: &str) -> crate::Result<Self> {
        self.prompt = compile(pattern)?;
        Ok(self)
    }

    pub fn with_continuation_prompt(mut self, pattern: &str) -> crate::Result<Self> {
        self.continuation_prompt = compile(pattern)?;
        Ok(self)
    }
}

fn compile(pattern: &str) -> crate::Result<Regex> {
    Regex::new(pattern).map_err(|err| Error::InvalidPromptPattern(String::from(pattern), err))
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_swift_prompts() {
        let config = ReplConfig::swift().unwrap();
        assert!(config.prompt.is_match("  1> "));
        assert!(config.prompt.is_match(" 12>"));
        assert!(!config.prompt.is_match("  1. "));
        assert!(config.continuation_prompt.is_match("  2. "));
        assert!(!config.continuation_prompt.is_match("$R0: Int = 2"));
    }

    #[test]
    fn test_invalid_prompt_pattern() {
        assert_matches!(
            ReplConfig::swift().unwrap().with_prompt("(unclosed"),
            Err(Error::InvalidPromptPattern(pattern, _)) => {
                assert_eq!(pattern, "(unclosed");
            }
        );
    }
}
