/*
 * output.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use regex::Regex;

/// What a REPL printed, one complete line (or bare prompt) at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum ReplLine {
    /// The REPL is ready for a new statement
    Prompt,

    /// The REPL is waiting for the rest of a statement
    Continuation,

    /// Anything else, without its line terminator
    Output(String),
}

/// Splits the raw byte stream of a pseudo-terminal into classified lines.
///
/// Interactive prompts are not newline-terminated. `feed()` only reports
/// complete lines and holds any trailing fragment; once the terminal has no
/// more bytes pending, `settle()` decides whether that fragment is a prompt.
pub struct LineClassifier {
    prompt: Regex,
    continuation: Regex,

    /// Bytes received after the last newline
    partial: Vec<u8>,
}

impl LineClassifier {
    pub fn new(prompt: Regex, continuation: Regex) -> Self {
        Self {
            prompt,
            continuation,
            partial: Vec::new(),
        }
    }

    /// Consumes a chunk of output, returning the lines it completes.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<ReplLine> {
        self.partial.extend_from_slice(bytes);
        let mut lines = Vec::new();

        while let Some(pos) = self.partial.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.partial.drain(..=pos).collect();
            let line = decode(&raw[..raw.len() - 1]);
            if line.is_empty() {
                continue;
            }
            lines.push(self.classify(line));
        }

        lines
    }

    /// Classifies the held fragment as a prompt, if it is one. Only call this
    /// when the stream has gone quiet: a fragment may be the start of a line
    /// that was cut at a read boundary.
    ///
    /// Prompts end with the space the cursor sits after, so a fragment without
    /// trailing whitespace (e.g. the `3.` of `3.14`) is never a prompt.
    pub fn settle(&mut self) -> Option<ReplLine> {
        if self.partial.is_empty() {
            return None;
        }
        let fragment = decode(&self.partial);
        if !fragment.ends_with(char::is_whitespace) {
            return None;
        }
        if !self.is_prompt(&fragment) && !self.is_continuation(&fragment) {
            return None;
        }
        self.partial.clear();
        Some(self.classify(fragment))
    }

    /// Returns the held fragment, if any. Used when the stream ends.
    pub fn flush(&mut self) -> Option<String> {
        if self.partial.is_empty() {
            return None;
        }
        let fragment = decode(&self.partial);
        self.partial.clear();
        (!fragment.is_empty()).then_some(fragment)
    }

    fn classify(&self, line: String) -> ReplLine {
        if self.is_prompt(&line) {
            ReplLine::Prompt
        } else if self.is_continuation(&line) {
            ReplLine::Continuation
        } else {
            ReplLine::Output(line)
        }
    }

    fn is_prompt(&self, text: &str) -> bool {
        self.prompt.is_match(text)
    }

    fn is_continuation(&self, text: &str) -> bool {
        self.continuation.is_match(text)
    }
}

/// Decodes a line, dropping the carriage return a terminal adds before the
/// newline and any ANSI escape sequences.
fn decode(bytes: &[u8]) -> String {
    let text = String::from_utf8_lossy(bytes);
    let text = text.strip_suffix('\r').unwrap_or(&text);
    strip_ansi(text)
}

fn strip_ansi(text: &str) -> String {
    if !text.contains('\u{1b}') {
        return String::from(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\u{1b}' {
            out.push(c);
            continue;
        }
        // CSI sequences end at the first byte in `@`..=`~`
        if chars.peek() == Some(&'[') {
            chars.next();
            for c in chars.by_ref() {
                if ('@'..='~').contains(&c) {
                    break;
                }
            }
        } else {
            chars.next();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> LineClassifier {
        LineClassifier::new(
            Regex::new(r"^\s*\d+>\s*$").unwrap(),
            Regex::new(r"^\s*\d+\.\s*$").unwrap(),
        )
    }

    fn output(text: &str) -> ReplLine {
        ReplLine::Output(String::from(text))
    }

    #[test]
    fn test_splits_lines_and_strips_carriage_returns() {
        let mut lines = classifier();
        assert_eq!(
            lines.feed(b"hello\r\nworld\r\n"),
            vec![output("hello"), output("world")]
        );
    }

    #[test]
    fn test_unterminated_prompt_is_reported_once_settled() {
        let mut lines = classifier();
        assert_eq!(lines.feed(b"Welcome\r\n  1> "), vec![output("Welcome")]);
        assert_eq!(lines.settle(), Some(ReplLine::Prompt));
        assert_eq!(lines.settle(), None);

        assert!(lines.feed(b"  2. ").is_empty());
        assert_eq!(lines.settle(), Some(ReplLine::Continuation));
    }

    #[test]
    fn test_number_cut_at_read_boundary_is_not_a_prompt() {
        let mut lines = classifier();
        // `3.` matches the continuation pattern but lacks the prompt's space
        assert!(lines.feed(b"3.").is_empty());
        assert_eq!(lines.settle(), None);
        assert_eq!(lines.feed(b"14\r\n"), vec![output("3.14")]);

        assert!(lines.feed(b"  12").is_empty());
        assert_eq!(lines.settle(), None);
        assert_eq!(lines.feed(b"\r\n"), vec![output("12")]);
    }

    #[test]
    fn test_fragments_are_held_until_complete() {
        let mut lines = classifier();
        assert!(lines.feed(b"$R0: Int =").is_empty());
        assert!(lines.feed(b" 2").is_empty());
        assert_eq!(lines.feed(b"\r\n"), vec![output("$R0: Int = 2")]);
    }

    #[test]
    fn test_prompt_split_across_reads() {
        let mut lines = classifier();
        // "  1" alone doesn't look like a prompt yet
        assert!(lines.feed(b"  1").is_empty());
        assert_eq!(lines.settle(), None);
        assert!(lines.feed(b"> ").is_empty());
        assert_eq!(lines.settle(), Some(ReplLine::Prompt));
    }

    #[test]
    fn test_empty_lines_are_skipped() {
        let mut lines = classifier();
        assert_eq!(lines.feed(b"\r\n\nx\n"), vec![output("x")]);
    }

    #[test]
    fn test_utf8_split_across_reads() {
        let mut lines = classifier();
        let bytes = "héllo\n".as_bytes();
        assert!(lines.feed(&bytes[..2]).is_empty());
        assert_eq!(lines.feed(&bytes[2..]), vec![output("héllo")]);
    }

    #[test]
    fn test_ansi_sequences_are_removed() {
        let mut lines = classifier();
        assert_eq!(lines.feed(b"\x1b[1G\x1b[32mgreen\x1b[0m\n"), vec![
            output("green")
        ]);
        assert!(lines.feed(b"\x1b[1G  3> \x1b[K").is_empty());
        assert_eq!(lines.settle(), Some(ReplLine::Prompt));
    }

    #[test]
    fn test_flush() {
        let mut lines = classifier();
        assert!(lines.feed(b"partial").is_empty());
        assert_eq!(lines.settle(), None);
        assert_eq!(lines.flush(), Some(String::from("partial")));
        assert_eq!(lines.flush(), None);
    }
}
