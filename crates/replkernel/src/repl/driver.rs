/*
 * driver.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::fs::File;
use std::io::ErrorKind;
use std::io::Read;
use std::io::Write;
use std::os::fd::AsFd;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::time::Duration;

use log::debug;
use log::info;
use log::trace;
use log::warn;
use nix::poll::poll;
use nix::poll::PollFd;
use nix::poll::PollFlags;
use nix::poll::PollTimeout;
use nix::sys::signal::kill;
use nix::sys::signal::Signal;
use nix::unistd::Pid;
use stdext::spawn;

use crate::error::Error;
use crate::repl::output::LineClassifier;
use crate::repl::output::ReplLine;
use crate::repl::pty;
use crate::repl::Interpreter;
use crate::repl::InterpreterFactory;
use crate::repl::ReplConfig;

/// How long a failed write waits for the child's exit to be noticed
const EXIT_GRACE: Duration = Duration::from_secs(1);

/// Whether more output is ready to be read from the terminal right away.
fn has_pending_input(master: &File) -> bool {
    let mut fds = [PollFd::new(master.as_fd(), PollFlags::POLLIN)];
    matches!(poll(&mut fds, PollTimeout::ZERO), Ok(n) if n > 0)
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ReplState {
    /// The REPL is idle at a prompt (or hasn't shown one yet)
    AwaitingPrompt,

    /// A line was sent and the REPL is working on it
    AwaitingOutput,
}

struct Output {
    state: ReplState,

    /// Whether the first prompt has been seen; everything before it is banner
    ready: bool,

    /// Output lines collected for the command in flight
    buffer: String,

    /// Number of prompts and continuation prompts seen so far
    prompts: u64,

    /// Set once the child has exited, with a description of its exit status
    terminated: Option<String>,
}

struct Shared {
    output: Mutex<Output>,
    changed: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, Output> {
        self.output.lock().unwrap()
    }
}

/// Drives an interactive REPL running on a pseudo-terminal.
///
/// A reader thread classifies everything the REPL prints, a waiter thread
/// watches for its exit, and `run_command()` feeds code in line by line, using
/// prompts to tell when each line has been consumed.
pub struct ReplDriver {
    shared: Arc<Shared>,

    /// Write side of the terminal master
    input: Mutex<File>,

    /// Held for the whole of a `run_command()` call
    command: Mutex<()>,

    pid: Pid,
}

impl ReplDriver {
    pub fn start(config: &ReplConfig) -> crate::Result<Self> {
        let pty::PtyProcess { master, mut child } = pty::spawn(&config.command, &config.args)?;
        let pid = Pid::from_raw(child.id() as i32);

        let input = master.try_clone().map_err(Error::ReplIoError)?;
        let shared = Arc::new(Shared {
            output: Mutex::new(Output {
                state: ReplState::AwaitingPrompt,
                ready: false,
                buffer: String::new(),
                prompts: 0,
                terminated: None,
            }),
            changed: Condvar::new(),
        });

        let classifier = LineClassifier::new(
            config.prompt.clone(),
            config.continuation_prompt.clone(),
        );
        let reader_shared = shared.clone();
        spawn!(format!("repl-reader-{pid}"), move || {
            Self::read_output(master, classifier, reader_shared)
        });

        let waiter_shared = shared.clone();
        spawn!(format!("repl-waiter-{pid}"), move || {
            let status = match child.wait() {
                Ok(status) => status.to_string(),
                Err(err) => format!("unknown status: {err}"),
            };
            info!("REPL process {pid} terminated ({status})");

            let mut output = waiter_shared.lock();
            output.terminated = Some(status);
            waiter_shared.changed.notify_all();
        });

        Ok(Self {
            shared,
            input: Mutex::new(input),
            command: Mutex::new(()),
            pid,
        })
    }

    /// Reader thread body: blocks on the master until the child's side of the
    /// terminal closes.
    fn read_output(mut master: File, mut classifier: LineClassifier, shared: Arc<Shared>) {
        let mut buf = [0u8; 4096];
        loop {
            let n = match master.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                // EIO is how Linux reports a hung-up terminal
                Err(err) if err.raw_os_error() == Some(nix::libc::EIO) => break,
                Err(err) => {
                    warn!("Error reading from REPL: {err}");
                    break;
                },
            };
            trace!("REPL output: {:?}", String::from_utf8_lossy(&buf[..n]));

            let mut lines = classifier.feed(&buf[..n]);
            // A trailing fragment can only be a prompt once the REPL has
            // stopped writing
            if !has_pending_input(&master) {
                lines.extend(classifier.settle());
            }
            if lines.is_empty() {
                continue;
            }

            let mut output = shared.lock();
            for line in lines {
                match line {
                    ReplLine::Prompt => {
                        output.ready = true;
                        output.state = ReplState::AwaitingPrompt;
                        output.prompts += 1;
                    },
                    ReplLine::Continuation => {
                        output.prompts += 1;
                    },
                    ReplLine::Output(line) if output.state == ReplState::AwaitingOutput => {
                        output.buffer.push_str(&line);
                        output.buffer.push('\n');
                    },
                    ReplLine::Output(line) if output.ready => {
                        debug!("Unsolicited REPL output: {line}");
                    },
                    ReplLine::Output(line) => debug!("REPL banner: {line}"),
                }
            }
            shared.changed.notify_all();
        }

        if let Some(fragment) = classifier.flush() {
            let mut output = shared.lock();
            if output.state == ReplState::AwaitingOutput {
                output.buffer.push_str(&fragment);
                output.buffer.push('\n');
            }
        }
        debug!("REPL output closed");
    }

    /// Blocks until the prompt count moves past `seen` or the REPL exits.
    fn wait_for_prompt(&self, seen: u64) -> crate::Result<()> {
        let output = self
            .shared
            .changed
            .wait_while(self.shared.lock(), |output| {
                output.prompts == seen && output.terminated.is_none()
            })
            .unwrap();

        if output.prompts == seen {
            let status = output.terminated.clone().unwrap_or_default();
            return Err(Error::ReplProcessTerminated(status));
        }
        Ok(())
    }

    /// Maps a failed write to the REPL. Writes fail when the child is gone,
    /// in which case the waiter thread reports it shortly.
    fn write_failed(&self, err: Error) -> Error {
        let (output, _) = self
            .shared
            .changed
            .wait_timeout_while(self.shared.lock(), EXIT_GRACE, |output| {
                output.terminated.is_none()
            })
            .unwrap();
        match &output.terminated {
            Some(status) => Error::ReplProcessTerminated(status.clone()),
            None => err,
        }
    }

    fn send_line(&self, line: &str) -> crate::Result<()> {
        let mut input = self.input.lock().unwrap();
        let mut data = String::with_capacity(line.len() + 1);
        data.push_str(line);
        data.push('\n');
        input
            .write_all(data.as_bytes())
            .and_then(|_| input.flush())
            .map_err(Error::ReplIoError)
    }

    /// Kills the REPL and everything it started. Returns false if the child
    /// had already been reaped, in which case its pid may belong to someone
    /// else by now and nothing is signalled.
    pub fn kill(&self) -> bool {
        // Held so the waiter can't record the exit while we signal
        let output = self.shared.lock();
        if output.terminated.is_some() {
            return false;
        }

        // The child leads its own process group
        if let Err(err) = kill(Pid::from_raw(-self.pid.as_raw()), Signal::SIGKILL) {
            debug!("Could not kill REPL process group {}: {err}", self.pid);
        }
        drop(output);
        true
    }
}

impl Interpreter for ReplDriver {
    fn run_command(&self, code: &str) -> crate::Result<String> {
        let _command = self.command.lock().unwrap();

        // Wait for the REPL to come up; whatever it printed so far is banner
        let mut output = self
            .shared
            .changed
            .wait_while(self.shared.lock(), |output| {
                !output.ready && output.terminated.is_none()
            })
            .unwrap();
        if let Some(status) = &output.terminated {
            return Err(Error::ReplProcessTerminated(status.clone()));
        }
        output.buffer.clear();
        drop(output);

        for line in code.lines().map(str::trim).filter(|line| !line.is_empty()) {
            let mut output = self.shared.lock();
            let seen = output.prompts;
            output.state = ReplState::AwaitingOutput;
            drop(output);

            trace!("Sending to REPL: {line}");
            if let Err(err) = self.send_line(line) {
                return Err(self.write_failed(err));
            }
            self.wait_for_prompt(seen)?;
        }

        let mut output = self.shared.lock();
        Ok(std::mem::take(&mut output.buffer))
    }
}

impl Drop for ReplDriver {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Starts REPL sessions from a configuration and remembers the latest one so
/// that it can be killed on shutdown.
#[derive(Clone)]
pub struct ReplLauncher {
    config: ReplConfig,
    current: Arc<Mutex<Option<Arc<ReplDriver>>>>,
}

impl ReplLauncher {
    pub fn new(config: ReplConfig) -> Self {
        Self {
            config,
            current: Arc::new(Mutex::new(None)),
        }
    }

    /// Kills the current REPL session, if any.
    pub fn kill(&self) {
        if let Some(driver) = self.current.lock().unwrap().take() {
            info!("Stopping REPL process {}", driver.pid);
            driver.kill();
        }
    }
}

impl InterpreterFactory for ReplLauncher {
    fn launch(&self) -> crate::Result<Box<dyn Interpreter>> {
        let driver = Arc::new(ReplDriver::start(&self.config)?);
        *self.current.lock().unwrap() = Some(driver.clone());
        Ok(Box::new(driver))
    }
}

impl Interpreter for Arc<ReplDriver> {
    fn run_command(&self, code: &str) -> crate::Result<String> {
        self.as_ref().run_command(code)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use regex::Regex;

    use super::*;
    use crate::wire::language_info::LanguageInfo;

    /// A tiny line-oriented REPL: echoes statements back, treats a trailing
    /// backslash as a line continuation, and exits on `exit`.
    const FAKE_REPL: &str = r#"
printf 'Fake REPL 1.0\n'
while true; do
  printf 'repl> '
  IFS= read -r line || exit 0
  while case "$line" in *\\) true;; *) false;; esac; do
    printf '.... '
    IFS= read -r more || exit 0
    line="${line%\\}$more"
  done
  case "$line" in
    exit) exit 3;;
    *) printf 'out: %s\n' "$line";;
  esac
done
"#;

    fn fake_config() -> ReplConfig {
        ReplConfig {
            command: String::from("/bin/sh"),
            args: vec![String::from("-c"), String::from(FAKE_REPL)],
            prompt: Regex::new(r"^repl>\s*$").unwrap(),
            continuation_prompt: Regex::new(r"^\.\.\.\.\s*$").unwrap(),
            language_info: LanguageInfo::swift(),
            banner: String::from("Fake REPL"),
        }
    }

    #[test]
    fn test_run_command_returns_output_without_prompts() {
        let driver = ReplDriver::start(&fake_config()).unwrap();
        assert_eq!(driver.run_command("hello").unwrap(), "out: hello\n");
        assert_eq!(
            driver.run_command("one\n\n  two  \n").unwrap(),
            "out: one\nout: two\n"
        );
    }

    #[test]
    fn test_continuation_lines() {
        let driver = ReplDriver::start(&fake_config()).unwrap();
        assert_eq!(driver.run_command("foo\\\nbar").unwrap(), "out: foobar\n");

        // An unfinished statement leaves the REPL waiting for more
        assert_eq!(driver.run_command("baz\\").unwrap(), "");
        assert_eq!(driver.shared.lock().state, ReplState::AwaitingOutput);
        assert_eq!(driver.run_command("qux").unwrap(), "out: bazqux\n");
        assert_eq!(driver.shared.lock().state, ReplState::AwaitingPrompt);
    }

    /// Takes its time before showing the continuation prompt and complains if
    /// the next line was already typed ahead.
    const SLOW_CONTINUATION_REPL: &str = r#"
while true; do
  printf 'repl> '
  IFS= read -r line || exit 0
  while case "$line" in *\\) true;; *) false;; esac; do
    sleep 0.3
    if read -t 0; then printf 'typed ahead\n'; fi
    printf '.... '
    IFS= read -r more || exit 0
    line="${line%\\}$more"
  done
  printf 'out: %s\n' "$line"
done
"#;

    #[test]
    fn test_next_line_waits_for_continuation_prompt() {
        // `read -t 0` needs bash
        if !std::path::Path::new("/bin/bash").exists() {
            return;
        }
        let config = ReplConfig {
            command: String::from("/bin/bash"),
            args: vec![
                String::from("--noprofile"),
                String::from("--norc"),
                String::from("-c"),
                String::from(SLOW_CONTINUATION_REPL),
            ],
            ..fake_config()
        };
        let driver = ReplDriver::start(&config).unwrap();
        assert_eq!(
            driver.run_command("a\\\nb\\\nc").unwrap(),
            "out: abc\n"
        );
    }

    /// Prints `3.`, pauses, then finishes the line; `3.` alone looks like a
    /// Swift continuation prompt.
    const SPLIT_NUMBER_REPL: &str = r#"
while true; do
  printf '  1> '
  IFS= read -r line || exit 0
  printf '3.'
  sleep 0.3
  printf '14 %s\n' "$line"
done
"#;

    #[test]
    fn test_output_split_mid_line_is_not_a_prompt() {
        let config = ReplConfig::swift()
            .unwrap()
            .with_command("/bin/sh", vec![
                String::from("-c"),
                String::from(SPLIT_NUMBER_REPL),
            ]);
        let driver = ReplDriver::start(&config).unwrap();
        assert_eq!(driver.run_command("a").unwrap(), "3.14 a\n");
        assert_eq!(driver.run_command("b").unwrap(), "3.14 b\n");
    }

    #[test]
    fn test_kill_after_exit_signals_nothing() {
        let driver = ReplDriver::start(&fake_config()).unwrap();
        assert_matches!(
            driver.run_command("exit"),
            Err(Error::ReplProcessTerminated(_))
        );
        assert!(!driver.kill());
    }

    #[test]
    fn test_kill_running_repl() {
        let driver = ReplDriver::start(&fake_config()).unwrap();
        assert_eq!(driver.run_command("x").unwrap(), "out: x\n");
        assert!(driver.kill());
        assert_matches!(
            driver.run_command("y"),
            Err(Error::ReplProcessTerminated(_))
        );
        assert!(driver.shared.lock().terminated.is_some());
    }

    #[test]
    fn test_blank_code_produces_no_output() {
        let driver = ReplDriver::start(&fake_config()).unwrap();
        assert_eq!(driver.run_command("  \n").unwrap(), "");
    }

    #[test]
    fn test_termination_fails_current_and_later_commands() {
        let driver = ReplDriver::start(&fake_config()).unwrap();
        assert_matches!(
            driver.run_command("exit"),
            Err(Error::ReplProcessTerminated(_))
        );
        assert!(driver.shared.lock().terminated.is_some());
        assert_matches!(
            driver.run_command("hello"),
            Err(Error::ReplProcessTerminated(_))
        );
    }

    #[test]
    fn test_launcher_kill() {
        let launcher = ReplLauncher::new(fake_config());
        let interpreter = launcher.launch().unwrap();
        assert_eq!(interpreter.run_command("x").unwrap(), "out: x\n");

        launcher.kill();
        assert_matches!(
            interpreter.run_command("y"),
            Err(Error::ReplProcessTerminated(_))
        );
    }
}
