/*
 * pty.rs
 *
 * Copyright (C) 2026 Posit Software, PBC. All rights reserved.
 *
 */

use std::fs::File;
use std::os::fd::OwnedFd;
use std::os::unix::process::CommandExt;
use std::process::Child;
use std::process::Command;
use std::process::Stdio;

use nix::fcntl::fcntl;
use nix::fcntl::FcntlArg;
use nix::fcntl::FdFlag;
use nix::pty::openpty;
use nix::pty::OpenptyResult;
use nix::sys::termios::tcgetattr;
use nix::sys::termios::tcsetattr;
use nix::sys::termios::LocalFlags;
use nix::sys::termios::SetArg;

use crate::error::Error;

/// A child process attached to the slave end of a pseudo-terminal.
pub struct PtyProcess {
    /// Master end of the terminal; reads return the child's output and writes
    /// become its input
    pub master: File,

    pub child: Child,
}

/// Spawns `command` with its standard streams on a fresh pseudo-terminal.
/// Echo is turned off so the master only sees what the child prints.
pub fn spawn(command: &str, args: &[String]) -> crate::Result<PtyProcess> {
    let OpenptyResult { master, slave } = openpty(None, None).map_err(Error::ReplPtyError)?;

    let mut termios = tcgetattr(&master).map_err(Error::ReplPtyError)?;
    termios.local_flags.remove(LocalFlags::ECHO);
    tcsetattr(&master, SetArg::TCSANOW, &termios).map_err(Error::ReplPtyError)?;

    // The child only gets the slave end
    fcntl(&master, FcntlArg::F_SETFD(FdFlag::FD_CLOEXEC)).map_err(Error::ReplPtyError)?;

    let stdio = |fd: &OwnedFd| match fd.try_clone() {
        Ok(fd) => Ok(Stdio::from(fd)),
        Err(err) => Err(Error::ReplSpawnFailed(String::from(command), err)),
    };

    let mut cmd = Command::new(command);
    cmd.args(args)
        .env("TERM", "dumb")
        .stdin(stdio(&slave)?)
        .stdout(stdio(&slave)?)
        .stderr(Stdio::from(slave))
        // Own process group, so it can be killed as a whole and doesn't see
        // signals aimed at the kernel's terminal
        .process_group(0);

    let child = match cmd.spawn() {
        Ok(child) => child,
        Err(err) => return Err(Error::ReplSpawnFailed(String::from(command), err)),
    };

    // Drop our copies of the slave so reads on the master fail once the
    // child is gone
    drop(cmd);

    log::info!("Started REPL '{command}' (pid {})", child.id());

    Ok(PtyProcess {
        master: File::from(master),
        child,
    })
}
