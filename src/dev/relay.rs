// Relaying a background child's output until it exits or we're interrupted
use crate::dev::cancel::CancellationToken;
use anyhow::{Context, Result};
use std::io::{BufRead, BufReader, Read, Write};
use std::process::{Child, ExitStatus};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

const POLL: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayEnd {
    /// The child finished on its own
    Exited(ExitStatus),
    /// Cancelled; the child has been terminated and reaped
    Interrupted,
}

/// Take the child's piped stdout/stderr and forward their lines into one channel.
/// Reader threads keep draining the pipes even while nobody is receiving yet.
pub fn capture_lines(child: &mut Child) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    if let Some(stdout) = child.stdout.take() {
        forward_lines(stdout, tx.clone());
    }
    if let Some(stderr) = child.stderr.take() {
        forward_lines(stderr, tx);
    }
    rx
}

fn forward_lines(reader: impl Read + Send + 'static, tx: Sender<String>) {
    thread::spawn(move || {
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
}

/// Copy lines to `out` until both pipes close and the child exits, or until `cancel` trips
pub fn relay(
    child: &mut Child,
    lines: &Receiver<String>,
    cancel: &CancellationToken,
    out: &mut impl Write,
) -> Result<RelayEnd> {
    loop {
        if cancel.is_cancelled() {
            stop_child(child)?;
            return Ok(RelayEnd::Interrupted);
        }
        match lines.recv_timeout(POLL) {
            Ok(line) => {
                writeln!(out, "{}", line).context("Failed to write server output")?;
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    // Output is closed; the process may still be shutting down. A terminal Ctrl-C
    // reaches the child as well, so its death can beat the handler setting the token.
    loop {
        let exited = child.try_wait().context("Failed to poll dev server")?;
        if cancel.is_cancelled() {
            stop_child(child)?;
            return Ok(RelayEnd::Interrupted);
        }
        match exited {
            Some(status) if may_be_ctrl_c(status) && !cancel.sleep(POLL) => {
                stop_child(child)?;
                return Ok(RelayEnd::Interrupted);
            }
            Some(status) => return Ok(RelayEnd::Exited(status)),
            None => {
                cancel.sleep(POLL);
            }
        }
    }
}

/// Killed by a signal, or the exit code shells and Node use after SIGINT
/// (128 + 2), or Windows' STATUS_CONTROL_C_EXIT
fn may_be_ctrl_c(status: ExitStatus) -> bool {
    matches!(status.code(), None | Some(130) | Some(-1073741510))
}

/// Ask the child to terminate, then block until it has exited
pub fn stop_child(child: &mut Child) -> Result<ExitStatus> {
    if child.try_wait()?.is_none() {
        terminate(child)?;
    }
    child.wait().context("Failed to wait for dev server to exit")
}

#[cfg(unix)]
fn terminate(child: &mut Child) -> Result<()> {
    use nix::errno::Errno;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid;

    let pid = Pid::from_raw(child.id() as i32);
    match signal::kill(pid, Signal::SIGTERM) {
        Ok(()) | Err(Errno::ESRCH) => Ok(()),
        Err(err) => Err(err).context("Failed to send SIGTERM to dev server"),
    }
}

#[cfg(not(unix))]
fn terminate(child: &mut Child) -> Result<()> {
    child.kill().context("Failed to stop dev server")
}
