use std::os::fd::RawFd;

use nix::unistd::{self, Pid};

/// What the read loop should do after evaluating a line.
pub enum ExecutionResult {
    KeepRunning,
    Exit,
}

/// Per-shell bookkeeping the orchestrator needs to hand the terminal to a
/// foreground pipeline and take it back afterwards.
pub struct ShellState {
    /// The shell's own process group, restored to the terminal once a
    /// foreground pipeline has been reaped.
    pub shell_pgid: Pid,
    /// The controlling terminal's descriptor, if the shell has one.
    pub shell_term: Option<RawFd>,
    /// Exit status of the last stage of the last pipeline.
    pub last_status: i32,
}

impl ShellState {
    pub fn new() -> Self {
        ShellState {
            shell_pgid: unistd::getpgrp(),
            shell_term: Some(nix::libc::STDIN_FILENO),
            last_status: 0,
        }
    }
}
