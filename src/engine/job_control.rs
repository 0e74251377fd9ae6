use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use super::state::ShellState;

/// Put the shell back in the foreground.
pub fn restore_terminal(state: &ShellState) {
    if let Some(term) = state.shell_term {
        let fd = unsafe { std::os::fd::BorrowedFd::borrow_raw(term) };
        let _ = nix::unistd::tcsetpgrp(fd, state.shell_pgid);
    }
}

/// Reap every process of one pipeline's group, collecting exit codes.
///
/// `pids` lists the spawned stages in pipeline order and the returned
/// codes line up with it. Children are collected in whatever order they
/// terminate; the loop runs until all of them are accounted for. A child
/// killed by a signal records `128 + signo`, shell convention. A stage
/// that could not be reaped at all (waitpid failed, ECHILD included)
/// records a failure rather than a silent `0`.
pub fn wait_for_pipeline(pgid: Pid, pids: &[Pid]) -> Vec<i32> {
    let mut codes: Vec<Option<i32>> = vec![None; pids.len()];
    let mut reaped = 0;

    while reaped < pids.len() {
        // Wait on the pipeline's group only, so nothing outside it is reaped.
        match waitpid(Pid::from_raw(-pgid.as_raw()), None) {
            Ok(WaitStatus::Exited(pid, code)) => {
                record(pids, &mut codes, pid, code);
                reaped += 1;
            }
            Ok(WaitStatus::Signaled(pid, sig, _)) => {
                record(pids, &mut codes, pid, 128 + sig as i32);
                reaped += 1;
            }
            Ok(_) => {}
            Err(Errno::EINTR) => {}
            Err(_) => break,
        }
    }

    codes.into_iter().map(|c| c.unwrap_or(1)).collect()
}

fn record(pids: &[Pid], codes: &mut [Option<i32>], pid: Pid, code: i32) {
    if let Some(i) = pids.iter().position(|&p| p == pid) {
        codes[i] = Some(code);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreaped_stage_reports_failure() {
        // A group id with no children behind it: waitpid fails with ECHILD
        // right away and the stage can never be accounted for.
        let ghost = Pid::from_raw(999_999);
        assert_eq!(wait_for_pipeline(ghost, &[ghost]), vec![1]);
    }
}
