use std::os::fd::OwnedFd;
use std::os::unix::process::CommandExt;
use std::process::{Command, Stdio};

use nix::fcntl::OFlag;
use nix::unistd::{self, Pid};

use crate::builtins::{self, Builtin};
use crate::error::ShellError;
use crate::parser::{self, Pipeline};
use crate::signals;

use super::job_control::{restore_terminal, wait_for_pipeline};
use super::redirect::{open_stdin_redirect, open_stdout_redirect};
use super::state::{ExecutionResult, ShellState};

// ── Evaluator ─────────────────────────────────────────────────────────────

/// Evaluate one input line: tokenize, recognize builtins, parse the
/// pipeline, run it.
///
/// A blank or whitespace-only line is a no-op. `quit` asks the read loop
/// to exit before any process is spawned.
pub fn evaluate(line: &str, state: &mut ShellState) -> Result<ExecutionResult, ShellError> {
    let (tokens, background) = parser::tokenize(line);
    if tokens.is_empty() {
        return Ok(ExecutionResult::KeepRunning);
    }

    // Builtins are matched after tokenization so that quoted and
    // `&`-stripped spellings are recognized.
    if let Some(Builtin::Quit) = builtins::lookup(&tokens[0]) {
        return Ok(ExecutionResult::Exit);
    }

    let commands = parser::parse_pipeline(tokens)?;
    if commands.is_empty() {
        return Ok(ExecutionResult::KeepRunning);
    }

    let pipeline = Pipeline { commands, background };
    state.last_status = run_pipeline(&pipeline, state)?;
    Ok(ExecutionResult::KeepRunning)
}

// ── Process orchestrator ──────────────────────────────────────────────────

/// Spawn every stage of a pipeline, then reap them all.
///
/// Adjacent stages are connected by one pipe each; explicit redirections
/// are applied after pipe wiring so they take precedence on that stream.
/// All stages share one process group whose id is the first child's pid:
/// each child sets its own group membership before exec, and the parent
/// sets it again as soon as it learns the pid, so the group exists no
/// matter which side runs first.
///
/// Every stage is spawned before any is waited on; waiting earlier could
/// stall the pipeline once a pipe buffer fills with no reader attached.
/// Returns the exit status of the last stage.
///
/// A stage that fails to spawn is reported and skipped without disturbing
/// its siblings. Failure to create a pipe or open a redirect file abandons
/// the stages not yet spawned and surfaces as a [`ShellError::Resource`]
/// once the already-running stages have been reaped.
pub fn run_pipeline(pipeline: &Pipeline, state: &mut ShellState) -> Result<i32, ShellError> {
    let cmds = &pipeline.commands;
    let last_idx = cmds.len() - 1;
    let foreground = !pipeline.background;

    let mut spawned: Vec<Pid> = Vec::with_capacity(cmds.len());
    let mut pgid: Option<Pid> = None;
    let mut prev_read: Option<OwnedFd> = None;
    let mut launch_err: Option<ShellError> = None;
    let mut last_spawn_failed = false;

    for (i, cmd) in cmds.iter().enumerate() {
        let Some(name) = cmd.name() else { continue };

        let mut command = Command::new(name);
        command.args(&cmd.args[1..]);

        // Stdin from the previous stage's pipe, unless this is the first stage.
        if let Some(read_end) = prev_read.take() {
            command.stdin(Stdio::from(read_end));
        }

        // Stdout into a fresh pipe, unless this is the last stage. The read
        // end is kept for the next stage only; the write end moves into the
        // child and our copy closes with `command` at the end of this
        // iteration, so downstream readers can see end-of-stream. The ends
        // are close-on-exec: the parent still holds `next_read` while this
        // child execs, and a stray copy of it in the child would stop the
        // writer from ever seeing its reader exit. The dup2 onto the
        // child's stdio during spawn clears the flag on the wired copies.
        let mut next_read: Option<OwnedFd> = None;
        if i != last_idx {
            match unistd::pipe2(OFlag::O_CLOEXEC) {
                Ok((read_end, write_end)) => {
                    command.stdout(Stdio::from(write_end));
                    next_read = Some(read_end);
                }
                Err(err) => {
                    launch_err = Some(ShellError::resource("pipe", err));
                    break;
                }
            }
        }

        // Explicit redirections are applied after pipe wiring and override it.
        if let Some(path) = &cmd.stdin_redir {
            match open_stdin_redirect(path) {
                Ok(f) => {
                    command.stdin(Stdio::from(f));
                }
                Err(err) => {
                    launch_err = Some(err);
                    break;
                }
            }
        }
        if let Some(path) = &cmd.stdout_redir {
            match open_stdout_redirect(path) {
                Ok(f) => {
                    command.stdout(Stdio::from(f));
                }
                Err(err) => {
                    launch_err = Some(err);
                    break;
                }
            }
        }

        // The first stage's pid becomes the group id; later stages learn it
        // here, before they are spawned, and join it themselves pre-exec.
        let target_pgid = pgid;
        let result = unsafe {
            command
                .pre_exec(move || {
                    let pid = unistd::getpid();
                    let group = target_pgid.unwrap_or(pid);
                    let _ = unistd::setpgid(pid, group);
                    if foreground {
                        let stdin = std::os::fd::BorrowedFd::borrow_raw(nix::libc::STDIN_FILENO);
                        let stderr = std::os::fd::BorrowedFd::borrow_raw(nix::libc::STDERR_FILENO);
                        let stdout = std::os::fd::BorrowedFd::borrow_raw(nix::libc::STDOUT_FILENO);
                        let _ = unistd::tcsetpgrp(stdin, group)
                            .or_else(|_| unistd::tcsetpgrp(stderr, group))
                            .or_else(|_| unistd::tcsetpgrp(stdout, group));
                    }
                    signals::restore_default();
                    Ok(())
                })
                .spawn()
        };

        match result {
            Ok(child) => {
                let pid = Pid::from_raw(child.id() as i32);
                // Parent side of the group handshake; harmless if the child
                // already joined pre-exec.
                let group = *pgid.get_or_insert(pid);
                let _ = unistd::setpgid(pid, group);
                spawned.push(pid);
            }
            Err(err) => {
                if err.kind() == std::io::ErrorKind::NotFound {
                    eprintln!("tsh: command not found: {}", name);
                } else {
                    eprintln!("tsh: failed to run '{}': {}", name, err);
                }
                last_spawn_failed = i == last_idx;
            }
        }

        prev_read = next_read;
    }

    // Close our copy of any dangling read end before waiting, so upstream
    // writers are not kept alive by the shell.
    drop(prev_read);

    let codes = match pgid {
        Some(pgid) => wait_for_pipeline(pgid, &spawned),
        None => Vec::new(),
    };

    if foreground {
        restore_terminal(state);
    }

    if let Some(err) = launch_err {
        return Err(err);
    }

    if last_spawn_failed {
        return Ok(127);
    }
    Ok(codes.last().copied().unwrap_or(0))
}

// ── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn eval(line: &str) -> (Result<ExecutionResult, ShellError>, ShellState) {
        let mut state = ShellState::new();
        let res = evaluate(line, &mut state);
        (res, state)
    }

    #[test]
    fn test_blank_line_is_noop() {
        let (res, state) = eval("   \n");
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 0);
    }

    #[test]
    fn test_quit_requests_exit() {
        let (res, _) = eval("quit");
        assert!(matches!(res, Ok(ExecutionResult::Exit)));
    }

    #[test]
    fn test_quoted_quit_is_recognized() {
        let (res, _) = eval("'quit' &");
        assert!(matches!(res, Ok(ExecutionResult::Exit)));
    }

    #[test]
    fn test_output_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let (res, state) = eval(&format!("echo hello > {}", out.display()));
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello\n");
    }

    #[test]
    fn test_input_redirect() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let out = dir.path().join("out.txt");
        fs::write(&input, "alpha\nbeta\n").unwrap();
        let (res, _) = eval(&format!("cat < {} > {}", input.display(), out.display()));
        assert!(res.is_ok());
        assert_eq!(fs::read_to_string(&out).unwrap(), "alpha\nbeta\n");
    }

    #[test]
    fn test_three_stage_pipeline() {
        // Data must cross both pipes and end-of-stream must propagate, or
        // the middle `cat` would never terminate.
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let (res, state) = eval(&format!("echo hello | cat | cat > {}", out.display()));
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "hello\n");
    }

    #[test]
    fn test_reader_exiting_early_does_not_stall_writer() {
        // `head` exits after one line while `yes` is still writing. The
        // writer only sees its reader go away if no stray copy of the
        // pipe's read end leaked into another process, so this pipeline
        // terminating at all is the assertion.
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let (res, state) = eval(&format!("yes y | head -n 1 > {}", out.display()));
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "y\n");
    }

    #[test]
    fn test_redirect_overrides_pipe() {
        // The last stage reads from its `<` file, not the pipe.
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.txt");
        let out = dir.path().join("out.txt");
        fs::write(&input, "from-file\n").unwrap();
        let (res, _) = eval(&format!(
            "echo from-pipe | cat < {} > {}",
            input.display(),
            out.display()
        ));
        assert!(res.is_ok());
        assert_eq!(fs::read_to_string(&out).unwrap(), "from-file\n");
    }

    #[test]
    fn test_last_stage_status_is_collected() {
        let (res, state) = eval("sh -c 'exit 3'");
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 3);
    }

    #[test]
    fn test_pipeline_reports_last_stage_status() {
        let mut state = ShellState::new();
        let (tokens, background) = parser::tokenize("sh -c 'exit 1' | sh -c 'exit 2'");
        let commands = parser::parse_pipeline(tokens).unwrap();
        let pipeline = Pipeline { commands, background };
        assert_eq!(run_pipeline(&pipeline, &mut state).unwrap(), 2);
    }

    #[test]
    fn test_children_get_default_sigpipe() {
        // The shell itself ignores SIGPIPE; children must not inherit that
        // or a writer with a vanished reader spins on EPIPE instead of
        // dying. A child that signals itself only terminates (128 + 13)
        // if the default disposition was restored before exec.
        let (res, state) = eval("sh -c 'kill -s PIPE $$'");
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 128 + nix::sys::signal::Signal::SIGPIPE as i32);
    }

    #[test]
    fn test_command_not_found_is_not_fatal() {
        let (res, state) = eval("definitely-not-a-command-xyzzy");
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 127);
    }

    #[test]
    fn test_failed_stage_does_not_abort_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let (res, state) = eval(&format!(
            "definitely-not-a-command-xyzzy | echo ok > {}",
            out.display()
        ));
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(state.last_status, 0);
        assert_eq!(fs::read_to_string(&out).unwrap(), "ok\n");
    }

    #[test]
    fn test_missing_input_file_is_resource_error() {
        let (res, _) = eval("cat < /definitely/not/a/file");
        assert!(matches!(res, Err(ShellError::Resource { .. })));
    }

    #[test]
    fn test_background_pipeline_is_still_waited_on() {
        // The `&` marker is parsed but the synchronous design waits anyway,
        // so the file is complete by the time evaluate returns.
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let (res, _) = eval(&format!("echo done > {} &", out.display()));
        assert!(matches!(res, Ok(ExecutionResult::KeepRunning)));
        assert_eq!(fs::read_to_string(&out).unwrap(), "done\n");
    }

    #[test]
    fn test_dangling_pipe_is_reported_before_spawning() {
        let (res, state) = eval("ls |");
        assert!(matches!(res, Err(ShellError::Syntax { operator: "|" })));
        assert_eq!(state.last_status, 0);
    }
}
