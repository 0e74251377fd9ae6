use nix::sys::signal::{signal, SigHandler, Signal};

/// Initialize shell signal handlers.
pub fn init() {
    unsafe {
        // The shell ignores the keyboard-generated signals so that Ctrl+C,
        // Ctrl+\ and Ctrl+Z only reach the foreground pipeline's process
        // group. Rustyline overrides SIGINT during readline(), which is fine.
        signal(Signal::SIGINT, SigHandler::SigIgn).expect("Failed to ignore SIGINT");
        signal(Signal::SIGQUIT, SigHandler::SigIgn).expect("Failed to ignore SIGQUIT");
        signal(Signal::SIGTSTP, SigHandler::SigIgn).expect("Failed to ignore SIGTSTP");
        signal(Signal::SIGTTIN, SigHandler::SigIgn).expect("Failed to ignore SIGTTIN");
        signal(Signal::SIGTTOU, SigHandler::SigIgn).expect("Failed to ignore SIGTTOU");
    }
}

/// Restore default signal handlers (for child processes, pre-exec).
pub fn restore_default() {
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
        let _ = signal(Signal::SIGQUIT, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTSTP, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTTIN, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTTOU, SigHandler::SigDfl);
        // The Rust runtime ignores SIGPIPE in the shell process and the
        // disposition survives exec; a pipeline writer must get the
        // default kill-on-SIGPIPE behaviour back.
        let _ = signal(Signal::SIGPIPE, SigHandler::SigDfl);
    }
}
