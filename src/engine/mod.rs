mod execution;
mod job_control;
mod redirect;
mod state;

// Re-export the public API so that `main.rs` can keep using
// `engine::ShellState`, `engine::evaluate`, etc.
pub use execution::evaluate;
pub use state::{ExecutionResult, ShellState};
