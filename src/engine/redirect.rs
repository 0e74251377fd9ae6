use std::fs::File;

use crate::error::ShellError;

/// Open the file named by a `< file` redirect for reading.
pub fn open_stdin_redirect(path: &str) -> Result<File, ShellError> {
    File::open(path).map_err(|e| ShellError::resource(path, e))
}

/// Open (create or truncate) the file named by a `> file` redirect.
pub fn open_stdout_redirect(path: &str) -> Result<File, ShellError> {
    File::create(path).map_err(|e| ShellError::resource(path, e))
}
