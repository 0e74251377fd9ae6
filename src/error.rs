use std::fmt;
use std::io;

/// Errors that abort evaluation of a single input line.
///
/// None of these are fatal to the shell itself: the read loop prints the
/// message and moves on to the next line. Exec failure of one pipeline
/// stage is reported where it happens and never surfaces here, since it
/// must not abort sibling stages.
#[derive(Debug)]
pub enum ShellError {
    /// A `|`, `<`, or `>` operator with no token after it.
    Syntax { operator: &'static str },
    /// A pipe or redirect file could not be created while setting up a
    /// pipeline. Stages not yet spawned are abandoned.
    Resource { context: String, source: io::Error },
}

impl ShellError {
    pub fn syntax(operator: &'static str) -> Self {
        ShellError::Syntax { operator }
    }

    pub fn resource(context: impl Into<String>, source: impl Into<io::Error>) -> Self {
        ShellError::Resource {
            context: context.into(),
            source: source.into(),
        }
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Syntax { operator } => {
                write!(f, "syntax error: missing operand after `{}'", operator)
            }
            ShellError::Resource { context, source } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Resource { source, .. } => Some(source),
            _ => None,
        }
    }
}
