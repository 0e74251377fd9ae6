// ── Parsed command types ──────────────────────────────────────────────────

/// One stage of a pipeline: the program name plus its arguments, with any
/// redirection operators and their filename operands already excised.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct ParsedCommand {
    /// `args[0]` is the program name. May be empty for degenerate input
    /// like `| foo`; the orchestrator skips such stages.
    pub args: Vec<String>,
    /// `< file` — read stdin from this file instead of the pipe/console.
    pub stdin_redir: Option<String>,
    /// `> file` — write stdout to this file instead of the pipe/console.
    pub stdout_redir: Option<String>,
}

impl ParsedCommand {
    /// The program name, if this stage has one.
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// A full pipeline: one or more commands connected left-to-right by `|`,
/// plus the trailing-`&` background marker.
///
/// The background flag is parsed and recorded but the orchestrator still
/// waits for every stage; it only controls whether the pipeline is handed
/// the terminal.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Pipeline {
    pub commands: Vec<ParsedCommand>,
    pub background: bool,
}
