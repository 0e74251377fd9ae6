mod ast;
mod lexer;

pub use ast::{ParsedCommand, Pipeline};

use crate::error::ShellError;

// ── Public API ────────────────────────────────────────────────────────────

/// Split one input line into argument tokens.
///
/// Single-quoted spans are atomic tokens with their spaces preserved; an
/// unquoted token extends to the next whitespace. At most one trailing
/// newline is stripped. If the final token is exactly `&` it is removed
/// and reported through the second element of the returned pair.
///
/// An empty token list means a blank line; the caller treats it as a
/// no-op, not an error.
pub fn tokenize(line: &str) -> (Vec<String>, bool) {
    let mut rest = line.strip_suffix('\n').unwrap_or(line);

    let mut tokens: Vec<String> = Vec::new();
    while let Ok((after, tok)) = lexer::token(rest) {
        // `''` lexes to an empty string; drop it so no token is empty.
        if !tok.is_empty() {
            tokens.push(tok);
        }
        rest = after;
    }

    let background = tokens.last().is_some_and(|t| t == "&");
    if background {
        tokens.pop();
    }

    (tokens, background)
}

/// Partition a token sequence into pipeline stages.
///
/// `|` closes the current command and opens the next; `<` and `>` consume
/// the following token as a redirection filename for the current command,
/// wherever they appear in its span. Everything else stays in the current
/// command's argument list in order.
///
/// Fails only when an operator is the final token.
pub fn parse_pipeline(tokens: Vec<String>) -> Result<Vec<ParsedCommand>, ShellError> {
    let mut commands: Vec<ParsedCommand> = Vec::new();
    if tokens.is_empty() {
        return Ok(commands);
    }

    let mut current = ParsedCommand::default();
    let mut iter = tokens.into_iter().peekable();

    while let Some(tok) = iter.next() {
        match tok.as_str() {
            "|" => {
                if iter.peek().is_none() {
                    return Err(ShellError::syntax("|"));
                }
                commands.push(std::mem::take(&mut current));
            }
            "<" => {
                current.stdin_redir = Some(iter.next().ok_or_else(|| ShellError::syntax("<"))?);
            }
            ">" => {
                current.stdout_redir = Some(iter.next().ok_or_else(|| ShellError::syntax(">"))?);
            }
            _ => current.args.push(tok),
        }
    }
    commands.push(current);

    Ok(commands)
}

// ── Tests ──────────────────────────────────────────────────────────────────
