use nom::{
    branch::alt,
    bytes::complete::{is_not, take_till},
    character::complete::{char, multispace0},
    combinator::opt,
    sequence::preceded,
    IResult,
    Parser,
};

// ── Low-level nom parsers ──────────────────────────────────────────────────

/// A single-quoted span: `'a b'` → `a b`. Embedded spaces are preserved
/// and the quotes themselves are consumed.
///
/// A missing closing quote extends the span to the end of the input.
/// Matches the historical behaviour; no escape sequences, no recovery.
fn quoted_span(input: &str) -> IResult<&str, String> {
    let (input, content) = preceded(char('\''), take_till(|c| c == '\'')).parse(input)?;
    let (input, _) = opt(char('\'')).parse(input)?;
    Ok((input, content.to_string()))
}

/// An unquoted word extends to the next whitespace. Operators are not
/// special here: `|`, `<`, `>` and `&` are recognized at the token level,
/// so they must stand alone as whitespace-delimited tokens.
fn bare_word(input: &str) -> IResult<&str, String> {
    let (input, content) = is_not(" \t\r\n")(input)?;
    Ok((input, content.to_string()))
}

/// One token, skipping any leading whitespace.
pub fn token(input: &str) -> IResult<&str, String> {
    preceded(multispace0, alt((quoted_span, bare_word))).parse(input)
}
