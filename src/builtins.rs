/// The shell's built-in commands.
///
/// `tsh` has exactly one: `quit`, which terminates the shell with success.
/// Recognition happens on the first token of a line, after tokenization,
/// so `'quit'` and `quit &` are matched too.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Builtin {
    Quit,
}

pub fn lookup(name: &str) -> Option<Builtin> {
    match name {
        "quit" => Some(Builtin::Quit),
        _ => None,
    }
}
