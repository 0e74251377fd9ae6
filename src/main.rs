mod builtins;
mod engine;
mod error;
mod parser;
mod signals;

use std::env;

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use engine::{ExecutionResult, ShellState};

struct Options {
    emit_prompt: bool,
}

fn parse_options() -> Options {
    let mut opts = Options { emit_prompt: true };
    for arg in env::args().skip(1) {
        match arg.as_str() {
            "-p" => opts.emit_prompt = false,
            "-h" => {
                usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("tsh: unknown option: {}", other);
                usage();
                std::process::exit(1);
            }
        }
    }
    opts
}

fn usage() {
    println!("Usage: tsh [-hp]");
    println!("   -h   print this message");
    println!("   -p   do not emit a command prompt");
}

fn get_prompt() -> String {
    let cwd = env::current_dir().unwrap_or_else(|_| std::path::PathBuf::from("."));
    let home = dirs::home_dir();

    let path_str = if let Some(home) = home {
        if cwd.starts_with(&home) {
            let relative = cwd.strip_prefix(&home).unwrap();
            if relative.as_os_str().is_empty() {
                "~".to_string()
            } else {
                format!("~/{}", relative.display())
            }
        } else {
            cwd.display().to_string()
        }
    } else {
        cwd.display().to_string()
    };

    format!("tsh {} > ", path_str)
}

fn main() -> rustyline::Result<()> {
    let opts = parse_options();
    signals::init();
    let mut rl = DefaultEditor::new()?;
    let mut state = ShellState::new();

    loop {
        let prompt = if opts.emit_prompt {
            get_prompt()
        } else {
            String::new()
        };
        match rl.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(input);

                match engine::evaluate(input, &mut state) {
                    Ok(ExecutionResult::Exit) => break,
                    Ok(ExecutionResult::KeepRunning) => {}
                    Err(err) => eprintln!("tsh: {}", err),
                }
            }
            Err(ReadlineError::Interrupted) => {
                continue;
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                eprintln!("tsh: {:?}", err);
                break;
            }
        }
    }
    Ok(())
}
