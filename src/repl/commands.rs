//! Built-in REPL commands

use colored::*;

/// REPL command types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    /// Toggle, or set, retrieval diagnostics
    Context { enable: Option<bool> },
    /// Anything not starting with `/` is a question
    Question(String),
    Unknown { input: String },
}

/// Check whether input is a slash command
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with('/')
}

/// Parse input string into a command
pub fn parse(input: &str) -> Command {
    let trimmed = input.trim();

    if !is_command(trimmed) {
        return Command::Question(trimmed.to_string());
    }

    let parts: Vec<&str> = trimmed[1..].split_whitespace().collect();
    let Some(name) = parts.first() else {
        return Command::Unknown { input: trimmed.to_string() };
    };

    match name.to_lowercase().as_str() {
        "help" | "h" => Command::Help,
        "exit" | "quit" | "q" => Command::Exit,
        "context" | "ctx" => {
            let enable = parts.get(1).map(|s| {
                let s = s.to_lowercase();
                s == "on" || s == "1" || s == "true"
            });
            Command::Context { enable }
        }
        _ => Command::Unknown { input: trimmed.to_string() },
    }
}

/// Print the command summary
pub fn show_help() {
    println!("\n{}", "Commands:".bold());
    println!("  {}          Show this help", "/help".green());
    println!("  {} [on|off] Toggle retrieved-passage diagnostics", "/context".green());
    println!("  {}          Leave the prompt", "/exit".green());
    println!("\nAnything else is answered as a question.\n");
}
