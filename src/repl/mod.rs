//! Interactive question prompt
//!
//! Reads one question at a time and answers it before reading the next.

pub mod commands;
pub mod input;

use anyhow::Result;
use colored::*;
use std::path::PathBuf;

use crate::cli::display::show_outcome;
use crate::rag::{AnswerParams, RAGPipeline};
use crate::repl::commands::{parse, show_help, Command};
use crate::repl::input::{Input, InputHandler};

/// REPL session coordinator
pub struct ReplSession {
    input_handler: InputHandler,
    show_context: bool,
}

impl ReplSession {
    /// Create new REPL session without history
    pub fn new(show_context: bool) -> Result<Self> {
        Ok(Self {
            input_handler: InputHandler::new()?,
            show_context,
        })
    }

    /// Create REPL session with persistent history
    pub fn with_history(history_path: PathBuf, show_context: bool) -> Result<Self> {
        Ok(Self {
            input_handler: InputHandler::with_history(history_path)?,
            show_context,
        })
    }

    /// Show welcome banner
    pub fn show_banner(&self, passages: usize, model: &str) {
        let width = 60;
        println!("\n{}", "=".repeat(width).cyan());
        println!("{}", "  Computer Science Q&A (RAG)".bold().cyan());
        println!("{}", format!("  Model: {} | Passages: {}", model, passages).dimmed());
        println!("{}\n", "=".repeat(width).cyan());
        println!(
            "Ask a question (or {} for commands, {} to quit)\n",
            "/help".green(),
            "/exit".green()
        );
    }

    /// Apply a parsed command; returns false when the loop should stop
    pub fn handle_command(&mut self, command: &Command) -> bool {
        match command {
            Command::Help => show_help(),
            Command::Exit => return false,
            Command::Context { enable } => {
                self.show_context = enable.unwrap_or(!self.show_context);
                let state = if self.show_context { "on" } else { "off" };
                println!("Context diagnostics {}", state.bold());
            }
            Command::Unknown { input } => {
                println!("{} {}", "Unknown command:".yellow(), input);
            }
            Command::Question(_) => {}
        }
        true
    }

    /// Run the read-eval-print loop until /exit or Ctrl-D
    pub async fn run(&mut self, pipeline: &RAGPipeline, params: &AnswerParams) -> Result<()> {
        loop {
            let line = match self.input_handler.read_line()? {
                Input::Line(line) => line,
                Input::Interrupted => continue,
                Input::Eof => break,
            };

            if line.is_empty() {
                continue;
            }

            match parse(&line) {
                Command::Question(question) => {
                    let outcome = pipeline.run(&question, params).await;
                    show_outcome(&question, &outcome, self.show_context);
                }
                command => {
                    if !self.handle_command(&command) {
                        break;
                    }
                }
            }
        }

        self.input_handler.save_history()?;
        Ok(())
    }
}
