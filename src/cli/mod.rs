//! CLI module for csqa
//!
//! Handles command-line argument parsing and terminal output.

pub mod args;
pub mod display;

pub use args::{Args, Commands, Verbosity};
pub use display::{format_report, preview, show_outcome};
