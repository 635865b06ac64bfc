//! Corpus loading
//!
//! Turns an intents JSON document into cleaned passages ready for indexing.

pub mod cleaner;
pub mod loader;

pub use cleaner::{clean_text, format_passage};
pub use loader::{count_tags, load_intents, Intent, IntentsFile, Passage};
