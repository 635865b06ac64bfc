//! Vector index
//!
//! Holds one embedding per corpus passage, built once at startup and
//! read-only afterwards.

pub mod vector_index;

pub use vector_index::{IndexEntry, ScoredPassage, VectorIndex, BUILD_BATCH_SIZE};
