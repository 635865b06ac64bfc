// Re-ranking Module
pub mod scorer;

pub use scorer::{RankedPassage, ReRankConfig, ReRanker};
