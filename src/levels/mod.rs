//! Performance level table.
//!
//! Maps an integer level to the generation settings used for a
//! participant's responses:
//!
//! | Level | Max tokens | Temperature | Cognitive load |
//! |-------|------------|-------------|----------------|
//! | -5    | 75         | 2.2         | heavy          |
//! | -1    | 500        | 1.2         | light          |
//! | 0     | 1000       | 0.7         | none           |
//! | +3    | 2500       | 0.2         | none           |
//!
//! The table is static and never mutated at runtime.

mod table;

pub use table::{
    GenerationConfig, LevelTier, PerformanceLevelTable, BASELINE_LEVEL,
    DEFAULT_ELIMINATION_THRESHOLD, MAX_LEVEL, MIN_LEVEL, SABOTAGE_LOAD,
};
