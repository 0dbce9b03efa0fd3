//! Round orchestration.
//!
//! Every challenge round walks the same phases in order:
//!
//! ```text
//! Announce -> Collect -> Judge -> Settle -> Persist -> Done
//! ```
//!
//! Collection is the only concurrent phase; its results are merged back in
//! roster order before anything else reads them, so a round's outcome does
//! not depend on which backend answered first.

mod orchestrator;
mod record;

pub use orchestrator::{resolve_verdict, RoundOrchestrator};
pub use record::{JudgingOutcome, ResponseEntry, RoundKind, RoundRecord};

use std::fmt;

use serde::{Deserialize, Serialize};

/// Phase of a single round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    /// Challenge selection
    Announce,
    /// Prompt building and concurrent generation
    Collect,
    /// Best/worst determination
    Judge,
    /// Levels, tokens, eliminations
    Settle,
    /// Record written
    Persist,
    /// Round complete
    Done,
}

impl fmt::Display for RoundPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RoundPhase::Announce => "announce",
            RoundPhase::Collect => "collect",
            RoundPhase::Judge => "judge",
            RoundPhase::Settle => "settle",
            RoundPhase::Persist => "persist",
            RoundPhase::Done => "done",
        };
        f.write_str(name)
    }
}
