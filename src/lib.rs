//! # Elimination - multi-agent LLM elimination tournament engine
//!
//! Runs seasons of rounds in which language-model participants answer a
//! challenge, a judge ranks the answers, and the outcome feeds a
//! performance-level state machine and a token economy. Falling too far
//! eliminates a participant.
//!
//! ## Features
//!
//! - **Performance levels**: each level fixes a response budget, a
//!   temperature and an optional cognitive load prefixed to the prompt
//! - **Token economy**: interest, stipends, best-response bonus, group
//!   survival bonus, donations, loans, self-rescue and resurrection
//! - **Cooperation statements**: free text parsed into a closed set of
//!   typed actions and validated before any token moves
//! - **Negotiation rounds**: public forum, private offers, and a group
//!   sabotage vote
//! - **Traitor role**: hidden asymmetric information with reveal and
//!   exposure transitions
//! - **Deterministic replays**: fixed challenge rotation, stable-order
//!   tie-breaks, seedable traitor draw
//!
//! ## Round Lifecycle
//!
//! ```text
//!                 ┌──────────────── SeasonDriver ─────────────────┐
//!                 │ round % period == 0 ?                         │
//!                 ▼                                               ▼
//!   Announce -> Collect -> Judge -> Settle -> Persist    Forum -> Bilateral -> Vote -> Settle -> Persist
//!                  │          │                                                 │
//!             Generator     Judge                                          alliance log
//! ```
//!
//! Settle applies, in order: best/worst level changes, elimination check,
//! survival stipend, group bonus, traitor reveal effects, and a final
//! elimination check.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use elimination::{
//!     MemoryPersister, RoundOrchestrator, ScriptedGenerator, ScriptedJudge, SeasonConfig,
//!     SeasonDriver,
//! };
//!
//! let config = SeasonConfig::default();
//! let names = config.participants.iter().map(|p| p.name.clone()).collect();
//! let orchestrator = RoundOrchestrator::new(
//!     Arc::new(config),
//!     Arc::new(ScriptedGenerator::new(names)),
//!     Arc::new(ScriptedJudge::new()),
//!     Arc::new(MemoryPersister::new()),
//! );
//! let report = SeasonDriver::new(orchestrator).run().await?;
//! println!("Winner: {}", report.ranking[0].participant);
//! ```
//!
//! ## Modules
//!
//! - [`levels`]: Static level table
//! - [`participant`]: Participant state and roster
//! - [`economy`]: Token economy, loans and the event journal
//! - [`actions`]: Cooperation statement grammar
//! - [`round`]: Round orchestrator and round records
//! - [`negotiation`]: Negotiation rounds and sabotage votes
//! - [`traitor`]: Traitor role transitions
//! - [`scoring`]: Final ranking
//! - [`season`]: Season context and driver
//! - [`providers`]: Generation, judging and persistence collaborators
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod actions;
pub mod challenge;
pub mod config;
pub mod economy;
pub mod error;
pub mod levels;
pub mod negotiation;
pub mod participant;
pub mod prompt;
pub mod providers;
pub mod round;
pub mod scoring;
pub mod season;
pub mod traitor;

// Re-exports for convenience
pub use actions::{apply_action, parse_statement, Action, ActionRecord};
pub use challenge::{Challenge, ChallengeRotation};
pub use config::{QuorumRule, SeasonConfig};
pub use economy::{EconomyEvent, Loan, LoanId, Sponsor, TokenEconomy};
pub use error::{EconomyError, Result, SeasonError};
pub use levels::{GenerationConfig, PerformanceLevelTable};
pub use negotiation::{AllianceLog, NegotiationPhase, NegotiationRecord};
pub use participant::{ParticipantId, ParticipantState, Roster};
pub use providers::{
    Generator, HttpGenerator, JsonFilePersister, Judge, LlmJudge, MemoryPersister, Persister,
    ProviderStats, ScriptedGenerator, ScriptedJudge,
};
pub use round::{JudgingOutcome, RoundOrchestrator, RoundPhase, RoundRecord};
pub use scoring::{ScoreEntry, ScoringModel};
pub use season::{SeasonDriver, SeasonReport, SeasonState};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
