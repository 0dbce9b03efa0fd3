//! External collaborators.
//!
//! The engine talks to three collaborators, each behind a trait so that a
//! season can run against live chat APIs, against scripted in-process
//! doubles, or any mix:
//!
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │             RoundOrchestrator                │
//! └──────┬──────────────────┬───────────────┬────┘
//!        ▼                  ▼               ▼
//!   ┌──────────┐       ┌─────────┐    ┌───────────┐
//!   │Generator │       │  Judge  │    │ Persister │
//!   └────┬─────┘       └────┬────┘    └─────┬─────┘
//!   HttpGenerator       LlmJudge      JsonFilePersister
//!   ScriptedGenerator   ScriptedJudge MemoryPersister
//! ```
//!
//! Generators and judges never return transport errors to the engine in a
//! way that aborts a round: a failed generation is a [`Generation`] with
//! `succeeded == false`, and a failed judgment falls back to stable order.

mod http;
mod judge;
mod persist;
mod retry;
mod scripted;
mod stats;

pub use http::{ApiResult, ChatClient, HttpGenerator};
pub use judge::{judge_prompt, parse_verdict, LlmJudge};
pub use persist::{JsonFilePersister, MemoryPersister};
pub use retry::RateLimitBackoff;
pub use scripted::{ScriptedGenerator, ScriptedJudge, ScriptedReply};
pub use stats::{ProviderStats, StatsSnapshot};

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::levels::GenerationConfig;
use crate::participant::ParticipantId;
use crate::round::RoundRecord;
use crate::season::SeasonReport;

/// Boxed future returned by collaborator traits
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Prefix of the sentinel text stored for a failed generation
pub const FAILED_RESPONSE_PREFIX: &str = "[NO RESPONSE";

/// One generation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    /// Who is answering
    pub participant: ParticipantId,
    /// Full prompt text
    pub prompt: String,
    /// Budget and variability from the level table
    pub config: GenerationConfig,
}

/// Result of a generation call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Generation {
    /// Response text, or a sentinel on failure
    pub text: String,
    /// Whether the backend produced a response
    pub succeeded: bool,
    /// Tokens reported by the backend
    pub tokens_used: u32,
}

impl Generation {
    /// A successful response
    pub fn ok(text: impl Into<String>, tokens_used: u32) -> Self {
        Self {
            text: text.into(),
            succeeded: true,
            tokens_used,
        }
    }

    /// A failed response with sentinel text
    pub fn failed(reason: impl std::fmt::Display) -> Self {
        Self {
            text: format!("{FAILED_RESPONSE_PREFIX}: {reason}]"),
            succeeded: false,
            tokens_used: 0,
        }
    }
}

/// A response submitted for judging
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    /// Author
    pub participant: ParticipantId,
    /// Text the judge sees
    pub text: String,
}

/// What a judge returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// Full best-to-worst ranking of raw names
    Ranking {
        /// Names, best first
        order: Vec<String>,
    },
    /// Explicit best and worst
    BestWorst {
        /// Raw best name
        best: String,
        /// Raw worst name
        worst: String,
    },
    /// Output that could not be parsed
    Malformed {
        /// Raw judge output
        raw: String,
    },
}

/// Produces a response for a participant
pub trait Generator: Send + Sync {
    /// Generate a response; failures are reported in the returned value
    fn generate(&self, request: GenerationRequest) -> BoxFuture<'_, Generation>;
}

/// Ranks a set of responses to a challenge
pub trait Judge: Send + Sync {
    /// Judge at least two submissions
    fn judge<'a>(
        &'a self,
        challenge: &'a str,
        submissions: &'a [Submission],
    ) -> BoxFuture<'a, Result<Verdict>>;
}

/// Stores round records and the season report
pub trait Persister: Send + Sync {
    /// Write a round record (never overwrites an existing one)
    fn persist_round<'a>(&'a self, record: &'a RoundRecord) -> BoxFuture<'a, Result<()>>;

    /// Write the end-of-season report
    fn persist_report<'a>(&'a self, report: &'a SeasonReport) -> BoxFuture<'a, Result<()>>;
}

/// Generate under a per-call timeout.
///
/// A timeout is reported exactly like a provider failure.
pub async fn generate_within(
    generator: &dyn Generator,
    request: GenerationRequest,
    timeout: Duration,
    stats: &ProviderStats,
) -> Generation {
    let participant = request.participant.clone();
    let generation = match tokio::time::timeout(timeout, generator.generate(request)).await {
        Ok(g) => g,
        Err(_) => {
            stats.record_timeout();
            warn!(participant = %participant, ?timeout, "Generation timed out");
            Generation::failed(format!("timeout after {}s", timeout.as_secs_f32()))
        },
    };
    if !generation.succeeded {
        warn!(participant = %participant, text = %generation.text, "Provider failure");
    }
    stats.record_generation(generation.succeeded, generation.tokens_used);
    generation
}
