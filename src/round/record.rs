//! Persisted round artifact.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::ActionRecord;
use crate::challenge::Challenge;
use crate::economy::EconomyEvent;
use crate::levels::GenerationConfig;
use crate::negotiation::NegotiationRecord;
use crate::participant::{ParticipantId, ParticipantState};

/// Which protocol produced a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundKind {
    /// Challenge, judging and settlement
    Challenge,
    /// Forum, bilateral offers and sabotage vote
    Negotiation,
}

/// One participant's response in a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEntry {
    /// Author
    pub participant: ParticipantId,
    /// Level the response was generated at
    pub level: i32,
    /// Generation settings used
    pub config: GenerationConfig,
    /// Raw response (or the failure sentinel)
    pub raw: String,
    /// Cooperation statement line, for cooperation-aware participants
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statement: Option<String>,
    /// Text shown to the judge
    pub answer: String,
    /// Whether the generation succeeded
    pub succeeded: bool,
    /// Tokens reported by the backend
    pub tokens_used: u32,
}

/// Result of the Judge phase
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum JudgingOutcome {
    /// Fewer than two eligible responses (or no judging this round)
    Skipped {
        /// Why
        reason: String,
    },
    /// Best and worst were determined
    Judged {
        /// Best response
        best: ParticipantId,
        /// Worst response
        worst: ParticipantId,
        /// Full resolved ranking when the judge returned one
        ranking: Vec<ParticipantId>,
        /// Stable-order fallback was used
        fallback: bool,
    },
}

impl JudgingOutcome {
    /// Best and worst, if judged
    pub fn best_worst(&self) -> Option<(&ParticipantId, &ParticipantId)> {
        match self {
            JudgingOutcome::Judged { best, worst, .. } => Some((best, worst)),
            JudgingOutcome::Skipped { .. } => None,
        }
    }
}

/// Everything that happened in one round. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundRecord {
    /// 1-based round index
    pub round: u32,
    /// Protocol that ran
    pub kind: RoundKind,
    /// Challenge (challenge rounds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub challenge: Option<Challenge>,
    /// Responses in roster order
    pub responses: Vec<ResponseEntry>,
    /// Judging result
    pub judging: JudgingOutcome,
    /// Cooperation actions attempted this round
    pub actions: Vec<ActionRecord>,
    /// Negotiation transcript (negotiation rounds only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negotiation: Option<NegotiationRecord>,
    /// Economy journal for the round
    pub economy_events: Vec<EconomyEvent>,
    /// Participants eliminated this round
    pub eliminations: Vec<ParticipantId>,
    /// Post-round state of every participant
    pub snapshot: Vec<ParticipantState>,
    /// When the record was produced
    pub timestamp: DateTime<Utc>,
}

impl RoundRecord {
    /// Record with no responses and no judgment
    pub fn empty(round: u32, kind: RoundKind) -> Self {
        Self {
            round,
            kind,
            challenge: None,
            responses: Vec::new(),
            judging: JudgingOutcome::Skipped {
                reason: "no responses".into(),
            },
            actions: Vec::new(),
            negotiation: None,
            economy_events: Vec::new(),
            eliminations: Vec::new(),
            snapshot: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    /// Snapshot entry for a participant
    pub fn participant(&self, id: &ParticipantId) -> Option<&ParticipantState> {
        self.snapshot.iter().find(|p| &p.id == id)
    }
}
