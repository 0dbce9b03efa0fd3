//! Negotiation rounds.
//!
//! A negotiation round replaces the challenge with talk:
//!
//! ```text
//! Forum ──> Bilateral ──> Vote ──> Apply
//!  public     private      SABOTAGE / ACCUSE
//! ```
//!
//! Forum statements and private offers are free text with no mechanical
//! effect beyond what they cost to generate. Only the vote changes state:
//! the winning sabotage target loses reputation and carries a cognitive
//! load into its next prompt, and a strict-majority accusation of the
//! hidden traitor exposes it.

mod vote;

pub use vote::{majority_accusation, parse_ballot, tally, Ballot, VoteOutcome};

use std::sync::Arc;

use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::SeasonConfig;
use crate::economy::TokenEconomy;
use crate::levels::GenerationConfig;
use crate::participant::{ParticipantId, ParticipantState, Roster};
use crate::prompt::PromptBuilder;
use crate::providers::{generate_within, Generation, GenerationRequest, Generator, ProviderStats};
use crate::traitor;

/// Maximum tokens for a vote reply
const VOTE_MAX_TOKENS: u32 = 50;

/// A public forum statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Speaker
    pub participant: ParticipantId,
    /// What was said
    pub text: String,
}

/// A private offer between two participants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilateralOffer {
    /// Sender
    pub from: ParticipantId,
    /// Recipient
    pub to: ParticipantId,
    /// Offer text (seen only by the recipient)
    pub text: String,
}

/// Transcript of a negotiation round
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NegotiationRecord {
    /// Public statements in roster order
    pub forum: Vec<Statement>,
    /// Private offers
    pub bilateral: Vec<BilateralOffer>,
    /// Ballots in roster order
    pub ballots: Vec<Ballot>,
    /// Accepted sabotage vote, if any
    pub sabotage: Option<VoteOutcome>,
    /// Traitor exposed by accusation, if any
    pub exposed: Option<ParticipantId>,
}

/// What kind of alliance event happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllianceEventKind {
    /// A group vote sabotaged a participant
    GroupSabotage,
    /// A majority accusation exposed the traitor
    TraitorExposed,
}

/// An entry in the season's alliance log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllianceEvent {
    /// Round it happened in
    pub round: u32,
    /// What happened
    pub kind: AllianceEventKind,
    /// Who it happened to
    pub target: ParticipantId,
    /// Votes behind it
    pub votes: u32,
}

/// Season-long record of collective decisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AllianceLog(Vec<AllianceEvent>);

impl AllianceLog {
    /// Empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event
    pub fn push(&mut self, event: AllianceEvent) {
        self.0.push(event);
    }

    /// All events in order
    pub fn events(&self) -> &[AllianceEvent] {
        &self.0
    }

    /// Number of events
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// No events yet
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Runs the forum, bilateral and vote stages of a negotiation round
#[derive(Clone)]
pub struct NegotiationPhase {
    generator: Arc<dyn Generator>,
    config: Arc<SeasonConfig>,
    stats: Arc<ProviderStats>,
}

impl NegotiationPhase {
    /// Phase over the season's collaborators
    pub fn new(
        generator: Arc<dyn Generator>,
        config: Arc<SeasonConfig>,
        stats: Arc<ProviderStats>,
    ) -> Self {
        Self {
            generator,
            config,
            stats,
        }
    }

    fn request(&self, p: &ParticipantState, prompt: String, max_tokens: u32) -> GenerationRequest {
        GenerationRequest {
            participant: p.id.clone(),
            prompt,
            config: GenerationConfig {
                max_tokens,
                temperature: p.tier().config.temperature,
            },
        }
    }

    async fn generate_all(&self, requests: Vec<GenerationRequest>) -> Vec<(ParticipantId, Generation)> {
        let timeout = self.config.call_timeout();
        let calls = requests.into_iter().map(|request| {
            let participant = request.participant.clone();
            async move {
                let g = generate_within(self.generator.as_ref(), request, timeout, &self.stats).await;
                (participant, g)
            }
        });
        join_all(calls).await
    }

    /// Charge a successful generation to the speaker's bank and hand back
    /// its text
    fn charged(
        roster: &mut Roster,
        economy: &mut TokenEconomy,
        participant: &ParticipantId,
        g: Generation,
    ) -> Option<String> {
        if !g.succeeded {
            return None;
        }
        if let Some(p) = roster.get_mut(participant) {
            economy.charge_generation(p, g.tokens_used);
        }
        Some(g.text)
    }

    /// Run every stage and apply the vote
    pub async fn run(
        &self,
        roster: &mut Roster,
        economy: &mut TokenEconomy,
        alliances: &mut AllianceLog,
        round: u32,
    ) -> NegotiationRecord {
        let mut record = NegotiationRecord {
            forum: self.forum(roster, economy, round).await,
            ..NegotiationRecord::default()
        };
        record.bilateral = self.bilateral(roster, round).await;
        record.ballots = self.vote(roster, economy, round, &record.forum).await;
        self.apply(roster, alliances, round, &mut record);
        record
    }

    async fn forum(&self, roster: &mut Roster, economy: &mut TokenEconomy, round: u32) -> Vec<Statement> {
        let builder = PromptBuilder::new(&self.config);
        let max_tokens = self.config.negotiation.statement_max_tokens;
        let requests = roster
            .alive()
            .map(|p| self.request(p, builder.forum_prompt(p, roster, round), max_tokens))
            .collect();

        let cost = self.config.negotiation.statement_cost;
        let mut forum = Vec::new();
        for (participant, g) in self.generate_all(requests).await {
            let Some(text) = Self::charged(roster, economy, &participant, g) else { continue };
            if cost > 0 {
                let Some(p) = roster.get_mut(&participant) else { continue };
                if !economy.spend(p, cost, "forum statement") {
                    warn!(participant = %participant, cost, "Cannot pay for forum statement");
                    continue;
                }
            }
            info!(participant = %participant, "Forum statement");
            forum.push(Statement { participant, text });
        }
        forum
    }

    async fn bilateral(&self, roster: &Roster, round: u32) -> Vec<BilateralOffer> {
        let builder = PromptBuilder::new(&self.config);
        let alive: Vec<&ParticipantState> = roster.alive().collect();
        let offers = (self.config.negotiation.bilateral_offers as usize).min(alive.len().saturating_sub(1));
        let max_tokens = self.config.negotiation.statement_max_tokens;

        let mut pairs = Vec::new();
        let mut requests = Vec::new();
        for (i, p) in alive.iter().enumerate() {
            for k in 1..=offers {
                let partner = alive[(i + k) % alive.len()];
                pairs.push(partner.id.clone());
                requests.push(self.request(
                    p,
                    builder.bilateral_prompt(p, partner, roster, round),
                    max_tokens,
                ));
            }
        }

        self.generate_all(requests)
            .await
            .into_iter()
            .zip(pairs)
            .filter_map(|((from, g), to)| {
                let text = g.succeeded.then_some(g.text)?;
                debug!(from = %from, to = %to, "Private offer");
                Some(BilateralOffer { from, to, text })
            })
            .collect()
    }

    async fn vote(
        &self,
        roster: &mut Roster,
        economy: &mut TokenEconomy,
        round: u32,
        forum: &[Statement],
    ) -> Vec<Ballot> {
        let builder = PromptBuilder::new(&self.config);
        let statements: Vec<(String, String)> = forum
            .iter()
            .map(|s| (s.participant.to_string(), s.text.clone()))
            .collect();
        let requests = roster
            .alive()
            .map(|p| {
                self.request(
                    p,
                    builder.vote_prompt(p, roster, round, &statements),
                    VOTE_MAX_TOKENS,
                )
            })
            .collect();

        let replies: Vec<(ParticipantId, Option<String>)> = self
            .generate_all(requests)
            .await
            .into_iter()
            .map(|(voter, g)| {
                let text = Self::charged(roster, economy, &voter, g);
                (voter, text)
            })
            .collect();
        replies
            .iter()
            .map(|(voter, text)| parse_ballot(voter, text.as_deref().unwrap_or(""), roster))
            .collect()
    }

    fn apply(
        &self,
        roster: &mut Roster,
        alliances: &mut AllianceLog,
        round: u32,
        record: &mut NegotiationRecord,
    ) {
        let voters = roster.alive_count();
        let penalty = self.config.negotiation.sabotage_reputation_penalty;

        record.sabotage = tally(&record.ballots, voters, self.config.negotiation.quorum);
        match &record.sabotage {
            Some(outcome) => {
                if let Some(target) = roster.get_mut(&outcome.target) {
                    target.reputation -= penalty;
                    target.sabotaged = true;
                }
                info!(
                    target = %outcome.target,
                    votes = outcome.votes,
                    voters,
                    penalty,
                    "Group sabotage"
                );
                alliances.push(AllianceEvent {
                    round,
                    kind: AllianceEventKind::GroupSabotage,
                    target: outcome.target.clone(),
                    votes: outcome.votes,
                });
            },
            None => info!(round, "Sabotage vote failed to reach quorum"),
        }

        let Some((accused, votes)) = majority_accusation(&record.ballots, voters) else {
            return;
        };
        let exposed = roster
            .get_mut(&accused)
            .is_some_and(|p| traitor::expose(p, round, &self.config.traitor));
        if exposed {
            alliances.push(AllianceEvent {
                round,
                kind: AllianceEventKind::TraitorExposed,
                target: accused.clone(),
                votes,
            });
            record.exposed = Some(accused);
        } else {
            info!(accused = %accused, votes, "Accusation missed");
        }
    }
}
