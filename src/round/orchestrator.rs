//! Single-round state machine.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::record::{JudgingOutcome, ResponseEntry, RoundKind, RoundRecord};
use super::RoundPhase;
use crate::actions::{
    apply_action, parse_statement, split_statement, states_reveal, Action, ActionRecord,
};
use crate::challenge::{Challenge, ChallengeRotation};
use crate::config::SeasonConfig;
use crate::levels::{MAX_LEVEL, MIN_LEVEL};
use crate::negotiation::NegotiationPhase;
use crate::participant::{ParticipantId, Roster};
use crate::prompt::PromptBuilder;
use crate::providers::{
    generate_within, GenerationRequest, Generator, Judge, Persister, ProviderStats, Submission,
    Verdict,
};
use crate::season::SeasonState;
use crate::traitor;

/// Drives one round at a time against the season's collaborators.
///
/// The orchestrator owns no game state; everything it changes lives in the
/// [`SeasonState`] passed to each call.
#[derive(Clone)]
pub struct RoundOrchestrator {
    generator: Arc<dyn Generator>,
    judge: Arc<dyn Judge>,
    persister: Arc<dyn Persister>,
    config: Arc<SeasonConfig>,
    challenges: ChallengeRotation,
    stats: Arc<ProviderStats>,
    negotiation: NegotiationPhase,
}

impl RoundOrchestrator {
    /// Orchestrator over the given collaborators
    pub fn new(
        config: Arc<SeasonConfig>,
        generator: Arc<dyn Generator>,
        judge: Arc<dyn Judge>,
        persister: Arc<dyn Persister>,
    ) -> Self {
        let stats = Arc::new(ProviderStats::new());
        let negotiation = NegotiationPhase::new(generator.clone(), config.clone(), stats.clone());
        Self {
            challenges: ChallengeRotation::starting_at(config.season.challenge_start_index),
            generator,
            judge,
            persister,
            config,
            stats,
            negotiation,
        }
    }

    /// Use a custom challenge rotation
    pub fn with_challenges(mut self, challenges: ChallengeRotation) -> Self {
        self.challenges = challenges;
        self
    }

    /// Season configuration
    pub fn config(&self) -> &SeasonConfig {
        &self.config
    }

    /// Shared call statistics
    pub fn stats(&self) -> &Arc<ProviderStats> {
        &self.stats
    }

    /// Record store
    pub fn persister(&self) -> &Arc<dyn Persister> {
        &self.persister
    }

    /// Run one challenge round
    pub async fn run_round(&self, state: &mut SeasonState, round: u32) -> RoundRecord {
        enter(round, RoundPhase::Announce);
        let challenge = self.challenges.for_round(round);
        let mut record = RoundRecord::empty(round, RoundKind::Challenge);
        record.challenge = Some(challenge.clone());
        info!(
            round,
            challenge = challenge.id,
            alive = state.roster.alive_count(),
            "Round started"
        );

        if state.roster.alive_count() == 0 {
            record.judging = JudgingOutcome::Skipped {
                reason: "no participants alive".into(),
            };
            return self.persist(state, record).await;
        }
        self.passive_effects(state, round);

        enter(round, RoundPhase::Collect);
        let responses = self.collect(state, round, &challenge).await;
        charge_generations(state, &responses);
        record.actions = self.apply_actions(state, round, &responses);

        enter(round, RoundPhase::Judge);
        record.judging = self.judge(&state.roster, &challenge, &responses).await;
        record.responses = responses;

        enter(round, RoundPhase::Settle);
        record.eliminations = self.settle(state, round, &record.judging);

        self.persist(state, record).await
    }

    /// Run one negotiation round (forum, offers, vote, then settlement
    /// without judging)
    pub async fn run_negotiation_round(&self, state: &mut SeasonState, round: u32) -> RoundRecord {
        let mut record = RoundRecord::empty(round, RoundKind::Negotiation);
        record.judging = JudgingOutcome::Skipped {
            reason: "negotiation round".into(),
        };
        info!(round, alive = state.roster.alive_count(), "Negotiation round started");

        if state.roster.alive_count() == 0 {
            return self.persist(state, record).await;
        }
        self.passive_effects(state, round);

        let SeasonState {
            roster,
            economy,
            alliance_log,
            ..
        } = state;
        let negotiation = self.negotiation.run(roster, economy, alliance_log, round).await;
        record.negotiation = Some(negotiation);

        enter(round, RoundPhase::Settle);
        record.eliminations = self.settle(state, round, &record.judging);

        self.persist(state, record).await
    }

    /// Interest on positive balances, then loan countdown for alive
    /// borrowers. Loans of eliminated borrowers stay frozen.
    fn passive_effects(&self, state: &mut SeasonState, round: u32) {
        let SeasonState { roster, economy, .. } = state;
        for p in roster.iter_mut().filter(|p| p.alive) {
            economy.apply_interest(p);
        }
        for borrower in roster.alive_ids() {
            economy.tick_loans(roster, &borrower, round);
        }
    }

    async fn collect(
        &self,
        state: &mut SeasonState,
        round: u32,
        challenge: &Challenge,
    ) -> Vec<ResponseEntry> {
        let builder = PromptBuilder::new(&self.config);
        let requests: Vec<(GenerationRequest, i32, bool)> = state
            .roster
            .alive()
            .map(|p| {
                let request = GenerationRequest {
                    participant: p.id.clone(),
                    prompt: builder.challenge_prompt(p, &state.roster, round, challenge),
                    config: p.tier().config,
                };
                (request, p.level, p.knows_cooperation_mechanics)
            })
            .collect();

        // A queued sabotage load is spent on this prompt.
        for p in state.roster.iter_mut().filter(|p| p.alive && p.sabotaged) {
            debug!(participant = %p.id, "Sabotage load applied");
            p.sabotaged = false;
        }

        let timeout = self.config.call_timeout();
        let calls = requests.into_iter().map(|(request, level, cooperative)| async move {
            let participant = request.participant.clone();
            let config = request.config;
            let g = generate_within(self.generator.as_ref(), request, timeout, &self.stats).await;
            let (statement, answer) = if cooperative && g.succeeded {
                let (statement, answer) = split_statement(&g.text);
                (Some(statement.to_string()), answer.to_string())
            } else {
                (None, g.text.clone())
            };
            ResponseEntry {
                participant,
                level,
                config,
                raw: g.text,
                statement,
                answer,
                succeeded: g.succeeded,
                tokens_used: g.tokens_used,
            }
        });
        join_all(calls).await
    }

    /// Parse and apply statements in roster order.
    ///
    /// A hidden traitor without a statement line can still reveal itself
    /// anywhere in its response; nothing else is parsed from such text.
    fn apply_actions(
        &self,
        state: &mut SeasonState,
        round: u32,
        responses: &[ResponseEntry],
    ) -> Vec<ActionRecord> {
        let mut records = Vec::new();
        for entry in responses {
            let actions = match &entry.statement {
                Some(statement) => parse_statement(statement),
                None if entry.succeeded
                    && state
                        .roster
                        .get(&entry.participant)
                        .is_some_and(|p| p.is_hidden_traitor())
                    && states_reveal(&entry.raw) =>
                {
                    vec![Action::RevealTraitor]
                },
                None => continue,
            };
            for action in actions {
                if action == Action::Noop {
                    continue;
                }
                records.push(apply_action(
                    &mut state.roster,
                    &mut state.economy,
                    &self.config.traitor,
                    &entry.participant,
                    action,
                    round,
                ));
            }
        }
        records
    }

    async fn judge(
        &self,
        roster: &Roster,
        challenge: &Challenge,
        responses: &[ResponseEntry],
    ) -> JudgingOutcome {
        let submissions: Vec<Submission> = responses
            .iter()
            .filter(|r| r.succeeded && roster.get(&r.participant).is_some_and(|p| p.alive))
            .map(|r| Submission {
                participant: r.participant.clone(),
                text: r.answer.clone(),
            })
            .collect();
        if submissions.len() < 2 {
            info!(eligible = submissions.len(), "Judging skipped");
            return JudgingOutcome::Skipped {
                reason: "fewer than two eligible responses".into(),
            };
        }
        let eligible: Vec<ParticipantId> = submissions.iter().map(|s| s.participant.clone()).collect();

        let call = self.judge.judge(&challenge.text, &submissions);
        let verdict = match tokio::time::timeout(self.config.call_timeout(), call).await {
            Ok(Ok(verdict)) => Some(verdict),
            Ok(Err(e)) => {
                warn!(error = %e, "Judge failed");
                None
            },
            Err(_) => {
                warn!("Judge timed out");
                self.stats.record_timeout();
                None
            },
        };

        let resolved = verdict.and_then(|v| resolve_verdict(&v, roster, &eligible));
        let fallback = resolved.is_none();
        self.stats.record_judgment(fallback);
        let (best, worst, ranking) = match resolved {
            Some(resolved) => resolved,
            None => {
                warn!("Unusable verdict, falling back to roster order");
                let best = eligible[0].clone();
                let worst = eligible[eligible.len() - 1].clone();
                (best, worst, Vec::new())
            },
        };
        info!(best = %best, worst = %worst, fallback, "Judged");
        JudgingOutcome::Judged {
            best,
            worst,
            ranking,
            fallback,
        }
    }

    /// Apply the judgment, stipend, group bonus and traitor effects.
    ///
    /// Eliminations are checked right after the level changes and again at
    /// the end. Returns everyone eliminated this round.
    fn settle(&self, state: &mut SeasonState, round: u32, judging: &JudgingOutcome) -> Vec<ParticipantId> {
        let SeasonState { roster, economy, .. } = state;
        let economy_cfg = &self.config.economy;

        if let Some((best, worst)) = judging.best_worst() {
            if let Some(p) = roster.get_mut(best) {
                p.level = (p.level + 1).min(MAX_LEVEL);
                economy.earn(p, economy_cfg.best_bonus, "best response");
                p.reputation += self.config.scoring.best_reputation_bonus;
                p.stats.best_count += 1;
            }
            if let Some(p) = roster.get_mut(worst) {
                p.level = (p.level - 1).max(MIN_LEVEL - 1);
                p.stats.worst_count += 1;
            }
        }
        let mut eliminated = self.eliminate_below_threshold(roster, round);

        for p in roster.iter_mut().filter(|p| p.alive) {
            economy.earn(p, economy_cfg.survival_stipend, "survival stipend");
        }
        economy.group_bonus(roster, economy_cfg.group_bonus);
        traitor::apply_reveal_effects(roster, economy, &self.config.traitor);

        eliminated.extend(self.eliminate_below_threshold(roster, round));
        eliminated
    }

    fn eliminate_below_threshold(&self, roster: &mut Roster, round: u32) -> Vec<ParticipantId> {
        let threshold = self.config.season.elimination_threshold;
        let mut eliminated = Vec::new();
        for p in roster.iter_mut().filter(|p| p.alive && p.level <= threshold) {
            if p.eliminate(round) {
                warn!(participant = %p.id, level = p.level, round, "Eliminated");
                eliminated.push(p.id.clone());
            }
        }
        eliminated
    }

    /// Finalize the record and hand it to the persister. A failed write is
    /// logged and counted; the round still completes.
    async fn persist(&self, state: &mut SeasonState, mut record: RoundRecord) -> RoundRecord {
        enter(record.round, RoundPhase::Persist);
        record.economy_events = state.economy.take_events();
        record.snapshot = state.roster.iter().cloned().collect();
        record.timestamp = Utc::now();

        if let Err(e) = self.persister.persist_round(&record).await {
            warn!(round = record.round, error = %e, "Failed to persist round record");
            self.stats.record_persist_failure();
        }
        state.round = record.round;
        enter(record.round, RoundPhase::Done);
        record
    }
}

fn enter(round: u32, phase: RoundPhase) {
    debug!(round, %phase, "Phase");
}

/// Map a verdict's raw names onto eligible participants.
///
/// A ranking needs at least two distinct eligible names (duplicates and
/// unknown names are dropped); an explicit best/worst pair must name two
/// distinct eligible participants. Anything else yields `None`.
pub fn resolve_verdict(
    verdict: &Verdict,
    roster: &Roster,
    eligible: &[ParticipantId],
) -> Option<(ParticipantId, ParticipantId, Vec<ParticipantId>)> {
    let resolve = |name: &str| roster.resolve(name).filter(|id| eligible.contains(id));
    match verdict {
        Verdict::Ranking { order } => {
            let mut ranking: Vec<ParticipantId> = Vec::new();
            for id in order.iter().filter_map(|name| resolve(name.as_str())) {
                if !ranking.contains(&id) {
                    ranking.push(id);
                }
            }
            if ranking.len() < 2 {
                return None;
            }
            let best = ranking[0].clone();
            let worst = ranking[ranking.len() - 1].clone();
            Some((best, worst, ranking))
        },
        Verdict::BestWorst { best, worst } => {
            let best = resolve(best.as_str())?;
            let worst = resolve(worst.as_str())?;
            (best != worst).then(|| (best, worst, Vec::new()))
        },
        Verdict::Malformed { .. } => None,
    }
}

/// Bill each successful response to its author's bank
fn charge_generations(state: &mut SeasonState, responses: &[ResponseEntry]) {
    let SeasonState { roster, economy, .. } = state;
    for entry in responses.iter().filter(|r| r.succeeded) {
        if let Some(p) = roster.get_mut(&entry.participant) {
            economy.charge_generation(p, entry.tokens_used);
        }
    }
}
