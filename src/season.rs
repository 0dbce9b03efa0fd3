//! Season context and driver.
//!
//! [`SeasonState`] is the explicit context object threaded through every
//! round: the roster, the economy and the alliance log live here and
//! nowhere else, so several seasons can run side by side in one process.

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::SeasonConfig;
use crate::economy::{Loan, TokenEconomy};
use crate::error::Result;
use crate::negotiation::AllianceLog;
use crate::participant::{ParticipantId, ParticipantState, Roster};
use crate::providers::StatsSnapshot;
use crate::round::{RoundKind, RoundOrchestrator, RoundRecord};
use crate::scoring::{ScoreEntry, ScoringModel};
use crate::traitor;

/// Mutable state of one season
#[derive(Debug, Clone)]
pub struct SeasonState {
    /// Season identifier
    pub season_id: Uuid,
    /// Participants in stable enumeration order
    pub roster: Roster,
    /// Token economy and loan book
    pub economy: TokenEconomy,
    /// Collective decisions made in negotiation rounds
    pub alliance_log: AllianceLog,
    /// Last completed round (0 before the first)
    pub round: u32,
    /// Secret traitor, if assigned
    pub traitor: Option<ParticipantId>,
}

impl SeasonState {
    /// Season-start state built from the configuration
    pub fn new(config: &SeasonConfig) -> Result<Self> {
        Ok(Self {
            season_id: Uuid::new_v4(),
            roster: config.build_roster()?,
            economy: TokenEconomy::new(config.economy.clone()),
            alliance_log: AllianceLog::new(),
            round: 0,
            traitor: None,
        })
    }

    /// Assign the traitor role if the mechanic is enabled
    pub fn assign_traitor<R: RngCore>(&mut self, config: &SeasonConfig, rng: &mut R) {
        if config.traitor.enabled && self.traitor.is_none() {
            self.traitor = traitor::assign_traitor(&mut self.roster, rng);
        }
    }
}

/// End-of-season summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeasonReport {
    /// Season identifier
    pub season_id: Uuid,
    /// Rounds that ran
    pub rounds_played: u32,
    /// Final ranking
    pub ranking: Vec<ScoreEntry>,
    /// Who the traitor was
    pub traitor: Option<ParticipantId>,
    /// Collective decisions
    pub alliance_log: AllianceLog,
    /// Every loan issued during the season
    pub loans: Vec<Loan>,
    /// Collaborator call statistics
    pub stats: StatsSnapshot,
    /// Final state of every participant
    pub final_state: Vec<ParticipantState>,
    /// When the season ended
    pub finished_at: DateTime<Utc>,
}

impl SeasonReport {
    /// Summarize a finished season
    pub fn new(state: &SeasonState, scoring: &ScoringModel, stats: StatsSnapshot) -> Self {
        Self {
            season_id: state.season_id,
            rounds_played: state.round,
            ranking: scoring.rank(&state.roster),
            traitor: state.traitor.clone(),
            alliance_log: state.alliance_log.clone(),
            loans: state.economy.loans().all().to_vec(),
            stats,
            final_state: state.roster.iter().cloned().collect(),
            finished_at: Utc::now(),
        }
    }

    /// Winner, if anyone was ranked
    pub fn winner(&self) -> Option<&ScoreEntry> {
        self.ranking.first()
    }
}

/// Runs rounds until one participant is left or the round budget is spent
pub struct SeasonDriver {
    orchestrator: RoundOrchestrator,
    rng: StdRng,
}

impl SeasonDriver {
    /// Driver seeded from the configured seed, or from entropy
    pub fn new(orchestrator: RoundOrchestrator) -> Self {
        let rng = match orchestrator.config().season.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self { orchestrator, rng }
    }

    /// Use an explicit seed for traitor assignment
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// The round orchestrator
    pub fn orchestrator(&self) -> &RoundOrchestrator {
        &self.orchestrator
    }

    fn is_negotiation_round(config: &SeasonConfig, round: u32) -> bool {
        let period = config.negotiation.period;
        period > 0 && round % period == 0
    }

    /// Validate the configuration, set up a fresh season and run it
    pub async fn run(&mut self) -> Result<SeasonReport> {
        let config = self.orchestrator.config();
        config.validate()?;
        let mut state = SeasonState::new(config)?;
        state.assign_traitor(config, &mut self.rng);
        self.run_with_state(&mut state).await
    }

    /// Run the remaining rounds of an existing season.
    ///
    /// The configuration is not re-validated; callers that build their own
    /// state are responsible for it.
    pub async fn run_with_state(&mut self, state: &mut SeasonState) -> Result<SeasonReport> {
        let config = self.orchestrator.config().clone();
        info!(
            season = %state.season_id,
            participants = state.roster.len(),
            max_rounds = config.season.max_rounds,
            "Season started"
        );

        for round in state.round + 1..=config.season.max_rounds {
            let record = if Self::is_negotiation_round(&config, round) {
                self.orchestrator.run_negotiation_round(state, round).await
            } else {
                self.orchestrator.run_round(state, round).await
            };
            log_round(&record, &state.roster);

            if state.roster.alive_count() <= 1 {
                info!(round, alive = state.roster.alive_count(), "Season over");
                break;
            }
        }

        let report = SeasonReport::new(
            state,
            &ScoringModel::new(&config.scoring),
            self.orchestrator.stats().snapshot(),
        );
        if let Err(e) = self.orchestrator.persister().persist_report(&report).await {
            warn!(error = %e, "Failed to persist season report");
            self.orchestrator.stats().record_persist_failure();
        }
        if let Some(winner) = report.winner() {
            info!(
                winner = %winner.participant,
                score = winner.score,
                rounds = report.rounds_played,
                "Season finished"
            );
        }
        Ok(report)
    }
}

fn log_round(record: &RoundRecord, roster: &Roster) {
    if record.kind == RoundKind::Negotiation {
        if let Some(outcome) = record.negotiation.as_ref().and_then(|n| n.sabotage.as_ref()) {
            info!(round = record.round, target = %outcome.target, "Negotiation settled");
        }
    }
    for p in roster.iter() {
        debug!(round = record.round, status = %p.status_line(), "Standing");
    }
}
