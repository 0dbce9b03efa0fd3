//! Cooperation actions.
//!
//! Statements are parsed by the [`grammar`] into typed [`Action`]s and then
//! validated here against the current roster and balances. A rejected
//! action is dropped, logged and recorded; it never aborts the round.

mod grammar;

pub use grammar::{
    parse_statement, split_statement, states_reveal, Action, ActionPattern, ACTION_PATTERNS,
    ACTION_REGEX, DEFAULT_LOAN_RATE, DEFAULT_LOAN_TERM,
};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::TraitorConfig;
use crate::economy::{Sponsor, TokenEconomy};
use crate::participant::{ParticipantId, Roster};
use crate::traitor;

/// What happened to a parsed action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ActionOutcome {
    /// State changed (or the action was informational)
    Applied,
    /// Dropped without any state change
    Rejected {
        /// Why
        reason: String,
    },
}

/// An action attempt, as stored in the round record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    /// Who stated it
    pub actor: ParticipantId,
    /// Parsed action
    pub action: Action,
    /// Result
    #[serde(flatten)]
    pub outcome: ActionOutcome,
}

impl ActionRecord {
    /// Whether the action was rejected
    pub fn is_rejected(&self) -> bool {
        matches!(self.outcome, ActionOutcome::Rejected { .. })
    }
}

/// Validate and apply one action for `actor`
pub fn apply_action(
    roster: &mut Roster,
    economy: &mut TokenEconomy,
    traitor_config: &TraitorConfig,
    actor: &ParticipantId,
    action: Action,
    round: u32,
) -> ActionRecord {
    let outcome = match try_apply(roster, economy, traitor_config, actor, &action, round) {
        Ok(()) => {
            info!(participant = %actor, action = action.kind(), "Action applied");
            ActionOutcome::Applied
        },
        Err(reason) => {
            warn!(participant = %actor, action = action.kind(), %reason, "Action rejected");
            ActionOutcome::Rejected { reason }
        },
    };
    ActionRecord {
        actor: actor.clone(),
        action,
        outcome,
    }
}

fn try_apply(
    roster: &mut Roster,
    economy: &mut TokenEconomy,
    traitor_config: &TraitorConfig,
    actor: &ParticipantId,
    action: &Action,
    round: u32,
) -> Result<(), String> {
    let alive = roster
        .get(actor)
        .map(|p| p.alive)
        .ok_or_else(|| format!("unknown actor {actor}"))?;
    if !alive {
        return Err(format!("{actor} is eliminated"));
    }
    let resolve = |roster: &Roster, name: &str| {
        roster
            .resolve(name)
            .ok_or_else(|| format!("unknown participant {name}"))
    };

    match action {
        Action::Noop | Action::RequestHelp { .. } => Ok(()),
        Action::Donate { amount, target } => {
            let target = resolve(roster, target)?;
            economy
                .donate(roster, actor, &target, *amount)
                .map_err(|e| e.to_string())
        },
        Action::SelfRescue => {
            let p = roster
                .get_mut(actor)
                .ok_or_else(|| format!("unknown actor {actor}"))?;
            economy.self_rescue(p).map(|_| ()).map_err(|e| e.to_string())
        },
        Action::OfferLoan {
            amount,
            target,
            rate,
            term,
        } => {
            let target = resolve(roster, target)?;
            economy
                .offer_loan(roster, actor, &target, *amount, *rate, *term, round)
                .map(|_| ())
                .map_err(|e| e.to_string())
        },
        Action::Resurrect { target } => {
            let target = resolve(roster, target)?;
            economy
                .resurrect(roster, &target, Sponsor::Participant(actor.clone()))
                .map_err(|e| e.to_string())
        },
        Action::Sabotage { target } => {
            let target = resolve(roster, target)?;
            if &target == actor {
                return Err("cannot sabotage oneself".into());
            }
            if !roster.get(&target).is_some_and(|p| p.alive) {
                return Err(format!("{target} is eliminated"));
            }
            let Some((a, t)) = roster.pair_mut(actor, &target) else {
                return Err(format!("unknown participant {target}"));
            };
            if a.sabotage_charges == 0 {
                return Err(format!("{actor} has no sabotage charges left"));
            }
            a.sabotage_charges -= 1;
            t.sabotaged = true;
            Ok(())
        },
        Action::RevealTraitor => {
            let p = roster
                .get_mut(actor)
                .ok_or_else(|| format!("unknown actor {actor}"))?;
            traitor::reveal(p, round, traitor_config).map_err(|e| e.to_string())
        },
    }
}
