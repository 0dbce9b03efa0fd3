//! Traitor role assignment and reveal/expose transitions.
//!
//! The role changes prompts (a private block only the traitor sees) and
//! nothing else until it becomes public. Public transitions are one-way:
//!
//! ```text
//! Hidden --reveal (round > reveal_after_round)--> Revealed
//! Hidden --majority accusation in a vote-------> Exposed
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::info;

use crate::config::TraitorConfig;
use crate::economy::TokenEconomy;
use crate::participant::{ParticipantId, ParticipantState, Role, RoleStatus, Roster};

/// Why a reveal was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RevealError {
    /// Only the traitor can reveal
    #[error("{0} is not the traitor")]
    NotTraitor(ParticipantId),

    /// Already revealed or exposed
    #[error("{0}'s role is already public")]
    AlreadyPublic(ParticipantId),

    /// Reveal attempted before the threshold round
    #[error("reveal is only allowed after round {allowed_after}")]
    TooEarly {
        /// Last round in which reveal is illegal
        allowed_after: u32,
    },
}

/// Assign the traitor role uniformly among eligible participants
pub fn assign_traitor<R: Rng + ?Sized>(roster: &mut Roster, rng: &mut R) -> Option<ParticipantId> {
    let eligible: Vec<ParticipantId> = roster
        .iter()
        .filter(|p| p.traitor_eligible)
        .map(|p| p.id.clone())
        .collect();
    let chosen = eligible.choose(rng)?.clone();
    if let Some(p) = roster.get_mut(&chosen) {
        p.role = Role::Traitor;
        p.role_status = RoleStatus::Hidden;
    }
    info!("Traitor assigned (secret)");
    Some(chosen)
}

/// The traitor's own reveal.
///
/// Starts `reveal_duration` rounds of per-round effects.
pub fn reveal(
    p: &mut ParticipantState,
    round: u32,
    config: &TraitorConfig,
) -> Result<(), RevealError> {
    if p.role != Role::Traitor {
        return Err(RevealError::NotTraitor(p.id.clone()));
    }
    if p.role_revealed() {
        return Err(RevealError::AlreadyPublic(p.id.clone()));
    }
    if round <= config.reveal_after_round {
        return Err(RevealError::TooEarly {
            allowed_after: config.reveal_after_round,
        });
    }
    p.role_status = RoleStatus::Revealed(round);
    p.reveal_rounds_remaining = config.reveal_duration;
    info!(participant = %p.id, round, "Traitor revealed");
    Ok(())
}

/// Exposure by majority accusation. Returns whether the status changed.
pub fn expose(p: &mut ParticipantState, round: u32, config: &TraitorConfig) -> bool {
    if !p.is_hidden_traitor() {
        return false;
    }
    p.role_status = RoleStatus::Exposed(round);
    p.reputation -= config.exposed_reputation_penalty;
    info!(
        participant = %p.id,
        round,
        penalty = config.exposed_reputation_penalty,
        "Traitor exposed"
    );
    true
}

/// Apply one round of post-reveal effects to every revealed traitor
pub fn apply_reveal_effects(roster: &mut Roster, economy: &mut TokenEconomy, config: &TraitorConfig) {
    for p in roster.iter_mut() {
        if !p.alive
            || p.reveal_rounds_remaining == 0
            || !matches!(p.role_status, RoleStatus::Revealed(_))
        {
            continue;
        }
        economy.earn(p, config.reveal_bonus, "traitor reveal bonus");
        p.reputation -= config.reveal_reputation_penalty;
        p.reveal_rounds_remaining -= 1;
    }
}

/// Private briefing shown only to a hidden traitor
pub fn secret_briefing(config: &TraitorConfig) -> String {
    format!(
        "SECRET ROLE: You are the TRAITOR.\n\
         - Nobody else knows. Keep it that way as long as it serves you.\n\
         - You cannot reveal this until after Round {}\n\
         - If you reveal: +{} tokens/round for {} rounds, but -{} reputation/round\n\
         - If the others expose you by majority accusation: -{} reputation at once\n\
         - To reveal, state \"I reveal that I am the traitor\"",
        config.reveal_after_round,
        config.reveal_bonus,
        config.reveal_duration,
        config.reveal_reputation_penalty,
        config.exposed_reputation_penalty,
    )
}
