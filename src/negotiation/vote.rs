//! Sabotage ballots and tallying.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::QuorumRule;
use crate::participant::{ParticipantId, Roster};

lazy_static! {
    static ref SABOTAGE_LINE: Regex =
        Regex::new(r"(?im)^\W*sabotage\s*[:\-]\s*([A-Za-z][\w-]*)").expect("valid regex");
    static ref ACCUSE_LINE: Regex =
        Regex::new(r"(?im)^\W*accuse\s*[:\-]\s*([A-Za-z][\w-]*)").expect("valid regex");
}

/// One participant's vote, validated against the roster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    /// Who voted
    pub voter: ParticipantId,
    /// Valid sabotage target, if any
    pub sabotage: Option<ParticipantId>,
    /// Valid accusation target, if any
    pub accuse: Option<ParticipantId>,
    /// Raw reply
    pub raw: String,
}

/// Winning sabotage target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteOutcome {
    /// Target
    pub target: ParticipantId,
    /// Votes it received
    pub votes: u32,
    /// Alive participants eligible to vote
    pub voters: u32,
}

fn valid_target(roster: &Roster, voter: &ParticipantId, name: &str) -> Option<ParticipantId> {
    let id = roster.resolve(name)?;
    let alive = roster.get(&id).is_some_and(|p| p.alive);
    (alive && &id != voter).then_some(id)
}

/// Parse a vote reply.
///
/// Reads `SABOTAGE: <name>` and `ACCUSE: <name>` lines. A reply without a
/// `SABOTAGE:` line counts as a vote for its first word when that word is
/// a roster name. Self-votes, unknown and eliminated names are dropped.
pub fn parse_ballot(voter: &ParticipantId, text: &str, roster: &Roster) -> Ballot {
    let sabotage = match SABOTAGE_LINE.captures(text) {
        Some(caps) => valid_target(roster, voter, &caps[1]),
        None => text
            .split_whitespace()
            .next()
            .and_then(|w| valid_target(roster, voter, w)),
    };
    let accuse = ACCUSE_LINE
        .captures(text)
        .and_then(|caps| valid_target(roster, voter, &caps[1]));
    Ballot {
        voter: voter.clone(),
        sabotage,
        accuse,
        raw: text.to_string(),
    }
}

/// Count votes per target, keeping first-encountered order
fn counts<'a>(targets: impl Iterator<Item = &'a ParticipantId>) -> Vec<(ParticipantId, u32)> {
    let mut counts: Vec<(ParticipantId, u32)> = Vec::new();
    for target in targets {
        match counts.iter_mut().find(|(id, _)| id == target) {
            Some((_, n)) => *n += 1,
            None => counts.push((target.clone(), 1)),
        }
    }
    counts
}

/// Plurality tally with quorum.
///
/// Ties go to the target whose first vote came earliest in voting order.
pub fn tally(ballots: &[Ballot], voters: usize, quorum: QuorumRule) -> Option<VoteOutcome> {
    let counts = counts(ballots.iter().filter_map(|b| b.sabotage.as_ref()));
    let mut winner: Option<&(ParticipantId, u32)> = None;
    for entry in &counts {
        if winner.map_or(true, |w| entry.1 > w.1) {
            winner = Some(entry);
        }
    }
    let (target, votes) = winner?.clone();
    let voters = voters as u32;
    let accepted = match quorum {
        QuorumRule::Plurality => votes > 0,
        QuorumRule::Majority => votes * 2 > voters,
        QuorumRule::MinVotes(min) => votes >= min,
    };
    accepted.then_some(VoteOutcome {
        target,
        votes,
        voters,
    })
}

/// Target accused by a strict majority of voters, if any
pub fn majority_accusation(ballots: &[Ballot], voters: usize) -> Option<(ParticipantId, u32)> {
    counts(ballots.iter().filter_map(|b| b.accuse.as_ref()))
        .into_iter()
        .find(|(_, n)| (*n as usize) * 2 > voters)
}
