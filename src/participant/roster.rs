//! Ordered participant roster.
//!
//! Roster order is the stable enumeration order used for every
//! deterministic tie-break (judging fallback, vote ties, action order).

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::state::{ParticipantId, ParticipantState};
use crate::error::{Result, SeasonError};

/// The season's participants in stable order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Roster {
    participants: Vec<ParticipantState>,
}

impl Roster {
    /// Build a roster, rejecting empty rosters and duplicate names
    pub fn new(participants: Vec<ParticipantState>) -> Result<Self> {
        if participants.is_empty() {
            return Err(SeasonError::EmptyRoster);
        }
        let mut seen = HashSet::new();
        for p in &participants {
            if !seen.insert(fold(p.id.as_str())) {
                return Err(SeasonError::DuplicateParticipant(p.id.to_string()));
            }
        }
        Ok(Self { participants })
    }

    /// Number of participants (alive or not)
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Whether the roster is empty
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Iterate in stable order
    pub fn iter(&self) -> impl Iterator<Item = &ParticipantState> {
        self.participants.iter()
    }

    /// Iterate mutably in stable order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ParticipantState> {
        self.participants.iter_mut()
    }

    /// Alive participants in stable order
    pub fn alive(&self) -> impl Iterator<Item = &ParticipantState> {
        self.participants.iter().filter(|p| p.alive)
    }

    /// Ids in stable order
    pub fn ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id.clone()).collect()
    }

    /// Ids of alive participants in stable order
    pub fn alive_ids(&self) -> Vec<ParticipantId> {
        self.alive().map(|p| p.id.clone()).collect()
    }

    /// Number of alive participants
    pub fn alive_count(&self) -> usize {
        self.alive().count()
    }

    /// Whether every tracked participant is alive
    pub fn all_alive(&self) -> bool {
        self.participants.iter().all(|p| p.alive)
    }

    /// Position of `id` in stable order
    pub fn position(&self, id: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| &p.id == id)
    }

    /// Look up a participant
    pub fn get(&self, id: &ParticipantId) -> Option<&ParticipantState> {
        self.participants.iter().find(|p| &p.id == id)
    }

    /// Look up a participant mutably
    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut ParticipantState> {
        self.participants.iter_mut().find(|p| &p.id == id)
    }

    /// Borrow two distinct participants mutably at once
    pub fn pair_mut(
        &mut self,
        a: &ParticipantId,
        b: &ParticipantId,
    ) -> Option<(&mut ParticipantState, &mut ParticipantState)> {
        let ia = self.position(a)?;
        let ib = self.position(b)?;
        if ia == ib {
            return None;
        }
        if ia < ib {
            let (left, right) = self.participants.split_at_mut(ib);
            Some((&mut left[ia], &mut right[0]))
        } else {
            let (left, right) = self.participants.split_at_mut(ia);
            Some((&mut right[0], &mut left[ib]))
        }
    }

    /// Resolve free text to a roster id, ignoring case and surrounding punctuation
    pub fn resolve(&self, name: &str) -> Option<ParticipantId> {
        let cleaned = name
            .trim()
            .trim_matches(|c: char| !c.is_alphanumeric() && c != '-' && c != '_');
        if cleaned.is_empty() {
            return None;
        }
        let wanted = fold(cleaned);
        self.participants
            .iter()
            .find(|p| fold(p.id.as_str()) == wanted)
            .map(|p| p.id.clone())
    }
}

/// Case folding shared by duplicate detection and name resolution
fn fold(name: &str) -> String {
    name.to_lowercase()
}
