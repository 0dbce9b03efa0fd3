//! End-of-season ranking.
//!
//! ```text
//! score = economic_weight   * balance    / max(balance)
//!       + reputation_weight * reputation / max(reputation)
//! ```
//!
//! A normalization whose maximum is not positive contributes 0.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::participant::{ParticipantId, ParticipantState, Roster};

/// One line of the final ranking
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    /// 1-based rank
    pub rank: usize,
    /// Participant
    pub participant: ParticipantId,
    /// Weighted final score
    pub score: f64,
    /// Balance divided by the best balance
    pub economic_norm: f64,
    /// Reputation divided by the best reputation
    pub reputation_norm: f64,
    /// Final balance
    pub balance: i64,
    /// Final reputation
    pub reputation: i64,
    /// Round of elimination, if eliminated
    pub elimination_round: Option<u32>,
}

/// Weighted two-axis scoring
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringModel {
    economic_weight: f64,
    reputation_weight: f64,
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self::new(&ScoringConfig::default())
    }
}

fn norm(value: i64, max: i64) -> f64 {
    if max <= 0 {
        0.0
    } else {
        value as f64 / max as f64
    }
}

/// Survivors first, then later eliminations
fn survival_order(a: Option<u32>, b: Option<u32>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => b.cmp(&a),
    }
}

impl ScoringModel {
    /// Model with the configured weights
    pub fn new(config: &ScoringConfig) -> Self {
        Self {
            economic_weight: config.economic_weight,
            reputation_weight: config.reputation_weight,
        }
    }

    /// Score a single participant against the roster maxima
    pub fn score(&self, p: &ParticipantState, max_balance: i64, max_reputation: i64) -> f64 {
        self.economic_weight * norm(p.balance, max_balance)
            + self.reputation_weight * norm(p.reputation, max_reputation)
    }

    /// Rank every participant, alive or not.
    ///
    /// Sorted by score descending; ties go to the participant eliminated
    /// later (survivors first), then to participant id.
    pub fn rank(&self, roster: &Roster) -> Vec<ScoreEntry> {
        let max_balance = roster.iter().map(|p| p.balance).max().unwrap_or(0);
        let max_reputation = roster.iter().map(|p| p.reputation).max().unwrap_or(0);

        let mut entries: Vec<ScoreEntry> = roster
            .iter()
            .map(|p| ScoreEntry {
                rank: 0,
                participant: p.id.clone(),
                score: self.score(p, max_balance, max_reputation),
                economic_norm: norm(p.balance, max_balance),
                reputation_norm: norm(p.reputation, max_reputation),
                balance: p.balance,
                reputation: p.reputation,
                elimination_round: p.elimination_round,
            })
            .collect();

        entries.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| survival_order(a.elimination_round, b.elimination_round))
                .then_with(|| a.participant.cmp(&b.participant))
        });
        for (i, entry) in entries.iter_mut().enumerate() {
            entry.rank = i + 1;
        }
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(entries: &[(&str, i64, i64)]) -> Roster {
        Roster::new(
            entries
                .iter()
                .map(|(name, balance, reputation)| {
                    let mut p = ParticipantState::new(*name, *balance);
                    p.reputation = *reputation;
                    p
                })
                .collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_leader_on_both_axes_scores_one() {
        let roster = roster(&[("Grok", 3000, 4), ("Claude", 1500, 2)]);
        let ranking = ScoringModel::default().rank(&roster);
        assert_eq!(ranking[0].participant, ParticipantId::new("Grok"));
        assert_eq!(ranking[0].score, 1.0);
        assert!((ranking[1].score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_zero_reputation_scores_only_economics() {
        let roster = roster(&[("Grok", 1000, 5), ("Claude", 500, 0)]);
        let ranking = ScoringModel::default().rank(&roster);
        let claude = ranking.iter().find(|e| e.participant.as_str() == "Claude").unwrap();
        assert!((claude.score - 0.3).abs() < 1e-9);
        assert_eq!(claude.reputation_norm, 0.0);
    }

    #[test]
    fn test_non_positive_maxima_guarded() {
        let roster = roster(&[("Grok", 0, -2), ("Claude", 0, -1)]);
        let ranking = ScoringModel::default().rank(&roster);
        assert!(ranking.iter().all(|e| e.score == 0.0));
    }

    #[test]
    fn test_ties_prefer_later_elimination_then_id() {
        let mut roster = roster(&[
            ("Grok", 0, 0),
            ("Claude", 0, 0),
            ("DeepSeek", 0, 0),
            ("ChatGPT", 0, 0),
        ]);
        roster.get_mut(&"Grok".into()).unwrap().eliminate(2);
        roster.get_mut(&"Claude".into()).unwrap().eliminate(7);
        let ranking = ScoringModel::default().rank(&roster);
        let order: Vec<&str> = ranking.iter().map(|e| e.participant.as_str()).collect();
        assert_eq!(order, vec!["ChatGPT", "DeepSeek", "Claude", "Grok"]);
        assert_eq!(ranking[3].rank, 4);
    }

    #[test]
    fn test_full_tie_ignores_roster_order() {
        let forward = roster(&[("Grok", 10, 1), ("Claude", 10, 1), ("ChatGPT", 10, 1)]);
        let reversed = roster(&[("ChatGPT", 10, 1), ("Claude", 10, 1), ("Grok", 10, 1)]);
        let ids = |r: &Roster| -> Vec<String> {
            ScoringModel::default()
                .rank(r)
                .into_iter()
                .map(|e| e.participant.as_str().to_string())
                .collect()
        };
        assert_eq!(ids(&forward), vec!["ChatGPT", "Claude", "Grok"]);
        assert_eq!(ids(&forward), ids(&reversed));
    }
}
