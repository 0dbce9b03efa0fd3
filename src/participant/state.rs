//! Per-participant mutable state.

use serde::{Deserialize, Serialize};

use crate::economy::LoanId;
use crate::levels::{LevelTier, PerformanceLevelTable, BASELINE_LEVEL};

/// Stable participant handle (the roster name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Create an id from a roster name
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Hidden role assigned at season start
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Ordinary participant
    #[default]
    Normal,
    /// Holds private information and a reveal option
    Traitor,
}

/// Public visibility of a traitor's role.
///
/// `Hidden -> Revealed` and `Hidden -> Exposed` are the only transitions;
/// both are irreversible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "round")]
pub enum RoleStatus {
    /// Nobody else knows
    #[default]
    Hidden,
    /// The traitor revealed itself in the given round
    Revealed(u32),
    /// The others exposed the traitor in the given round
    Exposed(u32),
}

/// Lifetime counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantStats {
    /// Everything ever credited (starting balance included)
    pub total_earned: i64,
    /// Everything ever debited
    pub total_spent: i64,
    /// Interest credited
    pub total_interest_earned: i64,
    /// Tokens gifted to others
    pub donations_given: i64,
    /// Tokens gifted by others
    pub donations_received: i64,
    /// Rounds judged best
    pub best_count: u32,
    /// Rounds judged worst
    pub worst_count: u32,
}

/// A participant's complete engine-side record.
///
/// Invariant: once `alive` is false the level stays at or below the
/// elimination threshold and only resurrection can change the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantState {
    /// Stable handle
    pub id: ParticipantId,
    /// Current performance level
    pub level: i32,
    /// Still competing
    pub alive: bool,
    /// Round in which the participant was eliminated
    pub elimination_round: Option<u32>,
    /// Token bank
    pub balance: i64,
    /// Loans where this participant is the borrower, in creation order
    pub debts_owed: Vec<LoanId>,
    /// Loans where this participant is the lender, in creation order
    pub debts_held: Vec<LoanId>,
    /// Reputation axis of the final score
    pub reputation: i64,
    /// Hidden role
    pub role: Role,
    /// Role visibility
    pub role_status: RoleStatus,
    /// Rounds of post-reveal effects still to apply
    pub reveal_rounds_remaining: u32,
    /// Individual sabotage actions left
    pub sabotage_charges: u32,
    /// A sabotage load is queued for the next prompt
    pub sabotaged: bool,
    /// May be drawn as the traitor
    pub traitor_eligible: bool,
    /// Receives the cooperation mechanics in its prompts
    pub knows_cooperation_mechanics: bool,
    /// Private context only this participant sees
    pub private_context: Option<String>,
    /// Lifetime counters
    pub stats: ParticipantStats,
}

impl ParticipantState {
    /// Create a participant at baseline level with a starting balance
    pub fn new(id: impl Into<ParticipantId>, starting_balance: i64) -> Self {
        Self {
            id: id.into(),
            level: BASELINE_LEVEL,
            alive: true,
            elimination_round: None,
            balance: starting_balance,
            debts_owed: Vec::new(),
            debts_held: Vec::new(),
            reputation: 0,
            role: Role::Normal,
            role_status: RoleStatus::Hidden,
            reveal_rounds_remaining: 0,
            sabotage_charges: 0,
            sabotaged: false,
            traitor_eligible: true,
            knows_cooperation_mechanics: false,
            private_context: None,
            stats: ParticipantStats {
                total_earned: starting_balance,
                ..Default::default()
            },
        }
    }

    /// Set the starting level
    pub fn with_level(mut self, level: i32) -> Self {
        self.level = level;
        self
    }

    /// Set the sabotage charge allowance
    pub fn with_sabotage_charges(mut self, charges: u32) -> Self {
        self.sabotage_charges = charges;
        self
    }

    /// Enable the cooperation-aware prompt variant
    pub fn with_cooperation_mechanics(mut self, enabled: bool) -> Self {
        self.knows_cooperation_mechanics = enabled;
        self
    }

    /// Set traitor eligibility
    pub fn with_traitor_eligible(mut self, eligible: bool) -> Self {
        self.traitor_eligible = eligible;
        self
    }

    /// Attach private context
    pub fn with_private_context(mut self, context: Option<String>) -> Self {
        self.private_context = context;
        self
    }

    /// Whether the participant can cover `amount`
    pub fn can_afford(&self, amount: i64) -> bool {
        self.balance >= amount
    }

    /// Whether the participant is a traitor that others know about
    pub fn role_revealed(&self) -> bool {
        !matches!(self.role_status, RoleStatus::Hidden)
    }

    /// Whether the participant is the traitor and still hidden
    pub fn is_hidden_traitor(&self) -> bool {
        self.role == Role::Traitor && self.role_status == RoleStatus::Hidden
    }

    /// Level tier used for generation (clamped into the table domain)
    pub fn tier(&self) -> LevelTier {
        PerformanceLevelTable::config_for(PerformanceLevelTable::clamp(self.level))
    }

    /// Credit tokens. Negative amounts are ignored.
    pub(crate) fn credit(&mut self, amount: i64) {
        if amount <= 0 {
            return;
        }
        self.balance += amount;
        self.stats.total_earned += amount;
    }

    /// Debit tokens if affordable; no change otherwise
    pub(crate) fn debit(&mut self, amount: i64) -> bool {
        if amount < 0 || !self.can_afford(amount) {
            return false;
        }
        self.balance -= amount;
        self.stats.total_spent += amount;
        true
    }

    /// Mark eliminated in `round`.
    ///
    /// Returns `true` only on the first call; later calls keep the original
    /// elimination round.
    pub fn eliminate(&mut self, round: u32) -> bool {
        if !self.alive {
            return false;
        }
        self.alive = false;
        self.elimination_round = Some(round);
        self.sabotaged = false;
        true
    }

    /// Bring an eliminated participant back at `level`
    pub(crate) fn revive(&mut self, level: i32) {
        self.alive = true;
        self.elimination_round = None;
        self.level = level;
    }

    /// Compact one-line status for logs and prompts
    pub fn status_line(&self) -> String {
        if self.alive {
            format!(
                "{}: Level {:+}, {} tokens, Rep {}",
                self.id, self.level, self.balance, self.reputation
            )
        } else {
            format!(
                "{}: ELIMINATED (round {})",
                self.id,
                self.elimination_round.unwrap_or_default()
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_participant_defaults() {
        let p = ParticipantState::new("Claude", 1000);
        assert_eq!(p.level, 0);
        assert!(p.alive);
        assert_eq!(p.balance, 1000);
        assert_eq!(p.stats.total_earned, 1000);
        assert_eq!(p.role, Role::Normal);
        assert!(!p.role_revealed());
    }

    #[test]
    fn test_debit_is_all_or_nothing() {
        let mut p = ParticipantState::new("Grok", 100);
        assert!(!p.debit(101));
        assert_eq!(p.balance, 100);
        assert_eq!(p.stats.total_spent, 0);

        assert!(p.debit(100));
        assert_eq!(p.balance, 0);
        assert_eq!(p.stats.total_spent, 100);
    }

    #[test]
    fn test_eliminate_is_idempotent() {
        let mut p = ParticipantState::new("DeepSeek", 0);
        assert!(p.eliminate(4));
        assert!(!p.eliminate(9));
        assert_eq!(p.elimination_round, Some(4));
        assert!(!p.alive);
    }

    #[test]
    fn test_tier_clamps_below_table() {
        let p = ParticipantState::new("ChatGPT", 0).with_level(-6);
        assert_eq!(p.tier().level, crate::levels::MIN_LEVEL);
    }

    #[test]
    fn test_role_status_serialization() {
        let json = serde_json::to_string(&RoleStatus::Revealed(7)).unwrap();
        assert_eq!(json, r#"{"status":"revealed","round":7}"#);
    }
}
