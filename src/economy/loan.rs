//! Loans and the loan book.

use serde::{Deserialize, Serialize};

use crate::participant::ParticipantId;

/// Loan identifier, assigned in creation order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LoanId(pub u64);

impl std::fmt::Display for LoanId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Loan#{}", self.0)
    }
}

/// Settlement state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "round")]
pub enum LoanStatus {
    /// Counting down to maturity
    Active,
    /// Paid in full at maturity
    Repaid(u32),
    /// Borrower could not pay at maturity
    Defaulted(u32),
}

/// A tracked obligation between two participants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Loan {
    /// Identifier
    pub id: LoanId,
    /// Participant who advanced the principal
    pub lender: ParticipantId,
    /// Participant who owes the repayment
    pub borrower: ParticipantId,
    /// Tokens advanced
    pub principal: i64,
    /// Interest charged over the whole term (0.2 = 20%)
    pub interest_rate: f64,
    /// Term in rounds
    pub term_rounds: u32,
    /// Rounds until maturity
    pub rounds_remaining: u32,
    /// Round the loan was issued in
    pub issued_round: u32,
    /// Last round whose tick already counted down this loan
    pub last_ticked_round: Option<u32>,
    /// Settlement state
    pub status: LoanStatus,
}

impl Loan {
    /// Principal plus interest, rounded down to whole tokens
    pub fn amount_due(&self) -> i64 {
        self.principal
            .saturating_add(apply_rate(self.principal, self.interest_rate))
    }

    /// Whether the loan still counts down
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }
}

/// Highest interest rate a loan may carry over its term (1000%)
pub const MAX_LOAN_RATE: f64 = 10.0;

/// Apply a fractional rate to a token amount, truncating toward zero.
///
/// Rates are resolved to basis points first so that `500 * 0.2` is exactly
/// `100` rather than depending on float rounding. Results outside the
/// `i64` range saturate; a non-finite rate yields 0.
pub fn apply_rate(amount: i64, rate: f64) -> i64 {
    if !rate.is_finite() {
        return 0;
    }
    // Float-to-int `as` saturates at the i128 bounds.
    let bps = (rate * 10_000.0).round() as i128;
    let scaled = match i128::from(amount).checked_mul(bps) {
        Some(product) => product / 10_000,
        None if (amount < 0) == (bps < 0) => i128::MAX,
        None => i128::MIN,
    };
    i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
}

/// Every loan ever issued this season, in creation order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoanBook {
    loans: Vec<Loan>,
    next_id: u64,
}

impl LoanBook {
    /// Create an empty book
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new loan and return its id
    pub(crate) fn issue(
        &mut self,
        lender: ParticipantId,
        borrower: ParticipantId,
        principal: i64,
        interest_rate: f64,
        term_rounds: u32,
        round: u32,
    ) -> LoanId {
        let id = LoanId(self.next_id);
        self.next_id += 1;
        self.loans.push(Loan {
            id,
            lender,
            borrower,
            principal,
            interest_rate,
            term_rounds,
            rounds_remaining: term_rounds,
            issued_round: round,
            last_ticked_round: None,
            status: LoanStatus::Active,
        });
        id
    }

    /// Look up a loan
    pub fn get(&self, id: LoanId) -> Option<&Loan> {
        self.loans.iter().find(|l| l.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: LoanId) -> Option<&mut Loan> {
        self.loans.iter_mut().find(|l| l.id == id)
    }

    /// Loans still counting down
    pub fn active(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|l| l.is_active())
    }

    /// All loans, settled ones included
    pub fn all(&self) -> &[Loan] {
        &self.loans
    }
}
