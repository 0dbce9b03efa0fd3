//! Economy event journal entries.

use serde::{Deserialize, Serialize};

use super::loan::LoanId;
use crate::participant::ParticipantId;

/// Who pays for a resurrection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "id")]
pub enum Sponsor {
    /// Another (alive) participant
    Participant(ParticipantId),
    /// The season's shared pool
    Pool,
}

/// A single state change made by the token economy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EconomyEvent {
    /// Interest credited on a positive balance
    Interest {
        /// Recipient
        participant: ParticipantId,
        /// Tokens credited
        amount: i64,
    },
    /// Tokens credited for a reason
    Earned {
        /// Recipient
        participant: ParticipantId,
        /// Tokens credited
        amount: i64,
        /// Audit reason
        reason: String,
    },
    /// Tokens debited for a reason
    Spent {
        /// Payer
        participant: ParticipantId,
        /// Tokens debited
        amount: i64,
        /// Audit reason
        reason: String,
    },
    /// Tokens exchanged for levels
    SelfRescue {
        /// Participant
        participant: ParticipantId,
        /// Tokens paid
        cost: i64,
        /// Level after the boost
        level: i32,
    },
    /// Gift between participants
    Donation {
        /// Donor
        from: ParticipantId,
        /// Recipient
        to: ParticipantId,
        /// Tokens moved
        amount: i64,
    },
    /// Principal advanced
    LoanIssued {
        /// Loan id
        loan: LoanId,
        /// Lender
        lender: ParticipantId,
        /// Borrower
        borrower: ParticipantId,
        /// Principal
        principal: i64,
        /// Interest over the term
        interest_rate: f64,
        /// Term in rounds
        term_rounds: u32,
    },
    /// Loan paid at maturity
    LoanRepaid {
        /// Loan id
        loan: LoanId,
        /// Lender (credited)
        lender: ParticipantId,
        /// Borrower (debited)
        borrower: ParticipantId,
        /// Tokens moved
        amount: i64,
    },
    /// Loan unpaid at maturity
    LoanDefaulted {
        /// Loan id
        loan: LoanId,
        /// Lender
        lender: ParticipantId,
        /// Borrower
        borrower: ParticipantId,
        /// Amount that was due
        amount_due: i64,
    },
    /// Everybody survived
    GroupBonus {
        /// Tokens per participant
        amount: i64,
        /// Participants credited
        recipients: usize,
    },
    /// Eliminated participant brought back
    Resurrection {
        /// Revived participant
        participant: ParticipantId,
        /// Payer
        sponsor: Sponsor,
        /// Tokens paid
        cost: i64,
        /// Level after revival
        level: i32,
    },
}

impl EconomyEvent {
    /// Participants whose balance this event touched
    pub fn participants(&self) -> Vec<&ParticipantId> {
        match self {
            Self::Interest { participant, .. }
            | Self::Earned { participant, .. }
            | Self::Spent { participant, .. }
            | Self::SelfRescue { participant, .. } => vec![participant],
            Self::Donation { from, to, .. } => vec![from, to],
            Self::LoanIssued {
                lender, borrower, ..
            }
            | Self::LoanRepaid {
                lender, borrower, ..
            } => vec![lender, borrower],
            Self::LoanDefaulted { borrower, .. } => vec![borrower],
            Self::GroupBonus { .. } => vec![],
            Self::Resurrection {
                participant,
                sponsor,
                ..
            } => match sponsor {
                Sponsor::Participant(id) => vec![participant, id],
                Sponsor::Pool => vec![participant],
            },
        }
    }
}
