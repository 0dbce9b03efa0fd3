//! Token economy.
//!
//! Interest, stipends, bonuses, donations, loans, self-rescue and
//! resurrection. All token deltas are whole tokens truncated toward zero.

mod events;
mod ledger;
mod loan;

pub use events::{EconomyEvent, Sponsor};
pub use ledger::{EconomyResult, TokenEconomy};
pub use loan::{apply_rate, Loan, LoanBook, LoanId, LoanStatus, MAX_LOAN_RATE};
