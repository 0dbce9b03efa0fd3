//! Token economy operations.
//!
//! Every operation is all-or-nothing: affordability and roster checks run
//! before any balance moves, and a failed operation leaves every
//! participant untouched.

use tracing::{debug, info};

use super::events::{EconomyEvent, Sponsor};
use super::loan::{apply_rate, LoanBook, LoanId, LoanStatus, MAX_LOAN_RATE};
use crate::config::EconomyConfig;
use crate::error::EconomyError;
use crate::levels::MAX_LEVEL;
use crate::participant::{ParticipantId, ParticipantState, Roster};

/// Economy result alias
pub type EconomyResult<T> = std::result::Result<T, EconomyError>;

/// Token economy: constants, the loan book, the resurrection pool and the
/// event journal of the round in progress.
#[derive(Debug, Clone)]
pub struct TokenEconomy {
    config: EconomyConfig,
    loans: LoanBook,
    pool: i64,
    journal: Vec<EconomyEvent>,
}

impl TokenEconomy {
    /// Create an economy with an empty loan book
    pub fn new(config: EconomyConfig) -> Self {
        let pool = config.resurrection_pool;
        Self {
            config,
            loans: LoanBook::new(),
            pool,
            journal: Vec::new(),
        }
    }

    /// Economy constants
    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    /// Loan book
    pub fn loans(&self) -> &LoanBook {
        &self.loans
    }

    /// Tokens left in the resurrection pool
    pub fn pool(&self) -> i64 {
        self.pool
    }

    /// Events recorded since the last drain
    pub fn events(&self) -> &[EconomyEvent] {
        &self.journal
    }

    /// Drain the journal
    pub fn take_events(&mut self) -> Vec<EconomyEvent> {
        std::mem::take(&mut self.journal)
    }

    /// Credit interest on a positive balance; returns the delta
    pub fn apply_interest(&mut self, p: &mut ParticipantState) -> i64 {
        if !p.alive || p.balance <= 0 {
            return 0;
        }
        let delta = apply_rate(p.balance, self.config.interest_rate);
        if delta > 0 {
            p.balance += delta;
            p.stats.total_interest_earned += delta;
            self.journal.push(EconomyEvent::Interest {
                participant: p.id.clone(),
                amount: delta,
            });
        }
        delta
    }

    /// Credit tokens with an audit reason. Negative amounts are ignored.
    pub fn earn(&mut self, p: &mut ParticipantState, amount: i64, reason: &str) {
        if amount <= 0 {
            return;
        }
        p.credit(amount);
        self.journal.push(EconomyEvent::Earned {
            participant: p.id.clone(),
            amount,
            reason: reason.to_string(),
        });
    }

    /// Debit tokens with an audit reason.
    ///
    /// Returns `false` and changes nothing when the balance does not cover
    /// `amount`.
    pub fn spend(&mut self, p: &mut ParticipantState, amount: i64, reason: &str) -> bool {
        if !p.debit(amount) {
            return false;
        }
        if amount > 0 {
            self.journal.push(EconomyEvent::Spent {
                participant: p.id.clone(),
                amount,
                reason: reason.to_string(),
            });
        }
        true
    }

    /// Charge the bank for `tokens` generated tokens.
    ///
    /// The charge is capped at the current balance so a long answer drains
    /// the bank to zero instead of overdrawing it. Returns the tokens taken.
    pub fn charge_generation(&mut self, p: &mut ParticipantState, tokens: u32) -> i64 {
        let cost = i64::from(tokens).saturating_mul(self.config.generation_cost_per_token);
        let charged = cost.min(p.balance.max(0));
        if charged <= 0 || !self.spend(p, charged, "generation") {
            return 0;
        }
        debug!(participant = %p.id, tokens, charged, "Generation charged");
        charged
    }

    /// Buy `self_rescue_boost` levels for `self_rescue_cost` tokens.
    ///
    /// Returns the new level.
    pub fn self_rescue(&mut self, p: &mut ParticipantState) -> EconomyResult<i32> {
        if !p.alive {
            return Err(EconomyError::Eliminated(p.id.clone()));
        }
        let cost = self.config.self_rescue_cost;
        if !p.debit(cost) {
            return Err(EconomyError::InsufficientFunds {
                needed: cost,
                available: p.balance,
            });
        }
        p.level = (p.level + self.config.self_rescue_boost).min(MAX_LEVEL);
        info!(participant = %p.id, level = p.level, cost, "Self-rescue");
        self.journal.push(EconomyEvent::SelfRescue {
            participant: p.id.clone(),
            cost,
            level: p.level,
        });
        Ok(p.level)
    }

    /// Gift tokens from one participant to another
    pub fn donate(
        &mut self,
        roster: &mut Roster,
        from: &ParticipantId,
        to: &ParticipantId,
        amount: i64,
    ) -> EconomyResult<()> {
        if amount <= 0 {
            return Err(EconomyError::InvalidAmount(amount));
        }
        let (donor, recipient) = pair(roster, from, to)?;
        if !donor.alive {
            return Err(EconomyError::Eliminated(donor.id.clone()));
        }
        if !recipient.alive {
            return Err(EconomyError::Eliminated(recipient.id.clone()));
        }
        if !donor.can_afford(amount) {
            return Err(EconomyError::InsufficientFunds {
                needed: amount,
                available: donor.balance,
            });
        }
        donor.debit(amount);
        recipient.credit(amount);
        donor.stats.donations_given += amount;
        recipient.stats.donations_received += amount;

        info!(from = %from, to = %to, amount, "Donation");
        self.journal.push(EconomyEvent::Donation {
            from: from.clone(),
            to: to.clone(),
            amount,
        });
        Ok(())
    }

    /// Advance `principal` from lender to borrower and track the loan on both
    #[allow(clippy::too_many_arguments)]
    pub fn offer_loan(
        &mut self,
        roster: &mut Roster,
        lender: &ParticipantId,
        borrower: &ParticipantId,
        principal: i64,
        interest_rate: f64,
        term_rounds: u32,
        round: u32,
    ) -> EconomyResult<LoanId> {
        if principal <= 0 {
            return Err(EconomyError::InvalidAmount(principal));
        }
        if term_rounds == 0 {
            return Err(EconomyError::InvalidTerms(
                "term must be at least one round".into(),
            ));
        }
        if !(0.0..=MAX_LOAN_RATE).contains(&interest_rate) {
            return Err(EconomyError::InvalidTerms(format!(
                "interest rate {interest_rate} must be within 0..={MAX_LOAN_RATE}"
            )));
        }
        let (l, b) = pair(roster, lender, borrower)?;
        if !l.alive {
            return Err(EconomyError::Eliminated(l.id.clone()));
        }
        if !b.alive {
            return Err(EconomyError::Eliminated(b.id.clone()));
        }
        if !l.can_afford(principal) {
            return Err(EconomyError::InsufficientFunds {
                needed: principal,
                available: l.balance,
            });
        }

        // Principal moves as a transfer, not as spending or earning.
        l.balance -= principal;
        b.balance += principal;
        let id = self.loans.issue(
            lender.clone(),
            borrower.clone(),
            principal,
            interest_rate,
            term_rounds,
            round,
        );
        l.debts_held.push(id);
        b.debts_owed.push(id);

        info!(%id, lender = %lender, borrower = %borrower, principal, interest_rate, term_rounds, "Loan issued");
        self.journal.push(EconomyEvent::LoanIssued {
            loan: id,
            lender: lender.clone(),
            borrower: borrower.clone(),
            principal,
            interest_rate,
            term_rounds,
        });
        Ok(id)
    }

    /// Count down the borrower's loans for `round` and settle matured ones.
    ///
    /// Loans are processed in the borrower's list order. A loan already
    /// ticked for `round` is skipped, so calling this twice in one round is
    /// harmless. Returns the number of loans that matured.
    pub fn tick_loans(&mut self, roster: &mut Roster, borrower: &ParticipantId, round: u32) -> usize {
        let Some(owed) = roster.get(borrower).map(|p| p.debts_owed.clone()) else {
            return 0;
        };
        let mut matured = 0;

        for id in owed {
            let Some(loan) = self.loans.get_mut(id) else {
                continue;
            };
            if !loan.is_active() || loan.last_ticked_round == Some(round) {
                continue;
            }
            loan.last_ticked_round = Some(round);
            loan.rounds_remaining = loan.rounds_remaining.saturating_sub(1);
            debug!(%id, remaining = loan.rounds_remaining, "Loan ticked");
            if loan.rounds_remaining > 0 {
                continue;
            }

            matured += 1;
            let due = loan.amount_due();
            let lender = loan.lender.clone();
            let Some((b, l)) = roster.pair_mut(borrower, &lender) else {
                continue;
            };

            if b.can_afford(due) {
                b.balance -= due;
                l.balance += due;
                loan.status = LoanStatus::Repaid(round);
                info!(%id, borrower = %borrower, lender = %lender, due, "Loan repaid");
                self.journal.push(EconomyEvent::LoanRepaid {
                    loan: id,
                    lender: lender.clone(),
                    borrower: borrower.clone(),
                    amount: due,
                });
            } else {
                loan.status = LoanStatus::Defaulted(round);
                info!(%id, borrower = %borrower, lender = %lender, due, balance = b.balance, "Loan defaulted");
                self.journal.push(EconomyEvent::LoanDefaulted {
                    loan: id,
                    lender: lender.clone(),
                    borrower: borrower.clone(),
                    amount_due: due,
                });
            }
            b.debts_owed.retain(|x| *x != id);
            l.debts_held.retain(|x| *x != id);
        }
        matured
    }

    /// Credit `amount` to every participant if and only if all are alive
    pub fn group_bonus(&mut self, roster: &mut Roster, amount: i64) -> bool {
        if !roster.all_alive() {
            return false;
        }
        if amount > 0 {
            for p in roster.iter_mut() {
                p.credit(amount);
            }
        }
        info!(amount, "Group bonus: everyone survived");
        self.journal.push(EconomyEvent::GroupBonus {
            amount,
            recipients: roster.len(),
        });
        true
    }

    /// Revive an eliminated participant at `resurrection_level`
    pub fn resurrect(
        &mut self,
        roster: &mut Roster,
        target: &ParticipantId,
        sponsor: Sponsor,
    ) -> EconomyResult<()> {
        let cost = self.config.resurrection_cost;
        let level = self.config.resurrection_level;
        let revived = roster
            .get(target)
            .ok_or_else(|| EconomyError::UnknownParticipant(target.to_string()))?;
        if revived.alive {
            return Err(EconomyError::NotEliminated(target.clone()));
        }

        match &sponsor {
            Sponsor::Participant(payer) => {
                if payer == target {
                    return Err(EconomyError::SelfTarget(payer.clone()));
                }
                let p = roster
                    .get_mut(payer)
                    .ok_or_else(|| EconomyError::UnknownParticipant(payer.to_string()))?;
                if !p.alive {
                    return Err(EconomyError::Eliminated(payer.clone()));
                }
                if !p.debit(cost) {
                    return Err(EconomyError::InsufficientFunds {
                        needed: cost,
                        available: p.balance,
                    });
                }
            },
            Sponsor::Pool => {
                if self.pool < cost {
                    return Err(EconomyError::InsufficientFunds {
                        needed: cost,
                        available: self.pool,
                    });
                }
                self.pool -= cost;
            },
        }

        if let Some(p) = roster.get_mut(target) {
            p.revive(level);
        }
        info!(participant = %target, ?sponsor, cost, level, "Resurrection");
        self.journal.push(EconomyEvent::Resurrection {
            participant: target.clone(),
            sponsor,
            cost,
            level,
        });
        Ok(())
    }
}

fn pair<'a>(
    roster: &'a mut Roster,
    a: &ParticipantId,
    b: &ParticipantId,
) -> EconomyResult<(&'a mut ParticipantState, &'a mut ParticipantState)> {
    if a == b {
        return Err(EconomyError::SelfTarget(a.clone()));
    }
    if roster.get(a).is_none() {
        return Err(EconomyError::UnknownParticipant(a.to_string()));
    }
    if roster.get(b).is_none() {
        return Err(EconomyError::UnknownParticipant(b.to_string()));
    }
    roster
        .pair_mut(a, b)
        .ok_or_else(|| EconomyError::SelfTarget(a.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster() -> Roster {
        Roster::new(vec![
            ParticipantState::new("P1", 1000),
            ParticipantState::new("P2", 1000),
            ParticipantState::new("P3", 1000),
        ])
        .unwrap()
    }

    fn id(name: &str) -> ParticipantId {
        ParticipantId::new(name)
    }

    #[test]
    fn test_interest_floor() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut p = ParticipantState::new("P1", 1019);
        assert_eq!(economy.apply_interest(&mut p), 50);
        assert_eq!(p.balance, 1069);
        assert_eq!(p.stats.total_interest_earned, 50);
    }

    #[test]
    fn test_interest_skips_empty_and_eliminated() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut broke = ParticipantState::new("P1", 0);
        assert_eq!(economy.apply_interest(&mut broke), 0);

        let mut gone = ParticipantState::new("P2", 1000);
        gone.eliminate(1);
        assert_eq!(economy.apply_interest(&mut gone), 0);
        assert_eq!(gone.balance, 1000);
        assert!(economy.events().is_empty());
    }

    #[test]
    fn test_spend_contract() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut p = ParticipantState::new("P1", 100);
        assert!(!economy.spend(&mut p, 150, "statement"));
        assert_eq!(p.balance, 100);
        assert!(economy.spend(&mut p, 40, "statement"));
        assert_eq!(p.balance, 60);
        assert_eq!(p.stats.total_spent, 40);
    }

    #[test]
    fn test_earn_records_reason() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut p = ParticipantState::new("P1", 0);
        economy.earn(&mut p, 100, "survival stipend");
        assert_eq!(p.balance, 100);
        assert_eq!(p.stats.total_earned, 100);
        assert!(matches!(
            &economy.events()[0],
            EconomyEvent::Earned { reason, .. } if reason == "survival stipend"
        ));
    }

    #[test]
    fn test_generation_charge_caps_at_balance() {
        let mut economy = TokenEconomy::new(EconomyConfig {
            generation_cost_per_token: 2,
            ..EconomyConfig::default()
        });
        let mut p = ParticipantState::new("P1", 100);
        assert_eq!(economy.charge_generation(&mut p, 30), 60);
        assert_eq!(p.balance, 40);
        assert_eq!(economy.charge_generation(&mut p, 30), 40);
        assert_eq!(p.balance, 0);
        assert_eq!(economy.charge_generation(&mut p, 30), 0);
        assert_eq!(p.stats.total_spent, 100);

        let mut free = TokenEconomy::new(EconomyConfig::default());
        let mut q = ParticipantState::new("P2", 100);
        assert_eq!(free.charge_generation(&mut q, 500), 0);
        assert!(free.events().is_empty());
    }

    #[test]
    fn test_self_rescue_insufficient_funds() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut p = ParticipantState::new("P1", 900).with_level(-5);
        let err = economy.self_rescue(&mut p).unwrap_err();
        assert_eq!(
            err,
            EconomyError::InsufficientFunds {
                needed: 1000,
                available: 900
            }
        );
        assert_eq!(p.balance, 900);
        assert_eq!(p.level, -5);
    }

    #[test]
    fn test_self_rescue_clamps_to_max() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut p = ParticipantState::new("P1", 1500).with_level(2);
        assert_eq!(economy.self_rescue(&mut p).unwrap(), MAX_LEVEL);
        assert_eq!(p.balance, 500);
    }

    #[test]
    fn test_self_rescue_rejects_eliminated() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut p = ParticipantState::new("P1", 5000).with_level(-6);
        p.eliminate(2);
        assert!(matches!(
            economy.self_rescue(&mut p),
            Err(EconomyError::Eliminated(_))
        ));
        assert_eq!(p.balance, 5000);
    }

    #[test]
    fn test_donate_moves_tokens_and_counters() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        economy.donate(&mut roster, &id("P1"), &id("P2"), 300).unwrap();

        let p1 = roster.get(&id("P1")).unwrap();
        let p2 = roster.get(&id("P2")).unwrap();
        assert_eq!(p1.balance, 700);
        assert_eq!(p2.balance, 1300);
        assert_eq!(p1.stats.donations_given, 300);
        assert_eq!(p2.stats.donations_received, 300);
    }

    #[test]
    fn test_donate_rejections() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        roster.get_mut(&id("P3")).unwrap().eliminate(1);

        assert!(matches!(
            economy.donate(&mut roster, &id("P1"), &id("P2"), 5000),
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            economy.donate(&mut roster, &id("P1"), &id("P3"), 10),
            Err(EconomyError::Eliminated(_))
        ));
        assert!(matches!(
            economy.donate(&mut roster, &id("P1"), &id("P1"), 10),
            Err(EconomyError::SelfTarget(_))
        ));
        assert!(matches!(
            economy.donate(&mut roster, &id("P1"), &id("Nobody"), 10),
            Err(EconomyError::UnknownParticipant(_))
        ));
        assert!(roster.iter().all(|p| p.balance == 1000));
    }

    #[test]
    fn test_loan_repaid_at_maturity() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        let loan = economy
            .offer_loan(&mut roster, &id("P1"), &id("P2"), 500, 0.2, 2, 1)
            .unwrap();
        assert_eq!(roster.get(&id("P1")).unwrap().balance, 500);
        assert_eq!(roster.get(&id("P2")).unwrap().balance, 1500);

        assert_eq!(economy.tick_loans(&mut roster, &id("P2"), 1), 0);
        assert_eq!(economy.loans().get(loan).unwrap().rounds_remaining, 1);

        assert_eq!(economy.tick_loans(&mut roster, &id("P2"), 2), 1);
        let p1 = roster.get(&id("P1")).unwrap();
        let p2 = roster.get(&id("P2")).unwrap();
        assert_eq!(p2.balance, 900);
        assert_eq!(p1.balance, 1100);
        assert!(p1.debts_held.is_empty());
        assert!(p2.debts_owed.is_empty());
        assert_eq!(economy.loans().get(loan).unwrap().status, LoanStatus::Repaid(2));
    }

    #[test]
    fn test_loan_default_leaves_balances() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        let loan = economy
            .offer_loan(&mut roster, &id("P1"), &id("P2"), 500, 0.2, 1, 1)
            .unwrap();
        roster.get_mut(&id("P2")).unwrap().balance = 599;

        assert_eq!(economy.tick_loans(&mut roster, &id("P2"), 1), 1);
        assert_eq!(roster.get(&id("P2")).unwrap().balance, 599);
        assert_eq!(roster.get(&id("P1")).unwrap().balance, 500);
        assert!(roster.get(&id("P2")).unwrap().debts_owed.is_empty());
        assert_eq!(
            economy.loans().get(loan).unwrap().status,
            LoanStatus::Defaulted(1)
        );
    }

    #[test]
    fn test_loan_rate_is_capped() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        for rate in [1e17, MAX_LOAN_RATE + 0.01, f64::INFINITY, f64::NAN, -0.1] {
            assert!(matches!(
                economy.offer_loan(&mut roster, &id("P1"), &id("P2"), 100, rate, 1, 1),
                Err(EconomyError::InvalidTerms(_))
            ));
        }
        assert!(roster.iter().all(|p| p.balance == 1000));
        assert!(economy.loans().all().is_empty());

        let loan = economy
            .offer_loan(&mut roster, &id("P1"), &id("P2"), 100, MAX_LOAN_RATE, 1, 1)
            .unwrap();
        assert_eq!(economy.loans().get(loan).unwrap().amount_due(), 1100);
    }

    #[test]
    fn test_tick_is_idempotent_within_round() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        let loan = economy
            .offer_loan(&mut roster, &id("P1"), &id("P2"), 100, 0.0, 3, 1)
            .unwrap();
        economy.tick_loans(&mut roster, &id("P2"), 1);
        economy.tick_loans(&mut roster, &id("P2"), 1);
        assert_eq!(economy.loans().get(loan).unwrap().rounds_remaining, 2);
    }

    #[test]
    fn test_loans_settle_in_creation_order() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        let first = economy
            .offer_loan(&mut roster, &id("P1"), &id("P3"), 800, 0.0, 1, 1)
            .unwrap();
        let second = economy
            .offer_loan(&mut roster, &id("P2"), &id("P3"), 800, 0.0, 1, 1)
            .unwrap();
        // P3 holds 2600; only enough for one after spending.
        roster.get_mut(&id("P3")).unwrap().balance = 1000;

        economy.tick_loans(&mut roster, &id("P3"), 1);
        assert_eq!(economy.loans().get(first).unwrap().status, LoanStatus::Repaid(1));
        assert_eq!(
            economy.loans().get(second).unwrap().status,
            LoanStatus::Defaulted(1)
        );
        assert_eq!(roster.get(&id("P3")).unwrap().balance, 200);
    }

    #[test]
    fn test_offer_loan_validation() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        assert!(matches!(
            economy.offer_loan(&mut roster, &id("P1"), &id("P2"), 0, 0.1, 2, 1),
            Err(EconomyError::InvalidAmount(0))
        ));
        assert!(matches!(
            economy.offer_loan(&mut roster, &id("P1"), &id("P2"), 100, 0.1, 0, 1),
            Err(EconomyError::InvalidTerms(_))
        ));
        assert!(matches!(
            economy.offer_loan(&mut roster, &id("P1"), &id("P2"), 2000, 0.1, 2, 1),
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert!(economy.loans().all().is_empty());
    }

    #[test]
    fn test_group_bonus_requires_everyone() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        assert!(economy.group_bonus(&mut roster, 300));
        assert!(roster.iter().all(|p| p.balance == 1300));

        roster.get_mut(&id("P2")).unwrap().eliminate(2);
        assert!(!economy.group_bonus(&mut roster, 300));
        assert_eq!(roster.get(&id("P1")).unwrap().balance, 1300);
    }

    #[test]
    fn test_resurrect_by_participant() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        roster.get_mut(&id("P1")).unwrap().balance = 2500;
        {
            let p3 = roster.get_mut(&id("P3")).unwrap();
            p3.level = -6;
            p3.eliminate(4);
        }

        economy
            .resurrect(&mut roster, &id("P3"), Sponsor::Participant(id("P1")))
            .unwrap();
        let p3 = roster.get(&id("P3")).unwrap();
        assert!(p3.alive);
        assert_eq!(p3.level, -2);
        assert_eq!(p3.elimination_round, None);
        assert_eq!(roster.get(&id("P1")).unwrap().balance, 500);
    }

    #[test]
    fn test_resurrect_rejections() {
        let mut economy = TokenEconomy::new(EconomyConfig::default());
        let mut roster = roster();
        assert!(matches!(
            economy.resurrect(&mut roster, &id("P2"), Sponsor::Pool),
            Err(EconomyError::NotEliminated(_))
        ));

        roster.get_mut(&id("P2")).unwrap().eliminate(1);
        assert!(matches!(
            economy.resurrect(&mut roster, &id("P2"), Sponsor::Pool),
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert!(matches!(
            economy.resurrect(&mut roster, &id("P2"), Sponsor::Participant(id("P1"))),
            Err(EconomyError::InsufficientFunds { .. })
        ));
        assert!(!roster.get(&id("P2")).unwrap().alive);
    }

    #[test]
    fn test_resurrect_from_pool() {
        let config = EconomyConfig {
            resurrection_pool: 2500,
            ..EconomyConfig::default()
        };
        let mut economy = TokenEconomy::new(config);
        let mut roster = roster();
        roster.get_mut(&id("P2")).unwrap().eliminate(1);
        economy.resurrect(&mut roster, &id("P2"), Sponsor::Pool).unwrap();
        assert_eq!(economy.pool(), 500);
        assert!(roster.get(&id("P2")).unwrap().alive);
    }
}
