//! End-to-end season tests.
//!
//! These tests drive full rounds through the orchestrator with scripted
//! collaborators and check the economy, elimination and negotiation
//! behaviour a reader of a round record would observe.

use std::sync::Arc;
use std::time::Duration;

use elimination::economy::{EconomyEvent, LoanStatus};
use elimination::participant::{ParticipantState, Role, RoleStatus};
use elimination::providers::{ScriptedReply, Verdict};
use elimination::round::RoundKind;
use elimination::{
    JsonFilePersister, JudgingOutcome, MemoryPersister, ParticipantId, RoundOrchestrator,
    ScriptedGenerator, ScriptedJudge, SeasonConfig, SeasonDriver, SeasonState,
};

const P1: &str = "Grok";
const P2: &str = "Claude";
const P3: &str = "DeepSeek";
const P4: &str = "ChatGPT";
const RANKING: [&str; 4] = [P1, P2, P3, P4];

struct Season {
    orchestrator: RoundOrchestrator,
    generator: Arc<ScriptedGenerator>,
    judge: Arc<ScriptedJudge>,
    persister: Arc<MemoryPersister>,
    state: SeasonState,
}

impl Season {
    fn new(config: SeasonConfig) -> Self {
        let names = config.participants.iter().map(|p| p.name.clone()).collect();
        let generator = Arc::new(ScriptedGenerator::new(names));
        let judge = Arc::new(ScriptedJudge::new());
        let persister = Arc::new(MemoryPersister::new());
        let state = SeasonState::new(&config).unwrap();
        let orchestrator = RoundOrchestrator::new(
            Arc::new(config),
            generator.clone(),
            judge.clone(),
            persister.clone(),
        );
        Self {
            orchestrator,
            generator,
            judge,
            persister,
            state,
        }
    }

    fn get(&self, name: &str) -> &ParticipantState {
        self.state.roster.get(&name.into()).unwrap()
    }

    fn get_mut(&mut self, name: &str) -> &mut ParticipantState {
        self.state.roster.get_mut(&name.into()).unwrap()
    }

    async fn round(&mut self, round: u32, ranking: &[&str]) -> elimination::RoundRecord {
        self.judge.push_ranking(ranking);
        self.orchestrator.run_round(&mut self.state, round).await
    }
}

fn base_config() -> SeasonConfig {
    let mut config = SeasonConfig::default();
    config.economy.group_bonus = 0;
    config.traitor.enabled = false;
    config
}

fn cooperative(mut config: SeasonConfig, name: &str) -> SeasonConfig {
    for p in &mut config.participants {
        if p.name == name {
            p.knows_cooperation_mechanics = true;
        }
    }
    config
}

/// Scenario A: one judged round with a fixed ranking
#[tokio::test]
async fn test_scenario_a_single_round_settlement() {
    let mut season = Season::new(base_config());
    let record = season.round(1, &RANKING).await;

    let p1 = season.get(P1);
    assert_eq!(p1.level, 1);
    assert_eq!(p1.balance, 1000 + 50 + 500 + 100);

    let p4 = season.get(P4);
    assert_eq!(p4.level, -1);
    assert_eq!(p4.balance, 1000 + 50 + 100);

    assert_eq!(season.get(P2).level, 0);
    assert_eq!(season.get(P3).level, 0);

    assert_eq!(
        record.judging.best_worst(),
        Some((&ParticipantId::new(P1), &ParticipantId::new(P4)))
    );
    assert_eq!(record.snapshot.len(), 4);
    let interest = record
        .economy_events
        .iter()
        .filter(|e| matches!(e, EconomyEvent::Interest { .. }))
        .count();
    assert_eq!(interest, 4);
}

/// Scenario B: a self-rescue that cannot be afforded changes nothing
#[tokio::test]
async fn test_scenario_b_unaffordable_self_rescue() {
    let mut season = Season::new(cooperative(base_config(), P1));
    {
        let p1 = season.get_mut(P1);
        p1.level = -5;
        p1.balance = 900;
    }
    season
        .generator
        .push_text(P1, "I self-rescue for 1000 tokens\nA short answer.");
    let record = season.round(1, &[P2, P1, P3, P4]).await;

    assert_eq!(record.actions.len(), 1);
    assert!(record.actions[0].is_rejected());
    assert!(!record
        .economy_events
        .iter()
        .any(|e| matches!(e, EconomyEvent::SelfRescue { .. })));

    let p1 = season.get(P1);
    assert_eq!(p1.level, -5);
    // 900 + 45 interest + 100 stipend, nothing debited
    assert_eq!(p1.balance, 1045);
    assert_eq!(p1.stats.total_spent, 0);
}

/// Scenario B, successful case: self-rescue is atomic
#[tokio::test]
async fn test_affordable_self_rescue_buys_levels() {
    let mut season = Season::new(cooperative(base_config(), P1));
    season.get_mut(P1).level = -4;
    season
        .generator
        .push_text(P1, "I self-rescue now\nA short answer.");
    let record = season.round(1, &[P2, P1, P3, P4]).await;

    assert!(!record.actions[0].is_rejected());
    let p1 = season.get(P1);
    assert_eq!(p1.level, -2);
    // 1000 + 50 - 1000 + 100
    assert_eq!(p1.balance, 150);
}

/// Scenario C: a loan that matures and is repaid
#[tokio::test]
async fn test_scenario_c_loan_repaid_at_maturity() {
    let mut season = Season::new(base_config());
    let loan = season
        .state
        .economy
        .offer_loan(
            &mut season.state.roster,
            &P1.into(),
            &P2.into(),
            500,
            0.20,
            2,
            0,
        )
        .unwrap();

    let ranking = [P3, P1, P2, P4];
    season.round(1, &ranking).await;
    let active = season.state.economy.loans().get(loan).unwrap();
    assert_eq!(active.rounds_remaining, 1);
    assert_eq!(active.status, LoanStatus::Active);
    // Principal moved at issue; interest and stipend since.
    assert_eq!(season.get(P1).balance, 500 + 25 + 100);
    assert_eq!(season.get(P2).balance, 1500 + 75 + 100);

    // The tick already happened this round; a second one is a no-op.
    let matured = season
        .state
        .economy
        .tick_loans(&mut season.state.roster, &P2.into(), 1);
    assert_eq!(matured, 0);
    assert_eq!(season.state.economy.loans().get(loan).unwrap().rounds_remaining, 1);

    let record = season.round(2, &ranking).await;
    assert!(record.economy_events.iter().any(|e| matches!(
        e,
        EconomyEvent::LoanRepaid { amount: 600, .. }
    )));
    assert_eq!(
        season.state.economy.loans().get(loan).unwrap().status,
        LoanStatus::Repaid(2)
    );
    assert!(season.get(P1).debts_held.is_empty());
    assert!(season.get(P2).debts_owed.is_empty());
    // 625 + 31 interest + 600 repayment + 100 stipend
    assert_eq!(season.get(P1).balance, 1356);
    // 1675 + 83 interest - 600 repayment + 100 stipend
    assert_eq!(season.get(P2).balance, 1258);
}

/// Scenario C: a loan the borrower cannot cover defaults without a debit
#[tokio::test]
async fn test_scenario_c_loan_defaults() {
    let mut season = Season::new(base_config());
    let loan = season
        .state
        .economy
        .offer_loan(
            &mut season.state.roster,
            &P1.into(),
            &P2.into(),
            500,
            0.20,
            2,
            0,
        )
        .unwrap();

    let ranking = [P3, P1, P2, P4];
    season.round(1, &ranking).await;
    season.get_mut(P2).balance = 100;
    let lender_before = season.get(P1).balance;

    let record = season.round(2, &ranking).await;
    assert!(record.economy_events.iter().any(|e| matches!(
        e,
        EconomyEvent::LoanDefaulted { amount_due: 600, .. }
    )));
    assert_eq!(
        season.state.economy.loans().get(loan).unwrap().status,
        LoanStatus::Defaulted(2)
    );
    assert!(season.get(P1).debts_held.is_empty());
    assert!(season.get(P2).debts_owed.is_empty());
    // 100 + 5 interest + 100 stipend
    assert_eq!(season.get(P2).balance, 205);
    let interest = lender_before * 5 / 100;
    assert_eq!(season.get(P1).balance, lender_before + interest + 100);
}

/// A loan stated at an absurd rate is refused before any tokens move
#[tokio::test]
async fn test_loan_with_runaway_rate_is_rejected() {
    let mut season = Season::new(cooperative(base_config(), P1));
    season.generator.push_text(
        P1,
        "I lend 100 tokens to Claude at 10000000000000000000% for 1 rounds\nMy answer.",
    );
    let record = season.round(1, &[P3, P1, P2, P4]).await;

    assert_eq!(record.actions.len(), 1);
    assert!(record.actions[0].is_rejected());
    assert!(season.state.economy.loans().all().is_empty());
    assert!(season.get(P1).debts_held.is_empty());
    assert!(season.get(P2).debts_owed.is_empty());

    season.round(2, &[P3, P1, P2, P4]).await;
    for name in RANKING {
        let balance = season.get(name).balance;
        assert!((0..10_000).contains(&balance), "{name} holds {balance}");
    }
}

/// Scenario D: the group bonus pays everyone only while nobody is out
#[tokio::test]
async fn test_scenario_d_group_bonus() {
    let mut config = base_config();
    config.economy.group_bonus = 300;
    let mut season = Season::new(config);

    let record = season.round(1, &RANKING).await;
    assert!(record
        .economy_events
        .iter()
        .any(|e| matches!(e, EconomyEvent::GroupBonus { amount: 300, recipients: 4 })));
    assert_eq!(season.get(P2).balance, 1000 + 50 + 100 + 300);

    // P4 falls through the threshold in this Settle.
    season.get_mut(P4).level = -5;
    let before = season.get(P2).balance;
    let record = season.round(2, &RANKING).await;
    assert_eq!(record.eliminations, vec![ParticipantId::new(P4)]);
    assert!(!record
        .economy_events
        .iter()
        .any(|e| matches!(e, EconomyEvent::GroupBonus { .. })));
    assert_eq!(season.get(P2).balance, before + before * 5 / 100 + 100);
}

/// Elimination is recorded once and never undone by later rounds
#[tokio::test]
async fn test_elimination_is_monotonic() {
    let mut season = Season::new(base_config());
    season.get_mut(P3).level = -5;
    season.round(1, &[P1, P2, P4, P3]).await;
    assert!(!season.get(P3).alive);
    assert_eq!(season.get(P3).elimination_round, Some(1));
    let frozen_balance = season.get(P3).balance;

    for round in 2..=4 {
        let record = season.round(round, &[P3, P1, P2, P4]).await;
        assert!(record.responses.iter().all(|r| r.participant.as_str() != P3));
        assert!(!record.eliminations.contains(&ParticipantId::new(P3)));
    }
    let p3 = season.get(P3);
    assert!(!p3.alive);
    assert_eq!(p3.elimination_round, Some(1));
    assert_eq!(p3.balance, frozen_balance);
}

/// A cooperation statement can bring an eliminated participant back
#[tokio::test]
async fn test_resurrection_by_statement() {
    let mut config = cooperative(base_config(), P1);
    config.season.starting_balance = 3000;
    let mut season = Season::new(config);
    season.get_mut(P3).eliminate(1);
    season.get_mut(P3).level = -6;

    season
        .generator
        .push_text(P1, "I resurrect DeepSeek for the group\nMy answer.");
    let record = season.round(2, &[P2, P1, P4]).await;

    assert!(!record.actions[0].is_rejected());
    let p3 = season.get(P3);
    assert!(p3.alive);
    assert_eq!(p3.level, -2);
    assert_eq!(p3.elimination_round, None);
    // 3000 + 150 interest - 2000 + 100 stipend
    assert_eq!(season.get(P1).balance, 1250);
}

/// A traitor's reveal applies its effects from the same Settle onwards
#[tokio::test]
async fn test_traitor_reveal_by_statement() {
    let mut config = cooperative(base_config(), P1);
    config.traitor.enabled = true;
    let mut season = Season::new(config);
    season.get_mut(P1).role = Role::Traitor;

    season
        .generator
        .push_text(P1, "I reveal myself\nMy answer.");
    let early = season.round(5, &[P2, P1, P3, P4]).await;
    assert!(early.actions[0].is_rejected());
    assert!(season.get(P1).is_hidden_traitor());

    season
        .generator
        .push_text(P1, "I am the traitor\nMy answer.");
    season.round(6, &[P2, P1, P3, P4]).await;
    let p1 = season.get(P1);
    assert_eq!(p1.role_status, RoleStatus::Revealed(6));
    assert_eq!(p1.reputation, -2);
    assert_eq!(p1.reveal_rounds_remaining, 2);
}

/// A traitor without cooperation mechanics can still reveal itself
#[tokio::test]
async fn test_traitor_reveal_without_cooperation_mechanics() {
    let mut config = base_config();
    config.traitor.enabled = true;
    let mut season = Season::new(config);
    season.get_mut(P1).role = Role::Traitor;

    season
        .generator
        .push_text(P1, "I reveal that I am the traitor\nanswer");
    let record = season.round(6, &[P2, P1, P3, P4]).await;

    assert_eq!(record.actions.len(), 1);
    assert!(!record.actions[0].is_rejected());
    assert_eq!(season.get(P1).role_status, RoleStatus::Revealed(6));
    assert_eq!(season.get(P1).reputation, -2);
}

/// A provider timeout counts as a failed response, not a lost round
#[tokio::test]
async fn test_generation_timeout_is_a_failure() {
    let mut config = base_config();
    config.season.call_timeout_secs = 1;
    let mut season = Season::new(config);
    season.generator.push(
        P2,
        ScriptedReply::Delayed(Duration::from_secs(3), "too late".into()),
    );
    let record = season.round(1, &[P1, P3, P4]).await;

    let p2 = record
        .responses
        .iter()
        .find(|r| r.participant.as_str() == P2)
        .unwrap();
    assert!(!p2.succeeded);
    assert!(season.get(P2).alive);
    assert_eq!(season.get(P2).level, 0);
    assert_eq!(season.judge.calls()[0].len(), 3);
    assert_eq!(season.orchestrator.stats().snapshot().timeouts, 1);
}

/// An unusable judge verdict falls back to stable roster order
#[tokio::test]
async fn test_judge_failure_falls_back() {
    let mut season = Season::new(base_config());
    season.judge.push_failure("judge offline");
    let record = season.orchestrator.run_round(&mut season.state, 1).await;
    assert!(matches!(
        record.judging,
        JudgingOutcome::Judged { fallback: true, .. }
    ));
    assert_eq!(season.get(P1).level, 1);
    assert_eq!(season.get(P4).level, -1);

    season.judge.push(Verdict::BestWorst {
        best: "Nobody".into(),
        worst: P2.into(),
    });
    let record = season.orchestrator.run_round(&mut season.state, 2).await;
    assert!(matches!(
        record.judging,
        JudgingOutcome::Judged { fallback: true, .. }
    ));
}

/// Persistence failures are logged and the season continues
#[tokio::test]
async fn test_persistence_failure_is_not_fatal() {
    let mut season = Season::new(base_config());
    season.persister.set_failing(true);
    season.round(1, &RANKING).await;
    season.persister.set_failing(false);
    season.round(2, &RANKING).await;

    let rounds = season.persister.rounds();
    assert_eq!(rounds.len(), 1);
    assert_eq!(rounds[0].round, 2);
    assert_eq!(season.get(P1).level, 2);
}

/// The driver alternates challenge and negotiation rounds
#[tokio::test]
async fn test_driver_schedules_negotiation_rounds() {
    let mut config = SeasonConfig::default();
    config.season.max_rounds = 4;
    config.negotiation.period = 2;
    config.traitor.enabled = false;
    let names = config.participants.iter().map(|p| p.name.clone()).collect();
    let persister = Arc::new(MemoryPersister::new());
    let orchestrator = RoundOrchestrator::new(
        Arc::new(config),
        Arc::new(ScriptedGenerator::new(names)),
        Arc::new(ScriptedJudge::new()),
        persister.clone(),
    );
    let report = SeasonDriver::new(orchestrator).with_seed(3).run().await.unwrap();

    let kinds: Vec<RoundKind> = persister.rounds().iter().map(|r| r.kind).collect();
    assert_eq!(
        kinds,
        vec![
            RoundKind::Challenge,
            RoundKind::Negotiation,
            RoundKind::Challenge,
            RoundKind::Negotiation
        ]
    );
    let negotiation = persister.rounds()[1].negotiation.clone().unwrap();
    assert_eq!(negotiation.forum.len(), 4);
    assert!(negotiation.sabotage.is_some());
    assert_eq!(report.alliance_log.len(), 2);
    assert_eq!(report.rounds_played, 4);
    assert!(report.traitor.is_none());
}

/// The season stops as soon as one participant is left
#[tokio::test]
async fn test_season_stops_at_single_survivor() {
    let mut config = base_config();
    config.season.max_rounds = 10;
    config.negotiation.period = 0;
    config.season.elimination_threshold = -1;
    config.season.starting_level = 0;
    config.participants.truncate(2);
    config.economy.resurrection_level = 0;
    let names = config.participants.iter().map(|p| p.name.clone()).collect();
    let judge = Arc::new(ScriptedJudge::new());
    judge.push_ranking(&[P1, P2]);
    let persister = Arc::new(MemoryPersister::new());
    let orchestrator = RoundOrchestrator::new(
        Arc::new(config),
        Arc::new(ScriptedGenerator::new(names)),
        judge,
        persister.clone(),
    );
    let report = SeasonDriver::new(orchestrator).run().await.unwrap();

    assert_eq!(report.rounds_played, 1);
    assert_eq!(report.ranking[0].participant, ParticipantId::new(P1));
    assert_eq!(report.ranking[1].elimination_round, Some(1));
    assert!(persister.report().is_some());
}

/// Round records land on disk once per round, next to the season report
#[tokio::test]
async fn test_file_persister_writes_round_files() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = base_config();
    config.season.max_rounds = 2;
    let names = config.participants.iter().map(|p| p.name.clone()).collect();
    let orchestrator = RoundOrchestrator::new(
        Arc::new(config),
        Arc::new(ScriptedGenerator::new(names)),
        Arc::new(ScriptedJudge::new()),
        Arc::new(JsonFilePersister::new(dir.path())),
    );
    SeasonDriver::new(orchestrator).run().await.unwrap();

    for file in ["round_01.json", "round_02.json", "season_report.json"] {
        assert!(dir.path().join(file).exists(), "missing {file}");
    }
    let text = std::fs::read_to_string(dir.path().join("round_01.json")).unwrap();
    let record: elimination::RoundRecord = serde_json::from_str(&text).unwrap();
    assert_eq!(record.round, 1);
    assert_eq!(record.snapshot.len(), 4);
}
