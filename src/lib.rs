//! # Household Finance Engine
//!
//! A pure, deterministic computation layer that turns a household's
//! financial entities (cards, bills, income, adjustments, loans, savings
//! goals, bank accounts) into month-by-month financial snapshots,
//! card-balance projections with compounding interest, debt-payoff
//! simulations under competing strategies, payday schedules and what-if
//! scenario deltas.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: one month's fully aggregated financial totals
//! - **Projection**: a per-card, per-month simulated balance trajectory
//! - **Payday mode**: a cyclical (non-monthly) income schedule driven by
//!   an anchor date and cycle length
//! - **Snowball / Avalanche**: debt payoff orderings by smallest balance
//!   first / highest interest rate first
//!
//! The engine performs no I/O and holds no hidden state: identical inputs
//! always produce bit-identical outputs, so the surrounding system can
//! recompute freely and atomically replace whatever it persists.
//!
//! ## Example
//!
//! ```rust,ignore
//! use household_finance_engine::*;
//!
//! let input = EngineInput {
//!     cards: vec![/* ... */],
//!     payments: vec![/* one row per month with explicit data */],
//!     income: vec![/* ... */],
//!     ..EngineInput::default()
//! };
//!
//! let selected = MonthKey::parse("2026-03")?;
//! let owner = project_owner(&input, selected);
//! for snapshot in &owner.snapshots {
//!     println!("{}: {} left", snapshot.month, snapshot.money_left);
//! }
//! ```

pub mod error;
pub mod money;
pub mod month;
pub mod payday;
pub mod payoff;
pub mod projection;
pub mod savings;
pub mod scenario;
pub mod schema;
pub mod snapshot;
pub mod timeline;

pub use error::{EngineError, Result};
pub use money::{round2, sanitize};
pub use month::{month_range, MonthKey};
pub use payday::{resolve_paydays, PaydaysByIncome};
pub use payoff::{simulate, PayoffEvent, PayoffResult, MAX_SIMULATED_MONTHS};
pub use projection::{extend_timeline, project, CardMonthEntry, CardMonthProjection};
pub use savings::{goal_progress, GoalProgress};
pub use scenario::{
    evaluate, project_accounts, AccountBalance, AccountProjection, ScenarioFigures, ScenarioInput,
    ScenarioOutcome,
};
pub use schema::*;
pub use snapshot::{build_snapshots, MonthSnapshot, PaydayOverrides, SnapshotInputs};
pub use timeline::{
    build_ledger, build_timeline, EventSource, LedgerEntry, LedgerStatus, TimelineEvent,
    TimelineInputs,
};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The full entity set for one owner, as materialized by the surrounding
/// system before invoking the engine.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EngineInput {
    pub cards: Vec<CardAccount>,
    pub payments: Vec<MonthlyCardPayments>,
    pub income: Vec<LineItem>,
    pub house_bills: Vec<LineItem>,
    pub shopping: Vec<LineItem>,
    pub my_bills: Vec<LineItem>,
    pub adjustments: Vec<MonthlyAdjustment>,
    pub payday_overrides: PaydayOverrides,
    pub payday_mode: Option<PaydayModeSettings>,
    pub loaned_out: Vec<LoanedOutItem>,
    pub savings_goals: Vec<SavingsGoal>,
    pub bank_accounts: Vec<BankAccount>,
    pub transfers: Vec<BankTransfer>,
    pub base_bank_balance: f64,
}

impl EngineInput {
    fn snapshot_inputs(&self) -> SnapshotInputs<'_> {
        SnapshotInputs {
            cards: &self.cards,
            payments: &self.payments,
            income: &self.income,
            house_bills: &self.house_bills,
            shopping: &self.shopping,
            my_bills: &self.my_bills,
            adjustments: &self.adjustments,
            payday_overrides: &self.payday_overrides,
            payday_mode: self.payday_mode.as_ref(),
            loaned_out: &self.loaned_out,
            base_bank_balance: self.base_bank_balance,
        }
    }
}

/// Everything the engine derives for one selected month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthProjection {
    pub snapshot: MonthSnapshot,
    pub cards: CardMonthProjection,
    pub events: Vec<TimelineEvent>,
    pub accounts: AccountProjection,
    pub goals: Vec<GoalProgress>,
}

/// The ordered snapshot timeline plus the projection for the selected
/// month (absent when the selected month is outside the timeline).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnerProjection {
    pub snapshots: Vec<MonthSnapshot>,
    pub selected_month: MonthKey,
    pub selected: Option<MonthProjection>,
}

/// The deterministic main entry point: recomputes the full timeline from
/// scratch and resolves the selected month's detail view.
pub fn project_owner(input: &EngineInput, selected_month: MonthKey) -> OwnerProjection {
    info!(
        "Projecting timeline: {} cards, {} payment rows, selected {}",
        input.cards.len(),
        input.payments.len(),
        selected_month
    );

    let projections = projection::project(&input.cards, &input.payments);
    let snapshots = snapshot::build_from_projections(&input.snapshot_inputs(), &projections);
    debug!("Timeline spans {} months", snapshots.len());

    let selected = snapshots
        .iter()
        .find(|s| s.month == selected_month)
        .cloned()
        .map(|snap| {
            let cards = projections
                .iter()
                .find(|p| p.month == selected_month)
                .cloned()
                .expect("snapshots and projections cover the same months");

            let empty = BTreeMap::new();
            let overrides = input
                .payday_overrides
                .get(&selected_month)
                .unwrap_or(&empty);
            let payments_for_month = input.payments.iter().find(|p| p.month == selected_month);
            let events = timeline::build_timeline(
                selected_month,
                &TimelineInputs {
                    cards: &input.cards,
                    payments_for_month,
                    income: &input.income,
                    payday_overrides: overrides,
                    payday_mode: input.payday_mode.as_ref(),
                    house_bills: &input.house_bills,
                    shopping: &input.shopping,
                    my_bills: &input.my_bills,
                    adjustments: &input.adjustments,
                    loaned_out: &input.loaned_out,
                },
            );

            let month_transfers: Vec<BankTransfer> = input
                .transfers
                .iter()
                .filter(|t| t.month == selected_month)
                .cloned()
                .collect();
            let accounts = scenario::project_accounts(&input.bank_accounts, &month_transfers);

            let goals = input
                .savings_goals
                .iter()
                .map(|goal| savings::goal_progress(goal, selected_month))
                .collect();

            MonthProjection {
                snapshot: snap,
                cards,
                events,
                accounts,
                goals,
            }
        });

    OwnerProjection {
        snapshots,
        selected_month,
        selected,
    }
}

/// Runs the debt payoff simulation once per strategy.
pub fn simulate_payoff_strategies(
    cards: &[CardAccount],
    starting_balances: &BTreeMap<String, f64>,
    monthly_budget: f64,
    configured_minimums: &BTreeMap<String, f64>,
) -> Vec<PayoffResult> {
    [PayoffStrategy::Snowball, PayoffStrategy::Avalanche]
        .into_iter()
        .map(|strategy| {
            payoff::simulate(
                strategy,
                cards,
                starting_balances,
                monthly_budget,
                configured_minimums,
            )
        })
        .collect()
}

/// Evaluates a what-if scenario against one month's baseline. Advisory
/// only; nothing is mutated.
pub fn evaluate_scenario(
    baseline: &MonthSnapshot,
    baseline_accounts: &AccountProjection,
    input: &ScenarioInput,
) -> ScenarioOutcome {
    scenario::evaluate(baseline, baseline_accounts, input)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(raw: &str) -> MonthKey {
        MonthKey::parse(raw).unwrap()
    }

    fn sample_input() -> EngineInput {
        EngineInput {
            cards: vec![CardAccount {
                id: "c1".to_string(),
                name: "Card".to_string(),
                limit: 5000.0,
                used_limit: 398.0,
                interest_rate_apr: 12.0,
                due_day_of_month: Some(15),
                minimum_payment_rule: None,
            }],
            payments: vec![
                MonthlyCardPayments {
                    month: month("2026-03"),
                    by_card: [("c1".to_string(), 100.0)].into(),
                    formula_variant: FormulaVariant::Standard,
                    inferred: false,
                },
                MonthlyCardPayments {
                    month: month("2026-04"),
                    by_card: [("c1".to_string(), 100.0)].into(),
                    formula_variant: FormulaVariant::Standard,
                    inferred: false,
                },
            ],
            income: vec![LineItem {
                id: "wages".to_string(),
                name: "Wages".to_string(),
                amount: 1000.0,
                due_day_of_month: Some(25),
            }],
            house_bills: vec![LineItem {
                id: "rent".to_string(),
                name: "Rent".to_string(),
                amount: 200.0,
                due_day_of_month: Some(1),
            }],
            base_bank_balance: 500.0,
            ..EngineInput::default()
        }
    }

    #[test]
    fn test_project_owner_resolves_selected_month() {
        let owner = project_owner(&sample_input(), month("2026-04"));

        // Timeline extends through December of the final known year.
        assert_eq!(owner.snapshots.len(), 10);
        let selected = owner.selected.expect("2026-04 is inside the timeline");
        assert_eq!(selected.snapshot.month, month("2026-04"));
        assert_eq!(selected.cards.by_card["c1"].closing_balance, 205.0);
        assert!(!selected.events.is_empty());
    }

    #[test]
    fn test_project_owner_outside_timeline() {
        let owner = project_owner(&sample_input(), month("2030-01"));
        assert!(owner.selected.is_none());
        assert_eq!(owner.snapshots.len(), 10);
    }

    #[test]
    fn test_project_owner_is_deterministic() {
        let input = sample_input();
        let first = project_owner(&input, month("2026-03"));
        let second = project_owner(&input, month("2026-03"));
        assert_eq!(first.snapshots, second.snapshots);
    }

    #[test]
    fn test_simulate_payoff_strategies_runs_both() {
        let input = sample_input();
        let results = simulate_payoff_strategies(
            &input.cards,
            &BTreeMap::new(),
            200.0,
            &BTreeMap::new(),
        );
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].strategy, PayoffStrategy::Snowball);
        assert_eq!(results[1].strategy, PayoffStrategy::Avalanche);
        assert!(results.iter().all(|r| r.months_to_debt_free.is_some()));
    }
}
