//! What-if scenario evaluation.
//!
//! Applies ad hoc deltas (extra income/expense/card payment, per-account
//! manual adjustments) to one month's baseline snapshot and reports the
//! projected position next to the baseline. Strictly advisory and
//! in-memory: nothing here ever mutates a stored snapshot, so callers may
//! evaluate scenarios freely without coordination.

use crate::money::round2;
use crate::schema::{BankAccount, BankTransfer};
use crate::snapshot::MonthSnapshot;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub account_id: String,
    pub name: String,
    pub closing_balance: f64,
    pub is_default: bool,
}

/// Per-account closing balances for one month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountProjection {
    pub accounts: Vec<AccountBalance>,
}

impl AccountProjection {
    pub fn default_account_id(&self) -> Option<&str> {
        self.accounts
            .iter()
            .find(|a| a.is_default)
            .map(|a| a.account_id.as_str())
    }

    pub fn total(&self) -> f64 {
        self.accounts
            .iter()
            .fold(0.0, |acc, a| round2(acc + a.closing_balance))
    }
}

/// Derives the baseline account projection from bank accounts and the
/// month's transfers. Each transfer leg applies only where the named
/// account exists; unknown ids are ignored rather than erroring.
pub fn project_accounts(accounts: &[BankAccount], transfers: &[BankTransfer]) -> AccountProjection {
    let mut closing: BTreeMap<&str, f64> = accounts
        .iter()
        .map(|a| (a.id.as_str(), round2(a.balance)))
        .collect();

    for transfer in transfers {
        let amount = round2(transfer.amount);
        if let Some(balance) = closing.get_mut(transfer.from_account_id.as_str()) {
            *balance = round2(*balance - amount);
        }
        if let Some(balance) = closing.get_mut(transfer.to_account_id.as_str()) {
            *balance = round2(*balance + amount);
        }
    }

    AccountProjection {
        accounts: accounts
            .iter()
            .map(|a| AccountBalance {
                account_id: a.id.clone(),
                name: a.name.clone(),
                closing_balance: closing[a.id.as_str()],
                is_default: a.is_default,
            })
            .collect(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScenarioInput {
    #[serde(default)]
    pub extra_income: f64,
    #[serde(default)]
    pub extra_expenses: f64,
    #[serde(default)]
    pub extra_card_payments: f64,
    /// Manual deltas applied verbatim to their respective accounts.
    #[serde(default)]
    pub account_deltas: BTreeMap<String, f64>,
    #[serde(default)]
    pub note: Option<String>,
}

/// The figures compared between baseline and projected states.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioFigures {
    pub money_in_bank: f64,
    pub card_balance: f64,
    pub loaned_out_outstanding: f64,
    pub net_worth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOutcome {
    pub base: ScenarioFigures,
    pub projected: ScenarioFigures,
    pub delta: ScenarioFigures,
    pub money_left_delta: f64,
    pub account_projection: AccountProjection,
    pub note: Option<String>,
}

pub fn evaluate(
    baseline: &MonthSnapshot,
    baseline_accounts: &AccountProjection,
    input: &ScenarioInput,
) -> ScenarioOutcome {
    let money_left_delta = round2(
        round2(round2(input.extra_income) - round2(input.extra_expenses))
            - round2(input.extra_card_payments),
    );

    // The money-left delta lands on the default spending account; manual
    // deltas land on their named accounts.
    let mut applied_deltas = 0.0;
    let mut accounts = baseline_accounts.accounts.clone();
    for account in &mut accounts {
        let mut delta = if account.is_default {
            money_left_delta
        } else {
            0.0
        };
        if let Some(manual) = input.account_deltas.get(&account.account_id) {
            delta = round2(delta + round2(*manual));
            applied_deltas = round2(applied_deltas + round2(*manual));
        }
        account.closing_balance = round2(account.closing_balance + delta);
    }

    let base = figures(
        baseline.money_in_bank,
        baseline.card_balance_total,
        baseline.loaned_out_outstanding_total,
    );
    let projected = figures(
        round2(round2(baseline.money_in_bank + money_left_delta) + applied_deltas),
        round2(baseline.card_balance_total - round2(input.extra_card_payments)).max(0.0),
        baseline.loaned_out_outstanding_total,
    );
    let delta = ScenarioFigures {
        money_in_bank: round2(projected.money_in_bank - base.money_in_bank),
        card_balance: round2(projected.card_balance - base.card_balance),
        loaned_out_outstanding: round2(
            projected.loaned_out_outstanding - base.loaned_out_outstanding,
        ),
        net_worth: round2(projected.net_worth - base.net_worth),
    };

    ScenarioOutcome {
        base,
        projected,
        delta,
        money_left_delta,
        account_projection: AccountProjection { accounts },
        note: input.note.clone(),
    }
}

fn figures(money_in_bank: f64, card_balance: f64, loaned_out_outstanding: f64) -> ScenarioFigures {
    ScenarioFigures {
        money_in_bank,
        card_balance,
        loaned_out_outstanding,
        net_worth: round2(round2(money_in_bank + loaned_out_outstanding) - card_balance),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::month::MonthKey;
    use crate::schema::FormulaVariant;

    fn baseline_snapshot() -> MonthSnapshot {
        MonthSnapshot {
            month: MonthKey::parse("2026-03").unwrap(),
            income_total: 1000.0,
            house_bills_total: 280.0,
            shopping_total: 0.0,
            my_bills_total: 0.0,
            adjustments_total: 80.0,
            card_interest_total: 3.98,
            card_balance_total: 301.98,
            card_spend_total: 100.0,
            loaned_out_outstanding_total: 250.0,
            loaned_out_paid_back_total: 0.0,
            money_in_bank: 620.0,
            money_left: 620.0,
            formula_variant: FormulaVariant::Standard,
            inferred: false,
        }
    }

    fn baseline_accounts() -> AccountProjection {
        AccountProjection {
            accounts: vec![
                AccountBalance {
                    account_id: "main".to_string(),
                    name: "Current".to_string(),
                    closing_balance: 500.0,
                    is_default: true,
                },
                AccountBalance {
                    account_id: "savings".to_string(),
                    name: "Savings".to_string(),
                    closing_balance: 1200.0,
                    is_default: false,
                },
            ],
        }
    }

    #[test]
    fn test_money_left_delta_lands_on_default_account() {
        let input = ScenarioInput {
            extra_income: 150.0,
            extra_expenses: 40.0,
            extra_card_payments: 60.0,
            ..ScenarioInput::default()
        };

        let outcome = evaluate(&baseline_snapshot(), &baseline_accounts(), &input);
        assert_eq!(outcome.money_left_delta, 50.0);

        let main = &outcome.account_projection.accounts[0];
        assert_eq!(main.closing_balance, 550.0);
        let savings = &outcome.account_projection.accounts[1];
        assert_eq!(savings.closing_balance, 1200.0);
    }

    #[test]
    fn test_card_balance_clamped_and_net_worth_reported() {
        let input = ScenarioInput {
            extra_card_payments: 400.0,
            ..ScenarioInput::default()
        };

        let outcome = evaluate(&baseline_snapshot(), &baseline_accounts(), &input);
        assert_eq!(outcome.projected.card_balance, 0.0);

        // net worth = money in bank + loaned-out outstanding - card balance
        assert_eq!(outcome.base.net_worth, round2(620.0 + 250.0 - 301.98));
        assert_eq!(
            outcome.projected.net_worth,
            round2(620.0 - 400.0 + 250.0 - 0.0)
        );
        assert_eq!(
            outcome.delta.net_worth,
            round2(outcome.projected.net_worth - outcome.base.net_worth)
        );
    }

    #[test]
    fn test_manual_account_deltas_applied_verbatim() {
        let input = ScenarioInput {
            account_deltas: [("savings".to_string(), -200.0)].into(),
            ..ScenarioInput::default()
        };

        let outcome = evaluate(&baseline_snapshot(), &baseline_accounts(), &input);
        assert_eq!(outcome.account_projection.accounts[1].closing_balance, 1000.0);
        assert_eq!(outcome.projected.money_in_bank, 420.0);
    }

    #[test]
    fn test_evaluate_never_mutates_inputs() {
        let snapshot = baseline_snapshot();
        let accounts = baseline_accounts();
        let input = ScenarioInput {
            extra_income: 300.0,
            account_deltas: [("main".to_string(), 75.0)].into(),
            note: Some("bonus month".to_string()),
            ..ScenarioInput::default()
        };

        let snapshot_before = snapshot.clone();
        let accounts_before = accounts.clone();
        let outcome = evaluate(&snapshot, &accounts, &input);

        assert_eq!(snapshot, snapshot_before);
        assert_eq!(accounts, accounts_before);
        assert_eq!(outcome.note.as_deref(), Some("bonus month"));
    }

    #[test]
    fn test_project_accounts_applies_transfers() {
        let accounts = vec![
            BankAccount {
                id: "main".to_string(),
                name: "Current".to_string(),
                balance: 500.0,
                is_default: true,
            },
            BankAccount {
                id: "savings".to_string(),
                name: "Savings".to_string(),
                balance: 1200.0,
                is_default: false,
            },
        ];
        let transfers = vec![
            BankTransfer {
                id: "t1".to_string(),
                from_account_id: "main".to_string(),
                to_account_id: "savings".to_string(),
                amount: 100.0,
                month: MonthKey::parse("2026-03").unwrap(),
                day: 2,
            },
            BankTransfer {
                id: "t2".to_string(),
                from_account_id: "gone".to_string(),
                to_account_id: "savings".to_string(),
                amount: 50.0,
                month: MonthKey::parse("2026-03").unwrap(),
                day: 9,
            },
        ];

        let projection = project_accounts(&accounts, &transfers);
        assert_eq!(projection.accounts[0].closing_balance, 400.0);
        assert_eq!(projection.accounts[1].closing_balance, 1350.0);
        assert_eq!(projection.default_account_id(), Some("main"));
        assert_eq!(projection.total(), 1750.0);
    }
}
