//! Input entity model.
//!
//! These are the raw entities the surrounding system materializes (from
//! whatever store it uses) before invoking the engine. They carry
//! `JsonSchema` descriptions so the host application can surface the same
//! schema it persists.

use crate::month::MonthKey;
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "PascalCase")]
pub enum FormulaVariant {
    /// Standard money-left formula: income minus card spend, house bills,
    /// shopping and my-bills.
    #[default]
    Standard,

    #[schemars(
        description = "Historical variant that excludes my-bills from the money-left subtraction. Preserved bit-for-bit for parity with legacy data; do not unify with Standard."
    )]
    LegacyMyBillsExcluded,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase")]
pub enum PayoffStrategy {
    /// Smallest current balance first.
    Snowball,
    /// Highest APR first.
    Avalanche,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "PascalCase", tag = "kind")]
pub enum MinimumPaymentRule {
    #[schemars(description = "A fixed minimum payment amount per month.")]
    Fixed { amount: f64 },

    #[schemars(
        description = "Minimum payment as a percentage of the statement balance, with an absolute floor."
    )]
    Percent { rate: f64, floor: f64 },
}

impl Default for MinimumPaymentRule {
    /// The conventional issuer default. Callers with a real product rule
    /// should set it explicitly rather than rely on this.
    fn default() -> Self {
        Self::Percent {
            rate: 2.0,
            floor: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CardAccount {
    pub id: String,
    pub name: String,

    #[schemars(description = "Credit limit on the revolving line.")]
    pub limit: f64,

    #[schemars(
        description = "Current real-world balance on the card. Seeds month 1 of the balance projection."
    )]
    pub used_limit: f64,

    #[schemars(description = "Annual percentage rate, e.g. 12.0 for 12% APR.")]
    pub interest_rate_apr: f64,

    #[serde(default)]
    pub due_day_of_month: Option<u32>,

    #[serde(default)]
    pub minimum_payment_rule: Option<MinimumPaymentRule>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyCardPayments {
    pub month: MonthKey,

    #[schemars(description = "Payment amount per card id for this month.")]
    pub by_card: BTreeMap<String, f64>,

    #[serde(default)]
    pub formula_variant: FormulaVariant,

    #[serde(default)]
    #[schemars(
        description = "True when this month had no explicit data and was synthesized from its neighbours."
    )]
    pub inferred: bool,
}

/// A flat recurring monthly value: a house bill, an income source, a
/// shopping line or a personal bill. No built-in escalation.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LineItem {
    pub id: String,
    pub name: String,
    pub amount: f64,

    #[serde(default)]
    pub due_day_of_month: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum AdjustmentCategory {
    Income,
    HouseBills,
    Shopping,
    MyBills,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct MonthlyAdjustment {
    pub id: String,
    pub name: String,

    #[schemars(description = "Signed amount added to the category total for every month in range.")]
    pub amount: f64,

    pub category: AdjustmentCategory,

    pub start_month: MonthKey,

    #[serde(default)]
    #[schemars(description = "Inclusive end of the range. Absent means open-ended.")]
    pub end_month: Option<MonthKey>,
}

impl MonthlyAdjustment {
    pub fn applies_to(&self, month: MonthKey) -> bool {
        month >= self.start_month && self.end_month.map_or(true, |end| month <= end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum LoanStatus {
    Outstanding,
    PaidBack,
}

/// Money loaned out to someone else: reduces available bank balance while
/// outstanding, drops out of liabilities once repaid.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LoanedOutItem {
    pub id: String,
    pub amount: f64,
    pub start_month: MonthKey,
    pub status: LoanStatus,

    #[serde(default)]
    pub paid_back_month: Option<MonthKey>,
}

impl LoanedOutItem {
    /// Outstanding for a month if the loan has started and has not yet
    /// reached its paid-back month.
    pub fn outstanding_in(&self, month: MonthKey) -> bool {
        month >= self.start_month && !self.paid_back_by(month)
    }

    pub fn paid_back_by(&self, month: MonthKey) -> bool {
        self.paid_back_month.is_some_and(|paid| month >= paid)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub enum GoalStatus {
    Active,
    Paused,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SavingsGoal {
    pub id: String,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,

    #[schemars(description = "Contribution applied once per month while the goal is active.")]
    pub monthly_contribution: f64,

    pub start_month: MonthKey,

    #[serde(default)]
    pub target_month: Option<MonthKey>,

    pub status: GoalStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BankAccount {
    pub id: String,
    pub name: String,
    pub balance: f64,

    #[serde(default)]
    #[schemars(
        description = "The designated default spending account. Scenario money-left deltas land here."
    )]
    pub is_default: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct BankTransfer {
    pub id: String,
    pub from_account_id: String,
    pub to_account_id: String,
    pub amount: f64,
    pub month: MonthKey,

    #[schemars(description = "Calendar day of the month the transfer happens on.")]
    pub day: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PaydayModeSettings {
    pub enabled: bool,

    #[schemars(description = "A known payday the cycle is anchored to, in any month.")]
    pub anchor_date: NaiveDate,

    #[schemars(description = "Cycle length in days, e.g. 28 for a four-weekly wage.")]
    pub cycle_length_days: u32,

    #[serde(default)]
    #[schemars(
        description = "Income ids this mode applies to. An empty list applies the mode to every income item."
    )]
    pub income_ids: Vec<String>,
}

impl PaydayModeSettings {
    pub fn applies_to(&self, income_id: &str) -> bool {
        self.enabled
            && (self.income_ids.is_empty() || self.income_ids.iter().any(|id| id == income_id))
    }
}
