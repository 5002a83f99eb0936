//! Month snapshot aggregation.
//!
//! The central fold of the engine: combines income, bills, shopping,
//! personal bills, dated adjustments, card projections, loaned-out items
//! and an opening bank balance into one totals record per month, carrying
//! a running bank balance across the timeline. Later months genuinely
//! depend on earlier ones, so the fold is strictly sequential; everything
//! else about the computation is pure.

use crate::money::{round2, sum2};
use crate::month::MonthKey;
use crate::payday::resolve_paydays;
use crate::projection::{project, CardMonthProjection};
use crate::schema::{
    AdjustmentCategory, CardAccount, FormulaVariant, LineItem, LoanedOutItem, MonthlyAdjustment,
    MonthlyCardPayments, PaydayModeSettings,
};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One month's fully aggregated financial totals. Immutable once computed;
/// the whole timeline is recomputed from scratch whenever any contributing
/// entity changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthSnapshot {
    pub month: MonthKey,
    pub income_total: f64,
    pub house_bills_total: f64,
    pub shopping_total: f64,
    pub my_bills_total: f64,
    pub adjustments_total: f64,
    pub card_interest_total: f64,
    pub card_balance_total: f64,
    pub card_spend_total: f64,
    pub loaned_out_outstanding_total: f64,
    pub loaned_out_paid_back_total: f64,
    pub money_in_bank: f64,
    pub money_left: f64,
    pub formula_variant: FormulaVariant,
    pub inferred: bool,
}

/// Manual payday overrides: month -> income id -> days.
pub type PaydayOverrides = BTreeMap<MonthKey, BTreeMap<String, Vec<u32>>>;

/// Everything the snapshot builder consumes, borrowed from the caller.
pub struct SnapshotInputs<'a> {
    pub cards: &'a [CardAccount],
    pub payments: &'a [MonthlyCardPayments],
    pub income: &'a [LineItem],
    pub house_bills: &'a [LineItem],
    pub shopping: &'a [LineItem],
    pub my_bills: &'a [LineItem],
    pub adjustments: &'a [MonthlyAdjustment],
    pub payday_overrides: &'a PaydayOverrides,
    pub payday_mode: Option<&'a PaydayModeSettings>,
    pub loaned_out: &'a [LoanedOutItem],
    pub base_bank_balance: f64,
}

/// Builds the ordered snapshot timeline. An empty payments timeline yields
/// an empty list, not an error.
pub fn build_snapshots(inputs: &SnapshotInputs<'_>) -> Vec<MonthSnapshot> {
    let projections = project(inputs.cards, inputs.payments);
    build_from_projections(inputs, &projections)
}

/// Same fold, reusing card projections the caller already computed.
pub fn build_from_projections(
    inputs: &SnapshotInputs<'_>,
    projections: &[CardMonthProjection],
) -> Vec<MonthSnapshot> {
    let mut snapshots = Vec::with_capacity(projections.len());
    let mut cumulative_money_left = 0.0;

    for projection in projections {
        let month = projection.month;

        let house_bills_total = category_total(month, inputs.house_bills, inputs.adjustments, AdjustmentCategory::HouseBills);
        let shopping_total = category_total(month, inputs.shopping, inputs.adjustments, AdjustmentCategory::Shopping);
        let my_bills_total = category_total(month, inputs.my_bills, inputs.adjustments, AdjustmentCategory::MyBills);
        let income_total = income_total(month, inputs);

        let adjustments_total = sum2(
            inputs
                .adjustments
                .iter()
                .filter(|adj| adj.applies_to(month))
                .map(|adj| round2(adj.amount)),
        );

        let card_spend_total = projection.total_payment_amount;

        // The legacy variant leaves my-bills out of the subtraction. That
        // inconsistency is preserved from the original data, not fixed.
        let mut money_left = round2(income_total - card_spend_total);
        money_left = round2(money_left - house_bills_total);
        money_left = round2(money_left - shopping_total);
        if projection.formula_variant == FormulaVariant::Standard {
            money_left = round2(money_left - my_bills_total);
        }

        let loaned_out_outstanding_total = sum2(
            inputs
                .loaned_out
                .iter()
                .filter(|item| item.outstanding_in(month))
                .map(|item| round2(item.amount)),
        );
        let loaned_out_paid_back_total = sum2(
            inputs
                .loaned_out
                .iter()
                .filter(|item| item.paid_back_by(month))
                .map(|item| round2(item.amount)),
        );

        cumulative_money_left = round2(cumulative_money_left + money_left);
        let money_in_bank = round2(
            round2(round2(inputs.base_bank_balance) + cumulative_money_left)
                - loaned_out_outstanding_total,
        );

        debug!(
            "{}: income {} spend {} left {} bank {}",
            month, income_total, card_spend_total, money_left, money_in_bank
        );

        snapshots.push(MonthSnapshot {
            month,
            income_total,
            house_bills_total,
            shopping_total,
            my_bills_total,
            adjustments_total,
            card_interest_total: projection.total_interest_added,
            card_balance_total: projection.total_closing_balance,
            card_spend_total,
            loaned_out_outstanding_total,
            loaned_out_paid_back_total,
            money_in_bank,
            money_left,
            formula_variant: projection.formula_variant,
            inferred: projection.inferred,
        });
    }

    snapshots
}

fn category_total(
    month: MonthKey,
    items: &[LineItem],
    adjustments: &[MonthlyAdjustment],
    category: AdjustmentCategory,
) -> f64 {
    let base = sum2(items.iter().map(|item| round2(item.amount)));
    let adjusted = adjustments
        .iter()
        .filter(|adj| adj.category == category && adj.applies_to(month))
        .map(|adj| round2(adj.amount));
    sum2(std::iter::once(base).chain(adjusted))
}

/// Income counts a full amount per resolved payday; a short pay cycle can
/// land twice (or more) in one month.
fn income_total(month: MonthKey, inputs: &SnapshotInputs<'_>) -> f64 {
    let empty = BTreeMap::new();
    let overrides = inputs.payday_overrides.get(&month).unwrap_or(&empty);
    let paydays = resolve_paydays(month, inputs.income, overrides, inputs.payday_mode);

    let base = sum2(inputs.income.iter().map(|item| {
        let count = paydays.get(&item.id).map(Vec::len).unwrap_or(1);
        round2(round2(item.amount) * count as f64)
    }));

    let adjusted = inputs
        .adjustments
        .iter()
        .filter(|adj| adj.category == AdjustmentCategory::Income && adj.applies_to(month))
        .map(|adj| round2(adj.amount));
    sum2(std::iter::once(base).chain(adjusted))
}
