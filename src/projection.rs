//! Card balance projection.
//!
//! Simulates each card's balance across consecutive months: interest
//! accrues on the opening balance, the month's payment is applied, and the
//! closing balance carries forward as next month's opening balance.

use crate::money::round2;
use crate::month::{month_range, MonthKey};
use crate::schema::{CardAccount, FormulaVariant, MonthlyCardPayments};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMonthEntry {
    pub opening_balance: f64,
    pub interest_added: f64,
    pub payment_amount: f64,
    pub closing_balance: f64,
}

/// One month of the projection, with per-card entries and cross-card
/// totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardMonthProjection {
    pub month: MonthKey,
    pub formula_variant: FormulaVariant,
    pub inferred: bool,
    pub by_card: BTreeMap<String, CardMonthEntry>,
    pub total_interest_added: f64,
    pub total_payment_amount: f64,
    pub total_closing_balance: f64,
}

impl CardMonthProjection {
    pub fn payment_for(&self, card_id: &str) -> f64 {
        self.by_card
            .get(card_id)
            .map(|entry| entry.payment_amount)
            .unwrap_or(0.0)
    }
}

/// Normalizes a raw payments timeline into one row per consecutive month.
///
/// Interior gaps are filled by carrying the prior month's payments forward
/// (`inferred = true`). Months past the last explicit row are synthesized
/// with zero payments and an empty `by_card` map, through December of the
/// final known year, so compounding interest stays visible with no further
/// data entry.
pub fn extend_timeline(rows: &[MonthlyCardPayments]) -> Vec<MonthlyCardPayments> {
    let mut by_month: BTreeMap<MonthKey, MonthlyCardPayments> = BTreeMap::new();
    for row in rows {
        by_month.insert(row.month, row.clone());
    }

    let (Some(&first), Some(&last)) = (by_month.keys().next(), by_month.keys().next_back()) else {
        return Vec::new();
    };

    let mut extended = Vec::new();
    let mut previous: Option<MonthlyCardPayments> = None;

    for month in month_range(first, last.year_end()) {
        let row = match by_month.get(&month) {
            Some(row) => row.clone(),
            None if month <= last => {
                // Gap inside the explicit range: carry the prior month
                // forward.
                let prior = previous.as_ref().expect("first month is always explicit");
                MonthlyCardPayments {
                    month,
                    by_card: prior.by_card.clone(),
                    formula_variant: prior.formula_variant,
                    inferred: true,
                }
            }
            None => {
                let prior = previous.as_ref().expect("first month is always explicit");
                MonthlyCardPayments {
                    month,
                    by_card: BTreeMap::new(),
                    formula_variant: prior.formula_variant,
                    inferred: true,
                }
            }
        };
        previous = Some(row.clone());
        extended.push(row);
    }

    extended
}

/// Projects every card across the (extended) payments timeline.
pub fn project(cards: &[CardAccount], rows: &[MonthlyCardPayments]) -> Vec<CardMonthProjection> {
    let timeline = extend_timeline(rows);
    if timeline.is_empty() {
        return Vec::new();
    }

    let mut balances: BTreeMap<String, f64> = cards
        .iter()
        .map(|card| (card.id.clone(), round2(card.used_limit)))
        .collect();

    let mut projections = Vec::with_capacity(timeline.len());

    for row in &timeline {
        let mut by_card = BTreeMap::new();
        let mut total_interest = 0.0;
        let mut total_payment = 0.0;
        let mut total_closing = 0.0;

        for card in cards {
            let opening = balances[&card.id];
            let interest = round2(opening * round2(card.interest_rate_apr) / 1200.0);
            let payment = round2(row.by_card.get(&card.id).copied().unwrap_or(0.0));
            let closing = round2(opening + interest - payment).max(0.0);

            balances.insert(card.id.clone(), closing);
            by_card.insert(
                card.id.clone(),
                CardMonthEntry {
                    opening_balance: opening,
                    interest_added: interest,
                    payment_amount: payment,
                    closing_balance: closing,
                },
            );

            total_interest = round2(total_interest + interest);
            total_payment = round2(total_payment + payment);
            total_closing = round2(total_closing + closing);
        }

        projections.push(CardMonthProjection {
            month: row.month,
            formula_variant: row.formula_variant,
            inferred: row.inferred,
            by_card,
            total_interest_added: total_interest,
            total_payment_amount: total_payment,
            total_closing_balance: total_closing,
        });
    }

    projections
}
