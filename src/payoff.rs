//! Debt payoff simulation.
//!
//! An independent, longer-horizon simulation of paying all cards down to
//! zero under a fixed monthly budget. Runs snowball (smallest balance
//! first) or avalanche (highest APR first) ordering, re-sorting targets
//! after every allocation so a card reaching zero frees its minimum for
//! the rest of the budget within the same month.

use crate::money::round2;
use crate::schema::{CardAccount, MinimumPaymentRule, PayoffStrategy};
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hard cap on simulated months. A budget that cannot clear the debt
/// inside this horizon reports `months_to_debt_free = None`, which is a
/// legitimate financial outcome rather than an error.
pub const MAX_SIMULATED_MONTHS: u32 = 600;

/// A balance is considered cleared below this threshold.
const PAYOFF_EPSILON: f64 = 0.0001;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffEvent {
    pub card_id: String,
    pub card_name: String,
    /// 1-based simulated month the card reached zero in.
    pub month: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayoffResult {
    pub strategy: PayoffStrategy,
    pub months_to_debt_free: Option<u32>,
    pub total_interest: f64,
    pub total_paid: f64,
    /// Ordered by completion time, not input order.
    pub payoff_order: Vec<PayoffEvent>,
}

struct SimCard<'a> {
    card: &'a CardAccount,
    balance: f64,
    paid_off_month: Option<u32>,
}

impl SimCard<'_> {
    fn active(&self) -> bool {
        self.balance > PAYOFF_EPSILON
    }

    fn required_minimum(&self, configured: f64) -> f64 {
        let rule_minimum = match self.card.minimum_payment_rule.unwrap_or_default() {
            MinimumPaymentRule::Fixed { amount } => round2(amount),
            MinimumPaymentRule::Percent { rate, floor } => {
                round2((self.balance * round2(rate) / 100.0).max(floor))
            }
        };
        rule_minimum.max(round2(configured)).min(self.balance)
    }
}

pub fn simulate(
    strategy: PayoffStrategy,
    cards: &[CardAccount],
    starting_balances: &BTreeMap<String, f64>,
    monthly_budget: f64,
    configured_minimums: &BTreeMap<String, f64>,
) -> PayoffResult {
    let mut sim: Vec<SimCard<'_>> = cards
        .iter()
        .map(|card| SimCard {
            card,
            balance: round2(
                starting_balances
                    .get(&card.id)
                    .copied()
                    .unwrap_or(card.used_limit),
            )
            .max(0.0),
            paid_off_month: None,
        })
        .collect();

    let mut total_interest = 0.0;
    let mut total_paid = 0.0;
    let mut payoff_order: Vec<PayoffEvent> = Vec::new();
    let mut months_to_debt_free = None;

    // Cards with no debt to begin with never enter the payoff order.
    for card in sim.iter_mut().filter(|c| !c.active()) {
        card.paid_off_month = Some(0);
    }
    if sim.iter().all(|c| c.paid_off_month.is_some()) {
        months_to_debt_free = Some(0);
    }

    let mut month = 0;
    while months_to_debt_free.is_none() && month < MAX_SIMULATED_MONTHS {
        month += 1;

        // 1. Interest accrues on every card still carrying a balance.
        for card in sim.iter_mut().filter(|c| c.active()) {
            let interest = round2(card.balance * round2(card.card.interest_rate_apr) / 1200.0);
            card.balance = round2(card.balance + interest);
            total_interest = round2(total_interest + interest);
        }

        // 2. Required minimums come out first, across all active cards.
        let mut minimums = 0.0;
        for card in sim.iter_mut().filter(|c| c.active()) {
            let configured = configured_minimums
                .get(&card.card.id)
                .copied()
                .unwrap_or(0.0);
            let minimum = card.required_minimum(configured);
            card.balance = round2(card.balance - minimum);
            total_paid = round2(total_paid + minimum);
            minimums = round2(minimums + minimum);
        }
        record_payoffs(&mut sim, month, &mut payoff_order);

        // 3. Whatever the budget leaves goes to one target at a time,
        //    re-evaluating the ordering after each card clears.
        let mut remaining = round2(round2(monthly_budget).max(minimums) - minimums);
        while remaining > PAYOFF_EPSILON {
            let Some(target) = pick_target(&mut sim, strategy) else {
                break;
            };
            let payment = remaining.min(target.balance);
            target.balance = round2(target.balance - payment);
            total_paid = round2(total_paid + payment);
            remaining = round2(remaining - payment);
            record_payoffs(&mut sim, month, &mut payoff_order);
        }

        if sim.iter().all(|c| !c.active()) {
            months_to_debt_free = Some(month);
        }
    }

    debug!(
        "{:?} payoff: {:?} months, {} interest, {} paid",
        strategy, months_to_debt_free, total_interest, total_paid
    );

    PayoffResult {
        strategy,
        months_to_debt_free,
        total_interest,
        total_paid,
        payoff_order,
    }
}

fn record_payoffs(sim: &mut [SimCard<'_>], month: u32, order: &mut Vec<PayoffEvent>) {
    for card in sim.iter_mut() {
        if !card.active() && card.paid_off_month.is_none() {
            card.paid_off_month = Some(month);
            card.balance = 0.0;
            order.push(PayoffEvent {
                card_id: card.card.id.clone(),
                card_name: card.card.name.clone(),
                month,
            });
        }
    }
}

fn pick_target<'a, 'b>(
    sim: &'a mut [SimCard<'b>],
    strategy: PayoffStrategy,
) -> Option<&'a mut SimCard<'b>> {
    sim.iter_mut().filter(|c| c.active()).min_by(|a, b| {
        match strategy {
            // Smallest balance first, ties broken by name.
            PayoffStrategy::Snowball => a
                .balance
                .total_cmp(&b.balance)
                .then_with(|| a.card.name.cmp(&b.card.name)),
            // Highest APR first, ties by balance descending, then name.
            PayoffStrategy::Avalanche => b
                .card
                .interest_rate_apr
                .total_cmp(&a.card.interest_rate_apr)
                .then_with(|| b.balance.total_cmp(&a.balance))
                .then_with(|| a.card.name.cmp(&b.card.name)),
        }
    })
}
