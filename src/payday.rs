//! Payday resolution.
//!
//! Works out which calendar days of a month each income item is received
//! on. Precedence per income item:
//!
//! 1. a non-empty manual override for that month wins outright;
//! 2. else, payday mode (anchor date + cycle length) when enabled and
//!    scoped to the item;
//! 3. else the item's static `due_day_of_month`, defaulting to day 1.
//!
//! A short cycle can put more than one payday in a month; every one of
//! them is returned, and the snapshot builder counts a full income amount
//! per payday.

use crate::month::MonthKey;
use crate::schema::{LineItem, PaydayModeSettings};
use chrono::{Datelike, Duration};
use std::collections::BTreeMap;

pub type PaydaysByIncome = BTreeMap<String, Vec<u32>>;

pub fn resolve_paydays(
    month: MonthKey,
    income_items: &[LineItem],
    manual_overrides: &BTreeMap<String, Vec<u32>>,
    payday_mode: Option<&PaydayModeSettings>,
) -> PaydaysByIncome {
    let mut resolved = BTreeMap::new();

    for item in income_items {
        let days = resolve_for_item(month, item, manual_overrides, payday_mode);
        resolved.insert(item.id.clone(), days);
    }

    resolved
}

fn resolve_for_item(
    month: MonthKey,
    item: &LineItem,
    manual_overrides: &BTreeMap<String, Vec<u32>>,
    payday_mode: Option<&PaydayModeSettings>,
) -> Vec<u32> {
    if let Some(days) = manual_overrides.get(&item.id) {
        if !days.is_empty() {
            return normalize_days(month, days);
        }
    }

    if let Some(mode) = payday_mode {
        if mode.applies_to(&item.id) && mode.cycle_length_days > 0 {
            return cycle_days_in_month(month, mode);
        }
    }

    vec![month.clamp_day(item.due_day_of_month.unwrap_or(1))]
}

/// Walks whole cycles forward/backward from the anchor date and collects
/// every cycle date that lands inside the target month, as calendar days.
fn cycle_days_in_month(month: MonthKey, mode: &PaydayModeSettings) -> Vec<u32> {
    let cycle = i64::from(mode.cycle_length_days);
    let start = month.first_day();
    let end = month.last_day();

    let offset = (start - mode.anchor_date).num_days();
    let mut current = mode.anchor_date + Duration::days(offset.div_euclid(cycle) * cycle);
    while current < start {
        current += Duration::days(cycle);
    }

    let mut days = Vec::new();
    while current <= end {
        days.push(current.day());
        current += Duration::days(cycle);
    }
    days
}

fn normalize_days(month: MonthKey, days: &[u32]) -> Vec<u32> {
    let mut days: Vec<u32> = days.iter().map(|&d| month.clamp_day(d)).collect();
    days.sort_unstable();
    days.dedup();
    days
}
