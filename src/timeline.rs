//! Calendar timeline and ledger entries.
//!
//! Expands one month's entities into dated events (debit negative, credit
//! positive, days clamped to the last valid day of the month) and maps
//! them into ledger entries with a planned -> posted -> paid lifecycle.
//! Status transitions are explicit external actions, never inferred.

use crate::error::{EngineError, Result};
use crate::money::round2;
use crate::month::MonthKey;
use crate::payday::resolve_paydays;
use crate::schema::{
    AdjustmentCategory, CardAccount, LineItem, LoanedOutItem, MonthlyAdjustment,
    MonthlyCardPayments, PaydayModeSettings,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventSource {
    Income,
    HouseBill,
    Shopping,
    MyBill,
    CardPayment,
    Adjustment,
    LoanedOut,
}

/// One projected calendar movement within a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub date: NaiveDate,
    pub day: u32,
    pub title: String,
    /// Debit negative, credit positive.
    pub amount: f64,
    pub source_type: EventSource,
    pub source_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LedgerStatus {
    Planned,
    Posted,
    Paid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub day: u32,
    pub title: String,
    pub amount: f64,
    pub status: LedgerStatus,
    pub source_type: EventSource,
    pub source_id: String,
    pub posted_at: Option<NaiveDateTime>,
    pub paid_at: Option<NaiveDateTime>,
}

impl LedgerEntry {
    pub fn from_event(event: &TimelineEvent) -> Self {
        Self {
            date: event.date,
            day: event.day,
            title: event.title.clone(),
            amount: event.amount,
            status: LedgerStatus::Planned,
            source_type: event.source_type,
            source_id: event.source_id.clone(),
            posted_at: None,
            paid_at: None,
        }
    }

    pub fn mark_posted(&mut self, at: NaiveDateTime) -> Result<()> {
        match self.status {
            LedgerStatus::Planned => {
                self.status = LedgerStatus::Posted;
                self.posted_at = Some(at);
                Ok(())
            }
            _ => Err(self.invalid_transition("posted")),
        }
    }

    pub fn mark_paid(&mut self, at: NaiveDateTime) -> Result<()> {
        match self.status {
            LedgerStatus::Posted => {
                self.status = LedgerStatus::Paid;
                self.paid_at = Some(at);
                Ok(())
            }
            _ => Err(self.invalid_transition("paid")),
        }
    }

    /// The only transition that moves backwards; clears both timestamps.
    pub fn revert_to_planned(&mut self) {
        self.status = LedgerStatus::Planned;
        self.posted_at = None;
        self.paid_at = None;
    }

    fn invalid_transition(&self, to: &str) -> EngineError {
        EngineError::InvalidLedgerTransition {
            entry: self.source_id.clone(),
            from: format!("{:?}", self.status).to_lowercase(),
            to: to.to_string(),
        }
    }
}

/// Everything the timeline builder consumes for one month.
pub struct TimelineInputs<'a> {
    pub cards: &'a [CardAccount],
    pub payments_for_month: Option<&'a MonthlyCardPayments>,
    pub income: &'a [LineItem],
    pub payday_overrides: &'a BTreeMap<String, Vec<u32>>,
    pub payday_mode: Option<&'a PaydayModeSettings>,
    pub house_bills: &'a [LineItem],
    pub shopping: &'a [LineItem],
    pub my_bills: &'a [LineItem],
    pub adjustments: &'a [MonthlyAdjustment],
    pub loaned_out: &'a [LoanedOutItem],
}

/// Expands one month's entities into dated events, sorted by date, then
/// amount descending, then title.
pub fn build_timeline(month: MonthKey, inputs: &TimelineInputs<'_>) -> Vec<TimelineEvent> {
    let mut events = Vec::new();

    let paydays = resolve_paydays(
        month,
        inputs.income,
        inputs.payday_overrides,
        inputs.payday_mode,
    );
    for item in inputs.income {
        if let Some(days) = paydays.get(&item.id) {
            for &day in days {
                events.push(event(
                    month,
                    day,
                    &item.name,
                    round2(item.amount),
                    EventSource::Income,
                    &item.id,
                ));
            }
        }
    }

    for (items, source) in [
        (inputs.house_bills, EventSource::HouseBill),
        (inputs.shopping, EventSource::Shopping),
        (inputs.my_bills, EventSource::MyBill),
    ] {
        for item in items {
            events.push(event(
                month,
                item.due_day_of_month.unwrap_or(1),
                &item.name,
                -round2(item.amount),
                source,
                &item.id,
            ));
        }
    }

    if let Some(payments) = inputs.payments_for_month {
        for (card_id, amount) in &payments.by_card {
            let card = inputs.cards.iter().find(|c| &c.id == card_id);
            let title = card.map(|c| c.name.clone()).unwrap_or_else(|| card_id.clone());
            let day = card.and_then(|c| c.due_day_of_month).unwrap_or(1);
            events.push(event(
                month,
                day,
                &title,
                -round2(*amount),
                EventSource::CardPayment,
                card_id,
            ));
        }
    }

    for adjustment in inputs.adjustments {
        if !adjustment.applies_to(month) {
            continue;
        }
        let amount = match adjustment.category {
            AdjustmentCategory::Income => round2(adjustment.amount),
            _ => -round2(adjustment.amount),
        };
        events.push(event(
            month,
            1,
            &adjustment.name,
            amount,
            EventSource::Adjustment,
            &adjustment.id,
        ));
    }

    for loan in inputs.loaned_out {
        if loan.start_month == month {
            events.push(event(
                month,
                1,
                "Loaned out",
                -round2(loan.amount),
                EventSource::LoanedOut,
                &loan.id,
            ));
        }
        if loan.paid_back_month == Some(month) {
            events.push(event(
                month,
                1,
                "Loan repaid",
                round2(loan.amount),
                EventSource::LoanedOut,
                &loan.id,
            ));
        }
    }

    events.sort_by(|a, b| {
        a.date
            .cmp(&b.date)
            .then_with(|| b.amount.total_cmp(&a.amount))
            .then_with(|| a.title.cmp(&b.title))
    });
    events
}

/// Maps events into ledger entries, all starting `planned`.
pub fn build_ledger(events: &[TimelineEvent]) -> Vec<LedgerEntry> {
    events.iter().map(LedgerEntry::from_event).collect()
}

fn event(
    month: MonthKey,
    day: u32,
    title: &str,
    amount: f64,
    source_type: EventSource,
    source_id: &str,
) -> TimelineEvent {
    let day = month.clamp_day(day);
    TimelineEvent {
        date: NaiveDate::from_ymd_opt(month.year(), month.month(), day)
            .expect("clamped day is a valid calendar day"),
        day,
        title: title.to_string(),
        amount,
        source_type,
        source_id: source_id.to_string(),
    }
}
