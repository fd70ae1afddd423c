//! Period and category totals
//!
//! All reducers are pure. Running totals are rounded to two decimal places
//! after every accumulation. Category reducers only count outflows
//! (`amount < 0`); a zero amount is skipped there but counted as an inflow by
//! [`total_by_period`].

use chrono::{DateTime, Datelike, FixedOffset};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::{Category, Transaction};

/// period key → category → signed total
pub type CategoryTotals = BTreeMap<String, BTreeMap<Category, Decimal>>;

/// Inflow and outflow sums for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodFlow {
    pub inflows: Decimal,
    pub outflows: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Day,
    Week,
    Month,
    Year,
}

impl Period {
    /// `YYYY-MM-DD`, `YYYY-Www` (ISO week), `MM-YYYY` or `YYYY`.
    pub fn key(&self, date: &DateTime<FixedOffset>) -> String {
        match self {
            Period::Day => date.format("%Y-%m-%d").to_string(),
            Period::Week => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            Period::Month => date.format("%m-%Y").to_string(),
            Period::Year => date.format("%Y").to_string(),
        }
    }
}

fn accumulate(total: &mut Decimal, amount: Decimal) {
    *total = (*total + amount).round_dp(2);
}

/// Outflow totals per category, bucketed by `period`.
pub fn category_totals(transactions: &[Transaction], period: Period) -> CategoryTotals {
    let mut totals = CategoryTotals::new();

    for transaction in transactions {
        if !transaction.is_outflow() {
            continue;
        }
        let category = transaction.category.unwrap_or(Category::Uncategorized);
        let total = totals
            .entry(period.key(&transaction.date))
            .or_default()
            .entry(category)
            .or_insert(Decimal::ZERO);
        accumulate(total, transaction.amount);
    }

    totals
}

pub fn daily_category_totals(transactions: &[Transaction]) -> CategoryTotals {
    category_totals(transactions, Period::Day)
}

pub fn weekly_category_totals(transactions: &[Transaction]) -> CategoryTotals {
    category_totals(transactions, Period::Week)
}

pub fn monthly_category_totals(transactions: &[Transaction]) -> CategoryTotals {
    category_totals(transactions, Period::Month)
}

pub fn yearly_category_totals(transactions: &[Transaction]) -> CategoryTotals {
    category_totals(transactions, Period::Year)
}

/// Inflows and outflows per `MM-YYYY`, no category split.
pub fn total_by_period(transactions: &[Transaction]) -> BTreeMap<String, PeriodFlow> {
    let mut totals: BTreeMap<String, PeriodFlow> = BTreeMap::new();

    for transaction in transactions {
        let flow = totals.entry(Period::Month.key(&transaction.date)).or_default();
        if transaction.is_outflow() {
            accumulate(&mut flow.outflows, transaction.amount);
        } else {
            accumulate(&mut flow.inflows, transaction.amount);
        }
    }

    totals
}
