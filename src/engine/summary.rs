// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::engine::balance::total_balance;
use crate::engine::filters::TimeGrouping;
use crate::engine::fx::{checked_add, checked_sub, convert, RateTable};
use crate::error::EngineError;
use crate::models::{EntryType, Snapshot};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthOverMonth {
    pub current: Decimal,
    pub previous: Decimal,
    pub change: Decimal,
    pub change_pct: Decimal,
}

impl MonthOverMonth {
    fn new(current: Decimal, previous: Decimal, currency: &str) -> Result<Self, EngineError> {
        let change = checked_sub(current, previous, currency)?;
        let change_pct = if !previous.is_zero() {
            change
                .checked_div(previous)
                .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
                .ok_or_else(|| EngineError::TotalOverflow {
                    currency: currency.to_string(),
                })?
        } else if !current.is_zero() {
            Decimal::ONE_HUNDRED
        } else {
            Decimal::ZERO
        };
        Ok(Self {
            current,
            previous,
            change,
            change_pct,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    pub currency: String,
    pub month: NaiveDate,
    pub total_balance: Decimal,
    pub income: MonthOverMonth,
    pub expense: MonthOverMonth,
    pub net: MonthOverMonth,
    pub avg_monthly_income: Decimal,
    pub income_months: usize,
    pub avg_monthly_expense: Decimal,
    pub expense_months: usize,
}

struct MonthlyTotals<'a> {
    snapshot: &'a Snapshot,
    rates: &'a RateTable,
    target: &'a str,
}

impl MonthlyTotals<'_> {
    fn total(&self, t: EntryType, month_start: NaiveDate) -> Result<Decimal, EngineError> {
        let mut sum = Decimal::ZERO;
        for e in &self.snapshot.entries {
            if e.r#type == t && TimeGrouping::Monthly.period_start(e.date.date()) == month_start {
                let amount = convert(e.amount, &e.currency, self.target, self.rates)?;
                sum = checked_add(sum, amount, self.target)?;
            }
        }
        Ok(sum)
    }

    /// Average over every other month with `t` entries plus this month,
    /// extrapolated to a full month when `today` is not its last day.
    fn average(
        &self,
        t: EntryType,
        this_month: NaiveDate,
        current: Decimal,
        today: NaiveDate,
    ) -> Result<(Decimal, usize), EngineError> {
        let months: BTreeSet<NaiveDate> = self
            .snapshot
            .entries
            .iter()
            .filter(|e| e.r#type == t)
            .map(|e| TimeGrouping::Monthly.period_start(e.date.date()))
            .filter(|m| *m != this_month)
            .collect();

        let days_in_month = TimeGrouping::Monthly.period_end(this_month).day();
        let days_passed = today.day();
        let projected = if days_passed < days_in_month {
            (current / Decimal::from(days_passed))
                .checked_mul(Decimal::from(days_in_month))
                .ok_or_else(|| EngineError::TotalOverflow {
                    currency: self.target.to_string(),
                })?
        } else {
            current
        };

        let mut sum = projected;
        for m in &months {
            sum = checked_add(sum, self.total(t, *m)?, self.target)?;
        }
        let count = months.len() + 1;
        Ok((sum / Decimal::from(count), count))
    }
}

/// Dashboard figures for the month containing `today`.
pub fn summarize(
    snapshot: &Snapshot,
    rates: &RateTable,
    target: &str,
    today: NaiveDate,
) -> Result<FinancialSummary, EngineError> {
    let this_month = TimeGrouping::Monthly.period_start(today);
    let last_month =
        TimeGrouping::Monthly.period_start(this_month.pred_opt().unwrap_or(this_month));
    let totals = MonthlyTotals {
        snapshot,
        rates,
        target,
    };

    let income = MonthOverMonth::new(
        totals.total(EntryType::Income, this_month)?,
        totals.total(EntryType::Income, last_month)?,
        target,
    )?;
    let expense = MonthOverMonth::new(
        totals.total(EntryType::Expense, this_month)?,
        totals.total(EntryType::Expense, last_month)?,
        target,
    )?;
    let net = MonthOverMonth::new(
        checked_sub(income.current, expense.current, target)?,
        checked_sub(income.previous, expense.previous, target)?,
        target,
    )?;
    let (avg_monthly_income, income_months) =
        totals.average(EntryType::Income, this_month, income.current, today)?;
    let (avg_monthly_expense, expense_months) =
        totals.average(EntryType::Expense, this_month, expense.current, today)?;

    Ok(FinancialSummary {
        currency: target.to_string(),
        month: this_month,
        total_balance: total_balance(&snapshot.wallets, None, &snapshot.entries, rates, target)?,
        income,
        expense,
        net,
        avg_monthly_income,
        income_months,
        avg_monthly_expense,
        expense_months,
    })
}
