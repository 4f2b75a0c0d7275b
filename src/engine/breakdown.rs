// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Datelike, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::engine::fx::{checked_add, convert, RateTable};
use crate::error::EngineError;
use crate::models::{CategoryId, CategoryType, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakdownPeriod {
    All,
    Month { year: i32, month: u32 },
}

impl BreakdownPeriod {
    pub fn contains(self, date: NaiveDateTime) -> bool {
        match self {
            BreakdownPeriod::All => true,
            BreakdownPeriod::Month { year, month } => date.year() == year && date.month() == month,
        }
    }
}

impl FromStr for BreakdownPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") {
            return Ok(BreakdownPeriod::All);
        }
        let first = NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
            .map_err(|_| EngineError::InvalidPeriod(s.to_string()))?;
        Ok(BreakdownPeriod::Month {
            year: first.year(),
            month: first.month(),
        })
    }
}

impl fmt::Display for BreakdownPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BreakdownPeriod::All => f.write_str("all"),
            BreakdownPeriod::Month { year, month } => write!(f, "{:04}-{:02}", year, month),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BreakdownRow {
    pub category_id: CategoryId,
    pub category: String,
    pub amount: Decimal,
    /// Share of the total in percent, unrounded.
    pub percentage: Decimal,
}

/// Per-category totals of one entry type within `period`, largest first.
///
/// Entries without a category present in the snapshot are left out. Ties keep
/// the order in which categories were first seen.
pub fn breakdown(
    snapshot: &Snapshot,
    rates: &RateTable,
    target: &str,
    kind: CategoryType,
    period: BreakdownPeriod,
) -> Result<Vec<BreakdownRow>, EngineError> {
    let entry_type = kind.entry_type();
    let mut rows: Vec<BreakdownRow> = Vec::new();
    let mut index: HashMap<CategoryId, usize> = HashMap::new();

    for entry in snapshot
        .entries
        .iter()
        .filter(|e| e.r#type == entry_type && period.contains(e.date))
    {
        let Some(category) = entry.category_id.and_then(|id| snapshot.category(id)) else {
            continue;
        };
        let amount = convert(entry.amount, &entry.currency, target, rates)?;
        match index.get(&category.id) {
            Some(&i) => rows[i].amount = checked_add(rows[i].amount, amount, target)?,
            None => {
                index.insert(category.id, rows.len());
                rows.push(BreakdownRow {
                    category_id: category.id,
                    category: category.name.clone(),
                    amount,
                    percentage: Decimal::ZERO,
                });
            }
        }
    }

    let total = rows
        .iter()
        .try_fold(Decimal::ZERO, |acc, r| checked_add(acc, r.amount, target))?;
    if !total.is_zero() {
        for row in &mut rows {
            row.percentage = row
                .amount
                .checked_div(total)
                .map(|share| share * Decimal::ONE_HUNDRED)
                .unwrap_or_default();
        }
    }
    rows.sort_by(|a, b| b.amount.cmp(&a.amount));
    tracing::debug!(kind = %kind, period = %period, rows = rows.len(), "built breakdown");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_parsing() {
        assert_eq!("all".parse::<BreakdownPeriod>().unwrap(), BreakdownPeriod::All);
        assert_eq!(
            "2024-03".parse::<BreakdownPeriod>().unwrap(),
            BreakdownPeriod::Month {
                year: 2024,
                month: 3
            }
        );
        assert!("2024-13".parse::<BreakdownPeriod>().is_err());
        assert_eq!(
            BreakdownPeriod::Month {
                year: 2024,
                month: 3
            }
            .to_string(),
            "2024-03"
        );
    }
}
