// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Filter criteria shared by the entry list, the time series and the
//! breakdown. Filters are plain values: changing one produces a new value.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{EngineError, LedgerError};
use crate::models::{Category, CategoryId, CategoryType, Entry, EntryType, WalletId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeGrouping {
    Daily,
    #[default]
    Monthly,
    Yearly,
}

impl TimeGrouping {
    /// First calendar day of the period containing `date`.
    pub fn period_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            TimeGrouping::Daily => date,
            TimeGrouping::Monthly => date.with_day(1).unwrap_or(date),
            TimeGrouping::Yearly => date.with_ordinal(1).unwrap_or(date),
        }
    }

    /// Start of the period after the one starting at `start`.
    pub fn next_start(self, start: NaiveDate) -> Option<NaiveDate> {
        match self {
            TimeGrouping::Daily => start.succ_opt(),
            TimeGrouping::Monthly => start.checked_add_months(Months::new(1)),
            TimeGrouping::Yearly => start.checked_add_months(Months::new(12)),
        }
    }

    /// Last calendar day of the period starting at `start`.
    pub fn period_end(self, start: NaiveDate) -> NaiveDate {
        self.next_start(start)
            .and_then(|n| n.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn label(self, start: NaiveDate) -> String {
        match self {
            TimeGrouping::Daily => start.format("%b %-d").to_string(),
            TimeGrouping::Monthly => start.format("%b %Y").to_string(),
            TimeGrouping::Yearly => start.format("%Y").to_string(),
        }
    }
}

impl FromStr for TimeGrouping {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" | "day" => Ok(TimeGrouping::Daily),
            "monthly" | "month" => Ok(TimeGrouping::Monthly),
            "yearly" | "year" => Ok(TimeGrouping::Yearly),
            other => Err(EngineError::InvalidGrouping(other.to_string())),
        }
    }
}

/// What a chart plots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartMetric {
    Balance,
    Income,
    Expense,
}

impl ChartMetric {
    pub fn as_str(self) -> &'static str {
        match self {
            ChartMetric::Balance => "balance",
            ChartMetric::Income => "income",
            ChartMetric::Expense => "expense",
        }
    }
}

impl FromStr for ChartMetric {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "balance" => Ok(ChartMetric::Balance),
            "income" => Ok(ChartMetric::Income),
            "expense" => Ok(ChartMetric::Expense),
            other => Err(EngineError::InvalidMetric(other.to_string())),
        }
    }
}

/// Entry type axis. `All` is a sentinel, not "nothing matched".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeFilter {
    #[default]
    All,
    Only(EntryType),
}

impl TypeFilter {
    pub fn matches(self, t: EntryType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(only) => only == t,
        }
    }

    /// Whether a category of type `ct` can be picked under this filter.
    pub fn admits_category(self, ct: CategoryType) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => t.category_type() == Some(ct),
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeFilter::All => f.write_str("all"),
            TypeFilter::Only(t) => write!(f, "{}", t),
        }
    }
}

impl FromStr for TypeFilter {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(TypeFilter::All);
        }
        Ok(TypeFilter::Only(s.parse()?))
    }
}

/// Filters for the entry list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryFilters {
    pub type_filter: TypeFilter,
    pub category_id: Option<CategoryId>,
    pub wallet_id: Option<WalletId>,
}

impl EntryFilters {
    /// Changing the type always drops the category, since category sets are
    /// scoped by type.
    pub fn with_type(self, type_filter: TypeFilter) -> Self {
        Self {
            type_filter,
            category_id: None,
            ..self
        }
    }

    pub fn with_category(self, category: Option<&Category>) -> Result<Self, EngineError> {
        let Some(category) = category else {
            return Ok(Self {
                category_id: None,
                ..self
            });
        };
        if !self.type_filter.admits_category(category.r#type) {
            return Err(EngineError::IncompatibleCategory {
                category: category.id,
                category_type: category.r#type,
                filter: self.type_filter.to_string(),
            });
        }
        Ok(Self {
            category_id: Some(category.id),
            ..self
        })
    }

    pub fn with_wallet(self, wallet_id: Option<WalletId>) -> Self {
        Self { wallet_id, ..self }
    }

    pub fn matches(&self, entry: &Entry) -> bool {
        self.type_filter.matches(entry.r#type)
            && self.category_id.is_none_or(|c| entry.category_id == Some(c))
            && self.wallet_id.is_none_or(|w| entry.wallet_id == w)
    }

    pub fn apply<'a>(&self, entries: &'a [Entry]) -> Vec<&'a Entry> {
        entries.iter().filter(|e| self.matches(e)).collect()
    }
}

/// Filters for the time series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartFilters {
    pub grouping: TimeGrouping,
    /// `None` emits income, expense and balance together.
    pub metric: Option<ChartMetric>,
    pub category_id: Option<CategoryId>,
    pub wallet_id: Option<WalletId>,
}

impl ChartFilters {
    pub fn with_grouping(self, grouping: TimeGrouping) -> Self {
        Self { grouping, ..self }
    }

    /// Like [`EntryFilters::with_type`], a metric change drops the category.
    pub fn with_metric(self, metric: Option<ChartMetric>) -> Self {
        Self {
            metric,
            category_id: None,
            ..self
        }
    }

    pub fn with_category(self, category: Option<&Category>) -> Result<Self, EngineError> {
        let Some(category) = category else {
            return Ok(Self {
                category_id: None,
                ..self
            });
        };
        let compatible = match self.metric {
            None => true,
            Some(ChartMetric::Balance) => false,
            Some(ChartMetric::Income) => category.r#type == CategoryType::Income,
            Some(ChartMetric::Expense) => category.r#type == CategoryType::Expense,
        };
        if !compatible {
            return Err(EngineError::IncompatibleCategory {
                category: category.id,
                category_type: category.r#type,
                filter: self.metric.map_or("all", ChartMetric::as_str).to_string(),
            });
        }
        Ok(Self {
            category_id: Some(category.id),
            ..self
        })
    }

    pub fn with_wallet(self, wallet_id: Option<WalletId>) -> Self {
        Self { wallet_id, ..self }
    }

    /// Whether `entry` feeds the per-period income/expense totals.
    pub fn counts_as_flow(&self, entry: &Entry) -> bool {
        matches!(entry.r#type, EntryType::Income | EntryType::Expense)
            && self.category_id.is_none_or(|c| entry.category_id == Some(c))
            && self.wallet_id.is_none_or(|w| entry.wallet_id == w)
    }
}

/// Categories selectable under `type_filter`, in input order.
pub fn categories_for(type_filter: TypeFilter, categories: &[Category]) -> Vec<&Category> {
    categories
        .iter()
        .filter(|c| type_filter.admits_category(c.r#type))
        .collect()
}

/// Filtered entries grouped by calendar day, newest day first.
pub fn group_by_day<'a>(
    filters: &EntryFilters,
    entries: &'a [Entry],
) -> Vec<(NaiveDate, Vec<&'a Entry>)> {
    let mut days: BTreeMap<NaiveDate, Vec<&'a Entry>> = BTreeMap::new();
    for e in entries.iter().filter(|e| filters.matches(e)) {
        days.entry(e.date.date()).or_default().push(e);
    }
    days.into_iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn month_periods_cover_leap_february() {
        let g = TimeGrouping::Monthly;
        let start = g.period_start(d(2024, 2, 17));
        assert_eq!(start, d(2024, 2, 1));
        assert_eq!(g.period_end(start), d(2024, 2, 29));
        assert_eq!(g.next_start(start), Some(d(2024, 3, 1)));
    }

    #[test]
    fn labels_follow_grouping() {
        assert_eq!(TimeGrouping::Daily.label(d(2024, 1, 5)), "Jan 5");
        assert_eq!(TimeGrouping::Monthly.label(d(2024, 1, 1)), "Jan 2024");
        assert_eq!(TimeGrouping::Yearly.label(d(2024, 1, 1)), "2024");
    }

    #[test]
    fn type_filter_parses_all_sentinel() {
        assert_eq!("ALL".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "expense".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only(EntryType::Expense)
        );
        assert!("nope".parse::<TypeFilter>().is_err());
    }
}
