// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::engine::balance::scoped_delta;
use crate::engine::filters::{ChartFilters, ChartMetric};
use crate::engine::fx::{checked_add, convert, RateTable};
use crate::error::EngineError;
use crate::models::{CategoryType, Entry, EntryType, Snapshot, WalletId};

/// Only the newest points are kept.
pub const SERIES_POINT_LIMIT: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    pub period_start: NaiveDate,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub income: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense: Option<Decimal>,
    /// Cumulative balance at the end of the period.
    pub balance: Decimal,
    pub currency: String,
}

fn date_span(entries: &[Entry]) -> Option<(NaiveDate, NaiveDate)> {
    let first = entries.iter().map(|e| e.date.date()).min()?;
    let last = entries.iter().map(|e| e.date.date()).max()?;
    Some((first, last))
}

/// Dense income/expense/balance series from the first to the last entry.
///
/// The span is taken over every entry before any filter applies, and every
/// period inside it yields a point even when nothing matched.
pub fn build_series(
    snapshot: &Snapshot,
    rates: &RateTable,
    target: &str,
    filters: &ChartFilters,
) -> Result<Vec<SeriesPoint>, EngineError> {
    let Some((first, last)) = date_span(&snapshot.entries) else {
        return Ok(Vec::new());
    };
    let grouping = filters.grouping;

    let scope: HashSet<WalletId> = snapshot
        .wallets
        .iter()
        .filter(|w| filters.wallet_id.is_none_or(|id| id == w.id))
        .map(|w| w.id)
        .collect();

    let mut flows: BTreeMap<NaiveDate, (Decimal, Decimal)> = BTreeMap::new();
    let mut deltas: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for entry in &snapshot.entries {
        let key = grouping.period_start(entry.date.date());
        if filters.counts_as_flow(entry) {
            let amount = convert(entry.amount, &entry.currency, target, rates)?;
            let slot = flows.entry(key).or_default();
            match entry.r#type {
                EntryType::Income => slot.0 = checked_add(slot.0, amount, target)?,
                EntryType::Expense => slot.1 = checked_add(slot.1, amount, target)?,
                _ => {}
            }
        }
        let delta = scoped_delta(entry, |id| scope.contains(&id), rates, target)?;
        if !delta.is_zero() {
            let slot = deltas.entry(key).or_default();
            *slot = checked_add(*slot, delta, target)?;
        }
    }

    let category_type = filters
        .category_id
        .and_then(|id| snapshot.category(id))
        .map(|c| c.r#type);

    let end = grouping.period_start(last);
    let mut cursor = Some(grouping.period_start(first));
    let mut running = Decimal::ZERO;
    let mut points = Vec::new();
    while let Some(start) = cursor.filter(|s| *s <= end) {
        let delta = deltas.get(&start).copied().unwrap_or_default();
        running = checked_add(running, delta, target)?;
        let (income, expense) = flows.get(&start).copied().unwrap_or_default();
        let (income, expense) = shape_flows(income, expense, filters.metric, category_type);
        points.push(SeriesPoint {
            period_start: start,
            label: grouping.label(start),
            income,
            expense,
            balance: running,
            currency: target.to_string(),
        });
        cursor = grouping.next_start(start);
    }

    if points.len() > SERIES_POINT_LIMIT {
        points.drain(..points.len() - SERIES_POINT_LIMIT);
    }
    tracing::debug!(
        points = points.len(),
        grouping = ?grouping,
        "built series"
    );
    Ok(points)
}

/// Zero or drop the sides the metric and category do not plot.
fn shape_flows(
    income: Decimal,
    expense: Decimal,
    metric: Option<ChartMetric>,
    category_type: Option<CategoryType>,
) -> (Option<Decimal>, Option<Decimal>) {
    let (mut income, mut expense) = match metric {
        Some(ChartMetric::Balance) => return (None, None),
        Some(ChartMetric::Income) => (income, Decimal::ZERO),
        Some(ChartMetric::Expense) => (Decimal::ZERO, expense),
        None => (income, expense),
    };
    match category_type {
        Some(CategoryType::Income) => expense = Decimal::ZERO,
        Some(CategoryType::Expense) => income = Decimal::ZERO,
        None => {}
    }
    (Some(income), Some(expense))
}
