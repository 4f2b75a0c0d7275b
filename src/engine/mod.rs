// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-side reporting engine.
//!
//! Every function here is pure over a [`Snapshot`](crate::models::Snapshot)
//! and a [`RateTable`](fx::RateTable): nothing is cached and nothing is
//! written back to the ledger, so callers may re-run them on every filter
//! change.

pub mod fx;
pub mod balance;
pub mod filters;
pub mod series;
pub mod breakdown;
pub mod summary;

pub use balance::{total_balance, wallet_balance, wallet_balances, WalletBalance};
pub use breakdown::{breakdown, BreakdownPeriod, BreakdownRow};
pub use filters::{ChartFilters, ChartMetric, EntryFilters, TimeGrouping, TypeFilter};
pub use fx::{convert, RateSnapshot, RateTable, BASE_CURRENCY};
pub use series::{build_series, SeriesPoint, SERIES_POINT_LIMIT};
pub use summary::{summarize, FinancialSummary, MonthOverMonth};
