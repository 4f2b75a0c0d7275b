// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::HashSet;

use crate::engine::fx::{checked_add, convert, RateTable};
use crate::error::EngineError;
use crate::models::{Entry, EntryType, Snapshot, Wallet, WalletId};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WalletBalance {
    pub wallet_id: WalletId,
    pub name: String,
    pub balance: Decimal,
    pub currency: String,
}

/// Signed effect of one entry on the wallets accepted by `in_scope`.
///
/// A transfer between two in-scope wallets yields both legs, so the result is
/// the net movement for the whole scope.
pub(crate) fn scoped_delta<F>(
    entry: &Entry,
    in_scope: F,
    rates: &RateTable,
    target: &str,
) -> Result<Decimal, EngineError>
where
    F: Fn(WalletId) -> bool,
{
    let mut delta = Decimal::ZERO;
    let source = in_scope(entry.wallet_id);
    match entry.r#type {
        EntryType::Income | EntryType::Topup if source => {
            delta = convert(entry.amount, &entry.currency, target, rates)?;
        }
        EntryType::Expense if source => {
            delta = -convert(entry.amount, &entry.currency, target, rates)?;
        }
        EntryType::Transfer => {
            if source {
                delta = -convert(entry.amount, &entry.currency, target, rates)?;
            }
            if entry.to_wallet_id.is_some_and(&in_scope) {
                let received = convert(
                    entry.received_amount(),
                    entry.received_currency(),
                    target,
                    rates,
                )?;
                delta = checked_add(delta, received, target)?;
            }
        }
        _ => {}
    }
    Ok(delta)
}

fn on_or_before(entry: &Entry, as_of: Option<NaiveDate>) -> bool {
    as_of.is_none_or(|d| entry.date.date() <= d)
}

/// Balance of one wallet in `target`, counting entries up to the end of `as_of`.
///
/// `as_of = None` replays the whole ledger.
pub fn wallet_balance(
    wallet_id: WalletId,
    as_of: Option<NaiveDate>,
    entries: &[Entry],
    rates: &RateTable,
    target: &str,
) -> Result<Decimal, EngineError> {
    let mut balance = Decimal::ZERO;
    for entry in entries.iter().filter(|e| on_or_before(e, as_of)) {
        let delta = scoped_delta(entry, |id| id == wallet_id, rates, target)?;
        balance = checked_add(balance, delta, target)?;
    }
    Ok(balance)
}

/// Sum of the independent balances of `wallets`.
///
/// Entries pointing at wallets outside the list contribute nothing.
pub fn total_balance(
    wallets: &[Wallet],
    as_of: Option<NaiveDate>,
    entries: &[Entry],
    rates: &RateTable,
    target: &str,
) -> Result<Decimal, EngineError> {
    let scope: HashSet<WalletId> = wallets.iter().map(|w| w.id).collect();
    let mut total = Decimal::ZERO;
    for entry in entries.iter().filter(|e| on_or_before(e, as_of)) {
        let delta = scoped_delta(entry, |id| scope.contains(&id), rates, target)?;
        total = checked_add(total, delta, target)?;
    }
    Ok(total)
}

pub fn wallet_balances(
    snapshot: &Snapshot,
    as_of: Option<NaiveDate>,
    rates: &RateTable,
    target: &str,
) -> Result<Vec<WalletBalance>, EngineError> {
    tracing::debug!(
        wallets = snapshot.wallets.len(),
        entries = snapshot.entries.len(),
        "computing wallet balances"
    );
    snapshot
        .wallets
        .iter()
        .map(|w| {
            Ok(WalletBalance {
                wallet_id: w.id,
                name: w.name.clone(),
                balance: wallet_balance(w.id, as_of, &snapshot.entries, rates, target)?,
                currency: target.to_string(),
            })
        })
        .collect()
}
