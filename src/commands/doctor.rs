// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{convert, RateTable};
use crate::models::{DanglingReference, EntryType, Snapshot};
use crate::settings::{rate_snapshot, Settings};
use crate::store;
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use std::collections::BTreeSet;

/// Findings as `(issue, detail)` pairs; empty when the ledger is clean.
pub fn diagnose(snapshot: &Snapshot, rates: &RateTable) -> Vec<(String, String)> {
    let mut rows = Vec::new();
    // one cent
    let spread_tolerance = Decimal::new(1, 2);

    for d in snapshot.dangling_references() {
        let detail = match d {
            DanglingReference::Wallet { entry, wallet } => {
                format!("entry #{} -> wallet {}", entry, wallet)
            }
            DanglingReference::DestinationWallet { entry, wallet } => {
                format!("entry #{} -> destination wallet {}", entry, wallet)
            }
            DanglingReference::Category { entry, category } => {
                format!("entry #{} -> category {}", entry, category)
            }
        };
        rows.push(("dangling_reference".to_string(), detail));
    }

    let mut unknown = BTreeSet::new();
    for e in &snapshot.entries {
        for code in [Some(e.currency.as_str()), e.received_currency.as_deref()]
            .into_iter()
            .flatten()
        {
            if !rates.contains(code) {
                unknown.insert(code.to_string());
            }
        }
    }
    for code in unknown {
        rows.push(("missing_rate".to_string(), code));
    }

    for e in snapshot
        .entries
        .iter()
        .filter(|e| e.r#type == EntryType::Transfer && e.received_amount.is_some())
    {
        let Ok(expected) = convert(e.amount, &e.currency, e.received_currency(), rates) else {
            continue;
        };
        if (expected - e.received_amount()).abs() > spread_tolerance {
            rows.push((
                "transfer_spread".to_string(),
                format!(
                    "entry #{}: sent {} {}, received {} {} (rate gives {:.2})",
                    e.id,
                    e.amount,
                    e.currency,
                    e.received_amount(),
                    e.received_currency(),
                    expected
                ),
            ));
        }
    }
    rows
}

pub fn handle(conn: &Connection) -> Result<()> {
    let settings = Settings::load(conn)?;
    let rates = rate_snapshot(conn, &settings)?.rates;
    let snapshot = store::snapshot(conn)?;
    let rows: Vec<Vec<String>> = diagnose(&snapshot, &rates)
        .into_iter()
        .map(|(issue, detail)| vec![issue, detail])
        .collect();

    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
