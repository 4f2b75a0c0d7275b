// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::store::{self, DATETIME_FORMAT};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("entries", sub)) => export_entries(conn, sub),
        _ => Ok(()),
    }
}

fn export_entries(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap();

    let snapshot = store::snapshot(conn)?;
    let mut entries: Vec<_> = snapshot.entries.iter().collect();
    entries.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
    let wallet = |id| snapshot.wallet(id).map(|w| w.name.clone());

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "date",
                "type",
                "wallet",
                "to_wallet",
                "amount",
                "currency",
                "received_amount",
                "received_currency",
                "category",
                "description",
            ])?;
            for e in &entries {
                wtr.write_record([
                    e.id.to_string(),
                    e.date.format(DATETIME_FORMAT).to_string(),
                    e.r#type.to_string(),
                    wallet(e.wallet_id).unwrap_or_default(),
                    e.to_wallet_id.and_then(wallet).unwrap_or_default(),
                    e.amount.to_string(),
                    e.currency.clone(),
                    e.received_amount.map(|d| d.to_string()).unwrap_or_default(),
                    e.received_currency.clone().unwrap_or_default(),
                    snapshot.category_name(e.category_id).unwrap_or_default().to_string(),
                    e.description.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id,
                        "date": e.date.format(DATETIME_FORMAT).to_string(),
                        "type": e.r#type,
                        "wallet": wallet(e.wallet_id),
                        "to_wallet": e.to_wallet_id.and_then(wallet),
                        "amount": e.amount.to_string(),
                        "currency": e.currency,
                        "received_amount": e.received_amount.map(|d| d.to_string()),
                        "received_currency": e.received_currency,
                        "category": snapshot.category_name(e.category_id),
                        "description": e.description,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        _ => anyhow::bail!("Unknown format: {} (use csv|json)", fmt),
    }
    println!("Exported {} entries to {}", entries.len(), out);
    Ok(())
}
