// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::reports::display_rates;
use crate::engine::wallet_balances;
use crate::store;
use crate::utils::{fmt_money, id_for_wallet, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let id = store::create_wallet(conn, name)?;
            println!("Added wallet '{}' (id {})", name.trim(), id);
        }
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rename", sub)) => {
            let id = id_for_wallet(conn, sub.get_one::<String>("wallet").unwrap())?;
            let name = sub.get_one::<String>("name").unwrap();
            store::rename_wallet(conn, id, name)?;
            println!("Renamed wallet {} to '{}'", id, name.trim());
        }
        Some(("rm", sub)) => {
            let key = sub.get_one::<String>("wallet").unwrap();
            let id = id_for_wallet(conn, key)?;
            let removed = store::soft_delete_wallet(conn, id)?;
            println!("Removed wallet '{}' and {} of its entries", key, removed);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let as_of = sub
        .get_one::<String>("as-of")
        .map(|s| parse_date(s))
        .transpose()?;
    let (ccy, rates) = display_rates(conn, sub)?;
    let snapshot = store::snapshot(conn)?;
    let balances = wallet_balances(&snapshot, as_of, &rates, &ccy)?;
    if !maybe_print_json(json_flag, jsonl_flag, &balances)? {
        let rows = balances
            .iter()
            .map(|b| vec![b.wallet_id.to_string(), b.name.clone(), fmt_money(&b.balance, &ccy)])
            .collect();
        println!("{}", pretty_table(&["Id", "Wallet", "Balance"], rows));
    }
    Ok(())
}
