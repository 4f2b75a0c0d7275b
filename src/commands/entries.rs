// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::filters::{group_by_day, EntryFilters, TypeFilter};
use crate::models::{Entry, EntryType, NewEntry, Snapshot};
use crate::settings::Settings;
use crate::store::{self, DATETIME_FORMAT};
use crate::utils::{
    id_for_category, id_for_wallet, maybe_print_json, parse_currency, parse_datetime,
    parse_decimal, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            store::soft_delete_entry(conn, id)?;
            println!("Removed entry {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// Overlays the options given on the command line onto `e`.
///
/// Switching to a type that has no category (or is not a transfer) drops the
/// stale fields unless they were passed explicitly, in which case the store
/// rejects the combination.
pub fn apply_fields(
    conn: &Connection,
    sub: &clap::ArgMatches,
    mut e: NewEntry,
) -> Result<NewEntry> {
    let opt = |name: &str| sub.get_one::<String>(name);

    if let Some(t) = opt("type") {
        e.r#type = t.parse::<EntryType>()?;
    }
    if let Some(a) = opt("amount") {
        e.amount = parse_decimal(a)?;
    }
    if let Some(c) = opt("currency") {
        e.currency = parse_currency(c)?;
    }
    if let Some(w) = opt("wallet") {
        e.wallet_id = id_for_wallet(conn, w)?;
    }
    if let Some(c) = opt("category") {
        e.category_id = Some(id_for_category(conn, c)?);
    } else if e.r#type.category_type().is_none() {
        e.category_id = None;
    }
    if let Some(d) = opt("date") {
        e.date = parse_datetime(d)?;
    }
    if let Some(d) = opt("description") {
        let d = d.trim();
        e.description = (!d.is_empty()).then(|| d.to_string());
    }

    let is_transfer = e.r#type == EntryType::Transfer;
    match opt("to") {
        Some(w) => e.to_wallet_id = Some(id_for_wallet(conn, w)?),
        None if !is_transfer => e.to_wallet_id = None,
        None => {}
    }
    match opt("received-amount") {
        Some(a) => e.received_amount = Some(parse_decimal(a)?),
        None if !is_transfer => e.received_amount = None,
        None => {}
    }
    match opt("received-currency") {
        Some(c) => e.received_currency = Some(parse_currency(c)?),
        None if !is_transfer => e.received_currency = None,
        None => {}
    }
    Ok(e)
}

fn add(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let template = NewEntry {
        r#type: EntryType::Expense,
        amount: Decimal::ZERO,
        currency: settings.selected_currency,
        description: None,
        category_id: None,
        wallet_id: 0,
        date: chrono::Local::now().naive_local(),
        to_wallet_id: None,
        received_amount: None,
        received_currency: None,
    };
    let e = apply_fields(conn, sub, template)?;
    let id = store::create_entry(conn, &e)?;
    if e.r#type == EntryType::Transfer {
        println!(
            "Recorded transfer #{}: {} {} on {}",
            id,
            e.amount,
            e.currency,
            e.date.format(DATETIME_FORMAT)
        );
    } else {
        println!(
            "Recorded {} #{}: {} {} on {}",
            e.r#type,
            id,
            e.amount,
            e.currency,
            e.date.format(DATETIME_FORMAT)
        );
    }
    Ok(())
}

fn edit(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let current = store::get_entry(conn, id)?;
    let updated = apply_fields(conn, sub, NewEntry::from(current))?;
    store::update_entry(conn, id, &updated)?;
    println!("Updated entry {}", id);
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryRow {
    pub id: i64,
    pub date: String,
    pub r#type: String,
    pub wallet: String,
    pub to_wallet: String,
    pub amount: String,
    pub currency: String,
    pub category: String,
    pub description: String,
}

impl EntryRow {
    fn new(snapshot: &Snapshot, e: &Entry) -> Self {
        let wallet_name = |id| snapshot.wallet(id).map_or("Unknown", |w| w.name.as_str());
        let (amount, currency) = match e.r#type {
            EntryType::Transfer if e.received_currency() != e.currency => (
                format!("{} -> {}", e.amount, e.received_amount()),
                format!("{} -> {}", e.currency, e.received_currency()),
            ),
            _ => (e.amount.to_string(), e.currency.clone()),
        };
        Self {
            id: e.id,
            date: e.date.format(DATETIME_FORMAT).to_string(),
            r#type: e.r#type.to_string(),
            wallet: wallet_name(e.wallet_id).to_string(),
            to_wallet: e.to_wallet_id.map(wallet_name).unwrap_or_default().to_string(),
            amount,
            currency,
            category: snapshot.category_name(e.category_id).unwrap_or_default().to_string(),
            description: e.description.clone().unwrap_or_default(),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.clone(),
            self.r#type.clone(),
            self.wallet.clone(),
            self.to_wallet.clone(),
            self.amount.clone(),
            self.currency.clone(),
            self.category.clone(),
            self.description.clone(),
        ]
    }
}

const HEADERS: [&str; 9] = [
    "Id", "Date", "Type", "Wallet", "To", "Amount", "CCY", "Category", "Description",
];

pub fn filters_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<EntryFilters> {
    let type_filter = sub
        .get_one::<String>("type")
        .map(|s| s.parse::<TypeFilter>())
        .transpose()?
        .unwrap_or_default();
    let mut filters = EntryFilters::default().with_type(type_filter);
    if let Some(c) = sub.get_one::<String>("category") {
        let category = store::get_category(conn, id_for_category(conn, c)?)?;
        filters = filters.with_category(Some(&category))?;
    }
    if let Some(w) = sub.get_one::<String>("wallet") {
        filters = filters.with_wallet(Some(id_for_wallet(conn, w)?));
    }
    Ok(filters)
}

/// Filtered entries, newest first, truncated to `--limit`.
pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<EntryRow>> {
    let filters = filters_from_args(conn, sub)?;
    let snapshot = store::snapshot(conn)?;
    let mut matched = filters.apply(&snapshot.entries);
    matched.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
    if let Some(limit) = sub.get_one::<usize>("limit") {
        matched.truncate(*limit);
    }
    Ok(matched.into_iter().map(|e| EntryRow::new(&snapshot, e)).collect())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");

    if sub.get_flag("by-day") {
        let filters = filters_from_args(conn, sub)?;
        let snapshot = store::snapshot(conn)?;
        let days: Vec<(String, Vec<EntryRow>)> = group_by_day(&filters, &snapshot.entries)
            .into_iter()
            .map(|(day, entries)| {
                (
                    day.to_string(),
                    entries.iter().map(|e| EntryRow::new(&snapshot, e)).collect(),
                )
            })
            .collect();
        if !maybe_print_json(json_flag, jsonl_flag, &days)? {
            for (day, rows) in days {
                println!("{}", day);
                println!(
                    "{}",
                    pretty_table(&HEADERS, rows.iter().map(EntryRow::cells).collect())
                );
            }
        }
        return Ok(());
    }

    let data = query_rows(conn, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data.iter().map(EntryRow::cells).collect();
        println!("{}", pretty_table(&HEADERS, rows));
    }
    Ok(())
}
