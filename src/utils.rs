// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use comfy_table::{presets::UTF8_FULL, Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{params, Connection};
use rust_decimal::Decimal;

use crate::models::{CategoryId, WalletId};

static CURRENCY_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3,4}$").unwrap());

pub fn is_currency_code(s: &str) -> bool {
    CURRENCY_CODE.is_match(s)
}

pub fn parse_currency(s: &str) -> Result<String> {
    let code = s.trim().to_uppercase();
    if !is_currency_code(&code) {
        anyhow::bail!("Invalid currency '{}', expected 3-4 letters", s);
    }
    Ok(code)
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM` or `YYYY-MM-DDTHH:MM:SS` (a space
/// works in place of `T`). A bare date means midnight.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Ok(dt);
        }
    }
    Ok(parse_date(s)
        .with_context(|| format!("Invalid date/time '{}'", s))?
        .and_time(chrono::NaiveTime::MIN))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

pub fn fmt_money(d: &Decimal, ccy: &str) -> String {
    format!("{:.2} {}", d.round_dp(2), ccy)
}

pub fn fmt_pct(d: &Decimal) -> String {
    format!("{:.2}%", d.round_dp(2))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

/// Looks up an active wallet by numeric id or by name.
pub fn id_for_wallet(conn: &Connection, key: &str) -> Result<WalletId> {
    let mut stmt = conn.prepare(
        "SELECT id FROM wallets WHERE deleted=0 AND (name=?1 OR CAST(id AS TEXT)=?1)
         ORDER BY (name=?1) DESC, id LIMIT 1",
    )?;
    let id: WalletId = stmt
        .query_row(params![key.trim()], |r| r.get(0))
        .with_context(|| format!("Wallet '{}' not found", key))?;
    Ok(id)
}

/// Looks up an active category by numeric id or by name.
pub fn id_for_category(conn: &Connection, key: &str) -> Result<CategoryId> {
    let mut stmt = conn.prepare(
        "SELECT id FROM categories WHERE deleted=0 AND (name=?1 OR CAST(id AS TEXT)=?1)
         ORDER BY (name=?1) DESC, id LIMIT 1",
    )?;
    let id: CategoryId = stmt
        .query_row(params![key.trim()], |r| r.get(0))
        .with_context(|| format!("Category '{}' not found", key))?;
    Ok(id)
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
