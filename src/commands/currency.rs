// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{convert, BASE_CURRENCY};
use crate::settings::{normalize_currency_list, rate_snapshot, set_rate, Settings};
use crate::utils::{maybe_print_json, parse_currency, parse_date, parse_decimal, pretty_table};
use anyhow::Result;
use chrono::Local;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => list(conn, sub)?,
        Some(("select", sub)) => {
            let ccy = parse_currency(sub.get_one::<String>("code").unwrap())?;
            let mut settings = Settings::load(conn)?;
            let rates = rate_snapshot(conn, &settings)?.rates;
            if !rates.contains(&ccy) {
                anyhow::bail!(
                    "No rate known for {ccy}; add one with `currency rate set` or `custom-add`"
                );
            }
            if !settings.enabled_currencies.contains(&ccy) {
                settings.enabled_currencies.push(ccy.clone());
            }
            settings.selected_currency = ccy.clone();
            settings.save(conn)?;
            println!("Display currency set to {}", ccy);
        }
        Some(("enable", sub)) => {
            let raw: Vec<String> = sub
                .get_many::<String>("codes")
                .unwrap()
                .cloned()
                .collect();
            let codes = normalize_currency_list(&raw.join(","));
            if codes.is_empty() {
                anyhow::bail!("No valid currency codes given");
            }
            let mut settings = Settings::load(conn)?;
            if !codes.contains(&settings.selected_currency) {
                settings.selected_currency = codes[0].clone();
            }
            settings.enabled_currencies = codes;
            settings.save(conn)?;
            println!("Enabled currencies: {}", settings.enabled_currencies.join(", "));
        }
        Some(("custom-add", sub)) => {
            let code = parse_currency(sub.get_one::<String>("code").unwrap())?;
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            let mut settings = Settings::load(conn)?;
            settings.upsert_custom(&code, rate)?;
            settings.save(conn)?;
            println!("Custom currency {}: 1 {} = {} {}", code, BASE_CURRENCY, rate, code);
        }
        Some(("custom-rm", sub)) => {
            let code = parse_currency(sub.get_one::<String>("code").unwrap())?;
            let mut settings = Settings::load(conn)?;
            if settings.remove_custom(&code) {
                settings.save(conn)?;
                println!("Removed custom currency {}", code);
            } else {
                println!("No custom currency {}", code);
            }
        }
        Some(("rate", sub)) => match sub.subcommand() {
            Some(("set", s)) => {
                let code = parse_currency(s.get_one::<String>("code").unwrap())?;
                let rate = parse_decimal(s.get_one::<String>("rate").unwrap())?;
                let date = match s.get_one::<String>("date") {
                    Some(d) => parse_date(d)?,
                    None => Local::now().date_naive(),
                };
                set_rate(conn, date, &code, rate)?;
                println!("Rate on {}: 1 {} = {} {}", date, BASE_CURRENCY, rate, code);
            }
            Some(("list", _)) => list_rates(conn)?,
            _ => {}
        },
        Some(("convert", sub)) => {
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let from = parse_currency(sub.get_one::<String>("from").unwrap())?;
            let to = parse_currency(sub.get_one::<String>("to").unwrap())?;
            let settings = Settings::load(conn)?;
            let rates = rate_snapshot(conn, &settings)?.rates;
            let res = convert(amount, &from, &to, &rates)?;
            println!("{} {} -> {:.4} {}", amount, from, res, to);
        }
        _ => {}
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let settings = Settings::load(conn)?;
    let snapshot = rate_snapshot(conn, &settings)?;
    let payload = json!({
        "selected": settings.selected_currency,
        "enabled": settings.enabled_currencies,
        "custom": settings.custom_currencies,
        "rates": snapshot.rates,
        "base": snapshot.base_currency,
        "as_of": snapshot.as_of,
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &payload)? {
        let data = snapshot
            .rates
            .iter()
            .map(|(code, rate)| {
                let mut flags = Vec::new();
                if code == settings.selected_currency {
                    flags.push("selected");
                }
                if settings.enabled_currencies.iter().any(|c| c == code) {
                    flags.push("enabled");
                }
                if settings.custom_currencies.iter().any(|c| c.currency_name == code) {
                    flags.push("custom");
                }
                vec![code.to_string(), rate.to_string(), flags.join(", ")]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Currency", &format!("Per 1 {}", BASE_CURRENCY), "Flags"], data)
        );
    }
    Ok(())
}

fn list_rates(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare(
        "SELECT date, base, quote, rate FROM fx_rates ORDER BY date DESC, base, quote LIMIT 50",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, String>(0)?,
            r.get::<_, String>(1)?,
            r.get::<_, String>(2)?,
            r.get::<_, String>(3)?,
        ))
    })?;
    let mut data = Vec::new();
    for row in rows {
        let (d, b, q, r) = row?;
        data.push(vec![d, b, q, r]);
    }
    println!("{}", pretty_table(&["Date", "Base", "Quote", "Rate"], data));
    Ok(())
}
