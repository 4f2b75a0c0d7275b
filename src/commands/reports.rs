// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::engine::{
    breakdown, build_series, summarize, total_balance, wallet_balances, BreakdownPeriod,
    ChartFilters, ChartMetric, RateTable, TimeGrouping,
};
use crate::models::CategoryType;
use crate::settings::{rate_snapshot, Settings};
use crate::store;
use crate::utils::{
    fmt_money, fmt_pct, id_for_category, id_for_wallet, maybe_print_json, parse_currency,
    parse_date, pretty_table,
};
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balances", sub)) => balances(conn, sub)?,
        Some(("series", sub)) => series(conn, sub)?,
        Some(("breakdown", sub)) => category_breakdown(conn, sub)?,
        Some(("summary", sub)) => summary(conn, sub)?,
        _ => {}
    }
    Ok(())
}

/// Display currency (`--currency` or the selected one) and the rate table
/// used for the whole report.
pub fn display_rates(conn: &Connection, sub: &clap::ArgMatches) -> Result<(String, RateTable)> {
    let settings = Settings::load(conn)?;
    let ccy = match sub.get_one::<String>("currency") {
        Some(c) => parse_currency(c)?,
        None => settings.selected_currency.clone(),
    };
    let snapshot = rate_snapshot(conn, &settings)?;
    Ok((ccy, snapshot.rates))
}

fn balances(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let as_of = sub
        .get_one::<String>("as-of")
        .map(|s| parse_date(s))
        .transpose()?;
    let (ccy, rates) = display_rates(conn, sub)?;
    let snapshot = store::snapshot(conn)?;
    let per_wallet = wallet_balances(&snapshot, as_of, &rates, &ccy)?;
    let total = total_balance(&snapshot.wallets, as_of, &snapshot.entries, &rates, &ccy)?;

    let payload = json!({ "currency": ccy, "wallets": per_wallet, "total": total });
    if !maybe_print_json(json_flag, jsonl_flag, &payload)? {
        let mut data: Vec<Vec<String>> = per_wallet
            .iter()
            .map(|b| vec![b.name.clone(), fmt_money(&b.balance, &ccy)])
            .collect();
        data.push(vec!["Total".into(), fmt_money(&total, &ccy)]);
        println!("{}", pretty_table(&["Wallet", "Balance"], data));
    }
    Ok(())
}

fn series(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let grouping = sub.get_one::<String>("group").unwrap().parse::<TimeGrouping>()?;
    let metric = sub
        .get_one::<String>("metric")
        .map(|s| s.parse::<ChartMetric>())
        .transpose()?;
    let mut filters = ChartFilters::default()
        .with_grouping(grouping)
        .with_metric(metric);
    if let Some(c) = sub.get_one::<String>("category") {
        let category = store::get_category(conn, id_for_category(conn, c)?)?;
        filters = filters.with_category(Some(&category))?;
    }
    if let Some(w) = sub.get_one::<String>("wallet") {
        filters = filters.with_wallet(Some(id_for_wallet(conn, w)?));
    }

    let (ccy, rates) = display_rates(conn, sub)?;
    let snapshot = store::snapshot(conn)?;
    let points = build_series(&snapshot, &rates, &ccy, &filters)?;
    if !maybe_print_json(json_flag, jsonl_flag, &points)? {
        if points.is_empty() {
            println!("No data available to display");
            return Ok(());
        }
        let opt = |d: &Option<rust_decimal::Decimal>| {
            d.map(|v| fmt_money(&v, &ccy)).unwrap_or_default()
        };
        let data = points
            .iter()
            .map(|p| {
                vec![
                    p.label.clone(),
                    opt(&p.income),
                    opt(&p.expense),
                    fmt_money(&p.balance, &ccy),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["Period", "Income", "Expense", "Balance"], data)
        );
    }
    Ok(())
}

fn category_breakdown(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let kind = sub.get_one::<String>("type").unwrap().parse::<CategoryType>()?;
    let period = sub.get_one::<String>("period").unwrap().parse::<BreakdownPeriod>()?;
    let (ccy, rates) = display_rates(conn, sub)?;
    let snapshot = store::snapshot(conn)?;
    let rows = breakdown(&snapshot, &rates, &ccy, kind, period)?;
    if !maybe_print_json(json_flag, jsonl_flag, &rows)? {
        let data = rows
            .iter()
            .map(|r| {
                vec![
                    r.category.clone(),
                    fmt_money(&r.amount, &ccy),
                    fmt_pct(&r.percentage),
                ]
            })
            .collect();
        let hdr = format!("{} ({})", kind, period);
        println!("{}", pretty_table(&["Category", &hdr, "Share"], data));
    }
    Ok(())
}

fn summary(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let today = match sub.get_one::<String>("today") {
        Some(s) => parse_date(s)?,
        None => chrono::Local::now().date_naive(),
    };
    let (ccy, rates) = display_rates(conn, sub)?;
    let snapshot = store::snapshot(conn)?;
    let s = summarize(&snapshot, &rates, &ccy, today)?;
    if !maybe_print_json(json_flag, jsonl_flag, &s)? {
        let trend = |m: &crate::engine::MonthOverMonth| {
            if m.change.is_zero() {
                "No change from last month".to_string()
            } else {
                format!(
                    "{} ({}) {} from last month",
                    fmt_money(&m.change.abs(), &ccy),
                    fmt_pct(&m.change_pct.abs()),
                    if m.change.is_sign_positive() { "increase" } else { "decrease" }
                )
            }
        };
        let data = vec![
            vec!["Total balance".into(), fmt_money(&s.total_balance, &ccy), String::new()],
            vec![
                "This month's income".into(),
                fmt_money(&s.income.current, &ccy),
                trend(&s.income),
            ],
            vec![
                "This month's expenses".into(),
                fmt_money(&s.expense.current, &ccy),
                trend(&s.expense),
            ],
            vec!["This month's net income".into(), fmt_money(&s.net.current, &ccy), trend(&s.net)],
            vec![
                "Monthly avg. income".into(),
                fmt_money(&s.avg_monthly_income, &ccy),
                format!("Based on {} month(s)", s.income_months),
            ],
            vec![
                "Monthly avg. expense".into(),
                fmt_money(&s.avg_monthly_expense, &ccy),
                format!("Based on {} month(s)", s.expense_months),
            ],
        ];
        println!("{}", pretty_table(&["Metric", "Value", "Trend"], data));
    }
    Ok(())
}
