// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use fintrack::models::{CategoryType, NewEntry};
use fintrack::{cli, commands::exporter, db, store};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;

fn base_conn() -> Connection {
    let conn = db::open_in_memory().unwrap();
    let cash = store::create_wallet(&conn, "Cash").unwrap();
    let bank = store::create_wallet(&conn, "Bank").unwrap();
    let food = store::create_category(&conn, "Groceries", CategoryType::Expense).unwrap();
    let day = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();
    store::create_entry(
        &conn,
        &NewEntry::expense(
            cash,
            food,
            Decimal::new(1234, 2),
            "USD",
            day.and_hms_opt(8, 15, 0).unwrap(),
        )
        .with_description("Weekly run"),
    )
    .unwrap();
    store::create_entry(
        &conn,
        &NewEntry::transfer(bank, cash, Decimal::from(5), "USD", day.and_hms_opt(7, 0, 0).unwrap())
            .with_received(Decimal::from(550), "BDT"),
    )
    .unwrap();
    conn
}

fn export(conn: &Connection, format: &str, out: &str) -> anyhow::Result<()> {
    let matches = cli::build_cli().get_matches_from([
        "fintrack", "export", "entries", "--format", format, "--out", out,
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_entries_as_pretty_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&conn, "json", &out_path.to_string_lossy()).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    assert_eq!(
        parsed,
        json!([
            {
                "id": 2,
                "date": "2025-01-02T07:00:00",
                "type": "transfer",
                "wallet": "Bank",
                "to_wallet": "Cash",
                "amount": "5",
                "currency": "USD",
                "received_amount": "550",
                "received_currency": "BDT",
                "category": null,
                "description": null
            },
            {
                "id": 1,
                "date": "2025-01-02T08:15:00",
                "type": "expense",
                "wallet": "Cash",
                "to_wallet": null,
                "amount": "12.34",
                "currency": "USD",
                "received_amount": null,
                "received_currency": null,
                "category": "Groceries",
                "description": "Weekly run"
            }
        ])
    );
}

#[test]
fn export_entries_as_csv() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    export(&conn, "csv", &out_path.to_string_lossy()).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(headers.len(), 11);
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 2);
    assert_eq!(&records[1][1], "2025-01-02T08:15:00");
    assert_eq!(&records[1][9], "Groceries");
    assert_eq!(&records[0][4], "Cash");
    assert_eq!(&records[0][8], "BDT");
}

#[test]
fn export_skips_deleted_entries() {
    let conn = base_conn();
    store::soft_delete_entry(&conn, 1).unwrap();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    export(&conn, "json", &out_path.to_string_lossy()).unwrap();

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_path).unwrap()).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 1);
}
