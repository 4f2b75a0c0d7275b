// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, NaiveDateTime};
use fintrack::db;
use fintrack::engine::{
    build_series, convert, summarize, total_balance, wallet_balance, wallet_balances,
    ChartFilters, RateTable,
};
use fintrack::models::{CategoryType, NewEntry};
use fintrack::{store, EngineError};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, 0, 0).unwrap()
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

fn two_wallets() -> (Connection, i64, i64) {
    let conn = db::open_in_memory().unwrap();
    let w1 = store::create_wallet(&conn, "W1").unwrap();
    let w2 = store::create_wallet(&conn, "W2").unwrap();
    (conn, w1, w2)
}

#[test]
fn income_counts_toward_its_wallet() {
    let (conn, w1, _) = two_wallets();
    let salary = store::create_category(&conn, "Salary", CategoryType::Income).unwrap();
    store::create_entry(
        &conn,
        &NewEntry::income(w1, salary, dec(100), "USD", at(2024, 1, 5, 9)),
    )
    .unwrap();
    let snap = store::snapshot(&conn).unwrap();
    let rates = RateTable::builtin();

    let usd = wallet_balance(w1, Some(date(2024, 1, 31)), &snap.entries, &rates, "USD").unwrap();
    assert_eq!(usd, dec(100));

    let bdt = wallet_balance(w1, Some(date(2024, 1, 31)), &snap.entries, &rates, "BDT").unwrap();
    assert_eq!(bdt, dec(11000));
}

#[test]
fn transfers_move_money_without_changing_the_total() {
    let (conn, w1, w2) = two_wallets();
    store::create_entry(
        &conn,
        &NewEntry::transfer(w1, w2, dec(50), "USD", at(2024, 2, 1, 10)),
    )
    .unwrap();
    let snap = store::snapshot(&conn).unwrap();
    let rates = RateTable::builtin();

    assert_eq!(wallet_balance(w1, None, &snap.entries, &rates, "USD").unwrap(), dec(-50));
    assert_eq!(wallet_balance(w2, None, &snap.entries, &rates, "USD").unwrap(), dec(50));
    assert_eq!(
        total_balance(&snap.wallets, None, &snap.entries, &rates, "USD").unwrap(),
        Decimal::ZERO
    );
}

#[test]
fn cross_currency_transfer_credits_the_received_amount() {
    let (conn, w1, w2) = two_wallets();
    store::create_entry(&conn, &NewEntry::topup(w1, dec(20), "USD", at(2024, 2, 1, 8))).unwrap();
    store::create_entry(
        &conn,
        &NewEntry::transfer(w1, w2, dec(10), "USD", at(2024, 2, 2, 8))
            .with_received(dec(1100), "BDT"),
    )
    .unwrap();
    let snap = store::snapshot(&conn).unwrap();
    let rates = RateTable::builtin();

    assert_eq!(wallet_balance(w1, None, &snap.entries, &rates, "USD").unwrap(), dec(10));
    assert_eq!(wallet_balance(w2, None, &snap.entries, &rates, "BDT").unwrap(), dec(1100));
    assert_eq!(
        total_balance(&snap.wallets, None, &snap.entries, &rates, "USD").unwrap(),
        dec(20)
    );
}

#[test]
fn total_is_the_sum_of_wallet_balances() {
    let (conn, w1, w2) = two_wallets();
    let food = store::create_category(&conn, "Food", CategoryType::Expense).unwrap();
    store::create_entry(&conn, &NewEntry::topup(w1, dec(300), "USD", at(2024, 3, 1, 8))).unwrap();
    store::create_entry(&conn, &NewEntry::topup(w2, dec(2200), "BDT", at(2024, 3, 1, 8))).unwrap();
    store::create_entry(
        &conn,
        &NewEntry::expense(w2, food, dec(550), "BDT", at(2024, 3, 2, 8)),
    )
    .unwrap();
    store::create_entry(
        &conn,
        &NewEntry::transfer(w1, w2, dec(5), "USD", at(2024, 3, 3, 8)),
    )
    .unwrap();
    let snap = store::snapshot(&conn).unwrap();
    let rates = RateTable::builtin();

    let per_wallet = wallet_balances(&snap, None, &rates, "USD").unwrap();
    let sum: Decimal = per_wallet.iter().map(|b| b.balance).sum();
    let total = total_balance(&snap.wallets, None, &snap.entries, &rates, "USD").unwrap();
    assert_eq!(sum, total);
    assert_eq!(total, dec(315));
}

#[test]
fn as_of_includes_the_whole_day() {
    let (conn, w1, _) = two_wallets();
    store::create_entry(&conn, &NewEntry::topup(w1, dec(10), "USD", at(2024, 4, 30, 23))).unwrap();
    store::create_entry(&conn, &NewEntry::topup(w1, dec(5), "USD", at(2024, 5, 1, 0))).unwrap();
    let snap = store::snapshot(&conn).unwrap();
    let rates = RateTable::builtin();

    let april = wallet_balance(w1, Some(date(2024, 4, 30)), &snap.entries, &rates, "USD").unwrap();
    assert_eq!(april, dec(10));
    let before = wallet_balance(w1, Some(date(2024, 4, 29)), &snap.entries, &rates, "USD").unwrap();
    assert_eq!(before, Decimal::ZERO);
    let all = wallet_balance(w1, None, &snap.entries, &rates, "USD").unwrap();
    assert_eq!(all, dec(15));
}

#[test]
fn unknown_currency_is_an_error_not_a_zero() {
    let (conn, w1, _) = two_wallets();
    store::create_entry(&conn, &NewEntry::topup(w1, dec(10), "EUR", at(2024, 1, 1, 8))).unwrap();
    let snap = store::snapshot(&conn).unwrap();
    let err = wallet_balance(w1, None, &snap.entries, &RateTable::builtin(), "USD").unwrap_err();
    assert_eq!(err, EngineError::UnknownCurrency("EUR".into()));
}

#[test]
fn conversion_round_trips_within_rounding() {
    let rates =
        RateTable::from_rates([("BDT", Decimal::new(1173, 1)), ("EUR", Decimal::new(92, 2))])
            .unwrap();
    let amount = Decimal::new(12345, 2);
    assert_eq!(convert(amount, "BDT", "BDT", &rates).unwrap(), amount);

    let there = convert(amount, "EUR", "BDT", &rates).unwrap();
    let back = convert(there, "BDT", "EUR", &rates).unwrap();
    assert!((back - amount).abs() < Decimal::new(1, 6));

    assert!(matches!(
        convert(amount, "JPY", "USD", &rates),
        Err(EngineError::UnknownCurrency(c)) if c == "JPY"
    ));
}

#[test]
fn totals_beyond_decimal_range_are_errors_not_panics() {
    let (conn, w1, w2) = two_wallets();
    let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
    store::create_entry(&conn, &NewEntry::topup(w1, huge, "USD", at(2024, 1, 1, 8))).unwrap();
    store::create_entry(&conn, &NewEntry::topup(w1, huge, "USD", at(2024, 1, 2, 8))).unwrap();
    store::create_entry(&conn, &NewEntry::topup(w2, dec(1), "USD", at(2024, 1, 2, 8))).unwrap();
    let snap = store::snapshot(&conn).unwrap();
    let rates = RateTable::builtin();
    let overflow = EngineError::TotalOverflow {
        currency: "USD".into(),
    };

    assert_eq!(wallet_balance(w1, None, &snap.entries, &rates, "USD").unwrap_err(), overflow);
    assert_eq!(
        total_balance(&snap.wallets, None, &snap.entries, &rates, "USD").unwrap_err(),
        overflow
    );
    assert_eq!(
        build_series(&snap, &rates, "USD", &ChartFilters::default()).unwrap_err(),
        overflow
    );
    let today = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
    assert_eq!(summarize(&snap, &rates, "USD", today).unwrap_err(), overflow);

    // A single large amount still fits.
    let first_day = Some(date(2024, 1, 1));
    assert_eq!(wallet_balance(w1, first_day, &snap.entries, &rates, "USD").unwrap(), huge);
}
