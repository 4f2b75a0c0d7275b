// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use fintrack::db;
use fintrack::engine::{
    breakdown, build_series, summarize, BreakdownPeriod, ChartFilters, ChartMetric, RateTable,
    TimeGrouping, SERIES_POINT_LIMIT,
};
use fintrack::models::{CategoryType, NewEntry};
use fintrack::{store, EngineError};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(9, 30, 0).unwrap()
}

fn dec(n: i64) -> Decimal {
    Decimal::from(n)
}

struct Fixture {
    conn: Connection,
    w1: i64,
    w2: i64,
    salary: i64,
    food: i64,
    transport: i64,
}

fn fixture() -> Fixture {
    let conn = db::open_in_memory().unwrap();
    Fixture {
        w1: store::create_wallet(&conn, "Main").unwrap(),
        w2: store::create_wallet(&conn, "Savings").unwrap(),
        salary: store::create_category(&conn, "Salary", CategoryType::Income).unwrap(),
        food: store::create_category(&conn, "Food", CategoryType::Expense).unwrap(),
        transport: store::create_category(&conn, "Transport", CategoryType::Expense).unwrap(),
        conn,
    }
}

impl Fixture {
    fn add(&self, e: NewEntry) -> i64 {
        store::create_entry(&self.conn, &e).unwrap()
    }
}

#[test]
fn monthly_series_is_dense() {
    let f = fixture();
    f.add(NewEntry::income(f.w1, f.salary, dec(100), "USD", at(2024, 1, 15)));
    f.add(NewEntry::expense(f.w1, f.food, dec(30), "USD", at(2024, 3, 10)));
    let snap = store::snapshot(&f.conn).unwrap();

    let points =
        build_series(&snap, &RateTable::builtin(), "USD", &ChartFilters::default()).unwrap();
    let labels: Vec<_> = points.iter().map(|p| p.label.as_str()).collect();
    assert_eq!(labels, vec!["Jan 2024", "Feb 2024", "Mar 2024"]);

    assert_eq!(points[0].income, Some(dec(100)));
    assert_eq!(points[1].income, Some(Decimal::ZERO));
    assert_eq!(points[1].expense, Some(Decimal::ZERO));
    assert_eq!(points[1].balance, dec(100));
    assert_eq!(points[2].expense, Some(dec(30)));
    assert_eq!(points[2].balance, dec(70));
}

#[test]
fn series_keeps_only_the_newest_points() {
    let f = fixture();
    let start = at(2024, 1, 1);
    f.add(NewEntry::topup(f.w1, dec(1), "USD", start));
    f.add(NewEntry::topup(f.w1, dec(1), "USD", start + Duration::days(149)));
    let snap = store::snapshot(&f.conn).unwrap();

    let filters = ChartFilters::default().with_grouping(TimeGrouping::Daily);
    let points = build_series(&snap, &RateTable::builtin(), "USD", &filters).unwrap();
    assert_eq!(points.len(), SERIES_POINT_LIMIT);
    assert_eq!(points.last().unwrap().period_start, date(2024, 5, 29));
    assert_eq!(points.first().unwrap().period_start, date(2024, 2, 20));
    assert_eq!(points.first().unwrap().label, "Feb 20");
    assert_eq!(points.last().unwrap().balance, dec(2));
}

#[test]
fn yearly_series_in_display_currency() {
    let f = fixture();
    f.add(NewEntry::income(f.w1, f.salary, dec(10), "USD", at(2023, 6, 1)));
    f.add(NewEntry::expense(f.w1, f.food, dec(110), "BDT", at(2024, 6, 1)));
    let snap = store::snapshot(&f.conn).unwrap();

    let filters = ChartFilters::default().with_grouping(TimeGrouping::Yearly);
    let points = build_series(&snap, &RateTable::builtin(), "BDT", &filters).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].label, "2023");
    assert_eq!(points[0].income, Some(dec(1100)));
    assert_eq!(points[1].balance, dec(990));
    assert!(points.iter().all(|p| p.currency == "BDT"));
}

#[test]
fn metric_and_category_zero_the_other_side() {
    let f = fixture();
    f.add(NewEntry::income(f.w1, f.salary, dec(100), "USD", at(2024, 1, 15)));
    f.add(NewEntry::expense(f.w1, f.food, dec(30), "USD", at(2024, 1, 20)));
    f.add(NewEntry::expense(f.w1, f.transport, dec(5), "USD", at(2024, 1, 21)));
    let snap = store::snapshot(&f.conn).unwrap();
    let rates = RateTable::builtin();

    let income_only = ChartFilters::default().with_metric(Some(ChartMetric::Income));
    let p = &build_series(&snap, &rates, "USD", &income_only).unwrap()[0];
    assert_eq!((p.income, p.expense), (Some(dec(100)), Some(Decimal::ZERO)));

    let balance_only = ChartFilters::default().with_metric(Some(ChartMetric::Balance));
    let p = &build_series(&snap, &rates, "USD", &balance_only).unwrap()[0];
    assert_eq!((p.income, p.expense), (None, None));
    assert_eq!(p.balance, dec(65));

    let food = store::get_category(&f.conn, f.food).unwrap();
    let by_food = ChartFilters::default().with_category(Some(&food)).unwrap();
    let p = &build_series(&snap, &rates, "USD", &by_food).unwrap()[0];
    assert_eq!((p.income, p.expense), (Some(Decimal::ZERO), Some(dec(30))));
    // The balance line ignores the category.
    assert_eq!(p.balance, dec(65));

    assert!(balance_only.with_category(Some(&food)).is_err());
    assert!(income_only.with_category(Some(&food)).is_err());
}

#[test]
fn wallet_filter_follows_incoming_transfers() {
    let f = fixture();
    f.add(NewEntry::income(f.w1, f.salary, dec(100), "USD", at(2024, 1, 15)));
    f.add(NewEntry::transfer(f.w1, f.w2, dec(40), "USD", at(2024, 2, 1)));
    f.add(NewEntry::expense(f.w2, f.food, dec(15), "USD", at(2024, 2, 3)));
    let snap = store::snapshot(&f.conn).unwrap();

    let filters = ChartFilters::default().with_wallet(Some(f.w2));
    let points = build_series(&snap, &RateTable::builtin(), "USD", &filters).unwrap();
    assert_eq!(points.len(), 2);
    assert_eq!(points[0].income, Some(Decimal::ZERO));
    assert_eq!(points[0].balance, Decimal::ZERO);
    assert_eq!(points[1].expense, Some(dec(15)));
    assert_eq!(points[1].balance, dec(25));
}

#[test]
fn empty_ledger_has_no_series() {
    let f = fixture();
    let snap = store::snapshot(&f.conn).unwrap();
    let points =
        build_series(&snap, &RateTable::builtin(), "USD", &ChartFilters::default()).unwrap();
    assert!(points.is_empty());
}

#[test]
fn expense_breakdown_for_a_month() {
    let f = fixture();
    f.add(NewEntry::expense(f.w1, f.food, dec(30), "USD", at(2024, 3, 10)));
    f.add(NewEntry::expense(f.w1, f.food, dec(20), "USD", at(2024, 3, 15)));
    f.add(NewEntry::expense(f.w1, f.transport, dec(10), "USD", at(2024, 3, 20)));
    f.add(NewEntry::expense(f.w1, f.transport, dec(99), "USD", at(2024, 4, 1)));
    let snap = store::snapshot(&f.conn).unwrap();

    let period = "2024-03".parse::<BreakdownPeriod>().unwrap();
    let rows =
        breakdown(&snap, &RateTable::builtin(), "USD", CategoryType::Expense, period).unwrap();
    let view: Vec<_> = rows
        .iter()
        .map(|r| (r.category.as_str(), r.amount, r.percentage.round_dp(2)))
        .collect();
    assert_eq!(
        view,
        vec![
            ("Food", dec(50), Decimal::new(8333, 2)),
            ("Transport", dec(10), Decimal::new(1667, 2)),
        ]
    );
    let sum: Decimal = rows.iter().map(|r| r.percentage).sum();
    assert!((sum - Decimal::ONE_HUNDRED).abs() < Decimal::new(1, 6));
}

#[test]
fn breakdown_skips_detached_entries_and_keeps_tie_order() {
    let f = fixture();
    let rent = store::create_category(&f.conn, "Rent", CategoryType::Expense).unwrap();
    f.add(NewEntry::expense(f.w1, f.transport, dec(10), "USD", at(2024, 3, 1)));
    f.add(NewEntry::expense(f.w1, f.food, dec(10), "USD", at(2024, 3, 2)));
    f.add(NewEntry::expense(f.w1, rent, dec(500), "USD", at(2024, 3, 3)));
    store::soft_delete_category(&f.conn, rent).unwrap();
    let snap = store::snapshot(&f.conn).unwrap();

    let rows = breakdown(
        &snap,
        &RateTable::builtin(),
        "USD",
        CategoryType::Expense,
        BreakdownPeriod::All,
    )
    .unwrap();
    let names: Vec<_> = rows.iter().map(|r| r.category.as_str()).collect();
    assert_eq!(names, vec!["Transport", "Food"]);
    assert!(rows.iter().all(|r| r.percentage == dec(50)));

    let none = breakdown(
        &snap,
        &RateTable::builtin(),
        "USD",
        CategoryType::Income,
        BreakdownPeriod::All,
    )
    .unwrap();
    assert!(none.is_empty());
}

#[test]
fn summary_compares_with_last_month() {
    let f = fixture();
    f.add(NewEntry::income(f.w1, f.salary, dec(100), "USD", at(2024, 2, 5)));
    f.add(NewEntry::income(f.w1, f.salary, dec(150), "USD", at(2024, 3, 5)));
    f.add(NewEntry::expense(f.w1, f.food, dec(40), "USD", at(2024, 3, 6)));
    let snap = store::snapshot(&f.conn).unwrap();

    let s = summarize(&snap, &RateTable::builtin(), "USD", date(2024, 3, 31)).unwrap();
    assert_eq!(s.total_balance, dec(210));
    assert_eq!(s.income.current, dec(150));
    assert_eq!(s.income.change, dec(50));
    assert_eq!(s.income.change_pct, dec(50));
    assert_eq!(s.expense.change_pct, Decimal::ONE_HUNDRED);
    assert_eq!(s.net.current, dec(110));
    assert_eq!(s.net.previous, dec(100));
    assert_eq!(s.avg_monthly_income, dec(125));
    assert_eq!(s.income_months, 2);
    assert_eq!(s.avg_monthly_expense, dec(40));
}

#[test]
fn summary_projects_an_unfinished_month() {
    let f = fixture();
    f.add(NewEntry::income(f.w1, f.salary, dec(100), "USD", at(2024, 2, 5)));
    f.add(NewEntry::income(f.w1, f.salary, dec(150), "USD", at(2024, 3, 5)));
    f.add(NewEntry::income(f.w1, f.salary, dec(30), "USD", at(2024, 4, 2)));
    let snap = store::snapshot(&f.conn).unwrap();

    let s = summarize(&snap, &RateTable::builtin(), "USD", date(2024, 4, 15)).unwrap();
    assert_eq!(s.income.current, dec(30));
    assert_eq!(s.income_months, 3);
    assert_eq!(s.avg_monthly_income, dec(310) / dec(3));
    assert_eq!(s.expense.change_pct, Decimal::ZERO);
}

#[test]
fn unknown_currency_fails_every_report() {
    let f = fixture();
    f.add(NewEntry::income(f.w1, f.salary, dec(100), "USD", at(2024, 3, 1)));
    f.add(NewEntry::expense(f.w1, f.food, dec(7), "EUR", at(2024, 3, 2)));
    let snap = store::snapshot(&f.conn).unwrap();
    let rates = RateTable::builtin();
    let unknown = EngineError::UnknownCurrency("EUR".into());

    let series = build_series(&snap, &rates, "USD", &ChartFilters::default());
    assert_eq!(series.unwrap_err(), unknown);

    let rows = breakdown(&snap, &rates, "USD", CategoryType::Expense, BreakdownPeriod::All);
    assert_eq!(rows.unwrap_err(), unknown);

    let summary = summarize(&snap, &rates, "USD", date(2024, 3, 31));
    assert_eq!(summary.unwrap_err(), unknown);

    // Converting into an unknown display currency fails the same way.
    let series = build_series(&snap, &rates, "EUR", &ChartFilters::default());
    assert!(matches!(series, Err(EngineError::UnknownCurrency(_))));
}
