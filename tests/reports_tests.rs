// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::commands::{categories, reports, settings, transactions};
use pennywise::error::BudgetError;
use pennywise::models::{NewCategory, NewTransaction, SettingsPatch, TxType};
use pennywise::{db, utils::ensure_user};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn category(conn: &Connection, name: &str, kind: TxType) -> i64 {
    categories::create(
        conn,
        &NewCategory {
            name: name.into(),
            r#type: kind,
            icon: String::new(),
            color: "#808080".into(),
        },
    )
    .unwrap()
    .id
}

fn add(conn: &Connection, user: i64, cat: i64, kind: TxType, amount: i64, ccy: &str, date: NaiveDate) {
    transactions::create(
        conn,
        user,
        &NewTransaction {
            r#type: kind,
            amount: Decimal::new(amount, 0),
            currency: ccy.into(),
            category_id: cat,
            description: String::new(),
            date,
            tags: vec![],
        },
    )
    .unwrap();
}

fn setup() -> (Connection, i64) {
    let conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "alice").unwrap();
    let salary = category(&conn, "Salary", TxType::Income);
    let rent = category(&conn, "Rent", TxType::Expense);
    let food = category(&conn, "Food", TxType::Expense);
    add(&conn, user, salary, TxType::Income, 3000, "USD", d(2025, 1, 1));
    add(&conn, user, rent, TxType::Expense, 1000, "USD", d(2025, 1, 2));
    add(&conn, user, food, TxType::Expense, 184, "EUR", d(2025, 1, 15));
    add(&conn, user, salary, TxType::Income, 3000, "USD", d(2025, 3, 1));
    add(&conn, user, food, TxType::Expense, 50, "USD", d(2025, 3, 31));
    (conn, user)
}

#[test]
fn summary_converts_into_default_currency() {
    let (conn, user) = setup();
    let s = reports::summary(&conn, user, d(2025, 1, 1), d(2025, 1, 31)).unwrap();
    assert_eq!(s.currency, "USD");
    assert_eq!(s.income, Decimal::new(3000, 0));
    // 184 EUR at 0.92 per USD is 200 USD
    assert_eq!(s.expense, Decimal::new(1200, 0));
    assert_eq!(s.net, Decimal::new(1800, 0));
    assert_eq!(s.count, 3);

    let patch = SettingsPatch {
        default_currency: Some("EUR".into()),
        ..SettingsPatch::default()
    };
    settings::update(&conn, user, &patch).unwrap();
    let s = reports::summary(&conn, user, d(2025, 1, 1), d(2025, 1, 31)).unwrap();
    assert_eq!(s.currency, "EUR");
    assert_eq!(s.income, Decimal::new(2760, 0));
}

#[test]
fn by_category_orders_largest_first_with_shares() {
    let (conn, user) = setup();
    let data = reports::by_category(&conn, user, d(2025, 1, 1), d(2025, 3, 31)).unwrap();
    let view: Vec<_> = data
        .iter()
        .map(|c| (c.category.as_str(), c.amount, c.share))
        .collect();
    assert_eq!(
        view,
        vec![
            ("Rent", Decimal::new(1000, 0), 80),
            ("Food", Decimal::new(250, 0), 20),
        ]
    );
}

#[test]
fn cashflow_includes_empty_months() {
    let (conn, user) = setup();
    let flows = reports::cashflow(&conn, user, 3, d(2025, 3, 15)).unwrap();
    let months: Vec<_> = flows.iter().map(|f| f.month.as_str()).collect();
    assert_eq!(months, vec!["2025-01", "2025-02", "2025-03"]);
    assert_eq!(flows[0].net, Decimal::new(1800, 0));
    assert_eq!(flows[1].income, Decimal::ZERO);
    assert_eq!(flows[1].expense, Decimal::ZERO);
    // the Mar 31 row is after as_of but inside the month
    assert_eq!(flows[2].expense, Decimal::new(50, 0));
    assert!(reports::cashflow(&conn, user, 0, d(2025, 3, 15)).is_err());
}

#[test]
fn totals_beyond_the_decimal_range_are_errors() {
    let conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "alice").unwrap();
    let food = category(&conn, "Food", TxType::Expense);
    for day in [1, 2] {
        transactions::create(
            &conn,
            user,
            &NewTransaction {
                r#type: TxType::Expense,
                amount: Decimal::MAX,
                currency: "USD".into(),
                category_id: food,
                description: String::new(),
                date: d(2025, 1, day),
                tags: vec![],
            },
        )
        .unwrap();
    }
    assert!(matches!(
        reports::summary(&conn, user, d(2025, 1, 1), d(2025, 1, 31)),
        Err(BudgetError::Validation(_))
    ));
    assert!(matches!(
        reports::by_category(&conn, user, d(2025, 1, 1), d(2025, 1, 31)),
        Err(BudgetError::Validation(_))
    ));
    assert!(matches!(
        reports::cashflow(&conn, user, 1, d(2025, 1, 15)),
        Err(BudgetError::Validation(_))
    ));
}
