// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::commands::{categories, transactions};
use pennywise::commands::transactions::TxFilter;
use pennywise::error::BudgetError;
use pennywise::models::{NewCategory, NewTransaction, TransactionPatch, TxType};
use pennywise::paging::PageRequest;
use pennywise::{cli, db, utils::ensure_user};
use rusqlite::Connection;
use rust_decimal::Decimal;

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn setup() -> (Connection, i64, i64) {
    let conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "alice").unwrap();
    let cat = categories::create(
        &conn,
        &NewCategory {
            name: "Groceries".into(),
            r#type: TxType::Expense,
            icon: "cart".into(),
            color: "#F9A825".into(),
        },
    )
    .unwrap();
    (conn, user, cat.id)
}

fn expense(cat: i64, cents: i64, date: NaiveDate, description: &str, tags: &[&str]) -> NewTransaction {
    NewTransaction {
        r#type: TxType::Expense,
        amount: Decimal::new(cents, 2),
        currency: "USD".into(),
        category_id: cat,
        description: description.into(),
        date,
        tags: tags.iter().map(|t| t.to_string()).collect(),
    }
}

#[test]
fn created_transaction_reads_back_identically() {
    let (conn, user, cat) = setup();
    let created = transactions::create(
        &conn,
        user,
        &expense(cat, 1234, d(2025, 1, 2), "Corner shop", &["food", "weekly"]),
    )
    .unwrap();
    let fetched = transactions::get(&conn, user, created.id).unwrap();
    assert_eq!(created, fetched);
    assert_eq!(fetched.amount, Decimal::new(1234, 2));
    assert_eq!(fetched.date, d(2025, 1, 2));
    assert_eq!(fetched.tags, vec!["food".to_string(), "weekly".to_string()]);
    assert!(!fetched.is_recurring);
    assert_eq!(fetched.recurring_id, None);
}

#[test]
fn twenty_five_rows_paginate_into_three_pages() {
    let (conn, user, cat) = setup();
    for day in 1..=25 {
        transactions::create(&conn, user, &expense(cat, 100 * day as i64, d(2025, 1, day), "x", &[]))
            .unwrap();
    }
    let page = transactions::list(
        &conn,
        user,
        &TxFilter::default(),
        PageRequest::new(3, 10).unwrap(),
    )
    .unwrap();
    assert_eq!(page.pagination.total, 25);
    assert_eq!(page.pagination.total_pages, 3);
    assert_eq!(page.data.len(), 5);
    // newest first, so the last page holds the oldest five
    assert_eq!(page.data[0].date, d(2025, 1, 5));
    assert_eq!(page.data[4].date, d(2025, 1, 1));
}

#[test]
fn empty_result_has_zero_pages() {
    let (conn, user, _) = setup();
    let page = transactions::list(&conn, user, &TxFilter::default(), PageRequest::default()).unwrap();
    assert!(page.data.is_empty());
    assert_eq!(page.pagination.total_pages, 0);
}

#[test]
fn search_covers_description_and_tags_and_escapes_wildcards() {
    let (conn, user, cat) = setup();
    transactions::create(&conn, user, &expense(cat, 450, d(2025, 2, 1), "Morning coffee", &[])).unwrap();
    transactions::create(&conn, user, &expense(cat, 9900, d(2025, 2, 2), "Train", &["travel", "work"])).unwrap();
    transactions::create(&conn, user, &expense(cat, 2000, d(2025, 2, 3), "Shoes 50% off", &[])).unwrap();

    let search = |term: &str| {
        let filter = TxFilter {
            search: Some(term.into()),
            ..TxFilter::default()
        };
        transactions::list(&conn, user, &filter, PageRequest::default())
            .unwrap()
            .data
            .into_iter()
            .map(|t| t.description)
            .collect::<Vec<_>>()
    };
    assert_eq!(search("COFFEE"), vec!["Morning coffee"]);
    assert_eq!(search("trav"), vec!["Train"]);
    assert_eq!(search("work"), vec!["Train"]);
    assert_eq!(search("%"), vec!["Shoes 50% off"]);
    // tags are matched one by one, not as their stored JSON text
    for term in ["[", "]", "\"", ","] {
        assert!(search(term).is_empty(), "{:?} matched", term);
    }
    assert_eq!(search("   ").len(), 3);
}

#[test]
fn filters_combine_type_and_inclusive_dates() {
    let (conn, user, cat) = setup();
    let salary = categories::create(
        &conn,
        &NewCategory {
            name: "Salary".into(),
            r#type: TxType::Income,
            icon: String::new(),
            color: "#2E7D32".into(),
        },
    )
    .unwrap();
    transactions::create(&conn, user, &expense(cat, 100, d(2025, 3, 1), "a", &[])).unwrap();
    transactions::create(&conn, user, &expense(cat, 100, d(2025, 3, 31), "b", &[])).unwrap();
    transactions::create(&conn, user, &expense(cat, 100, d(2025, 4, 1), "c", &[])).unwrap();
    let mut income = expense(salary.id, 500_000, d(2025, 3, 15), "pay", &[]);
    income.r#type = TxType::Income;
    transactions::create(&conn, user, &income).unwrap();

    let filter = TxFilter {
        r#type: Some(TxType::Expense),
        from: Some(d(2025, 3, 1)),
        to: Some(d(2025, 3, 31)),
        ..TxFilter::default()
    };
    let page = transactions::list(&conn, user, &filter, PageRequest::default()).unwrap();
    let names: Vec<_> = page.data.iter().map(|t| t.description.as_str()).collect();
    assert_eq!(names, vec!["b", "a"]);
}

#[test]
fn edit_and_delete_respect_ownership() {
    let (conn, alice, cat) = setup();
    let bob = ensure_user(&conn, "bob").unwrap();
    let t = transactions::create(&conn, alice, &expense(cat, 700, d(2025, 5, 5), "Lunch", &[])).unwrap();

    assert!(matches!(
        transactions::get(&conn, bob, t.id),
        Err(BudgetError::NotFound { .. })
    ));
    assert!(transactions::delete(&conn, bob, t.id).is_err());

    let patch = TransactionPatch {
        amount: Some(Decimal::new(900, 2)),
        tags: Some(vec!["work".into()]),
        ..TransactionPatch::default()
    };
    let updated = transactions::update(&conn, alice, t.id, &patch).unwrap();
    assert_eq!(updated.amount, Decimal::new(900, 2));
    assert_eq!(transactions::get(&conn, alice, t.id).unwrap(), updated);

    transactions::delete(&conn, alice, t.id).unwrap();
    assert!(transactions::get(&conn, alice, t.id).is_err());
}

#[test]
fn negative_amount_and_bad_currency_are_rejected() {
    let (conn, user, cat) = setup();
    let mut input = expense(cat, -100, d(2025, 1, 1), "refund?", &[]);
    assert!(matches!(
        transactions::create(&conn, user, &input),
        Err(BudgetError::Validation(_))
    ));
    input.amount = Decimal::ONE;
    input.currency = "usd".into();
    assert!(matches!(
        transactions::create(&conn, user, &input),
        Err(BudgetError::Validation(_))
    ));
}

#[test]
fn list_arguments_parse() {
    let matches = cli::build_cli().get_matches_from([
        "pennywise", "tx", "list", "--search", "coffee", "--page", "2", "--page-size", "5",
    ]);
    let Some(("tx", tx_m)) = matches.subcommand() else {
        panic!("no tx subcommand");
    };
    let Some(("list", list_m)) = tx_m.subcommand() else {
        panic!("no list subcommand");
    };
    assert_eq!(list_m.get_one::<String>("search").unwrap(), "coffee");
    assert_eq!(*list_m.get_one::<u32>("page").unwrap(), 2);
    assert_eq!(*list_m.get_one::<u32>("page_size").unwrap(), 5);
}
