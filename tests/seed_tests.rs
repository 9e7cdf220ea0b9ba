// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::commands::{budgets, doctor, goals, recurring, reminders, transactions};
use pennywise::error::BudgetError;
use pennywise::{db, seed, utils::ensure_user};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

#[test]
fn seeding_applies_the_whole_fixture() {
    let mut conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "demo").unwrap();
    let as_of = d(2025, 6, 15);
    let fixture = seed::demo_fixture(as_of, 3).unwrap();
    let report = seed::apply(&mut conn, user, &fixture).unwrap();

    assert_eq!(report.categories, fixture.categories.len());
    assert_eq!(report.transactions, fixture.transactions.len());
    assert_eq!(
        transactions::all_between(&conn, user, None, None).unwrap().len(),
        fixture.transactions.len()
    );
    assert_eq!(recurring::list(&conn, user, true).unwrap().len(), fixture.recurring.len());
    assert_eq!(goals::list(&conn, user).unwrap().len(), fixture.goals.len());
    assert_eq!(budgets::statuses(&conn, user, as_of).unwrap().len(), fixture.budgets.len());

    let upcoming = reminders::upcoming(&conn, user, as_of).unwrap();
    assert!(upcoming.iter().any(|u| u.overdue));
    assert!(doctor::check(&conn).unwrap().is_empty());
}

#[test]
fn reseeding_reuses_categories() {
    let mut conn = db::open_in_memory().unwrap();
    let alice = ensure_user(&conn, "alice").unwrap();
    let bob = ensure_user(&conn, "bob").unwrap();
    let fixture = seed::demo_fixture(d(2025, 2, 28), 2).unwrap();
    seed::apply(&mut conn, alice, &fixture).unwrap();
    let second = seed::apply(&mut conn, bob, &fixture).unwrap();
    assert_eq!(second.categories, 0);
    assert_eq!(second.transactions, fixture.transactions.len());
}

#[test]
fn category_lookup_failures_abort_the_seed() {
    let mut conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "demo").unwrap();
    conn.execute("ALTER TABLE categories RENAME COLUMN name TO label", [])
        .unwrap();
    let fixture = seed::demo_fixture(d(2025, 6, 15), 1).unwrap();
    assert!(matches!(
        seed::apply(&mut conn, user, &fixture),
        Err(BudgetError::Database(_))
    ));
    assert!(transactions::all_between(&conn, user, None, None).unwrap().is_empty());
}

#[test]
fn doctor_flags_tampered_rows() {
    let mut conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "demo").unwrap();
    let fixture = seed::demo_fixture(d(2025, 6, 15), 1).unwrap();
    seed::apply(&mut conn, user, &fixture).unwrap();

    conn.execute("UPDATE goals SET is_completed = 1 - is_completed WHERE name='Emergency fund'", [])
        .unwrap();
    conn.execute(
        "UPDATE recurring_transactions SET next_due_date='2025-07-01' WHERE frequency='monthly'",
        [],
    )
    .unwrap();
    conn.execute("UPDATE transactions SET currency='XYZ' WHERE id = (SELECT MIN(id) FROM transactions)", [])
        .unwrap();

    let kinds: Vec<_> = doctor::check(&conn).unwrap().into_iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec!["goal_completion_mismatch", "recurring_off_schedule", "unknown_currency"]
    );
}
