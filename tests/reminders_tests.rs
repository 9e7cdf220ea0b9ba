// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::commands::{categories, reminders};
use pennywise::error::BudgetError;
use pennywise::models::{Frequency, NewCategory, NewReminder, ReminderPatch, TxType};
use pennywise::{db, utils::ensure_user};
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
            name: "Utilities".into(),
            r#type: TxType::Expense,
            icon: "bolt".into(),
            color: "#546E7A".into(),
        },
    )
    .unwrap();
    (conn, user, cat.id)
}

fn reminder(cat: i64, title: &str, due: NaiveDate, frequency: Option<Frequency>, notify: i64) -> NewReminder {
    NewReminder {
        title: title.into(),
        amount: Decimal::new(9500, 2),
        due_date: due,
        category_id: cat,
        frequency,
        notify_before: notify,
    }
}

#[test]
fn paying_a_recurring_reminder_rolls_it_forward() {
    let (conn, user, cat) = setup();
    let r = reminders::create(&conn, user, &reminder(cat, "Electricity", d(2025, 1, 31), Some(Frequency::Monthly), 3))
        .unwrap();
    assert!(r.is_recurring);

    let paid = reminders::mark_paid(&conn, user, r.id).unwrap();
    assert_eq!(paid.due_date, d(2025, 2, 28));
    assert!(!paid.is_paid);
    assert_eq!(reminders::get(&conn, user, r.id).unwrap(), paid);
}

#[test]
fn paying_a_one_off_closes_it() {
    let (conn, user, cat) = setup();
    let r = reminders::create(&conn, user, &reminder(cat, "Dentist", d(2025, 3, 3), None, 1)).unwrap();
    assert!(!r.is_recurring);

    let paid = reminders::mark_paid(&conn, user, r.id).unwrap();
    assert!(paid.is_paid);
    assert_eq!(paid.due_date, d(2025, 3, 3));
    assert!(matches!(
        reminders::mark_paid(&conn, user, r.id),
        Err(BudgetError::Conflict(_))
    ));
    assert!(reminders::list(&conn, user, true).unwrap().is_empty());

    assert!(!reminders::mark_unpaid(&conn, user, r.id).unwrap().is_paid);
    assert_eq!(reminders::list(&conn, user, true).unwrap().len(), 1);
}

#[test]
fn upcoming_honours_notify_window_and_flags_overdue() {
    let (conn, user, cat) = setup();
    let as_of = d(2025, 6, 10);
    reminders::create(&conn, user, &reminder(cat, "Soon", d(2025, 6, 12), None, 3)).unwrap();
    reminders::create(&conn, user, &reminder(cat, "Later", d(2025, 6, 20), None, 3)).unwrap();
    reminders::create(&conn, user, &reminder(cat, "Late", d(2025, 6, 8), None, 0)).unwrap();
    let paid = reminders::create(&conn, user, &reminder(cat, "Done", d(2025, 6, 9), None, 0)).unwrap();
    reminders::mark_paid(&conn, user, paid.id).unwrap();

    let up = reminders::upcoming(&conn, user, as_of).unwrap();
    let summary: Vec<_> = up
        .iter()
        .map(|u| (u.reminder.title.as_str(), u.days_until_due, u.overdue))
        .collect();
    assert_eq!(summary, vec![("Late", -2, true), ("Soon", 2, false)]);
}

#[test]
fn edit_can_make_a_reminder_one_off() {
    let (conn, user, cat) = setup();
    let r = reminders::create(&conn, user, &reminder(cat, "Water", d(2025, 2, 1), Some(Frequency::Quarterly), 5))
        .unwrap();
    let patch = ReminderPatch {
        frequency: Some(None),
        notify_before: Some(10),
        ..ReminderPatch::default()
    };
    let r = reminders::update(&conn, user, r.id, &patch).unwrap();
    assert!(!r.is_recurring);
    assert_eq!(r.frequency, None);
    assert_eq!(r.notify_before, 10);

    let bad = ReminderPatch {
        notify_before: Some(-1),
        ..ReminderPatch::default()
    };
    assert!(matches!(
        reminders::update(&conn, user, r.id, &bad),
        Err(BudgetError::Validation(_))
    ));
}
