// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::categories;
use crate::error::{BudgetError, Result};
use crate::models::{NewReminder, Reminder, ReminderPatch};
use crate::schedule::advance;
use crate::utils::{
    as_of, decimal_at, maybe_print_json, output_flags, parse_date, parse_decimal, pretty_table,
};
use chrono::{Duration, NaiveDate};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;
use validator::Validate;

const COLUMNS: &str =
    "id, title, amount, due_date, category_id, is_recurring, frequency, is_paid, notify_before";

/// A reminder whose notification window is open on the reference date.
#[derive(Debug, Clone, Serialize)]
pub struct Upcoming {
    #[serde(flatten)]
    pub reminder: Reminder,
    pub days_until_due: i64,
    pub overdue: bool,
}

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewReminder {
                title: sub.get_one::<String>("title").unwrap().trim().to_string(),
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                due_date: parse_date(sub.get_one::<String>("due").unwrap())?,
                category_id: categories::resolve(conn, sub.get_one::<String>("category").unwrap())?,
                frequency: match sub.get_one::<String>("frequency") {
                    Some(s) => Some(s.parse().map_err(anyhow::Error::msg)?),
                    None => None,
                },
                notify_before: *sub.get_one::<i64>("notify_before").unwrap(),
            };
            let r = create(conn, user_id, &input)?;
            println!("Added reminder #{} '{}' due {}", r.id, r.title, r.due_date);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data = list(conn, user_id, sub.get_flag("unpaid"))?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.title.clone(),
                            format!("{:.2}", r.amount),
                            r.due_date.to_string(),
                            r.frequency.map(|f| f.to_string()).unwrap_or_else(|| "once".into()),
                            format!("{}d", r.notify_before),
                            if r.is_paid { "paid".into() } else { String::new() },
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Title", "Amount", "Due", "Repeats", "Notify", "Status"],
                        rows
                    )
                );
            }
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let frequency = if sub.get_flag("one_off") {
                Some(None)
            } else {
                match sub.get_one::<String>("frequency") {
                    Some(s) => Some(Some(s.parse().map_err(anyhow::Error::msg)?)),
                    None => None,
                }
            };
            let patch = ReminderPatch {
                title: sub.get_one::<String>("title").map(|s| s.trim().to_string()),
                amount: sub.get_one::<String>("amount").map(|s| parse_decimal(s)).transpose()?,
                due_date: sub.get_one::<String>("due").map(|s| parse_date(s)).transpose()?,
                category_id: sub
                    .get_one::<String>("category")
                    .map(|s| categories::resolve(conn, s))
                    .transpose()?,
                frequency,
                notify_before: sub.get_one::<i64>("notify_before").copied(),
            };
            let r = update(conn, user_id, id, &patch)?;
            println!("Updated reminder #{}", r.id);
        }
        Some(("paid", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let r = mark_paid(conn, user_id, id)?;
            if r.is_recurring {
                println!("Reminder #{} paid; next due {}", r.id, r.due_date);
            } else {
                println!("Reminder #{} marked paid", r.id);
            }
        }
        Some(("unpaid", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let r = mark_unpaid(conn, user_id, id)?;
            println!("Reminder #{} marked unpaid", r.id);
        }
        Some(("upcoming", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data = upcoming(conn, user_id, as_of(sub)?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|u| {
                        vec![
                            u.reminder.id.to_string(),
                            u.reminder.title.clone(),
                            format!("{:.2}", u.reminder.amount),
                            u.reminder.due_date.to_string(),
                            if u.overdue {
                                format!("OVERDUE by {}d", -u.days_until_due)
                            } else {
                                format!("in {}d", u.days_until_due)
                            },
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["ID", "Title", "Amount", "Due", "When"], rows));
            }
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, user_id, id)?;
            println!("Removed reminder #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Reminder> {
    Ok(Reminder {
        id: r.get(0)?,
        title: r.get(1)?,
        amount: decimal_at(r, 2)?,
        due_date: r.get(3)?,
        category_id: r.get(4)?,
        is_recurring: r.get(5)?,
        frequency: r.get(6)?,
        is_paid: r.get(7)?,
        notify_before: r.get(8)?,
    })
}

fn save(conn: &Connection, user_id: i64, r: &Reminder) -> Result<()> {
    conn.execute(
        "UPDATE reminders SET title=?3, amount=?4, due_date=?5, category_id=?6, is_recurring=?7,
            frequency=?8, is_paid=?9, notify_before=?10
         WHERE id=?1 AND user_id=?2",
        params![
            r.id,
            user_id,
            r.title,
            r.amount.to_string(),
            r.due_date,
            r.category_id,
            r.is_recurring,
            r.frequency,
            r.is_paid,
            r.notify_before
        ],
    )?;
    Ok(())
}

pub fn create(conn: &Connection, user_id: i64, input: &NewReminder) -> Result<Reminder> {
    input.validate()?;
    categories::get(conn, input.category_id)?;
    conn.execute(
        "INSERT INTO reminders(user_id, title, amount, due_date, category_id, is_recurring, frequency, is_paid, notify_before)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 0, ?8)",
        params![
            user_id,
            input.title,
            input.amount.to_string(),
            input.due_date,
            input.category_id,
            input.frequency.is_some(),
            input.frequency,
            input.notify_before
        ],
    )?;
    get(conn, user_id, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Reminder> {
    let sql = format!("SELECT {} FROM reminders WHERE id=?1 AND user_id=?2", COLUMNS);
    conn.query_row(&sql, params![id, user_id], from_row)
        .optional()?
        .ok_or_else(|| BudgetError::not_found("reminder", id))
}

pub fn list(conn: &Connection, user_id: i64, unpaid_only: bool) -> Result<Vec<Reminder>> {
    let sql = format!(
        "SELECT {} FROM reminders WHERE user_id=?1 AND (?2 = 0 OR is_paid = 0)
         ORDER BY due_date, id",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, unpaid_only], from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn update(conn: &Connection, user_id: i64, id: i64, patch: &ReminderPatch) -> Result<Reminder> {
    patch.validate()?;
    let mut r = get(conn, user_id, id)?;
    if let Some(title) = &patch.title {
        r.title = title.clone();
    }
    if let Some(amount) = patch.amount {
        r.amount = amount;
    }
    if let Some(due) = patch.due_date {
        r.due_date = due;
    }
    if let Some(cat) = patch.category_id {
        categories::get(conn, cat)?;
        r.category_id = cat;
    }
    if let Some(freq) = patch.frequency {
        r.frequency = freq;
        r.is_recurring = freq.is_some();
    }
    if let Some(days) = patch.notify_before {
        r.notify_before = days;
    }
    save(conn, user_id, &r)?;
    Ok(r)
}

/// A recurring reminder rolls to its next due date and stays open for that cycle;
/// a one-off reminder is closed.
pub fn mark_paid(conn: &Connection, user_id: i64, id: i64) -> Result<Reminder> {
    let mut r = get(conn, user_id, id)?;
    match r.frequency {
        Some(freq) => {
            r.due_date = advance(r.due_date, freq)?;
            r.is_paid = false;
        }
        None => {
            if r.is_paid {
                return Err(BudgetError::Conflict(format!(
                    "reminder {} is already paid",
                    id
                )));
            }
            r.is_paid = true;
        }
    }
    save(conn, user_id, &r)?;
    tracing::info!(user = user_id, reminder = id, due = %r.due_date, paid = r.is_paid, "reminder paid");
    Ok(r)
}

pub fn mark_unpaid(conn: &Connection, user_id: i64, id: i64) -> Result<Reminder> {
    let mut r = get(conn, user_id, id)?;
    r.is_paid = false;
    save(conn, user_id, &r)?;
    Ok(r)
}

/// Unpaid reminders whose window (`due_date - notify_before` days) has opened by
/// `as_of`, soonest first. Past-due ones are flagged overdue.
pub fn upcoming(conn: &Connection, user_id: i64, as_of: NaiveDate) -> Result<Vec<Upcoming>> {
    let mut out = Vec::new();
    for r in list(conn, user_id, true)? {
        let opens = r.due_date - Duration::days(r.notify_before);
        if opens > as_of {
            continue;
        }
        let days_until_due = (r.due_date - as_of).num_days();
        out.push(Upcoming {
            days_until_due,
            overdue: days_until_due < 0,
            reminder: r,
        });
    }
    Ok(out)
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM reminders WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(BudgetError::not_found("reminder", id));
    }
    Ok(())
}
