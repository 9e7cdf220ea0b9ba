// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{categories, currencies, settings, transactions};
use crate::error::{BudgetError, Result};
use crate::models::{NewRecurring, NewTransaction, RecurringPatch, RecurringTransaction, Transaction};
use crate::schedule::{advance, next_after};
use crate::utils::{
    as_of, decimal_at, maybe_print_json, output_flags, parse_date, parse_decimal, pretty_table,
    today,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use validator::Validate;

const COLUMNS: &str = "id, type, amount, currency, category_id, description, frequency, start_date, end_date, next_due_date, is_active";

pub fn handle(conn: &mut Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let currency = match sub.get_one::<String>("currency") {
                Some(c) => c.trim().to_uppercase(),
                None => settings::get(conn, user_id)?.default_currency,
            };
            let input = NewRecurring {
                r#type: sub.get_one::<String>("type").unwrap().parse().map_err(anyhow::Error::msg)?,
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                currency,
                category_id: categories::resolve(conn, sub.get_one::<String>("category").unwrap())?,
                description: sub.get_one::<String>("description").unwrap().trim().to_string(),
                frequency: sub
                    .get_one::<String>("frequency")
                    .unwrap()
                    .parse()
                    .map_err(anyhow::Error::msg)?,
                start_date: match sub.get_one::<String>("start") {
                    Some(s) => parse_date(s)?,
                    None => today(),
                },
                end_date: sub.get_one::<String>("end").map(|s| parse_date(s)).transpose()?,
            };
            let r = create(conn, user_id, &input)?;
            println!(
                "Added recurring #{} ({} {}), next due {}",
                r.id, r.frequency, r.amount, r.next_due_date
            );
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data = list(conn, user_id, sub.get_flag("active"))?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|r| {
                        vec![
                            r.id.to_string(),
                            r.description.clone(),
                            r.r#type.to_string(),
                            format!("{:.2} {}", r.amount, r.currency),
                            r.frequency.to_string(),
                            r.next_due_date.to_string(),
                            r.end_date.map(|d| d.to_string()).unwrap_or_default(),
                            if r.is_active { "yes".into() } else { "no".into() },
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(
                        &["ID", "Description", "Type", "Amount", "Every", "Next Due", "Ends", "Active"],
                        rows
                    )
                );
            }
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let end_date = if sub.get_flag("clear_end") {
                Some(None)
            } else {
                sub.get_one::<String>("end")
                    .map(|s| parse_date(s))
                    .transpose()?
                    .map(Some)
            };
            let patch = RecurringPatch {
                r#type: match sub.get_one::<String>("type") {
                    Some(s) => Some(s.parse().map_err(anyhow::Error::msg)?),
                    None => None,
                },
                amount: sub.get_one::<String>("amount").map(|s| parse_decimal(s)).transpose()?,
                currency: sub.get_one::<String>("currency").map(|s| s.trim().to_uppercase()),
                category_id: sub
                    .get_one::<String>("category")
                    .map(|s| categories::resolve(conn, s))
                    .transpose()?,
                description: sub.get_one::<String>("description").map(|s| s.trim().to_string()),
                frequency: match sub.get_one::<String>("frequency") {
                    Some(s) => Some(s.parse().map_err(anyhow::Error::msg)?),
                    None => None,
                },
                start_date: sub.get_one::<String>("start").map(|s| parse_date(s)).transpose()?,
                end_date,
            };
            let r = update(conn, user_id, id, &patch)?;
            println!("Updated recurring #{}, next due {}", r.id, r.next_due_date);
        }
        Some(("toggle", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let r = toggle_active(conn, user_id, id, today())?;
            println!(
                "Recurring #{} is now {}",
                r.id,
                if r.is_active { "active" } else { "paused" }
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, user_id, id)?;
            println!("Removed recurring #{}", id);
        }
        Some(("process", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let created = process_due(conn, user_id, as_of(sub)?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &created)? {
                for t in &created {
                    println!(
                        "Recorded #{} {} {} {} on {}",
                        t.id, t.r#type, t.amount, t.currency, t.date
                    );
                }
                println!("{} transaction(s) created", created.len());
            }
        }
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<RecurringTransaction> {
    Ok(RecurringTransaction {
        id: r.get(0)?,
        r#type: r.get(1)?,
        amount: decimal_at(r, 2)?,
        currency: r.get(3)?,
        category_id: r.get(4)?,
        description: r.get(5)?,
        frequency: r.get(6)?,
        start_date: r.get(7)?,
        end_date: r.get(8)?,
        next_due_date: r.get(9)?,
        is_active: r.get(10)?,
    })
}

fn check_dates(start: NaiveDate, end: Option<NaiveDate>) -> Result<()> {
    match end {
        Some(end) if end < start => Err(BudgetError::invalid(format!(
            "end date {} is before start date {}",
            end, start
        ))),
        _ => Ok(()),
    }
}

/// Latest occurrence already turned into a transaction, if any.
fn last_materialized(conn: &Connection, id: i64) -> Result<Option<NaiveDate>> {
    let d = conn.query_row(
        "SELECT MAX(date) FROM transactions WHERE recurring_id=?1",
        params![id],
        |r| r.get::<_, Option<NaiveDate>>(0),
    )?;
    Ok(d)
}

/// The start date anchors the schedule; the first due date is one step after it,
/// and later ones follow the last materialized occurrence.
fn compute_next_due(conn: &Connection, r: &RecurringTransaction) -> Result<NaiveDate> {
    let last = match last_materialized(conn, r.id)? {
        Some(last) if last > r.start_date => last,
        _ => r.start_date,
    };
    next_after(r.start_date, r.frequency, last)
}

pub fn create(conn: &Connection, user_id: i64, input: &NewRecurring) -> Result<RecurringTransaction> {
    input.validate()?;
    currencies::ensure_known(conn, &input.currency)?;
    check_dates(input.start_date, input.end_date)?;
    categories::get(conn, input.category_id)?;
    let next_due = advance(input.start_date, input.frequency)?;
    conn.execute(
        "INSERT INTO recurring_transactions(user_id, type, amount, currency, category_id, description, frequency, start_date, end_date, next_due_date, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 1)",
        params![
            user_id,
            input.r#type,
            input.amount.to_string(),
            input.currency,
            input.category_id,
            input.description,
            input.frequency,
            input.start_date,
            input.end_date,
            next_due,
        ],
    )?;
    get(conn, user_id, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<RecurringTransaction> {
    let sql = format!(
        "SELECT {} FROM recurring_transactions WHERE id=?1 AND user_id=?2",
        COLUMNS
    );
    conn.query_row(&sql, params![id, user_id], from_row)
        .optional()?
        .ok_or_else(|| BudgetError::not_found("recurring transaction", id))
}

pub fn list(conn: &Connection, user_id: i64, active_only: bool) -> Result<Vec<RecurringTransaction>> {
    let sql = format!(
        "SELECT {} FROM recurring_transactions WHERE user_id=?1 AND (?2 = 0 OR is_active = 1)
         ORDER BY next_due_date, id",
        COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![user_id, active_only], from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

fn save(conn: &Connection, user_id: i64, r: &RecurringTransaction) -> Result<()> {
    conn.execute(
        "UPDATE recurring_transactions SET type=?3, amount=?4, currency=?5, category_id=?6, description=?7,
            frequency=?8, start_date=?9, end_date=?10, next_due_date=?11, is_active=?12
         WHERE id=?1 AND user_id=?2",
        params![
            r.id,
            user_id,
            r.r#type,
            r.amount.to_string(),
            r.currency,
            r.category_id,
            r.description,
            r.frequency,
            r.start_date,
            r.end_date,
            r.next_due_date,
            r.is_active,
        ],
    )?;
    Ok(())
}

/// Editing the frequency or start date moves `next_due_date` onto the new schedule.
/// It never lands before the current due date or on an already materialized
/// occurrence, so dates skipped by a pause stay skipped. Other edits leave it alone.
pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    patch: &RecurringPatch,
) -> Result<RecurringTransaction> {
    patch.validate()?;
    if let Some(ccy) = &patch.currency {
        currencies::ensure_known(conn, ccy)?;
    }
    let mut r = get(conn, user_id, id)?;
    let schedule = (r.frequency, r.start_date);
    if let Some(kind) = patch.r#type {
        r.r#type = kind;
    }
    if let Some(amount) = patch.amount {
        r.amount = amount;
    }
    if let Some(ccy) = &patch.currency {
        r.currency = ccy.clone();
    }
    if let Some(cat) = patch.category_id {
        categories::get(conn, cat)?;
        r.category_id = cat;
    }
    if let Some(desc) = &patch.description {
        r.description = desc.clone();
    }
    if let Some(freq) = patch.frequency {
        r.frequency = freq;
    }
    if let Some(start) = patch.start_date {
        r.start_date = start;
    }
    if let Some(end) = patch.end_date {
        r.end_date = end;
    }
    check_dates(r.start_date, r.end_date)?;
    if (r.frequency, r.start_date) != schedule {
        let mut floor = r.start_date;
        if let Some(last) = last_materialized(conn, r.id)? {
            floor = floor.max(last);
        }
        if let Some(before_due) = r.next_due_date.pred_opt() {
            floor = floor.max(before_due);
        }
        r.next_due_date = next_after(r.start_date, r.frequency, floor)?;
    }
    save(conn, user_id, &r)?;
    Ok(r)
}

/// Flip `is_active`. Reactivation resumes from the first unmaterialized occurrence
/// that is not before `today`, so a long pause does not back-fill missed dates.
pub fn toggle_active(
    conn: &Connection,
    user_id: i64,
    id: i64,
    today: NaiveDate,
) -> Result<RecurringTransaction> {
    let mut r = get(conn, user_id, id)?;
    r.is_active = !r.is_active;
    if r.is_active {
        let next = compute_next_due(conn, &r)?;
        r.next_due_date = if next < today {
            match today.pred_opt() {
                Some(yesterday) => next_after(r.start_date, r.frequency, yesterday)?,
                None => next,
            }
        } else {
            next
        };
    }
    save(conn, user_id, &r)?;
    tracing::info!(user = user_id, id, active = r.is_active, "recurring toggled");
    Ok(r)
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM recurring_transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(BudgetError::not_found("recurring transaction", id));
    }
    Ok(())
}

/// Materialize every occurrence of the user's active templates due on or before
/// `as_of`, in one database transaction. Templates whose next occurrence passes
/// their end date are deactivated.
pub fn process_due(conn: &mut Connection, user_id: i64, as_of: NaiveDate) -> Result<Vec<Transaction>> {
    let tx = conn.transaction()?;
    let mut created = Vec::new();
    for mut r in list(&tx, user_id, true)? {
        while r.is_active && r.next_due_date <= as_of {
            if r.end_date.is_some_and(|end| r.next_due_date > end) {
                r.is_active = false;
                break;
            }
            let input = NewTransaction {
                r#type: r.r#type,
                amount: r.amount,
                currency: r.currency.clone(),
                category_id: r.category_id,
                description: r.description.clone(),
                date: r.next_due_date,
                tags: Vec::new(),
            };
            created.push(transactions::insert(&tx, user_id, &input, Some(r.id))?);
            r.next_due_date = next_after(r.start_date, r.frequency, r.next_due_date)?;
        }
        if r.end_date.is_some_and(|end| r.next_due_date > end) {
            r.is_active = false;
        }
        save(&tx, user_id, &r)?;
    }
    tx.commit()?;
    tracing::info!(user = user_id, %as_of, count = created.len(), "recurring processed");
    Ok(created)
}
