// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{budgets, categories, goals, recurring, reminders, transactions};
use crate::error::{BudgetError, Result};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    if let Some((entity, sub)) = m.subcommand() {
        let fmt = sub.get_one::<String>("format").unwrap().to_lowercase();
        let out = sub.get_one::<String>("out").unwrap();
        let n = export(conn, user_id, entity, &fmt, Path::new(out))?;
        println!("Exported {} {} to {}", n, entity, out);
    }
    Ok(())
}

/// Column set and rows for one entity. JSON output serializes the records
/// themselves; CSV uses `headers` and `rows`.
struct Sheet {
    headers: &'static [&'static str],
    rows: Vec<Vec<String>>,
    json: serde_json::Value,
}

fn sheet<T: Serialize>(
    headers: &'static [&'static str],
    records: &[T],
    row: impl Fn(&T) -> Vec<String>,
) -> Result<Sheet> {
    Ok(Sheet {
        headers,
        rows: records.iter().map(row).collect(),
        json: serde_json::to_value(records)?,
    })
}

fn build(conn: &Connection, user_id: i64, entity: &str) -> Result<Sheet> {
    let names: HashMap<i64, String> = categories::list(conn, None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let cat = |id: i64| names.get(&id).cloned().unwrap_or_default();
    match entity {
        "transactions" => {
            let data = transactions::all_between(conn, user_id, None, None)?;
            sheet(
                &[
                    "id", "date", "type", "amount", "currency", "category", "description", "tags",
                    "recurring_id",
                ],
                &data,
                |t| {
                    vec![
                        t.id.to_string(),
                        t.date.to_string(),
                        t.r#type.to_string(),
                        t.amount.to_string(),
                        t.currency.clone(),
                        cat(t.category_id),
                        t.description.clone(),
                        t.tags.join(";"),
                        t.recurring_id.map(|r| r.to_string()).unwrap_or_default(),
                    ]
                },
            )
        }
        "budgets" => {
            let data = budgets::list(conn, user_id)?;
            sheet(
                &["id", "category", "amount", "currency", "period", "start_date"],
                &data,
                |b| {
                    vec![
                        b.id.to_string(),
                        cat(b.category_id),
                        b.amount.to_string(),
                        b.currency.clone(),
                        b.period.to_string(),
                        b.start_date.to_string(),
                    ]
                },
            )
        }
        "goals" => {
            let data = goals::list(conn, user_id)?;
            sheet(
                &[
                    "id", "name", "target_amount", "current_amount", "currency", "deadline",
                    "is_completed",
                ],
                &data,
                |g| {
                    vec![
                        g.id.to_string(),
                        g.name.clone(),
                        g.target_amount.to_string(),
                        g.current_amount.to_string(),
                        g.currency.clone(),
                        g.deadline.to_string(),
                        g.is_completed.to_string(),
                    ]
                },
            )
        }
        "reminders" => {
            let data = reminders::list(conn, user_id, false)?;
            sheet(
                &[
                    "id", "title", "amount", "due_date", "category", "frequency", "is_paid",
                    "notify_before",
                ],
                &data,
                |r| {
                    vec![
                        r.id.to_string(),
                        r.title.clone(),
                        r.amount.to_string(),
                        r.due_date.to_string(),
                        cat(r.category_id),
                        r.frequency.map(|f| f.to_string()).unwrap_or_default(),
                        r.is_paid.to_string(),
                        r.notify_before.to_string(),
                    ]
                },
            )
        }
        "recurring" => {
            let data = recurring::list(conn, user_id, false)?;
            sheet(
                &[
                    "id", "type", "amount", "currency", "category", "description", "frequency",
                    "start_date", "end_date", "next_due_date", "is_active",
                ],
                &data,
                |r| {
                    vec![
                        r.id.to_string(),
                        r.r#type.to_string(),
                        r.amount.to_string(),
                        r.currency.clone(),
                        cat(r.category_id),
                        r.description.clone(),
                        r.frequency.to_string(),
                        r.start_date.to_string(),
                        r.end_date.map(|d| d.to_string()).unwrap_or_default(),
                        r.next_due_date.to_string(),
                        r.is_active.to_string(),
                    ]
                },
            )
        }
        other => Err(BudgetError::invalid(format!("cannot export '{}'", other))),
    }
}

/// Write every record of `entity` owned by the user to `out`. The format is
/// checked before anything is read or written. Returns the record count.
pub fn export(conn: &Connection, user_id: i64, entity: &str, format: &str, out: &Path) -> Result<usize> {
    if !matches!(format, "csv" | "json") {
        return Err(BudgetError::invalid(format!(
            "unknown format '{}' (use csv|json)",
            format
        )));
    }
    let sheet = build(conn, user_id, entity)?;
    let n = sheet.rows.len();
    if format == "csv" {
        let mut wtr = csv::Writer::from_path(out)?;
        wtr.write_record(sheet.headers)?;
        for row in &sheet.rows {
            wtr.write_record(row)?;
        }
        wtr.flush()?;
    } else {
        std::fs::write(out, serde_json::to_string_pretty(&sheet.json)?)?;
    }
    tracing::info!(user = user_id, entity, format, count = n, path = %out.display(), "exported");
    Ok(n)
}
