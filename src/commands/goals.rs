// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{currencies, settings};
use crate::error::{BudgetError, Result};
use crate::models::{Goal, GoalPatch, NewGoal};
use crate::progress::progress;
use crate::utils::{
    decimal_at, fmt_money, maybe_print_json, output_flags, parse_date, parse_decimal, pretty_table,
};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rust_decimal::Decimal;
use serde::Serialize;
use validator::Validate;

#[derive(Debug, Serialize)]
struct GoalView<'a> {
    #[serde(flatten)]
    goal: &'a Goal,
    percentage: i64,
}

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let currency = match sub.get_one::<String>("currency") {
                Some(c) => c.trim().to_uppercase(),
                None => settings::get(conn, user_id)?.default_currency,
            };
            let input = NewGoal {
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
                target_amount: parse_decimal(sub.get_one::<String>("target").unwrap())?,
                current_amount: parse_decimal(sub.get_one::<String>("current").unwrap())?,
                currency,
                deadline: parse_date(sub.get_one::<String>("deadline").unwrap())?,
            };
            let g = create(conn, user_id, &input)?;
            println!("Added goal #{} '{}' ({}%)", g.id, g.name, progress(&g).percentage);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data = list(conn, user_id)?;
            let views: Vec<GoalView> = data
                .iter()
                .map(|g| GoalView {
                    goal: g,
                    percentage: progress(g).percentage,
                })
                .collect();
            if !maybe_print_json(json_flag, jsonl_flag, &views)? {
                let rows = data
                    .iter()
                    .map(|g| {
                        let p = progress(g);
                        vec![
                            g.id.to_string(),
                            g.name.clone(),
                            format!(
                                "{} / {:.2}",
                                fmt_money(&g.current_amount, &g.currency),
                                g.target_amount
                            ),
                            format!("{} {}%", bar(p.display_percentage()), p.percentage),
                            g.deadline.to_string(),
                            if g.is_completed { "done".into() } else { String::new() },
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Goal", "Saved", "Progress", "Deadline", ""], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = GoalPatch {
                name: sub.get_one::<String>("name").map(|s| s.trim().to_string()),
                target_amount: sub.get_one::<String>("target").map(|s| parse_decimal(s)).transpose()?,
                current_amount: sub.get_one::<String>("current").map(|s| parse_decimal(s)).transpose()?,
                currency: sub.get_one::<String>("currency").map(|s| s.trim().to_uppercase()),
                deadline: sub.get_one::<String>("deadline").map(|s| parse_date(s)).transpose()?,
            };
            let g = update(conn, user_id, id, &patch)?;
            println!("Updated goal #{} ({}%)", g.id, progress(&g).percentage);
        }
        Some(("contribute", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let g = contribute(conn, user_id, id, amount)?;
            let p = progress(&g);
            println!(
                "Goal #{} now at {:.2} {} ({}%){}",
                g.id,
                g.current_amount,
                g.currency,
                p.percentage,
                if p.is_completed { " - completed!" } else { "" }
            );
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, user_id, id)?;
            println!("Removed goal #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn bar(pct: i64) -> String {
    let filled = (pct / 10) as usize;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(10 - filled))
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: r.get(0)?,
        name: r.get(1)?,
        target_amount: decimal_at(r, 2)?,
        current_amount: decimal_at(r, 3)?,
        currency: r.get(4)?,
        deadline: r.get(5)?,
        is_completed: r.get(6)?,
    })
}

/// Every write goes through here so `is_completed` always matches the amounts.
fn save(conn: &Connection, user_id: i64, g: &mut Goal) -> Result<()> {
    g.is_completed = progress(g).is_completed;
    conn.execute(
        "UPDATE goals SET name=?3, target_amount=?4, current_amount=?5, currency=?6, deadline=?7, is_completed=?8
         WHERE id=?1 AND user_id=?2",
        params![
            g.id,
            user_id,
            g.name,
            g.target_amount.to_string(),
            g.current_amount.to_string(),
            g.currency,
            g.deadline,
            g.is_completed
        ],
    )?;
    Ok(())
}

pub fn create(conn: &Connection, user_id: i64, input: &NewGoal) -> Result<Goal> {
    input.validate()?;
    currencies::ensure_known(conn, &input.currency)?;
    conn.execute(
        "INSERT INTO goals(user_id, name, target_amount, current_amount, currency, deadline, is_completed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            user_id,
            input.name,
            input.target_amount.to_string(),
            input.current_amount.to_string(),
            input.currency,
            input.deadline,
            input.current_amount >= input.target_amount
        ],
    )?;
    get(conn, user_id, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Goal> {
    conn.query_row(
        "SELECT id, name, target_amount, current_amount, currency, deadline, is_completed
         FROM goals WHERE id=?1 AND user_id=?2",
        params![id, user_id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| BudgetError::not_found("goal", id))
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Goal>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, target_amount, current_amount, currency, deadline, is_completed
         FROM goals WHERE user_id=?1 ORDER BY deadline, id",
    )?;
    let rows = stmt.query_map(params![user_id], from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn update(conn: &Connection, user_id: i64, id: i64, patch: &GoalPatch) -> Result<Goal> {
    patch.validate()?;
    if let Some(ccy) = &patch.currency {
        currencies::ensure_known(conn, ccy)?;
    }
    let mut g = get(conn, user_id, id)?;
    if let Some(name) = &patch.name {
        g.name = name.clone();
    }
    if let Some(target) = patch.target_amount {
        g.target_amount = target;
    }
    if let Some(current) = patch.current_amount {
        g.current_amount = current;
    }
    if let Some(ccy) = &patch.currency {
        g.currency = ccy.clone();
    }
    if let Some(deadline) = patch.deadline {
        g.deadline = deadline;
    }
    save(conn, user_id, &mut g)?;
    Ok(g)
}

/// Adds to the running total. Withdrawals are negative contributions and may not
/// take the total below zero.
pub fn contribute(conn: &Connection, user_id: i64, id: i64, amount: Decimal) -> Result<Goal> {
    if amount.is_zero() {
        return Err(BudgetError::invalid("contribution must not be zero"));
    }
    let mut g = get(conn, user_id, id)?;
    let next = g
        .current_amount
        .checked_add(amount)
        .ok_or_else(BudgetError::out_of_range)?;
    if next < Decimal::ZERO {
        return Err(BudgetError::invalid(format!(
            "withdrawal of {} exceeds the saved {}",
            -amount, g.current_amount
        )));
    }
    g.current_amount = next;
    save(conn, user_id, &mut g)?;
    tracing::info!(user = user_id, goal = id, %amount, completed = g.is_completed, "goal contribution");
    Ok(g)
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM goals WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(BudgetError::not_found("goal", id));
    }
    Ok(())
}
