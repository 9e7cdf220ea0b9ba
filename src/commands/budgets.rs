// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{categories, currencies, settings, transactions};
use crate::error::{BudgetError, Result};
use crate::models::{Budget, BudgetPatch, NewBudget};
use crate::rates::RateTable;
use crate::schedule::period_window;
use crate::spend::{budget_status, BudgetStatus};
use crate::utils::{
    as_of, decimal_at, maybe_print_json, output_flags, parse_date, parse_decimal, pretty_table,
    today,
};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use validator::Validate;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let currency = match sub.get_one::<String>("currency") {
                Some(c) => c.trim().to_uppercase(),
                None => settings::get(conn, user_id)?.default_currency,
            };
            let input = NewBudget {
                category_id: categories::resolve(conn, sub.get_one::<String>("category").unwrap())?,
                amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
                currency,
                period: sub.get_one::<String>("period").unwrap().parse().map_err(anyhow::Error::msg)?,
                start_date: match sub.get_one::<String>("start") {
                    Some(s) => parse_date(s)?,
                    None => today(),
                },
            };
            let b = create(conn, user_id, &input)?;
            println!(
                "Budget #{} set: {} {} per {} period",
                b.id, b.amount, b.currency, b.period
            );
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data = statuses(conn, user_id, as_of(sub)?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                println!("{}", status_table(conn, &data)?);
            }
        }
        Some(("status", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let id = *sub.get_one::<i64>("id").unwrap();
            let s = status(conn, user_id, id, as_of(sub)?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &s)? {
                println!("{}", status_table(conn, std::slice::from_ref(&s))?);
            }
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = BudgetPatch {
                category_id: sub
                    .get_one::<String>("category")
                    .map(|s| categories::resolve(conn, s))
                    .transpose()?,
                amount: sub.get_one::<String>("amount").map(|s| parse_decimal(s)).transpose()?,
                currency: sub.get_one::<String>("currency").map(|s| s.trim().to_uppercase()),
                period: match sub.get_one::<String>("period") {
                    Some(s) => Some(s.parse().map_err(anyhow::Error::msg)?),
                    None => None,
                },
                start_date: sub.get_one::<String>("start").map(|s| parse_date(s)).transpose()?,
            };
            let b = update(conn, user_id, id, &patch)?;
            println!("Updated budget #{}", b.id);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, user_id, id)?;
            println!("Removed budget #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn status_table(conn: &Connection, data: &[BudgetStatus]) -> Result<comfy_table::Table> {
    let mut rows = Vec::new();
    for s in data {
        let cat = categories::get(conn, s.budget.category_id)?;
        rows.push(vec![
            s.budget.id.to_string(),
            cat.name,
            s.budget.period.to_string(),
            format!("{} .. {}", s.window_start, s.window_end.pred_opt().unwrap_or(s.window_end)),
            format!("{:.2} {}", s.budget.amount, s.budget.currency),
            format!("{:.2}", s.spent),
            format!("{:.2}", s.remaining),
            s.percentage.map(|p| format!("{}%", p)).unwrap_or_else(|| "-".into()),
            if s.over_budget { "OVER".into() } else { String::new() },
        ]);
    }
    Ok(pretty_table(
        &["ID", "Category", "Period", "Window", "Limit", "Spent", "Remaining", "Used", ""],
        rows,
    ))
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Budget> {
    Ok(Budget {
        id: r.get(0)?,
        category_id: r.get(1)?,
        amount: decimal_at(r, 2)?,
        currency: r.get(3)?,
        period: r.get(4)?,
        start_date: r.get(5)?,
    })
}

pub fn create(conn: &Connection, user_id: i64, input: &NewBudget) -> Result<Budget> {
    input.validate()?;
    currencies::ensure_known(conn, &input.currency)?;
    categories::get(conn, input.category_id)?;
    conn.execute(
        "INSERT INTO budgets(user_id, category_id, amount, currency, period, start_date)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            user_id,
            input.category_id,
            input.amount.to_string(),
            input.currency,
            input.period,
            input.start_date
        ],
    )?;
    get(conn, user_id, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Budget> {
    conn.query_row(
        "SELECT id, category_id, amount, currency, period, start_date FROM budgets
         WHERE id=?1 AND user_id=?2",
        params![id, user_id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| BudgetError::not_found("budget", id))
}

pub fn list(conn: &Connection, user_id: i64) -> Result<Vec<Budget>> {
    let mut stmt = conn.prepare(
        "SELECT id, category_id, amount, currency, period, start_date FROM budgets
         WHERE user_id=?1 ORDER BY id",
    )?;
    let rows = stmt.query_map(params![user_id], from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn update(conn: &Connection, user_id: i64, id: i64, patch: &BudgetPatch) -> Result<Budget> {
    patch.validate()?;
    if let Some(ccy) = &patch.currency {
        currencies::ensure_known(conn, ccy)?;
    }
    let mut b = get(conn, user_id, id)?;
    if let Some(cat) = patch.category_id {
        categories::get(conn, cat)?;
        b.category_id = cat;
    }
    if let Some(amount) = patch.amount {
        b.amount = amount;
    }
    if let Some(ccy) = &patch.currency {
        b.currency = ccy.clone();
    }
    if let Some(period) = patch.period {
        b.period = period;
    }
    if let Some(start) = patch.start_date {
        b.start_date = start;
    }
    conn.execute(
        "UPDATE budgets SET category_id=?3, amount=?4, currency=?5, period=?6, start_date=?7
         WHERE id=?1 AND user_id=?2",
        params![
            id,
            user_id,
            b.category_id,
            b.amount.to_string(),
            b.currency,
            b.period,
            b.start_date
        ],
    )?;
    Ok(b)
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM budgets WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(BudgetError::not_found("budget", id));
    }
    Ok(())
}

fn status_with(
    conn: &Connection,
    user_id: i64,
    budget: &Budget,
    as_of: NaiveDate,
    rates: &RateTable,
) -> Result<BudgetStatus> {
    let (from, to) = period_window(budget.start_date, budget.period, as_of)?;
    let txs = transactions::all_between(conn, user_id, Some(from), to.pred_opt())?;
    budget_status(budget, as_of, &txs, rates)
}

/// Spend is read from the ledger each time; budgets store no running total.
pub fn status(conn: &Connection, user_id: i64, id: i64, as_of: NaiveDate) -> Result<BudgetStatus> {
    let budget = get(conn, user_id, id)?;
    let rates = RateTable::load(conn)?;
    status_with(conn, user_id, &budget, as_of, &rates)
}

pub fn statuses(conn: &Connection, user_id: i64, as_of: NaiveDate) -> Result<Vec<BudgetStatus>> {
    let rates = RateTable::load(conn)?;
    list(conn, user_id)?
        .iter()
        .map(|b| status_with(conn, user_id, b, as_of, &rates))
        .collect()
}
