// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{categories, settings, transactions};
use crate::error::{BudgetError, Result};
use crate::models::{Transaction, TxType};
use crate::rates::RateTable;
use crate::utils::{as_of, maybe_print_json, output_flags, parse_date, pretty_table};
use chrono::{Datelike, Months, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub currency: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorySpend {
    pub category_id: i64,
    pub category: String,
    pub amount: Decimal,
    /// Share of total expense, rounded to whole percent.
    pub share: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthFlow {
    pub month: String,
    pub income: Decimal,
    pub expense: Decimal,
    pub net: Decimal,
}

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let (from, to) = range(sub)?;
            let s = summary(conn, user_id, from, to)?;
            if !maybe_print_json(json_flag, jsonl_flag, &s)? {
                let rows = vec![vec![
                    format!("{} .. {}", from, to),
                    format!("{:.2}", s.income),
                    format!("{:.2}", s.expense),
                    format!("{:.2}", s.net),
                    s.count.to_string(),
                ]];
                let hdr = format!("Net ({})", s.currency);
                println!(
                    "{}",
                    pretty_table(&["Range", "Income", "Expense", &hdr, "Transactions"], rows)
                );
            }
        }
        Some(("by-category", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let (from, to) = range(sub)?;
            let data = by_category(conn, user_id, from, to)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let ccy = settings::get(conn, user_id)?.default_currency;
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.category.clone(),
                            format!("{:.2}", c.amount),
                            format!("{}%", c.share),
                        ]
                    })
                    .collect();
                let hdr = format!("Spent ({})", ccy);
                println!("{}", pretty_table(&["Category", &hdr, "Share"], rows));
            }
        }
        Some(("cashflow", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let months = *sub.get_one::<u32>("months").unwrap();
            let data = cashflow(conn, user_id, months, as_of(sub)?)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|f| {
                        vec![
                            f.month.clone(),
                            format!("{:.2}", f.income),
                            format!("{:.2}", f.expense),
                            format!("{:.2}", f.net),
                        ]
                    })
                    .collect();
                println!("{}", pretty_table(&["Month", "Income", "Expense", "Net"], rows));
            }
        }
        _ => {}
    }
    Ok(())
}

fn range(sub: &clap::ArgMatches) -> anyhow::Result<(NaiveDate, NaiveDate)> {
    let from = parse_date(sub.get_one::<String>("from").unwrap())?;
    let to = parse_date(sub.get_one::<String>("to").unwrap())?;
    if to < from {
        anyhow::bail!("--to {} is before --from {}", to, from);
    }
    Ok((from, to))
}

/// Transactions in the inclusive range, with amounts converted into the user's
/// default currency.
fn converted(
    conn: &Connection,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<(String, Vec<(Transaction, Decimal)>)> {
    let ccy = settings::get(conn, user_id)?.default_currency;
    let rates = RateTable::load(conn)?;
    let mut out = Vec::new();
    for t in transactions::all_between(conn, user_id, Some(from), Some(to))? {
        let amount = rates.convert(t.amount.abs(), &t.currency, &ccy)?;
        out.push((t, amount));
    }
    Ok((ccy, out))
}

pub fn summary(conn: &Connection, user_id: i64, from: NaiveDate, to: NaiveDate) -> Result<Summary> {
    let (currency, rows) = converted(conn, user_id, from, to)?;
    let mut income = Decimal::ZERO;
    let mut expense = Decimal::ZERO;
    for (t, amount) in &rows {
        let total = match t.r#type {
            TxType::Income => &mut income,
            TxType::Expense => &mut expense,
        };
        *total = total.checked_add(*amount).ok_or_else(BudgetError::out_of_range)?;
    }
    Ok(Summary {
        currency,
        income: income.round_dp(2),
        expense: expense.round_dp(2),
        net: (income - expense).round_dp(2),
        count: rows.len(),
    })
}

/// Expense per category, largest first.
pub fn by_category(
    conn: &Connection,
    user_id: i64,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<CategorySpend>> {
    let (_, rows) = converted(conn, user_id, from, to)?;
    let mut agg: HashMap<i64, Decimal> = HashMap::new();
    let mut total = Decimal::ZERO;
    for (t, amount) in rows.iter().filter(|(t, _)| t.r#type == TxType::Expense) {
        let entry = agg.entry(t.category_id).or_insert(Decimal::ZERO);
        *entry = entry.checked_add(*amount).ok_or_else(BudgetError::out_of_range)?;
        total = total.checked_add(*amount).ok_or_else(BudgetError::out_of_range)?;
    }
    let names: HashMap<i64, String> = categories::list(conn, None)?
        .into_iter()
        .map(|c| (c.id, c.name))
        .collect();
    let mut data: Vec<CategorySpend> = agg
        .into_iter()
        .map(|(id, amount)| CategorySpend {
            category_id: id,
            category: names.get(&id).cloned().unwrap_or_else(|| "(unknown)".into()),
            amount: amount.round_dp(2),
            share: share_of(amount, total),
        })
        .collect();
    data.sort_by(|a, b| b.amount.cmp(&a.amount).then(a.category.cmp(&b.category)));
    Ok(data)
}

fn share_of(part: Decimal, total: Decimal) -> i64 {
    if total.is_zero() {
        return 0;
    }
    use rust_decimal::prelude::ToPrimitive;
    part.checked_div(total)
        .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
        .and_then(|s| s.round().to_i64())
        .unwrap_or(0)
}

/// Monthly income and expense for the `months` calendar months ending with the
/// month of `as_of`, oldest first. Empty months are included.
pub fn cashflow(conn: &Connection, user_id: i64, months: u32, as_of: NaiveDate) -> Result<Vec<MonthFlow>> {
    if months == 0 {
        return Err(BudgetError::invalid("months must be at least 1"));
    }
    let this_month = as_of.with_day(1).unwrap_or(as_of);
    let first = this_month
        .checked_sub_months(Months::new(months - 1))
        .ok_or_else(|| BudgetError::invalid("cashflow range out of bounds"))?;
    let last = this_month
        .checked_add_months(Months::new(1))
        .and_then(|d| d.pred_opt())
        .ok_or_else(|| BudgetError::invalid("cashflow range out of bounds"))?;

    let mut map: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    let mut cursor = first;
    while cursor <= this_month {
        map.insert(cursor.format("%Y-%m").to_string(), (Decimal::ZERO, Decimal::ZERO));
        cursor = match cursor.checked_add_months(Months::new(1)) {
            Some(next) => next,
            None => break,
        };
    }

    let (_, rows) = converted(conn, user_id, first, last)?;
    for (t, amount) in rows {
        let entry = map
            .entry(t.date.format("%Y-%m").to_string())
            .or_insert((Decimal::ZERO, Decimal::ZERO));
        let total = match t.r#type {
            TxType::Income => &mut entry.0,
            TxType::Expense => &mut entry.1,
        };
        *total = total.checked_add(amount).ok_or_else(BudgetError::out_of_range)?;
    }
    Ok(map
        .into_iter()
        .map(|(month, (income, expense))| MonthFlow {
            month,
            income: income.round_dp(2),
            expense: expense.round_dp(2),
            net: (income - expense).round_dp(2),
        })
        .collect())
}
