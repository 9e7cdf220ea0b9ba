// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{categories, currencies, settings};
use crate::error::{BudgetError, Result};
use crate::models::{NewTransaction, Transaction, TransactionPatch, TxType};
use crate::paging::{Page, PageRequest};
use crate::utils::{
    decimal_at, maybe_print_json, output_flags, parse_date, parse_decimal, parse_tags,
    pretty_table, tags_at, today,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use validator::Validate;

const COLUMNS: &str =
    "t.id, t.type, t.amount, t.currency, t.category_id, t.description, t.date, t.is_recurring, t.recurring_id, t.tags";

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, user_id, sub)?,
        Some(("list", sub)) => list_cmd(conn, user_id, sub)?,
        Some(("show", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let t = get(conn, user_id, *sub.get_one::<i64>("id").unwrap())?;
            if !maybe_print_json(json_flag, jsonl_flag, &t)? {
                let fmt = settings::get(conn, user_id)?.date_format;
                println!("{}", table(std::slice::from_ref(&t), &fmt));
            }
        }
        Some(("edit", sub)) => edit(conn, user_id, sub)?,
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, user_id, id)?;
            println!("Removed transaction #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn add(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> anyhow::Result<()> {
    let currency = match sub.get_one::<String>("currency") {
        Some(c) => c.trim().to_uppercase(),
        None => settings::get(conn, user_id)?.default_currency,
    };
    let date = match sub.get_one::<String>("date") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let input = NewTransaction {
        r#type: sub.get_one::<String>("type").unwrap().parse().map_err(anyhow::Error::msg)?,
        amount: parse_decimal(sub.get_one::<String>("amount").unwrap())?,
        currency,
        category_id: categories::resolve(conn, sub.get_one::<String>("category").unwrap())?,
        description: sub.get_one::<String>("description").unwrap().trim().to_string(),
        date,
        tags: sub.get_one::<String>("tags").map(|s| parse_tags(s)).unwrap_or_default(),
    };
    let t = create(conn, user_id, &input)?;
    println!(
        "Recorded {} {} {} on {} (#{})",
        t.r#type, t.amount, t.currency, t.date, t.id
    );
    Ok(())
}

fn edit(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> anyhow::Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    let patch = TransactionPatch {
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
        date: sub.get_one::<String>("date").map(|s| parse_date(s)).transpose()?,
        tags: sub.get_one::<String>("tags").map(|s| parse_tags(s)),
    };
    let t = update(conn, user_id, id, &patch)?;
    println!("Updated transaction #{}", t.id);
    Ok(())
}

fn list_cmd(conn: &Connection, user_id: i64, sub: &clap::ArgMatches) -> anyhow::Result<()> {
    let (json_flag, jsonl_flag) = output_flags(sub);
    let filter = TxFilter {
        r#type: match sub.get_one::<String>("type") {
            Some(s) => Some(s.parse().map_err(anyhow::Error::msg)?),
            None => None,
        },
        category_id: sub
            .get_one::<String>("category")
            .map(|s| categories::resolve(conn, s))
            .transpose()?,
        search: sub.get_one::<String>("search").cloned(),
        from: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        to: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
    };
    let req = PageRequest::new(
        *sub.get_one::<u32>("page").unwrap(),
        *sub.get_one::<u32>("page_size").unwrap(),
    )?;
    let page = list(conn, user_id, &filter, req)?;
    if jsonl_flag {
        maybe_print_json(false, true, &page.data)?;
    } else if !maybe_print_json(json_flag, false, &page)? {
        let fmt = settings::get(conn, user_id)?.date_format;
        println!("{}", table(&page.data, &fmt));
        let p = page.pagination;
        println!(
            "Page {} of {} ({} transactions)",
            p.page,
            p.total_pages.max(1),
            p.total
        );
    }
    Ok(())
}

fn table(data: &[Transaction], date_format: &str) -> comfy_table::Table {
    let rows = data
        .iter()
        .map(|t| {
            vec![
                t.id.to_string(),
                t.date.format(date_format).to_string(),
                t.r#type.to_string(),
                format!("{:.2}", t.amount),
                t.currency.clone(),
                t.category_id.to_string(),
                t.description.clone(),
                t.tags.join(","),
                if t.is_recurring { "yes".into() } else { String::new() },
            ]
        })
        .collect();
    pretty_table(
        &[
            "ID", "Date", "Type", "Amount", "CCY", "Category", "Description", "Tags", "Recurring",
        ],
        rows,
    )
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Transaction> {
    Ok(Transaction {
        id: r.get(0)?,
        r#type: r.get(1)?,
        amount: decimal_at(r, 2)?,
        currency: r.get(3)?,
        category_id: r.get(4)?,
        description: r.get(5)?,
        date: r.get(6)?,
        is_recurring: r.get(7)?,
        recurring_id: r.get(8)?,
        tags: tags_at(r, 9)?,
    })
}

pub fn create(conn: &Connection, user_id: i64, input: &NewTransaction) -> Result<Transaction> {
    insert(conn, user_id, input, None)
}

/// Shared by manual entry and recurring materialization.
pub(crate) fn insert(
    conn: &Connection,
    user_id: i64,
    input: &NewTransaction,
    recurring_id: Option<i64>,
) -> Result<Transaction> {
    input.validate()?;
    currencies::ensure_known(conn, &input.currency)?;
    categories::get(conn, input.category_id)?;
    conn.execute(
        "INSERT INTO transactions(user_id, type, amount, currency, category_id, description, date, is_recurring, recurring_id, tags)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            user_id,
            input.r#type,
            input.amount.to_string(),
            input.currency,
            input.category_id,
            input.description,
            input.date,
            recurring_id.is_some(),
            recurring_id,
            serde_json::to_string(&input.tags)?,
        ],
    )?;
    let id = conn.last_insert_rowid();
    tracing::debug!(user = user_id, id, recurring = ?recurring_id, "transaction recorded");
    get(conn, user_id, id)
}

pub fn get(conn: &Connection, user_id: i64, id: i64) -> Result<Transaction> {
    let sql = format!(
        "SELECT {} FROM transactions t WHERE t.id=?1 AND t.user_id=?2",
        COLUMNS
    );
    conn.query_row(&sql, params![id, user_id], from_row)
        .optional()?
        .ok_or_else(|| BudgetError::not_found("transaction", id))
}

#[derive(Debug, Clone, Default)]
pub struct TxFilter {
    pub r#type: Option<TxType>,
    pub category_id: Option<i64>,
    /// Case-insensitive substring over description and tags.
    pub search: Option<String>,
    pub from: Option<NaiveDate>,
    /// Inclusive.
    pub to: Option<NaiveDate>,
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('%');
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('%');
    out
}

fn where_clause(user_id: i64, f: &TxFilter) -> (String, Vec<Value>) {
    let mut sql = String::from(" WHERE t.user_id=?");
    let mut vals: Vec<Value> = vec![Value::Integer(user_id)];
    if let Some(kind) = f.r#type {
        sql.push_str(" AND t.type=?");
        vals.push(Value::Text(kind.as_str().to_string()));
    }
    if let Some(cat) = f.category_id {
        sql.push_str(" AND t.category_id=?");
        vals.push(Value::Integer(cat));
    }
    if let Some(term) = f.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(
            " AND (t.description LIKE ? ESCAPE '\\'
              OR EXISTS (SELECT 1 FROM json_each(t.tags) WHERE value LIKE ? ESCAPE '\\'))",
        );
        let pat = escape_like(term);
        vals.push(Value::Text(pat.clone()));
        vals.push(Value::Text(pat));
    }
    if let Some(from) = f.from {
        sql.push_str(" AND t.date>=?");
        vals.push(Value::Text(from.to_string()));
    }
    if let Some(to) = f.to {
        sql.push_str(" AND t.date<=?");
        vals.push(Value::Text(to.to_string()));
    }
    (sql, vals)
}

pub fn list(
    conn: &Connection,
    user_id: i64,
    filter: &TxFilter,
    req: PageRequest,
) -> Result<Page<Transaction>> {
    let (clause, mut vals) = where_clause(user_id, filter);
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) FROM transactions t{}", clause),
        params_from_iter(vals.iter()),
        |r| r.get(0),
    )?;

    let sql = format!(
        "SELECT {} FROM transactions t{} ORDER BY t.date DESC, t.id DESC LIMIT ? OFFSET ?",
        COLUMNS, clause
    );
    vals.push(Value::Integer(i64::from(req.page_size)));
    vals.push(Value::Integer(req.offset() as i64));
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(vals.iter()), from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(Page::new(data, req, total as u64))
}

/// Every transaction of the user in `[from, to]`, oldest first.
pub fn all_between(
    conn: &Connection,
    user_id: i64,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<Vec<Transaction>> {
    let filter = TxFilter {
        from,
        to,
        ..TxFilter::default()
    };
    let (clause, vals) = where_clause(user_id, &filter);
    let sql = format!(
        "SELECT {} FROM transactions t{} ORDER BY t.date, t.id",
        COLUMNS, clause
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_from_iter(vals.iter()), from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

pub fn update(
    conn: &Connection,
    user_id: i64,
    id: i64,
    patch: &TransactionPatch,
) -> Result<Transaction> {
    patch.validate()?;
    if let Some(ccy) = &patch.currency {
        currencies::ensure_known(conn, ccy)?;
    }
    let mut t = get(conn, user_id, id)?;
    if let Some(kind) = patch.r#type {
        t.r#type = kind;
    }
    if let Some(amount) = patch.amount {
        t.amount = amount;
    }
    if let Some(ccy) = &patch.currency {
        t.currency = ccy.clone();
    }
    if let Some(cat) = patch.category_id {
        categories::get(conn, cat)?;
        t.category_id = cat;
    }
    if let Some(desc) = &patch.description {
        t.description = desc.clone();
    }
    if let Some(date) = patch.date {
        t.date = date;
    }
    if let Some(tags) = &patch.tags {
        t.tags = tags.clone();
    }
    conn.execute(
        "UPDATE transactions SET type=?3, amount=?4, currency=?5, category_id=?6, description=?7, date=?8, tags=?9
         WHERE id=?1 AND user_id=?2",
        params![
            id,
            user_id,
            t.r#type,
            t.amount.to_string(),
            t.currency,
            t.category_id,
            t.description,
            t.date,
            serde_json::to_string(&t.tags)?,
        ],
    )?;
    Ok(t)
}

pub fn delete(conn: &Connection, user_id: i64, id: i64) -> Result<()> {
    let n = conn.execute(
        "DELETE FROM transactions WHERE id=?1 AND user_id=?2",
        params![id, user_id],
    )?;
    if n == 0 {
        return Err(BudgetError::not_found("transaction", id));
    }
    Ok(())
}
