// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{BudgetError, Result};
use crate::models::{Category, CategoryPatch, NewCategory, TxType};
use crate::utils::{maybe_print_json, output_flags, pretty_table};
use rusqlite::{params, Connection, OptionalExtension, Row};
use validator::Validate;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewCategory {
                name: sub.get_one::<String>("name").unwrap().trim().to_string(),
                r#type: sub.get_one::<String>("type").unwrap().parse().map_err(anyhow::Error::msg)?,
                icon: sub.get_one::<String>("icon").unwrap().to_string(),
                color: sub.get_one::<String>("color").unwrap().to_string(),
            };
            let c = create(conn, &input)?;
            println!("Added category '{}' (#{}, {})", c.name, c.id, c.r#type);
        }
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let kind = match sub.get_one::<String>("type") {
                Some(s) => Some(s.parse::<TxType>().map_err(anyhow::Error::msg)?),
                None => None,
            };
            let data = list(conn, kind)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.id.to_string(),
                            c.name.clone(),
                            c.r#type.to_string(),
                            c.icon.clone(),
                            c.color.clone(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["ID", "Category", "Type", "Icon", "Color"], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            let patch = CategoryPatch {
                name: sub.get_one::<String>("name").map(|s| s.trim().to_string()),
                r#type: match sub.get_one::<String>("type") {
                    Some(s) => Some(s.parse().map_err(anyhow::Error::msg)?),
                    None => None,
                },
                icon: sub.get_one::<String>("icon").cloned(),
                color: sub.get_one::<String>("color").cloned(),
            };
            let c = update(conn, id, &patch)?;
            println!("Updated category #{} '{}'", c.id, c.name);
        }
        Some(("rm", sub)) => {
            let id = *sub.get_one::<i64>("id").unwrap();
            delete(conn, id)?;
            println!("Removed category #{}", id);
        }
        _ => {}
    }
    Ok(())
}

fn from_row(r: &Row<'_>) -> rusqlite::Result<Category> {
    Ok(Category {
        id: r.get(0)?,
        name: r.get(1)?,
        r#type: r.get(2)?,
        icon: r.get(3)?,
        color: r.get(4)?,
    })
}

/// Id of the category with this name, ignoring case.
pub fn find_by_name(conn: &Connection, name: &str) -> Result<Option<i64>> {
    let id = conn
        .query_row(
            "SELECT id FROM categories WHERE name=?1 COLLATE NOCASE",
            params![name],
            |r| r.get(0),
        )
        .optional()?;
    Ok(id)
}

pub fn create(conn: &Connection, input: &NewCategory) -> Result<Category> {
    input.validate()?;
    if find_by_name(conn, &input.name)?.is_some() {
        return Err(BudgetError::Conflict(format!(
            "category '{}' already exists",
            input.name
        )));
    }
    conn.execute(
        "INSERT INTO categories(name, type, icon, color) VALUES (?1, ?2, ?3, ?4)",
        params![input.name, input.r#type, input.icon, input.color],
    )?;
    get(conn, conn.last_insert_rowid())
}

pub fn get(conn: &Connection, id: i64) -> Result<Category> {
    conn.query_row(
        "SELECT id, name, type, icon, color FROM categories WHERE id=?1",
        params![id],
        from_row,
    )
    .optional()?
    .ok_or_else(|| BudgetError::not_found("category", id))
}

pub fn list(conn: &Connection, kind: Option<TxType>) -> Result<Vec<Category>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, type, icon, color FROM categories
         WHERE ?1 IS NULL OR type=?1 ORDER BY name",
    )?;
    let rows = stmt.query_map(params![kind], from_row)?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Accepts a numeric id or a case-insensitive name.
pub fn resolve(conn: &Connection, raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if let Ok(id) = raw.parse::<i64>() {
        return get(conn, id).map(|c| c.id);
    }
    find_by_name(conn, raw)?
        .ok_or_else(|| BudgetError::invalid(format!("category '{}' not found", raw)))
}

pub fn update(conn: &Connection, id: i64, patch: &CategoryPatch) -> Result<Category> {
    patch.validate()?;
    let mut c = get(conn, id)?;
    if let Some(name) = &patch.name {
        if find_by_name(conn, name)?.is_some_and(|other| other != id) {
            return Err(BudgetError::Conflict(format!(
                "category '{}' already exists",
                name
            )));
        }
        c.name = name.clone();
    }
    if let Some(kind) = patch.r#type {
        c.r#type = kind;
    }
    if let Some(icon) = &patch.icon {
        c.icon = icon.clone();
    }
    if let Some(color) = &patch.color {
        c.color = color.clone();
    }
    conn.execute(
        "UPDATE categories SET name=?2, type=?3, icon=?4, color=?5 WHERE id=?1",
        params![c.id, c.name, c.r#type, c.icon, c.color],
    )?;
    Ok(c)
}

/// Deletion is refused while anything still references the category.
pub fn delete(conn: &Connection, id: i64) -> Result<()> {
    let c = get(conn, id)?;
    let refs: i64 = conn.query_row(
        "SELECT (SELECT COUNT(*) FROM transactions WHERE category_id=?1)
              + (SELECT COUNT(*) FROM recurring_transactions WHERE category_id=?1)
              + (SELECT COUNT(*) FROM budgets WHERE category_id=?1)
              + (SELECT COUNT(*) FROM reminders WHERE category_id=?1)",
        params![id],
        |r| r.get(0),
    )?;
    if refs > 0 {
        return Err(BudgetError::Conflict(format!(
            "category '{}' is referenced by {} record(s)",
            c.name, refs
        )));
    }
    conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    tracing::info!(category = id, "category deleted");
    Ok(())
}
