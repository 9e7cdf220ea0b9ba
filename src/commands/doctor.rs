// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use crate::models::Frequency;
use crate::progress::progress_of;
use crate::schedule::is_on_schedule;
use crate::utils::{decimal_at, pretty_table};
use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub kind: &'static str,
    pub detail: String,
}

pub fn handle(conn: &Connection) -> anyhow::Result<()> {
    let issues = check(conn)?;
    if issues.is_empty() {
        println!("doctor: no issues found");
    } else {
        let rows = issues
            .into_iter()
            .map(|i| vec![i.kind.to_string(), i.detail])
            .collect();
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// Checks across all users for states the schema cannot rule out.
pub fn check(conn: &Connection) -> Result<Vec<Issue>> {
    let mut issues = Vec::new();

    // 1) Goal completion flag out of step with its amounts
    let mut stmt =
        conn.prepare("SELECT id, target_amount, current_amount, is_completed FROM goals ORDER BY id")?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            decimal_at(r, 1)?,
            decimal_at(r, 2)?,
            r.get::<_, bool>(3)?,
        ))
    })?;
    for row in rows {
        let (id, target, current, stored) = row?;
        if progress_of(current, target).is_completed != stored {
            issues.push(Issue {
                kind: "goal_completion_mismatch",
                detail: format!("goal {} stored is_completed={} for {}/{}", id, stored, current, target),
            });
        }
    }

    // 2) Active templates whose next due date is off their schedule
    let mut stmt = conn.prepare(
        "SELECT id, frequency, start_date, next_due_date FROM recurring_transactions
         WHERE is_active = 1 ORDER BY id",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok((
            r.get::<_, i64>(0)?,
            r.get::<_, Frequency>(1)?,
            r.get::<_, NaiveDate>(2)?,
            r.get::<_, NaiveDate>(3)?,
        ))
    })?;
    for row in rows {
        let (id, freq, start, next) = row?;
        if next <= start || !is_on_schedule(start, freq, next)? {
            issues.push(Issue {
                kind: "recurring_off_schedule",
                detail: format!("recurring {} next due {} is not a {} step from {}", id, next, freq, start),
            });
        }
    }

    // 3) Currencies used but absent from the reference table
    let mut stmt = conn.prepare(
        "SELECT src, currency FROM (
            SELECT 'transactions' AS src, currency FROM transactions
            UNION SELECT 'recurring', currency FROM recurring_transactions
            UNION SELECT 'budgets', currency FROM budgets
            UNION SELECT 'goals', currency FROM goals
         )
         WHERE currency NOT IN (SELECT code FROM currencies)
         ORDER BY src, currency",
    )?;
    let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    for row in rows {
        let (table, code) = row?;
        issues.push(Issue {
            kind: "unknown_currency",
            detail: format!("{} uses {}", table, code),
        });
    }

    tracing::debug!(count = issues.len(), "doctor finished");
    Ok(issues)
}
