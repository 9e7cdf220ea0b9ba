// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Deterministic demo data. The same builder backs `pennywise seed` and the
//! integration tests.

use chrono::{Datelike, Days, Months, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::commands::{budgets, categories, goals, recurring, reminders, transactions};
use crate::error::{BudgetError, Result};
use crate::models::{
    BudgetPeriod, Frequency, NewBudget, NewCategory, NewGoal, NewRecurring, NewReminder,
    NewTransaction, TxType,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SeedCategory {
    pub name: &'static str,
    pub r#type: TxType,
    pub icon: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedTransaction {
    pub category: &'static str,
    pub r#type: TxType,
    pub amount: Decimal,
    pub description: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedRecurring {
    pub category: &'static str,
    pub r#type: TxType,
    pub amount: Decimal,
    pub description: &'static str,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedBudget {
    pub category: &'static str,
    pub amount: Decimal,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedGoal {
    pub name: &'static str,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeedReminder {
    pub title: &'static str,
    pub category: &'static str,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub frequency: Option<Frequency>,
    pub notify_before: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub currency: String,
    pub categories: Vec<SeedCategory>,
    pub transactions: Vec<SeedTransaction>,
    pub recurring: Vec<SeedRecurring>,
    pub budgets: Vec<SeedBudget>,
    pub goals: Vec<SeedGoal>,
    pub reminders: Vec<SeedReminder>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedReport {
    pub categories: usize,
    pub transactions: usize,
    pub recurring: usize,
    pub budgets: usize,
    pub goals: usize,
    pub reminders: usize,
}

const CATEGORIES: &[SeedCategory] = &[
    SeedCategory { name: "Salary", r#type: TxType::Income, icon: "briefcase", color: "#2E7D32" },
    SeedCategory { name: "Freelance", r#type: TxType::Income, icon: "laptop", color: "#00897B" },
    SeedCategory { name: "Rent", r#type: TxType::Expense, icon: "home", color: "#6D4C41" },
    SeedCategory { name: "Groceries", r#type: TxType::Expense, icon: "cart", color: "#F9A825" },
    SeedCategory { name: "Dining", r#type: TxType::Expense, icon: "utensils", color: "#E64A19" },
    SeedCategory { name: "Transport", r#type: TxType::Expense, icon: "bus", color: "#1565C0" },
    SeedCategory { name: "Utilities", r#type: TxType::Expense, icon: "bolt", color: "#546E7A" },
    SeedCategory { name: "Subscriptions", r#type: TxType::Expense, icon: "tv", color: "#8E24AA" },
];

/// Cents to a two-place decimal.
fn money(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

fn range_error() -> BudgetError {
    BudgetError::invalid("seed date range out of bounds")
}

fn day_of(month: NaiveDate, day: u32) -> Option<NaiveDate> {
    month.with_day(day)
}

/// Build `months` months of activity ending at `as_of`. Amounts vary by month
/// index so reports have some shape, but nothing is random: equal inputs give
/// equal fixtures.
pub fn demo_fixture(as_of: NaiveDate, months: u32) -> Result<Fixture> {
    if months == 0 {
        return Err(BudgetError::invalid("months must be at least 1"));
    }
    let this_month = as_of.with_day(1).ok_or_else(range_error)?;
    let first_month = this_month
        .checked_sub_months(Months::new(months - 1))
        .ok_or_else(range_error)?;

    let mut txs = Vec::new();
    for i in 0..months {
        let month = first_month
            .checked_add_months(Months::new(i))
            .ok_or_else(range_error)?;
        let step = i64::from(i);
        let label = month.format("%B").to_string();
        let mut push = |day: u32,
                        category: &'static str,
                        r#type: TxType,
                        cents: i64,
                        description: String,
                        tags: &[&str]| {
            if let Some(date) = day_of(month, day).filter(|d| *d <= as_of) {
                txs.push(SeedTransaction {
                    category,
                    r#type,
                    amount: money(cents),
                    description,
                    date,
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                });
            }
        };
        push(1, "Salary", TxType::Income, 420_000, format!("{} salary", label), &["work"]);
        push(1, "Rent", TxType::Expense, 145_000, format!("{} rent", label), &["home"]);
        for (week, day) in [4u32, 11, 18, 25].into_iter().enumerate() {
            let cents = 6_240 + step * 315 + week as i64 * 870;
            push(day, "Groceries", TxType::Expense, cents, "Weekly groceries".into(), &["food"]);
        }
        push(9, "Dining", TxType::Expense, 3_850 + step * 500, "Dinner out".into(), &["food", "social"]);
        push(21, "Dining", TxType::Expense, 1_475, "Lunch with team".into(), &["food", "work"]);
        push(6, "Transport", TxType::Expense, 4_500, "Transit pass top-up".into(), &["commute"]);
        push(15, "Utilities", TxType::Expense, 8_900 + step * 120, "Electricity".into(), &["home"]);
        if i % 2 == 1 {
            push(20, "Freelance", TxType::Income, 60_000, "Design contract".into(), &["side"]);
        }
    }

    let recurring = vec![
        SeedRecurring {
            category: "Subscriptions",
            r#type: TxType::Expense,
            amount: money(1_599),
            description: "Streaming service",
            frequency: Frequency::Monthly,
            start_date: as_of,
        },
        SeedRecurring {
            category: "Transport",
            r#type: TxType::Expense,
            amount: money(1_200),
            description: "Bike share",
            frequency: Frequency::Weekly,
            start_date: as_of,
        },
    ];

    let budgets = vec![
        SeedBudget { category: "Groceries", amount: money(40_000), period: BudgetPeriod::Monthly, start_date: first_month },
        SeedBudget { category: "Dining", amount: money(8_000), period: BudgetPeriod::Monthly, start_date: first_month },
        SeedBudget { category: "Utilities", amount: money(30_000), period: BudgetPeriod::Quarterly, start_date: first_month },
    ];

    let in_days = |n: u64| as_of.checked_add_days(Days::new(n)).ok_or_else(range_error);
    let goals = vec![
        SeedGoal {
            name: "Emergency fund",
            target_amount: money(1_000_000),
            current_amount: money(250_000 + i64::from(months) * 25_000),
            deadline: in_days(365)?,
        },
        SeedGoal {
            name: "Summer trip",
            target_amount: money(300_000),
            current_amount: money(300_000),
            deadline: in_days(120)?,
        },
    ];

    let reminders = vec![
        SeedReminder {
            title: "Electricity bill",
            category: "Utilities",
            amount: money(9_500),
            due_date: in_days(5)?,
            frequency: Some(Frequency::Monthly),
            notify_before: 3,
        },
        SeedReminder {
            title: "Renew transit card",
            category: "Transport",
            amount: money(2_000),
            due_date: as_of.checked_sub_days(Days::new(2)).ok_or_else(range_error)?,
            frequency: None,
            notify_before: 0,
        },
        SeedReminder {
            title: "Streaming annual plan",
            category: "Subscriptions",
            amount: money(15_900),
            due_date: in_days(40)?,
            frequency: Some(Frequency::Yearly),
            notify_before: 14,
        },
    ];

    Ok(Fixture {
        currency: "USD".into(),
        categories: CATEGORIES.to_vec(),
        transactions: txs,
        recurring,
        budgets,
        goals,
        reminders,
    })
}

/// Write a fixture for `user_id` in one database transaction. Categories that
/// already exist (by name) are reused.
pub fn apply(conn: &mut Connection, user_id: i64, fixture: &Fixture) -> Result<SeedReport> {
    let tx = conn.transaction()?;
    let mut report = SeedReport::default();

    for c in &fixture.categories {
        if categories::find_by_name(&tx, c.name)?.is_none() {
            categories::create(
                &tx,
                &NewCategory {
                    name: c.name.into(),
                    r#type: c.r#type,
                    icon: c.icon.into(),
                    color: c.color.into(),
                },
            )?;
            report.categories += 1;
        }
    }
    let cat = |name: &str| categories::resolve(&tx, name);

    for t in &fixture.transactions {
        let input = NewTransaction {
            r#type: t.r#type,
            amount: t.amount,
            currency: fixture.currency.clone(),
            category_id: cat(t.category)?,
            description: t.description.clone(),
            date: t.date,
            tags: t.tags.clone(),
        };
        transactions::create(&tx, user_id, &input)?;
        report.transactions += 1;
    }
    for r in &fixture.recurring {
        let input = NewRecurring {
            r#type: r.r#type,
            amount: r.amount,
            currency: fixture.currency.clone(),
            category_id: cat(r.category)?,
            description: r.description.into(),
            frequency: r.frequency,
            start_date: r.start_date,
            end_date: None,
        };
        recurring::create(&tx, user_id, &input)?;
        report.recurring += 1;
    }
    for b in &fixture.budgets {
        let input = NewBudget {
            category_id: cat(b.category)?,
            amount: b.amount,
            currency: fixture.currency.clone(),
            period: b.period,
            start_date: b.start_date,
        };
        budgets::create(&tx, user_id, &input)?;
        report.budgets += 1;
    }
    for g in &fixture.goals {
        let input = NewGoal {
            name: g.name.into(),
            target_amount: g.target_amount,
            current_amount: g.current_amount,
            currency: fixture.currency.clone(),
            deadline: g.deadline,
        };
        goals::create(&tx, user_id, &input)?;
        report.goals += 1;
    }
    for r in &fixture.reminders {
        let input = NewReminder {
            title: r.title.into(),
            amount: r.amount,
            due_date: r.due_date,
            category_id: cat(r.category)?,
            frequency: r.frequency,
            notify_before: r.notify_before,
        };
        reminders::create(&tx, user_id, &input)?;
        report.reminders += 1;
    }

    tx.commit()?;
    tracing::info!(user = user_id, ?report, "demo data seeded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fixture_is_deterministic() {
        let a = demo_fixture(d(2025, 6, 15), 3).unwrap();
        let b = demo_fixture(d(2025, 6, 15), 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn nothing_is_dated_after_as_of() {
        let as_of = d(2025, 6, 15);
        let f = demo_fixture(as_of, 4).unwrap();
        assert!(f.transactions.iter().all(|t| t.date <= as_of));
        assert!(f.transactions.iter().any(|t| t.date < d(2025, 4, 1)));
    }

    #[test]
    fn zero_months_is_rejected() {
        assert!(demo_fixture(d(2025, 6, 15), 0).is_err());
    }
}
