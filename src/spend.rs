// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Budget spend is derived from the ledger on every read; nothing caches it.

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::error::{BudgetError, Result};
use crate::models::{Budget, Transaction, TxType};
use crate::rates::RateTable;
use crate::schedule::period_window;

/// Sum of expenses in the budget's category inside the window containing `as_of`,
/// converted into the budget's currency.
pub fn recompute_spent(
    budget: &Budget,
    as_of: NaiveDate,
    transactions: &[Transaction],
    rates: &RateTable,
) -> Result<Decimal> {
    let (from, to) = period_window(budget.start_date, budget.period, as_of)?;
    spent_between(budget, from, to, transactions, rates)
}

fn spent_between(
    budget: &Budget,
    from: NaiveDate,
    to: NaiveDate,
    transactions: &[Transaction],
    rates: &RateTable,
) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for t in transactions.iter().filter(|t| {
        t.r#type == TxType::Expense
            && t.category_id == budget.category_id
            && t.date >= from
            && t.date < to
    }) {
        let amount = rates.convert(t.amount.abs(), &t.currency, &budget.currency)?;
        total = total.checked_add(amount).ok_or_else(BudgetError::out_of_range)?;
    }
    Ok(total)
}

#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    pub window_start: NaiveDate,
    pub window_end: NaiveDate, // exclusive
    pub spent: Decimal,
    pub remaining: Decimal,
    /// `None` for a zero limit.
    pub percentage: Option<i64>,
    pub over_budget: bool,
}

pub fn budget_status(
    budget: &Budget,
    as_of: NaiveDate,
    transactions: &[Transaction],
    rates: &RateTable,
) -> Result<BudgetStatus> {
    let (from, to) = period_window(budget.start_date, budget.period, as_of)?;
    let spent = spent_between(budget, from, to, transactions, rates)?;
    let percentage = if budget.amount.is_zero() {
        None
    } else {
        let ratio = spent
            .checked_div(budget.amount)
            .and_then(|r| r.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(BudgetError::out_of_range)?;
        ratio
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    };
    Ok(BudgetStatus {
        budget: budget.clone(),
        window_start: from,
        window_end: to,
        spent: spent.round_dp(2),
        remaining: (budget.amount - spent).round_dp(2),
        percentage,
        over_budget: spent > budget.amount,
    })
}
