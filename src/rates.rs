// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use rusqlite::Connection;
use rust_decimal::Decimal;

use crate::error::{BudgetError, Result};
use crate::models::Currency;

/// Conversion rates keyed by currency code, each expressed as units per 1 USD.
#[derive(Debug, Clone, Default)]
pub struct RateTable {
    rates: HashMap<String, Decimal>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rate(mut self, code: &str, rate: Decimal) -> Self {
        self.rates.insert(code.to_uppercase(), rate);
        self
    }

    pub fn from_currencies(currencies: &[Currency]) -> Self {
        let rates = currencies
            .iter()
            .map(|c| (c.code.clone(), c.rate))
            .collect();
        Self { rates }
    }

    pub fn load(conn: &Connection) -> Result<Self> {
        let currencies = crate::commands::currencies::list(conn)?;
        Ok(Self::from_currencies(&currencies))
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rates.contains_key(code)
    }

    fn rate(&self, code: &str) -> Result<Decimal> {
        match self.rates.get(code) {
            Some(r) if !r.is_zero() => Ok(*r),
            Some(_) => Err(BudgetError::invalid(format!("currency {} has a zero rate", code))),
            None => Err(BudgetError::invalid(format!("unknown currency {}", code))),
        }
    }

    /// Convert `amount` from one currency to another through the USD-relative rates.
    pub fn convert(&self, amount: Decimal, from: &str, to: &str) -> Result<Decimal> {
        if from == to {
            return Ok(amount);
        }
        let from_rate = self.rate(from)?;
        let to_rate = self.rate(to)?;
        amount
            .checked_div(from_rate)
            .and_then(|usd| usd.checked_mul(to_rate))
            .ok_or_else(BudgetError::out_of_range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_through_usd() {
        let table = RateTable::new()
            .with_rate("USD", Decimal::ONE)
            .with_rate("EUR", Decimal::new(90, 2))
            .with_rate("INR", Decimal::new(83, 0));
        let inr = table.convert(Decimal::new(90, 0), "EUR", "INR").unwrap();
        assert_eq!(inr.round_dp(2), Decimal::new(830000, 2));
        let usd = table.convert(Decimal::new(166, 0), "INR", "USD").unwrap();
        assert_eq!(usd.round_dp(2), Decimal::new(200, 2));
    }

    #[test]
    fn same_currency_is_identity_even_if_unknown() {
        let table = RateTable::new();
        let v = Decimal::new(1234, 2);
        assert_eq!(table.convert(v, "XYZ", "XYZ").unwrap(), v);
    }

    #[test]
    fn unknown_currency_is_rejected() {
        let table = RateTable::new().with_rate("USD", Decimal::ONE);
        assert!(matches!(
            table.convert(Decimal::ONE, "USD", "GBP"),
            Err(BudgetError::Validation(_))
        ));
    }
}
