// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{BudgetError, Result};
use crate::models::Currency;
use crate::rates::RateTable;
use crate::utils::{decimal_at, http_client, maybe_print_json, output_flags, parse_decimal, pretty_table};
use rusqlite::{params, Connection};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("list", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let data = list(conn)?;
            if !maybe_print_json(json_flag, jsonl_flag, &data)? {
                let rows = data
                    .iter()
                    .map(|c| {
                        vec![
                            c.code.clone(),
                            c.name.clone(),
                            c.symbol.clone(),
                            c.rate.to_string(),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Code", "Name", "Symbol", "Rate (per USD)"], rows)
                );
            }
        }
        Some(("set-rate", sub)) => {
            let code = sub.get_one::<String>("code").unwrap().trim().to_uppercase();
            let rate = parse_decimal(sub.get_one::<String>("rate").unwrap())?;
            set_rate(conn, &code, rate)?;
            println!("{} rate set to {} per USD", code, rate);
        }
        Some(("convert", sub)) => {
            let amount = parse_decimal(sub.get_one::<String>("amount").unwrap())?;
            let from = sub.get_one::<String>("from").unwrap().trim().to_uppercase();
            let to = sub.get_one::<String>("to").unwrap().trim().to_uppercase();
            let res = RateTable::load(conn)?.convert(amount, &from, &to)?;
            println!("{} {} -> {:.4} {}", amount, from, res, to);
        }
        Some(("fetch", _)) => {
            let n = fetch_rates(conn)?;
            println!("Updated {} rate(s) via Frankfurter (ECB).", n);
        }
        _ => {}
    }
    Ok(())
}

pub fn list(conn: &Connection) -> Result<Vec<Currency>> {
    let mut stmt = conn.prepare("SELECT code, name, symbol, rate FROM currencies ORDER BY code")?;
    let rows = stmt.query_map([], |r| {
        Ok(Currency {
            code: r.get(0)?,
            name: r.get(1)?,
            symbol: r.get(2)?,
            rate: decimal_at(r, 3)?,
        })
    })?;
    let mut data = Vec::new();
    for row in rows {
        data.push(row?);
    }
    Ok(data)
}

/// Reject codes missing from the reference table; nothing could convert them later.
pub fn ensure_known(conn: &Connection, code: &str) -> Result<()> {
    let known: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM currencies WHERE code=?1)",
        params![code],
        |r| r.get(0),
    )?;
    if !known {
        return Err(BudgetError::invalid(format!("unknown currency {}", code)));
    }
    Ok(())
}

pub fn set_rate(conn: &Connection, code: &str, rate: Decimal) -> Result<()> {
    if rate <= Decimal::ZERO {
        return Err(BudgetError::invalid("rate must be greater than zero"));
    }
    if code == "USD" && rate != Decimal::ONE {
        return Err(BudgetError::invalid("USD is the reference currency; its rate is 1"));
    }
    let n = conn.execute(
        "UPDATE currencies SET rate=?2 WHERE code=?1",
        params![code, rate.to_string()],
    )?;
    if n == 0 {
        return Err(BudgetError::invalid(format!("unknown currency {}", code)));
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
struct Latest {
    rates: HashMap<String, f64>,
    #[serde(rename = "base")]
    _base: String,
}

/// Rates from a Frankfurter `latest` body, sorted by code. Values that do not
/// fit a decimal are skipped.
fn parse_latest(body: &str) -> Result<Vec<(String, Decimal)>> {
    let latest: Latest = serde_json::from_str(body)?;
    let mut rates: Vec<(String, Decimal)> = latest
        .rates
        .into_iter()
        .filter_map(|(code, rate)| match Decimal::try_from(rate) {
            Ok(rate) => Some((code, rate)),
            Err(_) => {
                tracing::warn!(%code, rate, "skipping unrepresentable rate");
                None
            }
        })
        .collect();
    rates.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(rates)
}

fn fetch_rates(conn: &Connection) -> Result<usize> {
    let targets: Vec<String> = list(conn)?
        .into_iter()
        .map(|c| c.code)
        .filter(|c| c != "USD")
        .collect();
    if targets.is_empty() {
        return Ok(0);
    }
    let url = format!(
        "https://api.frankfurter.dev/v1/latest?base=USD&symbols={}",
        targets.join(",")
    );
    tracing::info!(%url, "fetching exchange rates");
    let body = http_client()?.get(url).send()?.error_for_status()?.text()?;
    let rates = parse_latest(&body)?;
    for (code, rate) in &rates {
        set_rate(conn, code, *rate)?;
    }
    Ok(rates.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_frankfurter_latest() {
        let body = r#"{"amount":1.0,"base":"USD","date":"2025-06-13","rates":{"JPY":144.5,"EUR":0.92}}"#;
        let rates = parse_latest(body).unwrap();
        assert_eq!(
            rates,
            vec![
                ("EUR".to_string(), Decimal::new(92, 2)),
                ("JPY".to_string(), Decimal::new(1445, 1)),
            ]
        );
    }

    #[test]
    fn malformed_body_is_a_json_error() {
        assert!(matches!(parse_latest("{}"), Err(BudgetError::Json(_))));
    }
}
