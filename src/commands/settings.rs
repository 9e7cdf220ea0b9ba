// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::currencies;
use crate::error::{BudgetError, Result};
use crate::models::{Settings, SettingsPatch};
use crate::utils::{maybe_print_json, output_flags, pretty_table};
use chrono::format::{Item, StrftimeItems};
use rusqlite::{params, Connection, OptionalExtension};
use validator::Validate;

pub fn handle(conn: &Connection, user_id: i64, m: &clap::ArgMatches) -> anyhow::Result<()> {
    match m.subcommand() {
        Some(("show", sub)) => {
            let (json_flag, jsonl_flag) = output_flags(sub);
            let s = get(conn, user_id)?;
            if !maybe_print_json(json_flag, jsonl_flag, &s)? {
                let rows = vec![
                    vec!["default_currency".into(), s.default_currency.clone()],
                    vec!["theme".into(), s.theme.clone()],
                    vec!["date_format".into(), s.date_format.clone()],
                    vec!["language".into(), s.language.clone()],
                    vec![
                        "notifications_enabled".into(),
                        s.notifications_enabled.to_string(),
                    ],
                ];
                println!("{}", pretty_table(&["Setting", "Value"], rows));
            }
        }
        Some(("set", sub)) => {
            let patch = SettingsPatch {
                default_currency: sub.get_one::<String>("currency").map(|s| s.trim().to_uppercase()),
                theme: sub.get_one::<String>("theme").map(|s| s.trim().to_lowercase()),
                date_format: sub.get_one::<String>("date_format").cloned(),
                language: sub.get_one::<String>("language").map(|s| s.trim().to_string()),
                notifications_enabled: sub.get_one::<bool>("notifications").copied(),
            };
            let s = update(conn, user_id, &patch)?;
            println!(
                "Settings saved (currency {}, theme {}, language {})",
                s.default_currency, s.theme, s.language
            );
        }
        _ => {}
    }
    Ok(())
}

/// A user with no stored row gets the defaults.
pub fn get(conn: &Connection, user_id: i64) -> Result<Settings> {
    let settings = conn
        .query_row(
            "SELECT user_id, default_currency, theme, date_format, language, notifications_enabled
             FROM settings WHERE user_id=?1",
            params![user_id],
            |r| {
                Ok(Settings {
                    user_id: r.get(0)?,
                    default_currency: r.get(1)?,
                    theme: r.get(2)?,
                    date_format: r.get(3)?,
                    language: r.get(4)?,
                    notifications_enabled: r.get(5)?,
                })
            },
        )
        .optional()?;
    Ok(settings.unwrap_or_else(|| Settings::defaults_for(user_id)))
}

pub fn update(conn: &Connection, user_id: i64, patch: &SettingsPatch) -> Result<Settings> {
    patch.validate()?;
    if let Some(ccy) = &patch.default_currency {
        currencies::ensure_known(conn, ccy)?;
    }
    let mut s = get(conn, user_id)?;
    if let Some(ccy) = &patch.default_currency {
        s.default_currency = ccy.clone();
    }
    if let Some(theme) = &patch.theme {
        s.theme = theme.clone();
    }
    if let Some(fmt) = &patch.date_format {
        if StrftimeItems::new(fmt).any(|item| matches!(item, Item::Error)) {
            return Err(BudgetError::invalid(format!("date format '{}' is not valid", fmt)));
        }
        s.date_format = fmt.clone();
    }
    if let Some(lang) = &patch.language {
        s.language = lang.clone();
    }
    if let Some(on) = patch.notifications_enabled {
        s.notifications_enabled = on;
    }
    conn.execute(
        "INSERT INTO settings(user_id, default_currency, theme, date_format, language, notifications_enabled)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(user_id) DO UPDATE SET
            default_currency=excluded.default_currency,
            theme=excluded.theme,
            date_format=excluded.date_format,
            language=excluded.language,
            notifications_enabled=excluded.notifications_enabled,
            updated_at=datetime('now')",
        params![
            user_id,
            s.default_currency,
            s.theme,
            s.date_format,
            s.language,
            s.notifications_enabled
        ],
    )?;
    tracing::info!(user = user_id, "settings updated");
    Ok(s)
}
