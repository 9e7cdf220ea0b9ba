// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

static CURRENCY_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{3}$").expect("currency code pattern"));
static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").expect("hex colour pattern"));

pub const THEMES: [&str; 3] = ["light", "dark", "system"];

/// Declares a lowercase TEXT-backed enum with string, serde and SQLite conversions.
macro_rules! text_enum {
    ($(#[$meta:meta])* $name:ident, $what:literal { $($variant:ident => $s:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "lowercase")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $s),+
                }
            }
        }

        impl std::str::FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($s => Ok(Self::$variant),)+
                    _ => Err(format!("Unknown {}: {}", $what, s)),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: String| FromSqlError::Other(e.into()))
            }
        }
    };
}

text_enum!(
    /// Direction of a money movement.
    TxType, "transaction type" {
        Income => "income",
        Expense => "expense",
    }
);

text_enum!(
    /// How often a recurring transaction or reminder comes due.
    Frequency, "frequency" {
        Daily => "daily",
        Weekly => "weekly",
        Biweekly => "biweekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        Yearly => "yearly",
    }
);

text_enum!(
    /// Length of a budget window.
    BudgetPeriod, "budget period" {
        Weekly => "weekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        Yearly => "yearly",
    }
);

impl From<BudgetPeriod> for Frequency {
    fn from(p: BudgetPeriod) -> Self {
        match p {
            BudgetPeriod::Weekly => Frequency::Weekly,
            BudgetPeriod::Monthly => Frequency::Monthly,
            BudgetPeriod::Quarterly => Frequency::Quarterly,
            BudgetPeriod::Yearly => Frequency::Yearly,
        }
    }
}

fn non_negative(amount: &Decimal) -> std::result::Result<(), ValidationError> {
    if *amount < Decimal::ZERO {
        let mut err = ValidationError::new("non_negative");
        err.message = Some("must not be negative".into());
        return Err(err);
    }
    Ok(())
}

fn positive(amount: &Decimal) -> std::result::Result<(), ValidationError> {
    if *amount <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("must be greater than zero".into());
        return Err(err);
    }
    Ok(())
}

fn currency_code(code: &str) -> std::result::Result<(), ValidationError> {
    if !CURRENCY_CODE.is_match(code) {
        let mut err = ValidationError::new("currency_code");
        err.message = Some(format!("'{}' is not a three-letter ISO code", code).into());
        return Err(err);
    }
    Ok(())
}

fn hex_color(color: &str) -> std::result::Result<(), ValidationError> {
    if !HEX_COLOR.is_match(color) {
        let mut err = ValidationError::new("hex_color");
        err.message = Some(format!("'{}' is not a #RRGGBB colour", color).into());
        return Err(err);
    }
    Ok(())
}

fn known_theme(theme: &str) -> std::result::Result<(), ValidationError> {
    if !THEMES.contains(&theme) {
        let mut err = ValidationError::new("theme");
        err.message = Some(format!("'{}' is not one of {}", theme, THEMES.join("|")).into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub r#type: TxType,
    pub icon: String,
    pub color: String,
}

#[derive(Debug, Clone, Validate)]
pub struct NewCategory {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub name: String,
    pub r#type: TxType,
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub icon: String,
    #[validate(custom(function = "hex_color"))]
    pub color: String,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct CategoryPatch {
    #[validate(length(min = 1, max = 64, message = "must be 1-64 characters"))]
    pub name: Option<String>,
    pub r#type: Option<TxType>,
    #[validate(length(max = 32, message = "must be at most 32 characters"))]
    pub icon: Option<String>,
    #[validate(custom(function = "hex_color"))]
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub rate: Decimal, // units per 1 USD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub r#type: TxType,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: i64,
    pub description: String,
    pub date: NaiveDate,
    pub is_recurring: bool,
    pub recurring_id: Option<i64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Validate)]
pub struct NewTransaction {
    pub r#type: TxType,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    pub category_id: i64,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: String,
    pub date: NaiveDate,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct TransactionPatch {
    pub r#type: Option<TxType>,
    #[validate(custom(function = "non_negative"))]
    pub amount: Option<Decimal>,
    #[validate(custom(function = "currency_code"))]
    pub currency: Option<String>,
    pub category_id: Option<i64>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    pub date: Option<NaiveDate>,
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringTransaction {
    pub id: i64,
    pub r#type: TxType,
    pub amount: Decimal,
    pub currency: String,
    pub category_id: i64,
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub next_due_date: NaiveDate,
    pub is_active: bool,
}

#[derive(Debug, Clone, Validate)]
pub struct NewRecurring {
    pub r#type: TxType,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    pub category_id: i64,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: String,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct RecurringPatch {
    pub r#type: Option<TxType>,
    #[validate(custom(function = "non_negative"))]
    pub amount: Option<Decimal>,
    #[validate(custom(function = "currency_code"))]
    pub currency: Option<String>,
    pub category_id: Option<i64>,
    #[validate(length(max = 500, message = "must be at most 500 characters"))]
    pub description: Option<String>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    /// `Some(None)` clears the end date.
    pub end_date: Option<Option<NaiveDate>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub category_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Validate)]
pub struct NewBudget {
    pub category_id: i64,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    pub period: BudgetPeriod,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct BudgetPatch {
    pub category_id: Option<i64>,
    #[validate(custom(function = "non_negative"))]
    pub amount: Option<Decimal>,
    #[validate(custom(function = "currency_code"))]
    pub currency: Option<String>,
    pub period: Option<BudgetPeriod>,
    pub start_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub currency: String,
    pub deadline: NaiveDate,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Validate)]
pub struct NewGoal {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: String,
    #[validate(custom(function = "positive"))]
    pub target_amount: Decimal,
    #[validate(custom(function = "non_negative"))]
    pub current_amount: Decimal,
    #[validate(custom(function = "currency_code"))]
    pub currency: String,
    pub deadline: NaiveDate,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct GoalPatch {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "positive"))]
    pub target_amount: Option<Decimal>,
    #[validate(custom(function = "non_negative"))]
    pub current_amount: Option<Decimal>,
    #[validate(custom(function = "currency_code"))]
    pub currency: Option<String>,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: i64,
    pub title: String,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub category_id: i64,
    pub is_recurring: bool,
    pub frequency: Option<Frequency>,
    pub is_paid: bool,
    pub notify_before: i64, // days
}

#[derive(Debug, Clone, Validate)]
pub struct NewReminder {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub title: String,
    #[validate(custom(function = "non_negative"))]
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub category_id: i64,
    pub frequency: Option<Frequency>,
    #[validate(range(min = 0, max = 365, message = "must be between 0 and 365 days"))]
    pub notify_before: i64,
}

#[derive(Debug, Clone, Default, Validate)]
pub struct ReminderPatch {
    #[validate(length(min = 1, max = 100, message = "must be 1-100 characters"))]
    pub title: Option<String>,
    #[validate(custom(function = "non_negative"))]
    pub amount: Option<Decimal>,
    pub due_date: Option<NaiveDate>,
    pub category_id: Option<i64>,
    /// `Some(None)` turns a recurring reminder into a one-off.
    pub frequency: Option<Option<Frequency>>,
    #[validate(range(min = 0, max = 365, message = "must be between 0 and 365 days"))]
    pub notify_before: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub user_id: i64,
    pub default_currency: String,
    pub theme: String,
    pub date_format: String,
    pub language: String,
    pub notifications_enabled: bool,
}

impl Settings {
    pub fn defaults_for(user_id: i64) -> Self {
        Self {
            user_id,
            default_currency: "USD".into(),
            theme: "system".into(),
            date_format: "%Y-%m-%d".into(),
            language: "en".into(),
            notifications_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Default, Validate)]
pub struct SettingsPatch {
    #[validate(custom(function = "currency_code"))]
    pub default_currency: Option<String>,
    #[validate(custom(function = "known_theme"))]
    pub theme: Option<String>,
    #[validate(length(min = 1, max = 32, message = "must be 1-32 characters"))]
    pub date_format: Option<String>,
    #[validate(length(min = 2, max = 8, message = "must be 2-8 characters"))]
    pub language: Option<String>,
    pub notifications_enabled: Option<bool>,
}
