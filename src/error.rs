// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, BudgetError>;

#[derive(Debug, Error)]
pub enum BudgetError {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl BudgetError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        BudgetError::Validation(msg.into())
    }

    pub fn not_found(entity: &'static str, id: i64) -> Self {
        BudgetError::NotFound { entity, id }
    }

    /// Money arithmetic that would leave the `Decimal` range.
    pub fn out_of_range() -> Self {
        BudgetError::invalid("amount out of range")
    }
}

impl From<validator::ValidationErrors> for BudgetError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<String> = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for e in field_errors {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                details.push(format!("{}: {}", field, msg));
            }
        }
        details.sort();
        BudgetError::Validation(details.join("; "))
    }
}
