// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::Goal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// Unclamped; over-funded goals report more than 100.
    pub percentage: i64,
    pub is_completed: bool,
}

impl Progress {
    /// Percentage clamped to 100 for progress bars.
    pub fn display_percentage(&self) -> i64 {
        self.percentage.clamp(0, 100)
    }
}

pub fn progress_of(current: Decimal, target: Decimal) -> Progress {
    let is_completed = current >= target;
    let percentage = if target <= Decimal::ZERO {
        if is_completed { 100 } else { 0 }
    } else {
        Decimal::ONE_HUNDRED
            .checked_mul(current)
            .and_then(|v| v.checked_div(target))
            .or_else(|| current.checked_div(target)?.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|p| {
                p.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                    .to_i64()
            })
            .unwrap_or(i64::MAX)
    };
    Progress {
        percentage,
        is_completed,
    }
}

pub fn progress(goal: &Goal) -> Progress {
    progress_of(goal.current_amount, goal.target_amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_points() {
        let target = Decimal::new(100000, 0);
        assert_eq!(
            progress_of(Decimal::new(50000, 0), target),
            Progress { percentage: 50, is_completed: false }
        );
        assert_eq!(
            progress_of(Decimal::new(100000, 0), target),
            Progress { percentage: 100, is_completed: true }
        );
        let over = progress_of(Decimal::new(150000, 0), target);
        assert_eq!(over, Progress { percentage: 150, is_completed: true });
        assert_eq!(over.display_percentage(), 100);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let p = progress_of(Decimal::new(125, 1), Decimal::new(100, 0));
        assert_eq!(p.percentage, 13);
        let p = progress_of(Decimal::ONE, Decimal::new(3, 0));
        assert_eq!(p.percentage, 33);
    }

    #[test]
    fn zero_target_does_not_divide() {
        assert_eq!(progress_of(Decimal::ZERO, Decimal::ZERO).percentage, 100);
    }
}
