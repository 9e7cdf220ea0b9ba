// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod transactions;
pub mod recurring;
pub mod budgets;
pub mod goals;
pub mod reminders;
pub mod settings;
pub mod currencies;
pub mod reports;
pub mod exporter;
pub mod doctor;
