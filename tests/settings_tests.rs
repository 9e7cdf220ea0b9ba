// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pennywise::commands::{currencies, settings};
use pennywise::error::BudgetError;
use pennywise::models::{Settings, SettingsPatch};
use pennywise::rates::RateTable;
use pennywise::{db, utils::ensure_user};
use rust_decimal::Decimal;

#[test]
fn unset_user_gets_defaults() {
    let conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "alice").unwrap();
    assert_eq!(settings::get(&conn, user).unwrap(), Settings::defaults_for(user));
}

#[test]
fn updates_are_per_user_upserts() {
    let conn = db::open_in_memory().unwrap();
    let alice = ensure_user(&conn, "alice").unwrap();
    let bob = ensure_user(&conn, "bob").unwrap();

    let patch = SettingsPatch {
        default_currency: Some("EUR".into()),
        theme: Some("dark".into()),
        ..SettingsPatch::default()
    };
    settings::update(&conn, alice, &patch).unwrap();
    let patch = SettingsPatch {
        notifications_enabled: Some(false),
        ..SettingsPatch::default()
    };
    let s = settings::update(&conn, alice, &patch).unwrap();
    assert_eq!(s.default_currency, "EUR");
    assert_eq!(s.theme, "dark");
    assert!(!s.notifications_enabled);
    assert_eq!(settings::get(&conn, alice).unwrap(), s);

    assert_eq!(settings::get(&conn, bob).unwrap(), Settings::defaults_for(bob));
}

#[test]
fn invalid_values_leave_settings_untouched() {
    let conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "alice").unwrap();
    for patch in [
        SettingsPatch {
            theme: Some("neon".into()),
            ..SettingsPatch::default()
        },
        SettingsPatch {
            default_currency: Some("euro".into()),
            ..SettingsPatch::default()
        },
        SettingsPatch {
            default_currency: Some("ABC".into()),
            ..SettingsPatch::default()
        },
        SettingsPatch {
            date_format: Some("%Q".into()),
            ..SettingsPatch::default()
        },
    ] {
        assert!(matches!(
            settings::update(&conn, user, &patch),
            Err(BudgetError::Validation(_))
        ));
    }
    assert_eq!(settings::get(&conn, user).unwrap(), Settings::defaults_for(user));
}

#[test]
fn ensure_user_is_idempotent() {
    let conn = db::open_in_memory().unwrap();
    let a = ensure_user(&conn, "alice").unwrap();
    assert_eq!(ensure_user(&conn, " alice ").unwrap(), a);
    assert!(ensure_user(&conn, "  ").is_err());
}

#[test]
fn rates_can_be_updated_but_usd_stays_at_one() {
    let conn = db::open_in_memory().unwrap();
    currencies::set_rate(&conn, "GBP", Decimal::new(80, 2)).unwrap();
    let table = RateTable::load(&conn).unwrap();
    assert_eq!(
        table.convert(Decimal::new(40, 0), "GBP", "USD").unwrap(),
        Decimal::new(50, 0)
    );
    assert!(currencies::set_rate(&conn, "USD", Decimal::new(2, 0)).is_err());
    assert!(currencies::set_rate(&conn, "XYZ", Decimal::ONE).is_err());
    assert!(currencies::set_rate(&conn, "EUR", Decimal::ZERO).is_err());
}
