// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use pennywise::commands::{budgets, categories, transactions};
use pennywise::error::BudgetError;
use pennywise::models::{BudgetPeriod, CategoryPatch, NewBudget, NewCategory, NewTransaction, TxType};
use pennywise::{db, utils::ensure_user};
use rust_decimal::Decimal;

fn new_category(name: &str) -> NewCategory {
    NewCategory {
        name: name.into(),
        r#type: TxType::Expense,
        icon: String::new(),
        color: "#808080".into(),
    }
}

#[test]
fn deleting_a_referenced_category_conflicts() {
    let conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "alice").unwrap();
    let cat = categories::create(&conn, &new_category("Dining")).unwrap();
    let t = transactions::create(
        &conn,
        user,
        &NewTransaction {
            r#type: TxType::Expense,
            amount: Decimal::new(2500, 2),
            currency: "USD".into(),
            category_id: cat.id,
            description: "Pizza".into(),
            date: NaiveDate::from_ymd_opt(2025, 4, 4).unwrap(),
            tags: vec![],
        },
    )
    .unwrap();

    assert!(matches!(
        categories::delete(&conn, cat.id),
        Err(BudgetError::Conflict(_))
    ));
    // still there
    assert_eq!(categories::get(&conn, cat.id).unwrap().name, "Dining");

    transactions::delete(&conn, user, t.id).unwrap();
    categories::delete(&conn, cat.id).unwrap();
    assert!(matches!(
        categories::get(&conn, cat.id),
        Err(BudgetError::NotFound { .. })
    ));
}

#[test]
fn budget_reference_also_blocks_delete() {
    let conn = db::open_in_memory().unwrap();
    let user = ensure_user(&conn, "alice").unwrap();
    let cat = categories::create(&conn, &new_category("Travel")).unwrap();
    budgets::create(
        &conn,
        user,
        &NewBudget {
            category_id: cat.id,
            amount: Decimal::new(300, 0),
            currency: "USD".into(),
            period: BudgetPeriod::Monthly,
            start_date: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        },
    )
    .unwrap();
    assert!(matches!(
        categories::delete(&conn, cat.id),
        Err(BudgetError::Conflict(_))
    ));
}

#[test]
fn names_are_unique_ignoring_case_and_resolvable() {
    let conn = db::open_in_memory().unwrap();
    let cat = categories::create(&conn, &new_category("Groceries")).unwrap();
    assert!(matches!(
        categories::create(&conn, &new_category("groceries")),
        Err(BudgetError::Conflict(_))
    ));
    assert_eq!(categories::resolve(&conn, "GROCERIES").unwrap(), cat.id);
    assert_eq!(categories::resolve(&conn, &cat.id.to_string()).unwrap(), cat.id);
    assert!(categories::resolve(&conn, "Nope").is_err());
}

#[test]
fn renames_respect_the_same_uniqueness() {
    let conn = db::open_in_memory().unwrap();
    let groceries = categories::create(&conn, &new_category("Groceries")).unwrap();
    let dining = categories::create(&conn, &new_category("Dining")).unwrap();
    for name in ["groceries", "Groceries"] {
        let patch = CategoryPatch {
            name: Some(name.into()),
            ..CategoryPatch::default()
        };
        assert!(matches!(
            categories::update(&conn, dining.id, &patch),
            Err(BudgetError::Conflict(_))
        ));
    }
    assert_eq!(categories::get(&conn, dining.id).unwrap().name, "Dining");

    // recasing its own name is fine
    let patch = CategoryPatch {
        name: Some("GROCERIES".into()),
        ..CategoryPatch::default()
    };
    assert_eq!(categories::update(&conn, groceries.id, &patch).unwrap().name, "GROCERIES");
    assert_eq!(categories::find_by_name(&conn, "groceries").unwrap(), Some(groceries.id));
    assert_eq!(categories::find_by_name(&conn, "Nope").unwrap(), None);
}

#[test]
fn bad_colour_is_a_validation_error() {
    let conn = db::open_in_memory().unwrap();
    let mut input = new_category("Fun");
    input.color = "red".into();
    assert!(matches!(
        categories::create(&conn, &input),
        Err(BudgetError::Validation(_))
    ));

    let cat = categories::create(&conn, &new_category("Fun")).unwrap();
    let patch = CategoryPatch {
        color: Some("#12".into()),
        ..CategoryPatch::default()
    };
    assert!(categories::update(&conn, cat.id, &patch).is_err());
}

#[test]
fn list_filters_by_type() {
    let conn = db::open_in_memory().unwrap();
    categories::create(&conn, &new_category("Rent")).unwrap();
    let mut salary = new_category("Salary");
    salary.r#type = TxType::Income;
    categories::create(&conn, &salary).unwrap();

    let income = categories::list(&conn, Some(TxType::Income)).unwrap();
    assert_eq!(income.len(), 1);
    assert_eq!(income[0].name, "Salary");
    assert_eq!(categories::list(&conn, None).unwrap().len(), 2);
}
