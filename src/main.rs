// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use pennywise::{cli, commands, db, seed, utils};

/// `RUST_LOG` wins; otherwise `-v` raises the level from warn.
fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn run() -> Result<()> {
    let matches = cli::build_cli().get_matches();
    init_tracing(matches.get_count("verbose"));

    let path = db::resolve_path(matches.get_one::<String>("db").map(String::as_str))?;
    let mut conn = db::open_or_init(&path)?;
    let user_id = utils::ensure_user(&conn, matches.get_one::<String>("user").unwrap())?;

    match matches.subcommand() {
        Some(("init", _)) => {
            println!("Database initialized at {}", path.display());
        }
        Some(("category", sub)) => commands::categories::handle(&conn, sub)?,
        Some(("tx", sub)) => commands::transactions::handle(&conn, user_id, sub)?,
        Some(("recurring", sub)) => commands::recurring::handle(&mut conn, user_id, sub)?,
        Some(("budget", sub)) => commands::budgets::handle(&conn, user_id, sub)?,
        Some(("goal", sub)) => commands::goals::handle(&conn, user_id, sub)?,
        Some(("reminder", sub)) => commands::reminders::handle(&conn, user_id, sub)?,
        Some(("settings", sub)) => commands::settings::handle(&conn, user_id, sub)?,
        Some(("currency", sub)) => commands::currencies::handle(&conn, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&conn, user_id, sub)?,
        Some(("report", sub)) => commands::reports::handle(&conn, user_id, sub)?,
        Some(("seed", sub)) => {
            let months = *sub.get_one::<u32>("months").unwrap();
            let fixture = seed::demo_fixture(utils::as_of(sub)?, months)?;
            let report = seed::apply(&mut conn, user_id, &fixture)?;
            println!(
                "Seeded {} categories, {} transactions, {} recurring, {} budgets, {} goals, {} reminders",
                report.categories,
                report.transactions,
                report.recurring,
                report.budgets,
                report.goals,
                report.reminders
            );
        }
        Some(("doctor", _)) => commands::doctor::handle(&conn)?,
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
