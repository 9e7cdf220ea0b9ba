// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

const TX_TYPES: [&str; 2] = ["income", "expense"];
const FREQUENCIES: [&str; 6] = ["daily", "weekly", "biweekly", "monthly", "quarterly", "yearly"];
const PERIODS: [&str; 4] = ["weekly", "monthly", "quarterly", "yearly"];
const EXPORT_FORMATS: [&str; 2] = ["csv", "json"];

fn json_args() -> [Arg; 2] {
    [
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .conflicts_with("jsonl")
            .help("Print JSON"),
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .help("Print one JSON object per line"),
    ]
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(value_parser!(i64))
}

fn as_of_arg() -> Arg {
    Arg::new("as_of")
        .long("as-of")
        .value_name("YYYY-MM-DD")
        .help("Reference date (defaults to today)")
}

fn opt(name: &'static str, long: &'static str) -> Arg {
    Arg::new(name).long(long)
}

fn req(name: &'static str, long: &'static str) -> Arg {
    Arg::new(name).long(long).required(true)
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").required(true))
                .arg(req("type", "type").value_parser(TX_TYPES))
                .arg(opt("icon", "icon").default_value(""))
                .arg(opt("color", "color").default_value("#808080")),
        )
        .subcommand(
            Command::new("list")
                .arg(opt("type", "type").value_parser(TX_TYPES))
                .args(json_args()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(opt("name", "name"))
                .arg(opt("type", "type").value_parser(TX_TYPES))
                .arg(opt("icon", "icon"))
                .arg(opt("color", "color")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("type", "type").value_parser(TX_TYPES))
                .arg(req("amount", "amount"))
                .arg(req("category", "category").help("Category id or name"))
                .arg(opt("currency", "currency").help("Defaults to the user's currency"))
                .arg(opt("description", "description").default_value(""))
                .arg(opt("date", "date").help("Defaults to today"))
                .arg(opt("tags", "tags").help("Comma-separated tags")),
        )
        .subcommand(
            Command::new("list")
                .arg(opt("type", "type").value_parser(TX_TYPES))
                .arg(opt("category", "category"))
                .arg(opt("search", "search"))
                .arg(opt("from", "from"))
                .arg(opt("to", "to").help("Inclusive end date"))
                .arg(
                    opt("page", "page")
                        .value_parser(value_parser!(u32))
                        .default_value("1"),
                )
                .arg(
                    opt("page_size", "page-size")
                        .value_parser(value_parser!(u32))
                        .default_value("20"),
                )
                .args(json_args()),
        )
        .subcommand(Command::new("show").arg(id_arg()).args(json_args()))
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(opt("type", "type").value_parser(TX_TYPES))
                .arg(opt("amount", "amount"))
                .arg(opt("category", "category"))
                .arg(opt("currency", "currency"))
                .arg(opt("description", "description"))
                .arg(opt("date", "date"))
                .arg(opt("tags", "tags")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn recurring_cmd() -> Command {
    Command::new("recurring")
        .about("Manage recurring transaction templates")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("type", "type").value_parser(TX_TYPES))
                .arg(req("amount", "amount"))
                .arg(req("category", "category"))
                .arg(opt("currency", "currency"))
                .arg(opt("description", "description").default_value(""))
                .arg(req("frequency", "frequency").value_parser(FREQUENCIES))
                .arg(opt("start", "start").help("Defaults to today"))
                .arg(opt("end", "end")),
        )
        .subcommand(
            Command::new("list")
                .arg(
                    Arg::new("active")
                        .long("active")
                        .action(ArgAction::SetTrue)
                        .help("Only active templates"),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(opt("type", "type").value_parser(TX_TYPES))
                .arg(opt("amount", "amount"))
                .arg(opt("category", "category"))
                .arg(opt("currency", "currency"))
                .arg(opt("description", "description"))
                .arg(opt("frequency", "frequency").value_parser(FREQUENCIES))
                .arg(opt("start", "start"))
                .arg(opt("end", "end").conflicts_with("clear_end"))
                .arg(
                    Arg::new("clear_end")
                        .long("clear-end")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(Command::new("toggle").arg(id_arg()))
        .subcommand(Command::new("rm").arg(id_arg()))
        .subcommand(
            Command::new("process")
                .about("Materialize every occurrence due on or before the reference date")
                .arg(as_of_arg())
                .args(json_args()),
        )
}

fn budget_cmd() -> Command {
    Command::new("budget")
        .about("Manage category budgets")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(req("category", "category"))
                .arg(req("amount", "amount"))
                .arg(opt("currency", "currency"))
                .arg(opt("period", "period").value_parser(PERIODS).default_value("monthly"))
                .arg(opt("start", "start").help("Defaults to today")),
        )
        .subcommand(Command::new("list").arg(as_of_arg()).args(json_args()))
        .subcommand(
            Command::new("status")
                .arg(id_arg())
                .arg(as_of_arg())
                .args(json_args()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(opt("category", "category"))
                .arg(opt("amount", "amount"))
                .arg(opt("currency", "currency"))
                .arg(opt("period", "period").value_parser(PERIODS))
                .arg(opt("start", "start")),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn goal_cmd() -> Command {
    Command::new("goal")
        .about("Track savings goals")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").required(true))
                .arg(req("target", "target"))
                .arg(opt("current", "current").default_value("0"))
                .arg(opt("currency", "currency"))
                .arg(req("deadline", "deadline")),
        )
        .subcommand(Command::new("list").args(json_args()))
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(opt("name", "name"))
                .arg(opt("target", "target"))
                .arg(opt("current", "current"))
                .arg(opt("currency", "currency"))
                .arg(opt("deadline", "deadline")),
        )
        .subcommand(
            Command::new("contribute")
                .arg(id_arg())
                .arg(
                    req("amount", "amount")
                        .allow_negative_numbers(true)
                        .help("Negative to withdraw"),
                ),
        )
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn reminder_cmd() -> Command {
    Command::new("reminder")
        .about("Bill reminders")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("title").required(true))
                .arg(req("amount", "amount"))
                .arg(req("due", "due"))
                .arg(req("category", "category"))
                .arg(opt("frequency", "frequency").value_parser(FREQUENCIES))
                .arg(
                    opt("notify_before", "notify-before")
                        .value_parser(value_parser!(i64))
                        .default_value("3"),
                ),
        )
        .subcommand(
            Command::new("list")
                .arg(
                    Arg::new("unpaid")
                        .long("unpaid")
                        .action(ArgAction::SetTrue),
                )
                .args(json_args()),
        )
        .subcommand(
            Command::new("edit")
                .arg(id_arg())
                .arg(opt("title", "title"))
                .arg(opt("amount", "amount"))
                .arg(opt("due", "due"))
                .arg(opt("category", "category"))
                .arg(
                    opt("frequency", "frequency")
                        .value_parser(FREQUENCIES)
                        .conflicts_with("one_off"),
                )
                .arg(
                    Arg::new("one_off")
                        .long("one-off")
                        .action(ArgAction::SetTrue),
                )
                .arg(opt("notify_before", "notify-before").value_parser(value_parser!(i64))),
        )
        .subcommand(Command::new("paid").arg(id_arg()))
        .subcommand(Command::new("unpaid").arg(id_arg()))
        .subcommand(Command::new("upcoming").arg(as_of_arg()).args(json_args()))
        .subcommand(Command::new("rm").arg(id_arg()))
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Per-user preferences")
        .subcommand_required(true)
        .subcommand(Command::new("show").args(json_args()))
        .subcommand(
            Command::new("set")
                .arg(opt("currency", "currency"))
                .arg(opt("theme", "theme"))
                .arg(opt("date_format", "date-format"))
                .arg(opt("language", "language"))
                .arg(opt("notifications", "notifications").value_parser(value_parser!(bool))),
        )
}

fn currency_cmd() -> Command {
    Command::new("currency")
        .about("Currency reference data")
        .subcommand_required(true)
        .subcommand(Command::new("list").args(json_args()))
        .subcommand(
            Command::new("set-rate")
                .arg(Arg::new("code").required(true))
                .arg(Arg::new("rate").required(true)),
        )
        .subcommand(
            Command::new("convert")
                .arg(req("amount", "amount"))
                .arg(req("from", "from"))
                .arg(req("to", "to")),
        )
        .subcommand(Command::new("fetch").about("Refresh rates from the ECB via Frankfurter"))
}

fn export_cmd() -> Command {
    let target = |name: &'static str| {
        Command::new(name)
            .arg(
                opt("format", "format")
                    .value_parser(EXPORT_FORMATS)
                    .default_value("csv"),
            )
            .arg(req("out", "out"))
    };
    Command::new("export")
        .about("Export data to CSV or JSON")
        .subcommand_required(true)
        .subcommand(target("transactions"))
        .subcommand(target("budgets"))
        .subcommand(target("goals"))
        .subcommand(target("reminders"))
        .subcommand(target("recurring"))
}

fn report_cmd() -> Command {
    Command::new("report")
        .about("Summaries in the user's default currency")
        .subcommand_required(true)
        .subcommand(
            Command::new("summary")
                .arg(req("from", "from"))
                .arg(req("to", "to"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("by-category")
                .arg(req("from", "from"))
                .arg(req("to", "to"))
                .args(json_args()),
        )
        .subcommand(
            Command::new("cashflow")
                .arg(
                    opt("months", "months")
                        .value_parser(value_parser!(u32))
                        .default_value("12"),
                )
                .arg(as_of_arg())
                .args(json_args()),
        )
}

pub fn build_cli() -> Command {
    Command::new("pennywise")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Personal budgeting: transactions, budgets, goals, recurring items and reminders")
        .arg(
            Arg::new("db")
                .long("db")
                .env("PENNYWISE_DB")
                .global(true)
                .help("SQLite database path"),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .env("PENNYWISE_USER")
                .default_value("default")
                .global(true)
                .help("Acting user; created on first use"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(recurring_cmd())
        .subcommand(budget_cmd())
        .subcommand(goal_cmd())
        .subcommand(reminder_cmd())
        .subcommand(settings_cmd())
        .subcommand(currency_cmd())
        .subcommand(export_cmd())
        .subcommand(report_cmd())
        .subcommand(
            Command::new("seed")
                .about("Load deterministic demo data for the acting user")
                .arg(as_of_arg())
                .arg(
                    opt("months", "months")
                        .value_parser(value_parser!(u32))
                        .default_value("3"),
                ),
        )
        .subcommand(Command::new("doctor").about("Check data invariants"))
}
