// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use clap::{value_parser, Arg, ArgAction, Command};

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn currency_arg() -> Arg {
    Arg::new("currency")
        .long("currency")
        .short('c')
        .help("Display currency (defaults to the selected currency)")
}

fn entry_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(
        Arg::new("type")
            .long("type")
            .short('t')
            .required(required)
            .value_parser(["income", "expense", "transfer", "topup"]),
    )
    .arg(Arg::new("amount").long("amount").short('a').required(required))
    .arg(Arg::new("currency").long("currency").short('c'))
    .arg(
        Arg::new("wallet")
            .long("wallet")
            .short('w')
            .required(required)
            .help("Source wallet name or id"),
    )
    .arg(Arg::new("category").long("category").help("Category name or id"))
    .arg(
        Arg::new("date")
            .long("date")
            .short('d')
            .help("YYYY-MM-DD[THH:MM[:SS]], defaults to now"),
    )
    .arg(Arg::new("to").long("to").help("Destination wallet (transfers)"))
    .arg(Arg::new("received-amount").long("received-amount"))
    .arg(Arg::new("received-currency").long("received-currency"))
    .arg(Arg::new("description").long("description").short('m'))
}

pub fn build_cli() -> Command {
    Command::new("fintrack")
        .about("Multi-currency wallets, income/expense tracking and reports")
        .version(clap::crate_version!())
        .arg(
            Arg::new("db")
                .long("db")
                .global(true)
                .help("Path to the SQLite database (defaults to the user data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .global(true)
                .action(ArgAction::Count)
                .help("Increase log verbosity (-v, -vv)"),
        )
        .subcommand(Command::new("init").about("Create the database"))
        .subcommand(
            Command::new("wallet")
                .about("Manage wallets")
                .subcommand(Command::new("add").arg(Arg::new("name").required(true)))
                .subcommand(json_flags(Command::new("list")).arg(
                    Arg::new("as-of").long("as-of").help("Balances as of YYYY-MM-DD"),
                ).arg(currency_arg()))
                .subcommand(
                    Command::new("rename")
                        .arg(Arg::new("wallet").required(true))
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("rm").arg(Arg::new("wallet").required(true))),
        )
        .subcommand(
            Command::new("category")
                .about("Manage categories")
                .subcommand(
                    Command::new("add").arg(Arg::new("name").required(true)).arg(
                        Arg::new("type")
                            .long("type")
                            .short('t')
                            .required(true)
                            .value_parser(["income", "expense"]),
                    ),
                )
                .subcommand(json_flags(Command::new("list")).arg(
                    Arg::new("type")
                        .long("type")
                        .short('t')
                        .default_value("all")
                        .value_parser(["all", "income", "expense", "transfer", "topup"]),
                ))
                .subcommand(
                    Command::new("rename")
                        .arg(Arg::new("category").required(true))
                        .arg(Arg::new("name").required(true)),
                )
                .subcommand(Command::new("rm").arg(Arg::new("category").required(true))),
        )
        .subcommand(
            Command::new("entry")
                .about("Record and browse entries")
                .subcommand(entry_fields(Command::new("add"), true))
                .subcommand(entry_fields(
                    Command::new("edit").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                    false,
                ))
                .subcommand(
                    json_flags(Command::new("list"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .short('t')
                                .default_value("all")
                                .value_parser(["all", "income", "expense", "transfer", "topup"]),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("wallet").long("wallet").short('w'))
                        .arg(
                            Arg::new("by-day")
                                .long("by-day")
                                .action(ArgAction::SetTrue)
                                .help("Group entries by calendar day"),
                        )
                        .arg(
                            Arg::new("limit")
                                .long("limit")
                                .value_parser(value_parser!(usize)),
                        ),
                )
                .subcommand(
                    Command::new("rm").arg(
                        Arg::new("id")
                            .required(true)
                            .value_parser(value_parser!(i64)),
                    ),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Balances, time series, breakdowns and summaries")
                .subcommand(
                    json_flags(Command::new("balances"))
                        .arg(Arg::new("as-of").long("as-of"))
                        .arg(currency_arg()),
                )
                .subcommand(
                    json_flags(Command::new("series"))
                        .arg(
                            Arg::new("group")
                                .long("group")
                                .short('g')
                                .default_value("monthly")
                                .value_parser(["daily", "monthly", "yearly"]),
                        )
                        .arg(
                            Arg::new("metric")
                                .long("metric")
                                .value_parser(["balance", "income", "expense"]),
                        )
                        .arg(Arg::new("category").long("category"))
                        .arg(Arg::new("wallet").long("wallet").short('w'))
                        .arg(currency_arg()),
                )
                .subcommand(
                    json_flags(Command::new("breakdown"))
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .short('t')
                                .default_value("expense")
                                .value_parser(["income", "expense"]),
                        )
                        .arg(
                            Arg::new("period")
                                .long("period")
                                .short('p')
                                .default_value("all")
                                .help("YYYY-MM or 'all'"),
                        )
                        .arg(currency_arg()),
                )
                .subcommand(
                    json_flags(Command::new("summary"))
                        .arg(Arg::new("today").long("today").help("Override today's date"))
                        .arg(currency_arg()),
                ),
        )
        .subcommand(
            Command::new("currency")
                .about("Display currency, enabled currencies and rates")
                .subcommand(json_flags(Command::new("list")))
                .subcommand(Command::new("select").arg(Arg::new("code").required(true)))
                .subcommand(
                    Command::new("enable").arg(
                        Arg::new("codes")
                            .required(true)
                            .num_args(1..)
                            .help("Currency codes, space or comma separated"),
                    ),
                )
                .subcommand(
                    Command::new("custom-add")
                        .arg(Arg::new("code").required(true))
                        .arg(Arg::new("rate").required(true)),
                )
                .subcommand(Command::new("custom-rm").arg(Arg::new("code").required(true)))
                .subcommand(
                    Command::new("rate")
                        .subcommand(
                            Command::new("set")
                                .arg(Arg::new("code").required(true))
                                .arg(Arg::new("rate").required(true))
                                .arg(Arg::new("date").long("date")),
                        )
                        .subcommand(Command::new("list")),
                )
                .subcommand(
                    Command::new("convert")
                        .arg(Arg::new("amount").required(true))
                        .arg(Arg::new("from").required(true))
                        .arg(Arg::new("to").required(true)),
                ),
        )
        .subcommand(
            Command::new("export").about("Export data").subcommand(
                Command::new("entries")
                    .arg(
                        Arg::new("format")
                            .long("format")
                            .short('f')
                            .default_value("csv")
                            .value_parser(["csv", "json"]),
                    )
                    .arg(Arg::new("out").long("out").short('o').required(true)),
            ),
        )
        .subcommand(Command::new("doctor").about("Check the ledger for dangling references"))
}
