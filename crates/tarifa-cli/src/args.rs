// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tarifa.

//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tarifa_types::SortColumn;

#[derive(Debug, Parser)]
#[command(name = "tarifa")]
#[command(author, version, about = "Quarter-hour electricity price explorer")]
#[command(
    long_about = "Explore quarter-hour electricity prices per tariff plan and simulate\n\
    the cost of a consumption profile.\n\
    \nThe price feed is the published spreadsheet CSV export; use --file to read\n\
    a saved copy instead.\n\
    \nExamples:\n  \
    tarifa list\n  \
    tarifa chart --day 2025-01-15 --tariff Coopernico\n  \
    tarifa simulate --uniform 0,25 --sort cost --sort cost\n  \
    tarifa --file precos.csv --format json constants"
)]
pub struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read the feed from a local CSV file instead of downloading it
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "url")]
    pub file: Option<PathBuf>,

    /// Override the feed URL from the configuration
    #[arg(long, global = true, value_name = "URL")]
    pub url: Option<String>,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List days, tariffs and options present in the feed
    List,

    /// Quarter-hour prices of one series with their quartile bands
    Chart(SelectionArgs),

    /// Hourly cost simulation for a consumption profile
    #[command(
        long_about = "Build the hourly simulation table for a series, fill in consumption\n\
        and print the per-hour cost with totals.\n\
        \nConsumption entries are KEY=VALUE where KEY is a row index (0-based) or\n\
        an hour label exactly as shown, e.g. \"[9:00-10:00[\". Decimal commas are\n\
        accepted. Hours without an average price ignore consumption.\n\
        \nEach --sort clicks a column header: repeating a column toggles direction.\n\
        \nExamples:\n  \
        tarifa simulate --consumption 0=1,5 --consumption \"[1:00-2:00[=2\"\n  \
        tarifa simulate --uniform 0.3 --sort average_price"
    )]
    Simulate(SimulateArgs),

    /// Regulated constants used by the price formulas
    Constants,

    /// Wholesale market averages and futures
    Summary,
}

/// Missing values fall back to the first entry of each selector
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    #[arg(long)]
    pub day: Option<String>,

    #[arg(long)]
    pub tariff: Option<String>,

    #[arg(long)]
    pub option: Option<String>,
}

#[derive(Debug, Args)]
pub struct SimulateArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Consumption for one row, KEY=VALUE (repeatable)
    #[arg(long = "consumption", value_name = "KEY=VALUE", value_parser = parse_entry)]
    pub consumption: Vec<ConsumptionEntry>,

    /// Same consumption for every priced hour, applied before --consumption
    #[arg(long, value_name = "KWH")]
    pub uniform: Option<String>,

    /// Column to sort by (hour, market_price, average_price, consumption, cost)
    #[arg(long = "sort", value_name = "COLUMN")]
    pub sort: Vec<SortColumn>,
}

/// Row reference of a `--consumption` entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowKey {
    Index(usize),
    Hour(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumptionEntry {
    pub row: RowKey,
    pub value: String,
}

fn parse_entry(raw: &str) -> Result<ConsumptionEntry, String> {
    let (key, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing row in '{raw}'"));
    }

    let row = match key.parse::<usize>() {
        Ok(index) => RowKey::Index(index),
        Err(_) => RowKey::Hour(key.to_owned()),
    };
    Ok(ConsumptionEntry {
        row,
        value: value.trim().to_owned(),
    })
}
