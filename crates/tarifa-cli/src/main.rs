// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tarifa.
//
// Licensed under the Creative Commons Attribution-NonCommercial-NoDerivatives 4.0 International
// (CC BY-NC-ND 4.0). You may use and share this file for non-commercial purposes only and you may not
// create derivatives. See <https://creativecommons.org/licenses/by-nc-nd/4.0/>.
//
// This software is provided "AS IS", without warranty of any kind.
//
// For commercial licensing, please contact: info@solare.cz

//! Tarifa CLI - terminal front-end for the quarter-hour price explorer

mod args;
mod render;

use anyhow::{Context, Result, bail, ensure};
use args::{Cli, Commands, ConsumptionEntry, OutputFormat, RowKey, SelectionArgs, SimulateArgs};
use clap::Parser;
use render::{DayEntry, TariffEntry, TerminalPresenter};
use serde::Serialize;
use tarifa_core::{
    FeedSource, FileFeedSource, HttpFeedSource, LoadOutcome, Session, TarifaConfig,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type CliSession = Session<TerminalPresenter>;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tarifa=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let mut config = TarifaConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;
    if let Some(url) = &cli.url {
        config.feed.url.clone_from(url);
    }

    let source: Box<dyn FeedSource> = match &cli.file {
        Some(path) => Box::new(FileFeedSource::new(path)),
        None => Box::new(
            HttpFeedSource::new(&config.feed).context("Failed to create feed client")?,
        ),
    };

    let mut session = Session::from_config(&config, TerminalPresenter::default());
    if session.load(source.as_ref()) != LoadOutcome::Applied {
        bail!("Price feed from {} could not be loaded", source.describe());
    }
    if let Some(loaded_at) = session.loaded_at() {
        info!("Feed loaded at {}", loaded_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }

    let unit = config.display.currency_unit.as_str();
    match cli.command {
        Commands::List => list(&session, cli.format),
        Commands::Chart(selection) => chart(&mut session, &selection, cli.format, unit),
        Commands::Simulate(args) => simulate(&mut session, &args, cli.format),
        Commands::Constants => constants(&session, cli.format),
        Commands::Summary => summary(&session, cli.format),
    }
}

fn print_json(value: &impl Serialize) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

fn list(session: &CliSession, format: OutputFormat) -> Result<()> {
    let days: Vec<DayEntry> = session
        .days()
        .into_iter()
        .map(|day| {
            let tariffs = session
                .tariffs(&day)
                .into_iter()
                .map(|tariff| TariffEntry {
                    options: session.options(&day, &tariff),
                    tariff,
                })
                .collect();
            DayEntry { day, tariffs }
        })
        .collect();

    match format {
        OutputFormat::Json => print_json(&days),
        OutputFormat::Table => {
            println!("{}", render::format_list(&days));
            Ok(())
        }
    }
}

/// Walk the cascading selectors the way the dropdowns do
fn apply_selection(session: &mut CliSession, args: &SelectionArgs) -> Result<()> {
    if let Some(day) = &args.day {
        let days = session.days();
        ensure!(
            days.contains(day),
            "Unknown day {day}; available: {}",
            days.join(", ")
        );
        session.select_day(day);
    }

    let day = session.selection().map(|s| s.day.clone()).unwrap_or_default();
    if let Some(tariff) = &args.tariff {
        let tariffs = session.tariffs(&day);
        ensure!(
            tariffs.contains(tariff),
            "Unknown tariff {tariff} for {day}; available: {}",
            tariffs.join(", ")
        );
        session.select_tariff(tariff);
    }

    if let Some(option) = &args.option {
        let tariff = session.selection().map(|s| s.tariff.clone()).unwrap_or_default();
        let options = session.options(&day, &tariff);
        ensure!(
            options.contains(option),
            "Unknown option {option} for {tariff}; available: {}",
            options.join(", ")
        );
        session.select_option(option);
    }

    match session.selection() {
        Some(selection) => {
            debug!("Using selection {selection}");
            Ok(())
        }
        None => bail!("The feed contains no price series"),
    }
}

fn chart(
    session: &mut CliSession,
    args: &SelectionArgs,
    format: OutputFormat,
    unit: &str,
) -> Result<()> {
    apply_selection(session, args)?;
    let Some(chart) = session.adapter().chart() else {
        bail!("No prices for the selected series");
    };

    match format {
        OutputFormat::Json => print_json(chart),
        OutputFormat::Table => {
            print!("{}", render::format_chart(chart, unit));
            Ok(())
        }
    }
}

fn resolve_row(session: &CliSession, entry: &ConsumptionEntry) -> Option<usize> {
    match &entry.row {
        RowKey::Index(index) => Some(*index),
        RowKey::Hour(hour) => session.table().find_row(hour),
    }
}

fn simulate(session: &mut CliSession, args: &SimulateArgs, format: OutputFormat) -> Result<()> {
    apply_selection(session, &args.selection)?;
    session.set_simulation_enabled(true);

    if let Some(uniform) = &args.uniform {
        let priced: Vec<usize> = session
            .table()
            .rows()
            .iter()
            .enumerate()
            .filter(|(_, row)| row.is_enabled())
            .map(|(i, _)| i)
            .collect();
        for index in priced {
            session.edit_consumption(index, uniform);
        }
    }

    for entry in &args.consumption {
        let applied = resolve_row(session, entry)
            .and_then(|index| session.edit_consumption(index, &entry.value));
        if applied.is_none() {
            warn!("No row matches consumption entry {:?}", entry.row);
        }
    }

    for column in &args.sort {
        session.sort_table_by(*column);
    }

    let Some(view) = session.adapter().table() else {
        bail!("Simulation table is not available");
    };
    match format {
        OutputFormat::Json => print_json(view),
        OutputFormat::Table => {
            print!("{}", render::format_table(view));
            Ok(())
        }
    }
}

fn constants(session: &CliSession, format: OutputFormat) -> Result<()> {
    let constants = session.constants().cloned().unwrap_or_default();
    if constants.is_empty() {
        warn!("The feed carries no constants block");
    }

    match format {
        OutputFormat::Json => print_json(&constants),
        OutputFormat::Table => {
            println!("{}", render::format_constants(&constants));
            Ok(())
        }
    }
}

fn summary(session: &CliSession, format: OutputFormat) -> Result<()> {
    #[derive(Serialize)]
    struct Summary<'a> {
        market: Option<&'a tarifa_core::SummaryTable>,
        futures: Option<&'a tarifa_core::SummaryTable>,
    }

    let data = Summary {
        market: session.market_summary(),
        futures: session.futures(),
    };

    match format {
        OutputFormat::Json => print_json(&data),
        OutputFormat::Table => {
            match data.market {
                Some(table) => print!("{}", render::format_summary("Market averages (€/MWh)", table)),
                None => warn!("The feed carries no market summary"),
            }
            match data.futures {
                Some(table) => print!("{}", render::format_summary("Futures (€/MWh)", table)),
                None => warn!("The feed carries no futures table"),
            }
            Ok(())
        }
    }
}
