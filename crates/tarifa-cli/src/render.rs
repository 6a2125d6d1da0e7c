// Copyright (c) 2025 SOLARE S.R.O.
//
// This file is part of Tarifa.

//! Terminal rendering with comfy-table.

use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, Table};
use serde::Serialize;
use std::collections::BTreeMap;
use tarifa_core::display::{format_market_price, format_price, format_price_with_unit};
use tarifa_core::{ChartData, PresentationAdapter, SummaryTable, TableView};
use tarifa_types::{PriceBand, SortDirection};

/// Keeps the latest chart and table so the command decides what to print
#[derive(Debug, Default)]
pub struct TerminalPresenter {
    chart: Option<ChartData>,
    table: Option<TableView>,
}

impl TerminalPresenter {
    pub fn chart(&self) -> Option<&ChartData> {
        self.chart.as_ref()
    }

    pub fn table(&self) -> Option<&TableView> {
        self.table.as_ref()
    }
}

impl PresentationAdapter for TerminalPresenter {
    fn render_chart(&mut self, chart: &ChartData) {
        self.chart = Some(chart.clone());
    }

    fn render_table(&mut self, table: &TableView) {
        self.table = Some(table.clone());
    }

    fn report_error(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

fn band_color(band: PriceBand) -> Option<Color> {
    match band {
        PriceBand::Low => Some(Color::Green),
        PriceBand::LowMid => Some(Color::Yellow),
        PriceBand::MidHigh => Some(Color::DarkYellow),
        PriceBand::High => Some(Color::Red),
        PriceBand::NoData => None,
    }
}

fn band_cell(band: PriceBand) -> Cell {
    let cell = Cell::new(band.label());
    match band_color(band) {
        Some(color) => cell.fg(color),
        None => cell,
    }
}

fn number_cell(text: impl Into<String>, negative: bool) -> Cell {
    let cell = Cell::new(text.into()).set_alignment(CellAlignment::Right);
    if negative { cell.fg(Color::Red) } else { cell }
}

fn header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|l| Cell::new(l).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table
}

#[derive(Debug, Serialize)]
pub struct TariffEntry {
    pub tariff: String,
    pub options: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct DayEntry {
    pub day: String,
    pub tariffs: Vec<TariffEntry>,
}

pub fn format_list(days: &[DayEntry]) -> String {
    let mut table = new_table();
    table.set_header(header(&["Day", "Tariff", "Options"]));
    for day in days {
        for (i, tariff) in day.tariffs.iter().enumerate() {
            let day_label = if i == 0 { day.day.as_str() } else { "" };
            table.add_row(vec![
                Cell::new(day_label),
                Cell::new(&tariff.tariff),
                Cell::new(tariff.options.join(", ")),
            ]);
        }
    }
    table.to_string()
}

pub fn format_chart(chart: &ChartData, unit: &str) -> String {
    let mut output = String::new();
    output.push_str(&chart.title);
    output.push('\n');
    output.push_str(&format!(
        "Q1 {} | Q2 {} | Q3 {}\n",
        format_price(Some(chart.quartiles.q1)),
        format_price(Some(chart.quartiles.q2)),
        format_price(Some(chart.quartiles.q3)),
    ));

    let mut table = new_table();
    table.set_header(header(&["Slot", "Price", "Band", "Market", "Grid tariff", "Market + grid"]));
    for (slot, label) in chart.slots.iter().enumerate() {
        let at = |series: &[Option<f64>]| series.get(slot).copied().flatten();
        let value = at(&chart.values);
        table.add_row(vec![
            Cell::new(label),
            number_cell(format_price_with_unit(value, unit), chart.is_negative(slot)),
            band_cell(chart.band_at(slot)),
            number_cell(
                format_market_price(at(&chart.market_price)),
                at(&chart.market_price).is_some_and(|v| v < 0.0),
            ),
            number_cell(format_price(at(&chart.grid_access_tariff)), false),
            number_cell(format_price(at(&chart.market_plus_grid)), false),
        ]);
    }
    output.push_str(&table.to_string());
    output.push('\n');
    output
}

fn sort_marker(view: &TableView, column: &str) -> &'static str {
    match view.sort {
        Some((active, SortDirection::Ascending)) if active.as_str() == column => " ▲",
        Some((active, SortDirection::Descending)) if active.as_str() == column => " ▼",
        _ => "",
    }
}

pub fn format_table(view: &TableView) -> String {
    let mut output = String::new();
    if let Some(selection) = &view.selection {
        output.push_str(&format!("Simulation: {selection}\n"));
    }

    let labels = [
        ("hour", "Hour"),
        ("market_price", "Market (€/MWh)"),
        ("average_price", "Average (€/kWh)"),
        ("consumption", "Consumption (kWh)"),
        ("cost", "Cost (€)"),
    ];
    let titles: Vec<String> = labels
        .iter()
        .map(|(column, title)| format!("{title}{}", sort_marker(view, column)))
        .collect();

    let mut table = new_table();
    table.set_header(
        titles
            .iter()
            .map(|t| Cell::new(t).add_attribute(Attribute::Bold))
            .collect::<Vec<_>>(),
    );

    for row in &view.rows {
        let with_band = |cell: Cell, band: PriceBand| match band_color(band) {
            Some(color) => cell.bg(color),
            None => cell,
        };
        let consumption = if row.enabled {
            Cell::new(&row.consumption)
        } else {
            Cell::new(&row.consumption).add_attribute(Attribute::Dim)
        };

        table.add_row(vec![
            Cell::new(&row.hour),
            with_band(number_cell(&row.market_price, row.market_negative), row.market_band),
            with_band(number_cell(&row.average_price, row.average_negative), row.average_band),
            consumption.set_alignment(CellAlignment::Right),
            number_cell(&row.cost, row.cost_negative),
        ]);
    }

    table.add_row(vec![
        Cell::new("Total").add_attribute(Attribute::Bold),
        Cell::new(""),
        number_cell(&view.totals_display.weighted_average, false),
        number_cell(&view.totals_display.consumption, false),
        number_cell(&view.totals_display.cost, view.totals.cost < 0.0),
    ]);

    output.push_str(&table.to_string());
    output.push('\n');
    output
}

pub fn format_constants(constants: &BTreeMap<String, f64>) -> String {
    let mut table = new_table();
    table.set_header(header(&["Constant", "Value"]));
    for (key, value) in constants {
        table.add_row(vec![Cell::new(key), number_cell(value.to_string(), *value < 0.0)]);
    }
    table.to_string()
}

pub fn format_summary(title: &str, summary: &SummaryTable) -> String {
    let mut table = new_table();
    for header_row in &summary.headers {
        table.add_row(
            header_row
                .iter()
                .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
    }
    for row in &summary.rows {
        table.add_row(
            row.iter()
                .map(|c| number_cell(c, SummaryTable::is_negative_cell(c)))
                .collect::<Vec<_>>(),
        );
    }
    format!("{title}\n{table}\n")
}
