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

//! Seam between the core and whatever draws charts and tables.

use crate::chart::ChartData;
use crate::display::{
    format_consumption, format_cost, format_market_price, format_price, format_weighted_average,
};
use crate::simulation::{SimulationRow, SimulationTable, Totals};
use serde::Serialize;
use tarifa_types::{PriceBand, Selection, SortColumn, SortDirection};

/// Sink for rendered state. Nothing returned here feeds back into the core.
pub trait PresentationAdapter {
    fn render_chart(&mut self, chart: &ChartData);

    fn render_table(&mut self, table: &TableView);

    /// User-visible failure message
    fn report_error(&mut self, message: &str);
}

/// One simulation row ready for display
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRowView {
    pub index: usize,
    pub hour: String,
    pub market_price: String,
    pub average_price: String,
    pub consumption: String,
    pub cost: String,
    pub market_band: PriceBand,
    pub average_band: PriceBand,
    pub enabled: bool,
    pub market_negative: bool,
    pub average_negative: bool,
    pub cost_negative: bool,
}

impl TableRowView {
    fn from_row(index: usize, row: &SimulationRow) -> Self {
        Self {
            index,
            hour: row.hour.clone(),
            market_price: format_market_price(row.market_price),
            average_price: format_price(row.average_price),
            consumption: format_consumption(row.consumption),
            cost: format_cost(row.cost),
            market_band: row.market_band,
            average_band: row.average_band,
            enabled: row.is_enabled(),
            market_negative: row.market_price.is_some_and(|v| v < 0.0),
            average_negative: row.average_price.is_some_and(|v| v < 0.0),
            cost_negative: row.cost < 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TotalsView {
    pub consumption: String,
    pub cost: String,
    pub weighted_average: String,
}

impl From<Totals> for TotalsView {
    fn from(totals: Totals) -> Self {
        Self {
            consumption: format_consumption(totals.consumption),
            cost: format_cost(totals.cost),
            weighted_average: format_weighted_average(totals.weighted_average),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableView {
    pub selection: Option<Selection>,
    pub rows: Vec<TableRowView>,
    pub totals: Totals,
    pub totals_display: TotalsView,
    pub sort: Option<(SortColumn, SortDirection)>,
}

impl TableView {
    pub fn from_table(table: &SimulationTable) -> Self {
        let totals = table.totals();
        Self {
            selection: table.selection().cloned(),
            rows: table
                .rows()
                .iter()
                .enumerate()
                .map(|(i, row)| TableRowView::from_row(i, row))
                .collect(),
            totals,
            totals_display: totals.into(),
            sort: table.sort_state(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::TableRecord;

    fn table() -> SimulationTable {
        let records = [
            ("[0:00-1:00[", Some(-3.5), Some(0.10)),
            ("[1:00-2:00[", Some(40.0), Some(0.20)),
            ("[2:00-3:00[", Some(45.0), None),
        ]
        .map(|(hour, market, average)| TableRecord {
            day: "d".to_owned(),
            tariff: "A".to_owned(),
            option: "Simple".to_owned(),
            hour: hour.to_owned(),
            market_price: market,
            average_price: average,
        });
        SimulationTable::build(&records, &Selection::new("d", "A", "Simple"))
    }

    #[test]
    fn test_view_formats_rows_and_totals() {
        let mut table = table();
        table.set_consumption(0, "1");
        table.set_consumption(1, "2,0");

        let view = TableView::from_table(&table);
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[0].average_price, "0.10000");
        assert_eq!(view.rows[1].consumption, "2.000");
        assert_eq!(view.rows[1].cost, "0.4000");
        assert_eq!(view.totals_display.consumption, "3.000");
        assert_eq!(view.totals_display.cost, "0.5000");
        assert_eq!(view.totals_display.weighted_average, "0.16667");
    }

    #[test]
    fn test_disabled_row_and_negative_flags() {
        let view = TableView::from_table(&table());

        assert!(view.rows[0].market_negative);
        assert!(!view.rows[1].market_negative);
        assert!(!view.rows[2].enabled);
        assert_eq!(view.rows[2].average_price, "");
        assert_eq!(view.rows[2].average_band, PriceBand::NoData);
        assert_eq!(view.totals_display.weighted_average, "—");
    }

    #[test]
    fn test_empty_table_view() {
        let view = TableView::from_table(&SimulationTable::empty());
        assert!(view.rows.is_empty());
        assert!(view.selection.is_none());
        assert!(view.sort.is_none());
    }
}
