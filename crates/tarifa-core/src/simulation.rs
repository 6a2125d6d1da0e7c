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

//! Consumption simulation table.
//!
//! Lifecycle: `Empty` → `Built` (one build per selection change) →
//! `Sorted` (any column, either direction, repeatable) → rebuilt wholesale
//! on the next selection change. Consumption edits mutate rows in place.

use crate::feed::{TableRecord, parse_decimal};
use crate::quartiles::{classify, quartiles_of};
use serde::Serialize;
use tarifa_types::{PriceBand, QuartileSet, Selection, SortColumn, SortDirection};
use tracing::debug;

/// Sort key standing in for a missing value, applied before the direction
pub const NULL_SORT_KEY: f64 = -1.0e15;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulationRow {
    pub hour: String,
    pub market_price: Option<f64>,
    pub average_price: Option<f64>,
    pub consumption: f64,
    /// Always `consumption * average_price.unwrap_or(0.0)`
    pub cost: f64,
    pub market_band: PriceBand,
    pub average_band: PriceBand,
}

impl SimulationRow {
    /// Rows without an average price accept no consumption
    pub fn is_enabled(&self) -> bool {
        self.average_price.is_some()
    }

    /// Integer hour from the leading digits of the label, e.g. `[9:00-10:00[` → 9
    pub fn hour_number(&self) -> Option<u32> {
        let digits: String = self
            .hour
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }

    fn apply_consumption(&mut self, consumption: f64) -> f64 {
        let consumption = if consumption.is_nan() { 0.0 } else { consumption };
        match self.average_price {
            Some(price) => {
                self.consumption = consumption;
                self.cost = consumption * price;
            }
            None => {
                if consumption != 0.0 {
                    debug!("Ignoring consumption for {}: no average price", self.hour);
                }
                self.consumption = 0.0;
                self.cost = 0.0;
            }
        }
        self.cost
    }

    fn sort_key(&self, column: SortColumn) -> f64 {
        let key = match column {
            SortColumn::Hour => self.hour_number().map(f64::from),
            SortColumn::MarketPrice => self.market_price,
            SortColumn::AveragePrice => self.average_price,
            SortColumn::Consumption => Some(self.consumption),
            SortColumn::Cost => Some(self.cost),
        };
        key.unwrap_or(NULL_SORT_KEY)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Totals {
    pub consumption: f64,
    pub cost: f64,
    /// `cost / consumption`, `None` while nothing is consumed
    pub weighted_average: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TablePhase {
    Empty,
    Built,
    Sorted,
}

/// Parse free-text consumption entry; anything unparseable counts as zero
pub fn parse_consumption(input: &str) -> f64 {
    parse_decimal(input).unwrap_or(0.0)
}

#[derive(Debug, Clone, Default)]
pub struct SimulationTable {
    selection: Option<Selection>,
    rows: Vec<SimulationRow>,
    market_quartiles: QuartileSet,
    average_quartiles: QuartileSet,
    sort: Option<(SortColumn, SortDirection)>,
}

impl SimulationTable {
    /// Table in the `Empty` phase
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build rows for `selection` from the hourly block, in source order.
    ///
    /// Unknown selections produce a built table with no rows.
    pub fn build(table_rows: &[TableRecord], selection: &Selection) -> Self {
        let matching: Vec<&TableRecord> = table_rows
            .iter()
            .filter(|r| selection.matches(&r.day, &r.tariff, &r.option))
            .collect();

        let market_quartiles = quartiles_of(matching.iter().filter_map(|r| r.market_price));
        let average_quartiles = quartiles_of(matching.iter().filter_map(|r| r.average_price));

        let rows: Vec<SimulationRow> = matching
            .iter()
            .map(|r| SimulationRow {
                hour: r.hour.clone(),
                market_price: r.market_price,
                average_price: r.average_price,
                consumption: 0.0,
                cost: 0.0,
                market_band: classify(r.market_price, &market_quartiles),
                average_band: classify(r.average_price, &average_quartiles),
            })
            .collect();

        debug!("Built simulation table for {selection}: {} rows", rows.len());

        Self {
            selection: Some(selection.clone()),
            rows,
            market_quartiles,
            average_quartiles,
            sort: None,
        }
    }

    pub fn phase(&self) -> TablePhase {
        match (&self.selection, self.sort) {
            (None, _) => TablePhase::Empty,
            (Some(_), None) => TablePhase::Built,
            (Some(_), Some(_)) => TablePhase::Sorted,
        }
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn rows(&self) -> &[SimulationRow] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&SimulationRow> {
        self.rows.get(index)
    }

    pub fn market_quartiles(&self) -> QuartileSet {
        self.market_quartiles
    }

    pub fn average_quartiles(&self) -> QuartileSet {
        self.average_quartiles
    }

    /// Active sort column and direction
    pub fn sort_state(&self) -> Option<(SortColumn, SortDirection)> {
        self.sort
    }

    /// Current position of the row labelled `hour`
    pub fn find_row(&self, hour: &str) -> Option<usize> {
        self.rows.iter().position(|r| r.hour == hour.trim())
    }

    /// Set consumption from user text (decimal comma accepted).
    ///
    /// Returns the row's new cost, `None` when `index` is out of range.
    pub fn set_consumption(&mut self, index: usize, input: &str) -> Option<f64> {
        self.set_consumption_value(index, parse_consumption(input))
    }

    pub fn set_consumption_value(&mut self, index: usize, consumption: f64) -> Option<f64> {
        let Some(row) = self.rows.get_mut(index) else {
            debug!("Consumption edit for missing row {index} ignored");
            return None;
        };
        Some(row.apply_consumption(consumption))
    }

    pub fn totals(&self) -> Totals {
        let consumption: f64 = self.rows.iter().map(|r| r.consumption).sum();
        let cost: f64 = self.rows.iter().map(|r| r.cost).sum();
        let weighted_average = (consumption > 0.0).then(|| cost / consumption);

        Totals {
            consumption,
            cost,
            weighted_average,
        }
    }

    /// Sort by `column`: the same column again toggles direction, a new
    /// column starts ascending. Missing values take [`NULL_SORT_KEY`].
    pub fn sort(&mut self, column: SortColumn) {
        let direction = match self.sort {
            Some((active, direction)) if active == column => direction.toggled(),
            _ => SortDirection::Ascending,
        };

        self.rows.sort_by(|a, b| {
            let ordering = a.sort_key(column).total_cmp(&b.sort_key(column));
            match direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        self.sort = Some((column, direction));
    }

    /// Reducer form of [`SimulationTable::sort`]
    #[must_use]
    pub fn sorted(mut self, column: SortColumn) -> Self {
        self.sort(column);
        self
    }

    /// Sort by column name; unknown names are a no-op. Returns whether it sorted.
    pub fn sort_by_name(&mut self, name: &str) -> bool {
        match name.parse::<SortColumn>() {
            Ok(column) => {
                self.sort(column);
                true
            }
            Err(e) => {
                debug!("Sort ignored: {e}");
                false
            }
        }
    }
}
