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

//! Chart series assembled from one series group.
//!
//! The bar series is split into four band series: slot `i` carries the value
//! in exactly the series of its band and `None` in the other three, so a
//! stacked renderer paints each bar in a single color.

use crate::quartiles::{classify, quartiles};
use crate::series::SeriesGroup;
use serde::Serialize;
use tarifa_types::{PriceBand, QuartileSet, Selection};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    /// `"{tariff} | {option} | {day}"`
    pub title: String,
    pub slots: Vec<String>,
    pub values: Vec<Option<f64>>,
    pub quartiles: QuartileSet,
    /// Indexed by [`PriceBand::index`]
    pub bands: [Vec<Option<f64>>; 4],
    pub market_price: Vec<Option<f64>>,
    pub grid_access_tariff: Vec<Option<f64>>,
    pub market_plus_grid: Vec<Option<f64>>,
}

impl ChartData {
    pub fn build(selection: &Selection, group: &SeriesGroup) -> Self {
        let quartiles = quartiles(&group.value);
        let mut bands: [Vec<Option<f64>>; 4] = Default::default();
        for series in &mut bands {
            series.resize(group.len(), None);
        }

        for (slot, value) in group.value.iter().enumerate() {
            if let Some(band) = classify(*value, &quartiles).index() {
                bands[band][slot] = *value;
            }
        }

        Self {
            title: selection.to_string(),
            slots: group.slots.clone(),
            values: group.value.clone(),
            quartiles,
            bands,
            market_price: group.market_price.clone(),
            grid_access_tariff: group.grid_access_tariff.clone(),
            market_plus_grid: group.market_plus_grid.clone(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn band_at(&self, slot: usize) -> PriceBand {
        classify(self.values.get(slot).copied().flatten(), &self.quartiles)
    }

    pub fn is_negative(&self, slot: usize) -> bool {
        matches!(self.values.get(slot), Some(Some(v)) if *v < 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(values: &[Option<f64>]) -> SeriesGroup {
        SeriesGroup {
            slots: (0..values.len()).map(|i| format!("s{i}")).collect(),
            value: values.to_vec(),
            market_price: vec![Some(50.0); values.len()],
            grid_access_tariff: vec![Some(0.05); values.len()],
            market_plus_grid: vec![None; values.len()],
        }
    }

    #[test]
    fn test_each_slot_lands_in_one_band() {
        let values = [Some(5.0), Some(10.0), Some(15.0), Some(20.0), None];
        let chart = ChartData::build(&Selection::new("d", "A", "Simple"), &group(&values));

        assert_eq!(chart.title, "A | Simple | d");
        assert_eq!(chart.bands[0], vec![Some(5.0), None, None, None, None]);
        assert_eq!(chart.bands[1], vec![None, Some(10.0), None, None, None]);
        assert_eq!(chart.bands[2], vec![None, None, Some(15.0), None, None]);
        assert_eq!(chart.bands[3], vec![None, None, None, Some(20.0), None]);
        assert_eq!(chart.band_at(4), PriceBand::NoData);
    }

    #[test]
    fn test_series_stay_aligned_with_slots() {
        let values = [Some(0.1), None, Some(0.3)];
        let chart = ChartData::build(&Selection::new("d", "A", "Simple"), &group(&values));

        assert_eq!(chart.len(), 3);
        for band in &chart.bands {
            assert_eq!(band.len(), 3);
        }
        assert_eq!(chart.grid_access_tariff.len(), 3);
        assert_eq!(chart.market_plus_grid.len(), 3);
    }

    #[test]
    fn test_band_at_matches_classifier() {
        let values = [Some(-0.02), Some(0.0), Some(0.08), Some(0.12), Some(0.2)];
        let chart = ChartData::build(&Selection::new("d", "A", "Simple"), &group(&values));

        for (slot, value) in values.iter().enumerate() {
            assert_eq!(chart.band_at(slot), classify(*value, &chart.quartiles));
        }
        assert!(chart.is_negative(0));
        assert!(!chart.is_negative(1));
        assert!(!chart.is_negative(99));
    }

    #[test]
    fn test_empty_group() {
        let chart = ChartData::build(&Selection::new("d", "A", "Simple"), &SeriesGroup::default());
        assert!(chart.is_empty());
        assert_eq!(chart.quartiles, QuartileSet::ZERO);
        assert!(chart.bands.iter().all(Vec::is_empty));
    }
}
