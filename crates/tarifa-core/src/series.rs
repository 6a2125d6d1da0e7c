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

//! Day → tariff → option lookup of quarter-hour series.
//!
//! Every level iterates in order of first appearance in the feed, which is
//! the order the selectors offer.

use crate::feed::RawRecord;
use serde::Serialize;
use std::collections::HashMap;
use tarifa_types::Selection;

/// Parallel, index-aligned sequences for one day/tariff/option.
///
/// Index `i` of every sequence refers to the same time slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SeriesGroup {
    pub slots: Vec<String>,
    pub value: Vec<Option<f64>>,
    pub market_price: Vec<Option<f64>>,
    pub grid_access_tariff: Vec<Option<f64>>,
    pub market_plus_grid: Vec<Option<f64>>,
}

impl SeriesGroup {
    fn push(&mut self, record: &RawRecord) {
        self.slots.push(record.slot_label.clone());
        self.value.push(record.value);
        self.market_price.push(record.market_price);
        self.grid_access_tariff.push(record.grid_access_tariff);
        self.market_plus_grid.push(record.market_plus_grid);
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// Map preserving first-insertion order of its keys
#[derive(Debug, Clone)]
struct Ordered<V> {
    entries: Vec<(String, V)>,
    positions: HashMap<String, usize>,
}

impl<V> Default for Ordered<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }
}

impl<V: Default> Ordered<V> {
    fn entry(&mut self, key: &str) -> &mut V {
        let idx = match self.positions.get(key) {
            Some(&idx) => idx,
            None => {
                self.entries.push((key.to_owned(), V::default()));
                let idx = self.entries.len() - 1;
                self.positions.insert(key.to_owned(), idx);
                idx
            }
        };
        &mut self.entries[idx].1
    }
}

impl<V> Ordered<V> {
    fn get(&self, key: &str) -> Option<&V> {
        self.positions.get(key).map(|&idx| &self.entries[idx].1)
    }

    fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    fn values(&self) -> impl Iterator<Item = &V> {
        self.entries.iter().map(|(_, v)| v)
    }
}

type OptionMap = Ordered<SeriesGroup>;
type TariffMap = Ordered<OptionMap>;

#[derive(Debug, Clone, Default)]
pub struct SeriesIndex {
    days: Ordered<TariffMap>,
}

impl SeriesIndex {
    /// Group records by day, tariff and option, keeping source slot order
    pub fn build(records: &[RawRecord]) -> Self {
        let mut days: Ordered<TariffMap> = Ordered::default();
        for record in records {
            days.entry(&record.day)
                .entry(&record.tariff)
                .entry(&record.option)
                .push(record);
        }
        Self { days }
    }

    /// Group for `selection`, `None` when the key never appeared
    pub fn get(&self, selection: &Selection) -> Option<&SeriesGroup> {
        self.days
            .get(&selection.day)?
            .get(&selection.tariff)?
            .get(&selection.option)
    }

    pub fn days(&self) -> Vec<&str> {
        self.days.keys().collect()
    }

    pub fn tariffs(&self, day: &str) -> Vec<&str> {
        self.days
            .get(day)
            .map(|t| t.keys().collect())
            .unwrap_or_default()
    }

    pub fn options(&self, day: &str, tariff: &str) -> Vec<&str> {
        self.days
            .get(day)
            .and_then(|t| t.get(tariff))
            .map(|o| o.keys().collect())
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.days.entries.is_empty()
    }

    /// Number of distinct day/tariff/option groups
    pub fn group_count(&self) -> usize {
        self.days
            .values()
            .flat_map(Ordered::values)
            .map(|options| options.entries.len())
            .sum()
    }
}
