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

use serde::{Deserialize, Serialize};
use std::fmt;

/// Day / tariff / option triple identifying one series group
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Selection {
    pub day: String,
    pub tariff: String,
    pub option: String,
}

impl Selection {
    pub fn new(day: impl Into<String>, tariff: impl Into<String>, option: impl Into<String>) -> Self {
        Self {
            day: day.into(),
            tariff: tariff.into(),
            option: option.into(),
        }
    }

    /// Whether a feed row with these key cells belongs to this selection
    pub fn matches(&self, day: &str, tariff: &str, option: &str) -> bool {
        self.day == day && self.tariff == tariff && self.option == option
    }
}

/// Title form used by chart and table headings: `tariff | option | day`
impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} | {}", self.tariff, self.option, self.day)
    }
}
