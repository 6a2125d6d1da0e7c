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

/// Severity band a price falls into relative to the quartiles of its series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceBand {
    /// `v <= q1`
    Low,
    /// `q1 < v <= q2`
    LowMid,
    /// `q2 < v <= q3`
    MidHigh,
    /// `v > q3`
    High,
    /// Missing or unparseable value
    NoData,
}

impl PriceBand {
    /// The four priced bands in stacking order (cheapest first)
    pub const PRICED: [PriceBand; 4] = [
        PriceBand::Low,
        PriceBand::LowMid,
        PriceBand::MidHigh,
        PriceBand::High,
    ];

    /// Position of the band in [`PriceBand::PRICED`], `None` for `NoData`
    pub fn index(self) -> Option<usize> {
        match self {
            Self::Low => Some(0),
            Self::LowMid => Some(1),
            Self::MidHigh => Some(2),
            Self::High => Some(3),
            Self::NoData => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::LowMid => "Low/Mid",
            Self::MidHigh => "Mid/High",
            Self::High => "High",
            Self::NoData => "No data",
        }
    }
}

/// Interpolated quartiles of one numeric series.
///
/// Never persisted: derived again whenever the underlying series changes.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QuartileSet {
    pub q1: f64,
    pub q2: f64,
    pub q3: f64,
}

impl QuartileSet {
    /// Quartiles of an empty series
    pub const ZERO: QuartileSet = QuartileSet {
        q1: 0.0,
        q2: 0.0,
        q3: 0.0,
    };
}
