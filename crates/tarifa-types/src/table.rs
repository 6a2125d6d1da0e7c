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
use std::str::FromStr;

/// Sortable columns of the simulation table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    Hour,
    MarketPrice,
    AveragePrice,
    Consumption,
    Cost,
}

impl SortColumn {
    pub const ALL: [SortColumn; 5] = [
        SortColumn::Hour,
        SortColumn::MarketPrice,
        SortColumn::AveragePrice,
        SortColumn::Consumption,
        SortColumn::Cost,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::MarketPrice => "market_price",
            Self::AveragePrice => "average_price",
            Self::Consumption => "consumption",
            Self::Cost => "cost",
        }
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Column name that does not match any [`SortColumn`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortColumn(pub String);

impl fmt::Display for UnknownSortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown sort column: {}", self.0)
    }
}

impl std::error::Error for UnknownSortColumn {}

impl FromStr for SortColumn {
    type Err = UnknownSortColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hour" => Ok(Self::Hour),
            "market_price" | "market" => Ok(Self::MarketPrice),
            "average_price" | "average" => Ok(Self::AveragePrice),
            "consumption" => Ok(Self::Consumption),
            "cost" => Ok(Self::Cost),
            _ => Err(UnknownSortColumn(s.to_owned())),
        }
    }
}

/// Sort direction; the multiplier applied after null substitution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}
