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

//! Number formatting shared by every presentation adapter

/// Placeholder for a weighted average over zero consumption
pub const UNDEFINED_AVERAGE: &str = "—";

/// Tooltip text for a chart point without data
pub const NOT_AVAILABLE: &str = "not available";

/// Price with 5 decimals, empty for a missing cell
pub fn format_price(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.5}")).unwrap_or_default()
}

/// Price with 5 decimals and unit, e.g. `0.12345 €/kWh`
pub fn format_price_with_unit(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) => format!("{v:.5} {unit}"),
        None => NOT_AVAILABLE.to_owned(),
    }
}

/// Wholesale market price (€/MWh) with 2 decimals
pub fn format_market_price(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

pub fn format_cost(cost: f64) -> String {
    format!("{cost:.4}")
}

pub fn format_consumption(consumption: f64) -> String {
    format!("{consumption:.3}")
}

pub fn format_weighted_average(average: Option<f64>) -> String {
    match average {
        Some(v) => format!("{v:.5}"),
        None => UNDEFINED_AVERAGE.to_owned(),
    }
}
