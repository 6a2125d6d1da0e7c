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

//! Interpolated quartiles and four-band price classification.
//!
//! Chart bars and table cells both go through [`quartiles`] and
//! [`classify`], so one value always lands in the same band.

use tarifa_types::{PriceBand, QuartileSet};

/// Linear interpolation between order statistics at `(n - 1) * q`.
///
/// `sorted` must be ascending and non-empty.
#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss
)]
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = (sorted.len() - 1) as f64 * q;
    let base = position.floor();
    let rest = position - base;
    let base = base as usize;

    match sorted.get(base + 1) {
        Some(next) => sorted[base] + rest * (next - sorted[base]),
        None => sorted[base],
    }
}

/// Quartiles of the non-null, non-NaN entries of `values`.
///
/// An empty filtered series yields [`QuartileSet::ZERO`].
pub fn quartiles(values: &[Option<f64>]) -> QuartileSet {
    quartiles_of(values.iter().copied().flatten())
}

pub fn quartiles_of(values: impl IntoIterator<Item = f64>) -> QuartileSet {
    let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
    if sorted.is_empty() {
        return QuartileSet::ZERO;
    }
    sorted.sort_by(f64::total_cmp);

    QuartileSet {
        q1: quantile(&sorted, 0.25),
        q2: quantile(&sorted, 0.5),
        q3: quantile(&sorted, 0.75),
    }
}

/// Band of `value`; boundaries are inclusive on the upper side (`<=`).
pub fn classify(value: Option<f64>, quartiles: &QuartileSet) -> PriceBand {
    match value {
        None => PriceBand::NoData,
        Some(v) if v.is_nan() => PriceBand::NoData,
        Some(v) if v <= quartiles.q1 => PriceBand::Low,
        Some(v) if v <= quartiles.q2 => PriceBand::LowMid,
        Some(v) if v <= quartiles.q3 => PriceBand::MidHigh,
        Some(_) => PriceBand::High,
    }
}
