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

//! Quarter-hour electricity price explorer: feed parsing, quartile bands,
//! chart series and the consumption simulation table.

pub mod chart;
pub mod config;
pub mod display;
pub mod error;
pub mod feed;
pub mod fetch;
pub mod presentation;
pub mod quartiles;
pub mod series;
pub mod session;
pub mod simulation;

pub use chart::ChartData;
pub use config::{DisplayConfig, FeedConfig, FeedLayout, TarifaConfig};
pub use error::{ConfigError, FetchError, Result, TarifaError};
pub use feed::{ParsedFeed, RawRecord, SummaryTable, TableRecord, parse_decimal, parse_feed};
pub use fetch::{FeedSource, FileFeedSource, HttpFeedSource};
pub use presentation::{PresentationAdapter, TableRowView, TableView, TotalsView};
pub use quartiles::{classify, quartiles, quartiles_of};
pub use series::{SeriesGroup, SeriesIndex};
pub use session::{LoadOutcome, LoadTicket, LoadedFeed, Session};
pub use simulation::{SimulationRow, SimulationTable, TablePhase, Totals};
