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

//! Session context owning every piece of derived state.
//!
//! Until a load has been applied every user action is a no-op. Loads are
//! ticketed: a result only lands if no newer load completed first.

use crate::chart::ChartData;
use crate::config::{FeedLayout, TarifaConfig};
use crate::error::FetchError;
use crate::feed::{ParsedFeed, SummaryTable, TableRecord, parse_feed};
use crate::fetch::FeedSource;
use crate::presentation::{PresentationAdapter, TableView};
use crate::series::SeriesIndex;
use crate::simulation::{SimulationTable, TablePhase};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use tarifa_types::{Selection, SortColumn};
use tracing::{debug, error, info};

/// Handle for one in-flight load; later tickets compare greater
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct LoadTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// A newer load already completed; the result was dropped
    Stale,
    Failed,
}

/// Everything derived from one successfully parsed feed
#[derive(Debug, Clone)]
pub struct LoadedFeed {
    index: SeriesIndex,
    table_rows: Vec<TableRecord>,
    constants: BTreeMap<String, f64>,
    market_summary: Option<SummaryTable>,
    futures: Option<SummaryTable>,
    skipped_rows: usize,
    loaded_at: DateTime<Utc>,
}

impl LoadedFeed {
    fn from_parsed(parsed: ParsedFeed) -> Self {
        Self {
            index: SeriesIndex::build(&parsed.records),
            table_rows: parsed.table_rows,
            constants: parsed.constants,
            market_summary: parsed.market_summary,
            futures: parsed.futures,
            skipped_rows: parsed.skipped_rows,
            loaded_at: Utc::now(),
        }
    }

    pub fn index(&self) -> &SeriesIndex {
        &self.index
    }

    pub fn table_rows(&self) -> &[TableRecord] {
        &self.table_rows
    }

    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

#[derive(Debug)]
pub struct Session<A: PresentationAdapter> {
    layout: FeedLayout,
    adapter: A,
    feed: Option<LoadedFeed>,
    selection: Option<Selection>,
    simulation_enabled: bool,
    table: SimulationTable,
    issued: u64,
    applied: Option<LoadTicket>,
}

impl<A: PresentationAdapter> Session<A> {
    pub fn new(layout: FeedLayout, adapter: A) -> Self {
        Self {
            layout,
            adapter,
            feed: None,
            selection: None,
            simulation_enabled: false,
            table: SimulationTable::empty(),
            issued: 0,
            applied: None,
        }
    }

    pub fn from_config(config: &TarifaConfig, adapter: A) -> Self {
        Self::new(config.layout.clone(), adapter)
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn into_adapter(self) -> A {
        self.adapter
    }

    pub fn begin_load(&mut self) -> LoadTicket {
        self.issued += 1;
        LoadTicket(self.issued)
    }

    /// Apply the result of the load identified by `ticket`.
    ///
    /// Failures are reported to the adapter once; existing state is kept.
    pub fn complete_load(
        &mut self,
        ticket: LoadTicket,
        result: Result<String, FetchError>,
    ) -> LoadOutcome {
        if self.applied.is_some_and(|applied| applied >= ticket) {
            debug!("Dropping result of load {ticket:?}: a newer load already completed");
            return LoadOutcome::Stale;
        }

        match result {
            Ok(text) => {
                self.apply_text(&text);
                self.applied = Some(ticket);
                LoadOutcome::Applied
            }
            Err(e) => {
                error!("Failed to load price feed: {e}");
                self.adapter
                    .report_error(&format!("Failed to load price data: {e}"));
                LoadOutcome::Failed
            }
        }
    }

    /// Fetch from `source` and apply the result immediately
    pub fn load(&mut self, source: &dyn FeedSource) -> LoadOutcome {
        let ticket = self.begin_load();
        debug!("Load {ticket:?} from {}", source.describe());
        let result = source.fetch();
        self.complete_load(ticket, result)
    }

    pub fn load_text(&mut self, text: &str) -> LoadOutcome {
        let ticket = self.begin_load();
        self.complete_load(ticket, Ok(text.to_owned()))
    }

    fn apply_text(&mut self, text: &str) {
        let feed = LoadedFeed::from_parsed(parse_feed(text, &self.layout));
        info!(
            "Loaded price feed: {} days, {} series groups, {} hourly rows, {} constants, {} rows skipped",
            feed.index.days().len(),
            feed.index.group_count(),
            feed.table_rows.len(),
            feed.constants.len(),
            feed.skipped_rows
        );

        let first_day = feed.index.days().first().map(|d| (*d).to_owned());
        self.feed = Some(feed);
        self.selection = None;
        self.table = SimulationTable::empty();

        match first_day {
            Some(day) => self.select_day(&day),
            None => info!("Price feed contains no series"),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.feed.is_some()
    }

    pub fn feed(&self) -> Option<&LoadedFeed> {
        self.feed.as_ref()
    }

    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.feed.as_ref().map(LoadedFeed::loaded_at)
    }

    pub fn days(&self) -> Vec<String> {
        self.feed
            .as_ref()
            .map(|f| f.index.days().into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn tariffs(&self, day: &str) -> Vec<String> {
        self.feed
            .as_ref()
            .map(|f| f.index.tariffs(day).into_iter().map(str::to_owned).collect())
            .unwrap_or_default()
    }

    pub fn options(&self, day: &str, tariff: &str) -> Vec<String> {
        self.feed
            .as_ref()
            .map(|f| {
                f.index
                    .options(day, tariff)
                    .into_iter()
                    .map(str::to_owned)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Select `day` with its first tariff and that tariff's first option
    pub fn select_day(&mut self, day: &str) {
        if !self.is_loaded() {
            debug!("Ignoring day selection before the feed is loaded");
            return;
        }
        let tariff = self.tariffs(day).into_iter().next().unwrap_or_default();
        let option = self.options(day, &tariff).into_iter().next().unwrap_or_default();
        self.select(Selection::new(day, tariff, option));
    }

    /// Keep the day, switch tariff, pick its first option
    pub fn select_tariff(&mut self, tariff: &str) {
        let Some(day) = self.selection.as_ref().map(|s| s.day.clone()) else {
            debug!("Ignoring tariff selection without a day");
            return;
        };
        let option = self.options(&day, tariff).into_iter().next().unwrap_or_default();
        self.select(Selection::new(day, tariff, option));
    }

    pub fn select_option(&mut self, option: &str) {
        let Some(current) = self.selection.as_ref() else {
            debug!("Ignoring option selection without a tariff");
            return;
        };
        let selection = Selection::new(current.day.clone(), current.tariff.clone(), option);
        self.select(selection);
    }

    /// Set the full selection, redraw the chart and rebuild the table if shown
    pub fn select(&mut self, selection: Selection) {
        if !self.is_loaded() {
            debug!("Ignoring selection {selection} before the feed is loaded");
            return;
        }
        debug!("Selected {selection}");
        self.selection = Some(selection);
        self.redraw_chart();
        if self.simulation_enabled {
            self.rebuild_table();
        }
    }

    /// Chart for the current selection, `None` when nothing matches
    pub fn chart(&self) -> Option<ChartData> {
        let feed = self.feed.as_ref()?;
        let selection = self.selection.as_ref()?;
        let group = feed.index.get(selection)?;
        Some(ChartData::build(selection, group))
    }

    /// Render the chart again without touching the simulation table
    pub fn redraw_chart(&mut self) {
        match self.chart() {
            Some(chart) => self.adapter.render_chart(&chart),
            None => debug!("No series for the current selection, chart not drawn"),
        }
    }

    pub fn simulation_enabled(&self) -> bool {
        self.simulation_enabled
    }

    pub fn set_simulation_enabled(&mut self, enabled: bool) {
        self.simulation_enabled = enabled;
        if enabled {
            self.rebuild_table();
        } else {
            self.table = SimulationTable::empty();
        }
    }

    pub fn table(&self) -> &SimulationTable {
        &self.table
    }

    fn rebuild_table(&mut self) {
        let (Some(feed), Some(selection)) = (self.feed.as_ref(), self.selection.as_ref()) else {
            debug!("Simulation table not built: no data or selection yet");
            return;
        };
        self.table = SimulationTable::build(&feed.table_rows, selection);
        self.render_table();
    }

    fn render_table(&mut self) {
        let view = TableView::from_table(&self.table);
        self.adapter.render_table(&view);
    }

    /// Consumption entry for row `index`; returns the row's new cost
    pub fn edit_consumption(&mut self, index: usize, input: &str) -> Option<f64> {
        if self.table.phase() == TablePhase::Empty {
            debug!("Ignoring consumption edit: simulation table is empty");
            return None;
        }
        let cost = self.table.set_consumption(index, input)?;
        self.render_table();
        Some(cost)
    }

    /// Header click by column name; unknown names do nothing
    pub fn sort_table(&mut self, column: &str) -> bool {
        if self.table.phase() == TablePhase::Empty {
            debug!("Ignoring sort on {column}: simulation table is empty");
            return false;
        }
        let sorted = self.table.sort_by_name(column);
        if sorted {
            self.render_table();
        }
        sorted
    }

    pub fn sort_table_by(&mut self, column: SortColumn) {
        if self.table.phase() == TablePhase::Empty {
            return;
        }
        self.table.sort(column);
        self.render_table();
    }

    pub fn constants(&self) -> Option<&BTreeMap<String, f64>> {
        self.feed.as_ref().map(|f| &f.constants)
    }

    pub fn market_summary(&self) -> Option<&SummaryTable> {
        self.feed.as_ref()?.market_summary.as_ref()
    }

    pub fn futures(&self) -> Option<&SummaryTable> {
        self.feed.as_ref()?.futures.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Counting {
        charts: usize,
        tables: usize,
        errors: Vec<String>,
    }

    impl PresentationAdapter for Counting {
        fn render_chart(&mut self, _chart: &ChartData) {
            self.charts += 1;
        }

        fn render_table(&mut self, _table: &TableView) {
            self.tables += 1;
        }

        fn report_error(&mut self, message: &str) {
            self.errors.push(message.to_owned());
        }
    }

    const FEED: &str = "Dia,Tarifário,Opção,Intervalo,Preço,OMIE,TAR,Total\n\
                        d1,A,Simples,[00:00-00:15[,0.10,50,0.05,0.1\n\
                        d1,A,Simples,[00:15-00:30[,0.20,60,0.05,0.1\n\
                        d1,B,Bi,[00:00-00:15[,0.30,50,0.05,0.1\n\
                        \n\
                        ,,,,,,,,,,TABELA_HORARIA\n\
                        ,,,,,,,,,,Dia,Tarifario,Opcao,Hora,OMIE,Media\n\
                        ,,,,,,,,,,d1,A,Simples,[0:00-1:00[,55,0.15\n";

    fn session() -> Session<Counting> {
        Session::new(FeedLayout::default(), Counting::default())
    }

    #[test]
    fn test_actions_before_load_are_noops() {
        let mut s = session();
        s.select_day("d1");
        s.select_tariff("A");
        s.select_option("Simples");
        s.set_simulation_enabled(true);
        assert!(s.edit_consumption(0, "1").is_none());
        assert!(!s.sort_table("hour"));
        s.redraw_chart();

        assert!(!s.is_loaded());
        assert!(s.selection().is_none());
        assert!(s.days().is_empty());
        assert!(s.chart().is_none());
        assert_eq!(s.table().phase(), TablePhase::Empty);
        assert_eq!(s.adapter().charts, 0);
        assert_eq!(s.adapter().tables, 0);
    }

    #[test]
    fn test_load_selects_first_series_and_draws() {
        let mut s = session();
        assert_eq!(s.load_text(FEED), LoadOutcome::Applied);

        assert_eq!(s.selection(), Some(&Selection::new("d1", "A", "Simples")));
        assert_eq!(s.adapter().charts, 1);
        assert_eq!(s.adapter().tables, 0);
        assert!(s.loaded_at().is_some());
    }

    #[test]
    fn test_stale_result_is_dropped() {
        let mut s = session();
        let older = s.begin_load();
        let newer = s.begin_load();

        assert_eq!(s.complete_load(newer, Ok(FEED.to_owned())), LoadOutcome::Applied);
        assert_eq!(
            s.complete_load(older, Ok("Dia\nd9,Z,Z,s,1,1,1,1\n".to_owned())),
            LoadOutcome::Stale
        );
        assert_eq!(s.days(), vec!["d1"]);
    }

    #[test]
    fn test_older_result_applies_when_newer_still_pending() {
        let mut s = session();
        let older = s.begin_load();
        let _newer = s.begin_load();

        assert_eq!(s.complete_load(older, Ok(FEED.to_owned())), LoadOutcome::Applied);
        assert!(s.is_loaded());
    }

    #[test]
    fn test_failure_reported_once_and_state_stays_empty() {
        let mut s = session();
        let ticket = s.begin_load();
        let outcome = s.complete_load(
            ticket,
            Err(FetchError::Status {
                url: "http://feed".to_owned(),
                status: 404,
            }),
        );

        assert_eq!(outcome, LoadOutcome::Failed);
        assert_eq!(s.adapter().errors.len(), 1);
        assert!(s.adapter().errors[0].contains("404"));
        assert!(!s.is_loaded());
        assert!(s.chart().is_none());
    }

    #[test]
    fn test_toggle_builds_and_discards_table() {
        let mut s = session();
        s.load_text(FEED);

        s.set_simulation_enabled(true);
        assert_eq!(s.table().phase(), TablePhase::Built);
        assert_eq!(s.table().rows().len(), 1);
        assert_eq!(s.adapter().tables, 1);

        s.set_simulation_enabled(false);
        assert_eq!(s.table().phase(), TablePhase::Empty);
        assert!(s.table().rows().is_empty());
    }

    #[test]
    fn test_tariff_change_rebuilds_table() {
        let mut s = session();
        s.load_text(FEED);
        s.set_simulation_enabled(true);
        s.edit_consumption(0, "2");
        assert!(s.table().totals().consumption > 0.0);

        s.select_tariff("B");
        assert_eq!(s.selection(), Some(&Selection::new("d1", "B", "Bi")));
        assert!(s.table().rows().is_empty());
        assert_eq!(s.table().phase(), TablePhase::Built);
    }

    #[test]
    fn test_redraw_leaves_table_alone() {
        let mut s = session();
        s.load_text(FEED);
        s.set_simulation_enabled(true);
        s.edit_consumption(0, "3");
        let before = s.table().rows().to_vec();
        let tables = s.adapter().tables;

        s.redraw_chart();

        assert_eq!(s.table().rows(), before.as_slice());
        assert_eq!(s.adapter().tables, tables);
        assert_eq!(s.adapter().charts, 2);
    }
}
