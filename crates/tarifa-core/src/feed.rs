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

//! CSV feed parser.
//!
//! The published spreadsheet export carries several logical blocks in one
//! text:
//!
//! - **Primary block**: quarter-hour series, columns 0-7, header on row 1
//! - **Hourly table block**: columns 10-15, introduced by a marker row
//! - **Constants block**: key/value in columns 18/19, ends at a blank line
//! - **Market summary / futures blocks**: display tables from column 18
//!
//! Parsing never fails. Short rows are skipped, missing markers yield empty
//! blocks and unparseable numbers become `None`.

use crate::config::FeedLayout;
use csv::{ReaderBuilder, StringRecord};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Column offsets of every block in the feed
pub mod columns {
    pub const DAY: usize = 0;
    pub const TARIFF: usize = 1;
    pub const OPTION: usize = 2;
    pub const SLOT: usize = 3;
    pub const VALUE: usize = 4;
    pub const MARKET_PRICE: usize = 5;
    pub const GRID_ACCESS_TARIFF: usize = 6;
    pub const MARKET_PLUS_GRID: usize = 7;
    pub const PRIMARY_MIN_FIELDS: usize = 8;

    pub const TABLE_DAY: usize = 10;
    pub const TABLE_TARIFF: usize = 11;
    pub const TABLE_OPTION: usize = 12;
    pub const TABLE_HOUR: usize = 13;
    pub const TABLE_MARKET_PRICE: usize = 14;
    pub const TABLE_AVERAGE_PRICE: usize = 15;
    pub const TABLE_MIN_FIELDS: usize = 16;

    pub const CONSTANT_KEY: usize = 18;
    pub const CONSTANT_VALUE: usize = 19;

    pub const SUMMARY_FIRST: usize = 18;
    pub const FUTURES_WIDTH: usize = 8;
    pub const MARKET_SUMMARY_HEADER_ROWS: usize = 2;
    pub const MARKET_SUMMARY_DATA_ROWS: usize = 3;
}

/// One row of the primary (quarter-hour) block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawRecord {
    pub day: String,
    pub tariff: String,
    pub option: String,
    pub slot_label: String,
    pub value: Option<f64>,
    pub market_price: Option<f64>,
    pub grid_access_tariff: Option<f64>,
    pub market_plus_grid: Option<f64>,
}

/// One row of the hourly simulation table block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableRecord {
    pub day: String,
    pub tariff: String,
    pub option: String,
    pub hour: String,
    pub market_price: Option<f64>,
    pub average_price: Option<f64>,
}

/// Display-only table copied verbatim from the feed
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryTable {
    pub headers: Vec<Vec<String>>,
    pub rows: Vec<Vec<String>>,
}

impl SummaryTable {
    /// Cells holding a negative number are painted differently
    pub fn is_negative_cell(cell: &str) -> bool {
        parse_decimal(cell).is_some_and(|v| v < 0.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ParsedFeed {
    pub records: Vec<RawRecord>,
    pub table_rows: Vec<TableRecord>,
    pub constants: BTreeMap<String, f64>,
    pub market_summary: Option<SummaryTable>,
    pub futures: Option<SummaryTable>,
    /// Primary and table rows dropped as malformed
    pub skipped_rows: usize,
}

/// Parse a locale number: trims, accepts a decimal comma, rejects NaN.
///
/// Empty cells and anything non-numeric become `None`, never zero.
pub fn parse_decimal(cell: &str) -> Option<f64> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return None;
    }
    let normalized = trimmed.replacen(',', ".", 1);
    match normalized.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => None,
    }
}

/// One CSV record of the feed
type Line = StringRecord;

/// Read the whole feed with a single CSV reader, one entry per line.
///
/// The reader drops empty lines, so physical lines are walked alongside it
/// and blank ones come back as `None`: block boundaries depend on them.
fn read_lines(text: &str) -> Vec<Option<Line>> {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let mut lines = Vec::new();
    let mut physical = text.lines();
    while let Some(line) = physical.next() {
        if line.is_empty() {
            lines.push(None);
            continue;
        }
        match records.next() {
            Some(Ok(record)) => {
                // quoted cells may span several physical lines
                let continuation: usize = record.iter().map(|f| f.matches('\n').count()).sum();
                for _ in 0..continuation {
                    physical.next();
                }
                lines.push((!is_blank(&record)).then_some(record));
            }
            Some(Err(e)) => {
                debug!("Skipping unreadable line {}: {e}", lines.len() + 1);
                lines.push(None);
            }
            None => break,
        }
    }
    lines
}

fn is_blank(record: &Line) -> bool {
    record.len() <= 1 && record.iter().all(|f| f.trim().is_empty())
}

fn cell(record: &Line, idx: usize) -> &str {
    record.get(idx).map_or("", str::trim)
}

fn has_marker(record: &Line, marker: &str) -> bool {
    record.iter().any(|f| f.contains(marker))
}

fn find_marker(lines: &[Option<Line>], marker: &str) -> Option<usize> {
    lines
        .iter()
        .position(|l| l.as_ref().is_some_and(|r| has_marker(r, marker)))
}

/// Non-blank records with their 1-based line number
fn non_blank(lines: &[Option<Line>]) -> impl Iterator<Item = (usize, &Line)> {
    lines
        .iter()
        .enumerate()
        .filter_map(|(i, l)| l.as_ref().map(|r| (i + 1, r)))
}

/// Parse the whole feed text
pub fn parse_feed(text: &str, layout: &FeedLayout) -> ParsedFeed {
    let lines = read_lines(text);

    let (records, primary_skipped) = parse_primary(&lines);
    let (table_rows, table_skipped) = parse_table_block(&lines, &layout.table_marker);
    let constants = parse_constants(&lines, &layout.constants_marker);
    let market_summary = parse_market_summary(&lines, &layout.market_summary_marker);
    let futures = parse_futures(&lines, &layout.futures_marker);

    ParsedFeed {
        records,
        table_rows,
        constants,
        market_summary,
        futures,
        skipped_rows: primary_skipped + table_skipped,
    }
}

fn parse_primary(lines: &[Option<Line>]) -> (Vec<RawRecord>, usize) {
    let mut records = Vec::new();
    let mut skipped = 0;

    // First non-blank line is the header
    for (line_no, record) in non_blank(lines).skip(1) {
        if record.len() < columns::PRIMARY_MIN_FIELDS {
            debug!(
                "Skipping line {}: {} fields, expected at least {}",
                line_no,
                record.len(),
                columns::PRIMARY_MIN_FIELDS
            );
            skipped += 1;
            continue;
        }

        let day = cell(record, columns::DAY);
        let tariff = cell(record, columns::TARIFF);
        let option = cell(record, columns::OPTION);
        if day.is_empty() || tariff.is_empty() || option.is_empty() {
            // Marker rows and rows belonging only to side blocks
            continue;
        }

        records.push(RawRecord {
            day: day.to_owned(),
            tariff: tariff.to_owned(),
            option: option.to_owned(),
            slot_label: cell(record, columns::SLOT).to_owned(),
            value: parse_decimal(cell(record, columns::VALUE)),
            market_price: parse_decimal(cell(record, columns::MARKET_PRICE)),
            grid_access_tariff: parse_decimal(cell(record, columns::GRID_ACCESS_TARIFF)),
            market_plus_grid: parse_decimal(cell(record, columns::MARKET_PLUS_GRID)),
        });
    }

    (records, skipped)
}

fn parse_table_block(lines: &[Option<Line>], marker: &str) -> (Vec<TableRecord>, usize) {
    let mut following = non_blank(lines);
    if !following.by_ref().any(|(_, r)| has_marker(r, marker)) {
        warn!("Marker {marker} not found, hourly table block is empty");
        return (Vec::new(), 0);
    }

    let mut rows = Vec::new();
    let mut skipped = 0;

    // one header row after the marker
    for (line_no, record) in following.skip(1) {
        if record.len() < columns::TABLE_MIN_FIELDS {
            debug!(
                "Skipping table line {}: {} fields, expected at least {}",
                line_no,
                record.len(),
                columns::TABLE_MIN_FIELDS
            );
            skipped += 1;
            continue;
        }

        let day = cell(record, columns::TABLE_DAY);
        let tariff = cell(record, columns::TABLE_TARIFF);
        let option = cell(record, columns::TABLE_OPTION);
        if day.is_empty() || tariff.is_empty() || option.is_empty() {
            continue;
        }

        rows.push(TableRecord {
            day: day.to_owned(),
            tariff: tariff.to_owned(),
            option: option.to_owned(),
            hour: cell(record, columns::TABLE_HOUR).to_owned(),
            market_price: parse_decimal(cell(record, columns::TABLE_MARKET_PRICE)),
            average_price: parse_decimal(cell(record, columns::TABLE_AVERAGE_PRICE)),
        });
    }

    (rows, skipped)
}

fn parse_constants(lines: &[Option<Line>], marker: &str) -> BTreeMap<String, f64> {
    let mut constants = BTreeMap::new();
    let Some(marker_idx) = find_marker(lines, marker) else {
        warn!("Marker {marker} not found, constants block is empty");
        return constants;
    };

    for line in lines.iter().skip(marker_idx + 2) {
        let Some(record) = line else {
            break;
        };
        let key = cell(record, columns::CONSTANT_KEY);
        if key.is_empty() {
            break;
        }
        match parse_decimal(cell(record, columns::CONSTANT_VALUE)) {
            Some(value) => {
                constants.insert(key.to_owned(), value);
            }
            None => debug!("Skipping constant {key}: value is not numeric"),
        }
    }

    constants
}

fn summary_row(line: Option<&Line>, width: Option<usize>) -> Vec<String> {
    let Some(record) = line else {
        return Vec::new();
    };
    let cells = record.iter().skip(columns::SUMMARY_FIRST).map(str::to_owned);
    match width {
        Some(w) => cells.take(w).collect(),
        None => cells.collect(),
    }
}

fn parse_market_summary(lines: &[Option<Line>], marker: &str) -> Option<SummaryTable> {
    let Some(marker_idx) = find_marker(lines, marker) else {
        warn!("Marker {marker} not found, market summary is unavailable");
        return None;
    };

    let mut following = lines.iter().skip(marker_idx + 1);
    let headers = following
        .by_ref()
        .take(columns::MARKET_SUMMARY_HEADER_ROWS)
        .map(|l| summary_row(l.as_ref(), None))
        .collect();
    let rows = following
        .take(columns::MARKET_SUMMARY_DATA_ROWS)
        .map(|l| summary_row(l.as_ref(), None))
        .collect();

    Some(SummaryTable { headers, rows })
}

fn parse_futures(lines: &[Option<Line>], marker: &str) -> Option<SummaryTable> {
    let Some(marker_idx) = find_marker(lines, marker) else {
        warn!("Marker {marker} not found, futures table is unavailable");
        return None;
    };

    let width = Some(columns::FUTURES_WIDTH);
    let headers = lines
        .get(marker_idx + 1)
        .map(|l| vec![summary_row(l.as_ref(), width)])
        .unwrap_or_default();
    let rows = lines
        .get(marker_idx + 2)
        .map(|l| vec![summary_row(l.as_ref(), width)])
        .unwrap_or_default();

    Some(SummaryTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{SeriesGroup, SeriesIndex};
    use tarifa_types::Selection;

    fn parse(text: &str) -> ParsedFeed {
        parse_feed(text, &FeedLayout::default())
    }

    fn offset(n: usize) -> String {
        ",".repeat(n)
    }

    #[test]
    fn test_parse_decimal_variants() {
        assert_eq!(parse_decimal("0,10"), Some(0.10));
        assert_eq!(parse_decimal(" 1.05 "), Some(1.05));
        assert_eq!(parse_decimal("-3,5"), Some(-3.5));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("   "), None);
        assert_eq!(parse_decimal("n/a"), None);
        assert_eq!(parse_decimal("NaN"), None);
    }

    #[test]
    fn test_single_row_round_trip() {
        let feed = parse("Dia,Tarifario,Opcao,Intervalo,Col,OMIE,TAR,OMIE+TAR\n2024-01-01,TariffA,Simple,[00:00-00:15[,0,10,2,1.05,\n");

        assert_eq!(feed.records.len(), 1);
        let r = &feed.records[0];
        assert_eq!(r.day, "2024-01-01");
        assert_eq!(r.slot_label, "[00:00-00:15[");
        assert_eq!(r.value, Some(0.0));
        assert_eq!(r.market_price, Some(10.0));
        assert_eq!(r.grid_access_tariff, Some(2.0));
        assert_eq!(r.market_plus_grid, Some(1.05));
    }

    #[test]
    fn test_quoted_decimal_comma_cell() {
        let feed = parse("header\n2024-01-01,TariffA,Simple,[00:00-00:15[,\"0,10\",\"52,3\",,\"0,2\"\n");

        let r = &feed.records[0];
        assert_eq!(r.value, Some(0.10));
        assert_eq!(r.market_price, Some(52.3));
        assert_eq!(r.grid_access_tariff, None);
        assert_eq!(r.market_plus_grid, Some(0.2));
    }

    #[test]
    fn test_short_rows_skipped_not_fatal() {
        let feed = parse("header\n2024-01-01,TariffA\n\n2024-01-01,TariffA,Simple,[00:00-00:15[,1,2,3,4\n");

        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.skipped_rows, 1);
    }

    #[test]
    fn test_non_numeric_cells_become_none() {
        let feed = parse("header\n2024-01-01,TariffA,Simple,[00:00-00:15[,abc,,x,\n");
        let r = &feed.records[0];
        assert_eq!(r.value, None);
        assert_eq!(r.market_price, None);
        assert_eq!(r.grid_access_tariff, None);
        assert_eq!(r.market_plus_grid, None);
    }

    #[test]
    fn test_bom_and_crlf_stripped() {
        let feed = parse("\u{feff}Dia,T,O,I,C,M,G,X\r\n2024-01-01,TariffA,Simple,[00:00-00:15[,1,2,3,4\r\n");
        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].market_plus_grid, Some(4.0));
    }

    #[test]
    fn test_table_block_after_marker_and_header() {
        let text = format!(
            "header\n\
             2024-01-01,TariffA,Simple,[00:00-00:15[,1,2,3,4\n\
             \n\
             {o}TABELA_HORARIA\n\
             {o}CSV_Dia,CSV_Tarifario,CSV_Opcao,CSV_Hora,CSV_OMIE,CSV_Preco\n\
             {o}2024-01-01,TariffA,Simple,[0:00-1:00[,55.20,0.12345\n\
             {o}2024-01-01,TariffA,Simple,[1:00-2:00[,,\n\
             {o}2024-01-01,TariffA\n",
            o = offset(10)
        );
        let feed = parse(&text);

        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.table_rows.len(), 2);
        assert_eq!(feed.table_rows[0].hour, "[0:00-1:00[");
        assert_eq!(feed.table_rows[0].market_price, Some(55.2));
        assert_eq!(feed.table_rows[0].average_price, Some(0.12345));
        assert_eq!(feed.table_rows[1].market_price, None);
        assert_eq!(feed.table_rows[1].average_price, None);
        assert_eq!(feed.skipped_rows, 1);
    }

    #[test]
    fn test_missing_table_marker_yields_empty_block() {
        let feed = parse("header\n2024-01-01,TariffA,Simple,[00:00-00:15[,1,2,3,4\n");
        assert!(feed.table_rows.is_empty());
        assert!(feed.constants.is_empty());
        assert!(feed.market_summary.is_none());
        assert!(feed.futures.is_none());
    }

    #[test]
    fn test_constants_block_ends_at_blank_line() {
        let text = format!(
            "header\n\
             {o}TABELA_CONSTANTES\n\
             {o}constante,valor_unitario\n\
             {o}Alfa_K,\"0,0095\"\n\
             {o}Financiamento_TSE,0.0022\n\
             {o}Broken,abc\n\
             \n\
             {o}After_Blank,1\n",
            o = offset(18)
        );
        let feed = parse(&text);

        assert_eq!(feed.constants.len(), 2);
        assert_eq!(feed.constants.get("Alfa_K"), Some(&0.0095));
        assert_eq!(feed.constants.get("Financiamento_TSE"), Some(&0.0022));
        assert!(!feed.constants.contains_key("After_Blank"));
    }

    #[test]
    fn test_summary_tables_sliced_from_column_18() {
        let text = format!(
            "header\n\
             {o}TABELA_MEDIA_OMIE\n\
             {o}Dia,Simples,Bi,-\n\
             {o},,Vazio,Fora\n\
             {o}Hoje,55.1,40.2,60.3\n\
             {o}Amanha,-1.5,-3,2\n\
             {o}Media,26.8,18.6,31.2\n\
             {o}TABELA_OMIP\n\
             {o}M1,M2,M3,Q1,Q2,Q3,Y1,Y2,Y3\n\
             {o}61,62,63,64,65,66,67,68,69\n",
            o = offset(18)
        );
        let feed = parse(&text);

        let summary = feed.market_summary.unwrap();
        assert_eq!(summary.headers.len(), 2);
        assert_eq!(summary.headers[0], vec!["Dia", "Simples", "Bi", "-"]);
        assert_eq!(summary.rows.len(), 3);
        assert_eq!(summary.rows[1][1], "-1.5");
        assert!(SummaryTable::is_negative_cell(&summary.rows[1][1]));
        assert!(!SummaryTable::is_negative_cell(&summary.rows[0][0]));

        let futures = feed.futures.unwrap();
        assert_eq!(futures.headers[0].len(), 8);
        assert_eq!(futures.rows[0][0], "61");
        assert_eq!(futures.rows[0][7], "68");
    }

    #[test]
    fn test_unquoted_decimal_comma_row_reaches_its_series() {
        let feed = parse("Dia,Tarifario,Opcao,Intervalo,Col,OMIE,TAR,OMIE+TAR\n2024-01-01,TariffA,Simple,[00:00-00:15[,0,10,2,1.05,\n");
        let index = SeriesIndex::build(&feed.records);

        let group = index
            .get(&Selection::new("2024-01-01", "TariffA", "Simple"))
            .unwrap();
        assert_eq!(group.len(), 1);
        assert_eq!(group.value[0], Some(0.0));
        assert_eq!(group.market_price[0], Some(10.0));
        assert_eq!(index.group_count(), 1);
    }

    #[test]
    fn test_large_feed_parses_every_row() {
        const DAYS: usize = 420;
        const SLOTS: usize = 96;
        let o = offset(10);

        let mut text = String::from("Dia,Tarifario,Opcao,Intervalo,Preco,OMIE,TAR,Total\n");
        for day in 0..DAYS {
            for slot in 0..SLOTS {
                let (h, m) = (slot / 4, (slot % 4) * 15);
                text.push_str(&format!(
                    "d{day},TariffA,Simples,[{h:02}:{m:02}-{h:02}:{:02}[,\"0,{slot:03}\",{slot},0.05,0.1\n",
                    m + 15
                ));
            }
        }
        text.push_str(&format!("\n{o}TABELA_HORARIA\n{o}Dia,Tarifario,Opcao,Hora,OMIE,Preco\n"));
        for day in 0..DAYS {
            for hour in 0..24 {
                text.push_str(&format!(
                    "{o}d{day},TariffA,Simples,[{hour}:00-{}:00[,50,0.12\n",
                    hour + 1
                ));
            }
        }
        let feed = parse(&text);

        assert_eq!(feed.records.len(), DAYS * SLOTS);
        assert_eq!(feed.table_rows.len(), DAYS * 24);
        assert_eq!(feed.skipped_rows, 0);

        let last = feed.records.last().unwrap();
        assert_eq!(last.day, format!("d{}", DAYS - 1));
        assert_eq!(last.slot_label, "[23:45-23:60[");
        assert_eq!(last.value, Some(0.095));
        assert_eq!(last.market_price, Some(95.0));
        assert_eq!(feed.table_rows[24].day, "d1");
        assert_eq!(feed.table_rows[24].hour, "[0:00-1:00[");

        let index = SeriesIndex::build(&feed.records);
        assert_eq!(index.days().len(), DAYS);
        assert_eq!(
            index.get(&Selection::new("d7", "TariffA", "Simples")).map(SeriesGroup::len),
            Some(SLOTS)
        );
    }

    #[test]
    fn test_quoted_cell_spanning_lines_keeps_blank_line_boundaries() {
        let text = format!(
            "header\n\
             2024-01-01,TariffA,Simple,\"[00:00\n-00:15[\",1,2,3,4\n\
             {o}TABELA_CONSTANTES\n\
             {o}constante,valor_unitario\n\
             {o}Alfa_K,1\n\
             \n\
             {o}After_Blank,2\n",
            o = offset(18)
        );
        let feed = parse(&text);

        assert_eq!(feed.records.len(), 1);
        assert_eq!(feed.records[0].slot_label, "[00:00\n-00:15[");
        assert_eq!(feed.constants.len(), 1);
        assert_eq!(feed.constants.get("Alfa_K"), Some(&1.0));
    }

    #[test]
    fn test_empty_text() {
        let feed = parse("");
        assert!(feed.records.is_empty());
        assert_eq!(feed.skipped_rows, 0);
    }
}
