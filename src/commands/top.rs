use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use crate::pages::{HotPage, PageTable};
use crate::pipeline::aggregate_trace;
use crate::trace::{EmptyResult, LoadStats};
use comfy_table::{CellAlignment, Table, presets};
use serde::Serialize;
use std::io;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TopFormat {
    Table,
    Json,
    Csv,
}

impl TopFormat {
    pub fn from_flags(json: bool, csv: bool) -> Self {
        if json {
            TopFormat::Json
        } else if csv {
            TopFormat::Csv
        } else {
            TopFormat::Table
        }
    }
}

/// Run the top command. Returns the empty-result reason when nothing was printed.
pub fn run(
    file: &Path,
    config: &LoaderConfig,
    limit: usize,
    format: TopFormat,
) -> Result<Option<EmptyResult>> {
    let agg = aggregate_trace(file, config)?;

    if let Some(reason) = agg.empty_reason() {
        tracing::warn!("No data available to rank: {}", reason);
        return Ok(Some(reason));
    }

    let entries = agg.table.ranked(limit);
    let output = match format {
        TopFormat::Table => format_table(file, &agg.table, &agg.stats, &entries),
        TopFormat::Json => format_json(file, &agg.table, &agg.stats, &entries)?,
        TopFormat::Csv => format_csv(&entries)?,
    };
    print!("{}", output);

    Ok(None)
}

fn percent(count: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 * 100.0 / total as f64
    }
}

fn format_table(file: &Path, table: &PageTable, stats: &LoadStats, entries: &[HotPage]) -> String {
    let mut out = format!(
        "# {}\n# Accesses: {} | Pages: {} | Rows excluded: {}\n\n",
        file.display(),
        format_count(table.total()),
        format_count(table.len() as u64),
        format_count(stats.excluded())
    );

    let mut grid = Table::new();
    grid.load_preset(presets::UTF8_FULL_CONDENSED);
    grid.set_header(vec!["RANK", "PAGE", "BASE ADDRESS", "ACCESSES", "SHARE"]);
    for (i, entry) in entries.iter().enumerate() {
        grid.add_row(vec![
            (i + 1).to_string(),
            format!("{:#x}", entry.page),
            entry.label(),
            format_count(entry.count),
            format!("{:.2}%", percent(entry.count, table.total())),
        ]);
    }
    for idx in [0, 3, 4] {
        if let Some(column) = grid.column_mut(idx) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }

    out.push_str(&grid.to_string());
    out.push('\n');
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    file: String,
    total_accesses: u64,
    distinct_pages: usize,
    rows: u64,
    rows_excluded: u64,
    entries: Vec<JsonEntry<'a>>,
}

#[derive(Serialize)]
struct JsonEntry<'a> {
    #[serde(flatten)]
    page: &'a HotPage,
    base_address: String,
    share_pct: f64,
}

fn format_json(
    file: &Path,
    table: &PageTable,
    stats: &LoadStats,
    entries: &[HotPage],
) -> Result<String> {
    let report = JsonReport {
        file: file.display().to_string(),
        total_accesses: table.total(),
        distinct_pages: table.len(),
        rows: stats.rows,
        rows_excluded: stats.excluded(),
        entries: entries
            .iter()
            .map(|page| JsonEntry {
                page,
                base_address: page.label(),
                share_pct: percent(page.count, table.total()),
            })
            .collect(),
    };
    let mut out = serde_json::to_string_pretty(&report)?;
    out.push('\n');
    Ok(out)
}

#[derive(Serialize)]
struct CsvRow {
    rank: usize,
    page: u64,
    base_address: String,
    count: u64,
}

fn format_csv(entries: &[HotPage]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for (i, entry) in entries.iter().enumerate() {
        writer.serialize(CsvRow {
            rank: i + 1,
            page: entry.page,
            base_address: entry.label(),
            count: entry.count,
        })?;
    }
    let bytes = writer.into_inner().map_err(|e| Error::Io(e.into_error()))?;
    String::from_utf8(bytes)
        .map_err(|e| Error::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
}

/// Format a number with commas for readability
fn format_count(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result.chars().rev().collect()
}
