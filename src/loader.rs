use crate::error::{FleetError, Result};
use crate::months::MONTH_NAMES;
use crate::types::{Batch, Cell, RawRow, ValueRange, ROW_WIDTH};
use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Tabs that are always analysed next to the latest daily tab.
pub const FIXED_TABS: [&str; 2] = ["Client Operations", "Location Network"];

static DATE_TAB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]+)(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)")
        .expect("date tab pattern is valid")
});

/// A value range with its table name resolved and header row dropped.
#[derive(Debug, Clone)]
pub struct Table {
    pub name: String,
    pub rows: Vec<RawRow>,
}

/// Load a batch from disk.
///
/// A directory is read as one CSV file per tab (file stem = tab name) and
/// filtered through [`select_tabs`]; a file is read as a Sheets
/// `values:batchGet` JSON response, filtered only when `explicit_tabs` is set.
pub fn load_batch(path: &Path, explicit_tabs: &[String]) -> Result<Batch> {
    let mut batch = if path.is_dir() {
        let batch = load_csv_dir(path)?;
        let names: Vec<String> = batch
            .value_ranges
            .iter()
            .filter_map(ValueRange::table_name)
            .collect();
        let selected = select_tabs(&names, explicit_tabs);
        info!("Selected tabs: {}", selected.join(", "));
        retain_tabs(batch, &selected)
    } else {
        let reader = BufReader::new(File::open(path)?);
        let batch: Batch = serde_json::from_reader(reader)?;
        if explicit_tabs.is_empty() {
            batch
        } else {
            retain_tabs(batch, explicit_tabs)
        }
    };
    batch.value_ranges.retain(|r| !r.values.is_empty());
    info!(
        "Loaded {} value ranges from {}",
        batch.value_ranges.len(),
        path.display()
    );
    Ok(batch)
}

pub fn load_csv_dir(dir: &Path) -> Result<Batch> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case("csv"))
        })
        .collect();
    paths.sort();

    let mut value_ranges = Vec::with_capacity(paths.len());
    for path in paths {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&path)?;
        let mut values = Vec::new();
        // Exports pad rows with trailing commas; only columns A..J matter.
        for record in rdr.records() {
            let record = record?;
            values.push(record.iter().take(ROW_WIDTH).map(Cell::from).collect());
        }
        debug!("Read {} rows from tab '{}'", values.len(), name);
        value_ranges.push(ValueRange {
            range: format!("'{}'!A:J", name.replace('\'', "''")),
            name: Some(name),
            values,
        });
    }
    Ok(Batch { value_ranges })
}

fn retain_tabs(mut batch: Batch, tabs: &[String]) -> Batch {
    batch
        .value_ranges
        .retain(|r| r.table_name().is_some_and(|n| tabs.contains(&n)));
    batch
}

impl ValueRange {
    /// Table name from an explicit `name`, else from the A1 range string:
    /// `'26th July'!A1:J500` -> `26th July`, `Sheet1!A:J` -> `Sheet1`.
    pub fn table_name(&self) -> Option<String> {
        if let Some(name) = self.name.as_deref().filter(|n| !n.is_empty()) {
            return Some(name.to_string());
        }
        let sheet = match self.range.rfind('!') {
            Some(idx) => &self.range[..idx],
            None => self.range.as_str(),
        };
        let sheet = match sheet.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')) {
            Some(quoted) => quoted.replace("''", "'"),
            None => sheet.to_string(),
        };
        let sheet = sheet.trim().to_string();
        (!sheet.is_empty()).then_some(sheet)
    }
}

/// Decode one positional row (columns A..J) into a [`RawRow`].
///
/// Missing trailing cells are empty; more than [`ROW_WIDTH`] cells is a
/// malformed batch.
pub fn decode_row(table: &str, row: usize, cells: &[Cell]) -> Result<RawRow> {
    if cells.len() > ROW_WIDTH {
        return Err(FleetError::RowTooWide {
            table: table.to_string(),
            row,
            cells: cells.len(),
            max: ROW_WIDTH,
        });
    }
    let cell = |i: usize| cells.get(i).cloned().unwrap_or_default();
    let text = |i: usize| cells.get(i).map(Cell::to_text).unwrap_or_default();
    Ok(RawRow {
        date: cell(0),
        location: text(1),
        vehicle_id: text(2),
        client: text(3),
        vehicle_type: text(4),
        installation_date: cell(5),
        working_status: text(6),
        recording: text(7),
        alignment_status: text(8),
        remarks: text(9),
    })
}

/// Resolve every value range into a named table of decoded rows.
///
/// Ranges holding only a header (or nothing) yield an empty table.
pub fn decode_tables(batch: &Batch) -> Result<Vec<Table>> {
    if batch.value_ranges.is_empty() {
        return Err(FleetError::EmptyBatch);
    }
    batch
        .value_ranges
        .iter()
        .enumerate()
        .map(|(index, range)| -> Result<Table> {
            let name = range
                .table_name()
                .ok_or(FleetError::UnnamedRange { index })?;
            let rows = range
                .values
                .iter()
                .enumerate()
                .skip(1)
                .map(|(i, cells)| decode_row(&name, i + 1, cells))
                .collect::<Result<Vec<_>>>()?;
            Ok(Table { name, rows })
        })
        .collect()
}

// (month, day) for tab names like "26th July" or "1st Aug".
fn date_tab_key(name: &str) -> Option<(usize, u32)> {
    let caps = DATE_TAB.captures(name)?;
    let day: u32 = caps[1].parse().ok()?;
    let abbr = caps[2].to_lowercase();
    let month = MONTH_NAMES
        .iter()
        .position(|m| m.to_lowercase().starts_with(&abbr))?;
    Some((month + 1, day))
}

/// Choose which tabs to analyse.
///
/// Explicit tabs are used as given. Otherwise the latest daily tab (by month,
/// then day; the first listed wins a tie) is followed by [`FIXED_TABS`].
pub fn select_tabs(available: &[String], explicit: &[String]) -> Vec<String> {
    if !explicit.is_empty() {
        return explicit.to_vec();
    }
    let mut latest: Option<(&String, (usize, u32))> = None;
    for name in available {
        if let Some(key) = date_tab_key(name) {
            if latest.map_or(true, |(_, best)| key > best) {
                latest = Some((name, key));
            }
        }
    }
    let mut selected: Vec<String> = latest.map(|(n, _)| n.clone()).into_iter().collect();
    selected.extend(FIXED_TABS.iter().map(|t| t.to_string()));
    selected
}
