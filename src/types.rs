use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tabled::Tabled;

/// Number of positional columns a snapshot row may carry (A..J).
pub const ROW_WIDTH: usize = 10;

/// One spreadsheet cell as delivered by the retrieval side.
///
/// Sheets hands back formatted strings, but numbers and booleans show up when
/// values are requested unformatted, and callers building batches in memory
/// may pass native dates.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "CellRepr")]
pub enum Cell {
    #[default]
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Text(String),
    Number(f64),
    Bool(bool),
    Null(Option<()>),
}

impl From<CellRepr> for Cell {
    fn from(repr: CellRepr) -> Self {
        match repr {
            CellRepr::Text(s) => Cell::Text(s),
            CellRepr::Number(n) => Cell::Number(n),
            CellRepr::Bool(b) => Cell::Bool(b),
            CellRepr::Null(_) => Cell::Empty,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<NaiveDate> for Cell {
    fn from(d: NaiveDate) -> Self {
        Cell::Date(d)
    }
}

impl Cell {
    /// Empty, `""`, `0`, `NaN` and `false` cells carry no value.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            Cell::Number(n) => *n == 0.0 || n.is_nan(),
            Cell::Bool(b) => !*b,
            Cell::Date(_) => false,
        }
    }

    /// Textual rendering used by every string heuristic.
    ///
    /// Whole numbers drop their fractional part; native dates render as
    /// `Fri Jul 26 2024`, which carries no hyphen and no full month name.
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.is_finite() && n.fract() == 0.0 => format!("{}", *n as i64),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Date(d) => d.format("%a %b %d %Y").to_string(),
        }
    }
}

/// A named group of rows, shaped like one entry of a Sheets
/// `values:batchGet` response. The first row is always a header.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ValueRange {
    #[serde(default)]
    pub range: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<Cell>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Batch {
    #[serde(rename = "valueRanges", default)]
    pub value_ranges: Vec<ValueRange>,
}

/// Positionally decoded snapshot row. Text columns are kept raw; cleaning
/// happens when the row becomes a [`VehicleObservation`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub date: Cell,
    pub location: String,
    pub vehicle_id: String,
    pub client: String,
    pub vehicle_type: String,
    pub installation_date: Cell,
    pub working_status: String,
    pub recording: String,
    pub alignment_status: String,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleObservation {
    pub vehicle_id: String,
    pub client: String,
    pub location: String,
    pub working_status: String,
    pub alignment_status: String,
    pub vehicle_type: String,
    pub installation_date: String,
    pub recording: String,
    pub date: String,
    pub remarks: String,
    pub month: String,
    pub source_table_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusObservation {
    pub date: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEntry {
    pub all_observations_active: bool,
    pub observations: Vec<StatusObservation>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OfflineEntry {
    pub dates: Vec<String>,
    pub latest_remark: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentObservation {
    pub date: String,
    pub alignment_status: String,
    pub remarks: String,
}

/// Everything observed for one resolved month, keyed by vehicle id.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct MonthBucket {
    pub active: BTreeMap<String, ActiveEntry>,
    pub offline: BTreeMap<String, OfflineEntry>,
    pub alignment: BTreeMap<String, Vec<AlignmentObservation>>,
}

impl MonthBucket {
    pub fn vehicle_ids(&self) -> BTreeSet<&str> {
        self.active
            .keys()
            .chain(self.offline.keys())
            .chain(self.alignment.keys())
            .map(String::as_str)
            .collect()
    }
}

/// A vehicle as registered under one client or one location.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSummary {
    pub vehicle: String,
    pub working_status: String,
    pub alignment_status: String,
    pub client: String,
    pub location: String,
    pub remarks: String,
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    pub total_vehicles: usize,
    pub active_vehicles: usize,
    pub offline_vehicles: usize,
    pub aligned_vehicles: usize,
    pub misaligned_vehicles: usize,
    pub total_clients: usize,
    pub total_locations: usize,
    pub health_score: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActiveVehicle {
    pub vehicle: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OfflineVehicle {
    pub vehicle: String,
    pub dates: Vec<String>,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignmentVehicle {
    pub vehicle: String,
    pub timeline: String,
    pub latest_status: String,
    pub remarks: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthAnalysis {
    pub active_vehicles: Vec<ActiveVehicle>,
    pub offline_vehicles: Vec<OfflineVehicle>,
    pub alignment_vehicles: Vec<AlignmentVehicle>,
}

/// Flattened view of [`MonthAnalysis`] for CSV export and previews.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthlyRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "Vehicle")]
    #[tabled(rename = "Vehicle")]
    pub vehicle: String,
    #[serde(rename = "Detail")]
    #[tabled(rename = "Detail")]
    pub detail: String,
    #[serde(rename = "Remarks")]
    #[tabled(rename = "Remarks")]
    pub remarks: String,
}

/// One client or one location in the latest-date rollup tables.
#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct AreaRow {
    #[serde(rename = "SNo")]
    #[tabled(rename = "SNo")]
    pub sno: usize,
    #[serde(rename = "Name")]
    #[tabled(rename = "Name")]
    pub name: String,
    #[serde(rename = "VehicleCount")]
    #[tabled(rename = "VehicleCount")]
    pub vehicle_count: usize,
    #[serde(rename = "VehicleNumbers")]
    #[tabled(rename = "VehicleNumbers")]
    pub vehicle_numbers: String,
    #[serde(rename = "ProblemVehicles")]
    #[tabled(rename = "ProblemVehicles")]
    pub problem_vehicles: String,
    #[serde(rename = "Status")]
    #[tabled(rename = "Status")]
    pub status: String,
    #[serde(rename = "HasProblems")]
    #[tabled(skip)]
    pub has_problems: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisTable {
    pub display_date: String,
    pub data: Vec<AreaRow>,
}

impl AnalysisTable {
    pub fn issues_only(&self) -> Vec<AreaRow> {
        self.data.iter().filter(|r| r.has_problems).cloned().collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct MonthCounts {
    pub active: usize,
    pub offline: usize,
    pub alignment: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct MonthCountRow {
    #[tabled(rename = "Month")]
    pub month: String,
    #[tabled(rename = "Active")]
    pub active: usize,
    #[tabled(rename = "Offline")]
    pub offline: usize,
    #[tabled(rename = "Alignment")]
    pub alignment: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComprehensiveSummary {
    pub monthly_counts: BTreeMap<String, MonthCounts>,
    pub total_vehicles: usize,
    pub total_clients: usize,
    pub total_cities: usize,
    pub data_source_date: String,
}

/// The assembled, read-only result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub stats: Stats,
    pub all_vehicles: Vec<VehicleObservation>,
    pub monthly_data: BTreeMap<String, MonthBucket>,
    pub client_analysis: BTreeMap<String, Vec<VehicleSummary>>,
    pub city_analysis: BTreeMap<String, Vec<VehicleSummary>>,
    pub latest_date: String,
    pub monthly_analysis: BTreeMap<String, MonthAnalysis>,
    pub client_table: AnalysisTable,
    pub city_table: AnalysisTable,
    pub comprehensive_summary: ComprehensiveSummary,
}
