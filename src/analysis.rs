//! The two-pass analysis engine.
//!
//! Pass one scans every row of every table for the most recent reporting
//! date. Pass two validates and normalizes each row, then feeds the monthly
//! tracker and, for rows from the latest date, the client/location rollup.
//! The passes must stay separate: the rollup filter needs the date resolved
//! over the whole batch.

use crate::error::Result;
use crate::loader::{decode_tables, Table};
use crate::months::get_month;
use crate::reports::assemble_report;
use crate::rollup::Rollup;
use crate::tracker::MonthlyTracker;
use crate::types::{Batch, RawRow, Report, VehicleObservation};
use crate::util::{clean_text, date_sort_key, format_date};
use tracing::{debug, info, warn};

/// Label used when no row carries a resolvable date.
pub const CURRENT_SENTINEL: &str = "Current";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LatestDate {
    Resolved { display: String, sort_key: String },
    /// No dates anywhere; every row counts as current.
    Current,
}

impl LatestDate {
    pub fn matches(&self, display: &str, sort_key: &str) -> bool {
        match self {
            LatestDate::Current => true,
            LatestDate::Resolved {
                display: latest,
                sort_key: latest_key,
            } => display == latest || sort_key == latest_key,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LatestDate::Resolved { display, .. } => display,
            LatestDate::Current => CURRENT_SENTINEL,
        }
    }

    /// Label shown in tables and summaries.
    pub fn display_label(&self) -> &str {
        match self {
            LatestDate::Resolved { display, .. } => display,
            LatestDate::Current => "Recent Data",
        }
    }
}

/// Run the full analysis over one batch.
pub fn analyze(batch: &Batch) -> Result<Report> {
    let tables = decode_tables(batch)?;
    let latest = resolve_latest_date(&tables);

    let mut observations = Vec::new();
    let mut tracker = MonthlyTracker::new();
    let mut rollup = Rollup::new();

    for table in &tables {
        info!("Processing {}...", table.name);
        for (i, row) in table.rows.iter().enumerate() {
            let Some(obs) = observe(&table.name, row) else {
                debug!("Skipping row {} of '{}': {}", i + 1, table.name, row.vehicle_id);
                continue;
            };
            tracker.record(&obs);
            if latest.matches(&obs.date, &date_sort_key(&obs.date)) {
                rollup.register(&obs, &clean_text(&row.client), &clean_text(&row.location));
            }
            observations.push(obs);
        }
    }

    let report = assemble_report(observations, tracker.into_months(), rollup, &latest);
    info!(
        "Processing completed: {} observations, {} clients, {} cities",
        report.all_vehicles.len(),
        report.client_analysis.len(),
        report.city_analysis.len()
    );
    for (month, bucket) in &report.monthly_data {
        info!("  {}: {} unique vehicles", month, bucket.vehicle_ids().len());
    }
    Ok(report)
}

/// First pass: the greatest date sort key across all rows with a date.
pub fn resolve_latest_date(tables: &[Table]) -> LatestDate {
    let mut best: Option<(String, String)> = None;
    for row in tables.iter().flat_map(|t| t.rows.iter()) {
        if row.date.is_blank() {
            continue;
        }
        let shown = format_date(&row.date);
        let key = date_sort_key(&shown);
        let newer = match &best {
            Some((_, best_key)) => key > *best_key,
            None => !key.is_empty(),
        };
        if newer {
            best = Some((shown, key));
        }
    }

    match best {
        Some((shown, sort_key)) => {
            info!("Latest date found: {} (sort key: {})", shown, sort_key);
            LatestDate::Resolved {
                display: shown,
                sort_key,
            }
        }
        None => {
            warn!("No latest date found, including all rows in client/city analysis");
            LatestDate::Current
        }
    }
}

/// Validate and normalize one row, or `None` when it must be skipped.
///
/// Rows without a date, vehicle id, working status or resolvable month are
/// dropped, as are header look-alikes whose vehicle id mentions
/// "vehicle", "chassis" or "number" or is shorter than three characters.
pub fn observe(table: &str, row: &RawRow) -> Option<VehicleObservation> {
    let vehicle_id = clean_text(&row.vehicle_id);
    if row.date.is_blank() || vehicle_id.is_empty() || row.working_status.is_empty() {
        return None;
    }
    if is_header_like(&vehicle_id) {
        return None;
    }
    let month = get_month(table, &row.date.to_text())?;

    let or_unknown = |s: String| if s.is_empty() { "Unknown".to_string() } else { s };
    let vehicle_type = clean_text(&row.vehicle_type);
    Some(VehicleObservation {
        vehicle_id,
        client: or_unknown(clean_text(&row.client)),
        location: or_unknown(clean_text(&row.location)),
        working_status: row.working_status.clone(),
        alignment_status: or_unknown(row.alignment_status.clone()),
        vehicle_type: if vehicle_type.is_empty() {
            "Bus".to_string()
        } else {
            vehicle_type
        },
        installation_date: if row.installation_date.is_blank() {
            "Unknown".to_string()
        } else {
            format_date(&row.installation_date)
        },
        recording: or_unknown(clean_text(&row.recording)),
        date: format_date(&row.date),
        remarks: clean_text(&row.remarks),
        month: month.to_string(),
        source_table_name: table.to_string(),
    })
}

fn is_header_like(vehicle_id: &str) -> bool {
    let lower = vehicle_id.to_lowercase();
    ["vehicle", "chassis", "number"]
        .iter()
        .any(|w| lower.contains(w))
        || vehicle_id.chars().count() < 3
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Cell;

    fn row(date: &str, vehicle: &str, working: &str) -> RawRow {
        RawRow {
            date: Cell::from(date),
            location: "Pune".to_string(),
            vehicle_id: vehicle.to_string(),
            client: "Acme".to_string(),
            working_status: working.to_string(),
            ..RawRow::default()
        }
    }

    fn table(name: &str, rows: Vec<RawRow>) -> Table {
        Table {
            name: name.to_string(),
            rows,
        }
    }

    #[test]
    fn header_like_vehicle_ids_are_skipped() {
        for id in ["Vehicle Number", "CHASSIS", "Reg number", "AB", "  A  "] {
            assert!(observe("26th July", &row("26th July", id, "Active")).is_none(), "{id}");
        }
        assert!(observe("26th July", &row("26th July", "AB1", "Active")).is_some());
    }

    #[test]
    fn required_fields_and_month() {
        assert!(observe("26th July", &row("", "AB1234", "Active")).is_none());
        assert!(observe("26th July", &row("26th July", "AB1234", "")).is_none());
        assert!(observe("Sheet1", &row("today", "AB1234", "Active")).is_none());
    }

    #[test]
    fn observation_defaults() {
        let mut r = row("26th July", " **AB1234** ", "Active");
        r.client = String::new();
        let obs = observe("26th July", &r).unwrap();
        assert_eq!(obs.vehicle_id, "AB1234");
        assert_eq!(obs.client, "Unknown");
        assert_eq!(obs.vehicle_type, "Bus");
        assert_eq!(obs.installation_date, "Unknown");
        assert_eq!(obs.alignment_status, "Unknown");
        assert_eq!(obs.date, "26 July");
        assert_eq!(obs.month, "July");
        assert_eq!(obs.source_table_name, "26th July");
    }

    #[test]
    fn latest_date_uses_sort_key_across_tables() {
        let tables = vec![
            table("26th July", vec![row("26th July", "AB1234", "Active")]),
            table("2nd August", vec![row("2nd August", "AB1234", "Active")]),
            table("Client Operations", vec![row("31st July", "AB1234", "Active")]),
        ];
        assert_eq!(
            resolve_latest_date(&tables),
            LatestDate::Resolved {
                display: "2 August".to_string(),
                sort_key: "08-02".to_string()
            }
        );
    }

    #[test]
    fn latest_date_considers_rows_that_fail_validation() {
        let tables = vec![table("x", vec![row("26th July", "", ""), row("1st July", "AB1234", "Active")])];
        assert_eq!(resolve_latest_date(&tables).as_str(), "26 July");
    }

    #[test]
    fn no_dates_means_current() {
        let tables = vec![table("x", vec![row("", "AB1234", "Active"), row("!!", "AB1234", "Active")])];
        let latest = resolve_latest_date(&tables);
        assert_eq!(latest, LatestDate::Current);
        assert_eq!(latest.display_label(), "Recent Data");
        assert!(latest.matches("anything", "00-00"));
    }

    #[test]
    fn zero_and_false_dates_count_as_missing() {
        let mut zero = row("", "AB1234", "Active");
        zero.date = Cell::Number(0.0);
        let mut no = row("", "AB1234", "Active");
        no.date = Cell::Bool(false);
        assert!(observe("July Ops", &zero).is_none());
        assert!(observe("July Ops", &no).is_none());

        let tables = vec![table("July Ops", vec![zero.clone(), no])];
        assert_eq!(resolve_latest_date(&tables), LatestDate::Current);

        zero.date = Cell::from("26th July");
        zero.installation_date = Cell::Number(0.0);
        assert_eq!(observe("July Ops", &zero).unwrap().installation_date, "Unknown");
    }

    #[test]
    fn matches_on_display_or_sort_key() {
        let latest = LatestDate::Resolved {
            display: "2 August".to_string(),
            sort_key: "08-02".to_string(),
        };
        assert!(latest.matches("2 August", "08-02"));
        assert!(latest.matches("02 August", "08-02"));
        assert!(!latest.matches("26 July", "07-26"));
    }
}
