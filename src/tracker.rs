//! Per-month continuity and alignment tracking.
//!
//! Every valid observation lands in the bucket for its resolved month. The
//! bucket records the working-status sequence per vehicle, the dates a vehicle
//! sat offline, and its alignment readings. Alignment readings are kept in
//! encounter order and only put in chronological order when a timeline is
//! rendered.

use crate::types::{
    ActiveEntry, AlignmentObservation, MonthBucket, OfflineEntry, StatusObservation,
    VehicleObservation,
};
use crate::util::date_sort_key;
use std::collections::BTreeMap;

pub const STATUS_ACTIVE: &str = "Active";
pub const STATUS_OFFLINE: &str = "Offlline >24Hrs";
pub const ALIGNED: &str = "Alligned";
pub const MISALIGNED: &str = "Misalligned";

const TIMELINE_SEPARATOR: &str = " → ";

impl MonthBucket {
    pub fn record(&mut self, obs: &VehicleObservation) {
        let active = self
            .active
            .entry(obs.vehicle_id.clone())
            .or_insert_with(|| ActiveEntry {
                all_observations_active: true,
                observations: Vec::new(),
            });
        active.observations.push(StatusObservation {
            date: obs.date.clone(),
            status: obs.working_status.clone(),
        });
        if obs.working_status != STATUS_ACTIVE {
            active.all_observations_active = false;
        }

        if obs.working_status == STATUS_OFFLINE {
            let offline: &mut OfflineEntry =
                self.offline.entry(obs.vehicle_id.clone()).or_default();
            offline.dates.push(obs.date.clone());
            offline.latest_remark = if obs.remarks.is_empty() {
                "Offline".to_string()
            } else {
                obs.remarks.clone()
            };
        }

        if obs.alignment_status == ALIGNED || obs.alignment_status == MISALIGNED {
            self.alignment
                .entry(obs.vehicle_id.clone())
                .or_default()
                .push(AlignmentObservation {
                    date: obs.date.clone(),
                    alignment_status: obs.alignment_status.clone(),
                    remarks: obs.remarks.clone(),
                });
        }
    }
}

/// Month buckets keyed by month name; a bucket is created on first use.
#[derive(Debug, Default)]
pub struct MonthlyTracker {
    months: BTreeMap<String, MonthBucket>,
}

impl MonthlyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, obs: &VehicleObservation) {
        self.months.entry(obs.month.clone()).or_default().record(obs);
    }

    pub fn into_months(self) -> BTreeMap<String, MonthBucket> {
        self.months
    }
}

/// Alignment readings in ascending date order; ties keep encounter order.
pub fn chronological(observations: &[AlignmentObservation]) -> Vec<&AlignmentObservation> {
    let mut sorted: Vec<&AlignmentObservation> = observations.iter().collect();
    sorted.sort_by_cached_key(|o| date_sort_key(&o.date));
    sorted
}

/// Offline dates with duplicates removed (first occurrence kept), in date order.
pub fn unique_sorted_dates(dates: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for d in dates {
        if !unique.contains(d) {
            unique.push(d.clone());
        }
    }
    unique.sort_by_cached_key(|d| date_sort_key(d));
    unique
}

/// Coalesce one vehicle's alignment readings into status periods, e.g.
/// `Alligned (1 July to 5 July) → Misalligned (10 July)`.
pub fn create_alignment_timeline(observations: &[AlignmentObservation]) -> String {
    if observations.is_empty() {
        return "No alignment data".to_string();
    }

    let mut periods: Vec<String> = Vec::new();
    let mut current: Option<(&str, &str, &str)> = None;

    for obs in chronological(observations) {
        let status = obs.alignment_status.as_str();
        if status.is_empty() || status == "Unknown" || status == "NA" {
            continue;
        }
        current = match current {
            Some((cur, start, _)) if cur == status => Some((cur, start, obs.date.as_str())),
            Some(open) => {
                periods.push(close_period(open));
                Some((status, obs.date.as_str(), obs.date.as_str()))
            }
            None => Some((status, obs.date.as_str(), obs.date.as_str())),
        };
    }
    if let Some(open) = current {
        periods.push(close_period(open));
    }

    if periods.is_empty() {
        "No alignment changes".to_string()
    } else {
        periods.join(TIMELINE_SEPARATOR)
    }
}

fn close_period((status, start, end): (&str, &str, &str)) -> String {
    if start == end {
        format!("{} ({})", status, start)
    } else {
        format!("{} ({} to {})", status, start, end)
    }
}
