use crate::analysis::LatestDate;
use crate::rollup::Rollup;
use crate::tracker::{
    chronological, create_alignment_timeline, unique_sorted_dates, ALIGNED, MISALIGNED,
    STATUS_ACTIVE, STATUS_OFFLINE,
};
use crate::types::{
    ActiveVehicle, AlignmentVehicle, AnalysisTable, AreaRow, ComprehensiveSummary, MonthAnalysis,
    MonthBucket, MonthCountRow, MonthCounts, MonthlyRow, OfflineVehicle, Report, Stats,
    VehicleObservation, VehicleSummary,
};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

pub fn assemble_report(
    observations: Vec<VehicleObservation>,
    months: BTreeMap<String, MonthBucket>,
    rollup: Rollup,
    latest: &LatestDate,
) -> Report {
    let (client_analysis, city_analysis) = rollup.into_parts();
    let stats = generate_stats(&observations, client_analysis.len(), city_analysis.len());
    let monthly_analysis = generate_monthly_analysis(&months);
    let client_table = generate_area_table(&client_analysis, latest);
    let city_table = generate_area_table(&city_analysis, latest);
    let comprehensive_summary =
        generate_summary(&months, client_analysis.len(), city_analysis.len(), latest);
    Report {
        stats,
        all_vehicles: observations,
        monthly_data: months,
        client_analysis,
        city_analysis,
        latest_date: latest.as_str().to_string(),
        monthly_analysis,
        client_table,
        city_table,
        comprehensive_summary,
    }
}

pub fn generate_stats(
    observations: &[VehicleObservation],
    total_clients: usize,
    total_locations: usize,
) -> Stats {
    let total_vehicles = observations.len();
    let active_vehicles = observations
        .iter()
        .filter(|o| o.working_status == STATUS_ACTIVE)
        .count();
    let offline_vehicles = observations
        .iter()
        .filter(|o| o.working_status.contains("Offlline") || o.working_status.contains("Offline"))
        .count();
    let aligned_vehicles = observations
        .iter()
        .filter(|o| o.alignment_status == ALIGNED)
        .count();
    let misaligned_vehicles = observations
        .iter()
        .filter(|o| o.alignment_status == MISALIGNED)
        .count();
    Stats {
        total_vehicles,
        active_vehicles,
        offline_vehicles,
        aligned_vehicles,
        misaligned_vehicles,
        total_clients,
        total_locations,
        health_score: health_score(active_vehicles, aligned_vehicles, total_vehicles),
    }
}

/// Share of (active + aligned) readings out of twice the observation count,
/// as a rounded percentage; 0 for an empty batch.
pub fn health_score(active: usize, aligned: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let score = ((active + aligned) as f64 / (total * 2) as f64) * 100.0;
    score.round().clamp(0.0, 100.0) as u32
}

pub fn generate_monthly_analysis(
    months: &BTreeMap<String, MonthBucket>,
) -> BTreeMap<String, MonthAnalysis> {
    months
        .iter()
        .map(|(month, bucket)| {
            let mut active_vehicles: Vec<ActiveVehicle> = bucket
                .active
                .iter()
                .filter(|(_, e)| e.all_observations_active && !e.observations.is_empty())
                .map(|(vehicle, _)| ActiveVehicle {
                    vehicle: vehicle.clone(),
                    status: format!("Active in ALL {} tabs", month),
                })
                .collect();

            let mut offline_vehicles: Vec<OfflineVehicle> = bucket
                .offline
                .iter()
                .filter(|(_, e)| !e.dates.is_empty())
                .map(|(vehicle, e)| OfflineVehicle {
                    vehicle: vehicle.clone(),
                    dates: unique_sorted_dates(&e.dates),
                    remarks: e.latest_remark.clone(),
                })
                .collect();

            let mut alignment_vehicles: Vec<AlignmentVehicle> = bucket
                .alignment
                .iter()
                .filter_map(|(vehicle, readings)| {
                    let latest = chronological(readings).last().copied()?;
                    Some(AlignmentVehicle {
                        vehicle: vehicle.clone(),
                        timeline: create_alignment_timeline(readings),
                        latest_status: latest.alignment_status.clone(),
                        remarks: latest.remarks.clone(),
                    })
                })
                .collect();

            active_vehicles.sort_by(|a, b| vehicle_order(&a.vehicle, &b.vehicle));
            offline_vehicles.sort_by(|a, b| vehicle_order(&a.vehicle, &b.vehicle));
            alignment_vehicles.sort_by(|a, b| vehicle_order(&a.vehicle, &b.vehicle));

            let analysis = MonthAnalysis {
                active_vehicles,
                offline_vehicles,
                alignment_vehicles,
            };
            (month.clone(), analysis)
        })
        .collect()
}

/// Case-insensitive vehicle order; on a case-only tie lowercase comes first.
pub fn vehicle_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

fn is_problem(v: &VehicleSummary) -> bool {
    v.working_status == STATUS_OFFLINE || v.alignment_status == MISALIGNED
}

/// One table row per client (or location), in name order.
pub fn generate_area_table(
    groups: &BTreeMap<String, Vec<VehicleSummary>>,
    latest: &LatestDate,
) -> AnalysisTable {
    let data = groups
        .iter()
        .enumerate()
        .map(|(idx, (name, vehicles))| {
            let problems: Vec<String> = vehicles
                .iter()
                .filter(|v| is_problem(v))
                .map(|v| format!("{} ({}/{})", v.vehicle, v.working_status, v.alignment_status))
                .collect();
            let has_problems = !problems.is_empty();
            AreaRow {
                sno: idx + 1,
                name: name.clone(),
                vehicle_count: vehicles.len(),
                vehicle_numbers: vehicles
                    .iter()
                    .map(|v| v.vehicle.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
                problem_vehicles: if has_problems {
                    problems.join(", ")
                } else {
                    "None".to_string()
                },
                status: if has_problems {
                    format!("ISSUES: {}/{}", problems.len(), vehicles.len())
                } else {
                    "ALL OK".to_string()
                },
                has_problems,
            }
        })
        .collect();
    AnalysisTable {
        display_date: latest.display_label().to_string(),
        data,
    }
}

pub fn generate_summary(
    months: &BTreeMap<String, MonthBucket>,
    total_clients: usize,
    total_cities: usize,
    latest: &LatestDate,
) -> ComprehensiveSummary {
    let monthly_counts = months
        .iter()
        .map(|(month, bucket)| {
            let counts = MonthCounts {
                active: bucket
                    .active
                    .values()
                    .filter(|e| e.all_observations_active && !e.observations.is_empty())
                    .count(),
                offline: bucket.offline.values().filter(|e| !e.dates.is_empty()).count(),
                alignment: bucket.alignment.values().filter(|r| !r.is_empty()).count(),
            };
            (month.clone(), counts)
        })
        .collect();
    let all_vehicles: BTreeSet<&str> = months.values().flat_map(|b| b.vehicle_ids()).collect();
    ComprehensiveSummary {
        monthly_counts,
        total_vehicles: all_vehicles.len(),
        total_clients,
        total_cities,
        data_source_date: latest.display_label().to_string(),
    }
}

/// Flatten the per-month analysis into one row per vehicle and category.
pub fn monthly_rows(analysis: &BTreeMap<String, MonthAnalysis>) -> Vec<MonthlyRow> {
    let mut rows = Vec::new();
    for (month, a) in analysis {
        for v in &a.active_vehicles {
            rows.push(MonthlyRow {
                month: month.clone(),
                category: "Active".to_string(),
                vehicle: v.vehicle.clone(),
                detail: v.status.clone(),
                remarks: String::new(),
            });
        }
        for v in &a.offline_vehicles {
            rows.push(MonthlyRow {
                month: month.clone(),
                category: "Offline".to_string(),
                vehicle: v.vehicle.clone(),
                detail: v.dates.join(", "),
                remarks: v.remarks.clone(),
            });
        }
        for v in &a.alignment_vehicles {
            rows.push(MonthlyRow {
                month: month.clone(),
                category: "Alignment".to_string(),
                vehicle: v.vehicle.clone(),
                detail: v.timeline.clone(),
                remarks: v.remarks.clone(),
            });
        }
    }
    rows
}

pub fn month_count_rows(summary: &ComprehensiveSummary) -> Vec<MonthCountRow> {
    summary
        .monthly_counts
        .iter()
        .map(|(month, c)| MonthCountRow {
            month: month.clone(),
            active: c.active,
            offline: c.offline,
            alignment: c.alignment,
        })
        .collect()
}
