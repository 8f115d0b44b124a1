use fleet_report::analyze;
use fleet_report::reports::health_score;
use fleet_report::tracker::create_alignment_timeline;
use fleet_report::types::{AlignmentObservation, Batch, Cell, ValueRange};
use fleet_report::util::date_sort_key;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashSet};

const MONTHS: [&str; 3] = ["July", "August", "September"];
const VEHICLES: [&str; 5] = ["AB1001", "AB1002", "CD2001", "CD2002", "EF3001"];
const CLIENTS: [&str; 4] = ["Acme", "Beta", "#N/A", ""];
const WORKING: [&str; 4] = ["Active", "Offlline >24Hrs", "Idle", ""];
const ALIGNMENT: [&str; 4] = ["Alligned", "Misalligned", "NA", ""];

fn row_strategy() -> impl Strategy<Value = Vec<Cell>> {
    (
        1u32..=28,
        0..MONTHS.len(),
        0..VEHICLES.len(),
        0..CLIENTS.len(),
        0..WORKING.len(),
        0..ALIGNMENT.len(),
    )
        .prop_map(|(day, m, v, c, w, a)| {
            let date = format!("{} {}", day, MONTHS[m]);
            [
                date.as_str(),
                "Pune",
                VEHICLES[v],
                CLIENTS[c],
                "Bus",
                "",
                WORKING[w],
                "Yes",
                ALIGNMENT[a],
                "",
            ]
            .iter()
            .map(|s| Cell::from(*s))
            .collect()
        })
}

fn batch_strategy() -> impl Strategy<Value = Batch> {
    prop::collection::vec(prop::collection::vec(row_strategy(), 0..12), 1..4).prop_map(|tabs| {
        Batch {
            value_ranges: tabs
                .into_iter()
                .enumerate()
                .map(|(i, rows)| {
                    let mut values = vec![vec![Cell::from("Date")]];
                    values.extend(rows);
                    ValueRange {
                        range: format!("Sheet{}!A:J", i + 1),
                        name: None,
                        values,
                    }
                })
                .collect(),
        }
    })
}

fn reading_strategy() -> impl Strategy<Value = AlignmentObservation> {
    (1u32..=31, 0..MONTHS.len(), prop::bool::ANY).prop_map(|(day, m, aligned)| {
        AlignmentObservation {
            date: format!("{} {}", day, MONTHS[m]),
            alignment_status: if aligned { "Alligned" } else { "Misalligned" }.to_string(),
            remarks: String::new(),
        }
    })
}

proptest! {
    #[test]
    fn health_score_stays_in_range(total in 0usize..500, a in 0usize..500, b in 0usize..500) {
        let active = a.min(total);
        let aligned = b.min(total);
        let score = health_score(active, aligned, total);
        prop_assert!(score <= 100);
        if total > 0 && active == total && aligned == total {
            prop_assert_eq!(score, 100);
        }
        if total == 0 {
            prop_assert_eq!(score, 0);
        }
    }

    #[test]
    fn report_invariants_hold(batch in batch_strategy()) {
        let report = analyze(&batch).unwrap();

        let mut union = BTreeSet::new();
        for (month, bucket) in &report.monthly_data {
            let expected: BTreeSet<&str> = report
                .all_vehicles
                .iter()
                .filter(|o| &o.month == month)
                .map(|o| o.vehicle_id.as_str())
                .collect();
            prop_assert_eq!(&bucket.vehicle_ids(), &expected);
            union.extend(expected);
        }
        prop_assert_eq!(report.comprehensive_summary.total_vehicles, union.len());

        for vehicles in report.client_analysis.values().chain(report.city_analysis.values()) {
            let unique: HashSet<&str> = vehicles.iter().map(|v| v.vehicle.as_str()).collect();
            prop_assert_eq!(unique.len(), vehicles.len());
        }

        prop_assert!(report.stats.health_score <= 100);
        if report.stats.total_vehicles == 0 {
            prop_assert_eq!(report.stats.health_score, 0);
        }
    }

    #[test]
    fn analysis_is_deterministic(batch in batch_strategy()) {
        let first = serde_json::to_string(&analyze(&batch).unwrap()).unwrap();
        let second = serde_json::to_string(&analyze(&batch).unwrap()).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn timeline_periods_are_ordered_and_alternate(
        readings in prop::collection::vec(reading_strategy(), 1..20)
    ) {
        let timeline = create_alignment_timeline(&readings);
        let periods: Vec<&str> = timeline.split(" → ").collect();

        let statuses: Vec<&str> = periods
            .iter()
            .map(|p| p.split(" (").next().unwrap())
            .collect();
        for pair in statuses.windows(2) {
            prop_assert_ne!(pair[0], pair[1]);
        }

        let starts: Vec<String> = periods
            .iter()
            .map(|p| {
                let inner = p.split(" (").nth(1).unwrap().trim_end_matches(')');
                date_sort_key(inner.split(" to ").next().unwrap())
            })
            .collect();
        for pair in starts.windows(2) {
            prop_assert!(pair[0] <= pair[1]);
        }
    }
}
