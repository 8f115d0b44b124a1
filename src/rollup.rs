//! Client and location rollups for the latest reporting date.

use crate::types::{VehicleObservation, VehicleSummary};
use std::collections::BTreeMap;

// Literal cell values that mean "no value" in the source tabs.
const MISSING_MARKERS: [&str; 2] = ["#N/A", "NA"];

const CLIENT_HEADER_FRAGMENTS: [&str; 2] = ["client name", "vehicle number"];
const LOCATION_HEADER_FRAGMENTS: [&str; 3] = ["location", "site", "vehicle number"];

#[derive(Debug, Default)]
pub struct Rollup {
    clients: BTreeMap<String, Vec<VehicleSummary>>,
    cities: BTreeMap<String, Vec<VehicleSummary>>,
}

impl Rollup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observation under its client and its location.
    ///
    /// `client` and `location` are the cleaned cell values before defaults are
    /// applied, so blank cells never create an `Unknown` group.
    pub fn register(&mut self, obs: &VehicleObservation, client: &str, location: &str) {
        if is_group_name(client, &CLIENT_HEADER_FRAGMENTS) {
            insert_unique(self.clients.entry(client.to_string()).or_default(), obs);
        }
        if is_group_name(location, &LOCATION_HEADER_FRAGMENTS) {
            insert_unique(self.cities.entry(location.to_string()).or_default(), obs);
        }
    }

    pub fn into_parts(
        self,
    ) -> (
        BTreeMap<String, Vec<VehicleSummary>>,
        BTreeMap<String, Vec<VehicleSummary>>,
    ) {
        (self.clients, self.cities)
    }
}

fn is_group_name(name: &str, header_fragments: &[&str]) -> bool {
    if name.is_empty() || MISSING_MARKERS.contains(&name) {
        return false;
    }
    let lower = name.to_lowercase();
    !header_fragments.iter().any(|f| lower.contains(f))
}

fn insert_unique(vehicles: &mut Vec<VehicleSummary>, obs: &VehicleObservation) {
    if vehicles.iter().any(|v| v.vehicle == obs.vehicle_id) {
        return;
    }
    vehicles.push(VehicleSummary {
        vehicle: obs.vehicle_id.clone(),
        working_status: obs.working_status.clone(),
        alignment_status: obs.alignment_status.clone(),
        client: obs.client.clone(),
        location: obs.location.clone(),
        remarks: obs.remarks.clone(),
        date: obs.date.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn obs(vehicle: &str, working: &str) -> VehicleObservation {
        VehicleObservation {
            vehicle_id: vehicle.to_string(),
            client: "Acme".to_string(),
            location: "Pune".to_string(),
            working_status: working.to_string(),
            alignment_status: "Alligned".to_string(),
            vehicle_type: "Bus".to_string(),
            installation_date: "Unknown".to_string(),
            recording: "Unknown".to_string(),
            date: "2 August".to_string(),
            remarks: String::new(),
            month: "August".to_string(),
            source_table_name: "2nd August".to_string(),
        }
    }

    #[test]
    fn first_registration_wins() {
        let mut rollup = Rollup::new();
        rollup.register(&obs("AB1234", "Active"), "Acme", "Pune");
        rollup.register(&obs("AB1234", "Offlline >24Hrs"), "Acme", "Pune");
        let (clients, cities) = rollup.into_parts();
        assert_eq!(clients["Acme"].len(), 1);
        assert_eq!(clients["Acme"][0].working_status, "Active");
        assert_eq!(cities["Pune"].len(), 1);
    }

    #[test]
    fn sentinel_and_header_names_are_ignored() {
        let mut rollup = Rollup::new();
        rollup.register(&obs("AB1234", "Active"), "#N/A", "NA");
        rollup.register(&obs("AB1235", "Active"), "Client Name", "Site Location");
        rollup.register(&obs("AB1236", "Active"), "", "");
        rollup.register(&obs("AB1237", "Active"), "Vehicle Number", "Vehicle number");
        let (clients, cities) = rollup.into_parts();
        assert!(clients.is_empty());
        assert!(cities.is_empty());
    }

    #[test]
    fn client_and_location_register_independently() {
        let mut rollup = Rollup::new();
        rollup.register(&obs("AB1234", "Active"), "Acme", "Site 4");
        let (clients, cities) = rollup.into_parts();
        assert_eq!(clients.len(), 1);
        assert!(cities.is_empty());
    }
}
