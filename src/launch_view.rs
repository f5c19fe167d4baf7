use std::collections::HashMap;

use serde::Serialize;

use crate::{Launch, QueryEmission};

/// Presentation state for the upcoming-launches page.
///
/// All mutation funnels through `apply_emission` and the two interaction
/// operations. `launches` always holds the most recent successfully received
/// list; a failed poll sets `error` and leaves the list untouched.
pub struct LaunchListView {
    loading: bool,
    error: Option<String>,
    launches: Vec<Launch>,
    panel_open: HashMap<String, bool>,
    open_counts: HashMap<String, u64>,
}

/// JSON shape the page script renders from.
#[derive(Debug, Serialize, PartialEq)]
pub struct LaunchListSnapshot {
    pub loading: bool,
    pub error: Option<String>,
    pub launches: Vec<LaunchRowSnapshot>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct LaunchRowSnapshot {
    pub mission_id: String,
    pub mission_name: String,
    pub rocket_name: String,
    pub launch_date_utc: String,
    pub launch_date_local: String,
    pub panel_open: bool,
    pub open_count: u64,
}

impl LaunchListView {
    pub fn new() -> Self {
        LaunchListView {
            loading: true,
            error: None,
            launches: Vec::new(),
            panel_open: HashMap::new(),
            open_counts: HashMap::new(),
        }
    }

    /// Folds one poll-tick envelope into the view. An emission carrying an
    /// error stops the spinner and keeps the previous list on screen.
    pub fn apply_emission(&mut self, emission: QueryEmission) {
        if let Some(error) = emission.error {
            tracing::error!("GraphQL error: {}", error);
            self.error = Some(error);
            self.loading = false;
            return;
        }

        let launches = emission
            .data
            .map(|data| data.launches_upcoming)
            .unwrap_or_default();

        tracing::debug!("received {} upcoming launches", launches.len());
        self.launches = launches;
        self.error = None;
        self.loading = emission.loading;
    }

    /// Counts one expansion of the given launch's row. Independent of the
    /// panel toggle state and never touches `launches`.
    pub fn track_open_launches(&mut self, launch: &Launch) -> u64 {
        self.track_open(&launch.mission_id)
    }

    /// Counter entry point for interactions that only carry the grouping key.
    pub fn track_open(&mut self, mission_id: &str) -> u64 {
        let count = self.open_counts.entry(mission_id.to_string()).or_insert(0);
        *count += 1;
        tracing::info!(mission_id, count = *count, "launch panel opened");
        *count
    }

    /// Flips the expand/collapse flag of one row and returns the new value.
    pub fn toggle_panel(&mut self, mission_id: &str) -> bool {
        let open = self.panel_open.entry(mission_id.to_string()).or_insert(false);
        *open = !*open;
        *open
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn launches(&self) -> &[Launch] {
        &self.launches
    }

    pub fn open_count(&self, mission_id: &str) -> u64 {
        self.open_counts.get(mission_id).copied().unwrap_or(0)
    }

    pub fn panel_open(&self, mission_id: &str) -> bool {
        self.panel_open.get(mission_id).copied().unwrap_or(false)
    }

    pub fn snapshot(&self) -> LaunchListSnapshot {
        LaunchListSnapshot {
            loading: self.loading,
            error: self.error.clone(),
            launches: self
                .launches
                .iter()
                .map(|launch| LaunchRowSnapshot {
                    mission_id: launch.mission_id.clone(),
                    mission_name: launch.mission_name.clone(),
                    rocket_name: launch.rocket.rocket_name.clone(),
                    launch_date_utc: launch.launch_date_utc.clone(),
                    launch_date_local: launch.launch_date_local.clone(),
                    panel_open: self.panel_open(&launch.mission_id),
                    open_count: self.open_count(&launch.mission_id),
                })
                .collect(),
        }
    }
}

impl Default for LaunchListView {
    fn default() -> Self {
        LaunchListView::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{LaunchesData, Rocket};

    fn starlink() -> Launch {
        Launch {
            mission_id: "m1".to_string(),
            mission_name: "Starlink-5".to_string(),
            rocket: Rocket {
                rocket_name: "Falcon 9".to_string(),
            },
            launch_date_utc: "2020-01-01T00:00:00Z".to_string(),
            launch_date_local: "2019-12-31T19:00:00Z".to_string(),
        }
    }

    fn loaded(launches: Vec<Launch>) -> QueryEmission {
        QueryEmission {
            data: Some(LaunchesData {
                launches_upcoming: launches,
            }),
            loading: false,
            error: None,
        }
    }

    #[test]
    fn starts_loading_with_no_rows() {
        let view = LaunchListView::new();
        assert!(view.loading());
        assert!(view.launches().is_empty());
        assert!(view.error().is_none());
    }

    #[test]
    fn successful_emission_replaces_the_list_in_order() {
        let mut view = LaunchListView::new();
        let mut second = starlink();
        second.mission_id = "m2".to_string();
        second.mission_name = "CRS-20".to_string();

        view.apply_emission(loaded(vec![starlink(), second.clone()]));

        assert!(!view.loading());
        assert_eq!(view.launches().len(), 2);
        assert_eq!(view.launches()[0].mission_name, "Starlink-5");
        assert_eq!(view.launches()[1], second);
    }

    #[test]
    fn missing_data_field_maps_to_an_empty_list() {
        let mut view = LaunchListView::new();
        view.apply_emission(loaded(vec![starlink()]));
        view.apply_emission(QueryEmission {
            data: None,
            loading: false,
            error: None,
        });

        assert!(view.launches().is_empty());
    }

    #[test]
    fn error_emission_retains_previous_launches() {
        let mut view = LaunchListView::new();
        view.apply_emission(loaded(vec![starlink()]));

        view.apply_emission(QueryEmission {
            data: None,
            loading: false,
            error: Some("network unreachable".to_string()),
        });

        assert_eq!(view.launches().len(), 1);
        assert_eq!(view.launches()[0].mission_name, "Starlink-5");
        assert_eq!(view.error(), Some("network unreachable"));
        assert!(!view.loading());
    }

    #[test]
    fn next_successful_poll_clears_the_error() {
        let mut view = LaunchListView::new();
        view.apply_emission(QueryEmission {
            data: None,
            loading: false,
            error: Some("boom".to_string()),
        });
        view.apply_emission(loaded(vec![starlink()]));

        assert!(view.error().is_none());
        assert_eq!(view.launches().len(), 1);
    }

    #[test]
    fn open_count_grows_by_one_per_call() {
        let mut view = LaunchListView::new();
        let launch = starlink();

        assert_eq!(view.track_open_launches(&launch), 1);
        assert_eq!(view.track_open_launches(&launch), 2);
        assert_eq!(view.open_count("m1"), 2);
        assert_eq!(view.open_count("unknown"), 0);
    }

    #[test]
    fn tracking_opens_does_not_touch_rows_or_panels() {
        let mut view = LaunchListView::new();
        view.apply_emission(loaded(vec![starlink()]));

        view.track_open_launches(&starlink());

        assert_eq!(view.launches().len(), 1);
        assert!(!view.panel_open("m1"));
    }

    #[test]
    fn panel_toggle_flips_without_counting() {
        let mut view = LaunchListView::new();

        assert!(view.toggle_panel("m1"));
        assert!(!view.toggle_panel("m1"));
        assert_eq!(view.open_count("m1"), 0);
    }

    #[test]
    fn snapshot_joins_rows_with_their_interaction_state() {
        let mut view = LaunchListView::new();
        view.apply_emission(loaded(vec![starlink()]));
        view.toggle_panel("m1");
        view.track_open("m1");

        let snapshot = view.snapshot();

        assert!(!snapshot.loading);
        assert_eq!(snapshot.launches.len(), 1);
        let row = &snapshot.launches[0];
        assert_eq!(row.mission_name, "Starlink-5");
        assert_eq!(row.rocket_name, "Falcon 9");
        assert_eq!(row.launch_date_utc, "2020-01-01T00:00:00Z");
        assert_eq!(row.launch_date_local, "2019-12-31T19:00:00Z");
        assert!(row.panel_open);
        assert_eq!(row.open_count, 1);
    }
}
