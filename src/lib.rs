pub mod launch_server;
pub mod launch_view;
pub mod operations;
pub mod query_executor;
pub mod query_watcher;

pub use launch_server::handle_request;
pub use launch_view::LaunchListView;
pub use query_executor::HttpQueryExecutor;
pub use query_watcher::{LaunchSubscription, PollingQueryWatcher};

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GraphQLRequest {
    pub query: String,
    pub variables: Option<Value>,
    #[serde(rename = "operationName")]
    pub operation_name: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Rocket {
    pub rocket_name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Launch {
    /// Grouping key for the open counters. Not part of the wire query, so it
    /// deserializes to an empty string when the endpoint omits it.
    #[serde(default)]
    pub mission_id: String,
    pub mission_name: String,
    pub rocket: Rocket,
    pub launch_date_utc: String,
    pub launch_date_local: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct LaunchesData {
    #[serde(rename = "launchesUpcoming", default)]
    pub launches_upcoming: Vec<Launch>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GraphQLError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct GraphQLResponse {
    pub data: Option<LaunchesData>,
    pub errors: Option<Vec<GraphQLError>>,
}

/// One settled envelope per poll tick, delivered on the subscription stream.
/// Transport and GraphQL failures arrive here as values, never as panics.
#[derive(Clone, Debug)]
pub struct QueryEmission {
    pub data: Option<LaunchesData>,
    pub loading: bool,
    pub error: Option<String>,
}
