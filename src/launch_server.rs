use std::convert::Infallible;
use std::sync::Arc;

use bytes::Bytes;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::body::Incoming;
use hyper::{Method, Request, Response, StatusCode};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;

use crate::LaunchListView;

/// The view shared between the poll loop and the connection handlers.
pub type SharedView = Arc<RwLock<LaunchListView>>;

#[derive(Debug, Deserialize)]
struct InteractionRequest {
    mission_id: String,
}

// Create a response body from a string
fn full<T: Into<Bytes>>(value: T) -> BoxBody<Bytes, hyper::Error> {
    Full::new(value.into())
        .map_err(|never| match never {})
        .boxed()
}

// The single page. Rows render client-side from /api/launches; clicking a row
// header toggles its panel and, on open, records the expansion.
const PAGE_HTML: &str = r#"
<!DOCTYPE html>
<html>
<head>
  <title>Launchdeck - Upcoming Launches</title>
  <style>
    body { margin: 0 auto; padding: 1rem; max-width: 48rem; font-family: sans-serif; }
    #status { min-height: 1.5rem; color: #666; }
    #status.error { color: #b00020; }
    #launches { list-style: none; padding: 0; }
    #launches li { border: 1px solid #ddd; border-radius: 4px; margin-bottom: 0.5rem; }
    .row-header { padding: 0.6rem; cursor: pointer; }
    .row-header:hover { background: #f2f2f2; }
    .open-count { color: #888; font-size: 0.85em; }
    .row-details { padding: 0.6rem; border-top: 1px solid #ddd; color: #444; }
  </style>
</head>
<body>
  <h1>Upcoming Launches</h1>
  <div id="status">Loading...</div>
  <ul id="launches"></ul>

  <script>
    async function postMission(path, missionId) {
      const response = await fetch(path, {
        method: 'post',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ mission_id: missionId }),
      });
      return response.json();
    }

    async function onRowClick(launch) {
      const result = await postMission('/api/panel', launch.mission_id);
      if (result.open) {
        await postMission('/api/opens', launch.mission_id);
      }
      refresh();
    }

    function render(state) {
      const status = document.getElementById('status');
      if (state.loading) {
        status.className = '';
        status.textContent = 'Loading...';
      } else if (state.error) {
        status.className = 'error';
        status.textContent = 'Error: ' + state.error;
      } else {
        status.className = '';
        status.textContent = '';
      }

      const list = document.getElementById('launches');
      list.textContent = '';
      for (const launch of state.launches) {
        const item = document.createElement('li');

        const header = document.createElement('div');
        header.className = 'row-header';
        header.textContent = launch.mission_name + ' / ' + launch.rocket_name;
        if (launch.open_count > 0) {
          const badge = document.createElement('span');
          badge.className = 'open-count';
          badge.textContent = ' opened ' + launch.open_count + 'x';
          header.appendChild(badge);
        }
        header.onclick = () => onRowClick(launch);
        item.appendChild(header);

        if (launch.panel_open) {
          const details = document.createElement('div');
          details.className = 'row-details';
          details.textContent = 'UTC: ' + launch.launch_date_utc
            + ' | Local: ' + launch.launch_date_local;
          item.appendChild(details);
        }

        list.appendChild(item);
      }
    }

    async function refresh() {
      const response = await fetch('/api/launches');
      render(await response.json());
    }

    refresh();
    setInterval(refresh, 500);
  </script>
</body>
</html>
"#;

/// Routes one request against the shared view.
pub async fn handle_request(
    req: Request<Incoming>,
    view: SharedView,
) -> Result<Response<BoxBody<Bytes, hyper::Error>>, Infallible> {
    let result = match (req.method(), req.uri().path()) {
        (&Method::GET, "/") => Response::builder()
            .header("Content-Type", "text/html")
            .header("Access-Control-Allow-Origin", "*")
            .body(full(PAGE_HTML))
            .unwrap_or_else(|_| internal_server_error()),

        (&Method::GET, "/api/launches") => {
            let snapshot = view.read().await.snapshot();
            match serde_json::to_string(&snapshot) {
                Ok(body) => json_response(body),
                Err(_) => internal_server_error(),
            }
        }

        (&Method::POST, "/api/panel") => match interaction_body(req).await {
            Ok(interaction) => {
                let open = view.write().await.toggle_panel(&interaction.mission_id);
                let body = serde_json::to_string(&json!({
                    "mission_id": interaction.mission_id,
                    "open": open,
                }))
                .unwrap_or_default();
                json_response(body)
            }
            Err(response) => response,
        },

        (&Method::POST, "/api/opens") => match interaction_body(req).await {
            Ok(interaction) => {
                let mut guard = view.write().await;
                let tracked = guard
                    .launches()
                    .iter()
                    .find(|launch| launch.mission_id == interaction.mission_id)
                    .cloned();
                // Rows not currently on screen still count; the counter is
                // keyed by mission id alone.
                let count = match tracked {
                    Some(launch) => guard.track_open_launches(&launch),
                    None => guard.track_open(&interaction.mission_id),
                };
                let body = serde_json::to_string(&json!({
                    "mission_id": interaction.mission_id,
                    "count": count,
                }))
                .unwrap_or_default();
                json_response(body)
            }
            Err(response) => response,
        },

        (&Method::OPTIONS, _) => Response::builder()
            .header("Access-Control-Allow-Origin", "*")
            .header("Access-Control-Allow-Methods", "GET, POST, OPTIONS")
            .header("Access-Control-Allow-Headers", "Content-Type")
            .body(full(""))
            .unwrap_or_else(|_| internal_server_error()),

        _ => Response::builder()
            .status(StatusCode::NOT_FOUND)
            .header("Access-Control-Allow-Origin", "*")
            .body(full("Not Found"))
            .unwrap_or_else(|_| internal_server_error()),
    };

    Ok(result)
}

// Collect and decode an interaction body, or produce the error response.
async fn interaction_body(
    req: Request<Incoming>,
) -> Result<InteractionRequest, Response<BoxBody<Bytes, hyper::Error>>> {
    let body_bytes = match req.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return Err(bad_request("Failed to read request body".to_string())),
    };

    serde_json::from_slice(&body_bytes)
        .map_err(|e| bad_request(format!("Invalid JSON request: {}", e)))
}

fn json_response(body: String) -> Response<BoxBody<Bytes, hyper::Error>> {
    Response::builder()
        .header("Content-Type", "application/json")
        .header("Access-Control-Allow-Origin", "*")
        .body(full(body))
        .unwrap_or_else(|_| internal_server_error())
}

fn bad_request(message: String) -> Response<BoxBody<Bytes, hyper::Error>> {
    Response::builder()
        .status(StatusCode::BAD_REQUEST)
        .header("Access-Control-Allow-Origin", "*")
        .body(full(message))
        .unwrap_or_else(|_| internal_server_error())
}

// Create a standard internal server error response
fn internal_server_error() -> Response<BoxBody<Bytes, hyper::Error>> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(full("Internal Server Error"))
        .unwrap()
}
