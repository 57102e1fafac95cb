//! Web server for the quakemap UI.
//!
//! Serves the landing and dashboard views and a small JSON/SSE API:
//! - Axum for HTTP
//! - SSE (Server-Sent Events) pushing state snapshots to the dashboard
//! - Leaflet (CDN) on the client for map tiles and circle markers

use std::convert::Infallible;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{
        Html, IntoResponse,
        sse::{Event, KeepAlive, Sse},
    },
    routing::{get, post},
};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt, wrappers::BroadcastStream};

use crate::state::{Store, ViewState};
use crate::timeframe::Timeframe;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    /// Timeframe loaded on startup
    pub timeframe: Timeframe,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            host: "127.0.0.1".to_string(),
            timeframe: Timeframe::default(),
        }
    }
}

/// Create the Axum router with all routes.
pub fn create_router(store: Store) -> Router {
    Router::new()
        .route("/", get(landing_handler))
        .route("/dashboard", get(dashboard_handler))
        .route("/api/state", get(state_handler))
        .route("/api/timeframe", post(timeframe_handler))
        .route("/stream", get(stream_handler))
        .route("/health", get(health_handler))
        .fallback(landing_handler)
        .with_state(store)
}

/// Start the web server and kick off the initial fetch episode.
pub async fn run_server(config: ServerConfig, store: Store) -> anyhow::Result<()> {
    store.select(config.timeframe);

    let app = create_router(store);

    let addr = format!("{}:{}", config.host, config.port);
    tracing::info!("quakemap UI starting at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Serve the landing view.
async fn landing_handler() -> Html<&'static str> {
    Html(LANDING_HTML)
}

/// Serve the dashboard view.
///
/// The selector lists [`Timeframe::SELECTABLE`] only; `month` is reachable
/// through the API but deliberately not offered here.
async fn dashboard_handler() -> Html<String> {
    let options: String = Timeframe::SELECTABLE
        .iter()
        .map(|tf| format!(r#"<option value="{}">{}</option>"#, tf.as_str(), tf.label()))
        .collect();
    Html(DASHBOARD_HTML.replace("<!-- TIMEFRAME_OPTIONS -->", &options))
}

/// Current state snapshot as JSON.
async fn state_handler(State(store): State<Store>) -> Json<ViewState> {
    Json(store.snapshot())
}

/// Timeframe selection request body.
#[derive(Debug, Deserialize)]
struct TimeframeRequest {
    timeframe: String,
}

/// Select a timeframe, starting a new fetch episode.
///
/// Accepts all four timeframe names; the dashboard only offers three, but
/// `month` stays reachable here.
async fn timeframe_handler(
    State(store): State<Store>,
    Json(request): Json<TimeframeRequest>,
) -> impl IntoResponse {
    match request.timeframe.parse::<Timeframe>() {
        Ok(timeframe) => {
            store.select(timeframe);
            StatusCode::NO_CONTENT.into_response()
        }
        Err(message) => (StatusCode::BAD_REQUEST, message).into_response(),
    }
}

/// SSE stream of state snapshots: current state first, then one event per
/// change.
async fn stream_handler(
    State(store): State<Store>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Subscribe before snapshotting so no change can fall in between.
    let updates = BroadcastStream::new(store.subscribe());
    let initial = store.snapshot();

    let stream = tokio_stream::once(snapshot_event(&initial)).chain(updates.filter_map(
        |update| match update {
            Ok(view) => Some(snapshot_event(&view)),
            // Lagged receiver: skip; the next snapshot carries full state.
            Err(_) => None,
        },
    ));

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn snapshot_event(view: &ViewState) -> Result<Event, Infallible> {
    let event = Event::default()
        .json_data(view)
        .unwrap_or_else(|_| Event::default().data("{}"));
    Ok(event)
}

/// Liveness check.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Landing view: title, one-line description, entry to the dashboard.
const LANDING_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Earthquake Visualizer</title>
<style>
  * { margin: 0; padding: 0; box-sizing: border-box; }
  body {
    min-height: 100vh;
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    text-align: center;
    font-family: system-ui, -apple-system, sans-serif;
    background: linear-gradient(135deg, #3b82f6, #60a5fa, #2563eb);
    color: #fff;
    padding: 2rem 1rem;
  }
  h1 { font-size: 3rem; margin-bottom: 1.5rem; letter-spacing: -0.02em; }
  p { font-size: 1.1rem; max-width: 32rem; line-height: 1.6; margin-bottom: 2.5rem; }
  a.cta {
    display: inline-block;
    padding: 0.8rem 2rem;
    background: #fff;
    color: #2563eb;
    font-weight: 600;
    border-radius: 9999px;
    text-decoration: none;
    box-shadow: 0 10px 20px rgba(0, 0, 0, 0.15);
    transition: transform 0.2s;
  }
  a.cta:hover { transform: scale(1.05); }
</style>
</head>
<body>
  <h1>Earthquake Visualizer</h1>
  <p>
    Discover real-time earthquake data with an interactive map. Explore
    seismic events from the past hour, day, week with ease.
  </p>
  <a class="cta" href="/dashboard" aria-label="Enter Earthquake Visualizer Dashboard">Explore Now</a>
</body>
</html>
"##;

/// Dashboard view: header with timeframe selector, Leaflet map, error
/// banner. State arrives over SSE; selection goes back through the API.
const DASHBOARD_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Earthquake Dashboard</title>
<link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css">
<script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
<style>
  * { margin: 0; padding: 0; box-sizing: border-box; }
  html, body { height: 100%; }
  body { display: flex; flex-direction: column; font-family: system-ui, -apple-system, sans-serif; }
  header {
    display: flex;
    flex-wrap: wrap;
    justify-content: space-between;
    align-items: center;
    gap: 1rem;
    padding: 1.1rem 1.4rem;
    background: linear-gradient(90deg, #0d9488, #4338ca, #3730a3);
    color: #fff;
    box-shadow: 0 2px 8px rgba(0, 0, 0, 0.25);
    z-index: 1000;
  }
  header h2 { font-size: 1.4rem; letter-spacing: 0.01em; }
  .controls { display: flex; align-items: center; gap: 0.8rem; }
  .spinner { font-size: 0.85rem; opacity: 0.9; visibility: hidden; }
  select {
    font-size: 1rem;
    font-weight: 600;
    color: #312e81;
    background: #fff;
    border: 0;
    border-radius: 0.5rem;
    padding: 0.5rem 1rem;
    cursor: pointer;
    min-width: 10rem;
  }
  main { flex: 1; position: relative; background: #f3f4f6; }
  #map { height: 100%; width: 100%; }
  .banner {
    position: absolute;
    inset: 0;
    display: none;
    justify-content: center;
    align-items: center;
    z-index: 500;
    padding: 1rem;
    pointer-events: none;
  }
  .banner.visible { display: flex; }
  .banner > div {
    background: #fee2e2;
    color: #b91c1c;
    border: 1px solid #fca5a5;
    border-radius: 0.6rem;
    padding: 1.4rem 1.8rem;
    box-shadow: 0 4px 12px rgba(0, 0, 0, 0.12);
    text-align: center;
    pointer-events: auto;
  }
  .banner p.title { font-weight: 600; font-size: 1.05rem; }
  .banner p.detail { font-size: 0.85rem; margin-top: 0.4rem; }
  .popup h3 { font-size: 1rem; margin-bottom: 0.3rem; }
  .popup p { font-size: 0.85rem; margin: 0.15rem 0; }
  .popup .tsunami { color: #dc2626; font-weight: 700; }
  .popup a { color: #2563eb; }
</style>
</head>
<body>
  <header>
    <h2>🌍 Earthquake Dashboard</h2>
    <div class="controls">
      <span class="spinner" id="spinner">Loading…</span>
      <select id="timeframe" aria-label="Select earthquake data timeframe">
        <!-- TIMEFRAME_OPTIONS -->
      </select>
    </div>
  </header>
  <main>
    <div id="map"></div>
    <div class="banner" id="banner">
      <div>
        <p class="title">Error fetching data.</p>
        <p class="detail">Please check your internet connection or try again later.</p>
      </div>
    </div>
  </main>
  <script>
    const map = L.map('map', { minZoom: 2, maxZoom: 8, zoomControl: true }).setView([0, 0], 2);
    L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
      attribution: '&copy; OpenStreetMap contributors',
      noWrap: true,
    }).addTo(map);
    const markerLayer = L.layerGroup().addTo(map);

    const selector = document.getElementById('timeframe');
    const banner = document.getElementById('banner');
    const spinner = document.getElementById('spinner');

    function esc(text) {
      const div = document.createElement('div');
      div.textContent = text;
      return div.innerHTML;
    }

    function popupHtml(m) {
      let html = '<div class="popup">';
      html += '<h3>' + esc(m.label) + '</h3>';
      html += '<p><strong>Magnitude:</strong> ' + m.magnitude.toFixed(1) + '</p>';
      html += '<p><strong>Time:</strong> ' + esc(m.time) + '</p>';
      if (m.felt) {
        html += '<p><strong>Felt by:</strong> ' + m.felt + ' people</p>';
      }
      if (m.tsunami) {
        html += '<p class="tsunami">🌊 Tsunami Warning!</p>';
      }
      if (m.detail_url) {
        html += '<p><a href="' + esc(m.detail_url) + '" target="_blank" rel="noopener noreferrer">View on USGS →</a></p>';
      }
      return html + '</div>';
    }

    function render(state) {
      spinner.style.visibility = state.loading ? 'visible' : 'hidden';
      banner.classList.toggle('visible', Boolean(state.error));

      const offered = Array.from(selector.options).some((o) => o.value === state.timeframe);
      if (offered) selector.value = state.timeframe;

      markerLayer.clearLayers();
      for (const m of state.markers) {
        L.circleMarker([m.lat, m.lon], {
          radius: m.radius,
          color: m.color,
          fillColor: m.color,
          fillOpacity: 0.8,
          weight: 1.5,
        }).bindPopup(popupHtml(m)).addTo(markerLayer);
      }

      if (state.bounds) {
        map.fitBounds(
          [[state.bounds.min_lat, state.bounds.min_lon], [state.bounds.max_lat, state.bounds.max_lon]],
          { maxZoom: 5, padding: [50, 50] }
        );
      } else {
        map.setView([0, 0], 2);
      }
    }

    selector.addEventListener('change', () => {
      fetch('/api/timeframe', {
        method: 'POST',
        headers: { 'Content-Type': 'application/json' },
        body: JSON.stringify({ timeframe: selector.value }),
      });
    });

    const source = new EventSource('/stream');
    source.onmessage = (event) => render(JSON.parse(event.data));
  </script>
</body>
</html>
"##;
