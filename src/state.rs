//! Application state: the fetch state machine and its shared store.
//!
//! One fetch episode is live at a time. Selecting a timeframe starts a new
//! episode and bumps a generation counter; a resolution (success, failure,
//! timeout) only lands if its episode is still the current one, so a stale
//! fetch can never overwrite a newer selection.

use std::sync::{Arc, Mutex, PoisonError};

use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::client::FeedClient;
use crate::errors::FetchError;
use crate::map::{self, Bounds, Marker};
use crate::models::FeatureCollection;
use crate::timeframe::Timeframe;

/// The one user-facing failure message. Error kinds are collapsed here on
/// purpose; the precise kind goes to the logs.
pub const USER_ERROR_MESSAGE: &str =
    "Error fetching data. Please check your internet connection or try again later.";

/// Capacity of the state-change broadcast channel.
const UPDATE_CHANNEL_CAPACITY: usize = 16;

/// Progress of the current fetch episode.
#[derive(Debug)]
pub enum FetchState {
    /// No fetch started yet
    Idle,
    /// A fetch is outstanding
    Loading,
    /// The last fetch produced this feed
    Ready(FeatureCollection),
    /// The last fetch failed
    Failed(FetchError),
}

/// Token identifying one fetch episode.
///
/// Captured at Loading entry and checked before every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Episode(u64);

/// The application's single mutable state.
#[derive(Debug)]
pub struct AppState {
    timeframe: Timeframe,
    fetch: FetchState,
    epoch: u64,
}

impl AppState {
    /// Fresh state: default timeframe, nothing fetched.
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeframe: Timeframe::default(),
            fetch: FetchState::Idle,
            epoch: 0,
        }
    }

    /// Start a new fetch episode for `timeframe`.
    ///
    /// Transitions to Loading from any state, clearing the previous feed
    /// and error immediately, and supersedes any outstanding episode.
    pub fn begin(&mut self, timeframe: Timeframe) -> Episode {
        self.timeframe = timeframe;
        self.fetch = FetchState::Loading;
        self.epoch += 1;
        Episode(self.epoch)
    }

    /// Resolve a fetch episode with its outcome.
    ///
    /// Returns whether the resolution applied. A resolution is dropped when
    /// its episode has been superseded, or when the episode already reached
    /// Ready or Failed (each episode resolves at most once).
    pub fn resolve(
        &mut self,
        episode: Episode,
        result: Result<FeatureCollection, FetchError>,
    ) -> bool {
        if episode.0 != self.epoch || !matches!(self.fetch, FetchState::Loading) {
            return false;
        }

        self.fetch = match result {
            Ok(feed) => FetchState::Ready(feed),
            Err(e) => FetchState::Failed(e),
        };
        true
    }

    /// Currently selected timeframe.
    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Last successfully fetched feed, absent unless Ready.
    #[must_use]
    pub fn dataset(&self) -> Option<&FeatureCollection> {
        match &self.fetch {
            FetchState::Ready(feed) => Some(feed),
            _ => None,
        }
    }

    /// True iff a fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.fetch, FetchState::Loading)
    }

    /// Failure of the current episode, if any.
    #[must_use]
    pub fn error(&self) -> Option<&FetchError> {
        match &self.fetch {
            FetchState::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Generic user-facing error message, present iff Failed.
    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        match self.fetch {
            FetchState::Failed(_) => Some(USER_ERROR_MESSAGE),
            _ => None,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// Render-ready snapshot of the application state.
///
/// Derived on demand from [`AppState`]; never stored.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    /// Selected timeframe name
    pub timeframe: &'static str,

    /// True while a fetch is outstanding
    pub loading: bool,

    /// Generic failure message, present iff the current episode failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'static str>,

    /// Markers for every valid event in the current feed
    pub markers: Vec<Marker>,

    /// Region covering the markers; `null` means world view
    pub bounds: Option<Bounds>,
}

impl ViewState {
    fn of(state: &AppState) -> Self {
        let markers = state.dataset().map(map::project).unwrap_or_default();
        let bounds = map::bounds(&markers);
        Self {
            timeframe: state.timeframe().as_str(),
            loading: state.is_loading(),
            error: state.error_message(),
            markers,
            bounds,
        }
    }
}

/// Shared handle to the application state.
///
/// Cheap to clone; all clones see the same state. Mutations happen in two
/// places only: [`Store::select`] (user-driven) and episode resolution
/// (fetch completion), both synchronous under the lock.
#[derive(Clone)]
pub struct Store {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    state: Mutex<AppState>,
    updates: broadcast::Sender<ViewState>,
    client: FeedClient,
}

impl Store {
    /// Create a store around a feed client.
    #[must_use]
    pub fn new(client: FeedClient) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(StoreInner {
                state: Mutex::new(AppState::new()),
                updates,
                client,
            }),
        }
    }

    /// Subscribe to state-change snapshots.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<ViewState> {
        self.inner.updates.subscribe()
    }

    /// Snapshot the current state.
    #[must_use]
    pub fn snapshot(&self) -> ViewState {
        ViewState::of(&self.lock())
    }

    /// Select a timeframe and start its fetch episode.
    ///
    /// Any outstanding episode is superseded immediately; its eventual
    /// resolution will be discarded by the episode guard.
    pub fn select(&self, timeframe: Timeframe) {
        let episode = {
            let mut state = self.lock();
            let episode = state.begin(timeframe);
            self.publish(&state);
            episode
        };

        info!("fetching {} feed", timeframe);

        let store = self.clone();
        tokio::spawn(async move {
            let result = store.inner.client.fetch(timeframe).await;
            store.complete(episode, result);
        });
    }

    /// Apply a fetch outcome for an episode, publishing on change.
    ///
    /// Split out from [`Store::select`] so tests can drive resolutions
    /// directly.
    pub fn complete(&self, episode: Episode, result: Result<FeatureCollection, FetchError>) {
        if let Err(e) = &result {
            warn!(kind = e.kind(), "feed fetch failed: {e}");
        }

        let mut state = self.lock();
        if state.resolve(episode, result) {
            self.publish(&state);
        } else {
            debug!("discarding resolution of superseded fetch episode");
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AppState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &AppState) {
        // Send fails only when no subscriber is listening, which is fine.
        let _ = self.inner.updates.send(ViewState::of(state));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_feed(title: &str) -> FeatureCollection {
        let json = include_str!("../tools/sample_all_day.json");
        let mut feed: FeatureCollection = serde_json::from_str(json).expect("parse fixture");
        feed.metadata.title = title.to_string();
        feed
    }

    #[test]
    fn test_begin_clears_previous_outcome() {
        let mut state = AppState::new();
        assert!(!state.is_loading());

        let episode = state.begin(Timeframe::Day);
        assert!(state.is_loading());
        assert!(state.resolve(episode, Ok(sample_feed("day"))));
        assert!(state.dataset().is_some());

        // A new selection discards the visible dataset at once.
        state.begin(Timeframe::Hour);
        assert!(state.is_loading());
        assert!(state.dataset().is_none());
        assert!(state.error_message().is_none());
        assert_eq!(state.timeframe(), Timeframe::Hour);
    }

    #[test]
    fn test_superseded_success_is_discarded() {
        let mut state = AppState::new();

        let day = state.begin(Timeframe::Day);
        let week = state.begin(Timeframe::Week);

        // The stale day fetch lands after the week selection: no effect.
        assert!(!state.resolve(day, Ok(sample_feed("day"))));
        assert!(state.is_loading());
        assert!(state.dataset().is_none());

        assert!(state.resolve(week, Ok(sample_feed("week"))));
        let feed = state.dataset().expect("week feed");
        assert_eq!(feed.metadata.title, "week");
    }

    #[test]
    fn test_superseded_failure_is_discarded() {
        let mut state = AppState::new();

        let day = state.begin(Timeframe::Day);
        let week = state.begin(Timeframe::Week);

        assert!(!state.resolve(day, Err(FetchError::Timeout)));
        assert!(state.error_message().is_none());

        assert!(state.resolve(week, Err(FetchError::BadStatus(502))));
        assert!(!state.is_loading());
        assert_eq!(state.error_message(), Some(USER_ERROR_MESSAGE));
    }

    #[test]
    fn test_timeout_fails_episode_and_late_success_is_dropped() {
        let mut state = AppState::new();

        let episode = state.begin(Timeframe::Day);
        assert!(state.resolve(episode, Err(FetchError::Timeout)));
        assert!(!state.is_loading());
        assert_eq!(state.error(), Some(&FetchError::Timeout));

        // The underlying call completing later must not resurrect the
        // episode.
        assert!(!state.resolve(episode, Ok(sample_feed("late"))));
        assert!(state.dataset().is_none());
        assert_eq!(state.error_message(), Some(USER_ERROR_MESSAGE));
    }

    #[test]
    fn test_all_error_kinds_collapse_to_one_message() {
        let errors = [
            FetchError::Timeout,
            FetchError::Network("connection refused".into()),
            FetchError::BadStatus(503),
            FetchError::Parse("unexpected token".into()),
        ];

        for error in errors {
            let mut state = AppState::new();
            let episode = state.begin(Timeframe::Hour);
            assert!(state.resolve(episode, Err(error)));
            assert_eq!(state.error_message(), Some(USER_ERROR_MESSAGE));
        }
    }

    #[test]
    fn test_view_state_derivation() {
        let mut state = AppState::new();
        let episode = state.begin(Timeframe::Day);
        state.resolve(episode, Ok(sample_feed("day")));

        let view = ViewState::of(&state);
        assert_eq!(view.timeframe, "day");
        assert!(!view.loading);
        assert_eq!(view.error, None);
        // The fixture holds four events, one with a null magnitude.
        assert_eq!(view.markers.len(), 3);
        assert!(view.bounds.is_some());
    }

    mod store {
        use super::*;

        use axum::Router;
        use axum::routing::get;

        async fn spawn_feed_host(router: Router) -> String {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
                .await
                .expect("failed to bind");
            let addr = listener.local_addr().expect("no local addr");
            tokio::spawn(async move {
                axum::serve(listener, router).await.expect("server failed");
            });
            format!("http://{addr}")
        }

        #[tokio::test]
        async fn test_select_publishes_loading_then_ready() {
            let router = Router::new().route(
                Timeframe::Day.feed_path(),
                get(|| async { include_str!("../tools/sample_all_day.json") }),
            );
            let base_url = spawn_feed_host(router).await;
            let client = FeedClient::new()
                .expect("failed to create client")
                .with_base_url(base_url);

            let store = Store::new(client);
            let mut updates = store.subscribe();

            store.select(Timeframe::Day);

            let first = updates.recv().await.expect("loading snapshot");
            assert!(first.loading);
            assert!(first.markers.is_empty());

            let second = updates.recv().await.expect("ready snapshot");
            assert!(!second.loading);
            assert_eq!(second.error, None);
            assert_eq!(second.markers.len(), 3);
            assert_eq!(second.timeframe, "day");
        }

        #[tokio::test]
        async fn test_stale_completion_does_not_publish() {
            let client = FeedClient::new().expect("failed to create client");
            let store = Store::new(client);

            let stale = {
                let mut state = store.lock();
                let stale = state.begin(Timeframe::Day);
                state.begin(Timeframe::Week);
                stale
            };

            let mut updates = store.subscribe();
            store.complete(stale, Ok(sample_feed("day")));

            assert!(updates.try_recv().is_err());
            let view = store.snapshot();
            assert!(view.loading);
            assert!(view.markers.is_empty());
        }
    }
}
