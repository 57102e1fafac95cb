//! USGS earthquake feed client.
//!
//! Async HTTP access to the summary GeoJSON feeds, with a hard per-request
//! deadline. Uses reqwest with rustls for TLS.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, instrument};

use crate::errors::FetchError;
use crate::models::FeatureCollection;
use crate::timeframe::Timeframe;

/// Hard deadline for one feed request, measured from request start to a
/// fully parsed response. Expiry abandons the request outright.
pub const FEED_TIMEOUT: Duration = Duration::from_millis(2000);

/// User agent string for API requests.
const USER_AGENT: &str = concat!("quakemap/", env!("CARGO_PKG_VERSION"));

/// USGS base URL for earthquake feeds.
const USGS_BASE_URL: &str = "https://earthquake.usgs.gov";

/// Client for the USGS summary feeds.
#[derive(Debug, Clone)]
pub struct FeedClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl FeedClient {
    /// Create a new feed client against the public USGS host.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self {
            client,
            base_url: USGS_BASE_URL.to_string(),
            timeout: FEED_TIMEOUT,
        })
    }

    /// Point the client at a different feed host. Used by tests.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the request deadline. Used by tests.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetch the summary feed for a timeframe.
    ///
    /// The parsed collection is returned unmodified; filtering of malformed
    /// records happens at render time, not here.
    ///
    /// # Errors
    ///
    /// [`FetchError::Timeout`] if no parsed response arrives within the
    /// deadline; [`FetchError::BadStatus`] for non-success HTTP statuses;
    /// [`FetchError::Parse`] for undecodable bodies; [`FetchError::Network`]
    /// for transport failures.
    #[instrument(skip(self), fields(timeframe = timeframe.as_str()))]
    pub async fn fetch(&self, timeframe: Timeframe) -> Result<FeatureCollection, FetchError> {
        let url = format!("{}{}", self.base_url, timeframe.feed_path());

        debug!("fetching feed from {}", url);

        let request = async {
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .map_err(|e| FetchError::from_transport(&e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FetchError::BadStatus(status.as_u16()));
            }

            let body = response
                .text()
                .await
                .map_err(|e| FetchError::from_transport(&e))?;

            let feed: FeatureCollection =
                serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))?;
            feed.validate()?;

            Ok(feed)
        };

        // Dropping the request future on expiry is what abandons the
        // underlying call; late completions cannot be observed.
        let feed = tokio::time::timeout(self.timeout, request)
            .await
            .map_err(|_| FetchError::Timeout)??;

        debug!("fetched {} events", feed.features.len());
        Ok(feed)
    }
}
