//! Data models for USGS earthquake feed responses.
//!
//! These structures match the GeoJSON format of the `all_*` summary feeds.

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::errors::FetchError;

/// Top-level GeoJSON response from a summary feed.
///
/// A feed is produced atomically by one fetch and never mutated afterwards;
/// a newer fetch replaces it wholesale.
#[derive(Debug, Clone, Deserialize)]
pub struct FeatureCollection {
    /// Always "FeatureCollection"
    #[serde(rename = "type")]
    pub type_: String,

    /// Feed metadata
    pub metadata: Metadata,

    /// Earthquake events
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    /// Validate the response structure.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Parse`] if the document is not a feature
    /// collection.
    pub fn validate(&self) -> Result<(), FetchError> {
        if self.type_ != "FeatureCollection" {
            return Err(FetchError::Parse(format!(
                "expected type 'FeatureCollection', got '{}'",
                self.type_
            )));
        }
        Ok(())
    }
}

/// Metadata about the feed response.
#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    /// When this feed was generated (ms since epoch)
    pub generated: i64,

    /// Human-readable title
    pub title: String,

    /// Number of events in response
    pub count: usize,
}

/// A single earthquake event.
#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    /// Always "Feature"
    #[serde(rename = "type")]
    pub type_: String,

    /// Unique event ID
    pub id: String,

    /// Geographic location
    pub geometry: Geometry,

    /// Event properties
    pub properties: Properties,
}

impl Feature {
    /// Get the event time as a `DateTime<Utc>`.
    #[must_use]
    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.properties.time).single()
    }

    /// Get longitude (degrees), if the coordinate slot is present.
    #[must_use]
    pub fn longitude(&self) -> Option<f64> {
        self.geometry.coordinates.first().copied()
    }

    /// Get latitude (degrees), if the coordinate slot is present.
    #[must_use]
    pub fn latitude(&self) -> Option<f64> {
        self.geometry.coordinates.get(1).copied()
    }

    /// Tsunami flag. The feed encodes this as 0 or 1.
    #[must_use]
    pub fn tsunami(&self) -> bool {
        self.properties.tsunami != 0
    }
}

/// Geographic geometry for an event.
#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    /// Always "Point"
    #[serde(rename = "type")]
    pub type_: String,

    /// Coordinates: [longitude, latitude, depth_km]
    pub coordinates: Vec<f64>,
}

/// Event properties from the feed.
///
/// Only the fields the visualizer consumes; the feed carries many more,
/// which serde ignores.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Properties {
    /// Magnitude value (absent or null for some automatic solutions)
    pub mag: Option<f64>,

    /// Human-readable place description
    pub place: Option<String>,

    /// Event time (ms since epoch)
    pub time: i64,

    /// Number of "Did You Feel It?" reports
    pub felt: Option<i64>,

    /// Tsunami flag: 0 or 1
    #[serde(default)]
    pub tsunami: i32,

    /// Event page URL
    pub url: Option<String>,
}
