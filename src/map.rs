//! Projection of feed data into render-ready map markers.
//!
//! Pure derived computation: one marker per valid event, plus the bounding
//! region the map viewport should fit. Nothing here is stored.

use serde::Serialize;

use crate::encoder::{self, Color};
use crate::models::{Feature, FeatureCollection};

/// Label used when an event carries no place description.
const UNKNOWN_PLACE: &str = "Unknown Location";

/// Render-ready description of one earthquake marker.
#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    /// Source event ID
    pub id: String,

    /// Latitude (degrees)
    pub lat: f64,

    /// Longitude (degrees)
    pub lon: f64,

    /// Magnitude, preserved exactly from the source record
    pub magnitude: f64,

    /// Fill/stroke color from the magnitude scale
    pub color: Color,

    /// Circle radius in pixels
    pub radius: f64,

    /// Place description, or a fallback label
    pub label: String,

    /// Event time formatted as UTC, or "unknown"
    pub time: String,

    /// Number of "Did You Feel It?" reports, when nonzero
    #[serde(skip_serializing_if = "Option::is_none")]
    pub felt: Option<i64>,

    /// Tsunami warning flag
    pub tsunami: bool,

    /// USGS event page URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail_url: Option<String>,
}

/// Bounding region covering a set of markers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    fn around(lat: f64, lon: f64) -> Self {
        Self {
            min_lat: lat,
            min_lon: lon,
            max_lat: lat,
            max_lon: lon,
        }
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lat = self.max_lat.max(lat);
        self.max_lon = self.max_lon.max(lon);
    }
}

/// Project a feed into marker descriptors.
///
/// A marker is emitted only for events with a finite magnitude and both
/// coordinate slots present; malformed records are skipped silently.
#[must_use]
pub fn project(feed: &FeatureCollection) -> Vec<Marker> {
    feed.features.iter().filter_map(marker_for).collect()
}

/// Build the marker for one event, or `None` if the record is malformed.
fn marker_for(feature: &Feature) -> Option<Marker> {
    let magnitude = feature.properties.mag.filter(|m| m.is_finite())?;
    let lat = feature.latitude().filter(|c| c.is_finite())?;
    let lon = feature.longitude().filter(|c| c.is_finite())?;

    let label = feature
        .properties
        .place
        .clone()
        .unwrap_or_else(|| UNKNOWN_PLACE.to_string());

    let time = feature
        .time()
        .map_or_else(|| "unknown".to_string(), |t| {
            t.format("%Y-%m-%d %H:%M:%S UTC").to_string()
        });

    Some(Marker {
        id: feature.id.clone(),
        lat,
        lon,
        magnitude,
        color: encoder::color_for(magnitude),
        radius: encoder::radius_for(magnitude),
        label,
        time,
        felt: feature.properties.felt.filter(|&n| n > 0),
        tsunami: feature.tsunami(),
        detail_url: feature.properties.url.clone(),
    })
}

/// Bounding region covering all markers, or `None` when there are no valid
/// markers and the map should fall back to a world view.
#[must_use]
pub fn bounds(markers: &[Marker]) -> Option<Bounds> {
    let mut iter = markers.iter();
    let first = iter.next()?;
    let mut bounds = Bounds::around(first.lat, first.lon);
    for marker in iter {
        bounds.extend(marker.lat, marker.lon);
    }
    Some(bounds)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::models::{Geometry, Metadata, Properties};

    fn feed_with(features: Vec<Feature>) -> FeatureCollection {
        FeatureCollection {
            type_: "FeatureCollection".into(),
            metadata: Metadata {
                generated: 1_700_000_600_000,
                title: "test feed".into(),
                count: features.len(),
            },
            features,
        }
    }

    fn event(id: &str, lon: f64, lat: f64, mag: Option<f64>) -> Feature {
        Feature {
            type_: "Feature".into(),
            id: id.into(),
            geometry: Geometry {
                type_: "Point".into(),
                coordinates: vec![lon, lat, 10.0],
            },
            properties: Properties {
                mag,
                place: None,
                time: 1_700_000_000_000,
                felt: None,
                tsunami: 0,
                url: None,
            },
        }
    }

    #[test]
    fn test_tokyo_scenario() {
        let mut tokyo = event("x1", 139.0, 35.0, Some(5.4));
        tokyo.properties.place = Some("Tokyo".into());

        let markers = project(&feed_with(vec![tokyo]));
        assert_eq!(markers.len(), 1);

        let marker = &markers[0];
        assert!((marker.lat - 35.0).abs() < 1e-9);
        assert!((marker.lon - 139.0).abs() < 1e-9);
        assert_eq!(marker.color, Color::BoldOrange);
        assert!((marker.radius - 16.2).abs() < 1e-9);
        assert_eq!(marker.label, "Tokyo");
        assert!(!marker.tsunami);
    }

    #[test]
    fn test_missing_magnitude_skipped() {
        let feed = feed_with(vec![
            event("ok", 10.0, 20.0, Some(3.1)),
            event("no-mag", 11.0, 21.0, None),
        ]);

        let markers = project(&feed);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, "ok");
    }

    #[test]
    fn test_missing_coordinates_skipped() {
        let mut truncated = event("short", 0.0, 0.0, Some(4.0));
        truncated.geometry.coordinates = vec![42.0];

        let feed = feed_with(vec![truncated, event("ok", -70.0, -33.0, Some(2.2))]);
        let markers = project(&feed);
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id, "ok");
    }

    #[test]
    fn test_non_finite_values_skipped() {
        let feed = feed_with(vec![
            event("nan-mag", 10.0, 20.0, Some(f64::NAN)),
            event("inf-lat", 10.0, f64::INFINITY, Some(3.0)),
        ]);
        assert!(project(&feed).is_empty());
    }

    #[test]
    fn test_round_trip_preserves_source_fields() {
        let feed = feed_with(vec![event("us7000abcd", 139.0, 35.0, Some(5.4))]);
        let markers = project(&feed);

        let marker = &markers[0];
        let source = &feed.features[0];
        assert_eq!(marker.id, source.id);
        assert_eq!(Some(marker.lon), source.longitude());
        assert_eq!(Some(marker.lat), source.latitude());
        assert_eq!(Some(marker.magnitude), source.properties.mag);
    }

    #[test]
    fn test_fallback_label_and_time() {
        let mut weird = event("w1", 5.0, 6.0, Some(1.0));
        weird.properties.time = i64::MAX;

        let markers = project(&feed_with(vec![weird]));
        assert_eq!(markers[0].label, "Unknown Location");
        assert_eq!(markers[0].time, "unknown");
    }

    #[test]
    fn test_felt_zero_omitted() {
        let mut quiet = event("q1", 5.0, 6.0, Some(2.0));
        quiet.properties.felt = Some(0);

        let markers = project(&feed_with(vec![quiet]));
        assert_eq!(markers[0].felt, None);
    }

    #[test]
    fn test_bounds_cover_all_markers() {
        let feed = feed_with(vec![
            event("a", 139.0, 35.0, Some(5.0)),
            event("b", -150.5, 61.2, Some(2.0)),
            event("c", 167.1, -15.6, Some(7.2)),
        ]);
        let markers = project(&feed);

        let bounds = bounds(&markers).expect("expected bounds");
        assert!((bounds.min_lat - (-15.6)).abs() < 1e-9);
        assert!((bounds.max_lat - 61.2).abs() < 1e-9);
        assert!((bounds.min_lon - (-150.5)).abs() < 1e-9);
        assert!((bounds.max_lon - 167.1).abs() < 1e-9);
    }

    #[test]
    fn test_no_valid_markers_means_world_view() {
        let feed = feed_with(vec![event("no-mag", 1.0, 2.0, None)]);
        let markers = project(&feed);
        assert!(markers.is_empty());
        assert_eq!(bounds(&markers), None);
    }
}
