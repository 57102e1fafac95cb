//! Timeframe selection for USGS summary feeds.
//!
//! Each timeframe maps 1:1 onto one of the fixed `all_*` GeoJSON feeds.

/// Time window for the earthquake feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Timeframe {
    Hour,
    #[default]
    Day,
    Week,
    Month,
}

impl Timeframe {
    /// Timeframes offered by the dashboard selector.
    ///
    /// `Month` is defined and accepted programmatically (API and CLI) but
    /// intentionally not offered in the UI.
    pub const SELECTABLE: [Self; 3] = [Self::Hour, Self::Day, Self::Week];

    /// Short lowercase name, as used in the API and CLI.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Human-readable label for selector controls.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Hour => "Past Hour",
            Self::Day => "Past Day",
            Self::Week => "Past Week",
            Self::Month => "Past Month",
        }
    }

    /// URL path of the summary feed for this timeframe.
    #[must_use]
    pub const fn feed_path(self) -> &'static str {
        match self {
            Self::Hour => "/earthquakes/feed/v1.0/summary/all_hour.geojson",
            Self::Day => "/earthquakes/feed/v1.0/summary/all_day.geojson",
            Self::Week => "/earthquakes/feed/v1.0/summary/all_week.geojson",
            Self::Month => "/earthquakes/feed/v1.0/summary/all_month.geojson",
        }
    }
}

impl std::str::FromStr for Timeframe {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "hour" => Ok(Self::Hour),
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            _ => Err(format!(
                "unknown timeframe: {s} (expected: hour, day, week, month)"
            )),
        }
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip() {
        for timeframe in [
            Timeframe::Hour,
            Timeframe::Day,
            Timeframe::Week,
            Timeframe::Month,
        ] {
            let parsed: Timeframe = timeframe.as_str().parse().expect("failed to parse");
            assert_eq!(parsed, timeframe);
        }
    }

    #[test]
    fn test_unknown_rejected() {
        assert!("fortnight".parse::<Timeframe>().is_err());
    }

    #[test]
    fn test_feed_paths() {
        assert_eq!(
            Timeframe::Hour.feed_path(),
            "/earthquakes/feed/v1.0/summary/all_hour.geojson"
        );
        assert_eq!(
            Timeframe::Month.feed_path(),
            "/earthquakes/feed/v1.0/summary/all_month.geojson"
        );
    }

    #[test]
    fn test_month_not_selectable() {
        assert!(!Timeframe::SELECTABLE.contains(&Timeframe::Month));
        assert_eq!(Timeframe::SELECTABLE.len(), 3);
    }
}
