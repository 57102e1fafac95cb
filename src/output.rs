//! Terminal output for projected markers.
//!
//! Supports human-readable (colored by the magnitude scale), JSON, and
//! NDJSON formats.

use std::io::{self, Write};

use crate::encoder::Color;
use crate::map::Marker;

// ANSI codes
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

const ICON_QUAKE: &str = "🌍";
const ICON_TSUNAMI: &str = "🌊";

/// Output format selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Human-readable terminal output (default)
    #[default]
    Human,
    /// JSON array
    Json,
    /// Newline-delimited JSON (one object per line)
    Ndjson,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" => Ok(Self::Human),
            "json" => Ok(Self::Json),
            "ndjson" => Ok(Self::Ndjson),
            _ => Err(format!("unknown format: {s} (expected: human, json, ndjson)")),
        }
    }
}

/// 256-color terminal approximation of a marker color.
const fn ansi_for(color: Color) -> &'static str {
    match color {
        Color::DeepBlue => "\x1b[38;5;26m",
        Color::VividBlue => "\x1b[38;5;27m",
        Color::BoldGreen => "\x1b[38;5;28m",
        Color::Yellow => "\x1b[38;5;226m",
        Color::BoldOrange => "\x1b[38;5;208m",
        Color::BoldRed => "\x1b[38;5;196m",
        Color::DarkRed => "\x1b[38;5;88m",
    }
}

/// Write markers in human-readable format, colored by magnitude.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_human<W: Write>(writer: &mut W, markers: &[Marker]) -> io::Result<()> {
    for marker in markers {
        let color = ansi_for(marker.color);
        let tsunami = if marker.tsunami {
            format!(" {ICON_TSUNAMI}")
        } else {
            String::new()
        };
        let felt = marker
            .felt
            .map(|n| format!(" {DIM}({n} felt){RESET}"))
            .unwrap_or_default();

        writeln!(
            writer,
            "{ICON_QUAKE} {color}{BOLD}M{:.1}{RESET} │ \
             {DIM}({:>7.2}°, {:>8.2}°){RESET} │ \
             {} │ \
             {}{tsunami}{felt}",
            marker.magnitude, marker.lat, marker.lon, marker.time, marker.label
        )?;
    }
    Ok(())
}

/// Write markers as a JSON array.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_json<W: Write>(writer: &mut W, markers: &[Marker]) -> io::Result<()> {
    let json = serde_json::to_string_pretty(markers)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

/// Write markers as newline-delimited JSON.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_ndjson<W: Write>(writer: &mut W, markers: &[Marker]) -> io::Result<()> {
    for marker in markers {
        let json = serde_json::to_string(marker)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        writeln!(writer, "{json}")?;
    }
    Ok(())
}

/// Write markers in the specified format.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_markers<W: Write>(writer: &mut W, markers: &[Marker], format: Format) -> io::Result<()> {
    match format {
        Format::Human => write_human(writer, markers),
        Format::Json => write_json(writer, markers),
        Format::Ndjson => write_ndjson(writer, markers),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::map::project;
    use crate::models::FeatureCollection;

    fn sample_markers() -> Vec<Marker> {
        let feed: FeatureCollection =
            serde_json::from_str(include_str!("../tools/sample_all_day.json"))
                .expect("parse fixture");
        project(&feed)
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("human".parse::<Format>().unwrap(), Format::Human);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("NDJSON".parse::<Format>().unwrap(), Format::Ndjson);
        assert!("invalid".parse::<Format>().is_err());
    }

    #[test]
    fn test_ndjson_one_line_per_marker() {
        let markers = sample_markers();
        let mut out = Vec::new();
        write_ndjson(&mut out, &markers).expect("write failed");

        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.lines().count(), markers.len());

        let first: serde_json::Value =
            serde_json::from_str(text.lines().next().expect("line")).expect("json line");
        assert_eq!(first["id"], "us7000abcd");
        assert_eq!(first["color"], "#ff9900");
    }

    #[test]
    fn test_human_includes_place_and_tsunami_flag() {
        let markers = sample_markers();
        let mut out = Vec::new();
        write_human(&mut out, &markers).expect("write failed");

        let text = String::from_utf8(out).expect("utf8");
        assert!(text.contains("Tokyo"));
        assert!(text.contains("Vanuatu region"));
        assert!(text.contains(ICON_TSUNAMI));
    }
}
