use std::fmt;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use crate::error::FormatError;

pub const DMS_EXAMPLE: &str = "18°24'56\"N 13°01'56\"E";

/// A validated point on the globe, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinate", into = "RawCoordinate")]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

#[derive(Serialize, Deserialize)]
struct RawCoordinate {
    lat: f64,
    lon: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, FormatError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(FormatError::LatitudeOutOfRange(latitude));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(FormatError::LongitudeOutOfRange(longitude));
        }
        Ok(Self { latitude, longitude })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl TryFrom<RawCoordinate> for Coordinate {
    type Error = FormatError;

    fn try_from(raw: RawCoordinate) -> Result<Self, Self::Error> {
        Coordinate::new(raw.lat, raw.lon)
    }
}

impl From<Coordinate> for RawCoordinate {
    fn from(c: Coordinate) -> Self {
        RawCoordinate {
            lat: c.latitude,
            lon: c.longitude,
        }
    }
}

/// Renders the coordinate back into DMS, e.g. `18°24'56.0000"N 13°01'56.0000"E`.
impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lat_hemi = if self.latitude < 0.0 { 'S' } else { 'N' };
        let lon_hemi = if self.longitude < 0.0 { 'W' } else { 'E' };
        write_dms(f, self.latitude, lat_hemi)?;
        f.write_str(" ")?;
        write_dms(f, self.longitude, lon_hemi)
    }
}

// Seconds are kept to four decimals, so work in ten-thousandths of an arcsecond
// to avoid printing 60.0000 after rounding.
fn write_dms(f: &mut fmt::Formatter<'_>, value: f64, hemi: char) -> fmt::Result {
    let units = (value.abs() * 3600.0 * 10_000.0).round() as u64;
    let deg = units / (3600 * 10_000);
    let min = (units / (60 * 10_000)) % 60;
    let sec_units = units % (60 * 10_000);
    write!(
        f,
        "{}°{:02}'{:02}.{:04}\"{}",
        deg,
        min,
        sec_units / 10_000,
        sec_units % 10_000,
        hemi
    )
}

fn lat_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\D+(\d+)\D+(\d+(?:\.\d+)?)\D*([NS])").expect("latitude pattern")
    })
}

fn lon_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)(\d+)\D+(\d+)\D+(\d+(?:\.\d+)?)\D*([EW])").expect("longitude pattern")
    })
}

fn dms_to_decimal(deg: f64, minutes: f64, seconds: f64, hemi: char) -> f64 {
    let dec = deg.abs() + minutes / 60.0 + seconds / 3600.0;
    match hemi.to_ascii_uppercase() {
        'S' | 'W' => -dec,
        _ => dec,
    }
}

/// Parses a `<lat> <lon>` DMS pair such as `18°24'56"N 13°01'56"E`.
///
/// Tokens are split on whitespace and commas. The first token is always the
/// latitude and the second the longitude; any non-digit filler is accepted
/// between the degree, minute and second fields.
pub fn parse_coordinate(text: &str) -> Result<Coordinate, FormatError> {
    let normalized = text.trim().replace(',', " ");
    let mut parts = normalized.split_whitespace();

    let (lat_raw, lon_raw) = match (parts.next(), parts.next()) {
        (Some(lat), Some(lon)) => (lat, lon),
        _ => return Err(FormatError::MissingToken),
    };

    let lat_caps = lat_regex()
        .captures(lat_raw)
        .ok_or_else(|| FormatError::InvalidLatitude(lat_raw.to_string()))?;
    let lon_caps = lon_regex()
        .captures(lon_raw)
        .ok_or_else(|| FormatError::InvalidLongitude(lon_raw.to_string()))?;

    let lat = decimal_from_captures(&lat_caps)
        .ok_or_else(|| FormatError::InvalidLatitude(lat_raw.to_string()))?;
    let lon = decimal_from_captures(&lon_caps)
        .ok_or_else(|| FormatError::InvalidLongitude(lon_raw.to_string()))?;

    Coordinate::new(lat, lon)
}

fn decimal_from_captures(caps: &Captures<'_>) -> Option<f64> {
    let deg: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = caps[3].parse().ok()?;
    let hemi = caps[4].chars().next()?;
    Some(dms_to_decimal(deg, minutes, seconds, hemi))
}
