use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SunSightError};

/// `[longitude, latitude]` in degrees, the order GeoJSON uses.
pub type Coord = [f64; 2];

/// A validated point on the ground. Build one with [`Location::new`];
/// deserialization runs the same range checks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "LocationRecord")]
pub struct Location {
    latitude: f64,
    longitude: f64,
}

#[derive(Deserialize)]
struct LocationRecord {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<LocationRecord> for Location {
    type Error = SunSightError;

    fn try_from(record: LocationRecord) -> Result<Self> {
        Location::new(record.latitude, record.longitude)
    }
}

impl Location {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(SunSightError::InvalidLatitude(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(SunSightError::InvalidLongitude(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn coord(&self) -> Coord {
        [self.longitude, self.latitude]
    }
}

/// Compass azimuth (0=N, 90=E) and altitude above the horizon, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    pub azimuth: f64,
    pub altitude: f64,
}

impl SunPosition {
    pub fn is_up(&self) -> bool {
        self.altitude > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayKind {
    Regular,
    PolarDay,
    PolarNight,
}

/// Named instants for one calendar day. Events the sun never reaches on
/// that day (high latitudes) are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub solar_noon: DateTime<Utc>,
    pub nadir: DateTime<Utc>,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub sunrise_end: Option<DateTime<Utc>>,
    pub sunset_start: Option<DateTime<Utc>>,
    pub civil_dawn: Option<DateTime<Utc>>,
    pub civil_dusk: Option<DateTime<Utc>>,
    pub nautical_dawn: Option<DateTime<Utc>>,
    pub nautical_dusk: Option<DateTime<Utc>>,
    pub astronomical_dawn: Option<DateTime<Utc>>,
    pub astronomical_dusk: Option<DateTime<Utc>>,
    /// Morning golden hour ends when the sun climbs past 6°.
    pub golden_hour_end: Option<DateTime<Utc>>,
    /// Evening golden hour starts when the sun sinks below 6°.
    pub golden_hour_start: Option<DateTime<Utc>>,
    pub day_kind: DayKind,
    pub day_length_minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArcPoint {
    pub azimuth: f64,
    pub altitude: f64,
    pub time: DateTime<Utc>,
}

impl ArcPoint {
    pub fn position(&self) -> SunPosition {
        SunPosition {
            azimuth: self.azimuth,
            altitude: self.altitude,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub lat: f64,
    pub lon: f64,
}

/// A footprint record as delivered by an OSM/Overpass style provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RawBuilding {
    pub id: u64,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default)]
    pub geometry: Vec<RawNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeightSource {
    Measured,
    Estimated,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingFeature {
    pub id: u64,
    pub name: Option<String>,
    /// Closed ring: first coordinate repeated at the end, at least 4 entries.
    pub ring: Vec<Coord>,
    pub height: f64,
    pub levels: u32,
    pub height_source: HeightSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observer {
    pub location: Location,
    /// Eye height above ground in meters.
    pub elevation: f64,
    /// Compass bearing the observer faces, if constrained.
    pub facing: Option<f64>,
    pub field_of_view: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockageResult {
    pub blocked: bool,
    pub building_id: Option<u64>,
    pub blocking_height: Option<f64>,
    pub block_distance: Option<f64>,
}

impl BlockageResult {
    pub fn clear() -> Self {
        Self {
            blocked: false,
            building_id: None,
            blocking_height: None,
            block_distance: None,
        }
    }

    pub fn out_of_view() -> Self {
        Self {
            blocked: true,
            ..Self::clear()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockagePoint {
    pub time: DateTime<Utc>,
    pub azimuth: f64,
    pub altitude: f64,
    pub blocked: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SunWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SunWindow {
    pub fn duration_minutes(&self) -> i64 {
        (self.end - self.start).num_minutes()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SunVisibility {
    Below,
    Blocked,
    Visible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowPolygon {
    pub building_id: u64,
    pub length: f64,
    pub ring: Vec<Coord>,
}

/// A run of above-horizon arc samples sharing one blockage verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcSegment {
    pub blocked: bool,
    pub points: Vec<ArcPoint>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunMarker {
    pub coord: Coord,
    pub azimuth: f64,
    pub altitude: f64,
    pub visibility: SunVisibility,
}
