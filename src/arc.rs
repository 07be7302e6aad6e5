//! Day-path helpers: interpolation between samples, splitting the path into
//! blocked/clear runs, projecting it onto the map, and a one-day memo so the
//! path is only resampled when the location or calendar day changes.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::angles::{interpolate_angle, interpolate_linear};
use crate::config::EngineConfig;
use crate::ephemeris;
use crate::error::Result;
use crate::geo;
use crate::types::{
    ArcPoint, ArcSegment, BlockagePoint, BlockageResult, Coord, Location, Observer, SunMarker,
    SunPosition, SunVisibility,
};

fn find_bracketing_points(
    path: &[ArcPoint],
    time: DateTime<Utc>,
) -> Option<(&ArcPoint, Option<&ArcPoint>, f64)> {
    let first = path.first()?;
    let last = path.last()?;
    if time < first.time || time > last.time {
        return None;
    }

    let idx_after = path.partition_point(|p| p.time <= time);
    let before = &path[idx_after - 1];
    let after = path.get(idx_after);
    if after.is_none() || time == before.time {
        return Some((before, None, 0.0));
    }

    let after = after?;
    let span = (after.time - before.time).num_milliseconds() as f64;
    let fraction = (time - before.time).num_milliseconds() as f64 / span;
    Some((before, Some(after), fraction))
}

/// Sun position at `time` interpolated from a sampled day path.
/// Returns `None` when `time` falls outside the path.
pub fn position_on_path<Tz: TimeZone>(path: &[ArcPoint], time: &DateTime<Tz>) -> Option<SunPosition> {
    let time = time.with_timezone(&Utc);
    let (before, after, fraction) = find_bracketing_points(path, time)?;
    match after {
        None => Some(before.position()),
        Some(after) => Some(SunPosition {
            azimuth: interpolate_angle(before.azimuth, after.azimuth, fraction),
            altitude: interpolate_linear(before.altitude, after.altitude, fraction),
        }),
    }
}

pub fn arc_segments(points: &[BlockagePoint]) -> Vec<ArcSegment> {
    split_runs(points, EngineConfig::default().sample_step_minutes)
}

/// Splits blockage samples into runs of equal verdict. Consecutive runs
/// share their boundary sample so the drawn line has no gaps. Samples more
/// than one step apart start a fresh segment with no shared point, since
/// the sun was below the horizon in between.
pub fn arc_segments_with_config(
    points: &[BlockagePoint],
    config: &EngineConfig,
) -> Result<Vec<ArcSegment>> {
    config.validate()?;
    Ok(split_runs(points, config.sample_step_minutes))
}

fn split_runs(points: &[BlockagePoint], step_minutes: i64) -> Vec<ArcSegment> {
    let max_gap = Duration::minutes(step_minutes);
    let mut segments: Vec<ArcSegment> = Vec::new();
    for p in points.iter().filter(|p| p.altitude > 0.0) {
        let arc_point = ArcPoint {
            azimuth: p.azimuth,
            altitude: p.altitude,
            time: p.time,
        };
        let joint = segments.last().and_then(|seg| seg.points.last().copied());
        let contiguous = joint.map_or(false, |j| arc_point.time - j.time <= max_gap);
        match segments.last_mut() {
            Some(seg) if contiguous && seg.blocked == p.blocked => seg.points.push(arc_point),
            _ => {
                let shared = if contiguous { joint } else { None };
                segments.push(ArcSegment {
                    blocked: p.blocked,
                    points: shared.into_iter().chain([arc_point]).collect(),
                });
            }
        }
    }
    segments
}

/// Places a sky position on the map around `center`: the horizon sits at
/// `radius_m` and the zenith at the center, linear in altitude.
pub fn project_sky_position(center: &Location, azimuth: f64, altitude: f64, radius_m: f64) -> Result<Coord> {
    let distance = radius_m * (90.0 - altitude.clamp(0.0, 90.0)) / 90.0;
    geo::destination(&center.coord(), distance, azimuth)
}

pub fn project_segment(center: &Location, segment: &ArcSegment, radius_m: f64) -> Result<Vec<Coord>> {
    segment
        .points
        .iter()
        .map(|p| project_sky_position(center, p.azimuth, p.altitude, radius_m))
        .collect()
}

pub fn sun_marker(
    observer: &Observer,
    sun: &SunPosition,
    blockage: &BlockageResult,
    radius_m: f64,
) -> Result<SunMarker> {
    let coord = project_sky_position(&observer.location, sun.azimuth, sun.altitude, radius_m)?;
    Ok(SunMarker {
        coord,
        azimuth: sun.azimuth,
        altitude: sun.altitude,
        visibility: SunVisibility::derive(sun, blockage),
    })
}

/// Locations closer than about 10 m share a cache entry.
const KEY_SCALE: f64 = 10_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DayKey {
    lat: i64,
    lon: i64,
    day: NaiveDate,
}

impl DayKey {
    fn new<Tz: TimeZone>(location: &Location, dt: &DateTime<Tz>) -> Self {
        Self {
            lat: (location.latitude() * KEY_SCALE).round() as i64,
            lon: (location.longitude() * KEY_SCALE).round() as i64,
            day: dt.date_naive(),
        }
    }
}

/// Holds the day path for one location and local calendar day.
#[derive(Debug, Clone, Default)]
pub struct DayPathCache {
    config: EngineConfig,
    key: Option<DayKey>,
    path: Vec<ArcPoint>,
    computations: usize,
}

impl DayPathCache {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn get<Tz: TimeZone>(&mut self, location: &Location, dt: &DateTime<Tz>) -> &[ArcPoint] {
        let key = DayKey::new(location, dt);
        if self.key != Some(key) {
            // step already checked in `new`
            self.path = ephemeris::sample_day(location, dt, self.config.sample_step_minutes);
            self.key = Some(key);
            self.computations += 1;
        }
        &self.path
    }

    /// Number of times the path has been resampled.
    pub fn computations(&self) -> usize {
        self.computations
    }
}
