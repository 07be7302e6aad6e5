//! Line-of-sight checks from an observer toward the sun.
//!
//! A ray is cast along the sun azimuth over the ground plane. Where it
//! crosses a footprint, the sun line's height at that distance is
//! `elevation + distance * tan(altitude)`; a building taller than that
//! hides the sun. The nearest such building along the ray is reported.

use log::{debug, trace};

use crate::angles::{angular_difference, deg_to_rad};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::geo;
use crate::types::{
    ArcPoint, BlockagePoint, BlockageResult, BuildingFeature, Coord, Observer, SunPosition,
    SunVisibility,
};

/// Buildings whose centroid lies within `tolerance` degrees of the sun azimuth.
pub fn filter_buildings_by_sun_bearing<'a>(
    origin: &Coord,
    buildings: &'a [BuildingFeature],
    sun_azimuth: f64,
    tolerance: f64,
) -> Vec<&'a BuildingFeature> {
    buildings
        .iter()
        .filter(|b| match geo::ring_centroid(&b.ring) {
            Some(c) => angular_difference(geo::bearing(origin, &c), sun_azimuth) <= tolerance,
            None => false,
        })
        .collect()
}

/// Sun line height above ground `distance` meters out from the observer.
pub fn sun_ray_height(elevation: f64, distance: f64, altitude: f64) -> f64 {
    elevation + distance * deg_to_rad(altitude).tan()
}

pub fn is_within_field_of_view(observer: &Observer, sun_azimuth: f64) -> bool {
    match observer.facing {
        Some(facing) => angular_difference(sun_azimuth, facing) <= observer.field_of_view / 2.0,
        None => true,
    }
}

/// Nearest crossing of the ray with `building` beyond the self-intersection guard.
fn nearest_hit(
    origin: &Coord,
    ray_end: &Coord,
    building: &BuildingFeature,
    config: &EngineConfig,
) -> Option<f64> {
    let hits = match geo::ring_intersections(origin, ray_end, &building.ring) {
        Ok(hits) => hits,
        Err(e) => {
            debug!("skipping building {} in blockage scan: {}", building.id, e);
            return None;
        }
    };
    hits.iter()
        .map(|p| geo::distance(origin, p))
        .filter(|&d| d >= config.min_intersection_distance_m)
        .min_by(|a, b| a.total_cmp(b))
}

pub fn check_instant(
    observer: &Observer,
    sun: &SunPosition,
    buildings: &[BuildingFeature],
) -> BlockageResult {
    trace_sun_ray(observer, sun, buildings, &EngineConfig::default())
}

pub fn check_instant_with_config(
    observer: &Observer,
    sun: &SunPosition,
    buildings: &[BuildingFeature],
    config: &EngineConfig,
) -> Result<BlockageResult> {
    config.validate()?;
    Ok(trace_sun_ray(observer, sun, buildings, config))
}

fn trace_sun_ray(
    observer: &Observer,
    sun: &SunPosition,
    buildings: &[BuildingFeature],
    config: &EngineConfig,
) -> BlockageResult {
    if !sun.is_up() {
        return BlockageResult::clear();
    }
    if !is_within_field_of_view(observer, sun.azimuth) {
        trace!("sun at {:.1}° is outside the field of view", sun.azimuth);
        return BlockageResult::out_of_view();
    }

    let origin = observer.location.coord();
    let ray_end = match geo::destination(&origin, config.ray_length_m, sun.azimuth) {
        Ok(end) => end,
        Err(e) => {
            debug!("cannot cast sun ray: {}", e);
            return BlockageResult::clear();
        }
    };

    let candidates =
        filter_buildings_by_sun_bearing(&origin, buildings, sun.azimuth, config.bearing_tolerance_deg);

    let mut nearest: Option<(f64, &BuildingFeature)> = None;
    for building in candidates.into_iter().filter(|b| b.height > 0.0) {
        let Some(distance) = nearest_hit(&origin, &ray_end, building, config) else {
            continue;
        };
        let ray_height = sun_ray_height(observer.elevation, distance, sun.altitude);
        if building.height <= ray_height {
            continue;
        }
        if nearest.map_or(true, |(d, _)| distance < d) {
            nearest = Some((distance, building));
        }
    }

    match nearest {
        Some((distance, building)) => {
            trace!(
                "sun at {:.1}°/{:.1}° blocked by building {} ({} m) at {:.0} m",
                sun.azimuth,
                sun.altitude,
                building.id,
                building.height,
                distance
            );
            BlockageResult {
                blocked: true,
                building_id: Some(building.id),
                blocking_height: Some(building.height),
                block_distance: Some(distance.round()),
            }
        }
        None => BlockageResult::clear(),
    }
}

pub fn check_day(
    observer: &Observer,
    path: &[ArcPoint],
    buildings: &[BuildingFeature],
) -> Vec<BlockagePoint> {
    scan_day(observer, path, buildings, &EngineConfig::default())
}

/// Blockage verdict for every above-horizon sample of a day path.
pub fn check_day_with_config(
    observer: &Observer,
    path: &[ArcPoint],
    buildings: &[BuildingFeature],
    config: &EngineConfig,
) -> Result<Vec<BlockagePoint>> {
    config.validate()?;
    Ok(scan_day(observer, path, buildings, config))
}

fn scan_day(
    observer: &Observer,
    path: &[ArcPoint],
    buildings: &[BuildingFeature],
    config: &EngineConfig,
) -> Vec<BlockagePoint> {
    path.iter()
        .filter(|p| p.altitude > 0.0)
        .map(|p| {
            let result = trace_sun_ray(observer, &p.position(), buildings, config);
            BlockagePoint {
                time: p.time,
                azimuth: p.azimuth,
                altitude: p.altitude,
                blocked: result.blocked,
            }
        })
        .collect()
}

impl SunVisibility {
    pub fn derive(sun: &SunPosition, blockage: &BlockageResult) -> Self {
        if !sun.is_up() {
            SunVisibility::Below
        } else if blockage.blocked {
            SunVisibility::Blocked
        } else {
            SunVisibility::Visible
        }
    }
}

/// Position and verdict for one instant in a single call.
pub fn visibility(
    observer: &Observer,
    sun: &SunPosition,
    buildings: &[BuildingFeature],
) -> (SunVisibility, BlockageResult) {
    let result = check_instant(observer, sun, buildings);
    (SunVisibility::derive(sun, &result), result)
}

pub fn visibility_with_config(
    observer: &Observer,
    sun: &SunPosition,
    buildings: &[BuildingFeature],
    config: &EngineConfig,
) -> Result<(SunVisibility, BlockageResult)> {
    let result = check_instant_with_config(observer, sun, buildings, config)?;
    Ok((SunVisibility::derive(sun, &result), result))
}
