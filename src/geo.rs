//! Spherical-earth helpers over `[lon, lat]` coordinates.
//!
//! Distances and bearings use a spherical earth of mean radius. Segment
//! intersection is planar in degree space, which is accurate enough at the
//! few-hundred-meter scale the blockage ray works at.

use crate::angles::{bearing_to_compass, deg_to_rad, rad_to_deg};
use crate::error::{Result, SunSightError};
use crate::types::Coord;

pub const EARTH_RADIUS_M: f64 = 6_371_008.8;
const EPS: f64 = 1e-12;

fn check_finite(c: &Coord) -> Result<()> {
    if c[0].is_finite() && c[1].is_finite() {
        Ok(())
    } else {
        Err(SunSightError::Degenerate(format!(
            "non-finite coordinate [{}, {}]",
            c[0], c[1]
        )))
    }
}

/// Great-circle distance in meters (haversine).
pub fn distance(from: &Coord, to: &Coord) -> f64 {
    let lat1 = deg_to_rad(from[1]);
    let lat2 = deg_to_rad(to[1]);
    let d_lat = deg_to_rad(to[1] - from[1]);
    let d_lon = deg_to_rad(to[0] - from[0]);

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * a.sqrt().atan2((1.0 - a).sqrt()) * EARTH_RADIUS_M
}

/// Initial great-circle bearing from `from` to `to`, compass degrees.
pub fn bearing(from: &Coord, to: &Coord) -> f64 {
    let lat1 = deg_to_rad(from[1]);
    let lat2 = deg_to_rad(to[1]);
    let d_lon = deg_to_rad(to[0] - from[0]);

    let y = d_lon.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
    bearing_to_compass(rad_to_deg(y.atan2(x)))
}

/// Point reached travelling `meters` from `origin` along `bearing_deg`.
pub fn destination(origin: &Coord, meters: f64, bearing_deg: f64) -> Result<Coord> {
    check_finite(origin)?;
    if !meters.is_finite() || !bearing_deg.is_finite() {
        return Err(SunSightError::Degenerate(format!(
            "cannot travel {} m along {}°",
            meters, bearing_deg
        )));
    }
    let lat1 = deg_to_rad(origin[1]);
    let lon1 = deg_to_rad(origin[0]);
    let brg = deg_to_rad(bearing_deg);
    let delta = meters / EARTH_RADIUS_M;

    let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * brg.cos()).asin();
    let lon2 = lon1
        + (brg.sin() * delta.sin() * lat1.cos()).atan2(delta.cos() - lat1.sin() * lat2.sin());

    let out = [rad_to_deg(lon2), rad_to_deg(lat2)];
    check_finite(&out)?;
    Ok(out)
}

/// Mean of the distinct ring vertices (closing vertex excluded).
pub fn ring_centroid(ring: &[Coord]) -> Option<Coord> {
    let open = match ring.split_last() {
        Some((last, rest)) if !rest.is_empty() && rest[0] == *last => rest,
        _ => ring,
    };
    if open.is_empty() {
        return None;
    }
    let n = open.len() as f64;
    let (sx, sy) = open
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c[0], sy + c[1]));
    Some([sx / n, sy / n])
}

/// Proper intersection point of segments `p1-p2` and `p3-p4`, if any.
/// Parallel and collinear segments report no intersection.
pub fn segment_intersection(p1: &Coord, p2: &Coord, p3: &Coord, p4: &Coord) -> Option<Coord> {
    let d1x = p2[0] - p1[0];
    let d1y = p2[1] - p1[1];
    let d2x = p4[0] - p3[0];
    let d2y = p4[1] - p3[1];

    let cross = d1x * d2y - d1y * d2x;
    if cross.abs() < EPS * EPS {
        return None;
    }

    let d3x = p3[0] - p1[0];
    let d3y = p3[1] - p1[1];
    let t = (d3x * d2y - d3y * d2x) / cross;
    let u = (d3x * d1y - d3y * d1x) / cross;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some([p1[0] + t * d1x, p1[1] + t * d1y])
    } else {
        None
    }
}

/// Every point where the segment `start-end` crosses an edge of `ring`.
pub fn ring_intersections(start: &Coord, end: &Coord, ring: &[Coord]) -> Result<Vec<Coord>> {
    if ring.len() < 4 {
        return Err(SunSightError::Degenerate(format!(
            "ring with {} points",
            ring.len()
        )));
    }
    check_finite(start)?;
    check_finite(end)?;
    if start == end {
        return Err(SunSightError::Degenerate("zero-length segment".into()));
    }

    let mut hits = Vec::new();
    for edge in ring.windows(2) {
        check_finite(&edge[0])?;
        check_finite(&edge[1])?;
        if let Some(p) = segment_intersection(start, end, &edge[0], &edge[1]) {
            hits.push(p);
        }
    }
    Ok(hits)
}

/// Shifts every vertex of `ring` by `meters` along `bearing_deg`.
pub fn translate_ring(ring: &[Coord], meters: f64, bearing_deg: f64) -> Result<Vec<Coord>> {
    ring.iter()
        .map(|c| destination(c, meters, bearing_deg))
        .collect()
}
