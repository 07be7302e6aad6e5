//! Raw footprint records to typed building features.
//!
//! Height resolution order: a positive `height` tag is taken as measured;
//! otherwise a positive `building:levels` tag gives an estimate of
//! `levels * meters_per_level`; otherwise the building gets the default
//! single-storey height and an unknown provenance.

use log::debug;

use crate::config::EngineConfig;
use crate::error::{Result, SunSightError};
use crate::types::{BuildingFeature, Coord, HeightSource, RawBuilding};

pub const MIN_RING_POINTS: usize = 4;

const HEIGHT_TAGS: [&str; 2] = ["height", "building:height"];
const LEVEL_TAGS: [&str; 2] = ["building:levels", "levels"];

/// Leading decimal number of a tag value, so `"12.5 m"` reads as 12.5.
pub fn parse_leading_number(value: &str) -> Option<f64> {
    let s = value.trim_start();
    let mut end = 0;
    let mut seen_dot = false;
    for (i, ch) in s.char_indices() {
        match ch {
            '0'..='9' => end = i + 1,
            '.' if !seen_dot => seen_dot = true,
            '-' | '+' if i == 0 => {}
            _ => break,
        }
    }
    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn parse_leading_integer(value: &str) -> Option<i64> {
    let s = value.trim_start();
    let end = s
        .char_indices()
        .take_while(|&(i, ch)| ch.is_ascii_digit() || (i == 0 && (ch == '-' || ch == '+')))
        .map(|(i, ch)| i + ch.len_utf8())
        .last()?;
    s[..end].parse::<i64>().ok()
}

fn first_tag<'a>(raw: &'a RawBuilding, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .find_map(|k| raw.tags.get(*k))
        .map(String::as_str)
}

/// Returns `(height, levels, provenance)` for one record.
pub fn resolve_height(raw: &RawBuilding, config: &EngineConfig) -> (f64, u32, HeightSource) {
    let levels = first_tag(raw, &LEVEL_TAGS)
        .and_then(parse_leading_integer)
        .filter(|&l| l > 0)
        .map(|l| l.min(u32::MAX as i64) as u32);

    let measured = first_tag(raw, &HEIGHT_TAGS)
        .and_then(parse_leading_number)
        .filter(|&h| h > 0.0);

    match (measured, levels) {
        (Some(height), Some(levels)) => (height, levels, HeightSource::Measured),
        (Some(height), None) => {
            let levels = (height / config.meters_per_level).ceil().max(1.0) as u32;
            (height, levels, HeightSource::Measured)
        }
        (None, Some(levels)) => (
            levels as f64 * config.meters_per_level,
            levels,
            HeightSource::Estimated,
        ),
        (None, None) => (config.default_height_m, 1, HeightSource::Unknown),
    }
}

pub fn close_ring(mut ring: Vec<Coord>) -> Vec<Coord> {
    if let (Some(first), Some(last)) = (ring.first().copied(), ring.last().copied()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

fn perpendicular_distance(p: &Coord, a: &Coord, b: &Coord) -> f64 {
    let dx = b[0] - a[0];
    let dy = b[1] - a[1];
    let len_sq = dx * dx + dy * dy;
    if len_sq == 0.0 {
        return ((p[0] - a[0]).powi(2) + (p[1] - a[1]).powi(2)).sqrt();
    }
    let t = (((p[0] - a[0]) * dx + (p[1] - a[1]) * dy) / len_sq).clamp(0.0, 1.0);
    let proj = [a[0] + t * dx, a[1] + t * dy];
    ((p[0] - proj[0]).powi(2) + (p[1] - proj[1]).powi(2)).sqrt()
}

fn douglas_peucker(points: &[Coord], tolerance: f64, keep: &mut [bool]) {
    let mut stack = vec![(0, points.len() - 1)];
    while let Some((start, end)) = stack.pop() {
        if end <= start + 1 {
            continue;
        }
        let (idx, max_dist) = (start + 1..end)
            .map(|i| (i, perpendicular_distance(&points[i], &points[start], &points[end])))
            .fold((start, 0.0), |best, cur| if cur.1 > best.1 { cur } else { best });
        if max_dist > tolerance {
            keep[idx] = true;
            stack.push((start, idx));
            stack.push((idx, end));
        }
    }
}

/// Douglas–Peucker simplification with `tolerance` in coordinate units.
/// Endpoints are always kept, so a closed ring stays closed.
pub fn simplify_ring(ring: &[Coord], tolerance: f64) -> Vec<Coord> {
    if ring.len() < 3 {
        return ring.to_vec();
    }
    let mut keep = vec![false; ring.len()];
    keep[0] = true;
    keep[ring.len() - 1] = true;
    douglas_peucker(ring, tolerance, &mut keep);
    ring.iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(*c))
        .collect()
}

impl BuildingFeature {
    pub fn new(
        id: u64,
        ring: Vec<Coord>,
        height: f64,
        levels: u32,
        height_source: HeightSource,
        name: Option<String>,
    ) -> Result<Self> {
        let ring = close_ring(ring);
        if ring.len() < MIN_RING_POINTS {
            return Err(SunSightError::InvalidRing {
                id,
                points: ring.len(),
            });
        }
        if !(height > 0.0) {
            return Err(SunSightError::InvalidParameter(format!(
                "building {}: height must be positive, got {}",
                id, height
            )));
        }
        Ok(Self {
            id,
            name,
            ring,
            height,
            levels: levels.max(1),
            height_source,
        })
    }
}

/// Builds one feature, failing on records too short to form a ring.
pub fn normalize_record(raw: &RawBuilding, config: &EngineConfig) -> Result<BuildingFeature> {
    if raw.geometry.len() < MIN_RING_POINTS {
        return Err(SunSightError::InvalidRing {
            id: raw.id,
            points: raw.geometry.len(),
        });
    }
    let ring = close_ring(raw.geometry.iter().map(|n| [n.lon, n.lat]).collect());

    let ring = match config.simplify_tolerance_deg {
        Some(tol) => {
            let simplified = simplify_ring(&ring, tol);
            if simplified.len() >= MIN_RING_POINTS {
                simplified
            } else {
                debug!(
                    "building {}: simplified ring collapsed to {} points, keeping original",
                    raw.id,
                    simplified.len()
                );
                ring
            }
        }
        None => ring,
    };

    let (height, levels, source) = resolve_height(raw, config);
    let name = raw.tags.get("name").cloned();
    BuildingFeature::new(raw.id, ring, height, levels, source, name)
}

pub fn normalize(records: &[RawBuilding]) -> Vec<BuildingFeature> {
    normalize_lenient(records, &EngineConfig::default())
}

/// Normalizes a batch, dropping records that cannot form a ring.
pub fn normalize_with_config(records: &[RawBuilding], config: &EngineConfig) -> Result<Vec<BuildingFeature>> {
    config.validate()?;
    Ok(normalize_lenient(records, config))
}

fn normalize_lenient(records: &[RawBuilding], config: &EngineConfig) -> Vec<BuildingFeature> {
    records
        .iter()
        .filter_map(|raw| match normalize_record(raw, config) {
            Ok(feature) => Some(feature),
            Err(e) => {
                debug!("dropping building {}: {}", raw.id, e);
                None
            }
        })
        .collect()
}

/// Like [`normalize_with_config`] but fails on the first invalid record.
pub fn normalize_strict(records: &[RawBuilding], config: &EngineConfig) -> Result<Vec<BuildingFeature>> {
    config.validate()?;
    records
        .iter()
        .map(|raw| normalize_record(raw, config))
        .collect()
}
