//! Approximate shadow footprints.
//!
//! Each footprint is translated away from the sun by the shadow length.
//! This ignores the shape swept between the base and the roof outline, so
//! shadows of tall buildings appear as detached copies of the footprint.

use log::debug;

use crate::angles::{deg_to_rad, opposite_bearing};
use crate::config::EngineConfig;
use crate::error::Result;
use crate::geo;
use crate::types::{BuildingFeature, ShadowPolygon, SunPosition};

/// Length in meters of the shadow cast by an object `height` meters tall.
pub fn shadow_length(height: f64, altitude: f64) -> f64 {
    height / deg_to_rad(altitude).tan()
}

pub fn cast_shadows(sun: &SunPosition, buildings: &[BuildingFeature]) -> Vec<ShadowPolygon> {
    translate_footprints(sun, buildings, EngineConfig::default().max_shadow_length_m)
}

pub fn cast_shadows_with_config(
    sun: &SunPosition,
    buildings: &[BuildingFeature],
    config: &EngineConfig,
) -> Result<Vec<ShadowPolygon>> {
    config.validate()?;
    Ok(translate_footprints(sun, buildings, config.max_shadow_length_m))
}

fn translate_footprints(
    sun: &SunPosition,
    buildings: &[BuildingFeature],
    max_length: f64,
) -> Vec<ShadowPolygon> {
    if !sun.is_up() {
        return Vec::new();
    }
    let direction = opposite_bearing(sun.azimuth);

    buildings
        .iter()
        .filter(|b| b.height > 0.0)
        .filter_map(|b| {
            let length = shadow_length(b.height, sun.altitude);
            if !(length > 0.0 && length <= max_length) {
                return None;
            }
            match geo::translate_ring(&b.ring, length, direction) {
                Ok(ring) => Some(ShadowPolygon {
                    building_id: b.id,
                    length,
                    ring,
                }),
                Err(e) => {
                    debug!("skipping shadow for building {}: {}", b.id, e);
                    None
                }
            }
        })
        .collect()
}
