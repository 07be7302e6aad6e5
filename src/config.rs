use serde::{Deserialize, Serialize};

use crate::error::{Result, SunSightError};
use crate::types::{Location, Observer};

/// Storey height used whenever a building only carries a level count.
/// Real storeys range roughly 2.7–4 m; 3 m is a deliberate simplification.
pub const METERS_PER_LEVEL: f64 = 3.0;
pub const EYE_HEIGHT: f64 = 1.5;
pub const FULL_FIELD_OF_VIEW: f64 = 180.0;
pub(crate) const MINUTES_PER_DAY: i64 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub sample_step_minutes: i64,
    pub ray_length_m: f64,
    pub bearing_tolerance_deg: f64,
    pub min_intersection_distance_m: f64,
    pub meters_per_level: f64,
    pub default_height_m: f64,
    pub max_shadow_length_m: f64,
    /// Douglas–Peucker tolerance in degrees; `None` keeps rings as delivered.
    pub simplify_tolerance_deg: Option<f64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sample_step_minutes: 10,
            ray_length_m: 500.0,
            bearing_tolerance_deg: 30.0,
            min_intersection_distance_m: 1.0,
            meters_per_level: METERS_PER_LEVEL,
            default_height_m: 3.0,
            max_shadow_length_m: 2000.0,
            simplify_tolerance_deg: None,
        }
    }
}

impl EngineConfig {
    fn check_step(&self) -> Result<()> {
        if self.sample_step_minutes <= 0 || MINUTES_PER_DAY % self.sample_step_minutes != 0 {
            return Err(SunSightError::InvalidParameter(format!(
                "sample_step_minutes must divide a day evenly, got {}",
                self.sample_step_minutes
            )));
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        self.check_step()?;
        let positive = [
            ("ray_length_m", self.ray_length_m),
            ("meters_per_level", self.meters_per_level),
            ("default_height_m", self.default_height_m),
            ("max_shadow_length_m", self.max_shadow_length_m),
        ];
        for (name, value) in positive {
            if !(value > 0.0) {
                return Err(SunSightError::InvalidParameter(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if !(0.0..=180.0).contains(&self.bearing_tolerance_deg) {
            return Err(SunSightError::InvalidParameter(format!(
                "bearing_tolerance_deg must be within [0, 180], got {}",
                self.bearing_tolerance_deg
            )));
        }
        if self.min_intersection_distance_m < 0.0 {
            return Err(SunSightError::InvalidParameter(format!(
                "min_intersection_distance_m must not be negative, got {}",
                self.min_intersection_distance_m
            )));
        }
        if let Some(tol) = self.simplify_tolerance_deg {
            if !(tol >= 0.0) {
                return Err(SunSightError::InvalidParameter(format!(
                    "simplify_tolerance_deg must not be negative, got {}",
                    tol
                )));
            }
        }
        Ok(())
    }

    /// Samples from midnight through the next midnight, both included.
    pub fn samples_per_day(&self) -> Result<usize> {
        self.check_step()?;
        Ok((MINUTES_PER_DAY / self.sample_step_minutes) as usize + 1)
    }
}

impl Observer {
    pub fn new(location: Location, elevation: f64) -> Self {
        Self {
            location,
            elevation,
            facing: None,
            field_of_view: FULL_FIELD_OF_VIEW,
        }
    }

    /// Floor 1 is the ground floor; eye level sits 1.5 m above the slab.
    pub fn at_floor(location: Location, floor: u32) -> Self {
        Self::on_floor(location, floor, METERS_PER_LEVEL)
    }

    /// Like [`Observer::at_floor`] with the storey height taken from `config`.
    pub fn at_floor_with_config(
        location: Location,
        floor: u32,
        config: &EngineConfig,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::on_floor(location, floor, config.meters_per_level))
    }

    fn on_floor(location: Location, floor: u32, meters_per_level: f64) -> Self {
        let elevation = floor.saturating_sub(1) as f64 * meters_per_level + EYE_HEIGHT;
        Self::new(location, elevation)
    }

    pub fn facing(mut self, bearing: f64, field_of_view: f64) -> Self {
        self.facing = Some(bearing);
        self.field_of_view = field_of_view;
        self
    }
}
