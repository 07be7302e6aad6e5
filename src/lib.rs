pub mod angles;
pub mod arc;
pub mod blockage;
pub mod buildings;
pub mod config;
pub mod ephemeris;
pub mod error;
pub mod geo;
pub mod shadow;
pub mod types;
pub mod windows;

pub use angles::{
    angular_difference, bearing_to_compass, deg_to_rad, interpolate_angle, opposite_bearing,
    rad_to_deg,
};

pub use arc::{
    arc_segments, arc_segments_with_config, position_on_path, project_sky_position, sun_marker,
    DayPathCache,
};

pub use blockage::{
    check_day, check_day_with_config, check_instant, check_instant_with_config,
    filter_buildings_by_sun_bearing, sun_ray_height, visibility, visibility_with_config,
};

pub use buildings::{normalize, normalize_strict, normalize_with_config, resolve_height};

pub use config::{EngineConfig, EYE_HEIGHT, METERS_PER_LEVEL};

pub use ephemeris::{day_path, day_path_with_config, sun_position, sun_times, sun_times_at_height};

pub use error::{Result, SunSightError};

pub use shadow::{cast_shadows, cast_shadows_with_config, shadow_length};

pub use types::{
    ArcPoint, ArcSegment, BlockagePoint, BlockageResult, BuildingFeature, Coord, DayKind,
    HeightSource, Location, Observer, RawBuilding, RawNode, ShadowPolygon, SunMarker, SunPosition,
    SunTimes, SunVisibility, SunWindow,
};

pub use windows::{sun_windows, sun_windows_with_config, total_sun_minutes};
