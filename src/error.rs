use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SunSightError {
    #[error("latitude {0} out of range [-90, 90]")]
    InvalidLatitude(f64),

    #[error("longitude {0} out of range [-180, 180]")]
    InvalidLongitude(f64),

    #[error("building {id}: ring has {points} points, at least 4 required")]
    InvalidRing { id: u64, points: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Geometry math that cannot produce a meaningful answer for one input.
    /// Batch operations skip the offending building instead of failing.
    #[error("degenerate geometry: {0}")]
    Degenerate(String),
}

pub type Result<T> = std::result::Result<T, SunSightError>;
