#![allow(dead_code, unused_macros)]

use sunsight::geo::destination;
use sunsight::{BuildingFeature, Coord, HeightSource, Location};

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn san_francisco() -> Location {
    Location::new(37.7906, -122.4294).unwrap()
}

/// Axis-aligned square footprint centred `distance` meters from `origin`
/// along `bearing`.
pub fn square_ring(origin: &Location, distance: f64, bearing: f64, half_size: f64) -> Vec<Coord> {
    let center = destination(&origin.coord(), distance, bearing).unwrap();
    let north = destination(&center, half_size, 0.0).unwrap();
    let south = destination(&center, half_size, 180.0).unwrap();
    let nw = destination(&north, half_size, 270.0).unwrap();
    let ne = destination(&north, half_size, 90.0).unwrap();
    let se = destination(&south, half_size, 90.0).unwrap();
    let sw = destination(&south, half_size, 270.0).unwrap();
    vec![nw, ne, se, sw, nw]
}

pub fn tower(id: u64, origin: &Location, distance: f64, bearing: f64, height: f64) -> BuildingFeature {
    BuildingFeature::new(
        id,
        square_ring(origin, distance, bearing, 10.0),
        height,
        (height / 3.0).ceil() as u32,
        HeightSource::Measured,
        None,
    )
    .unwrap()
}
