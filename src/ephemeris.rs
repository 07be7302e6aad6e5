//! Sun position and daily sun events.
//!
//! Low-precision solar coordinates (about 0.01° over a few centuries around
//! J2000) from the mean anomaly and equation of centre, evaluated in
//! days since J2000.0. Internally the azimuth is measured from south,
//! westward positive; everything that leaves this module is compass
//! convention (0 = north, clockwise).

use chrono::{DateTime, Duration, NaiveTime, Offset, TimeZone, Utc};

use crate::angles::{bearing_to_compass, deg_to_rad, rad_to_deg};
use crate::config::{EngineConfig, MINUTES_PER_DAY};
use crate::error::Result;
use crate::types::{ArcPoint, DayKind, Location, SunPosition, SunTimes};

const DAY_MS: f64 = 86_400_000.0;
const J1970: f64 = 2_440_588.0;
const J2000: f64 = 2_451_545.0;
const J0: f64 = 0.0009;
/// Obliquity of the ecliptic at J2000.
const OBLIQUITY_DEG: f64 = 23.4397;
const PERIHELION_DEG: f64 = 102.9372;

pub const SUNRISE_ANGLE: f64 = -0.833;
pub const SUNRISE_END_ANGLE: f64 = -0.3;
pub const CIVIL_TWILIGHT_ANGLE: f64 = -6.0;
pub const NAUTICAL_TWILIGHT_ANGLE: f64 = -12.0;
pub const ASTRONOMICAL_TWILIGHT_ANGLE: f64 = -18.0;
pub const GOLDEN_HOUR_ANGLE: f64 = 6.0;

pub fn to_julian<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    dt.timestamp_millis() as f64 / DAY_MS - 0.5 + J1970
}

pub fn from_julian(j: f64) -> Option<DateTime<Utc>> {
    let ms = (j + 0.5 - J1970) * DAY_MS;
    if !ms.is_finite() {
        return None;
    }
    DateTime::<Utc>::from_timestamp_millis(ms.round() as i64)
}

pub fn days_since_j2000<Tz: TimeZone>(dt: &DateTime<Tz>) -> f64 {
    to_julian(dt) - J2000
}

fn obliquity() -> f64 {
    deg_to_rad(OBLIQUITY_DEG)
}

pub fn right_ascension(l: f64, b: f64) -> f64 {
    let e = obliquity();
    (l.sin() * e.cos() - b.tan() * e.sin()).atan2(l.cos())
}

pub fn declination(l: f64, b: f64) -> f64 {
    let e = obliquity();
    (b.sin() * e.cos() + b.cos() * e.sin() * l.sin()).asin()
}

pub fn sidereal_time(d: f64, lw: f64) -> f64 {
    deg_to_rad(280.16 + 360.985_623_5 * d) - lw
}

pub fn solar_mean_anomaly(d: f64) -> f64 {
    deg_to_rad(357.5291 + 0.985_600_28 * d)
}

pub fn ecliptic_longitude(m: f64) -> f64 {
    let c = deg_to_rad(1.9148 * m.sin() + 0.02 * (2.0 * m).sin() + 0.0003 * (3.0 * m).sin());
    m + c + deg_to_rad(PERIHELION_DEG) + std::f64::consts::PI
}

/// Azimuth in radians measured from south, positive toward west.
pub fn south_azimuth(h: f64, phi: f64, dec: f64) -> f64 {
    h.sin().atan2(h.cos() * phi.sin() - dec.tan() * phi.cos())
}

pub fn altitude(h: f64, phi: f64, dec: f64) -> f64 {
    (phi.sin() * dec.sin() + phi.cos() * dec.cos() * h.cos()).asin()
}

/// Converts a south-referenced azimuth in degrees to a compass bearing.
pub fn south_to_compass(azimuth_deg: f64) -> f64 {
    bearing_to_compass(azimuth_deg + 180.0)
}

pub fn sun_position<Tz: TimeZone>(location: &Location, dt: &DateTime<Tz>) -> SunPosition {
    let lw = deg_to_rad(-location.longitude());
    let phi = deg_to_rad(location.latitude());
    let d = days_since_j2000(dt);

    let m = solar_mean_anomaly(d);
    let l = ecliptic_longitude(m);
    let dec = declination(l, 0.0);
    let ra = right_ascension(l, 0.0);
    let h = sidereal_time(d, lw) - ra;

    SunPosition {
        azimuth: south_to_compass(rad_to_deg(south_azimuth(h, phi, dec))),
        altitude: rad_to_deg(altitude(h, phi, dec)),
    }
}

fn julian_cycle(d: f64, lw: f64) -> f64 {
    (d - J0 - lw / (2.0 * std::f64::consts::PI)).round()
}

fn approx_transit(ht: f64, lw: f64, n: f64) -> f64 {
    J0 + (ht + lw) / (2.0 * std::f64::consts::PI) + n
}

fn solar_transit_j(ds: f64, m: f64, l: f64) -> f64 {
    J2000 + ds + 0.0053 * m.sin() - 0.0069 * (2.0 * l).sin()
}

/// Horizon depression in degrees for an observer `height` meters up.
pub fn observer_angle(height: f64) -> f64 {
    -2.076 * height.max(0.0).sqrt() / 60.0
}

enum Crossing {
    At(f64),
    AlwaysAbove,
    AlwaysBelow,
}

fn hour_angle(h: f64, phi: f64, dec: f64) -> Crossing {
    let numerator = h.sin() - phi.sin() * dec.sin();
    let cos_w = numerator / (phi.cos() * dec.cos());
    if cos_w.is_nan() {
        return if numerator < 0.0 {
            Crossing::AlwaysAbove
        } else {
            Crossing::AlwaysBelow
        };
    }
    if cos_w < -1.0 {
        Crossing::AlwaysAbove
    } else if cos_w > 1.0 {
        Crossing::AlwaysBelow
    } else {
        Crossing::At(cos_w.acos())
    }
}

struct DayGeometry {
    lw: f64,
    phi: f64,
    dec: f64,
    n: f64,
    m: f64,
    l: f64,
    j_noon: f64,
}

impl DayGeometry {
    fn new<Tz: TimeZone>(location: &Location, dt: &DateTime<Tz>) -> Self {
        let lw = deg_to_rad(-location.longitude());
        let phi = deg_to_rad(location.latitude());
        // anchor on local noon so every instant of a calendar day shares one transit
        let anchor = local_midnight(dt) + Duration::hours(12);
        let n = julian_cycle(days_since_j2000(&anchor), lw);
        let ds = approx_transit(0.0, lw, n);
        let m = solar_mean_anomaly(ds);
        let l = ecliptic_longitude(m);
        let dec = declination(l, 0.0);
        let j_noon = solar_transit_j(ds, m, l);
        Self {
            lw,
            phi,
            dec,
            n,
            m,
            l,
            j_noon,
        }
    }

    /// Morning and evening instants at which the sun crosses `angle_deg`.
    fn crossing(&self, angle_deg: f64) -> (Crossing, Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        match hour_angle(deg_to_rad(angle_deg), self.phi, self.dec) {
            Crossing::At(w) => {
                let a = approx_transit(w, self.lw, self.n);
                let j_set = solar_transit_j(a, self.m, self.l);
                let j_rise = self.j_noon - (j_set - self.j_noon);
                (Crossing::At(w), from_julian(j_rise), from_julian(j_set))
            }
            other => (other, None, None),
        }
    }
}

pub fn sun_times<Tz: TimeZone>(location: &Location, dt: &DateTime<Tz>) -> SunTimes {
    sun_times_at_height(location, dt, 0.0)
}

/// Sun events for the day containing `dt`, with the horizon lowered for an
/// observer `height` meters above the surroundings.
pub fn sun_times_at_height<Tz: TimeZone>(
    location: &Location,
    dt: &DateTime<Tz>,
    height: f64,
) -> SunTimes {
    let geometry = DayGeometry::new(location, dt);
    let dh = observer_angle(height);
    let fallback = dt.with_timezone(&Utc);

    let solar_noon = from_julian(geometry.j_noon).unwrap_or(fallback);
    let nadir = from_julian(geometry.j_noon - 0.5).unwrap_or(fallback);

    let (horizon, sunrise, sunset) = geometry.crossing(SUNRISE_ANGLE + dh);
    let (_, sunrise_end, sunset_start) = geometry.crossing(SUNRISE_END_ANGLE + dh);
    let (_, civil_dawn, civil_dusk) = geometry.crossing(CIVIL_TWILIGHT_ANGLE + dh);
    let (_, nautical_dawn, nautical_dusk) = geometry.crossing(NAUTICAL_TWILIGHT_ANGLE + dh);
    let (_, astronomical_dawn, astronomical_dusk) =
        geometry.crossing(ASTRONOMICAL_TWILIGHT_ANGLE + dh);
    let (_, golden_hour_end, golden_hour_start) = geometry.crossing(GOLDEN_HOUR_ANGLE + dh);

    let (day_kind, day_length_minutes) = match (horizon, sunrise, sunset) {
        (Crossing::At(_), Some(rise), Some(set)) => {
            let minutes = (set - rise).num_milliseconds() as f64 / 60_000.0;
            (DayKind::Regular, minutes.max(0.0))
        }
        (Crossing::AlwaysAbove, _, _) => (DayKind::PolarDay, 1440.0),
        _ => (DayKind::PolarNight, 0.0),
    };

    SunTimes {
        solar_noon,
        nadir,
        sunrise,
        sunset,
        sunrise_end,
        sunset_start,
        civil_dawn,
        civil_dusk,
        nautical_dawn,
        nautical_dusk,
        astronomical_dawn,
        astronomical_dusk,
        golden_hour_end,
        golden_hour_start,
        day_kind,
        day_length_minutes,
    }
}

/// Start of the calendar day containing `dt`, in `dt`'s own time zone.
pub fn local_midnight<Tz: TimeZone>(dt: &DateTime<Tz>) -> DateTime<Utc> {
    let midnight = dt.date_naive().and_time(NaiveTime::MIN);
    match dt.timezone().from_local_datetime(&midnight).earliest() {
        Some(local) => local.with_timezone(&Utc),
        // midnight skipped by a DST jump: fall back to the instant's own offset
        None => {
            let offset = dt.offset().fix();
            Utc.from_utc_datetime(&(midnight - Duration::seconds(offset.local_minus_utc() as i64)))
        }
    }
}

pub fn day_path<Tz: TimeZone>(location: &Location, dt: &DateTime<Tz>) -> Vec<ArcPoint> {
    let config = EngineConfig::default();
    sample_day(location, dt, config.sample_step_minutes)
}

/// Samples the sun from local midnight through the following midnight,
/// both ends included. Only the calendar day of `dt` matters.
pub fn day_path_with_config<Tz: TimeZone>(
    location: &Location,
    dt: &DateTime<Tz>,
    config: &EngineConfig,
) -> Result<Vec<ArcPoint>> {
    config.validate()?;
    Ok(sample_day(location, dt, config.sample_step_minutes))
}

/// `step_minutes` must be positive and divide a day evenly.
pub(crate) fn sample_day<Tz: TimeZone>(location: &Location, dt: &DateTime<Tz>, step_minutes: i64) -> Vec<ArcPoint> {
    let start = local_midnight(dt);
    let step = Duration::minutes(step_minutes);
    (0..=(MINUTES_PER_DAY / step_minutes))
        .map(|i| {
            let time = start + step * i as i32;
            let pos = sun_position(location, &time);
            ArcPoint {
                azimuth: pos.azimuth,
                altitude: pos.altitude,
                time,
            }
        })
        .collect()
}
