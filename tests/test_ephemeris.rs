#[macro_use]
mod common;

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;
use chrono_tz::Australia::Sydney;
use chrono_tz::Europe::{Madrid, Oslo};

use common::san_francisco;
use sunsight::angles::angular_difference;
use sunsight::ephemeris::*;
use sunsight::{DayKind, EngineConfig, Location, SunSightError};

fn minutes_apart(a: chrono::DateTime<Utc>, b: chrono::DateTime<Utc>) -> i64 {
    (a - b).num_minutes().abs()
}

// ── Location validation ──

#[test]
fn test_location_rejects_out_of_range() {
    assert_eq!(Location::new(90.5, 0.0), Err(SunSightError::InvalidLatitude(90.5)));
    assert_eq!(Location::new(0.0, -181.0), Err(SunSightError::InvalidLongitude(-181.0)));
    assert!(Location::new(f64::NAN, 0.0).is_err());
    assert!(Location::new(-90.0, 180.0).is_ok());
}

#[test]
fn test_location_deserialization_is_validated() {
    let ok: Location = serde_json::from_str(r#"{"latitude": 37.7906, "longitude": -122.4294}"#).unwrap();
    assert_eq!(ok, san_francisco());
    assert_eq!(ok.latitude(), 37.7906);
    assert_eq!(ok.longitude(), -122.4294);

    let cases = [
        r#"{"latitude": 120.0, "longitude": 0.0}"#,
        r#"{"latitude": 0.0, "longitude": 200.0}"#,
        r#"{"latitude": 10.0}"#,
    ];
    for json in cases {
        assert!(serde_json::from_str::<Location>(json).is_err(), "{}", json);
    }

    let echoed: Location = serde_json::from_str(&serde_json::to_string(&ok).unwrap()).unwrap();
    assert_eq!(echoed, ok);
}

// ── sun_position ──

#[test]
fn test_san_francisco_new_years_eve_noon() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 12, 3, 0).unwrap();
    let pos = sun_position(&san_francisco(), &dt);
    assert!(pos.azimuth > 170.0 && pos.azimuth < 185.0, "azimuth={}", pos.azimuth);
    assert!(pos.altitude > 25.0 && pos.altitude < 35.0, "altitude={}", pos.altitude);
}

#[test]
fn test_azimuth_is_compass_referenced() {
    let sf = san_francisco();
    let morning = sun_position(&sf, &Los_Angeles.with_ymd_and_hms(2025, 6, 21, 8, 0, 0).unwrap());
    let evening = sun_position(&sf, &Los_Angeles.with_ymd_and_hms(2025, 6, 21, 17, 0, 0).unwrap());
    assert!(morning.azimuth > 45.0 && morning.azimuth < 135.0, "morning={}", morning.azimuth);
    assert!(evening.azimuth > 225.0 && evening.azimuth < 315.0, "evening={}", evening.azimuth);
}

#[test]
fn test_southern_hemisphere_noon_sun_is_north() {
    let sydney = Location::new(-33.87, 151.21).unwrap();
    let dt = Sydney.with_ymd_and_hms(2025, 6, 21, 11, 57, 0).unwrap();
    let pos = sun_position(&sydney, &dt);
    assert!(angular_difference(pos.azimuth, 0.0) < 10.0, "azimuth={}", pos.azimuth);
    assert!(pos.altitude > 28.0 && pos.altitude < 37.0, "altitude={}", pos.altitude);
}

#[test]
fn test_azimuth_always_in_compass_range() {
    let sf = san_francisco();
    let start = Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap();
    for h in 0..48 {
        let pos = sun_position(&sf, &(start + Duration::minutes(37 * h)));
        assert!((0.0..360.0).contains(&pos.azimuth), "azimuth={}", pos.azimuth);
        assert!((-90.0..=90.0).contains(&pos.altitude), "altitude={}", pos.altitude);
    }
}

#[test]
fn test_equator_sun_overhead_at_equinox() {
    let equator = Location::new(0.0, 0.0).unwrap();
    let dt = Utc.with_ymd_and_hms(2026, 3, 20, 12, 7, 0).unwrap();
    let pos = sun_position(&equator, &dt);
    assert!(pos.altitude > 85.0, "altitude={}", pos.altitude);
}

#[test]
fn test_altitude_negative_at_midnight() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap();
    let pos = sun_position(&san_francisco(), &dt);
    assert!(pos.altitude < -30.0, "altitude={}", pos.altitude);
}

// ── sun_times ──

#[test]
fn test_san_francisco_sunrise_sunset() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 12, 3, 0).unwrap();
    let times = sun_times(&san_francisco(), &dt);

    let expected_rise = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 7, 25, 0).unwrap().with_timezone(&Utc);
    let expected_set = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 17, 2, 0).unwrap().with_timezone(&Utc);
    let expected_noon = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 12, 14, 0).unwrap().with_timezone(&Utc);

    assert_eq!(times.day_kind, DayKind::Regular);
    assert!(minutes_apart(times.sunrise.unwrap(), expected_rise) <= 10, "sunrise={:?}", times.sunrise);
    assert!(minutes_apart(times.sunset.unwrap(), expected_set) <= 10, "sunset={:?}", times.sunset);
    assert!(minutes_apart(times.solar_noon, expected_noon) <= 5, "noon={}", times.solar_noon);
    assert_eq!(times.solar_noon - times.nadir, Duration::hours(12));
    assert!(times.day_length_minutes > 565.0 && times.day_length_minutes < 590.0);
}

#[test]
fn test_sun_events_are_ordered() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 4, 15, 9, 0, 0).unwrap();
    let t = sun_times(&san_francisco(), &dt);
    let sequence = [
        t.astronomical_dawn.unwrap(),
        t.nautical_dawn.unwrap(),
        t.civil_dawn.unwrap(),
        t.sunrise.unwrap(),
        t.sunrise_end.unwrap(),
        t.golden_hour_end.unwrap(),
        t.solar_noon,
        t.golden_hour_start.unwrap(),
        t.sunset_start.unwrap(),
        t.sunset.unwrap(),
        t.civil_dusk.unwrap(),
        t.nautical_dusk.unwrap(),
        t.astronomical_dusk.unwrap(),
    ];
    for pair in sequence.windows(2) {
        assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
    }
}

#[test]
fn test_day_length_matches_sunrise_sunset() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap();
    let t = sun_times(&san_francisco(), &dt);
    let span = (t.sunset.unwrap() - t.sunrise.unwrap()).num_milliseconds() as f64 / 60_000.0;
    assert_approx!(t.day_length_minutes, span, 1e-9);
}

#[test]
fn test_elevated_observer_sees_earlier_sunrise() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap();
    let ground = sun_times(&san_francisco(), &dt);
    let high = sun_times_at_height(&san_francisco(), &dt, 100.0);
    assert!(high.sunrise.unwrap() < ground.sunrise.unwrap());
    assert!(high.sunset.unwrap() > ground.sunset.unwrap());
    assert!(high.day_length_minutes > ground.day_length_minutes);
}

#[test]
fn test_polar_day_fallback() {
    let tromso = Location::new(69.65, 18.96).unwrap();
    let dt = Oslo.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap();
    let t = sun_times(&tromso, &dt);
    assert_eq!(t.day_kind, DayKind::PolarDay);
    assert!(t.sunrise.is_none() && t.sunset.is_none());
    assert_approx!(t.day_length_minutes, 1440.0, 1e-9);
}

#[test]
fn test_polar_night_fallback() {
    let tromso = Location::new(69.65, 18.96).unwrap();
    let dt = Oslo.with_ymd_and_hms(2025, 12, 21, 12, 0, 0).unwrap();
    let t = sun_times(&tromso, &dt);
    assert_eq!(t.day_kind, DayKind::PolarNight);
    assert!(t.sunrise.is_none() && t.sunset.is_none());
    assert_approx!(t.day_length_minutes, 0.0, 1e-9);
    // twilight still happens
    assert!(t.civil_dawn.is_some() && t.civil_dusk.is_some());
}

#[test]
fn test_poles_do_not_produce_nan() {
    let north = Location::new(90.0, 0.0).unwrap();
    let summer = sun_times(&north, &Utc.with_ymd_and_hms(2025, 6, 21, 12, 0, 0).unwrap());
    let winter = sun_times(&north, &Utc.with_ymd_and_hms(2025, 12, 21, 12, 0, 0).unwrap());
    assert_eq!(summer.day_kind, DayKind::PolarDay);
    assert_eq!(winter.day_kind, DayKind::PolarNight);
    assert!(!summer.day_length_minutes.is_nan());
}

#[test]
fn test_sun_times_follow_local_calendar_day() {
    let sf = san_francisco();
    let just_after_midnight = sun_times(&sf, &Los_Angeles.with_ymd_and_hms(2025, 12, 31, 0, 5, 0).unwrap());
    let noon = sun_times(&sf, &Los_Angeles.with_ymd_and_hms(2025, 12, 31, 12, 0, 0).unwrap());
    let late = sun_times(&sf, &Los_Angeles.with_ymd_and_hms(2025, 12, 31, 23, 55, 0).unwrap());
    assert_eq!(just_after_midnight, noon);
    assert_eq!(late, noon);

    let day = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();
    assert_eq!(noon.solar_noon.with_timezone(&Los_Angeles).date_naive(), day);
}

#[test]
fn test_sunrise_after_local_midnight_is_same_day() {
    let madrid = Location::new(40.4168, -3.7038).unwrap();
    let times = sun_times(&madrid, &Madrid.with_ymd_and_hms(2025, 7, 10, 1, 30, 0).unwrap());
    let day = NaiveDate::from_ymd_opt(2025, 7, 10).unwrap();
    for event in [times.sunrise.unwrap(), times.solar_noon, times.sunset.unwrap()] {
        assert_eq!(event.with_timezone(&Madrid).date_naive(), day, "{}", event);
    }
}

// ── day_path ──

#[test]
fn test_day_path_has_145_samples_from_local_midnight() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 12, 3, 0).unwrap();
    let path = day_path(&san_francisco(), &dt);
    assert_eq!(path.len(), 145);

    let midnight = Los_Angeles.with_ymd_and_hms(2025, 12, 31, 0, 0, 0).unwrap().with_timezone(&Utc);
    assert_eq!(path[0].time, midnight);
    assert_eq!(path[144].time, midnight + Duration::hours(24));
    for pair in path.windows(2) {
        assert_eq!(pair[1].time - pair[0].time, Duration::minutes(10));
    }
}

#[test]
fn test_day_path_depends_only_on_calendar_day() {
    let sf = san_francisco();
    let early = day_path(&sf, &Los_Angeles.with_ymd_and_hms(2025, 12, 31, 0, 5, 0).unwrap());
    let late = day_path(&sf, &Los_Angeles.with_ymd_and_hms(2025, 12, 31, 23, 50, 0).unwrap());
    assert_eq!(early, late);
}

#[test]
fn test_day_path_samples_match_positions() {
    let sf = san_francisco();
    let path = day_path(&sf, &Los_Angeles.with_ymd_and_hms(2025, 9, 1, 8, 0, 0).unwrap());
    for p in path.iter().step_by(12) {
        let pos = sun_position(&sf, &p.time);
        assert_approx!(p.azimuth, pos.azimuth, 1e-12);
        assert_approx!(p.altitude, pos.altitude, 1e-12);
    }
    let highest = path.iter().map(|p| p.altitude).fold(f64::MIN, f64::max);
    assert!(highest > 55.0 && highest < 65.0, "highest={}", highest);
}

#[test]
fn test_day_path_custom_step() {
    let config = EngineConfig {
        sample_step_minutes: 30,
        ..EngineConfig::default()
    };
    let dt = Los_Angeles.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
    let path = day_path_with_config(&san_francisco(), &dt, &config).unwrap();
    assert_eq!(path.len(), 49);
}

#[test]
fn test_day_path_rejects_invalid_step() {
    let dt = Los_Angeles.with_ymd_and_hms(2025, 3, 9, 12, 0, 0).unwrap();
    for step in [0, -10, 7] {
        let config = EngineConfig {
            sample_step_minutes: step,
            ..EngineConfig::default()
        };
        assert!(
            matches!(
                day_path_with_config(&san_francisco(), &dt, &config),
                Err(SunSightError::InvalidParameter(_))
            ),
            "step {}",
            step
        );
    }
}
