use chrono::TimeZone;
use chrono_tz::America::Los_Angeles;

use sunsight::{
    arc_segments, cast_shadows, check_day, day_path, normalize, sun_position, sun_times,
    sun_windows, total_sun_minutes, visibility, Location, Observer, RawBuilding,
};

const BUILDINGS: &str = r#"[
    {"id": 1, "tags": {"height": "95", "name": "Tower A"},
     "geometry": [{"lat": 37.7902, "lon": -122.4297}, {"lat": 37.7902, "lon": -122.4291},
                  {"lat": 37.7899, "lon": -122.4291}, {"lat": 37.7899, "lon": -122.4297}]},
    {"id": 2, "tags": {"building:levels": "6"},
     "geometry": [{"lat": 37.7912, "lon": -122.4300}, {"lat": 37.7912, "lon": -122.4296},
                  {"lat": 37.7910, "lon": -122.4296}, {"lat": 37.7910, "lon": -122.4300}]},
    {"id": 3, "tags": {},
     "geometry": [{"lat": 37.7905, "lon": -122.4285}, {"lat": 37.7905, "lon": -122.4283},
                  {"lat": 37.7903, "lon": -122.4283}, {"lat": 37.7903, "lon": -122.4285}]}
]"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let location = Location::new(37.7906, -122.4294)?;
    let dt = Los_Angeles
        .with_ymd_and_hms(2025, 12, 31, 12, 3, 0)
        .single()
        .ok_or("ambiguous local time")?;

    let records: Vec<RawBuilding> = serde_json::from_str(BUILDINGS)?;
    let buildings = normalize(&records);
    let observer = Observer::at_floor(location, 1);

    let pos = sun_position(&location, &dt);
    let times = sun_times(&location, &dt);
    let (state, blockage) = visibility(&observer, &pos, &buildings);

    println!("=== Sun Check ===");
    println!(
        "Location: San Francisco ({:.4}°N, {:.4}°W)",
        location.latitude(),
        -location.longitude()
    );
    println!("Date/Time: {}", dt);
    println!();
    println!("--- Sun ---");
    println!("Azimuth: {:.2}° (0°=N, 90°=E, 180°=S)", pos.azimuth);
    println!("Altitude: {:.2}°", pos.altitude);
    let local = |t: Option<chrono::DateTime<chrono::Utc>>| {
        t.map(|t| t.with_timezone(&Los_Angeles).format("%H:%M").to_string())
            .unwrap_or_else(|| "--".into())
    };
    println!("Sunrise: {}", local(times.sunrise));
    println!("Solar noon: {}", local(Some(times.solar_noon)));
    println!("Sunset: {}", local(times.sunset));
    println!("Day length: {:.0} minutes", times.day_length_minutes);
    println!();
    println!("--- Line of sight ---");
    println!("Buildings: {}", buildings.len());
    println!("Visibility: {:?}", state);
    if let (Some(h), Some(d)) = (blockage.blocking_height, blockage.block_distance) {
        println!("Blocked by a {:.0} m building {:.0} m away", h, d);
    }

    let path = day_path(&location, &dt);
    let scan = check_day(&observer, &path, &buildings);
    let windows = sun_windows(&scan);
    println!();
    println!("--- Sun windows ---");
    for w in &windows {
        println!("{} - {}", local(Some(w.start)), local(Some(w.end)));
    }
    println!("Total direct sun: {} minutes", total_sun_minutes(&windows));
    println!("Arc segments: {}", arc_segments(&scan).len());
    println!("Shadows cast: {}", cast_shadows(&pos, &buildings).len());

    Ok(())
}
