use chrono::Duration;
use log::trace;

use crate::config::EngineConfig;
use crate::error::Result;
use crate::types::{BlockagePoint, SunWindow};

pub fn sun_windows(points: &[BlockagePoint]) -> Vec<SunWindow> {
    merge_clear_runs(points, EngineConfig::default().sample_step_minutes)
}

/// Merges a day's blockage verdicts into unobstructed intervals.
///
/// A window opens at the first clear sample and closes at the timestamp of
/// the next blocked sample, so windows are right-exclusive by sample. Two
/// consecutive samples more than one step apart mean the sun went below the
/// horizon in between: an open window closes at the last clear sample before
/// the gap. A window still open when the samples run out closes at the last
/// sample. Zero-length windows are dropped.
pub fn sun_windows_with_config(
    points: &[BlockagePoint],
    config: &EngineConfig,
) -> Result<Vec<SunWindow>> {
    config.validate()?;
    Ok(merge_clear_runs(points, config.sample_step_minutes))
}

fn merge_clear_runs(points: &[BlockagePoint], step_minutes: i64) -> Vec<SunWindow> {
    let max_gap = Duration::minutes(step_minutes);
    let mut sorted: Vec<&BlockagePoint> = points.iter().collect();
    sorted.sort_by_key(|p| p.time);

    let mut windows = Vec::new();
    let mut open = None;
    let mut previous: Option<&BlockagePoint> = None;
    for &point in &sorted {
        if let (Some(start), Some(prev)) = (open, previous) {
            if point.time - prev.time > max_gap {
                trace!("sample gap {} -> {}", prev.time, point.time);
                windows.push(SunWindow {
                    start,
                    end: prev.time,
                });
                open = None;
            }
        }
        match (open, point.blocked) {
            (None, false) => open = Some(point.time),
            (Some(start), true) => {
                windows.push(SunWindow {
                    start,
                    end: point.time,
                });
                open = None;
            }
            _ => {}
        }
        previous = Some(point);
    }
    if let (Some(start), Some(last)) = (open, sorted.last()) {
        windows.push(SunWindow {
            start,
            end: last.time,
        });
    }

    windows.retain(|w| w.start < w.end);
    for w in &windows {
        trace!("sun window {} -> {}", w.start, w.end);
    }
    windows
}

pub fn total_sun_minutes(windows: &[SunWindow]) -> i64 {
    windows.iter().map(SunWindow::duration_minutes).sum()
}
