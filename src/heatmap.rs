//! Heatmap weights for the centre map.

use serde::Serialize;
use std::fmt;

use crate::types::Centre;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum HeatmapMode {
    /// Weight by average rating.
    Rating,
    /// Weight by number of stalls.
    Stalls,
}

impl fmt::Display for HeatmapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HeatmapMode::Rating => f.write_str("rating"),
            HeatmapMode::Stalls => f.write_str("stalls"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatPoint {
    pub centre_id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub value: f64,
    /// `value` rescaled onto `[0, 1]` across the mapped centres.
    pub intensity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub mode: HeatmapMode,
    pub min_value: f64,
    pub max_value: f64,
    pub points: Vec<HeatPoint>,
    /// Centres left off the map for lack of coordinates.
    pub skipped: usize,
}

fn value_of(centre: &Centre, mode: HeatmapMode) -> f64 {
    match mode {
        HeatmapMode::Rating => centre.avg_rating.unwrap_or(0.0),
        HeatmapMode::Stalls => f64::from(centre.stall_count.unwrap_or(0)),
    }
}

/// Min-max normalised weights. Missing ratings or stall counts weigh 0; a
/// map where every centre has the same value gets intensity 0 throughout.
pub fn heatmap_points(centres: &[Centre], mode: HeatmapMode) -> Heatmap {
    let mapped: Vec<(&Centre, f64, f64)> = centres
        .iter()
        .filter_map(|c| match (c.lat, c.lon) {
            (Some(lat), Some(lon)) => Some((c, lat, lon)),
            _ => None,
        })
        .collect();
    let skipped = centres.len() - mapped.len();

    let values: Vec<f64> = mapped.iter().map(|(c, _, _)| value_of(c, mode)).collect();
    let min_value = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max_value = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let (min_value, max_value) = if values.is_empty() {
        (0.0, 0.0)
    } else {
        (min_value, max_value)
    };
    let range = max_value - min_value;

    let points = mapped
        .into_iter()
        .zip(values)
        .map(|((c, lat, lon), value)| {
            let intensity = if range.abs() < f64::EPSILON {
                0.0
            } else {
                ((value - min_value) / range).clamp(0.0, 1.0)
            };
            HeatPoint {
                centre_id: c.centre_id.clone(),
                name: c.name.clone(),
                lat,
                lon,
                value,
                intensity,
            }
        })
        .collect();

    Heatmap {
        mode,
        min_value,
        max_value,
        points,
        skipped,
    }
}
