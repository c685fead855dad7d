//! Region classification.
//!
//! Every centre is bucketed into one of seven regions by comparing its
//! coordinates against a fixed reference point in the middle of the island.
//! The central box is tested first, then the north/south bands, then the
//! strip between them.

use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

use crate::types::Centre;
use crate::util::parse_f64_safe;

/// Reference latitude (decimal degrees).
pub const REF_LAT: f64 = 1.3521;
/// Reference longitude (decimal degrees).
pub const REF_LON: f64 = 103.8198;
/// Half-width of the central box, in degrees.
pub const THRESHOLD: f64 = 0.02;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum,
)]
pub enum Region {
    #[value(name = "North")]
    North,
    #[value(name = "South")]
    South,
    #[value(name = "Central")]
    Central,
    #[value(name = "NE")]
    NE,
    #[value(name = "NW")]
    NW,
    #[value(name = "SE")]
    SE,
    #[value(name = "SW")]
    SW,
}

impl Region {
    /// All labels in display order.
    pub const ALL: [Region; 7] = [
        Region::North,
        Region::South,
        Region::Central,
        Region::NE,
        Region::NW,
        Region::SE,
        Region::SW,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Region::North => "North",
            Region::South => "South",
            Region::Central => "Central",
            Region::NE => "NE",
            Region::NW => "NW",
            Region::SE => "SE",
            Region::SW => "SW",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping key for data joined to a centre's region. `Unknown` holds rows
/// whose centre could not be found (or could not be classified).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RegionKey {
    Known(Region),
    Unknown,
}

impl fmt::Display for RegionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegionKey::Known(r) => r.fmt(f),
            RegionKey::Unknown => f.write_str("unknown"),
        }
    }
}

// Serialised as its label so it can key a JSON object.
impl Serialize for RegionKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("invalid coordinate (lat: {lat:?}, lon: {lon:?})")]
pub struct InvalidCoordinate {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}

/// Assign a region to a coordinate pair. Both values must be finite.
pub fn classify(lat: f64, lon: f64) -> Result<Region, InvalidCoordinate> {
    if !lat.is_finite() || !lon.is_finite() {
        return Err(InvalidCoordinate {
            lat: Some(lat),
            lon: Some(lon),
        });
    }

    let region = if (lat - REF_LAT).abs() <= THRESHOLD && (lon - REF_LON).abs() <= THRESHOLD {
        Region::Central
    } else if lat > REF_LAT + THRESHOLD {
        if lon > REF_LON {
            Region::NE
        } else {
            Region::NW
        }
    } else if lat < REF_LAT - THRESHOLD {
        if lon > REF_LON {
            Region::SE
        } else {
            Region::SW
        }
    } else if lat > REF_LAT {
        Region::North
    } else {
        Region::South
    };
    Ok(region)
}

/// Classify coordinates in their source text form, as served by the API.
pub fn classify_text(lat: &str, lon: &str) -> Result<Region, InvalidCoordinate> {
    match (parse_f64_safe(Some(lat)), parse_f64_safe(Some(lon))) {
        (Some(lat), Some(lon)) => classify(lat, lon),
        (lat, lon) => Err(InvalidCoordinate { lat, lon }),
    }
}

/// A centre together with its derived region. Re-derive it whenever the
/// centre's coordinates change.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedCentre {
    pub centre: Centre,
    pub region: Region,
}

impl ClassifiedCentre {
    /// Rating used for comparisons and means; absent counts as zero.
    pub fn rating_or_zero(&self) -> f64 {
        self.centre.avg_rating.unwrap_or(0.0)
    }
}

/// A centre that was left out of aggregation, with the reason.
#[derive(Debug, Clone, PartialEq)]
pub struct Unclassifiable {
    pub centre_id: String,
    pub name: String,
    pub error: InvalidCoordinate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub classified: Vec<ClassifiedCentre>,
    pub unclassifiable: Vec<Unclassifiable>,
}

pub fn classify_centre(centre: &Centre) -> Result<Region, InvalidCoordinate> {
    match (centre.lat, centre.lon) {
        (Some(lat), Some(lon)) => classify(lat, lon),
        (lat, lon) => Err(InvalidCoordinate { lat, lon }),
    }
}

/// Classify every centre, keeping input order. Centres with bad
/// coordinates are collected rather than failing the whole pass.
pub fn classify_centres(centres: &[Centre]) -> Classification {
    let mut out = Classification::default();
    for centre in centres {
        match classify_centre(centre) {
            Ok(region) => out.classified.push(ClassifiedCentre {
                centre: centre.clone(),
                region,
            }),
            Err(error) => {
                log::warn!(
                    "Skipping centre {} ({}): {}",
                    centre.centre_id,
                    centre.name,
                    error
                );
                out.unclassifiable.push(Unclassifiable {
                    centre_id: centre.centre_id.clone(),
                    name: centre.name.clone(),
                    error,
                });
            }
        }
    }
    log::debug!(
        "Classified {} centres, {} unclassifiable",
        out.classified.len(),
        out.unclassifiable.len()
    );
    out
}

#[cfg(test)]
pub(crate) fn centre(id: &str, lat: f64, lon: f64, rating: Option<f64>) -> Centre {
    Centre {
        centre_id: id.to_string(),
        name: format!("Centre {id}"),
        lat: Some(lat),
        lon: Some(lon),
        avg_rating: rating,
        stall_count: None,
        top_stalls: None,
    }
}
