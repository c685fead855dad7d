use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tabled::Tabled;

use crate::util::parse_f64_safe;

/// A JSON scalar that should be numeric but may arrive as text, `null`, or
/// something else entirely.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            LooseNumber::Number(v) if v.is_finite() => Some(*v),
            LooseNumber::Number(_) => None,
            LooseNumber::Text(s) => parse_f64_safe(Some(s)),
            LooseNumber::Other(_) => None,
        }
    }
}

pub fn loose_f64(v: &Option<LooseNumber>) -> Option<f64> {
    v.as_ref().and_then(LooseNumber::to_f64)
}

#[derive(Debug, Deserialize)]
pub struct RawTopStall {
    pub stall_name: Option<String>,
    pub rating: Option<LooseNumber>,
}

/// One element of the `/geographicalData` payload.
#[derive(Debug, Deserialize)]
pub struct RawCentre {
    pub centre_id: Option<LooseId>,
    pub name: Option<String>,
    pub latitude: Option<LooseNumber>,
    pub longitude: Option<LooseNumber>,
    pub avg_rating: Option<LooseNumber>,
    pub stalls: Option<LooseNumber>,
    pub top3_stalls: Option<Vec<RawTopStall>>,
}

#[derive(Debug, Deserialize)]
pub struct RawStall {
    pub stall_id: Option<LooseId>,
    pub centre_id: Option<LooseId>,
    pub name: Option<String>,
    pub rating: Option<LooseNumber>,
    pub business_status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawReviewStats {
    pub stall_id: Option<LooseId>,
    pub stall_name: Option<String>,
    pub no_of_reviews: Option<LooseNumber>,
    pub no_of_authors: Option<LooseNumber>,
    pub avg_user_rating: Option<LooseNumber>,
    pub rating_sd: Option<LooseNumber>,
    pub avg_no_of_visits: Option<LooseNumber>,
    pub top_10_words: Option<Vec<(String, LooseNumber)>>,
}

/// Long-form cleaning interval as served by `/cleaningSchedule`.
#[derive(Debug, Deserialize)]
pub struct RawCleaningRow {
    pub centre_id: Option<LooseId>,
    pub centre_name: Option<String>,
    pub cleaning_quarter: Option<String>,
    pub cleaning_startdate: Option<String>,
    pub cleaning_enddate: Option<String>,
    pub remarks: Option<String>,
}

/// Wide open-data sheet: one row per centre, one column pair per quarter.
#[derive(Debug, Deserialize)]
pub struct RawScheduleSheetRow {
    pub serial_no: Option<String>,
    pub name: Option<String>,
    pub q1_cleaningstartdate: Option<String>,
    pub q1_cleaningenddate: Option<String>,
    pub remarks_q1: Option<String>,
    pub q2_cleaningstartdate: Option<String>,
    pub q2_cleaningenddate: Option<String>,
    pub remarks_q2: Option<String>,
    pub q3_cleaningstartdate: Option<String>,
    pub q3_cleaningenddate: Option<String>,
    pub remarks_q3: Option<String>,
    pub q4_cleaningstartdate: Option<String>,
    pub q4_cleaningenddate: Option<String>,
    pub remarks_q4: Option<String>,
}

/// Identifiers are strings in some collections and integers in others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Text(String),
    Int(i64),
}

impl LooseId {
    pub fn into_key(self) -> String {
        match self {
            LooseId::Text(s) => s.trim().to_string(),
            LooseId::Int(i) => i.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopStall {
    pub stall_name: String,
    pub rating: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Centre {
    pub centre_id: String,
    pub name: String,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub avg_rating: Option<f64>,
    pub stall_count: Option<u32>,
    pub top_stalls: Option<Vec<TopStall>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stall {
    pub stall_id: String,
    pub centre_id: String,
    pub name: String,
    pub rating: Option<f64>,
    pub business_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewStats {
    pub stall_id: String,
    pub stall_name: String,
    pub no_of_reviews: Option<u32>,
    pub no_of_authors: Option<u32>,
    pub avg_user_rating: Option<f64>,
    pub rating_sd: Option<f64>,
    pub avg_no_of_visits: Option<f64>,
    pub top_words: Vec<(String, u32)>,
}

/// The four cleaning periods of the year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, clap::ValueEnum)]
pub enum Quarter {
    #[value(name = "Q1")]
    Q1,
    #[value(name = "Q2")]
    Q2,
    #[value(name = "Q3")]
    Q3,
    #[value(name = "Q4")]
    Q4,
}

impl Quarter {
    pub fn as_str(self) -> &'static str {
        match self {
            Quarter::Q1 => "Q1",
            Quarter::Q2 => "Q2",
            Quarter::Q3 => "Q3",
            Quarter::Q4 => "Q4",
        }
    }
}

impl fmt::Display for Quarter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quarter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "Q1" => Ok(Quarter::Q1),
            "Q2" => Ok(Quarter::Q2),
            "Q3" => Ok(Quarter::Q3),
            "Q4" => Ok(Quarter::Q4),
            other => Err(format!("unknown cleaning quarter: {other}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CleaningInterval {
    pub centre_id: String,
    pub centre_name: Option<String>,
    pub quarter: Quarter,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub remarks: Option<String>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RegionSummaryRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "BestCentre")]
    #[tabled(rename = "BestCentre")]
    pub best_centre: String,
    #[serde(rename = "BestAvgRating")]
    #[tabled(rename = "BestAvgRating")]
    pub best_avg_rating: String,
    #[serde(rename = "WorstCentre")]
    #[tabled(rename = "WorstCentre")]
    pub worst_centre: String,
    #[serde(rename = "WorstAvgRating")]
    #[tabled(rename = "WorstAvgRating")]
    pub worst_avg_rating: String,
    #[serde(rename = "AvgRegionRating")]
    #[tabled(rename = "AvgRegionRating")]
    pub avg_region_rating: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StallRankingRow {
    #[serde(rename = "Rank")]
    #[tabled(rename = "Rank")]
    pub rank: usize,
    #[serde(rename = "Stall")]
    #[tabled(rename = "Stall")]
    pub stall_name: String,
    #[serde(rename = "HawkerCentre")]
    #[tabled(rename = "HawkerCentre")]
    pub centre_name: String,
    #[serde(rename = "Rating")]
    #[tabled(rename = "Rating")]
    pub rating: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct TimelineRow {
    #[serde(rename = "Region")]
    #[tabled(rename = "Region")]
    pub region: String,
    #[serde(rename = "HawkerCentre")]
    #[tabled(rename = "HawkerCentre")]
    pub centre_name: String,
    #[serde(rename = "Quarter")]
    #[tabled(rename = "Quarter")]
    pub quarter: String,
    #[serde(rename = "StartDate")]
    #[tabled(rename = "StartDate")]
    pub start: String,
    #[serde(rename = "EndDate")]
    #[tabled(rename = "EndDate")]
    pub end: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_centres: usize,
    pub classified_centres: usize,
    pub unclassifiable_centres: usize,
    pub total_stalls: usize,
    pub total_intervals: usize,
    pub avg_centre_rating: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loose_numbers_accept_text_and_numbers() {
        let raw: RawCentre = serde_json::from_str(
            r#"{"centre_id": 7, "name": "Maxwell", "latitude": "1.2803", "longitude": 103.8447,
                "avg_rating": null, "stalls": "12"}"#,
        )
        .unwrap();
        assert_eq!(loose_f64(&raw.latitude), Some(1.2803));
        assert_eq!(loose_f64(&raw.longitude), Some(103.8447));
        assert_eq!(loose_f64(&raw.avg_rating), None);
        assert_eq!(loose_f64(&raw.stalls), Some(12.0));
        assert_eq!(raw.centre_id.map(LooseId::into_key).as_deref(), Some("7"));
    }

    #[test]
    fn garbage_coordinates_become_absent() {
        let raw: RawCentre =
            serde_json::from_str(r#"{"name": "X", "latitude": "n/a", "longitude": {"x": 1}}"#).unwrap();
        assert_eq!(loose_f64(&raw.latitude), None);
        assert_eq!(loose_f64(&raw.longitude), None);
    }

    #[test]
    fn quarter_labels() {
        assert_eq!("q3".parse::<Quarter>(), Ok(Quarter::Q3));
        assert!("Q5".parse::<Quarter>().is_err());
        assert_eq!(Quarter::Q4.to_string(), "Q4");
    }
}
