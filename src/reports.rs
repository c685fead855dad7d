use serde::Serialize;
use std::collections::BTreeMap;

use crate::ranking::{centre_top_stalls, merge_top_n, RankedStall};
use crate::region::{Classification, ClassifiedCentre, Region};
use crate::types::{Centre, RegionSummaryRow, SummaryStats};
use crate::util::{average, format_number};

/// Placeholder shown for values of a region with no centres.
pub const EMPTY_CELL: &str = "-";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CentreRating {
    pub centre_id: String,
    pub name: String,
    pub avg_rating: f64,
}

impl CentreRating {
    fn of(c: &ClassifiedCentre) -> Self {
        CentreRating {
            centre_id: c.centre.centre_id.clone(),
            name: c.centre.name.clone(),
            avg_rating: c.rating_or_zero(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RatingSummary {
    pub best: CentreRating,
    pub worst: CentreRating,
    /// Mean over every centre in the region; unrated centres count as 0.
    pub mean_rating: f64,
    pub centre_count: usize,
}

/// Per-region result. `summary` is `None` when the region has no centres,
/// which is not the same thing as a region whose centres all rate 0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionStats {
    pub region: Region,
    pub summary: Option<RatingSummary>,
}

impl RegionStats {
    pub fn is_empty(&self) -> bool {
        self.summary.is_none()
    }
}

/// The region summary together with the best centre it picked.
fn summarise<'a>(group: &[&'a ClassifiedCentre]) -> Option<(RatingSummary, &'a ClassifiedCentre)> {
    let (first, rest) = group.split_first()?;
    let mut best = *first;
    let mut worst = *first;
    // strict comparisons: the earliest centre wins a tie
    for c in rest {
        if c.rating_or_zero() > best.rating_or_zero() {
            best = *c;
        }
        if c.rating_or_zero() < worst.rating_or_zero() {
            worst = *c;
        }
    }
    let ratings: Vec<f64> = group.iter().map(|c| c.rating_or_zero()).collect();
    let summary = RatingSummary {
        best: CentreRating::of(best),
        worst: CentreRating::of(worst),
        mean_rating: average(&ratings),
        centre_count: group.len(),
    };
    Some((summary, best))
}

fn members(records: &[ClassifiedCentre], region: Region) -> Vec<&ClassifiedCentre> {
    records.iter().filter(|c| c.region == region).collect()
}

/// Best, worst and mean rating for each of the seven regions. Every region
/// is present in the result, empty ones with `summary: None`.
pub fn aggregate(records: &[ClassifiedCentre]) -> BTreeMap<Region, RegionStats> {
    Region::ALL
        .iter()
        .map(|&region| {
            let group = members(records, region);
            let stats = RegionStats {
                region,
                summary: summarise(&group).map(|(summary, _)| summary),
            };
            (region, stats)
        })
        .collect()
}

/// Drill-down for one region.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDetail {
    pub region: Region,
    pub stats: RegionStats,
    /// The best centre's own top stalls.
    pub best_centre_top_stalls: Option<Vec<RankedStall>>,
    /// Highest-rated stalls across every centre in the region. Left `None`
    /// when the region is empty or the overall ranking is switched off.
    pub overall_top: Option<Vec<RankedStall>>,
}

pub fn region_detail(
    records: &[ClassifiedCentre],
    region: Region,
    top_n: usize,
    include_overall_top: bool,
) -> RegionDetail {
    let group = members(records, region);
    let picked = summarise(&group);
    let best_centre_top_stalls = picked
        .as_ref()
        .and_then(|(_, best)| centre_top_stalls(&best.centre));
    let summary = picked.map(|(summary, _)| summary);

    let overall_top = if include_overall_top && summary.is_some() {
        let lists: Vec<Option<Vec<RankedStall>>> =
            group.iter().map(|c| centre_top_stalls(&c.centre)).collect();
        Some(merge_top_n(&lists, top_n))
    } else {
        None
    };

    RegionDetail {
        region,
        stats: RegionStats { region, summary },
        best_centre_top_stalls,
        overall_top,
    }
}

/// Table rows in fixed region order, with `-` in every value column of an
/// empty region.
pub fn region_summary_rows(stats: &BTreeMap<Region, RegionStats>) -> Vec<RegionSummaryRow> {
    stats
        .values()
        .map(|s| match &s.summary {
            Some(sum) => RegionSummaryRow {
                region: s.region.to_string(),
                best_centre: sum.best.name.clone(),
                best_avg_rating: format_number(sum.best.avg_rating, 2),
                worst_centre: sum.worst.name.clone(),
                worst_avg_rating: format_number(sum.worst.avg_rating, 2),
                avg_region_rating: format_number(sum.mean_rating, 2),
            },
            None => RegionSummaryRow {
                region: s.region.to_string(),
                best_centre: EMPTY_CELL.to_string(),
                best_avg_rating: EMPTY_CELL.to_string(),
                worst_centre: EMPTY_CELL.to_string(),
                worst_avg_rating: EMPTY_CELL.to_string(),
                avg_region_rating: EMPTY_CELL.to_string(),
            },
        })
        .collect()
}

pub fn generate_summary(
    centres: &[Centre],
    classification: &Classification,
    total_stalls: usize,
    total_intervals: usize,
) -> SummaryStats {
    let ratings: Vec<f64> = centres.iter().map(|c| c.avg_rating.unwrap_or(0.0)).collect();
    SummaryStats {
        total_centres: centres.len(),
        classified_centres: classification.classified.len(),
        unclassifiable_centres: classification.unclassifiable.len(),
        total_stalls,
        total_intervals,
        avg_centre_rating: average(&ratings),
    }
}
