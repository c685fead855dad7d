//! Cleaning-schedule timelines grouped by region.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::region::{ClassifiedCentre, Region, RegionKey};
use crate::types::{CleaningInterval, Quarter, TimelineRow};
use crate::util::date_millis;

/// One bar of a range chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineEntry {
    pub centre_id: String,
    pub centre_name: String,
    pub region: RegionKey,
    pub quarter: Quarter,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub start_ms: i64,
    pub end_ms: i64,
}

/// Keep the intervals for `quarter`, attach each to its centre's region and
/// group by region. Intervals whose centre is missing from `centres` go to
/// `RegionKey::Unknown`; they are never dropped. Within a region, entries
/// keep input order.
pub fn group_schedule(
    intervals: &[CleaningInterval],
    centres: &[ClassifiedCentre],
    quarter: Quarter,
) -> BTreeMap<RegionKey, Vec<TimelineEntry>> {
    let lookup: HashMap<&str, &ClassifiedCentre> = centres
        .iter()
        .rev() // first occurrence of a duplicated id wins
        .map(|c| (c.centre.centre_id.as_str(), c))
        .collect();

    let mut grouped: BTreeMap<RegionKey, Vec<TimelineEntry>> = BTreeMap::new();
    for interval in intervals.iter().filter(|i| i.quarter == quarter) {
        let centre = lookup.get(interval.centre_id.as_str());
        let region = centre.map_or(RegionKey::Unknown, |c| RegionKey::Known(c.region));
        let centre_name = interval
            .centre_name
            .clone()
            .or_else(|| centre.map(|c| c.centre.name.clone()))
            .unwrap_or_else(|| interval.centre_id.clone());

        grouped.entry(region).or_default().push(TimelineEntry {
            centre_id: interval.centre_id.clone(),
            centre_name,
            region,
            quarter: interval.quarter,
            start: interval.start,
            end: interval.end,
            start_ms: date_millis(interval.start),
            end_ms: date_millis(interval.end),
        });
    }
    log::debug!(
        "Grouped {} {} intervals into {} regions",
        grouped.values().map(Vec::len).sum::<usize>(),
        quarter,
        grouped.len()
    );
    grouped
}

/// Whether a region has any cleaning in the grouped timeline. An absent key
/// means no intervals, which callers render as an empty lane.
pub fn has_cleaning(grouped: &BTreeMap<RegionKey, Vec<TimelineEntry>>, region: Region) -> bool {
    grouped
        .get(&RegionKey::Known(region))
        .is_some_and(|v| !v.is_empty())
}

pub fn timeline_rows(grouped: &BTreeMap<RegionKey, Vec<TimelineEntry>>) -> Vec<TimelineRow> {
    grouped
        .values()
        .flatten()
        .map(|e| TimelineRow {
            region: e.region.to_string(),
            centre_name: e.centre_name.clone(),
            quarter: e.quarter.to_string(),
            start: e.start.format("%d/%m/%Y").to_string(),
            end: e.end.format("%d/%m/%Y").to_string(),
        })
        .collect()
}
