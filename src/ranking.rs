//! Stall rankings: merging per-centre top lists into one cross-centre
//! ranking, and filling in centre ratings from stall records.

use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::{Centre, Stall, StallRankingRow, TopStall};
use crate::util::{average, format_number, round2};

/// Number of stalls kept per centre.
pub const CENTRE_TOP_N: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedStall {
    pub stall_name: String,
    pub rating: f64,
    pub centre_name: String,
}

/// Highest rating first. NaN ranks below every real rating so the order
/// stays total.
fn by_rating_desc(a: f64, b: f64) -> Ordering {
    let key = |r: f64| if r.is_nan() { f64::NEG_INFINITY } else { r };
    key(b).total_cmp(&key(a))
}

/// A centre's own top list, annotated with the centre name. `None` when the
/// centre carries no list.
pub fn centre_top_stalls(centre: &Centre) -> Option<Vec<RankedStall>> {
    centre.top_stalls.as_ref().map(|stalls| {
        stalls
            .iter()
            .map(|s| RankedStall {
                stall_name: s.stall_name.clone(),
                rating: s.rating,
                centre_name: centre.name.clone(),
            })
            .collect()
    })
}

/// Flatten per-group lists into one list sorted by rating, highest first,
/// capped at `n`. Absent groups count as empty. The sort is stable, so
/// equal ratings keep their input order.
pub fn merge_top_n(groups: &[Option<Vec<RankedStall>>], n: usize) -> Vec<RankedStall> {
    let mut all: Vec<RankedStall> = groups.iter().flatten().flatten().cloned().collect();
    all.sort_by(|a, b| by_rating_desc(a.rating, b.rating));
    all.truncate(n);
    all
}

pub fn ranking_rows(stalls: &[RankedStall]) -> Vec<StallRankingRow> {
    stalls
        .iter()
        .enumerate()
        .map(|(idx, s)| StallRankingRow {
            rank: idx + 1,
            stall_name: s.stall_name.clone(),
            centre_name: s.centre_name.clone(),
            rating: format_number(s.rating, 1),
        })
        .collect()
}

/// Fill gaps in centre records from the stall collection.
///
/// Only missing fields are derived: average rating (mean of rated stalls,
/// two decimals, zero when none are rated), stall count (rated stalls), and
/// the top list (best `CENTRE_TOP_N` rated stalls). Values already present
/// on the centre are left alone.
pub fn enrich_centres(centres: &[Centre], stalls: &[Stall]) -> Vec<Centre> {
    if stalls.is_empty() {
        return centres.to_vec();
    }

    let mut by_centre: HashMap<&str, Vec<&Stall>> = HashMap::new();
    for s in stalls {
        if s.rating.is_some() {
            by_centre.entry(s.centre_id.as_str()).or_default().push(s);
        }
    }

    centres
        .iter()
        .map(|c| {
            let rated = by_centre.get(c.centre_id.as_str()).map(Vec::as_slice).unwrap_or(&[]);
            let mut out = c.clone();
            if out.avg_rating.is_none() {
                let ratings: Vec<f64> = rated.iter().filter_map(|s| s.rating).collect();
                out.avg_rating = Some(round2(average(&ratings)));
            }
            if out.stall_count.is_none() {
                out.stall_count = Some(rated.len() as u32);
            }
            if out.top_stalls.is_none() && !rated.is_empty() {
                let mut top: Vec<TopStall> = rated
                    .iter()
                    .filter_map(|s| {
                        s.rating.map(|rating| TopStall {
                            stall_name: s.name.clone(),
                            rating,
                        })
                    })
                    .collect();
                top.sort_by(|a, b| by_rating_desc(a.rating, b.rating));
                top.truncate(CENTRE_TOP_N);
                out.top_stalls = Some(top);
            }
            out
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, rating: f64, centre: &str) -> RankedStall {
        RankedStall {
            stall_name: name.to_string(),
            rating,
            centre_name: centre.to_string(),
        }
    }

    fn stall(id: &str, centre_id: &str, rating: Option<f64>) -> Stall {
        Stall {
            stall_id: id.to_string(),
            centre_id: centre_id.to_string(),
            name: format!("Stall {id}"),
            rating,
            business_status: None,
        }
    }

    #[test]
    fn merges_across_groups() {
        let groups = vec![
            Some(vec![entry("A", 4.5, "X")]),
            Some(vec![entry("B", 4.8, "Y"), entry("C", 4.0, "Y")]),
        ];
        let top = merge_top_n(&groups, 2);
        assert_eq!(top, vec![entry("B", 4.8, "Y"), entry("A", 4.5, "X")]);
    }

    #[test]
    fn absent_groups_are_empty() {
        let groups = vec![None, Some(vec![entry("A", 3.0, "X")]), None];
        assert_eq!(merge_top_n(&groups, 3), vec![entry("A", 3.0, "X")]);
        assert!(merge_top_n(&[None, None], 3).is_empty());
    }

    #[test]
    fn ties_keep_input_order() {
        let groups = vec![
            Some(vec![entry("first", 4.2, "X")]),
            Some(vec![entry("second", 4.2, "Y"), entry("third", 4.2, "Y")]),
        ];
        let names: Vec<String> = merge_top_n(&groups, 3)
            .into_iter()
            .map(|s| s.stall_name)
            .collect();
        assert_eq!(names, vec!["first", "second", "third"]);
    }

    #[test]
    fn output_is_sorted_and_capped() {
        let groups: Vec<Option<Vec<RankedStall>>> = vec![Some(
            (0..10).map(|i| entry(&i.to_string(), i as f64 / 2.0, "X")).collect(),
        )];
        let top = merge_top_n(&groups, 4);
        assert_eq!(top.len(), 4);
        assert!(top.windows(2).all(|w| w[0].rating >= w[1].rating));
        assert_eq!(top[0].rating, 4.5);
    }

    #[test]
    fn enrichment_fills_only_missing_fields() {
        let mut with_rating = crate::region::centre("1", 1.3, 103.8, Some(4.9));
        with_rating.stall_count = Some(40);
        let bare = crate::region::centre("2", 1.3, 103.8, None);
        let lonely = crate::region::centre("3", 1.3, 103.8, None);
        let stalls = vec![
            stall("a", "2", Some(4.0)),
            stall("b", "2", Some(3.5)),
            stall("c", "2", None),
            stall("d", "2", Some(4.5)),
            stall("e", "2", Some(2.0)),
            stall("f", "1", Some(1.0)),
        ];
        let out = enrich_centres(&[with_rating, bare, lonely], &stalls);

        assert_eq!(out[0].avg_rating, Some(4.9));
        assert_eq!(out[0].stall_count, Some(40));

        assert_eq!(out[1].avg_rating, Some(3.5));
        assert_eq!(out[1].stall_count, Some(4));
        let top = out[1].top_stalls.as_ref().unwrap();
        let names: Vec<&str> = top.iter().map(|s| s.stall_name.as_str()).collect();
        assert_eq!(names, vec!["Stall d", "Stall a", "Stall b"]);

        assert_eq!(out[2].avg_rating, Some(0.0));
        assert_eq!(out[2].stall_count, Some(0));
        assert_eq!(out[2].top_stalls, None);
    }

    #[test]
    fn nan_ratings_sort_last_without_panicking() {
        let groups: Vec<Option<Vec<RankedStall>>> = vec![Some(
            (0..64)
                .map(|i| {
                    let rating = if i % 7 == 0 { f64::NAN } else { (i % 5) as f64 };
                    entry(&i.to_string(), rating, "X")
                })
                .collect(),
        )];
        let top = merge_top_n(&groups, 5);
        assert_eq!(top.len(), 5);
        assert!(top.iter().all(|s| s.rating == 4.0));

        let all = merge_top_n(&groups, 64);
        assert!(all[..all.len() - 10].iter().all(|s| !s.rating.is_nan()));
        assert!(all[all.len() - 10..].iter().all(|s| s.rating.is_nan()));
    }

    #[test]
    fn enrichment_ranks_nan_stalls_last() {
        let bare = crate::region::centre("1", 1.3, 103.8, Some(4.0));
        let stalls = vec![
            stall("a", "1", Some(f64::NAN)),
            stall("b", "1", Some(3.0)),
            stall("c", "1", Some(4.0)),
        ];
        let out = enrich_centres(&[bare], &stalls);
        let names: Vec<&str> = out[0]
            .top_stalls
            .as_ref()
            .unwrap()
            .iter()
            .map(|s| s.stall_name.as_str())
            .collect();
        assert_eq!(names, vec!["Stall c", "Stall b", "Stall a"]);
    }

    #[test]
    fn ranking_rows_are_numbered_from_one() {
        let rows = ranking_rows(&[entry("B", 4.8, "Y"), entry("A", 4.5, "X")]);
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].rank, 2);
        assert_eq!(rows[1].rating, "4.5");
    }
}
