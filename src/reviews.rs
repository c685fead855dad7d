//! Keyword ranking for a stall's review statistics.

use serde::Serialize;
use std::cmp::Reverse;

use crate::types::ReviewStats;

pub const MIN_FONT_SIZE: f64 = 10.0;
pub const MAX_FONT_SIZE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightedWord {
    pub text: String,
    pub count: u32,
    pub font_size: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StallKeywords {
    pub stall_id: String,
    pub stall_name: String,
    pub words: Vec<WeightedWord>,
}

/// The `n` most frequent words, most frequent first. Equal counts keep
/// their input order.
pub fn rank_keywords(words: &[(String, u32)], n: usize) -> Vec<(String, u32)> {
    let mut ranked = words.to_vec();
    ranked.sort_by_key(|(_, count)| Reverse(*count));
    ranked.truncate(n);
    ranked
}

/// Font sizes on a log scale from the smallest to the largest count,
/// mapped onto `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
pub fn keyword_weights(words: &[(String, u32)]) -> Vec<WeightedWord> {
    // log scales need a positive domain
    let ln = |c: u32| f64::from(c.max(1)).ln();
    let lo = words.iter().map(|(_, c)| ln(*c)).fold(f64::INFINITY, f64::min);
    let hi = words.iter().map(|(_, c)| ln(*c)).fold(f64::NEG_INFINITY, f64::max);
    let span = hi - lo;

    words
        .iter()
        .map(|(text, count)| {
            let font_size = if span.abs() < f64::EPSILON {
                MAX_FONT_SIZE
            } else {
                MIN_FONT_SIZE + (ln(*count) - lo) / span * (MAX_FONT_SIZE - MIN_FONT_SIZE)
            };
            WeightedWord {
                text: text.clone(),
                count: *count,
                font_size,
            }
        })
        .collect()
}

pub fn stall_keywords(stats: &ReviewStats, n: usize) -> StallKeywords {
    StallKeywords {
        stall_id: stats.stall_id.clone(),
        stall_name: stats.stall_name.clone(),
        words: keyword_weights(&rank_keywords(&stats.top_words, n)),
    }
}
