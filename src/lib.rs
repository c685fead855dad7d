//! Data layer for the hawker centre dashboard.
//!
//! Raw API snapshots are loaded by [`loader`], centres are bucketed into
//! regions by [`region`], and the remaining modules derive display-ready
//! structures from them: per-region rating summaries ([`reports`]),
//! cross-centre stall rankings ([`ranking`]), cleaning timelines
//! ([`schedule`]), heatmap weights ([`heatmap`]) and review keywords
//! ([`reviews`]). Every derivation is a pure function of its input snapshot.

pub mod config;
pub mod error;
pub mod heatmap;
pub mod loader;
pub mod output;
pub mod ranking;
pub mod region;
pub mod reports;
pub mod reviews;
pub mod schedule;
pub mod types;
pub mod util;

pub use error::DashboardError;
pub use ranking::{merge_top_n, RankedStall};
pub use region::{classify, ClassifiedCentre, InvalidCoordinate, Region, RegionKey};
pub use reports::{aggregate, RegionStats};
pub use schedule::{group_schedule, TimelineEntry};
