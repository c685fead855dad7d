//! Command-line configuration.

use clap::Parser;
use std::path::PathBuf;

use crate::heatmap::HeatmapMode;
use crate::region::Region;
use crate::types::Quarter;

/// Region, rating and cleaning-schedule reports for hawker centres.
#[derive(Debug, Clone, Parser)]
#[command(name = "hawker_dashboard")]
#[command(about = "Region, rating and cleaning-schedule reports for hawker centres")]
pub struct Cli {
    /// Directory holding the fetched JSON/CSV snapshot.
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Directory the reports are written to.
    #[arg(long, default_value = "reports")]
    pub out_dir: PathBuf,

    /// Region shown in the drill-down report.
    #[arg(long, value_enum, default_value_t = Region::North)]
    pub region: Region,

    /// Cleaning period shown in the timeline report.
    #[arg(long, value_enum, default_value_t = Quarter::Q1)]
    pub quarter: Quarter,

    /// Number of stalls in the cross-centre ranking.
    #[arg(long, default_value_t = 3)]
    pub top_n: usize,

    /// Weighting for the heatmap report.
    #[arg(long, value_enum, default_value_t = HeatmapMode::Rating)]
    pub heatmap_mode: HeatmapMode,

    /// Table rows printed per preview.
    #[arg(long, default_value_t = 3)]
    pub preview_rows: usize,

    /// Leave the cross-centre stall ranking out of the drill-down.
    #[arg(long)]
    pub no_overall_top: bool,

    /// Load and generate once without the interactive menu.
    #[arg(long)]
    pub batch: bool,

    /// Classify a single coordinate pair and exit.
    #[arg(long, num_args = 2, value_names = ["LAT", "LON"], allow_negative_numbers = true)]
    pub locate: Option<Vec<String>>,
}
