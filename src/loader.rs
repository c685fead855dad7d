use crate::error::DashboardError;
use crate::types::{
    loose_f64, Centre, CleaningInterval, LooseId, Quarter, RawCentre, RawCleaningRow,
    RawReviewStats, RawScheduleSheetRow, RawStall, ReviewStats, Stall, TopStall,
};
use crate::util::parse_date_safe;
use chrono::NaiveDate;
use csv::ReaderBuilder;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

pub const CENTRES_FILE: &str = "centres.json";
pub const STALLS_FILE: &str = "stalls.json";
pub const REVIEW_STATS_FILE: &str = "review_stats.json";
pub const SCHEDULE_JSON_FILE: &str = "cleaning_schedule.json";
pub const SCHEDULE_CSV_FILE: &str = "cleaning_schedule.csv";

/// Everything fetched for one dashboard refresh.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    pub centres: Vec<Centre>,
    pub stalls: Vec<Stall>,
    pub review_stats: Vec<ReviewStats>,
    pub intervals: Vec<CleaningInterval>,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub centres: usize,
    pub stalls: usize,
    pub review_stats: usize,
    pub intervals: usize,
    pub parse_errors: usize,
}

/// Read a snapshot directory. Only the centre file is required; the other
/// collections default to empty when their file is missing. Rows that
/// cannot be used are skipped and counted in `LoadReport::parse_errors`.
pub fn load_snapshot(dir: &Path) -> Result<(Snapshot, LoadReport), DashboardError> {
    let mut report = LoadReport::default();

    let centres_path = dir.join(CENTRES_FILE);
    if !centres_path.exists() {
        return Err(DashboardError::MissingFile { path: centres_path });
    }
    let centres = load_centres(&centres_path, &mut report)?;

    let stalls = match existing(dir, STALLS_FILE) {
        Some(path) => load_stalls(&path, &mut report)?,
        None => Vec::new(),
    };

    let review_stats = match existing(dir, REVIEW_STATS_FILE) {
        Some(path) => load_review_stats(&path, &mut report)?,
        None => Vec::new(),
    };

    let intervals = if let Some(path) = existing(dir, SCHEDULE_JSON_FILE) {
        load_schedule_json(&path, &mut report)?
    } else if let Some(path) = existing(dir, SCHEDULE_CSV_FILE) {
        load_schedule_sheet(&path, &mut report)?
    } else {
        Vec::new()
    };

    report.centres = centres.len();
    report.stalls = stalls.len();
    report.review_stats = review_stats.len();
    report.intervals = intervals.len();
    log::info!(
        "Loaded snapshot from {}: {} centres, {} stalls, {} review stats, {} intervals ({} rows skipped)",
        dir.display(),
        report.centres,
        report.stalls,
        report.review_stats,
        report.intervals,
        report.parse_errors
    );

    Ok((
        Snapshot {
            centres,
            stalls,
            review_stats,
            intervals,
        },
        report,
    ))
}

fn existing(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    path.exists().then_some(path)
}

/// Read a JSON array element by element so one malformed record doesn't
/// fail the whole file.
fn read_json_array<T: DeserializeOwned>(
    path: &Path,
    report: &mut LoadReport,
) -> Result<Vec<T>, DashboardError> {
    let file = File::open(path)?;
    let values: Vec<serde_json::Value> = serde_json::from_reader(BufReader::new(file))?;
    let mut out = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<T>(value) {
            Ok(v) => out.push(v),
            Err(e) => {
                log::warn!("Skipping malformed record in {}: {}", path.display(), e);
                report.parse_errors += 1;
            }
        }
    }
    Ok(out)
}

fn key_or_none(id: Option<LooseId>) -> Option<String> {
    id.map(LooseId::into_key).filter(|k| !k.is_empty())
}

fn load_centres(path: &Path, report: &mut LoadReport) -> Result<Vec<Centre>, DashboardError> {
    let rows: Vec<RawCentre> = read_json_array(path, report)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(centre_id) = key_or_none(row.centre_id) else {
            report.parse_errors += 1;
            continue;
        };
        let top_stalls = row.top3_stalls.map(|stalls| {
            stalls
                .into_iter()
                .filter_map(|s| {
                    Some(TopStall {
                        stall_name: s.stall_name?.trim().to_string(),
                        rating: loose_f64(&s.rating)?,
                    })
                })
                .collect()
        });
        out.push(Centre {
            name: row
                .name
                .map(|n| n.trim().to_string())
                .unwrap_or_else(|| centre_id.clone()),
            centre_id,
            lat: loose_f64(&row.latitude),
            lon: loose_f64(&row.longitude),
            avg_rating: loose_f64(&row.avg_rating),
            stall_count: loose_f64(&row.stalls)
                .filter(|v| *v >= 0.0)
                .map(|v| v.round() as u32),
            top_stalls,
        });
    }
    Ok(out)
}

fn load_stalls(path: &Path, report: &mut LoadReport) -> Result<Vec<Stall>, DashboardError> {
    let rows: Vec<RawStall> = read_json_array(path, report)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let (Some(stall_id), Some(centre_id)) = (key_or_none(row.stall_id), key_or_none(row.centre_id))
        else {
            report.parse_errors += 1;
            continue;
        };
        out.push(Stall {
            name: row.name.unwrap_or_else(|| stall_id.clone()).trim().to_string(),
            stall_id,
            centre_id,
            rating: loose_f64(&row.rating),
            business_status: row.business_status,
        });
    }
    Ok(out)
}

fn count(v: Option<f64>) -> Option<u32> {
    v.filter(|v| *v >= 0.0).map(|v| v.round() as u32)
}

fn load_review_stats(
    path: &Path,
    report: &mut LoadReport,
) -> Result<Vec<ReviewStats>, DashboardError> {
    let rows: Vec<RawReviewStats> = read_json_array(path, report)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(stall_id) = key_or_none(row.stall_id) else {
            report.parse_errors += 1;
            continue;
        };
        let top_words = row
            .top_10_words
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(word, n)| Some((word, count(n.to_f64())?)))
            .collect();
        out.push(ReviewStats {
            stall_name: row.stall_name.unwrap_or_else(|| stall_id.clone()),
            stall_id,
            no_of_reviews: count(loose_f64(&row.no_of_reviews)),
            no_of_authors: count(loose_f64(&row.no_of_authors)),
            avg_user_rating: loose_f64(&row.avg_user_rating),
            rating_sd: loose_f64(&row.rating_sd),
            avg_no_of_visits: loose_f64(&row.avg_no_of_visits),
            top_words,
        });
    }
    Ok(out)
}

/// Validate one interval. Both dates must parse and the end must not come
/// before the start.
fn interval_from(
    centre_id: String,
    centre_name: Option<String>,
    quarter: Quarter,
    start: Option<&str>,
    end: Option<&str>,
    remarks: Option<String>,
) -> Option<CleaningInterval> {
    let start: NaiveDate = parse_date_safe(start)?;
    let end: NaiveDate = parse_date_safe(end)?;
    if end < start {
        return None;
    }
    Some(CleaningInterval {
        centre_id,
        centre_name: centre_name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
        quarter,
        start,
        end,
        remarks: remarks.filter(|r| !r.trim().is_empty()),
    })
}

fn load_schedule_json(
    path: &Path,
    report: &mut LoadReport,
) -> Result<Vec<CleaningInterval>, DashboardError> {
    let rows: Vec<RawCleaningRow> = read_json_array(path, report)?;
    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let centre_id = key_or_none(row.centre_id);
        let quarter = row
            .cleaning_quarter
            .as_deref()
            .and_then(|q| q.parse::<Quarter>().ok());
        let interval = match (centre_id, quarter) {
            (Some(centre_id), Some(quarter)) => interval_from(
                centre_id,
                row.centre_name,
                quarter,
                row.cleaning_startdate.as_deref(),
                row.cleaning_enddate.as_deref(),
                row.remarks,
            ),
            _ => None,
        };
        match interval {
            Some(i) => out.push(i),
            None => report.parse_errors += 1,
        }
    }
    Ok(out)
}

/// Expand the wide open-data sheet into one interval per quarter. Quarters
/// without both dates are not scheduled and are not counted as errors.
fn load_schedule_sheet(
    path: &Path,
    report: &mut LoadReport,
) -> Result<Vec<CleaningInterval>, DashboardError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;
    let mut out = Vec::new();

    for result in rdr.deserialize::<RawScheduleSheetRow>() {
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.parse_errors += 1;
                continue;
            }
        };
        let Some(centre_id) = row.serial_no.as_deref().map(str::trim).filter(|s| !s.is_empty())
        else {
            report.parse_errors += 1;
            continue;
        };

        let quarters = [
            (Quarter::Q1, &row.q1_cleaningstartdate, &row.q1_cleaningenddate, &row.remarks_q1),
            (Quarter::Q2, &row.q2_cleaningstartdate, &row.q2_cleaningenddate, &row.remarks_q2),
            (Quarter::Q3, &row.q3_cleaningstartdate, &row.q3_cleaningenddate, &row.remarks_q3),
            (Quarter::Q4, &row.q4_cleaningstartdate, &row.q4_cleaningenddate, &row.remarks_q4),
        ];
        for (quarter, start, end, remarks) in quarters {
            if let Some(i) = interval_from(
                centre_id.to_string(),
                row.name.clone(),
                quarter,
                start.as_deref(),
                end.as_deref(),
                remarks.clone(),
            ) {
                out.push(i);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "hawker_dashboard_loader_{}_{}",
            name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_centres_file_is_an_error() {
        let dir = scratch_dir("missing");
        let err = load_snapshot(&dir).unwrap_err();
        assert!(matches!(err, DashboardError::MissingFile { .. }));
    }

    #[test]
    fn malformed_values_degrade_to_absent() {
        let dir = scratch_dir("centres");
        fs::write(
            dir.join(CENTRES_FILE),
            r#"[
                {"centre_id": "1", "name": "Amoy Street", "latitude": "1.2793", "longitude": "103.8467",
                 "avg_rating": 4.1, "stalls": 30,
                 "top3_stalls": [{"stall_name": "A", "rating": 4.8}, {"stall_name": "B", "rating": "bad"}]},
                {"centre_id": "2", "name": "Broken", "latitude": "", "longitude": null},
                {"name": "No id"},
                "not an object"
            ]"#,
        )
        .unwrap();
        let (snapshot, report) = load_snapshot(&dir).unwrap();
        assert_eq!(snapshot.centres.len(), 2);
        assert_eq!(report.parse_errors, 2);
        let amoy = &snapshot.centres[0];
        assert_eq!(amoy.lat, Some(1.2793));
        assert_eq!(amoy.stall_count, Some(30));
        assert_eq!(amoy.top_stalls.as_ref().map(Vec::len), Some(1));
        assert_eq!(snapshot.centres[1].lat, None);
        assert!(snapshot.stalls.is_empty());
        assert!(snapshot.intervals.is_empty());
    }

    #[test]
    fn schedule_sheet_expands_quarters() {
        let dir = scratch_dir("sheet");
        fs::write(dir.join(CENTRES_FILE), "[]").unwrap();
        fs::write(
            dir.join(SCHEDULE_CSV_FILE),
            "serial_no,name,q1_cleaningstartdate,q1_cleaningenddate,remarks_q1,\
q2_cleaningstartdate,q2_cleaningenddate,remarks_q2,q3_cleaningstartdate,q3_cleaningenddate,remarks_q3,\
q4_cleaningstartdate,q4_cleaningenddate,remarks_q4\n\
1,Adam Road Food Centre,08/01/2024,11/01/2024,,02/04/2024,05/04/2024,,TBC,TBC,nil,01/10/2024,04/10/2024,\n",
        )
        .unwrap();
        let (snapshot, report) = load_snapshot(&dir).unwrap();
        let quarters: Vec<Quarter> = snapshot.intervals.iter().map(|i| i.quarter).collect();
        assert_eq!(quarters, vec![Quarter::Q1, Quarter::Q2, Quarter::Q4]);
        assert_eq!(report.parse_errors, 0);
        assert_eq!(
            snapshot.intervals[0].centre_name.as_deref(),
            Some("Adam Road Food Centre")
        );
    }

    #[test]
    fn schedule_json_rejects_inverted_intervals() {
        let dir = scratch_dir("schedule");
        fs::write(dir.join(CENTRES_FILE), "[]").unwrap();
        fs::write(
            dir.join(SCHEDULE_JSON_FILE),
            r#"[
                {"centre_id": 1, "cleaning_quarter": "Q1", "cleaning_startdate": "2024-01-08", "cleaning_enddate": "2024-01-11"},
                {"centre_id": 2, "cleaning_quarter": "Q2", "cleaning_startdate": "2024-04-10", "cleaning_enddate": "2024-04-01"},
                {"centre_id": 3, "cleaning_quarter": "Q9", "cleaning_startdate": "2024-04-10", "cleaning_enddate": "2024-04-11"}
            ]"#,
        )
        .unwrap();
        let (snapshot, report) = load_snapshot(&dir).unwrap();
        assert_eq!(snapshot.intervals.len(), 1);
        assert_eq!(snapshot.intervals[0].centre_id, "1");
        assert_eq!(report.parse_errors, 2);
    }
}
