use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "hawker_dashboard_batch_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_batch(data_dir: &PathBuf, out_dir: &PathBuf) -> Output {
    Command::new(env!("CARGO_BIN_EXE_hawker_dashboard"))
        .arg("--batch")
        .arg("--data-dir")
        .arg(data_dir)
        .arg("--out-dir")
        .arg(out_dir)
        .output()
        .unwrap()
}

fn write_centres(dir: &PathBuf) {
    fs::write(
        dir.join("centres.json"),
        r#"[{"centre_id": "1", "name": "Maxwell", "latitude": 1.2803, "longitude": 103.8447, "avg_rating": 4.1}]"#,
    )
    .unwrap();
}

#[test]
fn missing_data_dir_fails_the_run() {
    let dir = scratch_dir("missing");
    let out = run_batch(&dir.join("nonexistent"), &dir.join("out"));
    assert!(!out.status.success());
    assert!(!dir.join("out").join("summary.json").exists());
}

#[test]
fn unwritable_out_dir_fails_the_run() {
    let dir = scratch_dir("unwritable");
    write_centres(&dir);
    // a plain file where the output directory should go
    let blocked = dir.join("blocked");
    fs::write(&blocked, "").unwrap();
    let out = run_batch(&dir, &blocked);
    assert!(!out.status.success());
}

#[test]
fn good_snapshot_writes_every_report() {
    let dir = scratch_dir("ok");
    write_centres(&dir);
    let out_dir = dir.join("out");
    let out = run_batch(&dir, &out_dir);
    assert!(out.status.success());
    for name in [
        "report1_region_summary.csv",
        "report2_region_detail.json",
        "report3_cleaning_timeline.json",
        "report4_heatmap.json",
        "report5_keywords.json",
        "summary.json",
    ] {
        assert!(out_dir.join(name).exists(), "{name} not written");
    }
}
