// Entry point and high-level CLI flow.
//
// - Option [1] loads the snapshot directory, printing diagnostics.
// - Option [2] derives every report, writes them under the output
//   directory and prints a preview of each.
// - After generating reports, the user can choose to go back to the
//   selection menu or exit. `--batch` runs [1] then [2] once.
use clap::Parser;
use std::fs;
use std::io::{self, Write};

use hawker_dashboard::config::Cli;
use hawker_dashboard::loader::{self, Snapshot};
use hawker_dashboard::ranking::{enrich_centres, ranking_rows};
use hawker_dashboard::region::{classify_centres, classify_text};
use hawker_dashboard::reviews::stall_keywords;
use hawker_dashboard::{heatmap, output, reports, schedule, util, DashboardError, Region};

/// Read a single line of input after printing the common "Enter choice:" prompt.
///
/// Returns `None` once stdin is closed.
fn read_choice() -> Option<String> {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Ask the user whether to go back to the report selection menu.
///
/// Returns `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Report Selection (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        if io::stdin().read_line(&mut buf).unwrap_or(0) == 0 {
            return false;
        }
        match buf.trim().to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]. Centres missing ratings, stall counts or top stalls
/// are filled in from the stall collection before anything is derived.
fn handle_load(cli: &Cli) -> Option<Snapshot> {
    match loader::load_snapshot(&cli.data_dir) {
        Ok((mut snapshot, report)) => {
            snapshot.centres = enrich_centres(&snapshot.centres, &snapshot.stalls);
            println!(
                "Processing snapshot... ({} centres, {} stalls, {} cleaning intervals loaded)",
                util::format_int(report.centres),
                util::format_int(report.stalls),
                util::format_int(report.intervals)
            );
            if report.parse_errors > 0 {
                println!(
                    "Note: {} rows skipped due to parse/validation errors.",
                    util::format_int(report.parse_errors)
                );
            }
            println!();
            Some(snapshot)
        }
        Err(e) => {
            log::error!("Failed to load snapshot: {}", e);
            eprintln!("Failed to load snapshot: {}\n", e);
            None
        }
    }
}

/// Handle option [2]: derive and write every report.
fn handle_generate_reports(cli: &Cli, snapshot: &Snapshot) -> Result<(), DashboardError> {
    fs::create_dir_all(&cli.out_dir)?;
    let out = |name: &str| cli.out_dir.join(name);

    log::info!("Generating reports into {}", cli.out_dir.display());
    let classification = classify_centres(&snapshot.centres);
    if !classification.unclassifiable.is_empty() {
        println!(
            "Warning: {} centres have unusable coordinates and were left out:",
            classification.unclassifiable.len()
        );
        for u in &classification.unclassifiable {
            println!("  - {} ({}): {}", u.name, u.centre_id, u.error);
        }
        println!();
    }

    let stats = reports::aggregate(&classification.classified);
    let r1 = reports::region_summary_rows(&stats);
    let file1 = out("report1_region_summary.csv");
    output::write_csv(&file1, &r1)?;
    println!("Report 1: Hawker Centre Performance by Region\n");
    output::preview_table_rows(&r1, r1.len());
    println!("(Full table exported to {})\n", file1.display());

    let detail = reports::region_detail(
        &classification.classified,
        cli.region,
        cli.top_n,
        !cli.no_overall_top,
    );
    let file2 = out("report2_region_detail.json");
    output::write_json(&file2, &detail)?;
    println!("Report 2: Hawker Centre Performance for {}\n", cli.region);
    match &detail.stats.summary {
        Some(s) => {
            println!(
                "Best: {} ({}) | Worst: {} ({}) | Region average: {}",
                s.best.name,
                util::format_number(s.best.avg_rating, 2),
                s.worst.name,
                util::format_number(s.worst.avg_rating, 2),
                util::format_number(s.mean_rating, 2)
            );
            if let Some(top) = &detail.overall_top {
                println!("\nTop {} stalls in {}:", cli.top_n, cli.region);
                output::preview_table_rows(&ranking_rows(top), cli.top_n);
            } else {
                println!();
            }
        }
        None => println!("No hawker centres in {}.\n", cli.region),
    }
    println!("(Full detail exported to {})\n", file2.display());

    let timeline = schedule::group_schedule(&snapshot.intervals, &classification.classified, cli.quarter);
    let file3 = out("report3_cleaning_timeline.json");
    output::write_json(&file3, &timeline)?;
    println!("Report 3: Cleaning Schedule ({})\n", cli.quarter);
    output::preview_table_rows(&schedule::timeline_rows(&timeline), cli.preview_rows);
    let idle: Vec<&str> = Region::ALL
        .iter()
        .filter(|&&r| !schedule::has_cleaning(&timeline, r))
        .map(|r| r.as_str())
        .collect();
    if !idle.is_empty() {
        println!("No cleaning in {}: {}", cli.quarter, idle.join(", "));
    }
    println!("(Full timeline exported to {})\n", file3.display());

    let map = heatmap::heatmap_points(&snapshot.centres, cli.heatmap_mode);
    let file4 = out("report4_heatmap.json");
    output::write_json(&file4, &map)?;
    println!(
        "Report 4: Heatmap by {} ({} points, {} without coordinates, range {}..{})",
        cli.heatmap_mode,
        map.points.len(),
        map.skipped,
        util::format_number(map.min_value, 2),
        util::format_number(map.max_value, 2)
    );
    println!("(Points exported to {})\n", file4.display());

    let keywords: Vec<_> = snapshot
        .review_stats
        .iter()
        .map(|s| stall_keywords(s, 10))
        .collect();
    let file5 = out("report5_keywords.json");
    output::write_json(&file5, &keywords)?;
    println!(
        "Report 5: Review keywords for {} stalls (exported to {})\n",
        keywords.len(),
        file5.display()
    );

    let summary = reports::generate_summary(
        &snapshot.centres,
        &classification,
        snapshot.stalls.len(),
        snapshot.intervals.len(),
    );
    output::write_json(&out("summary.json"), &summary)?;
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total_centres\": {}, \"avg_centre_rating\": {}}}\n",
        summary.total_centres,
        util::format_number(summary.avg_centre_rating, 2)
    );
    Ok(())
}

/// Option [2] from the menu. Failures are reported and the menu carries on.
fn run_generate(cli: &Cli, snapshot: Option<&Snapshot>) {
    let Some(snapshot) = snapshot else {
        println!("Error: No data loaded. Please load the snapshot first (option 1).\n");
        return;
    };
    println!("Generating reports...\n");
    if let Err(e) = handle_generate_reports(cli, snapshot) {
        log::error!("Report generation failed: {}", e);
        eprintln!("Write error: {}", e);
    }
}

/// Load then generate once, failing the process on the first error.
fn run_batch(cli: &Cli) -> Result<(), DashboardError> {
    let (mut snapshot, _) = loader::load_snapshot(&cli.data_dir)?;
    snapshot.centres = enrich_centres(&snapshot.centres, &snapshot.stalls);
    handle_generate_reports(cli, &snapshot)
}

fn main() -> Result<(), DashboardError> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let cli = Cli::parse();

    if let Some(coords) = &cli.locate {
        let region = classify_text(&coords[0], &coords[1])?;
        println!("{}", region);
        return Ok(());
    }

    if cli.batch {
        return run_batch(&cli);
    }

    // Loaded once, reused across report runs.
    let mut snapshot: Option<Snapshot> = None;
    loop {
        println!("Hawker Centre Dashboard:");
        println!("[1] Load the snapshot");
        println!("[2] Generate Reports\n");
        let Some(choice) = read_choice() else {
            break;
        };
        match choice.as_str() {
            "1" => {
                if let Some(s) = handle_load(&cli) {
                    snapshot = Some(s);
                }
            }
            "2" => {
                println!();
                run_generate(&cli, snapshot.as_ref());
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1 or 2.\n");
            }
        }
    }
    Ok(())
}
