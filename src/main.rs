// Entry point and interactive CLI flow.
//
// - Option [1] loads the snapshot batch and runs the analysis, printing a
//   short summary of what was found.
// - Option [2] writes the monthly, client and city tables plus the JSON
//   report, and prints markdown previews.
// - After generating reports, the user can go back to the menu or exit.
use fleet_report::config::AppConfig;
use fleet_report::types::Report;
use fleet_report::util::format_int;
use fleet_report::{analyze, loader, output, reports};
use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard};
use tracing_subscriber::EnvFilter;

// The report is computed once per load and reused for every generate.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { report: None }));

struct AppState {
    report: Option<Report>,
}

fn state() -> MutexGuard<'static, AppState> {
    APP_STATE.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
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

/// Handle option [1]: load the batch and analyse it.
fn handle_load(config: &AppConfig) {
    let batch = match loader::load_batch(&config.input, &config.ranges) {
        Ok(batch) => batch,
        Err(e) => {
            eprintln!("Failed to load {}: {}\n", config.input.display(), e);
            return;
        }
    };
    match analyze(&batch) {
        Ok(report) => {
            let stats = &report.stats;
            println!(
                "Processing snapshots... ({} observations across {} months, latest date: {})",
                format_int(stats.total_vehicles),
                report.monthly_data.len(),
                report.comprehensive_summary.data_source_date
            );
            println!(
                "Clients: {}, Locations: {}, Health score: {}%\n",
                format_int(stats.total_clients),
                format_int(stats.total_locations),
                stats.health_score
            );
            state().report = Some(report);
        }
        Err(e) => eprintln!("Failed to analyse batch: {}\n", e),
    }
}

/// Handle option [2]: write every table and print previews.
fn handle_generate_reports(config: &AppConfig) {
    let report = state().report.clone();
    let Some(report) = report else {
        println!("Error: No data loaded. Please load the snapshot first (option 1).\n");
        return;
    };

    println!("Generating reports...");
    println!("Outputs saved to {}\n", config.output_dir.display());
    let out = |file: &str| config.output_dir.join(file);

    let monthly = reports::monthly_rows(&report.monthly_analysis);
    let file1 = out("monthly_analysis.csv");
    if let Err(e) = output::write_csv(&file1, &monthly) {
        eprintln!("Write error: {}", e);
    }
    println!("Report 1: Monthly Continuity and Alignment\n");
    output::preview_table_rows(
        &reports::month_count_rows(&report.comprehensive_summary),
        config.preview_rows,
    );
    println!("(Full table exported to {})\n", file1.display());

    for (title, table, file) in [
        ("Client Analysis", &report.client_table, "client_analysis.csv"),
        ("City Analysis", &report.city_table, "city_analysis.csv"),
    ] {
        let path = out(file);
        if let Err(e) = output::write_csv(&path, &table.data) {
            eprintln!("Write error: {}", e);
        }
        println!("Report: {}", title);
        println!("(Data as of {})\n", table.display_date);
        if config.issues_only {
            output::preview_table_rows(&table.issues_only(), config.preview_rows);
        } else {
            output::preview_table_rows(&table.data, config.preview_rows);
        }
        println!("(Full table exported to {})\n", path.display());
    }

    if let Err(e) = output::write_json(&out("report.json"), &report) {
        eprintln!("Write error: {}", e);
    }
    if let Err(e) = output::write_json(&out("summary.json"), &report.comprehensive_summary) {
        eprintln!("Write error: {}", e);
    }
    let stats = &report.stats;
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"total\": {}, \"active\": {}, \"offline\": {}, \"aligned\": {}, \"misaligned\": {}, \"health_score\": {}}}\n",
        format_int(stats.total_vehicles),
        format_int(stats.active_vehicles),
        format_int(stats.offline_vehicles),
        format_int(stats.aligned_vehicles),
        format_int(stats.misaligned_vehicles),
        stats.health_score
    );
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let config = AppConfig::from_env();
    loop {
        println!("Fleet Telemetry Report");
        println!("[1] Load the snapshot");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => handle_load(&config),
            "2" => {
                println!();
                handle_generate_reports(&config);
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            "" => break,
            _ => println!("Invalid choice. Please enter 1 or 2.\n"),
        }
    }
}
