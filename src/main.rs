// Entry point and high-level CLI flow.
//
// - Option [1] loads the bookings CSV and runs the cleaning pipeline,
//   printing diagnostics about what the pipeline did.
// - Option [2] generates the report CSVs and a JSON summary, previewing
//   each table on the console.
// - After generating reports, the user can go back to the menu or exit.
mod error;
mod loader;
mod normalize;
mod output;
mod reports;
mod types;
mod util;

use once_cell::sync::Lazy;
use std::io::{self, Write};
use std::sync::Mutex;
use types::Booking;

// In-memory app state so the CSV is loaded and cleaned once but reports can
// be generated any number of times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| Mutex::new(AppState { data: None }));

struct AppState {
    data: Option<Vec<Booking>>,
}

/// Read a single line of input after printing the common "Enter choice:"
/// prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Ask whether to go back to the menu after generating reports.
///
/// Returns `true` for `Y`, `false` for `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the CSV and run the cleaning pipeline.
///
/// On success the cleaned batch is stored in `APP_STATE` and a short summary
/// of the pipeline's work is printed.
fn handle_load() {
    let path = "hotel_bookings.csv";
    match loader::load_and_clean(path) {
        Ok((data, report)) => {
            println!(
                "Processing dataset... ({} rows loaded, {} kept)",
                util::format_int(report.total_rows as i64),
                util::format_int(report.kept_rows as i64)
            );
            println!(
                "Note: {} rows without any guests dropped.",
                util::format_int(report.dropped_zero_guest as i64)
            );
            if report.imputed_values > 0 {
                println!(
                    "Info: filled {} missing values with defaults.",
                    util::format_int(report.imputed_values as i64)
                );
            }
            if report.meal_rewrites > 0 {
                println!(
                    "Info: rewrote {} Undefined meal plans to SC.",
                    util::format_int(report.meal_rewrites as i64)
                );
            }
            println!();
            let mut state = APP_STATE.lock().unwrap();
            state.data = Some(data);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: generate all reports and the JSON summary.
///
/// Intentionally side-effectful: writes one CSV per report plus a JSON
/// summary, and prints a markdown preview of each table.
fn handle_generate_reports() {
    let data = {
        let state = APP_STATE.lock().unwrap();
        state.data.clone()
    };
    let Some(data) = data else {
        println!("Error: No data loaded. Please load the CSV file first (option 1).\n");
        return;
    };

    println!("Generating reports...");
    println!("Outputs saved to individual files...\n");

    let origin = reports::guest_origin(&data);
    write_report("report1_guest_origin.csv", &origin);
    output::preview_table(
        1,
        "Home Country of Guests",
        Some("City Hotel, non-canceled bookings"),
        &origin,
        5,
    );

    let prices = reports::room_prices(&data);
    write_report("report2_room_prices.csv", &prices);
    output::preview_table(
        2,
        "Price of Room Types per Night and Person",
        None,
        &prices,
        5,
    );

    let season = reports::price_seasonality(&data);
    write_report("report3_price_seasonality.csv", &season);
    output::preview_table(
        3,
        "Room Price per Night and Person over the Year",
        None,
        &season,
        4,
    );

    let guests = reports::monthly_guests(&data);
    write_report("report4_monthly_guests.csv", &guests);
    output::preview_table(
        4,
        "Guests per Month",
        Some("Scaled to bookings per year"),
        &guests,
        4,
    );

    let stays = reports::stay_length(&data);
    write_report("report5_stay_length.csv", &stays);
    output::preview_table(5, "Length of Stay", None, &stays, 5);

    let segments = reports::market_segments(&data);
    write_report("report6_market_segments.csv", &segments);
    output::preview_table(6, "Bookings by Market Segment", None, &segments, 5);

    let segment_adr = reports::segment_room_adr(&data);
    write_report("report7_segment_room_adr.csv", &segment_adr);
    output::preview_table(
        7,
        "ADR by Market Segment and Room Type",
        None,
        &segment_adr,
        5,
    );

    let cancellations = reports::monthly_cancellations(&data);
    write_report("report8_monthly_cancellations.csv", &cancellations);
    output::preview_table(8, "Bookings and Cancellations per Month", None, &cancellations, 4);

    let summary = reports::summary(&data);
    if let Err(e) = output::write_json("summary.json", &summary) {
        eprintln!("Write error: {}", e);
    }
    println!("Summary Stats (summary.json):");
    println!(
        "{{\"cancel_rate_pct\": {}, \"avg_adr_pp\": {}}}\n",
        util::format_number(summary.cancel_rate_pct, 2),
        util::format_number(summary.avg_adr_pp, 2)
    );
}

fn write_report<T: serde::Serialize>(path: &str, rows: &[T]) {
    if let Err(e) = output::write_csv(path, rows) {
        eprintln!("Write error: {}", e);
    } else {
        println!("(Full table exported to {})", path);
    }
}

fn main() {
    loop {
        println!("Select an option:");
        println!("[1] Load the file");
        println!("[2] Generate Reports\n");
        match read_choice().as_str() {
            "1" => {
                handle_load();
            }
            "2" => {
                println!();
                handle_generate_reports();
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
}
