use std::error::Error;

use csv::ReaderBuilder;

use crate::error::CleanError;
use crate::normalize::{self, CleanReport};
use crate::types::{Booking, RawBookingRow};

/// Columns the pipeline depends on. Checked against the header up front so
/// a truncated export fails with the column named, instead of a serde error
/// somewhere inside row deserialization.
const REQUIRED_COLUMNS: &[&str] = &[
    "hotel",
    "is_canceled",
    "lead_time",
    "arrival_date_year",
    "arrival_date_month",
    "arrival_date_day_of_month",
    "stays_in_weekend_nights",
    "stays_in_week_nights",
    "adults",
    "children",
    "babies",
    "meal",
    "country",
    "market_segment",
    "distribution_channel",
    "is_repeated_guest",
    "reserved_room_type",
    "assigned_room_type",
    "deposit_type",
    "customer_type",
    "agent",
    "company",
    "adr",
    "reservation_status_date",
];

/// Read the bookings CSV and run the cleaning pipeline over it.
pub fn load_and_clean(path: &str) -> Result<(Vec<Booking>, CleanReport), Box<dyn Error>> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_path(path)?;

    let headers = rdr.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(Box::new(CleanError::MissingField {
                column: column.to_string(),
            }));
        }
    }

    let mut rows: Vec<RawBookingRow> = Vec::new();
    for result in rdr.deserialize::<RawBookingRow>() {
        rows.push(result?);
    }

    let (bookings, report) = normalize::clean(rows)?;
    Ok((bookings, report))
}
