// The booking cleaning pipeline.
//
// The passes run in a fixed order because later steps consume the output of
// earlier ones: defaults are imputed before the zero-guest filter reads the
// guest columns, and the filter runs before `adr_pp` divides by the guest
// count. Reordering these passes silently changes the output.
use chrono::{Duration, NaiveDate};

use crate::error::CleanError;
use crate::types::{Booking, HotelKind, RawBookingRow};
use crate::util::{parse_date_safe, parse_f64_safe, parse_i64_safe};

// Defaults for the four fields the pipeline commits to filling. A missing
// value anywhere else is left alone; if a later typed pass needs it, that
// pass reports the failure with field and row attached.
const DEFAULT_CHILDREN: &str = "0";
const DEFAULT_COUNTRY: &str = "unknown";
const DEFAULT_AGENT: &str = "0";
const DEFAULT_COMPANY: &str = "0";

/// Canonical English month names and the two-digit month numbers used for
/// date assembly. Anything outside this table is a malformed record.
const MONTH_NUMBERS: [(&str, &str); 12] = [
    ("January", "01"),
    ("February", "02"),
    ("March", "03"),
    ("April", "04"),
    ("May", "05"),
    ("June", "06"),
    ("July", "07"),
    ("August", "08"),
    ("September", "09"),
    ("October", "10"),
    ("November", "11"),
    ("December", "12"),
];

pub fn month_number(name: &str) -> Option<&'static str> {
    MONTH_NUMBERS
        .iter()
        .find(|(month, _)| *month == name)
        .map(|(_, num)| *num)
}

/// Counters describing what the pipeline did to a batch.
#[derive(Debug, Clone, Default)]
pub struct CleanReport {
    pub total_rows: usize,
    pub kept_rows: usize,
    pub dropped_zero_guest: usize,
    pub imputed_values: usize,
    pub meal_rewrites: usize,
}

// A raw row tagged with its 1-based position in the data section of the
// file, so diagnostics can point at the offending row.
struct NumberedRow {
    row: usize,
    raw: RawBookingRow,
}

/// Run the full cleaning pipeline over a batch of raw rows.
///
/// Fail-fast: the first unreadable value aborts the batch with no partial
/// output. On success every returned `Booking` has `total_guests > 0` and
/// well-formed arrival and booking dates.
pub fn clean(rows: Vec<RawBookingRow>) -> Result<(Vec<Booking>, CleanReport), CleanError> {
    let mut report = CleanReport {
        total_rows: rows.len(),
        ..CleanReport::default()
    };
    let mut rows: Vec<NumberedRow> = rows
        .into_iter()
        .enumerate()
        .map(|(i, raw)| NumberedRow { row: i + 1, raw })
        .collect();

    impute_defaults(&mut rows, &mut report);
    rewrite_undefined_meal(&mut rows, &mut report);
    // The filter must see imputed guest counts, so it cannot move above
    // `impute_defaults`; and it must run before `assemble` divides by the
    // guest total.
    let rows = drop_zero_guest_rows(rows, &mut report)?;
    let bookings = rows
        .iter()
        .map(assemble)
        .collect::<Result<Vec<Booking>, CleanError>>()?;

    report.kept_rows = bookings.len();
    Ok((bookings, report))
}

/// Pass 1: fill the imputable fields. Never raises.
fn impute_defaults(rows: &mut [NumberedRow], report: &mut CleanReport) {
    for r in rows.iter_mut() {
        for (slot, default) in [
            (&mut r.raw.children, DEFAULT_CHILDREN),
            (&mut r.raw.country, DEFAULT_COUNTRY),
            (&mut r.raw.agent, DEFAULT_AGENT),
            (&mut r.raw.company, DEFAULT_COMPANY),
        ] {
            if slot.is_none() {
                *slot = Some(default.to_string());
                report.imputed_values += 1;
            }
        }
    }
}

/// Pass 2: `meal` is the one categorical column with a placeholder value in
/// the source; `Undefined` means the same as the `SC` (no meal) package.
fn rewrite_undefined_meal(rows: &mut [NumberedRow], report: &mut CleanReport) {
    for r in rows.iter_mut() {
        if r.raw.meal.as_deref() == Some("Undefined") {
            r.raw.meal = Some("SC".to_string());
            report.meal_rewrites += 1;
        }
    }
}

/// Pass 3: drop rows that book no guests at all.
fn drop_zero_guest_rows(
    rows: Vec<NumberedRow>,
    report: &mut CleanReport,
) -> Result<Vec<NumberedRow>, CleanError> {
    let mut kept = Vec::with_capacity(rows.len());
    for r in rows {
        let adults = req_count("adults", r.raw.adults.as_deref(), r.row)?;
        let children = req_count("children", r.raw.children.as_deref(), r.row)?;
        let babies = req_count("babies", r.raw.babies.as_deref(), r.row)?;
        if adults + children + babies == 0 {
            report.dropped_zero_guest += 1;
        } else {
            kept.push(r);
        }
    }
    Ok(kept)
}

/// Passes 4-7, per row: coerce identifiers, map the month name, assemble the
/// dates, and compute the derived fields.
fn assemble(r: &NumberedRow) -> Result<Booking, CleanError> {
    let row = r.row;
    let raw = &r.raw;

    let hotel = match raw.hotel.as_deref().map(str::trim) {
        Some(label) => HotelKind::from_label(label).ok_or_else(|| CleanError::MalformedRecord {
            row,
            detail: format!("unknown hotel label `{}`", label),
        })?,
        None => {
            return Err(CleanError::MalformedRecord {
                row,
                detail: "hotel label is empty".to_string(),
            })
        }
    };

    let is_canceled = req_flag("is_canceled", raw.is_canceled.as_deref(), row)?;
    let is_repeated_guest = req_flag("is_repeated_guest", raw.is_repeated_guest.as_deref(), row)?;
    let lead_time = req_days("lead_time", raw.lead_time.as_deref(), row)?;

    let adults = req_count("adults", raw.adults.as_deref(), row)?;
    let children = req_count("children", raw.children.as_deref(), row)?;
    let babies = req_count("babies", raw.babies.as_deref(), row)?;
    let stays_weekend_nights =
        req_count("stays_in_weekend_nights", raw.stays_in_weekend_nights.as_deref(), row)?;
    let stays_week_nights =
        req_count("stays_in_week_nights", raw.stays_in_week_nights.as_deref(), row)?;
    let adr = req_number("adr", raw.adr.as_deref(), row)?;

    // Agent and company are identifiers, not quantities; after imputation
    // they are carried as strings.
    let agent = raw.agent.clone().unwrap_or_else(|| DEFAULT_AGENT.to_string());
    let company = raw.company.clone().unwrap_or_else(|| DEFAULT_COMPANY.to_string());

    let year = req_days("arrival_date_year", raw.arrival_date_year.as_deref(), row)?;
    let day = req_count(
        "arrival_date_day_of_month",
        raw.arrival_date_day_of_month.as_deref(),
        row,
    )?;
    let month_name = raw
        .arrival_date_month
        .as_deref()
        .map(str::trim)
        .unwrap_or("");
    let month = month_number(month_name).ok_or_else(|| CleanError::MalformedRecord {
        row,
        detail: format!(
            "month name `{}` is not one of the twelve canonical names",
            month_name
        ),
    })?;

    // Assemble `YYYY/MM/DD` and let chrono reject impossible dates such as
    // February 30th.
    let assembled = format!("{}/{}/{:02}", year, month, day);
    let arrival_date =
        NaiveDate::parse_from_str(&assembled, "%Y/%m/%d").map_err(|_| CleanError::MalformedRecord {
            row,
            detail: format!("`{}` is not a valid calendar date", assembled),
        })?;
    let booking_date = arrival_date - Duration::days(lead_time);

    let reservation_status_date = match raw.reservation_status_date.as_deref() {
        Some(s) => Some(parse_date_safe(Some(s)).ok_or_else(|| CleanError::MalformedRecord {
            row,
            detail: format!("`{}` is not a valid reservation status date", s),
        })?),
        None => None,
    };

    // Safe to divide: the zero-guest filter already ran.
    let total_guests = adults + children + babies;
    let total_nights = stays_weekend_nights + stays_week_nights;
    let adr_pp = adr / total_guests as f64;

    Ok(Booking {
        hotel,
        is_canceled,
        lead_time,
        arrival_date,
        booking_date,
        stays_weekend_nights,
        stays_week_nights,
        adults,
        children,
        babies,
        meal: trimmed(&raw.meal),
        country: raw.country.clone().unwrap_or_else(|| DEFAULT_COUNTRY.to_string()),
        market_segment: trimmed(&raw.market_segment),
        distribution_channel: trimmed(&raw.distribution_channel),
        is_repeated_guest,
        reserved_room_type: trimmed(&raw.reserved_room_type),
        assigned_room_type: trimmed(&raw.assigned_room_type),
        deposit_type: trimmed(&raw.deposit_type),
        customer_type: trimmed(&raw.customer_type),
        agent,
        company,
        adr,
        reservation_status_date,
        total_guests,
        total_nights,
        adr_pp,
    })
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value.as_deref().map(|s| s.trim().to_string())
}

/// A guest/night count: a non-negative integer, accepting the `1.0` float
/// renderings some exports use for count columns.
fn req_count(field: &'static str, value: Option<&str>, row: usize) -> Result<u32, CleanError> {
    let mismatch = || CleanError::TypeMismatch {
        row,
        field,
        expected: "a non-negative count",
        value: value.unwrap_or("").to_string(),
    };
    let n = parse_f64_safe(value).ok_or_else(mismatch)?;
    if n < 0.0 || n.fract() != 0.0 {
        return Err(mismatch());
    }
    Ok(n as u32)
}

fn req_number(field: &'static str, value: Option<&str>, row: usize) -> Result<f64, CleanError> {
    parse_f64_safe(value).ok_or_else(|| CleanError::TypeMismatch {
        row,
        field,
        expected: "a number",
        value: value.unwrap_or("").to_string(),
    })
}

fn req_days(field: &'static str, value: Option<&str>, row: usize) -> Result<i64, CleanError> {
    let mismatch = || CleanError::TypeMismatch {
        row,
        field,
        expected: "a non-negative integer",
        value: value.unwrap_or("").to_string(),
    };
    let n = parse_i64_safe(value).ok_or_else(mismatch)?;
    if n < 0 {
        return Err(mismatch());
    }
    Ok(n)
}

fn req_flag(field: &'static str, value: Option<&str>, row: usize) -> Result<bool, CleanError> {
    match value.map(str::trim) {
        Some("0") => Ok(false),
        Some("1") => Ok(true),
        other => Err(CleanError::TypeMismatch {
            row,
            field,
            expected: "a 0/1 flag",
            value: other.unwrap_or("").to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn raw_row() -> RawBookingRow {
        RawBookingRow {
            hotel: Some("Resort Hotel".into()),
            is_canceled: Some("0".into()),
            lead_time: Some("10".into()),
            arrival_date_year: Some("2017".into()),
            arrival_date_month: Some("July".into()),
            arrival_date_day_of_month: Some("1".into()),
            stays_in_weekend_nights: Some("1".into()),
            stays_in_week_nights: Some("2".into()),
            adults: Some("2".into()),
            children: Some("0.0".into()),
            babies: Some("0".into()),
            meal: Some("BB".into()),
            country: Some("PRT".into()),
            market_segment: Some("Online TA".into()),
            distribution_channel: Some("TA/TO".into()),
            is_repeated_guest: Some("0".into()),
            reserved_room_type: Some("A".into()),
            assigned_room_type: Some("A".into()),
            deposit_type: Some("No Deposit".into()),
            customer_type: Some("Transient".into()),
            agent: Some("240".into()),
            company: Some("40".into()),
            adr: Some("98.5".into()),
            reservation_status_date: Some("2017-07-04".into()),
        }
    }

    /// Map a cleaned booking back to a raw row. Used to check that cleaning
    /// already-clean data changes nothing.
    fn re_raw(b: &Booking) -> RawBookingRow {
        const NAMES: [&str; 12] = [
            "January",
            "February",
            "March",
            "April",
            "May",
            "June",
            "July",
            "August",
            "September",
            "October",
            "November",
            "December",
        ];
        RawBookingRow {
            hotel: Some(b.hotel.to_string()),
            is_canceled: Some(if b.is_canceled { "1" } else { "0" }.to_string()),
            lead_time: Some(b.lead_time.to_string()),
            arrival_date_year: Some(b.arrival_date.year().to_string()),
            arrival_date_month: Some(NAMES[b.arrival_date.month0() as usize].to_string()),
            arrival_date_day_of_month: Some(b.arrival_date.day().to_string()),
            stays_in_weekend_nights: Some(b.stays_weekend_nights.to_string()),
            stays_in_week_nights: Some(b.stays_week_nights.to_string()),
            adults: Some(b.adults.to_string()),
            children: Some(b.children.to_string()),
            babies: Some(b.babies.to_string()),
            meal: b.meal.clone(),
            country: Some(b.country.clone()),
            market_segment: b.market_segment.clone(),
            distribution_channel: b.distribution_channel.clone(),
            is_repeated_guest: Some(if b.is_repeated_guest { "1" } else { "0" }.to_string()),
            reserved_room_type: b.reserved_room_type.clone(),
            assigned_room_type: b.assigned_room_type.clone(),
            deposit_type: b.deposit_type.clone(),
            customer_type: b.customer_type.clone(),
            agent: Some(b.agent.clone()),
            company: Some(b.company.clone()),
            adr: Some(b.adr.to_string()),
            reservation_status_date: b
                .reservation_status_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }

    #[test]
    fn imputes_missing_fields_with_defaults() {
        let raw = RawBookingRow {
            children: None,
            country: None,
            company: None,
            agent: None,
            meal: Some("Undefined".into()),
            ..raw_row()
        };
        let (bookings, report) = clean(vec![raw]).unwrap();
        let b = &bookings[0];
        assert_eq!(b.children, 0);
        assert_eq!(b.country, "unknown");
        assert_eq!(b.company, "0");
        assert_eq!(b.agent, "0");
        assert_eq!(b.meal.as_deref(), Some("SC"));
        assert_eq!(b.total_guests, 2);
        assert_eq!(report.imputed_values, 4);
        assert_eq!(report.meal_rewrites, 1);
    }

    #[test]
    fn drops_rows_without_any_guests() {
        let empty = RawBookingRow {
            adults: Some("0".into()),
            children: Some("0".into()),
            babies: Some("0".into()),
            ..raw_row()
        };
        let (bookings, report) = clean(vec![raw_row(), empty]).unwrap();
        assert_eq!(bookings.len(), 1);
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.kept_rows, 1);
        assert_eq!(report.dropped_zero_guest, 1);
        assert!(bookings.iter().all(|b| b.total_guests > 0));
    }

    #[test]
    fn zero_guest_filter_counts_imputed_children() {
        // `children` is missing and must be imputed to 0 before the filter
        // reads it; the row still books two adults and is kept.
        let raw = RawBookingRow {
            adults: Some("2".into()),
            children: None,
            babies: Some("0".into()),
            ..raw_row()
        };
        let (bookings, _) = clean(vec![raw]).unwrap();
        assert_eq!(bookings[0].total_guests, 2);
    }

    #[test]
    fn assembles_arrival_and_booking_dates() {
        let (bookings, _) = clean(vec![raw_row()]).unwrap();
        let b = &bookings[0];
        assert_eq!(b.arrival_date, NaiveDate::from_ymd_opt(2017, 7, 1).unwrap());
        assert_eq!(b.booking_date, NaiveDate::from_ymd_opt(2017, 6, 21).unwrap());
    }

    #[test]
    fn booking_date_round_trips_through_lead_time() {
        for lead in ["0", "1", "30", "365"] {
            let raw = RawBookingRow {
                lead_time: Some(lead.into()),
                ..raw_row()
            };
            let (bookings, _) = clean(vec![raw]).unwrap();
            let b = &bookings[0];
            assert_eq!(b.booking_date + Duration::days(b.lead_time), b.arrival_date);
        }
    }

    #[test]
    fn derived_fields_follow_their_definitions() {
        let raw = RawBookingRow {
            adults: Some("2".into()),
            children: Some("1.0".into()),
            babies: Some("1".into()),
            stays_in_weekend_nights: Some("2".into()),
            stays_in_week_nights: Some("5".into()),
            adr: Some("120.0".into()),
            ..raw_row()
        };
        let (bookings, _) = clean(vec![raw]).unwrap();
        let b = &bookings[0];
        assert_eq!(b.total_guests, b.adults + b.children + b.babies);
        assert_eq!(b.total_nights, b.stays_weekend_nights + b.stays_week_nights);
        assert!((b.adr_pp - b.adr / b.total_guests as f64).abs() < 1e-9);
        assert!((b.adr_pp - 30.0).abs() < 1e-9);
    }

    #[test]
    fn negative_adr_is_kept_as_is() {
        let raw = RawBookingRow {
            adr: Some("-6.38".into()),
            adults: Some("2".into()),
            ..raw_row()
        };
        let (bookings, _) = clean(vec![raw]).unwrap();
        assert!((bookings[0].adr_pp - (-3.19)).abs() < 1e-9);
    }

    #[test]
    fn rejects_unknown_month_names() {
        let raw = RawBookingRow {
            arrival_date_month: Some("Juillet".into()),
            ..raw_row()
        };
        let err = clean(vec![raw]).unwrap_err();
        assert!(matches!(err, CleanError::MalformedRecord { row: 1, .. }));
    }

    #[test]
    fn rejects_impossible_calendar_dates() {
        let raw = RawBookingRow {
            arrival_date_month: Some("February".into()),
            arrival_date_day_of_month: Some("30".into()),
            ..raw_row()
        };
        let err = clean(vec![raw]).unwrap_err();
        assert!(matches!(err, CleanError::MalformedRecord { .. }));
    }

    #[test]
    fn rejects_non_numeric_guest_counts() {
        let raw = RawBookingRow {
            adults: Some("two".into()),
            ..raw_row()
        };
        let err = clean(vec![raw]).unwrap_err();
        assert_eq!(
            err,
            CleanError::TypeMismatch {
                row: 1,
                field: "adults",
                expected: "a non-negative count",
                value: "two".to_string(),
            }
        );
    }

    #[test]
    fn rejects_missing_adr() {
        let raw = RawBookingRow {
            adr: None,
            ..raw_row()
        };
        let err = clean(vec![raw]).unwrap_err();
        assert!(matches!(err, CleanError::TypeMismatch { field: "adr", .. }));
    }

    #[test]
    fn error_diagnostics_name_field_and_row() {
        let bad = RawBookingRow {
            lead_time: Some("soon".into()),
            ..raw_row()
        };
        let err = clean(vec![raw_row(), bad]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("row 2"));
        assert!(msg.contains("lead_time"));
    }

    #[test]
    fn cleaning_is_idempotent() {
        let rows = vec![
            RawBookingRow {
                children: None,
                country: None,
                meal: Some("Undefined".into()),
                ..raw_row()
            },
            RawBookingRow {
                hotel: Some("City Hotel".into()),
                is_canceled: Some("1".into()),
                adults: Some("1".into()),
                adr: Some("75.25".into()),
                ..raw_row()
            },
        ];
        let (first, _) = clean(rows).unwrap();
        let (second, report) = clean(first.iter().map(re_raw).collect()).unwrap();
        assert_eq!(first, second);
        // Already-clean input needs no imputation, rewrites, or drops.
        assert_eq!(report.imputed_values, 0);
        assert_eq!(report.meal_rewrites, 0);
        assert_eq!(report.dropped_zero_guest, 0);
    }

    #[test]
    fn month_table_covers_the_whole_year() {
        assert_eq!(month_number("January"), Some("01"));
        assert_eq!(month_number("July"), Some("07"));
        assert_eq!(month_number("December"), Some("12"));
        assert_eq!(month_number("july"), None);
        assert_eq!(month_number(""), None);
    }
}
