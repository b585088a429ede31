use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// One raw CSV row, exactly as read from the file.
///
/// Every field is `Option<String>`: blank cells arrive as `None`, and all
/// typing decisions are deferred to the cleaning pipeline so a parse failure
/// can be reported with the field name and row number attached.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawBookingRow {
    pub hotel: Option<String>,
    pub is_canceled: Option<String>,
    pub lead_time: Option<String>,
    pub arrival_date_year: Option<String>,
    pub arrival_date_month: Option<String>,
    pub arrival_date_day_of_month: Option<String>,
    pub stays_in_weekend_nights: Option<String>,
    pub stays_in_week_nights: Option<String>,
    pub adults: Option<String>,
    pub children: Option<String>,
    pub babies: Option<String>,
    pub meal: Option<String>,
    pub country: Option<String>,
    pub market_segment: Option<String>,
    pub distribution_channel: Option<String>,
    pub is_repeated_guest: Option<String>,
    pub reserved_room_type: Option<String>,
    pub assigned_room_type: Option<String>,
    pub deposit_type: Option<String>,
    pub customer_type: Option<String>,
    pub agent: Option<String>,
    pub company: Option<String>,
    pub adr: Option<String>,
    pub reservation_status_date: Option<String>,
}

/// The two properties in the dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotelKind {
    Resort,
    City,
}

impl HotelKind {
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Resort Hotel" => Some(HotelKind::Resort),
            "City Hotel" => Some(HotelKind::City),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HotelKind::Resort => "Resort Hotel",
            HotelKind::City => "City Hotel",
        }
    }
}

impl fmt::Display for HotelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fully cleaned booking record.
///
/// Once the pipeline has produced these they are read-only: every report
/// works from `&[Booking]` and builds its own derived views by filtering.
///
/// Invariant: `total_guests > 0` (zero-guest rows are dropped during
/// cleaning), so `adr_pp` is always a finite division result.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub hotel: HotelKind,
    pub is_canceled: bool,
    pub lead_time: i64,
    pub arrival_date: NaiveDate,
    /// `arrival_date` minus `lead_time` days.
    pub booking_date: NaiveDate,
    pub stays_weekend_nights: u32,
    pub stays_week_nights: u32,
    pub adults: u32,
    pub children: u32,
    pub babies: u32,
    /// `None` when the source cell was blank; `"Undefined"` is rewritten to
    /// `"SC"` during cleaning.
    pub meal: Option<String>,
    pub country: String,
    pub market_segment: Option<String>,
    pub distribution_channel: Option<String>,
    pub is_repeated_guest: bool,
    pub reserved_room_type: Option<String>,
    pub assigned_room_type: Option<String>,
    pub deposit_type: Option<String>,
    pub customer_type: Option<String>,
    pub agent: String,
    pub company: String,
    /// Average daily rate. Negative values exist in the source and are kept.
    pub adr: f64,
    pub reservation_status_date: Option<NaiveDate>,
    pub total_guests: u32,
    pub total_nights: u32,
    /// ADR per person: `adr / total_guests`.
    pub adr_pp: f64,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct GuestOriginRow {
    #[serde(rename = "Country")]
    #[tabled(rename = "Country")]
    pub country: String,
    #[serde(rename = "Bookings")]
    #[tabled(rename = "Bookings")]
    pub bookings: usize,
    #[serde(rename = "PctOfGuests")]
    #[tabled(rename = "PctOfGuests")]
    pub pct_of_guests: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct RoomPriceRow {
    #[serde(rename = "RoomType")]
    #[tabled(rename = "RoomType")]
    pub room_type: String,
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "Bookings")]
    #[tabled(rename = "Bookings")]
    pub bookings: usize,
    #[serde(rename = "MeanAdrPp")]
    #[tabled(rename = "MeanAdrPp")]
    pub mean_adr_pp: String,
    #[serde(rename = "MedianAdrPp")]
    #[tabled(rename = "MedianAdrPp")]
    pub median_adr_pp: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct PriceSeasonRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "Bookings")]
    #[tabled(rename = "Bookings")]
    pub bookings: usize,
    #[serde(rename = "AvgAdrPp")]
    #[tabled(rename = "AvgAdrPp")]
    pub avg_adr_pp: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MonthlyGuestsRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "GuestsPerYear")]
    #[tabled(rename = "GuestsPerYear")]
    pub guests_per_year: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct StayLengthRow {
    #[serde(rename = "Nights")]
    #[tabled(rename = "Nights")]
    pub nights: u32,
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "Stays")]
    #[tabled(rename = "Stays")]
    pub stays: usize,
    #[serde(rename = "PctOfStays")]
    #[tabled(rename = "PctOfStays")]
    pub pct_of_stays: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct MarketSegmentRow {
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "MarketSegment")]
    #[tabled(rename = "MarketSegment")]
    pub market_segment: String,
    #[serde(rename = "Bookings")]
    #[tabled(rename = "Bookings")]
    pub bookings: usize,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct SegmentRoomAdrRow {
    #[serde(rename = "MarketSegment")]
    #[tabled(rename = "MarketSegment")]
    pub market_segment: String,
    #[serde(rename = "RoomType")]
    #[tabled(rename = "RoomType")]
    pub room_type: String,
    #[serde(rename = "Bookings")]
    #[tabled(rename = "Bookings")]
    pub bookings: usize,
    #[serde(rename = "AvgAdrPp")]
    #[tabled(rename = "AvgAdrPp")]
    pub avg_adr_pp: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct CancellationRow {
    #[serde(rename = "Month")]
    #[tabled(rename = "Month")]
    pub month: String,
    #[serde(rename = "Hotel")]
    #[tabled(rename = "Hotel")]
    pub hotel: String,
    #[serde(rename = "Bookings")]
    #[tabled(rename = "Bookings")]
    pub bookings: usize,
    #[serde(rename = "Cancellations")]
    #[tabled(rename = "Cancellations")]
    pub cancellations: usize,
    #[serde(rename = "CancelRatePct")]
    #[tabled(rename = "CancelRatePct")]
    pub cancel_rate_pct: String,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_bookings: usize,
    pub total_countries: usize,
    pub cancel_rate_pct: f64,
    pub avg_adr_pp: f64,
    pub avg_total_nights: f64,
    pub avg_lead_time_days: f64,
}
