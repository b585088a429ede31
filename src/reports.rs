use std::collections::{HashMap, HashSet};

use chrono::Datelike;

use crate::types::{
    Booking, CancellationRow, GuestOriginRow, HotelKind, MarketSegmentRow, MonthlyGuestsRow,
    PriceSeasonRow, RoomPriceRow, SegmentRoomAdrRow, StayLengthRow, SummaryStats,
};
use crate::util::{average, format_number, median};

/// Short month labels indexed by chrono month number minus one.
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

const HOTELS: [HotelKind; 2] = [HotelKind::City, HotelKind::Resort];

fn month_label(month: u32) -> &'static str {
    MONTH_LABELS[(month - 1) as usize]
}

/// Non-canceled bookings for one hotel. Reports work from derived views like
/// this one; the cleaned batch itself is never mutated.
fn checked_in(data: &[Booking], hotel: HotelKind) -> Vec<&Booking> {
    data.iter()
        .filter(|b| b.hotel == hotel && !b.is_canceled)
        .collect()
}

/// Where do guests come from: country mix of guests who actually arrived at
/// the City Hotel, largest share first.
pub fn guest_origin(data: &[Booking]) -> Vec<GuestOriginRow> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for b in checked_in(data, HotelKind::City) {
        *counts.entry(b.country.as_str()).or_insert(0) += 1;
    }
    let total: usize = counts.values().sum();

    let mut rows: Vec<GuestOriginRow> = counts
        .into_iter()
        .map(|(country, bookings)| {
            let pct = if total == 0 {
                0.0
            } else {
                bookings as f64 / total as f64 * 100.0
            };
            GuestOriginRow {
                country: country.to_string(),
                bookings,
                pct_of_guests: format_number(pct, 2),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.bookings.cmp(&a.bookings).then_with(|| a.country.cmp(&b.country)));
    rows
}

/// How much do guests pay per night and person, by reserved room type.
/// Canceled bookings carry prices too, so the whole batch participates.
pub fn room_prices(data: &[Booking]) -> Vec<RoomPriceRow> {
    let mut map: HashMap<(String, HotelKind), Vec<f64>> = HashMap::new();
    for b in data {
        if let Some(room) = b.reserved_room_type.as_deref() {
            map.entry((room.to_string(), b.hotel))
                .or_default()
                .push(b.adr_pp);
        }
    }
    let mut rows: Vec<RoomPriceRow> = map
        .into_iter()
        .map(|((room_type, hotel), prices)| {
            let mean = average(&prices);
            let bookings = prices.len();
            let med = median(prices);
            RoomPriceRow {
                room_type,
                hotel: hotel.to_string(),
                bookings,
                mean_adr_pp: format_number(mean, 2),
                median_adr_pp: format_number(med, 2),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.room_type.cmp(&b.room_type).then_with(|| a.hotel.cmp(&b.hotel)));
    rows
}

/// How the per-person nightly price moves over the year, per hotel.
pub fn price_seasonality(data: &[Booking]) -> Vec<PriceSeasonRow> {
    let mut rows = Vec::with_capacity(24);
    for month in 1..=12u32 {
        for hotel in HOTELS {
            let prices: Vec<f64> = data
                .iter()
                .filter(|b| b.hotel == hotel && b.arrival_date.month() == month)
                .map(|b| b.adr_pp)
                .collect();
            rows.push(PriceSeasonRow {
                month: month_label(month).to_string(),
                hotel: hotel.to_string(),
                bookings: prices.len(),
                avg_adr_pp: format_number(average(&prices), 2),
            });
        }
    }
    rows
}

/// Which months are the busiest, as arriving bookings per year.
pub fn monthly_guests(data: &[Booking]) -> Vec<MonthlyGuestsRow> {
    let mut rows = Vec::with_capacity(24);
    for hotel in HOTELS {
        let arrived = checked_in(data, hotel);
        for month in 1..=12u32 {
            let count = arrived
                .iter()
                .filter(|b| b.arrival_date.month() == month)
                .count();
            // The sample spans three Julys and Augusts but only two of every
            // other month, so raw counts are scaled to a per-year figure.
            let years = if month == 7 || month == 8 { 3.0 } else { 2.0 };
            rows.push(MonthlyGuestsRow {
                month: month_label(month).to_string(),
                hotel: hotel.to_string(),
                guests_per_year: format_number(count as f64 / years, 2),
            });
        }
    }
    rows
}

/// How long guests stay, as a share of all completed stays at both hotels.
pub fn stay_length(data: &[Booking]) -> Vec<StayLengthRow> {
    let mut counts: HashMap<(u32, HotelKind), usize> = HashMap::new();
    let mut total = 0usize;
    for hotel in HOTELS {
        for b in checked_in(data, hotel) {
            *counts.entry((b.total_nights, hotel)).or_insert(0) += 1;
            total += 1;
        }
    }
    // Shares are of the combined population, not per hotel, so the two
    // hotels' rows are directly comparable.
    let mut rows: Vec<StayLengthRow> = counts
        .into_iter()
        .map(|((nights, hotel), stays)| {
            let pct = if total == 0 {
                0.0
            } else {
                stays as f64 / total as f64 * 100.0
            };
            StayLengthRow {
                nights,
                hotel: hotel.to_string(),
                stays,
                pct_of_stays: format_number(pct, 2),
            }
        })
        .collect();
    rows.sort_by(|a, b| a.nights.cmp(&b.nights).then_with(|| a.hotel.cmp(&b.hotel)));
    rows
}

/// Where bookings come from, per hotel and market segment.
pub fn market_segments(data: &[Booking]) -> Vec<MarketSegmentRow> {
    let mut counts: HashMap<(HotelKind, String), usize> = HashMap::new();
    for b in data.iter().filter(|b| !b.is_canceled) {
        if let Some(segment) = b.market_segment.as_deref() {
            *counts.entry((b.hotel, segment.to_string())).or_insert(0) += 1;
        }
    }
    let mut rows: Vec<MarketSegmentRow> = counts
        .into_iter()
        .map(|((hotel, market_segment), bookings)| MarketSegmentRow {
            hotel: hotel.to_string(),
            market_segment,
            bookings,
        })
        .collect();
    rows.sort_by(|a, b| {
        a.hotel
            .cmp(&b.hotel)
            .then_with(|| b.bookings.cmp(&a.bookings))
            .then_with(|| a.market_segment.cmp(&b.market_segment))
    });
    rows
}

/// Per-person rate by market segment and reserved room type.
pub fn segment_room_adr(data: &[Booking]) -> Vec<SegmentRoomAdrRow> {
    let mut map: HashMap<(String, String), Vec<f64>> = HashMap::new();
    for b in data {
        if let (Some(segment), Some(room)) =
            (b.market_segment.as_deref(), b.reserved_room_type.as_deref())
        {
            map.entry((segment.to_string(), room.to_string()))
                .or_default()
                .push(b.adr_pp);
        }
    }
    let mut rows: Vec<SegmentRoomAdrRow> = map
        .into_iter()
        .map(|((market_segment, room_type), prices)| SegmentRoomAdrRow {
            market_segment,
            room_type,
            bookings: prices.len(),
            avg_adr_pp: format_number(average(&prices), 2),
        })
        .collect();
    rows.sort_by(|a, b| {
        a.market_segment
            .cmp(&b.market_segment)
            .then_with(|| a.room_type.cmp(&b.room_type))
    });
    rows
}

/// Bookings and cancellation rate per arrival month and hotel.
pub fn monthly_cancellations(data: &[Booking]) -> Vec<CancellationRow> {
    let mut rows = Vec::with_capacity(24);
    for hotel in HOTELS {
        for month in 1..=12u32 {
            let mut bookings = 0usize;
            let mut cancellations = 0usize;
            for b in data
                .iter()
                .filter(|b| b.hotel == hotel && b.arrival_date.month() == month)
            {
                bookings += 1;
                if b.is_canceled {
                    cancellations += 1;
                }
            }
            let rate = if bookings == 0 {
                0.0
            } else {
                cancellations as f64 / bookings as f64 * 100.0
            };
            rows.push(CancellationRow {
                month: month_label(month).to_string(),
                hotel: hotel.to_string(),
                bookings,
                cancellations,
                cancel_rate_pct: format_number(rate, 2),
            });
        }
    }
    rows
}

/// Headline numbers for the whole cleaned batch.
pub fn summary(data: &[Booking]) -> SummaryStats {
    let total_bookings = data.len();
    let countries: HashSet<&str> = data.iter().map(|b| b.country.as_str()).collect();
    let canceled = data.iter().filter(|b| b.is_canceled).count();
    let cancel_rate_pct = if total_bookings == 0 {
        0.0
    } else {
        canceled as f64 / total_bookings as f64 * 100.0
    };
    let adr_pps: Vec<f64> = data.iter().map(|b| b.adr_pp).collect();
    let nights: Vec<f64> = data.iter().map(|b| b.total_nights as f64).collect();
    let lead_times: Vec<f64> = data.iter().map(|b| b.lead_time as f64).collect();
    SummaryStats {
        total_bookings,
        total_countries: countries.len(),
        cancel_rate_pct,
        avg_adr_pp: average(&adr_pps),
        avg_total_nights: average(&nights),
        avg_lead_time_days: average(&lead_times),
    }
}
