//! Average price queries over the reports held by the client.
//!
//! Every query rescans the slice it is given; nothing is memoized. All
//! averages use the USDT `price` field.
use crate::core::entry::HotDogEntry;
use crate::core::geo::Coordinates;
use std::fmt::Display;

/// Radius used for "your area" averages when none is configured.
pub const DEFAULT_RADIUS_KM: f64 = 50.0;

/// How many of the newest reports count as "recent" for the trend.
const RECENT_WINDOW: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceTrend {
    Up,
    Down,
}

impl Display for PriceTrend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                PriceTrend::Up => "▲",
                PriceTrend::Down => "▼",
            }
        )
    }
}

fn mean<'a>(entries: impl IntoIterator<Item = &'a HotDogEntry>) -> Option<f64> {
    let (sum, count) = entries
        .into_iter()
        .fold((0.0, 0usize), |(sum, count), e| (sum + e.price, count + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// Mean USDT price over all entries, 0 when there are none.
pub fn national_average(entries: &[HotDogEntry]) -> f64 {
    mean(entries).unwrap_or(0.0)
}

/// Entries within `radius_km` of `reference`, inclusive.
pub fn nearby<'a>(
    entries: &'a [HotDogEntry],
    reference: &'a Coordinates,
    radius_km: f64,
) -> impl Iterator<Item = &'a HotDogEntry> + 'a {
    entries
        .iter()
        .filter(move |e| reference.distance_to(&e.coordinates()) <= radius_km)
}

/// Mean USDT price over entries within `radius_km` of `reference`, 0 when none match.
pub fn local_average(entries: &[HotDogEntry], reference: &Coordinates, radius_km: f64) -> f64 {
    mean(nearby(entries, reference, radius_km)).unwrap_or(0.0)
}

/// Compares the newest reports against the rest. Entries are expected newest first.
pub fn price_trend(entries: &[HotDogEntry]) -> PriceTrend {
    let split = entries.len().min(RECENT_WINDOW);
    let (recent, older) = entries.split_at(split);
    let recent_avg = mean(recent).unwrap_or(0.0);
    let older_avg = mean(older).unwrap_or(recent_avg);
    if recent_avg >= older_avg {
        PriceTrend::Up
    } else {
        PriceTrend::Down
    }
}
