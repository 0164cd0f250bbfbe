//! Built-in sample reports shown when no backend is reachable

use crate::core::entry::HotDogEntry;
use chrono::{Duration, SecondsFormat, Utc};

// (id, usdt, bs, bcv, name, lat, lng, state)
const SAMPLES: [(&str, f64, f64, f64, &str, f64, f64, &str); 6] = [
    ("1", 2.50, 133.0, 2.92, "Perros El Gordo", 10.4806, -66.9036, "Distrito Capital"),
    ("2", 2.00, 106.4, 2.33, "Hot Dogs Express", 10.4696, -66.8037, "Miranda"),
    ("3", 3.00, 159.6, 3.50, "Perros Premium", 10.0678, -69.3583, "Lara"),
    ("4", 1.80, 95.76, 2.10, "La Esquina del Perro", 10.6417, -71.6394, "Zulia"),
    ("5", 2.20, 117.04, 2.57, "Perros Callejeros", 8.5897, -71.1561, "Mérida"),
    ("6", 2.75, 146.3, 3.21, "Hot Dogs Valencia", 10.1579, -67.9972, "Carabobo"),
];

/// Sample reports, newest first, spaced one hour apart ending an hour ago.
pub fn sample_entries() -> Vec<HotDogEntry> {
    let now = Utc::now();
    SAMPLES
        .iter()
        .enumerate()
        .map(
            |(i, &(id, price, price_bs, price_bcv, name, lat, lng, state))| HotDogEntry {
                id: id.to_string(),
                business_name: name.to_string(),
                price,
                price_bs: Some(price_bs),
                price_bcv: Some(price_bcv),
                lat,
                lng,
                photo: None,
                state: Some(state.to_string()),
                created_at: (now - Duration::hours(i as i64 + 1))
                    .to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        )
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::aggregate::national_average;

    #[test]
    fn test_six_samples_newest_first() {
        let entries = sample_entries();
        assert_eq!(entries.len(), 6);
        assert_eq!(entries[0].business_name, "Perros El Gordo");
        assert!(entries.windows(2).all(|w| w[0].created_at > w[1].created_at));
        assert!((national_average(&entries) - 14.25 / 6.0).abs() < 1e-9);
    }
}
