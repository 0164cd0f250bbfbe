//! Price reports as held by the client

use crate::core::geo::Coordinates;
use crate::core::price::DerivedPrices;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// One crowd-sourced hot dog price report.
///
/// `price` is always the USDT price. The Bolívar and BCV prices are kept only
/// when they were actually reported; aggregation never substitutes one
/// currency for another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotDogEntry {
    pub id: String,
    pub business_name: String,
    pub price: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_bs: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_bcv: Option<f64>,
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub created_at: String,
}

impl HotDogEntry {
    /// Builds a report that exists only on this client, with a random id and
    /// the current time.
    pub fn local(
        business_name: impl Into<String>,
        prices: DerivedPrices,
        location: Coordinates,
        state: Option<String>,
        photo: Option<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            business_name: business_name.into(),
            price: prices.price_usdt,
            price_bs: Some(prices.price_bs),
            price_bcv: Some(prices.price_bcv),
            lat: location.lat,
            lng: location.lng,
            photo,
            state,
            created_at: now_iso8601(),
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

/// Change notification for the reports collection.
#[derive(Debug, Clone, PartialEq)]
pub enum ReportChange {
    Insert(HotDogEntry),
    Update(HotDogEntry),
    Delete { id: String },
}

impl ReportChange {
    pub fn id(&self) -> &str {
        match self {
            ReportChange::Insert(entry) | ReportChange::Update(entry) => &entry.id,
            ReportChange::Delete { id } => id,
        }
    }
}

pub(crate) fn now_iso8601() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_entry_gets_id_and_timestamp() {
        let prices = DerivedPrices {
            price_bs: 133.0,
            price_usdt: 2.5,
            price_bcv: 2.92,
        };
        let location = Coordinates::new(10.4806, -66.9036).unwrap();
        let a = HotDogEntry::local("Perros El Gordo", prices, location, None, None);
        let b = HotDogEntry::local("Perros El Gordo", prices, location, None, None);

        assert_ne!(a.id, b.id);
        assert_eq!(a.price, 2.5);
        assert_eq!(a.price_bs, Some(133.0));
        assert!(chrono::DateTime::parse_from_rfc3339(&a.created_at).is_ok());
        assert_eq!(a.coordinates(), location);
    }

    #[test]
    fn test_optional_prices_are_omitted_when_absent() {
        let entry = HotDogEntry {
            id: "1".into(),
            business_name: "Hot Dogs Express".into(),
            price: 2.0,
            price_bs: None,
            price_bcv: None,
            lat: 10.4696,
            lng: -66.8037,
            photo: None,
            state: Some("Miranda".into()),
            created_at: "2025-01-15T12:00:00.000Z".into(),
        };
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("price_bs"));
        let back: HotDogEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
    }
}
