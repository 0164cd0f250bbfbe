//! Bolívar exchange rates and the store holding the current pair

use crate::core::error::PerrosError;
use serde::{Deserialize, Serialize};

/// Official (BCV) rate used when nothing better is known.
pub const DEFAULT_BCV_RATE: f64 = 45.50;
/// Market (USDT) rate used when nothing better is known.
pub const DEFAULT_USDT_RATE: f64 = 53.20;

/// Bolívares per 1 unit of reference currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RatesRepr")]
pub struct ExchangeRates {
    bcv: f64,
    usdt: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    effective_date: Option<String>,
}

impl ExchangeRates {
    pub fn new(bcv: f64, usdt: f64) -> Result<Self, PerrosError> {
        for (name, rate) in [("BCV", bcv), ("USDT", usdt)] {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(PerrosError::InvalidInput(format!(
                    "{name} rate must be a positive number, got {rate}"
                )));
            }
        }
        Ok(Self {
            bcv,
            usdt,
            effective_date: None,
        })
    }

    pub fn with_effective_date(mut self, date: impl Into<String>) -> Self {
        self.effective_date = Some(date.into());
        self
    }

    pub fn bcv(&self) -> f64 {
        self.bcv
    }

    pub fn usdt(&self) -> f64 {
        self.usdt
    }

    pub fn effective_date(&self) -> Option<&str> {
        self.effective_date.as_deref()
    }

    /// Gap between the market and the official rate, in percent of the official rate.
    pub fn spread_pct(&self) -> f64 {
        (self.usdt - self.bcv) / self.bcv * 100.0
    }
}

#[derive(Deserialize)]
struct RatesRepr {
    bcv: f64,
    usdt: f64,
    #[serde(default)]
    effective_date: Option<String>,
}

impl TryFrom<RatesRepr> for ExchangeRates {
    type Error = PerrosError;

    fn try_from(repr: RatesRepr) -> Result<Self, Self::Error> {
        let rates = ExchangeRates::new(repr.bcv, repr.usdt)?;
        Ok(match repr.effective_date {
            Some(date) => rates.with_effective_date(date),
            None => rates,
        })
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self {
            bcv: DEFAULT_BCV_RATE,
            usdt: DEFAULT_USDT_RATE,
            effective_date: None,
        }
    }
}

/// Latest known rates plus the fallback pair. Refreshing is driven from the
/// outside; this type only reads and replaces.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeRateStore {
    current: ExchangeRates,
    fallback: ExchangeRates,
}

impl ExchangeRateStore {
    pub fn new(fallback: ExchangeRates) -> Self {
        Self {
            current: fallback.clone(),
            fallback,
        }
    }

    pub fn current(&self) -> &ExchangeRates {
        &self.current
    }

    pub fn fallback(&self) -> &ExchangeRates {
        &self.fallback
    }

    pub fn replace(&mut self, rates: ExchangeRates) {
        self.current = rates;
    }

    pub fn is_fallback(&self) -> bool {
        self.current == self.fallback
    }
}

impl Default for ExchangeRateStore {
    fn default() -> Self {
        Self::new(ExchangeRates::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rates_must_be_positive() {
        assert!(ExchangeRates::new(45.5, 53.2).is_ok());
        assert!(matches!(
            ExchangeRates::new(0.0, 53.2),
            Err(PerrosError::InvalidInput(_))
        ));
        assert!(ExchangeRates::new(45.5, -1.0).is_err());
        assert!(ExchangeRates::new(f64::INFINITY, 1.0).is_err());
    }

    #[test]
    fn test_store_replaces_wholesale() {
        let mut store = ExchangeRateStore::default();
        assert!(store.is_fallback());
        assert_eq!(store.current().bcv(), DEFAULT_BCV_RATE);

        let fresh = ExchangeRates::new(50.0, 60.0)
            .unwrap()
            .with_effective_date("2025-01-15");
        store.replace(fresh.clone());

        assert_eq!(store.current(), &fresh);
        assert_eq!(store.current().effective_date(), Some("2025-01-15"));
        assert_eq!(store.fallback().usdt(), DEFAULT_USDT_RATE);
        assert!(!store.is_fallback());
    }

    #[test]
    fn test_deserialization_validates() {
        let ok: ExchangeRates =
            serde_json::from_str(r#"{"bcv": 45.5, "usdt": 53.2, "effective_date": "2025-01-15"}"#)
                .unwrap();
        assert_eq!(ok.effective_date(), Some("2025-01-15"));

        let bad = serde_json::from_str::<ExchangeRates>(r#"{"bcv": 0, "usdt": 53.2}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_spread() {
        let rates = ExchangeRates::new(50.0, 60.0).unwrap();
        assert!((rates.spread_pct() - 20.0).abs() < 1e-9);
    }
}
