//! Bolívar price conversion

use crate::core::error::PerrosError;
use crate::core::rates::ExchangeRates;
use serde::{Deserialize, Serialize};

/// A Bolívar price together with its dollar equivalents at both rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DerivedPrices {
    pub price_bs: f64,
    pub price_usdt: f64,
    pub price_bcv: f64,
}

/// Converts `price_bs` with the given rates.
///
/// Fails with [`PerrosError::InvalidInput`] when the price is negative, NaN or
/// infinite. Rates are positive by construction of [`ExchangeRates`].
pub fn derive_prices(price_bs: f64, rates: &ExchangeRates) -> Result<DerivedPrices, PerrosError> {
    if !price_bs.is_finite() || price_bs < 0.0 {
        return Err(PerrosError::InvalidInput(format!(
            "price must be a finite non-negative number, got {price_bs}"
        )));
    }
    Ok(DerivedPrices {
        price_bs,
        price_usdt: price_bs / rates.usdt(),
        price_bcv: price_bs / rates.bcv(),
    })
}

/// Parses user-entered price text. Accepts a comma as decimal separator.
pub fn parse_price(input: &str) -> Result<f64, PerrosError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PerrosError::Validation("price is required".to_string()));
    }
    trimmed
        .replace(',', ".")
        .parse::<f64>()
        .map_err(|_| PerrosError::InvalidInput(format!("'{trimmed}' is not a number")))
}
