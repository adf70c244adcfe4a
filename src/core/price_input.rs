use thiserror::Error;

use crate::config::InstrumentConfig;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PriceInputError {
    #[error("no price given")]
    Empty,

    #[error("{0:?} is not a number")]
    NotANumber(String),

    #[error("price {price} is outside the plausible range ({min}, {max})")]
    OutOfRange { price: f64, min: f64, max: f64 },
}

/// Parse a price typed by the trader. Accepts a comma decimal separator
/// ("1,08500") and requires `min_price < price < max_price`.
pub fn parse_price(input: &str, instrument: &InstrumentConfig) -> Result<f64, PriceInputError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(PriceInputError::Empty);
    }

    let normalized = trimmed.replacen(',', ".", 1);
    let price: f64 = normalized
        .parse()
        .map_err(|_| PriceInputError::NotANumber(trimmed.to_string()))?;

    if !price.is_finite() {
        return Err(PriceInputError::NotANumber(trimmed.to_string()));
    }
    check_price(price, instrument)
}

/// Range check for prices that arrive already numeric.
pub fn check_price(price: f64, instrument: &InstrumentConfig) -> Result<f64, PriceInputError> {
    if price.is_nan() || price <= instrument.min_price || price >= instrument.max_price {
        return Err(PriceInputError::OutOfRange {
            price,
            min: instrument.min_price,
            max: instrument.max_price,
        });
    }
    Ok(price)
}
