//! Prices

use num_traits::ToPrimitive;
use rust_decimal::Decimal;
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// A price in a single currency, stored in minor units.
pub type Price = Money<'static, Currency>;

/// All supported currencies have two decimal places.
const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Errors raised while reading or adding prices.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// The backend sent a currency code this client does not know.
    #[error("unknown currency {0}")]
    UnknownCurrency(String),

    /// The amount could not be represented in minor units.
    #[error("amount {0} is out of range")]
    OutOfRange(Decimal),

    /// Prices are never negative.
    #[error("amount {0} is negative")]
    Negative(Decimal),

    /// Two prices in different currencies were combined (left, right).
    #[error("cannot combine {0} with {1}")]
    CurrencyMismatch(&'static str, &'static str),

    /// Multiplying or adding minor units overflowed.
    #[error("price arithmetic overflowed")]
    Overflow,
}

/// Look up a currency by its ISO alpha code.
///
/// # Errors
///
/// Returns [`PriceError::UnknownCurrency`] for codes outside RUB, USD, EUR and GBP.
pub fn currency(code: &str) -> Result<&'static Currency, PriceError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "RUB" => Ok(iso::RUB),
        "USD" => Ok(iso::USD),
        "EUR" => Ok(iso::EUR),
        "GBP" => Ok(iso::GBP),
        other => Err(PriceError::UnknownCurrency(other.to_string())),
    }
}

/// Convert a decimal amount in major units (e.g. `1299.50`) into a [`Price`].
///
/// # Errors
///
/// Returns an error if the amount is negative, does not fit in minor units,
/// or the currency code is unknown.
pub fn parse_price(amount: Decimal, code: &str) -> Result<Price, PriceError> {
    let currency = currency(code)?;

    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative(amount));
    }

    let minor_units = amount
        .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or(PriceError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor_units, currency))
}

/// Price of `quantity` units at `price` each.
///
/// # Errors
///
/// Returns [`PriceError::Overflow`] if the result does not fit in minor units.
pub fn line_total(price: &Price, quantity: u32) -> Result<Price, PriceError> {
    let minor_units = price
        .to_minor_units()
        .checked_mul(i64::from(quantity))
        .ok_or(PriceError::Overflow)?;

    Ok(Money::from_minor(minor_units, price.currency()))
}

/// Sum prices, all of which must be in `currency`.
///
/// An empty iterator sums to zero in `currency`.
///
/// # Errors
///
/// Returns an error on a currency mismatch or overflow.
pub fn sum<I>(currency: &'static Currency, prices: I) -> Result<Price, PriceError>
where
    I: IntoIterator<Item = Price>,
{
    let minor_units = prices.into_iter().try_fold(0_i64, |acc, price| {
        if price.currency() != currency {
            return Err(PriceError::CurrencyMismatch(
                currency.iso_alpha_code,
                price.currency().iso_alpha_code,
            ));
        }

        acc.checked_add(price.to_minor_units())
            .ok_or(PriceError::Overflow)
    })?;

    Ok(Money::from_minor(minor_units, currency))
}
