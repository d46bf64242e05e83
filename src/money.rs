//! Parsing, storage and display of monetary amounts and currency codes.
//!
//! Amounts are exact decimals stored as TEXT in SQLite so that sums never
//! pick up floating point error.

use std::{str::FromStr, sync::OnceLock};

use numfmt::{Formatter, Precision};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};

use crate::Error;

/// The currencies offered in forms. Stored data may use any three letter code.
pub const SUPPORTED_CURRENCIES: [&str; 2] = ["PEN", "USD"];

/// The largest amount, in either direction, accepted from a form: 10^15.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(0xA4C6_8000, 0x0003_8D7E, 0, false, 0);

/// Amounts are recorded in whole cents.
pub const MAX_DECIMAL_PLACES: u32 = 2;

/// Parse a user-entered amount.
///
/// Accepts either a dot or a comma as the decimal separator. The result is
/// always finite since [Decimal] cannot represent NaN or infinity.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] if `raw` is empty, not a number or has more
/// than [MAX_DECIMAL_PLACES] significant decimal places, and
/// [Error::AmountTooLarge] if its magnitude is above [MAX_AMOUNT].
pub fn parse_amount(raw: &str) -> Result<Decimal, Error> {
    let normalized = raw.trim().replace(',', ".");

    if normalized.is_empty() {
        return Err(Error::InvalidAmount(raw.to_owned()));
    }

    let amount =
        Decimal::from_str(&normalized).map_err(|_| Error::InvalidAmount(raw.to_owned()))?;

    if amount.abs() > MAX_AMOUNT {
        return Err(Error::AmountTooLarge);
    }

    if amount.normalize().scale() > MAX_DECIMAL_PLACES {
        return Err(Error::InvalidAmount(raw.to_owned()));
    }

    Ok(amount)
}

/// `left + right`, or [Error::AmountOverflow] if the sum cannot be represented.
pub fn add_amounts(left: Decimal, right: Decimal) -> Result<Decimal, Error> {
    left.checked_add(right).ok_or(Error::AmountOverflow)
}

/// `left - right`, or [Error::AmountOverflow] if the difference cannot be represented.
pub fn subtract_amounts(left: Decimal, right: Decimal) -> Result<Decimal, Error> {
    left.checked_sub(right).ok_or(Error::AmountOverflow)
}

/// Parse an amount that must be strictly greater than zero.
///
/// # Errors
///
/// Returns [Error::InvalidAmount] for unparsable input and
/// [Error::NonPositiveAmount] for zero or negative amounts.
pub fn parse_positive_amount(raw: &str) -> Result<Decimal, Error> {
    let amount = parse_amount(raw)?;

    if amount <= Decimal::ZERO {
        return Err(Error::NonPositiveAmount);
    }

    Ok(amount)
}

/// Normalize a currency code to three upper case ASCII letters.
///
/// # Errors
///
/// Returns [Error::InvalidCurrency] if `raw` is not three alphabetic characters.
pub fn parse_currency_code(raw: &str) -> Result<String, Error> {
    let code = raw.trim();

    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(Error::InvalidCurrency(raw.to_owned()));
    }

    Ok(code.to_ascii_uppercase())
}

/// Read a decimal stored as TEXT from `row` at column `index`.
pub fn get_decimal(row: &rusqlite::Row, index: usize) -> Result<Decimal, rusqlite::Error> {
    let text: String = row.get(index)?;

    Decimal::from_str(&text).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(
            index,
            rusqlite::types::Type::Text,
            Box::new(error),
        )
    })
}

/// Format `amount` with thousands separators and two decimal places, prefixed
/// by the currency code, e.g. "PEN 1,234.50" or "-USD 3.00".
pub fn format_money(amount: Decimal, currency: &str) -> String {
    static INTEGER_FMT: OnceLock<Option<Formatter>> = OnceLock::new();

    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let magnitude = rounded.abs();
    let whole = magnitude.trunc();
    let cents = ((magnitude - whole) * Decimal::ONE_HUNDRED)
        .to_u32()
        .unwrap_or_default();

    let whole_float = whole.to_f64().unwrap_or_default();
    let whole_string = match INTEGER_FMT.get_or_init(|| {
        Formatter::new()
            .separator(',')
            .map(|formatter| formatter.precision(Precision::Decimals(0)))
            .ok()
    }) {
        // numfmt hardcodes zero as "0", which is what we want here.
        Some(formatter) => formatter.fmt_string(whole_float),
        None => whole.to_string(),
    };

    format!("{sign}{currency} {whole_string}.{cents:02}")
}


#[cfg(test)]
mod checked_arithmetic_tests {
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use crate::Error;

    use super::{add_amounts, subtract_amounts};

    #[test]
    fn adds_and_subtracts() {
        assert_eq!(add_amounts(dec!(1.25), dec!(2.50)), Ok(dec!(3.75)));
        assert_eq!(subtract_amounts(dec!(1.25), dec!(2.50)), Ok(dec!(-1.25)));
    }

    #[test]
    fn overflow_is_an_error() {
        assert_eq!(
            add_amounts(Decimal::MAX, Decimal::ONE),
            Err(Error::AmountOverflow)
        );
        assert_eq!(
            subtract_amounts(Decimal::MIN, Decimal::ONE),
            Err(Error::AmountOverflow)
        );
    }
}
