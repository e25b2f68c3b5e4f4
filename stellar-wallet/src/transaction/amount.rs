//! Conversion between decimal amounts and stroops

use crate::error::{Error, Result};

/// Stroops in one unit of an asset
pub const STROOPS_PER_UNIT: i64 = 10_000_000;

/// Number of decimal places an amount may carry
pub const AMOUNT_DECIMALS: usize = 7;

/// Parse a positive decimal amount such as `99.20` into stroops
pub fn parse_amount(amount: &str) -> Result<i64> {
    let amount = amount.trim();
    let invalid = || Error::Transaction(format!("Invalid amount: {:?}", amount));

    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    if whole.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return Err(invalid());
    }
    if fraction.len() > AMOUNT_DECIMALS {
        return Err(Error::Transaction(format!(
            "Amount has more than {} decimal places: {}",
            AMOUNT_DECIMALS, amount
        )));
    }

    let whole: i64 = if whole.is_empty() { 0 } else { whole.parse().map_err(|_| invalid())? };
    let fraction: i64 = format!("{:0<width$}", fraction, width = AMOUNT_DECIMALS)
        .parse()
        .map_err(|_| invalid())?;

    let stroops = whole
        .checked_mul(STROOPS_PER_UNIT)
        .and_then(|value| value.checked_add(fraction))
        .ok_or_else(invalid)?;

    if stroops == 0 {
        return Err(Error::Transaction("Amount must be greater than zero".to_string()));
    }

    Ok(stroops)
}

/// Render stroops with seven decimal places, as Horizon does
pub fn format_amount(stroops: i64) -> String {
    let sign = if stroops < 0 { "-" } else { "" };
    let stroops = stroops.unsigned_abs();
    let unit = STROOPS_PER_UNIT as u64;
    format!("{}{}.{:07}", sign, stroops / unit, stroops % unit)
}
