//! Conversion between display amounts (whole coins, decimal text) and base
//! units. Only integer arithmetic is used on the base-unit side.

/// Decimals of the native coin.
pub const COIN_DECIMALS: u32 = 9;

/// Base units in one whole coin.
pub const BASE_UNITS_PER_COIN: u64 = 1_000_000_000;

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum AmountError {
    #[error("amount is empty")]
    Empty,
    #[error("invalid amount `{0}`")]
    Invalid(String),
    #[error("amount `{0}` does not fit in base units")]
    Overflow(String),
}

/// Convert a decimal display amount to base units, flooring fractional digits
/// beyond `decimals`.
pub fn display_to_base_units(amount: &str, decimals: u32) -> Result<u64, AmountError> {
    let amount = amount.trim();
    if amount.is_empty() {
        return Err(AmountError::Empty);
    }
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(AmountError::Invalid(amount.to_string()));
    }

    let overflow = || AmountError::Overflow(amount.to_string());
    let scale = 10u64.checked_pow(decimals).ok_or_else(overflow)?;
    let whole_units = if whole.is_empty() {
        0
    } else {
        whole.parse::<u64>().map_err(|_| overflow())?
    };

    let kept = &fraction[..fraction.len().min(decimals as usize)];
    let fraction_units = if kept.is_empty() {
        0
    } else {
        // kept has at most `decimals` digits so this stays below `scale`
        kept.parse::<u64>().map_err(|_| overflow())? * 10u64.pow(decimals - kept.len() as u32)
    };

    whole_units
        .checked_mul(scale)
        .and_then(|units| units.checked_add(fraction_units))
        .ok_or_else(overflow)
}

/// Render base units as a display amount without trailing zeros.
pub fn base_units_to_display(value: u128, decimals: u32) -> String {
    let scale = 10u128.pow(decimals);
    let whole = value / scale;
    let fraction = value % scale;
    if fraction == 0 {
        return whole.to_string();
    }
    let fraction = format!("{:0width$}", fraction, width = decimals as usize);
    format!("{}.{}", whole, fraction.trim_end_matches('0'))
}
