//! Decimal type utilities for precise financial calculations

use std::str::FromStr;

use rust_decimal::Decimal;
pub use rust_decimal_macros::dec;

/// Price type with high precision
pub type Price = Decimal;

/// Quantity type with high precision
pub type Quantity = Decimal;

/// Amount type with high precision (typically Price * Quantity)
pub type Amount = Decimal;

/// Parse an exchange-formatted decimal string, treating blanks and garbage as zero.
///
/// Exchange payloads routinely carry `""` for fields without data.
pub fn parse_or_zero(raw: &str) -> Decimal {
    Decimal::from_str(raw.trim()).unwrap_or(Decimal::ZERO)
}

/// Render a decimal the way the exchange expects sizes: no trailing zeros.
pub fn to_wire_string(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Precision helpers for common operations
pub mod precision {
    use super::*;

    /// Default price precision (8 decimal places)
    pub const PRICE_PRECISION: u32 = 8;

    /// Round price to standard precision
    pub fn round_price(price: Price) -> Price {
        price.round_dp(PRICE_PRECISION)
    }
}
