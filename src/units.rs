//! Exact ETH ↔ wei conversion.
//!
//! The threshold comparison must happen in integer wei space with no
//! floating-point drift, so the user-facing `Decimal` amount is converted
//! exactly once and the reverse direction is pure string/integer math.

use alloy::primitives::U256;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::error::MonitorError;

/// 10^18 — fits comfortably in a u64.
const WEI_PER_ETH: u64 = 1_000_000_000_000_000_000;

/// Convert an ETH amount to wei exactly. Rejects negative amounts and
/// amounts with sub-wei precision (more than 18 decimal places).
pub fn eth_to_wei(amount: Decimal) -> Result<U256, MonitorError> {
    if amount.is_sign_negative() {
        return Err(MonitorError::InvalidAmount(format!(
            "{} ETH is negative",
            amount
        )));
    }

    let scaled = amount
        .checked_mul(Decimal::from(WEI_PER_ETH))
        .ok_or_else(|| MonitorError::InvalidAmount(format!("{} ETH is out of range", amount)))?;

    if scaled.fract() != Decimal::ZERO {
        return Err(MonitorError::InvalidAmount(format!(
            "{} ETH has sub-wei precision",
            amount
        )));
    }

    let wei = scaled
        .trunc()
        .to_u128()
        .ok_or_else(|| MonitorError::InvalidAmount(format!("{} ETH is out of range", amount)))?;

    Ok(U256::from(wei))
}

/// Render a wei amount as an exact ETH decimal string, trailing zeros
/// trimmed. Never goes through a float.
pub fn wei_to_eth_string(wei: U256) -> String {
    let raw = wei.to_string();
    let (int_part, frac_part) = if raw.len() > 18 {
        let split = raw.len() - 18;
        (raw[..split].to_string(), raw[split..].to_string())
    } else {
        ("0".to_string(), format!("{:0>18}", raw))
    };

    let frac = frac_part.trim_end_matches('0');
    if frac.is_empty() {
        int_part
    } else {
        format!("{}.{}", int_part, frac)
    }
}
