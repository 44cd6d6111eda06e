//! Proration of a pool cost over weighted lines.

use rust_decimal::Decimal;

use crate::errors::{CoreError, CoreResult};

/// Prorates `pool` over `weights`: share `i` is `pool × w_i / Σw`.
///
/// A zero weight total yields an all-zero allocation rather than a division
/// error. Shares are returned at full decimal precision and no rounding
/// residue is redistributed; callers round only at display.
pub fn prorate(pool: Decimal, weights: &[Decimal]) -> CoreResult<Vec<Decimal>> {
    if pool < Decimal::ZERO {
        return Err(CoreError::NegativePool(pool));
    }
    if let Some(weight) = weights.iter().find(|weight| **weight < Decimal::ZERO) {
        return Err(CoreError::NegativeWeight(*weight));
    }

    let total: Decimal = weights.iter().sum();
    if total.is_zero() {
        return Ok(vec![Decimal::ZERO; weights.len()]);
    }

    Ok(weights.iter().map(|weight| pool * weight / total).collect())
}
