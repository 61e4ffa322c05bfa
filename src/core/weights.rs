use crate::utils::error::{Result, SplitError};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Precision kept when turning shares into integers before reduction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightScale {
    /// Shares are rounded as they are.
    Units,
    /// Shares are multiplied by 100 first, keeping two decimal places.
    #[default]
    Cents,
}

impl WeightScale {
    fn factor(self) -> Decimal {
        match self {
            WeightScale::Units => Decimal::ONE,
            WeightScale::Cents => Decimal::ONE_HUNDRED,
        }
    }
}

/// Reduces real-valued shares to the smallest integer ratio.
#[derive(Debug, Clone, Copy, Default)]
pub struct WeightNormalizer {
    scale: WeightScale,
}

impl WeightNormalizer {
    pub fn new(scale: WeightScale) -> Self {
        Self { scale }
    }

    pub fn scale(&self) -> WeightScale {
        self.scale
    }

    /// Returns one weight per share, in input order. Zero shares stay zero.
    pub fn normalize(&self, shares: &[Decimal]) -> Result<Vec<u64>> {
        let scaled = shares
            .iter()
            .enumerate()
            .map(|(index, share)| self.scale_share(index, *share))
            .collect::<Result<Vec<u64>>>()?;

        let divisor = scaled.iter().copied().fold(0, gcd);
        if divisor == 0 {
            return Err(SplitError::DegenerateInput {
                message: format!(
                    "cannot derive weights from {} shares that are all zero",
                    shares.len()
                ),
            });
        }

        tracing::debug!("Reducing {} scaled shares by gcd {}", scaled.len(), divisor);
        Ok(scaled.into_iter().map(|value| value / divisor).collect())
    }

    fn scale_share(&self, index: usize, share: Decimal) -> Result<u64> {
        if share.is_sign_negative() && !share.is_zero() {
            return Err(SplitError::invalid_input(
                &format!("shares[{}]", index),
                share,
                "Share cannot be negative",
            ));
        }

        // Decimal::round is round-half-to-even.
        share
            .checked_mul(self.scale.factor())
            .map(|value| value.round())
            .and_then(|value| value.to_u64())
            .ok_or_else(|| {
                SplitError::invalid_input(
                    &format!("shares[{}]", index),
                    share,
                    "Share is too large to convert into a weight",
                )
            })
    }
}

fn gcd(a: u64, b: u64) -> u64 {
    if b == 0 {
        a
    } else {
        gcd(b, a % b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_units_scale_reduces_by_gcd() {
        let normalizer = WeightNormalizer::new(WeightScale::Units);
        assert_eq!(normalizer.normalize(&[dec!(36), dec!(64)]).unwrap(), vec![9, 16]);
    }

    #[test]
    fn test_cents_scale_equal_shares() {
        let normalizer = WeightNormalizer::new(WeightScale::Cents);
        assert_eq!(normalizer.normalize(&[dec!(99.0), dec!(99.0)]).unwrap(), vec![1, 1]);
    }

    #[test]
    fn test_cents_scale_keeps_two_decimals() {
        let cents = WeightNormalizer::new(WeightScale::Cents);
        assert_eq!(cents.normalize(&[dec!(1.50), dec!(1.00)]).unwrap(), vec![3, 2]);

        let units = WeightNormalizer::new(WeightScale::Units);
        assert_eq!(units.normalize(&[dec!(1.50), dec!(1.00)]).unwrap(), vec![2, 1]);
    }

    #[test]
    fn test_all_zero_shares_are_degenerate() {
        let normalizer = WeightNormalizer::default();
        let err = normalizer.normalize(&[dec!(0), dec!(0)]).unwrap_err();
        assert!(matches!(err, SplitError::DegenerateInput { .. }));

        assert!(normalizer.normalize(&[]).is_err());
    }

    #[test]
    fn test_single_non_zero_share() {
        let normalizer = WeightNormalizer::new(WeightScale::Units);
        assert_eq!(
            normalizer.normalize(&[dec!(0), dec!(42), dec!(0)]).unwrap(),
            vec![0, 1, 0]
        );
    }

    #[test]
    fn test_rounding_is_half_to_even() {
        let normalizer = WeightNormalizer::new(WeightScale::Units);
        assert_eq!(
            normalizer.normalize(&[dec!(2.5), dec!(3.5), dec!(0.4)]).unwrap(),
            vec![1, 2, 0]
        );
    }

    #[test]
    fn test_repeating_decimal_portions() {
        let normalizer = WeightNormalizer::default();
        let third = dec!(100) / dec!(3);
        assert_eq!(
            normalizer.normalize(&[third, third, third]).unwrap(),
            vec![1, 1, 1]
        );
    }

    #[test]
    fn test_negative_share_rejected() {
        let normalizer = WeightNormalizer::default();
        let err = normalizer.normalize(&[dec!(1), dec!(-1)]).unwrap_err();
        assert!(matches!(err, SplitError::InvalidInput { .. }));
    }

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(0, 0), 0);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(36, 64), 4);
    }
}
