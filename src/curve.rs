// src/curve.rs

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};
use crate::math::{validate_basis_points, Decimal, GRANULARITY};
use crate::types::{amount_str, Amount};

/// Pricing regime the curve is currently in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Regime {
    /// Below scale: output is sold at a discount to the peg.
    PreScale,
    /// At or above scale: output is sold at a premium (buffer) to the peg.
    PostScale,
}

/// Governor-controlled pricing parameters.
///
/// - scale: cumulative output at which pricing switches from discount to buffer
/// - discount_bps: pre-scale discount, `< GRANULARITY`
/// - buffer_bps: post-scale premium, `< GRANULARITY`
/// - mint_cap: lifetime (until reset) ceiling on output minted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveConfig {
    #[serde(with = "amount_str")]
    pub scale: Amount,
    pub discount_bps: u16,
    pub buffer_bps: u16,
    #[serde(with = "amount_str")]
    pub mint_cap: Amount,
}

/// Runtime accumulation state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurveState {
    /// Output minted since the last reset.
    #[serde(with = "amount_str")]
    pub total_purchased: Amount,
    /// Reserve accumulated by purchases and not yet allocated.
    #[serde(with = "amount_str")]
    pub reserve_held: Amount,
}

/// Breakdown of a single priced purchase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PurchaseQuote {
    pub amount_in: Amount,
    /// Peg value of the input: `reference * amount_in`.
    pub peg_value: Amount,
    /// Part of the peg value priced at the discount multiplier.
    pub pre_scale_value: Amount,
    /// Part of the peg value priced at the buffer multiplier.
    pub post_scale_value: Amount,
    /// Reserve input that would exactly fill the curve to scale (0 once at scale).
    pub input_to_scale: Amount,
    pub amount_out: Amount,
}

impl PurchaseQuote {
    #[inline]
    pub fn crosses_scale(&self) -> bool {
        self.pre_scale_value > 0 && self.post_scale_value > 0
    }
}

/// Pre-scale multiplier: `1 / (1 - discount_bps / GRANULARITY)`.
pub fn discount_multiplier(discount_bps: u16) -> Result<Decimal> {
    let discount = validate_basis_points(discount_bps)?;
    Decimal::ratio(
        (GRANULARITY - discount) as Amount,
        GRANULARITY as Amount,
    )?
    .reciprocal()
}

/// Post-scale multiplier: `1 / (1 + buffer_bps / GRANULARITY)`.
pub fn buffer_multiplier(buffer_bps: u16) -> Result<Decimal> {
    let buffer = validate_basis_points(buffer_bps)?;
    Decimal::ratio(
        GRANULARITY as Amount + buffer as Amount,
        GRANULARITY as Amount,
    )?
    .reciprocal()
}

impl CurveConfig {
    pub fn validate(&self) -> Result<()> {
        validate_basis_points(self.discount_bps)?;
        validate_basis_points(self.buffer_bps)?;
        Ok(())
    }

    #[inline]
    pub fn at_scale(&self, total_purchased: Amount) -> bool {
        total_purchased >= self.scale
    }

    #[inline]
    pub fn regime(&self, total_purchased: Amount) -> Regime {
        if self.at_scale(total_purchased) {
            Regime::PostScale
        } else {
            Regime::PreScale
        }
    }

    /// Multiplier applied to the peg value in the given regime.
    pub fn multiplier(&self, regime: Regime) -> Result<Decimal> {
        match regime {
            Regime::PreScale => discount_multiplier(self.discount_bps),
            Regime::PostScale => buffer_multiplier(self.buffer_bps),
        }
    }

    /// Prices `amount_in` reserve units against the reference price.
    ///
    /// Scale is measured in peg value. Below scale the peg value is split
    /// into the part that fills the curve up to scale (discount multiplier)
    /// and the remainder (buffer multiplier); both segments are summed
    /// exactly and floored once:
    ///
    ///   out = floor(D * min(v, r) + B * max(v - r, 0))
    ///
    /// where `v = floor(reference * amount_in)` and `r = scale - total_purchased`.
    pub fn quote(
        &self,
        total_purchased: Amount,
        reference: Decimal,
        amount_in: Amount,
    ) -> Result<PurchaseQuote> {
        let peg_value = reference.mul_amount(amount_in)?.truncate()?;

        if self.at_scale(total_purchased) {
            let amount_out = buffer_multiplier(self.buffer_bps)?
                .mul_amount(peg_value)?
                .truncate()?;
            return Ok(PurchaseQuote {
                amount_in,
                peg_value,
                pre_scale_value: 0,
                post_scale_value: peg_value,
                input_to_scale: 0,
                amount_out,
            });
        }

        let remaining_to_scale = self.scale - total_purchased;
        let input_to_scale = input_for_value(reference, remaining_to_scale)?;
        let discount = discount_multiplier(self.discount_bps)?;

        if peg_value <= remaining_to_scale {
            let amount_out = discount.mul_amount(peg_value)?.truncate()?;
            return Ok(PurchaseQuote {
                amount_in,
                peg_value,
                pre_scale_value: peg_value,
                post_scale_value: 0,
                input_to_scale,
                amount_out,
            });
        }

        let post_scale_value = peg_value - remaining_to_scale;
        let amount_out = buffer_multiplier(self.buffer_bps)?
            .mul_amount(post_scale_value)?
            .checked_add(discount.mul_amount(remaining_to_scale)?)?
            .truncate()?;

        Ok(PurchaseQuote {
            amount_in,
            peg_value,
            pre_scale_value: remaining_to_scale,
            post_scale_value,
            input_to_scale,
            amount_out,
        })
    }

    #[inline]
    pub fn amount_out(
        &self,
        total_purchased: Amount,
        reference: Decimal,
        amount_in: Amount,
    ) -> Result<Amount> {
        Ok(self.quote(total_purchased, reference, amount_in)?.amount_out)
    }
}

/// Reserve units whose peg value is `value`, truncated.
fn input_for_value(reference: Decimal, value: Amount) -> Result<Amount> {
    if reference.is_zero() {
        return Err(CurveError::InvalidOracle);
    }
    reference.quotient(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample_config() -> CurveConfig {
        CurveConfig {
            scale: 100_000_000_000,
            discount_bps: 100,
            buffer_bps: 100,
            mint_cap: 1_000_000_000_000,
        }
    }

    fn usd(price: Amount) -> Decimal {
        Decimal::from_integer(price)
    }

    #[test]
    fn pre_scale_purchase_gets_discount() {
        let cfg = sample_config();
        assert_eq!(cfg.amount_out(0, usd(500), 50_000_000).unwrap(), 25_252_525_252);
        assert_eq!(cfg.amount_out(0, usd(400), 50_000_000).unwrap(), 20_202_020_202);
    }

    #[test]
    fn crossing_scale_prices_two_segments() {
        let cfg = sample_config();
        let quote = cfg.quote(0, usd(500), 400_000_000).unwrap();
        assert!(quote.crosses_scale());
        assert_eq!(quote.peg_value, 200_000_000_000);
        assert_eq!(quote.pre_scale_value, 100_000_000_000);
        assert_eq!(quote.post_scale_value, 100_000_000_000);
        assert_eq!(quote.input_to_scale, 200_000_000);
        assert_eq!(quote.amount_out, 200_020_002_000);
        assert!(cfg.at_scale(quote.amount_out));
    }

    #[test]
    fn post_scale_purchase_pays_buffer() {
        let cfg = sample_config();
        let total = 200_020_002_000;
        assert_eq!(cfg.regime(total), Regime::PostScale);
        assert_eq!(cfg.amount_out(total, usd(500), 400_000_000).unwrap(), 198_019_801_980);
        assert_eq!(cfg.amount_out(total, usd(600), 400_000_000).unwrap(), 237_623_762_376);

        let wider = CurveConfig { buffer_bps: 500, ..cfg };
        assert_eq!(wider.amount_out(total, usd(500), 400_000_000).unwrap(), 190_476_190_476);
    }

    #[test]
    fn exact_fill_stays_pre_scale() {
        let cfg = sample_config();
        let quote = cfg.quote(0, usd(500), 200_000_000).unwrap();
        assert!(!quote.crosses_scale());
        assert_eq!(quote.post_scale_value, 0);
        assert_eq!(quote.amount_out, 101_010_101_010);
    }

    #[test]
    fn multipliers_reject_full_granularity() {
        assert_eq!(
            discount_multiplier(GRANULARITY),
            Err(CurveError::InvalidBasisPoints { value: 10_000 })
        );
        assert_eq!(
            buffer_multiplier(GRANULARITY),
            Err(CurveError::InvalidBasisPoints { value: 10_000 })
        );
        assert_eq!(buffer_multiplier(0).unwrap(), Decimal::one());
    }

    #[test]
    fn zero_reference_cannot_locate_scale() {
        let cfg = sample_config();
        assert_eq!(cfg.quote(0, Decimal::zero(), 1), Err(CurveError::InvalidOracle));
    }

    proptest! {
        #[test]
        fn linear_below_scale(amount_in in 0u128..200_000_000u128, price in 1u128..500u128) {
            let cfg = sample_config();
            let reference = usd(price);
            let expected = discount_multiplier(cfg.discount_bps).unwrap()
                .mul_amount(reference.mul_amount(amount_in).unwrap().truncate().unwrap()).unwrap()
                .truncate().unwrap();
            prop_assert_eq!(cfg.amount_out(0, reference, amount_in).unwrap(), expected);
        }

        #[test]
        fn split_is_bounded_by_single_regimes(
            amount_in in 0u128..10_000_000_000u128,
            total in 0u128..150_000_000_000u128,
        ) {
            let cfg = sample_config();
            let reference = usd(500);
            let out = cfg.amount_out(total, reference, amount_in).unwrap();
            let peg = reference.mul_amount(amount_in).unwrap().truncate().unwrap();
            let all_post = buffer_multiplier(cfg.buffer_bps).unwrap().mul_amount(peg).unwrap().truncate().unwrap();
            let all_pre = discount_multiplier(cfg.discount_bps).unwrap().mul_amount(peg).unwrap().truncate().unwrap();
            prop_assert!(out + 1 >= all_post);
            prop_assert!(out <= all_pre + 1);
        }

        #[test]
        fn output_monotone_in_input(a in 0u128..1_000_000_000u128, b in 0u128..1_000_000_000u128) {
            let cfg = sample_config();
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            let out_lo = cfg.amount_out(50_000_000_000, usd(500), lo).unwrap();
            let out_hi = cfg.amount_out(50_000_000_000, usd(500), hi).unwrap();
            prop_assert!(out_lo <= out_hi);
        }
    }
}
