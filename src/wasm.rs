// src/wasm.rs

//! Read-only pricing for JavaScript callers.
//!
//! Amounts cross the boundary as decimal strings. The quoting state is a
//! local copy: nothing here authorizes, settles or allocates.

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::curve::{CurveConfig, PurchaseQuote};
use crate::error::CurveError;
use crate::math::Decimal;
use crate::types::{amount_str, Amount};

fn js_err(err: CurveError) -> JsError {
    JsError::new(&err.to_string())
}

fn parse_amount(label: &str, raw: &str) -> Result<Amount, CurveError> {
    raw.trim()
        .parse::<Amount>()
        .map_err(|e| CurveError::InvalidConfig(format!("{}: {}", label, e)))
}

/// One step of a replayed purchase sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimulatedPurchase {
    #[serde(with = "amount_str")]
    pub amount_in: Amount,
    #[serde(with = "amount_str")]
    pub amount_out: Amount,
    #[serde(with = "amount_str")]
    pub total_purchased: Amount,
    pub at_scale: bool,
    /// The purchase would have exceeded the mint cap and was skipped.
    pub rejected: bool,
}

#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct WasmQuote {
    inner: PurchaseQuote,
}

#[wasm_bindgen]
impl WasmQuote {
    #[wasm_bindgen(getter, js_name = amountOut)]
    pub fn amount_out(&self) -> String {
        self.inner.amount_out.to_string()
    }

    #[wasm_bindgen(getter, js_name = pegValue)]
    pub fn peg_value(&self) -> String {
        self.inner.peg_value.to_string()
    }

    #[wasm_bindgen(getter, js_name = inputToScale)]
    pub fn input_to_scale(&self) -> String {
        self.inner.input_to_scale.to_string()
    }

    #[wasm_bindgen(getter, js_name = crossesScale)]
    pub fn crosses_scale(&self) -> bool {
        self.inner.crosses_scale()
    }
}

#[wasm_bindgen]
#[derive(Debug, Clone)]
pub struct WasmCurve {
    config: CurveConfig,
    reference: Decimal,
    total_purchased: Amount,
}

impl WasmCurve {
    fn build(
        scale: &str,
        discount_bps: u16,
        buffer_bps: u16,
        mint_cap: &str,
        reference_price: &str,
    ) -> Result<Self, CurveError> {
        let config = CurveConfig {
            scale: parse_amount("scale", scale)?,
            discount_bps,
            buffer_bps,
            mint_cap: parse_amount("mint_cap", mint_cap)?,
        };
        config.validate()?;
        Ok(Self {
            config,
            reference: reference_price.parse()?,
            total_purchased: 0,
        })
    }

    fn simulate(&self, amounts: &[Amount]) -> Result<Vec<SimulatedPurchase>, CurveError> {
        let mut total = self.total_purchased;
        let mut results = Vec::with_capacity(amounts.len());

        for &amount_in in amounts {
            let amount_out = self.config.amount_out(total, self.reference, amount_in)?;
            let next = total.checked_add(amount_out).ok_or(CurveError::Overflow)?;
            let rejected = next > self.config.mint_cap;
            if !rejected {
                total = next;
            }
            results.push(SimulatedPurchase {
                amount_in,
                amount_out: if rejected { 0 } else { amount_out },
                total_purchased: total,
                at_scale: self.config.at_scale(total),
                rejected,
            });
        }

        Ok(results)
    }
}

#[wasm_bindgen]
impl WasmCurve {
    #[wasm_bindgen(constructor)]
    pub fn new(
        scale: &str,
        discount_bps: u16,
        buffer_bps: u16,
        mint_cap: &str,
        reference_price: &str,
    ) -> Result<WasmCurve, JsError> {
        Self::build(scale, discount_bps, buffer_bps, mint_cap, reference_price).map_err(js_err)
    }

    #[wasm_bindgen(js_name = setReferencePrice)]
    pub fn set_reference_price(&mut self, reference_price: &str) -> Result<(), JsError> {
        self.reference = reference_price.parse().map_err(js_err)?;
        Ok(())
    }

    #[wasm_bindgen(js_name = setTotalPurchased)]
    pub fn set_total_purchased(&mut self, total_purchased: &str) -> Result<(), JsError> {
        self.total_purchased = parse_amount("total_purchased", total_purchased).map_err(js_err)?;
        Ok(())
    }

    pub fn quote(&self, amount_in: &str) -> Result<WasmQuote, JsError> {
        let amount_in = parse_amount("amount_in", amount_in).map_err(js_err)?;
        let inner = self
            .config
            .quote(self.total_purchased, self.reference, amount_in)
            .map_err(js_err)?;
        Ok(WasmQuote { inner })
    }

    #[wasm_bindgen(js_name = amountOut)]
    pub fn amount_out(&self, amount_in: &str) -> Result<String, JsError> {
        Ok(self.quote(amount_in)?.amount_out())
    }

    /// Current regime multiplier, e.g. `"1.010101010101010101"`.
    #[wasm_bindgen(js_name = currentMultiplier)]
    pub fn current_multiplier(&self) -> Result<String, JsError> {
        let multiplier = self
            .config
            .multiplier(self.config.regime(self.total_purchased))
            .map_err(js_err)?;
        Ok(multiplier.to_string())
    }

    #[wasm_bindgen(js_name = atScale)]
    pub fn at_scale(&self) -> bool {
        self.config.at_scale(self.total_purchased)
    }

    #[wasm_bindgen(js_name = totalPurchased)]
    pub fn total_purchased(&self) -> String {
        self.total_purchased.to_string()
    }

    /// Replays `["amount", ...]` from the current state and returns a JSON array.
    #[wasm_bindgen(js_name = simulatePurchases)]
    pub fn simulate_purchases(&self, amounts_json: &str) -> Result<String, JsError> {
        let raw: Vec<String> = serde_json::from_str(amounts_json)
            .map_err(|e| js_err(CurveError::InvalidConfig(e.to_string())))?;
        let amounts = raw
            .iter()
            .map(|a| parse_amount("amount_in", a))
            .collect::<Result<Vec<_>, _>>()
            .map_err(js_err)?;
        let results = self.simulate(&amounts).map_err(js_err)?;
        serde_json::to_string(&results).map_err(|e| js_err(CurveError::InvalidConfig(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulation_crosses_scale_and_respects_cap() {
        let curve = WasmCurve::build("100000000000", 100, 100, "450000000000", "500").unwrap();
        let results = curve
            .simulate(&[50_000_000, 400_000_000, 400_000_000, 400_000_000])
            .unwrap();

        assert_eq!(results[0].amount_out, 25_252_525_252);
        assert!(!results[0].at_scale);

        assert!(results[1].at_scale);
        assert!(!results[1].rejected);

        assert_eq!(results[2].amount_out, 198_019_801_980);
        let after_third = results[2].total_purchased;

        // A fourth ~198e9 purchase would cross the 450e9 cap.
        assert!(results[3].rejected);
        assert_eq!(results[3].amount_out, 0);
        assert_eq!(results[3].total_purchased, after_third);
    }

    #[test]
    fn build_rejects_bad_inputs() {
        assert!(matches!(
            WasmCurve::build("lots", 100, 100, "1", "500"),
            Err(CurveError::InvalidConfig(_))
        ));
        assert_eq!(
            WasmCurve::build("1", 10_000, 100, "1", "500").unwrap_err(),
            CurveError::InvalidBasisPoints { value: 10_000 }
        );
    }
}
