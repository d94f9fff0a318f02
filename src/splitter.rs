// src/splitter.rs

use serde::{Deserialize, Serialize};

use crate::error::{CurveError, Result};
use crate::math::{mul_div, GRANULARITY};
use crate::types::{Address, Amount};

/// One PCV destination and its share of every allocation, in basis points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub destination: Address,
    pub weight_bps: u16,
}

/// Validates a candidate allocation table without building it.
///
/// Lengths must match and weights must total exactly `GRANULARITY`.
pub fn check_allocation(destinations: &[Address], weights: &[u16]) -> Result<()> {
    if destinations.len() != weights.len() {
        return Err(CurveError::LengthMismatch {
            destinations: destinations.len(),
            weights: weights.len(),
        });
    }
    let total: u32 = weights.iter().map(|&w| u32::from(w)).sum();
    if total != u32::from(GRANULARITY) {
        return Err(CurveError::WeightsNotFull { total });
    }
    Ok(())
}

/// Ordered, always-valid allocation table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Allocation>", into = "Vec<Allocation>")]
pub struct AllocationTable(Vec<Allocation>);

impl AllocationTable {
    pub fn new(destinations: Vec<Address>, weights: Vec<u16>) -> Result<Self> {
        check_allocation(&destinations, &weights)?;
        Ok(Self(
            destinations
                .into_iter()
                .zip(weights)
                .map(|(destination, weight_bps)| Allocation {
                    destination,
                    weight_bps,
                })
                .collect(),
        ))
    }

    pub fn entries(&self) -> &[Allocation] {
        &self.0
    }

    pub fn destinations(&self) -> Vec<Address> {
        self.0.iter().map(|a| a.destination.clone()).collect()
    }

    pub fn weights(&self) -> Vec<u16> {
        self.0.iter().map(|a| a.weight_bps).collect()
    }

    /// Splits `amount` across the table by weight.
    ///
    /// Each share is `floor(amount * weight / GRANULARITY)`. If every share
    /// floors to zero there is nothing meaningful to move and the split is
    /// rejected. Otherwise the rounding remainder goes to the first entry
    /// with a nonzero weight, so the returned shares always sum to `amount`.
    /// Entries whose share is zero are omitted.
    pub fn split(&self, amount: Amount) -> Result<Vec<(Address, Amount)>> {
        let mut shares = Vec::with_capacity(self.0.len());
        let mut distributed: Amount = 0;
        for entry in &self.0 {
            let share = mul_div(amount, entry.weight_bps as Amount, GRANULARITY as Amount)?;
            distributed += share;
            shares.push(share);
        }

        if distributed == 0 {
            return Err(CurveError::InsufficientHeldBalance { held: amount });
        }

        let dust = amount - distributed;
        if dust > 0 {
            let first = self
                .0
                .iter()
                .position(|a| a.weight_bps > 0)
                .ok_or(CurveError::InsufficientHeldBalance { held: amount })?;
            shares[first] += dust;
        }

        Ok(self
            .0
            .iter()
            .zip(shares)
            .filter(|(_, share)| *share > 0)
            .map(|(entry, share)| (entry.destination.clone(), share))
            .collect())
    }
}

impl TryFrom<Vec<Allocation>> for AllocationTable {
    type Error = CurveError;

    fn try_from(entries: Vec<Allocation>) -> Result<Self> {
        let (destinations, weights) = entries
            .into_iter()
            .map(|a| (a.destination, a.weight_bps))
            .unzip();
        Self::new(destinations, weights)
    }
}

impl From<AllocationTable> for Vec<Allocation> {
    fn from(table: AllocationTable) -> Self {
        table.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn addrs(names: &[&str]) -> Vec<Address> {
        names.iter().map(|n| Address::from(*n)).collect()
    }

    #[test]
    fn mismatched_lengths_rejected() {
        assert_eq!(
            check_allocation(&addrs(&["a"]), &[9_000, 1_000]),
            Err(CurveError::LengthMismatch {
                destinations: 1,
                weights: 2
            })
        );
    }

    #[test]
    fn incomplete_weights_rejected() {
        assert_eq!(
            check_allocation(&addrs(&["a", "b"]), &[9_000, 2_000]),
            Err(CurveError::WeightsNotFull { total: 11_000 })
        );
        assert_eq!(
            check_allocation(&[], &[]),
            Err(CurveError::WeightsNotFull { total: 0 })
        );
        assert!(check_allocation(&addrs(&["a", "b"]), &[5_000, 5_000]).is_ok());
    }

    #[test]
    fn weights_cannot_overflow_into_full() {
        // 7 * 65535 wraps a u16 well past 10_000; the sum must not.
        let weights = vec![u16::MAX; 7];
        let dests = addrs(&["a", "b", "c", "d", "e", "f", "g"]);
        assert!(matches!(
            check_allocation(&dests, &weights),
            Err(CurveError::WeightsNotFull { .. })
        ));
    }

    #[test]
    fn splits_ninety_ten() {
        let table = AllocationTable::new(addrs(&["a", "b"]), vec![9_000, 1_000]).unwrap();
        assert_eq!(
            table.split(10_000_000).unwrap(),
            vec![(Address::from("a"), 9_000_000), (Address::from("b"), 1_000_000)]
        );
    }

    #[test]
    fn dust_goes_to_first_weighted_destination() {
        let table =
            AllocationTable::new(addrs(&["zero", "a", "b"]), vec![0, 3_333, 6_667]).unwrap();
        let shares = table.split(10).unwrap();
        // floor(3.333) = 3, floor(6.667) = 6, remainder 1 to "a".
        assert_eq!(
            shares,
            vec![(Address::from("a"), 4), (Address::from("b"), 6)]
        );
    }

    #[test]
    fn dust_only_balance_rejected() {
        let table = AllocationTable::new(addrs(&["a", "b"]), vec![9_000, 1_000]).unwrap();
        assert_eq!(
            table.split(1),
            Err(CurveError::InsufficientHeldBalance { held: 1 })
        );
        assert_eq!(
            table.split(0),
            Err(CurveError::InsufficientHeldBalance { held: 0 })
        );
        // 2 * 9000 / 10000 = 1, so this one moves.
        assert_eq!(table.split(2).unwrap().iter().map(|s| s.1).sum::<Amount>(), 2);
    }

    #[test]
    fn serde_rejects_invalid_tables() {
        let bad = r#"[{"destination":"a","weight_bps":9000}]"#;
        assert!(serde_json::from_str::<AllocationTable>(bad).is_err());

        let good = r#"[{"destination":"a","weight_bps":10000}]"#;
        let table: AllocationTable = serde_json::from_str(good).unwrap();
        assert_eq!(table.weights(), vec![10_000]);
    }

    proptest! {
        #[test]
        fn split_conserves_amount(amount in 0u128..1_000_000_000_000u128, w in 0u16..=10_000u16) {
            let table = AllocationTable::new(addrs(&["a", "b"]), vec![w, 10_000 - w]).unwrap();
            match table.split(amount) {
                Ok(shares) => {
                    prop_assert_eq!(shares.iter().map(|s| s.1).sum::<Amount>(), amount);
                }
                Err(e) => {
                    prop_assert_eq!(e, CurveError::InsufficientHeldBalance { held: amount });
                }
            }
        }

        #[test]
        fn check_accepts_exactly_full_matching_tables(
            weights in proptest::collection::vec(any::<u16>(), 0..8),
            n_dests in 0usize..8,
        ) {
            let dests: Vec<Address> = (0..n_dests).map(|i| Address::new(format!("d{}", i))).collect();
            let total: u32 = weights.iter().map(|&w| u32::from(w)).sum();
            let valid = dests.len() == weights.len() && total == u32::from(GRANULARITY);
            prop_assert_eq!(check_allocation(&dests, &weights).is_ok(), valid);
        }

        #[test]
        fn check_accepts_every_full_partition(cut in 0u16..=10_000u16, extra in 0u16..=10_000u16) {
            let (low, high) = (cut.min(extra), cut.max(extra));
            let weights = vec![low, high - low, 10_000 - high];
            prop_assert!(check_allocation(&addrs(&["a", "b", "c"]), &weights).is_ok());
        }
    }
}
