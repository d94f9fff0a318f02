// src/types.rs

use core::fmt;

use serde::{Deserialize, Serialize};

/// Basic integer type for amounts (reserve and output base units).
pub type Amount = u128;

/// Seconds on the host clock.
pub type Timestamp = u64;

/// Opaque account reference: a purchaser, a keeper, a PCV deposit, an oracle
/// or the role registry. The host decides what the string means.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Address {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Serde adapter writing `u128` amounts as decimal strings so JSON consumers
/// never round them through a double.
///
/// Input may be a string or a JSON integer. Integers past `u64::MAX` reach
/// serde_json's `deserialize_any` as floats, so those must be quoted.
pub mod amount_str {
    use core::fmt;

    use serde::{de, Deserializer, Serializer};

    use super::Amount;

    pub fn serialize<S: Serializer>(value: &Amount, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Amount, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }

    struct AmountVisitor;

    impl<'de> de::Visitor<'de> for AmountVisitor {
        type Value = Amount;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a non-negative integer amount or a decimal string")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
            v.trim()
                .parse::<Amount>()
                .map_err(|e| E::custom(format!("invalid amount {:?}: {}", v, e)))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
            Ok(Amount::from(v))
        }

        fn visit_u128<E: de::Error>(self, v: u128) -> Result<Amount, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
            Amount::try_from(v).map_err(|_| E::custom(format!("amount {} is negative", v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
            Err(E::custom(format!(
                "amount {} is not an exact JSON integer; write large amounts as strings",
                v
            )))
        }
    }
}
