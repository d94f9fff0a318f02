// src/host.rs

//! Seams between the curve and the environment that executes it.
//!
//! The curve never owns balances, prices, roles or clocks. It reads them
//! through these traits at the start of an operation and hands the ledger
//! a single batch of transfers to apply all-or-nothing.

use crate::error::LedgerError;
use crate::events::CurveEvent;
use crate::math::Decimal;
use crate::types::{Address, Amount, Timestamp};

/// Point-in-time reading from a reference price feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OracleReading {
    /// Output units per reserve unit.
    pub price: Decimal,
    pub valid: bool,
}

impl OracleReading {
    pub fn valid(price: Decimal) -> Self {
        Self { price, valid: true }
    }

    pub fn invalid() -> Self {
        Self {
            price: Decimal::zero(),
            valid: false,
        }
    }
}

/// One leg of a settlement batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transfer {
    /// Moves reserve asset between accounts. A transfer into a PCV deposit
    /// doubles as its deposit notification.
    Reserve {
        from: Address,
        to: Address,
        amount: Amount,
    },
    /// Mints output asset to `to`.
    Mint { to: Address, amount: Amount },
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

pub trait PriceSource {
    fn read_price(&self, oracle: &Address) -> OracleReading;
}

/// Role lookups against the registry the curve currently points at.
pub trait Authorizer {
    fn is_governor(&self, core: &Address, caller: &Address) -> bool;
    fn is_guardian_or_governor(&self, core: &Address, caller: &Address) -> bool;
}

pub trait AssetLedger {
    /// Applies every transfer or none of them.
    fn settle(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError>;
}

pub trait EventSink {
    fn emit(&mut self, event: CurveEvent);
}

impl EventSink for Vec<CurveEvent> {
    fn emit(&mut self, event: CurveEvent) {
        self.push(event);
    }
}

/// Everything an operation may touch.
pub trait Host: Clock + PriceSource + Authorizer + AssetLedger + EventSink {}

impl<T> Host for T where T: Clock + PriceSource + Authorizer + AssetLedger + EventSink + ?Sized {}
