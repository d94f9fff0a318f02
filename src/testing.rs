// src/testing.rs

//! In-memory host for driving a curve in tests and simulations.

use std::collections::{BTreeMap, BTreeSet};

use crate::error::LedgerError;
use crate::events::CurveEvent;
use crate::host::{AssetLedger, Authorizer, Clock, EventSink, OracleReading, PriceSource, Transfer};
use crate::math::Decimal;
use crate::types::{Address, Amount, Timestamp};

/// Single-process host: reserve and output balances, a role registry per
/// core address, oracle readings, a manual clock and an event log.
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    pub now: Timestamp,
    reserve: BTreeMap<Address, Amount>,
    minted: BTreeMap<Address, Amount>,
    governors: BTreeMap<Address, BTreeSet<Address>>,
    guardians: BTreeMap<Address, BTreeSet<Address>>,
    oracles: BTreeMap<Address, OracleReading>,
    rejecting: BTreeSet<Address>,
    pub events: Vec<CurveEvent>,
}

impl MemoryHost {
    pub fn new(now: Timestamp) -> Self {
        Self {
            now,
            ..Self::default()
        }
    }

    pub fn advance(&mut self, seconds: u64) {
        self.now = self.now.saturating_add(seconds);
    }

    pub fn grant_governor(&mut self, core: &Address, account: &Address) {
        self.governors
            .entry(core.clone())
            .or_default()
            .insert(account.clone());
    }

    pub fn grant_guardian(&mut self, core: &Address, account: &Address) {
        self.guardians
            .entry(core.clone())
            .or_default()
            .insert(account.clone());
    }

    pub fn set_price(&mut self, oracle: &Address, price: Decimal) {
        self.oracles.insert(oracle.clone(), OracleReading::valid(price));
    }

    pub fn set_invalid(&mut self, oracle: &Address) {
        self.oracles.insert(oracle.clone(), OracleReading::invalid());
    }

    pub fn fund_reserve(&mut self, account: &Address, amount: Amount) {
        *self.reserve.entry(account.clone()).or_default() += amount;
    }

    /// Makes every future reserve transfer into `account` fail.
    pub fn reject_deposits(&mut self, account: &Address) {
        self.rejecting.insert(account.clone());
    }

    pub fn reserve_balance(&self, account: &Address) -> Amount {
        self.reserve.get(account).copied().unwrap_or_default()
    }

    pub fn minted_balance(&self, account: &Address) -> Amount {
        self.minted.get(account).copied().unwrap_or_default()
    }

    pub fn take_events(&mut self) -> Vec<CurveEvent> {
        std::mem::take(&mut self.events)
    }
}

fn credit(
    book: &mut BTreeMap<Address, Amount>,
    account: &Address,
    amount: Amount,
) -> Result<(), LedgerError> {
    let balance = book.entry(account.clone()).or_default();
    *balance = balance
        .checked_add(amount)
        .ok_or_else(|| LedgerError::Overflow(account.clone()))?;
    Ok(())
}

impl Clock for MemoryHost {
    fn now(&self) -> Timestamp {
        self.now
    }
}

impl PriceSource for MemoryHost {
    fn read_price(&self, oracle: &Address) -> OracleReading {
        self.oracles
            .get(oracle)
            .copied()
            .unwrap_or_else(OracleReading::invalid)
    }
}

impl Authorizer for MemoryHost {
    fn is_governor(&self, core: &Address, caller: &Address) -> bool {
        self.governors
            .get(core)
            .map_or(false, |set| set.contains(caller))
    }

    fn is_guardian_or_governor(&self, core: &Address, caller: &Address) -> bool {
        self.is_governor(core, caller)
            || self
                .guardians
                .get(core)
                .map_or(false, |set| set.contains(caller))
    }
}

impl AssetLedger for MemoryHost {
    fn settle(&mut self, transfers: &[Transfer]) -> Result<(), LedgerError> {
        let mut reserve = self.reserve.clone();
        let mut minted = self.minted.clone();

        for transfer in transfers {
            match transfer {
                Transfer::Reserve { from, to, amount } => {
                    if self.rejecting.contains(to) {
                        return Err(LedgerError::Rejected(to.clone()));
                    }
                    let available = reserve.get(from).copied().unwrap_or_default();
                    if available < *amount {
                        return Err(LedgerError::InsufficientBalance {
                            account: from.clone(),
                            available,
                            required: *amount,
                        });
                    }
                    reserve.insert(from.clone(), available - amount);
                    credit(&mut reserve, to, *amount)?;
                }
                Transfer::Mint { to, amount } => credit(&mut minted, to, *amount)?,
            }
        }

        self.reserve = reserve;
        self.minted = minted;
        Ok(())
    }
}

impl EventSink for MemoryHost {
    fn emit(&mut self, event: CurveEvent) {
        self.events.push(event);
    }
}
